//! Type definitions

pub mod directions;
pub mod route;
pub mod timing;

pub use directions::*;
pub use route::*;
pub use timing::TimingConfiguration;
