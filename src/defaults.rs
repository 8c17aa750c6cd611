pub const DEFAULT_LANGUAGE: &str = "pt-BR";

pub const DEFAULT_REGION: &str = "br";

pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_TOMTOM_TRAVEL_MODE: &str = "car";

pub const DEFAULT_GOOGLE_TRAVEL_MODE: &str = "driving";

/// Average speed the mock provider assumes between stops
pub const MOCK_AVERAGE_SPEED_KMH: f64 = 40.0;
