//! Timing configuration and clock-duration helpers

use chrono::{NaiveTime, TimeDelta, Timelike};

/// Service times and return policy applied by the itinerary engine.
///
/// Passed explicitly into every engine call; nothing is looked up globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfiguration {
    /// Dwell time at stops whose type contains `collect`
    pub collect_service: TimeDelta,
    /// Dwell time at every other stop
    pub delivery_service: TimeDelta,
    /// Whether the vehicle drives back to the start point as a final leg
    pub return_to_base: bool,
}

impl Default for TimingConfiguration {
    fn default() -> Self {
        Self {
            collect_service: TimeDelta::zero(),
            delivery_service: TimeDelta::zero(),
            return_to_base: false,
        }
    }
}

impl TimingConfiguration {
    pub fn new(collect_service: TimeDelta, delivery_service: TimeDelta, return_to_base: bool) -> Self {
        Self {
            collect_service,
            delivery_service,
            return_to_base,
        }
    }

    /// Service duration for a stop of the given type.
    pub fn service_for(&self, stop_type: &str) -> TimeDelta {
        match ServiceClass::of(stop_type) {
            ServiceClass::Collect => self.collect_service,
            ServiceClass::Delivery => self.delivery_service,
        }
    }
}

/// Which service duration a stop type consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceClass {
    Collect,
    Delivery,
}

impl ServiceClass {
    /// Classify a stop type string.
    ///
    /// A case-sensitive substring test for `collect`; anything else,
    /// depots and unknown types included, is serviced as a delivery.
    pub fn of(stop_type: &str) -> Self {
        if stop_type.contains("collect") {
            ServiceClass::Collect
        } else {
            ServiceClass::Delivery
        }
    }
}

/// Parse a clock duration written as `HH:MM:SS` (hours may exceed 23).
pub fn parse_clock_duration(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    // Fast path for regular wall-clock values.
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S") {
        return TimeDelta::try_seconds(time.num_seconds_from_midnight() as i64);
    }

    let mut parts = text.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    TimeDelta::try_seconds(hours * 3600 + minutes * 60 + seconds)
}

/// Format a duration as `HH:MM:SS`.
pub fn format_clock_duration(duration: &TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Serde adapter storing a [`TimeDelta`] as `HH:MM:SS`.
pub mod hms {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock_duration(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_clock_duration(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid duration '{}', expected HH:MM:SS", text))
        })
    }

    /// Same as the parent module, for optional fields.
    pub mod option {
        use chrono::TimeDelta;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<TimeDelta>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(duration) => serializer.serialize_some(&super::super::format_clock_duration(duration)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TimeDelta>, D::Error> {
            let text: Option<String> = Option::deserialize(deserializer)?;
            text.map(|t| {
                super::super::parse_clock_duration(&t).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid duration '{}', expected HH:MM:SS", t))
                })
            })
            .transpose()
        }
    }
}
