//! Route and stop types

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::timing::hms;

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` text as expected by the directions providers
    pub fn to_waypoint(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Known stop type vocabulary.
///
/// Stops carry their type as free text; these are the values the engine
/// recognizes (by substring, see [`super::timing::ServiceClass`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopType {
    Collect,
    Delivery,
    Depot,
}

impl StopType {
    pub const fn as_str(self) -> &'static str {
        match self {
            StopType::Collect => "collect",
            StopType::Delivery => "delivery",
            StopType::Depot => "depot",
        }
    }
}

impl From<StopType> for String {
    fn from(value: StopType) -> Self {
        value.as_str().to_string()
    }
}

/// Where the vehicle leaves from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPoint {
    pub id: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
impl StartPoint {
    pub fn new(id: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: Some(id.into()),
            coordinates: Some(coordinates),
        }
    }
}

/// A route handed in by the caller and returned with timing filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub start_point: Option<StartPoint>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub distance_total_km: f64,
    #[serde(default = "TimeDelta::zero", with = "hms")]
    pub duration_total: TimeDelta,
}

#[cfg(test)]
impl Route {
    pub fn new(start_point: StartPoint, stops: Vec<Stop>) -> Self {
        Self {
            start_point: Some(start_point),
            stops,
            distance_total_km: 0.0,
            duration_total: TimeDelta::zero(),
        }
    }
}

impl Route {
    /// Identity of the start point, if any
    pub fn start_id(&self) -> Option<&str> {
        self.start_point
            .as_ref()
            .and_then(|s| s.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// A stop on the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: Option<String>,
    pub order: i32,
    #[serde(rename = "type", default)]
    pub stop_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, alias = "uf")]
    pub region_code: String,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub arrival: Option<NaiveDateTime>,
    #[serde(default)]
    pub exit: Option<NaiveDateTime>,
    /// Time spent driving the leg that ends here
    #[serde(default, with = "hms::option")]
    pub time_course: Option<TimeDelta>,
    /// Dwell time applied after arrival
    #[serde(default, with = "hms::option")]
    pub time_service: Option<TimeDelta>,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

/// Builders for fixtures
#[cfg(test)]
impl Stop {
    pub fn new(id: impl Into<String>, order: i32, stop_type: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            order,
            stop_type: stop_type.into(),
            address: String::new(),
            number: String::new(),
            district: String::new(),
            city: String::new(),
            region_code: String::new(),
            coordinates: None,
            arrival: None,
            exit: None,
            time_course: None,
            time_service: None,
            distance_km: None,
        }
    }

    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        number: impl Into<String>,
        district: impl Into<String>,
        city: impl Into<String>,
        region_code: impl Into<String>,
    ) -> Self {
        self.address = address.into();
        self.number = number.into();
        self.district = district.into();
        self.city = city.into();
        self.region_code = region_code.into();
        self
    }
}

impl Stop {
    /// Identity, treating an empty string as absent
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_depot(&self) -> bool {
        self.stop_type.contains(StopType::Depot.as_str())
    }

    /// Single-line search text for geocoding: street, number, district, city, region.
    pub fn search_address(&self) -> String {
        let locality = [self.district.trim(), self.city.trim(), self.region_code.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let street = match (self.address.trim(), self.number.trim()) {
            ("", "") => String::new(),
            (street, "") => street.to_string(),
            (street, number) => format!("{}, {}", street, number),
        };

        match (street.is_empty(), locality.is_empty()) {
            (true, _) => locality,
            (false, true) => street,
            (false, false) => format!("{} {}", street, locality),
        }
    }
}
