use serde::{Deserialize, Serialize};

/// A user's saved location bookmark ("Home", "Work", ...).
///
/// Bookmarks arrive as caller-supplied context and are treated as untrusted:
/// every field beyond id and label is optional and may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Bookmark {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            address: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

/// A nearby parking lot as supplied in the recommendation context blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyLot {
    pub id: String,
    pub name: String,
    #[serde(rename = "availableSpots", default, skip_serializing_if = "Option::is_none")]
    pub available_spots: Option<u32>,
    #[serde(rename = "pricePerHour", default, skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

impl NearbyLot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available_spots: None,
            price_per_hour: None,
            services: Vec::new(),
        }
    }

    pub fn with_availability(mut self, available_spots: u32) -> Self {
        self.available_spots = Some(available_spots);
        self
    }

    pub fn with_price_per_hour(mut self, price_per_hour: f64) -> Self {
        self.price_per_hour = Some(price_per_hour);
        self
    }

    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.services = services;
        self
    }
}
