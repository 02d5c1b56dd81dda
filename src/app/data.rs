use serde::{Deserialize, Serialize};

/// A movie entity as returned by the backend. Never mutated client-side.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Film {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Running time in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A venue returned by the backend for a film/location/date query.
#[derive(Clone, Debug, Deserialize)]
pub struct Cinema {
    pub name: String,
    pub address: String,
    /// Straight-line or routed distance in km, backend-computed.
    pub distance: f64,
    /// Travel time in minutes, backend-computed.
    pub duration: f64,
    #[serde(rename = "imgShowTime", default)]
    pub img_show_time: Option<String>,
    pub slug: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooseRequest {
    pub film_name: String,
    /// YYYY-MM-DD
    pub view_date: String,
    pub location: GeoPoint,
    pub radius: u32,
    pub limit: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChooseResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Vec<Cinema>,
    #[serde(rename = "recommendedCinema", default)]
    pub recommended_cinema: Option<Cinema>,
}

/// Error payload the backend sends on a failed choose request.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Wholesale result of one submission. Exactly one branch is ever held:
/// an error message, or the cinema list. Replaces any prior value.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    Error(String),
    Results(ChooseResponse),
}

impl SearchOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
