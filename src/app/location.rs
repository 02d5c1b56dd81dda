// src/app/location.rs — one-shot location capture on a background thread
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use super::data::GeoPoint;
use super::types::LocationMsg;
use crate::config::AppConfig;

pub const MSG_LOCATION_FAILED: &str =
    "Could not determine your current location. Check the network, or set fixed_location in config.json.";

/// Response shape of ip-api.com style GeoIP endpoints.
#[derive(Debug, Deserialize)]
struct GeoProviderBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

fn point_from_body(body: GeoProviderBody) -> Result<GeoPoint, String> {
    if body.status.as_deref() == Some("fail") {
        return Err(body.message.unwrap_or_else(|| "provider returned fail".into()));
    }
    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => Ok(GeoPoint { lat, lng: lon }),
        _ => Err("provider response missing lat/lon".into()),
    }
}

/// Kick off a capture. A `fixed_location` in config resolves immediately;
/// otherwise a GeoIP lookup runs on its own thread. The receiver delivers
/// exactly one message.
pub fn spawn_capture(cfg: &AppConfig) -> Receiver<LocationMsg> {
    let (tx, rx) = mpsc::channel::<LocationMsg>();

    if let Some(fixed) = cfg.fixed_location {
        let _ = tx.send(LocationMsg::Done(GeoPoint { lat: fixed.lat, lng: fixed.lng }));
        return rx;
    }

    let url = cfg.geoip_url.clone();
    let timeout = cfg.request_timeout_secs;
    std::thread::spawn(move || {
        let result = lookup(&url, timeout);
        let msg = match result {
            Ok(point) => LocationMsg::Done(point),
            Err(e) => {
                warn!("geoip lookup failed: {e}");
                LocationMsg::Error(MSG_LOCATION_FAILED.into())
            }
        };
        let _ = tx.send(msg);
    });

    rx
}

fn lookup(url: &str, timeout_secs: u64) -> Result<GeoPoint, String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent("cinefind/geoip")
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| format!("http client: {e}"))?;

    let body = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("GET {url}: {e}"))?
        .json::<GeoProviderBody>()
        .map_err(|e| format!("parse geoip body: {e}"))?;

    point_from_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedLocation;

    #[test]
    fn provider_success_maps_lon_to_lng() {
        let body: GeoProviderBody = serde_json::from_str(
            r#"{"status":"success","lat":10.762622,"lon":106.660172,"city":"Ho Chi Minh City"}"#,
        )
        .unwrap();
        let p = point_from_body(body).unwrap();
        assert!((p.lat - 10.762_622).abs() < 1e-9);
        assert!((p.lng - 106.660_172).abs() < 1e-9);
    }

    #[test]
    fn provider_fail_status_is_an_error() {
        let body: GeoProviderBody =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert_eq!(point_from_body(body).unwrap_err(), "private range");
    }

    #[test]
    fn missing_coordinates_are_an_error() {
        let body: GeoProviderBody = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(point_from_body(body).is_err());
    }

    #[test]
    fn fixed_location_resolves_without_network() {
        let cfg = AppConfig {
            fixed_location: Some(FixedLocation { lat: 1.5, lng: 2.5 }),
            ..AppConfig::default()
        };
        let rx = spawn_capture(&cfg);
        match rx.recv().unwrap() {
            LocationMsg::Done(p) => {
                assert!((p.lat - 1.5).abs() < 1e-9);
                assert!((p.lng - 2.5).abs() < 1e-9);
            }
            LocationMsg::Error(e) => panic!("unexpected error: {e}"),
        }
    }
}
