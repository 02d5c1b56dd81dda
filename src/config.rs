use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:2808";
pub const DEFAULT_GEOIP_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct FixedLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub cache_dir: Option<String>,
    pub geoip_url: String,
    pub fixed_location: Option<FixedLocation>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: None,
            geoip_url: DEFAULT_GEOIP_URL.to_string(),
            fixed_location: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    cache_dir: Option<String>,
    geoip_url: Option<String>,
    fixed_location: Option<FixedLocation>,
    request_timeout_secs: Option<u64>,
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from("config.json");
    let mut cfg = AppConfig::default();

    match fs::read_to_string(&cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                if let Some(base) = parsed.api_base_url {
                    // The client appends /api/... itself; a trailing slash would
                    // produce double slashes in every request path.
                    cfg.api_base_url = base.trim_end_matches('/').to_string();
                }
                if parsed.cache_dir.is_some() {
                    cfg.cache_dir = parsed.cache_dir;
                }
                if let Some(url) = parsed.geoip_url {
                    cfg.geoip_url = url;
                }
                if parsed.fixed_location.is_some() {
                    cfg.fixed_location = parsed.fixed_location;
                }
                if let Some(secs) = parsed.request_timeout_secs {
                    if secs == 0 {
                        warn!("request_timeout_secs=0 in config.json; keeping default.");
                    } else {
                        cfg.request_timeout_secs = secs;
                    }
                }
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
        }
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url, "http://localhost:2808");
        assert!(cfg.fixed_location.is_none());
        assert_eq!(cfg.request_timeout_secs, 15);
    }

    #[test]
    fn raw_config_accepts_partial_json() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"api_base_url":"http://films.local:9000/"}"#).unwrap();
        assert_eq!(raw.api_base_url.as_deref(), Some("http://films.local:9000/"));
        assert!(raw.fixed_location.is_none());
    }

    #[test]
    fn fixed_location_parses_lat_lng() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"fixed_location":{"lat":10.762622,"lng":106.660172}}"#,
        )
        .unwrap();
        let loc = raw.fixed_location.unwrap();
        assert!((loc.lat - 10.762_622).abs() < 1e-9);
        assert!((loc.lng - 106.660_172).abs() < 1e-9);
    }
}
