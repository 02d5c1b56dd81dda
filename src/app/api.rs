use std::time::Duration;

use tracing::warn;

use super::data::{ChooseRequest, ChooseResponse, ErrorBody, Film, SearchOutcome};

/// Shown when a choose request fails without a usable server message.
pub const GENERIC_SUBMIT_ERROR: &str = "Something went wrong while searching for cinemas.";

/// Blocking client for the cinema backend. One instance is shared across the
/// background threads that actually issue requests.
pub struct BackendClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, String> {
        let http = reqwest::blocking::Client::builder()
            .user_agent("cinefind/0.1")
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("http client: {e}"))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /api/films/all` — the pre-loaded picker grid.
    pub fn all_films(&self) -> Result<Vec<Film>, String> {
        let url = format!("{}/api/films/all", self.base_url);
        self.http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("GET {url}: {e}"))?
            .json::<Vec<Film>>()
            .map_err(|e| format!("parse films: {e}"))
    }

    /// `GET /api/films?s={query}` — the live-search dropdown.
    pub fn search_films(&self, query: &str) -> Result<Vec<Film>, String> {
        let url = search_url(&self.base_url, query);
        self.http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("GET {url}: {e}"))?
            .json::<Vec<Film>>()
            .map_err(|e| format!("parse matches: {e}"))
    }

    /// `POST /api/choose/` — one submission, stored wholesale by the caller.
    ///
    /// Failure taxonomy mirrors the rest of the app: a server error payload
    /// surfaces its `message`; transport or parse failures collapse to the
    /// generic fallback. Either way the caller gets a renderable outcome.
    pub fn choose(&self, req: &ChooseRequest) -> SearchOutcome {
        let url = format!("{}/api/choose/", self.base_url);
        let resp = match self.http.post(&url).json(req).send() {
            Ok(r) => r,
            Err(e) => {
                warn!("POST {url}: {e}");
                return SearchOutcome::Error(GENERIC_SUBMIT_ERROR.into());
            }
        };

        if resp.status().is_success() {
            match resp.json::<ChooseResponse>() {
                Ok(body) => SearchOutcome::Results(body),
                Err(e) => {
                    warn!("parse choose response: {e}");
                    SearchOutcome::Error(GENERIC_SUBMIT_ERROR.into())
                }
            }
        } else {
            let status = resp.status();
            match resp.json::<ErrorBody>() {
                Ok(body) => SearchOutcome::Error(body.message),
                Err(_) => {
                    warn!("choose failed with HTTP {status} and no error payload");
                    SearchOutcome::Error(GENERIC_SUBMIT_ERROR.into())
                }
            }
        }
    }
}

fn search_url(base: &str, query: &str) -> String {
    format!("{}/api/films?s={}", base, urlencoding::encode(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::data::GeoPoint;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            search_url("http://localhost:2808", "the matrix"),
            "http://localhost:2808/api/films?s=the%20matrix"
        );
    }

    /// One-shot HTTP server on a loopback port; returns the base URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let resp = format!(
                    "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn sample_request() -> ChooseRequest {
        ChooseRequest {
            film_name: "Inception".into(),
            view_date: "2026-08-31".into(),
            location: GeoPoint { lat: 10.76, lng: 106.66 },
            radius: 10,
            limit: 2,
        }
    }

    #[test]
    fn choose_returns_two_cinemas_from_mock_backend() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"message":"Found 2 cinemas","data":[
                {"name":"CGV Crescent Mall","address":"101 Ton Dat Tien","distance":3.4,"duration":12.0,"slug":"cgv-crescent-mall"},
                {"name":"BHD Star","address":"3/2 Street","distance":5.1,"duration":18.0,"slug":"bhd-star"}
            ]}"#,
        );
        let client = BackendClient::new(&base, 5).unwrap();
        match client.choose(&sample_request()) {
            SearchOutcome::Results(resp) => {
                assert_eq!(resp.data.len(), 2);
                assert_eq!(resp.data[0].address, "101 Ton Dat Tien");
                assert!((resp.data[1].distance - 5.1).abs() < 1e-9);
                assert!((resp.data[1].duration - 18.0).abs() < 1e-9);
            }
            SearchOutcome::Error(e) => panic!("unexpected error branch: {e}"),
        }
    }

    #[test]
    fn choose_surfaces_server_error_message() {
        let base = serve_once(
            "HTTP/1.1 404 Not Found",
            r#"{"message":"No cinemas are showing this film on that date"}"#,
        );
        let client = BackendClient::new(&base, 5).unwrap();
        match client.choose(&sample_request()) {
            SearchOutcome::Error(msg) => {
                assert_eq!(msg, "No cinemas are showing this film on that date");
            }
            SearchOutcome::Results(_) => panic!("expected error branch"),
        }
    }

    #[test]
    fn choose_falls_back_to_generic_message() {
        let base = serve_once("HTTP/1.1 500 Internal Server Error", "oops");
        let client = BackendClient::new(&base, 5).unwrap();
        match client.choose(&sample_request()) {
            SearchOutcome::Error(msg) => assert_eq!(msg, GENERIC_SUBMIT_ERROR),
            SearchOutcome::Results(_) => panic!("expected error branch"),
        }
    }

    #[test]
    fn search_films_parses_match_list() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"_id":"1","title":"Inception"},{"_id":"2","title":"Inside Out"}]"#,
        );
        let client = BackendClient::new(&base, 5).unwrap();
        let films = client.search_films("in").unwrap();
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].title, "Inception");
    }
}
