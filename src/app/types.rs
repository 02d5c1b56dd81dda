// src/app/types.rs
use eframe::egui::TextureHandle;
use std::path::PathBuf;

use super::data::{Film, GeoPoint, SearchOutcome};

// ---- cross-thread messages ----
pub enum LocationMsg {
    Done(GeoPoint),
    Error(String),
}

pub enum FilmsMsg {
    Done(Vec<Film>),
    Error(String),
}

/// Result of one debounced lookup. `generation` identifies the dispatch;
/// responses from a superseded generation are dropped on receipt.
pub struct SearchMsg {
    pub generation: u64,
    pub result: Result<Vec<Film>, String>,
}

pub struct ChooseMsg {
    pub outcome: SearchOutcome,
}

pub struct PrefetchDone {
    pub card_idx: usize,
    pub result: Result<PathBuf, String>,
}

/// (card_idx, cache key, url, already-cached path)
pub type WorkItem = (usize, String, String, Option<PathBuf>);

// ---- view state ----
#[derive(Clone, Debug, PartialEq)]
pub enum LocationState {
    Resolving,
    Ready(GeoPoint),
    Failed(String),
}

impl LocationState {
    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            Self::Ready(p) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

/// One film in the picker grid, with its poster plumbing.
pub struct FilmCard {
    pub film: Film,
    pub key: Option<String>,
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>, // UI thread only
    pub state: PosterState,
}

impl FilmCard {
    pub fn new(film: Film) -> Self {
        let key = film
            .image
            .as_deref()
            .map(crate::app::cache::url_to_cache_key);
        Self {
            film,
            key,
            path: None,
            tex: None,
            state: PosterState::Pending,
        }
    }
}
