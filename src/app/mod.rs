// src/app/mod.rs — form orchestration, background request polling, poster uploads

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use eframe::egui::{self as eg, ColorImage, TextureHandle};
use tracing::warn;

pub mod api;
pub mod cache;
pub mod data;
pub mod form;
pub mod location;
pub mod prefetch;
pub mod prefs;
pub mod search;
pub mod types;
pub mod ui;
pub mod utils;

use api::{BackendClient, GENERIC_SUBMIT_ERROR};
use data::{Film, SearchOutcome};
use form::{Field, FieldError, SearchForm};
use search::DebouncedSearch;
use types::{
    ChooseMsg, FilmCard, FilmsMsg, LocationMsg, LocationState, PosterState, PrefetchDone,
    SearchMsg, WorkItem,
};

// ---- Tunables ----
const WORKER_COUNT: usize = 8;
const RESIZE_MAX_W: u32 = 320;
const RESIZE_QUALITY: u8 = 75;
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;
const MAX_SEARCH_MSGS_PER_FRAME: usize = 8;

pub struct CineApp {
    cfg: crate::config::AppConfig,
    client: Option<Arc<BackendClient>>,

    // form
    pub form: SearchForm,
    pub(crate) field_errors: Vec<FieldError>,
    prefs_dirty: bool,
    prefs_last_write: Instant,

    // film picker grid
    pub(crate) cards: Vec<FilmCard>,
    pub(crate) loading_films: bool,
    films_rx: Option<Receiver<FilmsMsg>>,
    pub(crate) show_film_picker: bool,

    // live search
    debounce: DebouncedSearch,
    search_tx: Sender<SearchMsg>,
    search_rx: Receiver<SearchMsg>,
    pub(crate) matches: Vec<Film>,
    pub(crate) show_dropdown: bool,

    // location
    pub(crate) location: LocationState,
    location_rx: Option<Receiver<LocationMsg>>,

    // submission
    pub(crate) submitting: bool,
    choose_rx: Option<Receiver<ChooseMsg>>,
    pub(crate) outcome: Option<SearchOutcome>,

    // showtime images for result cards
    shot_rx: Option<Receiver<(String, Result<PathBuf, String>)>>,
    shot_paths: HashMap<String, PathBuf>,
    pub(crate) shot_tex: HashMap<String, TextureHandle>,
    shot_failed: HashSet<String>,
    pub(crate) enlarged_image: Option<(String, String)>, // (url, cinema name)

    // poster prefetch plumbing
    prefetch_started: bool,
    total_targets: usize,
    completed: usize,
    failed: usize,
    work_tx: Option<Sender<WorkItem>>,
    done_rx: Option<Receiver<PrefetchDone>>,

    // one-time init guard
    did_init: bool,
}

impl Default for CineApp {
    fn default() -> Self {
        let (search_tx, search_rx) = mpsc::channel::<SearchMsg>();
        Self {
            cfg: crate::config::AppConfig::default(),
            client: None,

            form: SearchForm::new(Local::now().date_naive()),
            field_errors: Vec::new(),
            prefs_dirty: false,
            prefs_last_write: Instant::now(),

            cards: Vec::new(),
            loading_films: false,
            films_rx: None,
            show_film_picker: false,

            debounce: DebouncedSearch::default(),
            search_tx,
            search_rx,
            matches: Vec::new(),
            show_dropdown: false,

            location: LocationState::Resolving,
            location_rx: None,

            submitting: false,
            choose_rx: None,
            outcome: None,

            shot_rx: None,
            shot_paths: HashMap::new(),
            shot_tex: HashMap::new(),
            shot_failed: HashSet::new(),
            enlarged_image: None,

            prefetch_started: false,
            total_targets: 0,
            completed: 0,
            failed: 0,
            work_tx: None,
            done_rx: None,

            did_init: false,
        }
    }
}

// ---------- methods ----------
impl CineApp {
    fn init(&mut self) {
        self.cfg = crate::config::load_config();
        match BackendClient::new(&self.cfg.api_base_url, self.cfg.request_timeout_secs) {
            Ok(c) => self.client = Some(Arc::new(c)),
            Err(e) => warn!("backend client build failed: {e}"),
        }
        self.load_prefs();
        self.refresh_location();
        self.start_films_fetch();
    }

    /// (Re)start the one-shot location capture. Bound to the refresh button.
    pub(crate) fn refresh_location(&mut self) {
        self.location = LocationState::Resolving;
        self.location_rx = Some(location::spawn_capture(&self.cfg));
    }

    fn start_films_fetch(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        self.loading_films = true;
        let (tx, rx) = mpsc::channel::<FilmsMsg>();
        self.films_rx = Some(rx);
        std::thread::spawn(move || {
            let msg = match client.all_films() {
                Ok(films) => FilmsMsg::Done(films),
                Err(e) => FilmsMsg::Error(e),
            };
            let _ = tx.send(msg);
        });
    }

    fn poll_location(&mut self) {
        let Some(rx) = &self.location_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(LocationMsg::Done(point)) => {
                self.location = LocationState::Ready(point);
                self.field_errors.retain(|e| e.field != Field::Location);
                self.location_rx = None;
            }
            Ok(LocationMsg::Error(msg)) => {
                self.location = LocationState::Failed(msg);
                self.location_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.location = LocationState::Failed(location::MSG_LOCATION_FAILED.into());
                self.location_rx = None;
            }
        }
    }

    fn poll_films(&mut self, ctx: &eg::Context) {
        let Some(rx) = &self.films_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(FilmsMsg::Done(films)) => {
                self.cards = films.into_iter().map(FilmCard::new).collect();
                self.loading_films = false;
                self.films_rx = None;
                self.start_poster_prefetch(ctx);
            }
            Ok(FilmsMsg::Error(e)) => {
                // Silent failure: the picker just shows an empty state.
                warn!("film list fetch failed: {e}");
                self.loading_films = false;
                self.films_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.loading_films = false;
                self.films_rx = None;
            }
        }
    }

    /// Called from the form when the film field text changes.
    pub(crate) fn on_film_input(&mut self, now: Instant) {
        let hide = self.debounce.input(&self.form.film_name, now);
        if hide {
            self.show_dropdown = false;
            self.matches.clear();
        }
    }

    fn tick_search(&mut self, now: Instant) {
        if let Some((generation, query)) = self.debounce.take_due(now) {
            let Some(client) = self.client.clone() else {
                return;
            };
            let tx = self.search_tx.clone();
            std::thread::spawn(move || {
                let result = client.search_films(&query);
                let _ = tx.send(SearchMsg { generation, result });
            });
        }
    }

    fn poll_search(&mut self, ctx: &eg::Context) {
        let mut drained = 0usize;
        let mut seen_any = false;
        while drained < MAX_SEARCH_MSGS_PER_FRAME {
            match self.search_rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    if !self.debounce.is_current(msg.generation) {
                        continue; // superseded lookup; drop
                    }
                    self.debounce.settle();
                    seen_any = true;
                    match msg.result {
                        Ok(films) => {
                            self.matches = films;
                            self.show_dropdown = true;
                        }
                        Err(e) => {
                            warn!("film search failed: {e}");
                            self.matches.clear();
                            self.show_dropdown = false;
                        }
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if seen_any {
            ctx.request_repaint();
        }
    }

    /// Fill the film field from a grid card or dropdown row.
    pub(crate) fn select_film(&mut self, title: &str) {
        self.form.film_name = title.to_string();
        self.field_errors.retain(|e| e.field != Field::Film);
        self.debounce.cancel();
        self.show_dropdown = false;
        self.matches.clear();
        self.show_film_picker = false;
    }

    /// Validate and dispatch one choose request. Violations surface as
    /// field-level messages and nothing is sent.
    pub(crate) fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let today = Local::now().date_naive();
        let errors = self.form.validate(self.location.point(), today);
        if !errors.is_empty() {
            self.field_errors = errors;
            return;
        }
        self.field_errors.clear();

        let Some(client) = self.client.clone() else {
            self.outcome = Some(SearchOutcome::Error(GENERIC_SUBMIT_ERROR.into()));
            return;
        };
        // Location presence was just validated.
        let Some(point) = self.location.point() else {
            return;
        };
        let req = self.form.to_request(point);

        self.submitting = true;
        self.outcome = None;
        let (tx, rx) = mpsc::channel::<ChooseMsg>();
        self.choose_rx = Some(rx);
        std::thread::spawn(move || {
            let outcome = client.choose(&req);
            let _ = tx.send(ChooseMsg { outcome });
        });
    }

    fn poll_choose(&mut self, ctx: &eg::Context) {
        let Some(rx) = &self.choose_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(msg) => {
                self.submitting = false;
                self.choose_rx = None;
                self.start_showtime_fetch(&msg.outcome);
                self.outcome = Some(msg.outcome);
                ctx.request_repaint();
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.submitting = false;
                self.choose_rx = None;
                self.outcome = Some(SearchOutcome::Error(GENERIC_SUBMIT_ERROR.into()));
            }
        }
    }

    // ----- showtime images -----
    fn start_showtime_fetch(&mut self, outcome: &SearchOutcome) {
        let SearchOutcome::Results(resp) = outcome else {
            return;
        };
        let urls: Vec<String> = resp
            .data
            .iter()
            .chain(resp.recommended_cinema.as_ref())
            .filter_map(|c| c.img_show_time.clone())
            .filter(|u| !self.shot_paths.contains_key(u) && !self.shot_failed.contains(u))
            .collect();
        if urls.is_empty() {
            return;
        }

        let (tx, rx) = mpsc::channel::<(String, Result<PathBuf, String>)>();
        self.shot_rx = Some(rx);
        let timeout = self.cfg.request_timeout_secs;
        std::thread::spawn(move || {
            let client = match reqwest::blocking::Client::builder()
                .user_agent("cinefind/showtimes")
                .timeout(std::time::Duration::from_secs(timeout))
                .build()
            {
                Ok(c) => c,
                Err(e) => {
                    warn!("showtime client build failed: {e}");
                    return;
                }
            };
            for url in urls {
                let key = cache::url_to_cache_key(&url);
                let result = match cache::find_any_by_key(&key) {
                    Some(path) => Ok(path),
                    None => cache::download_and_store(&client, &url, &key),
                };
                let _ = tx.send((url, result));
            }
        });
    }

    fn poll_showtime(&mut self, ctx: &eg::Context) {
        let mut seen_any = false;
        while let Some(rx) = &self.shot_rx {
            match rx.try_recv() {
                Ok((url, result)) => {
                    seen_any = true;
                    match result {
                        Ok(path) => {
                            self.shot_paths.insert(url, path);
                        }
                        Err(e) => {
                            warn!("showtime image fetch failed for {url}: {e}");
                            self.shot_failed.insert(url);
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.shot_rx = None;
                }
            }
        }
        if seen_any {
            ctx.request_repaint();
        }
    }

    /// Whether any background work is still pending. Drives the repaint
    /// policy: frames keep flowing while channels have senders alive, and
    /// the app goes idle once everything has settled.
    fn background_busy(&self) -> bool {
        self.location_rx.is_some()
            || self.films_rx.is_some()
            || self.choose_rx.is_some()
            || self.shot_rx.is_some()
            || self.debounce.is_busy()
            || self.prefetch_progress().is_some()
            || self.prefs_dirty
    }

    // ---- texture helpers (UI thread only) ----
    fn upload_rgba(ctx: &eg::Context, w: u32, h: u32, bytes: &[u8], name: &str) -> TextureHandle {
        let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
        ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
    }

    fn load_texture_from_path(
        ctx: &eg::Context,
        path_str: &str,
        cache_name: &str,
    ) -> Result<TextureHandle, String> {
        let (w, h, bytes) = cache::load_rgba_image(path_str)?;
        Ok(Self::upload_rgba(ctx, w, h, &bytes, cache_name))
    }

    /// Try to upload a texture for one picker card if its cached file exists.
    /// Returns true if a texture was uploaded this call.
    pub(crate) fn try_lazy_upload_card(&mut self, ctx: &eg::Context, idx: usize) -> bool {
        if let Some(card) = self.cards.get_mut(idx) {
            if card.tex.is_some() || matches!(card.state, PosterState::Failed) {
                return false;
            }
            let Some(key) = card.key.clone() else {
                return false;
            };
            if card.path.is_none() {
                card.path = cache::find_any_by_key(&key); // fallback single lookup only once
            }
            if let Some(path) = card.path.as_ref() {
                match Self::load_texture_from_path(ctx, &path.to_string_lossy(), &key) {
                    Ok(tex) => {
                        card.tex = Some(tex);
                        card.state = PosterState::Ready;
                        return true;
                    }
                    Err(_) => {
                        card.state = PosterState::Failed;
                    }
                }
            }
        }
        false
    }

    /// Upload one showtime image texture when its file is ready.
    pub(crate) fn try_upload_showtime(&mut self, ctx: &eg::Context, url: &str) -> bool {
        if self.shot_tex.contains_key(url) || self.shot_failed.contains(url) {
            return false;
        }
        let Some(path) = self.shot_paths.get(url).cloned() else {
            return false;
        };
        let key = cache::url_to_cache_key(url);
        match Self::load_texture_from_path(ctx, &path.to_string_lossy(), &key) {
            Ok(tex) => {
                self.shot_tex.insert(url.to_string(), tex);
                true
            }
            Err(e) => {
                warn!("showtime image decode failed for {url}: {e}");
                self.shot_failed.insert(url.to_string());
                false
            }
        }
    }
}


// ========== App impl ==========
impl eframe::App for CineApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        // First frame
        if !self.did_init {
            self.did_init = true;
            self.init();
        }

        let now = Instant::now();
        self.poll_location();
        self.poll_films(ctx);
        self.tick_search(now);
        self.poll_search(ctx);
        self.poll_choose(ctx);
        self.poll_showtime(ctx);
        if self.prefetch_started {
            self.poll_prefetch_done(ctx);
        }

        self.render(ctx);

        self.maybe_save_prefs();

        // Keep frames moving only while channel messages are still expected;
        // an idle form repaints on input alone.
        if self.background_busy() {
            ctx.request_repaint();
        }
    }
}
