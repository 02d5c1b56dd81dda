// src/app/prefs.rs
use std::path::PathBuf;
use std::time::{Duration, Instant};
use std::fs;

use crate::app::form::{MAX_LIMIT, MAX_RADIUS_KM, MIN_LIMIT, MIN_RADIUS_KM};

impl crate::app::CineApp {
    // ---- tiny flags ----
    pub(crate) fn mark_dirty(&mut self) {
        self.prefs_dirty = true;
    }

    pub(crate) fn maybe_save_prefs(&mut self) {
        // debounce a bit to avoid writing every frame
        if self.prefs_dirty && self.prefs_last_write.elapsed() >= Duration::from_millis(300) {
            self.save_prefs();
            self.prefs_dirty = false;
            self.prefs_last_write = Instant::now();
        }
    }

    // ---- load/save prefs ----
    pub(crate) fn load_prefs(&mut self) {
        let Ok(txt) = fs::read_to_string(prefs_path()) else {
            return;
        };
        apply_prefs(&txt, &mut self.form.radius, &mut self.form.limit);
    }

    pub(crate) fn save_prefs(&self) {
        let path = prefs_path();
        let _ = fs::create_dir_all(path.parent().unwrap_or_else(|| std::path::Path::new(".")));
        let _ = fs::write(path, render_prefs(self.form.radius, self.form.limit));
    }
}

fn apply_prefs(txt: &str, radius: &mut u32, limit: &mut u32) {
    for line in txt.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k.trim() {
            "radius" => {
                if let Ok(n) = v.trim().parse::<u32>() {
                    *radius = n.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
                }
            }
            "limit" => {
                if let Ok(n) = v.trim().parse::<u32>() {
                    *limit = n.clamp(MIN_LIMIT, MAX_LIMIT);
                }
            }
            _ => {}
        }
    }
}

fn render_prefs(radius: u32, limit: u32) -> String {
    format!("# cinefind ui prefs\nradius={radius}\nlimit={limit}\n")
}

pub fn prefs_path() -> PathBuf {
    crate::app::cache::cache_dir().join("ui_prefs.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefs_round_trip() {
        let txt = render_prefs(25, 3);
        let (mut radius, mut limit) = (1, 1);
        apply_prefs(&txt, &mut radius, &mut limit);
        assert_eq!(radius, 25);
        assert_eq!(limit, 3);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let (mut radius, mut limit) = (10, 2);
        apply_prefs("radius=900\nlimit=0\n", &mut radius, &mut limit);
        assert_eq!(radius, 50);
        assert_eq!(limit, 1);
    }

    #[test]
    fn junk_lines_are_ignored() {
        let (mut radius, mut limit) = (10, 2);
        apply_prefs("# comment\n\nnot a pair\nradius=abc\nunknown=5\n", &mut radius, &mut limit);
        assert_eq!(radius, 10);
        assert_eq!(limit, 2);
    }
}
