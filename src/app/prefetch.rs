// src/app/prefetch.rs — worker-pool poster downloads for the film picker
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use eframe::egui as eg;

impl crate::app::CineApp {
    /// Queue every film that carries a poster URL. Workers download resized
    /// variants into the on-disk cache; textures upload lazily during paint.
    pub(crate) fn start_poster_prefetch(&mut self, ctx: &eg::Context) {
        if self.prefetch_started || self.cards.is_empty() {
            return;
        }
        self.prefetch_started = true;

        self.completed = 0;
        self.failed = 0;
        self.total_targets = self
            .cards
            .iter()
            .filter(|c| c.key.is_some())
            .count();
        if self.total_targets == 0 {
            return;
        }

        let (work_tx, work_rx) = mpsc::channel::<super::WorkItem>();
        let (done_tx, done_rx) = mpsc::channel::<super::PrefetchDone>();
        self.work_tx = Some(work_tx.clone());
        self.done_rx = Some(done_rx);

        let work_rx = std::sync::Arc::new(std::sync::Mutex::new(work_rx));

        // One shared HTTP client.
        let client = match reqwest::blocking::Client::builder()
            .user_agent("cinefind/prefetch")
            .timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(8)
            .build()
        {
            Ok(c) => std::sync::Arc::new(c),
            Err(e) => {
                tracing::warn!("http client build failed: {e}");
                self.failed = self.total_targets;
                return;
            }
        };

        for _ in 0..super::WORKER_COUNT {
            let work_rx = std::sync::Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = std::sync::Arc::clone(&client);

            std::thread::spawn(move || loop {
                let job = {
                    let rx = work_rx.lock().unwrap();
                    rx.recv()
                };
                let (card_idx, key, url, cached_path) = match job {
                    Ok(t) => t,
                    Err(_) => break,
                };

                let result: Result<PathBuf, String> = cached_path.map_or_else(
                    || {
                        crate::app::cache::download_and_store_resized(
                            &client,
                            &url,
                            &key,
                            super::RESIZE_MAX_W,
                            super::RESIZE_QUALITY,
                        )
                    },
                    Ok,
                );

                let _ = done_tx.send(super::PrefetchDone { card_idx, result });
            });
        }

        for idx in 0..self.cards.len() {
            let card = &mut self.cards[idx];
            let (Some(key), Some(url)) = (card.key.clone(), card.film.image.clone()) else {
                card.state = super::PosterState::Failed;
                continue;
            };
            card.path = crate::app::cache::find_any_by_key(&key);
            card.state = if card.path.is_some() {
                super::PosterState::Cached
            } else {
                super::PosterState::Pending
            };
            let _ = work_tx.send((idx, key, url, card.path.clone()));
        }

        ctx.request_repaint();
    }

    /// `(settled, total)` while poster downloads are still outstanding,
    /// `None` once every target has either landed or failed.
    pub(crate) fn prefetch_progress(&self) -> Option<(usize, usize)> {
        if !self.prefetch_started || self.total_targets == 0 {
            return None;
        }
        let settled = self.completed + self.failed;
        if settled < self.total_targets {
            Some((settled, self.total_targets))
        } else {
            None
        }
    }

    /// Poll prefetch completions, bounded per frame.
    pub(crate) fn poll_prefetch_done(&mut self, ctx: &eg::Context) {
        let mut drained = 0usize;

        while drained < super::MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else {
                break;
            };

            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    match msg.result {
                        Ok(path) => {
                            if let Some(card) = self.cards.get_mut(msg.card_idx) {
                                card.path = Some(path);
                                card.state = super::PosterState::Cached; // uploaded lazily during paint
                                self.completed += 1;
                            } else {
                                self.failed += 1;
                            }
                        }
                        Err(e) => {
                            if let Some(card) = self.cards.get_mut(msg.card_idx) {
                                card.state = super::PosterState::Failed;
                                self.failed += 1;
                                tracing::warn!(
                                    "poster download failed: {} ({e})",
                                    card.film.title
                                );
                            } else {
                                self.failed += 1;
                            }
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }

        if drained > 0 {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::CineApp;

    #[test]
    fn poster_progress_reported_until_every_download_settles() {
        let mut app = CineApp::default();
        assert!(app.prefetch_progress().is_none());

        app.prefetch_started = true;
        app.total_targets = 4;
        app.completed = 1;
        app.failed = 1;
        assert_eq!(app.prefetch_progress(), Some((2, 4)));

        app.completed = 3;
        assert!(app.prefetch_progress().is_none());
    }
}
