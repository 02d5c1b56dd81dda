// src/app/ui/film_picker.rs — modal poster grid for choosing a film
use eframe::egui as eg;

use crate::app::utils;

const CARD_W: f32 = 140.0;
const CARD_H: f32 = CARD_W * 1.5 + 36.0;

impl crate::app::CineApp {
    pub(crate) fn ui_render_film_picker(&mut self, ctx: &eg::Context) {
        if !self.show_film_picker {
            return;
        }

        let mut open = self.show_film_picker;
        let mut picked: Option<String> = None;

        eg::Window::new("Choose a film")
            .collapsible(false)
            .resizable(true)
            .default_width(640.0)
            .default_height(480.0)
            .open(&mut open)
            .show(ctx, |ui| {
                if self.loading_films {
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.add(eg::Spinner::new().size(16.0));
                        ui.label("Loading the film list…");
                    });
                    return;
                }
                if self.cards.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.weak("No films available");
                    });
                    return;
                }

                if let Some((settled, total)) = self.prefetch_progress() {
                    ui.weak(format!("Fetching posters… {settled}/{total}"));
                }

                let available = ui.available_width() - 8.0;
                let cols = (available / CARD_W.max(1.0)).floor().max(1.0) as usize;

                // Bounded texture uploads per frame
                let mut uploads_left = crate::app::MAX_UPLOADS_PER_FRAME;

                eg::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    eg::Grid::new("film_grid")
                        .num_columns(cols)
                        .spacing([8.0, 8.0])
                        .show(ui, |ui| {
                            for idx in 0..self.cards.len() {
                                let (rect, resp) = ui.allocate_exact_size(
                                    eg::vec2(CARD_W, CARD_H),
                                    eg::Sense::click(),
                                );

                                // Lazy texture upload for visible cards
                                if uploads_left > 0 && self.try_lazy_upload_card(ctx, idx) {
                                    uploads_left -= 1;
                                }

                                let poster_rect = eg::Rect::from_min_max(
                                    rect.min,
                                    eg::pos2(rect.min.x + CARD_W, rect.min.y + CARD_W * 1.5),
                                );
                                let text_rect = eg::Rect::from_min_max(
                                    eg::pos2(rect.min.x, poster_rect.max.y),
                                    rect.max,
                                );

                                if let Some(card) = self.cards.get(idx) {
                                    if let Some(tex) = &card.tex {
                                        ui.painter().image(
                                            tex.id(),
                                            poster_rect,
                                            eg::Rect::from_min_max(
                                                eg::pos2(0.0, 0.0),
                                                eg::pos2(1.0, 1.0),
                                            ),
                                            eg::Color32::WHITE,
                                        );
                                    } else {
                                        ui.painter().rect_filled(
                                            poster_rect,
                                            6.0,
                                            eg::Color32::from_gray(40),
                                        );
                                    }

                                    let mut lines = card.film.title.clone();
                                    if let Some(mins) = card.film.duration {
                                        lines.push('\n');
                                        lines.push_str(&utils::format_film_runtime(mins));
                                    }
                                    ui.painter().text(
                                        text_rect.left_top(),
                                        eg::Align2::LEFT_TOP,
                                        lines,
                                        eg::FontId::proportional(14.0),
                                        eg::Color32::WHITE,
                                    );

                                    if resp.clicked() {
                                        picked = Some(card.film.title.clone());
                                    }
                                }

                                if (idx + 1) % cols == 0 {
                                    ui.end_row();
                                }
                            }
                            ui.end_row();
                        });
                });
            });

        self.show_film_picker = open;
        if let Some(title) = picked {
            self.select_film(&title);
        }
    }
}
