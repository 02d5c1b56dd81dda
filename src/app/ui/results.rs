// src/app/ui/results.rs — result cards, error banner, enlarged image modal
use eframe::egui as eg;

use crate::app::data::{Cinema, SearchOutcome};
use crate::app::utils;

impl crate::app::CineApp {
    pub(crate) fn ui_render_results(&mut self, ui: &mut eg::Ui) {
        let Some(outcome) = self.outcome.clone() else {
            return;
        };

        ui.separator();
        ui.heading("Results");

        match outcome {
            SearchOutcome::Error(msg) => {
                // Error branch renders exclusively: no cards, no message line.
                ui.colored_label(ui.visuals().error_fg_color, msg);
            }
            SearchOutcome::Results(resp) => {
                if !resp.message.is_empty() {
                    ui.label(&resp.message);
                }
                if let Some(rec) = &resp.recommended_cinema {
                    ui.label(
                        eg::RichText::new(format!("Recommended: {}", rec.name))
                            .strong()
                            .italics(),
                    );
                }
                ui.add_space(4.0);

                eg::ScrollArea::vertical().auto_shrink([false, true]).show(ui, |ui| {
                    for (i, cinema) in resp.data.iter().enumerate() {
                        self.ui_render_cinema_card(ui, i, cinema);
                        ui.add_space(6.0);
                    }
                });
            }
        }
    }

    fn ui_render_cinema_card(&mut self, ui: &mut eg::Ui, idx: usize, cinema: &Cinema) {
        ui.push_id(("cinema_card", idx), |ui| {
            ui.group(|ui| {
                ui.label(eg::RichText::new(&cinema.name).heading());
                ui.label(&cinema.address);
                ui.horizontal(|ui| {
                    ui.label(format!("Distance: {}", utils::format_km(cinema.distance)));
                    ui.separator();
                    ui.label(format!("Travel time: {}", utils::format_minutes(cinema.duration)));
                });

                if let Some(url) = &cinema.img_show_time {
                    self.try_upload_showtime(ui.ctx(), url);
                    if let Some(tex) = self.shot_tex.get(url) {
                        ui.label(eg::RichText::new("Showtimes:").strong());
                        let resp = ui
                            .add(
                                eg::Image::new(tex)
                                    .max_width(240.0)
                                    .sense(eg::Sense::click()),
                            )
                            .on_hover_text("Click to enlarge");
                        if resp.clicked() {
                            self.enlarged_image = Some((url.clone(), cinema.name.clone()));
                        }
                    } else {
                        ui.weak("Loading showtimes…");
                    }
                }

                ui.hyperlink_to("Buy tickets", utils::ticket_url(&cinema.slug));
            });
        });
    }

    pub(crate) fn ui_render_image_modal(&mut self, ctx: &eg::Context) {
        let Some((url, name)) = self.enlarged_image.clone() else {
            return;
        };

        let mut open = true;
        eg::Window::new(format!("Showtimes at {name}"))
            .collapsible(false)
            .resizable(true)
            .default_width(720.0)
            .open(&mut open)
            .show(ctx, |ui| {
                self.try_upload_showtime(ctx, &url);
                if let Some(tex) = self.shot_tex.get(&url) {
                    eg::ScrollArea::both().show(ui, |ui| {
                        ui.add(eg::Image::new(tex).max_width(ui.available_width()));
                    });
                } else {
                    ui.add(eg::Spinner::new().size(16.0));
                }
            });

        if !open {
            self.enlarged_image = None;
        }
    }
}
