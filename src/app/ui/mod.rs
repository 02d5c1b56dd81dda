// src/app/ui/mod.rs — render entry point
mod film_picker;
mod form;
mod results;

use eframe::egui as eg;

impl crate::app::CineApp {
    pub(crate) fn render(&mut self, ctx: &eg::Context) {
        eg::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading("Find a cinema near you");
                ui.label("Pick a film, a date and a radius — we'll list nearby cinemas showing it.");
            });
            ui.separator();

            if self.submitting {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading("Searching cinemas…");
                    ui.add(eg::Spinner::new().size(16.0));
                });
            } else {
                self.ui_render_form(ui);
            }

            ui.add_space(8.0);
            self.ui_render_results(ui);
        });

        self.ui_render_film_picker(ctx);
        self.ui_render_image_modal(ctx);
    }
}
