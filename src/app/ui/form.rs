// src/app/ui/form.rs — the search form
use std::time::Instant;

use eframe::egui as eg;
use egui_extras::DatePickerButton;

use crate::app::form::{Field, FieldError, MAX_LIMIT, MAX_RADIUS_KM, MIN_LIMIT, MIN_RADIUS_KM};
use crate::app::types::LocationState;
use crate::app::utils;

fn error_label(ui: &mut eg::Ui, errors: &[FieldError], field: Field) {
    if let Some(err) = errors.iter().find(|e| e.field == field) {
        ui.colored_label(ui.visuals().error_fg_color, err.message);
    }
}

impl crate::app::CineApp {
    pub(crate) fn ui_render_form(&mut self, ui: &mut eg::Ui) {
        // ---- Film ----
        ui.label(eg::RichText::new("Film").strong());
        ui.horizontal(|ui| {
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.form.film_name)
                    .hint_text("Type to search…")
                    .desired_width(280.0),
            );
            if resp.changed() {
                self.on_film_input(Instant::now());
            }
            if ui.button("Browse…").clicked() {
                self.show_film_picker = true;
            }
        });
        error_label(ui, &self.field_errors, Field::Film);
        self.ui_render_search_dropdown(ui);

        ui.add_space(6.0);

        // ---- Viewing date ----
        ui.label(eg::RichText::new("Viewing date").strong());
        ui.horizontal(|ui| {
            if ui
                .add(DatePickerButton::new(&mut self.form.view_date).id_source("view_date"))
                .changed()
            {
                self.field_errors.retain(|e| e.field != Field::Date);
            }
            ui.weak(utils::format_date_label(self.form.view_date));
        });
        error_label(ui, &self.field_errors, Field::Date);

        ui.add_space(6.0);

        // ---- Location ----
        ui.label(eg::RichText::new("Current location").strong());
        ui.horizontal(|ui| {
            match &self.location {
                LocationState::Resolving => {
                    ui.add(eg::Spinner::new().size(12.0));
                    ui.weak("Determining location…");
                }
                LocationState::Ready(p) => {
                    ui.label(format!("Location acquired ({:.4}, {:.4})", p.lat, p.lng));
                }
                LocationState::Failed(_) => {
                    ui.colored_label(ui.visuals().error_fg_color, "No location");
                }
            }
            if ui
                .small_button("Refresh")
                .on_hover_text("Retry the location lookup")
                .clicked()
            {
                self.refresh_location();
            }
        });
        if let LocationState::Failed(msg) = &self.location {
            ui.colored_label(ui.visuals().error_fg_color, msg);
        }
        error_label(ui, &self.field_errors, Field::Location);

        ui.add_space(6.0);

        // ---- Radius & limit ----
        ui.horizontal(|ui| {
            ui.label(eg::RichText::new("Radius").strong());
            if ui
                .add(eg::Slider::new(&mut self.form.radius, MIN_RADIUS_KM..=MAX_RADIUS_KM).suffix(" km"))
                .changed()
            {
                self.field_errors.retain(|e| e.field != Field::Radius);
                self.mark_dirty();
            }

            ui.separator();

            ui.label(eg::RichText::new("Cinemas").strong());
            if ui
                .add(eg::Slider::new(&mut self.form.limit, MIN_LIMIT..=MAX_LIMIT))
                .changed()
            {
                self.field_errors.retain(|e| e.field != Field::Limit);
                self.mark_dirty();
            }
        });
        error_label(ui, &self.field_errors, Field::Radius);
        error_label(ui, &self.field_errors, Field::Limit);

        ui.add_space(10.0);

        if ui
            .add_enabled(!self.submitting, eg::Button::new("Find cinemas"))
            .clicked()
        {
            self.submit();
        }
    }

    fn ui_render_search_dropdown(&mut self, ui: &mut eg::Ui) {
        if !self.show_dropdown {
            return;
        }

        let mut picked: Option<String> = None;
        eg::Frame::popup(ui.style()).show(ui, |ui| {
            ui.set_max_width(300.0);
            if self.matches.is_empty() {
                ui.weak("No films match");
                return;
            }
            eg::ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
                for film in &self.matches {
                    let label = match film.duration {
                        Some(mins) => {
                            format!("{}  ·  {}", film.title, utils::format_film_runtime(mins))
                        }
                        None => film.title.clone(),
                    };
                    if ui.selectable_label(false, label).clicked() {
                        picked = Some(film.title.clone());
                    }
                }
            });
        });

        if let Some(title) = picked {
            self.select_film(&title);
        }
    }
}
