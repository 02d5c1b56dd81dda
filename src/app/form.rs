// src/app/form.rs — search form state and validation
use chrono::{Days, NaiveDate};

use super::data::{ChooseRequest, GeoPoint};

pub const MIN_RADIUS_KM: u32 = 1;
pub const MAX_RADIUS_KM: u32 = 50;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 3;
/// Viewing dates run from today through today + this many days.
pub const MAX_DAYS_AHEAD: u64 = 5;

pub const MSG_FILM_REQUIRED: &str = "Please choose a film";
pub const MSG_RADIUS_RANGE: &str = "Radius must be between 1 and 50 km";
pub const MSG_LIMIT_RANGE: &str = "Limit must be between 1 and 3";
pub const MSG_DATE_RANGE: &str = "Viewing date must be within the next 5 days";
pub const MSG_LOCATION_REQUIRED: &str = "Please provide a location to continue";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Film,
    Date,
    Radius,
    Limit,
    Location,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Clone, Debug)]
pub struct SearchForm {
    pub film_name: String,
    pub view_date: NaiveDate,
    pub radius: u32,
    pub limit: u32,
}

impl SearchForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            film_name: String::new(),
            view_date: today,
            radius: MIN_RADIUS_KM,
            limit: MIN_LIMIT,
        }
    }

    pub fn max_view_date(today: NaiveDate) -> NaiveDate {
        today.checked_add_days(Days::new(MAX_DAYS_AHEAD)).unwrap_or(today)
    }

    /// All violations at once, so the UI can show every field-level message.
    /// Empty vec means the form may be submitted.
    pub fn validate(&self, location: Option<GeoPoint>, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.film_name.trim().is_empty() {
            errors.push(FieldError { field: Field::Film, message: MSG_FILM_REQUIRED });
        }
        if self.view_date < today || self.view_date > Self::max_view_date(today) {
            errors.push(FieldError { field: Field::Date, message: MSG_DATE_RANGE });
        }
        if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&self.radius) {
            errors.push(FieldError { field: Field::Radius, message: MSG_RADIUS_RANGE });
        }
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            errors.push(FieldError { field: Field::Limit, message: MSG_LIMIT_RANGE });
        }
        if location.is_none() {
            errors.push(FieldError { field: Field::Location, message: MSG_LOCATION_REQUIRED });
        }

        errors
    }

    pub fn to_request(&self, location: GeoPoint) -> ChooseRequest {
        ChooseRequest {
            film_name: self.film_name.trim().to_string(),
            view_date: self.view_date.format("%Y-%m-%d").to_string(),
            location,
            radius: self.radius,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn here() -> GeoPoint {
        GeoPoint { lat: 10.76, lng: 106.66 }
    }

    fn valid_form() -> SearchForm {
        SearchForm {
            film_name: "Inception".into(),
            view_date: today(),
            radius: 10,
            limit: 2,
        }
    }

    #[test]
    fn valid_form_with_location_passes() {
        assert!(valid_form().validate(Some(here()), today()).is_empty());
    }

    #[test]
    fn missing_location_blocks_even_when_fields_are_valid() {
        let errors = valid_form().validate(None, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Location);
        assert_eq!(errors[0].message, MSG_LOCATION_REQUIRED);
    }

    #[test]
    fn radius_out_of_range_is_field_level() {
        for radius in [0, 51, 200] {
            let mut form = valid_form();
            form.radius = radius;
            let errors = form.validate(Some(here()), today());
            assert!(errors.iter().any(|e| e.field == Field::Radius && e.message == MSG_RADIUS_RANGE));
        }
        for radius in [1, 25, 50] {
            let mut form = valid_form();
            form.radius = radius;
            assert!(form.validate(Some(here()), today()).is_empty());
        }
    }

    #[test]
    fn limit_out_of_range_is_field_level() {
        for limit in [0, 4, 10] {
            let mut form = valid_form();
            form.limit = limit;
            let errors = form.validate(Some(here()), today());
            assert!(errors.iter().any(|e| e.field == Field::Limit && e.message == MSG_LIMIT_RANGE));
        }
    }

    #[test]
    fn date_must_fall_inside_booking_window() {
        let mut form = valid_form();
        form.view_date = today().pred_opt().unwrap();
        assert!(form
            .validate(Some(here()), today())
            .iter()
            .any(|e| e.field == Field::Date));

        form.view_date = today().checked_add_days(Days::new(6)).unwrap();
        assert!(form
            .validate(Some(here()), today())
            .iter()
            .any(|e| e.field == Field::Date));

        form.view_date = SearchForm::max_view_date(today());
        assert!(form.validate(Some(here()), today()).is_empty());
    }

    #[test]
    fn blank_film_name_blocks() {
        let mut form = valid_form();
        form.film_name = "   ".into();
        let errors = form.validate(Some(here()), today());
        assert!(errors.iter().any(|e| e.field == Field::Film));
    }

    #[test]
    fn all_violations_reported_together() {
        let form = SearchForm {
            film_name: String::new(),
            view_date: today().pred_opt().unwrap(),
            radius: 0,
            limit: 9,
        };
        let errors = form.validate(None, today());
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn request_uses_iso_date_and_trimmed_title() {
        let mut form = valid_form();
        form.film_name = "  Inception ".into();
        form.view_date = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let req = form.to_request(here());
        assert_eq!(req.film_name, "Inception");
        assert_eq!(req.view_date, "2026-08-31");
        assert_eq!(req.radius, 10);
        assert_eq!(req.limit, 2);
    }
}
