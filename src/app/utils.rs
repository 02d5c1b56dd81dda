// src/app/utils.rs
use chrono::NaiveDate;

/// External ticketing page for a cinema.
pub fn ticket_url(slug: &str) -> String {
    format!("https://moveek.com/rap/{slug}/")
}

/// Human-facing date for the form row, e.g. "Sun 30 Aug 2026".
pub fn format_date_label(d: NaiveDate) -> String {
    d.format("%a %-d %b %Y").to_string()
}

pub fn format_km(distance: f64) -> String {
    format!("{distance:.1} km")
}

pub fn format_minutes(duration: f64) -> String {
    format!("{} min", duration.round() as i64)
}

pub fn format_film_runtime(minutes: u32) -> String {
    format!("{minutes} min")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_url_embeds_slug() {
        assert_eq!(
            ticket_url("cgv-crescent-mall"),
            "https://moveek.com/rap/cgv-crescent-mall/"
        );
    }

    #[test]
    fn distance_and_duration_labels() {
        assert_eq!(format_km(3.42), "3.4 km");
        assert_eq!(format_minutes(17.6), "18 min");
        assert_eq!(format_film_runtime(148), "148 min");
    }

    #[test]
    fn date_label_is_compact() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(format_date_label(d), "Sun 30 Aug 2026");
    }
}
