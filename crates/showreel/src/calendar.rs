//! Booking calendar: "next Tuesday", the month grid and Swedish date names.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Bookable time slots, in display order
pub const TIME_SLOTS: [&str; 6] = ["09:00", "10:00", "11:00", "13:00", "14:00", "15:00"];

/// Index into [`TIME_SLOTS`] that the demo selects
pub const DEFAULT_SLOT_INDEX: usize = 1;

/// Monday-first weekday header
pub const WEEKDAY_HEADER: [&str; 7] = ["Mån", "Tis", "Ons", "Tor", "Fre", "Lör", "Sön"];

const MONTHS_SV: [&str; 12] = [
    "januari",
    "februari",
    "mars",
    "april",
    "maj",
    "juni",
    "juli",
    "augusti",
    "september",
    "oktober",
    "november",
    "december",
];

/// The nearest Tuesday strictly after `today`.
///
/// A Tuesday reference yields the Tuesday one week later, so the result is
/// always 1..=7 days ahead.
#[must_use]
pub fn next_tuesday(today: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(today.weekday().num_days_from_monday());
    let tuesday = i64::from(Weekday::Tue.num_days_from_monday());
    let ahead = match (tuesday - from_monday).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    today + Duration::days(ahead)
}

/// Swedish month name, lowercase
#[must_use]
pub fn month_name_sv(month: u32) -> &'static str {
    MONTHS_SV[((month.clamp(1, 12)) - 1) as usize]
}

/// Swedish weekday name, lowercase
#[must_use]
pub const fn weekday_name_sv(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "måndag",
        Weekday::Tue => "tisdag",
        Weekday::Wed => "onsdag",
        Weekday::Thu => "torsdag",
        Weekday::Fri => "fredag",
        Weekday::Sat => "lördag",
        Weekday::Sun => "söndag",
    }
}

/// Long Swedish date, e.g. "tisdag 14 maj 2024"
#[must_use]
pub fn format_long_sv(date: NaiveDate) -> String {
    format!(
        "{} {} {} {}",
        weekday_name_sv(date.weekday()),
        date.day(),
        month_name_sv(date.month()),
        date.year()
    )
}

/// Number of days in the month containing `date`
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

/// A single cell in the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Day of month
    pub day: u32,
    /// Pre-selected by the demo
    pub selected: bool,
    /// In the past relative to the reference date
    pub disabled: bool,
}

/// Month grid shown on the date step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    /// Year
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
    /// Swedish month name
    pub month_name: String,
    /// Empty cells before day 1 (Monday-first)
    pub leading_blanks: u32,
    /// Days of the month
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Build the grid for the month containing `selected`, disabling days
    /// before `today`
    #[must_use]
    pub fn build(today: NaiveDate, selected: NaiveDate) -> Self {
        let leading_blanks = selected
            .with_day(1)
            .map_or(0, |first| first.weekday().num_days_from_monday());

        let days = (1..=days_in_month(selected))
            .map(|day| {
                let date = selected.with_day(day);
                CalendarDay {
                    day,
                    selected: day == selected.day(),
                    disabled: date.is_some_and(|d| d < today),
                }
            })
            .collect();

        Self {
            year: selected.year(),
            month: selected.month(),
            month_name: month_name_sv(selected.month()).to_string(),
            leading_blanks,
            days,
        }
    }

    /// Grid for the next-Tuesday booking seen from `today`
    #[must_use]
    pub fn for_booking(today: NaiveDate) -> Self {
        Self::build(today, next_tuesday(today))
    }

    /// Header line, e.g. "maj 2024"
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.month_name, self.year)
    }

    /// The pre-selected day, if any
    #[must_use]
    pub fn selected_day(&self) -> Option<u32> {
        self.days.iter().find(|d| d.selected).map(|d| d.day)
    }

    /// Render as a plain-text grid with the selected day in brackets
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = format!("{:^35}\n", self.title());
        for name in WEEKDAY_HEADER {
            out.push_str(&format!("{name:>5}"));
        }
        out.push('\n');

        let mut column = 0;
        for _ in 0..self.leading_blanks {
            out.push_str("     ");
            column += 1;
        }
        for day in &self.days {
            let cell = if day.selected {
                format!("[{}]", day.day)
            } else if day.disabled {
                format!("({})", day.day)
            } else {
                day.day.to_string()
            };
            out.push_str(&format!("{cell:>5}"));
            column += 1;
            if column % 7 == 0 {
                out.push('\n');
            }
        }
        if column % 7 != 0 {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod next_tuesday_tests {
        use super::*;

        #[test]
        fn test_from_monday() {
            // 2024-05-13 is a Monday
            assert_eq!(next_tuesday(date(2024, 5, 13)), date(2024, 5, 14));
        }

        #[test]
        fn test_from_tuesday_is_next_week() {
            assert_eq!(next_tuesday(date(2024, 5, 14)), date(2024, 5, 21));
        }

        #[test]
        fn test_from_wednesday() {
            assert_eq!(next_tuesday(date(2024, 5, 15)), date(2024, 5, 21));
        }

        #[test]
        fn test_across_year_boundary() {
            // 2025-12-31 is a Wednesday
            assert_eq!(next_tuesday(date(2025, 12, 31)), date(2026, 1, 6));
        }

        proptest! {
            #[test]
            fn prop_next_tuesday_in_future_within_week(days in 0i64..100_000) {
                let today = date(1970, 1, 1) + Duration::days(days);
                let next = next_tuesday(today);
                prop_assert_eq!(next.weekday(), Weekday::Tue);
                prop_assert!(next > today);
                prop_assert!((next - today).num_days() <= 7);
            }
        }
    }

    mod names_tests {
        use super::*;

        #[test]
        fn test_month_names() {
            assert_eq!(month_name_sv(1), "januari");
            assert_eq!(month_name_sv(5), "maj");
            assert_eq!(month_name_sv(12), "december");
        }

        #[test]
        fn test_long_format() {
            assert_eq!(format_long_sv(date(2024, 5, 14)), "tisdag 14 maj 2024");
        }

        #[test]
        fn test_days_in_month() {
            assert_eq!(days_in_month(date(2024, 2, 10)), 29);
            assert_eq!(days_in_month(date(2023, 2, 10)), 28);
            assert_eq!(days_in_month(date(2024, 12, 1)), 31);
            assert_eq!(days_in_month(date(2024, 4, 30)), 30);
        }
    }

    mod grid_tests {
        use super::*;

        #[test]
        fn test_booking_grid() {
            let grid = CalendarMonth::for_booking(date(2024, 5, 13));
            assert_eq!(grid.title(), "maj 2024");
            assert_eq!(grid.selected_day(), Some(14));
            // 2024-05-01 is a Wednesday
            assert_eq!(grid.leading_blanks, 2);
            assert_eq!(grid.days.len(), 31);
            assert!(grid.days[11].disabled);
            assert!(!grid.days[12].disabled);
        }

        #[test]
        fn test_grid_rolls_into_next_month() {
            // 2024-05-29 is a Wednesday; next Tuesday is June 4th
            let grid = CalendarMonth::for_booking(date(2024, 5, 29));
            assert_eq!(grid.month, 6);
            assert_eq!(grid.selected_day(), Some(4));
            assert!(grid.days.iter().all(|d| !d.disabled));
        }

        #[test]
        fn test_render_text_marks_selection() {
            let grid = CalendarMonth::for_booking(date(2024, 5, 13));
            let text = grid.render_text();
            assert!(text.contains("maj 2024"));
            assert!(text.contains("[14]"));
            assert!(text.contains("Mån"));
            assert!(text.contains("(12)"));
        }

        #[test]
        fn test_time_slots() {
            assert_eq!(TIME_SLOTS[DEFAULT_SLOT_INDEX], "10:00");
            assert_eq!(TIME_SLOTS.len(), 6);
        }
    }
}
