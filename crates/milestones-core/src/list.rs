//! Search, day grouping and day labels for the milestone list.
//!
//! Input order is preserved everywhere. The store hands milestones over
//! newest-first, so groups come out newest-first without re-sorting rows.

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::milestone::Milestone;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Milestones created on the same calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub milestones: Vec<Milestone>,
}

/// Keep milestones whose title or notes contain `query`, ignoring case.
///
/// An empty query returns the input untouched.
pub fn filter(all: Vec<Milestone>, query: &str) -> Vec<Milestone> {
    if query.is_empty() {
        return all;
    }
    let needle = query.to_lowercase();
    all.into_iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&needle) || m.notes.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Group by the local calendar day of `created_at`.
pub fn group(filtered: Vec<Milestone>) -> Vec<DayGroup> {
    group_in(filtered, &Local)
}

/// Group by the calendar day of `created_at` in `tz`, most recent day first.
pub fn group_in<Tz: TimeZone>(filtered: Vec<Milestone>, tz: &Tz) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for milestone in filtered {
        let day = milestone.created_at.with_timezone(tz).date_naive();
        match groups.iter_mut().find(|g| g.day == day) {
            Some(existing) => existing.milestones.push(milestone),
            None => groups.push(DayGroup {
                day,
                milestones: vec![milestone],
            }),
        }
    }
    // Stable, so rows inside each group keep their input order.
    groups.sort_by(|a, b| b.day.cmp(&a.day));
    groups
}

/// Section heading for `day` as seen from `today`.
pub fn label_for_day(day: NaiveDate, today: NaiveDate) -> String {
    label_for_day_with(day, today, DEFAULT_DATE_FORMAT)
}

pub fn label_for_day_with(day: NaiveDate, today: NaiveDate, date_format: &str) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format(date_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn milestone(title: &str, notes: &str, created_at: DateTime<Utc>) -> Milestone {
        Milestone::new(title, notes, created_at + Duration::hours(1), created_at)
    }

    #[test]
    fn empty_query_is_identity() {
        let all = vec![
            milestone("b", "", at(2, 9)),
            milestone("a", "", at(1, 9)),
        ];
        assert_eq!(filter(all.clone(), ""), all);
    }

    #[test]
    fn filter_matches_title_or_notes_ignoring_case() {
        let all = vec![
            milestone("Gym", "", at(3, 9)),
            milestone("Dentist", "bring GYM bag", at(2, 9)),
            milestone("Flight", "window seat", at(1, 9)),
        ];
        let titles: Vec<_> = filter(all, "gym").into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Gym", "Dentist"]);
    }

    #[test]
    fn filter_folds_non_ascii_case() {
        let all = vec![milestone("Ärztin", "", at(1, 9))];
        assert_eq!(filter(all, "ärz").len(), 1);
    }

    #[test]
    fn filter_with_no_match_is_empty() {
        let all = vec![milestone("Gym", "", at(1, 9))];
        assert!(filter(all, "swim").is_empty());
    }

    #[test]
    fn groups_are_newest_day_first() {
        let input = vec![
            milestone("d-2", "", at(8, 10)),
            milestone("d", "", at(10, 10)),
            milestone("d-1", "", at(9, 10)),
        ];
        let days: Vec<_> = group_in(input, &Utc).into_iter().map(|g| g.day).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
            ]
        );
    }

    #[test]
    fn rows_keep_input_order_within_a_day() {
        let input = vec![
            milestone("late", "", at(10, 20)),
            milestone("early", "", at(10, 8)),
        ];
        let groups = group_in(input, &Utc);
        assert_eq!(groups.len(), 1);
        let titles: Vec<_> = groups[0].milestones.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["late", "early"]);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_in(Vec::new(), &Utc).is_empty());
    }

    #[test]
    fn labels_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(label_for_day(today, today), "Today");
        assert_eq!(
            label_for_day(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            label_for_day(NaiveDate::from_ymd_opt(2023, 12, 30).unwrap(), today),
            "2023-12-30"
        );
        // A future day is not "Yesterday".
        assert_eq!(
            label_for_day(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), today),
            "2024-01-02"
        );
    }

    #[test]
    fn custom_date_format() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(label_for_day_with(day, today, "%d/%m/%Y"), "03/01/2024");
    }

    proptest! {
        #[test]
        fn grouping_is_exhaustive_and_disjoint(hours in proptest::collection::vec(0i64..24 * 30, 0..40)) {
            let base = at(1, 0);
            let input: Vec<_> = hours
                .iter()
                .enumerate()
                .map(|(i, h)| milestone(&format!("m{i}"), "", base + Duration::hours(*h)))
                .collect();
            let groups = group_in(input.clone(), &Utc);

            let total: usize = groups.iter().map(|g| g.milestones.len()).sum();
            prop_assert_eq!(total, input.len());
            for g in &groups {
                for m in &g.milestones {
                    prop_assert_eq!(m.created_at.date_naive(), g.day);
                }
            }
            for pair in groups.windows(2) {
                prop_assert!(pair[0].day > pair[1].day);
            }
        }
    }
}
