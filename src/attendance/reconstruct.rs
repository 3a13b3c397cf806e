use std::collections::HashMap;

use chrono::NaiveDate;

use crate::attendance::clock::{format_duration, parse_clock_time};
use crate::model::day_aggregate::{DayAggregate, TimeEntry};
use crate::model::punch::PunchRecord;

/// Out-entry appended when a day ends with an unmatched punch in.
const MISSING_OUT: &str = "-";

struct DayGroup<'a> {
    identity: &'a str,
    date: NaiveDate,
    punches: Vec<&'a PunchRecord>,
}

/// Rebuild per-identity, per-day attendance from an unordered list of punches.
///
/// Punches are bucketed by identity and the UTC date of `occurred_at`, replayed
/// in `occurred_at` order and paired in/out on their displayed clock times.
/// Out-punches that cannot close an open punch in are flagged as missed, and
/// a day that ends while still clocked in gets a synthetic `"-"` out-entry.
/// Days are returned most recently active first.
pub fn reconstruct(punches: &[PunchRecord]) -> Vec<DayAggregate> {
    let mut groups: Vec<DayGroup<'_>> = Vec::new();
    let mut index: HashMap<(&str, NaiveDate), usize> = HashMap::new();

    for punch in punches {
        let identity = punch.identity_key();
        let date = punch.occurred_at.date_naive();

        let slot = *index.entry((identity, date)).or_insert_with(|| {
            groups.push(DayGroup {
                identity,
                date,
                punches: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].punches.push(punch);
    }

    let mut days: Vec<DayAggregate> = groups.into_iter().map(replay_day).collect();

    // stable: equal timestamps keep first-seen order
    days.sort_by(|a, b| b.latest_timestamp.cmp(&a.latest_timestamp));
    days
}

fn replay_day(group: DayGroup<'_>) -> DayAggregate {
    let DayGroup {
        identity,
        date,
        mut punches,
    } = group;

    // display fields come from the first punch seen for this day
    let first = punches[0];
    let name = first.name.clone();
    let department_name = first.department_name.clone();
    let photo = first.photo.clone();

    punches.sort_by_key(|p| p.occurred_at);
    let latest_timestamp = punches[punches.len() - 1].occurred_at;

    let mut in_times = Vec::new();
    let mut out_times = Vec::new();
    let mut open_in: Option<i64> = None;
    let mut total_seconds: i64 = 0;

    for punch in punches {
        let seconds = parse_clock_time(&punch.local_time);

        if punch.presence {
            // a second punch in replaces the open one, which is never paired
            open_in = Some(seconds);
            in_times.push(TimeEntry::new(punch.local_time.as_str(), false));
            continue;
        }

        match open_in {
            Some(opened) if seconds > opened => {
                total_seconds = total_seconds.saturating_add(seconds.saturating_sub(opened));
                open_in = None;
                out_times.push(TimeEntry::new(punch.local_time.as_str(), punch.missed_out_hint));
            }
            // no open punch in, or the out is not after it: flag, keep whatever is open
            _ => out_times.push(TimeEntry::new(punch.local_time.as_str(), true)),
        }
    }

    if open_in.is_some() {
        out_times.push(TimeEntry::new(MISSING_OUT, true));
    }

    DayAggregate {
        identity: identity.to_string(),
        date,
        in_times,
        out_times,
        duration: format_duration(total_seconds),
        latest_timestamp,
        name,
        department_name,
        photo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::punch::PunchSource;
    use chrono::{DateTime, Utc};

    fn punch(identity: &str, occurred_at: &str, local_time: &str, presence: bool) -> PunchRecord {
        PunchRecord {
            id: 0,
            subdomain: "acme".into(),
            identity: Some(identity.into()),
            occurred_at: occurred_at.parse::<DateTime<Utc>>().unwrap(),
            local_time: local_time.into(),
            presence,
            missed_out_hint: false,
            source: PunchSource::Rfid,
            name: Some(format!("Worker {identity}")),
            department_name: Some("Assembly".into()),
            photo: None,
        }
    }

    fn entry(time: &str, is_missed: bool) -> TimeEntry {
        TimeEntry::new(time, is_missed)
    }

    #[test]
    fn single_pair_yields_worked_duration() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T17:00:00Z", "05:00:00 PM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.identity, "E1");
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(day.in_times, vec![entry("09:00:00 AM", false)]);
        assert_eq!(day.out_times, vec![entry("05:00:00 PM", false)]);
        assert_eq!(day.duration, "08:00:00");
    }

    #[test]
    fn input_order_does_not_matter() {
        let punches = vec![
            punch("E1", "2024-01-10T17:00:00Z", "05:00:00 PM", false),
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days[0].out_times, vec![entry("05:00:00 PM", false)]);
        assert_eq!(days[0].duration, "08:00:00");
    }

    #[test]
    fn out_before_in_clock_is_flagged_and_leaves_in_open() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T09:30:00Z", "08:00:00 AM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(
            days[0].out_times,
            vec![entry("08:00:00 AM", true), entry("-", true)]
        );
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn same_second_out_does_not_pair() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T09:00:01Z", "09:00:00 AM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(
            days[0].out_times,
            vec![entry("09:00:00 AM", true), entry("-", true)]
        );
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn rejected_out_lets_a_later_out_close_the_day() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T09:10:00Z", "08:00:00 AM", false),
            punch("E1", "2024-01-10T12:00:00Z", "12:00:00 PM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(
            days[0].out_times,
            vec![entry("08:00:00 AM", true), entry("12:00:00 PM", false)]
        );
        assert_eq!(days[0].duration, "03:00:00");
    }

    #[test]
    fn trailing_in_gets_synthetic_missed_out() {
        let punches = vec![punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true)];
        let days = reconstruct(&punches);

        assert_eq!(days[0].in_times, vec![entry("09:00:00 AM", false)]);
        assert_eq!(days[0].out_times, vec![entry("-", true)]);
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn consecutive_ins_only_latest_pairs() {
        let punches = vec![
            punch("E1", "2024-01-10T08:00:00Z", "08:00:00 AM", true),
            punch("E1", "2024-01-10T10:00:00Z", "10:00:00 AM", true),
            punch("E1", "2024-01-10T12:00:00Z", "12:00:00 PM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(
            days[0].in_times,
            vec![entry("08:00:00 AM", false), entry("10:00:00 AM", false)]
        );
        assert_eq!(days[0].out_times, vec![entry("12:00:00 PM", false)]);
        assert_eq!(days[0].duration, "02:00:00");
    }

    #[test]
    fn out_without_in_is_missed() {
        let punches = vec![punch("E1", "2024-01-10T17:00:00Z", "05:00:00 PM", false)];
        let days = reconstruct(&punches);

        assert!(days[0].in_times.is_empty());
        assert_eq!(days[0].out_times, vec![entry("05:00:00 PM", true)]);
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn upstream_hint_is_kept_on_valid_pair() {
        let mut out = punch("E1", "2024-01-10T17:00:00Z", "05:00:00 PM", false);
        out.missed_out_hint = true;
        let punches = vec![punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true), out];
        let days = reconstruct(&punches);

        assert_eq!(days[0].out_times, vec![entry("05:00:00 PM", true)]);
        assert_eq!(days[0].duration, "08:00:00");
    }

    #[test]
    fn multiple_pairs_accumulate() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T12:00:00Z", "12:00:00 PM", false),
            punch("E1", "2024-01-10T13:00:00Z", "01:00:00 PM", true),
            punch("E1", "2024-01-10T17:30:15Z", "05:30:15 PM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days[0].duration, "07:30:15");
        assert!(days[0].out_times.iter().all(|t| !t.is_missed));
    }

    #[test]
    fn malformed_clock_strings_never_panic() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "garbage", true),
            punch("E1", "2024-01-10T17:00:00Z", "", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days[0].out_times, vec![entry("", true), entry("-", true)]);
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn groups_by_identity_and_utc_date() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E2", "2024-01-10T09:05:00Z", "09:05:00 AM", true),
            punch("E1", "2024-01-11T09:00:00Z", "09:00:00 AM", true),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days.len(), 3);
        let keys: Vec<_> = days.iter().map(|d| (d.identity.as_str(), d.date.to_string())).collect();
        assert!(keys.contains(&("E1", "2024-01-10".to_string())));
        assert!(keys.contains(&("E2", "2024-01-10".to_string())));
        assert!(keys.contains(&("E1", "2024-01-11".to_string())));
    }

    #[test]
    fn unknown_identities_share_a_group_per_day() {
        let mut a = punch("", "2024-01-10T09:00:00Z", "09:00:00 AM", true);
        a.identity = None;
        let b = punch("", "2024-01-10T10:00:00Z", "10:00:00 AM", false);
        let days = reconstruct(&[a, b]);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].identity, "Unknown");
        assert_eq!(days[0].duration, "01:00:00");
    }

    #[test]
    fn output_is_most_recent_first() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E2", "2024-01-10T11:00:00Z", "11:00:00 AM", true),
            punch("E3", "2024-01-09T23:00:00Z", "11:00:00 PM", true),
            punch("E1", "2024-01-10T12:00:00Z", "12:00:00 PM", false),
        ];
        let days = reconstruct(&punches);

        let order: Vec<_> = days.iter().map(|d| d.identity.as_str()).collect();
        assert_eq!(order, vec!["E1", "E2", "E3"]);
        assert!(days.windows(2).all(|w| w[0].latest_timestamp >= w[1].latest_timestamp));
    }

    #[test]
    fn display_fields_come_from_first_seen_punch() {
        let mut first = punch("E1", "2024-01-10T17:00:00Z", "05:00:00 PM", false);
        first.name = Some("Jane".into());
        let mut second = punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true);
        second.name = Some("Janet".into());
        let days = reconstruct(&[first, second]);

        assert_eq!(days[0].name.as_deref(), Some("Jane"));
    }

    #[test]
    fn extreme_clock_strings_never_panic() {
        let garbage = [
            "9999999999999999:00:00 PM",
            "0:0:9223372036854775807 PM",
            "-9223372036854775808:00:00 AM",
            "-1:00:00 PM",
            "12:60:99",
            "   09:00:00    AM   ",
            "٠٩:٠٠:٠٠ م",
            "午前9時",
            ":::: PM",
            "",
        ];

        for in_time in garbage {
            for out_time in garbage {
                let punches = vec![
                    punch("E1", "2024-01-10T09:00:00Z", in_time, true),
                    punch("E1", "2024-01-10T17:00:00Z", out_time, false),
                ];
                let days = reconstruct(&punches);

                assert_eq!(days.len(), 1);
                assert_eq!(days[0].in_times.len(), 1);
                assert!(!days[0].out_times.is_empty());
            }
        }
    }

    #[test]
    fn overflowing_out_time_is_flagged_not_paired() {
        let punches = vec![
            punch("E1", "2024-01-10T09:00:00Z", "09:00:00 AM", true),
            punch("E1", "2024-01-10T17:00:00Z", "0:0:9223372036854775807 PM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(
            days[0].out_times,
            vec![entry("0:0:9223372036854775807 PM", true), entry("-", true)]
        );
        assert_eq!(days[0].duration, "00:00:00");
    }

    #[test]
    fn huge_durations_saturate_instead_of_wrapping() {
        let max = i64::MAX.to_string();
        let out_time = format!("0:0:{max}");
        let punches = vec![
            punch("E1", "2024-01-10T01:00:00Z", "0:0:0", true),
            punch("E1", "2024-01-10T02:00:00Z", &out_time, false),
            punch("E1", "2024-01-10T03:00:00Z", "0:0:0", true),
            punch("E1", "2024-01-10T04:00:00Z", &out_time, false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days[0].duration, format_duration(i64::MAX));
        assert!(days[0].out_times.iter().all(|t| !t.is_missed));
    }

    #[test]
    fn utc_midnight_splits_days() {
        let punches = vec![
            punch("E1", "2024-01-10T23:59:59Z", "11:59:59 PM", true),
            punch("E1", "2024-01-11T00:00:00Z", "12:00:00 AM", true),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn overnight_shift_leaves_both_days_flagged() {
        let punches = vec![
            punch("E1", "2024-01-10T23:00:00Z", "11:00:00 PM", true),
            punch("E1", "2024-01-11T01:00:00Z", "01:00:00 AM", false),
        ];
        let days = reconstruct(&punches);

        assert_eq!(days.len(), 2);

        let next_day = &days[0];
        assert_eq!(next_day.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert!(next_day.in_times.is_empty());
        assert_eq!(next_day.out_times, vec![entry("01:00:00 AM", true)]);
        assert_eq!(next_day.duration, "00:00:00");

        let first_day = &days[1];
        assert_eq!(first_day.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(first_day.in_times, vec![entry("11:00:00 PM", false)]);
        assert_eq!(first_day.out_times, vec![entry("-", true)]);
        assert_eq!(first_day.duration, "00:00:00");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(reconstruct(&[]).is_empty());
    }
}
