/// Seconds since midnight for a 12-hour clock string such as `"05:30:00 PM"`.
///
/// Never fails: missing or non-numeric components count as zero, so a
/// garbage string simply yields `0`.
pub fn parse_clock_time(s: &str) -> i64 {
    let mut parts = s.trim().split(' ');
    let time = parts.next().unwrap_or_default();
    let meridiem = parts.next().unwrap_or_default();

    if time.is_empty() {
        return 0;
    }

    let mut components = time.split(':').map(|c| c.parse::<i64>().unwrap_or(0));
    let mut hours = components.next().unwrap_or(0);
    let minutes = components.next().unwrap_or(0);
    let seconds = components.next().unwrap_or(0);

    if meridiem.eq_ignore_ascii_case("PM") && hours != 12 {
        hours = match hours.checked_add(12) {
            Some(h) => h,
            None => return 0,
        };
    } else if meridiem.eq_ignore_ascii_case("AM") && hours == 12 {
        hours = 0;
    }

    // out-of-range components are as malformed as non-numeric ones
    hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|hm| hm.checked_add(seconds))
        .unwrap_or(0)
}

/// `HH:MM:SS`, clamped to `"00:00:00"` for negative totals.
pub fn format_duration(total_seconds: i64) -> String {
    if total_seconds < 0 {
        return "00:00:00".to_string();
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
