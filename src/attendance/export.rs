use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::model::day_aggregate::{DayAggregate, TimeEntry};

const HEADERS: [&str; 7] = [
    "Name",
    "Employee ID (RFID)",
    "Department",
    "Date",
    "In Times",
    "Out Times",
    "Duration",
];

const UNKNOWN: &str = "Unknown";

pub fn report_filename(today: NaiveDate) -> String {
    format!("Attendance_Report_{}.csv", today.format("%Y-%m-%d"))
}

/// Render a report as CSV. Fields containing a comma, quote, newline or
/// carriage return are quoted with embedded quotes doubled; rows end in `\n`.
pub fn export_csv(days: &[DayAggregate]) -> Result<String, csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for day in days {
        let date = day.date.format("%Y-%m-%d").to_string();
        let in_times = join_times(&day.in_times);
        let out_times = join_times(&day.out_times);

        writer.write_record([
            or_unknown(day.name.as_deref()),
            or_unknown(Some(day.identity.as_str())),
            or_unknown(day.department_name.as_deref()),
            date.as_str(),
            in_times.as_str(),
            out_times.as_str(),
            day.duration.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn or_unknown(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN)
}

fn join_times(entries: &[TimeEntry]) -> String {
    entries
        .iter()
        .map(|e| e.time.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}
