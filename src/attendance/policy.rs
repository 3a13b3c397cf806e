use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

/// Format used for the displayed punch time, e.g. `05:00:00 PM`.
pub const LOCAL_TIME_FORMAT: &str = "%I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum PunchAction {
    #[serde(rename = "Punch In")]
    #[strum(serialize = "Punch In")]
    PunchIn,
    #[serde(rename = "Punch Out")]
    #[strum(serialize = "Punch Out")]
    PunchOut,
}

impl PunchAction {
    pub fn presence(self) -> bool {
        matches!(self, PunchAction::PunchIn)
    }
}

/// The most recent punch stored for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPunch {
    pub presence: bool,
    pub occurred_at: DateTime<Utc>,
}

/// What the store is about to write for a submitted punch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPunch {
    pub action: PunchAction,
    pub missed_out_hint: bool,
    pub local_time: String,
}

/// Each punch toggles presence; a worker with no history punches in.
pub fn next_action(last: Option<&LastPunch>) -> PunchAction {
    match last {
        Some(last) if last.presence => PunchAction::PunchOut,
        _ => PunchAction::PunchIn,
    }
}

/// `Err` carries how long the worker still has to wait.
pub fn check_interval(
    last: Option<&LastPunch>,
    now: DateTime<Utc>,
    min_interval: Duration,
) -> Result<(), Duration> {
    let Some(last) = last else {
        return Ok(());
    };

    let elapsed = now - last.occurred_at;
    if elapsed >= min_interval {
        return Ok(());
    }

    Err((min_interval - elapsed).min(min_interval))
}

/// An out-punch closing a punch in from an earlier local day is a forgotten
/// punch out, and is stored flagged.
pub fn missed_out_hint(last: Option<&LastPunch>, now: DateTime<Utc>, offset: FixedOffset) -> bool {
    match last {
        Some(last) if last.presence => {
            last.occurred_at.with_timezone(&offset).date_naive() < now.with_timezone(&offset).date_naive()
        }
        _ => false,
    }
}

pub fn format_local_time(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format(LOCAL_TIME_FORMAT).to_string()
}

pub fn plan_punch(
    last: Option<&LastPunch>,
    now: DateTime<Utc>,
    offset: FixedOffset,
    min_interval: Duration,
) -> Result<PlannedPunch, Duration> {
    check_interval(last, now, min_interval)?;

    let action = next_action(last);
    Ok(PlannedPunch {
        action,
        missed_out_hint: action == PunchAction::PunchOut && missed_out_hint(last, now, offset),
        local_time: format_local_time(now, offset),
    })
}
