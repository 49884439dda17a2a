use crate::models::{ActivityRecord, ActivityType, ActivityView};
use crate::models::form_time;
use chrono::NaiveDateTime;

pub const EMPTY_MARKER: &str = "-";

pub fn activity_label(kind: &ActivityType) -> &str {
    match kind {
        ActivityType::Eating => "🍽️ Eating",
        ActivityType::Sleeping => "😴 Sleeping",
        ActivityType::Playing => "🎾 Playing",
        ActivityType::Grooming => "🪮 Grooming",
        ActivityType::LitterBox => "🚽 Litter Box",
        ActivityType::Exploring => "🔍 Exploring",
        ActivityType::Socializing => "👥 Socializing",
        ActivityType::Other => "📝 Other",
        ActivityType::Unrecognized(raw) => raw,
    }
}

/// `0` -> "12 AM", `12` -> "12 PM", `15` -> "3 PM".
pub fn hour_label(hour: usize) -> String {
    match hour % 24 {
        0 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h < 12 => format!("{h} AM"),
        h => format!("{} PM", h - 12),
    }
}

pub fn occurred_label(time: &NaiveDateTime) -> String {
    time.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

pub fn activity_view(record: &ActivityRecord) -> ActivityView {
    ActivityView {
        id: record.id,
        kind: record.kind.as_str().to_string(),
        label: activity_label(&record.kind).to_string(),
        time: form_time::format(&record.occurred_at),
        time_display: occurred_label(&record.occurred_at),
        notes: record.notes().map(str::to_string),
        timestamp: record.created_at,
    }
}
