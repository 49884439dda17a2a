use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::{convert::Infallible, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub i64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Category of a logged activity.
///
/// Values outside the known set are kept as [`ActivityType::Unrecognized`] so
/// they survive a load/persist cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Eating,
    Sleeping,
    Playing,
    Grooming,
    LitterBox,
    Exploring,
    Socializing,
    Other,
    Unrecognized(String),
}

impl ActivityType {
    pub const KNOWN: [ActivityType; 8] = [
        ActivityType::Eating,
        ActivityType::Sleeping,
        ActivityType::Playing,
        ActivityType::Grooming,
        ActivityType::LitterBox,
        ActivityType::Exploring,
        ActivityType::Socializing,
        ActivityType::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Eating => "eating",
            Self::Sleeping => "sleeping",
            Self::Playing => "playing",
            Self::Grooming => "grooming",
            Self::LitterBox => "litter-box",
            Self::Exploring => "exploring",
            Self::Socializing => "socializing",
            Self::Other => "other",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Reads a type typed or picked by a user. Surrounding whitespace is
    /// ignored; a blank value is no type at all.
    pub fn from_input(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self::from(trimmed.to_string()))
    }
}

impl FromStr for ActivityType {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value.to_string()))
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "eating" => Self::Eating,
            "sleeping" => Self::Sleeping,
            "playing" => Self::Playing,
            "grooming" => Self::Grooming,
            "litter-box" => Self::LitterBox,
            "exploring" => Self::Exploring,
            "socializing" => Self::Socializing,
            "other" => Self::Other,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        match value {
            ActivityType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged activity, in the shape it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    #[serde(rename = "time", with = "form_time")]
    pub occurred_at: NaiveDateTime,
    #[serde(default, deserialize_with = "nullable_string")]
    pub notes: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn notes(&self) -> Option<&str> {
        let trimmed = self.notes.trim();
        (!trimmed.is_empty()).then_some(self.notes.as_str())
    }
}

/// User input for a new record; id and creation time are assigned by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewActivity {
    #[serde(rename = "type", deserialize_with = "required_type")]
    pub kind: ActivityType,
    #[serde(rename = "time", with = "form_time")]
    pub occurred_at: NaiveDateTime,
    #[serde(default, deserialize_with = "nullable_string")]
    pub notes: String,
}

fn required_type<'de, D>(deserializer: D) -> Result<ActivityType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    ActivityType::from_input(&raw).ok_or_else(|| D::Error::custom("activity type is required"))
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Datetime strings as produced by a `datetime-local` form field.
pub mod form_time {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parses a form datetime. Values carrying an offset are converted to
    /// local wall-clock time; a bare date means its local midnight.
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
            return Some(with_offset.with_timezone(&Local).naive_local());
        }
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .map(|day| day.and_time(NaiveTime::MIN))
            })
    }

    pub fn format(value: &NaiveDateTime) -> String {
        if value.second() == 0 && value.nanosecond() == 0 {
            value.format("%Y-%m-%dT%H:%M").to_string()
        } else {
            value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
        }
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid activity time: {raw:?}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(rename = "type", alias = "activityType")]
    pub kind: String,
    #[serde(alias = "activityTime")]
    pub time: String,
    #[serde(default, alias = "activityNotes")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityView {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub time: String,
    pub time_display: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: ActivityId,
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TypeCountPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub start_date: String,
    pub end_date: String,
    pub total: usize,
    pub type_counts: Vec<TypeCountPoint>,
    pub hour_counts: Vec<u64>,
    pub most_active_hour: usize,
    pub most_active_time: String,
    pub favorite_type: Option<String>,
    pub favorite_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn activity_type_accepts_known_and_keeps_unknown() {
        assert_eq!("litter-box".parse::<ActivityType>().unwrap(), ActivityType::LitterBox);
        assert_eq!("other".parse::<ActivityType>().unwrap(), ActivityType::Other);

        let unknown: ActivityType = "zoomies".parse().unwrap();
        assert_eq!(unknown, ActivityType::Unrecognized("zoomies".into()));
        assert_eq!(String::from(unknown), "zoomies");
    }

    #[test]
    fn record_serializes_with_stored_field_names() {
        let record = ActivityRecord {
            id: ActivityId(1704096000000),
            kind: ActivityType::LitterBox,
            occurred_at: at(8, 0),
            notes: "quick visit".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 1, 0).unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 1704096000000i64);
        assert_eq!(value["type"], "litter-box");
        assert_eq!(value["time"], "2024-01-01T08:00");
        assert_eq!(value["notes"], "quick visit");
        assert_eq!(value["timestamp"], "2024-01-01T08:01:00Z");
    }

    #[test]
    fn record_accepts_browser_shapes() {
        let raw = r#"{
            "id": 1,
            "type": "napping-in-box",
            "time": "2024-01-01T20:15:30",
            "notes": null,
            "timestamp": "2024-01-01T20:16:00.000Z"
        }"#;
        let record: ActivityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.kind, ActivityType::Unrecognized("napping-in-box".into()));
        assert_eq!(record.occurred_at, at(20, 15).with_second(30).unwrap());
        assert_eq!(record.notes, "");
        assert_eq!(record.notes(), None);
    }

    #[test]
    fn form_time_parses_minute_and_second_precision() {
        assert_eq!(form_time::parse("2024-01-01T08:30"), Some(at(8, 30)));
        assert_eq!(form_time::parse(" 2024-01-01 08:30 "), Some(at(8, 30)));
        assert_eq!(
            form_time::parse("2024-01-01T08:30:15"),
            Some(at(8, 30).with_second(15).unwrap())
        );
        assert_eq!(form_time::parse("2024-01-01"), Some(at(0, 0)));
        assert_eq!(form_time::parse("yesterday"), None);
        assert_eq!(form_time::parse(""), None);
    }

    #[test]
    fn new_activity_trims_type_and_rejects_blank() {
        let new: NewActivity = serde_json::from_value(serde_json::json!({
            "type": " eating ",
            "time": "2024-01-01T08:30"
        }))
        .unwrap();
        assert_eq!(new.kind, ActivityType::Eating);
        assert_eq!(new.notes, "");

        for blank in ["", "   "] {
            let err = serde_json::from_value::<NewActivity>(serde_json::json!({
                "type": blank,
                "time": "2024-01-01T08:30"
            }))
            .unwrap_err();
            assert!(err.to_string().contains("activity type is required"));
        }

        assert_eq!(ActivityType::from_input("  "), None);
        assert_eq!(
            ActivityType::from_input(" zoomies "),
            Some(ActivityType::Unrecognized("zoomies".into()))
        );
    }

    #[test]
    fn form_time_format_drops_zero_seconds() {
        assert_eq!(form_time::format(&at(8, 30)), "2024-01-01T08:30");
        assert_eq!(
            form_time::format(&at(8, 30).with_second(5).unwrap()),
            "2024-01-01T08:30:05"
        );
    }
}
