use crate::display::{EMPTY_MARKER, activity_label, hour_label};
use crate::models::{ActivityRecord, ActivityType, StatsResponse, TypeCountPoint};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const HOURS_PER_DAY: usize = 24;

/// Inclusive date window, `start 00:00:00` through `end 23:59:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The week ending today.
    pub fn last_week() -> Self {
        Self::last_week_at(Local::now().date_naive())
    }

    pub fn last_week_at(today: NaiveDate) -> Self {
        Self::new(today - Duration::days(7), today)
    }

    /// Both ends must be present and parse as `YYYY-MM-DD`; anything else is
    /// a range still being edited.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_date(start?)?;
        let end = parse_date(end?)?;
        Some(Self::new(start, end))
    }

    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    pub fn last_instant(&self) -> NaiveDateTime {
        self.end.and_hms_opt(23, 59, 59).unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        *time >= self.first_instant() && *time <= self.last_instant()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Per-type tallies in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCounts(Vec<(ActivityType, u64)>);

impl TypeCounts {
    pub fn get(&self, kind: &ActivityType) -> Option<u64> {
        self.0
            .iter()
            .find(|(entry, _)| entry == kind)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActivityType, u64)> {
        self.0.iter().map(|(kind, count)| (kind, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn bump(&mut self, kind: &ActivityType) {
        match self.0.iter_mut().find(|(entry, _)| entry == kind) {
            Some((_, count)) => *count += 1,
            None => self.0.push((kind.clone(), 1)),
        }
    }
}

pub fn filter_by_range<'a>(records: &'a [ActivityRecord], range: &DateRange) -> Vec<&'a ActivityRecord> {
    records
        .iter()
        .filter(|record| range.contains(&record.occurred_at))
        .collect()
}

pub fn count_by_type<'a, I>(records: I) -> TypeCounts
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut counts = TypeCounts::default();
    for record in records {
        counts.bump(&record.kind);
    }
    counts
}

pub fn count_by_hour<'a, I>(records: I) -> [u64; HOURS_PER_DAY]
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut hours = [0u64; HOURS_PER_DAY];
    for record in records {
        hours[record.occurred_at.hour() as usize] += 1;
    }
    hours
}

/// Lowest hour holding the maximum count; 0 when every hour is empty.
pub fn most_active_hour(hour_counts: &[u64; HOURS_PER_DAY]) -> usize {
    let mut best = 0;
    for (hour, count) in hour_counts.iter().enumerate() {
        if *count > hour_counts[best] {
            best = hour;
        }
    }
    best
}

/// Highest count wins; among equal counts the first-encountered type wins.
pub fn favorite_type(type_counts: &TypeCounts) -> Option<&ActivityType> {
    let mut favorite: Option<(&ActivityType, u64)> = None;
    for (kind, count) in type_counts.iter() {
        match favorite {
            Some((_, best)) if count <= best => {}
            _ => favorite = Some((kind, count)),
        }
    }
    favorite.map(|(kind, _)| kind)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub range: DateRange,
    pub total: usize,
    pub type_counts: TypeCounts,
    pub hour_counts: [u64; HOURS_PER_DAY],
    pub most_active_hour: usize,
    pub favorite: Option<ActivityType>,
}

pub fn summarize(records: &[ActivityRecord], range: DateRange) -> ActivitySummary {
    let matching = filter_by_range(records, &range);
    let type_counts = count_by_type(matching.iter().copied());
    let hour_counts = count_by_hour(matching.iter().copied());
    let most_active_hour = most_active_hour(&hour_counts);
    let favorite = favorite_type(&type_counts).cloned();

    ActivitySummary {
        range,
        total: matching.len(),
        type_counts,
        hour_counts,
        most_active_hour,
        favorite,
    }
}

pub fn build_stats(records: &[ActivityRecord], range: DateRange) -> StatsResponse {
    let summary = summarize(records, range);

    StatsResponse {
        start_date: summary.range.start.to_string(),
        end_date: summary.range.end.to_string(),
        total: summary.total,
        type_counts: summary
            .type_counts
            .iter()
            .map(|(kind, count)| TypeCountPoint {
                kind: kind.as_str().to_string(),
                label: activity_label(kind).to_string(),
                count,
            })
            .collect(),
        hour_counts: summary.hour_counts.to_vec(),
        most_active_hour: summary.most_active_hour,
        most_active_time: hour_label(summary.most_active_hour),
        favorite_type: summary.favorite.as_ref().map(|kind| kind.as_str().to_string()),
        favorite_label: summary
            .favorite
            .as_ref()
            .map(|kind| activity_label(kind).to_string())
            .unwrap_or_else(|| EMPTY_MARKER.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityId;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, kind: ActivityType, time: NaiveDateTime) -> ActivityRecord {
        ActivityRecord {
            id: ActivityId(id),
            kind,
            occurred_at: time,
            notes: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn scenario() -> Vec<ActivityRecord> {
        let day = date(2024, 1, 1);
        vec![
            record(3, ActivityType::Playing, day.and_hms_opt(20, 0, 0).unwrap()),
            record(2, ActivityType::Eating, day.and_hms_opt(8, 30, 0).unwrap()),
            record(1, ActivityType::Eating, day.and_hms_opt(8, 0, 0).unwrap()),
        ]
    }

    #[test]
    fn single_day_scenario() {
        let records = scenario();
        let day = date(2024, 1, 1);
        let summary = summarize(&records, DateRange::new(day, day));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.type_counts.get(&ActivityType::Eating), Some(2));
        assert_eq!(summary.type_counts.get(&ActivityType::Playing), Some(1));
        assert_eq!(summary.type_counts.len(), 2);
        assert_eq!(summary.most_active_hour, 8);
        assert_eq!(summary.favorite, Some(ActivityType::Eating));
    }

    #[test]
    fn empty_collection_has_no_favorite() {
        let summary = summarize(&[], DateRange::new(date(2020, 1, 1), date(2030, 1, 1)));
        assert_eq!(summary.total, 0);
        assert!(summary.type_counts.is_empty());
        assert_eq!(summary.favorite, None);
        assert_eq!(summary.most_active_hour, 0);

        let stats = build_stats(&[], DateRange::new(date(2020, 1, 1), date(2030, 1, 1)));
        assert_eq!(stats.favorite_type, None);
        assert_eq!(stats.favorite_label, "-");
        assert_eq!(stats.most_active_time, "12 AM");
    }

    #[test]
    fn range_is_inclusive_at_both_ends() {
        let start = date(2024, 2, 10);
        let end = date(2024, 2, 12);
        let records = vec![
            record(1, ActivityType::Eating, start.and_hms_opt(0, 0, 0).unwrap()),
            record(2, ActivityType::Eating, end.and_hms_opt(23, 59, 59).unwrap()),
            record(3, ActivityType::Eating, date(2024, 2, 9).and_hms_opt(23, 59, 59).unwrap()),
            record(4, ActivityType::Eating, date(2024, 2, 13).and_hms_opt(0, 0, 0).unwrap()),
        ];

        let matching = filter_by_range(&records, &DateRange::new(start, end));
        let ids: Vec<_> = matching.iter().map(|record| record.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn filter_keeps_input_order() {
        let records = scenario();
        let day = date(2024, 1, 1);
        let ids: Vec<_> = filter_by_range(&records, &DateRange::new(day, day))
            .iter()
            .map(|record| record.id.0)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn counts_sum_to_input_size() {
        let day = date(2024, 5, 1);
        let kinds = [
            ActivityType::Sleeping,
            ActivityType::Exploring,
            ActivityType::Sleeping,
            ActivityType::Unrecognized("zoomies".into()),
            ActivityType::Socializing,
        ];
        let records: Vec<_> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                record(i as i64, kind.clone(), day.and_hms_opt(i as u32 * 5, 15, 0).unwrap())
            })
            .collect();

        let types = count_by_type(&records);
        assert_eq!(types.iter().map(|(_, count)| count).sum::<u64>(), records.len() as u64);
        assert!(types.iter().all(|(_, count)| count >= 1));
        assert_eq!(types.get(&ActivityType::Grooming), None);

        let hours = count_by_hour(&records);
        assert_eq!(hours.len(), 24);
        assert_eq!(hours.iter().sum::<u64>(), records.len() as u64);
        assert_eq!(hours[20], 1);
    }

    #[test]
    fn most_active_hour_prefers_lowest_tied_hour() {
        let mut hours = [0u64; HOURS_PER_DAY];
        hours[17] = 3;
        hours[6] = 3;
        hours[22] = 2;
        assert_eq!(most_active_hour(&hours), 6);
    }

    #[test]
    fn favorite_prefers_first_encountered_on_tie() {
        let day = date(2024, 1, 1);
        let records = vec![
            record(1, ActivityType::Grooming, day.and_hms_opt(9, 0, 0).unwrap()),
            record(2, ActivityType::Playing, day.and_hms_opt(10, 0, 0).unwrap()),
            record(3, ActivityType::Playing, day.and_hms_opt(11, 0, 0).unwrap()),
            record(4, ActivityType::Grooming, day.and_hms_opt(12, 0, 0).unwrap()),
        ];
        let counts = count_by_type(&records);
        assert_eq!(favorite_type(&counts), Some(&ActivityType::Grooming));

        let reversed: Vec<_> = records.iter().rev().cloned().collect();
        let counts = count_by_type(&reversed);
        assert_eq!(favorite_type(&counts), Some(&ActivityType::Grooming));

        let swapped = vec![records[1].clone(), records[0].clone()];
        let counts = count_by_type(&swapped);
        assert_eq!(favorite_type(&counts), Some(&ActivityType::Playing));
    }

    #[test]
    fn range_parse_short_circuits_on_incomplete_input() {
        assert_eq!(DateRange::parse(None, Some("2024-01-01")), None);
        assert_eq!(DateRange::parse(Some(""), Some("2024-01-01")), None);
        assert_eq!(DateRange::parse(Some("2024-13-01"), Some("2024-01-01")), None);
        assert_eq!(
            DateRange::parse(Some("2024-01-01"), Some(" 2024-01-07 ")),
            Some(DateRange::new(date(2024, 1, 1), date(2024, 1, 7)))
        );
    }

    #[test]
    fn default_range_spans_the_last_week() {
        let range = DateRange::last_week_at(date(2024, 3, 8));
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 8));
    }

    #[test]
    fn stats_response_labels_types_and_hours() {
        let records = scenario();
        let day = date(2024, 1, 1);
        let stats = build_stats(&records, DateRange::new(day, day));

        assert_eq!(stats.start_date, "2024-01-01");
        assert_eq!(stats.type_counts[0].kind, "playing");
        assert_eq!(stats.type_counts[0].label, "🎾 Playing");
        assert_eq!(stats.type_counts[1].count, 2);
        assert_eq!(stats.hour_counts.len(), 24);
        assert_eq!(stats.most_active_time, "8 AM");
        assert_eq!(stats.favorite_type.as_deref(), Some("eating"));
        assert_eq!(stats.favorite_label, "🍽️ Eating");
    }
}
