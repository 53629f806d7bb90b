use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{EventRecord, PeriodBoundaries, PeriodCalculator};

/// Events partitioned into the periods shown to the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub this_period: Vec<EventRecord>,
    pub next_week: Vec<EventRecord>,
    pub other: Vec<EventRecord>,
}

impl Classification {
    #[must_use]
    pub fn len(&self) -> usize {
        self.this_period.len() + self.next_week.len() + self.other.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekClassification {
    pub current_week: Vec<EventRecord>,
    pub next_week: Vec<EventRecord>,
    pub other: Vec<EventRecord>,
}

pub type DayGroups = BTreeMap<NaiveDate, Vec<EventRecord>>;

#[derive(Debug, Clone, Copy)]
pub struct EventClassifier {
    periods: PeriodCalculator,
}

impl EventClassifier {
    #[must_use]
    pub fn new(periods: PeriodCalculator) -> Self {
        Self { periods }
    }

    /// Splits `events` into yesterday-to-end-of-week, next week and the rest.
    /// Input order is kept inside every bucket.
    #[must_use]
    pub fn classify(&self, events: &[EventRecord], now: DateTime<Utc>) -> Classification {
        self.classify_within(events, &self.periods.boundaries_at(now))
    }

    #[must_use]
    pub fn classify_within(
        &self,
        events: &[EventRecord],
        boundaries: &PeriodBoundaries,
    ) -> Classification {
        let mut classification = Classification::default();

        for event in events {
            let start = event.localized_datetime(Some(self.periods.timezone()));

            if boundaries.yesterday_to_week_end.contains(&start) {
                classification.this_period.push(event.clone());
            } else if boundaries.next_week.contains(&start) {
                classification.next_week.push(event.clone());
            } else {
                classification.other.push(event.clone());
            }
        }

        classification
    }

    /// Splits `events` by calendar week only: this week, next week, the rest.
    #[must_use]
    pub fn classify_weeks(&self, events: &[EventRecord], now: DateTime<Utc>) -> WeekClassification {
        let boundaries = self.periods.boundaries_at(now);
        let mut classification = WeekClassification::default();

        for event in events {
            let start = event.localized_datetime(Some(self.periods.timezone()));

            if boundaries.current_week.contains(&start) {
                classification.current_week.push(event.clone());
            } else if boundaries.next_week.contains(&start) {
                classification.next_week.push(event.clone());
            } else {
                classification.other.push(event.clone());
            }
        }

        classification
    }
}

/// Groups events by the calendar date they start on, in each event's own
/// timezone. Days come out in ascending order, events within a day sorted by
/// `unix_time` (stable for equal timestamps).
#[must_use]
pub fn group_by_day(events: &[EventRecord]) -> DayGroups {
    let mut days = DayGroups::new();

    for event in events {
        days.entry(event.local_date()).or_default().push(event.clone());
    }

    for day in days.values_mut() {
        day.sort_by_key(|event| event.unix_time);
    }

    days
}
