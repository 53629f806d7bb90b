use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;

const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

/// Inclusive range of instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl PeriodBounds {
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// All period pairs derived from one sample of "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBoundaries {
    pub now: DateTime<Tz>,
    pub current_week: PeriodBounds,
    pub next_week: PeriodBounds,
    pub yesterday_to_week_end: PeriodBounds,
}

/// Computes week-aligned periods (Monday 00:00:00 to Sunday 23:59:59) in a
/// fixed timezone.
///
/// Boundaries are built from local wall-clock times and only then mapped to
/// instants, so weeks containing a DST switch are 167 or 169 hours long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCalculator {
    timezone: Tz,
}

impl PeriodCalculator {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Derives every period from the single sample `now`.
    #[must_use]
    pub fn boundaries_at(&self, now: DateTime<Utc>) -> PeriodBoundaries {
        PeriodBoundaries {
            now: now.with_timezone(&self.timezone),
            current_week: self.current_week(now),
            next_week: self.next_week(now),
            yesterday_to_week_end: self.yesterday_to_week_end(now),
        }
    }

    #[must_use]
    pub fn current_week(&self, now: DateTime<Utc>) -> PeriodBounds {
        self.week_starting(self.monday_of(now))
    }

    #[must_use]
    pub fn next_week(&self, now: DateTime<Utc>) -> PeriodBounds {
        self.week_starting(self.monday_of(now) + Days::new(7))
    }

    /// From midnight of the day before `now` up to the end of the current
    /// week. The end never reaches into next week, even on Sundays.
    #[must_use]
    pub fn yesterday_to_week_end(&self, now: DateTime<Utc>) -> PeriodBounds {
        let today = self.local_date(now);
        let week = self.week_starting(self.monday_of(now));

        PeriodBounds {
            start: self.start_of_day(today - Days::new(1)),
            end: week.end,
        }
    }

    fn week_starting(&self, monday: NaiveDate) -> PeriodBounds {
        let midnight = monday.and_time(NaiveTime::MIN);
        let last_second = midnight + Days::new(6) + Duration::seconds(LAST_SECOND_OF_DAY);

        PeriodBounds {
            start: self.localize(midnight, Pick::Earliest),
            end: self.localize(last_second, Pick::Latest),
        }
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        self.localize(date.and_time(NaiveTime::MIN), Pick::Earliest)
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    fn monday_of(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.local_date(now);
        today - Days::new(u64::from(today.weekday().num_days_from_monday()))
    }

    fn localize(&self, local: NaiveDateTime, pick: Pick) -> DateTime<Tz> {
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(instant) => instant,
            LocalResult::Ambiguous(earliest, latest) => match pick {
                Pick::Earliest => earliest,
                Pick::Latest => latest,
            },
            // wall-clock time skipped by a DST gap, use the first instant after it
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| self.timezone.from_utc_datetime(&local)),
        }
    }
}

#[derive(Clone, Copy)]
enum Pick {
    Earliest,
    Latest,
}
