use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::TimeZoneResolver;

/// One scheduled event, normalized from a Raid-Helper payload.
///
/// `unix_time` is the only field used for ordering and classification.
/// `date` and `time` are the upstream's preformatted strings and are only
/// ever displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub display_title: String,
    pub date: String,
    pub time: String,
    pub unix_time: i64,
    pub leader: String,
    pub description: String,
    pub server_name: String,
    pub server_id: String,
    pub signup_count: String,
    pub channel_name: String,
    pub image: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl EventRecord {
    /// Start of the event in UTC. Timestamps outside chrono's range map to
    /// the epoch.
    #[must_use]
    pub fn utc_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_time, 0).unwrap_or_default()
    }

    /// The record's own timezone. A missing or unknown name resolves to
    /// `Europe/Prague`, not to any configured default; records built by
    /// [`crate::AggregationPipeline`] always carry the configured name.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        TimeZoneResolver::default().resolve(self.timezone.as_deref())
    }

    #[must_use]
    pub fn localized_datetime(&self, tz_override: Option<Tz>) -> DateTime<Tz> {
        let tz = tz_override.unwrap_or_else(|| self.timezone());
        self.utc_datetime().with_timezone(&tz)
    }

    /// Calendar date of the event in its own timezone.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.localized_datetime(None).date_naive()
    }

    #[must_use]
    pub fn heading(&self) -> &str {
        if self.display_title.trim().is_empty() {
            &self.title
        } else {
            &self.display_title
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_event(title: &str, unix_time: i64) -> EventRecord {
    EventRecord {
        title: title.to_string(),
        display_title: title.to_string(),
        date: String::new(),
        time: String::new(),
        unix_time,
        leader: "Leader".to_string(),
        description: String::new(),
        server_name: "Server".to_string(),
        server_id: "1".to_string(),
        signup_count: "0".to_string(),
        channel_name: String::new(),
        image: String::new(),
        color: "255,0,0".to_string(),
        timezone: Some("Europe/Prague".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::*;

    #[test]
    fn localizes_into_own_timezone() {
        // 2025-10-06 08:00:00 UTC
        let event = sample_event("Molten Core", 1759737600);
        let local = event.localized_datetime(None);
        assert_eq!(local.hour(), 10);
        assert_eq!(local.timezone(), chrono_tz::Europe::Prague);
    }

    #[test]
    fn override_wins_over_own_timezone() {
        let event = sample_event("Molten Core", 1759737600);
        let local = event.localized_datetime(Some(chrono_tz::America::New_York));
        assert_eq!(local.hour(), 4);

        // same instant, repeated calls with different overrides are independent
        assert_eq!(event.localized_datetime(None).hour(), 10);
        assert_eq!(local, event.localized_datetime(None));
    }

    #[test]
    fn missing_or_unknown_timezone_uses_prague() {
        let mut event = sample_event("Onyxia", 1759737600);
        event.timezone = None;
        assert_eq!(event.timezone(), chrono_tz::Europe::Prague);

        event.timezone = Some("Nowhere/Special".to_string());
        assert_eq!(event.localized_datetime(None).hour(), 10);
    }

    #[test]
    fn local_date_follows_timezone() {
        // 2025-10-05 23:30:00 UTC is already Monday in Prague
        let mut event = sample_event("Naxxramas", 1759707000);
        assert_eq!(event.local_date(), NaiveDate::from_ymd_opt(2025, 10, 6).unwrap());

        event.timezone = Some("UTC".to_string());
        assert_eq!(event.local_date(), NaiveDate::from_ymd_opt(2025, 10, 5).unwrap());
    }

    #[test]
    fn heading_falls_back_to_title() {
        let mut event = sample_event("Zul'Gurub", 0);
        event.display_title = " ".to_string();
        assert_eq!(event.heading(), "Zul'Gurub");
    }
}
