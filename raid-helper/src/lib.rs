mod classify;
mod client;
mod config;
mod normalize;
mod period;
mod pipeline;
mod structs;
mod timezone;

#[cfg(feature = "ics")]
mod ics;

pub use classify::{group_by_day, Classification, DayGroups, EventClassifier, WeekClassification};
pub use client::{SourceClient, SourceError, SourcePayload};
pub use config::{Config, DEFAULT_BASE_URL, DEFAULT_SERVER_IDS, DEFAULT_TIMEOUT, DEFAULT_TIMEZONE};
pub use normalize::{
    normalize_event, normalize_payload, RecordError, DEFAULT_COLOR, DEFAULT_SERVER_NAME,
    DEFAULT_SIGNUP_COUNT, DEFAULT_UNIX_TIME,
};
pub use period::{PeriodBoundaries, PeriodBounds, PeriodCalculator};
pub use pipeline::{server_names, AggregationPipeline};
pub use structs::EventRecord;
pub use timezone::{TimeZoneResolver, FALLBACK_TIMEZONE};

#[cfg(feature = "ics")]
pub use ics::calendar_to_ics;
