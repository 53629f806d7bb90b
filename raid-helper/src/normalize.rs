use log::{debug, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{EventRecord, SourcePayload};

pub const DEFAULT_SERVER_NAME: &str = "Unknown Server";
pub const DEFAULT_SIGNUP_COUNT: &str = "0";
pub const DEFAULT_COLOR: &str = "255,0,0";
pub const DEFAULT_UNIX_TIME: i64 = 0;

const NO_TEXT: &str = "";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected an event object, found {0}")]
    NotAnObject(&'static str),
    #[error("field `{field}` holds {found} where text was expected")]
    NotText {
        field: &'static str,
        found: &'static str,
    },
}

/// Turns every raw event of one source into records, skipping the ones that
/// cannot be normalized.
pub fn normalize_payload(
    payload: SourcePayload,
    source_id: &str,
    timezone: Option<&str>,
) -> Vec<EventRecord> {
    let server_name = payload
        .server_name
        .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
    let raw_events = payload.events.unwrap_or_default();

    let events = raw_events
        .iter()
        .filter_map(
            |raw| match normalize_event(raw, &server_name, source_id, timezone) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!("Skipping event from server {server_name}: {err}");
                    None
                }
            },
        )
        .collect::<Vec<_>>();

    debug!(
        "Normalized {} of {} events from server {server_name} ({source_id})",
        events.len(),
        raw_events.len()
    );

    events
}

/// Builds one record from a raw event object.
///
/// Absent or `null` fields take their defaults. Numbers and booleans in text
/// fields are kept in their textual form. A `unixtime` that is missing or not
/// an integer becomes [`DEFAULT_UNIX_TIME`], the record is kept.
pub fn normalize_event(
    raw: &Value,
    server_name: &str,
    source_id: &str,
    timezone: Option<&str>,
) -> Result<EventRecord, RecordError> {
    let Value::Object(fields) = raw else {
        return Err(RecordError::NotAnObject(kind(raw)));
    };

    Ok(EventRecord {
        title: text(fields, "title", NO_TEXT)?,
        display_title: text(fields, "displayTitle", NO_TEXT)?,
        date: text(fields, "date", NO_TEXT)?,
        time: text(fields, "time", NO_TEXT)?,
        unix_time: unix_time(fields.get("unixtime")),
        leader: text(fields, "leader", NO_TEXT)?,
        description: text(fields, "description", NO_TEXT)?,
        server_name: server_name.to_string(),
        server_id: text(fields, "serverId", source_id)?,
        signup_count: text(fields, "signupcount", DEFAULT_SIGNUP_COUNT)?,
        channel_name: text(fields, "channelName", NO_TEXT)?,
        image: text(fields, "image", NO_TEXT)?,
        color: text(fields, "color", DEFAULT_COLOR)?,
        timezone: timezone.map(str::to_string),
    })
}

fn text(
    fields: &Map<String, Value>,
    field: &'static str,
    default: &str,
) -> Result<String, RecordError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(Value::Bool(value)) => Ok(value.to_string()),
        Some(other) => Err(RecordError::NotText {
            field,
            found: kind(other),
        }),
    }
}

fn unix_time(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite())
                    .map(|float| float.trunc() as i64)
            })
            .unwrap_or(DEFAULT_UNIX_TIME),
        Some(Value::String(string)) => string.trim().parse().unwrap_or(DEFAULT_UNIX_TIME),
        _ => DEFAULT_UNIX_TIME,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
