use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use raid_helper::{group_by_day, server_names, Classification, DayGroups, EventRecord};
use serde::Serialize;

const CZECH_DAYS: [&str; 7] = ["Po", "Út", "St", "Čt", "Pá", "So", "Ne"];

/// Short Czech date label, e.g. `Po 23.9.2025`.
pub fn day_label(date: NaiveDate) -> String {
    format!(
        "{} {}.{}.{}",
        CZECH_DAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        date.month(),
        date.year()
    )
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub label: String,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
pub struct EventsView {
    pub loaded_at: DateTime<Utc>,
    pub servers: Vec<String>,
    pub this_period: Vec<DayView>,
    pub next_week: Vec<DayView>,
    pub other: Vec<EventRecord>,
}

impl EventsView {
    pub fn new(
        loaded_at: DateTime<Utc>,
        events: &[EventRecord],
        classification: Classification,
    ) -> Self {
        Self {
            loaded_at,
            servers: server_names(events),
            this_period: days(group_by_day(&classification.this_period)),
            next_week: days(group_by_day(&classification.next_week)),
            other: classification.other,
        }
    }
}

fn days(groups: DayGroups) -> Vec<DayView> {
    groups
        .into_iter()
        .map(|(date, events)| DayView {
            date,
            label: day_label(date),
            events,
        })
        .collect()
}

/// Plain markdown page: this period first, then next week.
pub fn markdown(classification: &Classification) -> String {
    Markdown(classification).to_string()
}

struct Markdown<'a>(&'a Classification);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classification = self.0;

        if classification.this_period.is_empty() && classification.next_week.is_empty() {
            return writeln!(f, "No events");
        }

        if !classification.this_period.is_empty() {
            writeln!(f, "## Yesterday to End of Week\n")?;
            write_days(f, &group_by_day(&classification.this_period))?;
        }

        if !classification.next_week.is_empty() {
            writeln!(
                f,
                "## Next Week Events ({} events)\n",
                classification.next_week.len()
            )?;
            write_days(f, &group_by_day(&classification.next_week))?;
        }

        Ok(())
    }
}

fn write_days(f: &mut fmt::Formatter<'_>, days: &DayGroups) -> fmt::Result {
    for (date, events) in days {
        writeln!(f, "### {}\n", day_label(*date))?;

        for event in events {
            write_event(f, event)?;
        }
    }

    Ok(())
}

fn write_event(f: &mut fmt::Formatter<'_>, event: &EventRecord) -> fmt::Result {
    writeln!(f, "#### {}", event.heading())?;
    writeln!(f, "  - at **{}** with **{}**", event.time, event.server_name)?;
    writeln!(f, "  - Signed up: **{}**", event.signup_count)?;

    if !event.channel_name.is_empty() {
        writeln!(f, "  - Channel: #{}", event.channel_name)?;
    }

    if !event.description.trim().is_empty() {
        writeln!(f, "  ---\n{}", event.description)?;
    }

    writeln!(f)
}
