use ics::{
    escape_text,
    properties::{Categories, Description, DtStart, Location, Summary},
    ICalendar,
};

use crate::EventRecord;

#[must_use]
pub fn calendar_to_ics<'a>(name: &'a str, events: &'a [EventRecord]) -> ICalendar<'a> {
    let mut icalendar = ICalendar::new("2.0", name);

    for event in events {
        icalendar.add_event(event.to_ics());
    }

    icalendar
}

impl EventRecord {
    /// Raid-Helper only publishes start times, so the event has no `DTEND`.
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = self.utc_datetime().format("%Y%m%dT%H%M%SZ").to_string();
        let id = format!(
            "{}_{}_{}",
            self.server_id,
            self.unix_time,
            self.title.replace(' ', "-")
        );

        let mut ics_event = ics::Event::new(id, start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(Summary::new(escape_text(self.heading())));
        ics_event.push(Categories::new(escape_text(self.server_name.as_str())));

        if !self.channel_name.is_empty() {
            ics_event.push(Location::new(format!("#{}", self.channel_name)));
        }

        if !self.description.trim().is_empty() {
            ics_event.push(Description::new(escape_text(self.description.as_str())));
        }

        ics_event
    }
}
