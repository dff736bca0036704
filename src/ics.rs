use std::path::Path;

use chrono::NaiveDateTime;
use ics::{
    components::Property,
    escape_text,
    properties::{CalScale, Description, DtEnd, DtStart, Location, Method, Sequence, Status, Summary},
    ICalendar,
};
use log::warn;

use crate::event::EventRecord;
use crate::{Error, Result};

/// Calendar-level constants written into every feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub timezone: String,
    /// Domain part of every event `UID`.
    pub uid_domain: String,
}

impl Default for CalendarMeta {
    fn default() -> Self {
        Self {
            product_id: "-//My Calendar//Calendar Website//EN".to_string(),
            name: "My Calendar".to_string(),
            description: "Subscribe to our events calendar".to_string(),
            timezone: "UTC".to_string(),
            uid_domain: "mewhenbowling.com".to_string(),
        }
    }
}

/// Formats a wall-clock instant in the iCalendar basic UTC form, `YYYYMMDDTHHMMSSZ`.
///
/// No offset is applied: the instant is taken to already be in the calendar's
/// timezone, which the header declares as UTC.
pub fn format_timestamp(instant: NaiveDateTime) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ics_base(meta: &CalendarMeta) -> ICalendar<'_> {
    let mut ics = ICalendar::new("2.0", meta.product_id.as_str());
    ics.push(CalScale::new("GREGORIAN"));
    ics.push(Method::new("PUBLISH"));
    ics.push(Property::new("X-WR-CALNAME", escape_text(meta.name.as_str())));
    ics.push(Property::new(
        "X-WR-CALDESC",
        escape_text(meta.description.as_str()),
    ));
    ics.push(Property::new("X-WR-TIMEZONE", meta.timezone.as_str()));
    ics
}

/// `UID` of the event at `position` (zero based) in the feed. Records without an id
/// fall back to their one-based position.
pub fn event_uid(event: &EventRecord, position: usize, meta: &CalendarMeta) -> String {
    match event.id {
        Some(id) => format!("event-{id}@{}", meta.uid_domain),
        None => format!("event-at-{}@{}", position + 1, meta.uid_domain),
    }
}

pub fn to_ics_event<'a>(
    event: &'a EventRecord,
    position: usize,
    meta: &CalendarMeta,
    dtstamp: &str,
) -> Result<ics::Event<'a>> {
    let title = event.title.as_deref().ok_or(Error::MissingField("title"))?;
    let interval = event.interval()?;

    let mut ics_event = ics::Event::new(event_uid(event, position, meta), dtstamp.to_string());

    ics_event.push(DtStart::new(format_timestamp(interval.start)));
    ics_event.push(DtEnd::new(format_timestamp(interval.end)));
    ics_event.push(Summary::new(escape_text(title)));
    ics_event.push(Description::new(escape_text(
        event.description_or_title().unwrap_or(title),
    )));

    if let Some(location) = &event.location {
        ics_event.push(Location::new(escape_text(location.as_str())));
    }

    ics_event.push(Status::confirmed());
    ics_event.push(Sequence::new("0"));

    Ok(ics_event)
}

/// Builds the feed with one `VEVENT` per record, in input order. Records that cannot be
/// scheduled are left out with a warning; the rest of the feed is still produced.
pub fn to_ics<'a>(
    events: &'a [EventRecord],
    meta: &'a CalendarMeta,
    generated_at: NaiveDateTime,
) -> ICalendar<'a> {
    let dtstamp = format_timestamp(generated_at);
    let mut ics = ics_base(meta);

    for (position, event) in events.iter().enumerate() {
        match to_ics_event(event, position, meta, &dtstamp) {
            Ok(ics_event) => ics.add_event(ics_event),
            Err(err) => warn!("Skipping event {}: {err}", event.label()),
        }
    }

    ics
}

/// Writes the feed to `path`, replacing any previous contents.
pub async fn save(path: &Path, ics: &ICalendar<'_>) -> Result<()> {
    tokio::fs::write(path, ics.to_string())
        .await
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}
