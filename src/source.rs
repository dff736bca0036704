//! Loading event records from `events.yaml`-style text.
//!
//! The format is a flat, line oriented subset of YAML:
//!
//! ```yaml
//! events:
//!   - id: 1
//!     title: "Bowling Night"
//!     date: "2024-12-15"
//!     time: "7:00 PM"
//!     location: "Lucky Strike Lanes"
//! ```
//!
//! A record carries either `time` (one hour long) or a `start_time`/`end_time` pair.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info, warn};
use once_cell::sync::Lazy;

use crate::event::{EventRecord, Schedule};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Date,
    Time,
    StartTime,
    EndTime,
    Location,
}

impl Field {
    const PREFIXES: [(&'static str, Field); 7] = [
        ("title:", Field::Title),
        ("description:", Field::Description),
        ("date:", Field::Date),
        ("time:", Field::Time),
        ("start_time:", Field::StartTime),
        ("end_time:", Field::EndTime),
        ("location:", Field::Location),
    ];

    fn split(line: &str) -> Option<(Field, &str)> {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, field)| line.strip_prefix(prefix).map(|value| (*field, value)))
    }
}

enum Line<'a> {
    BlockStart,
    RecordStart(Option<u64>),
    Field(Field, &'a str),
    Blank,
    Other,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Line::Blank;
        }

        if line == "events:" {
            return Line::BlockStart;
        }

        if let Some(id) = line.strip_prefix("- id:") {
            let id = clean(id);
            let digits = id.find(|c: char| !c.is_ascii_digit()).unwrap_or(id.len());
            return Line::RecordStart(id[..digits].parse().ok());
        }

        match Field::split(line) {
            Some((field, value)) => Line::Field(field, value),
            None => Line::Other,
        }
    }
}

fn clean(value: &str) -> String {
    value.trim().replace('"', "")
}

#[derive(Default)]
struct RecordBuilder {
    id: Option<u64>,
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
}

impl RecordBuilder {
    fn new(id: Option<u64>) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Date => &mut self.date,
            Field::Time => &mut self.time,
            Field::StartTime => &mut self.start_time,
            Field::EndTime => &mut self.end_time,
            Field::Location => &mut self.location,
        };
        *slot = Some(clean(value));
    }

    fn build(self) -> EventRecord {
        EventRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            date: self.date,
            schedule: Schedule::resolve(self.time, self.start_time, self.end_time),
            location: self.location,
        }
    }
}

enum State {
    Preamble,
    Block(Option<RecordBuilder>),
}

/// Result of [`decode`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub events: Vec<EventRecord>,
    /// Non-blank lines inside the `events:` block that did not contribute to a record.
    pub skipped: usize,
}

/// Decodes event records in source order. Never fails; lines that do not fit the
/// format are counted in [`Decoded::skipped`].
pub fn decode(text: &str) -> Decoded {
    let mut decoded = Decoded::default();
    let mut state = State::Preamble;

    for line in text.lines() {
        let line = Line::classify(line);

        state = match (state, line) {
            (State::Preamble, Line::BlockStart) => State::Block(None),
            (State::Preamble, _) => State::Preamble,
            (State::Block(current), Line::BlockStart) => State::Block(current),
            (State::Block(current), Line::RecordStart(id)) => {
                decoded.events.extend(current.map(RecordBuilder::build));
                State::Block(Some(RecordBuilder::new(id)))
            }
            (State::Block(Some(mut current)), Line::Field(field, value)) => {
                current.set(field, value);
                State::Block(Some(current))
            }
            (State::Block(current), Line::Blank) => State::Block(current),
            (State::Block(current), Line::Field(..) | Line::Other) => {
                decoded.skipped += 1;
                State::Block(current)
            }
        };
    }

    if let State::Block(Some(current)) = state {
        decoded.events.push(current.build());
    }

    decoded
}

/// Where event text is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Source::Url(s.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

impl Source {
    pub async fn fetch(&self) -> Result<String> {
        match self {
            Source::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                }),
            Source::Url(url) => {
                let response = reqwest::get(url).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Status(status));
                }
                Ok(response.text().await?)
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<EventRecord>> {
        let text = self.fetch().await?;
        let Decoded { events, skipped } = decode(&text);

        if skipped > 0 {
            debug!("Ignored {skipped} unrecognised lines in {self}");
        }

        if events.is_empty() {
            return Err(Error::NoEvents);
        }

        Ok(events)
    }

    /// Loads the event list, substituting [`fallback_events`] when the source is
    /// unreachable or holds no events.
    pub async fn load(&self) -> Vec<EventRecord> {
        info!("Loading events from {self}");

        match self.try_load().await {
            Ok(events) => events,
            Err(err) => {
                warn!("Error loading events from {self}: {err}");
                warn!("Falling back to sample events");
                fallback_events()
            }
        }
    }
}

static FALLBACK: Lazy<Vec<EventRecord>> = Lazy::new(|| {
    [
        (
            1,
            "Team Meeting",
            "Weekly team sync to discuss project progress and upcoming milestones.",
            "2024-12-15",
            ("10:00 AM", "11:00 AM"),
            "Conference Room A",
        ),
        (
            2,
            "Product Launch",
            "Launch of our new product line with live demonstrations and Q&A session.",
            "2024-12-20",
            ("2:00 PM", "4:00 PM"),
            "Main Auditorium",
        ),
        (
            3,
            "Holiday Party",
            "Annual company holiday celebration with food, drinks, and entertainment.",
            "2024-12-25",
            ("6:00 PM", "9:00 PM"),
            "Grand Ballroom",
        ),
        (
            4,
            "Training Workshop",
            "Advanced training session on new technologies and best practices.",
            "2024-12-28",
            ("9:00 AM", "12:00 PM"),
            "Training Center",
        ),
    ]
    .into_iter()
    .map(
        |(id, title, description, date, (start, end), location)| EventRecord {
            id: Some(id),
            title: Some(title.into()),
            description: Some(description.into()),
            date: Some(date.into()),
            schedule: Some(Schedule::ExplicitRange {
                start: start.into(),
                end: end.into(),
            }),
            location: Some(location.into()),
        },
    )
    .collect()
});

/// The sample list used whenever the real source cannot provide events.
pub fn fallback_events() -> Vec<EventRecord> {
    FALLBACK.clone()
}
