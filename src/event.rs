use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Serialize;

use crate::clock::{parse_date, parse_time};
use crate::{Error, Result};

/// When an event takes place on its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// A single `time`, lasting [`Schedule::default_duration`].
    FixedDuration { start: String },
    /// An explicit `start_time`/`end_time` pair.
    ExplicitRange { start: String, end: String },
}

impl Schedule {
    pub fn default_duration() -> Duration {
        Duration::hours(1)
    }

    /// Picks the schedule variant from the raw time fields of a record. An explicit
    /// pair wins over a single `time`; a lone `start_time` behaves like `time`.
    pub fn resolve(
        time: Option<String>,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> Option<Self> {
        match (time, start_time, end_time) {
            (_, Some(start), Some(end)) => Some(Schedule::ExplicitRange { start, end }),
            (Some(start), _, _) | (None, Some(start), None) => {
                Some(Schedule::FixedDuration { start })
            }
            _ => None,
        }
    }

    pub fn start(&self) -> &str {
        match self {
            Schedule::FixedDuration { start } | Schedule::ExplicitRange { start, .. } => start,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Start and end of an event as naive wall-clock instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventRecord {
    pub fn date(&self) -> Result<NaiveDate> {
        parse_date(self.date.as_deref().ok_or(Error::MissingField("date"))?)
    }

    pub fn start(&self) -> Result<NaiveDateTime> {
        let schedule = self.schedule.as_ref().ok_or(Error::MissingField("time"))?;
        Ok(self.date()?.and_time(parse_time(schedule.start())?))
    }

    /// An end earlier than the start is taken to be on the following day.
    pub fn interval(&self) -> Result<Interval> {
        let date = self.date()?;

        match self.schedule.as_ref().ok_or(Error::MissingField("time"))? {
            Schedule::FixedDuration { start } => {
                let start = date.and_time(parse_time(start)?);
                Ok(Interval {
                    start,
                    end: start + Schedule::default_duration(),
                })
            }
            Schedule::ExplicitRange { start, end } => {
                let start = date.and_time(parse_time(start)?);
                let mut end = date.and_time(parse_time(end)?);
                if end < start {
                    debug!(
                        "End of event {} is before its start, moving it to the next day",
                        self.label()
                    );
                    end += Duration::days(1);
                }
                Ok(Interval { start, end })
            }
        }
    }

    /// An empty description counts as absent.
    pub fn description_or_title(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|description| !description.is_empty())
            .or(self.title.as_deref())
    }

    /// Short human readable reference for log messages.
    pub fn label(&self) -> String {
        match (&self.title, self.id) {
            (Some(title), Some(id)) => format!("#{id} \"{title}\""),
            (Some(title), None) => format!("\"{title}\""),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}
