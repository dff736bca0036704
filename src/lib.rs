//! Publishes a hand-written `events.yaml` list as an iCalendar feed and an HTML
//! listing of upcoming events.

pub mod cache;
pub mod clock;
pub mod event;
pub mod ics;
pub mod render;
pub mod server;
pub mod source;

mod error;

pub use error::{Error, Result};
pub use event::{EventRecord, Schedule};
