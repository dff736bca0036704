use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to load events: {0}")]
    Status(reqwest::StatusCode),

    #[error("no events found in source")]
    NoEvents,

    #[error("missing `{0}` field")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time `{0}`, expected H:MM AM|PM")]
    InvalidTime(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
