//! One function per `stamps` subcommand. Each returns an `Out` and leaves printing to `main`.

mod catalog;
mod init;
mod interactive;
mod suggest;
mod tally;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use catalog::catalog;
pub use init::init;
pub use interactive::session;
pub use suggest::suggest;
pub use tally::tally;

/// What a command hands back to `main`: a line or block of text for the user, plus the value it
/// computed so that tests and `--log-level debug` can look at the numbers directly.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    data: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    /// An outcome with nothing to show beyond its text, e.g. "no suggestion".
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Logs the text at `info` and, at `debug`, the data as JSON. Amounts in the JSON are plain
    /// numbers, e.g. `"total": 12.5`.
    pub fn print(&self) {
        info!("{}", self.message);
        let Some(data) = self.data() else {
            return;
        };
        match serde_json::to_string_pretty(data) {
            Ok(json) => debug!("Result data:\n{json}"),
            Err(e) => debug!("Unable to render the result data as JSON: {e}"),
        }
    }
}
