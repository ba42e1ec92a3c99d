//! stamp-tally: add up postage stamps toward a target cost, with optional AI-suggested targets.
//!
//! The core is `Session`, which holds the selected stamps, the target text and the latest
//! suggestion, and derives the total, remaining and progress from them on every read.
//! `api::SuggestionGateway` asks a language model for a postage suggestion and never fails.

pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
mod session;
mod summary;
mod utils;

pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use session::{RequestState, RequestTicket, Session};
pub use summary::{CatalogDisplay, InventoryLine, Summary, SuggestionDisplay};
