//! EPG library for tvsurf.
//!
//! Provides the program guide data types and an HTTP client that fetches
//! the static EPG JSON document.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{EpgApi, LocalEpgApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{EpgClient, EpgClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{EpgGuide, NO_PROGRAMMING_PLACEHOLDER, Program};
