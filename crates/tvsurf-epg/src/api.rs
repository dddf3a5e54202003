//! `EpgApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::EpgGuide;

/// EPG source trait.
///
/// Abstracts the guide fetch so the surfer loop can be driven by a mock in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(EpgApi: Send)]
pub trait LocalEpgApi {
    /// Fetches the whole guide document.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server answers with a
    /// non-success status, or the body is not a valid guide document.
    async fn fetch_guide(&self) -> Result<EpgGuide>;
}
