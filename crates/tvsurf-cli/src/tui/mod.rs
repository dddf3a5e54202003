//! Channel surfer TUI.
//!
//! Uses `ratatui` + `crossterm` for rendering; input, EPG loads and the
//! auto-hide countdown are multiplexed on the tokio runtime.

/// Debounced auto-hide countdown.
mod auto_hide;
/// Navigation controller and its event types.
pub mod state;
mod surfer;
mod ui;

pub use surfer::run_surfer;
