//! Terminal user interface for stubdeck.
//!
//! A keyboard-driven console over the admin API: mappings tree, matched
//! and unmatched request journals, scenario state machines, and recorder
//! control, live-updated via the `/__admin/events` WebSocket.

mod app;
mod connection;
mod notifications;
mod views;

pub use app::run;
pub use connection::{ConnectionState, reconnect_delay};
pub use notifications::{NotificationLevel, Toast, Toasts};
