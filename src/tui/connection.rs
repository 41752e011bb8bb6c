//! Event-socket connection state for the TUI.
//!
//! The console reconnects forever on a fixed delay: the server going
//! away is routine (restarts between test runs), so there is no retry
//! ceiling and no backoff growth.

use std::time::Duration;

use crate::client::RECONNECT_DELAY;

/// Connection state of the `/__admin/events` socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected to the server
    Connected,
    /// Waiting out the fixed delay before attempt `attempt`
    Reconnecting { attempt: u32 },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Current reconnect attempt number (0 if connected).
    pub fn reconnect_attempt(&self) -> u32 {
        match self {
            ConnectionState::Reconnecting { attempt } => *attempt,
            ConnectionState::Connected => 0,
        }
    }
}

/// Delay before a reconnection attempt. Every attempt waits the same
/// fixed interval.
pub fn reconnect_delay(_attempt: u32) -> Duration {
    RECONNECT_DELAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_fixed_across_attempts() {
        assert_eq!(reconnect_delay(1), RECONNECT_DELAY);
        assert_eq!(reconnect_delay(2), RECONNECT_DELAY);
        assert_eq!(reconnect_delay(50), RECONNECT_DELAY);
        assert_eq!(reconnect_delay(u32::MAX), RECONNECT_DELAY);
    }

    #[test]
    fn test_connection_state_flags() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Reconnecting { attempt: 1 }.is_connected());
    }

    #[test]
    fn test_reconnect_attempt_number() {
        assert_eq!(ConnectionState::Connected.reconnect_attempt(), 0);
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 7 }.reconnect_attempt(),
            7
        );
    }
}
