use std::{default::Default, time::Duration};

#[derive(Clone, Debug)]
/// Configuration options to tune TEI management timing and retry behavior.
pub struct TeiConfig {
    /// T201: retransmission interval used by terminal-side entities.
    pub terminal_timer: Duration,
    /// T202: retransmission interval used by network-side entities.
    pub network_timer: Duration,
    /// N202: total number of identity requests sent before the assignment is abandoned.
    pub id_request_attempts: u8,
    /// Total number of identity verify requests sent before the TEI is removed.
    pub verify_attempts: u8,
    /// Capacity of the owner event channel (0 = unbounded).
    ///
    /// A bounded channel that fills up drops further events, including
    /// `AssignmentComplete` and `RemovalRequested`. The TEI binding still changes,
    /// so an owner using a bound must drain often or re-read the entity's TEI.
    pub event_buffer_size: usize,
}

impl TeiConfig {
    /// Returns a config with both timers set to `interval`, handy for tests and simulations.
    pub fn with_uniform_timer(interval: Duration) -> Self {
        Self { terminal_timer: interval, network_timer: interval, ..Self::default() }
    }
}

impl Default for TeiConfig {
    fn default() -> Self {
        Self {
            terminal_timer: Duration::from_millis(1000),
            network_timer: Duration::from_millis(2000),
            id_request_attempts: 3,
            verify_attempts: 2,
            event_buffer_size: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_q921_timers() {
        let config = TeiConfig::default();
        assert_eq!(config.terminal_timer, Duration::from_secs(1));
        assert_eq!(config.network_timer, Duration::from_secs(2));
        assert_eq!(config.id_request_attempts, 3);
        assert_eq!(config.verify_attempts, 2);
    }

    #[test]
    fn test_uniform_timer_keeps_retry_counts() {
        let config = TeiConfig::with_uniform_timer(Duration::from_millis(10));
        assert_eq!(config.terminal_timer, config.network_timer);
        assert_eq!(config.id_request_attempts, 3);
    }
}
