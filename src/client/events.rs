//! Push-notification topics and refresh debouncing.
//!
//! The server's `/__admin/events` WebSocket delivers bare string topics
//! naming which data set changed. Topic arrival does not carry the data;
//! it schedules a debounced re-fetch so notification bursts coalesce
//! into one request per topic.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Fixed delay before reconnecting a closed event socket. No growth, no
/// retry ceiling: the console keeps knocking until the server is back.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Quiet window a topic must hold before its re-fetch fires.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(150);

/// Data set a push notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Mappings,
    Matched,
    Unmatched,
    Recording,
    Scenario,
}

impl Topic {
    /// Parse a wire topic string. Unknown topics are ignored upstream.
    pub fn parse(raw: &str) -> Option<Topic> {
        match raw.trim() {
            "mappings" => Some(Topic::Mappings),
            "matched" => Some(Topic::Matched),
            "unmatched" => Some(Topic::Unmatched),
            "recording" => Some(Topic::Recording),
            "scenario" => Some(Topic::Scenario),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Mappings => "mappings",
            Topic::Matched => "matched",
            Topic::Unmatched => "unmatched",
            Topic::Recording => "recording",
            Topic::Scenario => "scenario",
        }
    }
}

/// Per-topic refresh debouncer.
///
/// Scheduling a topic (re)arms its deadline; deadlines that have passed
/// are drained by the event loop. Repeated notifications inside the
/// window collapse into a single due topic.
#[derive(Debug, Default)]
pub struct RefreshDebouncer {
    deadlines: HashMap<Topic, Instant>,
}

impl RefreshDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the debounce window for a topic.
    pub fn schedule(&mut self, topic: Topic, now: Instant) {
        self.deadlines.insert(topic, now + REFRESH_DEBOUNCE);
    }

    /// Drain topics whose window has elapsed.
    pub fn due(&mut self, now: Instant) -> Vec<Topic> {
        let ready: Vec<Topic> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(topic, _)| *topic)
            .collect();
        for topic in &ready {
            self.deadlines.remove(topic);
        }
        ready
    }

    /// Earliest pending deadline, for event-loop timeout sizing.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trip() {
        for raw in ["mappings", "matched", "unmatched", "recording", "scenario"] {
            let topic = Topic::parse(raw).unwrap();
            assert_eq!(topic.as_str(), raw);
        }
    }

    #[test]
    fn test_unknown_topic_rejected() {
        assert_eq!(Topic::parse("snapshots"), None);
        assert_eq!(Topic::parse(""), None);
    }

    #[test]
    fn test_topic_whitespace_trimmed() {
        assert_eq!(Topic::parse(" mappings\n"), Some(Topic::Mappings));
    }

    #[test]
    fn test_debounce_fires_after_window() {
        let mut debouncer = RefreshDebouncer::new();
        let start = Instant::now();
        debouncer.schedule(Topic::Mappings, start);

        assert!(debouncer.due(start).is_empty());
        assert!(debouncer.due(start + REFRESH_DEBOUNCE / 2).is_empty());
        assert_eq!(
            debouncer.due(start + REFRESH_DEBOUNCE),
            vec![Topic::Mappings]
        );
        assert!(debouncer.is_idle());
    }

    #[test]
    fn test_reschedule_extends_window() {
        let mut debouncer = RefreshDebouncer::new();
        let start = Instant::now();
        debouncer.schedule(Topic::Scenario, start);
        debouncer.schedule(Topic::Scenario, start + REFRESH_DEBOUNCE / 2);

        // Original deadline passed, but the re-arm pushed it out.
        assert!(debouncer.due(start + REFRESH_DEBOUNCE).is_empty());
        assert_eq!(
            debouncer.due(start + REFRESH_DEBOUNCE * 2),
            vec![Topic::Scenario]
        );
    }

    #[test]
    fn test_topics_debounce_independently() {
        let mut debouncer = RefreshDebouncer::new();
        let start = Instant::now();
        debouncer.schedule(Topic::Mappings, start);
        debouncer.schedule(Topic::Matched, start + REFRESH_DEBOUNCE);

        let due = debouncer.due(start + REFRESH_DEBOUNCE);
        assert_eq!(due, vec![Topic::Mappings]);
        assert!(!debouncer.is_idle());
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut debouncer = RefreshDebouncer::new();
        let start = Instant::now();
        debouncer.schedule(Topic::Mappings, start);
        debouncer.schedule(Topic::Matched, start + Duration::from_millis(50));
        assert_eq!(debouncer.next_deadline(), Some(start + REFRESH_DEBOUNCE));
    }
}
