//! Read-side query policies: filters and orderings.
//!
//! Filters are a tagged enum evaluated per event; orderings are looked up
//! in a small named comparator table so callers select a policy by tag
//! instead of passing arbitrary closures around.

use std::cmp::Ordering;
use std::sync::Arc;

use eventide_types::{EventKind, EventStatus, ParticipantId};

use crate::Event;

// ---------------------------------------------------------------------------
// EventFilter
// ---------------------------------------------------------------------------

/// A predicate over events, selectable by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event.
    All,
    /// Events of one category.
    Kind(EventKind),
    /// Events in one lifecycle state.
    Status(EventStatus),
    /// Events a given participant is currently in.
    Participant(ParticipantId),
    /// Events currently accepting participants (state allows it and a
    /// slot is free).
    Joinable,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => event.kind() == *kind,
            Self::Status(status) => event.status() == *status,
            Self::Participant(participant) => event.contains(*participant),
            Self::Joinable => event.status().is_joinable() && !event.is_full(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventOrder
// ---------------------------------------------------------------------------

/// A sort policy over events, selectable by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrder {
    /// Oldest first.
    CreatedAt,
    /// Earliest scheduled start first; unscheduled (0) events last.
    StartTime,
    /// Lexicographic by name.
    Name,
    /// Busiest first.
    ParticipantCount,
}

type Comparator = fn(&Arc<Event>, &Arc<Event>) -> Ordering;

/// The named comparator table; one entry per [`EventOrder`] tag.
const COMPARATORS: &[(EventOrder, Comparator)] = &[
    (EventOrder::CreatedAt, cmp_created_at),
    (EventOrder::StartTime, cmp_start_time),
    (EventOrder::Name, cmp_name),
    (EventOrder::ParticipantCount, cmp_participant_count),
];

fn cmp_created_at(a: &Arc<Event>, b: &Arc<Event>) -> Ordering {
    a.created_at().cmp(&b.created_at())
}

fn cmp_start_time(a: &Arc<Event>, b: &Arc<Event>) -> Ordering {
    // 0 means "not scheduled"; push those to the end.
    let key = |e: &Arc<Event>| {
        let start = e.start_ms();
        if start == 0 { i64::MAX } else { start }
    };
    key(a).cmp(&key(b))
}

fn cmp_name(a: &Arc<Event>, b: &Arc<Event>) -> Ordering {
    a.name().cmp(b.name())
}

fn cmp_participant_count(a: &Arc<Event>, b: &Arc<Event>) -> Ordering {
    b.participant_count().cmp(&a.participant_count())
}

impl EventOrder {
    /// Looks up this tag's comparator in the table.
    pub fn comparator(self) -> Comparator {
        COMPARATORS
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, cmp)| *cmp)
            .expect("every EventOrder tag has a table entry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventParams;
    use eventide_types::EventId;

    fn event(name: &str, created_at: i64, start_ms: i64) -> Arc<Event> {
        let params = EventParams {
            start_ms,
            ..EventParams::new(name, "", EventKind::Social)
        };
        Arc::new(Event::new(EventId::new(), params, created_at))
    }

    #[test]
    fn test_filter_all_matches_everything() {
        let e = event("a", 1, 0);
        assert!(EventFilter::All.matches(&e));
    }

    #[test]
    fn test_filter_by_kind() {
        let e = event("a", 1, 0);
        assert!(EventFilter::Kind(EventKind::Social).matches(&e));
        assert!(!EventFilter::Kind(EventKind::Race).matches(&e));
    }

    #[test]
    fn test_filter_by_status() {
        let e = event("a", 1, 0);
        assert!(EventFilter::Status(EventStatus::Created).matches(&e));
        assert!(!EventFilter::Status(EventStatus::Active).matches(&e));
    }

    #[test]
    fn test_filter_by_participant() {
        let e = event("a", 1, 0);
        let p = ParticipantId::new();
        assert!(!EventFilter::Participant(p).matches(&e));
        e.try_join(p).unwrap();
        assert!(EventFilter::Participant(p).matches(&e));
    }

    #[test]
    fn test_order_created_at() {
        let mut events = vec![event("b", 20, 0), event("a", 10, 0)];
        events.sort_by(EventOrder::CreatedAt.comparator());
        assert_eq!(events[0].name(), "a");
    }

    #[test]
    fn test_order_start_time_puts_unscheduled_last() {
        let mut events = vec![event("unscheduled", 1, 0), event("soon", 1, 500)];
        events.sort_by(EventOrder::StartTime.comparator());
        assert_eq!(events[0].name(), "soon");
        assert_eq!(events[1].name(), "unscheduled");
    }

    #[test]
    fn test_order_participant_count_busiest_first() {
        let busy = event("busy", 1, 0);
        busy.try_join(ParticipantId::new()).unwrap();
        let mut events = vec![event("idle", 1, 0), busy];
        events.sort_by(EventOrder::ParticipantCount.comparator());
        assert_eq!(events[0].name(), "busy");
    }

    #[test]
    fn test_every_order_tag_has_a_comparator() {
        for order in [
            EventOrder::CreatedAt,
            EventOrder::StartTime,
            EventOrder::Name,
            EventOrder::ParticipantCount,
        ] {
            // Lookup must not panic.
            let _ = order.comparator();
        }
    }
}
