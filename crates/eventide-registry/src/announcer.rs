//! Outward notification seam.

use std::fmt;

use tracing::info;

use crate::Event;

/// What an announcement is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceKind {
    Created,
    Starting,
    Ended,
    Reminder,
}

impl fmt::Display for AnnounceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Starting => "starting",
            Self::Ended => "ended",
            Self::Reminder => "reminder",
        };
        f.write_str(name)
    }
}

/// Pushes event news to whatever front end is attached.
///
/// Formatting, localization, and delivery are the implementor's problem;
/// the core only says what happened.
pub trait Announcer: Send + Sync {
    /// A lifecycle announcement about a concrete event.
    fn announce(&self, event: &Event, kind: AnnounceKind);

    /// A reminder that the next auto-created event is this many minutes
    /// away. The event does not exist yet, so there is nothing to hand
    /// over but the countdown.
    fn announce_upcoming(&self, minutes_left: i64);

    /// A direct message to everyone currently in the event.
    fn broadcast_to_participants(&self, event: &Event, message: &str);
}

/// Default announcer: structured log lines only.
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, event: &Event, kind: AnnounceKind) {
        info!(
            event_id = %event.id(),
            name = event.name(),
            category = %event.kind(),
            kind = %kind,
            "event announcement"
        );
    }

    fn announce_upcoming(&self, minutes_left: i64) {
        info!(minutes_left, "next event reminder");
    }

    fn broadcast_to_participants(&self, event: &Event, message: &str) {
        info!(
            event_id = %event.id(),
            participants = event.participant_count(),
            message,
            "participant broadcast"
        );
    }
}
