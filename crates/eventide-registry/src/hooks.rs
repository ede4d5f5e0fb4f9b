//! Lifecycle hooks: the vetoable pre/post callback seam.

use std::sync::Arc;

use eventide_types::ParticipantId;
use tracing::debug;

use crate::Event;

/// Why an event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// An operator ended it.
    Manual,
    /// The tick loop ended it at its scheduled end time.
    Expired,
    /// It was cancelled before completing.
    Cancelled,
}

/// Why a participant left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// The participant chose to leave.
    Voluntary,
    /// The event was cancelled out from under them.
    EventCancelled,
}

/// Callbacks around lifecycle operations.
///
/// Every method has a default implementation (allow / no-op), so
/// implementors override only what they care about. `pre_*` methods may
/// veto by returning `false`, which aborts the operation before any
/// mutation.
///
/// Hooks run on the caller's thread, and `pre_create`/`pre_start` run
/// inside the event's transition guard. Implementations must return
/// promptly and must not call back into lifecycle operations on the same
/// event.
pub trait LifecycleHooks: Send + Sync {
    fn pre_create(&self, _event: &Event) -> bool {
        true
    }

    fn post_create(&self, _event: &Event) {}

    fn pre_start(&self, _event: &Event) -> bool {
        true
    }

    fn post_start(&self, _event: &Event) {}

    fn post_end(&self, _event: &Event, _reason: EndReason) {}

    fn pre_join(&self, _participant: ParticipantId, _event: &Event) -> bool {
        true
    }

    fn post_join(&self, _participant: ParticipantId, _event: &Event) {}

    fn post_leave(&self, _participant: ParticipantId, _event: &Event, _reason: LeaveReason) {}

    /// Throttled periodic callback over active events; fires on the
    /// registry's slow cadence, not every tick.
    fn post_update(&self, _event: &Event) {}
}

/// Fans lifecycle callbacks out to every registered hook.
///
/// Pre-hooks are combined with AND: the first veto aborts and later
/// hooks are not consulted. Post-hooks are dispatched to each hook
/// independently; a post-hook has no way to abort the already-committed
/// operation.
#[derive(Default)]
pub struct HookBus {
    hooks: Vec<Arc<dyn LifecycleHooks>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Arc<dyn LifecycleHooks>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn pre_create(&self, event: &Event) -> bool {
        let allowed = self.hooks.iter().all(|h| h.pre_create(event));
        if !allowed {
            debug!(event_id = %event.id(), "create vetoed by hook");
        }
        allowed
    }

    pub(crate) fn post_create(&self, event: &Event) {
        for hook in &self.hooks {
            hook.post_create(event);
        }
    }

    pub(crate) fn pre_start(&self, event: &Event) -> bool {
        let allowed = self.hooks.iter().all(|h| h.pre_start(event));
        if !allowed {
            debug!(event_id = %event.id(), "start vetoed by hook");
        }
        allowed
    }

    pub(crate) fn post_start(&self, event: &Event) {
        for hook in &self.hooks {
            hook.post_start(event);
        }
    }

    pub(crate) fn post_end(&self, event: &Event, reason: EndReason) {
        for hook in &self.hooks {
            hook.post_end(event, reason);
        }
    }

    pub(crate) fn pre_join(&self, participant: ParticipantId, event: &Event) -> bool {
        let allowed = self.hooks.iter().all(|h| h.pre_join(participant, event));
        if !allowed {
            debug!(event_id = %event.id(), %participant, "join vetoed by hook");
        }
        allowed
    }

    pub(crate) fn post_join(&self, participant: ParticipantId, event: &Event) {
        for hook in &self.hooks {
            hook.post_join(participant, event);
        }
    }

    pub(crate) fn post_leave(
        &self,
        participant: ParticipantId,
        event: &Event,
        reason: LeaveReason,
    ) {
        for hook in &self.hooks {
            hook.post_leave(participant, event, reason);
        }
    }

    pub(crate) fn post_update(&self, event: &Event) {
        for hook in &self.hooks {
            hook.post_update(event);
        }
    }
}
