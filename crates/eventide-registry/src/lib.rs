//! The event lifecycle registry.
//!
//! [`EventRegistry`] owns the authoritative concurrent map of all events
//! and mediates every mutation: creation, the state-machine transitions,
//! participant admission, and the periodic tick that auto-starts and
//! auto-ends events by wall clock.
//!
//! Per-event transitions are serialized by a single-writer guard inside
//! [`Event`]; different events never contend with each other. Persistence
//! is fire-and-forget through the store writer, and external collaborators
//! plug in at two seams: [`LifecycleHooks`] (vetoable pre/post callbacks)
//! and [`Announcer`].
//!
//! # Key types
//!
//! - [`Event`] — one live event with its own concurrency guards
//! - [`EventRegistry`] — the lifecycle API and tick
//! - [`HookBus`] / [`LifecycleHooks`] — pre/post callback fan-out
//! - [`Announcer`] — outward notifications
//! - [`EventFilter`] / [`EventOrder`] — read-side query policies

mod announcer;
mod config;
mod error;
mod event;
mod filter;
mod hooks;
mod registry;

pub use announcer::{AnnounceKind, Announcer, LogAnnouncer};
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use event::{Event, EventParams};
pub use filter::{EventFilter, EventOrder};
pub use hooks::{EndReason, HookBus, LeaveReason, LifecycleHooks};
pub use registry::EventRegistry;
