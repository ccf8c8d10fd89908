//! Domain logic for the Yardline yard scheduling panel.
//!
//! Everything in this crate is pure: operations take a
//! [`PanelState`](yardline_types::PanelState) (or a piece of it), mutate
//! it in place, and report a typed rejection when a precondition fails.
//! Persistence, locking and broadcasting belong to the callers.
//!
//! # Modules
//!
//! - [`queue`] -- Departure queue advancement (depart, skip, resync, reset)
//! - [`schedule`] -- Weekly schedule edits and same-day confirmation
//! - [`registry`] -- Carrier registrations and the day's load list
//! - [`guard`] -- Reset passphrase check
//! - [`clock`] -- Source of "today"
//! - [`config`] -- YAML configuration

pub mod clock;
pub mod config;
pub mod guard;
pub mod queue;
pub mod registry;
pub mod schedule;

pub use clock::Clock;
pub use config::{ConfigError, YardConfig};
pub use guard::{PassphraseCheck, StaticPassphrase};
pub use queue::{Departure, QueueCounts, QueueOutcome, QueueRejection};
pub use registry::{CarrierDraft, CarrierPatch, RegistryError};
pub use schedule::ScheduleRejection;
