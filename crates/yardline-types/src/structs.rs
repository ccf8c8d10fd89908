//! Core entity structs for the Yardline panel.
//!
//! [`PanelState`] is the single aggregate that the state store persists
//! and the broadcast channel pushes to every connected view. Everything
//! else in this module is a row inside it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BackendDay, Confirmation, RecordStatus};
use crate::ids::CarrierId;

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// A registered trucking company with one of its drivers.
///
/// A company with several drivers has several rows sharing `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Carrier {
    /// Surrogate key.
    pub id: CarrierId,
    /// Company name. Loads and schedule entries refer to carriers by name.
    pub name: String,
    /// Driver name.
    pub driver_name: String,
    /// Driver phone or other contact.
    pub driver_contact: String,
    /// Person responsible at the company (may be empty).
    #[serde(default)]
    pub responsible_name: String,
    /// Contact of the responsible person (may be empty).
    #[serde(default)]
    pub responsible_contact: String,
}

/// One expected truck visit for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Load {
    /// Positional sequence number, `1..=N`.
    pub sequence: u32,
    /// Carrier name; empty until the admin fills the row in.
    #[serde(default)]
    pub carrier: String,
}

// ---------------------------------------------------------------------------
// Weekly schedule
// ---------------------------------------------------------------------------

/// One day of a carrier's weekly commitment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DaySlot {
    /// Time of day (`HH:MM`); empty when the carrier has no slot that day.
    #[serde(default)]
    pub time: String,
    /// Confirmation flag for the slot.
    #[serde(default)]
    pub status: Confirmation,
}

impl DaySlot {
    /// Whether a time of day is set for this slot.
    pub fn is_scheduled(&self) -> bool {
        !self.time.trim().is_empty()
    }
}

/// A carrier's recurring weekly delivery times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScheduleEntry {
    /// Carrier name (one entry per carrier).
    pub carrier: String,
    /// Seven slots indexed by [`BackendDay`] (0 = Sunday).
    pub slots: [DaySlot; 7],
}

impl ScheduleEntry {
    /// Create an entry with every slot empty and unconfirmed.
    pub fn new(carrier: impl Into<String>) -> Self {
        Self {
            carrier: carrier.into(),
            slots: Default::default(),
        }
    }

    /// Slot for the given storage day.
    pub fn slot(&self, day: BackendDay) -> Option<&DaySlot> {
        self.slots.get(day.index())
    }

    /// Mutable slot for the given storage day.
    pub fn slot_mut(&mut self, day: BackendDay) -> Option<&mut DaySlot> {
        self.slots.get_mut(day.index())
    }
}

/// A slot scheduled for today, as listed on the driver view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TodaySlot {
    /// Carrier name.
    pub carrier: String,
    /// Scheduled time of day.
    pub time: String,
    /// Whether it has been confirmed.
    pub status: Confirmation,
}

// ---------------------------------------------------------------------------
// Departure queue
// ---------------------------------------------------------------------------

/// Live status of one load as it moves through the departure queue.
///
/// Record `i` always corresponds to load `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueueRecord {
    /// Sequence number, equal to the matching load's.
    pub sequence: u32,
    /// Carrier name copied from the load.
    #[serde(default)]
    pub carrier: String,
    /// Driver who took the load out.
    #[serde(default)]
    pub driver_name: String,
    /// Departure time (`HH:MM`).
    #[serde(default)]
    pub time: String,
    /// Departure date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: String,
    /// Current status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl QueueRecord {
    /// Fresh `pending` record with empty fields.
    pub fn pending(sequence: u32, carrier: impl Into<String>) -> Self {
        Self {
            sequence,
            carrier: carrier.into(),
            driver_name: String::new(),
            time: String::new(),
            date: String::new(),
            status: RecordStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The full shared panel state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PanelState {
    /// Carrier registrations.
    #[serde(default)]
    pub carriers: Vec<Carrier>,
    /// Today's loads, ordered by sequence number.
    #[serde(default)]
    pub loads: Vec<Load>,
    /// Weekly schedule, one entry per carrier.
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    /// Departure queue records, positionally matched to `loads`.
    #[serde(default)]
    pub queue: Vec<QueueRecord>,
    /// Sequence number of the record awaiting action; `None` once the
    /// queue has been worked through.
    #[serde(default = "default_pointer")]
    pub pointer: Option<u32>,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_pointer() -> Option<u32> {
    Some(1)
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            carriers: Vec::new(),
            loads: Vec::new(),
            schedule: Vec::new(),
            queue: Vec::new(),
            pointer: default_pointer(),
        }
    }
}
