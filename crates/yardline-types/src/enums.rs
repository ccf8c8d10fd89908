//! Enumeration types for the Yardline panel.
//!
//! The two day-of-week conventions live here side by side. Storage and
//! every API path use [`BackendDay`] (0 = Sunday). The weekly tables the
//! views render are Monday-first, described by [`DisplayDay`]. The only
//! bridge between them is [`DisplayDay::to_backend`] /
//! [`BackendDay::to_display`], backed by [`DISPLAY_ORDER`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Queue record status
// ---------------------------------------------------------------------------

/// Live status of one queue record.
///
/// Allowed transitions: `Pending -> Departed`, `Pending -> Skipped`, and
/// `Skipped -> Departed` (out-of-order completion). `Departed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Waiting for its turn at the dock.
    #[default]
    Pending,
    /// The truck has left the yard.
    Departed,
    /// Passed over when its turn came; may still be completed later.
    Skipped,
}

impl RecordStatus {
    /// Whether the record no longer blocks the queue.
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// ---------------------------------------------------------------------------
// Schedule confirmation
// ---------------------------------------------------------------------------

/// Confirmation flag for one day slot of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// The carrier confirmed the slot for today.
    Confirmed,
    /// Not (or no longer) confirmed.
    #[default]
    NotConfirmed,
}

impl Confirmation {
    /// Return the opposite flag.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Confirmed => Self::NotConfirmed,
            Self::NotConfirmed => Self::Confirmed,
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role a user logs in as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registers carriers, edits loads and schedules, resets the queue.
    Admin,
    /// Works the departure queue and confirms today's slots.
    Operator,
    /// Read-only view of the queue and today's schedule.
    Driver,
}

impl Role {
    /// Whether this role may act on the departure queue.
    pub const fn can_operate(self) -> bool {
        matches!(self, Self::Admin | Self::Operator)
    }

    /// Whether this role may edit registrations, loads and schedules.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

// ---------------------------------------------------------------------------
// Day-of-week conventions
// ---------------------------------------------------------------------------

/// Day of week in storage order: 0 = Sunday .. 6 = Saturday.
///
/// Schedule slot arrays are indexed by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BackendDay {
    /// Index 0.
    Sunday,
    /// Index 1.
    Monday,
    /// Index 2.
    Tuesday,
    /// Index 3.
    Wednesday,
    /// Index 4.
    Thursday,
    /// Index 5.
    Friday,
    /// Index 6.
    Saturday,
}

impl BackendDay {
    /// All days in storage order.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Storage index (0 = Sunday).
    pub const fn index(self) -> usize {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Parse a raw storage index. Returns `None` outside `0..=6`.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Sunday),
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            _ => None,
        }
    }

    /// Column this day occupies in a Monday-first table.
    pub const fn to_display(self) -> DisplayDay {
        match self {
            Self::Monday => DisplayDay::Monday,
            Self::Tuesday => DisplayDay::Tuesday,
            Self::Wednesday => DisplayDay::Wednesday,
            Self::Thursday => DisplayDay::Thursday,
            Self::Friday => DisplayDay::Friday,
            Self::Saturday => DisplayDay::Saturday,
            Self::Sunday => DisplayDay::Sunday,
        }
    }
}

impl From<chrono::Weekday> for BackendDay {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl core::fmt::Display for BackendDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

/// Day of week in display order: 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DisplayDay {
    /// Column 0.
    Monday,
    /// Column 1.
    Tuesday,
    /// Column 2.
    Wednesday,
    /// Column 3.
    Thursday,
    /// Column 4.
    Friday,
    /// Column 5.
    Saturday,
    /// Column 6.
    Sunday,
}

/// Storage day shown in each display column, Monday first.
pub const DISPLAY_ORDER: [BackendDay; 7] = [
    BackendDay::Monday,
    BackendDay::Tuesday,
    BackendDay::Wednesday,
    BackendDay::Thursday,
    BackendDay::Friday,
    BackendDay::Saturday,
    BackendDay::Sunday,
];

impl DisplayDay {
    /// All columns in display order.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Display column (0 = Monday).
    pub const fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Parse a raw display column. Returns `None` outside `0..=6`.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Monday),
            1 => Some(Self::Tuesday),
            2 => Some(Self::Wednesday),
            3 => Some(Self::Thursday),
            4 => Some(Self::Friday),
            5 => Some(Self::Saturday),
            6 => Some(Self::Sunday),
            _ => None,
        }
    }

    /// Storage day behind this display column.
    pub const fn to_backend(self) -> BackendDay {
        match self {
            Self::Monday => BackendDay::Monday,
            Self::Tuesday => BackendDay::Tuesday,
            Self::Wednesday => BackendDay::Wednesday,
            Self::Thursday => BackendDay::Thursday,
            Self::Friday => BackendDay::Friday,
            Self::Saturday => BackendDay::Saturday,
            Self::Sunday => BackendDay::Sunday,
        }
    }
}
