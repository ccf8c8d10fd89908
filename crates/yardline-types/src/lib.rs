//! Shared type definitions for the Yardline yard scheduling panel.
//!
//! This crate is the single source of truth for the panel data model.
//! Types defined here flow downstream to `TypeScript` via `ts-rs` for the
//! admin, operator and driver pages.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (carriers, sessions)
//! - [`enums`] -- Record status, confirmation, roles, and both
//!   day-of-week conventions
//! - [`structs`] -- Carriers, loads, schedule entries, queue records, and
//!   the [`PanelState`] aggregate

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BackendDay, Confirmation, DISPLAY_ORDER, DisplayDay, RecordStatus, Role};
pub use ids::{CarrierId, SessionId};
pub use structs::{Carrier, DaySlot, Load, PanelState, QueueRecord, ScheduleEntry, TodaySlot};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Writes into `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::CarrierId::export_all();
        let _ = crate::ids::SessionId::export_all();

        let _ = crate::enums::RecordStatus::export_all();
        let _ = crate::enums::Confirmation::export_all();
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::BackendDay::export_all();
        let _ = crate::enums::DisplayDay::export_all();

        let _ = crate::structs::Carrier::export_all();
        let _ = crate::structs::Load::export_all();
        let _ = crate::structs::DaySlot::export_all();
        let _ = crate::structs::ScheduleEntry::export_all();
        let _ = crate::structs::TodaySlot::export_all();
        let _ = crate::structs::QueueRecord::export_all();
        let _ = crate::structs::PanelState::export_all();
    }
}
