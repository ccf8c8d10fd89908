//! Carrier registrations and the day's load list.
//!
//! Load sequence numbers are positional: after any edit the loads are
//! numbered `1..=N` in order. Rows are only appended or removed at the
//! end, so a load never changes number while it exists.

use serde::Deserialize;
use yardline_types::{Carrier, CarrierId, Load, PanelState};

use crate::queue::sequence_at;

/// Most load rows a panel may hold.
pub const MAX_LOADS: usize = 1_000;

/// Reasons a registry operation is declined. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required field was empty.
    #[error("required field is empty: {field}")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// No carrier with this id.
    #[error("carrier {id} not found")]
    CarrierNotFound {
        /// Requested id.
        id: CarrierId,
    },

    /// No load with this sequence number.
    #[error("load {sequence} not found")]
    LoadNotFound {
        /// Requested sequence number.
        sequence: u32,
    },

    /// Asked to remove more loads than exist.
    #[error("cannot remove {requested} loads, only {available} exist")]
    NotEnoughLoads {
        /// Rows the caller asked to remove.
        requested: u32,
        /// Rows currently present.
        available: usize,
    },

    /// A row count of zero.
    #[error("count must be at least 1")]
    InvalidCount,

    /// The load list would grow past [`MAX_LOADS`].
    #[error("panel would hold {requested} loads, at most {max} allowed")]
    TooManyLoads {
        /// Rows the panel would hold.
        requested: usize,
        /// The limit.
        max: usize,
    },
}

impl RegistryError {
    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::CarrierNotFound { .. } | Self::LoadNotFound { .. } => "not_found",
            Self::NotEnoughLoads { .. } => "not_enough_loads",
            Self::InvalidCount => "invalid_count",
            Self::TooManyLoads { .. } => "too_many_loads",
        }
    }
}

/// Fields for a new carrier registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarrierDraft {
    /// Company name (required).
    pub name: String,
    /// Driver name (required).
    pub driver_name: String,
    /// Driver contact (required).
    pub driver_contact: String,
    /// Responsible person.
    #[serde(default)]
    pub responsible_name: Option<String>,
    /// Responsible person's contact.
    #[serde(default)]
    pub responsible_contact: Option<String>,
}

/// Partial update of a registration. Absent or blank fields keep the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarrierPatch {
    /// New company name.
    #[serde(default)]
    pub name: Option<String>,
    /// New driver name.
    #[serde(default)]
    pub driver_name: Option<String>,
    /// New driver contact.
    #[serde(default)]
    pub driver_contact: Option<String>,
    /// New responsible person.
    #[serde(default)]
    pub responsible_name: Option<String>,
    /// New responsible contact.
    #[serde(default)]
    pub responsible_contact: Option<String>,
}

// ---------------------------------------------------------------------------
// Carriers
// ---------------------------------------------------------------------------

/// Register a carrier/driver row.
pub fn register_carrier(
    panel: &mut PanelState,
    draft: &CarrierDraft,
) -> Result<Carrier, RegistryError> {
    let carrier = Carrier {
        id: CarrierId::new(),
        name: required(&draft.name, "name")?,
        driver_name: required(&draft.driver_name, "driver_name")?,
        driver_contact: required(&draft.driver_contact, "driver_contact")?,
        responsible_name: optional(draft.responsible_name.as_deref()),
        responsible_contact: optional(draft.responsible_contact.as_deref()),
    };

    panel.carriers.push(carrier.clone());
    tracing::info!(id = %carrier.id, name = carrier.name, "Carrier registered");
    Ok(carrier)
}

/// Apply a partial update to a registration.
pub fn update_carrier(
    panel: &mut PanelState,
    id: CarrierId,
    patch: &CarrierPatch,
) -> Result<Carrier, RegistryError> {
    let carrier = panel
        .carriers
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(RegistryError::CarrierNotFound { id })?;

    merge(&mut carrier.name, patch.name.as_deref());
    merge(&mut carrier.driver_name, patch.driver_name.as_deref());
    merge(&mut carrier.driver_contact, patch.driver_contact.as_deref());
    merge(&mut carrier.responsible_name, patch.responsible_name.as_deref());
    merge(
        &mut carrier.responsible_contact,
        patch.responsible_contact.as_deref(),
    );

    Ok(carrier.clone())
}

/// Delete a registration.
pub fn remove_carrier(panel: &mut PanelState, id: CarrierId) -> Result<Carrier, RegistryError> {
    let index = panel
        .carriers
        .iter()
        .position(|c| c.id == id)
        .ok_or(RegistryError::CarrierNotFound { id })?;
    let removed = panel.carriers.remove(index);
    tracing::info!(%id, name = removed.name, "Carrier removed");
    Ok(removed)
}

/// Distinct driver names registered under a carrier name, sorted.
pub fn drivers_for(carriers: &[Carrier], carrier: &str) -> Vec<String> {
    let carrier = carrier.trim();
    let mut drivers: Vec<String> = carriers
        .iter()
        .filter(|c| c.name.trim() == carrier)
        .map(|c| c.driver_name.trim().to_owned())
        .filter(|d| !d.is_empty())
        .collect();
    drivers.sort();
    drivers.dedup();
    drivers
}

// ---------------------------------------------------------------------------
// Loads
// ---------------------------------------------------------------------------

/// Append `count` blank load rows.
pub fn append_loads(panel: &mut PanelState, count: u32) -> Result<(), RegistryError> {
    if count == 0 {
        return Err(RegistryError::InvalidCount);
    }
    let requested = usize::try_from(count)
        .ok()
        .and_then(|count| panel.loads.len().checked_add(count))
        .unwrap_or(usize::MAX);
    check_load_limit(requested)?;

    for _ in 0..count {
        let sequence = sequence_at(panel.loads.len());
        panel.loads.push(Load {
            sequence,
            carrier: String::new(),
        });
    }
    Ok(())
}

/// Remove `count` load rows from the end.
pub fn remove_loads(panel: &mut PanelState, count: u32) -> Result<(), RegistryError> {
    if count == 0 {
        return Err(RegistryError::InvalidCount);
    }
    let requested = usize::try_from(count).unwrap_or(usize::MAX);
    let remaining = panel
        .loads
        .len()
        .checked_sub(requested)
        .ok_or(RegistryError::NotEnoughLoads {
            requested: count,
            available: panel.loads.len(),
        })?;
    panel.loads.truncate(remaining);
    Ok(())
}

/// Reject a load list longer than [`MAX_LOADS`].
pub const fn check_load_limit(len: usize) -> Result<(), RegistryError> {
    if len > MAX_LOADS {
        Err(RegistryError::TooManyLoads {
            requested: len,
            max: MAX_LOADS,
        })
    } else {
        Ok(())
    }
}

/// Set the carrier of one load row.
pub fn set_load_carrier(
    panel: &mut PanelState,
    sequence: u32,
    carrier: &str,
) -> Result<Load, RegistryError> {
    let load = panel
        .loads
        .iter_mut()
        .find(|l| l.sequence == sequence)
        .ok_or(RegistryError::LoadNotFound { sequence })?;
    carrier.trim().clone_into(&mut load.carrier);
    Ok(load.clone())
}

/// Renumber loads and queue records by position.
///
/// Used after a full-panel write, where the client may send rows with
/// stale or missing sequence numbers.
pub fn renumber(panel: &mut PanelState) {
    for (index, load) in panel.loads.iter_mut().enumerate() {
        load.sequence = sequence_at(index);
    }
    for (index, record) in panel.queue.iter_mut().enumerate() {
        record.sequence = sequence_at(index);
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RegistryError::MissingField { field })
    } else {
        Ok(trimmed.to_owned())
    }
}

fn optional(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

fn merge(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        value.clone_into(target);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn draft(name: &str, driver: &str) -> CarrierDraft {
        CarrierDraft {
            name: name.to_owned(),
            driver_name: driver.to_owned(),
            driver_contact: String::from("555-0100"),
            ..CarrierDraft::default()
        }
    }

    #[test]
    fn registration_requires_name_driver_and_contact() {
        let mut panel = PanelState::default();
        let mut d = draft("Acme", "Rui");
        d.driver_contact = String::from(" ");
        assert_eq!(
            register_carrier(&mut panel, &d),
            Err(RegistryError::MissingField {
                field: "driver_contact"
            })
        );
        assert!(panel.carriers.is_empty());

        let carrier = register_carrier(&mut panel, &draft(" Acme ", "Rui")).unwrap();
        assert_eq!(carrier.name, "Acme");
        assert_eq!(carrier.responsible_name, "");
    }

    #[test]
    fn blank_patch_fields_keep_stored_values() {
        let mut panel = PanelState::default();
        let carrier = register_carrier(&mut panel, &draft("Acme", "Rui")).unwrap();
        let patch = CarrierPatch {
            driver_name: Some(String::from("  ")),
            responsible_name: Some(String::from("Ana")),
            ..CarrierPatch::default()
        };
        let updated = update_carrier(&mut panel, carrier.id, &patch).unwrap();
        assert_eq!(updated.driver_name, "Rui");
        assert_eq!(updated.responsible_name, "Ana");
    }

    #[test]
    fn unknown_carrier_is_not_found() {
        let mut panel = PanelState::default();
        let id = CarrierId::new();
        assert_eq!(
            remove_carrier(&mut panel, id),
            Err(RegistryError::CarrierNotFound { id })
        );
    }

    #[test]
    fn drivers_are_grouped_by_carrier_name() {
        let mut panel = PanelState::default();
        register_carrier(&mut panel, &draft("Acme", "Rui")).unwrap();
        register_carrier(&mut panel, &draft("Acme", "Ana")).unwrap();
        register_carrier(&mut panel, &draft("Acme", "Rui")).unwrap();
        register_carrier(&mut panel, &draft("Beta", "Zé")).unwrap();

        assert_eq!(drivers_for(&panel.carriers, "Acme"), vec!["Ana", "Rui"]);
        assert_eq!(drivers_for(&panel.carriers, " Beta "), vec!["Zé"]);
    }

    #[test]
    fn loads_are_numbered_positionally() {
        let mut panel = PanelState::default();
        append_loads(&mut panel, 3).unwrap();
        remove_loads(&mut panel, 1).unwrap();
        append_loads(&mut panel, 1).unwrap();
        let numbers: Vec<u32> = panel.loads.iter().map(|l| l.sequence).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn removing_too_many_loads_is_rejected() {
        let mut panel = PanelState::default();
        append_loads(&mut panel, 2).unwrap();
        assert_eq!(
            remove_loads(&mut panel, 3),
            Err(RegistryError::NotEnoughLoads {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(panel.loads.len(), 2);
        assert_eq!(append_loads(&mut panel, 0), Err(RegistryError::InvalidCount));
    }

    #[test]
    fn load_list_is_capped() {
        let mut panel = PanelState::default();
        let max = u32::try_from(MAX_LOADS).unwrap();
        append_loads(&mut panel, max - 1).unwrap();
        assert_eq!(
            append_loads(&mut panel, 2),
            Err(RegistryError::TooManyLoads {
                requested: MAX_LOADS + 1,
                max: MAX_LOADS
            })
        );
        assert_eq!(panel.loads.len(), MAX_LOADS - 1);

        assert!(matches!(
            append_loads(&mut panel, u32::MAX),
            Err(RegistryError::TooManyLoads { .. })
        ));
        append_loads(&mut panel, 1).unwrap();
        assert_eq!(panel.loads.len(), MAX_LOADS);
    }

    #[test]
    fn set_load_carrier_targets_sequence() {
        let mut panel = PanelState::default();
        append_loads(&mut panel, 2).unwrap();
        set_load_carrier(&mut panel, 2, " Acme ").unwrap();
        assert_eq!(panel.loads[1].carrier, "Acme");
        assert!(set_load_carrier(&mut panel, 9, "x").is_err());
    }

    #[test]
    fn renumber_fixes_stale_sequences() {
        let mut panel = PanelState::default();
        panel.loads = vec![
            Load {
                sequence: 7,
                carrier: String::from("A"),
            },
            Load {
                sequence: 0,
                carrier: String::from("B"),
            },
        ];
        renumber(&mut panel);
        assert_eq!(panel.loads[0].sequence, 1);
        assert_eq!(panel.loads[1].sequence, 2);
    }
}
