//! Departure queue advancement.
//!
//! The queue is one [`QueueRecord`] per load plus a pointer naming the
//! record currently eligible for action. Every operation here mutates a
//! [`PanelState`] in place and either succeeds with a [`QueueOutcome`] or
//! declines with a [`QueueRejection`], leaving the panel untouched.
//!
//! # Pointer rules
//!
//! - `mark_departed` on the pointed-at record scans forward to the next
//!   `pending` record (or `None` when nothing is left).
//! - `skip` moves the pointer forward by exactly one position, without
//!   scanning. When the last record is skipped the pointer ends up past
//!   the end of the queue, which [`is_complete`] reports as complete.
//! - A `skipped` record may be completed out of order at any time; that
//!   never moves the pointer.
//! - [`resync`] pulls the pointer back to a `pending` record below it,
//!   which only load edits can produce.
//!
//! Callers are expected to serialize access (one writer at a time); the
//! functions themselves hold no locks.

use serde::Serialize;
use yardline_types::{Carrier, CarrierId, Load, PanelState, QueueRecord, RecordStatus};

use crate::guard::PassphraseCheck;

/// Reasons a queue operation is declined. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueRejection {
    /// A required field was empty.
    #[error("required field is empty: {field}")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// The record is not the one currently awaiting action.
    #[error("record {sequence} is out of turn (current record: {pointer:?})")]
    OutOfTurn {
        /// Sequence number the caller acted on.
        sequence: u32,
        /// Pointer at the time of the call.
        pointer: Option<u32>,
    },

    /// No record carries this sequence number.
    #[error("no queue record with sequence {sequence}")]
    NotFound {
        /// Sequence number the caller asked for.
        sequence: u32,
    },

    /// The record already departed and can no longer be edited.
    #[error("record {sequence} has already departed")]
    AlreadyDeparted {
        /// Sequence number of the departed record.
        sequence: u32,
    },

    /// The reset confirmation passphrase did not match.
    #[error("reset passphrase rejected")]
    WrongPassphrase,
}

impl QueueRejection {
    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::OutOfTurn { .. } => "out_of_turn",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyDeparted { .. } => "already_departed",
            Self::WrongPassphrase => "wrong_passphrase",
        }
    }
}

/// Fields recorded when a load leaves the yard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Departure {
    /// Driver who took the load out.
    pub driver_name: String,
    /// Departure time (`HH:MM`).
    pub time: String,
    /// Departure date (`YYYY-MM-DD`).
    pub date: String,
}

/// Queue position after a successful operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueOutcome {
    /// New pointer value.
    pub pointer: Option<u32>,
    /// Whether no actionable record remains.
    pub complete: bool,
}

/// Per-status tallies of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    /// Records still waiting.
    pub pending: usize,
    /// Records that left the yard.
    pub departed: usize,
    /// Records passed over.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Mark a record as departed.
///
/// Allowed on the pointed-at record, or on any `skipped` record
/// (out-of-order completion). Only the former advances the pointer.
pub fn mark_departed(
    panel: &mut PanelState,
    sequence: u32,
    departure: &Departure,
) -> Result<QueueOutcome, QueueRejection> {
    let driver_name = required(&departure.driver_name, "driver_name")?;
    let time = required(&departure.time, "time")?;
    let date = required(&departure.date, "date")?;

    let index = locate(&panel.queue, sequence)?;
    let at_pointer = panel.pointer == Some(sequence);

    let record = panel
        .queue
        .get_mut(index)
        .ok_or(QueueRejection::NotFound { sequence })?;

    if !at_pointer && record.status != RecordStatus::Skipped {
        return Err(QueueRejection::OutOfTurn {
            sequence,
            pointer: panel.pointer,
        });
    }

    record.driver_name = driver_name.to_owned();
    record.time = time.to_owned();
    record.date = date.to_owned();
    record.status = RecordStatus::Departed;

    if at_pointer {
        panel.pointer = next_pending_after(&panel.queue, index);
    }

    tracing::debug!(
        sequence,
        out_of_order = !at_pointer,
        pointer = ?panel.pointer,
        "Record marked departed"
    );

    Ok(outcome(panel))
}

/// Skip the pointed-at record.
///
/// The pointer moves to `sequence + 1` unconditionally, even when that
/// position does not hold a `pending` record.
pub fn skip(panel: &mut PanelState, sequence: u32) -> Result<QueueOutcome, QueueRejection> {
    if panel.pointer != Some(sequence) {
        return Err(QueueRejection::OutOfTurn {
            sequence,
            pointer: panel.pointer,
        });
    }

    let index = locate(&panel.queue, sequence)?;
    let record = panel
        .queue
        .get_mut(index)
        .ok_or(QueueRejection::NotFound { sequence })?;

    record.status = RecordStatus::Skipped;
    panel.pointer = Some(sequence.saturating_add(1));

    tracing::debug!(sequence, pointer = ?panel.pointer, "Record skipped");

    Ok(outcome(panel))
}

/// Record the driver for a record that has not departed yet, and mirror
/// it into the carrier registrations.
///
/// When the (carrier, driver) pair is not registered yet, the first row
/// for that carrier takes the new driver name; a carrier with no row at
/// all gets a minimal one. Such a row has no contact fields, unlike rows
/// created through the registry, and is completed with
/// [`update_carrier`](crate::registry::update_carrier).
pub fn assign_driver(
    panel: &mut PanelState,
    sequence: u32,
    driver_name: &str,
) -> Result<(), QueueRejection> {
    let driver_name = required(driver_name, "driver_name")?;
    let index = locate(&panel.queue, sequence)?;
    let record = panel
        .queue
        .get_mut(index)
        .ok_or(QueueRejection::NotFound { sequence })?;

    if record.status == RecordStatus::Departed {
        return Err(QueueRejection::AlreadyDeparted { sequence });
    }

    driver_name.clone_into(&mut record.driver_name);
    let carrier = record.carrier.trim().to_owned();

    if carrier.is_empty() {
        return Ok(());
    }

    let known = panel
        .carriers
        .iter()
        .any(|c| c.name.trim() == carrier && c.driver_name.trim() == driver_name);

    if known {
        return Ok(());
    }

    if let Some(row) = panel.carriers.iter_mut().find(|c| c.name.trim() == carrier) {
        driver_name.clone_into(&mut row.driver_name);
        tracing::info!(sequence, driver = driver_name, "Updated carrier driver from queue");
    } else {
        panel.carriers.push(Carrier {
            id: CarrierId::new(),
            name: carrier,
            driver_name: driver_name.to_owned(),
            driver_contact: String::new(),
            responsible_name: String::new(),
            responsible_contact: String::new(),
        });
        tracing::info!(sequence, driver = driver_name, "Registered driver from queue");
    }

    Ok(())
}

/// Rebuild the record list so it has exactly one record per load.
///
/// Prior records are kept by position (fields and status); new loads get
/// fresh `pending` records. The carrier name follows the load unless the
/// load row is blank. Running it twice gives the same result.
pub fn resync_records(loads: &[Load], prior: &[QueueRecord]) -> Vec<QueueRecord> {
    loads
        .iter()
        .enumerate()
        .map(|(index, load)| {
            let sequence = sequence_at(index);
            prior.get(index).map_or_else(
                || QueueRecord::pending(sequence, load.carrier.clone()),
                |existing| {
                    let carrier = if load.carrier.trim().is_empty() {
                        existing.carrier.clone()
                    } else {
                        load.carrier.clone()
                    };
                    QueueRecord {
                        sequence,
                        carrier,
                        ..existing.clone()
                    }
                },
            )
        })
        .collect()
}

/// Re-synchronize the panel's queue against its loads.
///
/// A null pointer is recomputed as the lowest `pending` record, so loads
/// appended after the queue finished become actionable. A non-null pointer
/// only moves back, and only when a `pending` record sits below it (loads
/// removed and re-added at the end); a pointer resting on resolved records
/// after a skip stays put.
pub fn resync(panel: &mut PanelState) -> QueueOutcome {
    panel.queue = resync_records(&panel.loads, &panel.queue);

    let lowest = lowest_pending(&panel.queue);
    panel.pointer = match (panel.pointer, lowest) {
        (None, _) => lowest,
        (Some(pointer), Some(pending)) if pending < pointer => {
            tracing::debug!(pointer, pending, "Pointer moved back to pending record");
            Some(pending)
        }
        (current, _) => current,
    };

    outcome(panel)
}

/// Clear every record and point back at sequence 1.
///
/// Requires the reset passphrase; a wrong one leaves the panel untouched.
pub fn reset(
    panel: &mut PanelState,
    guard: &dyn PassphraseCheck,
    passphrase: &str,
) -> Result<QueueOutcome, QueueRejection> {
    if !guard.verify(passphrase) {
        tracing::warn!("Queue reset attempted with wrong passphrase");
        return Err(QueueRejection::WrongPassphrase);
    }

    let cleared = panel.queue.len();
    panel.queue.clear();
    panel.pointer = Some(1);

    tracing::info!(cleared, "Departure queue reset");

    Ok(outcome(panel))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Whether no `pending` record remains at or after the pointer.
pub fn is_complete(panel: &PanelState) -> bool {
    panel.pointer.is_none_or(|pointer| {
        !panel
            .queue
            .iter()
            .any(|r| r.sequence >= pointer && r.status == RecordStatus::Pending)
    })
}

/// Lowest `pending` record at or after the pointer.
///
/// For display only: after a skip the pointer can name a record that is
/// already resolved, and views highlight this one instead.
pub fn next_actionable(panel: &PanelState) -> Option<u32> {
    let pointer = panel.pointer?;
    panel
        .queue
        .iter()
        .find(|r| r.sequence >= pointer && r.status == RecordStatus::Pending)
        .map(|r| r.sequence)
}

/// Count records per status.
pub fn counts(panel: &PanelState) -> QueueCounts {
    panel
        .queue
        .iter()
        .fold(QueueCounts::default(), |mut acc, record| {
            match record.status {
                RecordStatus::Pending => acc.pending = acc.pending.saturating_add(1),
                RecordStatus::Departed => acc.departed = acc.departed.saturating_add(1),
                RecordStatus::Skipped => acc.skipped = acc.skipped.saturating_add(1),
            }
            acc
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Index of the record with the given sequence number.
fn locate(queue: &[QueueRecord], sequence: u32) -> Result<usize, QueueRejection> {
    usize::try_from(sequence)
        .ok()
        .and_then(|s| s.checked_sub(1))
        .filter(|index| *index < queue.len())
        .ok_or(QueueRejection::NotFound { sequence })
}

/// Sequence number of the record at `index`.
pub(crate) fn sequence_at(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1)
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, QueueRejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(QueueRejection::MissingField { field })
    } else {
        Ok(trimmed)
    }
}

fn next_pending_after(queue: &[QueueRecord], index: usize) -> Option<u32> {
    queue
        .iter()
        .skip(index.saturating_add(1))
        .find(|r| r.status == RecordStatus::Pending)
        .map(|r| r.sequence)
}

fn lowest_pending(queue: &[QueueRecord]) -> Option<u32> {
    queue
        .iter()
        .find(|r| r.status == RecordStatus::Pending)
        .map(|r| r.sequence)
}

fn outcome(panel: &PanelState) -> QueueOutcome {
    QueueOutcome {
        pointer: panel.pointer,
        complete: is_complete(panel),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::guard::StaticPassphrase;

    fn panel_with_loads(carriers: &[&str]) -> PanelState {
        let mut panel = PanelState::default();
        panel.loads = carriers
            .iter()
            .enumerate()
            .map(|(i, c)| Load {
                sequence: sequence_at(i),
                carrier: (*c).to_owned(),
            })
            .collect();
        resync(&mut panel);
        panel
    }

    fn departure(driver: &str) -> Departure {
        Departure {
            driver_name: driver.to_owned(),
            time: String::from("08:00"),
            date: String::from("2024-01-01"),
        }
    }

    #[test]
    fn skip_then_depart_then_complete_skipped_out_of_order() {
        let mut panel = panel_with_loads(&["A", "B", "C"]);
        assert_eq!(panel.pointer, Some(1));

        let out = skip(&mut panel, 1).unwrap();
        assert_eq!(panel.queue[0].status, RecordStatus::Skipped);
        assert_eq!(out.pointer, Some(2));

        let out = mark_departed(&mut panel, 2, &departure("João")).unwrap();
        assert_eq!(panel.queue[1].status, RecordStatus::Departed);
        assert_eq!(out.pointer, Some(3));

        let mut late = departure("Maria");
        late.time = String::from("09:00");
        let out = mark_departed(&mut panel, 1, &late).unwrap();
        assert_eq!(panel.queue[0].status, RecordStatus::Departed);
        assert_eq!(panel.queue[0].driver_name, "Maria");
        assert_eq!(out.pointer, Some(3));
        assert!(!out.complete);
    }

    #[test]
    fn skipping_the_only_record_moves_pointer_past_the_end() {
        let mut panel = panel_with_loads(&["A"]);
        let out = skip(&mut panel, 1).unwrap();
        assert_eq!(out.pointer, Some(2));
        assert!(out.complete);
        assert!(is_complete(&panel));
        assert_eq!(next_actionable(&panel), None);

        // Nothing at position 2 to act on.
        assert_eq!(
            skip(&mut panel, 2),
            Err(QueueRejection::NotFound { sequence: 2 })
        );
    }

    #[test]
    fn departing_the_last_record_nulls_the_pointer() {
        let mut panel = panel_with_loads(&["A", "B"]);
        mark_departed(&mut panel, 1, &departure("x")).unwrap();
        let out = mark_departed(&mut panel, 2, &departure("y")).unwrap();
        assert_eq!(out.pointer, None);
        assert!(out.complete);
    }

    #[test]
    fn departure_scans_past_resolved_records() {
        let mut panel = panel_with_loads(&["A", "B", "C", "D"]);
        // Force a departed record ahead of the pointer.
        panel.queue[1].status = RecordStatus::Departed;
        let out = mark_departed(&mut panel, 1, &departure("x")).unwrap();
        assert_eq!(out.pointer, Some(3));
    }

    #[test]
    fn out_of_turn_departure_is_declined() {
        let mut panel = panel_with_loads(&["A", "B"]);
        let before = panel.clone();
        let err = mark_departed(&mut panel, 2, &departure("x")).unwrap_err();
        assert_eq!(
            err,
            QueueRejection::OutOfTurn {
                sequence: 2,
                pointer: Some(1)
            }
        );
        assert_eq!(panel, before);
    }

    #[test]
    fn empty_fields_are_declined_without_mutation() {
        let mut panel = panel_with_loads(&["A"]);
        let before = panel.clone();

        let mut d = departure("x");
        d.driver_name = String::from("   ");
        assert_eq!(
            mark_departed(&mut panel, 1, &d),
            Err(QueueRejection::MissingField {
                field: "driver_name"
            })
        );

        let mut d = departure("x");
        d.time = String::new();
        assert_eq!(
            mark_departed(&mut panel, 1, &d),
            Err(QueueRejection::MissingField { field: "time" })
        );

        let mut d = departure("x");
        d.date = String::new();
        assert_eq!(
            mark_departed(&mut panel, 1, &d),
            Err(QueueRejection::MissingField { field: "date" })
        );

        assert_eq!(panel, before);
    }

    #[test]
    fn skip_out_of_turn_is_declined() {
        let mut panel = panel_with_loads(&["A", "B", "C"]);
        let before = panel.clone();
        assert!(matches!(
            skip(&mut panel, 3),
            Err(QueueRejection::OutOfTurn { .. })
        ));
        assert_eq!(panel, before);
    }

    #[test]
    fn sequence_zero_is_not_found() {
        let mut panel = panel_with_loads(&["A"]);
        panel.queue[0].status = RecordStatus::Skipped;
        assert_eq!(
            mark_departed(&mut panel, 0, &departure("x")),
            Err(QueueRejection::NotFound { sequence: 0 })
        );
    }

    #[test]
    fn departed_record_cannot_be_departed_again_out_of_turn() {
        let mut panel = panel_with_loads(&["A", "B"]);
        mark_departed(&mut panel, 1, &departure("x")).unwrap();
        assert!(matches!(
            mark_departed(&mut panel, 1, &departure("y")),
            Err(QueueRejection::OutOfTurn { .. })
        ));
        assert_eq!(panel.queue[0].driver_name, "x");
    }

    #[test]
    fn resync_preserves_status_by_position_and_adds_pending() {
        let mut panel = panel_with_loads(&["A", "B"]);
        skip(&mut panel, 1).unwrap();
        panel.loads.push(Load {
            sequence: 3,
            carrier: String::from("C"),
        });
        resync(&mut panel);

        assert_eq!(panel.queue.len(), 3);
        assert_eq!(panel.queue[0].status, RecordStatus::Skipped);
        assert_eq!(panel.queue[2], QueueRecord::pending(3, "C"));
        assert_eq!(panel.pointer, Some(2));
    }

    #[test]
    fn resync_truncates_when_loads_shrink() {
        let mut panel = panel_with_loads(&["A", "B", "C"]);
        panel.loads.truncate(1);
        resync(&mut panel);
        assert_eq!(panel.queue.len(), 1);
    }

    #[test]
    fn resync_is_idempotent() {
        let loads = vec![
            Load {
                sequence: 1,
                carrier: String::from("A"),
            },
            Load {
                sequence: 2,
                carrier: String::new(),
            },
        ];
        let mut prior = vec![QueueRecord::pending(1, "old"), QueueRecord::pending(2, "kept")];
        prior[0].status = RecordStatus::Departed;

        let once = resync_records(&loads, &prior);
        let twice = resync_records(&loads, &once);
        assert_eq!(once, twice);
        assert_eq!(once[0].carrier, "A");
        assert_eq!(once[1].carrier, "kept");
    }

    #[test]
    fn resync_revives_null_pointer_for_new_loads() {
        let mut panel = panel_with_loads(&["A"]);
        mark_departed(&mut panel, 1, &departure("x")).unwrap();
        assert_eq!(panel.pointer, None);

        panel.loads.push(Load {
            sequence: 2,
            carrier: String::from("B"),
        });
        let out = resync(&mut panel);
        assert_eq!(out.pointer, Some(2));
    }

    #[test]
    fn resync_moves_pointer_back_to_readded_pending_record() {
        let mut panel = panel_with_loads(&["A", "B", "C"]);
        mark_departed(&mut panel, 1, &departure("x")).unwrap();
        mark_departed(&mut panel, 2, &departure("y")).unwrap();
        assert_eq!(panel.pointer, Some(3));

        panel.loads.truncate(1);
        resync(&mut panel);
        assert_eq!(panel.pointer, Some(3));

        for sequence in 2..=3 {
            panel.loads.push(Load {
                sequence,
                carrier: String::from("D"),
            });
        }
        let out = resync(&mut panel);
        assert_eq!(out.pointer, Some(2));
        assert_eq!(next_actionable(&panel), Some(2));
        mark_departed(&mut panel, 2, &departure("z")).unwrap();
        assert_eq!(panel.pointer, Some(3));
    }

    #[test]
    fn resync_leaves_pointer_after_skip_alone() {
        let mut panel = panel_with_loads(&["A", "B"]);
        skip(&mut panel, 1).unwrap();
        skip(&mut panel, 2).unwrap();
        assert_eq!(panel.pointer, Some(3));
        let before = panel.clone();
        resync(&mut panel);
        assert_eq!(panel, before);
    }

    #[test]
    fn reset_requires_passphrase() {
        let guard = StaticPassphrase::new("secret");
        let mut panel = panel_with_loads(&["A", "B"]);
        skip(&mut panel, 1).unwrap();
        let before = panel.clone();

        assert_eq!(
            reset(&mut panel, &guard, "nope"),
            Err(QueueRejection::WrongPassphrase)
        );
        assert_eq!(panel, before);

        let out = reset(&mut panel, &guard, "secret").unwrap();
        assert!(panel.queue.is_empty());
        assert_eq!(out.pointer, Some(1));
    }

    #[test]
    fn assign_driver_registers_unknown_pair_once() {
        let mut panel = panel_with_loads(&["Acme"]);
        assign_driver(&mut panel, 1, " Rui ").unwrap();
        assign_driver(&mut panel, 1, "Rui").unwrap();

        assert_eq!(panel.queue[0].driver_name, "Rui");
        assert_eq!(panel.carriers.len(), 1);
        assert_eq!(panel.carriers[0].name, "Acme");
        assert_eq!(panel.carriers[0].driver_name, "Rui");
    }

    #[test]
    fn assign_driver_overwrites_first_row_of_known_carrier() {
        let mut panel = panel_with_loads(&["Acme"]);
        assign_driver(&mut panel, 1, "Rui").unwrap();
        panel.carriers[0].driver_contact = String::from("555-0100");

        assign_driver(&mut panel, 1, "Ana").unwrap();
        assert_eq!(panel.carriers.len(), 1);
        assert_eq!(panel.carriers[0].driver_name, "Ana");
        assert_eq!(panel.carriers[0].driver_contact, "555-0100");
        assert_eq!(panel.queue[0].driver_name, "Ana");
    }

    #[test]
    fn assign_driver_refuses_departed_records() {
        let mut panel = panel_with_loads(&["Acme"]);
        mark_departed(&mut panel, 1, &departure("x")).unwrap();
        assert_eq!(
            assign_driver(&mut panel, 1, "y"),
            Err(QueueRejection::AlreadyDeparted { sequence: 1 })
        );
    }

    #[test]
    fn counts_tally_each_status() {
        let mut panel = panel_with_loads(&["A", "B", "C"]);
        skip(&mut panel, 1).unwrap();
        mark_departed(&mut panel, 2, &departure("x")).unwrap();
        assert_eq!(
            counts(&panel),
            QueueCounts {
                pending: 1,
                departed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn departure_body_and_outcome_json() {
        let body: Departure = serde_json::from_str(
            r#"{"driver_name": "Rui", "time": "08:00", "date": "2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(body.driver_name, "Rui");

        let outcome = QueueOutcome {
            pointer: None,
            complete: true,
        };
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            serde_json::json!({"pointer": null, "complete": true})
        );
    }
}
