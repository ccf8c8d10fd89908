//! Weekly schedule editing and same-day confirmation.
//!
//! Each carrier has at most one [`ScheduleEntry`] with seven slots indexed
//! by [`BackendDay`]. Operators can only confirm (or unconfirm) slots for
//! the current day, and only slots that actually have a time set.

use yardline_types::{BackendDay, Confirmation, ScheduleEntry, TodaySlot};

/// Reasons a schedule operation is declined. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleRejection {
    /// Confirmation attempted for a day other than today.
    #[error("only today's slots can be confirmed (requested {day}, today is {today})")]
    NotToday {
        /// Day the caller asked for.
        day: BackendDay,
        /// The current day.
        today: BackendDay,
    },

    /// The slot has no time of day, so there is nothing to confirm.
    #[error("{carrier} has no slot on {day}")]
    EmptySlot {
        /// Carrier name.
        carrier: String,
        /// Requested day.
        day: BackendDay,
    },

    /// No schedule entry exists for the carrier.
    #[error("no schedule entry for carrier {carrier}")]
    NotFound {
        /// Carrier name that was looked up.
        carrier: String,
    },

    /// The carrier already has an entry.
    #[error("carrier {carrier} already has a schedule entry")]
    Duplicate {
        /// Carrier name.
        carrier: String,
    },

    /// Carrier name was empty.
    #[error("carrier name is required")]
    MissingCarrier,
}

impl ScheduleRejection {
    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotToday { .. } => "not_today",
            Self::EmptySlot { .. } => "empty_slot",
            Self::NotFound { .. } => "not_found",
            Self::Duplicate { .. } => "duplicate",
            Self::MissingCarrier => "missing_field",
        }
    }
}

/// Flip the confirmation flag of one carrier's slot for `day`.
///
/// `day` must equal `today` and the slot must have a time set. The stored
/// time is never altered. Returns the new flag.
pub fn toggle_confirmation(
    schedule: &mut [ScheduleEntry],
    carrier: &str,
    day: BackendDay,
    today: BackendDay,
) -> Result<Confirmation, ScheduleRejection> {
    if day != today {
        return Err(ScheduleRejection::NotToday { day, today });
    }

    let entry = find_mut(schedule, carrier)?;
    let slot = entry
        .slot_mut(day)
        .filter(|slot| slot.is_scheduled())
        .ok_or_else(|| ScheduleRejection::EmptySlot {
            carrier: carrier.trim().to_owned(),
            day,
        })?;

    slot.status = slot.status.toggled();

    tracing::info!(carrier, %day, status = ?slot.status, "Schedule confirmation toggled");

    Ok(slot.status)
}

/// Add an entry for a carrier, optionally with initial times (indexed by
/// storage day). All slots start unconfirmed.
pub fn add_entry(
    schedule: &mut Vec<ScheduleEntry>,
    carrier: &str,
    times: Option<&[String; 7]>,
) -> Result<(), ScheduleRejection> {
    let carrier = carrier.trim();
    if carrier.is_empty() {
        return Err(ScheduleRejection::MissingCarrier);
    }
    if schedule.iter().any(|e| e.carrier.trim() == carrier) {
        return Err(ScheduleRejection::Duplicate {
            carrier: carrier.to_owned(),
        });
    }

    let mut entry = ScheduleEntry::new(carrier);
    if let Some(times) = times {
        for (slot, time) in entry.slots.iter_mut().zip(times) {
            time.trim().clone_into(&mut slot.time);
        }
    }
    schedule.push(entry);
    Ok(())
}

/// Set the time of day for one slot. Clearing the time also clears its
/// confirmation.
pub fn set_slot_time(
    schedule: &mut [ScheduleEntry],
    carrier: &str,
    day: BackendDay,
    time: &str,
) -> Result<(), ScheduleRejection> {
    let entry = find_mut(schedule, carrier)?;
    let carrier_name = entry.carrier.clone();
    let slot = entry
        .slot_mut(day)
        .ok_or(ScheduleRejection::EmptySlot {
            carrier: carrier_name,
            day,
        })?;

    time.trim().clone_into(&mut slot.time);
    if !slot.is_scheduled() {
        slot.status = Confirmation::NotConfirmed;
    }
    Ok(())
}

/// Remove a carrier's entry.
pub fn remove_entry(
    schedule: &mut Vec<ScheduleEntry>,
    carrier: &str,
) -> Result<ScheduleEntry, ScheduleRejection> {
    let carrier = carrier.trim();
    let index = schedule
        .iter()
        .position(|e| e.carrier.trim() == carrier)
        .ok_or_else(|| ScheduleRejection::NotFound {
            carrier: carrier.to_owned(),
        })?;
    Ok(schedule.remove(index))
}

/// Every slot scheduled for `today`, in schedule order.
pub fn todays_slots(schedule: &[ScheduleEntry], today: BackendDay) -> Vec<TodaySlot> {
    schedule
        .iter()
        .filter_map(|entry| {
            entry
                .slot(today)
                .filter(|slot| slot.is_scheduled())
                .map(|slot| TodaySlot {
                    carrier: entry.carrier.clone(),
                    time: slot.time.clone(),
                    status: slot.status,
                })
        })
        .collect()
}

fn find_mut<'a>(
    schedule: &'a mut [ScheduleEntry],
    carrier: &str,
) -> Result<&'a mut ScheduleEntry, ScheduleRejection> {
    let carrier = carrier.trim();
    schedule
        .iter_mut()
        .find(|e| e.carrier.trim() == carrier)
        .ok_or_else(|| ScheduleRejection::NotFound {
            carrier: carrier.to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn weekly(carrier: &str, time: &str) -> Vec<ScheduleEntry> {
        let times: [String; 7] = core::array::from_fn(|_| time.to_owned());
        let mut schedule = Vec::new();
        add_entry(&mut schedule, carrier, Some(&times)).unwrap();
        schedule
    }

    #[test]
    fn toggle_only_accepts_today() {
        let today = BackendDay::Wednesday;
        for day in BackendDay::ALL {
            let mut schedule = weekly("Acme", "07:30");
            let before = schedule.clone();
            let result = toggle_confirmation(&mut schedule, "Acme", day, today);
            if day == today {
                assert_eq!(result, Ok(Confirmation::Confirmed));
            } else {
                assert_eq!(result, Err(ScheduleRejection::NotToday { day, today }));
                assert_eq!(schedule, before);
            }
        }
    }

    #[test]
    fn toggle_flips_back_and_keeps_time() {
        let day = BackendDay::Monday;
        let mut schedule = weekly("Acme", "07:30");
        toggle_confirmation(&mut schedule, "Acme", day, day).unwrap();
        let status = toggle_confirmation(&mut schedule, "Acme", day, day).unwrap();
        assert_eq!(status, Confirmation::NotConfirmed);
        assert_eq!(schedule[0].slot(day).unwrap().time, "07:30");
    }

    #[test]
    fn toggle_rejects_empty_slot() {
        let day = BackendDay::Sunday;
        let mut schedule = weekly("Acme", "");
        let before = schedule.clone();
        assert!(matches!(
            toggle_confirmation(&mut schedule, "Acme", day, day),
            Err(ScheduleRejection::EmptySlot { .. })
        ));
        assert_eq!(schedule, before);
    }

    #[test]
    fn toggle_unknown_carrier_is_not_found() {
        let day = BackendDay::Sunday;
        let mut schedule = weekly("Acme", "07:30");
        assert!(matches!(
            toggle_confirmation(&mut schedule, "Other", day, day),
            Err(ScheduleRejection::NotFound { .. })
        ));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut schedule = weekly("Acme", "");
        assert_eq!(
            add_entry(&mut schedule, " Acme ", None),
            Err(ScheduleRejection::Duplicate {
                carrier: String::from("Acme")
            })
        );
        assert_eq!(
            add_entry(&mut schedule, "  ", None),
            Err(ScheduleRejection::MissingCarrier)
        );
    }

    #[test]
    fn clearing_a_time_clears_confirmation() {
        let day = BackendDay::Friday;
        let mut schedule = weekly("Acme", "10:00");
        toggle_confirmation(&mut schedule, "Acme", day, day).unwrap();
        set_slot_time(&mut schedule, "Acme", day, "").unwrap();
        let slot = schedule[0].slot(day).unwrap();
        assert_eq!(slot.status, Confirmation::NotConfirmed);
        assert!(!slot.is_scheduled());
    }

    #[test]
    fn todays_slots_lists_only_scheduled_entries() {
        let mut schedule = weekly("Acme", "");
        add_entry(&mut schedule, "Beta", None).unwrap();
        set_slot_time(&mut schedule, "Beta", BackendDay::Tuesday, "06:15").unwrap();

        let slots = todays_slots(&schedule, BackendDay::Tuesday);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].carrier, "Beta");
        assert_eq!(slots[0].time, "06:15");
        assert!(todays_slots(&schedule, BackendDay::Monday).is_empty());
    }

    #[test]
    fn remove_entry_by_carrier() {
        let mut schedule = weekly("Acme", "");
        remove_entry(&mut schedule, "Acme").unwrap();
        assert!(schedule.is_empty());
        assert!(remove_entry(&mut schedule, "Acme").is_err());
    }
}
