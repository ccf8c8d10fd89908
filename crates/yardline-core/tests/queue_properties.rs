//! Exhaustive checks of the departure queue invariants.
//!
//! Walks every sequence of accepted actions (depart the current record,
//! skip it, or complete any skipped record) over a small load list and
//! checks the pointer after each step. A second walk mixes in load edits
//! at the end of the list, each followed by a resync.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use yardline_core::queue::{self, Departure};
use yardline_core::registry;
use yardline_types::{Load, PanelState, RecordStatus};

#[derive(Debug, Clone, Copy)]
enum Action {
    Depart(u32),
    Skip(u32),
    AppendLoad,
    RemoveLoad,
}

const MAX_LOADS: usize = 4;
const EDIT_DEPTH: usize = 6;

fn panel_with(n: u32) -> PanelState {
    let mut panel = PanelState::default();
    panel.loads = (1..=n)
        .map(|sequence| Load {
            sequence,
            carrier: format!("C{sequence}"),
        })
        .collect();
    queue::resync(&mut panel);
    panel
}

fn departure() -> Departure {
    Departure {
        driver_name: String::from("driver"),
        time: String::from("08:00"),
        date: String::from("2024-01-01"),
    }
}

fn accepted_actions(panel: &PanelState) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(pointer) = panel.pointer
        && panel.queue.iter().any(|r| r.sequence == pointer)
    {
        actions.push(Action::Depart(pointer));
        actions.push(Action::Skip(pointer));
    }
    for record in &panel.queue {
        if record.status == RecordStatus::Skipped {
            actions.push(Action::Depart(record.sequence));
        }
    }
    actions
}

fn lowest_pending(panel: &PanelState) -> Option<u32> {
    panel
        .queue
        .iter()
        .find(|r| r.status == RecordStatus::Pending)
        .map(|r| r.sequence)
}

fn check_invariants(panel: &PanelState, trail: &[Action]) {
    match lowest_pending(panel) {
        Some(lowest) => {
            assert_eq!(panel.pointer, Some(lowest), "after {trail:?}");
            assert!(!queue::is_complete(panel), "after {trail:?}");
            assert_eq!(queue::next_actionable(panel), Some(lowest));
        }
        None => {
            // Either nulled by a departure, or pushed past the end by
            // skipping the last record (further once loads are removed).
            let last = u32::try_from(panel.queue.len()).unwrap();
            assert!(
                panel.pointer.is_none_or(|pointer| pointer > last),
                "after {trail:?}: pointer {:?}",
                panel.pointer
            );
            assert!(queue::is_complete(panel), "after {trail:?}");
        }
    }
    assert_eq!(panel.queue.len(), panel.loads.len());
}

fn apply(panel: &mut PanelState, action: Action) {
    match action {
        Action::Depart(s) => {
            queue::mark_departed(panel, s, &departure()).unwrap();
        }
        Action::Skip(s) => {
            queue::skip(panel, s).unwrap();
        }
        Action::AppendLoad => {
            registry::append_loads(panel, 1).unwrap();
            queue::resync(panel);
        }
        Action::RemoveLoad => {
            registry::remove_loads(panel, 1).unwrap();
            queue::resync(panel);
        }
    }
}

fn walk(panel: &PanelState, trail: &mut Vec<Action>, visited: &mut usize) {
    check_invariants(panel, trail);
    *visited += 1;

    for action in accepted_actions(panel) {
        let mut next = panel.clone();
        apply(&mut next, action);
        trail.push(action);
        walk(&next, trail, visited);
        trail.pop();
    }
}

fn walk_with_edits(panel: &PanelState, trail: &mut Vec<Action>, visited: &mut usize) {
    check_invariants(panel, trail);
    *visited += 1;
    if trail.len() >= EDIT_DEPTH {
        return;
    }

    let mut actions = accepted_actions(panel);
    if panel.loads.len() < MAX_LOADS {
        actions.push(Action::AppendLoad);
    }
    if !panel.loads.is_empty() {
        actions.push(Action::RemoveLoad);
    }

    for action in actions {
        let mut next = panel.clone();
        apply(&mut next, action);
        trail.push(action);
        walk_with_edits(&next, trail, visited);
        trail.pop();
    }
}

#[test]
fn pointer_tracks_lowest_pending_for_every_action_sequence() {
    for n in 1..=4 {
        let panel = panel_with(n);
        let mut visited = 0;
        walk(&panel, &mut Vec::new(), &mut visited);
        assert!(visited > usize::try_from(n).unwrap());
    }
}

#[test]
fn pointer_tracks_lowest_pending_across_load_edits() {
    for n in 0..=3 {
        let panel = panel_with(n);
        let mut visited = 0;
        walk_with_edits(&panel, &mut Vec::new(), &mut visited);
        assert!(visited > 1);
    }
}

#[test]
fn readded_loads_are_actionable_after_removal() {
    let mut panel = panel_with(3);
    queue::mark_departed(&mut panel, 1, &departure()).unwrap();
    queue::mark_departed(&mut panel, 2, &departure()).unwrap();
    apply(&mut panel, Action::RemoveLoad);
    apply(&mut panel, Action::RemoveLoad);
    registry::append_loads(&mut panel, 2).unwrap();
    queue::resync(&mut panel);

    assert_eq!(panel.pointer, Some(2));
    queue::skip(&mut panel, 2).unwrap();
    queue::mark_departed(&mut panel, 3, &departure()).unwrap();
    assert!(queue::is_complete(&panel));
}

#[test]
fn rejected_actions_never_change_state() {
    let mut panel = panel_with(3);
    queue::skip(&mut panel, 1).unwrap();
    let snapshot = panel.clone();

    // Out of turn skip, out of turn departure of a pending record,
    // departure with a blank field, unknown sequence.
    assert!(queue::skip(&mut panel, 3).is_err());
    assert!(queue::mark_departed(&mut panel, 3, &departure()).is_err());
    let mut blank = departure();
    blank.date = String::from(" ");
    assert!(queue::mark_departed(&mut panel, 2, &blank).is_err());
    assert!(queue::mark_departed(&mut panel, 42, &departure()).is_err());

    assert_eq!(panel, snapshot);
}

#[test]
fn resync_twice_equals_resync_once() {
    let mut panel = panel_with(3);
    queue::skip(&mut panel, 1).unwrap();
    queue::mark_departed(&mut panel, 2, &departure()).unwrap();
    panel.loads.push(Load {
        sequence: 4,
        carrier: String::from("C4"),
    });

    queue::resync(&mut panel);
    let once = panel.clone();
    queue::resync(&mut panel);
    assert_eq!(panel, once);
}
