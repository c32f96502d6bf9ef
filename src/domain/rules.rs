/// Movement legality and finish eligibility — truth-table driven.
///
/// Pure functions operating on borrowed state, no side effects.
/// These encode "what is legal" without performing the action.
///
/// ## Destination Truth Table
///
/// ┌──────────────────────────────────────┬───────┐
/// │ Condition                            │ Enter?│
/// ├──────────────────────────────────────┼───────┤
/// │ Dest out of grid bounds              │ DENY  │
/// │ Dest is mover's own gate, closed     │ DENY  │
/// │ Dest is the teammate's goal cell     │ DENY  │
/// │ Otherwise                            │ ALLOW │
/// └──────────────────────────────────────┴───────┘
///
/// A closed gate blocks its OWNER (the actor whose exit it guards);
/// the teammate walks over it freely. Each actor may only ever stand
/// on their own goal cell, even after both gates open.

use super::actor::{ActorId, Gate, GateId};
use super::grid::Grid;

/// Immutable view of the board for movement queries.
pub struct BoardView<'a> {
    pub gate_a: &'a Gate,
    pub gate_b: &'a Gate,
    pub goal_a: (i32, i32),
    pub goal_b: (i32, i32),
}

impl<'a> BoardView<'a> {
    /// May `actor` step onto (x, y)? See truth table above.
    pub fn can_enter(&self, actor: ActorId, x: i32, y: i32) -> bool {
        if !Grid::in_bounds(x, y) {
            return false;
        }
        let own_gate = match actor {
            ActorId::Mimosa => self.gate_a,
            ActorId::Moss => self.gate_b,
        };
        if own_gate.closed_at(x, y) {
            return false;
        }
        let other_goal = match actor {
            ActorId::Mimosa => self.goal_b,
            ActorId::Moss => self.goal_a,
        };
        (x, y) != other_goal
    }
}

/// One unmet requirement blocking the level finish.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FinishBlocker {
    ShadesIncomplete { have: usize, need: usize },
    DewRemaining { count: usize },
    GateClosed(GateId),
}

/// Finish eligibility: Mimosa has folded enough distinct tiles, all dew
/// is collected, and both gates stand open. Returns every unmet
/// requirement (empty = eligible). Shared by the goal soft-reject and
/// the win check.
pub fn finish_blockers(
    shades_done: usize,
    shades_required: usize,
    dew_remaining: usize,
    gate_a: &Gate,
    gate_b: &Gate,
) -> Vec<FinishBlocker> {
    let mut unmet = Vec::new();
    if shades_done < shades_required {
        unmet.push(FinishBlocker::ShadesIncomplete { have: shades_done, need: shades_required });
    }
    if dew_remaining > 0 {
        unmet.push(FinishBlocker::DewRemaining { count: dew_remaining });
    }
    if !gate_a.open {
        unmet.push(FinishBlocker::GateClosed(GateId::A));
    }
    if !gate_b.open {
        unmet.push(FinishBlocker::GateClosed(GateId::B));
    }
    unmet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{HEIGHT, WIDTH};

    fn gates(a_open: bool, b_open: bool) -> (Gate, Gate) {
        (
            Gate { id: GateId::A, x: 1, y: HEIGHT - 1, open: a_open, owner: ActorId::Mimosa },
            Gate { id: GateId::B, x: WIDTH - 2, y: HEIGHT - 1, open: b_open, owner: ActorId::Moss },
        )
    }

    fn view<'a>(gate_a: &'a Gate, gate_b: &'a Gate) -> BoardView<'a> {
        BoardView {
            gate_a,
            gate_b,
            goal_a: (0, HEIGHT - 1),
            goal_b: (WIDTH - 1, HEIGHT - 1),
        }
    }

    #[test]
    fn bounds_deny_entry() {
        let (a, b) = gates(true, true);
        let v = view(&a, &b);
        assert!(!v.can_enter(ActorId::Mimosa, -1, 0));
        assert!(!v.can_enter(ActorId::Moss, WIDTH, 0));
        assert!(!v.can_enter(ActorId::Moss, 0, HEIGHT));
        assert!(v.can_enter(ActorId::Moss, 0, 0));
    }

    #[test]
    fn closed_gate_blocks_only_its_owner() {
        let (a, b) = gates(false, true);
        let v = view(&a, &b);
        assert!(!v.can_enter(ActorId::Mimosa, 1, HEIGHT - 1));
        assert!(v.can_enter(ActorId::Moss, 1, HEIGHT - 1));
    }

    #[test]
    fn open_gate_admits_owner() {
        let (a, b) = gates(true, true);
        let v = view(&a, &b);
        assert!(v.can_enter(ActorId::Mimosa, 1, HEIGHT - 1));
    }

    #[test]
    fn teammate_goal_is_always_off_limits() {
        let (a, b) = gates(true, true);
        let v = view(&a, &b);
        assert!(!v.can_enter(ActorId::Mimosa, WIDTH - 1, HEIGHT - 1));
        assert!(!v.can_enter(ActorId::Moss, 0, HEIGHT - 1));
        // Own goals stay reachable.
        assert!(v.can_enter(ActorId::Mimosa, 0, HEIGHT - 1));
        assert!(v.can_enter(ActorId::Moss, WIDTH - 1, HEIGHT - 1));
    }

    #[test]
    fn blockers_list_every_unmet_requirement() {
        let (a, b) = gates(false, true);
        let unmet = finish_blockers(3, 5, 2, &a, &b);
        assert_eq!(
            unmet,
            vec![
                FinishBlocker::ShadesIncomplete { have: 3, need: 5 },
                FinishBlocker::DewRemaining { count: 2 },
                FinishBlocker::GateClosed(GateId::A),
            ]
        );
    }

    #[test]
    fn no_blockers_when_eligible() {
        let (a, b) = gates(true, true);
        assert!(finish_blockers(5, 5, 0, &a, &b).is_empty());
    }
}
