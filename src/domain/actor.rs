/// The two playable characters, their exit gates, the gate switches,
/// and the danger episode entity.

use std::collections::HashSet;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ActorId {
    Mimosa,
    Moss,
}

impl ActorId {
    pub fn other(self) -> ActorId {
        match self {
            ActorId::Mimosa => ActorId::Moss,
            ActorId::Moss => ActorId::Mimosa,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActorId::Mimosa => "Mimosa",
            ActorId::Moss => "Moss",
        }
    }
}

/// A playable character. Both actors share the movement machinery;
/// `moisture` is Moss's resource, `shades` tracks Mimosa's distinct
/// folded coordinates (set semantics: refolding a cell adds nothing).
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub x: i32,
    pub y: i32,
    pub moisture: u32,
    pub shades: HashSet<(i32, i32)>,
    /// Session-clock timestamp of the last accepted move.
    pub last_move_at: Option<u64>,
}

impl Actor {
    pub fn new(id: ActorId, x: i32, y: i32) -> Self {
        Actor {
            id,
            x,
            y,
            moisture: 0,
            shades: HashSet::new(),
            last_move_at: None,
        }
    }

    pub fn at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GateId {
    A,
    B,
}

/// An exit gate. A closed gate blocks its owner; the teammate's switch
/// opens it. Opens exactly once and never re-closes.
#[derive(Clone, Debug)]
pub struct Gate {
    pub id: GateId,
    pub x: i32,
    pub y: i32,
    pub open: bool,
    pub owner: ActorId,
}

impl Gate {
    pub fn closed_at(&self, x: i32, y: i32) -> bool {
        !self.open && self.x == x && self.y == y
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SwitchId {
    /// Activated by Moss's resource action; opens Gate A.
    T,
    /// Activated by Mimosa's fold; opens Gate B.
    L,
}

#[derive(Clone, Debug)]
pub struct Switch {
    pub id: SwitchId,
    pub x: i32,
    pub y: i32,
    pub active: bool,
}

/// A live danger episode: `actor` is stuck on a hazardous tile at
/// (x, y) and must be rescued (or leave) before `expires_at`.
#[derive(Clone, Copy, Debug)]
pub struct Danger {
    pub actor: ActorId,
    pub x: i32,
    pub y: i32,
    pub expires_at: u64,
    pub duration_ms: u64,
}

impl Danger {
    /// Countdown remaining at the given clock value.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_is_involution() {
        assert_eq!(ActorId::Mimosa.other(), ActorId::Moss);
        assert_eq!(ActorId::Moss.other().other(), ActorId::Moss);
    }

    #[test]
    fn shade_set_is_distinct() {
        let mut a = Actor::new(ActorId::Mimosa, 1, 1);
        a.shades.insert((2, 2));
        a.shades.insert((2, 2));
        a.shades.insert((3, 2));
        assert_eq!(a.shades.len(), 2);
    }

    #[test]
    fn danger_countdown_saturates() {
        let d = Danger { actor: ActorId::Moss, x: 4, y: 4, expires_at: 7000, duration_ms: 7000 };
        assert_eq!(d.remaining_ms(1000), 6000);
        assert_eq!(d.remaining_ms(9000), 0);
    }
}
