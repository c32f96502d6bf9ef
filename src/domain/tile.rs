/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use super::actor::ActorId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileKind {
    Rock,
    Sun,   // Hazard for Moss
    Dry,   // Hazard for Mimosa, can be moistened
    Moist, // Moistened Dry
    Shade, // Folded by Mimosa
    GoalA, // Mimosa's exit
    GoalB, // Moss's exit
}

impl TileKind {
    /// Does entering this tile open a danger episode for the given actor?
    pub fn endangers(self, actor: ActorId) -> bool {
        match actor {
            ActorId::Moss => self == TileKind::Sun,
            ActorId::Mimosa => self == TileKind::Dry,
        }
    }

    /// Is this tile state protective for a rescue of the given actor?
    /// Moss is sheltered only by Shade; Mimosa by Moist or Shade.
    pub fn shelters(self, endangered: ActorId) -> bool {
        match endangered {
            ActorId::Moss => self == TileKind::Shade,
            ActorId::Mimosa => matches!(self, TileKind::Moist | TileKind::Shade),
        }
    }

    /// Can an actor stand on a spiked tile of this kind and live?
    pub fn survives_spike(self) -> bool {
        matches!(self, TileKind::Shade | TileKind::Moist)
    }

    #[allow(dead_code)]
    pub fn is_goal(self) -> bool {
        matches!(self, TileKind::GoalA | TileKind::GoalB)
    }
}

impl Default for TileKind {
    fn default() -> Self {
        TileKind::Rock
    }
}

/// One grid cell: a kind plus independent modifier flags.
/// Deadlines are session-clock milliseconds; 0 means "not set".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    pub kind: TileKind,
    pub dew: bool,
    /// Spawn-pulse animation deadline for a freshly placed dew drop.
    pub dew_pulse_until: u64,
    pub bounce: bool,
    pub spike: bool,
    /// Reversion deadline recorded when the tile is folded to Shade.
    pub shade_until: u64,
}

impl Tile {
    pub fn of(kind: TileKind) -> Self {
        Tile { kind, ..Tile::default() }
    }

    /// "Active" cells count toward the generator's density floor:
    /// anything that is not a plain featureless Rock.
    pub fn is_active(&self) -> bool {
        self.kind != TileKind::Rock || self.dew || self.bounce || self.spike
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazards_are_asymmetric() {
        assert!(TileKind::Sun.endangers(ActorId::Moss));
        assert!(!TileKind::Sun.endangers(ActorId::Mimosa));
        assert!(TileKind::Dry.endangers(ActorId::Mimosa));
        assert!(!TileKind::Dry.endangers(ActorId::Moss));
        assert!(!TileKind::Rock.endangers(ActorId::Moss));
        assert!(!TileKind::Rock.endangers(ActorId::Mimosa));
    }

    #[test]
    fn shelter_rules() {
        // Moss in danger: only Shade rescues.
        assert!(TileKind::Shade.shelters(ActorId::Moss));
        assert!(!TileKind::Moist.shelters(ActorId::Moss));
        // Mimosa in danger: Moist or Shade rescues.
        assert!(TileKind::Moist.shelters(ActorId::Mimosa));
        assert!(TileKind::Shade.shelters(ActorId::Mimosa));
        assert!(!TileKind::Dry.shelters(ActorId::Mimosa));
    }

    #[test]
    fn spike_survival() {
        assert!(TileKind::Shade.survives_spike());
        assert!(TileKind::Moist.survives_spike());
        assert!(!TileKind::Rock.survives_spike());
        assert!(!TileKind::Sun.survives_spike());
    }

    #[test]
    fn default_tile_is_plain_rock() {
        let t = Tile::default();
        assert_eq!(t.kind, TileKind::Rock);
        assert!(!t.dew && !t.bounce && !t.spike);
        assert!(!t.is_active());
    }
}
