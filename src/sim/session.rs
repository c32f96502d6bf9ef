/// LevelSession: the complete state of one level in play.
///
/// One aggregate owns everything mutable (grid, actors, gates, switches,
/// danger episode, timers) and is recreated wholesale on level load or
/// restart. Intent handlers and `tick` mutate it in place and return the
/// events the presentation layer should react to; nothing here touches a
/// terminal or a speaker.
///
/// ## Clock
///
/// The session keeps its own monotonic millisecond clock, advanced only
/// by `tick(delta_ms)`. Cooldowns, the danger deadline, dew pulses and
/// the respawn interval are all plain comparisons against this clock, so
/// pausing (which stops tick delivery) freezes every deadline at once.
///
/// ## Processing order per accepted move
///
///   1. Hard rejections (cooldown, bounds, own closed gate, teammate goal)
///   2. Position update (synchronous; interpolation is the renderer's job)
///   3. Spike check (may end the session; suppresses bounce)
///   4. Bounce continuation (one extra step max, never chained)
///   5. Tile-entry side effects: dew pickup, switch hint, hazard danger,
///      goal soft-reject with row bump, danger rescue/escape re-check

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::actor::{Actor, ActorId, Danger, Gate, GateId, Switch, SwitchId};
use crate::domain::grid::{Grid, HEIGHT, WIDTH};
use crate::domain::rules::{self, BoardView, FinishBlocker};
use crate::domain::tile::{Tile, TileKind};
use super::event::{ClearReason, GameEvent, Outcome};

/// How long a transient HUD message stays up.
const HINT_MS: u64 = 3500;

pub const MIMOSA_SPAWN: (i32, i32) = (1, 1);
pub const MOSS_SPAWN: (i32, i32) = (2, HEIGHT - 2);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Ready,
    Playing,
    Paused,
    Over,
}

#[derive(Clone, Debug)]
pub struct Ending {
    pub outcome: Outcome,
    pub reason: String,
}

pub struct LevelSession {
    pub config: GameConfig,
    pub grid: Grid,
    pub mimosa: Actor,
    pub moss: Actor,
    pub gate_a: Gate,
    pub gate_b: Gate,
    pub switch_t: Switch,
    pub switch_l: Switch,
    pub goal_a: (i32, i32),
    pub goal_b: (i32, i32),
    pub danger: Option<Danger>,
    pub dew_remaining: usize,
    /// Respawn target: the preset's dew total at load time.
    pub initial_dew: usize,
    pub time_left_ms: u64,
    pub phase: Phase,
    pub ending: Option<Ending>,
    pub level_index: usize,
    pub level_name: String,
    pub message: String,
    message_until: u64,
    clock_ms: u64,
    next_dew_spawn_at: u64,
}

// ── Construction / lifecycle ──

impl LevelSession {
    pub fn new(config: GameConfig) -> Self {
        let mut session = LevelSession {
            config,
            grid: Grid::new(),
            mimosa: Actor::new(ActorId::Mimosa, MIMOSA_SPAWN.0, MIMOSA_SPAWN.1),
            moss: Actor::new(ActorId::Moss, MOSS_SPAWN.0, MOSS_SPAWN.1),
            gate_a: Gate { id: GateId::A, x: 1, y: HEIGHT - 1, open: false, owner: ActorId::Mimosa },
            gate_b: Gate { id: GateId::B, x: WIDTH - 2, y: HEIGHT - 1, open: false, owner: ActorId::Moss },
            switch_t: Switch { id: SwitchId::T, x: 0, y: 0, active: false },
            switch_l: Switch { id: SwitchId::L, x: 0, y: 0, active: false },
            goal_a: (0, HEIGHT - 1),
            goal_b: (WIDTH - 1, HEIGHT - 1),
            danger: None,
            dew_remaining: 0,
            initial_dew: 0,
            time_left_ms: 0,
            phase: Phase::Ready,
            ending: None,
            level_index: 0,
            level_name: String::new(),
            message: String::new(),
            message_until: 0,
            clock_ms: 0,
            next_dew_spawn_at: u64::MAX,
        };
        session.reset_board(0, "");
        session
    }

    /// Reset to a fresh all-Rock board with goals, gates, switches and
    /// actors at their fixed layout positions. The level generator calls
    /// this before random placement.
    pub(crate) fn reset_board(&mut self, index: usize, name: &str) {
        self.grid = Grid::new();
        self.goal_a = (0, HEIGHT - 1);
        self.goal_b = (WIDTH - 1, HEIGHT - 1);
        self.grid.set(self.goal_a.0, self.goal_a.1, Tile::of(TileKind::GoalA));
        self.grid.set(self.goal_b.0, self.goal_b.1, Tile::of(TileKind::GoalB));

        self.gate_a = Gate { id: GateId::A, x: 1, y: HEIGHT - 1, open: false, owner: ActorId::Mimosa };
        self.gate_b = Gate { id: GateId::B, x: WIDTH - 2, y: HEIGHT - 1, open: false, owner: ActorId::Moss };

        let (lx, ly) = switch_l_pos();
        let (tx, ty) = switch_t_pos();
        self.switch_l = Switch { id: SwitchId::L, x: lx, y: ly, active: false };
        self.switch_t = Switch { id: SwitchId::T, x: tx, y: ty, active: false };

        self.mimosa = Actor::new(ActorId::Mimosa, MIMOSA_SPAWN.0, MIMOSA_SPAWN.1);
        self.moss = Actor::new(ActorId::Moss, MOSS_SPAWN.0, MOSS_SPAWN.1);

        self.danger = None;
        self.dew_remaining = 0;
        self.initial_dew = 0;
        self.time_left_ms = self.config.timing.level_time_ms;
        self.phase = Phase::Ready;
        self.ending = None;
        self.level_index = index;
        self.level_name = name.to_string();
        self.message.clear();
        self.message_until = 0;
        self.clock_ms = 0;
        self.next_dew_spawn_at = u64::MAX;
    }

    /// Begin play: arms the level timer and the dew respawner.
    pub fn start(&mut self) {
        self.phase = Phase::Playing;
        self.time_left_ms = self.config.timing.level_time_ms;
        self.next_dew_spawn_at = self.clock_ms + self.config.timing.dew_respawn_interval_ms;
        self.set_message("Game started: cooperate!");
    }

    /// While paused the clock does not advance, so every deadline
    /// derived from it freezes together.
    pub fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn now(&self) -> u64 {
        self.clock_ms
    }

    pub fn actor(&self, id: ActorId) -> &Actor {
        match id {
            ActorId::Mimosa => &self.mimosa,
            ActorId::Moss => &self.moss,
        }
    }

    fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
        match id {
            ActorId::Mimosa => &mut self.mimosa,
            ActorId::Moss => &mut self.moss,
        }
    }

    /// Every requirement still blocking the finish (empty = eligible).
    pub fn finish_blockers(&self) -> Vec<FinishBlocker> {
        rules::finish_blockers(
            self.mimosa.shades.len(),
            self.config.rules.required_shades,
            self.dew_remaining,
            &self.gate_a,
            &self.gate_b,
        )
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.message_until = self.clock_ms + HINT_MS;
    }
}

// ── Tick ──

impl LevelSession {
    /// Advance the session clock and poll every deadline. Only runs while
    /// Playing, so a paused or finished session is completely frozen.
    pub fn tick(&mut self, delta_ms: u64, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        self.clock_ms += delta_ms;
        let now = self.clock_ms;

        if self.message_until != 0 && now >= self.message_until {
            self.message.clear();
            self.message_until = 0;
        }

        self.time_left_ms = self.time_left_ms.saturating_sub(delta_ms);
        if self.time_left_ms == 0 {
            self.end(Outcome::Defeat, "Time up: you ran out of time.", &mut events);
            return events;
        }

        if let Some(d) = self.danger {
            if now >= d.expires_at {
                self.danger = None;
                self.end(Outcome::Defeat, format!("{} was lost.", d.actor.label()), &mut events);
                return events;
            }
        }

        if now >= self.next_dew_spawn_at {
            self.next_dew_spawn_at = now + self.config.timing.dew_respawn_interval_ms;
            if self.dew_remaining < self.initial_dew {
                self.spawn_one_dew(rng, &mut events);
            }
        }

        self.check_win(&mut events);
        events
    }

    fn check_win(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != Phase::Playing {
            return;
        }
        let both_home = self.mimosa.at(self.goal_a.0, self.goal_a.1)
            && self.moss.at(self.goal_b.0, self.goal_b.1);
        if both_home && self.danger.is_none() && self.finish_blockers().is_empty() {
            self.end(Outcome::Victory, "Great teamwork: you cleared the level!", events);
        }
    }

    fn spawn_one_dew(&mut self, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        let mut pool = Vec::new();
        for y in 1..HEIGHT - 1 {
            for x in 1..WIDTH - 1 {
                let t = self.grid.get(x, y);
                if t.kind == TileKind::Rock && !t.dew && !t.bounce && !t.spike {
                    pool.push((x, y));
                }
            }
        }
        pool.shuffle(rng);
        if let Some((x, y)) = pool.pop() {
            let pulse = self.clock_ms + self.config.timing.dew_pulse_ms;
            if let Some(tile) = self.grid.get_mut(x, y) {
                tile.dew = true;
                tile.dew_pulse_until = pulse;
            }
            self.dew_remaining += 1;
            events.push(GameEvent::DewSpawned { x, y });
            self.set_message("A dew drop formed nearby: collect it!");
        }
    }

    fn end(&mut self, outcome: Outcome, reason: impl Into<String>, events: &mut Vec<GameEvent>) {
        let reason = reason.into();
        self.phase = Phase::Over;
        self.ending = Some(Ending { outcome, reason: reason.clone() });
        events.push(GameEvent::SessionEnded { outcome, reason });
    }
}

// ── Move resolution ──

impl LevelSession {
    /// Four-directional move intent for one actor. Anything illegal is
    /// dropped silently; invalid deltas are treated the same way.
    pub fn handle_move(&mut self, id: ActorId, dx: i32, dy: i32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        if dx.abs() + dy.abs() != 1 {
            return events;
        }
        self.attempt_move(id, dx, dy, false, &mut events);
        events
    }

    /// Returns true when the step was accepted. `continuation` marks the
    /// automatic extra step after landing on a bounce tile: it skips the
    /// cooldown (it is not an input) and never chains a second bounce.
    fn attempt_move(
        &mut self,
        id: ActorId,
        dx: i32,
        dy: i32,
        continuation: bool,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let now = self.clock_ms;
        if !continuation {
            if let Some(last) = self.actor(id).last_move_at {
                if now.saturating_sub(last) < self.config.timing.move_cooldown_ms {
                    return false;
                }
            }
        }

        let (nx, ny) = {
            let a = self.actor(id);
            (a.x + dx, a.y + dy)
        };
        let view = BoardView {
            gate_a: &self.gate_a,
            gate_b: &self.gate_b,
            goal_a: self.goal_a,
            goal_b: self.goal_b,
        };
        if !view.can_enter(id, nx, ny) {
            return false;
        }

        let dest = self.grid.get(nx, ny);
        {
            let a = self.actor_mut(id);
            a.x = nx;
            a.y = ny;
            if !continuation {
                a.last_move_at = Some(now);
            }
        }
        if !continuation {
            events.push(GameEvent::Stepped { actor: id });
        }

        if dest.spike {
            // The actor lands and entry effects still run; only then is
            // survival decided by the tile's current kind. No bounce on
            // a spiked tile, even a survivable one.
            self.after_move(id, events);
            if !self.grid.get(nx, ny).kind.survives_spike() {
                self.end(Outcome::Defeat, format!("{} hit spikes.", id.label()), events);
            }
            return true;
        }

        if dest.bounce {
            if continuation {
                events.push(GameEvent::BounceAbsorbed { x: nx, y: ny });
            } else if self.attempt_move(id, dx, dy, true, events) {
                return true;
            }
            // Blocked continuation: the slide stops here and entry
            // effects run on the bounce tile itself.
        }

        self.after_move(id, events);
        true
    }

    /// Tile-entry side effects, in order. See module header.
    fn after_move(&mut self, id: ActorId, events: &mut Vec<GameEvent>) {
        let now = self.clock_ms;
        let (x, y) = {
            let a = self.actor(id);
            (a.x, a.y)
        };

        // (a) Moss gathers dew
        if id == ActorId::Moss {
            let collected = match self.grid.get_mut(x, y) {
                Some(tile) if tile.dew => {
                    tile.dew = false;
                    tile.dew_pulse_until = 0;
                    true
                }
                _ => false,
            };
            if collected {
                self.dew_remaining = self.dew_remaining.saturating_sub(1);
                self.moss.moisture = (self.moss.moisture + 1).min(self.config.rules.moisture_cap);
                events.push(GameEvent::DewCollected { x, y, remaining: self.dew_remaining });
                self.set_message(format!("{} collected dew", id.label()));
            }
        }

        // (b) standing on your own idle switch
        if id == ActorId::Moss && !self.switch_t.active && self.switch_t.x == x && self.switch_t.y == y {
            self.set_message(format!("{}: press M to activate T", id.label()));
        }
        if id == ActorId::Mimosa && !self.switch_l.active && self.switch_l.x == x && self.switch_l.y == y {
            self.set_message(format!("{}: fold to activate L", id.label()));
        }

        // (c)/(d) hazardous tile opens a danger episode; a repeat trigger
        // overwrites the episode and resets the deadline (most recent wins)
        let kind = self.grid.get(x, y).kind;
        if kind.endangers(id) {
            let duration = self.config.timing.danger_duration_ms;
            self.danger = Some(Danger {
                actor: id,
                x,
                y,
                expires_at: now + duration,
                duration_ms: duration,
            });
            events.push(GameEvent::DangerStarted { actor: id, x, y });
            let remedy = match id {
                ActorId::Moss => format!("{} fold on the same tile!", id.other().label()),
                ActorId::Mimosa => format!("{} press M on the same tile!", id.other().label()),
            };
            self.set_message(format!("Danger! {} is exposed: {}", id.label(), remedy));
        }

        // (e) own goal reached early: soft reject with a row bump
        let own_goal = match id {
            ActorId::Mimosa => self.goal_a,
            ActorId::Moss => self.goal_b,
        };
        if (x, y) == own_goal {
            let unmet = self.finish_blockers();
            if !unmet.is_empty() {
                events.push(GameEvent::GoalBlocked { actor: id, unmet });
                let a = self.actor_mut(id);
                a.y = (a.y - 1).max(0);
                events.push(GameEvent::Bumped { actor: id });
            }
        }

        // (f) rescue / self-escape re-check
        self.refresh_danger(events);
    }

    /// Danger episode exit paths other than expiry: a protective rescue
    /// by the teammate on the episode tile, or the endangered actor
    /// having left the tile entirely.
    fn refresh_danger(&mut self, events: &mut Vec<GameEvent>) {
        let Some(d) = self.danger else { return };

        let rescuer_id = d.actor.other();
        let rescuer_there = self.actor(rescuer_id).at(d.x, d.y);
        if rescuer_there && self.grid.get(d.x, d.y).kind.shelters(d.actor) {
            self.danger = None;
            events.push(GameEvent::DangerCleared {
                actor: d.actor,
                reason: ClearReason::Rescued { by: rescuer_id },
            });
            self.set_message(format!("Rescued! {} saved {}", rescuer_id.label(), d.actor.label()));
            return;
        }

        if !self.actor(d.actor).at(d.x, d.y) {
            self.danger = None;
            events.push(GameEvent::DangerCleared {
                actor: d.actor,
                reason: ClearReason::MovedToSafety,
            });
            self.set_message(format!("{} moved to safety", d.actor.label()));
        }
    }
}

// ── Abilities ──

impl LevelSession {
    /// Mimosa's fold: shades her current tile (any tile, goals and Sun
    /// included), records the distinct coordinate, and trips Switch L
    /// when she folds while standing on it.
    pub fn handle_fold(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        let shade_until = self.clock_ms + self.config.timing.shade_linger_ms;
        let (x, y) = (self.mimosa.x, self.mimosa.y);
        if let Some(tile) = self.grid.get_mut(x, y) {
            tile.kind = TileKind::Shade;
            tile.shade_until = shade_until;
        }
        self.mimosa.shades.insert((x, y));
        events.push(GameEvent::TileFolded { x, y, distinct: self.mimosa.shades.len() });
        self.set_message(format!("{} folded", ActorId::Mimosa.label()));

        if !self.switch_l.active && self.switch_l.x == x && self.switch_l.y == y {
            self.switch_l.active = true;
            self.open_gate(GateId::B, &mut events);
        }

        self.refresh_danger(&mut events);
        events
    }

    /// Moss's resource action: on Switch T it activates the switch (one
    /// moisture), otherwise it moistens a Dry tile (one moisture).
    pub fn handle_resource(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            return events;
        }
        if self.moss.moisture == 0 {
            self.set_message("No moisture");
            return events;
        }
        let (x, y) = (self.moss.x, self.moss.y);

        if !self.switch_t.active && self.switch_t.x == x && self.switch_t.y == y {
            self.switch_t.active = true;
            self.moss.moisture -= 1;
            self.open_gate(GateId::A, &mut events);
            self.refresh_danger(&mut events);
            return events;
        }

        if self.grid.get(x, y).kind == TileKind::Dry {
            if let Some(tile) = self.grid.get_mut(x, y) {
                tile.kind = TileKind::Moist;
            }
            self.moss.moisture -= 1;
            events.push(GameEvent::TileMoistened { x, y });
            self.set_message("Tile moistened");
            self.refresh_danger(&mut events);
            return events;
        }

        self.set_message("No action here");
        events
    }

    /// A gate opens exactly once; its cell becomes plain passable Rock.
    fn open_gate(&mut self, id: GateId, events: &mut Vec<GameEvent>) {
        let (gate, switch, opener) = match id {
            GateId::A => (&mut self.gate_a, SwitchId::T, ActorId::Moss),
            GateId::B => (&mut self.gate_b, SwitchId::L, ActorId::Mimosa),
        };
        gate.open = true;
        let (gx, gy) = (gate.x, gate.y);
        if let Some(tile) = self.grid.get_mut(gx, gy) {
            tile.kind = TileKind::Rock;
        }
        events.push(GameEvent::SwitchActivated { switch, gate: id });
        self.set_message(format!("Gate {:?} unlocked by {}", id, opener.label()));
    }
}

fn switch_l_pos() -> (i32, i32) {
    let x = ((WIDTH as f32 * 0.25).floor() as i32).max(1);
    let y = ((HEIGHT as f32 * 0.55).floor() as i32).max(1);
    (x, y)
}

fn switch_t_pos() -> (i32, i32) {
    let x = ((WIDTH as f32 * 0.75).floor() as i32).min(WIDTH - 2);
    let y = ((HEIGHT as f32 * 0.4).floor() as i32).max(1);
    (x, y)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
