/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;

use config::GameConfig;
use domain::actor::ActorId;
use sim::event::{ClearReason, GameEvent, Outcome};
use sim::level;
use sim::session::{LevelSession, Phase};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let mut rng = rand::thread_rng();

    let mut session = LevelSession::new(config);
    level::load_level(&mut session, 0, &mut rng);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &mut rng);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Dewfold!");
}

fn game_loop(
    session: &mut LevelSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut last_frame = Instant::now();

    loop {
        input.drain();
        if input.interrupted() || input.pressed(KeyCode::Esc) {
            break;
        }
        handle_meta(session, &input, rng);

        let mut events = Vec::new();
        if session.phase == Phase::Playing {
            events.extend(handle_player_input(session, &input));
        }

        let delta = last_frame.elapsed();
        last_frame = Instant::now();
        events.extend(session.tick(delta.as_millis() as u64, rng));

        process_sound_events(sound, &events);
        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──
//
// Two players share the keyboard: Mimosa on WASD + Space, Moss on the
// arrow keys + M. Movement keys repeat while held; the session's move
// cooldown does the actual rate limiting.

const KEYS_MIMOSA: [(&[KeyCode], (i32, i32)); 4] = [
    (&[KeyCode::Char('w'), KeyCode::Char('W')], (0, -1)),
    (&[KeyCode::Char('s'), KeyCode::Char('S')], (0, 1)),
    (&[KeyCode::Char('a'), KeyCode::Char('A')], (-1, 0)),
    (&[KeyCode::Char('d'), KeyCode::Char('D')], (1, 0)),
];

const KEYS_MOSS: [(&[KeyCode], (i32, i32)); 4] = [
    (&[KeyCode::Up], (0, -1)),
    (&[KeyCode::Down], (0, 1)),
    (&[KeyCode::Left], (-1, 0)),
    (&[KeyCode::Right], (1, 0)),
];

fn handle_player_input(session: &mut LevelSession, input: &InputState) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if let Some((dx, dy)) = detect_movement(input, &KEYS_MIMOSA) {
        events.extend(session.handle_move(ActorId::Mimosa, dx, dy));
    }
    if let Some((dx, dy)) = detect_movement(input, &KEYS_MOSS) {
        events.extend(session.handle_move(ActorId::Moss, dx, dy));
    }
    if input.pressed(KeyCode::Char(' ')) {
        events.extend(session.handle_fold());
    }
    if input.any_pressed(&[KeyCode::Char('m'), KeyCode::Char('M')]) {
        events.extend(session.handle_resource());
    }

    events
}

fn detect_movement(input: &InputState, keys: &[(&[KeyCode], (i32, i32)); 4]) -> Option<(i32, i32)> {
    for (codes, delta) in keys {
        if input.any_held(codes) {
            return Some(*delta);
        }
    }
    None
}

/// Session-level controls: start, pause, restart, next level.
fn handle_meta(session: &mut LevelSession, input: &InputState, rng: &mut impl Rng) {
    match session.phase {
        Phase::Ready => {
            if input.pressed(KeyCode::Enter) {
                session.start();
            }
        }
        Phase::Playing | Phase::Paused => {
            if input.any_pressed(&[KeyCode::Char('p'), KeyCode::Char('P')]) {
                session.toggle_pause();
            }
            if input.any_pressed(&[KeyCode::Char('r'), KeyCode::Char('R')]) {
                restart(session, session.level_index, rng);
            }
        }
        Phase::Over => {
            if input.any_pressed(&[KeyCode::Char('r'), KeyCode::Char('R')]) {
                restart(session, session.level_index, rng);
            }
            if input.any_pressed(&[KeyCode::Char('n'), KeyCode::Char('N')]) {
                restart(session, session.level_index + 1, rng);
            }
        }
    }
}

/// Rebuild the whole session for the given level and begin play
/// immediately. Index past the last preset repeats the final level.
fn restart(session: &mut LevelSession, index: usize, rng: &mut impl Rng) {
    level::load_level(session, index, rng);
    session.start();
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        match event {
            GameEvent::DewSpawned { .. } | GameEvent::DewCollected { .. } => sfx.play_collect(),
            GameEvent::TileMoistened { .. } => sfx.play_moisten(),
            GameEvent::TileFolded { .. } => sfx.play_fold(),
            GameEvent::SwitchActivated { .. } => sfx.play_unlock(),
            GameEvent::DangerStarted { .. } => sfx.play_danger(),
            GameEvent::DangerCleared { reason: ClearReason::Rescued { .. }, .. } => {
                sfx.play_rescue()
            }
            GameEvent::SessionEnded { outcome: Outcome::Victory, .. } => sfx.play_victory(),
            GameEvent::SessionEnded { outcome: Outcome::Defeat, .. } => sfx.play_defeat(),
            _ => {}
        }
    }
}
