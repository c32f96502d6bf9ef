/// Presentation layer: crossterm terminal renderer.
///
/// The board is a fixed 11x9 grid, so a full redraw per frame is cheap:
/// every cell is queued into a BufWriter and flushed once at the end.
/// Each game cell occupies CELL_W terminal columns; tile identity is
/// carried by background color, modifiers and occupants by glyphs.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::{HEIGHT, WIDTH};
use crate::domain::tile::{Tile, TileKind};
use crate::sim::event::Outcome;
use crate::sim::session::{LevelSession, Phase};

const CELL_W: u16 = 4;

const HUD_ROW: u16 = 0;
const STATUS_ROW: u16 = 1;
const DANGER_ROW: u16 = 2;
const BOARD_ROW: u16 = 4;
const MESSAGE_ROW: u16 = BOARD_ROW + HEIGHT as u16 + 1;
const HELP_ROW: u16 = MESSAGE_ROW + 1;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &LevelSession) -> io::Result<()> {
        queue!(self.writer, ResetColor, Clear(ClearType::All))?;

        self.draw_hud(session)?;
        self.draw_danger_bar(session)?;
        self.draw_board(session)?;
        self.draw_footer(session)?;
        if session.phase == Phase::Over {
            self.draw_ending(session)?;
        }

        self.writer.flush()
    }

    // ── HUD ──

    fn draw_hud(&mut self, session: &LevelSession) -> io::Result<()> {
        queue!(
            self.writer,
            MoveTo(0, HUD_ROW),
            SetForegroundColor(Color::Green),
            Print(format!("Dewfold  ~  {}", session.level_name)),
            MoveTo(34, HUD_ROW),
            SetForegroundColor(Color::White),
            Print(format!("Time {}", format_time(session.time_left_ms))),
        )?;
        queue!(
            self.writer,
            MoveTo(0, STATUS_ROW),
            SetForegroundColor(Color::Cyan),
            Print(format!("Dew left {}", session.dew_remaining)),
            MoveTo(14, STATUS_ROW),
            SetForegroundColor(Color::DarkGreen),
            Print(format!(
                "Shades {}/{}",
                session.mimosa.shades.len(),
                session.config.rules.required_shades
            )),
            MoveTo(28, STATUS_ROW),
            SetForegroundColor(Color::Blue),
            Print(format!(
                "Moisture {}/{}",
                session.moss.moisture, session.config.rules.moisture_cap
            )),
        )
    }

    fn draw_danger_bar(&mut self, session: &LevelSession) -> io::Result<()> {
        let Some(d) = session.danger else { return Ok(()) };
        let remaining = d.remaining_ms(session.now());
        let width = 20usize;
        let filled = if d.duration_ms == 0 {
            0
        } else {
            (remaining as usize * width) / d.duration_ms as usize
        };
        let bar: String = (0..width).map(|i| if i < filled { '#' } else { '.' }).collect();
        queue!(
            self.writer,
            MoveTo(0, DANGER_ROW),
            SetForegroundColor(Color::Red),
            Print(format!(
                "! {} in danger [{}] {:.1}s",
                d.actor.label(),
                bar,
                remaining as f32 / 1000.0
            )),
        )
    }

    // ── Board ──

    fn draw_board(&mut self, session: &LevelSession) -> io::Result<()> {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let tile = session.grid.get(x, y);
                let (bg, fg) = tile_colors(tile.kind);
                let body = self.cell_body(session, x, y, tile);
                queue!(
                    self.writer,
                    MoveTo(x as u16 * CELL_W, BOARD_ROW + y as u16),
                    SetBackgroundColor(bg),
                    SetForegroundColor(fg),
                    Print(body),
                    ResetColor,
                )?;
            }
        }
        Ok(())
    }

    /// The CELL_W-wide text for one cell: occupants beat overlays,
    /// overlays beat modifiers, modifiers beat the bare kind glyph.
    fn cell_body(&self, session: &LevelSession, x: i32, y: i32, tile: Tile) -> String {
        let mimosa_here = session.mimosa.at(x, y);
        let moss_here = session.moss.at(x, y);
        if mimosa_here && moss_here {
            return "MiMo".to_string();
        }
        if mimosa_here {
            return " Mi ".to_string();
        }
        if moss_here {
            return " Mo ".to_string();
        }

        if session.gate_a.closed_at(x, y) {
            return "#A##".to_string();
        }
        if session.gate_b.closed_at(x, y) {
            return "#B##".to_string();
        }
        if session.switch_t.x == x && session.switch_t.y == y {
            return if session.switch_t.active { " t  ".to_string() } else { " T  ".to_string() };
        }
        if session.switch_l.x == x && session.switch_l.y == y {
            return if session.switch_l.active { " l  ".to_string() } else { " L  ".to_string() };
        }

        let mut body = [' '; 4];
        if tile.dew {
            body[1] = '*';
        }
        if tile.bounce {
            body[2] = '~';
        }
        if tile.spike {
            body[3] = '^';
        }
        if tile.kind == TileKind::GoalA {
            body[0] = 'A';
        }
        if tile.kind == TileKind::GoalB {
            body[0] = 'B';
        }
        body.iter().collect()
    }

    // ── Footer ──

    fn draw_footer(&mut self, session: &LevelSession) -> io::Result<()> {
        if !session.message.is_empty() {
            queue!(
                self.writer,
                MoveTo(0, MESSAGE_ROW),
                SetForegroundColor(Color::Yellow),
                Print(&session.message),
            )?;
        }
        let help = match session.phase {
            Phase::Ready => "Enter: start  Esc: quit",
            Phase::Paused => "PAUSED  P: resume  R: restart  Esc: quit",
            Phase::Over => "R: restart  N: next level  Esc: quit",
            Phase::Playing => {
                "Mimosa WASD + Space(fold)   Moss arrows + M(moisten)   P pause  R restart"
            }
        };
        queue!(
            self.writer,
            MoveTo(0, HELP_ROW),
            SetForegroundColor(Color::DarkGrey),
            Print(help),
        )
    }

    fn draw_ending(&mut self, session: &LevelSession) -> io::Result<()> {
        let Some(ending) = &session.ending else { return Ok(()) };
        let (title, color) = match ending.outcome {
            Outcome::Victory => ("*** VICTORY ***", Color::Green),
            Outcome::Defeat => ("*** DEFEAT ***", Color::Red),
        };
        let row = BOARD_ROW + (HEIGHT as u16) / 2;
        queue!(
            self.writer,
            MoveTo(6, row),
            SetForegroundColor(color),
            Print(title),
            MoveTo(6, row + 1),
            SetForegroundColor(Color::White),
            Print(&ending.reason),
        )
    }
}

/// Tile identity is color-coded; occupant glyphs stay readable on every
/// background.
fn tile_colors(kind: TileKind) -> (Color, Color) {
    match kind {
        TileKind::Rock => (Color::Rgb { r: 60, g: 58, b: 52 }, Color::White),
        TileKind::Sun => (Color::Rgb { r: 190, g: 150, b: 30 }, Color::Black),
        TileKind::Dry => (Color::Rgb { r: 140, g: 100, b: 50 }, Color::Black),
        TileKind::Moist => (Color::Rgb { r: 40, g: 110, b: 160 }, Color::White),
        TileKind::Shade => (Color::Rgb { r: 30, g: 90, b: 55 }, Color::White),
        TileKind::GoalA | TileKind::GoalB => (Color::Rgb { r: 120, g: 70, b: 140 }, Color::White),
    }
}

/// mm:ss with seconds rounded up, matching the HUD countdown feel.
fn format_time(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formatting_rounds_up() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(999), "00:01");
        assert_eq!(format_time(60_000), "01:00");
        assert_eq!(format_time(119_001), "02:00");
    }
}
