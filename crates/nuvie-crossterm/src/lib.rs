//! Crossterm terminal frontend for the Nuvie map engine.
//!
//! The game draws into an indexed [`Surface`]; the terminal shows it at a
//! quarter of its resolution, two pixel rows per character cell using the
//! upper half block, with palette indices sent as 256-colour ANSI values.

use std::error::Error;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info};
use nuvie_core::{Effect, Key, ModMask, Model, MouseAction, Msg, Point, Range, Surface};

/// Surface pixels per terminal column.
pub const PIXELS_PER_COL: i32 = 4;

/// Surface pixels per terminal row (two half-block rows).
pub const PIXELS_PER_ROW: i32 = PIXELS_PER_COL * 2;

const HALF_BLOCK: char = '\u{2580}';

/// Maps crossterm key modifiers to a [`ModMask`].
fn to_mod_mask(mods: KeyModifiers) -> ModMask {
    let mut m = ModMask::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        m = m | ModMask::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        m = m | ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m = m | ModMask::ALT;
    }
    m
}

/// Maps a crossterm [`KeyCode`] to a [`Key`].
fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

/// Terminal cell to the surface pixel at its top-left corner.
fn cell_to_pixel(col: u16, row: u16) -> Point {
    Point::new(i32::from(col) * PIXELS_PER_COL, i32::from(row) * PIXELS_PER_ROW)
}

/// Translate one terminal event into a message for the model.
fn to_msg(ev: Event) -> Option<Msg> {
    let time = Instant::now();
    match ev {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) if kind != KeyEventKind::Release => to_key(code).map(|key| Msg::KeyDown {
            key,
            modifiers: to_mod_mask(modifiers),
            time,
        }),
        Event::Mouse(me) => {
            let action = match me.kind {
                MouseEventKind::Down(MouseButton::Left) => MouseAction::Main,
                MouseEventKind::Down(MouseButton::Right) => MouseAction::Secondary,
                MouseEventKind::Down(MouseButton::Middle) => MouseAction::Auxiliary,
                MouseEventKind::Up(_) => MouseAction::Release,
                MouseEventKind::Moved | MouseEventKind::Drag(_) => MouseAction::Move,
                _ => return None,
            };
            Some(Msg::Mouse {
                action,
                pos: cell_to_pixel(me.column, me.row),
                modifiers: to_mod_mask(me.modifiers),
                time,
            })
        }
        _ => None,
    }
}

/// Owns the terminal while a session runs.
pub struct CrosstermDriver {
    mouse_enabled: bool,
}

impl CrosstermDriver {
    pub fn new() -> Self {
        Self { mouse_enabled: true }
    }

    /// Configure whether mouse events are captured.
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        if self.mouse_enabled {
            execute!(stdout, event::EnableMouseCapture)?;
        }
        Ok(())
    }

    /// Wait up to `timeout` for input and return every pending message.
    pub fn poll_msgs(&mut self, timeout: Duration) -> io::Result<Vec<Msg>> {
        let mut msgs = Vec::new();
        if !event::poll(timeout)? {
            return Ok(msgs);
        }
        while event::poll(Duration::ZERO)? {
            if let Some(m) = to_msg(event::read()?) {
                msgs.push(m);
            }
        }
        Ok(msgs)
    }

    /// Show the `dirty` part of `surface`.
    pub fn present(&mut self, surface: &Surface, dirty: Range) -> io::Result<()> {
        let small = surface.downsample(surface.bounds(), PIXELS_PER_COL);
        let rows = (small.height() + 1) / 2;
        let first = (dirty.min.y / PIXELS_PER_ROW).max(0);
        let last = ((dirty.max.y + PIXELS_PER_ROW - 1) / PIXELS_PER_ROW).min(rows);
        let cols = (dirty.min.x / PIXELS_PER_COL).max(0)..((dirty.max.x + PIXELS_PER_COL - 1) / PIXELS_PER_COL).min(small.width());

        let mut stdout = io::stdout();
        for row in first..last {
            queue!(stdout, cursor::MoveTo(cols.start as u16, row as u16))?;
            for col in cols.clone() {
                let top = small.pixel(col, row * 2).unwrap_or(0);
                let bottom = small.pixel(col, row * 2 + 1).unwrap_or(0);
                queue!(
                    stdout,
                    SetForegroundColor(Color::AnsiValue(top)),
                    SetBackgroundColor(Color::AnsiValue(bottom)),
                    Print(HALF_BLOCK)
                )?;
            }
        }
        queue!(stdout, ResetColor)?;
        stdout.flush()
    }

    /// Write a line of text below the map.
    pub fn status(&mut self, row: u16, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        stdout.flush()
    }

    pub fn close(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = execute!(stdout, event::DisableMouseCapture);
        }
        let _ = execute!(stdout, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Default for CrosstermDriver {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Frame loop
// ---------------------------------------------------------------------------

/// Drive `model` on the terminal until it asks to end.
///
/// `size` is the surface size in pixels, `tick` the game frame period. The
/// `status` callback may return lines to show under the map after each
/// frame.
pub fn run<M, F>(model: &mut M, size: Point, tick: Duration, mut status: F) -> Result<(), Box<dyn Error>>
where
    M: Model,
    F: FnMut(&M) -> Vec<String>,
{
    let mut driver = CrosstermDriver::new();
    driver.init()?;
    let result = frame_loop(&mut driver, model, size, tick, &mut status);
    driver.close();
    result
}

fn frame_loop<M, F>(
    driver: &mut CrosstermDriver,
    model: &mut M,
    size: Point,
    tick: Duration,
    status: &mut F,
) -> Result<(), Box<dyn Error>>
where
    M: Model,
    F: FnMut(&M) -> Vec<String>,
{
    let mut surface = Surface::new(size.x, size.y);
    let status_row = u16::try_from((size.y + PIXELS_PER_ROW - 1) / PIXELS_PER_ROW).unwrap_or(u16::MAX);
    let mut redraw = model.update(Msg::Init) == Some(Effect::Redraw);
    let mut next_tick = Instant::now() + tick;
    info!("terminal frontend started");

    loop {
        if redraw {
            let dirty = model.draw(&mut surface);
            driver.present(&surface, dirty)?;
            for (i, line) in status(model).iter().enumerate() {
                let row = status_row.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
                driver.status(row, line)?;
            }
            redraw = false;
        }

        let wait = next_tick.saturating_duration_since(Instant::now());
        let mut msgs = driver.poll_msgs(wait)?;
        if Instant::now() >= next_tick {
            msgs.push(Msg::Tick { time: Instant::now() });
            next_tick += tick;
        }
        for msg in msgs {
            match model.update(msg) {
                Some(Effect::End) => {
                    debug!("model asked to end");
                    return Ok(());
                }
                Some(Effect::Redraw) => redraw = true,
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(to_key(KeyCode::Char('l')), Some(Key::Char('l')));
        assert_eq!(to_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(to_key(KeyCode::Up), Some(Key::ArrowUp));
        assert_eq!(to_key(KeyCode::F(1)), None);
    }

    #[test]
    fn test_mod_mask() {
        let m = to_mod_mask(KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert!(m.contains(ModMask::CTRL));
        assert!(m.contains(ModMask::SHIFT));
        assert!(!m.contains(ModMask::ALT));
    }

    #[test]
    fn test_mouse_cell_maps_to_pixels() {
        let ev = Event::Mouse(event::MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        match to_msg(ev) {
            Some(Msg::Mouse { action, pos, .. }) => {
                assert_eq!(action, MouseAction::Main);
                assert_eq!(pos, Point::new(40, 24));
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
