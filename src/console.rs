//! Terminal capability seam.
//!
//! The session engine talks to a [`Console`] trait instead of crossterm
//! directly so the whole engine can run headless in tests. The production
//! implementation wraps stdout; the scripted implementation replays a fixed
//! key sequence and records everything that would have been drawn.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{MoveTo, MoveUp},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};

use crate::DEFAULT_CONSOLE_WIDTH;

/// Keys the session loop distinguishes. Everything else maps to `Other`
/// and is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Cancel,
    Other,
}

/// Logical colors; each implementation maps them to platform codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextColor {
    Correct,
    Incorrect,
    Info,
    Highlight,
    Default,
}

pub trait Console {
    /// Current width in columns.
    fn width(&self) -> usize;

    /// Block until the next interesting key arrives. No echo.
    fn read_key(&mut self) -> io::Result<Key>;

    fn set_color(&mut self, color: TextColor) -> io::Result<()>;

    fn print(&mut self, text: &str) -> io::Result<()>;

    fn move_up(&mut self, lines: u16) -> io::Result<()>;

    fn clear_screen(&mut self) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Restores cooked mode when dropped, on every exit path.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Enter raw mode just long enough to consume one keypress.
pub fn wait_for_key() -> io::Result<Key> {
    let _guard = RawModeGuard::new()?;
    let mut console = CrosstermConsole::new();
    console.read_key()
}

fn map_key(key: KeyEvent) -> Key {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Cancel;
    }
    match key.code {
        KeyCode::Esc => Key::Cancel,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

/// Production console backed by crossterm.
pub struct CrosstermConsole {
    out: Stdout,
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for CrosstermConsole {
    fn width(&self) -> usize {
        terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(DEFAULT_CONSOLE_WIDTH)
            .max(1)
    }

    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            if let Event::Key(key) = event::read()? {
                // Key-up events arrive on some platforms; act on press/repeat only.
                if key.kind != KeyEventKind::Release {
                    return Ok(map_key(key));
                }
            }
        }
    }

    fn set_color(&mut self, color: TextColor) -> io::Result<()> {
        match color {
            TextColor::Correct => queue!(self.out, SetForegroundColor(Color::Green)),
            TextColor::Incorrect => queue!(self.out, SetForegroundColor(Color::Red)),
            TextColor::Info => queue!(self.out, SetForegroundColor(Color::Cyan)),
            TextColor::Highlight => queue!(self.out, SetForegroundColor(Color::Yellow)),
            TextColor::Default => queue!(self.out, ResetColor),
        }
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))
    }

    fn move_up(&mut self, lines: u16) -> io::Result<()> {
        if lines > 0 {
            queue!(self.out, MoveUp(lines))?;
        }
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// One recorded drawing operation, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleOp {
    Color(TextColor),
    Text(String),
    MoveUp(u16),
    Clear,
}

/// Headless console for tests: replays a scripted key sequence and records
/// output. When the script runs out it reports the cancel key so a session
/// loop always terminates.
pub struct ScriptedConsole {
    width: usize,
    keys: VecDeque<Key>,
    pub ops: Vec<ConsoleOp>,
}

impl ScriptedConsole {
    pub fn new(width: usize, keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            width,
            keys: keys.into_iter().collect(),
            ops: Vec::new(),
        }
    }

    /// Script that types every character of `text` after an initial
    /// start-the-session keypress.
    pub fn typing(width: usize, text: &str) -> Self {
        let keys = std::iter::once(Key::Enter).chain(text.chars().map(Key::Char));
        Self::new(width, keys)
    }

    /// All text emitted so far, colors and cursor motion stripped.
    pub fn rendered_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ConsoleOp::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn take_ops(&mut self) -> Vec<ConsoleOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Console for ScriptedConsole {
    fn width(&self) -> usize {
        self.width.max(1)
    }

    fn read_key(&mut self) -> io::Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Cancel))
    }

    fn set_color(&mut self, color: TextColor) -> io::Result<()> {
        self.ops.push(ConsoleOp::Color(color));
        Ok(())
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.ops.push(ConsoleOp::Text(text.to_string()));
        Ok(())
    }

    fn move_up(&mut self, lines: u16) -> io::Result<()> {
        self.ops.push(ConsoleOp::MoveUp(lines));
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.ops.push(ConsoleOp::Clear);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
