//! The real-time typing session: buffer state, per-keystroke classification
//! with charge-once mistake accounting, and the blocking input loop.

use std::collections::HashSet;
use std::io;
use std::time::Instant;

use crate::console::{Console, Key, TextColor};
use crate::render;
use crate::scoring::{self, ScoreBreakdown};
use crate::MAX_TARGET_CHARS;

/// Classification of one typed position against the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Final record of a completed session. Immutable once produced.
#[derive(Clone, Debug)]
pub struct TypingResult {
    pub target: String,
    /// Forward keystrokes only; backspaces are not counted.
    pub total_keystrokes: usize,
    pub correct_chars: usize,
    /// Live keystroke accuracy: `100 * correct / total`, 0 with no input.
    pub accuracy: f64,
    pub wpm: f64,
    pub elapsed_secs: f64,
    /// Position-based summary of the final transcript.
    pub breakdown: ScoreBreakdown,
}

/// How a session ended. Cancellation is an expected outcome, not an error,
/// and carries no result: callers must not update stats for it.
#[derive(Clone, Debug)]
pub enum SessionOutcome {
    Completed(TypingResult),
    Cancelled,
}

/// One in-progress typing session. Owned exclusively by the input loop for
/// the session's lifetime.
#[derive(Debug)]
pub struct Session {
    target: Vec<char>,
    typed: Vec<char>,
    /// Positions already charged to the mistake counter. Never cleared by
    /// backspace; covers positions past the target end as well, so every
    /// position is charged at most once per session.
    mistake_flags: HashSet<usize>,
    total_keystrokes: usize,
    incorrect_keystrokes: usize,
    started_at: Option<Instant>,
}

impl Session {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().take(MAX_TARGET_CHARS).collect(),
            typed: Vec::new(),
            mistake_flags: HashSet::new(),
            total_keystrokes: 0,
            incorrect_keystrokes: 0,
            started_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn pos(&self) -> usize {
        self.typed.len()
    }

    pub fn total_keystrokes(&self) -> usize {
        self.total_keystrokes
    }

    pub fn incorrect_keystrokes(&self) -> usize {
        self.incorrect_keystrokes
    }

    /// Append a printable character. Returns false when the buffer is at
    /// capacity and the keystroke was dropped.
    pub fn write(&mut self, c: char) -> bool {
        if self.typed.len() >= MAX_TARGET_CHARS {
            return false;
        }
        self.typed.push(c);
        self.total_keystrokes += 1;
        true
    }

    /// Remove the last typed character. Returns false at position zero.
    pub fn backspace(&mut self) -> bool {
        self.typed.pop().is_some()
    }

    /// Rescan the typed prefix, classifying every position and charging the
    /// mistake counter for positions not flagged before. O(pos) by design:
    /// the renderer recolors the whole prefix each keystroke anyway.
    pub fn classify(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.typed.len());
        for (i, &c) in self.typed.iter().enumerate() {
            let correct = self.target.get(i) == Some(&c);
            if correct {
                outcomes.push(Outcome::Correct);
            } else {
                outcomes.push(Outcome::Incorrect);
                if self.mistake_flags.insert(i) {
                    self.incorrect_keystrokes += 1;
                }
            }
        }
        outcomes
    }

    /// Forward completion: every target position has been typed past.
    pub fn is_complete(&self) -> bool {
        !self.target.is_empty() && self.typed.len() >= self.target.len()
    }

    pub fn finalize(&self) -> TypingResult {
        let elapsed_secs = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let correct_chars = self
            .total_keystrokes
            .saturating_sub(self.incorrect_keystrokes);
        let accuracy = if self.total_keystrokes == 0 {
            0.0
        } else {
            100.0 * correct_chars as f64 / self.total_keystrokes as f64
        };
        let wpm = if elapsed_secs > 0.0 {
            (self.typed.len() as f64 / 5.0) / (elapsed_secs / 60.0)
        } else {
            0.0
        };

        let target: String = self.target.iter().collect();
        let transcript: String = self.typed.iter().collect();

        TypingResult {
            breakdown: scoring::score(&target, &transcript),
            target,
            total_keystrokes: self.total_keystrokes,
            correct_chars,
            accuracy,
            wpm,
            elapsed_secs,
        }
    }
}

/// Run one interactive session against `target`.
///
/// Shows the target, waits for any key to start, then blocks on one
/// keystroke per iteration until the text is completed or the cancel key
/// arrives. The timer runs from the start transition to completion only.
pub fn run_session(console: &mut dyn Console, target: &str) -> io::Result<SessionOutcome> {
    let mut session = Session::new(target);

    console.set_color(TextColor::Info)?;
    console.print(target)?;
    console.set_color(TextColor::Default)?;
    console.print("\r\n\r\nPress any key to start typing...")?;
    console.flush()?;
    console.read_key()?;

    console.clear_screen()?;
    console.set_color(TextColor::Info)?;
    console.print(target)?;
    console.set_color(TextColor::Default)?;
    console.print("\r\n\r\nBegin typing:    Press ESC at any time to cancel\r\n")?;
    console.flush()?;

    session.start();

    while !session.is_complete() {
        match console.read_key()? {
            Key::Cancel => {
                console.print("\r\n\r\nTest cancelled. Returning to menu...\r\n")?;
                console.flush()?;
                return Ok(SessionOutcome::Cancelled);
            }
            Key::Backspace => {
                let len_before = session.pos();
                if session.backspace() {
                    let outcomes = session.classify();
                    render::redraw(console, session.typed(), &outcomes, len_before)?;
                }
            }
            Key::Char(c) if !c.is_control() => {
                let len_before = session.pos();
                if session.write(c) {
                    let outcomes = session.classify();
                    render::redraw(console, session.typed(), &outcomes, len_before)?;
                }
            }
            _ => {}
        }
    }

    console.print("\r\n\r\nText completed!\r\n")?;
    console.flush()?;
    Ok(SessionOutcome::Completed(session.finalize()))
}
