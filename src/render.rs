//! Erase-then-redraw of the typed prefix after every keystroke.
//!
//! The redraw is synchronous and idempotent for a given buffer state: the
//! previously drawn region is blanked line by line, then the whole prefix is
//! re-emitted with one color per classified position. Wrapping is computed
//! from the console width at draw time.

use std::io;

use unicode_width::UnicodeWidthChar;

use crate::console::{Console, TextColor};
use crate::session::Outcome;

/// Redraw the typed prefix. `len_before_edit` is the buffer length before
/// the keystroke being rendered; it determines how many lines the previous
/// frame occupied and therefore how many must be blanked.
pub fn redraw(
    console: &mut dyn Console,
    typed: &[char],
    outcomes: &[Outcome],
    len_before_edit: usize,
) -> io::Result<()> {
    debug_assert_eq!(typed.len(), outcomes.len());

    let width = console.width().max(1);
    erase_lines(console, len_before_edit / width + 1, width)?;

    let mut line_len = 0usize;
    for (ch, outcome) in typed.iter().zip(outcomes) {
        let ch_cols = UnicodeWidthChar::width(*ch).unwrap_or(0);
        if line_len + ch_cols > width {
            console.print("\r\n")?;
            line_len = 0;
        }
        console.set_color(match outcome {
            Outcome::Correct => TextColor::Correct,
            Outcome::Incorrect => TextColor::Incorrect,
        })?;
        console.print(&ch.to_string())?;
        line_len += ch_cols;
    }

    console.set_color(TextColor::Default)?;
    console.flush()
}

/// Blank `count` lines working upward from the cursor line, leaving the
/// cursor at column 0 of the topmost blanked line.
fn erase_lines(console: &mut dyn Console, count: usize, width: usize) -> io::Result<()> {
    let blank = " ".repeat(width);
    for i in 0..count {
        console.print("\r")?;
        console.print(&blank)?;
        console.print("\r")?;
        if i + 1 < count {
            console.move_up(1)?;
        }
    }
    Ok(())
}
