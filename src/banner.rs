//! ASCII title art shown at startup, lines cycling through three colors.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

const TITLE_ART: &str = include_str!("art/title.txt");

const LINE_COLORS: [Color; 3] = [Color::Green, Color::Cyan, Color::Yellow];

pub fn print_banner(out: &mut impl Write) -> io::Result<()> {
    for (i, line) in TITLE_ART.lines().enumerate() {
        queue!(
            out,
            SetForegroundColor(LINE_COLORS[i % LINE_COLORS.len()]),
            Print(line),
            Print("\n"),
        )?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}
