//! Round orchestration: the endurance loop and the raw-speed single round.
//!
//! Both run entirely through the [`Console`] seam so they can be driven
//! headless in tests. Stats persistence stays with the caller; cancellation
//! never updates anything.

use std::io;

use rand::Rng;

use crate::console::{Console, TextColor};
use crate::session::{self, SessionOutcome, TypingResult};
use crate::session_log::{LogRecord, SessionLog};
use crate::words::WordList;
use crate::{ENDURANCE_ACCURACY_THRESHOLD, ENDURANCE_WPM_THRESHOLD, WORDS_PER_ROUND};

/// Cumulative state of one endurance invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub words_completed: u32,
    pub rounds_completed: u32,
    pub running_accuracy: f64,
    pub running_wpm: f64,
    pub cancelled: bool,
}

impl Default for RoundState {
    fn default() -> Self {
        // Optimistic seeds so the first round always runs.
        Self {
            words_completed: 0,
            rounds_completed: 0,
            running_accuracy: 100.0,
            running_wpm: 100.0,
            cancelled: false,
        }
    }
}

impl RoundState {
    pub fn above_thresholds(&self) -> bool {
        self.running_accuracy >= ENDURANCE_ACCURACY_THRESHOLD
            && self.running_wpm >= ENDURANCE_WPM_THRESHOLD
    }
}

/// Endurance mode: rounds of ten sampled words until accuracy or speed
/// drops below the thresholds, or the user cancels. Returns the final
/// cumulative state; the caller decides what to persist.
pub fn run_endurance<R: Rng>(
    console: &mut dyn Console,
    words: &WordList,
    rng: &mut R,
    log: Option<&SessionLog>,
) -> io::Result<RoundState> {
    let mut state = RoundState::default();

    while state.above_thresholds() && !state.cancelled {
        let target = words.round_target(rng, WORDS_PER_ROUND);
        if target.is_empty() {
            break;
        }

        console.set_color(TextColor::Highlight)?;
        console.print(&format!("\r\n===== Round {} =====\r\n", state.rounds_completed + 1))?;
        console.set_color(TextColor::Default)?;
        console.print(&format!(
            "Words completed so far: {}\r\nCurrent accuracy: {:.2}%\r\nCurrent WPM: {:.2}\r\n\r\n",
            state.words_completed, state.running_accuracy, state.running_wpm
        ))?;

        match session::run_session(console, &target)? {
            SessionOutcome::Cancelled => {
                state.cancelled = true;
            }
            SessionOutcome::Completed(result) => {
                log_session(log, "endurance", &result);
                state.running_accuracy = result.accuracy;
                state.running_wpm = result.wpm;
                state.words_completed += WORDS_PER_ROUND as u32;
                state.rounds_completed += 1;

                print_round_results(console, state.rounds_completed, &result)?;

                if state.above_thresholds() {
                    console.print(
                        "\r\nStill above both thresholds. Press any key for the next round...",
                    )?;
                    console.flush()?;
                    console.read_key()?;
                } else if state.running_accuracy < ENDURANCE_ACCURACY_THRESHOLD {
                    console.print(&format!(
                        "\r\nAccuracy dropped below {ENDURANCE_ACCURACY_THRESHOLD:.1}%. Endurance mode ended.\r\n"
                    ))?;
                } else {
                    console.print(&format!(
                        "\r\nWPM dropped below {ENDURANCE_WPM_THRESHOLD:.1}. Endurance mode ended.\r\n"
                    ))?;
                }
            }
        }
    }

    console.flush()?;
    Ok(state)
}

fn print_round_results(
    console: &mut dyn Console,
    round: u32,
    result: &TypingResult,
) -> io::Result<()> {
    console.set_color(TextColor::Highlight)?;
    console.print(&format!("\r\n===== Round {round} Results =====\r\n"))?;
    console.set_color(TextColor::Default)?;
    console.print(&format!(
        "Time taken: {:.2} seconds\r\nAccuracy: {:.2}%\r\nWPM: {:.2}\r\nMistyped chars: {}\r\nMissed chars: {}\r\nExtra chars: {}\r\n",
        result.elapsed_secs,
        result.accuracy,
        result.wpm,
        result.breakdown.mistyped,
        result.breakdown.missed,
        result.breakdown.extra,
    ))
}

/// Raw-speed mode: one session over `count` sampled words (clamped to the
/// pool). `None` when the user cancelled.
pub fn run_raw_speed<R: Rng>(
    console: &mut dyn Console,
    words: &WordList,
    count: usize,
    rng: &mut R,
    log: Option<&SessionLog>,
) -> io::Result<Option<TypingResult>> {
    let target = words.speed_target(rng, count);
    if target.is_empty() {
        return Ok(None);
    }

    console.set_color(TextColor::Highlight)?;
    console.print("\r\n===== Raw Speed Test =====\r\n")?;
    console.set_color(TextColor::Default)?;
    console.print("Type as fast and accurately as you can!\r\n\r\n")?;

    match session::run_session(console, &target)? {
        SessionOutcome::Completed(result) => {
            log_session(log, "speed", &result);
            Ok(Some(result))
        }
        SessionOutcome::Cancelled => Ok(None),
    }
}

/// Best-effort history append; a failing log never interrupts play.
fn log_session(log: Option<&SessionLog>, mode: &str, result: &TypingResult) {
    if let Some(log) = log {
        let _ = log.append(&LogRecord {
            mode,
            target_chars: result.target.chars().count(),
            elapsed_secs: result.elapsed_secs,
            wpm: result.wpm,
            accuracy: result.accuracy,
        });
    }
}
