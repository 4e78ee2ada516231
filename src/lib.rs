// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only code in main.rs.
pub mod banner;
pub mod config;
pub mod console;
pub mod modes;
pub mod profile;
pub mod render;
pub mod scoring;
pub mod session;
pub mod session_log;
pub mod words;

/// Hard cap on target length and on the typed buffer, in characters.
pub const MAX_TARGET_CHARS: usize = 999;

/// Endurance mode continues while running accuracy stays at or above this.
pub const ENDURANCE_ACCURACY_THRESHOLD: f64 = 85.0;

/// Endurance mode continues while running WPM stays at or above this.
pub const ENDURANCE_WPM_THRESHOLD: f64 = 30.0;

/// Historical accuracy at or above this starts endurance on the hard list;
/// ten points below it selects the medium list.
pub const DYNAMIC_COMPLEXITY_THRESHOLD: f64 = 95.0;

/// Words sampled per endurance round.
pub const WORDS_PER_ROUND: usize = 10;

/// Fallback when the terminal width cannot be determined.
pub const DEFAULT_CONSOLE_WIDTH: usize = 80;
