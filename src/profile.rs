//! Persisted user profiles and everything derived from them: stats updates
//! after a test, leaderboard ordering, skill assessment, and the starting
//! difficulty for endurance mode.
//!
//! The on-disk format is one whitespace-separated line per user:
//! `name bestWPM bestAccuracy testsCompleted enduranceHighScore
//! averageAccuracy totalCharsTyped totalCorrectChars`. A line is accepted
//! when at least the first four fields parse; missing trailing fields
//! default to zero. Malformed lines are skipped without disturbing the rest
//! of the table.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use itertools::Itertools;

use crate::modes::RoundState;
use crate::session::TypingResult;
use crate::words::Difficulty;
use crate::DYNAMIC_COMPLEXITY_THRESHOLD;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub name: String,
    pub best_wpm: f64,
    pub best_accuracy: f64,
    pub tests_completed: u32,
    pub endurance_high_score: u32,
    pub average_accuracy: f64,
    pub total_chars_typed: u64,
    pub total_correct_chars: u64,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            best_wpm: 0.0,
            best_accuracy: 0.0,
            tests_completed: 0,
            endurance_high_score: 0,
            average_accuracy: 0.0,
            total_chars_typed: 0,
            total_correct_chars: 0,
        }
    }

    /// Fold one completed raw-speed result into the profile.
    pub fn apply_result(&mut self, result: &TypingResult) -> StatsDelta {
        let delta = StatsDelta {
            new_best_wpm: (result.wpm > self.best_wpm).then(|| self.best_wpm),
            new_best_accuracy: (result.accuracy > self.best_accuracy)
                .then(|| self.best_accuracy),
        };

        if result.wpm > self.best_wpm {
            self.best_wpm = result.wpm;
        }
        if result.accuracy > self.best_accuracy {
            self.best_accuracy = result.accuracy;
        }

        self.total_chars_typed += result.total_keystrokes as u64;
        self.total_correct_chars += result.correct_chars as u64;
        if self.total_chars_typed > 0 {
            self.average_accuracy =
                self.total_correct_chars as f64 / self.total_chars_typed as f64 * 100.0;
        }
        self.tests_completed += 1;

        delta
    }

    /// Fold a finished endurance run into the profile. Returns the previous
    /// high score when a new one was set.
    pub fn apply_endurance(&mut self, state: &RoundState) -> Option<u32> {
        self.tests_completed += state.rounds_completed;
        if state.words_completed > self.endurance_high_score {
            let previous = self.endurance_high_score;
            self.endurance_high_score = state.words_completed;
            Some(previous)
        } else {
            None
        }
    }

    /// Historical accuracy: lifetime character ratio when data exists, the
    /// best recorded accuracy otherwise.
    pub fn historical_accuracy(&self) -> f64 {
        if self.total_chars_typed > 0 {
            self.total_correct_chars as f64 / self.total_chars_typed as f64 * 100.0
        } else {
            self.best_accuracy
        }
    }

    /// Endurance starting difficulty, scaled to past performance.
    pub fn starting_difficulty(&self) -> Difficulty {
        let accuracy = self.historical_accuracy();
        if accuracy >= DYNAMIC_COMPLEXITY_THRESHOLD {
            Difficulty::Hard
        } else if accuracy >= DYNAMIC_COMPLEXITY_THRESHOLD - 10.0 {
            Difficulty::Medium
        } else {
            Difficulty::Light
        }
    }

    /// Composite 0-100 rating: speed weighted over accuracy history.
    pub fn skill_rating(&self) -> f64 {
        let normalized_wpm = self.best_wpm / 200.0 * 100.0;
        let rating =
            normalized_wpm * 0.5 + self.best_accuracy * 0.3 + self.average_accuracy * 0.2;
        rating.min(100.0)
    }

    pub fn skill_tier(&self) -> &'static str {
        let rating = self.skill_rating();
        if rating > 90.0 {
            "Expert"
        } else if rating > 80.0 {
            "Advanced"
        } else if rating > 60.0 {
            "Intermediate"
        } else {
            "Beginner"
        }
    }
}

/// What changed when a result was applied; previous bests for reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatsDelta {
    pub new_best_wpm: Option<f64>,
    pub new_best_accuracy: Option<f64>,
}

pub fn parse_line(line: &str) -> Option<User> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?.to_string();
    let best_wpm: f64 = fields.next()?.parse().ok()?;
    let best_accuracy: f64 = fields.next()?.parse().ok()?;
    let tests_completed: u32 = fields.next()?.parse().ok()?;

    let mut user = User {
        name,
        best_wpm,
        best_accuracy,
        tests_completed,
        endurance_high_score: fields.next().and_then(|f| f.parse().ok()).unwrap_or(0),
        average_accuracy: fields.next().and_then(|f| f.parse().ok()).unwrap_or(0.0),
        total_chars_typed: fields.next().and_then(|f| f.parse().ok()).unwrap_or(0),
        total_correct_chars: fields.next().and_then(|f| f.parse().ok()).unwrap_or(0),
    };

    // Records written before character totals existed get estimates so the
    // adaptive difficulty has something to work with.
    if user.total_chars_typed == 0 && user.tests_completed > 0 {
        user.total_chars_typed = 200 * user.tests_completed as u64;
        user.total_correct_chars =
            (user.total_chars_typed as f64 * user.best_accuracy / 100.0) as u64;
        user.average_accuracy = user.best_accuracy * 0.9;
    }

    Some(user)
}

pub fn format_line(user: &User) -> String {
    format!(
        "{} {:.2} {:.2} {} {} {:.2} {} {}",
        user.name,
        user.best_wpm,
        user.best_accuracy,
        user.tests_completed,
        user.endurance_high_score,
        user.average_accuracy,
        user.total_chars_typed,
        user.total_correct_chars,
    )
}

pub trait ProfileStore {
    fn load(&self) -> Vec<User>;
    fn save(&self, users: &[User]) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "klack") {
            pd.data_dir().join("users.txt")
        } else {
            PathBuf::from("users.txt")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Vec<User> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.lines().filter_map(parse_line).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn save(&self, users: &[User]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data: String = users.iter().map(|u| format_line(u) + "\n").collect();
        fs::write(&self.path, data)
    }
}

pub fn find_user(users: &[User], name: &str) -> Option<usize> {
    users.iter().position(|u| u.name == name)
}

/// Copy of the table ordered by best WPM, highest first.
pub fn leaderboard(users: &[User]) -> Vec<User> {
    users
        .iter()
        .cloned()
        .sorted_by(|a, b| {
            b.best_wpm
                .partial_cmp(&a.best_wpm)
                .unwrap_or(Ordering::Equal)
        })
        .collect()
}

/// 1-based rank of `name` on the leaderboard.
pub fn rank_of(ordered: &[User], name: &str) -> Option<usize> {
    ordered.iter().position(|u| u.name == name).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBreakdown;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn result(wpm: f64, accuracy: f64, total: usize, correct: usize) -> TypingResult {
        TypingResult {
            target: "x".into(),
            total_keystrokes: total,
            correct_chars: correct,
            accuracy,
            wpm,
            elapsed_secs: 10.0,
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn parse_full_line() {
        let user = parse_line("alice 72.50 96.20 14 120 93.10 4200 3990").unwrap();
        assert_eq!(user.name, "alice");
        assert_abs_diff_eq!(user.best_wpm, 72.5);
        assert_eq!(user.tests_completed, 14);
        assert_eq!(user.endurance_high_score, 120);
        assert_eq!(user.total_correct_chars, 3990);
    }

    #[test]
    fn parse_accepts_first_four_fields_only() {
        let user = parse_line("bob 40.0 88.0 2").unwrap();
        assert_eq!(user.name, "bob");
        assert_eq!(user.endurance_high_score, 0);
        // Legacy estimation kicks in: 2 tests, no recorded totals.
        assert_eq!(user.total_chars_typed, 400);
        assert_eq!(user.total_correct_chars, 352);
        assert_abs_diff_eq!(user.average_accuracy, 79.2, epsilon = 0.01);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("carol").is_none());
        assert!(parse_line("carol not-a-number 90 1").is_none());
        assert!(parse_line("carol 40.0 90.0 one").is_none());
    }

    #[test]
    fn line_roundtrip() {
        let mut user = User::new("dave");
        user.best_wpm = 55.25;
        user.best_accuracy = 91.0;
        user.tests_completed = 7;
        user.endurance_high_score = 80;
        user.average_accuracy = 88.5;
        user.total_chars_typed = 1234;
        user.total_correct_chars = 1100;

        let parsed = parse_line(&format_line(&user)).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn store_roundtrip_and_skips_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.txt");
        let store = FileProfileStore::with_path(&path);

        let users = vec![User::new("erin"), User::new("frank")];
        store.save(&users).unwrap();

        // Corrupt the middle of the file; valid records must survive.
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.insert_str(contents.find('\n').unwrap() + 1, "garbage line here x\n");
        fs::write(&path, contents).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "erin");
        assert_eq!(loaded[1].name, "frank");
    }

    #[test]
    fn missing_file_loads_empty_table() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("absent.txt"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn apply_result_updates_bests_and_totals() {
        let mut user = User::new("gail");
        let delta = user.apply_result(&result(45.0, 92.0, 100, 92));

        assert_eq!(delta.new_best_wpm, Some(0.0));
        assert_eq!(delta.new_best_accuracy, Some(0.0));
        assert_abs_diff_eq!(user.best_wpm, 45.0);
        assert_eq!(user.tests_completed, 1);
        assert_abs_diff_eq!(user.average_accuracy, 92.0);

        // Slower, sloppier run: bests hold, averages move.
        let delta = user.apply_result(&result(30.0, 80.0, 100, 80));
        assert_eq!(delta.new_best_wpm, None);
        assert_abs_diff_eq!(user.best_wpm, 45.0);
        assert_abs_diff_eq!(user.average_accuracy, 86.0);
        assert_eq!(user.tests_completed, 2);
    }

    #[test]
    fn apply_endurance_tracks_high_score() {
        let mut user = User::new("hank");
        let state = RoundState {
            words_completed: 50,
            rounds_completed: 5,
            running_accuracy: 90.0,
            running_wpm: 40.0,
            cancelled: false,
        };
        assert_eq!(user.apply_endurance(&state), Some(0));
        assert_eq!(user.endurance_high_score, 50);
        assert_eq!(user.tests_completed, 5);

        let worse = RoundState {
            words_completed: 20,
            rounds_completed: 2,
            ..state
        };
        assert_eq!(user.apply_endurance(&worse), None);
        assert_eq!(user.endurance_high_score, 50);
        assert_eq!(user.tests_completed, 7);
    }

    #[test]
    fn starting_difficulty_scales_with_history() {
        let mut user = User::new("iris");
        user.total_chars_typed = 1000;

        user.total_correct_chars = 960;
        assert_eq!(user.starting_difficulty(), Difficulty::Hard);

        user.total_correct_chars = 900;
        assert_eq!(user.starting_difficulty(), Difficulty::Medium);

        user.total_correct_chars = 700;
        assert_eq!(user.starting_difficulty(), Difficulty::Light);
    }

    #[test]
    fn starting_difficulty_falls_back_to_best_accuracy() {
        let mut user = User::new("jo");
        user.best_accuracy = 97.0;
        assert_eq!(user.starting_difficulty(), Difficulty::Hard);
    }

    #[test]
    fn skill_tiers() {
        let mut user = User::new("kim");
        assert_eq!(user.skill_tier(), "Beginner");

        user.best_wpm = 120.0;
        user.best_accuracy = 95.0;
        user.average_accuracy = 90.0;
        // 60*0.5 + 95*0.3 + 90*0.2 = 76.5
        assert_eq!(user.skill_tier(), "Intermediate");

        user.best_wpm = 190.0;
        user.best_accuracy = 99.0;
        user.average_accuracy = 98.0;
        assert_eq!(user.skill_tier(), "Expert");
        assert!(user.skill_rating() <= 100.0);
    }

    #[test]
    fn leaderboard_sorts_descending_by_wpm() {
        let mut a = User::new("a");
        a.best_wpm = 30.0;
        let mut b = User::new("b");
        b.best_wpm = 90.0;
        let mut c = User::new("c");
        c.best_wpm = 60.0;

        let ordered = leaderboard(&[a, b, c]);
        let names: Vec<&str> = ordered.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(rank_of(&ordered, "a"), Some(3));
        assert_eq!(rank_of(&ordered, "zed"), None);
    }
}
