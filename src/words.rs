//! Word lists: bundled per-difficulty lists, user-supplied lists on disk,
//! and sampling helpers for building session targets.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::MAX_TARGET_CHARS;

static WORDLIST_DIR: Dir = include_dir!("src/wordlists");

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Difficulty {
    Light,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn file_name(self) -> String {
        format!("{}.txt", self.to_string().to_lowercase())
    }
}

/// Loading a word list from disk failed. Reported to the user; the current
/// mode aborts back to the menu instead of crashing.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Empty { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "could not read word list {}: {}", path.display(), source)
            }
            LoadError::Empty { path } => {
                write!(f, "word list {} contains no words", path.display())
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Empty { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

impl WordList {
    /// List compiled into the binary. Missing embedded assets are a build
    /// defect, not a runtime condition.
    pub fn bundled(difficulty: Difficulty) -> Self {
        let file = WORDLIST_DIR
            .get_file(difficulty.file_name())
            .expect("bundled word list missing");
        let contents = file
            .contents_utf8()
            .expect("bundled word list is not utf-8");
        Self {
            name: difficulty.to_string().to_lowercase(),
            words: parse_words(contents),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let words = parse_words(&contents);
        if words.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Ok(Self { name, words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Sample without replacement, clamped to the pool size.
    pub fn sample<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<&str> {
        self.words
            .choose_multiple(rng, count.min(self.words.len()))
            .map(String::as_str)
            .collect()
    }

    /// Sample exactly `count` words. Each pass is without replacement; when
    /// the pool is smaller than `count`, whole-pool passes repeat until the
    /// quota is met, so this terminates for any non-empty pool.
    pub fn sample_filling<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<&str> {
        let mut picked = self.sample(rng, count);
        while picked.len() < count && !self.words.is_empty() {
            let deficit = count - picked.len();
            picked.extend(self.sample(rng, deficit));
        }
        picked
    }

    /// Target for a raw-speed test: `count` clamped to the pool.
    pub fn speed_target<R: Rng>(&self, rng: &mut R, count: usize) -> String {
        build_target(&self.sample(rng, count))
    }

    /// Target for one endurance round: exactly `count` words, reusing words
    /// when the pool runs short.
    pub fn round_target<R: Rng>(&self, rng: &mut R, count: usize) -> String {
        build_target(&self.sample_filling(rng, count))
    }
}

fn parse_words(contents: &str) -> Vec<String> {
    contents.split_whitespace().map(str::to_string).collect()
}

/// Join words with single spaces, capped at the session target limit.
pub fn build_target(words: &[&str]) -> String {
    words.join(" ").chars().take(MAX_TARGET_CHARS).collect()
}

/// Resolve a difficulty to a word list: `<difficulty>.txt` under `words_dir`
/// when one is configured, the bundled list otherwise.
pub fn load(difficulty: Difficulty, words_dir: Option<&Path>) -> Result<WordList, LoadError> {
    match words_dir {
        Some(dir) => WordList::from_file(&dir.join(difficulty.file_name())),
        None => Ok(WordList::bundled(difficulty)),
    }
}
