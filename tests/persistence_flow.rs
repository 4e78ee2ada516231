use klack::console::{Key, ScriptedConsole};
use klack::modes::run_raw_speed;
use klack::profile::{FileProfileStore, ProfileStore, User};
use klack::session_log::SessionLog;
use klack::words::WordList;

use tempfile::tempdir;

fn single_word_list(word: &str) -> WordList {
    WordList {
        name: "single".into(),
        words: vec![word.to_string()],
    }
}

// A completed headless test flows through the profile store and comes back
// intact: the path every real session takes.
#[test]
fn completed_test_persists_through_profile_store() {
    let dir = tempdir().unwrap();
    let store = FileProfileStore::with_path(dir.path().join("users.txt"));

    let list = single_word_list("hi");
    let script = std::iter::once(Key::Enter).chain("hi".chars().map(Key::Char));
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    let result = run_raw_speed(&mut console, &list, 1, &mut rng, None)
        .unwrap()
        .unwrap();

    let mut users = vec![User::new("alice")];
    let delta = users[0].apply_result(&result);
    assert!(delta.new_best_wpm.is_some());
    store.save(&users).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "alice");
    assert_eq!(loaded[0].tests_completed, 1);
    assert_eq!(loaded[0].total_chars_typed, 2);
    assert_eq!(loaded[0].total_correct_chars, 2);
}

#[test]
fn completed_test_appends_history_row() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("history.csv");
    let log = SessionLog::with_path(&log_path);

    let list = single_word_list("hi");
    let script = std::iter::once(Key::Enter).chain("hi".chars().map(Key::Char));
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    run_raw_speed(&mut console, &list, 1, &mut rng, Some(&log))
        .unwrap()
        .unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("date,mode,target_chars,elapsed_secs,wpm,accuracy")
    );
    let row = lines.next().unwrap();
    assert!(row.contains(",speed,2,"), "got {row}");
}

#[test]
fn cancelled_test_writes_nothing() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("history.csv");
    let log = SessionLog::with_path(&log_path);

    let list = single_word_list("hi");
    let mut console = ScriptedConsole::new(80, [Key::Enter, Key::Cancel]);
    let mut rng = rand::thread_rng();

    let result = run_raw_speed(&mut console, &list, 1, &mut rng, Some(&log)).unwrap();
    assert!(result.is_none());
    assert!(!log_path.exists());
}
