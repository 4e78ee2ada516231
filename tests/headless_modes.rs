use klack::console::{Key, ScriptedConsole};
use klack::modes::{run_endurance, run_raw_speed};
use klack::words::WordList;
use klack::WORDS_PER_ROUND;

// A one-word pool makes every sampled target deterministic, so a scripted
// key sequence can type it exactly.
fn single_word_list(word: &str) -> WordList {
    WordList {
        name: "single".into(),
        words: vec![word.to_string()],
    }
}

fn round_text(word: &str) -> String {
    vec![word; WORDS_PER_ROUND].join(" ")
}

#[test]
fn raw_speed_completes_with_scripted_keys() {
    let list = single_word_list("hi");
    // Count 3 clamps to the pool: the target is exactly "hi".
    let script = std::iter::once(Key::Enter).chain("hi".chars().map(Key::Char));
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    let result = run_raw_speed(&mut console, &list, 3, &mut rng, None)
        .unwrap()
        .unwrap();

    assert_eq!(result.target, "hi");
    assert_eq!(result.total_keystrokes, 2);
    assert_eq!(result.correct_chars, 2);
    assert_eq!(result.accuracy, 100.0);
    assert!(console.rendered_text().contains("Text completed!"));
}

#[test]
fn raw_speed_cancelled_yields_no_result() {
    let list = single_word_list("hi");
    let script = [Key::Enter, Key::Char('h'), Key::Cancel];
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    let result = run_raw_speed(&mut console, &list, 3, &mut rng, None).unwrap();
    assert!(result.is_none());
    assert!(console.rendered_text().contains("Test cancelled"));
}

#[test]
fn endurance_runs_until_accuracy_breaks() {
    let list = single_word_list("ab");
    let target = round_text("ab");

    // Round 1 typed perfectly, acknowledge the next-round prompt, then
    // round 2 typed entirely wrong so accuracy falls below the threshold.
    let script = std::iter::once(Key::Enter)
        .chain(target.chars().map(Key::Char))
        .chain(std::iter::once(Key::Enter))
        .chain(std::iter::once(Key::Enter))
        .chain(target.chars().map(|_| Key::Char('x')));
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    let state = run_endurance(&mut console, &list, &mut rng, None).unwrap();

    assert!(!state.cancelled);
    assert_eq!(state.rounds_completed, 2);
    assert_eq!(state.words_completed, 2 * WORDS_PER_ROUND as u32);
    assert_eq!(state.running_accuracy, 0.0);
    assert!(console
        .rendered_text()
        .contains("Accuracy dropped below 85.0%"));
}

#[test]
fn endurance_cancel_mid_round_keeps_completed_rounds() {
    let list = single_word_list("ab");
    let target = round_text("ab");

    let script = std::iter::once(Key::Enter)
        .chain(target.chars().map(Key::Char))
        .chain([Key::Enter, Key::Enter, Key::Char('a'), Key::Cancel]);
    let mut console = ScriptedConsole::new(80, script);
    let mut rng = rand::thread_rng();

    let state = run_endurance(&mut console, &list, &mut rng, None).unwrap();

    assert!(state.cancelled);
    assert_eq!(state.rounds_completed, 1);
    assert_eq!(state.words_completed, WORDS_PER_ROUND as u32);
    // The finished round still counts; the cancelled one does not.
    assert_eq!(state.running_accuracy, 100.0);
}

#[test]
fn endurance_round_header_shows_running_stats() {
    let list = single_word_list("ab");
    let mut console = ScriptedConsole::new(80, [Key::Enter, Key::Cancel]);
    let mut rng = rand::thread_rng();

    run_endurance(&mut console, &list, &mut rng, None).unwrap();

    let text = console.rendered_text();
    assert!(text.contains("===== Round 1 ====="));
    assert!(text.contains("Words completed so far: 0"));
}
