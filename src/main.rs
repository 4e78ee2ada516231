use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use klack::banner::print_banner;
use klack::config::{Config, ConfigStore, FileConfigStore};
use klack::console::{wait_for_key, CrosstermConsole, RawModeGuard};
use klack::modes;
use klack::profile::{self, FileProfileStore, ProfileStore, User};
use klack::session::TypingResult;
use klack::session_log::SessionLog;
use klack::words::{self, Difficulty};
use klack::{ENDURANCE_ACCURACY_THRESHOLD, ENDURANCE_WPM_THRESHOLD};

/// terminal typing test with endurance rounds, per-user stats, and a leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing-test game: raw-speed tests, an endurance mode that \
adapts difficulty to your history, persistent per-user statistics, and a leaderboard."
)]
struct Cli {
    /// username to sign in as (prompted when omitted)
    #[clap(short, long)]
    user: Option<String>,

    /// default word count offered in raw-speed mode (15-50)
    #[clap(short, long)]
    words: Option<usize>,

    /// directory containing <difficulty>.txt word lists (bundled lists when omitted)
    #[clap(long)]
    words_dir: Option<PathBuf>,

    /// path of the users file (platform data dir when omitted)
    #[clap(long)]
    users_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(dir) = cli.words_dir {
        config.words_dir = Some(dir);
    }
    if let Some(path) = cli.users_file {
        config.users_file = Some(path);
    }
    if let Some(words) = cli.words {
        config.word_count = words.clamp(15, 50);
    }

    print_banner(&mut io::stdout())?;

    let store = match &config.users_file {
        Some(path) => FileProfileStore::with_path(path),
        None => FileProfileStore::new(),
    };
    let mut users = store.load();
    println!("Loaded {} user profiles.", users.len());

    let name = match cli.user {
        Some(name) if is_valid_username(&name) => name,
        Some(_) => {
            println!("Usernames cannot contain spaces.");
            read_username()?
        }
        None => read_username()?,
    };

    let current = match profile::find_user(&users, &name) {
        Some(index) => {
            greet_returning_user(&users[index]);
            index
        }
        None => {
            println!("New user detected. Creating profile for {name}.");
            users.push(User::new(name));
            store.save(&users)?;
            users.len() - 1
        }
    };

    let log = SessionLog::new();

    loop {
        show_menu();
        match read_int_in_range("Enter your choice (1-5): ", 1, 5, None)? {
            1 => endurance_mode(&mut users, current, &store, &config, &log)?,
            2 => raw_speed_mode(&mut users, current, &store, &mut config, &log)?,
            3 => show_leaderboard(&users, current)?,
            4 => show_profile(&users[current])?,
            5 => {
                store.save(&users)?;
                let _ = config_store.save(&config);
                println!("Saving user data and exiting. Goodbye!");
                break;
            }
            _ => unreachable!("range-checked above"),
        }
    }

    Ok(())
}

fn show_menu() {
    println!("\n===== Main Menu =====");
    println!("1. Endurance Mode");
    println!("2. Raw Speed Mode");
    println!("3. Leaderboard");
    println!("4. Profile");
    println!("5. Exit");
}

fn greet_returning_user(user: &User) {
    println!("Welcome back, {}!", user.name);
    println!(
        "Best WPM: {:.2} | Best Accuracy: {:.2}% | Tests completed: {}",
        user.best_wpm, user.best_accuracy, user.tests_completed
    );
    if user.endurance_high_score > 0 {
        println!("Endurance high score: {} words", user.endurance_high_score);
    }
}

fn is_valid_username(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

fn read_username() -> io::Result<String> {
    loop {
        let line = prompt_line("Enter your username (no spaces): ")?;
        let name = line.trim();
        if is_valid_username(name) {
            return Ok(name.to_string());
        }
        println!("Invalid username. Please try again.");
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed while awaiting input",
        ));
    }
    Ok(line)
}

/// Re-prompt until a number in `[min, max]` arrives. An empty line picks
/// `default` when one is offered.
fn read_int_in_range(
    prompt: &str,
    min: usize,
    max: usize,
    default: Option<usize>,
) -> io::Result<usize> {
    loop {
        let line = prompt_line(prompt)?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if let Some(value) = default {
                return Ok(value);
            }
            println!("Please enter a number between {min} and {max}.");
            continue;
        }

        match trimmed.parse::<usize>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(value),
            Ok(_) => println!("Number must be between {min} and {max}. Please try again."),
            Err(_) => println!("Invalid input. Please enter a number between {min} and {max}."),
        }
    }
}

fn difficulty_from_name(name: &str) -> Option<Difficulty> {
    match name {
        "light" => Some(Difficulty::Light),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

fn endurance_mode(
    users: &mut [User],
    current: usize,
    store: &FileProfileStore,
    config: &Config,
    log: &SessionLog,
) -> io::Result<()> {
    println!("\n===== Endurance Mode =====");
    println!(
        "Keep typing until your accuracy falls below {ENDURANCE_ACCURACY_THRESHOLD:.1}% \
or WPM falls below {ENDURANCE_WPM_THRESHOLD:.1}."
    );
    println!("Press ESC at any time to end the test.\n");

    let difficulty = users[current].starting_difficulty();
    println!(
        "Starting with {} difficulty based on your profile.",
        difficulty.to_string().to_uppercase()
    );

    let list = match words::load(difficulty, config.words_dir.as_deref()) {
        Ok(list) => list,
        Err(err) => {
            println!("{err}");
            println!("Failed to load word list. Returning to main menu.");
            return Ok(());
        }
    };

    let mut rng = rand::thread_rng();
    let state = {
        let _guard = RawModeGuard::new()?;
        let mut console = CrosstermConsole::new();
        modes::run_endurance(&mut console, &list, &mut rng, Some(log))?
    };

    println!("\n===== Endurance Mode Complete =====");
    println!("Total words completed: {}", state.words_completed);
    println!("Rounds completed: {}", state.rounds_completed);
    println!("Final accuracy: {:.2}%", state.running_accuracy);
    println!("Final WPM: {:.2}", state.running_wpm);

    let user = &mut users[current];
    if let Some(previous) = user.apply_endurance(&state) {
        println!("New endurance high score! Previous: {previous} words");
    }
    store.save(users)?;

    println!("\nPress any key to return to the menu...");
    wait_for_key()?;
    Ok(())
}

fn raw_speed_mode(
    users: &mut [User],
    current: usize,
    store: &FileProfileStore,
    config: &mut Config,
    log: &SessionLog,
) -> io::Result<()> {
    println!("\n===== Raw Speed Mode =====");
    println!("Choose difficulty:\n1. Light (easier words)\n2. Medium (average words)\n3. Hard (difficult words)");

    let default_difficulty = difficulty_from_name(&config.difficulty).unwrap_or(Difficulty::Light);
    let default_choice = match default_difficulty {
        Difficulty::Light => 1,
        Difficulty::Medium => 2,
        Difficulty::Hard => 3,
    };
    let difficulty = match read_int_in_range(
        &format!("Choice [{default_choice}]: "),
        1,
        3,
        Some(default_choice),
    )? {
        1 => Difficulty::Light,
        2 => Difficulty::Medium,
        _ => Difficulty::Hard,
    };

    let list = match words::load(difficulty, config.words_dir.as_deref()) {
        Ok(list) => list,
        Err(err) => {
            println!("{err}");
            println!("Failed to load word list. Returning to main menu.");
            return Ok(());
        }
    };

    let default_count = config.word_count.clamp(15, 50);
    let mut count = read_int_in_range(
        &format!("How many words for the test? (15-50) [{default_count}]: "),
        15,
        50,
        Some(default_count),
    )?;
    if count > list.len() {
        println!(
            "Not enough words in the list. Using all {} available words.",
            list.len()
        );
        count = list.len();
    }

    let mut rng = rand::thread_rng();
    let result = {
        let _guard = RawModeGuard::new()?;
        let mut console = CrosstermConsole::new();
        modes::run_raw_speed(&mut console, &list, count, &mut rng, Some(log))?
    };

    let Some(result) = result else {
        // Cancelled: no stats update, straight back to the menu.
        return Ok(());
    };

    print_test_results(&result);

    let user = &mut users[current];
    let delta = user.apply_result(&result);
    if let Some(previous) = delta.new_best_wpm {
        println!(
            "\nNew personal best WPM: {:.2} (previous: {previous:.2})",
            result.wpm
        );
    }
    if let Some(previous) = delta.new_best_accuracy {
        println!(
            "New personal best accuracy: {:.2}% (previous: {previous:.2}%)",
            result.accuracy
        );
    }
    store.save(users)?;

    config.difficulty = difficulty.to_string().to_lowercase();
    config.word_count = count.clamp(15, 50);

    println!("\nPress any key to return to the menu...");
    wait_for_key()?;
    Ok(())
}

fn print_test_results(result: &TypingResult) {
    println!("\n===== Test Results =====");
    println!("Time taken: {:.2} seconds", result.elapsed_secs);
    println!("Words per minute: {:.2}", result.wpm);
    println!("Accuracy: {:.2}%", result.accuracy);
    println!(
        "Mistyped: {} | Missed: {} | Extra: {}",
        result.breakdown.mistyped, result.breakdown.missed, result.breakdown.extra
    );
}

fn show_leaderboard(users: &[User], current: usize) -> io::Result<()> {
    println!("\n===== Leaderboard =====");
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let ordered = profile::leaderboard(users);
    println!("Rank | Username             | WPM    | Accuracy | Tests | Endurance");
    println!("-----|----------------------|--------|----------|-------|----------");
    for (i, user) in ordered.iter().take(5).enumerate() {
        print_leaderboard_row(i + 1, user, "");
    }

    let name = &users[current].name;
    if let Some(rank) = profile::rank_of(&ordered, name) {
        if rank > 5 {
            println!("...");
            print_leaderboard_row(rank, &users[current], " (You)");
        }
    }

    println!("\nPress any key to return to the menu...");
    wait_for_key()?;
    Ok(())
}

fn print_leaderboard_row(rank: usize, user: &User, suffix: &str) {
    println!(
        "{:<4} | {:<20} | {:<6.2} | {:<8.2} | {:<5} | {:<5}{}",
        rank,
        user.name,
        user.best_wpm,
        user.best_accuracy,
        user.tests_completed,
        user.endurance_high_score,
        suffix,
    );
}

fn show_profile(user: &User) -> io::Result<()> {
    println!("\n===== Profile: {} =====", user.name);
    println!("Tests completed: {}", user.tests_completed);
    println!("Best WPM: {:.2}", user.best_wpm);
    println!("Best accuracy: {:.2}%", user.best_accuracy);
    println!("Average accuracy: {:.2}%", user.average_accuracy);
    println!("Endurance high score: {} words", user.endurance_high_score);

    let tier = user.skill_tier();
    let color = match tier {
        "Expert" => Color::Green,
        "Advanced" => Color::Cyan,
        "Intermediate" => Color::Yellow,
        _ => Color::Reset,
    };
    execute!(
        io::stdout(),
        Print("\nSkill assessment: "),
        SetForegroundColor(color),
        Print(tier),
        ResetColor,
        Print("\n"),
    )?;

    println!("\nPress any key to return to the menu...");
    wait_for_key()?;
    Ok(())
}
