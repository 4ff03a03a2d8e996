//! Command-line interface implementation

use clap::Parser;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::catalog::SoundItem;
use crate::player::PlaybackState;

/// Command-line arguments for sonocli
#[derive(Parser, Debug)]
#[command(author, version, about = "Ambient sound looper for the terminal", long_about = None)]
pub struct Args {
    /// Directory holding the ambient sound files
    #[arg(short, long, env = "SONOCLI_SOUNDS_DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// ALSA device to use
    #[arg(short = 'd', long, default_value = "default", env = "SONOCLI_ALSA_DEVICE")]
    pub alsa_device: String,

    /// Config file path
    #[arg(short, long, env = "SONOCLI_CONFIG")]
    pub config: Option<PathBuf>,
}

/// What the user asked for at the menu prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    /// Toggle the named sound (start, stop, or switch).
    Toggle(String),
    Quit,
    Invalid(String),
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display the sound list, marking the one currently playing.
    pub fn display_sounds(&self, items: &[SoundItem], state: &PlaybackState) {
        println!("\nSons:");
        println!("{:<5} {:<4} {}", "#", "", "Name");
        println!("{}", "-".repeat(40));

        for (index, item) in items.iter().enumerate() {
            let marker = if state.playing_name() == Some(item.name.as_str()) {
                "[>]"
            } else {
                "[ ]"
            };
            println!("{:<5} {:<4} {}", index + 1, marker, item.name);
        }
        println!();
    }

    /// Prompt for a selection and read one line from stdin.
    pub fn read_choice(&self, items: &[SoundItem]) -> Result<MenuChoice, Box<dyn Error>> {
        print!("Toggle a sound (1-{}, name, or 'q' to quit): ", items.len());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF behaves like quitting.
            return Ok(MenuChoice::Quit);
        }

        Ok(parse_choice(&input, items))
    }

    /// Display error messages
    pub fn display_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps one line of user input to a menu choice: an item number, an exact
/// sound name, or 'q' to quit.
pub(crate) fn parse_choice(input: &str, items: &[SoundItem]) -> MenuChoice {
    let input = input.trim();
    if input.is_empty() {
        return MenuChoice::Invalid(String::new());
    }
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return MenuChoice::Quit;
    }

    if let Ok(selection) = input.parse::<usize>() {
        if selection >= 1 && selection <= items.len() {
            return MenuChoice::Toggle(items[selection - 1].name.clone());
        }
        return MenuChoice::Invalid(input.to_string());
    }

    match items.iter().find(|item| item.name.eq_ignore_ascii_case(input)) {
        Some(item) => MenuChoice::Toggle(item.name.clone()),
        None => MenuChoice::Invalid(input.to_string()),
    }
}
