// Command parsing and the local (non-network) commands

use super::history::HistoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    History,
    Unknown(String),
}

/// Name and description, in the order `help` lists them.
const COMMANDS: &[(&str, &str)] = &[
    ("help", "Displays a help message"),
    ("history", "Lists previously entered commands"),
    ("exit", "Exit the Pokedex"),
];

/// Lower-case `text` and split it into words.
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

impl Command {
    /// `None` for a blank line.
    pub fn parse(input: &str) -> Option<Self> {
        let words = clean_input(input);
        let name = words.first()?;
        Some(match name.as_str() {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "history" => Command::History,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Output for every command except `exit`, which the driver handles.
pub fn handle_command(command: &Command, history: &HistoryStore) -> String {
    match command {
        Command::Help => format_help(),
        Command::History => format_history(history),
        Command::Exit => String::new(),
        Command::Unknown(_) => "Unknown command. Type help to see usage".to_string(),
    }
}

fn format_help() -> String {
    let mut output = String::from("Welcome to the Pokedex!\nUsage:\n\n");
    for (name, description) in COMMANDS {
        output.push_str(&format!("{}: {}\n", name, description));
    }
    output
}

fn format_history(history: &HistoryStore) -> String {
    if history.is_empty() {
        return "No history yet".to_string();
    }
    history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>4}  {}\n", i + 1, entry))
        .collect()
}
