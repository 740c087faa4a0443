//! Slash command parsing.
//!
//! Anything typed into the input that starts with `/` is a command. A doubled
//! slash escapes it, so `//shrug` is sent as the message `/shrug`.

use matchify_proto::Category;

/// Parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/find [category]`
    Find {
        /// Requested category. `None` uses the selected one.
        category: Option<Category>,
    },
    /// `/cancel`
    Cancel,
    /// `/leave`
    Leave,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    /// Plain chat text.
    Message {
        /// Text exactly as typed.
        text: String,
    },
    /// Slash command we do not know.
    Unknown {
        /// Command name without the slash.
        input: String,
    },
    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: String,
        /// What was wrong.
        error: String,
    },
}

/// Parse one line of input.
pub fn parse(input: &str) -> Command {
    let Some(rest) = input.trim_start().strip_prefix('/') else {
        return Command::Message { text: input.to_string() };
    };

    if rest.starts_with('/') {
        return Command::Message { text: rest.to_string() };
    }

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    match name.as_str() {
        "find" | "f" => match args.as_slice() {
            [] => Command::Find { category: None },
            [category] => match category.parse::<Category>() {
                Ok(category) => Command::Find { category: Some(category) },
                Err(e) => Command::InvalidArgs { command: name, error: e.to_string() },
            },
            _ => Command::InvalidArgs {
                command: name,
                error: "expected at most one category".to_string(),
            },
        },
        "cancel" => no_args(name, &args, Command::Cancel),
        "leave" | "disconnect" => no_args(name, &args, Command::Leave),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown { input: name },
    }
}

fn no_args(name: String, args: &[&str], command: Command) -> Command {
    if args.is_empty() {
        command
    } else {
        Command::InvalidArgs { command: name, error: "takes no arguments".to_string() }
    }
}
