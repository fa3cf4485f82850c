//! Line-oriented intent language for the interactive binary.
//!
//! One command per line; the first word selects the intent and the rest of
//! the line is its argument.

use thiserror::Error;

/// A user intent typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Title,
    SearchIcon,
    Field,
    /// Replace the search bar text without submitting.
    Text(String),
    /// Submit the given text, or the search bar text when none is given.
    Submit(Option<String>),
    Back,
    /// Corner fab.
    Fab,
    /// Menu refresh button.
    Refresh,
    /// Menu go-to button.
    Jump,
    Next,
    Prev,
    GoTo(i64),
    Retry,
    /// Select the quick search at this index.
    Quick(usize),
    /// Save the current listing as a quick search.
    Save(String),
    /// Save the panel filters plus bar text as a quick search.
    SavePanel(String),
    /// Toggle tag search in the panel.
    Tag(bool),
    /// Toggle uploader search in the panel.
    Uploader(bool),
    /// Re-open the screen on the popular listing.
    Popular,
    /// Re-open the screen on the homepage.
    Home,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("'{command}' needs an argument")]
    MissingArgument { command: &'static str },

    #[error("'{value}' is not a valid number")]
    InvalidNumber { value: String },

    #[error("Expected 'on' or 'off', got '{value}'")]
    InvalidSwitch { value: String },
}

pub const HELP: &str = "\
title | search-icon | field         search bar taps
text <t> | submit [t]               edit / submit search text
tag on|off | uploader on|off        search panel options
back | fab | refresh | jump         navigation and fab menu
next | prev | goto <n> | retry      paging
quick <i> | save <name> | save-panel <name>
home | popular | status | help | quit";

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "title" => Command::Title,
            "search-icon" => Command::SearchIcon,
            "field" => Command::Field,
            "text" => Command::Text(rest.to_string()),
            "submit" => Command::Submit((!rest.is_empty()).then(|| rest.to_string())),
            "back" => Command::Back,
            "fab" => Command::Fab,
            "refresh" => Command::Refresh,
            "jump" => Command::Jump,
            "next" => Command::Next,
            "prev" => Command::Prev,
            "goto" => Command::GoTo(parse_number(required("goto", rest)?)?),
            "retry" => Command::Retry,
            "quick" => {
                let index = parse_number(required("quick", rest)?)?;
                let index = usize::try_from(index).map_err(|_| CommandError::InvalidNumber {
                    value: rest.to_string(),
                })?;
                Command::Quick(index)
            }
            "save" => Command::Save(required("save", rest)?.to_string()),
            "save-panel" => Command::SavePanel(required("save-panel", rest)?.to_string()),
            "tag" => Command::Tag(parse_switch(required("tag", rest)?)?),
            "uploader" => Command::Uploader(parse_switch(required("uploader", rest)?)?),
            "popular" => Command::Popular,
            "home" => Command::Home,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest)
    }
}

fn parse_number(value: &str) -> Result<i64, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        value: value.to_string(),
    })
}

fn parse_switch(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(CommandError::InvalidSwitch {
            value: value.to_string(),
        }),
    }
}
