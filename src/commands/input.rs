//! Terminal Input
//!
//! Parses one line typed into the terminal front end. Lines starting with `/`
//! are commands; anything else is a chat message for the primary subject.

use study_buddy_core::SubjectId;

use crate::utils::error::{AppError, AppResult};

/// Help shown by `/help`
pub const HELP_TEXT: &str = "\
Commands:
  /list                       list all subjects
  /new <name> [| description] create a subject and its tutor model
  /use <id>                   switch to a subject
  /show                       show the current subject's conversation
  /cards                      show the current subject's flashcards
  /generate <topic>           ask the tutor for flashcards about a topic
  /save                       save the current subject now
  /health                     check the config and the model server
  /help                       show this help
  /quit                       save everything and exit
Anything else is sent to the tutor of the current subject.";

/// One parsed line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    List,
    New { name: String, description: String },
    Use(SubjectId),
    Show,
    Cards,
    Generate(String),
    Save,
    Health,
    Help,
    Quit,
    Chat(String),
    Empty,
}

fn usage(text: &str) -> AppError {
    AppError::validation(format!("Usage: {}", text))
}

/// Parse a line of terminal input
pub fn parse_input(line: &str) -> AppResult<TerminalCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(TerminalCommand::Empty);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(TerminalCommand::Chat(line.to_string()));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "list" => Ok(TerminalCommand::List),
        "new" => {
            let (subject, description) = match rest.split_once('|') {
                Some((subject, description)) => (subject.trim(), description.trim()),
                None => (rest, ""),
            };
            if subject.is_empty() {
                return Err(usage("/new <name> [| description]"));
            }
            Ok(TerminalCommand::New {
                name: subject.to_string(),
                description: description.to_string(),
            })
        }
        "use" => rest
            .parse()
            .map(TerminalCommand::Use)
            .map_err(|_| usage("/use <id>")),
        "show" => Ok(TerminalCommand::Show),
        "cards" => Ok(TerminalCommand::Cards),
        "generate" if !rest.is_empty() => Ok(TerminalCommand::Generate(rest.to_string())),
        "generate" => Err(usage("/generate <topic>")),
        "save" => Ok(TerminalCommand::Save),
        "health" => Ok(TerminalCommand::Health),
        "help" => Ok(TerminalCommand::Help),
        "quit" | "exit" => Ok(TerminalCommand::Quit),
        other => Err(AppError::validation(format!(
            "Unknown command /{}; type /help for the list",
            other
        ))),
    }
}
