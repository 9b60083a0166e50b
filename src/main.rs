// Study Buddy - terminal front end
//
// Reads commands and chat messages from stdin and prints the tutor's replies
// as they stream in.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use study_buddy::commands::{self, TerminalCommand, HELP_TEXT};
use study_buddy::models::response::CommandResponse;
use study_buddy::state::AppState;
use study_buddy::utils::logging::init_logging;

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("failed to flush stdout")
}

/// Print the error of a failed response; returns its data otherwise
fn report<T>(response: CommandResponse<T>) -> Option<T> {
    if !response.success {
        eprintln!(
            "error: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
    response.data
}

/// Write the part of `text` past `printed` and flush
fn print_from(out: &mut impl Write, text: &str, printed: usize) -> std::io::Result<()> {
    if let Some(rest) = text.get(printed..) {
        write!(out, "{}", rest)?;
    }
    out.flush()
}

async fn chat(state: &AppState, content: &str) -> Result<()> {
    let mut printed = 0usize;
    let mut announced_cards = false;
    let mut write_error: Option<std::io::Error> = None;
    let mut stdout = std::io::stdout();

    let response = commands::send_chat_message(state, content, |chunk| {
        if write_error.is_some() {
            return;
        }
        let mut result = Ok(());
        if chunk.text.len() > printed && chunk.text.is_char_boundary(printed) {
            result = print_from(&mut stdout, chunk.text, printed);
            printed = chunk.text.len();
        }
        if result.is_ok() && chunk.generating_flashcards && !announced_cards {
            announced_cards = true;
            result = print_from(&mut stdout, "\n[generating flashcards...]", 0);
        }
        if let Err(e) = result {
            write_error = Some(e);
        }
    })
    .await;
    if let Some(e) = write_error {
        return Err(e).context("failed to write reply to stdout");
    }
    println!();

    if let Some(exchange) = report(response) {
        // Whatever the stream did not deliver
        if let Some(rest) = exchange.display_reply.get(printed..).filter(|r| !r.is_empty()) {
            println!("{}", rest);
        }
        for card in &exchange.flashcards {
            println!("  [card {}] {} -> {}", card.id, card.question, card.answer);
        }
    }
    Ok(())
}

async fn handle(state: &AppState, command: TerminalCommand) -> Result<bool> {
    match command {
        TerminalCommand::Empty => {}
        TerminalCommand::Help => println!("{}", HELP_TEXT),
        TerminalCommand::Quit => return Ok(false),
        TerminalCommand::List => {
            if let Some(subjects) = report(commands::list_subjects(state).await) {
                if subjects.is_empty() {
                    println!("No subjects yet. Create one with /new <name>.");
                }
                for subject in subjects {
                    println!("  {:>3}  {}  {}", subject.id, subject.name, subject.description);
                }
            }
        }
        TerminalCommand::New { name, description } => {
            println!("Creating a tutor model for {}...", name);
            if let Some(subject) =
                report(commands::create_subject(state, &name, &description).await)
            {
                println!("Created subject {} ({})", subject.id, subject.name);
            }
        }
        TerminalCommand::Use(id) => {
            if let Some(subject) = report(commands::select_subject(state, id).await) {
                println!(
                    "Now studying {} ({} messages, {} flashcards)",
                    subject.name,
                    subject.messages.len(),
                    subject.flashcards.len()
                );
            }
        }
        TerminalCommand::Show => {
            if let Some(subject) = report(commands::get_primary_subject(state).await) {
                println!("{}: {}", subject.name, subject.description);
                for message in subject.messages {
                    println!("[{}] {}", message.sender, message.content);
                }
            }
        }
        TerminalCommand::Cards => {
            if let Some(cards) = report(commands::list_flashcards(state).await) {
                if cards.is_empty() {
                    println!("No flashcards yet.");
                }
                for card in cards {
                    println!("  [card {}] {} -> {}", card.id, card.question, card.answer);
                }
            }
        }
        TerminalCommand::Generate(topic) => {
            if let Some(cards) = report(commands::generate_flashcards(state, &topic).await) {
                println!("Added {} flashcard(s)", cards.len());
                for card in cards {
                    println!("  [card {}] {} -> {}", card.id, card.question, card.answer);
                }
            }
        }
        TerminalCommand::Save => {
            if report(commands::save_primary_subject(state).await).is_some() {
                println!("Saved.");
            }
        }
        TerminalCommand::Health => {
            if let Some(health) = report(commands::get_health(state).await) {
                println!(
                    "{} v{}: {} (config: {}, model server: {})",
                    health.service, health.version, health.status, health.config, health.model_server
                );
            }
        }
        TerminalCommand::Chat(content) => chat(state, &content).await?,
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let state = AppState::new();

    let init = commands::init_app(&state).await;
    if !init.success {
        return Err(anyhow!(
            "initialization failed: {}",
            init.error.unwrap_or_default()
        ));
    }

    let config = state.get_config().await?;
    init_logging(config.debug_mode)?;

    println!(
        "Study Buddy v{} (model server {}, base model {})",
        env!("CARGO_PKG_VERSION"),
        config.ollama_url,
        config.base_model
    );
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let keep_going = match commands::parse_input(&line) {
            Ok(command) => handle(&state, command).await?,
            Err(e) => {
                eprintln!("{}", e);
                true
            }
        };
        if !keep_going {
            break;
        }
        prompt()?;
    }

    state.shutdown().await?;
    println!("Goodbye.");
    Ok(())
}
