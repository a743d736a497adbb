//! Interactive chat loop

use anyhow::Result;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use nova_core::config::Config;
use nova_core::agent::SUBJECTS;
use nova_core::{Agent, MemoryCoordinator, Role, SessionState, Turn};
use nova_providers::OpenAiCompatClient;
use std::time::Duration;
use tracing::{debug, warn};

use crate::history;

/// Commands typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlashCommand {
    New,
    History,
    Load(String),
    Delete(String),
    Context,
    /// Switch subject focus, or list subjects without an argument
    Subject(Option<String>),
    Eli5,
    Help,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// Parse a prompt line; `None` means the line is a chat message
    fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::trim).unwrap_or_default().to_string();

        let command = match (name.as_str(), arg.is_empty()) {
            ("new", _) => SlashCommand::New,
            ("history", _) => SlashCommand::History,
            ("load", false) => SlashCommand::Load(arg),
            ("delete", false) => SlashCommand::Delete(arg),
            ("context", _) => SlashCommand::Context,
            ("subject", true) => SlashCommand::Subject(None),
            ("subject", false) => SlashCommand::Subject(Some(arg)),
            ("eli5", _) => SlashCommand::Eli5,
            ("help", _) => SlashCommand::Help,
            ("quit" | "exit", _) => SlashCommand::Quit,
            _ => SlashCommand::Unknown(line.trim().to_string()),
        };
        Some(command)
    }
}

pub async fn run_chat(
    config: &Config,
    memory: &MemoryCoordinator,
    resume: Option<String>,
) -> Result<()> {
    if config.agent.api_key.is_empty() {
        print_warning("No API key configured; requests will be sent without authorization.");
    }
    let mut agent = OpenAiCompatClient::new(&config.agent);

    let mut state = match resume {
        Some(id) => match memory.resume(&id) {
            Ok(state) => state,
            Err(e) => {
                print_warning(&e.to_string());
                memory.start_new()
            }
        },
        None => memory.start_new(),
    };

    println!(
        "{} {}",
        style(format!("{} is ready.", agent.name())).bold().cyan(),
        style("Type /help for commands.").dim()
    );
    render_transcript(&state, agent.name());

    loop {
        let line: String = Input::new()
            .with_prompt(style("You").bold().to_string())
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = SlashCommand::parse(line) else {
            exchange(memory, &agent, &mut state, line).await;
            continue;
        };

        debug!("Slash command: {:?}", command);
        match command {
            SlashCommand::New => {
                state = memory.start_new();
                println!("{}", style("Started a new conversation.").green());
            }
            SlashCommand::History => history::run_list(memory),
            SlashCommand::Load(id) => match memory.resume(&id) {
                Ok(resumed) => {
                    state = resumed;
                    render_transcript(&state, agent.name());
                }
                Err(e) => print_warning(&e.to_string()),
            },
            SlashCommand::Delete(id) => match memory.delete(&id) {
                Ok(removed) => {
                    if removed {
                        println!("{}", style(format!("Deleted {}", id)).green());
                    } else {
                        println!("No conversation named {}", id);
                    }
                    if id == state.id() {
                        state = memory.start_new();
                        println!("{}", style("Started a new conversation.").green());
                    }
                }
                Err(e) => print_warning(&e.to_string()),
            },
            SlashCommand::Context => {
                let context = memory.context_for_agent(&state);
                println!(
                    "{}",
                    style(format!(
                        "{} of {} messages in context ({} max)",
                        context.len(),
                        state.conversation().len(),
                        memory.max_turns()
                    ))
                    .dim()
                );
            }
            SlashCommand::Subject(None) => print_subjects(agent.subject().key),
            SlashCommand::Subject(Some(key)) => match agent.set_subject(&key) {
                Some(subject) => println!(
                    "{}",
                    style(format!("Subject focus: {} {}", subject.name, subject.icon)).green()
                ),
                None => print_warning(&format!("Unknown subject {}. Type /subject to list them.", key)),
            },
            SlashCommand::Eli5 => {
                agent.set_eli5(!agent.eli5());
                let status = if agent.eli5() {
                    "ELI5 mode on: simple words, short sentences."
                } else {
                    "ELI5 mode off."
                };
                println!("{}", style(status).green());
            }
            SlashCommand::Help => print_help(),
            SlashCommand::Quit => break,
            SlashCommand::Unknown(raw) => {
                print_warning(&format!("Unknown command {}. Type /help.", raw));
            }
        }
    }

    Ok(())
}

/// Ask the agent, then record the exchange. Failures are shown and the
/// session continues.
async fn exchange(
    memory: &MemoryCoordinator,
    agent: &dyn Agent,
    state: &mut SessionState,
    input: &str,
) {
    let context = memory.context_for_agent(state);
    let spinner = typing_indicator(agent.name());
    let result = agent.respond(&context, input).await;
    spinner.finish_and_clear();

    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Agent request failed: {}", e);
            print_warning(&format!("I'm sorry, I encountered an error: {}", e));
            return;
        }
    };

    print_turn(&Turn::assistant(reply.text.as_str()), agent.name());
    if let Some(source) = &reply.source {
        println!("{}", style(format!("Source: {}", source)).dim());
    }

    if let Err(e) = memory.record_exchange(state, input, &reply.text) {
        print_warning(&format!("This message was not saved to history: {}", e));
    }
}

fn typing_indicator(name: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(format!("{} is thinking...", name));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn render_transcript(state: &SessionState, bot_name: &str) {
    for turn in state.buffer().snapshot() {
        print_turn(&turn, bot_name);
    }
}

pub(crate) fn print_turn(turn: &Turn, bot_name: &str) {
    match turn.role() {
        Role::User => println!("{} {}", style("You:").bold(), turn.content()),
        Role::Assistant => println!(
            "{} {}",
            style(format!("{}:", bot_name)).bold().cyan(),
            turn.content()
        ),
    }
}

pub(crate) fn print_warning(message: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), message);
}

fn print_subjects(current: &str) {
    println!("{}", style("Subjects:").bold());
    for subject in SUBJECTS {
        let marker = if subject.key == current { "*" } else { " " };
        println!("{} {:<12} {} {}", marker, subject.key, subject.icon, subject.name);
    }
}

fn print_help() {
    println!("{}", style("Commands:").bold());
    println!("  /new          start a new conversation");
    println!("  /history      list saved conversations");
    println!("  /load <id>    resume a saved conversation");
    println!("  /delete <id>  delete a saved conversation");
    println!("  /context      show how many messages the assistant remembers");
    println!("  /subject [s]  focus on a subject, or list subjects");
    println!("  /eli5         toggle explain-like-I'm-five mode");
    println!("  /quit         leave the chat");
}
