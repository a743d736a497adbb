//! CLI entry point for nova

mod chat;
mod history;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use nova_core::config::{Config, ConfigLoader, MemoryConfig};
use nova_core::logging::init_logging;
use nova_core::MemoryCoordinator;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "nova")]
#[command(about = "An educational chat assistant with persistent conversation history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize nova configuration
    Onboard,
    /// Start an interactive chat
    Chat {
        /// Resume a saved conversation by id
        #[arg(short, long)]
        resume: Option<String>,
    },
    /// Browse saved conversations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show status information
    Status,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved conversations, most recent first
    List,
    /// Print a saved conversation
    Show {
        /// Conversation id
        id: String,
    },
    /// Delete a saved conversation
    Delete {
        /// Conversation id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    if let Commands::Onboard = cli.command {
        return run_onboard(&config_loader);
    }

    let config = config_loader.load()?;
    let _log_guard = init_logging(&config.logging);
    let memory = build_memory(&config.memory);

    match cli.command {
        Commands::Onboard => {}
        Commands::Chat { resume } => {
            info!("Starting chat session");
            chat::run_chat(&config, &memory, resume).await?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List => history::run_list(&memory),
            HistoryCommands::Show { id } => history::run_show(&memory, &id, &config.agent.bot_name)?,
            HistoryCommands::Delete { id, yes } => history::run_delete(&memory, &id, yes)?,
        },
        Commands::Status => run_status(&config_loader, &config, &memory),
    }

    Ok(())
}

/// Expand tilde in path
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn build_memory(config: &MemoryConfig) -> MemoryCoordinator {
    let config = MemoryConfig {
        history_dir: expand_tilde(&config.history_dir)
            .to_string_lossy()
            .to_string(),
        max_turns: config.max_turns,
    };
    MemoryCoordinator::from_config(&config)
}

fn run_onboard(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to Nova!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_path();
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Onboard cancelled.");
            return Ok(());
        }
    }

    let mut config = Config::default();

    config.agent.api_base = Input::new()
        .with_prompt("OpenAI-compatible API base URL")
        .default(config.agent.api_base.clone())
        .interact_text()?;

    config.agent.api_key = Input::new()
        .with_prompt("API key (leave empty to use GOOGLE_API_KEY / OPENAI_API_KEY)")
        .allow_empty(true)
        .interact_text()?;

    config.agent.model = Input::new()
        .with_prompt("Model")
        .default(config.agent.model.clone())
        .interact_text()?;

    config.memory.history_dir = Input::new()
        .with_prompt("Chat history directory")
        .default("~/.nova/chat_history".to_string())
        .interact_text()?;

    config.memory.max_turns = Input::new()
        .with_prompt("Messages kept as conversation context")
        .default(config.memory.max_turns)
        .validate_with(|value: &usize| {
            if *value > 0 {
                Ok(())
            } else {
                Err("must be greater than zero")
            }
        })
        .interact_text()?;

    loader.save(&config)?;
    std::fs::create_dir_all(expand_tilde(&config.memory.history_dir))?;

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!("  {} - Start chatting", style("nova chat").cyan());
    println!("  {} - Browse past conversations", style("nova history list").cyan());

    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config, memory: &MemoryCoordinator) {
    println!("{}", style("Nova Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    println!("  Model: {}", config.agent.model);
    println!("  API base: {}", config.agent.api_base);
    let key_status = if config.agent.api_key.is_empty() {
        style("not configured").red()
    } else {
        style("configured").green()
    };
    println!("  API key: {}", key_status);
    let subject = nova_core::Subject::find_or_default(&config.agent.subject);
    println!("  Subject: {} {}", subject.name, subject.icon);
    println!("  ELI5 mode: {}", if config.agent.eli5 { "on" } else { "off" });
    println!();

    println!("{}", style("Memory:").bold());
    println!("  History directory: {}", memory.store().dir().display());
    println!("  Context window: {} messages", memory.max_turns());
    println!("  Saved conversations: {}", memory.store().list().count());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_chat_resume() {
        let cli = Cli::try_parse_from(["nova", "chat", "--resume", "chat-1"]).unwrap();
        match cli.command {
            Commands::Chat { resume } => assert_eq!(resume.as_deref(), Some("chat-1")),
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_cli_parses_history_delete() {
        let cli =
            Cli::try_parse_from(["nova", "-c", "/tmp/nova", "history", "delete", "x", "-y"]).unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/nova")));
        match cli.command {
            Commands::History {
                command: HistoryCommands::Delete { id, yes },
            } => {
                assert_eq!(id, "x");
                assert!(yes);
            }
            _ => panic!("expected history delete"),
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }
}
