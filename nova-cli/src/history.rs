//! History browsing commands

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use console::style;
use dialoguer::Confirm;
use nova_core::memory::ConversationSummary;
use nova_core::utils::truncate_chars;
use nova_core::MemoryCoordinator;

use crate::chat::{print_turn, print_warning};

const LIST_TITLE_CHARS: usize = 30;

/// Local display time, e.g. `Oct 16, 02:35 PM`
fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %d, %I:%M %p").to_string()
}

fn format_summary(summary: &ConversationSummary) -> String {
    format!(
        "{}  {}  {} ({} messages)",
        style(&summary.id).cyan(),
        style(format_time(summary.updated_at)).dim(),
        truncate_chars(&summary.title, LIST_TITLE_CHARS),
        summary.turn_count
    )
}

pub fn run_list(memory: &MemoryCoordinator) {
    let history = memory.list_history();
    if history.is_empty() {
        println!("No saved conversations yet.");
        return;
    }

    println!("{}", style("Saved conversations:").bold());
    for summary in &history {
        println!("  {}", format_summary(summary));
    }
}

pub fn run_show(memory: &MemoryCoordinator, id: &str, bot_name: &str) -> Result<()> {
    let conversation = match memory.load(id) {
        Ok(conversation) => conversation,
        Err(e) => {
            print_warning(&e.to_string());
            return Ok(());
        }
    };

    println!("{}", style(conversation.title()).bold());
    println!(
        "{}",
        style(format!(
            "Started {} · updated {}",
            format_time(conversation.created_at),
            format_time(conversation.updated_at)
        ))
        .dim()
    );
    for turn in conversation.turns() {
        print_turn(turn, bot_name);
    }
    Ok(())
}

pub fn run_delete(memory: &MemoryCoordinator, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete conversation {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    match memory.delete(id) {
        Ok(true) => println!("{}", style(format!("Deleted {}", id)).green()),
        Ok(false) => println!("No conversation named {}", id),
        Err(e) => print_warning(&e.to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summary_truncates_title() {
        let now = Utc::now();
        let summary = ConversationSummary {
            id: "chat-1".to_string(),
            title: "t".repeat(40),
            created_at: now,
            updated_at: now,
            turn_count: 4,
        };

        let line = console::strip_ansi_codes(&format_summary(&summary)).to_string();
        assert!(line.starts_with("chat-1"));
        assert!(line.contains(&format!("{}...", "t".repeat(30))));
        assert!(line.ends_with("(4 messages)"));
    }
}
