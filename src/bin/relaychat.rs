//! Interactive chat client for a relaychat relay.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a relay on the default address, replaying history each turn
//! relaychat
//!
//! # Point at another relay and send only the latest message
//! relaychat --url https://relay.example.com/ --protocol stateless
//!
//! # Disable colors (useful for piping output)
//! relaychat --no-color
//! ```
//!
//! While chatting, `/help` lists the available slash commands.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use relaychat::chat::{
    ChatArgs, ChatClient, ChatCommand, ChatConfig, PlainTextView, help_text, parse_command,
};
use relaychat::{RelayClient, Role};

/// Main entry point for the relaychat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("relaychat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    let session = ChatClient::connect(&config)?;
    let view = PlainTextView::with_color(config.use_color).without_user_echo();
    let mut rl = DefaultEditor::new()?;

    println!(
        "relaychat ({} protocol, {})",
        session.protocol(),
        session.endpoint()
    );
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::History => print_history(&session),
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::ShowConfig => print_config(&config),
                        ChatCommand::Invalid(message) => {
                            view.print_info(&format!("Error: {message}"));
                        }
                    }
                    continue;
                }

                // Failures are rendered inline by the view; the session stays usable.
                session.submit_turn(line, &view).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_history(session: &ChatClient<RelayClient>) {
    let history = session.history();
    if history.is_empty() {
        println!("    (no turns yet)");
        return;
    }
    for (idx, turn) in history.iter().enumerate() {
        let speaker = match turn.role() {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("    {:>3}. {}: {}", idx + 1, speaker, turn.text());
    }
}

fn print_stats(session: &ChatClient<RelayClient>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Protocol: {}", stats.protocol);
    println!("      Turns: {}", stats.turn_count);
    println!(
        "      Requests: {} ({} answered, {} failed)",
        stats.submissions, stats.answered, stats.failed
    );
    println!("      Dropped while sending: {}", stats.dropped);
    println!("      Rejected as empty: {}", stats.rejected);
}

fn print_config(config: &ChatConfig) {
    println!("    Current Configuration:");
    println!("      Relay: {}", config.describe_base_url());
    println!("      Protocol: {}", config.protocol);
    println!("      Timeout: {}s", config.timeout.as_secs());
    println!(
        "      Color: {}",
        if config.use_color { "on" } else { "off" }
    );
}
