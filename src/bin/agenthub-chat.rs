//! Interactive terminal client for the AI Agent Hub.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on localhost:8000
//! agenthub-chat
//!
//! # Point at a deployed hub and start with the research agent
//! agenthub-chat --server https://hub.example.com/ --agent research
//!
//! # Disable colors (useful for piping output)
//! agenthub-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/agents` - List the agents
//! - `/agent <name>` - Switch agents
//! - `/clear` - Clear the conversation
//! - `/stats` - Show session statistics
//! - `/session` - Show the server session
//! - `/quit` - Exit the application
//!
//! Set `RUST_LOG` to see client diagnostics.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use agenthub::HubClient;
use agenthub::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SendOutcome,
    help_text, parse_command,
};

type Session = ChatSession<HubClient, PlainTextRenderer>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The local offset can only be read while the process is single-threaded.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    tokio::runtime::Runtime::new()?.block_on(run(utc_offset))
}

async fn run(utc_offset: UtcOffset) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "agenthub=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("agenthub-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    let client = HubClient::with_options(config.base_url.clone(), Some(config.timeout))?;
    println!("AI Agent Hub ({})", client.base_url());
    println!("Type /help for commands, /quit to exit\n");

    let renderer = PlainTextRenderer::with_color(config.use_color).with_utc_offset(utc_offset);
    let mut session = ChatSession::new(client, renderer, &config);
    session.load_agents().await;
    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("[{}] > ", session.current_agent());
        match rl.readline(&prompt) {
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
                        ChatCommand::Agents => {
                            let views = session.agent_views();
                            let current = session.current_agent().to_string();
                            session.renderer_mut().render_agent_list(&views, &current);
                        }
                        ChatCommand::Agent(name) => {
                            if !session.agents().iter().any(|a| a.name == name) {
                                session
                                    .renderer_mut()
                                    .print_info(&format!("note: {name} is not a listed agent"));
                            }
                            session.select_agent(&name);
                        }
                        ChatCommand::Clear => {
                            if config.confirm_clear && !confirm(&mut rl)? {
                                continue;
                            }
                            drop(session.clear_session());
                        }
                        ChatCommand::Stats => {
                            let stats = session.stats().clone();
                            session.renderer_mut().render_stats(&stats);
                        }
                        ChatCommand::Session => print_session(&mut session),
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            session.renderer_mut().print_error(&message);
                        }
                    }
                    continue;
                }

                if let SendOutcome::Rejected(reason) = session.send_message(line).await {
                    session
                        .renderer_mut()
                        .print_error(&format!("message not sent: {reason}"));
                }
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
                session
                    .renderer_mut()
                    .print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn confirm(rl: &mut DefaultEditor) -> Result<bool, ReadlineError> {
    match rl.readline("Clear the conversation? [y/N] ") {
        Ok(answer) => Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(err) => Err(err),
    }
}

fn print_session(session: &mut Session) {
    let info = match session.session_id() {
        Some(id) => format!(
            "Session {} ({} history items, {} turns shown)",
            id,
            session.history().len(),
            session.transcript().len()
        ),
        None => "No session yet; one starts with the first reply.".to_string(),
    };
    session.renderer_mut().print_info(&info);
}
