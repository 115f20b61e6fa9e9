//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// List the available agents.
    Agents,

    /// Select the agent for the next turn.
    Agent(String),

    /// Clear the conversation and forget the server session.
    Clear,

    /// Display session statistics.
    Stats,

    /// Show the server session id and history length.
    Session,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use agenthub::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/agent research").is_some());
/// assert!(parse_command("find papers on X").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let (command, argument) = match input[1..].split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim()).filter(|s| !s.is_empty())),
        None => (&input[1..], None),
    };
    let command = command.to_lowercase();

    let result = match command.as_str() {
        "agents" => ChatCommand::Agents,
        "agent" | "use" => match argument {
            Some(agent) if agent.contains(char::is_whitespace) => {
                ChatCommand::Invalid("agent names cannot contain spaces".to_string())
            }
            Some(agent) => ChatCommand::Agent(agent.to_string()),
            None => ChatCommand::Invalid("/agent requires an agent name".to_string()),
        },
        "clear" => ChatCommand::Clear,
        "stats" | "status" => ChatCommand::Stats,
        "session" => ChatCommand::Session,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /agents                List available agents
  /agent <name>          Send the next messages to <name>
  /clear                 Clear the conversation
  /stats                 Show session statistics
  /session               Show the server session
  /help                  Show this help message
  /quit                  Exit the chat"#
}
