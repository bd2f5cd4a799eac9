//! `roamer chat`: Interactive multi-turn session.

use std::io::Write;

use roamer_core::TurnRole;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::runtime::Runtime;

/// One line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Say(String),
    Context,
    History,
    Clear,
    Suggest,
    Refresh,
    Status,
    Help,
    Exit,
    Unknown(String),
    Blank,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Input::Blank,
            "exit" | "quit" | "/exit" | "/quit" => Input::Exit,
            "/context" => Input::Context,
            "/history" => Input::History,
            "/clear" => Input::Clear,
            "/suggest" => Input::Suggest,
            "/refresh" => Input::Refresh,
            "/status" => Input::Status,
            "/help" => Input::Help,
            other if other.starts_with('/') => Input::Unknown(other.to_string()),
            other => Input::Say(other.to_string()),
        }
    }
}

pub async fn run(session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_with_key()?;
    let runtime = Runtime::build(&config)?;
    let session_id = session.unwrap_or_else(|| format!("chat-{}", uuid::Uuid::new_v4()));

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Roamer — Interactive Travel Chat       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", runtime.model);
    println!("  Session:   {session_id}");
    println!();
    println!("  Ask about destinations or plan a trip.");
    println!("  Commands: /context /history /clear /suggest /refresh /status /help, 'exit' to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Blank => {}
            Input::Exit => break,
            Input::Help => {
                println!("  /context  show what Roamer knows about your trip");
                println!("  /history  show this session's turns");
                println!("  /clear    forget this session");
                println!("  /suggest  ideas based on what Roamer knows so far");
                println!("  /refresh  regenerate agent instructions and suggestions");
                println!("  /status   show router counters");
            }
            Input::Context => {
                let context = runtime.orchestrator.context(&session_id).await;
                if context.is_empty() {
                    println!("  (no trip details yet)");
                } else {
                    println!("{}", indent(&serde_json::to_string_pretty(&context)?));
                }
            }
            Input::History => {
                let turns = runtime.orchestrator.history(&session_id, None).await;
                if turns.is_empty() {
                    println!("  (no turns yet)");
                }
                for turn in turns {
                    let who = match (turn.role, turn.agent) {
                        (TurnRole::User, _) => "You".to_string(),
                        (TurnRole::Agent, Some(agent)) => agent.display_name().to_string(),
                        (TurnRole::Agent, None) => "Agent".to_string(),
                    };
                    let first_line = turn.content.lines().next().unwrap_or_default();
                    println!("  [{}] {who}: {first_line}", turn.timestamp.format("%H:%M:%S"));
                }
            }
            Input::Clear => {
                let existed = runtime.orchestrator.clear_session(&session_id).await;
                println!(
                    "  {}",
                    if existed { "Session cleared." } else { "Nothing to clear." }
                );
            }
            Input::Suggest => {
                let context = runtime.orchestrator.context(&session_id).await;
                let suggestions = runtime
                    .suggestions
                    .for_context(&context, config.prompts.suggestion_count.max(1))
                    .await;
                for (i, suggestion) in suggestions.iter().enumerate() {
                    println!("  {}. {suggestion}", i + 1);
                }
            }
            Input::Refresh => {
                let dropped = runtime.prompts.clear().await;
                println!("  Dropped {dropped} cached prompt(s).");
            }
            Input::Status => {
                let status = runtime.orchestrator.status().await;
                println!("  Agents:    {}", status.agents_registered);
                println!("  Tools:     {}", status.tools_available);
                println!("  Sessions:  {}", status.sessions);
                println!("  Turns:     {}", status.total_turns);
            }
            Input::Unknown(command) => {
                println!("  Unknown command {command}. Type /help for the list.");
            }
            Input::Say(text) => {
                eprint!("  ...");
                let outcome = runtime.orchestrator.handle_utterance(&session_id, &text).await;
                eprint!("\r     \r");
                println!();
                for line in outcome.composed_text.lines() {
                    println!("  Roamer > {line}");
                }
                if let roamer_agent::TurnStatus::Degraded { reason } = &outcome.status {
                    eprintln!("  [degraded] {reason}");
                }
            }
        }
        println!();
        prompt()?;
    }

    println!();
    println!("  Safe travels!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_commands() {
        assert_eq!(Input::parse("/context"), Input::Context);
        assert_eq!(Input::parse(" /history "), Input::History);
        assert_eq!(Input::parse("/clear"), Input::Clear);
        assert_eq!(Input::parse("/status"), Input::Status);
        assert_eq!(Input::parse("/suggest"), Input::Suggest);
        assert_eq!(Input::parse("/refresh"), Input::Refresh);
        assert_eq!(Input::parse("/teleport"), Input::Unknown("/teleport".into()));
    }

    #[test]
    fn plain_text_and_exit() {
        assert_eq!(
            Input::parse("weather in Rome?"),
            Input::Say("weather in Rome?".into())
        );
        assert_eq!(Input::parse("quit"), Input::Exit);
        assert_eq!(Input::parse("   "), Input::Blank);
    }

    #[test]
    fn indent_prefixes_every_line() {
        assert_eq!(indent("a\nb"), "  a\n  b");
    }
}
