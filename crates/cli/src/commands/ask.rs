//! `roamer ask`: Single-message mode.

use roamer_agent::TurnStatus;

use crate::runtime::Runtime;

pub async fn run(message: &str, session: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_with_key()?;
    let runtime = Runtime::build(&config)?;

    eprint!("  Thinking...");
    let outcome = runtime.orchestrator.handle_utterance(session, message).await;
    eprint!("\r              \r");

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", outcome.composed_text);
    if let TurnStatus::Degraded { reason } = &outcome.status {
        eprintln!();
        eprintln!("  [degraded] {reason}");
    }
    Ok(())
}
