//! `roamer capabilities`: What each agent can do.

use roamer_config::AppConfig;

use crate::runtime::Runtime;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let runtime = Runtime::build(&config)?;

    for agent in runtime.orchestrator.capabilities() {
        println!("{} ({})", agent.name, agent.agent);
        for capability in &agent.capabilities {
            println!("  • {capability}");
        }
        println!("  Tools: {}", agent.tools.join(", "));
        println!();
    }

    let status = runtime.orchestrator.status().await;
    println!(
        "{} agents, {} tools available",
        status.agents_registered, status.tools_available
    );
    Ok(())
}
