//! Daemon status command.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    history_records: usize,
    active_sessions: usize,
    service_sessions: usize,
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Wayline Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Version          : {}", resp.version);
    println!("  History records  : {}", resp.history_records);
    println!("  Active sessions  : {}", resp.active_sessions);
    println!("  Service sessions : {}", resp.service_sessions);

    Ok(())
}
