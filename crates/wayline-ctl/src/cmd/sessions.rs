//! Session history commands.

use anyhow::{bail, Result};
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct SessionsResponse {
    sessions: Vec<SessionRow>,
    count: usize,
}

#[derive(Deserialize)]
struct SessionRow {
    session_id: String,
    direction: String,
    consumer_id: String,
    provider_id: String,
    service_type: String,
    provider_country: String,
    data_sent: u64,
    data_received: u64,
    tokens: u64,
    status: Option<String>,
    started: String,
    updated: String,
}

/// Filters accepted by `sessions`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub direction: Option<String>,
    pub status: Option<String>,
}

impl SessionFilter {
    /// Parse `--direction <d>` / `--status <s>` pairs.
    pub fn parse(args: &[&str]) -> Result<Self> {
        let mut filter = SessionFilter::default();
        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match *arg {
                "--direction" => {
                    let value = it.next().copied().unwrap_or_default();
                    if !matches!(value, "provider" | "consumer") {
                        bail!("--direction must be provider or consumer");
                    }
                    filter.direction = Some(value.to_string());
                }
                "--status" => {
                    let value = it.next().copied().unwrap_or_default();
                    if !matches!(value, "new" | "completed") {
                        bail!("--status must be new or completed");
                    }
                    filter.status = Some(value.to_string());
                }
                other => bail!("unknown option: {}", other),
            }
        }
        Ok(filter)
    }

    fn query(&self) -> String {
        let mut params = Vec::new();
        if let Some(d) = &self.direction {
            params.push(format!("direction={}", d));
        }
        if let Some(s) = &self.status {
            params.push(format!("status={}", s));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

pub async fn cmd_sessions(port: u16, filter: &SessionFilter) -> Result<()> {
    let resp: SessionsResponse =
        get_json(&format!("{}/sessions{}", base_url(port), filter.query())).await?;

    if resp.sessions.is_empty() {
        println!("No session history.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Session History ({})", resp.count);
    println!("═══════════════════════════════════════");

    for s in &resp.sessions {
        println!("  ┌─ {}", s.session_id);
        println!("  │  direction : {}", s.direction);
        println!("  │  status    : {}", s.status.as_deref().unwrap_or("-"));
        println!("  │  service   : {} ({})", s.service_type, s.provider_country);
        println!("  │  consumer  : {}", s.consumer_id);
        println!("  │  provider  : {}", s.provider_id);
        println!(
            "  │  data      : {} sent / {} received",
            format_bytes(s.data_sent),
            format_bytes(s.data_received)
        );
        println!("  │  tokens    : {}", s.tokens);
        println!("  │  started   : {}", s.started);
        println!("  └─ updated   : {}", s.updated);
    }

    Ok(())
}
