//! beckon-ctl — command-line interface for the Beckon signaling daemon.

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 9400;

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    online:           usize,
    registered_users: usize,
    uptime_secs:      u64,
}

#[derive(Deserialize)]
struct PresenceResponse {
    users: Vec<PresenceUser>,
}

#[derive(Deserialize)]
struct PresenceUser {
    id:   String,
    name: String,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user_id: String,
    name:    String,
    email:   String,
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/api", port)
}

async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
    .await
    .with_context(|| format!("failed to connect to beckond at {} — is it running?", url))?
    .json::<T>()
    .await
    .context("failed to parse response")
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Beckon Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Registered users : {}", resp.registered_users);
    println!("  Online           : {}", resp.online);
    println!("  Uptime           : {}s", resp.uptime_secs);

    Ok(())
}

async fn cmd_presence(port: u16) -> Result<()> {
    let resp: PresenceResponse = get_json(&format!("{}/presence", base_url(port))).await?;

    if resp.users.is_empty() {
        println!("No users online.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Online Users ({})", resp.users.len());
    println!("═══════════════════════════════════════");

    for u in &resp.users {
        println!("  ┌─ {}", u.id);
        println!("  └─ name : {}", u.name);
    }

    Ok(())
}

async fn cmd_register(port: u16, name: &str, email: &str, password: &str) -> Result<()> {
    let url = format!("{}/register", base_url(port));
    let resp = reqwest::Client::new()
        .post(&url)
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .with_context(|| format!("failed to connect to beckond at {} — is it running?", url))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("registration failed ({}): {}", status, body);
    }

    let user: RegisterResponse = resp.json().await.context("failed to parse response")?;
    println!("Registered {} <{}> as user {}", user.name, user.email, user.user_id);

    Ok(())
}

fn print_usage() {
    println!("Usage: beckon-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                              Show daemon status");
    println!("  presence                            List online users");
    println!("  register <name> <email> <password>  Register a new user");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args.get(i)
            .context("--port requires a value")?
            .parse()
            .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                         => cmd_status(port).await,
        ["presence"]                            => cmd_presence(port).await,
        ["register", name, email, password]     => cmd_register(port, name, email, password).await,
        ["help"] | ["--help"] | ["-h"]          => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
