//! Registration over HTTP and the handoff to WebSocket login.

use anyhow::{bail, Result};
use serde_json::json;

use beckon_core::ServerEvent;

use crate::{api_url, start_server, Client};

#[tokio::test]
async fn registered_user_can_log_in() -> Result<()> {
    let port = start_server().await?;
    let http = reqwest::Client::new();

    let resp = http
        .post(api_url(port, "/register"))
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "pw",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["user_id"], "1004");
    assert_eq!(body["name"], "Ada");

    let mut client = Client::connect(port).await?;
    client
        .send(&beckon_core::ClientEvent::Login {
            user_id: "1004".into(),
        })
        .await?;
    match client.recv().await? {
        ServerEvent::LoginSuccess { user } => {
            assert_eq!(user.id, "1004");
            assert_eq!(user.name, "Ada");
        }
        other => bail!("expected login_success, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let port = start_server().await?;
    let http = reqwest::Client::new();

    // barath@example.com is one of the seeded demo users.
    let resp = http
        .post(api_url(port, "/register"))
        .json(&json!({
            "name": "Impostor",
            "email": "barath@example.com",
            "password": "pw",
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), 409);
    let body = resp.text().await?;
    assert!(body.contains("already registered"), "body: {body}");

    let status: serde_json::Value = reqwest::get(api_url(port, "/status")).await?.json().await?;
    assert_eq!(status["registered_users"], 3);

    Ok(())
}

#[tokio::test]
async fn registrations_get_sequential_ids() -> Result<()> {
    let port = start_server().await?;
    let http = reqwest::Client::new();

    for (i, (name, email)) in [("Ada", "ada@example.com"), ("Bob", "bob@example.com")]
        .iter()
        .enumerate()
    {
        let resp = http
            .post(api_url(port, "/register"))
            .json(&json!({"name": name, "email": email, "password": "pw"}))
            .send()
            .await?;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = resp.json().await?;
        assert_eq!(body["user_id"], format!("{}", 1004 + i));
    }

    let status: serde_json::Value = reqwest::get(api_url(port, "/status")).await?.json().await?;
    assert_eq!(status["registered_users"], 5);

    Ok(())
}

#[tokio::test]
async fn blank_fields_are_a_bad_request() -> Result<()> {
    let port = start_server().await?;
    let http = reqwest::Client::new();

    let resp = http
        .post(api_url(port, "/register"))
        .json(&json!({"name": "", "email": "x@example.com", "password": "pw"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    Ok(())
}
