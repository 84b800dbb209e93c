use crate::provider::{Catalog, SpotifyCatalog};
use crate::state::{credentials, Config, CredentialSource};
use crate::sync::{Phase, SyncError};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;

use super::utils;

/// Run the authorization-code flow and store the resulting token.
pub async fn run(state_dir: &Path) -> Result<()> {
    let config = Config::load_or_default(state_dir)?;
    let (client_id, client_secret) = utils::client_credentials()?;

    let catalog = SpotifyCatalog::new(client_id, client_secret);

    let state = format!("{:016x}", rand::random::<u64>());
    let auth_url = catalog.oauth_url(&config.redirect_uri, &state);

    println!("Opening browser for Spotify authorization...\n");
    println!("If it doesn't open, visit:\n{}\n", auth_url);

    let _ = open::that(&auth_url);

    let (address, callback_path) = callback_address(&config.redirect_uri)?;
    let code = wait_for_callback(&address, &callback_path, &state)?;

    println!("Exchanging code for token...");
    let token = catalog
        .exchange_code(&code, &config.redirect_uri)
        .await
        .context("Failed to exchange authorization code")?;

    credentials::save(state_dir, &token)?;

    let config_path = Config::path(state_dir);
    if !config_path.exists() {
        config.save(&config_path)?;
    }

    println!("\nSuccessfully authenticated with Spotify!");
    println!("  Token saved to {:?}", credentials::credentials_path(state_dir));

    Ok(())
}

/// Split `http://host:port/path` into a bind address and a callback path.
fn callback_address(redirect_uri: &str) -> Result<(String, String)> {
    let rest = redirect_uri
        .strip_prefix("http://")
        .context("Redirect URI must be a plain http:// loopback address")?;

    let (address, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };

    if !address.contains(':') {
        anyhow::bail!("Redirect URI must include a port: {}", redirect_uri);
    }

    Ok((address.to_string(), path.to_string()))
}

fn wait_for_callback(address: &str, callback_path: &str, expected_state: &str) -> Result<String> {
    let listener = TcpListener::bind(address)
        .with_context(|| format!("Failed to bind to {}. Is another instance running?", address))?;

    println!("Waiting for callback...");

    for stream in listener.incoming() {
        let mut stream = stream?;
        let mut request_line = String::new();
        BufReader::new(&stream).read_line(&mut request_line)?;

        // GET /callback?code=xxx&state=yyy HTTP/1.1
        let target = request_line.split_whitespace().nth(1).unwrap_or_default();
        let Some(query) = target
            .strip_prefix(callback_path)
            .and_then(|rest| rest.strip_prefix('?'))
        else {
            send_response(&mut stream, "404 Not Found", "Not Found")?;
            continue;
        };

        let params = parse_query(query);

        if params.get("state").map(String::as_str) != Some(expected_state) {
            send_response(&mut stream, "400 Bad Request", "State mismatch - possible CSRF")?;
            continue;
        }

        if let Some(code) = params.get("code") {
            send_response(
                &mut stream,
                "200 OK",
                "<html><body><h1>Success!</h1><p>You can close this tab.</p></body></html>",
            )?;
            return Ok(code.clone());
        }

        if let Some(error) = params.get("error") {
            send_response(&mut stream, "400 Bad Request", &format!("Auth failed: {}", error))?;
            anyhow::bail!("Authorization denied: {}", error);
        }

        send_response(&mut stream, "400 Bad Request", "Missing code")?;
    }

    anyhow::bail!("No valid callback received")
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            let value = urlencoding::decode(v)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| v.to_string());
            (k.to_string(), value)
        })
        .collect()
}

fn send_response(stream: &mut impl Write, status: &str, body: &str) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}

pub async fn logout(state_dir: &Path) -> Result<()> {
    if credentials::delete(state_dir)? {
        println!("Logged out from Spotify");
        println!("Run 'plsync auth' to login again");
    } else {
        println!("Not logged in to Spotify");
    }

    Ok(())
}

pub async fn whoami(source: Option<CredentialSource>, state_dir: &Path) -> Result<()> {
    let config = Config::load_or_default(state_dir)?;
    let source = source.unwrap_or(config.default_source);
    let catalog = utils::open_catalog(source, &config, state_dir)?;

    let user = catalog
        .current_user()
        .await
        .map_err(SyncError::transport(Phase::Identify))?;

    println!("Logged in to Spotify as {}", user.id);
    if let Some(name) = &user.display_name {
        println!("Display name: {}", name);
    }

    if source == CredentialSource::Store {
        if let Some(expires_at) = credentials::load(state_dir)?.and_then(|t| t.expires_at) {
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            if now < expires_at {
                println!("Token expires in: {}s", expires_at - now);
            } else {
                println!("Token expired (will auto-refresh on next use)");
            }
        }
    }

    Ok(())
}
