use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use issuedeck_core::Config;
use issuedeck_gateway::HttpGateway;
use issuedeck_services::IssueDeck;

#[tokio::main]
async fn main() -> Result<()> {
    issuedeck_core::init()?;

    let (config, _) = Config::load_validated().context("Failed to load configuration")?;
    let gateway = Arc::new(HttpGateway::from_config(&config.gateway)?);
    let deck = IssueDeck::new(gateway, &config);

    deck.initialize().await;
    tracing::info!("IssueDeck started (gateway: {})", config.gateway.base_url);

    if !deck.auth().is_logged_in() {
        sign_in(&deck).await?;
    }

    let mut updates = deck.feed().subscribe();
    deck.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(error) = &snapshot.error {
                    tracing::warn!("{}", error);
                } else if !snapshot.is_loading() {
                    for issue in snapshot.issues() {
                        println!("{:>6}  {:<24} {}", issue.number, issue.repo_name, issue.title);
                    }
                    println!();
                }
            }
        }
    }

    deck.shutdown().await;
    tracing::info!("IssueDeck stopped");
    Ok(())
}

async fn sign_in(deck: &IssueDeck) -> Result<()> {
    let login = deck.device_login();
    let code = login.start().await.context("Failed to start GitHub sign-in")?;

    println!("Open {} and enter code {}", code.verification_uri, code.user_code);

    let cancel = CancellationToken::new();
    let on_ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = login.poll(&code, &cancel).await;
    on_ctrl_c.abort();

    result
        .map(|_| tracing::info!("Signed in to GitHub"))
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))
}
