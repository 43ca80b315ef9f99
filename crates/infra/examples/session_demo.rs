//! Example: logging in and reading a paper with its AI score
//!
//! Reads configuration the same way applications do (environment, `.env`
//! or `paperlens.toml`), then:
//!
//! 1. restores a persisted session, or logs in with `PAPERLENS_EMAIL` /
//!    `PAPERLENS_PASSWORD`
//! 2. fetches one paper detail
//! 3. waits for its AI score, starting a scoring job if needed
//!
//! Run with: ```bash PAPERLENS_API_BASE_URL=http://localhost:8000/api \
//! PAPERLENS_EMAIL=me@example.org PAPERLENS_PASSWORD=secret \
//! cargo run -p paperlens-infra --example session_demo -- 2301.00001 ```

use anyhow::{bail, Context};
use paperlens_core::SessionEvent;
use paperlens_domain::UserCredentials;
use paperlens_infra::{config, init_tracing, PaperLensClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("loading configuration")?;
    init_tracing(&config.logging).context("initialising tracing")?;

    let arxiv_id = std::env::args().nth(1).unwrap_or_else(|| "2301.00001".to_string());
    let client = PaperLensClient::new(config).context("building client")?;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if event == SessionEvent::LogoutRequired {
                tracing::warn!("session expired; log in again");
            }
        }
    });

    if !client.initialize().await? {
        let (Ok(email), Ok(password)) =
            (std::env::var("PAPERLENS_EMAIL"), std::env::var("PAPERLENS_PASSWORD"))
        else {
            bail!("no saved session; set PAPERLENS_EMAIL and PAPERLENS_PASSWORD");
        };
        let user = client.login(&UserCredentials::new(email, password)).await?;
        tracing::info!(user = %user.email, "logged in");
    }

    let paper = client.get_paper_detail(&arxiv_id).await?;
    tracing::info!(arxiv_id = %paper.arxiv_id, title = %paper.title, "paper loaded");

    let summary = client.store().fetch_ai_score(&arxiv_id).await?;
    match summary.score {
        Some(score) => tracing::info!(score, "AI score ready"),
        None => tracing::info!("AI score ready without a total"),
    }

    Ok(())
}
