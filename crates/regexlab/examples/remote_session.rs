//! Session against a running regex service.
//!
//! Reads `regexlab.toml` from the working directory when present, applies
//! `REGEXLAB_*` environment overrides, and optionally loads a share link
//! given as the first argument.
//!
//! Run with: `cargo run --example remote_session -- http://localhost:3000/#1a2b3c4d`

use std::path::Path;

use regexlab::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = if Path::new("regexlab.toml").exists() {
        LabConfig::load("regexlab.toml")?
    } else {
        LabConfig::default()
    };
    let config = config.with_env(&regexlab::config::EnvConfig::default())?;
    regexlab::init_logging(&config.logging)?;

    let location = std::env::args().nth(1).unwrap_or_default();
    let session = SessionBuilder::from_config(&config)?
        .load(regexlab::fragment_of(&location))
        .await?;

    if session.pattern().is_empty() {
        session.set_pattern(r"\b\w+@\w+\.\w+\b").await;
        session.set_sample("write to team@example.com or ops@example.org");
    }

    println!("Service: {}", config.service.base_url);
    println!("Pattern: {}", session.pattern());
    println!("Sample:  {}", session.sample());

    match session.run().await {
        Ok(evaluation) => {
            println!("Matches: {:?} ({:.2} ms)", evaluation.matches, evaluation.elapsed_ms());
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            eprintln!("  ({err})");
        }
    }

    Ok(())
}
