//! Offline regexlab session.
//!
//! Validates, evaluates, converts, saves and shares a pattern using the
//! in-process service, so no server is needed.
//!
//! Run with: `cargo run --example local_session`

use regexlab::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    regexlab::init_logging(&LoggingConfig::new().level("regexlab=debug").format(LogFormat::Compact))?;

    println!("regexlab Local Session Example");
    println!("==============================\n");

    let session = EvaluationSession::builder(LocalService::new())
        .origin("http://localhost:3000")
        .clipboard(MemoryClipboard::new())
        .build()?;

    // 1. Validation on edit
    println!("1. Validating patterns...");
    for pattern in [r"\d+", r"(unclosed", r"(?P<word>\w+)"] {
        let valid = session.set_pattern(pattern).await;
        println!("   {pattern:<16} valid: {valid}");
    }

    // 2. Evaluation
    println!("\n2. Running \\d+ against 'a12b345'...");
    session.set_pattern(r"\d+").await;
    session.set_sample("a12b345");
    let evaluation = session.run().await?;
    println!(
        "   {} matches in {:.2} ms: {:?}",
        evaluation.match_count(),
        evaluation.elapsed_ms(),
        evaluation.matches
    );

    // 3. Code generation
    println!("\n3. Construction snippets:");
    for (target, variant, snippet) in evaluation.conversions.iter() {
        println!("   {:<10} {:<24} {snippet}", target.display_name(), variant.key());
    }

    // 4. Saving
    println!("\n4. Saving...");
    session.save_current().await?;
    println!("{}", session.export_saved_json()?);

    // 5. Sharing
    println!("\n5. Sharing...");
    let link = session.share().await?;
    println!("   {link}");

    println!("\n{:#?}", session.metrics());
    Ok(())
}
