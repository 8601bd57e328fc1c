// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Install logging (to stderr, so stdout stays clean for JSON)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands, GitHubArgs};
use repo_lens::generate::ChatCompletionsGenerator;
use repo_lens::{Extraction, GenerateRequest, Pipeline, PipelineError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG always wins; --verbose falls back to DEBUG, otherwise WARN
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract { github, json } => handle_extract(&github, json).await,
        Commands::Generate {
            github,
            guidance,
            model,
            llm_url,
            llm_key,
        } => {
            let generator = ChatCompletionsGenerator::new(llm_key)?
                .with_base_url(llm_url)
                .with_model(model);
            handle_generate(&github, &generator, guidance).await
        }
    }
}

// Handles the 'extract' subcommand
async fn handle_extract(github: &GitHubArgs, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(&github.to_config())?;

    if !json {
        println!("🔍 Extracting {}", github.repo);
    }

    let extraction = pipeline
        .extract(&github.repo)
        .await
        .map_err(|e| anyhow::anyhow!(PipelineError::from(e).user_message()))?;

    if json {
        let output = serde_json::to_string_pretty(&extraction.report.result)?;
        println!("{}", output);
    } else {
        print_summary(&extraction);
    }
    Ok(())
}

// Handles the 'generate' subcommand
async fn handle_generate(
    github: &GitHubArgs,
    generator: &ChatCompletionsGenerator,
    guidance: String,
) -> Result<()> {
    let pipeline = Pipeline::new(&github.to_config())?;
    let request = GenerateRequest {
        repository: github.repo.clone(),
        guidance,
    };

    match pipeline.generate_document(generator, &request).await {
        Ok(document) => {
            println!("{}", document);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "pipeline failed");
            Err(anyhow::anyhow!(e.user_message()))
        }
    }
}

// Prints the extraction as a short human-readable report
fn print_summary(extraction: &Extraction) {
    let result = &extraction.report.result;

    println!("📦 {} (branch: {})", extraction.repository.full_name, extraction.repository.default_branch);
    if let Some(description) = &extraction.repository.description {
        println!("   {}", description);
    }
    println!("🌳 {} tree entries", result.tree.len());
    if extraction.truncated {
        println!("⚠️  GitHub truncated the tree listing; some paths are missing");
    }

    println!();
    println!("{:<40} {:>10}", "KEY FILE", "BYTES");
    println!("{}", "=".repeat(51));
    for file in &result.files {
        println!("{:<40} {:>10}", file.path, file.content.len());
    }

    if !extraction.failures().is_empty() {
        println!();
        println!("Skipped:");
        for failure in extraction.failures() {
            println!("   ❌ {}: {}", failure.path, failure.reason);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", result.files.len());
    println!("   ❌ Skipped: {}", extraction.failures().len());
}
