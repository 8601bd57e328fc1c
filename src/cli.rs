// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share the same GitHub options:
// - extract: show which key files a repository has
// - generate: extract, then ask a language model to write a README
//
// Every GitHub and model option can also come from an environment variable,
// so tokens never have to be typed on the command line.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use repo_lens::config::{DEFAULT_API_URL, DEFAULT_DEADLINE};
use repo_lens::extract::DEFAULT_CONCURRENCY;
use repo_lens::generate::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use repo_lens::{ExtractorConfig, RepositoryRef};

#[derive(Parser, Debug)]
#[command(
    name = "repo-lens",
    version,
    about = "Extract the key files of a GitHub repository and generate a README from them",
    long_about = "repo-lens resolves a repository's default branch, lists its tree, fetches \
                  manifests, framework configs and entry points, and can hand them to a \
                  language model to draft documentation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a repository's tree and fetch its key files
    ///
    /// Example: repo-lens extract rust-lang/cargo --json
    Extract {
        #[command(flatten)]
        github: GitHubArgs,

        /// Output the extraction result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Extract a repository and generate a README from it
    ///
    /// Example: repo-lens generate https://github.com/user/repo --guidance "Keep it short"
    Generate {
        #[command(flatten)]
        github: GitHubArgs,

        /// Free-form instructions passed to the model
        #[arg(long, default_value = "")]
        guidance: String,

        /// Model name for the completions API
        #[arg(long, env = "REPO_LENS_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        /// Base URL of an OpenAI-compatible completions API
        #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
        llm_url: String,

        /// API key for the completions API
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        llm_key: String,
    },
}

// Options for reaching GitHub, shared by both subcommands
#[derive(Args, Debug)]
pub struct GitHubArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: RepositoryRef,

    /// GitHub token (optional, raises the API rate limit)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Maximum key-file downloads in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Give up on the whole extraction after this many seconds
    #[arg(long, default_value_t = DEFAULT_DEADLINE.as_secs())]
    pub timeout_secs: u64,

    /// Extra key-file path to fetch (exact path, repeatable)
    #[arg(long = "pattern")]
    pub patterns: Vec<String>,
}

impl GitHubArgs {
    pub fn to_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            api_base_url: self.api_url.clone(),
            token: self.token.clone(),
            concurrency: self.concurrency,
            deadline: Duration::from_secs(self.timeout_secs),
            extra_patterns: self.patterns.clone(),
            ..ExtractorConfig::default()
        }
    }
}
