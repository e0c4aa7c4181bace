//! opaq CLI
//!
//! 세션 토큰 발급/검증과 시크릿 초기화를 위한 운영 도구입니다.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use opaq_core::auth::{FixedClock, TokenService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "opaq")]
#[command(author, version, about = "opaq CLI - mint and verify session tokens", long_about = None)]
struct Cli {
    /// Directory holding the secret file (overrides OPAQ_SECRET_DIR)
    #[arg(long, global = true)]
    secret_dir: Option<PathBuf>,

    /// Maximum token age in seconds (overrides OPAQ_TOKEN_MAX_AGE_SECS)
    #[arg(long, global = true)]
    max_age_secs: Option<i64>,

    /// Evaluate as if the current time were this RFC 3339 instant
    #[arg(long, global = true)]
    at: Option<DateTime<Utc>>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a token for a subject
    Mint {
        /// Subject UUID
        subject: Uuid,
    },

    /// Verify a token and print the refreshed token
    Verify {
        /// Token text
        token: String,
    },

    /// Manage the token secret
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Load the secret, generating it if absent
    Init,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 로깅 초기화 (stdout은 명령 출력용)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opaq=info,opaq_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 설정 로드 (CLI 옵션 > 환경변수)
    let config = config::resolve_config(cli.secret_dir, cli.max_age_secs)?;
    tracing::debug!("Resolved config: {:?}", config);

    let service = TokenService::from_config(&config)?;

    match cli.at {
        Some(at) => run(&service.with_clock(FixedClock::at(at)), cli.command, cli.format),
        None => run(&service, cli.command, cli.format),
    }
}

fn run<C: opaq_core::auth::Clock>(
    service: &TokenService<C>,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::Mint { subject } => commands::token::mint(service, subject, format),
        Commands::Verify { token } => commands::token::verify(service, &token, format),
        Commands::Secret { action } => match action {
            SecretAction::Init => commands::secret::init(service, format),
        },
    }
}
