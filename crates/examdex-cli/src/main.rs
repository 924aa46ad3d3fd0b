mod cli;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use examdex_auth::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use examdex_auth::{Claims, ClaimsCodec, SigningKeyring, TokenClass, TokenService, compute_expiry};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use output::{print_error, print_json, print_success, print_warning};

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Issue(args) => {
            let service = token_service(cli.config.as_deref())?;
            let claims = Claims::new(args.subject, args.email, args.principal_type)
                .with_roles(args.roles);
            let pair = service.issue_for(&claims)?;
            print_json(&pair)?;
        }
        Commands::Verify(args) => {
            let service = token_service(cli.config.as_deref())?;
            let verifier = service.verifier();
            match TokenClass::from(args.class) {
                TokenClass::Access => print_json(&verifier.verify_access_token(&args.token)?)?,
                TokenClass::Refresh => print_json(&verifier.verify_refresh_token(&args.token)?)?,
            }
            print_success("Token is valid");
        }
        Commands::Inspect(args) => {
            print_warning("UNVERIFIED: signature not checked, do not trust these claims");
            print_json(&ClaimsCodec::peek(&args.token)?)?;
        }
        Commands::Expiry(args) => {
            let issued_at = args
                .from
                .unwrap_or_else(|| time::OffsetDateTime::now_utc().unix_timestamp());
            let expires_at = compute_expiry(issued_at, &args.spec)?;
            print_json(&serde_json::json!({
                "issuedAt": issued_at,
                "expiresAt": expires_at,
                "seconds": expires_at - issued_at,
            }))?;
        }
    }
    Ok(())
}

fn token_service(config_path: Option<&str>) -> Result<TokenService> {
    let config = load_config(config_path).context("loading token configuration")?;
    tracing::debug!(
        path = config_path.unwrap_or(DEFAULT_CONFIG_FILE),
        algorithm = config.algorithm.as_str(),
        "Loaded token configuration"
    );
    let keyring = SigningKeyring::from_config(&config).context("building signing keys")?;
    Ok(TokenService::new(Arc::new(keyring)))
}
