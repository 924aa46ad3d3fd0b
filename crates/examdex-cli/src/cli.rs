use clap::{Parser, Subcommand, ValueEnum};
use examdex_auth::TokenClass;

#[derive(Parser)]
#[command(name = "examdex-token")]
#[command(about = "Issue, verify and inspect ExamDex access/refresh tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML config file (defaults to ./examdex.toml when present)
    #[arg(short, long, global = true, env = "EXAMDEX_CONFIG")]
    pub config: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue an access/refresh token pair
    Issue(IssueArgs),
    /// Verify a token's signature and expiry
    Verify(VerifyArgs),
    /// Decode a token WITHOUT verifying it
    Inspect(InspectArgs),
    /// Compute the expiry for a duration spec
    Expiry(ExpiryArgs),
}

#[derive(clap::Args)]
pub struct IssueArgs {
    /// Principal identifier
    #[arg(long)]
    pub subject: String,
    /// Principal email
    #[arg(long)]
    pub email: String,
    /// Principal type (e.g. student, admin)
    #[arg(long, default_value = "user")]
    pub principal_type: String,
    /// Role to grant; repeatable
    #[arg(long = "role")]
    pub roles: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ClassArg {
    Access,
    Refresh,
}

impl From<ClassArg> for TokenClass {
    fn from(value: ClassArg) -> Self {
        match value {
            ClassArg::Access => TokenClass::Access,
            ClassArg::Refresh => TokenClass::Refresh,
        }
    }
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Which key the token should verify against
    #[arg(long, default_value = "access")]
    pub class: ClassArg,
    /// Compact token
    pub token: String,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Compact token
    pub token: String,
}

#[derive(clap::Args)]
pub struct ExpiryArgs {
    /// Duration spec such as 15m or 7d
    pub spec: String,
    /// Issue time in unix seconds (defaults to now)
    #[arg(long)]
    pub from: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issue_with_roles() {
        let cli = Cli::try_parse_from([
            "examdex-token",
            "issue",
            "--subject",
            "u1",
            "--email",
            "a@b.com",
            "--principal-type",
            "student",
            "--role",
            "learner",
            "--role",
            "reviewer",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue(args) => {
                assert_eq!(args.subject, "u1");
                assert_eq!(args.principal_type, "student");
                assert_eq!(args.roles, vec!["learner", "reviewer"]);
            }
            _ => panic!("expected issue"),
        }
    }

    #[test]
    fn test_parse_verify_refresh_class() {
        let cli =
            Cli::try_parse_from(["examdex-token", "verify", "--class", "refresh", "a.b.c"]).unwrap();
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(TokenClass::from(args.class), TokenClass::Refresh);
                assert_eq!(args.token, "a.b.c");
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_parse_expiry_from() {
        let cli = Cli::try_parse_from(["examdex-token", "expiry", "7d", "--from", "100"]).unwrap();
        match cli.command {
            Commands::Expiry(args) => {
                assert_eq!(args.spec, "7d");
                assert_eq!(args.from, Some(100));
            }
            _ => panic!("expected expiry"),
        }
    }
}
