//! Command-line definitions for the `ecoflex` binary.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ecoflex_core::Role;

/// Success probabilities offered by opportunity mode.
pub const PROBABILITY_CHOICES: [(f64, &str); 4] = [
    (0.5, "50% (Risky)"),
    (0.7, "70% (Moderate)"),
    (0.8, "80% (Likely)"),
    (0.9, "90% (Confident)"),
];

/// EcoFlex - personal economic decision intelligence in the terminal
#[derive(Parser, Debug)]
#[command(name = "ecoflex", version)]
#[command(about = "EcoFlex: personal economic decision intelligence", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ECOFLEX_CONFIG")]
    pub config: Option<String>,

    /// API root, e.g. http://localhost:8080/api
    #[arg(long, global = true, env = "ECOFLEX_API_URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register(RegisterArgs),
    /// Log in and remember the session
    Login {
        /// Account name (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Overview of the available tools
    Dashboard,
    /// Household profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Economic Flexibility Score and risk breakdown
    Score,
    /// Simulate a financial shock
    Shock {
        /// Shock type, e.g. JOB_LOSS (lists the options when omitted)
        shock_type: Option<String>,
        /// Amount for MEDICAL_EMERGENCY, MIGRATION_COST or SCHOOL_FEE_INCREASE
        #[arg(short, long)]
        amount: Option<f64>,
    },
    /// Test an investment before committing to it
    Opportunity {
        /// Up-front investment cost
        #[arg(long)]
        cost: f64,
        /// Expected monthly income increase
        #[arg(long)]
        increase: f64,
        /// Chance of success: 0.5, 0.7, 0.8 or 0.9
        #[arg(long, default_value_t = 0.7, value_parser = parse_probability)]
        probability: f64,
    },
    /// Monthly resilience tracker
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },
    /// Manage the CLI configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Fields for `register`; anything left out is prompted for.
#[derive(clap::Args, Debug, Default)]
pub struct RegisterArgs {
    /// Login name
    #[arg(short, long)]
    pub username: Option<String>,
    /// E-mail address
    #[arg(short, long)]
    pub email: Option<String>,
    /// Phone number
    #[arg(short, long)]
    pub phone: Option<String>,
    /// INDIVIDUAL or FAMILY
    #[arg(short, long)]
    pub role: Option<Role>,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Home city
    #[arg(long)]
    pub city: Option<String>,
}

/// `profile` subcommands.
#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Show the saved household
    Show,
    /// Set up or update the household step by step
    Wizard,
    /// Save a household from a JSON or TOML file
    Import {
        /// File with `financialProfile` and `members`
        file: String,
    },
}

/// `track` subcommands.
#[derive(Subcommand, Debug)]
pub enum TrackAction {
    /// Record this month's figures
    Record(TrackArgs),
    /// Show the score trend and past entries
    History,
}

/// Figures for one tracker month.
#[derive(clap::Args, Debug, Default)]
pub struct TrackArgs {
    /// Month to record, YYYY-MM-DD (defaults to the current month)
    #[arg(long)]
    pub month: Option<NaiveDate>,
    /// Income received
    #[arg(long)]
    pub income: Option<f64>,
    /// Spending
    #[arg(long)]
    pub expenses: f64,
    /// Savings at month end
    #[arg(long)]
    pub savings: f64,
    /// Debt at month end
    #[arg(long)]
    pub debt: Option<f64>,
    /// Number of income sources
    #[arg(long)]
    pub sources: Option<u32>,
    /// Number of skills
    #[arg(long)]
    pub skills: Option<u32>,
    /// Members without income
    #[arg(long)]
    pub dependents: Option<u32>,
    /// Members with income
    #[arg(long)]
    pub earners: Option<u32>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print one value by dotted key
    Get {
        /// Key such as `api_url`
        key: String,
    },
    /// Change one value in the config file
    Set {
        /// Key such as `api_url`
        key: String,
        /// New value
        value: String,
    },
    /// Write a config file with default values
    Init {
        /// Where to write it (defaults to the standard location)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as docker `--env` flags
        #[arg(long)]
        docker_env: bool,
    },
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    let value = if value > 1.0 { value / 100.0 } else { value };
    PROBABILITY_CHOICES
        .iter()
        .map(|(p, _)| *p)
        .find(|p| (p - value).abs() < 1e-9)
        .ok_or_else(|| "choose one of 0.5, 0.7, 0.8, 0.9".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_choices() {
        assert_eq!(parse_probability("0.8").unwrap(), 0.8);
        assert_eq!(parse_probability("90%").unwrap(), 0.9);
        assert!(parse_probability("0.6").is_err());
        assert!(parse_probability("likely").is_err());
    }

    #[test]
    fn test_opportunity_defaults_to_moderate() {
        let cli = Cli::try_parse_from([
            "ecoflex",
            "opportunity",
            "--cost",
            "50000",
            "--increase",
            "10000",
        ])
        .unwrap();
        match cli.command {
            Command::Opportunity { probability, .. } => assert_eq!(probability, 0.7),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shock_with_amount() {
        let cli =
            Cli::try_parse_from(["ecoflex", "shock", "MEDICAL_EMERGENCY", "--amount", "50000"])
                .unwrap();
        match cli.command {
            Command::Shock { shock_type, amount } => {
                assert_eq!(shock_type.as_deref(), Some("MEDICAL_EMERGENCY"));
                assert_eq!(amount, Some(50000.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_register_role_parses() {
        let cli = Cli::try_parse_from(["ecoflex", "register", "--role", "family"]).unwrap();
        match cli.command {
            Command::Register(args) => assert_eq!(args.role, Some(Role::Family)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_track_requires_savings_and_expenses() {
        assert!(Cli::try_parse_from(["ecoflex", "track", "record", "--income", "1"]).is_err());
        let cli = Cli::try_parse_from([
            "ecoflex", "track", "record", "--expenses", "20000", "--savings", "40000",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Track {
                action: TrackAction::Record(_)
            }
        ));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
