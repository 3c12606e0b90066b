//! Command handlers.
//!
//! [`App`] ties the configuration, the saved session and the API client
//! together. Every handler writes through a [`Prompter`], which is also
//! where interactive input comes from.

use std::path::Path;

use ecoflex_client::EcoflexClient;
use ecoflex_core::api::{LoginRequest, OpportunityRequest, RegisterRequest, ShockRequest, TrackerEntryInput};
use ecoflex_core::formula::ShockKind;
use ecoflex_core::{FamilyMember, FinancialProfile, Role};
use serde::Deserialize;

use crate::cli::{Command, ProfileAction, RegisterArgs, TrackAction, TrackArgs};
use crate::config::CliConfig;
use crate::config_handlers::handle_config_command;
use crate::prompt::{Prompter, PrompterExt};
use crate::session::{Session, SessionStore};
use crate::wizard::{self, ProfileSink, Wizard};
use crate::{Error, Result, views};

const ROLES: [(Role, &str); 2] = [(Role::Individual, "Individual"), (Role::Family, "Family")];

/// Household file accepted by `profile import`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImport {
    /// Step-one data.
    pub financial_profile: FinancialProfile,
    /// Step-two data; may be left out to keep the saved members.
    #[serde(default)]
    pub members: Vec<FamilyMember>,
}

impl ProfileImport {
    /// Reads a `.toml` file as TOML and anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::input(format!("Cannot read {}: {e}", path.display())))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&text)
                .map_err(|e| Error::input(format!("Invalid profile file {}: {e}", path.display())))
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::input(format!("Invalid profile file {}: {e}", path.display())))
        }
    }
}

/// Runtime context shared by all commands.
#[derive(Debug, Clone)]
pub struct App {
    config: CliConfig,
    config_path: Option<String>,
    sessions: SessionStore,
}

impl App {
    /// Context for `config`, locating the session file from it.
    pub fn new(config: CliConfig, config_path: Option<String>) -> Result<Self> {
        let sessions = SessionStore::locate(config.session_file.as_deref())?;
        Ok(Self::with_sessions(config, config_path, sessions))
    }

    /// Context with an explicit session store.
    pub fn with_sessions(
        config: CliConfig,
        config_path: Option<String>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            config,
            config_path,
            sessions,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Session storage.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn client(&self) -> Result<EcoflexClient> {
        Ok(EcoflexClient::new(self.config.api_url.as_str())?)
    }

    fn authed(&self) -> Result<(EcoflexClient, Session)> {
        let session = self.sessions.require()?;
        if session.api_url != self.config.api_url {
            tracing::debug!(
                saved = %session.api_url,
                configured = %self.config.api_url,
                "session was issued by a different API"
            );
        }
        let client = self.client()?.with_token(session.token.clone());
        Ok((client, session))
    }

    /// Dispatches one command.
    pub async fn run<P>(&self, command: Command, p: &mut P) -> Result<()>
    where
        P: Prompter + ?Sized,
    {
        tracing::debug!(?command, "running command");
        match command {
            Command::Register(args) => self.register(args, p).await,
            Command::Login { username } => self.login(username, p).await,
            Command::Logout => self.logout(p),
            Command::Whoami => self.whoami(p),
            Command::Dashboard => self.dashboard(p).await,
            Command::Profile { action } => match action {
                ProfileAction::Show => self.show_profile(p).await,
                ProfileAction::Wizard => self.profile_wizard(p).await,
                ProfileAction::Import { file } => self.import_profile(Path::new(&file), p).await,
            },
            Command::Score => self.score(p).await,
            Command::Shock { shock_type, amount } => self.shock(shock_type, amount, p).await,
            Command::Opportunity {
                cost,
                increase,
                probability,
            } => self.opportunity(cost, increase, probability, p).await,
            Command::Track { action } => match action {
                TrackAction::Record(args) => self.track_record(args, p).await,
                TrackAction::History => self.track_history(p).await,
            },
            Command::Config { action } => {
                handle_config_command(self.config_path.as_deref(), action, p)
            }
        }
    }

    /// `register`
    pub async fn register<P: Prompter + ?Sized>(&self, args: RegisterArgs, p: &mut P) -> Result<()> {
        p.say("Create your EcoFlex account")?;
        let username = match args.username {
            Some(u) => u,
            None => p.required("Username", None)?,
        };
        let email = match args.email {
            Some(e) => e,
            None => p.required("Email", None)?,
        };
        let password = p.read_secret("Password *")?;
        let confirm = p.read_secret("Confirm Password *")?;
        if password != confirm {
            return Err(Error::PasswordMismatch);
        }
        let phone = match args.phone {
            Some(phone) => phone,
            None => p.required("Phone", None)?,
        };
        let role = match args.role {
            Some(role) => role,
            None => p.choose("Account type", &ROLES, 0)?,
        };
        let name = match args.name {
            Some(name) => Some(name),
            None => p.text("Full Name (optional)", None)?,
        };
        let city = match args.city {
            Some(city) => Some(city),
            None => p.text("City (optional)", None)?,
        };

        let request = RegisterRequest {
            username,
            password,
            email,
            phone: Some(phone),
            role: Some(role),
            name,
            city,
        };
        self.client()?.register(&request).await?;
        tracing::info!(username = %request.username, "registered");
        p.say("Registered! Please login.")
    }

    /// `login`
    pub async fn login<P: Prompter + ?Sized>(&self, username: Option<String>, p: &mut P) -> Result<()> {
        let username = match username {
            Some(u) => u,
            None => p.required("Username", None)?,
        };
        let password = p.read_secret("Password")?;
        let auth = self
            .client()?
            .login(&LoginRequest { username, password })
            .await?;
        let session = Session::from_login(auth, self.config.api_url.clone());
        self.sessions.save(&session)?;
        tracing::info!(username = %session.username, "logged in");
        p.say(&format!(
            "✅ Logged in as {} ({})",
            session.username, session.role
        ))
    }

    /// `logout`
    pub fn logout<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        if self.sessions.clear()? {
            p.say("Logged out")
        } else {
            p.say("Not logged in")
        }
    }

    /// `whoami`
    pub fn whoami<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let session = self.sessions.require()?;
        p.say(&format!(
            "{} ({}), account #{} on {}",
            session.username, session.role, session.user_id, session.api_url
        ))
    }

    /// `dashboard`
    pub async fn dashboard<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let (client, session) = self.authed()?;
        let profile = client.profile().await?;
        p.say(&views::dashboard(&session.username, Some(&profile)))
    }

    /// `profile show`
    pub async fn show_profile<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let (client, _) = self.authed()?;
        let profile = client.profile().await?;
        p.say(&views::profile(&profile))
    }

    /// `profile wizard`
    pub async fn profile_wizard<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let (client, _) = self.authed()?;
        let existing = client.profile().await?;
        let mut state = Wizard::from_profile(&existing);
        wizard::run(&mut state, p, &client).await
    }

    /// `profile import <file>`
    pub async fn import_profile<P: Prompter + ?Sized>(&self, file: &Path, p: &mut P) -> Result<()> {
        let import = ProfileImport::from_file(file)?;
        let (client, _) = self.authed()?;
        client.save_household(&import.financial_profile).await?;
        p.say("✅ Household saved")?;
        if import.members.is_empty() {
            p.say("No members in the file; saved members were left unchanged")?;
        } else {
            ProfileSink::save_members(&client, &import.members).await?;
            p.say(&format!("✅ {} members saved", import.members.len()))?;
        }
        Ok(())
    }

    /// `score`
    pub async fn score<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let (client, _) = self.authed()?;
        let score = client.economic_score().await?;
        p.say(&views::economic_score(&score))
    }

    /// `shock [TYPE] [--amount]`
    pub async fn shock<P: Prompter + ?Sized>(
        &self,
        shock_type: Option<String>,
        amount: Option<f64>,
        p: &mut P,
    ) -> Result<()> {
        let Some(shock_type) = shock_type else {
            return p.say(&views::shock_menu());
        };
        let kind = ShockKind::parse(&shock_type);
        if let ShockKind::Custom(name) = &kind {
            p.say(&format!(
                "'{name}' is not a built-in shock; it is simulated without changes"
            ))?;
        }
        let amount = match amount {
            None if kind.takes_amount() => Some(p.parsed_required::<f64>("Amount (₹)", None)?),
            other => other,
        };
        let (client, _) = self.authed()?;
        let outcome = client
            .simulate_shock(&ShockRequest {
                shock_type: kind.code().to_string(),
                shock_value: amount,
            })
            .await?;
        p.say(&views::shock(&outcome))
    }

    /// `opportunity --cost --increase [--probability]`
    pub async fn opportunity<P: Prompter + ?Sized>(
        &self,
        cost: f64,
        increase: f64,
        probability: f64,
        p: &mut P,
    ) -> Result<()> {
        let (client, _) = self.authed()?;
        let outcome = client
            .simulate_opportunity(&OpportunityRequest {
                investment_cost: Some(cost),
                expected_income_increase: Some(increase),
                success_probability: Some(probability),
            })
            .await?;
        p.say(&views::opportunity(&outcome))
    }

    /// `track record ...`
    pub async fn track_record<P: Prompter + ?Sized>(&self, args: TrackArgs, p: &mut P) -> Result<()> {
        let (client, _) = self.authed()?;
        let entry = TrackerEntryInput {
            month: args.month,
            total_income: args.income,
            total_expenses: Some(args.expenses),
            total_savings: Some(args.savings),
            total_debt: args.debt,
            income_source_count: args.sources,
            skill_count: args.skills,
            dependent_count: args.dependents,
            earner_count: args.earners,
        };
        let saved = client.record_month(&entry).await?;
        p.say(&views::tracker_saved(saved.resilience_score))?;
        let history = client.history().await?;
        p.say(&views::history(&history))
    }

    /// `track history`
    pub async fn track_history<P: Prompter + ?Sized>(&self, p: &mut P) -> Result<()> {
        let (client, _) = self.authed()?;
        let history = client.history().await?;
        p.say(&views::history(&history))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::prompt::LinePrompter;
    use std::io::Cursor;

    fn app(dir: &tempfile::TempDir) -> App {
        App::with_sessions(
            CliConfig {
                // Nothing listens on port 9; requests fail before any network wait.
                api_url: "http://127.0.0.1:9/api".into(),
                session_file: None,
            },
            None,
            SessionStore::new(dir.path().join("session.json")),
        )
    }

    fn scripted(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[tokio::test]
    async fn test_password_mismatch_stops_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = scripted("asha\nasha@example.com\nsecret1\nsecret2\n");
        let err = app(&dir)
            .register(RegisterArgs::default(), &mut p)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PasswordMismatch));
        assert_eq!(err.user_message(), "Passwords don't match");
    }

    #[tokio::test]
    async fn test_commands_need_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let mut p = scripted("");
        assert!(matches!(app.score(&mut p).await, Err(Error::NotLoggedIn)));
        assert!(matches!(app.dashboard(&mut p).await, Err(Error::NotLoggedIn)));
        assert!(matches!(app.whoami(&mut p), Err(Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = scripted("");
        app(&dir).logout(&mut p).unwrap();
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Not logged in"));
    }

    #[tokio::test]
    async fn test_shock_without_type_lists_options() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = scripted("");
        app(&dir).shock(None, None, &mut p).await.unwrap();
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("JOB_LOSS"));
        assert!(out.contains("SCHOOL_FEE_INCREASE"));
    }

    #[tokio::test]
    async fn test_unreachable_server_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = scripted("pw\n");
        let err = app(&dir)
            .login(Some("asha".into()), &mut p)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Server error. Make sure backend is running."
        );
    }

    #[test]
    fn test_import_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("household.json");
        std::fs::write(
            &json,
            r#"{"financialProfile": {"familyName": "Sharma", "totalSavings": "40000"},
                "members": [{"fullName": "Ravi", "isEarner": true, "monthlyIncome": 25000}]}"#,
        )
        .unwrap();
        let import = ProfileImport::from_file(&json).unwrap();
        assert_eq!(import.financial_profile.total_savings, Some(40000.0));
        assert_eq!(import.members.len(), 1);

        let toml_path = dir.path().join("household.toml");
        std::fs::write(
            &toml_path,
            "[financialProfile]\nfamilyName = \"Verma\"\nmonthlyExpenses = 18000\n",
        )
        .unwrap();
        let import = ProfileImport::from_file(&toml_path).unwrap();
        assert_eq!(import.financial_profile.monthly_expenses, Some(18000.0));
        assert!(import.members.is_empty());
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let err = ProfileImport::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid profile file"));
        assert!(ProfileImport::from_file(&dir.path().join("missing.json")).is_err());
    }
}
