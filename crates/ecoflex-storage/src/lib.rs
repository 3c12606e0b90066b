//! # ecoflex-storage
//!
//! Persistence for EcoFlex.
//!
//! The [`EcoflexStore`] trait is what the HTTP server programs against; the
//! [`SqliteStore`] implementation keeps everything in one SQLite database
//! through `sqlx`. Each account owns at most one financial profile, an
//! ordered list of family members and one tracker entry per month.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
mod rows;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use ecoflex_core::{FamilyMember, FinancialProfile, NewUser, ResilienceEntry, User};

pub use error::{Error, Result};
pub use sqlite::SqliteStore;

/// Storage operations used by the REST handlers.
#[async_trait]
pub trait EcoflexStore: Send + Sync {
    /// Verifies the database answers.
    async fn ping(&self) -> Result<()>;

    /// Inserts an account. Fails with [`Error::Duplicate`] when the username
    /// or e-mail is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Whether an account with this username exists.
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Whether an account with this e-mail exists.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Looks an account up by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Looks an account up by id.
    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    /// The account's financial profile, if saved.
    async fn financial_profile(&self, user_id: i64) -> Result<Option<FinancialProfile>>;

    /// Creates or overwrites the account's financial profile and stamps
    /// `updated_at`.
    async fn upsert_financial_profile(
        &self,
        user_id: i64,
        profile: &FinancialProfile,
    ) -> Result<FinancialProfile>;

    /// Family members in the order they were saved.
    async fn members(&self, user_id: i64) -> Result<Vec<FamilyMember>>;

    /// Replaces all family members atomically and returns them with ids.
    async fn replace_members(
        &self,
        user_id: i64,
        members: &[FamilyMember],
    ) -> Result<Vec<FamilyMember>>;

    /// Tracker entry for one month (first day of the month).
    async fn tracker_entry(
        &self,
        user_id: i64,
        month: NaiveDate,
    ) -> Result<Option<ResilienceEntry>>;

    /// Creates or overwrites the entry for `entry.month`.
    async fn upsert_tracker_entry(
        &self,
        user_id: i64,
        entry: &ResilienceEntry,
    ) -> Result<ResilienceEntry>;

    /// All tracker entries, oldest month first.
    async fn tracker_history(&self, user_id: i64) -> Result<Vec<ResilienceEntry>>;
}
