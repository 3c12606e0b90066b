//! SQLite implementation of [`EcoflexStore`].

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ecoflex_core::{FamilyMember, FinancialProfile, NewUser, ResilienceEntry, User};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::rows::{MemberRow, ProfileRow, TrackerRow, UserRow};
use crate::{EcoflexStore, Error, Result};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        phone         TEXT,
        role          TEXT NOT NULL,
        name          TEXT,
        city          TEXT,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS financial_profiles (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id          INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
        family_name      TEXT,
        address          TEXT,
        city             TEXT,
        state            TEXT,
        pincode          TEXT,
        total_savings    REAL,
        total_debt       REAL,
        monthly_expenses REAL,
        rent_amount      REAL,
        school_fees      REAL,
        emi_amount       REAL,
        updated_at       TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS family_members (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        position         INTEGER NOT NULL,
        full_name        TEXT,
        age              INTEGER,
        gender           TEXT,
        education_level  TEXT,
        is_earner        BOOLEAN NOT NULL DEFAULT 0,
        income_type      TEXT,
        monthly_income   REAL,
        income_stability TEXT,
        skills           TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_family_members_user ON family_members(user_id, position)",
    r#"
    CREATE TABLE IF NOT EXISTS resilience_entries (
        id                     INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id                INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        month                  TEXT NOT NULL,
        total_income           REAL NOT NULL,
        total_expenses         REAL NOT NULL,
        total_savings          REAL NOT NULL,
        total_debt             REAL NOT NULL,
        income_source_count    INTEGER NOT NULL,
        skill_count            INTEGER NOT NULL,
        dependent_count        INTEGER NOT NULL,
        earner_count           INTEGER NOT NULL,
        emergency_fund_ratio   REAL NOT NULL,
        debt_burden_ratio      REAL NOT NULL,
        income_diversity_score REAL NOT NULL,
        skill_score            REAL NOT NULL,
        resilience_score       REAL NOT NULL,
        created_at             TEXT NOT NULL,
        UNIQUE (user_id, month)
    )
    "#,
];

const USER_COLUMNS: &str =
    "id, username, email, phone, role, name, city, password_hash, created_at";

const PROFILE_COLUMNS: &str = "id, family_name, address, city, state, pincode, total_savings, \
     total_debt, monthly_expenses, rent_amount, school_fees, emi_amount, updated_at";

const MEMBER_COLUMNS: &str = "id, full_name, age, gender, education_level, is_earner, \
     income_type, monthly_income, income_stability, skills";

const TRACKER_COLUMNS: &str = "id, month, total_income, total_expenses, total_savings, \
     total_debt, income_source_count, skill_count, dependent_count, earner_count, \
     emergency_fund_ratio, debt_burden_ratio, income_diversity_score, skill_score, \
     resilience_score, created_at";

/// [`EcoflexStore`] backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an existing pool. Call [`SqliteStore::migrate`] before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and migrates it.
    ///
    /// `url` is a sqlx SQLite URL such as `sqlite://ecoflex.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory database exists per connection, so it must not be
        // spread across a pool.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Fresh in-memory database, already migrated.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Expose underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates all tables and indexes that do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!(statements = SCHEMA.len(), "database schema ready");
        Ok(())
    }
}

#[async_trait]
impl EcoflexStore for SqliteStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (username, email, phone, role, name, city, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.city)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from_insert)?;
        tracing::debug!(username = %user.username, "created user");
        row.try_into()
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn financial_profile(&self, user_id: i64) -> Result<Option<FinancialProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM financial_profiles WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FinancialProfile::from))
    }

    async fn upsert_financial_profile(
        &self,
        user_id: i64,
        profile: &FinancialProfile,
    ) -> Result<FinancialProfile> {
        let row: ProfileRow = sqlx::query_as(&format!(
            "INSERT INTO financial_profiles
                (user_id, family_name, address, city, state, pincode, total_savings,
                 total_debt, monthly_expenses, rent_amount, school_fees, emi_amount, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                family_name = excluded.family_name,
                address = excluded.address,
                city = excluded.city,
                state = excluded.state,
                pincode = excluded.pincode,
                total_savings = excluded.total_savings,
                total_debt = excluded.total_debt,
                monthly_expenses = excluded.monthly_expenses,
                rent_amount = excluded.rent_amount,
                school_fees = excluded.school_fees,
                emi_amount = excluded.emi_amount,
                updated_at = excluded.updated_at
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&profile.family_name)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.pincode)
        .bind(profile.total_savings)
        .bind(profile.total_debt)
        .bind(profile.monthly_expenses)
        .bind(profile.rent_amount)
        .bind(profile.school_fees)
        .bind(profile.emi_amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn members(&self, user_id: i64) -> Result<Vec<FamilyMember>> {
        let rows: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM family_members WHERE user_id = ? ORDER BY position, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FamilyMember::try_from).collect()
    }

    async fn replace_members(
        &self,
        user_id: i64,
        members: &[FamilyMember],
    ) -> Result<Vec<FamilyMember>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM family_members WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(members.len());
        for (position, member) in members.iter().enumerate() {
            let row: MemberRow = sqlx::query_as(&format!(
                "INSERT INTO family_members
                    (user_id, position, full_name, age, gender, education_level, is_earner,
                     income_type, monthly_income, income_stability, skills)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING {MEMBER_COLUMNS}"
            ))
            .bind(user_id)
            .bind(position as i64)
            .bind(&member.full_name)
            .bind(member.age.map(i64::from))
            .bind(&member.gender)
            .bind(&member.education_level)
            .bind(member.is_earner)
            .bind(member.income_type.map(|t| t.as_str()))
            .bind(member.monthly_income)
            .bind(member.income_stability.map(|s| s.as_str()))
            .bind(&member.skills)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(FamilyMember::try_from(row)?);
        }

        tx.commit().await?;
        tracing::debug!(user_id, count = saved.len(), "replaced family members");
        Ok(saved)
    }

    async fn tracker_entry(
        &self,
        user_id: i64,
        month: NaiveDate,
    ) -> Result<Option<ResilienceEntry>> {
        let row: Option<TrackerRow> = sqlx::query_as(&format!(
            "SELECT {TRACKER_COLUMNS} FROM resilience_entries WHERE user_id = ? AND month = ?"
        ))
        .bind(user_id)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ResilienceEntry::from))
    }

    async fn upsert_tracker_entry(
        &self,
        user_id: i64,
        entry: &ResilienceEntry,
    ) -> Result<ResilienceEntry> {
        // created_at is kept from the first save of the month.
        let row: TrackerRow = sqlx::query_as(&format!(
            "INSERT INTO resilience_entries
                (user_id, month, total_income, total_expenses, total_savings, total_debt,
                 income_source_count, skill_count, dependent_count, earner_count,
                 emergency_fund_ratio, debt_burden_ratio, income_diversity_score,
                 skill_score, resilience_score, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id, month) DO UPDATE SET
                total_income = excluded.total_income,
                total_expenses = excluded.total_expenses,
                total_savings = excluded.total_savings,
                total_debt = excluded.total_debt,
                income_source_count = excluded.income_source_count,
                skill_count = excluded.skill_count,
                dependent_count = excluded.dependent_count,
                earner_count = excluded.earner_count,
                emergency_fund_ratio = excluded.emergency_fund_ratio,
                debt_burden_ratio = excluded.debt_burden_ratio,
                income_diversity_score = excluded.income_diversity_score,
                skill_score = excluded.skill_score,
                resilience_score = excluded.resilience_score
             RETURNING {TRACKER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(entry.month)
        .bind(entry.total_income)
        .bind(entry.total_expenses)
        .bind(entry.total_savings)
        .bind(entry.total_debt)
        .bind(i64::from(entry.income_source_count))
        .bind(i64::from(entry.skill_count))
        .bind(i64::from(entry.dependent_count))
        .bind(i64::from(entry.earner_count))
        .bind(entry.emergency_fund_ratio)
        .bind(entry.debt_burden_ratio)
        .bind(entry.income_diversity_score)
        .bind(entry.skill_score)
        .bind(entry.resilience_score)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn tracker_history(&self, user_id: i64) -> Result<Vec<ResilienceEntry>> {
        let rows: Vec<TrackerRow> = sqlx::query_as(&format!(
            "SELECT {TRACKER_COLUMNS} FROM resilience_entries WHERE user_id = ? ORDER BY month ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ResilienceEntry::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ecoflex_core::{IncomeStability, IncomeType, Role};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            phone: Some("9876543210".into()),
            role: Role::Family,
            name: Some("Asha".into()),
            city: None,
            password_hash: "$argon2id$v=19$stub".into(),
        }
    }

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    fn entry(m: u32, savings: f64, score: f64) -> ResilienceEntry {
        ResilienceEntry {
            id: None,
            month: month(m),
            total_income: 30000.0,
            total_expenses: 20000.0,
            total_savings: savings,
            total_debt: 0.0,
            income_source_count: 2,
            skill_count: 3,
            dependent_count: 1,
            earner_count: 2,
            emergency_fund_ratio: savings / 20000.0,
            debt_burden_ratio: 0.0,
            income_diversity_score: 2.0 / 3.0,
            skill_score: 0.6,
            resilience_score: score,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user(&new_user("asha", "asha@example.org")).await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.role, Role::Family);
        assert!(user.created_at.is_some());

        let found = store.find_user_by_username("asha").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, "$argon2id$v=19$stub");
        assert_eq!(store.find_user(user.id).await.unwrap().unwrap().username, "asha");
        assert!(store.find_user_by_username("nobody").await.unwrap().is_none());

        assert!(store.username_exists("asha").await.unwrap());
        assert!(store.email_exists("asha@example.org").await.unwrap());
        assert!(!store.email_exists("other@example.org").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.create_user(&new_user("asha", "asha@example.org")).await.unwrap();

        let err = store
            .create_user(&new_user("asha", "second@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { ref field } if field == "username"));

        let err = store
            .create_user(&new_user("ravi", "asha@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { ref field } if field == "email"));
    }

    #[tokio::test]
    async fn test_financial_profile_upsert_keeps_one_row() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user(&new_user("asha", "asha@example.org")).await.unwrap();
        assert!(store.financial_profile(user.id).await.unwrap().is_none());

        let first = store
            .upsert_financial_profile(
                user.id,
                &FinancialProfile {
                    family_name: Some("Sharma".into()),
                    total_savings: Some(40000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = store
            .upsert_financial_profile(
                user.id,
                &FinancialProfile {
                    family_name: Some("Sharma".into()),
                    total_savings: Some(45000.0),
                    monthly_expenses: Some(20000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.updated_at.is_some());

        let loaded = store.financial_profile(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_savings, Some(45000.0));
        assert_eq!(loaded.monthly_expenses, Some(20000.0));
        assert_eq!(loaded.total_debt, None);
    }

    #[tokio::test]
    async fn test_replace_members_preserves_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user(&new_user("asha", "asha@example.org")).await.unwrap();

        let members = vec![
            FamilyMember {
                full_name: Some("Ravi".into()),
                age: Some(42),
                is_earner: true,
                income_type: Some(IncomeType::Salary),
                monthly_income: Some(25000.0),
                income_stability: Some(IncomeStability::Stable),
                skills: Some("Driving".into()),
                ..Default::default()
            },
            FamilyMember {
                full_name: Some("Meera".into()),
                age: Some(9),
                ..Default::default()
            },
        ];
        let saved = store.replace_members(user.id, &members).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|m| m.id.is_some()));

        let replacement = vec![FamilyMember {
            full_name: Some("Asha".into()),
            is_earner: true,
            income_type: Some(IncomeType::SelfEmployed),
            ..Default::default()
        }];
        store.replace_members(user.id, &replacement).await.unwrap();

        let loaded = store.members(user.id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].full_name.as_deref(), Some("Asha"));
        assert_eq!(loaded[0].income_type, Some(IncomeType::SelfEmployed));
    }

    #[tokio::test]
    async fn test_members_are_per_user() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = store.create_user(&new_user("a", "a@example.org")).await.unwrap();
        let b = store.create_user(&new_user("b", "b@example.org")).await.unwrap();
        store
            .replace_members(a.id, &[FamilyMember::default()])
            .await
            .unwrap();
        assert!(store.members(b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tracker_upsert_and_history_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store.create_user(&new_user("asha", "asha@example.org")).await.unwrap();

        store.upsert_tracker_entry(user.id, &entry(3, 12000.0, 50.0)).await.unwrap();
        store.upsert_tracker_entry(user.id, &entry(1, 10000.0, 40.0)).await.unwrap();
        let first = store.upsert_tracker_entry(user.id, &entry(2, 11000.0, 45.0)).await.unwrap();
        let again = store.upsert_tracker_entry(user.id, &entry(2, 11500.0, 47.0)).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.created_at, again.created_at);

        let history = store.tracker_history(user.id).await.unwrap();
        let months: Vec<NaiveDate> = history.iter().map(|e| e.month).collect();
        assert_eq!(months, vec![month(1), month(2), month(3)]);
        assert_eq!(history[1].total_savings, 11500.0);
        assert_eq!(history[1].resilience_score, 47.0);

        let feb = store.tracker_entry(user.id, month(2)).await.unwrap().unwrap();
        assert_eq!(feb.skill_count, 3);
        assert!(store.tracker_entry(user.id, month(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.ping().await.unwrap();
    }
}
