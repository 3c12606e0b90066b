//! Core records for EcoFlex households.

mod household;
mod tracker;
mod user;

pub use household::{FamilyMember, FinancialProfile, IncomeStability, IncomeType};
pub use tracker::{ResilienceEntry, first_of_month, previous_month};
pub use user::{NewUser, Role, User};
