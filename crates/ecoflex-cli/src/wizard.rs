//! Two-step profile wizard: Household & Finance, then Members & Income.
//!
//! [`Wizard`] is the form state and its transitions. [`run`] drives it from
//! a [`Prompter`] and saves each step through a [`ProfileSink`]; the
//! household is saved before the members step opens, and the member list
//! is saved as a whole when the wizard completes.

use async_trait::async_trait;
use ecoflex_client::EcoflexClient;
use ecoflex_core::api::ProfileView;
use ecoflex_core::{FamilyMember, FinancialProfile, IncomeStability, IncomeType};

use crate::prompt::{Prompter, PrompterExt};
use crate::{Error, Result};

/// Where the wizard is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Address and money summary.
    Household,
    /// People in the household.
    Members,
    /// Both steps saved.
    Done,
}

impl Step {
    /// Title shown above the step.
    pub fn title(&self) -> &'static str {
        match self {
            Step::Household => "1. Household & Finance",
            Step::Members => "2. Members & Income",
            Step::Done => "Profile setup complete",
        }
    }
}

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// Wizard form state.
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    step: Step,
    household: FinancialProfile,
    members: Vec<FamilyMember>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    /// Blank wizard with one empty member row.
    pub fn new() -> Self {
        Self {
            step: Step::Household,
            household: FinancialProfile::default(),
            members: vec![FamilyMember {
                gender: Some(GENDERS[0].to_string()),
                income_stability: Some(IncomeStability::Stable),
                ..Default::default()
            }],
        }
    }

    /// Wizard pre-filled with what the account already saved.
    pub fn from_profile(view: &ProfileView) -> Self {
        let mut wizard = Self::new();
        if let Some(profile) = &view.financial_profile {
            wizard.household = FinancialProfile {
                id: None,
                updated_at: None,
                ..profile.clone()
            };
        }
        if !view.members.is_empty() {
            wizard.members = view
                .members
                .iter()
                .map(|m| FamilyMember { id: None, ..m.clone() })
                .collect();
        }
        wizard
    }

    /// Current step.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Household being edited.
    pub fn household(&self) -> &FinancialProfile {
        &self.household
    }

    /// Mutable household.
    pub fn household_mut(&mut self) -> &mut FinancialProfile {
        &mut self.household
    }

    /// Member rows.
    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    /// Mutable member row.
    pub fn member_mut(&mut self, index: usize) -> Option<&mut FamilyMember> {
        self.members.get_mut(index)
    }

    /// Step-one fields that are still empty, by label.
    pub fn missing_household_fields(&self) -> Vec<&'static str> {
        let h = &self.household;
        [
            ("Total Savings", h.total_savings),
            ("Total Debt", h.total_debt),
            ("Monthly Expenses", h.monthly_expenses),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(label, _)| label)
        .collect()
    }

    /// Appends an empty member row and returns its index.
    pub fn add_member(&mut self) -> usize {
        self.members.push(FamilyMember {
            gender: Some(GENDERS[0].to_string()),
            income_type: Some(IncomeType::DailyWage),
            income_stability: Some(IncomeStability::Stable),
            ..Default::default()
        });
        self.members.len() - 1
    }

    /// Removes a row; the last remaining row cannot be removed.
    pub fn remove_member(&mut self, index: usize) -> Result<FamilyMember> {
        if self.members.len() <= 1 {
            return Err(Error::input("A household needs at least one member"));
        }
        if index >= self.members.len() {
            return Err(Error::input(format!("There is no member {}", index + 1)));
        }
        Ok(self.members.remove(index))
    }

    /// Household was saved; open the members step.
    pub fn household_saved(&mut self) {
        if self.step == Step::Household {
            self.step = Step::Members;
        }
    }

    /// Return to the household step.
    pub fn back(&mut self) {
        if self.step == Step::Members {
            self.step = Step::Household;
        }
    }

    /// Members were saved; the wizard is finished.
    pub fn members_saved(&mut self) {
        if self.step == Step::Members {
            self.step = Step::Done;
        }
    }
}

/// Where the wizard's steps are saved.
#[async_trait]
pub trait ProfileSink: Send + Sync {
    /// Saves step one.
    async fn save_household(&self, household: &FinancialProfile) -> Result<()>;

    /// Replaces the member list.
    async fn save_members(&self, members: &[FamilyMember]) -> Result<()>;
}

#[async_trait]
impl ProfileSink for EcoflexClient {
    async fn save_household(&self, household: &FinancialProfile) -> Result<()> {
        self.save_financial_profile(household).await?;
        Ok(())
    }

    async fn save_members(&self, members: &[FamilyMember]) -> Result<()> {
        EcoflexClient::save_members(self, members).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberAction {
    Edit,
    Add,
    Remove,
    Back,
    Save,
}

const MEMBER_ACTIONS: [(MemberAction, &str); 5] = [
    (MemberAction::Edit, "Edit a member"),
    (MemberAction::Add, "➕ Add member"),
    (MemberAction::Remove, "Remove a member"),
    (MemberAction::Back, "← Back"),
    (MemberAction::Save, "✅ Complete setup"),
];

/// Runs the wizard until both steps are saved.
pub async fn run<P, S>(wizard: &mut Wizard, prompter: &mut P, sink: &S) -> Result<()>
where
    P: Prompter + ?Sized,
    S: ProfileSink + ?Sized,
{
    loop {
        match wizard.step() {
            Step::Household => {
                prompter.say(&format!("\n{}", Step::Household.title()))?;
                edit_household(prompter, wizard.household_mut())?;
                match sink.save_household(wizard.household()).await {
                    Ok(()) => {
                        tracing::debug!("household saved");
                        wizard.household_saved();
                    }
                    Err(e) => {
                        prompter.say(&format!(
                            "❌ Failed to save financial data: {}",
                            e.user_message()
                        ))?;
                        if !prompter.confirm("Try again?", true)? {
                            return Err(e);
                        }
                    }
                }
            }
            Step::Members => {
                prompter.say(&format!("\n{}", Step::Members.title()))?;
                for (i, m) in wizard.members().iter().enumerate() {
                    prompter.say(&format!("  {}. {}", i + 1, member_summary(m)))?;
                }
                let unnamed = wizard.members().iter().any(|m| m.full_name.is_none());
                let default = if unnamed { 0 } else { 4 };
                match prompter.choose("What next", &MEMBER_ACTIONS, default)? {
                    MemberAction::Edit => {
                        let index = pick_member(prompter, wizard.members().len())?;
                        if let Some(member) = wizard.member_mut(index) {
                            edit_member(prompter, member)?;
                        }
                    }
                    MemberAction::Add => {
                        let index = wizard.add_member();
                        if let Some(member) = wizard.member_mut(index) {
                            edit_member(prompter, member)?;
                        }
                    }
                    MemberAction::Remove => {
                        let index = pick_member(prompter, wizard.members().len())?;
                        if let Err(e) = wizard.remove_member(index) {
                            prompter.say(&e.user_message())?;
                        }
                    }
                    MemberAction::Back => wizard.back(),
                    MemberAction::Save => match sink.save_members(wizard.members()).await {
                        Ok(()) => {
                            wizard.members_saved();
                            prompter.say("✅ Profile setup complete!")?;
                        }
                        Err(e) => {
                            prompter.say(&format!(
                                "❌ Failed to save members: {}",
                                e.user_message()
                            ))?;
                        }
                    },
                }
            }
            Step::Done => return Ok(()),
        }
    }
}

fn pick_member<P: Prompter + ?Sized>(prompter: &mut P, count: usize) -> Result<usize> {
    if count <= 1 {
        return Ok(0);
    }
    loop {
        let n = prompter.parsed_required::<usize>("Member number", None)?;
        if (1..=count).contains(&n) {
            return Ok(n - 1);
        }
        prompter.say(&format!("Pick a member from 1 to {count}"))?;
    }
}

fn member_summary(m: &FamilyMember) -> String {
    let name = m.full_name.as_deref().unwrap_or("(new member)");
    if m.is_earner {
        format!(
            "{name} - earner, {}",
            m.monthly_income
                .map_or_else(|| "income not set".to_string(), |v| format!("₹{v}/month"))
        )
    } else {
        format!("{name} - dependent")
    }
}

fn edit_household<P: Prompter + ?Sized>(p: &mut P, h: &mut FinancialProfile) -> Result<()> {
    h.family_name = p.text("Family Name", h.family_name.as_deref())?;
    h.city = p.text("City", h.city.as_deref())?;
    h.state = p.text("State", h.state.as_deref())?;
    h.pincode = p.text("Pincode", h.pincode.as_deref())?;
    h.address = p.text("Address", h.address.as_deref())?;
    h.total_savings = Some(p.parsed_required("Total Savings (₹)", h.total_savings)?);
    h.total_debt = Some(p.parsed_required("Total Debt (₹)", h.total_debt)?);
    h.monthly_expenses = Some(p.parsed_required("Monthly Expenses (₹)", h.monthly_expenses)?);
    h.rent_amount = p.parsed("Rent (₹, optional)", h.rent_amount)?;
    h.school_fees = p.parsed("School Fees (₹, optional)", h.school_fees)?;
    h.emi_amount = p.parsed("EMI (₹, optional)", h.emi_amount)?;
    Ok(())
}

fn edit_member<P: Prompter + ?Sized>(p: &mut P, m: &mut FamilyMember) -> Result<()> {
    m.full_name = p.text("Full Name", m.full_name.as_deref())?;
    m.age = p.parsed("Age", m.age)?;

    let genders: Vec<(&str, &str)> = GENDERS.iter().map(|g| (*g, *g)).collect();
    let current = m
        .gender
        .as_deref()
        .and_then(|g| GENDERS.iter().position(|x| x.eq_ignore_ascii_case(g)))
        .unwrap_or(0);
    m.gender = Some(p.choose("Gender", &genders, current)?.to_string());

    m.education_level = p.text("Education Level", m.education_level.as_deref())?;
    m.is_earner = p.confirm("Is this member an earner?", m.is_earner)?;

    if m.is_earner {
        let types: Vec<(IncomeType, &str)> =
            IncomeType::ALL.iter().map(|t| (*t, t.label())).collect();
        let current = m
            .income_type
            .and_then(|t| IncomeType::ALL.iter().position(|x| *x == t))
            .unwrap_or(0);
        m.income_type = Some(p.choose("Income Type", &types, current)?);
        m.monthly_income = p.parsed("Monthly Income (₹)", m.monthly_income)?;

        let levels: Vec<(IncomeStability, &str)> = IncomeStability::ALL
            .iter()
            .map(|s| (*s, s.label()))
            .collect();
        let current = m
            .income_stability
            .and_then(|s| IncomeStability::ALL.iter().position(|x| *x == s))
            .unwrap_or(0);
        m.income_stability = Some(p.choose("Income Stability", &levels, current)?);
        m.skills = p.text("Skills (comma separated)", m.skills.as_deref())?;
    } else {
        m.income_type = None;
        m.monthly_income = None;
    }
    Ok(())
}
