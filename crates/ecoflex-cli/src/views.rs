//! Terminal renderings of API results.
//!
//! Every function returns the finished text; callers print it. Colours come
//! from `console` and switch off by themselves when stdout is not a
//! terminal.

use std::fmt::Write as _;

use console::{StyledObject, style};
use ecoflex_core::ResilienceEntry;
use ecoflex_core::api::ProfileView;
use ecoflex_core::formula::{
    EconomicScore, EfsRisk, OpportunityOutcome, RiskLevel, ShockKind, ShockOutcome, format_amount,
};

/// One dashboard entry: icon, title, blurb and the command that opens it.
pub struct FeatureCard {
    /// Emoji shown before the title.
    pub icon: &'static str,
    /// Card title.
    pub title: &'static str,
    /// One-line description.
    pub blurb: &'static str,
    /// Command to run.
    pub command: &'static str,
}

/// The four tools offered on the dashboard.
pub const FEATURE_CARDS: [FeatureCard; 4] = [
    FeatureCard {
        icon: "📊",
        title: "Economic Stability",
        blurb: "View your Economic Flexibility Score and risk level breakdown.",
        command: "ecoflex score",
    },
    FeatureCard {
        icon: "⚡",
        title: "Shock Simulation Lab",
        blurb: "Simulate financial crises and compare survival strategies.",
        command: "ecoflex shock",
    },
    FeatureCard {
        icon: "🌱",
        title: "Opportunity Mode",
        blurb: "Test future growth decisions before committing resources.",
        command: "ecoflex opportunity --cost <amount> --increase <amount>",
    },
    FeatureCard {
        icon: "🏆",
        title: "Resilience Tracker",
        blurb: "Track monthly habits and watch your financial strength grow.",
        command: "ecoflex track record / ecoflex track history",
    },
];

/// Colour band of a score or risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Red.
    Weak,
    /// Orange (rendered yellow).
    Fair,
    /// Green.
    Strong,
}

impl Band {
    /// Band of a bar in the resilience trend chart.
    pub fn for_trend(score: f64) -> Self {
        if score < 40.0 {
            Band::Weak
        } else if score < 70.0 {
            Band::Fair
        } else {
            Band::Strong
        }
    }

    /// Band of a score cell in the history table.
    pub fn for_history_cell(score: f64) -> Self {
        if score > 60.0 {
            Band::Strong
        } else if score > 40.0 {
            Band::Fair
        } else {
            Band::Weak
        }
    }

    fn paint<D>(self, text: D) -> StyledObject<D> {
        match self {
            Band::Weak => style(text).red(),
            Band::Fair => style(text).yellow(),
            Band::Strong => style(text).green(),
        }
    }
}

impl From<RiskLevel> for Band {
    fn from(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Band::Weak,
            RiskLevel::Medium => Band::Fair,
            RiskLevel::Low => Band::Strong,
        }
    }
}

impl From<EfsRisk> for Band {
    fn from(risk: EfsRisk) -> Self {
        match risk {
            EfsRisk::HighRisk => Band::Weak,
            EfsRisk::Moderate => Band::Fair,
            EfsRisk::Strong => Band::Strong,
        }
    }
}

fn money(value: f64) -> String {
    format!("₹{}", format_amount(value))
}

fn heading(text: &str) -> String {
    style(text).bold().to_string()
}

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {label:<22} {value}");
}

/// Landing screen after login.
pub fn dashboard(username: &str, profile: Option<&ProfileView>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&format!("Welcome to EcoFlex, {username}")));
    let _ = writeln!(out, "Your Personal Economic Decision Intelligence Platform");
    let _ = writeln!(out);
    match profile {
        Some(p) if p.profile_complete => {
            let _ = writeln!(
                out,
                "⚙️  Setup / Update My Profile: ecoflex profile wizard"
            );
        }
        _ => {
            let _ = writeln!(
                out,
                "{} run `ecoflex profile wizard` to set up your household first.",
                style("⚙️  Your profile is not complete:").yellow()
            );
        }
    }
    for card in &FEATURE_CARDS {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} {}", card.icon, style(card.title).bold());
        let _ = writeln!(out, "   {}", card.blurb);
        let _ = writeln!(out, "   {}", style(card.command).dim());
    }
    out
}

/// Saved account, household and members.
pub fn profile(view: &ProfileView) -> String {
    let mut out = String::new();
    let user = &view.user;
    let _ = writeln!(out, "{}", heading("Account"));
    row(&mut out, "Username", &user.username);
    row(&mut out, "Email", &user.email);
    row(&mut out, "Role", user.role);
    if !user.name.is_empty() {
        row(&mut out, "Name", &user.name);
    }
    if !user.city.is_empty() {
        row(&mut out, "City", &user.city);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("1. Household & Finance"));
    match &view.financial_profile {
        None => {
            let _ = writeln!(out, "  (not saved yet)");
        }
        Some(fp) => {
            let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
            let amount = |v: Option<f64>| v.map_or_else(|| "-".into(), money);
            row(&mut out, "Family Name", text(&fp.family_name));
            let place: Vec<String> = [&fp.address, &fp.city, &fp.state, &fp.pincode]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect();
            row(&mut out, "Address", if place.is_empty() { "-".into() } else { place.join(", ") });
            row(&mut out, "Total Savings", amount(fp.total_savings));
            row(&mut out, "Total Debt", amount(fp.total_debt));
            row(&mut out, "Monthly Expenses", amount(fp.monthly_expenses));
            row(&mut out, "Rent", amount(fp.rent_amount));
            row(&mut out, "School Fees", amount(fp.school_fees));
            row(&mut out, "EMI", amount(fp.emi_amount));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("2. Members & Income"));
    if view.members.is_empty() {
        let _ = writeln!(out, "  (no members saved yet)");
    }
    for (i, m) in view.members.iter().enumerate() {
        let name = m.full_name.as_deref().unwrap_or("(unnamed)");
        let mut line = format!("  {}. {name}", i + 1);
        if let Some(age) = m.age {
            let _ = write!(line, ", {age}");
        }
        if let Some(gender) = m.gender.as_deref().filter(|g| !g.is_empty()) {
            let _ = write!(line, ", {gender}");
        }
        if m.is_earner {
            let kind = m.income_type.map_or("Earner", |t| t.label());
            let _ = write!(line, " | {kind} {}/month", money(m.income()));
            if let Some(stability) = m.income_stability {
                let _ = write!(line, " ({})", stability.label());
            }
        } else {
            line.push_str(" | dependent");
        }
        if let Some(skills) = m.skills.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = write!(line, " | skills: {skills}");
        }
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(out);
    if view.profile_complete {
        let _ = writeln!(out, "{}", style("Profile complete").green());
    } else {
        let _ = writeln!(
            out,
            "{}",
            style("Profile incomplete: run `ecoflex profile wizard`").yellow()
        );
    }
    out
}

/// Economic Flexibility Score breakdown.
pub fn economic_score(score: &EconomicScore) -> String {
    let band = Band::from(score.risk_level);
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading("📊 Economic Stability"));
    let _ = writeln!(
        out,
        "  Economic Flexibility Score: {}  {}",
        band.paint(score.economic_flexibility_score).bold(),
        band.paint(score.risk_level)
    );
    let _ = writeln!(out);
    row(&mut out, "Survival Months", score.survival_months);
    row(&mut out, "Emergency Buffer", score.emergency_buffer_ratio);
    row(&mut out, "Income Diversity", score.income_diversity_score);
    row(&mut out, "Dependency Ratio", score.dependency_ratio);
    row(&mut out, "Stability Factor", score.income_stability_factor);
    row(&mut out, "Skill Score", score.skill_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("Summary"));
    row(&mut out, "Total Monthly Income", money(score.total_income));
    row(&mut out, "Monthly Expenses", money(score.total_expenses));
    row(&mut out, "Total Savings", money(score.total_savings));
    row(&mut out, "Total Debt", money(score.total_debt));
    row(&mut out, "Earners", score.earner_count);
    row(&mut out, "Dependents", score.dependent_count);
    out
}

fn shock_label(kind: &ShockKind) -> String {
    let icon = match kind {
        ShockKind::JobLoss => "💀",
        ShockKind::IncomeDrop20 | ShockKind::IncomeDrop30 => "📉",
        ShockKind::MedicalEmergency => "🏥",
        ShockKind::MigrationCost => "🚚",
        ShockKind::SchoolFeeIncrease => "🎓",
        ShockKind::Custom(_) => "❓",
    };
    let name = match kind {
        ShockKind::MedicalEmergency => "Medical Emergency".to_string(),
        ShockKind::MigrationCost => "Migration Cost".to_string(),
        ShockKind::SchoolFeeIncrease => "School Fee Increase".to_string(),
        other => other.describe(0.0),
    };
    format!("{icon} {name}")
}

/// Built-in shocks and how to run them.
pub fn shock_menu() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading("⚡ Shock Simulation Lab"));
    for kind in ShockKind::BUILT_IN.iter() {
        let usage = if kind.takes_amount() {
            let unit = if *kind == ShockKind::SchoolFeeIncrease {
                "<amount per month>"
            } else {
                "<amount>"
            };
            format!("ecoflex shock {} --amount {unit}", kind.code())
        } else {
            format!("ecoflex shock {}", kind.code())
        };
        let _ = writeln!(out, "  {:<26} {}", shock_label(kind), style(usage).dim());
    }
    out
}

/// Outcome of a shock and the strategy comparison.
pub fn shock(outcome: &ShockOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&format!("⚡ {}", outcome.shock_type)));
    row(&mut out, "Original Income", money(outcome.original_income));
    row(&mut out, "New Income", money(outcome.new_income));
    row(&mut out, "Monthly Deficit", money(outcome.monthly_deficit));
    row(&mut out, "Survival Months", outcome.survival_months);
    row(
        &mut out,
        "Risk Level",
        Band::from(outcome.risk_level).paint(outcome.risk_level),
    );
    row(&mut out, "Savings Left", money(outcome.new_savings));

    if !outcome.strategies.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", heading("Survival Strategies"));
        let _ = writeln!(out, "  {:<36} {:>15}  {}", "Strategy", "Survival Months", "Risk Level");
        for s in &outcome.strategies {
            let _ = writeln!(
                out,
                "  {:<36} {:>15}  {}",
                s.strategy,
                s.survival_months.to_string(),
                Band::from(s.risk_level).paint(s.risk_level)
            );
        }
    }
    out
}

/// Break-even analysis of an opportunity.
pub fn opportunity(outcome: &OpportunityOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading("🌱 Opportunity Mode"));
    let verdict = if outcome.worth_it {
        style(&outcome.recommendation).green()
    } else {
        style(&outcome.recommendation).yellow()
    };
    let _ = writeln!(out, "  {verdict}");
    let _ = writeln!(out);
    row(&mut out, "Current Income", money(outcome.current_income));
    row(&mut out, "New Expected Income", money(outcome.new_expected_income));
    row(&mut out, "Investment Cost", money(outcome.investment_cost));
    let break_even = match outcome.break_even_months {
        ecoflex_core::formula::BreakEven::Months(m) => format!("{m} months"),
        other => other.to_string(),
    };
    row(&mut out, "Break-Even", break_even);
    row(
        &mut out,
        "Risk",
        Band::from(outcome.risk_level).paint(outcome.risk_level),
    );
    row(
        &mut out,
        "Survival Before/After",
        format!(
            "{} / {} months",
            outcome.survival_before_investment, outcome.survival_after_investment
        ),
    );
    row(
        &mut out,
        "Monthly Savings Before",
        money(outcome.monthly_savings_before),
    );
    row(
        &mut out,
        "Monthly Savings After",
        money(outcome.monthly_savings_after),
    );
    out
}

/// Confirmation after recording a month.
pub fn tracker_saved(score: f64) -> String {
    format!("✅ Saved! Resilience Score: {score}/100")
}

const BAR_WIDTH: f64 = 30.0;

fn bar(score: f64) -> String {
    let cells = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH).round() as usize;
    "█".repeat(cells.max(1))
}

fn month_label(entry: &ResilienceEntry) -> String {
    entry.month.format("%Y-%m").to_string()
}

/// Current score, trend chart and table of past months.
pub fn history(entries: &[ResilienceEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading("🏆 Resilience Tracker"));
    let Some(latest) = entries.last() else {
        let _ = writeln!(
            out,
            "  No monthly entries yet. Record one with `ecoflex track record`."
        );
        return out;
    };

    let current = latest.resilience_score.round();
    let _ = writeln!(
        out,
        "  Current Resilience Score: {}/100",
        Band::for_trend(current).paint(current).bold()
    );
    let _ = writeln!(out, "  Based on {} monthly entries", entries.len());

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heading("Trend"));
    for entry in entries {
        let score = entry.resilience_score;
        let _ = writeln!(
            out,
            "  {} {} {}",
            month_label(entry),
            Band::for_trend(score).paint(bar(score)),
            score.round()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:<8} {:>12} {:>12} {:>12} {:>12} {:>6}",
        "Month", "Income", "Expenses", "Savings", "Debt", "Score"
    );
    for entry in entries.iter().rev() {
        let score = format!("{:>6}", entry.resilience_score);
        let _ = writeln!(
            out,
            "  {:<8} {:>12} {:>12} {:>12} {:>12} {}",
            month_label(entry),
            money(entry.total_income),
            money(entry.total_expenses),
            money(entry.total_savings),
            money(entry.total_debt),
            Band::for_history_cell(entry.resilience_score).paint(score)
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ecoflex_core::api::UserView;
    use ecoflex_core::formula::{BreakEven, Strategy, Survival};
    use ecoflex_core::{FamilyMember, FinancialProfile, IncomeType, Role};

    fn plain(text: String) -> String {
        console::strip_ansi_codes(&text).into_owned()
    }

    fn entry(month: u32, score: f64) -> ResilienceEntry {
        ResilienceEntry {
            id: None,
            month: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            total_income: 30000.0,
            total_expenses: 20000.0,
            total_savings: 40000.0,
            total_debt: 5000.0,
            income_source_count: 2,
            skill_count: 3,
            dependent_count: 2,
            earner_count: 2,
            emergency_fund_ratio: 2.0,
            debt_burden_ratio: 0.17,
            income_diversity_score: 0.67,
            skill_score: 0.6,
            resilience_score: score,
            created_at: None,
        }
    }

    #[test]
    fn test_trend_bands() {
        assert_eq!(Band::for_trend(39.9), Band::Weak);
        assert_eq!(Band::for_trend(40.0), Band::Fair);
        assert_eq!(Band::for_trend(69.9), Band::Fair);
        assert_eq!(Band::for_trend(70.0), Band::Strong);
    }

    #[test]
    fn test_history_cell_bands() {
        assert_eq!(Band::for_history_cell(60.0), Band::Fair);
        assert_eq!(Band::for_history_cell(60.1), Band::Strong);
        assert_eq!(Band::for_history_cell(40.0), Band::Weak);
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar(0.0).chars().count(), 1);
        assert_eq!(bar(50.0).chars().count(), 15);
        assert_eq!(bar(100.0).chars().count(), 30);
        assert_eq!(bar(250.0).chars().count(), 30);
    }

    #[test]
    fn test_dashboard_lists_cards() {
        let text = plain(dashboard("asha", None));
        assert!(text.contains("Welcome to EcoFlex, asha"));
        assert!(text.contains("Your Personal Economic Decision Intelligence Platform"));
        assert!(text.contains("profile wizard"));
        for card in &FEATURE_CARDS {
            assert!(text.contains(card.title));
            assert!(text.contains(card.blurb));
        }
    }

    #[test]
    fn test_profile_view() {
        let view = ProfileView {
            user: UserView {
                id: 1,
                username: "asha".into(),
                email: "asha@example.com".into(),
                phone: None,
                role: Role::Family,
                name: String::new(),
                city: "Pune".into(),
            },
            financial_profile: Some(FinancialProfile {
                family_name: Some("Sharma".into()),
                total_savings: Some(40000.0),
                ..Default::default()
            }),
            members: vec![FamilyMember {
                full_name: Some("Ravi".into()),
                is_earner: true,
                income_type: Some(IncomeType::Salary),
                monthly_income: Some(25000.0),
                ..Default::default()
            }],
            profile_complete: true,
        };
        let text = plain(profile(&view));
        assert!(text.contains("Sharma"));
        assert!(text.contains("₹40000"));
        assert!(text.contains("1. Ravi | Fixed Salary ₹25000/month"));
        assert!(text.contains("Profile complete"));
    }

    #[test]
    fn test_score_view() {
        let score = EconomicScore {
            economic_flexibility_score: 1.12,
            risk_level: EfsRisk::Strong,
            emergency_buffer_ratio: 2.0,
            income_diversity_score: 0.67,
            dependency_ratio: 1.0,
            income_stability_factor: 0.9,
            skill_score: 0.4,
            total_income: 30000.0,
            total_expenses: 20000.0,
            total_savings: 40000.0,
            total_debt: 0.0,
            survival_months: 2.0,
            earner_count: 2,
            dependent_count: 2,
        };
        let text = plain(economic_score(&score));
        assert!(text.contains("1.12  STRONG"));
        assert!(text.contains("Total Monthly Income"));
        assert!(text.contains("₹30000"));
        assert!(text.contains("Dependents"));
    }

    #[test]
    fn test_shock_menu_lists_codes() {
        let text = plain(shock_menu());
        assert!(text.contains("💀 Complete Job Loss"));
        assert!(text.contains("📉 20% Income Drop"));
        assert!(text.contains("ecoflex shock MEDICAL_EMERGENCY --amount <amount>"));
        assert!(text.contains("SCHOOL_FEE_INCREASE --amount <amount per month>"));
    }

    #[test]
    fn test_shock_view() {
        let outcome = ShockOutcome {
            shock_type: "Complete Job Loss".into(),
            original_income: 30000.0,
            new_income: 0.0,
            original_expenses: 20000.0,
            new_expenses: 20000.0,
            new_savings: 40000.0,
            monthly_deficit: 20000.0,
            survival_months: Survival::Months(2.0),
            risk_level: RiskLevel::High,
            strategies: vec![Strategy {
                strategy: "Reduce expenses by 20%".into(),
                survival_months: Survival::Stable,
                risk_level: RiskLevel::Low,
            }],
        };
        let text = plain(shock(&outcome));
        assert!(text.contains("Complete Job Loss"));
        assert!(text.contains("Monthly Deficit"));
        assert!(text.contains("HIGH"));
        assert!(text.contains("Reduce expenses by 20%"));
        assert!(text.contains("Stable"));
    }

    #[test]
    fn test_opportunity_view() {
        let outcome = OpportunityOutcome {
            current_income: 30000.0,
            new_expected_income: 37000.0,
            investment_cost: 50000.0,
            break_even_months: BreakEven::Months(7.1),
            survival_before_investment: 2.0,
            survival_after_investment: 0.0,
            monthly_savings_before: 10000.0,
            monthly_savings_after: 17000.0,
            risk_level: RiskLevel::High,
            worth_it: false,
            recommendation: "High risk".into(),
        };
        let text = plain(opportunity(&outcome));
        assert!(text.contains("Break-Even"));
        assert!(text.contains("7.1 months"));
        assert!(text.contains("₹37000"));
        assert!(text.contains("2 / 0 months"));
    }

    #[test]
    fn test_history_view() {
        let text = plain(history(&[entry(4, 35.0), entry(5, 62.4)]));
        assert!(text.contains("Current Resilience Score: 62/100"));
        assert!(text.contains("Based on 2 monthly entries"));
        assert!(text.contains("2024-04"));
        assert!(text.contains("2024-05"));
        assert!(text.contains("Expenses"));
        // Newest month first in the table.
        let table = text.split("Month").nth(1).unwrap();
        assert!(table.find("2024-05").unwrap() < table.find("2024-04").unwrap());
    }

    #[test]
    fn test_empty_history() {
        let text = plain(history(&[]));
        assert!(text.contains("No monthly entries yet"));
    }

    #[test]
    fn test_tracker_saved_line() {
        assert_eq!(tracker_saved(72.5), "✅ Saved! Resilience Score: 72.5/100");
    }
}
