use proptest::prelude::*;

use super::{
    Opportunity, ResilienceInputs, ShockKind, Survival, economic_flexibility, resilience_score,
    round_to, simulate_opportunity, simulate_shock,
};
use crate::types::{FamilyMember, FinancialProfile, IncomeStability};

fn stability() -> impl Strategy<Value = Option<IncomeStability>> {
    prop_oneof![
        Just(None),
        Just(Some(IncomeStability::Stable)),
        Just(Some(IncomeStability::SemiStable)),
        Just(Some(IncomeStability::Seasonal)),
    ]
}

fn member() -> impl Strategy<Value = FamilyMember> {
    (any::<bool>(), 0.0..200_000.0f64, stability(), 0usize..8).prop_map(
        |(is_earner, income, income_stability, skills)| FamilyMember {
            is_earner,
            monthly_income: Some(income),
            income_stability,
            skills: Some(vec!["skill"; skills].join(",")),
            ..Default::default()
        },
    )
}

fn profile() -> impl Strategy<Value = FinancialProfile> {
    (
        proptest::option::of(0.0..5_000_000.0f64),
        proptest::option::of(0.0..200_000.0f64),
        proptest::option::of(0.0..5_000_000.0f64),
    )
        .prop_map(|(savings, expenses, debt)| FinancialProfile {
            total_savings: savings,
            monthly_expenses: expenses,
            total_debt: debt,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn efs_stays_within_bounds(fp in profile(), members in proptest::collection::vec(member(), 0..8)) {
        let score = economic_flexibility(&fp, &members);
        prop_assert!((0.0..=2.0).contains(&score.economic_flexibility_score));
        prop_assert!((0.0..=1.0).contains(&score.income_diversity_score));
        prop_assert!((0.0..=1.0).contains(&score.skill_score));
        prop_assert_eq!((score.earner_count + score.dependent_count) as usize, members.len());
    }

    #[test]
    fn shock_reports_four_strategies(
        fp in profile(),
        members in proptest::collection::vec(member(), 0..6),
        kind in prop::sample::select(ShockKind::BUILT_IN.to_vec()),
        amount in 0.0..100_000.0f64,
    ) {
        let out = simulate_shock(&fp, &members, &kind, amount);
        prop_assert_eq!(out.strategies.len(), 4);
        prop_assert!(out.new_savings >= 0.0);
        prop_assert!(out.monthly_deficit >= 0.0);
        if let Survival::Months(m) = out.survival_months {
            prop_assert!(m >= 0.0 && m <= 50.0);
        }
    }

    #[test]
    fn opportunity_survival_never_negative(
        fp in profile(),
        members in proptest::collection::vec(member(), 0..6),
        cost in 0.0..1_000_000.0f64,
        increase in 0.0..100_000.0f64,
        p in 0.0..=1.0f64,
    ) {
        let opp = Opportunity { investment_cost: cost, expected_income_increase: increase, success_probability: p };
        prop_assert!(opp.validate().is_ok());
        let out = simulate_opportunity(&fp, &members, &opp);
        prop_assert!(out.survival_after_investment >= 0.0);
        prop_assert!(out.survival_after_investment <= out.survival_before_investment);
    }

    #[test]
    fn resilience_stays_within_bounds(
        savings in 0.0..1e7f64,
        expenses in 0.0..1e6f64,
        income_sources in 0u32..10,
        skills in 0u32..20,
        delta_savings in -1e6..1e6f64,
        delta_debt in -1e6..1e6f64,
    ) {
        let score = resilience_score(&ResilienceInputs {
            savings, expenses, income_sources, skills, delta_savings, delta_debt,
        });
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn rounding_is_idempotent(x in -1e9..1e9f64, places in 0i32..4) {
        let once = round_to(x, places);
        prop_assert_eq!(round_to(once, places), once);
    }
}
