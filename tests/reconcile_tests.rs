// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tillclose::error::ValidationError;
use tillclose::models::{Amount, MAX_AMOUNT_UNITS};
use tillclose::reconcile::{CashCount, VarianceKind, reconcile};
use tillclose::{cli, commands::calc};

fn amt(units: i64, scale: u32) -> Amount {
    Amount::new(Decimal::new(units, scale)).unwrap()
}

fn count(opening: Amount, income: Amount, expense: Amount, counted: Amount) -> CashCount {
    CashCount {
        opening_cash: opening,
        cash_income: income,
        cash_expense: expense,
        counted_cash: counted,
    }
}

#[test]
fn balanced_day_is_exact() {
    let c = count(amt(100_000, 0), amt(50_000, 0), amt(10_000, 0), amt(140_000, 0));
    let r = reconcile(&c, "");
    assert_eq!(r.expected_cash, Decimal::from(140_000));
    assert_eq!(r.variance, Decimal::ZERO);
    assert_eq!(r.kind, VarianceKind::Exact);
    assert!(!r.requires_justification);
    assert!(r.is_valid);
}

#[test]
fn large_surplus_needs_a_note() {
    let c = count(Amount::ZERO, Amount::ZERO, Amount::ZERO, amt(25_000, 0));
    let r = reconcile(&c, "");
    assert_eq!(r.variance, Decimal::from(25_000));
    assert_eq!(r.kind, VarianceKind::Surplus);
    assert!(r.requires_justification);
    assert!(!r.is_valid);

    let r = reconcile(&c, "tip jar counted with the till");
    assert!(r.requires_justification);
    assert!(r.is_valid);
}

#[test]
fn small_shortage_never_needs_a_note() {
    let c = count(amt(50_000, 0), amt(20_000, 0), amt(5_000, 0), amt(64_999, 0));
    for note in ["", "   ", "one coin missing"] {
        let r = reconcile(&c, note);
        assert_eq!(r.expected_cash, Decimal::from(65_000));
        assert_eq!(r.variance, Decimal::from(-1));
        assert_eq!(r.kind, VarianceKind::Shortage);
        assert!(!r.requires_justification);
        assert!(r.is_valid);
    }
}

#[test]
fn threshold_is_exclusive() {
    let at = reconcile(&count(Amount::ZERO, Amount::ZERO, Amount::ZERO, amt(20_000, 0)), "");
    assert_eq!(at.variance, Decimal::from(20_000));
    assert!(!at.requires_justification);
    assert!(at.is_valid);

    let above = reconcile(
        &count(Amount::ZERO, Amount::ZERO, Amount::ZERO, amt(2_000_001, 2)),
        "",
    );
    assert_eq!(above.variance, Decimal::new(2_000_001, 2));
    assert!(above.requires_justification);
    assert!(!above.is_valid);

    // shortage of 20000.01
    let below = reconcile(
        &count(amt(2_000_001, 2), Amount::ZERO, Amount::ZERO, Amount::ZERO),
        "",
    );
    assert_eq!(below.variance, Decimal::new(-2_000_001, 2));
    assert!(below.requires_justification);
}

#[test]
fn whitespace_note_counts_as_empty() {
    let c = count(Amount::ZERO, Amount::ZERO, Amount::ZERO, amt(30_000, 0));
    assert!(!reconcile(&c, " \t\n ").is_valid);
}

fn calc_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["tillclose", "calc"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    m.subcommand_matches("calc").unwrap().clone()
}

#[test]
fn calc_rejects_amounts_above_the_bound() {
    let m = calc_matches(&[
        "--opening",
        "79228162514264337593543950335",
        "--income",
        "1",
        "--expense",
        "0",
        "--counted",
        "0",
    ]);
    let err = calc::run(&m).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::AmountTooLarge { .. })
    ));
}

#[test]
fn calc_at_the_bound_still_reconciles() {
    let max = MAX_AMOUNT_UNITS.to_string();
    let m = calc_matches(&[
        "--opening", &max, "--income", &max, "--expense", "0", "--counted", "0",
    ]);
    let r = calc::run(&m).unwrap();
    assert_eq!(r.expected_cash, Decimal::from(2 * MAX_AMOUNT_UNITS));
    assert_eq!(r.variance, -r.expected_cash);
    assert_eq!(r.kind, VarianceKind::Shortage);
    assert!(!r.is_valid);
}

fn money() -> impl Strategy<Value = Amount> {
    (0i64..1_000_000_000i64, 0u32..3u32).prop_map(|(units, scale)| amt(units, scale))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_expected_and_variance_follow_formula(
        opening in money(),
        income in money(),
        expense in money(),
        counted in money(),
    ) {
        let r = reconcile(&count(opening, income, expense, counted), "");
        let expected = opening.value() + income.value() - expense.value();
        prop_assert_eq!(r.expected_cash, expected);
        prop_assert_eq!(r.variance, counted.value() - expected);
    }

    #[test]
    fn prop_bounded_inputs_always_reconcile(
        units in proptest::collection::vec(0i64..=MAX_AMOUNT_UNITS, 4),
        scale in 0u32..3u32,
    ) {
        let a: Vec<Amount> = units.iter().map(|u| amt(*u, scale)).collect();
        let r = reconcile(&count(a[0], a[1], a[2], a[3]), "");
        prop_assert_eq!(r.variance, a[3].value() - r.expected_cash);
    }

    #[test]
    fn prop_note_gate_matches_threshold(
        opening in money(),
        counted in money(),
        note in prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-z]{1,12}"],
    ) {
        let r = reconcile(&count(opening, Amount::ZERO, Amount::ZERO, counted), &note);
        let needs = r.variance.abs() > Decimal::from(20_000);
        prop_assert_eq!(r.requires_justification, needs);
        prop_assert_eq!(r.is_valid, !needs || !note.trim().is_empty());
    }
}
