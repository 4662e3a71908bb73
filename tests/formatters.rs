use proptest::prelude::*;
use token_dash::ui::formatters::*;

// --- format_token_price ---

#[test]
fn test_format_zero() {
    let price = format_token_price(0.0).unwrap();
    assert_eq!(price.main, "0");
    assert_eq!(price.subscript, None);
}

#[test]
fn test_format_plain_small_value() {
    let price = format_token_price(0.234023454).unwrap();
    assert_eq!(price.main, "0.234023454");
    assert_eq!(price.subscript, None);
}

#[test]
fn test_format_tiny_value_uses_subscript() {
    let price = format_token_price(0.00000000002343).unwrap();
    assert_eq!(price.main, "0.02343");
    assert_eq!(price.subscript, Some(10));
}

#[test]
fn test_format_cutoff_at_four_zeros() {
    // three zeros: plain
    let price = format_token_price(0.0001234).unwrap();
    assert_eq!(price.main, "0.0001234");
    assert_eq!(price.subscript, None);

    // four zeros: compressed
    let price = format_token_price(0.00001234).unwrap();
    assert_eq!(price.main, "0.01234");
    assert_eq!(price.subscript, Some(4));
}

#[test]
fn test_format_large_value_drops_trailing_zeros() {
    assert_eq!(format_token_price(42.0).unwrap().main, "42");
    assert_eq!(format_token_price(1500.5).unwrap().main, "1500.5");
}

#[test]
fn test_format_rejects_out_of_contract_input() {
    assert!(matches!(format_token_price(-0.5), Err(FormatError::InvalidInput(_))));
    assert!(format_token_price(f64::NAN).is_err());
    assert!(format_token_price(f64::INFINITY).is_err());
    assert!(format_token_price(f64::NEG_INFINITY).is_err());
}

// --- fit_to_budget ---

#[test]
fn test_fit_tiny_value_within_budget() {
    let price = format_token_price(0.00000000002343).unwrap();
    for max in [10, 16] {
        let fitted = fit_price(&price, max);
        assert!(fitted.width() <= max, "{} exceeds {}", fitted, max);
        assert_eq!(fitted.to_string().chars().count(), fitted.width());
    }
    assert_eq!(fit_to_budget(&price, 16), "0.0₁₀2343");
}

#[test]
fn test_fit_rounds_significant_digits() {
    let price = format_token_price(0.00001234567).unwrap();
    assert_eq!(
        fit_price(&price, 8),
        FittedPrice::Subscript {
            zeros: 4,
            digits: "1235".to_string()
        }
    );
}

#[test]
fn test_fit_carry_drops_a_zero() {
    let price = format_token_price(0.0000999999).unwrap();
    assert_eq!(price.subscript, Some(4));
    assert_eq!(fit_price(&price, 7), FittedPrice::Plain("0.0001".to_string()));
}

#[test]
fn test_fit_carry_without_zeros_left() {
    let price = FormattedPrice {
        main: "0.099".to_string(),
        subscript: Some(0),
    };
    assert_eq!(fit_to_budget(&price, 4), "1");

    let price = FormattedPrice {
        main: "0.099".to_string(),
        subscript: Some(1),
    };
    assert_eq!(fit_to_budget(&price, 4), "0.1");
}

#[test]
fn test_fit_plain_value_rounds_fraction() {
    let price = format_token_price(0.234023454).unwrap();
    assert_eq!(fit_to_budget(&price, 6), "0.2340");

    let price = format_token_price(1234.56789).unwrap();
    assert_eq!(fit_to_budget(&price, 8), "1234.568");
}

#[test]
fn test_fit_budget_smaller_than_prefix_keeps_one_digit() {
    let price = format_token_price(0.00000000002343).unwrap();
    let fitted = fit_price(&price, 3);
    assert_eq!(
        fitted,
        FittedPrice::Subscript {
            zeros: 10,
            digits: "2".to_string()
        }
    );
    assert!(fitted.width() > 3);
}

#[test]
fn test_display_price_falls_back_to_dash() {
    assert_eq!(display_price(f64::NAN, 16), "—");
    assert_eq!(display_price(0.1597, 16), "0.15970000000000");
}

#[test]
fn test_fit_plain_value_fills_budget() {
    let half = format_token_price(0.5).unwrap();
    assert_eq!(fit_to_budget(&half, 16), "0.50000000000000");

    let whole = format_token_price(42.0).unwrap();
    assert_eq!(fit_to_budget(&whole, 16), "42.0000000000000");
}

// --- abbreviate ---

#[test]
fn test_abbreviate_below_threshold_groups_thousands() {
    assert_eq!(abbreviate(9999.0).unwrap(), "9,999");
    assert_eq!(abbreviate(512.25).unwrap(), "512.25");
}

#[test]
fn test_abbreviate_suffixes() {
    assert_eq!(abbreviate(10_000.0).unwrap(), "10.00K");
    assert_eq!(abbreviate(69_100.0).unwrap(), "69.10K");
    assert_eq!(abbreviate(1_000_000.0).unwrap(), "1.00M");
    assert_eq!(abbreviate(1_000_000_000.0).unwrap(), "1.00B");
    assert_eq!(abbreviate(1_000_000_000_000.0).unwrap(), "1.00T");
    assert_eq!(abbreviate(75_000_000_000_000.0).unwrap(), "75.00T");
}

#[test]
fn test_abbreviate_stops_at_trillions() {
    assert_eq!(abbreviate(2_500_000_000_000_000.0).unwrap(), "2500.00T");
}

#[test]
fn test_abbreviate_rejects_negative() {
    assert_eq!(abbreviate(-1.0), Err(FormatError::InvalidInput(-1.0)));
    assert_eq!(display_amount(-1.0), "—");
}

// --- helpers ---

#[test]
fn test_group_thousands() {
    assert_eq!(group_thousands(1_234_567.891), "1,234,567.891");
    assert_eq!(group_thousands(999.0), "999");
    assert_eq!(group_thousands(1000.0), "1,000");
}

#[test]
fn test_subscript_digits() {
    assert_eq!(subscript_digits(4), "₄");
    assert_eq!(subscript_digits(10), "₁₀");
}

#[test]
fn test_shorten_address() {
    assert_eq!(
        shorten_address("0x77Ad5F358CD673FCA1673e20E928B3CcADC84706"),
        "0x77Ad…4706"
    );
    assert_eq!(shorten_address("0x1234"), "0x1234");
}

#[test]
fn test_truncate_str() {
    assert_eq!(truncate_str("abcdefghij", 6), "abc...");
    assert_eq!(truncate_str("abc", 6), "abc");
}

proptest! {
    #[test]
    fn prop_values_from_one_parse_back(v in 1.0f64..1e12) {
        let price = format_token_price(v).unwrap();
        prop_assert_eq!(price.subscript, None);
        let parsed: f64 = price.main.parse().unwrap();
        prop_assert!((parsed - v).abs() <= v * 1e-12);
    }

    #[test]
    fn prop_leading_zero_count_becomes_subscript(m in 1.1f64..9.9, k in 4usize..=14) {
        let v = m * 10f64.powi(-(k as i32 + 1));
        let price = format_token_price(v).unwrap();
        prop_assert_eq!(price.subscript, Some(k));
        prop_assert!(price.main.starts_with("0.0"));
    }

    #[test]
    fn prop_few_leading_zeros_stay_plain(m in 1.1f64..9.9, k in 0usize..4) {
        let v = m * 10f64.powi(-(k as i32 + 1));
        let price = format_token_price(v).unwrap();
        prop_assert_eq!(price.subscript, None);
    }

    #[test]
    fn prop_fitted_subscript_respects_budget(m in 1.1f64..9.9, k in 4usize..=14, max in 8usize..=20) {
        let v = m * 10f64.powi(-(k as i32 + 1));
        let price = format_token_price(v).unwrap();
        let fitted = fit_price(&price, max);
        prop_assert!(fitted.width() <= max, "{} wider than {}", fitted, max);
    }
}
