//! Refund estimation — marginal rate lookup, deduction totals, and
//! occupation-based category suggestions.
//!
//! All functions are pure. Amounts stay exact until `format_currency`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::deductions::{Deduction, DeductionCategory};
use crate::onboarding::UserProfile;

/// Upper bound (inclusive) and rate. The last bracket has no bound.
struct Bracket {
    up_to: Option<Decimal>,
    rate: Decimal,
}

const BRACKETS: [Bracket; 5] = [
    Bracket {
        up_to: Some(dec!(18200)),
        rate: dec!(0),
    },
    Bracket {
        up_to: Some(dec!(45000)),
        rate: dec!(0.19),
    },
    Bracket {
        up_to: Some(dec!(120000)),
        rate: dec!(0.325),
    },
    Bracket {
        up_to: Some(dec!(180000)),
        rate: dec!(0.37),
    },
    Bracket {
        up_to: None,
        rate: dec!(0.45),
    },
];

use DeductionCategory::*;

const OCCUPATION_CATEGORIES: [(&str, [DeductionCategory; 4]); 7] = [
    ("tradie", [ToolsEquipment, Vehicle, ClothingLaundry, PhoneInternet]),
    ("office-worker", [HomeOffice, PhoneInternet, Education, ProfessionalFees]),
    ("healthcare", [ClothingLaundry, ProfessionalFees, Education, Insurance]),
    ("teacher", [Education, HomeOffice, ProfessionalFees, Other]),
    ("hospitality", [ClothingLaundry, PhoneInternet, Vehicle, ToolsEquipment]),
    ("it-professional", [HomeOffice, PhoneInternet, Education, ToolsEquipment]),
    ("sales", [Vehicle, PhoneInternet, Travel, ProfessionalFees]),
];

const FALLBACK_CATEGORIES: [DeductionCategory; 3] = [PhoneInternet, Education, ProfessionalFees];

/// Rate applied to the next dollar of `income`.
pub fn marginal_rate(income: Decimal) -> Decimal {
    BRACKETS
        .iter()
        .find(|b| b.up_to.is_none_or(|limit| income <= limit))
        .map(|b| b.rate)
        .unwrap_or(dec!(0.45))
}

/// Sum of every deduction's claimable amount.
pub fn total_claimable(deductions: &[Deduction]) -> Decimal {
    saturating_sum(deductions.iter())
}

fn saturating_sum<'a>(deductions: impl Iterator<Item = &'a Deduction>) -> Decimal {
    deductions
        .map(Deduction::claimable_amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Claimable totals per category, in category order. Empty categories are left out.
pub fn claimable_by_category(deductions: &[Deduction]) -> Vec<(DeductionCategory, Decimal)> {
    DeductionCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let mut matching = deductions.iter().filter(|d| d.category == category).peekable();
            matching.peek()?;
            Some((category, saturating_sum(matching)))
        })
        .collect()
}

/// Estimated refund: claimable total at the profile's marginal rate.
///
/// Zero when there is no profile or no (non-zero) annual income.
pub fn calculate_potential_refund(
    deductions: &[Deduction],
    profile: Option<&UserProfile>,
) -> Decimal {
    let Some(income) = profile.and_then(|p| p.annual_income) else {
        return Decimal::ZERO;
    };
    if income.is_zero() {
        return Decimal::ZERO;
    }
    total_claimable(deductions).saturating_mul(marginal_rate(income))
}

/// Lower-case and replace each whitespace run with `-`.
fn occupation_key(occupation: &str) -> String {
    let mut key = String::with_capacity(occupation.len());
    let mut in_space = false;
    for ch in occupation.chars() {
        if ch.is_whitespace() {
            if !in_space {
                key.push('-');
            }
            in_space = true;
        } else {
            key.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    key
}

/// Suggested deduction categories for an occupation.
pub fn recommended_categories(occupation: &str) -> Vec<DeductionCategory> {
    let key = occupation_key(occupation);
    OCCUPATION_CATEGORIES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, categories)| categories.to_vec())
        .unwrap_or_else(|| FALLBACK_CATEGORIES.to_vec())
}

/// Whole-dollar AUD, grouped by thousands: `$1,250`, `-$20`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
