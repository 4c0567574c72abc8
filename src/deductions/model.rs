//! Deduction data model — claimed expenses and their categories.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DeductionError;

/// Largest amount a single deduction may claim.
pub const MAX_DEDUCTION_AMOUNT: Decimal = dec!(1000000000);

/// Closed set of work-related expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeductionCategory {
    Vehicle,
    HomeOffice,
    Travel,
    Education,
    ToolsEquipment,
    ClothingLaundry,
    PhoneInternet,
    ProfessionalFees,
    Insurance,
    Other,
}

impl DeductionCategory {
    /// Every category, in declaration order.
    pub const ALL: [DeductionCategory; 10] = [
        Self::Vehicle,
        Self::HomeOffice,
        Self::Travel,
        Self::Education,
        Self::ToolsEquipment,
        Self::ClothingLaundry,
        Self::PhoneInternet,
        Self::ProfessionalFees,
        Self::Insurance,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::HomeOffice => "home-office",
            Self::Travel => "travel",
            Self::Education => "education",
            Self::ToolsEquipment => "tools-equipment",
            Self::ClothingLaundry => "clothing-laundry",
            Self::PhoneInternet => "phone-internet",
            Self::ProfessionalFees => "professional-fees",
            Self::Insurance => "insurance",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Vehicle => "Vehicle",
            Self::HomeOffice => "Home office",
            Self::Travel => "Travel",
            Self::Education => "Education",
            Self::ToolsEquipment => "Tools & equipment",
            Self::ClothingLaundry => "Clothing & laundry",
            Self::PhoneInternet => "Phone & internet",
            Self::ProfessionalFees => "Professional fees",
            Self::Insurance => "Insurance",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for DeductionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("Unknown deduction category: {s}"))
    }
}

/// A single claimed expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deduction {
    pub id: Uuid,
    pub category: DeductionCategory,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Work-use proportion, 0–100.
    #[serde(with = "rust_decimal::serde::float")]
    pub claim_percentage: Decimal,
}

impl Deduction {
    /// Create a fully claimable deduction.
    pub fn new(
        category: DeductionCategory,
        description: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            description: description.into(),
            amount,
            date,
            receipt_url: None,
            notes: None,
            claim_percentage: dec!(100),
        }
    }

    /// Builder: set the work-use percentage.
    pub fn with_claim_percentage(mut self, percentage: Decimal) -> Self {
        self.claim_percentage = percentage;
        self
    }

    /// Builder: attach a receipt link.
    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_url = Some(url.into());
        self
    }

    /// Builder: attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Portion of `amount` that can be claimed.
    ///
    /// Saturates rather than overflowing on values loaded from disk that
    /// never went through `validate`.
    pub fn claimable_amount(&self) -> Decimal {
        self.amount.saturating_mul(self.claim_percentage) / dec!(100)
    }

    /// Check amount, percentage and description.
    pub fn validate(&self) -> Result<(), DeductionError> {
        if self.amount <= Decimal::ZERO {
            return Err(DeductionError::InvalidAmount {
                amount: self.amount,
            });
        }
        if self.amount > MAX_DEDUCTION_AMOUNT {
            return Err(DeductionError::AmountTooLarge {
                amount: self.amount,
                max: MAX_DEDUCTION_AMOUNT,
            });
        }
        if self.claim_percentage < Decimal::ZERO || self.claim_percentage > dec!(100) {
            return Err(DeductionError::InvalidClaimPercentage {
                percentage: self.claim_percentage,
            });
        }
        if self.description.trim().is_empty() {
            return Err(DeductionError::MissingDescription);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 3).unwrap()
    }

    #[test]
    fn category_serde_is_kebab_case() {
        for category in DeductionCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
            let parsed: DeductionCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!(
            "Home-Office".parse::<DeductionCategory>().unwrap(),
            DeductionCategory::HomeOffice
        );
        assert!("groceries".parse::<DeductionCategory>().is_err());
    }

    #[test]
    fn new_deduction_is_fully_claimable() {
        let d = Deduction::new(DeductionCategory::Education, "Course", dec!(1000), date());
        assert_eq!(d.claim_percentage, dec!(100));
        assert_eq!(d.claimable_amount(), dec!(1000));
    }

    #[test]
    fn claimable_amount_applies_percentage() {
        let d = Deduction::new(DeductionCategory::PhoneInternet, "Mobile plan", dec!(500), date())
            .with_claim_percentage(dec!(50));
        assert_eq!(d.claimable_amount(), dec!(250));

        let zero = d.clone().with_claim_percentage(Decimal::ZERO);
        assert_eq!(zero.claimable_amount(), Decimal::ZERO);
    }

    #[test]
    fn validation() {
        let ok = Deduction::new(DeductionCategory::Travel, "Flight", dec!(320.40), date());
        assert!(ok.validate().is_ok());

        let zero = Deduction::new(DeductionCategory::Travel, "Flight", Decimal::ZERO, date());
        assert!(matches!(zero.validate(), Err(DeductionError::InvalidAmount { .. })));

        let over = ok.clone().with_claim_percentage(dec!(100.5));
        assert!(matches!(
            over.validate(),
            Err(DeductionError::InvalidClaimPercentage { .. })
        ));

        let negative = ok.clone().with_claim_percentage(dec!(-1));
        assert!(negative.validate().is_err());

        let at_cap = Deduction::new(DeductionCategory::Travel, "Charter", MAX_DEDUCTION_AMOUNT, date());
        assert!(at_cap.validate().is_ok());

        let over_cap = Deduction::new(
            DeductionCategory::Other,
            "x",
            dec!(1000000000000000000000000000),
            date(),
        );
        assert!(matches!(
            over_cap.validate(),
            Err(DeductionError::AmountTooLarge { .. })
        ));

        let blank = Deduction {
            description: "  ".to_string(),
            ..ok
        };
        assert!(matches!(blank.validate(), Err(DeductionError::MissingDescription)));
    }

    #[test]
    fn claimable_amount_saturates_on_unvalidated_values() {
        let huge = Deduction::new(DeductionCategory::Other, "x", Decimal::MAX, date());
        assert_eq!(huge.claimable_amount(), Decimal::MAX / dec!(100));
    }

    #[test]
    fn receipt_url_is_serialized_when_set() {
        let d = Deduction::new(DeductionCategory::Education, "Course", dec!(300), date())
            .with_receipt_url("https://receipts.example.com/123.pdf");
        assert_eq!(d.receipt_url.as_deref(), Some("https://receipts.example.com/123.pdf"));

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["receiptUrl"], "https://receipts.example.com/123.pdf");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn serializes_with_wire_shape() {
        let d = Deduction::new(DeductionCategory::ToolsEquipment, "Saw", dec!(89.5), date())
            .with_claim_percentage(dec!(80))
            .with_notes("Site work");
        let json = serde_json::to_value(&d).unwrap();

        assert_eq!(json["category"], "tools-equipment");
        assert_eq!(json["amount"], 89.5);
        assert_eq!(json["claimPercentage"], 80.0);
        assert_eq!(json["date"], "2024-10-03");
        assert_eq!(json["notes"], "Site work");
        assert!(json.get("receiptUrl").is_none());

        let parsed: Deduction = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn accepts_integer_json_numbers() {
        let raw = r#"{
            "id": "5f0c6a8e-6a43-4c1e-9a53-2f7f3f5b1c11",
            "category": "vehicle",
            "description": "Fuel",
            "amount": 120,
            "date": "2024-07-15",
            "claimPercentage": 100
        }"#;
        let d: Deduction = serde_json::from_str(raw).unwrap();
        assert_eq!(d.amount, dec!(120));
        assert_eq!(d.claimable_amount(), dec!(120));
    }
}
