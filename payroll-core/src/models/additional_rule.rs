use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A sub-bracket of a progressive additional-tax rule.
///
/// Same shape rules as IRPEF brackets: ordered, contiguous from zero,
/// at most one unbounded bracket in the last position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// Shape violations of an [`AdditionalTaxRule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleShapeError {
    /// A progressive rule must carry brackets and no flat rate.
    #[error("progressive rule for {region} has no brackets")]
    ProgressiveWithoutBrackets { region: String },

    /// A flat rule must carry a flat rate and no brackets.
    #[error("flat rule for {region} has no flat rate")]
    FlatWithoutRate { region: String },

    /// Both representations populated at once.
    #[error("rule for {region} mixes flat rate and brackets")]
    MixedRepresentation { region: String },
}

/// Regional or municipal income-tax surcharge definition for one year.
///
/// `municipality` of `None` marks a regional rule; `Some` a municipal
/// one. Exactly one of `flat_rate` / `brackets` is populated, matching
/// `is_progressive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalTaxRule {
    pub id: i64,
    pub year: i32,
    pub region: String,
    pub municipality: Option<String>,
    pub is_progressive: bool,
    pub flat_rate: Option<Decimal>,
    pub brackets: Vec<RateBracket>,
}

/// For creating new rules (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdditionalTaxRule {
    pub year: i32,
    pub region: String,
    pub municipality: Option<String>,
    pub is_progressive: bool,
    pub flat_rate: Option<Decimal>,
    pub brackets: Vec<RateBracket>,
}

impl NewAdditionalTaxRule {
    /// A flat-rate rule.
    pub fn flat(
        year: i32,
        region: impl Into<String>,
        municipality: Option<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            year,
            region: region.into(),
            municipality,
            is_progressive: false,
            flat_rate: Some(rate),
            brackets: Vec::new(),
        }
    }

    /// A progressive rule with its own brackets.
    pub fn progressive(
        year: i32,
        region: impl Into<String>,
        municipality: Option<String>,
        brackets: Vec<RateBracket>,
    ) -> Self {
        Self {
            year,
            region: region.into(),
            municipality,
            is_progressive: true,
            flat_rate: None,
            brackets,
        }
    }
}

impl AdditionalTaxRule {
    /// Checks the exactly-one-representation invariant.
    pub fn validate(&self) -> Result<(), RuleShapeError> {
        validate_shape(
            &self.region,
            self.is_progressive,
            self.flat_rate.is_some(),
            self.brackets.is_empty(),
        )
    }
}

impl NewAdditionalTaxRule {
    /// Checks the exactly-one-representation invariant.
    pub fn validate(&self) -> Result<(), RuleShapeError> {
        validate_shape(
            &self.region,
            self.is_progressive,
            self.flat_rate.is_some(),
            self.brackets.is_empty(),
        )
    }
}

fn validate_shape(
    region: &str,
    is_progressive: bool,
    has_flat: bool,
    brackets_empty: bool,
) -> Result<(), RuleShapeError> {
    if has_flat && !brackets_empty {
        return Err(RuleShapeError::MixedRepresentation {
            region: region.to_string(),
        });
    }
    if is_progressive {
        if brackets_empty {
            return Err(RuleShapeError::ProgressiveWithoutBrackets {
                region: region.to_string(),
            });
        }
        if has_flat {
            return Err(RuleShapeError::MixedRepresentation {
                region: region.to_string(),
            });
        }
    } else if !has_flat {
        return Err(RuleShapeError::FlatWithoutRate {
            region: region.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(min: Decimal, max: Option<Decimal>, rate: Decimal) -> RateBracket {
        RateBracket { min, max, rate }
    }

    #[test]
    fn flat_rule_validates() {
        let rule = NewAdditionalTaxRule::flat(2025, "Marche", None, dec!(1.23));

        assert_eq!(rule.validate(), Ok(()));
    }

    #[test]
    fn progressive_rule_validates() {
        let rule = NewAdditionalTaxRule::progressive(
            2025,
            "Marche",
            None,
            vec![bracket(dec!(0), None, dec!(1.23))],
        );

        assert_eq!(rule.validate(), Ok(()));
    }

    #[test]
    fn progressive_without_brackets_is_rejected() {
        let rule = NewAdditionalTaxRule {
            year: 2025,
            region: "Marche".to_string(),
            municipality: None,
            is_progressive: true,
            flat_rate: None,
            brackets: Vec::new(),
        };

        assert_eq!(
            rule.validate(),
            Err(RuleShapeError::ProgressiveWithoutBrackets {
                region: "Marche".to_string()
            })
        );
    }

    #[test]
    fn flat_without_rate_is_rejected() {
        let rule = NewAdditionalTaxRule {
            year: 2025,
            region: "Marche".to_string(),
            municipality: Some("Pesaro".to_string()),
            is_progressive: false,
            flat_rate: None,
            brackets: Vec::new(),
        };

        assert_eq!(
            rule.validate(),
            Err(RuleShapeError::FlatWithoutRate {
                region: "Marche".to_string()
            })
        );
    }

    #[test]
    fn mixed_representation_is_rejected() {
        let rule = NewAdditionalTaxRule {
            year: 2025,
            region: "Marche".to_string(),
            municipality: None,
            is_progressive: false,
            flat_rate: Some(dec!(1.23)),
            brackets: vec![bracket(dec!(0), None, dec!(1.23))],
        };

        assert_eq!(
            rule.validate(),
            Err(RuleShapeError::MixedRepresentation {
                region: "Marche".to_string()
            })
        );
    }
}
