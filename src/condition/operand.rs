use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Date,
    Amount,
    Expiration,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 3] = [Self::Date, Self::Amount, Self::Expiration];

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Amount => "Amount",
            Self::Expiration => "Expiration",
        }
    }

    /// Operators offered by the editor for this kind. Expirations have no range form.
    pub fn operators(self) -> &'static [Operator] {
        match self {
            Self::Date | Self::Amount => &[
                Operator::Equals,
                Operator::Greater,
                Operator::Less,
                Operator::Between,
            ],
            Self::Expiration => &[Operator::Equals, Operator::Greater, Operator::Less],
        }
    }

    pub fn operator_label(self, operator: Operator) -> &'static str {
        match (self, operator) {
            (Self::Date, Operator::Equals) => "On exact date",
            (Self::Date, Operator::Greater) => "After",
            (Self::Date, Operator::Less) => "Before",
            (Self::Date, Operator::Between) => "Between dates",
            (Self::Amount, Operator::Equals) => "Equal to",
            (Self::Amount, Operator::Greater) => "Greater than",
            (Self::Amount, Operator::Less) => "Less than",
            (Self::Amount, Operator::Between) => "Between amounts",
            (Self::Expiration, Operator::Equals) => "Expires on",
            (Self::Expiration, Operator::Greater) => "Expires after",
            (Self::Expiration, Operator::Less) => "Expires before",
            (Self::Expiration, Operator::Between) => "Expires between",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Date => "YYYY-MM-DD",
            Self::Amount => "0.00",
            Self::Expiration => "e.g. 30 days",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Equals,
    Greater,
    Less,
    Between,
}

impl Operator {
    pub fn needs_second_operand(self) -> bool {
        matches!(self, Self::Between)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandSlot {
    First,
    Second,
}

/// Condition operands, typed by the condition kind they belong to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operand {
    Date {
        #[serde(default)]
        value: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<NaiveDate>,
    },
    Amount {
        #[serde(default)]
        value: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<Decimal>,
    },
    Expiration {
        #[serde(default)]
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<String>,
    },
}

impl Operand {
    pub fn empty(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Date => Self::Date {
                value: None,
                value2: None,
            },
            ConditionKind::Amount => Self::Amount {
                value: None,
                value2: None,
            },
            ConditionKind::Expiration => Self::Expiration {
                value: String::new(),
                value2: None,
            },
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Date { .. } => ConditionKind::Date,
            Self::Amount { .. } => ConditionKind::Amount,
            Self::Expiration { .. } => ConditionKind::Expiration,
        }
    }

    pub fn text(&self, slot: OperandSlot) -> String {
        match (self, slot) {
            (Self::Date { value, .. }, OperandSlot::First) => date_text(*value),
            (Self::Date { value2, .. }, OperandSlot::Second) => date_text(*value2),
            (Self::Amount { value, .. }, OperandSlot::First) => amount_text(*value),
            (Self::Amount { value2, .. }, OperandSlot::Second) => amount_text(*value2),
            (Self::Expiration { value, .. }, OperandSlot::First) => value.clone(),
            (Self::Expiration { value2, .. }, OperandSlot::Second) => {
                value2.clone().unwrap_or_default()
            }
        }
    }

    pub fn has_second(&self) -> bool {
        match self {
            Self::Date { value2, .. } => value2.is_some(),
            Self::Amount { value2, .. } => value2.is_some(),
            Self::Expiration { value2, .. } => value2.as_deref().is_some_and(|v| !v.is_empty()),
        }
    }

    /// Returns a copy with `slot` replaced by the parsed `text`. Blank text clears the slot.
    pub fn with_text(&self, slot: OperandSlot, text: &str) -> Result<Self> {
        let text = text.trim();
        let mut next = self.clone();
        match &mut next {
            Self::Date { value, value2 } => {
                let parsed = parse_date(text)?;
                match slot {
                    OperandSlot::First => *value = parsed,
                    OperandSlot::Second => *value2 = parsed,
                }
            }
            Self::Amount { value, value2 } => {
                let parsed = parse_amount(text)?;
                match slot {
                    OperandSlot::First => *value = parsed,
                    OperandSlot::Second => *value2 = parsed,
                }
            }
            Self::Expiration { value, value2 } => match slot {
                OperandSlot::First => *value = text.to_owned(),
                OperandSlot::Second => {
                    *value2 = (!text.is_empty()).then(|| text.to_owned());
                }
            },
        }
        Ok(next)
    }
}

fn date_text(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn amount_text(value: Option<Decimal>) -> String {
    value.map(|amount| amount.to_string()).unwrap_or_default()
}

pub fn parse_date(text: &str) -> Result<Option<NaiveDate>> {
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

pub fn parse_amount(text: &str) -> Result<Option<Decimal>> {
    if text.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(text)
        .map(Some)
        .map_err(|_| Error::InvalidAmount(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_has_no_between() {
        assert!(!ConditionKind::Expiration
            .operators()
            .contains(&Operator::Between));
        assert!(ConditionKind::Amount.operators().contains(&Operator::Between));
    }

    #[test]
    fn date_text_parses_and_clears() {
        let operand = Operand::empty(ConditionKind::Date);
        let set = operand.with_text(OperandSlot::First, "2025-03-01").unwrap();
        assert_eq!(set.text(OperandSlot::First), "2025-03-01");

        let cleared = set.with_text(OperandSlot::First, "  ").unwrap();
        assert_eq!(cleared, operand);
    }

    #[test]
    fn bad_operands_are_rejected() {
        let date = Operand::empty(ConditionKind::Date);
        assert!(matches!(
            date.with_text(OperandSlot::First, "03/01/2025"),
            Err(Error::InvalidDate(_))
        ));

        let amount = Operand::empty(ConditionKind::Amount);
        assert!(matches!(
            amount.with_text(OperandSlot::Second, "ten"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn amount_second_slot_is_tracked() {
        let amount = Operand::empty(ConditionKind::Amount)
            .with_text(OperandSlot::First, "10")
            .unwrap();
        assert!(!amount.has_second());
        let ranged = amount.with_text(OperandSlot::Second, "250.5").unwrap();
        assert!(ranged.has_second());
        assert_eq!(ranged.text(OperandSlot::Second), "250.5");
    }

    #[test]
    fn operand_serializes_with_type_tag() {
        let operand = Operand::empty(ConditionKind::Expiration)
            .with_text(OperandSlot::First, "30 days")
            .unwrap();
        let json = serde_json::to_value(&operand).unwrap();
        assert_eq!(json["type"], "expiration");
        assert_eq!(json["value"], "30 days");
    }
}
