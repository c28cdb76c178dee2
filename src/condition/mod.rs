//! Per-wallet condition trees.
//!
//! Each wallet owns exactly one root [`Condition`]. Children are owned by
//! value, so a tree can never share or cycle; every edit goes through the
//! copy-on-write transforms in [`tree`].

mod operand;
pub mod tree;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use operand::{ConditionKind, Operand, OperandSlot, Operator, parse_amount, parse_date};

pub const DEFAULT_LABEL: &str = "New condition";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn label(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    pub operator: Operator,
    #[serde(flatten)]
    pub operand: Operand,
    pub label: String,
    #[serde(default)]
    pub logic: Logic,
    #[serde(rename = "nivel")]
    pub level: u32,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub exit_conditions: Vec<ExitCondition>,
}

/// Weighted routing target taken when the owning condition is satisfied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitCondition {
    pub id: String,
    pub value: Decimal,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
}

impl ExitCondition {
    pub fn new(id: String, order: u32) -> Self {
        Self {
            id,
            value: Decimal::ONE_HUNDRED,
            order,
            wallet_id: None,
        }
    }
}

/// Partial field set merged over a condition by [`tree::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionPatch {
    pub label: Option<String>,
    pub logic: Option<Logic>,
    pub operator: Option<Operator>,
    pub operand: Option<Operand>,
}

impl ConditionPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn logic(logic: Logic) -> Self {
        Self {
            logic: Some(logic),
            ..Self::default()
        }
    }

    pub fn operator(operator: Operator) -> Self {
        Self {
            operator: Some(operator),
            ..Self::default()
        }
    }

    pub fn operand(operand: Operand) -> Self {
        Self {
            operand: Some(operand),
            ..Self::default()
        }
    }

    /// Switches the condition kind. Operands of the old kind are dropped and
    /// the operator falls back to `Equals`, which every kind offers.
    pub fn kind(kind: ConditionKind) -> Self {
        Self {
            operator: Some(Operator::Equals),
            operand: Some(Operand::empty(kind)),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, condition: &mut Condition) {
        if let Some(label) = &self.label {
            condition.label = label.clone();
        }
        if let Some(logic) = self.logic {
            condition.logic = logic;
        }
        if let Some(operand) = &self.operand {
            condition.operand = operand.clone();
        }
        if let Some(operator) = self.operator {
            condition.operator = operator;
        }
    }
}

impl Condition {
    fn blank(id: String, level: u32) -> Self {
        Self {
            id,
            operator: Operator::Equals,
            operand: Operand::empty(ConditionKind::Date),
            label: DEFAULT_LABEL.to_owned(),
            logic: Logic::And,
            level,
            conditions: Vec::new(),
            exit_conditions: Vec::new(),
        }
    }

    /// Level-1 root with a single default exit route.
    pub fn default_root(id: String, exit_id: String) -> Self {
        let mut root = Self::blank(id, 1);
        root.exit_conditions.push(ExitCondition::new(exit_id, 1));
        root
    }

    /// Fresh condition meant to be inserted under `parent`, one level deeper.
    pub fn child_of(parent: &Condition, id: String) -> Self {
        Self::blank(id, parent.level + 1)
    }

    pub fn kind(&self) -> ConditionKind {
        self.operand.kind()
    }

    /// Number of conditions in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.conditions.iter().map(Condition::count).sum::<usize>()
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .conditions
            .iter()
            .map(Condition::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn exit_count(&self) -> usize {
        self.exit_conditions.len()
            + self
                .conditions
                .iter()
                .map(Condition::exit_count)
                .sum::<usize>()
    }

    /// Pre-order walk over the subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Condition)) {
        visit(self);
        for child in &self.conditions {
            child.walk(visit);
        }
    }

    pub(crate) fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Condition)) {
        visit(self);
        for child in &mut self.conditions {
            child.walk_mut(visit);
        }
    }
}
