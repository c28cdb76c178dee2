//! Per-wallet checks and the readiness gate in front of "sign".
//!
//! Nothing here talks to a chain: addresses are checked for shape only and
//! the simulation summary carries mocked display values.

use rust_decimal::Decimal;

use crate::condition::Operator;
use crate::config::EditorConfig;
use crate::wallet::{WalletGraph, WalletNode};

/// Mocked per-wallet gas figure shown next to a ready flow.
const MOCK_GAS_PER_WALLET: u64 = 21_000;
const MOCK_GAS_PER_ROUTE: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressRule {
    pub prefix: String,
    pub length: usize,
}

impl AddressRule {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            prefix: config.address_prefix.clone(),
            length: config.address_length,
        }
    }

    pub fn check(&self, address: &str) -> bool {
        address.starts_with(&self.prefix) && address.chars().count() == self.length
    }
}

impl Default for AddressRule {
    fn default() -> Self {
        Self {
            prefix: "0x".to_owned(),
            length: 42,
        }
    }
}

/// Shape check with the default `0x` + 40 characters rule.
pub fn validate_address(address: &str) -> bool {
    AddressRule::default().check(address)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeIssue {
    InvalidAddress,
    UnknownExitTarget { exit_id: String, wallet_id: String },
    MissingSecondOperand { condition_id: String },
}

impl NodeIssue {
    pub fn describe(&self) -> String {
        match self {
            Self::InvalidAddress => "address must be 0x followed by 40 characters".to_owned(),
            Self::UnknownExitTarget { wallet_id, .. } => {
                format!("exit route points at missing wallet {wallet_id}")
            }
            Self::MissingSecondOperand { condition_id } => {
                format!("condition {condition_id} uses 'between' without a second value")
            }
        }
    }
}

pub fn validate_node(node: &WalletNode, graph: &WalletGraph, rule: &AddressRule) -> Vec<NodeIssue> {
    let mut issues = Vec::new();

    if !rule.check(&node.address) {
        issues.push(NodeIssue::InvalidAddress);
    }

    node.condition.walk(&mut |condition| {
        if condition.operator == Operator::Between && !condition.operand.has_second() {
            issues.push(NodeIssue::MissingSecondOperand {
                condition_id: condition.id.clone(),
            });
        }
        for exit in &condition.exit_conditions {
            if let Some(wallet_id) = &exit.wallet_id
                && !graph.contains(wallet_id)
            {
                issues.push(NodeIssue::UnknownExitTarget {
                    exit_id: exit.id.clone(),
                    wallet_id: wallet_id.clone(),
                });
            }
        }
    });

    issues
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowSummary {
    pub wallets: usize,
    pub edges: usize,
    pub conditions: usize,
    pub exit_routes: usize,
    pub routed_value: Decimal,
    pub estimated_gas: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationOutcome {
    Ready(FlowSummary),
    Blocked(Vec<String>),
}

impl SimulationOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Gate for the sign action: every wallet must have passed validation.
pub fn run_simulation(graph: &WalletGraph) -> SimulationOutcome {
    let blocked = graph
        .nodes()
        .iter()
        .filter(|node| !node.valid)
        .map(|node| node.id.clone())
        .collect::<Vec<_>>();

    if !blocked.is_empty() {
        return SimulationOutcome::Blocked(blocked);
    }

    let mut conditions = 0usize;
    let mut exit_routes = 0usize;
    let mut routed_value = Decimal::ZERO;
    for node in graph.nodes() {
        node.condition.walk(&mut |condition| {
            conditions += 1;
            exit_routes += condition.exit_conditions.len();
            routed_value += condition
                .exit_conditions
                .iter()
                .map(|exit| exit.value)
                .sum::<Decimal>();
        });
    }

    SimulationOutcome::Ready(FlowSummary {
        wallets: graph.len(),
        edges: graph.edge_count(),
        conditions,
        exit_routes,
        routed_value,
        estimated_gas: graph.len() as u64 * MOCK_GAS_PER_WALLET
            + exit_routes as u64 * MOCK_GAS_PER_ROUTE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionPatch, tree};
    use crate::ids::SequentialIds;

    const GOOD: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn address_shape() {
        assert!(!validate_address("0x1234...5678"));
        assert!(!validate_address("0x1234"));
        assert!(validate_address(GOOD));
        assert!(!validate_address(&GOOD.replacen("0x", "1x", 1)));
        assert!(!validate_address(&format!("{GOOD}0")));
    }

    #[test]
    fn node_issues_cover_address_targets_and_ranges() {
        let ids = SequentialIds::new("v");
        let mut graph = WalletGraph::with_default_root(&ids);
        let node = graph.nodes()[0].clone();

        let mut exits = node.condition.exit_conditions.clone();
        exits[0].wallet_id = Some("ghost".into());
        let condition = tree::set_exit_conditions(&node.condition, &node.condition.id, exits);
        let condition = tree::update(
            &condition,
            &node.condition.id,
            &ConditionPatch::operator(Operator::Between),
        );
        graph.get_mut(&node.id).unwrap().condition = condition;

        let issues = validate_node(graph.get(&node.id).unwrap(), &graph, &AddressRule::default());
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0], NodeIssue::InvalidAddress);
        assert!(matches!(issues[1], NodeIssue::MissingSecondOperand { .. }));
        assert!(matches!(issues[2], NodeIssue::UnknownExitTarget { .. }));
    }

    #[test]
    fn simulation_blocks_until_all_valid() {
        let ids = SequentialIds::new("s");
        let mut graph = WalletGraph::with_default_root(&ids);
        let second = graph.add_wallet(&ids);
        let first = graph.nodes()[0].id.clone();

        assert_eq!(
            run_simulation(&graph),
            SimulationOutcome::Blocked(vec![first.clone(), second.clone()])
        );

        graph.get_mut(&first).unwrap().valid = true;
        assert_eq!(run_simulation(&graph), SimulationOutcome::Blocked(vec![second.clone()]));

        graph.get_mut(&second).unwrap().valid = true;
        let SimulationOutcome::Ready(summary) = run_simulation(&graph) else {
            panic!("expected ready flow");
        };
        assert_eq!(summary.wallets, 2);
        assert_eq!(summary.exit_routes, 2);
        assert_eq!(summary.routed_value, Decimal::new(200, 0));
        assert_eq!(summary.estimated_gas, 2 * 21_000 + 2 * 5_000);
    }
}
