use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use crate::condition::Condition;
use crate::ids::IdGenerator;
use crate::util::{stable_hash, stable_pair};

use super::{WalletColor, WalletNode};

pub const DEFAULT_WALLET_NAME: &str = "Main wallet";
pub const PLACEHOLDER_ADDRESS: &str = "0x1234...5678";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRejection {
    SelfLoop,
    WouldCycle,
    MissingWallet,
    AlreadyLinked,
}

impl EdgeRejection {
    pub fn reason(self) -> &'static str {
        match self {
            Self::SelfLoop => "a wallet cannot fund itself",
            Self::WouldCycle => "the connection would create a cycle",
            Self::MissingWallet => "one of the wallets no longer exists",
            Self::AlreadyLinked => "the wallets are already connected",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub color: Option<WalletColor>,
}

/// One line of the sidebar hierarchy, in depth-first order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyRow {
    pub id: String,
    pub depth: usize,
    pub parent_id: Option<String>,
}

/// The wallet forest. Edges are stored on both ends: the parent's
/// `children` list and the child's `parent_id`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletGraph {
    nodes: Vec<WalletNode>,
}

impl WalletGraph {
    pub fn from_nodes(nodes: Vec<WalletNode>) -> Self {
        Self { nodes }
    }

    pub fn with_default_root(ids: &dyn IdGenerator) -> Self {
        let id = ids.new_id();
        let condition = Condition::default_root(ids.new_id(), ids.new_id());
        Self {
            nodes: vec![WalletNode {
                id,
                name: DEFAULT_WALLET_NAME.to_owned(),
                address: PLACEHOLDER_ADDRESS.to_owned(),
                x: 400.0,
                y: 100.0,
                condition,
                parent_id: None,
                children: Vec::new(),
                color: WalletColor::Purple,
                valid: false,
            }],
        }
    }

    pub fn nodes(&self) -> &[WalletNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<WalletNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WalletNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut WalletNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.children.len()).sum()
    }

    /// `(parent, child)` pairs in node order.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.children
                    .iter()
                    .map(move |child| (node.id.clone(), child.clone()))
            })
            .collect()
    }

    /// Appends a new wallet with a default condition tree and returns its id.
    pub fn add_wallet(&mut self, ids: &dyn IdGenerator) -> String {
        let id = ids.new_id();
        let (jx, jy) = stable_pair(&id);
        let hash = stable_hash(&id);
        let node = WalletNode {
            name: format!("Wallet {}", self.nodes.len() + 1),
            address: format!("0x{:08x}...{:04x}", hash >> 32, hash & 0xffff),
            x: 200.0 + (jx + 1.0) * 200.0,
            y: 200.0 + (jy + 1.0) * 100.0,
            condition: Condition::default_root(ids.new_id(), ids.new_id()),
            parent_id: None,
            children: Vec::new(),
            color: WalletColor::for_id(&id),
            valid: false,
            id: id.clone(),
        };
        info!(wallet = %id, "added wallet");
        self.nodes.push(node);
        id
    }

    pub fn update_wallet(&mut self, id: &str, patch: &WalletPatch) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };

        if let Some(name) = &patch.name {
            node.name = name.clone();
        }
        if let Some(address) = &patch.address
            && node.address != *address
        {
            node.address = address.clone();
            node.valid = false;
        }
        if let Some(color) = patch.color {
            node.color = color;
        }
        true
    }

    pub fn move_wallet(&mut self, id: &str, x: f32, y: f32) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };
        node.x = x;
        node.y = y;
        true
    }

    /// Removes a wallet and scrubs every reference to it: its parent's
    /// `children`, its children's `parent_id`, and exit routes naming it.
    pub fn delete_wallet(&mut self, id: &str) -> Option<WalletNode> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        let removed = self.nodes.remove(index);

        for node in &mut self.nodes {
            node.children.retain(|child| child != id);
            if node.parent_id.as_deref() == Some(id) {
                node.parent_id = None;
            }
            node.condition.walk_mut(&mut |condition| {
                for exit in &mut condition.exit_conditions {
                    if exit.wallet_id.as_deref() == Some(id) {
                        exit.wallet_id = None;
                    }
                }
            });
        }

        info!(wallet = %id, "deleted wallet");
        Some(removed)
    }

    /// Copies a wallet under a fresh id. The copy keeps its condition tree
    /// but starts unconnected: no parent and no children.
    pub fn clone_wallet(&mut self, id: &str, new_id: String, offset: (f32, f32)) -> Option<String> {
        let source = self.get(id)?;
        let copy = WalletNode {
            id: new_id.clone(),
            name: format!("{} (Copy)", source.name),
            x: source.x + offset.0,
            y: source.y + offset.1,
            parent_id: None,
            children: Vec::new(),
            valid: false,
            ..source.clone()
        };
        self.nodes.push(copy);
        info!(source = %id, wallet = %new_id, "cloned wallet");
        Some(new_id)
    }

    /// True when `parent_id` is already reachable downward from `child_id`.
    pub fn would_cycle(&self, parent_id: &str, child_id: &str) -> bool {
        if parent_id == child_id {
            return true;
        }
        self.descendants(child_id).iter().any(|id| id == parent_id)
    }

    /// Links `child_id` under `parent_id`. A child that already had another
    /// parent is detached from it first.
    pub fn add_edge(&mut self, parent_id: &str, child_id: &str) -> Result<(), EdgeRejection> {
        let rejection = if parent_id == child_id {
            Some(EdgeRejection::SelfLoop)
        } else if !self.contains(parent_id) || !self.contains(child_id) {
            Some(EdgeRejection::MissingWallet)
        } else if self
            .get(parent_id)
            .is_some_and(|parent| parent.children.iter().any(|id| id == child_id))
        {
            Some(EdgeRejection::AlreadyLinked)
        } else if self.would_cycle(parent_id, child_id) {
            Some(EdgeRejection::WouldCycle)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            debug!(parent = %parent_id, child = %child_id, ?rejection, "edge rejected");
            return Err(rejection);
        }

        let previous_parent = self.get(child_id).and_then(|child| child.parent_id.clone());
        if let Some(previous) = previous_parent
            && let Some(old_parent) = self.get_mut(&previous)
        {
            old_parent.children.retain(|id| id != child_id);
        }

        if let Some(parent) = self.get_mut(parent_id) {
            parent.children.push(child_id.to_owned());
        }
        if let Some(child) = self.get_mut(child_id) {
            child.parent_id = Some(parent_id.to_owned());
        }

        info!(parent = %parent_id, child = %child_id, "connected wallets");
        Ok(())
    }

    /// Drops the link between `parent_id` and `child_id` from whichever side
    /// still records it. Returns false when neither side did.
    pub fn remove_edge(&mut self, parent_id: &str, child_id: &str) -> bool {
        let mut changed = false;

        if let Some(parent) = self.get_mut(parent_id) {
            let before = parent.children.len();
            parent.children.retain(|id| id != child_id);
            changed |= parent.children.len() != before;
        }
        if let Some(child) = self.get_mut(child_id)
            && child.parent_id.as_deref() == Some(parent_id)
        {
            child.parent_id = None;
            changed = true;
        }

        if changed {
            info!(parent = %parent_id, child = %child_id, "disconnected wallets");
        }
        changed
    }

    pub fn roots(&self) -> Vec<&WalletNode> {
        self.nodes.iter().filter(|node| node.is_root()).collect()
    }

    /// Child wallets of `id` in connection order, skipping stale ids.
    pub fn children_of(&self, id: &str) -> Vec<&WalletNode> {
        self.get(id)
            .map(|node| node.children.iter().filter_map(|child| self.get(child)).collect())
            .unwrap_or_default()
    }

    /// Wallets that name a parent which does not list them as a child.
    pub fn orphans(&self) -> Vec<&WalletNode> {
        let listed = self
            .nodes
            .iter()
            .flat_map(|node| node.children.iter().map(String::as_str))
            .collect::<HashSet<_>>();

        self.nodes
            .iter()
            .filter(|node| node.parent_id.is_some() && !listed.contains(node.id.as_str()))
            .collect()
    }

    /// Ids reachable from `id` through `children`, breadth-first, excluding `id`.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut queue = VecDeque::from([id.to_owned()]);
        let mut visited = HashSet::from([id.to_owned()]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.get(&current) else {
                continue;
            };

            for next in &node.children {
                if visited.insert(next.clone()) {
                    found.push(next.clone());
                    queue.push_back(next.clone());
                }
            }
        }

        found
    }

    /// Roots and their subtrees in depth-first order for the sidebar.
    pub fn hierarchy(&self) -> Vec<HierarchyRow> {
        let mut rows = Vec::new();
        let mut visited = HashSet::new();

        for root in self.roots() {
            let mut stack = vec![(root.id.as_str(), 0usize, None::<&str>)];
            while let Some((id, depth, parent_id)) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                let Some(node) = self.get(id) else {
                    continue;
                };

                rows.push(HierarchyRow {
                    id: id.to_owned(),
                    depth,
                    parent_id: parent_id.map(str::to_owned),
                });

                for child in node.children.iter().rev() {
                    stack.push((child.as_str(), depth + 1, Some(id)));
                }
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::tree;
    use crate::ids::SequentialIds;

    fn graph_with(count: usize) -> (WalletGraph, Vec<String>, SequentialIds) {
        let ids = SequentialIds::new("id");
        let mut graph = WalletGraph::with_default_root(&ids);
        let mut wallet_ids = vec![graph.nodes()[0].id.clone()];
        for _ in 1..count {
            wallet_ids.push(graph.add_wallet(&ids));
        }
        (graph, wallet_ids, ids)
    }

    fn reachable_from_self(graph: &WalletGraph) -> bool {
        graph
            .nodes()
            .iter()
            .any(|node| graph.descendants(&node.id).contains(&node.id))
    }

    #[test]
    fn default_graph_has_single_root() {
        let (graph, ids, _) = graph_with(1);
        assert_eq!(graph.len(), 1);
        let root = graph.get(&ids[0]).unwrap();
        assert_eq!(root.name, DEFAULT_WALLET_NAME);
        assert_eq!(root.condition.level, 1);
        assert_eq!(root.condition.exit_conditions.len(), 1);
    }

    #[test]
    fn add_edge_links_both_sides() {
        let (mut graph, ids, _) = graph_with(2);
        graph.add_edge(&ids[0], &ids[1]).unwrap();

        assert_eq!(graph.get(&ids[0]).unwrap().children, vec![ids[1].clone()]);
        assert_eq!(graph.get(&ids[1]).unwrap().parent_id.as_deref(), Some(ids[0].as_str()));

        let children = graph.children_of(&ids[0]);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, ids[1]);
        assert!(graph.children_of("missing").is_empty());
    }

    #[test]
    fn self_loops_and_cycles_are_rejected() {
        let (mut graph, ids, _) = graph_with(3);
        assert_eq!(graph.add_edge(&ids[0], &ids[0]), Err(EdgeRejection::SelfLoop));

        graph.add_edge(&ids[0], &ids[1]).unwrap();
        graph.add_edge(&ids[1], &ids[2]).unwrap();
        assert_eq!(graph.add_edge(&ids[2], &ids[0]), Err(EdgeRejection::WouldCycle));
        assert_eq!(graph.add_edge(&ids[1], &ids[0]), Err(EdgeRejection::WouldCycle));
        assert!(graph.get(&ids[0]).unwrap().parent_id.is_none());
    }

    #[test]
    fn duplicate_and_dangling_edges_are_rejected() {
        let (mut graph, ids, _) = graph_with(2);
        graph.add_edge(&ids[0], &ids[1]).unwrap();
        assert_eq!(graph.add_edge(&ids[0], &ids[1]), Err(EdgeRejection::AlreadyLinked));
        assert_eq!(graph.add_edge(&ids[0], "ghost"), Err(EdgeRejection::MissingWallet));
    }

    #[test]
    fn arbitrary_edge_sequences_stay_acyclic() {
        let (mut graph, ids, _) = graph_with(5);
        let attempts = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (3, 1),
            (4, 0),
            (2, 4),
            (0, 4),
            (4, 2),
            (1, 3),
        ];
        for (parent, child) in attempts {
            let _ = graph.add_edge(&ids[parent], &ids[child]);
            assert!(!reachable_from_self(&graph));
        }
    }

    #[test]
    fn reparenting_detaches_from_previous_parent() {
        let (mut graph, ids, _) = graph_with(3);
        graph.add_edge(&ids[0], &ids[2]).unwrap();
        graph.add_edge(&ids[1], &ids[2]).unwrap();

        assert!(graph.get(&ids[0]).unwrap().children.is_empty());
        assert_eq!(graph.get(&ids[1]).unwrap().children, vec![ids[2].clone()]);
        assert_eq!(graph.get(&ids[2]).unwrap().parent_id.as_deref(), Some(ids[1].as_str()));
        assert!(graph.orphans().is_empty());
    }

    #[test]
    fn remove_edge_restores_previous_state() {
        let (mut graph, ids, _) = graph_with(2);
        let before = graph.clone();
        graph.add_edge(&ids[0], &ids[1]).unwrap();
        assert!(graph.remove_edge(&ids[0], &ids[1]));
        assert_eq!(graph, before);
        assert!(!graph.remove_edge(&ids[0], &ids[1]));
    }

    #[test]
    fn orphans_have_parent_but_no_listing() {
        let (graph, ids, _) = graph_with(3);
        let mut nodes = graph.into_nodes();
        nodes[2].parent_id = Some(ids[0].clone());
        let graph = WalletGraph::from_nodes(nodes);

        let orphans = graph.orphans().iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(orphans, vec![ids[2].clone()]);
        assert_eq!(graph.roots().len(), 2);
    }

    #[test]
    fn clone_starts_unconnected() {
        let (mut graph, ids, id_gen) = graph_with(2);
        graph.add_edge(&ids[0], &ids[1]).unwrap();

        let copy_id = graph
            .clone_wallet(&ids[1], id_gen.new_id(), (50.0, 50.0))
            .unwrap();
        let source = graph.get(&ids[1]).unwrap().clone();
        let copy = graph.get(&copy_id).unwrap();

        assert!(copy.parent_id.is_none());
        assert!(copy.children.is_empty());
        assert_eq!(copy.condition, source.condition);
        assert_eq!((copy.x, copy.y), (source.x + 50.0, source.y + 50.0));
        assert_eq!(graph.get(&ids[0]).unwrap().children, vec![ids[1].clone()]);
    }

    #[test]
    fn delete_scrubs_references() {
        let (mut graph, ids, _) = graph_with(3);
        graph.add_edge(&ids[0], &ids[1]).unwrap();
        graph.add_edge(&ids[1], &ids[2]).unwrap();

        let root_condition = graph.get(&ids[0]).unwrap().condition.clone();
        let mut exits = root_condition.exit_conditions.clone();
        exits[0].wallet_id = Some(ids[1].clone());
        graph.get_mut(&ids[0]).unwrap().condition =
            tree::set_exit_conditions(&root_condition, &root_condition.id, exits);

        graph.delete_wallet(&ids[1]).unwrap();

        assert!(graph.get(&ids[0]).unwrap().children.is_empty());
        assert!(graph.get(&ids[2]).unwrap().parent_id.is_none());
        assert!(graph.get(&ids[0]).unwrap().condition.exit_conditions[0]
            .wallet_id
            .is_none());
        assert!(graph.delete_wallet(&ids[1]).is_none());
    }

    #[test]
    fn address_edits_reset_validity() {
        let (mut graph, ids, _) = graph_with(1);
        graph.get_mut(&ids[0]).unwrap().valid = true;
        graph.update_wallet(
            &ids[0],
            &WalletPatch {
                name: Some("Treasury".into()),
                ..WalletPatch::default()
            },
        );
        assert!(graph.get(&ids[0]).unwrap().valid);

        graph.update_wallet(
            &ids[0],
            &WalletPatch {
                address: Some("0xabc".into()),
                ..WalletPatch::default()
            },
        );
        let node = graph.get(&ids[0]).unwrap();
        assert_eq!(node.name, "Treasury");
        assert!(!node.valid);
    }

    #[test]
    fn hierarchy_is_depth_first() {
        let (mut graph, ids, _) = graph_with(4);
        graph.add_edge(&ids[0], &ids[1]).unwrap();
        graph.add_edge(&ids[1], &ids[2]).unwrap();
        graph.add_edge(&ids[0], &ids[3]).unwrap();

        let rows = graph
            .hierarchy()
            .into_iter()
            .map(|row| (row.id, row.depth))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                (ids[0].clone(), 0),
                (ids[1].clone(), 1),
                (ids[2].clone(), 2),
                (ids[3].clone(), 1),
            ]
        );
    }
}
