//! Editing session: the wallet graph plus everything that reacts to its
//! changes (canvas state, notices, autosave, the simulation gate).
//!
//! All mutations are synchronous and happen on the UI thread.

use std::time::Instant;

use eframe::egui::Pos2;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::canvas::{CanvasController, ClickOutcome};
use crate::condition::{Condition, ConditionPatch, ExitCondition, OperandSlot, tree};
use crate::config::EditorConfig;
use crate::ids::IdGenerator;
use crate::notify::{NoticeLog, Notifier};
use crate::persist::{Autosave, SnapshotStore, restore};
use crate::validation::{AddressRule, NodeIssue, SimulationOutcome, run_simulation, validate_node};
use crate::wallet::{WalletGraph, WalletNode, WalletPatch};

/// Partial update for one exit route.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExitPatch {
    pub value: Option<Decimal>,
    pub order: Option<u32>,
    /// `Some(None)` clears the destination.
    pub wallet_id: Option<Option<String>>,
}

pub struct Editor {
    config: EditorConfig,
    graph: WalletGraph,
    canvas: CanvasController,
    notices: NoticeLog,
    ids: Box<dyn IdGenerator>,
    store: Box<dyn SnapshotStore>,
    autosave: Autosave,
    address_rule: AddressRule,
    selected: Option<String>,
    revision: u64,
    last_simulation: Option<(u64, SimulationOutcome)>,
}

impl Editor {
    pub fn new(
        config: EditorConfig,
        ids: Box<dyn IdGenerator>,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        let graph = WalletGraph::with_default_root(ids.as_ref());
        Self {
            canvas: CanvasController::new(config.node_size),
            autosave: Autosave::new(config.autosave_debounce),
            address_rule: AddressRule::from_config(&config),
            notices: NoticeLog::default(),
            selected: None,
            revision: 0,
            last_simulation: None,
            config,
            graph,
            ids,
            store,
        }
    }

    /// Replaces the default graph with the stored snapshot, if one can be read.
    pub fn mount(&mut self) -> bool {
        if self.config.fresh_start {
            info!("fresh start requested, ignoring stored snapshot");
            return false;
        }
        let restored = restore(self.store.as_ref());
        self.adopt_snapshot(restored)
    }

    /// Installs a snapshot that was read elsewhere (e.g. on a loader thread).
    pub fn adopt_snapshot(&mut self, snapshot: Option<Vec<WalletNode>>) -> bool {
        let Some(nodes) = snapshot else {
            return false;
        };
        self.graph = WalletGraph::from_nodes(nodes);
        self.selected = None;
        self.canvas.cancel();
        self.last_simulation = None;
        true
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &WalletGraph {
        &self.graph
    }

    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeLog {
        &mut self.notices
    }

    pub fn address_rule(&self) -> &AddressRule {
        &self.address_rule
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected(&self) -> Option<&WalletNode> {
        self.selected.as_deref().and_then(|id| self.graph.get(id))
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id.filter(|id| self.graph.contains(id));
    }

    /// Content change: bumps the revision and schedules a snapshot.
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.autosave.note_change(Instant::now());
    }

    /// Layout-only change: schedules a snapshot without staling the simulation.
    fn touch_layout(&mut self) {
        self.autosave.note_change(Instant::now());
    }

    pub fn add_wallet(&mut self) -> String {
        let id = self.graph.add_wallet(self.ids.as_ref());
        self.touch();
        id
    }

    pub fn update_wallet(&mut self, id: &str, patch: &WalletPatch) -> bool {
        let changed = self.graph.update_wallet(id, patch);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn clone_wallet(&mut self, id: &str) -> Option<String> {
        let new_id = self.ids.new_id();
        let cloned = self.graph.clone_wallet(id, new_id, self.config.clone_offset)?;
        self.touch();
        Some(cloned)
    }

    pub fn delete_wallet(&mut self, id: &str) -> bool {
        if self.graph.delete_wallet(id).is_none() {
            return false;
        }
        self.canvas.forget(id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.touch();
        true
    }

    pub fn remove_edge(&mut self, parent_id: &str, child_id: &str) -> bool {
        let changed = self.graph.remove_edge(parent_id, child_id);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn toggle_connect(&mut self) {
        self.canvas.toggle_connect();
    }

    pub fn cancel_connect(&mut self) {
        self.canvas.cancel();
    }

    pub fn click_node(&mut self, id: &str) -> ClickOutcome {
        let outcome = self.canvas.click_node(&mut self.graph, id);
        match &outcome {
            ClickOutcome::Connected { .. } => self.touch(),
            ClickOutcome::Rejected { reason, .. } => {
                self.notices
                    .error("Connection not allowed", Some(reason.reason()));
            }
            ClickOutcome::SourceSelected(_) | ClickOutcome::Ignored => {}
        }
        outcome
    }

    pub fn drag_node(&mut self, id: &str, x: f32, y: f32) -> bool {
        let moved = self.canvas.drag_node(&mut self.graph, id, x, y);
        if moved {
            self.touch_layout();
        }
        moved
    }

    pub fn pointer_moved(&mut self, pointer: Pos2) {
        self.canvas.pointer_moved(&self.graph, pointer);
    }

    fn with_condition(&mut self, wallet_id: &str, edit: impl FnOnce(&Condition) -> Condition) -> bool {
        let Some(node) = self.graph.get_mut(wallet_id) else {
            debug!(wallet = %wallet_id, "condition edit on missing wallet");
            return false;
        };
        let next = edit(&node.condition);
        if next == node.condition {
            return false;
        }
        node.condition = next;
        self.touch();
        true
    }

    /// Adds a default condition under `parent_id`, one level deeper.
    pub fn add_condition(&mut self, wallet_id: &str, parent_id: &str) -> Option<String> {
        let parent = self
            .graph
            .get(wallet_id)
            .and_then(|node| tree::find(&node.condition, parent_id))?;
        let child = Condition::child_of(parent, self.ids.new_id());
        let child_id = child.id.clone();

        self.with_condition(wallet_id, |root| tree::insert(root, parent_id, child))
            .then_some(child_id)
    }

    pub fn update_condition(&mut self, wallet_id: &str, condition_id: &str, patch: &ConditionPatch) -> bool {
        self.with_condition(wallet_id, |root| tree::update(root, condition_id, patch))
    }

    /// Prunes a condition subtree. Removing the root resets the wallet to a
    /// fresh default tree, dropping every other condition.
    pub fn remove_condition(&mut self, wallet_id: &str, condition_id: &str) -> bool {
        let fresh = Condition::default_root(self.ids.new_id(), self.ids.new_id());
        self.with_condition(wallet_id, |root| match tree::remove(root, condition_id) {
            Some(next) => next,
            None => {
                debug!(wallet = %wallet_id, "root condition removed, tree reset");
                fresh
            }
        })
    }

    /// Parses `text` into one operand slot. Bad input leaves the condition
    /// untouched and raises an error notice.
    pub fn set_operand_text(
        &mut self,
        wallet_id: &str,
        condition_id: &str,
        slot: OperandSlot,
        text: &str,
    ) -> bool {
        let Some(current) = self
            .graph
            .get(wallet_id)
            .and_then(|node| tree::find(&node.condition, condition_id))
        else {
            return false;
        };

        let parsed = current.operand.with_text(slot, text);
        match parsed {
            Ok(operand) => {
                self.update_condition(wallet_id, condition_id, &ConditionPatch::operand(operand))
            }
            Err(error) => {
                self.notices
                    .error("Invalid condition value", Some(&error.to_string()));
                false
            }
        }
    }

    pub fn set_exit_conditions(
        &mut self,
        wallet_id: &str,
        condition_id: &str,
        exits: Vec<ExitCondition>,
    ) -> bool {
        self.with_condition(wallet_id, |root| {
            tree::set_exit_conditions(root, condition_id, exits)
        })
    }

    fn exits_of(&self, wallet_id: &str, condition_id: &str) -> Option<Vec<ExitCondition>> {
        self.graph
            .get(wallet_id)
            .and_then(|node| tree::find(&node.condition, condition_id))
            .map(|condition| condition.exit_conditions.clone())
    }

    /// Appends an exit route ranked after the existing ones.
    pub fn add_exit(&mut self, wallet_id: &str, condition_id: &str) -> Option<String> {
        let mut exits = self.exits_of(wallet_id, condition_id)?;
        let order = exits.iter().map(|exit| exit.order).max().unwrap_or(0) + 1;
        let exit = ExitCondition::new(self.ids.new_id(), order);
        let exit_id = exit.id.clone();
        exits.push(exit);

        self.set_exit_conditions(wallet_id, condition_id, exits)
            .then_some(exit_id)
    }

    pub fn update_exit(
        &mut self,
        wallet_id: &str,
        condition_id: &str,
        exit_id: &str,
        patch: &ExitPatch,
    ) -> bool {
        let Some(mut exits) = self.exits_of(wallet_id, condition_id) else {
            return false;
        };
        let Some(exit) = exits.iter_mut().find(|exit| exit.id == exit_id) else {
            return false;
        };

        if let Some(value) = patch.value {
            exit.value = value;
        }
        if let Some(order) = patch.order {
            exit.order = order;
        }
        if let Some(wallet) = &patch.wallet_id {
            exit.wallet_id = wallet.clone();
        }
        self.set_exit_conditions(wallet_id, condition_id, exits)
    }

    pub fn remove_exit(&mut self, wallet_id: &str, condition_id: &str, exit_id: &str) -> bool {
        let Some(mut exits) = self.exits_of(wallet_id, condition_id) else {
            return false;
        };
        exits.retain(|exit| exit.id != exit_id);
        self.set_exit_conditions(wallet_id, condition_id, exits)
    }

    /// Runs the per-wallet checks and records the verdict in `valid`.
    pub fn validate_wallet(&mut self, id: &str) -> Option<Vec<NodeIssue>> {
        let node = self.graph.get(id)?;
        let issues = validate_node(node, &self.graph, &self.address_rule);
        let name = node.name.clone();
        let valid = issues.is_empty();

        if let Some(node) = self.graph.get_mut(id)
            && node.valid != valid
        {
            node.valid = valid;
            self.touch();
        }

        if valid {
            self.notices
                .success(&format!("{name} is valid"), None);
        } else {
            let details = issues
                .iter()
                .map(NodeIssue::describe)
                .collect::<Vec<_>>()
                .join("; ");
            self.notices
                .error(&format!("{name} failed validation"), Some(&details));
        }
        Some(issues)
    }

    pub fn simulate(&mut self) -> SimulationOutcome {
        let outcome = run_simulation(&self.graph);
        match &outcome {
            SimulationOutcome::Ready(summary) => {
                let detail = format!(
                    "{} wallets, {} routes, estimated gas {}",
                    summary.wallets, summary.exit_routes, summary.estimated_gas
                );
                self.notices.success("Flow ready to sign", Some(&detail));
            }
            SimulationOutcome::Blocked(invalid) => {
                let detail = format!("{} wallet(s) still need validation", invalid.len());
                self.notices.error("Simulation blocked", Some(&detail));
            }
        }
        self.last_simulation = Some((self.revision, outcome.clone()));
        outcome
    }

    /// Sign is unlocked by a ready simulation of the current revision.
    pub fn can_sign(&self) -> bool {
        self.last_simulation
            .as_ref()
            .is_some_and(|(revision, outcome)| *revision == self.revision && outcome.is_ready())
    }

    pub fn last_simulation(&self) -> Option<&SimulationOutcome> {
        self.last_simulation
            .as_ref()
            .filter(|(revision, _)| *revision == self.revision)
            .map(|(_, outcome)| outcome)
    }

    /// Signing is mocked: it only confirms that the gate was open.
    pub fn sign(&mut self) -> bool {
        if !self.can_sign() {
            self.notices
                .error("Nothing to sign", Some("run a successful simulation first"));
            return false;
        }
        info!(revision = self.revision, "flow signed (mock)");
        self.notices.success("Flow signed", Some("no funds were moved"));
        true
    }

    fn persist(&mut self) -> bool {
        match self.store.save(self.graph.nodes()) {
            Ok(()) => {
                self.autosave.mark_saved();
                true
            }
            Err(error) => {
                warn!(%error, "failed to persist wallet snapshot");
                false
            }
        }
    }

    /// Explicit "Save": writes the snapshot now and tells the user.
    pub fn save_now(&mut self) -> bool {
        let saved = self.persist();
        if saved {
            self.notices.success("Flow saved", None);
        } else {
            self.notices
                .error("Could not save flow", Some("see the log for details"));
        }
        saved
    }

    /// Writes the snapshot once the autosave quiet period has elapsed.
    pub fn autosave_tick(&mut self, now: Instant) -> bool {
        if !self.autosave.is_due(now) {
            return false;
        }
        self.persist()
    }

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Writes any pending changes regardless of the quiet period.
    pub fn flush(&mut self) -> bool {
        if !self.autosave.is_pending() {
            return false;
        }
        self.persist()
    }
}
