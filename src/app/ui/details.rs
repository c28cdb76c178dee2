use eframe::egui::{self, RichText, Ui};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use contract_flow::condition::{
    Condition, ConditionKind, ConditionPatch, ExitCondition, Logic, OperandSlot, tree,
};
use contract_flow::editor::ExitPatch;
use contract_flow::wallet::{WalletColor, WalletNode, WalletPatch};

use super::super::ViewModel;
use super::super::render_utils::wallet_color;

enum DetailAction {
    Wallet(WalletPatch),
    Validate,
    CloneWallet,
    DeleteWallet,
    Detach(String),
    Select(String),
    Focus(String),
    AddCondition(String),
    RemoveCondition(String),
    PatchCondition(String, ConditionPatch),
    CommitOperand(String, OperandSlot, String),
    AddExit(String),
    UpdateExit(String, String, ExitPatch),
    RemoveExit(String, String),
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Wallet Details");
        ui.add_space(6.0);

        let Some(node) = self.editor.selected().cloned() else {
            ui.label("Select a wallet on the canvas or in the list.");
            return;
        };

        let others = self
            .editor
            .graph()
            .nodes()
            .iter()
            .filter(|other| other.id != node.id)
            .map(|other| (other.id.clone(), other.name.clone()))
            .collect::<Vec<_>>();

        let mut actions = Vec::new();
        self.draw_wallet_config(ui, &node, &mut actions);

        ui.separator();
        let focus_id = self
            .focused_condition
            .get(&node.id)
            .filter(|id| tree::exists(&node.condition, id))
            .cloned()
            .unwrap_or_else(|| node.condition.id.clone());
        self.draw_condition_path(ui, &node.condition, &focus_id, &mut actions);

        if let Some(condition) = tree::find(&node.condition, &focus_id) {
            self.draw_condition_editor(ui, condition, &node.condition.id, &mut actions);
            ui.separator();
            draw_exit_routes(ui, condition, &others, &mut actions);
        }

        self.apply_detail_actions(&node.id, actions);
    }

    fn draw_wallet_config(&self, ui: &mut Ui, node: &WalletNode, actions: &mut Vec<DetailAction>) {
        egui::Grid::new("wallet_config")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Name");
                let mut name = node.name.clone();
                if ui.text_edit_singleline(&mut name).changed() {
                    actions.push(DetailAction::Wallet(WalletPatch {
                        name: Some(name),
                        ..WalletPatch::default()
                    }));
                }
                ui.end_row();

                ui.label("Address");
                let mut address = node.address.clone();
                if ui.text_edit_singleline(&mut address).changed() {
                    actions.push(DetailAction::Wallet(WalletPatch {
                        address: Some(address),
                        ..WalletPatch::default()
                    }));
                }
                ui.end_row();

                ui.label("Color");
                ui.horizontal(|ui| {
                    for color in WalletColor::PALETTE {
                        let text = RichText::new("●").color(wallet_color(color));
                        if ui.selectable_label(node.color == color, text).clicked()
                            && node.color != color
                        {
                            actions.push(DetailAction::Wallet(WalletPatch {
                                color: Some(color),
                                ..WalletPatch::default()
                            }));
                        }
                    }
                });
                ui.end_row();

                ui.label("Status");
                if node.valid {
                    ui.colored_label(egui::Color32::from_rgb(34, 197, 94), "validated");
                } else if !self.editor.address_rule().check(&node.address) {
                    ui.colored_label(egui::Color32::from_rgb(239, 68, 68), "address looks invalid");
                } else {
                    ui.label("not validated yet");
                }
                ui.end_row();
            });

        ui.horizontal(|ui| {
            if ui.button("Validate").clicked() {
                actions.push(DetailAction::Validate);
            }
            if ui.button("Clone").clicked() {
                actions.push(DetailAction::CloneWallet);
            }
            if let Some(parent_id) = &node.parent_id
                && ui.button("Detach from parent").clicked()
            {
                actions.push(DetailAction::Detach(parent_id.clone()));
            }
            if ui.button("Delete").clicked() {
                actions.push(DetailAction::DeleteWallet);
            }
        });

        ui.small(format!(
            "{} conditions, depth {}, {} exit routes",
            node.condition.count(),
            node.condition.depth(),
            node.condition.exit_count(),
        ));

        let children = self.editor.graph().children_of(&node.id);
        if !children.is_empty() {
            ui.horizontal_wrapped(|ui| {
                ui.label("Funds:");
                for child in children {
                    if ui.link(&child.name).clicked() {
                        actions.push(DetailAction::Select(child.id.clone()));
                    }
                }
            });
        }
    }

    fn draw_condition_path(
        &self,
        ui: &mut Ui,
        root: &Condition,
        focus_id: &str,
        actions: &mut Vec<DetailAction>,
    ) {
        ui.label(RichText::new("Conditions").strong());
        ui.horizontal_wrapped(|ui| {
            let path = tree::path_to(root, focus_id).unwrap_or_default();
            for (index, id) in path.iter().enumerate() {
                if index > 0 {
                    ui.label("›");
                }
                let label = tree::find(root, id)
                    .map(|condition| format!("L{} {}", condition.level, condition.label))
                    .unwrap_or_default();
                if id == focus_id {
                    ui.label(RichText::new(label).strong());
                } else if ui.link(label).clicked() {
                    actions.push(DetailAction::Focus(id.clone()));
                }
            }

            tree::select_parent(root, focus_id, |parent| {
                if ui.small_button("Up").clicked() {
                    actions.push(DetailAction::Focus(parent.id.clone()));
                }
            });
        });
    }

    fn draw_condition_editor(
        &mut self,
        ui: &mut Ui,
        condition: &Condition,
        root_id: &str,
        actions: &mut Vec<DetailAction>,
    ) {
        let id = condition.id.clone();
        let kind = condition.kind();
        let patch = |patch: ConditionPatch| DetailAction::PatchCondition(id.clone(), patch);

        egui::Grid::new(("condition_editor", id.as_str()))
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Level");
                ui.label(condition.level.to_string());
                ui.end_row();

                ui.label("Label");
                let mut label = condition.label.clone();
                if ui.text_edit_singleline(&mut label).changed() {
                    actions.push(patch(ConditionPatch::label(label)));
                }
                ui.end_row();

                ui.label("Logic");
                ui.horizontal(|ui| {
                    for logic in [Logic::And, Logic::Or] {
                        if ui.selectable_label(condition.logic == logic, logic.label()).clicked()
                            && condition.logic != logic
                        {
                            actions.push(patch(ConditionPatch::logic(logic)));
                        }
                    }
                });
                ui.end_row();

                ui.label("Type");
                egui::ComboBox::from_id_salt(("kind", id.as_str()))
                    .selected_text(kind.label())
                    .show_ui(ui, |ui| {
                        for option in ConditionKind::ALL {
                            if ui.selectable_label(kind == option, option.label()).clicked()
                                && kind != option
                            {
                                actions.push(patch(ConditionPatch::kind(option)));
                            }
                        }
                    });
                ui.end_row();

                ui.label("Operator");
                egui::ComboBox::from_id_salt(("operator", id.as_str()))
                    .selected_text(kind.operator_label(condition.operator))
                    .show_ui(ui, |ui| {
                        for operator in kind.operators() {
                            let current = condition.operator == *operator;
                            if ui
                                .selectable_label(current, kind.operator_label(*operator))
                                .clicked()
                                && !current
                            {
                                actions.push(patch(ConditionPatch::operator(*operator)));
                            }
                        }
                    });
                ui.end_row();

                ui.label("Value");
                self.draw_operand_field(ui, condition, OperandSlot::First, actions);
                ui.end_row();

                if condition.operator.needs_second_operand() {
                    ui.label("and");
                    self.draw_operand_field(ui, condition, OperandSlot::Second, actions);
                    ui.end_row();
                }
            });

        if !condition.conditions.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Nested").small());
            for child in &condition.conditions {
                let text = format!(
                    "{} {}  [{} {}]",
                    child.logic.label(),
                    child.label,
                    child.kind().label(),
                    child.kind().operator_label(child.operator)
                );
                if ui.link(text).clicked() {
                    actions.push(DetailAction::Focus(child.id.clone()));
                }
            }
        }

        ui.horizontal(|ui| {
            if ui.button("Add nested condition").clicked() {
                actions.push(DetailAction::AddCondition(id.clone()));
            }
            if ui.button(remove_condition_label(&id, root_id)).clicked() {
                actions.push(DetailAction::RemoveCondition(id.clone()));
            }
        });
    }

    fn draw_operand_field(
        &mut self,
        ui: &mut Ui,
        condition: &Condition,
        slot: OperandSlot,
        actions: &mut Vec<DetailAction>,
    ) {
        let key = (condition.id.clone(), slot);
        let mut text = self
            .operand_drafts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| condition.operand.text(slot));

        let response = ui.add(
            egui::TextEdit::singleline(&mut text).hint_text(condition.kind().placeholder()),
        );
        if response.changed() {
            self.operand_drafts.insert(key.clone(), text.clone());
        }
        if response.lost_focus() && self.operand_drafts.remove(&key).is_some() {
            actions.push(DetailAction::CommitOperand(key.0, slot, text));
        }
    }

    fn apply_detail_actions(&mut self, wallet_id: &str, actions: Vec<DetailAction>) {
        for action in actions {
            match action {
                DetailAction::Wallet(patch) => {
                    self.editor.update_wallet(wallet_id, &patch);
                }
                DetailAction::Validate => {
                    self.editor.validate_wallet(wallet_id);
                }
                DetailAction::CloneWallet => {
                    if let Some(id) = self.editor.clone_wallet(wallet_id) {
                        self.editor.select(Some(id));
                    }
                }
                DetailAction::DeleteWallet => {
                    self.editor.delete_wallet(wallet_id);
                    self.focused_condition.remove(wallet_id);
                }
                DetailAction::Detach(parent_id) => {
                    self.editor.remove_edge(&parent_id, wallet_id);
                }
                DetailAction::Select(id) => self.editor.select(Some(id)),
                DetailAction::Focus(condition_id) => {
                    self.focused_condition
                        .insert(wallet_id.to_owned(), condition_id);
                }
                DetailAction::AddCondition(parent_id) => {
                    if let Some(child_id) = self.editor.add_condition(wallet_id, &parent_id) {
                        self.focused_condition
                            .insert(wallet_id.to_owned(), child_id);
                    }
                }
                DetailAction::RemoveCondition(condition_id) => {
                    let parent = self.editor.graph().get(wallet_id).and_then(|node| {
                        tree::parent_of(&node.condition, &condition_id).map(|p| p.id.clone())
                    });
                    self.editor.remove_condition(wallet_id, &condition_id);
                    match parent {
                        Some(parent_id) => {
                            self.focused_condition
                                .insert(wallet_id.to_owned(), parent_id);
                        }
                        None => {
                            self.focused_condition.remove(wallet_id);
                        }
                    }
                }
                DetailAction::PatchCondition(condition_id, patch) => {
                    if patch.operand.is_some() {
                        self.operand_drafts
                            .retain(|(id, _), _| id != &condition_id);
                    }
                    self.editor
                        .update_condition(wallet_id, &condition_id, &patch);
                }
                DetailAction::CommitOperand(condition_id, slot, text) => {
                    self.editor
                        .set_operand_text(wallet_id, &condition_id, slot, &text);
                }
                DetailAction::AddExit(condition_id) => {
                    self.editor.add_exit(wallet_id, &condition_id);
                }
                DetailAction::UpdateExit(condition_id, exit_id, patch) => {
                    self.editor
                        .update_exit(wallet_id, &condition_id, &exit_id, &patch);
                }
                DetailAction::RemoveExit(condition_id, exit_id) => {
                    self.editor.remove_exit(wallet_id, &condition_id, &exit_id);
                }
            }
        }
    }
}

fn draw_exit_routes(
    ui: &mut Ui,
    condition: &Condition,
    others: &[(String, String)],
    actions: &mut Vec<DetailAction>,
) {
    ui.label(RichText::new("Exit routes").strong());
    if condition.exit_conditions.is_empty() {
        ui.label("No exit routes on this condition.");
    }

    let mut exits = condition.exit_conditions.iter().collect::<Vec<_>>();
    exits.sort_by_key(|exit| exit.order);
    for exit in exits {
        draw_exit_row(ui, &condition.id, exit, others, actions);
    }

    if ui.button("Add exit route").clicked() {
        actions.push(DetailAction::AddExit(condition.id.clone()));
    }
}

fn draw_exit_row(
    ui: &mut Ui,
    condition_id: &str,
    exit: &ExitCondition,
    others: &[(String, String)],
    actions: &mut Vec<DetailAction>,
) {
    let update = |patch: ExitPatch| {
        DetailAction::UpdateExit(condition_id.to_owned(), exit.id.clone(), patch)
    };

    ui.horizontal(|ui| {
        let mut order = exit.order;
        if ui
            .add(egui::DragValue::new(&mut order).range(1..=99).prefix("#"))
            .changed()
        {
            actions.push(update(ExitPatch {
                order: Some(order),
                ..ExitPatch::default()
            }));
        }

        let mut percent = exit.value.to_f64().unwrap_or_default();
        if ui
            .add(
                egui::DragValue::new(&mut percent)
                    .range(0.0..=100.0)
                    .speed(0.5)
                    .suffix(" %"),
            )
            .changed()
            && let Some(value) = Decimal::from_f64(percent)
        {
            actions.push(update(ExitPatch {
                value: Some(value.round_dp(2)),
                ..ExitPatch::default()
            }));
        }

        let current = exit
            .wallet_id
            .as_ref()
            .map(|id| {
                others
                    .iter()
                    .find(|(other, _)| other == id)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_else(|| format!("missing ({id})"))
            })
            .unwrap_or_else(|| "no destination".to_owned());

        egui::ComboBox::from_id_salt(("exit_wallet", exit.id.as_str()))
            .selected_text(current)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(exit.wallet_id.is_none(), "no destination")
                    .clicked()
                {
                    actions.push(update(ExitPatch {
                        wallet_id: Some(None),
                        ..ExitPatch::default()
                    }));
                }
                for (id, name) in others {
                    let selected = exit.wallet_id.as_deref() == Some(id.as_str());
                    if ui.selectable_label(selected, name).clicked() && !selected {
                        actions.push(update(ExitPatch {
                            wallet_id: Some(Some(id.clone())),
                            ..ExitPatch::default()
                        }));
                    }
                }
            });

        if ui.small_button("✕").on_hover_text("Remove route").clicked() {
            actions.push(DetailAction::RemoveExit(
                condition_id.to_owned(),
                exit.id.clone(),
            ));
        }
    });
}

/// Removing the root resets the whole tree, so the button says so.
fn remove_condition_label(condition_id: &str, root_id: &str) -> &'static str {
    if condition_id == root_id {
        "Reset conditions"
    } else {
        "Remove condition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_wallet_root_offers_a_reset() {
        assert_eq!(remove_condition_label("root", "root"), "Reset conditions");
        assert_eq!(remove_condition_label("child", "root"), "Remove condition");
    }
}
