use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use contract_flow::condition::ConditionKind;
use contract_flow::util::short_address;
use contract_flow::wallet::WalletNode;

use super::super::ViewModel;
use super::super::render_utils::wallet_color;

fn fuzzy_match_score(matcher: &SkimMatcherV2, node: &WalletNode, query: &str) -> Option<i64> {
    let query = query.to_ascii_lowercase();
    [node.name.as_str(), node.address.as_str(), node.id.as_str()]
        .into_iter()
        .filter_map(|text| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query))
        .max()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Wallets");
        ui.add_space(4.0);
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search name or address")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);

        let query = self.search.trim().to_owned();
        let mut pending_selection = None;

        if query.is_empty() {
            self.draw_hierarchy(ui, &mut pending_selection);
        } else {
            self.draw_search_results(ui, &query, &mut pending_selection);
        }

        let orphans = self
            .editor
            .graph()
            .orphans()
            .into_iter()
            .map(|node| (node.id.clone(), node.name.clone()))
            .collect::<Vec<_>>();
        if !orphans.is_empty() {
            ui.separator();
            ui.label(RichText::new("Detached wallets").strong());
            for (id, name) in orphans {
                if ui.link(name).clicked() {
                    pending_selection = Some(id);
                }
            }
        }

        ui.separator();
        ui.collapsing("Condition types", |ui| {
            for kind in ConditionKind::ALL {
                let operators = kind
                    .operators()
                    .iter()
                    .map(|operator| kind.operator_label(*operator))
                    .collect::<Vec<_>>()
                    .join(", ");
                ui.label(RichText::new(kind.label()).strong());
                ui.small(format!("{operators}  ({})", kind.placeholder()));
            }
        });

        if let Some(id) = pending_selection {
            self.editor.select(Some(id));
        }
    }

    fn draw_hierarchy(&self, ui: &mut Ui, pending_selection: &mut Option<String>) {
        let graph = self.editor.graph();
        let selected = self.editor.selected().map(|node| node.id.as_str());

        egui::ScrollArea::vertical()
            .id_salt("wallet_hierarchy")
            .max_height(ui.available_height() * 0.6)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for row in graph.hierarchy() {
                    let Some(node) = graph.get(&row.id) else {
                        continue;
                    };
                    ui.horizontal(|ui| {
                        ui.add_space(row.depth as f32 * 14.0);
                        ui.colored_label(wallet_color(node.color), "●");
                        let label = if row.depth == 0 {
                            RichText::new(&node.name).strong()
                        } else {
                            RichText::new(&node.name)
                        };
                        if ui
                            .selectable_label(selected == Some(node.id.as_str()), label)
                            .on_hover_text(node.address.as_str())
                            .clicked()
                        {
                            *pending_selection = Some(node.id.clone());
                        }
                    });
                }
            });
    }

    fn draw_search_results(
        &self,
        ui: &mut Ui,
        query: &str,
        pending_selection: &mut Option<String>,
    ) {
        let matcher = SkimMatcherV2::default();
        let mut ranked = self
            .editor
            .graph()
            .nodes()
            .iter()
            .filter_map(|node| fuzzy_match_score(&matcher, node, query).map(|score| (score, node)))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        if ranked.is_empty() {
            ui.label("No wallet matches the search.");
            return;
        }

        for (_, node) in ranked {
            let label = format!("{}  {}", node.name, short_address(&node.address));
            if ui.selectable_label(false, label).clicked() {
                *pending_selection = Some(node.id.clone());
            }
        }
    }
}
