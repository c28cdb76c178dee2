use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context, Vec2};
use tracing::warn;

use contract_flow::Editor;
use contract_flow::condition::OperandSlot;
use contract_flow::config::EditorConfig;
use contract_flow::ids::UuidIds;
use contract_flow::persist::{SessionFileStore, restore};
use contract_flow::wallet::WalletNode;

mod graph;
mod render_utils;
mod ui;

type Snapshot = Option<Vec<WalletNode>>;

pub struct ContractBuilderApp {
    config: EditorConfig,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<Snapshot> },
    Ready(Box<ViewModel>),
}

struct ViewModel {
    editor: Editor,
    pan: Vec2,
    zoom: f32,
    search: String,
    /// Condition shown in the details panel, per wallet. Missing means the root.
    focused_condition: HashMap<String, String>,
    /// Operand text being typed, keyed by condition and slot, committed on focus loss.
    operand_drafts: HashMap<(String, OperandSlot), String>,
}

impl ContractBuilderApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_restore(&config),
        };
        Self { config, state }
    }

    fn store_for(config: &EditorConfig) -> SessionFileStore {
        SessionFileStore::new(config.session_file.clone(), config.session_key.clone())
    }

    fn spawn_restore(config: &EditorConfig) -> Receiver<Snapshot> {
        let (tx, rx) = mpsc::channel();
        let store = Self::store_for(config);
        let fresh = config.fresh_start;

        thread::spawn(move || {
            let snapshot = if fresh { None } else { restore(&store) };
            let _ = tx.send(snapshot);
        });

        rx
    }

    fn ready(&self, snapshot: Snapshot) -> AppState {
        let mut editor = Editor::new(
            self.config.clone(),
            Box::new(UuidIds),
            Box::new(Self::store_for(&self.config)),
        );
        editor.adopt_snapshot(snapshot);
        AppState::Ready(Box::new(ViewModel::new(editor)))
    }
}

impl eframe::App for ContractBuilderApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(snapshot) => transition = Some(snapshot),
                    Err(TryRecvError::Disconnected) => {
                        warn!("snapshot loader exited without a result");
                        transition = Some(None);
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint_after(Duration::from_millis(50)),
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Restoring wallet flow...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Ready(model) => {
                model.show(ctx);

                let now = Instant::now();
                model.editor.autosave_tick(now);
                if let Some(deadline) = model.editor.autosave_deadline() {
                    ctx.request_repaint_after(deadline.saturating_duration_since(now));
                }
            }
        }

        if let Some(snapshot) = transition {
            self.state = self.ready(snapshot);
        }
    }

    /// Called by eframe periodically and on shutdown; pending edits are
    /// written to the session file rather than egui storage.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if let AppState::Ready(model) = &mut self.state {
            model.editor.flush();
        }
    }
}
