use crate::cmd::RunConfig;
use crate::exporter::run_export_flow;
use crate::keybinds::{Action, KeyBindings};
use crate::session::Session;
use crate::ui::session_ui::SessionPanel;

use egui::FontFamily;

use std::io;

pub struct StiffApp {
    pub panel: SessionPanel,
    pub keybinds: KeyBindings,
    pub show_settings: bool,
    pub awaiting_rebind: Option<Action>,
    pub font_size: f32,
    run: RunConfig,
}

impl StiffApp {
    pub fn new(run: RunConfig, session: Session, workbook_loaded: bool) -> Self {
        let keybinds = KeyBindings::load_from_file("keybinds.json").unwrap_or_default();
        let panel = SessionPanel::new(session, run.loader.clone(), workbook_loaded);
        Self {
            panel,
            keybinds,
            show_settings: false,
            awaiting_rebind: None,
            font_size: 14.0,
            run,
        }
    }
}

impl eframe::App for StiffApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_font_size(ctx, self.font_size);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            for (_text_style, font_id) in ui.style_mut().text_styles.iter_mut() {
                font_id.family = FontFamily::Monospace;
            }
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_theme_preference_buttons(ui);
                ui.add_space(16.0);

                ui.input(|i| {
                    if self.keybinds.action_triggered(Action::ToggleShowSettings, i) {
                        self.show_settings = !self.show_settings;
                    }
                });

                if self.show_settings {
                    ui.toggle_value(&mut self.show_settings, "Hide settings");
                } else {
                    ui.toggle_value(&mut self.show_settings, "Show settings");
                }
                ui.add_space(16.0);

                egui::ComboBox::from_label("Select font size")
                    .selected_text(format!("{}", self.font_size))
                    .show_ui(ui, |ui| {
                        for size in 10..=32 {
                            if ui
                                .selectable_label(
                                    self.font_size == size as f32,
                                    size.to_string(),
                                )
                                .clicked()
                            {
                                self.font_size = size as f32;
                            }
                        }
                    });
                ui.add_space(16.0);
                ui.label(format!(
                    "{} of {} samples confirmed",
                    self.panel.session.fitted_count(),
                    self.panel.session.total_samples()
                ));
            });
        });

        if self.show_settings {
            self.settings_ui(ctx);
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            for (_text_style, font_id) in ui.style_mut().text_styles.iter_mut() {
                font_id.family = FontFamily::Monospace;
            }
            self.panel.ui(ui, ctx, &self.keybinds);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.panel.session.close();
        let stdin = io::stdin();
        run_export_flow(&self.panel.session, &self.run, stdin.lock(), io::stdout());
    }
}

impl StiffApp {
    fn settings_ui(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings_panel").show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.group(|ui| {
                    ui.label("Export");
                    ui.label(format!("Output directory: {}", self.run.out_dir.display()));
                    ui.checkbox(&mut self.run.save_plots, "Save per-sample plot images");
                });
                ui.separator();
                self.keybinding_settings_ui(ui);
            });
        });
    }

    fn keybinding_settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Keybinds");
            ui.label("Press rebind and hit key to set keybind");
            ui.label("Esc to cancel");
            egui::Grid::new("keybinds").show(ui, |ui| {
                for action in Action::all() {
                    let mut rebind_text = "Rebind";
                    if let Some(pending) = self.awaiting_rebind {
                        if pending == action {
                            rebind_text = "Press key to rebind";
                        }
                    }
                    ui.label(format!("{}:", action));
                    if let Some(key) = self.keybinds.key_for(action) {
                        ui.label(format!("{:?}", key));
                    } else {
                        ui.label("Unbound");
                    }

                    if ui.button(rebind_text).clicked() {
                        self.awaiting_rebind = Some(action);
                    }
                    if self.keybinds.key_for(action).is_some() && ui.button("Unbind").clicked() {
                        self.keybinds.remove(&action);
                        self.keybinds.save_to_file("keybinds.json").ok();
                        self.awaiting_rebind = None;
                    }
                    ui.end_row();
                }
            });
        });

        if let Some(action) = self.awaiting_rebind {
            if let Some(key) = ui.input(|i| {
                i.raw.events.iter().find_map(|event| {
                    if let egui::Event::Key { key, pressed: true, .. } = event {
                        if *key != egui::Key::Escape {
                            Some(*key)
                        } else {
                            None
                        }
                    } else {
                        None
                    }
                })
            }) {
                self.keybinds.set(action, key);
                self.keybinds.save_to_file("keybinds.json").ok();
                self.awaiting_rebind = None;
            } else if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.awaiting_rebind = None;
            }
        }
    }

    fn apply_font_size(&self, ctx: &egui::Context, font_size: f32) {
        use egui::{FontId, TextStyle};

        let mut style = (*ctx.style()).clone();

        style.text_styles = [
            (TextStyle::Heading, FontId::monospace(font_size + 6.0)),
            (TextStyle::Body, FontId::monospace(font_size)),
            (TextStyle::Monospace, FontId::monospace(font_size)),
            (TextStyle::Button, FontId::monospace(font_size)),
            (TextStyle::Small, FontId::monospace(font_size - 2.0)),
        ]
        .into();

        ctx.set_style(style);
    }
}
