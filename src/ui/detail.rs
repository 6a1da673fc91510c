use crate::app::{CatalogState, Route};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};

pub enum DetailAction {
    Navigate(Route),
    CopyEndpoint { action_id: String, endpoint: String },
}

pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    catalog: &CatalogState,
    integration_id: &str,
    copied_action_id: Option<&str>,
) -> Option<DetailAction> {
    let mut action = None;

    if ui
        .add(egui::Button::new("← Back to integrations").frame(false))
        .clicked()
    {
        return Some(DetailAction::Navigate(Route::Integrations));
    }
    ui.add_space(theme.spacing_8);

    let Some(integration) = catalog.find(integration_id) else {
        if catalog.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Loading integration...").color(theme.text_muted));
            });
        } else {
            ui.label(
                RichText::new("System not found")
                    .color(theme.text_primary)
                    .strong()
                    .size(16.0),
            );
        }
        return action;
    };

    theme.panel_frame(theme.surface_2, theme.spacing_16 as i8).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(&integration.name)
                        .color(theme.text_primary)
                        .strong()
                        .size(22.0),
                );
                ui.label(
                    RichText::new(&integration.category)
                        .color(theme.accent_primary)
                        .size(13.0),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new("TOTAL ACTIONS")
                            .color(theme.text_muted)
                            .size(10.0),
                    );
                    ui.label(
                        RichText::new(integration.actions.len().to_string())
                            .color(theme.accent_primary)
                            .strong()
                            .size(22.0),
                    );
                });
            });
        });
        ui.label(
            RichText::new(&integration.description)
                .color(theme.text_muted)
                .size(13.0),
        );
    });
    ui.add_space(theme.spacing_12);

    ScrollArea::vertical().id_salt("action_list").show(ui, |ui| {
        for entry in &integration.actions {
            theme.card_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(&entry.name)
                            .color(theme.text_primary)
                            .strong()
                            .size(14.0),
                    );
                    ui.label(
                        RichText::new(entry.method.as_str())
                            .color(theme.method_color(entry.method))
                            .strong()
                            .size(12.0),
                    );
                });

                ui.add_space(theme.spacing_4);
                ui.label(RichText::new("Endpoint").color(theme.text_muted).size(11.0));
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(&entry.endpoint)
                            .color(theme.text_primary)
                            .size(12.0)
                            .monospace(),
                    );
                    let copied = copied_action_id == Some(entry.id.as_str());
                    let label = if copied { "Copied" } else { "Copy" };
                    if ui.small_button(label).clicked() {
                        action = Some(DetailAction::CopyEndpoint {
                            action_id: entry.id.clone(),
                            endpoint: entry.endpoint.clone(),
                        });
                    }
                });

                ui.add_space(theme.spacing_4);
                ui.label(
                    RichText::new("Authentication")
                        .color(theme.text_muted)
                        .size(11.0),
                );
                ui.label(
                    RichText::new(&entry.authentication)
                        .color(theme.text_primary)
                        .size(12.0),
                );

                if !entry.description.is_empty() {
                    ui.add_space(theme.spacing_4);
                    ui.label(
                        RichText::new("Description")
                            .color(theme.text_muted)
                            .size(11.0),
                    );
                    ui.label(
                        RichText::new(&entry.description)
                            .color(theme.text_primary)
                            .size(12.0),
                    );
                }

                if !entry.observations.is_empty() {
                    ui.add_space(theme.spacing_4);
                    ui.label(RichText::new("Notes").color(theme.text_muted).size(11.0));
                    ui.label(
                        RichText::new(&entry.observations)
                            .color(theme.text_muted)
                            .size(12.0),
                    );
                }
            });
            ui.add_space(theme.spacing_8);
        }
    });

    action
}
