use crate::app::{CatalogState, Route};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};

// Catalog grid with client-side search. Loading, error, and empty states are
// deliberately distinct.
pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    catalog: &CatalogState,
    search: &mut String,
) -> Option<Route> {
    let mut navigate = None;

    ui.heading("Integrations");
    ui.add_space(theme.spacing_8);
    ui.add(
        egui::TextEdit::singleline(search)
            .desired_width(360.0)
            .hint_text("Search integrations..."),
    );
    ui.add_space(theme.spacing_12);

    if catalog.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading integrations...").color(theme.text_muted));
        });
        return None;
    }

    if let Some(error) = &catalog.error {
        ui.label(RichText::new("Failed to load integrations").color(theme.danger));
        ui.label(RichText::new(error).color(theme.text_muted).size(12.0));
        return None;
    }

    let term = search.trim();
    let filtered: Vec<_> = catalog
        .integrations
        .iter()
        .filter(|integration| term.is_empty() || integration.matches_search(term))
        .collect();

    if catalog.integrations.is_empty() {
        ui.label(RichText::new("No integrations available").color(theme.text_muted));
        return None;
    }

    if filtered.is_empty() {
        ui.label(
            RichText::new(format!("No results for \"{term}\"")).color(theme.text_muted),
        );
        return None;
    }

    ScrollArea::vertical()
        .id_salt("integration_grid")
        .show(ui, |ui| {
            for integration in filtered {
                let frame = theme.card_frame();
                let card = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(&integration.name)
                                .color(theme.text_primary)
                                .strong()
                                .size(15.0),
                        );
                        ui.label(
                            RichText::new(&integration.category)
                                .color(theme.accent_primary)
                                .size(12.0),
                        );
                    });
                    ui.label(
                        RichText::new(&integration.description)
                            .color(theme.text_muted)
                            .size(13.0),
                    );
                    ui.label(
                        RichText::new(format!(
                            "{} action{}",
                            integration.actions.len(),
                            if integration.actions.len() == 1 { "" } else { "s" }
                        ))
                        .color(theme.text_muted)
                        .size(12.0),
                    );
                });

                if card
                    .response
                    .interact(egui::Sense::click())
                    .clicked()
                {
                    navigate = Some(Route::IntegrationDetail(integration.id.clone()));
                }
                ui.add_space(theme.spacing_8);
            }
        });

    navigate
}
