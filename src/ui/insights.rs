use crate::app::InsightState;
use crate::insights::{split_steps, InsightGroup};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};

pub fn render(ui: &mut egui::Ui, theme: &Theme, insights: &InsightState, search: &mut String) {
    ui.heading("Integration insights");
    ui.label(
        RichText::new("Explore automation possibilities for each platform")
            .color(theme.text_muted)
            .size(13.0),
    );
    ui.add_space(theme.spacing_8);

    if let Some(error) = &insights.error {
        theme.card_frame().show(ui, |ui| {
            ui.label(RichText::new("Failed to load insights").color(theme.danger));
            ui.label(RichText::new(error).color(theme.text_muted).size(12.0));
        });
        ui.add_space(theme.spacing_8);
    }

    if insights.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading insights...").color(theme.text_muted));
        });
        return;
    }

    ui.add(
        egui::TextEdit::singleline(search)
            .desired_width(360.0)
            .hint_text("Search by platform or insight..."),
    );
    ui.add_space(theme.spacing_12);

    let term = search.trim().to_lowercase();
    let visible: Vec<&InsightGroup> = insights
        .grouped
        .groups()
        .iter()
        .filter(|group| {
            term.is_empty()
                || group.system.to_lowercase().contains(&term)
                || group
                    .insights
                    .iter()
                    .any(|insight| insight.insight.to_lowercase().contains(&term))
        })
        .collect();

    if insights.grouped.groups().is_empty() {
        ui.label(RichText::new("No insights available").color(theme.text_muted));
        return;
    }

    if visible.is_empty() {
        ui.label(RichText::new(format!("No results for \"{term}\"")).color(theme.text_muted));
        return;
    }

    ScrollArea::vertical().id_salt("insight_sections").show(ui, |ui| {
        for group in visible {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(&group.system)
                        .color(theme.text_primary)
                        .strong()
                        .size(18.0),
                );
                ui.label(
                    RichText::new(format!(
                        "{} insight{}",
                        group.insights.len(),
                        if group.insights.len() == 1 { "" } else { "s" }
                    ))
                    .color(theme.text_muted)
                    .size(12.0),
                );
            });
            ui.add_space(theme.spacing_8);

            // Display order is by row number; group membership order stays
            // as the payload delivered it.
            let mut ordered: Vec<_> = group.insights.iter().collect();
            ordered.sort_by_key(|insight| insight.row_number);

            for insight in ordered {
                theme.card_frame().show(ui, |ui| {
                    ui.label(
                        RichText::new(insight.kind_label())
                            .color(theme.accent_primary)
                            .size(11.0),
                    );
                    ui.label(
                        RichText::new(insight.benefit())
                            .color(theme.text_primary)
                            .strong()
                            .size(13.0),
                    );
                    ui.add_space(theme.spacing_4);

                    let (intro, steps) = split_steps(insight.body());
                    if !intro.is_empty() {
                        ui.label(RichText::new(intro).color(theme.text_primary).size(13.0));
                    }
                    for step in steps {
                        ui.label(
                            RichText::new(format!("• {step}"))
                                .color(theme.text_primary)
                                .size(13.0),
                        );
                    }
                });
                ui.add_space(theme.spacing_8);
            }

            ui.separator();
            ui.add_space(theme.spacing_8);
        }
    });
}
