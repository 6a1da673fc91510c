use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};

fn section(ui: &mut egui::Ui, theme: &Theme, title: &str, body: &[&str]) {
    ui.label(
        RichText::new(title)
            .color(theme.text_primary)
            .strong()
            .size(17.0),
    );
    ui.add_space(theme.spacing_4);
    for paragraph in body {
        ui.label(RichText::new(*paragraph).color(theme.text_primary).size(13.0));
        ui.add_space(theme.spacing_4);
    }
    ui.add_space(theme.spacing_12);
}

fn feature_box(ui: &mut egui::Ui, theme: &Theme, title: &str, description: &str) {
    theme.card_frame().show(ui, |ui| {
        ui.label(
            RichText::new(title)
                .color(theme.accent_primary)
                .strong()
                .size(13.0),
        );
        ui.label(
            RichText::new(description)
                .color(theme.text_muted)
                .size(12.0),
        );
    });
    ui.add_space(theme.spacing_8);
}

pub fn render(ui: &mut egui::Ui, theme: &Theme) {
    ui.heading("Guide");
    ui.add_space(theme.spacing_8);

    ScrollArea::vertical().id_salt("guide_sections").show(ui, |ui| {
        section(
            ui,
            theme,
            "Chat",
            &[
                "The Chat page is where you talk to the assistant to design \
                 integrations, ask questions, and get recommendations.",
                "Describe what you want to connect in plain language and the \
                 assistant suggests how to wire it up.",
            ],
        );

        section(
            ui,
            theme,
            "The '+' button",
            &[
                "The '+' button sits on the left side of the chat composer. It \
                 opens a picker listing every integration in the catalog so you \
                 can build a structured request instead of typing one.",
            ],
        );
        feature_box(
            ui,
            theme,
            "Pick a platform",
            "Choosing an integration shows its available actions.",
        );
        feature_box(
            ui,
            theme,
            "Select up to 3 actions",
            "Tick the operations you want the automation to cover.",
        );
        feature_box(
            ui,
            theme,
            "Choose what to create",
            "Send the selection as either an integration or an AI agent \
             request; the assistant receives a pre-formatted message.",
        );

        section(
            ui,
            theme,
            "Integrations",
            &[
                "The Integrations page lists every platform the product can \
                 talk to, with the catalog fetched live from the workspace. \
                 Open a platform to inspect each action's method, endpoint, \
                 and authentication notes, and copy endpoints to the \
                 clipboard.",
            ],
        );

        section(
            ui,
            theme,
            "Insights",
            &[
                "The Insights page collects curated automation suggestions \
                 per platform. Each card leads with the benefit and then \
                 walks through the steps to set the automation up.",
            ],
        );
    });
}
