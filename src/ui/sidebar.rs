use crate::app::Route;
use crate::theme::Theme;
use eframe::egui::{self, RichText};

pub struct SidebarResponse {
    pub navigate: Option<Route>,
    pub toggled: bool,
}

// Collapsed, the panel shrinks to a rail with just the expand control; the
// open/closed choice is persisted by the app through the storage port.
pub fn render(ctx: &egui::Context, theme: &Theme, route: &Route, open: bool) -> SidebarResponse {
    let mut response = SidebarResponse {
        navigate: None,
        toggled: false,
    };

    let frame = egui::Frame::new()
        .fill(theme.surface_0)
        .inner_margin(egui::Margin::same(theme.spacing_8 as i8));

    if !open {
        egui::SidePanel::left("nav_rail")
            .resizable(false)
            .exact_width(44.0)
            .frame(frame)
            .show(ctx, |ui| {
                if ui.button("»").on_hover_text("Expand sidebar").clicked() {
                    response.toggled = true;
                }
            });
        return response;
    }

    egui::SidePanel::left("nav_panel")
        .resizable(false)
        .exact_width(200.0)
        .frame(frame)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Tangram")
                        .color(theme.accent_primary)
                        .strong()
                        .size(16.0),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("«").on_hover_text("Collapse sidebar").clicked() {
                        response.toggled = true;
                    }
                });
            });
            ui.add_space(theme.spacing_12);

            let entries = [
                (Route::Chat, "Chat"),
                (Route::Integrations, "Integrations"),
                (Route::Insights, "Insights"),
                (Route::Guide, "Guide"),
            ];

            for (target, label) in entries {
                let active = match (&target, route) {
                    (Route::Integrations, Route::IntegrationDetail(_)) => true,
                    (target, route) => target == route,
                };
                let text = if active {
                    RichText::new(label).color(theme.accent_primary).strong()
                } else {
                    RichText::new(label).color(theme.text_primary)
                };
                if ui
                    .add(egui::Button::new(text).frame(false))
                    .clicked()
                {
                    response.navigate = Some(target);
                }
            }
        });

    response
}
