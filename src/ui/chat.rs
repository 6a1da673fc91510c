use crate::app::CatalogState;
use crate::catalog::Integration;
use crate::session::{compose_selection_message, ChatSession, Sender};
use crate::theme::Theme;
use eframe::egui::{self, Color32, RichText, ScrollArea};

pub const MAX_SELECTED_ACTIONS: usize = 3;
const SELECTION_PROMPT: &str = "Select an integration to get started";

// Mutually exclusive interaction states of the selection flow: nothing
// selected, picker open, actions being ticked, type choice pending.
#[derive(Default)]
pub struct ChatViewState {
    pub input: String,
    pub dropdown_open: bool,
    pub selected_integration: Option<String>,
    pub selected_actions: Vec<String>,
    pub show_type_selection: bool,
    pub scroll_to_bottom: bool,
}

impl ChatViewState {
    pub fn clear_selection(&mut self) {
        self.selected_integration = None;
        self.selected_actions.clear();
        self.show_type_selection = false;
    }
}

// Returns the text handed over by the session for dispatch, if any.
pub fn render(
    ui: &mut egui::Ui,
    theme: &Theme,
    session: &mut ChatSession,
    catalog: &CatalogState,
    state: &mut ChatViewState,
) -> Option<String> {
    let mut dispatch = None;

    if session.is_empty() {
        render_hero(ui, theme);
    } else {
        render_transcript(ui, theme, session, state);
    }

    if let Some(sent) = render_selection_panel(ui, theme, session, catalog, state) {
        dispatch = Some(sent);
    }
    if state.dropdown_open {
        render_dropdown(ui, theme, catalog, state);
    }
    if let Some(sent) = render_composer(ui, theme, session, state) {
        dispatch = Some(sent);
    }

    if dispatch.is_some() {
        state.clear_selection();
        state.scroll_to_bottom = true;
    }

    dispatch
}

fn render_hero(ui: &mut egui::Ui, theme: &Theme) {
    ui.add_space(theme.spacing_24 * 2.0);
    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new("What do you want to integrate today?")
                .color(theme.text_primary)
                .strong()
                .size(26.0),
        );
        ui.add_space(theme.spacing_8);
        ui.label(
            RichText::new(
                "Talk to the assistant and ask it about integration possibilities.",
            )
            .color(theme.text_muted)
            .size(14.0),
        );
    });
    ui.add_space(theme.spacing_24);
}

fn render_transcript(
    ui: &mut egui::Ui,
    theme: &Theme,
    session: &ChatSession,
    state: &mut ChatViewState,
) {
    let transcript_height = (ui.available_height() - 190.0).max(120.0);
    ScrollArea::vertical()
        .id_salt("chat_transcript")
        .max_height(transcript_height)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in session.transcript() {
                let (fill, text_color, layout) = match message.sender {
                    Sender::User => (
                        theme.accent_primary,
                        theme.text_on_accent,
                        egui::Layout::right_to_left(egui::Align::Min),
                    ),
                    Sender::Assistant => (
                        theme.surface_2,
                        theme.text_primary,
                        egui::Layout::left_to_right(egui::Align::Min),
                    ),
                };

                ui.with_layout(layout, |ui| {
                    egui::Frame::new()
                        .fill(fill)
                        .corner_radius(egui::CornerRadius::same(theme.radius_12))
                        .inner_margin(egui::Margin::symmetric(
                            theme.spacing_12 as i8,
                            theme.spacing_8 as i8,
                        ))
                        .show(ui, |ui| {
                            ui.set_max_width(ui.available_width() * 0.8);
                            ui.vertical(|ui| {
                                ui.label(
                                    RichText::new(&message.text)
                                        .color(text_color)
                                        .size(13.0),
                                );
                                ui.label(
                                    RichText::new(message.time_label())
                                        .color(text_color.gamma_multiply(0.6))
                                        .size(10.0),
                                );
                            });
                        });
                });
                ui.add_space(theme.spacing_8);
            }

            if session.is_busy() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(
                        RichText::new("The assistant is thinking...")
                            .color(theme.text_muted)
                            .size(12.0),
                    );
                });
            }

            if state.scroll_to_bottom {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
    state.scroll_to_bottom = false;
    ui.add_space(theme.spacing_8);
}

fn render_dropdown(
    ui: &mut egui::Ui,
    theme: &Theme,
    catalog: &CatalogState,
    state: &mut ChatViewState,
) {
    if catalog.loading {
        return;
    }

    theme.card_frame().show(ui, |ui| {
        ScrollArea::vertical()
            .id_salt("integration_dropdown")
            .max_height(140.0)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for integration in &catalog.integrations {
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new(&integration.name).size(12.0),
                                )
                                .stroke(theme.subtle_button_stroke()),
                            )
                            .clicked()
                        {
                            state.selected_integration = Some(integration.id.clone());
                            state.selected_actions.clear();
                            state.show_type_selection = false;
                            state.dropdown_open = false;
                        }
                    }
                });
            });
    });
    ui.add_space(theme.spacing_8);
}

fn render_selection_panel(
    ui: &mut egui::Ui,
    theme: &Theme,
    session: &mut ChatSession,
    catalog: &CatalogState,
    state: &mut ChatViewState,
) -> Option<String> {
    let selected_id = state.selected_integration.clone()?;
    let Some(integration) = catalog.find(&selected_id) else {
        state.clear_selection();
        return None;
    };

    let mut dispatch = None;
    theme.card_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(&integration.name)
                    .color(theme.text_primary)
                    .strong()
                    .size(14.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(RichText::new("✕").color(theme.danger)).frame(false))
                    .clicked()
                {
                    state.clear_selection();
                }
            });
        });

        ui.label(
            RichText::new(format!("Select up to {MAX_SELECTED_ACTIONS} options:"))
                .color(theme.text_muted)
                .size(11.0),
        );

        for action in &integration.actions {
            let selected = state.selected_actions.contains(&action.id);
            let selectable = selected || state.selected_actions.len() < MAX_SELECTED_ACTIONS;

            let fill = if selected {
                theme.surface_3
            } else {
                theme.surface_2
            };
            let description = if action.description.is_empty() {
                "No description"
            } else {
                action.description.as_str()
            };

            let response = ui.add_enabled(
                selectable,
                egui::Button::new(
                    RichText::new(format!("{}\n{description}", action.name)).size(12.0),
                )
                .fill(fill)
                .stroke(theme.subtle_button_stroke())
                .wrap(),
            );
            if response.clicked() {
                if selected {
                    state.selected_actions.retain(|id| id != &action.id);
                } else {
                    state.selected_actions.push(action.id.clone());
                }
            }
        }

        if !state.selected_actions.is_empty() && !state.show_type_selection {
            if ui
                .add(
                    egui::Button::new(
                        RichText::new("Send selection").color(theme.text_on_accent),
                    )
                    .fill(theme.accent_primary)
                    .stroke(theme.primary_button_stroke()),
                )
                .clicked()
            {
                state.show_type_selection = true;
            }
        }

        if state.show_type_selection {
            ui.separator();
            ui.label(
                RichText::new("What do you want to create?")
                    .color(theme.text_muted)
                    .size(11.0),
            );
            ui.horizontal(|ui| {
                for kind in ["integration", "AI agent"] {
                    if ui
                        .add(egui::Button::new(kind).stroke(theme.subtle_button_stroke()))
                        .clicked()
                    {
                        let names = selected_action_names(integration, &state.selected_actions);
                        let message =
                            compose_selection_message(kind, &integration.name, &names);
                        dispatch = session.begin_send(&message);
                    }
                }
            });
            if ui
                .add(
                    egui::Button::new(RichText::new("Cancel").color(theme.danger))
                        .stroke(theme.subtle_button_stroke()),
                )
                .clicked()
            {
                state.show_type_selection = false;
            }
        }
    });
    ui.add_space(theme.spacing_8);

    dispatch
}

fn selected_action_names(integration: &Integration, selected_ids: &[String]) -> Vec<String> {
    selected_ids
        .iter()
        .filter_map(|id| {
            integration
                .actions
                .iter()
                .find(|action| &action.id == id)
                .map(|action| action.name.clone())
        })
        .collect()
}

fn render_composer(
    ui: &mut egui::Ui,
    theme: &Theme,
    session: &mut ChatSession,
    state: &mut ChatViewState,
) -> Option<String> {
    let mut dispatch = None;
    let input_enabled = !session.is_busy();
    let hint = if session.is_busy() {
        "Waiting for response..."
    } else {
        "Message..."
    };

    theme.composer_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            let plus_label = if state.dropdown_open { "+ ▲" } else { "+ ▼" };
            if ui
                .add(egui::Button::new(plus_label).frame(false))
                .clicked()
            {
                if state.dropdown_open {
                    state.dropdown_open = false;
                    // Backing out before saying anything returns to the hero
                    // state.
                    if !session.has_user_messages() {
                        session.clear();
                        state.clear_selection();
                    }
                } else {
                    if session.is_empty() {
                        session.push_assistant_note(SELECTION_PROMPT);
                    }
                    state.dropdown_open = true;
                }
            }

            let mut send_now = false;
            let response = ui.add_enabled(
                input_enabled,
                egui::TextEdit::singleline(&mut state.input)
                    .desired_width(ui.available_width() - 70.0)
                    .hint_text(hint),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            let send_enabled = input_enabled && !state.input.trim().is_empty();
            send_now |= ui
                .add_enabled(
                    send_enabled,
                    egui::Button::new(RichText::new("Send").color(theme.text_on_accent))
                        .fill(if send_enabled {
                            theme.accent_primary
                        } else {
                            Color32::from_gray(120)
                        }),
                )
                .clicked();

            if send_now && input_enabled {
                if let Some(sent) = session.begin_send(&state.input) {
                    state.input.clear();
                    dispatch = Some(sent);
                }
            }
        });
    });

    dispatch
}
