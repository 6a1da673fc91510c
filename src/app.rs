use crate::api::ApiClient;
use crate::catalog::Integration;
use crate::event::AppEvent;
use crate::insights::{GroupedInsights, InsightData};
use crate::prefs::{self, StoragePort};
use crate::session::ChatSession;
use crate::theme::{Theme, ThemeMode};
use crate::ui;
use crate::ui::chat::ChatViewState;
use crate::ui::detail::DetailAction;
use eframe::egui;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

const COPIED_INDICATOR_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Chat,
    Integrations,
    IntegrationDetail(String),
    Insights,
    Guide,
}

impl Route {
    fn title(&self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Integrations | Self::IntegrationDetail(_) => "Integrations",
            Self::Insights => "Insights",
            Self::Guide => "Guide",
        }
    }
}

// Catalog fetch lifecycle. Concurrent refetches are not deduplicated; the
// last response to arrive wins.
pub struct CatalogState {
    pub integrations: Vec<Integration>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            integrations: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply_loaded(&mut self, integrations: Vec<Integration>) {
        self.integrations = integrations;
        self.loading = false;
        self.error = None;
    }

    // Previously held data stays in place so the view can keep rendering it.
    pub fn apply_failed(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    pub fn find(&self, id: &str) -> Option<&Integration> {
        let id = id.to_lowercase();
        self.integrations
            .iter()
            .find(|integration| integration.id == id)
    }
}

pub struct InsightState {
    pub insights: Vec<InsightData>,
    pub grouped: GroupedInsights,
    pub loading: bool,
    pub error: Option<String>,
}

impl InsightState {
    pub fn new() -> Self {
        Self {
            insights: Vec::new(),
            grouped: GroupedInsights::default(),
            loading: true,
            error: None,
        }
    }

    pub fn apply_loaded(&mut self, insights: Vec<InsightData>, grouped: GroupedInsights) {
        self.insights = insights;
        self.grouped = grouped;
        self.loading = false;
        self.error = None;
    }

    pub fn apply_failed(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }
}

struct CopiedIndicator {
    action_id: String,
    since: Instant,
}

pub struct TangramApp {
    rx: Receiver<AppEvent>,
    api: ApiClient,
    route: Route,
    theme: Theme,
    theme_applied: bool,
    session: ChatSession,
    chat_view: ChatViewState,
    catalog: CatalogState,
    insights: InsightState,
    storage: Box<dyn StoragePort>,
    sidebar_open: bool,
    copied: Option<CopiedIndicator>,
    integrations_search: String,
    insights_search: String,
}

impl TangramApp {
    pub fn new(rx: Receiver<AppEvent>, api: ApiClient, storage: Box<dyn StoragePort>) -> Self {
        let sidebar_open = prefs::initial_sidebar_open(storage.as_ref());

        // Both remote providers fire exactly one fetch on construction.
        let mut catalog = CatalogState::new();
        catalog.begin_fetch();
        api.fetch_catalog();
        let insights = InsightState::new();
        api.fetch_insights();

        Self {
            rx,
            api,
            route: Route::Chat,
            theme: Theme::for_mode(ThemeMode::Dark),
            theme_applied: false,
            session: ChatSession::default(),
            chat_view: ChatViewState::default(),
            catalog,
            insights,
            storage,
            sidebar_open,
            copied: None,
            integrations_search: String::new(),
            insights_search: String::new(),
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CatalogLoaded(integrations) => self.catalog.apply_loaded(integrations),
            AppEvent::CatalogFailed(message) => self.catalog.apply_failed(message),
            AppEvent::InsightsLoaded { insights, grouped } => {
                self.insights.apply_loaded(insights, grouped)
            }
            AppEvent::InsightsFailed(message) => self.insights.apply_failed(message),
            AppEvent::ChatReply(body) => {
                self.session.apply_reply(&body);
                self.chat_view.scroll_to_bottom = true;
            }
            AppEvent::ChatFailed(message) => {
                self.session.apply_error(&message);
                self.chat_view.scroll_to_bottom = true;
            }
        }
    }

    fn expire_copied_indicator(&mut self, ctx: &egui::Context) {
        if let Some(copied) = &self.copied {
            let elapsed = copied.since.elapsed();
            if elapsed >= COPIED_INDICATOR_TTL {
                self.copied = None;
            } else {
                ctx.request_repaint_after(COPIED_INDICATOR_TTL - elapsed);
            }
        }
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        prefs::save_sidebar_state(self.storage.as_mut(), self.sidebar_open);
    }

    fn toggle_theme(&mut self) {
        self.theme = Theme::for_mode(self.theme.mode.toggled());
        self.theme_applied = false;
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut toggle_theme = false;
        let mut refetch = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(self.route.title());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let theme_label = match self.theme.mode {
                        ThemeMode::Dark => "Light mode",
                        ThemeMode::Light => "Dark mode",
                    };
                    if ui.button(theme_label).clicked() {
                        toggle_theme = true;
                    }
                    if matches!(self.route, Route::Integrations | Route::IntegrationDetail(_))
                        && ui.button("Refresh").clicked()
                    {
                        refetch = true;
                    }
                });
            });
        });

        if toggle_theme {
            self.toggle_theme();
        }
        if refetch {
            self.catalog.begin_fetch();
            self.api.fetch_catalog();
        }
    }

    fn render_central(&mut self, ctx: &egui::Context) {
        let frame = egui::Frame::new()
            .fill(self.theme.surface_1)
            .inner_margin(egui::Margin::same(self.theme.spacing_16 as i8));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            match self.route.clone() {
                Route::Chat => {
                    if let Some(message) = ui::chat::render(
                        ui,
                        &self.theme,
                        &mut self.session,
                        &self.catalog,
                        &mut self.chat_view,
                    ) {
                        self.api.send_chat(message);
                    }
                }
                Route::Integrations => {
                    if let Some(route) = ui::integrations::render(
                        ui,
                        &self.theme,
                        &self.catalog,
                        &mut self.integrations_search,
                    ) {
                        self.route = route;
                    }
                }
                Route::IntegrationDetail(id) => {
                    let copied_id = self.copied.as_ref().map(|c| c.action_id.clone());
                    match ui::detail::render(
                        ui,
                        &self.theme,
                        &self.catalog,
                        &id,
                        copied_id.as_deref(),
                    ) {
                        Some(DetailAction::Navigate(route)) => self.route = route,
                        Some(DetailAction::CopyEndpoint {
                            action_id,
                            endpoint,
                        }) => {
                            ui.ctx().copy_text(endpoint);
                            self.copied = Some(CopiedIndicator {
                                action_id,
                                since: Instant::now(),
                            });
                        }
                        None => {}
                    }
                }
                Route::Insights => {
                    ui::insights::render(
                        ui,
                        &self.theme,
                        &self.insights,
                        &mut self.insights_search,
                    );
                }
                Route::Guide => ui::guide::render(ui, &self.theme),
            }
        });
    }
}

impl eframe::App for TangramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }

        self.drain_events(ctx);
        self.expire_copied_indicator(ctx);

        self.render_top_bar(ctx);
        let sidebar = ui::sidebar::render(ctx, &self.theme, &self.route, self.sidebar_open);
        if sidebar.toggled {
            self.toggle_sidebar();
        }
        if let Some(route) = sidebar.navigate {
            if route != self.route {
                self.integrations_search.clear();
            }
            self.route = route;
        }

        self.render_central(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::group_insights;

    fn integration(id: &str, name: &str) -> Integration {
        Integration {
            id: id.to_string(),
            name: name.to_string(),
            category: "CRM".to_string(),
            description: format!("Integration with {name}"),
            actions: Vec::new(),
        }
    }

    #[test]
    fn first_load_failure_reports_error_and_keeps_data_empty() {
        let mut state = CatalogState::new();
        state.begin_fetch();
        state.apply_failed("HTTP error: status 500".to_string());

        assert!(!state.loading);
        assert!(state.integrations.is_empty());
        let error = state.error.as_deref().expect("error should be recorded");
        assert!(!error.is_empty());
    }

    #[test]
    fn refetch_failure_keeps_previous_catalog() {
        let mut state = CatalogState::new();
        state.apply_loaded(vec![integration("asaas", "Asaas")]);

        state.begin_fetch();
        assert!(state.error.is_none());
        state.apply_failed("request failed: connection refused".to_string());

        assert_eq!(state.integrations.len(), 1);
        assert!(state.error.is_some());
    }

    #[test]
    fn late_response_overwrites_earlier_one() {
        let mut state = CatalogState::new();
        state.apply_loaded(vec![integration("asaas", "Asaas")]);
        state.apply_loaded(vec![
            integration("asaas", "Asaas"),
            integration("pipedrive", "Pipedrive"),
        ]);

        assert_eq!(state.integrations.len(), 2);
    }

    #[test]
    fn find_matches_ids_case_insensitively() {
        let mut state = CatalogState::new();
        state.apply_loaded(vec![integration("rd-station", "RD Station")]);

        assert!(state.find("rd-station").is_some());
        assert!(state.find("RD-Station").is_some());
        assert!(state.find("unknown").is_none());
    }

    #[test]
    fn insight_failure_after_load_keeps_groups() {
        let rows = vec![InsightData {
            row_number: 1,
            system: "Asaas".to_string(),
            insight: "x".to_string(),
            kind: None,
        }];

        let mut state = InsightState::new();
        state.apply_loaded(rows.clone(), group_insights(&rows));
        state.apply_failed("HTTP error: status 502".to_string());

        assert_eq!(state.grouped.system_count(), 1);
        assert!(state.error.is_some());
    }
}
