use crate::catalog::Integration;
use crate::insights::{GroupedInsights, InsightData};

// Completed background work, delivered to the UI thread over the mpsc
// channel and drained once per frame.
#[derive(Debug, Clone)]
pub enum AppEvent {
    CatalogLoaded(Vec<Integration>),
    CatalogFailed(String),
    InsightsLoaded {
        insights: Vec<InsightData>,
        grouped: GroupedInsights,
    },
    InsightsFailed(String),
    ChatReply(String),
    ChatFailed(String),
}
