use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

// An em dash inside the insight text separates a short benefit headline from
// the longer body. The delimiter is a content convention, not a wire field.
const BENEFIT_DELIMITER: char = '—';

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InsightData {
    #[serde(default)]
    pub row_number: i64,
    #[serde(rename = "Sistema", default)]
    pub system: String,
    #[serde(rename = "Insight", default)]
    pub insight: String,
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
}

impl InsightData {
    pub fn benefit(&self) -> &str {
        match self.insight.split_once(BENEFIT_DELIMITER) {
            Some((headline, _)) => headline.trim(),
            None => self.insight.trim(),
        }
    }

    pub fn body(&self) -> &str {
        match self.insight.split_once(BENEFIT_DELIMITER) {
            Some((_, body)) => body.trim(),
            None => self.insight.trim(),
        }
    }

    pub fn kind_label(&self) -> String {
        match self.kind.as_deref().map(str::to_lowercase).as_deref() {
            Some("agent") => "AI Agent".to_string(),
            Some("integration") => "Integration".to_string(),
            _ => format!("Possibility #{}", self.row_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightGroup {
    pub system: String,
    pub insights: Vec<InsightData>,
}

// Groups keep the order in which systems first appear in the payload; rows
// inside a group keep input order. Display-time sorting by row number is the
// view's concern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedInsights {
    groups: Vec<InsightGroup>,
}

impl GroupedInsights {
    pub fn groups(&self) -> &[InsightGroup] {
        &self.groups
    }

    pub fn get(&self, system: &str) -> Option<&InsightGroup> {
        self.groups.iter().find(|group| group.system == system)
    }

    pub fn system_count(&self) -> usize {
        self.groups.len()
    }

    pub fn insight_count(&self) -> usize {
        self.groups.iter().map(|group| group.insights.len()).sum()
    }
}

// The endpoint answers with either a bare array or an object carrying the
// array under "data". Anything else is an empty result.
pub fn insights_from_payload(payload: &Value) -> Vec<InsightData> {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .map(|item| InsightData::deserialize(item).unwrap_or_default())
        .collect()
}

pub fn group_insights(insights: &[InsightData]) -> GroupedInsights {
    let mut groups: Vec<InsightGroup> = Vec::new();

    for insight in insights {
        match groups.iter_mut().find(|group| group.system == insight.system) {
            Some(group) => group.insights.push(insight.clone()),
            None => groups.push(InsightGroup {
                system: insight.system.clone(),
                insights: vec![insight.clone()],
            }),
        }
    }

    GroupedInsights { groups }
}

static STEP_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d+\)[^()]*").expect("step item pattern"));

static STEP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\d+\)\s*").expect("step marker pattern"));

// Bodies often enumerate steps as "(1) do this (2) do that". Returns the
// text preceding the enumeration plus the step texts without their markers;
// without an enumeration the whole body is the intro.
pub fn split_steps(body: &str) -> (&str, Vec<String>) {
    let Some(first) = STEP_ITEM.find(body) else {
        return (body, Vec::new());
    };

    let steps = STEP_ITEM
        .find_iter(body)
        .map(|item| STEP_MARKER.replace(item.as_str(), "").trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();

    (body[..first.start()].trim(), steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insight(row_number: i64, system: &str, text: &str) -> InsightData {
        InsightData {
            row_number,
            system: system.to_string(),
            insight: text.to_string(),
            kind: None,
        }
    }

    #[test]
    fn grouping_preserves_first_seen_system_order() {
        let rows = vec![
            insight(3, "Pipedrive", "a"),
            insight(1, "Asaas", "b"),
            insight(2, "Pipedrive", "c"),
        ];

        let grouped = group_insights(&rows);
        assert_eq!(grouped.system_count(), 2);
        assert_eq!(grouped.groups()[0].system, "Pipedrive");
        assert_eq!(grouped.groups()[1].system, "Asaas");
        assert_eq!(grouped.insight_count(), rows.len());

        let pipedrive = grouped.get("Pipedrive").expect("group should exist");
        assert_eq!(pipedrive.insights[0].row_number, 3);
        assert_eq!(pipedrive.insights[1].row_number, 2);
    }

    #[test]
    fn benefit_and_body_split_on_the_delimiter() {
        let data = insight(1, "Asaas", "Faster billing — Automate charge creation on new deals.");
        assert_eq!(data.benefit(), "Faster billing");
        assert_eq!(data.body(), "Automate charge creation on new deals.");
    }

    #[test]
    fn text_without_delimiter_serves_as_both_halves() {
        let data = insight(1, "Asaas", "Automate charge creation.");
        assert_eq!(data.benefit(), "Automate charge creation.");
        assert_eq!(data.body(), "Automate charge creation.");
    }

    #[test]
    fn kind_label_recognizes_known_tags() {
        let mut data = insight(7, "Asaas", "x");
        assert_eq!(data.kind_label(), "Possibility #7");

        data.kind = Some("Agent".to_string());
        assert_eq!(data.kind_label(), "AI Agent");

        data.kind = Some("integration".to_string());
        assert_eq!(data.kind_label(), "Integration");

        data.kind = Some("something else".to_string());
        assert_eq!(data.kind_label(), "Possibility #7");
    }

    #[test]
    fn payload_accepts_bare_array_and_nested_data_field() {
        let bare = json!([{"row_number": 1, "Sistema": "Asaas", "Insight": "x"}]);
        assert_eq!(insights_from_payload(&bare).len(), 1);

        let nested = json!({"data": [{"row_number": 2, "Sistema": "Asaas", "Insight": "y"}]});
        let rows = insights_from_payload(&nested);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);

        assert!(insights_from_payload(&json!({"status": "empty"})).is_empty());
        assert!(insights_from_payload(&Value::Null).is_empty());
    }

    #[test]
    fn split_steps_separates_intro_from_numbered_items() {
        let (intro, steps) =
            split_steps("Steps: (1) Create the webhook (2) Map the fields (3) Enable it");
        assert_eq!(intro, "Steps:");
        assert_eq!(
            steps,
            vec![
                "Create the webhook".to_string(),
                "Map the fields".to_string(),
                "Enable it".to_string(),
            ]
        );
    }

    #[test]
    fn split_steps_without_enumeration_keeps_the_whole_body() {
        let (intro, steps) = split_steps("No steps here.");
        assert_eq!(intro, "No steps here.");
        assert!(steps.is_empty());
    }
}
