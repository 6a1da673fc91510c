use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// Key names match the remote spreadsheet columns verbatim, emoji included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogRow {
    #[serde(default)]
    pub row_number: Option<i64>,
    #[serde(rename = "Sistema", default)]
    pub system: Option<String>,
    #[serde(rename = "Categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "Ações Possíveis", default)]
    pub action_name: Option<String>,
    #[serde(rename = "Método / Endpoint", default)]
    pub method_endpoint: Option<String>,
    #[serde(rename = "Autenticação", default)]
    pub authentication: Option<String>,
    #[serde(rename = "Descrição", default)]
    pub description: Option<String>,
    #[serde(rename = "📝 Observações", default)]
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub authentication: String,
    pub description: String,
    pub observations: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub actions: Vec<Action>,
}

impl Integration {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.category.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self
                .actions
                .iter()
                .any(|action| action.description.to_lowercase().contains(&term))
    }
}

pub const NO_CATEGORY: &str = "No category";
pub const AUTH_NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_ACTION_NAME: &str = "Integration";

static METHOD_ENDPOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(GET|POST|PUT|DELETE|PATCH)\s*-\s*(.+)$").expect("method/endpoint pattern")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

// Lower-cased system name with whitespace runs collapsed to single hyphens.
// Nothing else is sanitized, so two distinct names can normalize to the same
// id; callers must not key a deduplicating store on it.
pub fn integration_id(system: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&system.to_lowercase(), "-")
        .into_owned()
}

// Splits "<METHOD> - <endpoint>". Anything that does not match the strict
// pattern degrades to GET with the raw text as endpoint.
pub fn parse_method_endpoint(raw: &str) -> (HttpMethod, String) {
    if let Some(captures) = METHOD_ENDPOINT.captures(raw) {
        let method = HttpMethod::from_keyword(&captures[1]).unwrap_or(HttpMethod::Get);
        (method, captures[2].to_string())
    } else {
        (HttpMethod::Get, raw.to_string())
    }
}

// Accepts the decoded webhook payload. Anything that is not a JSON array is
// treated as an empty catalog rather than an error.
pub fn rows_from_payload(payload: &Value) -> Vec<RawCatalogRow> {
    let Value::Array(items) = payload else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| RawCatalogRow::deserialize(item).unwrap_or_default())
        .collect()
}

pub fn normalize_catalog(rows: &[RawCatalogRow]) -> Vec<Integration> {
    // Stable grouping: group order and row order within a group both follow
    // first appearance in the payload.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&RawCatalogRow>> = HashMap::new();

    for row in rows {
        let system = row.system.clone().unwrap_or_default();
        let group = groups.entry(system.clone()).or_default();
        if group.is_empty() {
            order.push(system);
        }
        group.push(row);
    }

    order
        .into_iter()
        .filter_map(|system| {
            let rows = groups.remove(&system)?;
            Some(integration_from_group(&system, &rows))
        })
        .collect()
}

fn integration_from_group(system: &str, rows: &[&RawCatalogRow]) -> Integration {
    let actions = rows
        .iter()
        .enumerate()
        .map(|(index, row)| action_from_row(system, index, row))
        .collect();

    let category = rows
        .first()
        .and_then(|row| row.category.as_deref())
        .filter(|category| !category.is_empty())
        .unwrap_or(NO_CATEGORY)
        .to_string();

    Integration {
        id: integration_id(system),
        name: system.to_string(),
        category,
        description: format!("Integration with {system}"),
        actions,
    }
}

fn action_from_row(system: &str, index: usize, row: &RawCatalogRow) -> Action {
    let (method, endpoint) = parse_method_endpoint(row.method_endpoint.as_deref().unwrap_or(""));

    Action {
        id: format!("{system}-{index}"),
        name: row
            .action_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTION_NAME.to_string()),
        method,
        endpoint,
        authentication: row
            .authentication
            .clone()
            .unwrap_or_else(|| AUTH_NOT_SPECIFIED.to_string()),
        description: row.description.clone().unwrap_or_default(),
        observations: row.observations.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(system: &str, method_endpoint: &str) -> RawCatalogRow {
        RawCatalogRow {
            system: Some(system.to_string()),
            method_endpoint: Some(method_endpoint.to_string()),
            ..RawCatalogRow::default()
        }
    }

    #[test]
    fn method_endpoint_splits_on_method_prefix() {
        let (method, endpoint) = parse_method_endpoint("POST - https://api.example.com/x");
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(endpoint, "https://api.example.com/x");
    }

    #[test]
    fn method_endpoint_without_prefix_defaults_to_get() {
        let (method, endpoint) = parse_method_endpoint("https://api.example.com/x");
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(endpoint, "https://api.example.com/x");
    }

    #[test]
    fn method_endpoint_handles_empty_field() {
        let (method, endpoint) = parse_method_endpoint("");
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(endpoint, "");
    }

    #[test]
    fn method_keyword_match_is_case_sensitive() {
        let (method, endpoint) = parse_method_endpoint("post - https://api.example.com/x");
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(endpoint, "post - https://api.example.com/x");
    }

    #[test]
    fn integration_id_lowercases_and_hyphenates() {
        assert_eq!(integration_id("RD Station"), "rd-station");
        assert_eq!(integration_id("Asaas"), "asaas");
        assert_eq!(integration_id("Foo   Bar"), "foo-bar");
    }

    #[test]
    fn grouping_preserves_first_seen_order_and_drops_nothing() {
        let rows = vec![
            row("Pipedrive", "GET - https://api.pipedrive.com/deals"),
            row("Asaas", "POST - https://api.asaas.com/v3/payments"),
            row("Pipedrive", "POST - https://api.pipedrive.com/persons"),
        ];

        let catalog = normalize_catalog(&rows);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "Pipedrive");
        assert_eq!(catalog[1].name, "Asaas");

        let total_actions: usize = catalog.iter().map(|i| i.actions.len()).sum();
        assert_eq!(total_actions, rows.len());

        assert_eq!(catalog[0].actions[0].id, "Pipedrive-0");
        assert_eq!(catalog[0].actions[1].id, "Pipedrive-1");
        assert_eq!(
            catalog[0].actions[1].endpoint,
            "https://api.pipedrive.com/persons"
        );
    }

    #[test]
    fn defaults_apply_to_absent_fields() {
        let rows = vec![RawCatalogRow {
            system: Some("Asaas".to_string()),
            ..RawCatalogRow::default()
        }];

        let catalog = normalize_catalog(&rows);
        let action = &catalog[0].actions[0];
        assert_eq!(action.name, DEFAULT_ACTION_NAME);
        assert_eq!(action.method, HttpMethod::Get);
        assert_eq!(action.endpoint, "");
        assert_eq!(action.authentication, AUTH_NOT_SPECIFIED);
        assert_eq!(action.description, "");
        assert_eq!(action.observations, "");
        assert_eq!(catalog[0].category, NO_CATEGORY);
        assert_eq!(catalog[0].description, "Integration with Asaas");
    }

    #[test]
    fn present_empty_description_is_kept_distinct_from_absent() {
        let mut with_empty = row("Asaas", "");
        with_empty.description = Some(String::new());
        let catalog = normalize_catalog(&[with_empty]);
        assert_eq!(catalog[0].actions[0].description, "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let rows = vec![
            row("RD Station", "POST - https://api.rd.services/conversions"),
            row("RD Station", "GET - https://api.rd.services/contacts"),
        ];

        let first = normalize_catalog(&rows);
        let second = normalize_catalog(&rows);
        assert_eq!(first, second);
    }

    #[test]
    fn non_array_payload_yields_empty_catalog() {
        assert!(rows_from_payload(&json!({"message": "no rows"})).is_empty());
        assert!(rows_from_payload(&Value::Null).is_empty());
    }

    #[test]
    fn payload_rows_bind_the_verbatim_column_keys() {
        let payload = json!([{
            "row_number": 2,
            "Sistema": "Asaas",
            "Categoria": "Finance / ERP",
            "Ações Possíveis": "Create charge",
            "Método / Endpoint": "POST - https://api.asaas.com/v3/payments",
            "Autenticação": "API token via HTTP header",
            "Descrição": "Creates a charge.",
            "📝 Observações": "Requires customer and value."
        }]);

        let rows = rows_from_payload(&payload);
        let catalog = normalize_catalog(&rows);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, "asaas");
        assert_eq!(catalog[0].category, "Finance / ERP");

        let action = &catalog[0].actions[0];
        assert_eq!(action.name, "Create charge");
        assert_eq!(action.method, HttpMethod::Post);
        assert_eq!(action.observations, "Requires customer and value.");
    }
}
