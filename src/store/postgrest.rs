use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::visibility::{TaskCondition, Visibility};
use crate::error::{Error, Result};
use crate::query::TaskQuery;

/// Timestamp rendering for filter values; the store's timestamp columns are
/// timezone-naive.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone)]
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl PostgrestClient {
    /// `base_url` is the REST root, e.g. `https://proj.example.co/rest/v1`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::store(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    /// Fetch all rows matching `params`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>> {
        let resp = self
            .request(Method::GET, table)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::store(format!("GET {} failed: {}", table, e)))?;
        let resp = check_status(resp, table).await?;
        resp.json()
            .await
            .map_err(|e| Error::store(format!("failed to decode {} rows: {}", table, e)))
    }

    /// Fetch one zero-based inclusive row window plus the exact count of
    /// all matching rows. The count rides the Content-Range header, so rows
    /// and total arrive atomically in a single response.
    pub async fn select_range<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(String, String)],
        window: (u64, u64),
    ) -> Result<(Vec<T>, u64)> {
        let resp = self
            .request(Method::GET, table)
            .query(params)
            .header("Prefer", "count=exact")
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", window.0, window.1))
            .send()
            .await
            .map_err(|e| Error::store(format!("GET {} failed: {}", table, e)))?;
        let resp = check_status(resp, table).await?;

        let total = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                Error::store(format!("{}: response carried no row count", table))
            })?;

        let rows = resp
            .json()
            .await
            .map_err(|e| Error::store(format!("failed to decode {} rows: {}", table, e)))?;
        Ok((rows, total))
    }

    /// Insert one row and return it as stored.
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .request(Method::POST, table)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::store(format!("POST {} failed: {}", table, e)))?;
        single_row(check_status(resp, table).await?, table).await
    }

    /// Patch the rows matching `params` and return the first as stored.
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        params: &[(String, String)],
        body: &B,
    ) -> Result<T> {
        let resp = self
            .request(Method::PATCH, table)
            .query(params)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::store(format!("PATCH {} failed: {}", table, e)))?;
        single_row(check_status(resp, table).await?, table).await
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Non-2xx responses surface the store's body verbatim.
async fn check_status(resp: reqwest::Response, table: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() || status == StatusCode::PARTIAL_CONTENT {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    log::warn!("store rejected {} request ({}): {}", table, status, body);
    Err(Error::store(format!("{} ({}): {}", table, status, body)))
}

async fn single_row<T: DeserializeOwned>(resp: reqwest::Response, table: &str) -> Result<T> {
    let mut rows: Vec<T> = resp
        .json()
        .await
        .map_err(|e| Error::store(format!("failed to decode {} row: {}", table, e)))?;
    match rows.pop() {
        Some(row) if rows.is_empty() => Ok(row),
        Some(_) => Err(Error::store(format!("{}: expected one row back", table))),
        None => Err(Error::store(format!("{}: no row returned", table))),
    }
}

/// Total from a `Content-Range` value such as `0-19/57` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

// --- Query rendering ---
//
// The only place the structured predicate becomes wire syntax. Everything
// else in the crate handles typed conditions.

/// Render a task query into PostgREST filter parameters (everything except
/// the row window, which travels as a Range header).
pub fn task_query_params(query: &TaskQuery) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();

    if let Some(title) = &query.title_contains {
        params.push(("title".into(), format!("ilike.{}", ilike_pattern(title))));
    }
    if let Some(client) = &query.client_contains {
        params.push(("client".into(), format!("ilike.{}", ilike_pattern(client))));
    }
    if let Some(lower) = query.due_lower_bound() {
        params.push((
            "due_date".into(),
            format!("gte.{}", lower.format(TIMESTAMP_FORMAT)),
        ));
    }
    if let Some(upper) = query.due_upper_bound() {
        params.push((
            "due_date".into(),
            format!("lte.{}", upper.format(TIMESTAMP_FORMAT)),
        ));
    }
    if let Some(or_clause) = render_visibility(&query.visibility) {
        params.push(("or".into(), or_clause));
    }
    params.push(("order".into(), "due_date.asc".into()));
    params
}

/// The OR-combined visibility conditions, or `None` when no predicate
/// applies. `Nothing` must be short-circuited by the caller and never
/// reaches the wire.
fn render_visibility(visibility: &Visibility) -> Option<String> {
    match visibility {
        Visibility::Unrestricted | Visibility::Nothing => None,
        Visibility::AnyOf(conditions) => {
            let rendered: Vec<String> = conditions.iter().map(render_condition).collect();
            Some(format!("({})", rendered.join(",")))
        }
    }
}

fn render_condition(condition: &TaskCondition) -> String {
    match condition {
        TaskCondition::AssignerIs(id) => format!("assigner_telegram_id.eq.{}", id),
        TaskCondition::AssigneeIs(id) => format!("assignee_telegram_id.eq.{}", id),
        TaskCondition::AssigneeIn(ids) => {
            let list: Vec<String> = ids.iter().map(i64::to_string).collect();
            format!("assignee_telegram_id.in.({})", list.join(","))
        }
    }
}

/// Wildcard-wrapped substring pattern. Values containing characters the
/// filter grammar reserves are double-quoted with backslash escapes.
fn ilike_pattern(substring: &str) -> String {
    let pattern = format!("*{}*", substring);
    let reserved = pattern
        .chars()
        .any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\') || c.is_whitespace());
    if reserved {
        format!(
            "\"{}\"",
            pattern.replace('\\', "\\\\").replace('"', "\\\"")
        )
    } else {
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-19/57"), Some(57));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-19/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn plain_substring_renders_unquoted() {
        assert_eq!(ilike_pattern("report"), "*report*");
    }

    #[test]
    fn reserved_characters_are_quoted() {
        assert_eq!(ilike_pattern("a,b"), "\"*a,b*\"");
        assert_eq!(ilike_pattern("say \"hi\""), "\"*say \\\"hi\\\"*\"");
        assert_eq!(ilike_pattern("two words"), "\"*two words*\"");
    }

    #[test]
    fn full_query_renders_all_filters() {
        let visibility = Visibility::AnyOf(vec![
            TaskCondition::AssignerIs(100),
            TaskCondition::AssigneeIs(100),
            TaskCondition::AssigneeIn(vec![200, 300]),
        ]);
        let query = TaskQuery::new(visibility)
            .with_title("report")
            .with_client("acme")
            .with_due_from(NaiveDate::from_ymd_opt(2026, 3, 1))
            .with_due_to(NaiveDate::from_ymd_opt(2026, 3, 5));

        let params = task_query_params(&query);
        assert_eq!(lookup(&params, "title"), vec!["ilike.*report*"]);
        assert_eq!(lookup(&params, "client"), vec!["ilike.*acme*"]);
        assert_eq!(
            lookup(&params, "due_date"),
            vec!["gte.2026-03-01T00:00:00", "lte.2026-03-05T23:59:59"]
        );
        assert_eq!(
            lookup(&params, "or"),
            vec![
                "(assigner_telegram_id.eq.100,assignee_telegram_id.eq.100,assignee_telegram_id.in.(200,300))"
            ]
        );
        assert_eq!(lookup(&params, "order"), vec!["due_date.asc"]);
    }

    #[test]
    fn unrestricted_query_has_no_or_clause() {
        let params = task_query_params(&TaskQuery::new(Visibility::Unrestricted));
        assert!(lookup(&params, "or").is_empty());
        assert_eq!(lookup(&params, "order"), vec!["due_date.asc"]);
    }
}
