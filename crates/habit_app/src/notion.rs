use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use habit_domain::habit::HabitDefinition;
use habit_domain::source::{Collection, DayRecord, FieldValue, HabitDataSource, SourceError};

const NOTION_API_VERSION: &str = "2022-06-28";
const API_BASE: &str = "https://api.notion.com/v1";

/// Blocking client for the Notion habit databases. Implements the data
/// source contract the domain pipeline consumes.
pub struct NotionClient {
    http: Client,
    api_token: String,
    database_id: String,
    habits_database_id: Option<String>,
}

impl NotionClient {
    pub fn new(config: &crate::config::NotionConfig) -> Self {
        Self {
            http: Client::new(),
            api_token: config.api_token.clone(),
            database_id: format_uuid(&config.database_id),
            habits_database_id: config.habits_database_id.as_deref().map(format_uuid),
        }
    }

    fn query_database(&self, database_id: &str, body: Value) -> Result<Value, SourceError> {
        let url = format!("{API_BASE}/databases/{database_id}/query");
        debug!(%url, "querying database");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Notion-Version", NOTION_API_VERSION)
            .json(&body)
            .send()
            .map_err(|err| SourceError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        response
            .json()
            .map_err(|err| SourceError::Malformed(err.to_string()))
    }

    fn query_results(&self, database_id: &str, body: Value) -> Result<Vec<Value>, SourceError> {
        let response = self.query_database(database_id, body)?;
        match response.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            _ => Err(SourceError::Malformed(
                "query response has no results array".to_string(),
            )),
        }
    }

    /// Habit definitions from the habits database, in `Sort order`. Retired
    /// habits are included so historical days still aggregate correctly.
    pub fn fetch_habit_definitions(&self) -> Result<Vec<HabitDefinition>, SourceError> {
        let database_id = self.habits_database_id.as_deref().ok_or_else(|| {
            SourceError::Malformed("no habits database configured".to_string())
        })?;
        info!("fetching habit definitions");
        let results = self.query_results(
            database_id,
            json!({
                "sorts": [{ "property": "Sort order", "direction": "ascending" }],
            }),
        )?;
        let habits: Vec<HabitDefinition> =
            results.iter().filter_map(parse_habit_definition).collect();
        info!(count = habits.len(), "loaded habit definitions");
        Ok(habits)
    }
}

impl HabitDataSource for NotionClient {
    fn record_for(&self, date: NaiveDate) -> Result<Option<DayRecord>, SourceError> {
        let results = self.query_results(
            &self.database_id,
            json!({
                "filter": { "property": "Date", "date": { "equals": date.to_string() } },
            }),
        )?;
        Ok(results.first().and_then(parse_record))
    }

    fn records_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayRecord>, SourceError> {
        let results = self.query_results(
            &self.database_id,
            json!({
                "filter": { "and": [
                    { "property": "Date", "date": { "on_or_after": start.to_string() } },
                    { "property": "Date", "date": { "on_or_before": end.to_string() } },
                ]},
            }),
        )?;
        Ok(results.iter().filter_map(parse_record).collect())
    }

    fn latest_edit(&self, collection: Collection) -> Result<String, SourceError> {
        let database_id = match collection {
            Collection::Tracking => self.database_id.as_str(),
            Collection::Definitions => self.habits_database_id.as_deref().unwrap_or_default(),
        };
        // The most recently edited page reflects data changes; the database
        // object itself only changes on schema edits.
        let results = self.query_results(
            database_id,
            json!({
                "sorts": [{ "timestamp": "last_edited_time", "direction": "descending" }],
                "page_size": 1,
            }),
        )?;
        Ok(results
            .first()
            .and_then(|page| page.get("last_edited_time"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn tracked_collections(&self) -> Vec<Collection> {
        if self.habits_database_id.is_some() {
            vec![Collection::Tracking, Collection::Definitions]
        } else {
            vec![Collection::Tracking]
        }
    }
}

/// Normalize a 32-char id to dashed UUID form; anything else passes through.
pub(crate) fn format_uuid(id: &str) -> String {
    let clean: String = id.chars().filter(|c| *c != '-' && *c != ' ').collect();
    // Slicing below is byte-indexed, so only reshape pure-ASCII ids.
    if clean.len() == 32 && clean.is_ascii() {
        format!(
            "{}-{}-{}-{}-{}",
            &clean[..8],
            &clean[8..12],
            &clean[12..16],
            &clean[16..20],
            &clean[20..]
        )
    } else {
        id.to_string()
    }
}

/// One tracking page into a day record, keyed by its `Date` property.
pub(crate) fn parse_record(page: &Value) -> Option<DayRecord> {
    let properties = page.get("properties")?.as_object()?;
    let date_str = properties
        .get("Date")?
        .get("date")?
        .get("start")?
        .as_str()?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

    let mut record = DayRecord::new(date);
    for (key, prop) in properties {
        record.fields.insert(key.clone(), parse_field(prop));
    }
    Some(record)
}

pub(crate) fn parse_field(prop: &Value) -> FieldValue {
    match prop.get("type").and_then(Value::as_str) {
        Some("checkbox") => {
            FieldValue::Checkbox(prop.get("checkbox").and_then(Value::as_bool).unwrap_or(false))
        }
        Some("number") => {
            FieldValue::Number(prop.get("number").and_then(Value::as_f64).unwrap_or(0.0))
        }
        Some("select") => FieldValue::Select(
            prop.get("select")
                .filter(|select| !select.is_null())
                .map(|select| {
                    select
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                }),
        ),
        _ => FieldValue::Other,
    }
}

pub(crate) fn parse_habit_definition(page: &Value) -> Option<HabitDefinition> {
    let props = page.get("properties")?;

    // `Name` (title) is the property key in the tracking database.
    let field_key = props
        .get("Name")?
        .get("title")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()?
        .to_string();
    if field_key.is_empty() {
        return None;
    }

    let name = rich_text_plain(props, "Display").unwrap_or_else(|| field_key.to_uppercase());
    let icon = rich_text_plain(props, "Icon").unwrap_or_default();

    Some(HabitDefinition {
        name,
        field_key,
        icon,
        start_date: date_prop(props, "Start date"),
        deactivated_date: date_prop(props, "Deactivated"),
    })
}

fn rich_text_plain(props: &Value, key: &str) -> Option<String> {
    props
        .get(key)?
        .get("rich_text")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()
        .map(str::to_string)
}

fn date_prop(props: &Value, key: &str) -> Option<NaiveDate> {
    let start = props.get(key)?.get("date")?.get("start")?.as_str()?;
    NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()
}
