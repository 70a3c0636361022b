use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::database_ops::truncate_for_log;

pub const DEFAULT_DIRECTORY_URL: &str = "https://restcountries.com/v3.1/all";

// `/all` requires a `fields` filter of at most 10 names, so the stored
// columns are fetched in two passes and joined on `cca3`.
const PRIMARY_FIELDS: &str =
    "name,capital,population,area,languages,flags,cca2,cca3,region,subregion";
const EXTRA_FIELDS: &str = "cca3,borders,gini,independent";

/// Source of raw country directory records.
#[async_trait::async_trait]
pub trait CountryDirectory: Send + Sync {
    /// Every record in the directory, unparsed so one bad record cannot sink the batch.
    async fn fetch_all(&self) -> Result<Vec<Value>>;
}

/// REST Countries client.
/// Public API: https://restcountries.com/
///
/// Key endpoint:
/// - GET /v3.1/all?fields=<up to 10 names> - full directory as a JSON array
#[derive(Debug, Clone)]
pub struct RestCountriesProvider {
    url: String,
    http: Client,
}

impl RestCountriesProvider {
    pub fn new(url: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        let url = url.unwrap_or(DEFAULT_DIRECTORY_URL).to_string();
        let http = Client::builder()
            .user_agent(concat!("global-voyager/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(20)))
            .build()?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_fields(&self, fields: &str) -> Result<Vec<Value>> {
        let url = &self.url;
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .query(&[("fields", fields)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!(
                "country directory fetch failed: {status} url={url} fields={fields} body={body}"
            ));
        }

        let body: Value = resp.json().await?;
        records_from_body(body)
    }
}

#[async_trait::async_trait]
impl CountryDirectory for RestCountriesProvider {
    async fn fetch_all(&self) -> Result<Vec<Value>> {
        let primary = self.fetch_fields(PRIMARY_FIELDS).await?;
        let extra = self.fetch_fields(EXTRA_FIELDS).await?;
        Ok(merge_by_code(primary, extra))
    }
}

/// Copy fields from `extra` into the `primary` record with the same `cca3`.
/// Fields already on the primary record win; records without a match pass through.
fn merge_by_code(primary: Vec<Value>, extra: Vec<Value>) -> Vec<Value> {
    let mut by_code: HashMap<String, Map<String, Value>> = extra
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(fields) => {
                let code = fields.get("cca3")?.as_str()?.to_string();
                Some((code, fields))
            }
            _ => None,
        })
        .collect();

    primary
        .into_iter()
        .map(|mut record| {
            let code = record.get("cca3").and_then(Value::as_str).map(str::to_string);
            if let (Some(code), Value::Object(fields)) = (code, &mut record) {
                if let Some(more) = by_code.remove(&code) {
                    for (key, value) in more {
                        fields.entry(key).or_insert(value);
                    }
                }
            }
            record
        })
        .collect()
}

fn records_from_body(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        other => Err(anyhow!(
            "unexpected country directory response shape (expected array, got {})",
            kind_of(&other)
        )),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
