// src/jobs/fetcher.rs
//! Step 1a: download the scraped dataset and flatten it into listings

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::app_log;
use crate::core::ServiceClient;

pub struct DatasetFetcher {
    client: ServiceClient,
}

impl DatasetFetcher {
    pub fn new(dataset_url: &str, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::new(dataset_url, timeout_seconds)?,
        })
    }

    /// The dataset as raw JSON items. An empty dataset is an error.
    pub async fn fetch(&self) -> Result<Vec<Value>> {
        app_log!(info, "Fetching data from URL: {}", self.client.base_url());

        let items: Vec<Value> = self
            .client
            .get("")
            .await
            .context("Failed to fetch job dataset")?;

        if items.is_empty() {
            anyhow::bail!("No data retrieved from {}", self.client.base_url());
        }

        app_log!(info, "Successfully fetched {} items", items.len());
        Ok(items)
    }
}

/// One scraped Seek listing, reduced to the fields preprocessing uses
#[derive(Debug, Clone, PartialEq)]
pub struct SeekListing {
    pub id: String,
    pub title: String,
    pub url: String,
    pub listing_date: String,
    pub is_featured: bool,
    pub teaser: String,
    pub role_id: String,
    pub content: String,
    pub company_name: String,
    pub location_label: String,
    pub location_country_code: String,
    pub work_arrangement: String,
    pub work_type: String,
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListing {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    title: String,
    url: String,
    listing_date: String,
    #[serde(default)]
    is_featured: Value,
    teaser: String,
    #[serde(default)]
    role_id: Option<String>,
    content: Option<String>,
    advertiser: RawAdvertiser,
    locations: Vec<RawLocation>,
    work_arrangements: RawWorkArrangements,
    work_types: Vec<String>,
    #[serde(default)]
    bullet_points: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawAdvertiser {
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    label: String,
    country_code: String,
}

#[derive(Debug, Deserialize)]
struct RawWorkArrangements {
    data: Vec<RawWorkArrangement>,
}

#[derive(Debug, Deserialize)]
struct RawWorkArrangement {
    label: RawLabel,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    text: String,
}

fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

impl SeekListing {
    /// Flatten one dataset item; the error names the first missing field
    pub fn from_item(item: &Value) -> std::result::Result<Self, String> {
        let raw = RawListing::deserialize(item).map_err(|e| e.to_string())?;

        let location = raw
            .locations
            .into_iter()
            .next()
            .ok_or_else(|| "missing field `locations[0]`".to_string())?;
        let work_arrangement = raw
            .work_arrangements
            .data
            .into_iter()
            .next()
            .ok_or_else(|| "missing field `workArrangements.data[0]`".to_string())?;
        let work_type = raw
            .work_types
            .into_iter()
            .next()
            .ok_or_else(|| "missing field `workTypes[0]`".to_string())?;

        Ok(Self {
            id: raw.id,
            title: raw.title,
            url: raw.url,
            listing_date: raw.listing_date,
            is_featured: raw.is_featured == Value::Bool(true),
            teaser: raw.teaser,
            role_id: raw.role_id.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            company_name: raw.advertiser.description,
            location_label: location.label,
            location_country_code: location.country_code,
            work_arrangement: work_arrangement.label.text,
            work_type,
            bullet_points: raw.bullet_points.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub listings: Vec<SeekListing>,
    pub errors: Vec<String>,
}

impl ExtractionReport {
    pub fn unique_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Flatten every item; incomplete items are skipped and their error kept
pub fn extract_listings(items: &[Value]) -> ExtractionReport {
    app_log!(info, "Starting extraction of job listings from {} items", items.len());

    let mut report = ExtractionReport::default();
    for item in items {
        match SeekListing::from_item(item) {
            Ok(listing) => report.listings.push(listing),
            Err(error) => {
                app_log!(debug, "Skipping dataset item: {}", error);
                report.errors.push(error);
            }
        }
    }

    let unique = report.unique_errors();
    app_log!(
        info,
        "Extraction complete: {} listings extracted with {} unique errors",
        report.listings.len(),
        unique.len()
    );
    for error in &unique {
        app_log!(warn, "Dataset item error: {}", error);
    }

    report
}

#[cfg(test)]
pub(crate) fn sample_item(id: Value, title: &str) -> Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "url": "https://www.seek.com.au/job/1",
        "listingDate": "2025-04-01T00:00:00Z",
        "isFeatured": false,
        "teaser": "Join our team",
        "roleId": "software-engineer",
        "content": "<p>Build <b>services</b></p><ul><li>Rust</li></ul>",
        "advertiser": { "id": "42", "description": "Acme Pty Ltd" },
        "locations": [{ "label": "Sydney NSW", "countryCode": "AU" }],
        "workArrangements": { "data": [{ "id": "1", "label": { "text": "Hybrid" } }] },
        "workTypes": ["Full time"],
        "bulletPoints": ["Great pay", "", "Flexible hours"]
    })
}
