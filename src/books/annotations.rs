//! Annotations
//!
//! List the user's notes and highlights, optionally filtered by volume,
//! layer, and content version.

use super::client::BooksClient;
use super::ListPage;
use anyhow::Result;
use serde::Deserialize;

/// A user annotation (note or highlight) tied to a volume and layer.
/// Fields are optional because the field mask controls what is returned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub volume_id: Option<String>,
    pub layer_id: Option<String>,
    pub selected_text: Option<String>,
    pub before_selected_text: Option<String>,
    pub after_selected_text: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub self_link: Option<String>,
}

/// Query options for listing annotations
#[derive(Debug, Clone, Default)]
pub struct AnnotationsListOptions {
    /// Restrict to annotations on this volume
    pub volume_id: Option<String>,
    /// Content version the annotations were made against
    pub content_version: Option<String>,
    /// Restrict to a layer, e.g. "notes"
    pub layer_id: Option<String>,
    /// Client identification tag
    pub source: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    /// Partial-response field mask
    pub fields: Option<String>,
}

impl AnnotationsListOptions {
    /// Serialize populated options into query pairs; unset fields are omitted
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(volume_id) = &self.volume_id {
            pairs.push(("volumeId", volume_id.clone()));
        }
        if let Some(content_version) = &self.content_version {
            pairs.push(("contentVersion", content_version.clone()));
        }
        if let Some(layer_id) = &self.layer_id {
            pairs.push(("layerId", layer_id.clone()));
        }
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("maxResults", max_results.to_string()));
        }
        if let Some(page_token) = &self.page_token {
            pairs.push(("pageToken", page_token.clone()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.clone()));
        }
        pairs
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationsResponse {
    #[serde(default)]
    items: Option<Vec<Annotation>>,
    total_items: Option<i64>,
    next_page_token: Option<String>,
}

/// List the user's annotations
pub async fn list(
    client: &BooksClient,
    opts: &AnnotationsListOptions,
) -> Result<ListPage<Annotation>> {
    let response: AnnotationsResponse = client
        .get("mylibrary/annotations", &opts.to_query())
        .await?;

    Ok(ListPage {
        items: response.items.unwrap_or_default(),
        next_page_token: response.next_page_token,
        total_items: response.total_items,
    })
}
