//! Volumes
//!
//! List the volumes on a bookshelf in the user's library.

use super::client::BooksClient;
use super::ListPage;
use anyhow::Result;
use serde::Deserialize;

/// A volume (book/publication) record.
/// Fields are optional because the field mask controls what is returned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub etag: Option<String>,
    pub self_link: Option<String>,
    #[serde(rename = "volumeInfo")]
    pub info: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub content_version: Option<String>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

/// Query options for listing shelf volumes
#[derive(Debug, Clone, Default)]
pub struct VolumesListOptions {
    /// Partial-response field mask
    pub fields: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    /// Client identification tag
    pub source: Option<String>,
}

impl VolumesListOptions {
    /// Serialize populated options into query pairs; unset fields are omitted
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.clone()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("maxResults", max_results.to_string()));
        }
        if let Some(page_token) = &self.page_token {
            pairs.push(("pageToken", page_token.clone()));
        }
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        pairs
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    items: Option<Vec<Volume>>,
    total_items: Option<i64>,
    next_page_token: Option<String>,
}

/// List the volumes on a bookshelf
pub async fn list(
    client: &BooksClient,
    shelf_id: &str,
    opts: &VolumesListOptions,
) -> Result<ListPage<Volume>> {
    let path = format!(
        "mylibrary/bookshelves/{}/volumes",
        urlencoding::encode(shelf_id)
    );
    let response: VolumesResponse = client.get(&path, &opts.to_query()).await?;

    Ok(ListPage {
        items: response.items.unwrap_or_default(),
        next_page_token: response.next_page_token,
        total_items: response.total_items,
    })
}
