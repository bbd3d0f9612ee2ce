//! Bookshelves
//!
//! List the bookshelves in the authenticated user's library.

use super::client::BooksClient;
use super::ListPage;
use anyhow::Result;
use serde::Deserialize;

/// A bookshelf in the user's library.
/// Every field is optional: the server omits anything not covered by the
/// requested field mask.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub access: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub volume_count: Option<i64>,
    pub volumes_last_updated: Option<String>,
    pub self_link: Option<String>,
}

/// Query options for listing bookshelves
#[derive(Debug, Clone, Default)]
pub struct ShelvesListOptions {
    /// Partial-response field mask
    pub fields: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    /// Client identification tag
    pub source: Option<String>,
}

impl ShelvesListOptions {
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
struct ShelvesResponse {
    #[serde(default)]
    items: Option<Vec<Shelf>>,
    total_items: Option<i64>,
    next_page_token: Option<String>,
}

/// List the user's bookshelves
pub async fn list(client: &BooksClient, opts: &ShelvesListOptions) -> Result<ListPage<Shelf>> {
    let response: ShelvesResponse = client
        .get("mylibrary/bookshelves", &opts.to_query())
        .await?;

    Ok(ListPage {
        items: response.items.unwrap_or_default(),
        next_page_token: response.next_page_token,
        total_items: response.total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_masked_shelf_deserializes() {
        // Only id and title requested via field mask; everything else absent
        let shelf: Shelf = serde_json::from_str(r#"{"id": 3, "title": "Reading now"}"#)
            .expect("partial shelf should deserialize");

        assert_eq!(shelf.id, Some(3));
        assert_eq!(shelf.title.as_deref(), Some("Reading now"));
        assert!(shelf.access.is_none());
        assert!(shelf.volume_count.is_none());
        assert!(shelf.updated.is_none());
    }

    #[test]
    fn test_to_query_omits_unset_fields() {
        let opts = ShelvesListOptions {
            max_results: Some(5),
            ..Default::default()
        };
        assert_eq!(opts.to_query(), vec![("maxResults", "5".to_string())]);

        let empty = ShelvesListOptions::default();
        assert!(empty.to_query().is_empty());
    }
}
