//! Google Books API access
//!
//! Service-account authentication plus typed list calls for the
//! mylibrary shelves, volumes, and annotations resources.

pub mod annotations;
pub mod auth;
pub mod client;
pub mod http;
pub mod shelves;
pub mod volumes;

/// One page of a list response.
///
/// The next page token is surfaced to the caller but never followed
/// automatically.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub total_items: Option<i64>,
}

/// Encode query pairs into a URL query string.
/// Populated fields only; callers must not pass empty placeholders.
pub fn encode_query(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_query_escapes_values() {
        let pairs = vec![
            ("fields", "items(id,volumeInfo(title))".to_string()),
            ("source", "ge web app".to_string()),
        ];
        let query = encode_query(&pairs);
        assert_eq!(
            query,
            "fields=items%28id%2CvolumeInfo%28title%29%29&source=ge+web+app"
        );
    }

    #[test]
    fn test_encode_query_empty() {
        assert_eq!(encode_query(&[]), "");
    }
}
