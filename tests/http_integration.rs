//! Integration tests for the Books client using wiremock
//!
//! These tests run the full flow against mocked OAuth2 and Books API
//! endpoints: JWT-bearer token exchange, bearer-auth propagation, query
//! serialization, partial responses, and error surfacing.

use gbooks::books::annotations::{self, AnnotationsListOptions};
use gbooks::books::auth::JwtConfig;
use gbooks::books::client::BooksClient;
use gbooks::books::shelves::{self, ShelvesListOptions};
use gbooks::books::volumes::{self, VolumesListOptions};
use serde_json::json;
use wiremock::matchers::{
    bearer_token, body_string_contains, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &[u8] = include_bytes!("fixtures/test_key.pem");

/// Build a client pointed at the mock server for both token exchange and API calls
fn test_client(server: &MockServer) -> BooksClient {
    let config = JwtConfig::new("svc@example.iam.gserviceaccount.com", TEST_KEY.to_vec())
        .with_subject("reader@example.com")
        .with_token_uri(format!("{}/token", server.uri()));

    BooksClient::new(config)
        .expect("Client should build from fixture key")
        .with_base_url(format!("{}/books/v1", server.uri()))
}

/// Mount a token endpoint that accepts a JWT-bearer grant and returns a fixed token
async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// End-to-end: fixture key, mocked OAuth2 + Books API, empty options.
/// The shelf list must come back unmodified and in order, and the API
/// request must carry the bearer token obtained from the exchange.
#[tokio::test]
async fn test_shelves_list_end_to_end() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 0, "title": "Favorites", "access": "PRIVATE"},
                {"id": 3, "title": "Reading now", "access": "PRIVATE"},
                {"id": 4, "title": "Have read"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = shelves::list(&client, &ShelvesListOptions::default())
        .await
        .expect("List should succeed");

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].title.as_deref(), Some("Favorites"));
    assert_eq!(page.items[1].id, Some(3));
    assert_eq!(page.items[2].title.as_deref(), Some("Have read"));
    assert!(page.next_page_token.is_none());
}

/// The token is exchanged once and cached across subsequent API calls
#[tokio::test]
async fn test_token_exchanged_once_and_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let opts = ShelvesListOptions::default();
    shelves::list(&client, &opts).await.expect("First call");
    shelves::list(&client, &opts).await.expect("Second call");
}

/// refresh_token discards the cached token and performs a new exchange
#[tokio::test]
async fn test_refresh_token_forces_new_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.get_token().await.expect("Initial token");
    client
        .credentials
        .refresh_token()
        .await
        .expect("Forced refresh");
}

/// A rejected grant surfaces as an error from the list call
#[tokio::test]
async fn test_rejected_grant_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT signature"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = shelves::list(&client, &ShelvesListOptions::default()).await;

    let err = result.expect_err("Grant rejection should fail the call");
    assert!(format!("{:#}", err).contains("Token exchange failed"));
}

/// A 403 from the API yields an error and no items
#[tokio::test]
async fn test_forbidden_returns_error() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "The caller does not have permission"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = shelves::list(&client, &ShelvesListOptions::default()).await;

    let err = result.expect_err("403 should fail the call");
    assert!(format!("{:#}", err).contains("403"));
}

/// Populated volume options become query parameters; unset ones are not sent
#[tokio::test]
async fn test_volume_options_serialized_to_query() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let fields = "items(id,volumeInfo(contentVersion,title,imageLinks)),totalItems";

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves/1/volumes"))
        .and(query_param("fields", fields))
        .and(query_param("maxResults", "1"))
        .and(query_param_is_missing("pageToken"))
        .and(query_param_is_missing("source"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "VN2jCgAAAEAJ",
                "volumeInfo": {
                    "title": "Example Volume",
                    "contentVersion": "full-1.0.0",
                    "imageLinks": {
                        "smallThumbnail": "http://example.com/small.png",
                        "thumbnail": "http://example.com/thumb.png"
                    }
                }
            }],
            "totalItems": 1
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let opts = VolumesListOptions {
        fields: Some(fields.to_string()),
        max_results: Some(1),
        ..Default::default()
    };
    let page = volumes::list(&client, "1", &opts)
        .await
        .expect("List should succeed");

    assert_eq!(page.total_items, Some(1));
    let volume = &page.items[0];
    assert_eq!(volume.id.as_deref(), Some("VN2jCgAAAEAJ"));

    // Field-masked response: only the requested fields are populated
    let info = volume.info.as_ref().expect("volumeInfo requested");
    assert_eq!(info.title.as_deref(), Some("Example Volume"));
    assert!(info.authors.is_none());
    assert!(info.publisher.is_none());
}

/// Annotation filters use the API's camelCase parameter names
#[tokio::test]
async fn test_annotation_filters_serialized_to_query() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/annotations"))
        .and(query_param("volumeId", "VN2jCgAAAEAJ"))
        .and(query_param("contentVersion", "full-1.0.0"))
        .and(query_param("layerId", "notes"))
        .and(query_param("source", "ge-web-app1"))
        .and(query_param("maxResults", "1"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "layerId": "notes",
                "volumeId": "VN2jCgAAAEAJ",
                "selectedText": "a highlighted passage"
            }],
            "totalItems": 1
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let opts = AnnotationsListOptions {
        volume_id: Some("VN2jCgAAAEAJ".to_string()),
        content_version: Some("full-1.0.0".to_string()),
        layer_id: Some("notes".to_string()),
        source: Some("ge-web-app1".to_string()),
        max_results: Some(1),
        ..Default::default()
    };
    let page = annotations::list(&client, &opts)
        .await
        .expect("List should succeed");

    assert_eq!(
        page.items[0].selected_text.as_deref(),
        Some("a highlighted passage")
    );
}

/// nextPageToken is surfaced in page metadata and never followed automatically
#[tokio::test]
async fn test_next_page_token_surfaced_not_followed() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/annotations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"selectedText": "first page note"}],
            "totalItems": 12,
            "nextPageToken": "token-page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = annotations::list(&client, &AnnotationsListOptions::default())
        .await
        .expect("List should succeed");

    assert_eq!(page.next_page_token.as_deref(), Some("token-page-2"));
    assert_eq!(page.total_items, Some(12));
    assert_eq!(page.items.len(), 1);
    // The .expect(1) above verifies no second request was issued
}

/// The caller can continue pagination explicitly by passing the token back
#[tokio::test]
async fn test_explicit_page_token_sent() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves"))
        .and(query_param("pageToken", "token-page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 7, "title": "Second page shelf"}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let opts = ShelvesListOptions {
        page_token: Some("token-page-2".to_string()),
        ..Default::default()
    };
    let page = shelves::list(&client, &opts).await.expect("List should succeed");

    assert_eq!(page.items[0].id, Some(7));
}

/// Shelf ids with reserved characters are escaped in the URL path
#[tokio::test]
async fn test_shelf_id_path_escaped() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/books/v1/mylibrary/bookshelves/my%20shelf/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = volumes::list(&client, "my shelf", &VolumesListOptions::default())
        .await
        .expect("List should succeed");

    assert!(page.items.is_empty());
}
