//! Integration tests for `MindatClient` using wiremock HTTP mocks.

use lithocore_mindat::{
    CredentialGuard, LocalityFilters, MindatClient, MindatError, ProviderErrorKind,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> MindatClient {
    MindatClient::with_base_url(
        CredentialGuard::new(Some("test-key".to_string())),
        30,
        "lithocore-test",
        base_url,
    )
    .expect("client construction should not fail")
}

fn provider_kind(err: MindatError) -> ProviderErrorKind {
    match err {
        MindatError::Provider(e) => e.kind,
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn search_geomaterials_sends_token_and_normalizes_hits() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "count": 2,
        "results": [
            {
                "id": 3337,
                "name": "Quartz",
                "ima_formula": "SiO2",
                "colour": "Colourless, white",
                "description_short": "The most common silica mineral."
            },
            {
                "id": 1576,
                "name": "Fluorite",
                "formula": "CaF2",
                "color": "Purple"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/geomaterials/"))
        .and(header("authorization", "Token test-key"))
        .and(query_param("q", "Quarz"))
        .and(query_param("page_size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let minerals = client
        .search_geomaterials("  Quarz ")
        .await
        .expect("should parse geomaterials");

    assert_eq!(minerals.len(), 2);
    assert_eq!(minerals[0].id, 3337);
    assert_eq!(minerals[0].formula.as_deref(), Some("SiO2"));
    assert_eq!(
        minerals[0].description.as_deref(),
        Some("The most common silica mineral.")
    );
    assert_eq!(minerals[1].formula.as_deref(), Some("CaF2"));
    assert_eq!(minerals[1].colour.as_deref(), Some("Purple"));
}

#[tokio::test]
async fn fetch_localities_by_mineral_applies_filters() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "results": [
            { "id": 1, "name": "Quarz-Stollen", "latitude": 46.62, "longitude": 8.59 },
            { "id": 2, "name": "Alpweide", "latitude": "46.55", "longitude": "8.41" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/localities/"))
        .and(query_param("mineral_name", "Quarz"))
        .and(query_param("country", "Switzerland"))
        .and(query_param("mineral_colour", "smoky"))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let filters = LocalityFilters {
        country: Some("Switzerland".to_string()),
        colour: Some("smoky".to_string()),
        page_size: Some(100),
    };
    let client = test_client(&server.uri());
    let localities = client
        .fetch_localities_by_mineral("Quarz", &filters)
        .await
        .expect("should parse localities");

    assert_eq!(localities.len(), 2);
    assert_eq!(localities[0].name.as_deref(), Some("Quarz-Stollen"));
    assert_eq!(localities[1].latitude, Some(serde_json::json!("46.55")));
}

#[tokio::test]
async fn fetch_localities_by_id_uses_geomaterial_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/localities/"))
        .and(query_param("geomaterial_id", "3337"))
        .and(query_param("page_size", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "id": 77, "name": "Lengenbach", "latitude": null, "longitude": null }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let localities = client
        .fetch_localities_by_id(3337)
        .await
        .expect("should parse localities");

    assert_eq!(localities.len(), 1);
    assert!(localities[0].latitude.is_none());
}

#[tokio::test]
async fn missing_results_collection_is_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/localities/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "count": 0 })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let localities = client
        .fetch_localities_by_id(1)
        .await
        .expect("missing results should not fail");
    assert!(localities.is_empty());
}

#[tokio::test]
async fn unparseable_entries_are_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/localities/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                "not an object",
                { "id": "not-a-number" },
                { "id": 5, "name": "Val Giuv", "latitude": 46.66, "longitude": 8.78 }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let localities = client.fetch_localities_by_id(5).await.expect("partial page");
    assert_eq!(localities.len(), 1);
    assert_eq!(localities[0].id, 5);
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token."))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_geomaterials("Quarz").await.unwrap_err();
    assert_eq!(provider_kind(err), ProviderErrorKind::Unauthorized);
}

#[tokio::test]
async fn server_error_maps_to_request_rejected_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace with secrets"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_localities_by_mineral("Quarz", &LocalityFilters::default())
        .await
        .unwrap_err();

    let MindatError::Provider(provider) = err else {
        panic!("expected provider error");
    };
    assert_eq!(provider.kind, ProviderErrorKind::RequestRejected);
    assert_eq!(provider.status_code, Some(500));
    assert!(!provider.message.contains("secrets"));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_localities_by_id(1).await.unwrap_err();
    assert_eq!(provider_kind(err), ProviderErrorKind::Malformed);
}

#[tokio::test]
async fn unreachable_provider_maps_to_unreachable() {
    // Port 9 (discard) on localhost is not listening in test environments.
    let client = test_client("http://127.0.0.1:9");
    let err = client.search_geomaterials("Quarz").await.unwrap_err();
    assert_eq!(provider_kind(err), ProviderErrorKind::Unreachable);
}

#[tokio::test]
async fn missing_credential_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client =
        MindatClient::with_base_url(CredentialGuard::new(None), 30, "lithocore-test", &server.uri())
            .expect("client construction should not fail");
    let err = client.search_geomaterials("Quarz").await.unwrap_err();
    assert!(matches!(err, MindatError::Configuration(_)));
}

#[tokio::test]
async fn mineral_description_takes_first_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/minerals/"))
        .and(query_param("name", "Quarz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "id": 3337, "name": "Quartz", "description_short": "Silica, trigonal." },
                { "id": 1, "name": "Other", "description_short": "ignored" }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let description = client
        .fetch_mineral_description("Quarz")
        .await
        .expect("should parse minerals");
    assert_eq!(description.as_deref(), Some("Silica, trigonal."));
}

#[tokio::test]
async fn mineral_description_is_none_without_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/minerals/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let description = client.fetch_mineral_description("Unobtainium").await.unwrap();
    assert!(description.is_none());
}
