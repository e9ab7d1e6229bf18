// Tests for PostgrestCollection against a mocked PostgREST endpoint
// Uses mockito for HTTP mocking

use mockito::{Matcher, Server};
use serde_json::json;
use tour_catalog_sync::catalog::{CatalogEntry, EntryFields};
use tour_catalog_sync::config::Config;
use tour_catalog_sync::remote::{PostgrestCollection, RemoteCollection};
use tour_catalog_sync::remote_error::RemoteError;
use tour_catalog_sync::services::{ReconcileError, ReconcileService, Strategy};

const KEY: &str = "service-role-test-key";

fn create_test_collection(server_url: String, page_size: usize) -> PostgrestCollection {
    create_capped_collection(server_url, page_size, 100_000)
}

fn create_capped_collection(
    server_url: String,
    page_size: usize,
    max_listed_rows: usize,
) -> PostgrestCollection {
    let config = Config {
        supabase_url: server_url,
        service_role_key: KEY.to_string(),
        table: "passeios".to_string(),
        page_size,
        timeout_secs: 5,
        max_listed_rows,
    };
    PostgrestCollection::new(&config).expect("client should build")
}

fn sample_entry(id: Option<&str>) -> CatalogEntry {
    CatalogEntry::new(EntryFields {
        id: id.map(str::to_string),
        name: "TRANSFER EXCLUSIVO".to_string(),
        category: "Transfer".to_string(),
        description: "Spin 06 passageiros com bancos de couro e ar condicionado.".to_string(),
        location: "Região dos Lagos, RJ".to_string(),
        duration: "Flexível".to_string(),
        price_min: 750.0,
        price_max: 750.0,
        includes: "Veículo exclusivo".to_string(),
        schedule: Some("Sob demanda - 24h".to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_names_sends_auth_headers() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rest/v1/passeios")
        .match_header("apikey", KEY)
        .match_header("authorization", format!("Bearer {KEY}").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "nome".into()),
            Matcher::UrlEncoded("order".into(), "id".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"nome": "Mergulho de Snorkel"}, {"nome": "TRANSFER EXCLUSIVO"}]"#)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    let names = collection.list_names().await.unwrap();

    assert_eq!(names, vec!["Mergulho de Snorkel", "TRANSFER EXCLUSIVO"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_names_pages_until_short_page() {
    let mut server = Server::new_async().await;

    // Offset paging is only stable over a unique ordering, so every page
    // must be ordered by id.
    let first_page = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("order".into(), "id".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"nome": "A"}, {"nome": "B"}]"#)
        .create_async()
        .await;

    let second_page = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("order".into(), "id".into()),
            Matcher::UrlEncoded("offset".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"nome": "C"}]"#)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 2);
    let names = collection.list_names().await.unwrap();

    assert_eq!(names, vec!["A", "B", "C"]);
    first_page.assert_async().await;
    second_page.assert_async().await;
}

#[tokio::test]
async fn test_list_names_fails_when_row_cap_is_reached() {
    let mut server = Server::new_async().await;

    // Every page is full, so the listing never ends on its own.
    let pages = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"nome": "A"}, {"nome": "B"}]"#)
        .expect(2)
        .create_async()
        .await;

    let collection = create_capped_collection(server.url(), 2, 4);
    match collection.list_names().await.unwrap_err() {
        RemoteError::ListingTooLarge { table, max_rows } => {
            assert_eq!(table, "passeios");
            assert_eq!(max_rows, 4);
        }
        other => panic!("Expected ListingTooLarge, got {other:?}"),
    }

    pages.assert_async().await;
}

#[tokio::test]
async fn test_skip_if_present_aborts_when_listing_is_capped() {
    let mut server = Server::new_async().await;

    let listing = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"nome": "A"}]"#)
        .create_async()
        .await;

    let insert = server
        .mock("POST", "/rest/v1/passeios")
        .expect(0)
        .create_async()
        .await;

    let service = ReconcileService::new(create_capped_collection(server.url(), 1, 1));
    let result = service
        .run(Strategy::SkipIfPresent, &[sample_entry(None)])
        .await;

    assert!(matches!(
        result,
        Err(ReconcileError::Listing(RemoteError::ListingTooLarge { .. }))
    ));
    listing.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn test_list_names_skips_null_names() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"nome": null}, {"nome": "Mergulho"}]"#)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    assert_eq!(collection.list_names().await.unwrap(), vec!["Mergulho"]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_names_error_status() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message": "Invalid API key"}"#)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    match collection.list_names().await.unwrap_err() {
        RemoteError::Status { status, table, body } => {
            assert_eq!(status, 401);
            assert_eq!(table, "passeios");
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("Expected Status error, got {other:?}"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_names_invalid_json() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    assert!(matches!(
        collection.list_names().await,
        Err(RemoteError::Decode(_))
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_insert_posts_entry() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/rest/v1/passeios")
        .match_header("apikey", KEY)
        .match_header("authorization", format!("Bearer {KEY}").as_str())
        .match_header("prefer", "return=minimal")
        .match_body(Matcher::PartialJson(json!({
            "nome": "TRANSFER EXCLUSIVO",
            "categoria": "Transfer",
            "local": "Região dos Lagos, RJ",
            "preco_min": 750.0,
            "preco_max": 750.0,
            "horarios": "Sob demanda - 24h"
        })))
        .with_status(201)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    collection.insert(&sample_entry(None)).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_insert_validation_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/rest/v1/passeios")
        .with_status(400)
        .with_body(r#"{"code":"23502","message":"null value in column"}"#)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    let err = collection.insert(&sample_entry(None)).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 400, .. }));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upsert_uses_on_conflict_id() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/rest/v1/passeios")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_header("prefer", "resolution=merge-duplicates,return=minimal")
        .match_body(Matcher::PartialJson(json!({
            "id": "7f00a217-011f-4b70-a08d-bb32c0a6e596",
            "nome": "TRANSFER EXCLUSIVO"
        })))
        .with_status(201)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    collection
        .upsert_by_id(&sample_entry(Some("7f00a217-011f-4b70-a08d-bb32c0a6e596")))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upsert_without_id_makes_no_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    let err = collection.upsert_by_id(&sample_entry(None)).await.unwrap_err();
    assert!(matches!(err, RemoteError::MissingId(_)));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_rows_orders_by_name() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "id,nome,categoria,preco_min,preco_max".into()),
            Matcher::UrlEncoded("order".into(), "nome,id".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[
                {"id": "1", "nome": "Mergulho", "categoria": "Mergulho", "preco_min": 120, "preco_max": 180},
                {"id": "2", "nome": "Transfer", "categoria": null, "preco_min": null, "preco_max": null}
            ]"#,
        )
        .create_async()
        .await;

    let collection = create_test_collection(server.url(), 1000);
    let rows = collection.list_rows().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].price_min, Some(120.0));
    assert_eq!(rows[1].category, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_skip_if_present_over_http() {
    let mut server = Server::new_async().await;

    let listing = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"nome": "transfer   exclusivo"}]"#)
        .create_async()
        .await;

    let insert = server
        .mock("POST", "/rest/v1/passeios")
        .expect(0)
        .create_async()
        .await;

    let service = ReconcileService::new(create_test_collection(server.url(), 1000));
    let summary = service
        .run(Strategy::SkipIfPresent, &[sample_entry(None)])
        .await
        .unwrap();

    assert_eq!(summary.already_existed, 1);
    assert_eq!(summary.inserted, 0);
    listing.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn test_skip_if_present_aborts_on_listing_error() {
    let mut server = Server::new_async().await;

    let listing = server
        .mock("GET", "/rest/v1/passeios")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let service = ReconcileService::new(create_test_collection(server.url(), 1000));
    let result = service
        .run(Strategy::SkipIfPresent, &[sample_entry(None)])
        .await;

    assert!(matches!(result, Err(ReconcileError::Listing(_))));
    listing.assert_async().await;
}
