//! Firestore REST client tests against a mock server

use sciviewer::catalog::{SciCatalog, SciSource};
use sciviewer::store::{
    CollectionPath, DocumentStore, FieldFilter, FirestoreConfig, FirestoreStore, StoreError,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RUN_QUERY_PATH: &str = "/v1/projects/p1/databases/(default)/documents/companies/t1:runQuery";

fn store(server: &MockServer, api_key: Option<&str>) -> FirestoreStore {
    FirestoreStore::new(FirestoreConfig {
        endpoint: format!("{}/v1", server.uri()),
        project_id: "p1".to_string(),
        api_key: api_key.map(str::to_string),
        ..Default::default()
    })
}

fn collection() -> CollectionPath {
    CollectionPath::parse("companies/t1/standard_cleaning_instructions").unwrap()
}

fn document(id: &str, site_id: &str, site_name: &str, title: &str) -> serde_json::Value {
    json!({
        "document": {
            "name": format!(
                "projects/p1/databases/(default)/documents/companies/t1/standard_cleaning_instructions/{}",
                id
            ),
            "fields": {
                "siteId": { "stringValue": site_id },
                "siteName": { "stringValue": site_name },
                "section": { "mapValue": { "fields": {
                    "title": { "stringValue": title },
                    "stepGroups": { "arrayValue": { "values": [
                        { "mapValue": { "fields": {
                            "title": { "stringValue": "Pre-clean" },
                            "steps": { "arrayValue": { "values": [
                                { "mapValue": { "fields": {
                                    "order": { "integerValue": "1" },
                                    "action": { "stringValue": "Isolate power" }
                                } } }
                            ] } }
                        } } }
                    ] } }
                } } }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        },
        "readTime": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_unfiltered_query_decodes_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .and(body_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "standard_cleaning_instructions" }]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            document("d1", "S1", "Plant One", "Slicer"),
            document("d2", "S2", "Plant Two", "Mixer"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let docs = store(&server, None).query(&collection(), None).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "d1");
    assert_eq!(docs[0].field_str("siteId"), Some("S1"));
    assert_eq!(
        docs[0].data["section"]["stepGroups"][0]["steps"][0]["order"],
        json!(1)
    );
}

#[tokio::test]
async fn test_filtered_query_sends_equality_filter_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .and(query_param("key", "secret"))
        .and(body_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "standard_cleaning_instructions" }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "siteId" },
                        "op": "EQUAL",
                        "value": { "stringValue": "S1" }
                    }
                }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([document("d1", "S1", "Plant One", "Slicer")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let filter = FieldFilter::equals("siteId", "S1");
    let docs = store(&server, Some("secret"))
        .query(&collection(), Some(&filter))
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
}

#[tokio::test]
async fn test_empty_result_row_yields_no_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "readTime": "2024-01-01T00:00:00Z" }])),
        )
        .mount(&server)
        .await;

    let docs = store(&server, None).query(&collection(), None).await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = store(&server, None)
        .query(&collection(), None)
        .await
        .unwrap_err();

    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("permission denied"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_error_row_fails_the_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            document("d1", "S1", "Plant One", "Slicer"),
            { "error": { "code": 4, "message": "Deadline exceeded", "status": "DEADLINE_EXCEEDED" } },
        ])))
        .mount(&server)
        .await;

    let err = store(&server, None)
        .query(&collection(), None)
        .await
        .unwrap_err();

    match err {
        StoreError::Query { code, message } => {
            assert_eq!(code, 4);
            assert_eq!(message, "Deadline exceeded");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_catalog_over_firestore() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            document("d2", "S1", "Plant One", "banana line"),
            document("d1", "S1", "Plant One", "Apple line"),
            document("d3", "S2", "Plant Two", "Cherry line"),
        ])))
        .mount(&server)
        .await;

    let catalog = SciCatalog::new(Arc::new(store(&server, None)), "t1").unwrap();

    let documents = catalog.fetch_documents(None).await.unwrap();
    let titles: Vec<&str> = documents.iter().map(|d| d.title()).collect();
    assert_eq!(titles, vec!["Apple line", "banana line", "Cherry line"]);
    assert_eq!(documents[0].step_count(), 1);

    let sites = catalog.summarize_sites().await.unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].name, "Plant One");
    assert_eq!(sites[0].count, 2);
}
