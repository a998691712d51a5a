//! Firestore REST client

use super::{CollectionPath, DocumentStore, FieldFilter, StoreError, StoredDocument};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Default Firestore REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Connection parameters for a Firestore database
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST endpoint base URL
    pub endpoint: String,
    /// Google Cloud project id
    pub project_id: String,
    /// Database id within the project
    pub database_id: String,
    /// Web API key (optional)
    pub api_key: Option<String>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            database_id: "(default)".to_string(),
            api_key: None,
        }
    }
}

/// Read-only Firestore client speaking the v1 REST API
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: reqwest::Client,
}

impl FirestoreStore {
    /// Create a new Firestore client
    pub fn new(config: FirestoreConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(config: FirestoreConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// URL of the `runQuery` method for the given parent document path
    fn run_query_url(&self, parent: &str) -> String {
        let documents = format!(
            "{}/projects/{}/databases/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project_id,
            self.config.database_id
        );

        if parent.is_empty() {
            format!("{}:runQuery", documents)
        } else {
            format!("{}/{}:runQuery", documents, parent)
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let (parent, collection_id) = collection.split();
        let url = self.run_query_url(parent);
        let request = RunQueryRequest::new(collection_id, filter);

        debug!("Querying {} (filter: {:?})", collection, filter);

        let mut req_builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            req_builder = req_builder.query(&[("key", key)]);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let rows: Vec<RunQueryResponse> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(error) = row.error {
                return Err(StoreError::Query {
                    code: error.code,
                    message: error.message,
                });
            }
            if let Some(doc) = row.document {
                documents.push(doc.into_stored()?);
            }
        }

        debug!("Fetched {} documents from {}", documents.len(), collection);

        Ok(documents)
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

// runQuery request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest {
    structured_query: StructuredQuery,
}

impl RunQueryRequest {
    fn new(collection_id: &str, filter: Option<&FieldFilter>) -> Self {
        Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection_id.to_string(),
                }],
                filter: filter.map(|f| QueryFilter {
                    field_filter: FieldFilterBody {
                        field: FieldReference {
                            field_path: f.field.clone(),
                        },
                        op: "EQUAL",
                        value: StringValue {
                            string_value: f.value.clone(),
                        },
                    },
                }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct StructuredQuery {
    from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    filter: Option<QueryFilter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector {
    collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryFilter {
    field_filter: FieldFilterBody,
}

#[derive(Debug, Serialize)]
struct FieldFilterBody {
    field: FieldReference,
    op: &'static str,
    value: StringValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference {
    field_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    string_value: String,
}

// runQuery response types

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    document: Option<FirestoreDocument>,
    error: Option<RpcStatus>,
}

/// Error reported inside a result stream
#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreDocument {
    fn into_stored(self) -> Result<StoredDocument, StoreError> {
        let id = self.name.rsplit('/').next().unwrap_or_default();
        let data = decode_fields(&self.fields)?;
        Ok(StoredDocument::new(id, data))
    }
}

/// Decode a Firestore `fields` map into plain JSON
fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a single Firestore typed value into plain JSON
fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let (kind, inner) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| StoreError::Decode(format!("Expected a typed value, got {}", value)))?;

    let invalid = || StoreError::Decode(format!("Invalid {}: {}", kind, inner));

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool).ok_or_else(invalid),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).map_err(|_| invalid()),
            Value::Number(n) => Ok(Value::Number(n.clone())),
            _ => Err(invalid()),
        },
        // NaN and infinities have no JSON representation
        "doubleValue" => match inner {
            Value::Number(n) => Ok(Value::Number(n.clone())),
            Value::String(_) => Ok(Value::Null),
            _ => Err(invalid()),
        },
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(invalid),
        "geoPointValue" => {
            let mut point = Map::new();
            for axis in ["latitude", "longitude"] {
                let coordinate = inner.get(axis).cloned().unwrap_or(Value::from(0.0));
                point.insert(axis.to_string(), coordinate);
            }
            Ok(Value::Object(point))
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values,
                Some(_) => return Err(invalid()),
                None => return Ok(Value::Array(Vec::new())),
            };
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            Some(_) => Err(invalid()),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(StoreError::Decode(format!("Unknown value type '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_value(&json!({ "nullValue": null })).unwrap(), Value::Null);
        assert_eq!(decode_value(&json!({ "booleanValue": true })).unwrap(), json!(true));
        assert_eq!(decode_value(&json!({ "integerValue": "42" })).unwrap(), json!(42));
        assert_eq!(decode_value(&json!({ "doubleValue": 1.5 })).unwrap(), json!(1.5));
        assert_eq!(decode_value(&json!({ "doubleValue": "NaN" })).unwrap(), Value::Null);
        assert_eq!(
            decode_value(&json!({ "timestampValue": "2024-05-01T10:00:00Z" })).unwrap(),
            json!("2024-05-01T10:00:00Z")
        );
        assert_eq!(decode_value(&json!({ "stringValue": "Mixer" })).unwrap(), json!("Mixer"));
    }

    #[test]
    fn test_decode_nested() {
        let value = json!({
            "mapValue": { "fields": {
                "title": { "stringValue": "Slicer" },
                "stepGroups": { "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "title": { "stringValue": "Clean" },
                        "steps": { "arrayValue": {} }
                    } } }
                ] } },
                "location": { "geoPointValue": { "latitude": -33.8 } }
            } }
        });

        let decoded = decode_value(&value).unwrap();
        assert_eq!(
            decoded,
            json!({
                "title": "Slicer",
                "stepGroups": [{ "title": "Clean", "steps": [] }],
                "location": { "latitude": -33.8, "longitude": 0.0 }
            })
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_value(&json!("plain")).is_err());
        assert!(decode_value(&json!({ "integerValue": "forty" })).is_err());
        assert!(decode_value(&json!({ "vectorValue": {} })).is_err());
    }

    #[test]
    fn test_document_id_from_name() {
        let doc = FirestoreDocument {
            name: "projects/p/databases/(default)/documents/companies/c/standard_cleaning_instructions/abc123".to_string(),
            fields: json!({ "siteId": { "stringValue": "S1" } })
                .as_object()
                .unwrap()
                .clone(),
        };

        let stored = doc.into_stored().unwrap();
        assert_eq!(stored.id, "abc123");
        assert_eq!(stored.field_str("siteId"), Some("S1"));
    }

    #[test]
    fn test_run_query_body() {
        let filter = FieldFilter::equals("siteId", "S1");
        let body = serde_json::to_value(RunQueryRequest::new("standard_cleaning_instructions", Some(&filter))).unwrap();

        assert_eq!(
            body,
            json!({ "structuredQuery": {
                "from": [{ "collectionId": "standard_cleaning_instructions" }],
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "siteId" },
                    "op": "EQUAL",
                    "value": { "stringValue": "S1" }
                } }
            } })
        );

        let unfiltered = serde_json::to_value(RunQueryRequest::new("things", None)).unwrap();
        assert!(unfiltered["structuredQuery"].get("where").is_none());
    }

    #[test]
    fn test_run_query_url() {
        let store = FirestoreStore::new(FirestoreConfig {
            endpoint: "http://localhost:8080/v1/".to_string(),
            project_id: "demo".to_string(),
            ..Default::default()
        });

        assert_eq!(
            store.run_query_url("companies/c"),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/companies/c:runQuery"
        );
        assert_eq!(
            store.run_query_url(""),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents:runQuery"
        );
    }
}
