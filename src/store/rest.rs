//! PostgREST-style client for the hosted row store.
//!
//! | Verb   | Request                                            |
//! |--------|----------------------------------------------------|
//! | select | `GET  /rest/v1/{table}?select=*&order={col}.desc`  |
//! | insert | `POST /rest/v1/{table}` with a one-row array body  |
//! | update | `PATCH /rest/v1/{table}?id=eq.{id}`                |
//! | delete | `DELETE /rest/v1/{table}?id=eq.{id}`               |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::{RowStore, Table};
use crate::errors::StoreError;

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(StoreError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RowStore for RestStore {
    async fn select_ordered(
        &self,
        table: Table,
        column: &str,
        descending: bool,
    ) -> Result<Vec<Value>, StoreError> {
        let order = format!("{}.{}", column, if descending { "desc" } else { "asc" });
        debug!(table = table.as_str(), order = %order, "selecting rows");
        let response = self
            .send(
                self.client
                    .get(self.table_url(table))
                    .query(&[("select", "*"), ("order", order.as_str())]),
            )
            .await?;
        let body = response.text().await.map_err(StoreError::Transport)?;
        serde_json::from_str(&body).map_err(|source| StoreError::Decode {
            table: table.as_str().to_string(),
            source,
        })
    }

    async fn insert(&self, table: Table, row: Value) -> Result<(), StoreError> {
        debug!(table = table.as_str(), "inserting row");
        self.send(
            self.client
                .post(self.table_url(table))
                .header("Prefer", "return=minimal")
                .json(&vec![row]),
        )
        .await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, fields: Value) -> Result<(), StoreError> {
        debug!(table = table.as_str(), id, "updating row");
        let filter = format!("eq.{id}");
        self.send(
            self.client
                .patch(self.table_url(table))
                .query(&[("id", filter.as_str())])
                .header("Prefer", "return=minimal")
                .json(&fields),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        debug!(table = table.as_str(), id, "deleting row");
        let filter = format!("eq.{id}");
        self.send(
            self.client
                .delete(self.table_url(table))
                .query(&[("id", filter.as_str())]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, Method, StatusCode};
    use axum::routing::any;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        table: String,
        query: HashMap<String, String>,
        apikey: Option<String>,
        auth: Option<String>,
        body: String,
    }

    async fn spawn_server(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let app = Router::new().route(
            "/rest/v1/{table}",
            any(
                move |method: Method,
                      Path(table): Path<String>,
                      Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      body: String| {
                    let log = log.clone();
                    let reply = reply.clone();
                    async move {
                        let header = |name: &str| {
                            headers
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string)
                        };
                        log.lock().unwrap().push(Seen {
                            method,
                            table,
                            query,
                            apikey: header("apikey"),
                            auth: header("authorization"),
                            body,
                        });
                        (status, Json(reply))
                    }
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    #[tokio::test]
    async fn test_select_sends_order_and_auth_headers() {
        let (url, seen) = spawn_server(
            StatusCode::OK,
            json!([{"id": "n1", "title": "First"}, {"id": "n2", "title": "Second"}]),
        )
        .await;
        let store = RestStore::new(format!("{url}/"), "anon-key");
        let rows = store
            .select_ordered(Table::NewsItems, "published_at", true)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "n1");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(seen[0].table, "news_items");
        assert_eq!(seen[0].query.get("order").unwrap(), "published_at.desc");
        assert_eq!(seen[0].query.get("select").unwrap(), "*");
        assert_eq!(seen[0].apikey.as_deref(), Some("anon-key"));
        assert_eq!(seen[0].auth.as_deref(), Some("Bearer anon-key"));
    }

    #[tokio::test]
    async fn test_update_filters_by_id() {
        let (url, seen) = spawn_server(StatusCode::NO_CONTENT, Value::Null).await;
        let store = RestStore::new(url, "k");
        store
            .update(Table::NewsItems, "n1", json!({"status": "done"}))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::PATCH);
        assert_eq!(seen[0].query.get("id").unwrap(), "eq.n1");
        let body: Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(body, json!({"status": "done"}));
    }

    #[tokio::test]
    async fn test_insert_wraps_row_in_array() {
        let (url, seen) = spawn_server(StatusCode::CREATED, Value::Null).await;
        let store = RestStore::new(url, "k");
        store
            .insert(Table::Sources, json!({"id": "s1", "name": "Hugging Face"}))
            .await
            .unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::POST);
        let body: Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(body, json!([{"id": "s1", "name": "Hugging Face"}]));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let (url, _seen) =
            spawn_server(StatusCode::UNAUTHORIZED, json!({"message": "Invalid API key"})).await;
        let store = RestStore::new(url, "bad");
        let err = store.delete(Table::Leads, "l1").await.unwrap_err();
        match err {
            StoreError::Http { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("Expected Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_select_rejects_non_array_body() {
        let (url, _seen) = spawn_server(StatusCode::OK, json!({"rows": []})).await;
        let store = RestStore::new(url, "k");
        let err = store
            .select_ordered(Table::Leads, "score", true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
