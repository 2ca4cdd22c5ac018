// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// ChromaDB HTTP Client
//
// Anti-Corruption Layer for a self-hosted ChromaDB server (v1 REST API).
// Collections are addressed by name for deletion and by server id for writes.

use serde::{Deserialize, Serialize};

use crate::domain::builder::BuilderError;

#[derive(Clone)]
pub struct ChromaClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
    metadata: serde_json::Value,
}

/// One embedded chunk ready to be stored
#[derive(Debug, Clone)]
pub struct ChromaDocument {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: serde_json::Value,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<&'a serde_json::Value>,
}

impl ChromaClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.endpoint.trim_end_matches('/'), path)
    }

    pub async fn create_collection(
        &self,
        name: &str,
        source: &str,
    ) -> Result<Collection, BuilderError> {
        let response = self
            .client
            .post(self.url("/collections"))
            .json(&CreateCollectionRequest {
                name,
                get_or_create: false,
                metadata: serde_json::json!({ "source": source }),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BuilderError::Provider(format!(
                "chroma HTTP {} creating collection {}: {}",
                status, name, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BuilderError::Provider(format!("Failed to parse collection response: {}", e)))
    }

    pub async fn add(
        &self,
        collection_id: &str,
        documents: &[ChromaDocument],
    ) -> Result<(), BuilderError> {
        if documents.is_empty() {
            return Ok(());
        }

        let request = AddRequest {
            ids: documents.iter().map(|d| d.id.as_str()).collect(),
            embeddings: documents.iter().map(|d| d.embedding.as_slice()).collect(),
            documents: documents.iter().map(|d| d.document.as_str()).collect(),
            metadatas: documents.iter().map(|d| &d.metadata).collect(),
        };

        let response = self
            .client
            .post(self.url(&format!("/collections/{}/add", collection_id)))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BuilderError::Provider(format!(
                "chroma HTTP {} adding documents: {}",
                status, error_text
            )));
        }
        Ok(())
    }

    /// Delete a collection by name. A missing collection is `NotFound`.
    pub async fn delete_collection(&self, name: &str) -> Result<(), BuilderError> {
        let response = self
            .client
            .delete(self.url(&format!("/collections/{}", name)))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        // Chroma reports a missing collection as 404 on newer servers and as a
        // ValueError (500) on older ones
        if status == reqwest::StatusCode::NOT_FOUND || error_text.contains("does not exist") {
            return Err(BuilderError::NotFound(format!("chroma collection {}", name)));
        }
        Err(BuilderError::Provider(format!(
            "chroma HTTP {} deleting collection {}: {}",
            status, name, error_text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_collection() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/collections")
            .match_body(Matcher::PartialJson(json!({"name": "rag-1", "get_or_create": false})))
            .with_status(200)
            .with_body(r#"{"id":"6c1f0e1a","name":"rag-1","metadata":{}}"#)
            .create_async()
            .await;

        let client = ChromaClient::new(reqwest::Client::new(), server.url());
        let collection = client.create_collection("rag-1", "/tmp/widgets").await.unwrap();

        assert_eq!(collection.id, "6c1f0e1a");
        assert_eq!(collection.name, "rag-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_sends_parallel_arrays() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/collections/6c1f0e1a/add")
            .match_body(Matcher::PartialJson(json!({
                "ids": ["src/main.rs#0"],
                "documents": ["fn main() {}"],
            })))
            .with_status(201)
            .with_body("true")
            .create_async()
            .await;

        let client = ChromaClient::new(reqwest::Client::new(), server.url());
        client
            .add(
                "6c1f0e1a",
                &[ChromaDocument {
                    id: "src/main.rs#0".to_string(),
                    embedding: vec![0.5, 0.25],
                    document: "fn main() {}".to_string(),
                    metadata: json!({"path": "src/main.rs", "chunk": 0}),
                }],
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_nothing_makes_no_request() {
        let server = mockito::Server::new_async().await;
        let client = ChromaClient::new(reqwest::Client::new(), server.url());
        client.add("6c1f0e1a", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_collection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/v1/collections/rag-1")
            .with_status(500)
            .with_body(r#"{"error":"ValueError('Collection rag-1 does not exist.')"}"#)
            .create_async()
            .await;

        let client = ChromaClient::new(reqwest::Client::new(), server.url());
        assert_eq!(
            client.delete_collection("rag-1").await,
            Err(BuilderError::NotFound("chroma collection rag-1".to_string()))
        );
    }
}
