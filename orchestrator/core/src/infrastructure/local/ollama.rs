// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama HTTP Client
//
// Anti-Corruption Layer for a self-hosted Ollama server: model presence
// checks for the agent builder and embeddings for the RAG builder.

use serde::{Deserialize, Serialize};

use crate::domain::builder::BuilderError;

#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ShowRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Fails with `NotFound` when the model has not been pulled.
    pub async fn ensure_model(&self, model: &str) -> Result<(), BuilderError> {
        let response = self
            .client
            .post(self.url("/api/show"))
            .json(&ShowRequest { name: model })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(if status == reqwest::StatusCode::NOT_FOUND {
            BuilderError::NotFound(format!("ollama model {}", model))
        } else {
            BuilderError::Provider(format!("ollama HTTP {}: {}", status, error_text))
        })
    }

    pub async fn embed(&self, model: &str, prompt: &str) -> Result<Vec<f32>, BuilderError> {
        let response = self
            .client
            .post(self.url("/api/embeddings"))
            .json(&EmbeddingRequest { model, prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status == reqwest::StatusCode::NOT_FOUND {
                BuilderError::NotFound(format!("ollama model {}", model))
            } else {
                BuilderError::Provider(format!("ollama HTTP {}: {}", status, error_text))
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| BuilderError::Provider(format!("Failed to parse embedding response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(BuilderError::Provider(format!(
                "ollama returned an empty embedding for model {}",
                model
            )));
        }
        Ok(body.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_ensure_model_present() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/show")
            .match_body(Matcher::Json(json!({"name": "llama3.2"})))
            .with_status(200)
            .with_body(r#"{"modelfile":""}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(reqwest::Client::new(), server.url());
        client.ensure_model("llama3.2").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_model_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/show")
            .with_status(404)
            .with_body(r#"{"error":"model 'nope' not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(reqwest::Client::new(), format!("{}/", server.url()));
        let err = client.ensure_model("nope").await.unwrap_err();
        assert_eq!(err, BuilderError::NotFound("ollama model nope".to_string()));
    }

    #[tokio::test]
    async fn test_embed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings")
            .match_body(Matcher::PartialJson(json!({"model": "nomic-embed-text"})))
            .with_status(200)
            .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(reqwest::Client::new(), server.url());
        let embedding = client.embed("nomic-embed-text", "fn main() {}").await.unwrap();
        assert_eq!(embedding.len(), 3);
    }

    #[tokio::test]
    async fn test_embed_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/embeddings")
            .with_status(500)
            .with_body("out of memory")
            .create_async()
            .await;

        let client = OllamaClient::new(reqwest::Client::new(), server.url());
        let err = client.embed("nomic-embed-text", "x").await.unwrap_err();
        assert!(matches!(err, BuilderError::Provider(ref msg) if msg.contains("out of memory")));
    }
}
