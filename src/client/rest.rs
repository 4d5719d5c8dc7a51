use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use super::{ListParams, NotesApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::schema::{
    CreateNoteRequest, DeleteAck, FromJson, HealthResponse, Note, NoteId, NotesResponse,
    UpdateNoteRequest, validate,
};

/// HTTP implementation of [`NotesApi`].
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    api_url: String,
}

impl RestClient {
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url(),
        })
    }

    /// API root every path is appended to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Checks `request` against its declared rules and returns the canonical body.
    fn validated_body<T: Serialize + Validate>(request: &T) -> ClientResult<Value> {
        validate::check(request)?;
        serde_json::to_value(request).map_err(|e| ClientError::Validation {
            message: e.to_string(),
            details: None,
            status: None,
        })
    }

    async fn send<T: FromJson>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("Sending {} request to {}", method, url);

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::debug!("Request to {} failed: {}", url, e);
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!("Response status {} ({} bytes)", status, bytes.len());

        if !status.is_success() {
            return Err(ClientError::from_status(status, &bytes));
        }

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::malformed(status, e))?;
        T::from_json(&value).map_err(|e| ClientError::malformed(status, e))
    }
}

#[async_trait]
impl NotesApi for RestClient {
    async fn health_check(&self) -> ClientResult<HealthResponse> {
        self.send(Method::GET, "/health", &[], None).await
    }

    async fn list_notes(&self, params: &ListParams) -> ClientResult<NotesResponse> {
        self.send(Method::GET, "/notes", &params.query_pairs(), None)
            .await
    }

    async fn get_note(&self, id: &NoteId) -> ClientResult<Note> {
        self.send(Method::GET, &format!("/notes/{id}"), &[], None)
            .await
    }

    async fn create_note(&self, request: &CreateNoteRequest) -> ClientResult<Note> {
        let body = Self::validated_body(request)?;
        self.send(Method::POST, "/notes", &[], Some(&body)).await
    }

    async fn update_note(&self, id: &NoteId, request: &UpdateNoteRequest) -> ClientResult<Note> {
        let body = Self::validated_body(request)?;
        self.send(Method::PUT, &format!("/notes/{id}"), &[], Some(&body))
            .await
    }

    async fn delete_note(&self, id: &NoteId) -> ClientResult<DeleteAck> {
        self.send(Method::DELETE, &format!("/notes/{id}"), &[], None)
            .await
    }
}
