use std::sync::Arc;

use quicknotes::{ClientConfig, CreateNoteRequest, NotesApi, RestClient};
use tokio::net::TcpListener;

/// A notes server on an ephemeral loopback port, stopped on drop.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, notes_server::app()).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn client(&self) -> Arc<RestClient> {
        Arc::new(RestClient::new(&ClientConfig::new(&self.base_url)).unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Creates notes directly through the client, bypassing any store.
pub async fn seed(client: &RestClient, notes: &[(&str, &str)]) {
    for (title, content) in notes {
        client
            .create_note(&CreateNoteRequest::new(*title, *content))
            .await
            .unwrap();
    }
}
