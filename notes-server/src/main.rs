use std::env;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Fetch env variables
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("listener has no local address");

    tracing::info!("Notes server starting, listening on {}", addr);

    axum::serve(listener, notes_server::app())
        .await
        .expect("failed to start server");
}
