use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tracing::info;

use banyan_engine::QueryHandle;

/// Serve the read-only textual status endpoint for one replica.
pub async fn serve(addr: SocketAddr, handle: QueryHandle) -> eyre::Result<()> {
    let app = Router::new().route(
        "/query",
        get(move || {
            let handle = handle.clone();
            async move {
                handle
                    .query()
                    .await
                    .unwrap_or_else(|| "replica unavailable\n".to_string())
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http status endpoint listening");

    axum::serve(listener, app).await?;
    Ok(())
}
