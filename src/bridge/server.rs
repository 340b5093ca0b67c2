use async_trait::async_trait;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::bridge::{ToolRequest, ToolResponse};
use crate::error::{Error, Result};

/// Seam between the line loop and the system performing the actual calls.
///
/// Every operation receives the full request so handlers can resolve
/// per-request credentials themselves.
#[async_trait]
pub trait BridgeHandler: Send + Sync {
    async fn create_post(&self, request: &ToolRequest) -> Result<serde_json::Value>;
    async fn get_posts(&self, request: &ToolRequest) -> Result<serde_json::Value>;
    async fn update_post(&self, request: &ToolRequest) -> Result<serde_json::Value>;
    async fn delete_post(&self, request: &ToolRequest) -> Result<serde_json::Value>;
    async fn search_posts(&self, request: &ToolRequest) -> Result<serde_json::Value>;
    async fn health_check(&self, request: &ToolRequest) -> Result<serde_json::Value>;
}

/// Line-delimited stdio server.
///
/// One request line in, one envelope line out, in input order. A line that
/// fails to parse produces an error envelope; the loop only ends on stdin
/// EOF or SIGINT.
pub struct BridgeServer<H> {
    handler: H,
}

impl<H: BridgeHandler> BridgeServer<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Process one raw input line into a result envelope.
    async fn process_line(&self, line: &str) -> ToolResponse {
        let request: ToolRequest = match serde_json::from_str(line.trim()) {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to parse request line: {}", e);
                return ToolResponse::err(e.to_string());
            }
        };

        debug!(tool = %request.tool, "Dispatching request");

        let result = match request.tool.as_str() {
            "create_post" => self.handler.create_post(&request).await,
            "get_posts" => self.handler.get_posts(&request).await,
            "update_post" => self.handler.update_post(&request).await,
            "delete_post" => self.handler.delete_post(&request).await,
            "search_posts" => self.handler.search_posts(&request).await,
            "health_check" => self.handler.health_check(&request).await,
            other => Err(Error::UnknownTool(other.to_string())),
        };

        match result {
            Ok(data) => ToolResponse::ok(data),
            Err(e) => ToolResponse::err(e.to_string()),
        }
    }

    /// Run the bridge until stdin EOF or SIGINT.
    pub async fn run_stdio(&self) -> Result<()> {
        info!("WordPress bridge running on stdin/stdout");

        let stdin = stdin();
        let mut stdout = stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = tokio::select! {
                read = reader.read_line(&mut line) => read?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Received SIGINT, shutting down");
                    break;
                }
            };

            if bytes_read == 0 {
                break; // EOF
            }

            let response = self.process_line(&line).await;
            let response_str = serde_json::to_string(&response)?;
            stdout.write_all(response_str.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}
