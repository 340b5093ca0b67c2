use serde::{Deserialize, Serialize};

/// A single request line read from stdin.
///
/// Field names follow the camelCase wire format. `tool` selects the
/// operation; everything else is per-operation input. Credentials may be
/// omitted when the bridge carries configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub tool: String,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub post_id: Option<u64>,
    pub per_page: Option<u64>,
    pub page: Option<u64>,
    pub query: Option<String>,
    pub force: Option<bool>,
}

/// Post visibility status accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Publish,
    Private,
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// The single-line JSON result envelope written to stdout.
///
/// Exactly one of `data` / `error` is present; the other member is omitted
/// from the serialized form, not emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
