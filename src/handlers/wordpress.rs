use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::bridge::{BridgeHandler, PostStatus, ToolRequest};
use crate::config::WordPressDefaults;
use crate::error::{Error, Result};

/// Handler translating bridge requests into WordPress REST API calls.
///
/// Credentials are resolved per request: fields on the request line win,
/// configured defaults fill the gaps.
#[derive(Debug, Clone)]
pub struct WordPressHandler {
    client: Client,
    defaults: WordPressDefaults,
}

/// Error body returned by WordPress with non-2xx responses.
#[derive(Debug, Deserialize)]
struct WpErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Request body for creating a post.
#[derive(Debug, Serialize)]
struct NewPost<'a> {
    title: &'a str,
    content: &'a str,
    status: PostStatus,
}

/// Request body for updating a post; absent fields are left untouched.
#[derive(Debug, Default, Serialize)]
struct PostUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<PostStatus>,
}

/// Result of the staged connectivity probe.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub rest_api_available: bool,
    pub authentication_valid: bool,
    pub posts_accessible: bool,
    pub error_details: Vec<String>,
}

/// Site access resolved for a single request.
#[derive(Debug)]
struct SiteAccess {
    base_url: String,
    username: String,
    password: String,
}

impl WordPressHandler {
    pub fn new(defaults: WordPressDefaults) -> Self {
        // タイムアウト設定付きのHTTPクライアントを作成
        let timeout_secs = defaults.timeout_seconds.unwrap_or(30);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("wp-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("HTTP client build failed");

        Self { client, defaults }
    }

    /// Resolve site URL and credentials, request fields taking precedence
    /// over configured defaults.
    fn resolve_site(&self, request: &ToolRequest) -> Result<SiteAccess> {
        let site_url = request
            .site_url
            .clone()
            .or_else(|| self.defaults.url.clone())
            .ok_or_else(|| Error::InvalidRequest("Site URL is required".to_string()))?;

        url::Url::parse(&site_url)
            .map_err(|e| Error::InvalidRequest(format!("Invalid site URL: {}", e)))?;

        let username = request
            .username
            .clone()
            .or_else(|| self.defaults.username.clone())
            .ok_or_else(|| Error::InvalidRequest("Credentials are required".to_string()))?;

        let password = request
            .password
            .clone()
            .or_else(|| self.defaults.password.clone())
            .ok_or_else(|| Error::InvalidRequest("Credentials are required".to_string()))?;

        Ok(SiteAccess {
            base_url: format!("{}/wp-json/wp/v2", site_url.trim_end_matches('/')),
            username,
            password,
        })
    }

    /// Send a request and pass the WordPress response body through raw.
    ///
    /// Non-2xx responses are normalized: the message from a parseable
    /// WordPress error body wins, the HTTP status is the fallback.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<WpErrorBody>(&body) {
                Ok(wp_error) => {
                    if let Some(code) = &wp_error.code {
                        warn!(code = %code, status = %status, "WordPress rejected the request");
                    }
                    Error::Api(wp_error.message)
                }
                Err(_) => Error::Api(format!("HTTP {}", status)),
            });
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }

    /// REST API root must be reachable and list the wp/v2 namespace.
    async fn check_rest_api(&self, site: &SiteAccess) -> Result<()> {
        let api_info = self.execute(self.client.get(&site.base_url)).await?;

        let has_v2 = api_info
            .get("namespaces")
            .and_then(|v| v.as_array())
            .map(|namespaces| namespaces.iter().any(|ns| ns.as_str() == Some("wp/v2")))
            .unwrap_or(false);

        if !has_v2 {
            return Err(Error::Api("WordPress REST API v2 not available".to_string()));
        }

        Ok(())
    }

    async fn check_authentication(&self, site: &SiteAccess) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/users/me", site.base_url))
            .basic_auth(&site.username, Some(&site.password))
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 => Ok(()),
            401 => Err(Error::Api("Invalid credentials".to_string())),
            403 => Err(Error::Api("Authentication forbidden".to_string())),
            _ => Err(Error::Api(format!("HTTP {}", status))),
        }
    }

    async fn check_post_access(&self, site: &SiteAccess) -> Result<()> {
        let request = self
            .client
            .get(format!("{}/posts", site.base_url))
            .query(&[("per_page", "1")])
            .basic_auth(&site.username, Some(&site.password));

        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl BridgeHandler for WordPressHandler {
    async fn create_post(&self, request: &ToolRequest) -> Result<Value> {
        let (title, content) = match (&request.title, &request.content) {
            (Some(title), Some(content)) => (title.as_str(), content.as_str()),
            _ => {
                return Err(Error::InvalidRequest(
                    "Title and content are required for creating a post".to_string(),
                ))
            }
        };

        let site = self.resolve_site(request)?;
        let body = NewPost {
            title,
            content,
            status: request.status.unwrap_or_default(),
        };

        info!("Creating WordPress post: {}", title);
        let http_request = self
            .client
            .post(format!("{}/posts", site.base_url))
            .basic_auth(&site.username, Some(&site.password))
            .json(&body);

        self.execute(http_request).await
    }

    async fn get_posts(&self, request: &ToolRequest) -> Result<Value> {
        let site = self.resolve_site(request)?;
        let per_page = request.per_page.unwrap_or(10);
        let page = request.page.unwrap_or(1);

        info!("Fetching WordPress posts (per_page: {}, page: {})", per_page, page);
        let http_request = self
            .client
            .get(format!("{}/posts", site.base_url))
            .query(&[
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .basic_auth(&site.username, Some(&site.password));

        self.execute(http_request).await
    }

    async fn update_post(&self, request: &ToolRequest) -> Result<Value> {
        let post_id = request.post_id.ok_or_else(|| {
            Error::InvalidRequest("Post ID is required for updating a post".to_string())
        })?;

        let site = self.resolve_site(request)?;
        let body = PostUpdate {
            title: request.title.as_deref(),
            content: request.content.as_deref(),
            status: request.status,
        };

        info!("Updating WordPress post: {}", post_id);
        // WordPress accepts POST as well as PUT for post updates
        let http_request = self
            .client
            .post(format!("{}/posts/{}", site.base_url, post_id))
            .basic_auth(&site.username, Some(&site.password))
            .json(&body);

        self.execute(http_request).await
    }

    async fn delete_post(&self, request: &ToolRequest) -> Result<Value> {
        let post_id = request.post_id.ok_or_else(|| {
            Error::InvalidRequest("Post ID is required for deleting a post".to_string())
        })?;
        let force = request.force.unwrap_or(false);

        let site = self.resolve_site(request)?;

        info!("Deleting WordPress post: {} (force: {})", post_id, force);
        let mut http_request = self
            .client
            .delete(format!("{}/posts/{}", site.base_url, post_id))
            .basic_auth(&site.username, Some(&site.password));

        if force {
            http_request = http_request.query(&[("force", "true")]);
        }

        self.execute(http_request).await
    }

    async fn search_posts(&self, request: &ToolRequest) -> Result<Value> {
        let query = request
            .query
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("Search query is required".to_string()))?;

        let site = self.resolve_site(request)?;
        let per_page = request.per_page.unwrap_or(10);
        let endpoint = format!(
            "{}/posts?search={}&per_page={}",
            site.base_url,
            urlencoding::encode(query),
            per_page
        );

        info!("Searching WordPress posts: {}", query);
        let http_request = self
            .client
            .get(endpoint)
            .basic_auth(&site.username, Some(&site.password));

        self.execute(http_request).await
    }

    async fn health_check(&self, request: &ToolRequest) -> Result<Value> {
        let site = self.resolve_site(request)?;
        let mut report = HealthReport {
            rest_api_available: false,
            authentication_valid: false,
            posts_accessible: false,
            error_details: Vec::new(),
        };

        info!("Starting WordPress health check");

        match self.check_rest_api(&site).await {
            Ok(()) => report.rest_api_available = true,
            Err(e) => {
                warn!("REST API check failed: {}", e);
                report.error_details.push(format!("REST API check failed: {}", e));
                return Ok(serde_json::to_value(report)?);
            }
        }

        match self.check_authentication(&site).await {
            Ok(()) => report.authentication_valid = true,
            Err(e) => {
                warn!("Authentication check failed: {}", e);
                report.error_details.push(format!("Authentication failed: {}", e));
                return Ok(serde_json::to_value(report)?);
            }
        }

        match self.check_post_access(&site).await {
            Ok(()) => report.posts_accessible = true,
            Err(e) => {
                warn!("Post access check failed: {}", e);
                report.error_details.push(format!("Post access failed: {}", e));
            }
        }

        if report.error_details.is_empty() {
            info!("WordPress health check completed successfully");
        }

        Ok(serde_json::to_value(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_with_defaults() -> WordPressHandler {
        WordPressHandler::new(WordPressDefaults {
            url: Some("https://example.com/".to_string()),
            username: Some("admin".to_string()),
            password: Some("app password".to_string()),
            timeout_seconds: None,
        })
    }

    fn bare_request(tool: &str) -> ToolRequest {
        serde_json::from_value(serde_json::json!({ "tool": tool })).unwrap()
    }

    #[test]
    fn test_resolve_site_uses_defaults() {
        let handler = handler_with_defaults();
        let site = handler.resolve_site(&bare_request("get_posts")).unwrap();

        assert_eq!(site.base_url, "https://example.com/wp-json/wp/v2");
        assert_eq!(site.username, "admin");
        assert_eq!(site.password, "app password");
    }

    #[test]
    fn test_resolve_site_request_overrides_defaults() {
        let handler = handler_with_defaults();
        let request: ToolRequest = serde_json::from_value(serde_json::json!({
            "tool": "get_posts",
            "siteUrl": "https://other.example.org",
            "username": "editor"
        }))
        .unwrap();

        let site = handler.resolve_site(&request).unwrap();
        assert_eq!(site.base_url, "https://other.example.org/wp-json/wp/v2");
        assert_eq!(site.username, "editor");
        // password inherited from defaults
        assert_eq!(site.password, "app password");
    }

    #[test]
    fn test_resolve_site_missing_url() {
        let handler = WordPressHandler::new(WordPressDefaults::default());
        let err = handler.resolve_site(&bare_request("get_posts")).unwrap_err();

        assert_eq!(err.to_string(), "Site URL is required");
    }

    #[test]
    fn test_resolve_site_missing_credentials() {
        let handler = WordPressHandler::new(WordPressDefaults {
            url: Some("https://example.com".to_string()),
            ..Default::default()
        });
        let err = handler.resolve_site(&bare_request("get_posts")).unwrap_err();

        assert_eq!(err.to_string(), "Credentials are required");
    }

    #[test]
    fn test_resolve_site_rejects_garbage_url() {
        let handler = handler_with_defaults();
        let request: ToolRequest = serde_json::from_value(serde_json::json!({
            "tool": "get_posts",
            "siteUrl": "not a url"
        }))
        .unwrap();

        let err = handler.resolve_site(&request).unwrap_err();
        assert!(err.to_string().starts_with("Invalid site URL:"));
    }

    #[tokio::test]
    async fn test_create_post_requires_title_and_content() {
        let handler = handler_with_defaults();

        let mut request = bare_request("create_post");
        request.title = Some("Title only".to_string());

        let err = handler.create_post(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Title and content are required for creating a post"
        );
    }

    #[tokio::test]
    async fn test_update_post_requires_post_id() {
        let handler = handler_with_defaults();
        let err = handler
            .update_post(&bare_request("update_post"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Post ID is required for updating a post");
    }

    #[tokio::test]
    async fn test_delete_post_requires_post_id() {
        let handler = handler_with_defaults();
        let err = handler
            .delete_post(&bare_request("delete_post"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Post ID is required for deleting a post");
    }

    #[tokio::test]
    async fn test_search_posts_requires_query() {
        let handler = handler_with_defaults();
        let err = handler
            .search_posts(&bare_request("search_posts"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Search query is required");
    }

    #[test]
    fn test_new_post_body_includes_default_status() {
        let body = NewPost {
            title: "t",
            content: "c",
            status: PostStatus::default(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "draft");
    }

    #[test]
    fn test_post_update_body_omits_absent_fields() {
        let body = PostUpdate {
            title: Some("new title"),
            ..Default::default()
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"title": "new title"}));
    }

    #[test]
    fn test_empty_post_update_serializes_to_empty_object() {
        let json = serde_json::to_value(PostUpdate::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_wp_error_body_parsing() {
        let body = r#"{"code":"rest_cannot_create","message":"Sorry, you are not allowed to create posts as this user.","data":{"status":401}}"#;
        let parsed: WpErrorBody = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.code.as_deref(), Some("rest_cannot_create"));
        assert_eq!(
            Error::Api(parsed.message).to_string(),
            "WordPress API error: Sorry, you are not allowed to create posts as this user."
        );
    }
}
