//! HTTP client for a Prismic-compatible REST API

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{ApiInfo, ApiPage, CmsError, ContentSource, Document, PostQuery, Predicate};
use crate::config::CmsConfig;

/// Content source backed by the CMS REST API
pub struct PrismicClient {
    http: reqwest::Client,
    /// API entry point, e.g. `https://my-blog.cdn.prismic.io/api/v2`
    endpoint: String,
    access_token: Option<String>,
    /// Draft release to read instead of the published content
    preview_ref: Option<String>,
    /// Master ref, resolved once on first use
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client for an API endpoint
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cms-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
            preview_ref: None,
            master_ref: OnceCell::new(),
        })
    }

    /// Create a client from the `cms` configuration section
    pub fn from_config(config: &CmsConfig) -> Result<Self, CmsError> {
        let client = Self::new(
            &config.endpoint,
            config.access_token.clone(),
            config.timeout(),
        )?;
        Ok(client.with_preview_ref(config.preview_ref().map(str::to_string)))
    }

    /// Read draft content from a preview release
    pub fn with_preview_ref(mut self, preview_ref: Option<String>) -> Self {
        self.preview_ref = preview_ref.filter(|r| !r.is_empty());
        self
    }

    pub fn is_preview(&self) -> bool {
        self.preview_ref.is_some()
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.endpoint)
    }

    /// The content release every search runs against
    async fn reference(&self) -> Result<String, CmsError> {
        if let Some(preview) = &self.preview_ref {
            return Ok(preview.clone());
        }

        let master = self
            .master_ref
            .get_or_try_init(|| async {
                let info: ApiInfo = self.get_json(&self.endpoint, &[], true).await?;
                let master = info.master_ref().ok_or(CmsError::NoMasterRef)?;
                tracing::debug!("Resolved master ref {}", master);
                Ok::<_, CmsError>(master.to_string())
            })
            .await?;

        Ok(master.clone())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        with_token: bool,
    ) -> Result<T, CmsError> {
        let mut request = self.http.get(url).query(params);
        if with_token {
            if let Some(token) = &self.access_token {
                request = request.query(&[("access_token", token)]);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: redact(response.url()),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query(&self, query: &PostQuery) -> Result<ApiPage, CmsError> {
        let mut params = vec![("ref", self.reference().await?)];
        params.extend(query.params());

        tracing::debug!(
            "Querying {} (pageSize={}, after={:?})",
            query.document_type,
            query.page_size,
            query.after
        );
        self.get_json(&self.search_url(), &params, true).await
    }

    async fn fetch_cursor(&self, cursor: &str) -> Result<ApiPage, CmsError> {
        let url = Url::parse(cursor).map_err(|e| CmsError::InvalidCursor(e.to_string()))?;
        let has_token = url.query_pairs().any(|(k, _)| k == "access_token");

        tracing::debug!("Following cursor {}", redact(&url));
        self.get_json(url.as_str(), &[], !has_token).await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, CmsError> {
        let query = PostQuery::new(document_type)
            .filter(Predicate::at(&format!("my.{}.uid", document_type), uid))
            .page_size(1);
        let page = self.query(&query).await?;
        Ok(page.results.into_iter().next())
    }
}

/// URL without its query string, safe to log
fn redact(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_drops_query() {
        let url = Url::parse(
            "https://blog.cdn.prismic.io/api/v2/documents/search?ref=X&access_token=secret",
        )
        .unwrap();
        assert_eq!(
            redact(&url),
            "https://blog.cdn.prismic.io/api/v2/documents/search"
        );
    }

    #[test]
    fn test_client_normalizes_endpoint() {
        let client = PrismicClient::new(
            "https://blog.cdn.prismic.io/api/v2/",
            Some(String::new()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.search_url(),
            "https://blog.cdn.prismic.io/api/v2/documents/search"
        );
        assert!(client.access_token.is_none());
        assert!(!client.is_preview());
        assert!(client.with_preview_ref(Some("draft".into())).is_preview());
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let client =
            PrismicClient::new("https://blog.cdn.prismic.io/api/v2", None, Duration::from_secs(5))
                .unwrap();
        let err = client.fetch_cursor("not a url").await.unwrap_err();
        assert!(matches!(err, CmsError::InvalidCursor(_)));
    }
}
