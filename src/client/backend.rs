use crate::client::DocumentSource;
use crate::config::BackendConfig;
use crate::error::{ReconcileError, Result};
use crate::models::{Contract, InvoiceData};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// 文档后端 REST 客户端
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ReconcileError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ReconcileError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// 拼接 /api/v1/<segments>; 每段单独转义, ID 中的 / ? # 不会改变路径
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, kind: &'static str, id: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        match status {
            s if s.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(ReconcileError::NotFound {
                kind,
                id: id.to_string(),
            }),
            StatusCode::UNAUTHORIZED => Err(ReconcileError::Unauthorized),
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!("Backend error for {}: {} {}", url, status, body);
                Err(ReconcileError::Backend {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl DocumentSource for BackendClient {
    async fn fetch_contract(&self, contract_id: &str) -> Result<Contract> {
        self.get_json(self.url(&["contracts", contract_id]), "Contract", contract_id)
            .await
    }

    async fn fetch_invoice(&self, invoice_id: &str) -> Result<InvoiceData> {
        self.get_json(self.url(&["invoices", invoice_id]), "Invoice", invoice_id)
            .await
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceData>> {
        self.get_json(self.url(&["invoices", ""]), "Invoice list", "*").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: base_url.to_string(),
            api_token: Some(String::new()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_base_and_version() {
        let client = client("http://localhost:8009/");
        assert_eq!(
            client.url(&["contracts", "c-1"]).as_str(),
            "http://localhost:8009/api/v1/contracts/c-1"
        );
        assert_eq!(
            client.url(&["invoices", ""]).as_str(),
            "http://localhost:8009/api/v1/invoices/"
        );
        assert!(client.api_token.is_none());
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = client("http://gateway.local/docs");
        assert_eq!(
            client.url(&["contracts", "c-1"]).path(),
            "/docs/api/v1/contracts/c-1"
        );
    }

    #[test]
    fn test_traversal_id_stays_under_collection() {
        let client = client("http://localhost:8009");
        let url = client.url(&["contracts", "../../admin/users?x=#frag"]);

        assert!(url.path().starts_with("/api/v1/contracts/"));
        assert_eq!(url.path_segments().map(|s| s.count()), Some(4));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert!(!url.path().contains("/admin"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = BackendConfig {
            base_url: "not a url".to_string(),
            api_token: None,
            timeout_secs: 5,
        };
        assert!(matches!(
            BackendClient::new(&config),
            Err(ReconcileError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = BackendConfig {
            base_url: "http://localhost:8009".to_string(),
            api_token: Some("s3cr3t-token".to_string()),
            timeout_secs: 5,
        };
        let debug = format!("{:?}", BackendClient::new(&config).unwrap());
        assert!(!debug.contains("s3cr3t-token"));
    }
}
