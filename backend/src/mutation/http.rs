use super::MutationError;
use common::model::item::ItemKey;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// HTTP client for the single-item certificate endpoints.
///
/// Generate and regenerate share one endpoint; the downstream service
/// invalidates the previous artifact when a certificate is generated again.
/// Each request carries its own timeout, the only bound on a hung call.
pub struct CertificateApi {
    http: Client,
    base: String,
    timeout: Duration,
}

impl CertificateApi {
    pub fn new(base: String, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base: base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Creates (or re-creates) the certificate artifact for a line item.
    pub async fn generate(&self, key: &ItemKey) -> Result<(), MutationError> {
        self.http
            .post(format!("{}/certificate/generate", self.base))
            .timeout(self.timeout)
            .json(&json!({ "lineItemId": key.line_item_id }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Removes the certificate record for a line item.
    pub async fn delete(&self, key: &ItemKey) -> Result<(), MutationError> {
        self.http
            .post(format!("{}/certificate/delete", self.base))
            .timeout(self.timeout)
            .json(&json!({
                "lineItemId": key.line_item_id,
                "orderId": key.order_id,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn generate_posts_the_line_item_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/certificate/generate"))
            .and(body_json(json!({ "lineItemId": "li-7" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = CertificateApi::new(server.uri(), Duration::from_secs(1));
        api.generate(&ItemKey::new("ord-1", "li-7")).await.unwrap();
    }

    #[tokio::test]
    async fn delete_posts_both_identifiers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/certificate/delete"))
            .and(body_json(json!({ "lineItemId": "li-7", "orderId": "ord-1" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = CertificateApi::new(server.uri(), Duration::from_secs(1));
        api.delete(&ItemKey::new("ord-1", "li-7")).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/certificate/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = CertificateApi::new(server.uri(), Duration::from_secs(1));
        assert!(api.generate(&ItemKey::new("ord-1", "li-7")).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Nothing listens on port 9; the connection itself fails.
        let api = CertificateApi::new(
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(200),
        );
        assert!(api.delete(&ItemKey::new("ord-1", "li-7")).await.is_err());
    }
}
