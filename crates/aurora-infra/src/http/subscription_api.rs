use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use aurora_core::api::{
    ApiClientError, ApiErrorBody, StatusReport, SubscribeRequest, SubscribeResponse,
    UnsubscribeRequest, UpdatePreferencesRequest,
};
use aurora_core::ports::SubscriptionApiPort;
use aurora_core::SubscriberId;

/// Client for the subscription REST API.
///
/// No retries and no request timeout; transport limits apply.
pub struct HttpSubscriptionApi {
    client: Client,
    base_url: String,
}

impl HttpSubscriptionApi {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("build subscription API HTTP client failed")?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into `ApiClientError::Api`.
    async fn check(response: Response) -> Result<Response, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|body| body.detail_text())
            .unwrap_or_else(|| fallback_detail(status));
        warn!(status = status.as_u16(), %detail, "subscription API returned an error");
        Err(ApiClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
        let status = response.status();
        response.json::<T>().await.map_err(|err| ApiClientError::Api {
            status: status.as_u16(),
            detail: format!("malformed response: {err}"),
        })
    }
}

fn fallback_detail(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn network(err: reqwest::Error) -> ApiClientError {
    ApiClientError::Network(err.to_string())
}

#[async_trait]
impl SubscriptionApiPort for HttpSubscriptionApi {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriberId, ApiClientError> {
        debug!(url = %self.url("/subscribe"), "POST subscribe");
        let response = self
            .client
            .post(self.url("/subscribe"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        let status = response.status().as_u16();
        let response = Self::check(response).await?;
        let body: SubscribeResponse = Self::decode(response).await?;

        body.subscriber_id().ok_or_else(|| ApiClientError::Api {
            status,
            detail: body
                .message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "subscription was not accepted".to_string()),
        })
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<(), ApiClientError> {
        debug!(url = %self.url("/unsubscribe"), "DELETE unsubscribe");
        let response = self
            .client
            .delete(self.url("/unsubscribe"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn status(&self) -> Result<StatusReport, ApiClientError> {
        let response = self
            .client
            .get(self.url("/status"))
            .send()
            .await
            .map_err(network)?;
        let response = Self::check(response).await?;
        Self::decode(response).await
    }

    async fn update_preferences(
        &self,
        token: &str,
        request: &UpdatePreferencesRequest,
    ) -> Result<(), ApiClientError> {
        debug!(url = %self.url("/prefs"), "PATCH preferences");
        let response = self
            .client
            .patch(self.url("/prefs"))
            .query(&[("token", token)])
            .json(request)
            .send()
            .await
            .map_err(network)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn subscribe_request() -> SubscribeRequest {
        SubscribeRequest {
            lat: 40.0,
            lon: -105.0,
            radius_km: 250,
            threshold: 15,
            token: "tok".into(),
        }
    }

    fn api(server: &Server) -> HttpSubscriptionApi {
        HttpSubscriptionApi::new(format!("{}/", server.url())).unwrap()
    }

    #[tokio::test]
    async fn subscribe_posts_body_and_returns_user_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .match_body(Matcher::Json(json!({
                "lat": 40.0,
                "lon": -105.0,
                "radius_km": 250,
                "threshold": 15,
                "token": "tok"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "message": "Subscribed", "user_id": "abc"}"#)
            .create_async()
            .await;

        let id = api(&server).subscribe(&subscribe_request()).await.unwrap();

        assert_eq!(id.as_str(), "abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn subscribe_accepts_integer_user_id() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subscribe")
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Subscribed", "user_id": 42}"#)
            .create_async()
            .await;

        let id = api(&server).subscribe(&subscribe_request()).await.unwrap();

        assert_eq!(id.as_str(), "42");
    }

    #[tokio::test]
    async fn server_error_carries_status_and_detail() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subscribe")
            .with_status(500)
            .with_body(r#"{"detail": "Internal server error"}"#)
            .create_async()
            .await;

        let err = api(&server).subscribe(&subscribe_request()).await.unwrap_err();

        assert_eq!(
            err,
            ApiClientError::Api {
                status: 500,
                detail: "Internal server error".into()
            }
        );
    }

    #[tokio::test]
    async fn error_without_detail_uses_reason_phrase() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subscribe")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = api(&server).subscribe(&subscribe_request()).await.unwrap_err();

        assert_eq!(
            err,
            ApiClientError::Api {
                status: 502,
                detail: "Bad Gateway".into()
            }
        );
    }

    #[tokio::test]
    async fn unsuccessful_body_is_an_api_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subscribe")
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Token already registered"}"#)
            .create_async()
            .await;

        let err = api(&server).subscribe(&subscribe_request()).await.unwrap_err();

        assert_eq!(
            err,
            ApiClientError::Api {
                status: 200,
                detail: "Token already registered".into()
            }
        );
    }

    #[tokio::test]
    async fn unsubscribe_sends_token_in_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/unsubscribe")
            .match_body(Matcher::Json(json!({"token": "tok"})))
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Unsubscribed"}"#)
            .create_async()
            .await;

        api(&server)
            .unsubscribe(&UnsubscribeRequest { token: "tok".into() })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn status_decodes_report() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/status")
            .with_status(200)
            .with_body(r#"{"status": "healthy", "message": "running", "active_users": 3}"#)
            .create_async()
            .await;

        let report = api(&server).status().await.unwrap();

        assert!(report.is_healthy());
        assert_eq!(report.active_users, Some(3));
    }

    #[tokio::test]
    async fn update_preferences_patches_with_token_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/prefs")
            .match_query(Matcher::UrlEncoded("token".into(), "tok".into()))
            .match_body(Matcher::Json(json!({"radius_km": 500})))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        api(&server)
            .update_preferences(
                "tok",
                &UpdatePreferencesRequest {
                    radius_km: Some(500),
                    threshold: None,
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_failure() {
        let api = HttpSubscriptionApi::new("http://127.0.0.1:1").unwrap();

        let err = api.status().await.unwrap_err();

        assert!(matches!(err, ApiClientError::Network(_)));
    }
}
