//! Live `BedrockApi` implementation over reqwest with SigV4 signing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::aws::sigv4::{sign, uri_encode, SigningParams};
use crate::aws::{
    credentials_from_env, credentials_from_profile, AwsCredentials, BedrockApi, ModelSummary,
};
use crate::error::{ApiError, AppError, Result};

// Both the control plane and the runtime endpoint sign as "bedrock".
const SIGNING_SERVICE: &str = "bedrock";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    model_summaries: Vec<ModelSummary>,
}

/// reqwest-backed collaborator.
pub struct SdkClient {
    http: reqwest::Client,
}

impl SdkClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;
        Ok(Self { http })
    }

    fn control_host(region: &str) -> String {
        format!("bedrock.{}.amazonaws.com", region)
    }

    fn runtime_host(region: &str) -> String {
        format!("bedrock-runtime.{}.amazonaws.com", region)
    }

    async fn signed_request(
        &self,
        credentials: &AwsCredentials,
        region: &str,
        method: reqwest::Method,
        host: &str,
        path: &str,
        body: Vec<u8>,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        let params = SigningParams {
            access_key_id: &credentials.access_key_id,
            secret_access_key: &credentials.secret_access_key,
            session_token: credentials.session_token.as_deref(),
            region,
            service: SIGNING_SERVICE,
        };
        let parts = sign(&params, method.as_str(), host, path, "", &body, Utc::now());

        let url = format!("https://{}{}", host, path);
        let mut request = self
            .http
            .request(method, &url)
            .header("x-amz-date", &parts.amz_date)
            .header("authorization", &parts.authorization);
        if let Some(token) = &parts.security_token {
            request = request.header("x-amz-security-token", token);
        }
        if !body.is_empty() {
            request = request
                .header("content-type", "application/json")
                .body(body);
        }

        request.send().await.map_err(classify_transport)
    }
}

#[async_trait]
impl BedrockApi for SdkClient {
    async fn resolve_credentials(
        &self,
        profile: Option<&str>,
    ) -> std::result::Result<AwsCredentials, ApiError> {
        match profile {
            Some(name) => credentials_from_profile(name),
            None => {
                if let Some(creds) = credentials_from_env() {
                    return Ok(creds);
                }
                credentials_from_profile("default")
            }
        }
    }

    async fn region_available(
        &self,
        credentials: &AwsCredentials,
        region: &str,
    ) -> std::result::Result<(), ApiError> {
        let response = self
            .signed_request(
                credentials,
                region,
                reqwest::Method::GET,
                &Self::control_host(region),
                "/foundation-models",
                Vec::new(),
            )
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn runtime_reachable(
        &self,
        _credentials: &AwsCredentials,
        region: &str,
    ) -> std::result::Result<(), ApiError> {
        // Any HTTP answer means the endpoint exists; only transport
        // failures count as unreachable. No model is invoked here.
        let url = format!("https://{}/", Self::runtime_host(region));
        self.http
            .get(&url)
            .send()
            .await
            .map(|_| ())
            .map_err(classify_transport)
    }

    async fn list_models(
        &self,
        credentials: &AwsCredentials,
        region: &str,
    ) -> std::result::Result<Vec<ModelSummary>, ApiError> {
        let response = self
            .signed_request(
                credentials,
                region,
                reqwest::Method::GET,
                &Self::control_host(region),
                "/foundation-models",
                Vec::new(),
            )
            .await?;
        let body = check_status(response).await?;
        let parsed: ListModelsResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::malformed(format!("unexpected listing response: {}", e)))?;
        Ok(parsed.model_summaries)
    }

    async fn invoke_model(
        &self,
        credentials: &AwsCredentials,
        region: &str,
        model_id: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<(), ApiError> {
        let path = format!("/model/{}/invoke", uri_encode(model_id));
        let payload = serde_json::to_vec(body)
            .map_err(|e| ApiError::malformed(format!("request body: {}", e)))?;
        let response = self
            .signed_request(
                credentials,
                region,
                reqwest::Method::POST,
                &Self::runtime_host(region),
                &path,
                payload,
            )
            .await?;
        let text = check_status(response).await?;
        // A well-formed invocation answer is a JSON document.
        serde_json::from_str::<serde_json::Value>(&text)
            .map(|_| ())
            .map_err(|e| ApiError::malformed(format!("unexpected invocation response: {}", e)))
    }
}

/// Return the body on success, or a classified error otherwise.
async fn check_status(response: reqwest::Response) -> std::result::Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        Ok(body)
    } else {
        Err(classify_response(status.as_u16(), &body))
    }
}

/// Map an HTTP failure onto the failure taxonomy, sniffing the AWS error
/// code out of the response body.
fn classify_response(status: u16, body: &str) -> ApiError {
    let snippet: String = body.chars().take(200).collect();

    if body.contains("UnrecognizedClientException")
        || body.contains("InvalidSignatureException")
        || body.contains("ExpiredTokenException")
    {
        return ApiError::credential(snippet);
    }
    if status == 403 || body.contains("AccessDeniedException") || body.contains("not authorized") {
        return ApiError::authorization(snippet);
    }
    if status == 429 || body.contains("ThrottlingException") || body.contains("TooManyRequests") {
        return ApiError::throttling(snippet);
    }
    if status == 404 || body.contains("ResourceNotFoundException") {
        return ApiError::service_unavailable(snippet);
    }
    ApiError::unknown(format!("HTTP {}: {}", status, snippet))
}

/// Map a transport-level failure onto the taxonomy.
fn classify_transport(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::unknown(format!("request timed out: {}", error))
    } else if error.is_connect() {
        ApiError::service_unavailable(format!("could not connect to the endpoint: {}", error))
    } else if error.is_decode() {
        ApiError::malformed(error.to_string())
    } else {
        ApiError::unknown(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_classify_response() {
        assert_eq!(
            classify_response(403, r#"{"message":"AccessDeniedException"}"#).kind,
            ErrorKind::Authorization
        );
        assert_eq!(
            classify_response(400, r#"{"__type":"UnrecognizedClientException"}"#).kind,
            ErrorKind::Credential
        );
        assert_eq!(
            classify_response(429, r#"{"__type":"ThrottlingException"}"#).kind,
            ErrorKind::Throttling
        );
        assert_eq!(
            classify_response(404, r#"{"__type":"ResourceNotFoundException"}"#).kind,
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(classify_response(500, "boom").kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_response_truncates_body() {
        let long_body = "x".repeat(5000);
        let err = classify_response(500, &long_body);
        assert!(err.message.len() < 300);
    }

    #[test]
    fn test_hosts() {
        assert_eq!(
            SdkClient::control_host("us-east-1"),
            "bedrock.us-east-1.amazonaws.com"
        );
        assert_eq!(
            SdkClient::runtime_host("eu-west-1"),
            "bedrock-runtime.eu-west-1.amazonaws.com"
        );
    }
}
