//! Typed results produced by the verification pipeline.

pub mod pipeline;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aws::ModelSummary;
use crate::catalog::{Catalog, ParamSpec};
use crate::error::{ApiError, ErrorKind};

/// Pipeline components, in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Credentials,
    Regions,
    Runtime,
    Models,
    KeyModels,
    Invocation,
}

impl Component {
    pub fn title(&self) -> &'static str {
        match self {
            Component::Credentials => "AWS Credentials",
            Component::Regions => "Bedrock Regions",
            Component::Runtime => "Bedrock Runtime",
            Component::Models => "Bedrock Models",
            Component::KeyModels => "Key Models",
            Component::Invocation => "Model Invocation",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Tri-state outcome of one check. Ordering is severity:
/// `Success < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Success => write!(f, "SUCCESS"),
            CheckStatus::Warning => write!(f, "WARNING"),
            CheckStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// A region that could not be used, with the classified reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionFailure {
    pub region: String,
    pub error: ApiError,
}

/// Input/output modality of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Modality {
    Text,
    Image,
    Embedding,
    Speech,
    Video,
    Other(String),
}

impl From<String> for Modality {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Modality::Text,
            "IMAGE" => Modality::Image,
            "EMBEDDING" | "EMBEDDINGS" => Modality::Embedding,
            "SPEECH" => Modality::Speech,
            "VIDEO" => Modality::Video,
            _ => Modality::Other(s),
        }
    }
}

impl From<Modality> for String {
    fn from(m: Modality) -> String {
        match m {
            Modality::Text => "TEXT".to_string(),
            Modality::Image => "IMAGE".to_string(),
            Modality::Embedding => "EMBEDDING".to_string(),
            Modality::Speech => "SPEECH".to_string(),
            Modality::Video => "VIDEO".to_string(),
            Modality::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}

/// One discovered foundation model: live listing data merged with catalog
/// parameter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub provider: String,
    pub display_name: String,
    pub input_modalities: Vec<Modality>,
    pub output_modalities: Vec<Modality>,
    pub streaming_supported: bool,
    pub inference_parameters: Vec<ParamSpec>,
    pub quota: Option<BTreeMap<String, f64>>,
}

impl ModelDescriptor {
    pub fn from_summary(summary: &ModelSummary, catalog: &Catalog) -> Self {
        Self {
            id: summary.model_id.clone(),
            provider: summary
                .provider_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            display_name: summary
                .model_name
                .clone()
                .unwrap_or_else(|| summary.model_id.clone()),
            input_modalities: summary
                .input_modalities
                .iter()
                .cloned()
                .map(Modality::from)
                .collect(),
            output_modalities: summary
                .output_modalities
                .iter()
                .cloned()
                .map(Modality::from)
                .collect(),
            streaming_supported: summary.response_streaming_supported.unwrap_or(false),
            inference_parameters: catalog.parameter_specs(&summary.model_id),
            quota: None,
        }
    }
}

/// Classification of one invocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Invoked,
    Denied,
    Throttled,
    Malformed,
    Failed,
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationStatus::Invoked => write!(f, "invoked"),
            InvocationStatus::Denied => write!(f, "denied"),
            InvocationStatus::Throttled => write!(f, "throttled"),
            InvocationStatus::Malformed => write!(f, "malformed response"),
            InvocationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of invoking one model in one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationOutcome {
    pub model_id: String,
    pub region: String,
    pub status: InvocationStatus,
    pub detail: Option<String>,
}

impl InvocationOutcome {
    pub fn classify(
        model_id: &str,
        region: &str,
        result: std::result::Result<(), ApiError>,
    ) -> Self {
        let (status, detail) = match result {
            Ok(()) => (InvocationStatus::Invoked, None),
            Err(e) => {
                let status = match e.kind {
                    ErrorKind::Authorization => InvocationStatus::Denied,
                    ErrorKind::Throttling => InvocationStatus::Throttled,
                    ErrorKind::MalformedResponse => InvocationStatus::Malformed,
                    _ => InvocationStatus::Failed,
                };
                (status, Some(e.to_string()))
            }
        };
        Self {
            model_id: model_id.to_string(),
            region: region.to_string(),
            status,
            detail,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == InvocationStatus::Invoked
    }
}

/// Structured details, one shape per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDetail {
    Credentials {
        source: String,
        masked_key_id: String,
    },
    Regions {
        requested: Vec<String>,
        available: Vec<String>,
        failures: Vec<RegionFailure>,
    },
    Runtime {
        reachable: Vec<String>,
        failures: Vec<RegionFailure>,
    },
    Models {
        total: usize,
        models: Vec<ModelDescriptor>,
    },
    KeyModels {
        present: Vec<String>,
        missing: Vec<String>,
    },
    Invocation {
        outcomes: Vec<InvocationOutcome>,
    },
    None,
}

/// The uniform unit produced by every pipeline stage. Created once,
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub component: Component,
    pub status: CheckStatus,
    pub message: String,
    pub detail: CheckDetail,
    /// Set when the stage never ran because a prerequisite failed or the
    /// run was cancelled. Skipped results keep ERROR status but are
    /// excluded from the aggregate's worst-of computation.
    pub skipped: bool,
    /// Taxonomy category of the dominant failure, when one occurred.
    pub cause: Option<ErrorKind>,
}

impl CheckResult {
    pub fn success(component: Component, message: impl Into<String>, detail: CheckDetail) -> Self {
        Self {
            component,
            status: CheckStatus::Success,
            message: message.into(),
            detail,
            skipped: false,
            cause: None,
        }
    }

    pub fn warning(
        component: Component,
        message: impl Into<String>,
        detail: CheckDetail,
        cause: Option<ErrorKind>,
    ) -> Self {
        Self {
            component,
            status: CheckStatus::Warning,
            message: message.into(),
            detail,
            skipped: false,
            cause,
        }
    }

    pub fn error(
        component: Component,
        message: impl Into<String>,
        detail: CheckDetail,
        cause: Option<ErrorKind>,
    ) -> Self {
        Self {
            component,
            status: CheckStatus::Error,
            message: message.into(),
            detail,
            skipped: false,
            cause,
        }
    }

    pub fn skipped(component: Component, reason: &str) -> Self {
        Self {
            component,
            status: CheckStatus::Error,
            message: format!("skipped: {}", reason),
            detail: CheckDetail::None,
            skipped: true,
            cause: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity_ordering() {
        assert!(CheckStatus::Success < CheckStatus::Warning);
        assert!(CheckStatus::Warning < CheckStatus::Error);
        assert_eq!(
            [CheckStatus::Warning, CheckStatus::Success, CheckStatus::Error]
                .into_iter()
                .max(),
            Some(CheckStatus::Error)
        );
    }

    #[test]
    fn test_skipped_result() {
        let result = CheckResult::skipped(Component::Runtime, "no available regions");
        assert_eq!(result.status, CheckStatus::Error);
        assert!(result.skipped);
        assert_eq!(result.message, "skipped: no available regions");
        assert!(matches!(result.detail, CheckDetail::None));
    }

    #[test]
    fn test_modality_roundtrip() {
        assert_eq!(Modality::from("TEXT".to_string()), Modality::Text);
        assert_eq!(Modality::from("text".to_string()), Modality::Text);
        assert_eq!(
            Modality::from("MOTION".to_string()),
            Modality::Other("MOTION".to_string())
        );
        assert_eq!(String::from(Modality::Embedding), "EMBEDDING");
    }

    #[test]
    fn test_descriptor_from_summary() {
        let catalog = Catalog::builtin();
        let summary = ModelSummary {
            model_id: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
            provider_name: Some("Anthropic".to_string()),
            model_name: Some("Claude 3 Haiku".to_string()),
            input_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            output_modalities: vec!["TEXT".to_string()],
            response_streaming_supported: Some(true),
        };
        let descriptor = ModelDescriptor::from_summary(&summary, &catalog);
        assert_eq!(descriptor.provider, "Anthropic");
        assert!(descriptor.streaming_supported);
        assert_eq!(descriptor.input_modalities.len(), 2);
        assert!(!descriptor.inference_parameters.is_empty());

        let bare = ModelSummary {
            model_id: "x.y".to_string(),
            provider_name: None,
            model_name: None,
            input_modalities: vec![],
            output_modalities: vec![],
            response_streaming_supported: None,
        };
        let descriptor = ModelDescriptor::from_summary(&bare, &catalog);
        assert_eq!(descriptor.provider, "Unknown");
        assert_eq!(descriptor.display_name, "x.y");
        assert!(descriptor.inference_parameters.is_empty());
    }

    #[test]
    fn test_invocation_classification() {
        let ok = InvocationOutcome::classify("m", "us-east-1", Ok(()));
        assert!(ok.succeeded());

        let denied = InvocationOutcome::classify(
            "m",
            "us-east-1",
            Err(ApiError::authorization("AccessDeniedException")),
        );
        assert_eq!(denied.status, InvocationStatus::Denied);

        let throttled =
            InvocationOutcome::classify("m", "us-east-1", Err(ApiError::throttling("slow down")));
        assert_eq!(throttled.status, InvocationStatus::Throttled);

        let failed =
            InvocationOutcome::classify("m", "us-east-1", Err(ApiError::unknown("boom")));
        assert_eq!(failed.status, InvocationStatus::Failed);
        assert!(failed.detail.is_some());
    }
}
