//! Static capability data: Bedrock regions, key models, parameter specs,
//! and alternative-service suggestions.
//!
//! The catalog is built once at startup and passed into the pipeline. Every
//! lookup is total: unknown identifiers yield empty results, never errors.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A region known to offer Bedrock, with its console display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: String,
    pub display_name: String,
}

/// A model the catalog designates as important enough to report on
/// individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyModel {
    pub id: String,
    pub purpose: String,
}

/// A substitute recommended when a key model is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    pub id: String,
    pub name: String,
    pub note: String,
}

/// Default spec for one inference parameter of a model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: String,
    pub default: serde_json::Value,
}

impl ParamSpec {
    fn new(name: &str, param_type: &str, default: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            default,
        }
    }
}

/// Immutable capability catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    regions: Vec<RegionInfo>,
    default_regions: Vec<String>,
    key_models: Vec<KeyModel>,
    alternatives: Vec<(String, Vec<AlternativeSuggestion>)>,
}

impl Catalog {
    /// Built-in catalog data.
    pub fn builtin() -> Self {
        let regions = [
            ("us-east-1", "US East (N. Virginia)"),
            ("us-east-2", "US East (Ohio)"),
            ("us-west-1", "US West (N. California)"),
            ("us-west-2", "US West (Oregon)"),
            ("ca-central-1", "Canada (Central)"),
            ("eu-central-1", "Europe (Frankfurt)"),
            ("eu-north-1", "Europe (Stockholm)"),
            ("eu-west-1", "Europe (Ireland)"),
            ("eu-west-2", "Europe (London)"),
            ("eu-west-3", "Europe (Paris)"),
            ("ap-northeast-1", "Asia Pacific (Tokyo)"),
            ("ap-northeast-2", "Asia Pacific (Seoul)"),
            ("ap-south-1", "Asia Pacific (Mumbai)"),
            ("ap-southeast-1", "Asia Pacific (Singapore)"),
            ("ap-southeast-2", "Asia Pacific (Sydney)"),
        ]
        .into_iter()
        .map(|(id, name)| RegionInfo {
            id: id.to_string(),
            display_name: name.to_string(),
        })
        .collect();

        let key_models = [
            ("amazon.titan-embed-text-v1", "Text embeddings (V1)"),
            ("amazon.titan-embed-text-v2:0", "Text embeddings (V2)"),
            (
                "anthropic.claude-3-sonnet-20240229-v1:0",
                "Text generation (Mid-tier)",
            ),
            (
                "anthropic.claude-3-haiku-20240307-v1:0",
                "Text generation (Fastest)",
            ),
        ]
        .into_iter()
        .map(|(id, purpose)| KeyModel {
            id: id.to_string(),
            purpose: purpose.to_string(),
        })
        .collect();

        let alternatives = vec![
            (
                "amazon.titan-embed-text-v1".to_string(),
                vec![
                    alt(
                        "huggingface-sentencesimilarity-all-MiniLM-L6-v2",
                        "all-MiniLM-L6-v2",
                        "SageMaker JumpStart sentence embeddings, 384 dimensions",
                    ),
                    alt(
                        "huggingface-textembedding-gte-small",
                        "GTE Small",
                        "SageMaker JumpStart general text embeddings",
                    ),
                ],
            ),
            (
                "amazon.titan-embed-text-v2:0".to_string(),
                vec![alt(
                    "huggingface-textembedding-bge-base-en-v1-5",
                    "BGE Base EN v1.5",
                    "SageMaker JumpStart embeddings comparable to Titan V2",
                )],
            ),
            (
                "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
                vec![
                    alt(
                        "meta-textgeneration-llama-3-70b-instruct",
                        "Llama 3 70B Instruct",
                        "SageMaker JumpStart mid-tier text generation",
                    ),
                    alt(
                        "huggingface-llm-mistral-large",
                        "Mistral Large",
                        "SageMaker JumpStart alternative for complex generation",
                    ),
                ],
            ),
            (
                "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
                vec![
                    alt(
                        "meta-textgeneration-llama-3-8b-instruct",
                        "Llama 3 8B Instruct",
                        "SageMaker JumpStart fast, low-cost text generation",
                    ),
                    alt(
                        "huggingface-llm-mistral-7b-instruct",
                        "Mistral 7B Instruct",
                        "SageMaker JumpStart lightweight instruct model",
                    ),
                ],
            ),
        ];

        Self {
            regions,
            default_regions: vec!["us-east-1".to_string(), "us-west-2".to_string()],
            key_models,
            alternatives,
        }
    }

    /// Replace the region list, keeping display names for regions the
    /// built-in catalog knows.
    pub fn with_regions(mut self, ids: &[String]) -> Self {
        let builtin = self.regions;
        self.regions = ids
            .iter()
            .map(|id| {
                builtin
                    .iter()
                    .find(|r| &r.id == id)
                    .cloned()
                    .unwrap_or_else(|| RegionInfo {
                        id: id.clone(),
                        display_name: id.clone(),
                    })
            })
            .collect();
        self
    }

    /// Replace the key-model list. Alternatives for models no longer in the
    /// key set are dropped so the alternatives keys stay a subset of it.
    pub fn with_key_models(mut self, ids: &[String]) -> Self {
        self.key_models = ids
            .iter()
            .map(|id| {
                self.key_models
                    .iter()
                    .find(|m| &m.id == id)
                    .cloned()
                    .unwrap_or_else(|| KeyModel {
                        id: id.clone(),
                        purpose: String::new(),
                    })
            })
            .collect();
        self.alternatives
            .retain(|(id, _)| self.key_models.iter().any(|m| &m.id == id));
        self
    }

    /// Known Bedrock regions, in stable order.
    pub fn known_regions(&self) -> &[RegionInfo] {
        &self.regions
    }

    /// The default region pair probed when nothing was requested.
    pub fn default_regions(&self) -> &[String] {
        &self.default_regions
    }

    /// Console display name for a region id; unknown ids echo back.
    pub fn region_display_name(&self, id: &str) -> String {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Models considered key for reporting purposes.
    pub fn key_models(&self) -> &[KeyModel] {
        &self.key_models
    }

    pub fn is_key_model(&self, model_id: &str) -> bool {
        self.key_models.iter().any(|m| m.id == model_id)
    }

    /// Ordered alternative suggestions for a missing model id. Total:
    /// unknown ids yield an empty slice.
    pub fn alternatives_for(&self, model_id: &str) -> &[AlternativeSuggestion] {
        self.alternatives
            .iter()
            .find(|(id, _)| id == model_id)
            .map(|(_, alts)| alts.as_slice())
            .unwrap_or(&[])
    }

    /// Default inference parameter specs for a model family. Total.
    pub fn parameter_specs(&self, model_id: &str) -> Vec<ParamSpec> {
        if model_id.starts_with("anthropic.claude") {
            vec![
                ParamSpec::new("max_tokens", "int", json!(4096)),
                ParamSpec::new("temperature", "float", json!(1.0)),
                ParamSpec::new("top_p", "float", json!(0.999)),
                ParamSpec::new("top_k", "int", json!(250)),
            ]
        } else if model_id.starts_with("amazon.titan-embed-text-v2") {
            vec![
                ParamSpec::new("dimensions", "int", json!(1024)),
                ParamSpec::new("normalize", "bool", json!(true)),
            ]
        } else if model_id.starts_with("amazon.titan-embed") {
            vec![]
        } else if model_id.starts_with("amazon.titan") {
            vec![
                ParamSpec::new("maxTokenCount", "int", json!(512)),
                ParamSpec::new("temperature", "float", json!(0.0)),
                ParamSpec::new("topP", "float", json!(1.0)),
            ]
        } else {
            vec![]
        }
    }

    /// Minimal, low-cost request body for invocation testing. `None` for
    /// families the checker does not know how to invoke.
    pub fn invocation_request(&self, model_id: &str) -> Option<serde_json::Value> {
        if model_id.starts_with("anthropic.claude-3") {
            Some(json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "Hi"}],
            }))
        } else if model_id.starts_with("anthropic.claude") {
            Some(json!({
                "prompt": "\n\nHuman: Hi\n\nAssistant:",
                "max_tokens_to_sample": 10,
            }))
        } else if model_id.starts_with("amazon.titan-embed") {
            Some(json!({"inputText": "Hello"}))
        } else if model_id.starts_with("amazon.titan") {
            Some(json!({
                "inputText": "Hi",
                "textGenerationConfig": {"maxTokenCount": 10},
            }))
        } else {
            None
        }
    }
}

fn alt(id: &str, name: &str, note: &str) -> AlternativeSuggestion {
    AlternativeSuggestion {
        id: id.to_string(),
        name: name.to_string(),
        note: note.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions_ordered_and_nonempty() {
        let catalog = Catalog::builtin();
        let regions = catalog.known_regions();
        assert!(!regions.is_empty());
        assert_eq!(regions[0].id, "us-east-1");
        assert_eq!(
            catalog.region_display_name("us-west-2"),
            "US West (Oregon)"
        );
        assert_eq!(catalog.region_display_name("mars-north-1"), "mars-north-1");
    }

    #[test]
    fn test_key_models() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.key_models().len(), 4);
        assert!(catalog.is_key_model("amazon.titan-embed-text-v1"));
        assert!(!catalog.is_key_model("mistral.mistral-7b-instruct-v0:2"));
    }

    #[test]
    fn test_alternatives_total() {
        let catalog = Catalog::builtin();
        // Any string input yields a slice, never a failure.
        assert!(catalog.alternatives_for("").is_empty());
        assert!(catalog.alternatives_for("no.such-model").is_empty());
        assert!(!catalog
            .alternatives_for("anthropic.claude-3-haiku-20240307-v1:0")
            .is_empty());
    }

    #[test]
    fn test_alternatives_keys_subset_of_key_models() {
        let catalog = Catalog::builtin();
        for (id, _) in &catalog.alternatives {
            assert!(catalog.is_key_model(id), "alternative key {} not a key model", id);
        }
    }

    #[test]
    fn test_alternatives_subset_survives_key_model_override() {
        let catalog = Catalog::builtin()
            .with_key_models(&["anthropic.claude-3-haiku-20240307-v1:0".to_string()]);
        assert_eq!(catalog.key_models().len(), 1);
        for (id, _) in &catalog.alternatives {
            assert!(catalog.is_key_model(id));
        }
        assert!(catalog
            .alternatives_for("amazon.titan-embed-text-v1")
            .is_empty());
    }

    #[test]
    fn test_parameter_specs_total() {
        let catalog = Catalog::builtin();
        assert!(!catalog
            .parameter_specs("anthropic.claude-3-sonnet-20240229-v1:0")
            .is_empty());
        assert!(catalog.parameter_specs("cohere.command-text-v14").is_empty());
    }

    #[test]
    fn test_invocation_request_bodies() {
        let catalog = Catalog::builtin();
        let body = catalog
            .invocation_request("anthropic.claude-3-haiku-20240307-v1:0")
            .unwrap();
        assert_eq!(body["max_tokens"], 10);
        let embed = catalog
            .invocation_request("amazon.titan-embed-text-v1")
            .unwrap();
        assert_eq!(embed["inputText"], "Hello");
        assert!(catalog.invocation_request("ai21.j2-ultra-v1").is_none());
    }

    #[test]
    fn test_region_override_keeps_display_names() {
        let catalog = Catalog::builtin()
            .with_regions(&["eu-west-1".to_string(), "me-central-1".to_string()]);
        assert_eq!(catalog.known_regions().len(), 2);
        assert_eq!(catalog.region_display_name("eu-west-1"), "Europe (Ireland)");
        assert_eq!(catalog.region_display_name("me-central-1"), "me-central-1");
    }
}
