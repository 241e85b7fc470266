//! Status aggregation and the renderer-agnostic report model.
//!
//! The four-level aggregate computed here is the single externally visible
//! verdict; renderers must not recompute it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{AlternativeSuggestion, Catalog};
use crate::checks::{CheckDetail, CheckResult, CheckStatus, Component, ModelDescriptor};
use crate::error::ErrorKind;

/// Overall verdict derived from the full check sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Success,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateStatus::Success => write!(f, "SUCCESS"),
            AggregateStatus::Warning => write!(f, "WARNING"),
            AggregateStatus::Error => write!(f, "ERROR"),
            AggregateStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl AggregateStatus {
    pub fn summary_line(&self) -> &'static str {
        match self {
            AggregateStatus::Success => "Your Bedrock setup looks good!",
            AggregateStatus::Warning => {
                "Your Bedrock setup has some issues but may work for some use cases"
            }
            AggregateStatus::Error => "There are critical issues with your Bedrock setup",
            AggregateStatus::Critical => {
                "No usable AWS credentials; nothing could be checked"
            }
        }
    }
}

/// Reduce the ordered check sequence to the aggregate verdict.
///
/// CRITICAL iff the credentials check failed. Otherwise the worst status
/// among non-skipped results decides; skipped results stay out of the
/// computation but are reported verbatim elsewhere.
pub fn aggregate_status(results: &[CheckResult]) -> AggregateStatus {
    let credentials_failed = results
        .iter()
        .any(|r| r.component == Component::Credentials && r.status == CheckStatus::Error);
    if credentials_failed {
        return AggregateStatus::Critical;
    }

    let worst = results
        .iter()
        .filter(|r| !r.skipped)
        .map(|r| r.status)
        .max()
        .unwrap_or(CheckStatus::Success);

    match worst {
        CheckStatus::Success => AggregateStatus::Success,
        CheckStatus::Warning => AggregateStatus::Warning,
        CheckStatus::Error => AggregateStatus::Error,
    }
}

/// One line of the summary dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardRow {
    pub component: Component,
    pub status: CheckStatus,
    pub skipped: bool,
    pub glyph: String,
    pub details: String,
}

/// Remediation guidance for one failed or degraded component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TroubleshootingEntry {
    pub component: Component,
    pub category: ErrorKind,
    pub suggestions: Vec<String>,
}

/// Alternatives offered for one missing key model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingModelAlternatives {
    pub model_id: String,
    pub suggestions: Vec<AlternativeSuggestion>,
}

/// Options consumed during assembly; owned by the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub profile: Option<String>,
    pub advanced: bool,
    pub alternatives: bool,
}

/// The complete, renderer-agnostic report. Every renderer consumes this
/// structure unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub profile: Option<String>,
    pub aggregate: AggregateStatus,
    pub dashboard: Vec<DashboardRow>,
    pub results: Vec<CheckResult>,
    /// Populated only when advanced detail was requested.
    pub model_details: Option<Vec<ModelDescriptor>>,
    /// Populated only when alternatives lookup was requested and key
    /// models are missing.
    pub alternatives: Vec<MissingModelAlternatives>,
    pub troubleshooting: Vec<TroubleshootingEntry>,
    pub next_steps: Vec<String>,
}

impl AccessReport {
    /// Assemble the report from the pipeline's results. Pure; performs no
    /// branching on target output format.
    pub fn assemble(results: Vec<CheckResult>, catalog: &Catalog, options: &ReportOptions) -> Self {
        let aggregate = aggregate_status(&results);

        let dashboard = results
            .iter()
            .map(|r| DashboardRow {
                component: r.component,
                status: r.status,
                skipped: r.skipped,
                glyph: glyph(r.status).to_string(),
                details: details_text(r),
            })
            .collect();

        let model_details = if options.advanced {
            Some(
                results
                    .iter()
                    .find_map(|r| match &r.detail {
                        CheckDetail::Models { models, .. } => Some(models.clone()),
                        _ => None,
                    })
                    .unwrap_or_default(),
            )
        } else {
            None
        };

        let alternatives = if options.alternatives {
            missing_key_models(&results)
                .into_iter()
                .map(|model_id| MissingModelAlternatives {
                    suggestions: catalog.alternatives_for(&model_id).to_vec(),
                    model_id,
                })
                .collect()
        } else {
            Vec::new()
        };

        let troubleshooting = results
            .iter()
            .filter(|r| r.status != CheckStatus::Success && !r.skipped)
            .map(|r| {
                let category = r.cause.unwrap_or(ErrorKind::Unknown);
                TroubleshootingEntry {
                    component: r.component,
                    category,
                    suggestions: remediation(r.component, category),
                }
            })
            .collect();

        let next_steps = next_steps(aggregate);

        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            profile: options.profile.clone(),
            aggregate,
            dashboard,
            results,
            model_details,
            alternatives,
            troubleshooting,
            next_steps,
        }
    }
}

fn glyph(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Success => "\u{2705}",
        CheckStatus::Warning => "\u{26A0}\u{FE0F}",
        CheckStatus::Error => "\u{274C}",
    }
}

/// Key models reported missing, if the stage got that far.
fn missing_key_models(results: &[CheckResult]) -> Vec<String> {
    results
        .iter()
        .find_map(|r| match &r.detail {
            CheckDetail::KeyModels { missing, .. } => Some(missing.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Short dashboard text per component, derived from the typed detail.
fn details_text(result: &CheckResult) -> String {
    match &result.detail {
        CheckDetail::Credentials { source, .. } => {
            format!("valid credentials from {}", source)
        }
        CheckDetail::Regions { available, .. } => {
            if available.is_empty() {
                result.message.clone()
            } else {
                format!(
                    "{} available region(s): {}",
                    available.len(),
                    available.join(", ")
                )
            }
        }
        CheckDetail::Runtime { reachable, .. } => {
            if reachable.is_empty() {
                result.message.clone()
            } else {
                format!("runtime reachable in {}", reachable.join(", "))
            }
        }
        CheckDetail::Models { total, .. } => format!("{} models available", total),
        CheckDetail::KeyModels { present, missing } => {
            let total = present.len() + missing.len();
            let mut text = format!("{}/{} key models available", present.len(), total);
            if !missing.is_empty() && !present.is_empty() {
                text.push_str(" (partial access)");
            } else if present.is_empty() {
                text.push_str(" (no key models available)");
            }
            text
        }
        CheckDetail::Invocation { outcomes } => {
            let ok = outcomes.iter().filter(|o| o.succeeded()).count();
            format!("{}/{} invocation tests succeeded", ok, outcomes.len())
        }
        CheckDetail::None => result.message.clone(),
    }
}

/// Fixed remediation mapping from component and failure category.
fn remediation(component: Component, category: ErrorKind) -> Vec<String> {
    let mut suggestions: Vec<String> = match component {
        Component::Credentials => vec![
            "Run 'aws configure' to set up credentials".to_string(),
            "Or set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY environment variables".to_string(),
            "Verify your credentials have Bedrock permissions".to_string(),
        ],
        Component::Regions => vec![
            "Make sure Bedrock is enabled in your AWS account".to_string(),
            "Check that your IAM policy includes bedrock:ListFoundationModels".to_string(),
            "Verify you are checking regions where Bedrock is offered".to_string(),
        ],
        Component::Runtime => vec![
            "Verify your IAM policy includes bedrock:InvokeModel".to_string(),
            "Check that the Bedrock runtime endpoint is reachable from your network".to_string(),
        ],
        Component::Models => vec![
            "Your account may not have Bedrock enabled; check the AWS console".to_string(),
            "Check that your IAM policy includes bedrock:ListFoundationModels".to_string(),
        ],
        Component::KeyModels => vec![
            "Request access to the missing models in the Bedrock console: \
             https://console.aws.amazon.com/bedrock/home#/modelaccess"
                .to_string(),
            "For Claude models, accept Anthropic's terms of service first".to_string(),
        ],
        Component::Invocation => vec![
            "Add bedrock:InvokeModel for the failing models to your IAM policy".to_string(),
            "Confirm model access was granted, not just requested, in the console".to_string(),
        ],
    };

    match category {
        ErrorKind::Throttling => {
            suggestions.push("Request a quota increase or retry later".to_string())
        }
        ErrorKind::ServiceUnavailable => {
            suggestions.push("Try a different region; the service is not enabled here".to_string())
        }
        ErrorKind::Authorization => {
            suggestions.push("Review the IAM policies attached to this identity".to_string())
        }
        _ => {}
    }

    suggestions
}

fn next_steps(aggregate: AggregateStatus) -> Vec<String> {
    match aggregate {
        AggregateStatus::Success => vec![
            "Your setup looks good! You can start using Bedrock services".to_string(),
            "For usage examples, visit: https://docs.aws.amazon.com/bedrock/latest/userguide/"
                .to_string(),
        ],
        _ => vec![
            "Address the issues highlighted above".to_string(),
            "Run this tool again to verify your changes".to_string(),
            "Refer to the Bedrock documentation for IAM policies and setup instructions"
                .to_string(),
        ],
    }
}
