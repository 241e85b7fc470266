use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::aws::client::SdkClient;
use crate::aws::BedrockApi;
use crate::catalog::Catalog;
use crate::checks::pipeline::{Pipeline, PipelineOptions};
use crate::config::Config;
use crate::error::Result;
use crate::report::{AccessReport, ReportOptions};

/// Check runner configuration
pub struct CheckRunnerConfig {
    /// AWS profile to resolve credentials for
    pub profile: Option<String>,
    /// Target regions; empty means the catalog default pair
    pub regions: Vec<String>,
    /// Probe every catalog region instead
    pub all_regions: bool,
    /// Issue minimal inference calls
    pub test_invoke: bool,
    /// Include per-model parameter details in the report
    pub advanced: bool,
    /// Look up alternatives for missing key models
    pub alternatives: bool,
    /// Per-call timeout
    pub timeout: Duration,
    /// Show verbose output
    pub verbose: bool,
    /// Quiet mode (no progress indicators)
    pub quiet: bool,
}

impl CheckRunnerConfig {
    /// Merge CLI args over the file configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn from_config(
        config: &Config,
        profile: Option<String>,
        regions: Vec<String>,
        all_regions: bool,
        test_invoke: bool,
        advanced: bool,
        alternatives: bool,
        timeout: Option<u64>,
        verbose: bool,
        quiet: bool,
    ) -> Self {
        Self {
            profile: profile.or_else(|| config.check.profile.clone()),
            regions: if regions.is_empty() {
                config.check.regions.clone()
            } else {
                regions
            },
            all_regions: all_regions || config.check.all_regions,
            test_invoke: test_invoke || config.check.test_invoke,
            advanced: advanced || config.check.advanced,
            alternatives: alternatives || config.check.alternatives,
            timeout: Duration::from_secs(timeout.unwrap_or(config.global.timeout_seconds)),
            verbose,
            quiet,
        }
    }
}

/// Check runner: wires the catalog and collaborator into the pipeline and
/// assembles the final report.
pub struct CheckRunner {
    config: CheckRunnerConfig,
    catalog: Catalog,
}

impl CheckRunner {
    pub fn new(config: CheckRunnerConfig, catalog: Catalog) -> Self {
        Self { config, catalog }
    }

    /// Run against the live AWS endpoints.
    pub async fn run(&self) -> Result<AccessReport> {
        let api = SdkClient::new(self.config.timeout)?;
        self.run_with_api(&api).await
    }

    /// Run against any collaborator implementation.
    pub async fn run_with_api(&self, api: &dyn BedrockApi) -> Result<AccessReport> {
        let options = PipelineOptions {
            profile: self.config.profile.clone(),
            regions: self.config.regions.clone(),
            all_regions: self.config.all_regions,
            test_invoke: self.config.test_invoke,
        };

        // Ctrl-c aborts after the in-flight stage; collected results stay
        // valid and reportable.
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        let pipeline = Pipeline::new(api, &self.catalog, options).with_cancel_flag(cancel);

        let progress = if !self.config.quiet {
            let pb = ProgressBar::new(pipeline.stage_count() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("##-"),
            );
            Some(pb)
        } else {
            None
        };

        let verbose = self.config.verbose;
        let results = pipeline
            .run_with(|component| {
                if let Some(pb) = &progress {
                    pb.set_message(format!("Checking {}", component.title()));
                    pb.inc(1);
                    if verbose {
                        pb.println(format!("[*] Checking {}", component.title()));
                    }
                }
            })
            .await;

        if let Some(pb) = progress {
            pb.finish_with_message("Complete");
        }

        let report_options = ReportOptions {
            profile: self.config.profile.clone(),
            advanced: self.config.advanced,
            alternatives: self.config.alternatives,
        };
        Ok(AccessReport::assemble(results, &self.catalog, &report_options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_cli_overrides_file() {
        let mut config = Config::default_config();
        config.check.profile = Some("file-profile".to_string());
        config.check.test_invoke = true;
        config.global.timeout_seconds = 45;

        let runner_config = CheckRunnerConfig::from_config(
            &config,
            Some("cli-profile".to_string()),
            vec!["eu-west-1".to_string()],
            false,
            false,
            true,
            false,
            None,
            false,
            true,
        );

        assert_eq!(runner_config.profile.as_deref(), Some("cli-profile"));
        assert_eq!(runner_config.regions, vec!["eu-west-1".to_string()]);
        // A false CLI flag does not clear a file-enabled option.
        assert!(runner_config.test_invoke);
        assert!(runner_config.advanced);
        assert_eq!(runner_config.timeout, Duration::from_secs(45));
        assert!(runner_config.quiet);
    }

    #[test]
    fn test_from_config_falls_back_to_file() {
        let mut config = Config::default_config();
        config.check.profile = Some("file-profile".to_string());

        let runner_config = CheckRunnerConfig::from_config(
            &config,
            None,
            vec![],
            false,
            false,
            false,
            false,
            Some(10),
            false,
            false,
        );

        assert_eq!(runner_config.profile.as_deref(), Some("file-profile"));
        assert_eq!(
            runner_config.regions,
            vec!["us-east-1".to_string(), "us-west-2".to_string()]
        );
        assert_eq!(runner_config.timeout, Duration::from_secs(10));
    }
}
