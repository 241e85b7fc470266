//! AWS Bedrock Access Verification Tool
//!
//! A CLI tool that checks whether a set of AWS credentials can reach
//! Amazon Bedrock, which regions and models are usable, and reports the
//! result with remediation guidance.
//!
//! # Checks
//!
//! - **Credentials** - resolve usable AWS credentials (profile or env)
//! - **Regions** - which requested regions answer the model-listing API
//! - **Runtime** - reachability of the model-invocation endpoint
//! - **Models** - foundation models visible across the available regions
//! - **Key Models** - availability of the catalog's key model set
//! - **Invocation** - optional minimal inference calls per key model
//!
//! # Example Usage
//!
//! ```bash
//! # Check the default credential chain in the default regions
//! bedrock-accesscheck check
//!
//! # Check a profile across all Bedrock regions, with invocation tests
//! bedrock-accesscheck check --profile prod --all-regions --test-invoke
//!
//! # Network diagnostics against the Bedrock endpoints
//! bedrock-accesscheck diagnose --dns --tls --latency --region us-east-1
//! ```

pub mod aws;
pub mod catalog;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod report;
pub mod runner;

pub use catalog::Catalog;
pub use checks::{CheckResult, CheckStatus, Component};
pub use cli::{Cli, Commands};
pub use config::{Config, OutputFormat};
pub use error::{ApiError, AppError, ErrorKind, ExitCode, Result};
pub use output::{get_formatter, write_output};
pub use report::{AccessReport, AggregateStatus};
pub use runner::{CheckRunner, CheckRunnerConfig};
