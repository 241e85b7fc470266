use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AWS Bedrock Access Verification CLI Tool
#[derive(Parser, Debug)]
#[command(name = "bedrock-accesscheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "BEDROCK_ACCESSCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Suppress progress indicators
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify Bedrock access for a set of AWS credentials
    Check(CheckArgs),

    /// Run network diagnostics against the Bedrock endpoints
    Diagnose(DiagnoseArgs),

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Show the built-in capability catalog
    Catalog(CatalogArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// AWS profile name to use
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region(s) to check (repeatable or comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub region: Vec<String>,

    /// Check all Bedrock-supported regions
    #[arg(short, long, default_value_t = false)]
    pub all_regions: bool,

    /// Test model invocation to verify full access (may incur costs)
    #[arg(short, long, default_value_t = false)]
    pub test_invoke: bool,

    /// Include detailed inference parameters per model
    #[arg(long, default_value_t = false)]
    pub advanced: bool,

    /// Suggest SageMaker JumpStart alternatives for missing key models
    #[arg(long, default_value_t = false)]
    pub alternatives: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Human)]
    pub output: OutputFormatArg,

    /// Write output to file
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Write output to a timestamped file in the current directory
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Run DNS diagnostics
    #[arg(long, default_value_t = false)]
    pub dns: bool,

    /// Run TLS diagnostics
    #[arg(long, default_value_t = false)]
    pub tls: bool,

    /// Run latency diagnostics
    #[arg(long, default_value_t = false)]
    pub latency: bool,

    /// Target endpoint for diagnostics
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// AWS region
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Human)]
    pub output: OutputFormatArg,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output path for the configuration file
    #[arg(short, long, default_value = "./config.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short = 'f', long, default_value = "./config.toml")]
    pub config_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Also list the alternative suggestions for each key model
    #[arg(long, default_value_t = false)]
    pub alternatives: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    #[default]
    Human,
    Json,
    Csv,
    Html,
}

impl From<OutputFormatArg> for crate::config::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => crate::config::OutputFormat::Human,
            OutputFormatArg::Json => crate::config::OutputFormat::Json,
            OutputFormatArg::Csv => crate::config::OutputFormat::Csv,
            OutputFormatArg::Html => crate::config::OutputFormat::Html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::parse_from([
            "bedrock-accesscheck",
            "check",
            "--profile",
            "dev",
            "-r",
            "us-east-1,eu-west-1",
            "--test-invoke",
            "--advanced",
            "--output",
            "json",
        ]);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.profile.as_deref(), Some("dev"));
                assert_eq!(args.region, vec!["us-east-1", "eu-west-1"]);
                assert!(args.test_invoke);
                assert!(args.advanced);
                assert!(!args.alternatives);
                assert_eq!(args.output, OutputFormatArg::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_repeatable_regions() {
        let cli = Cli::parse_from([
            "bedrock-accesscheck",
            "check",
            "-r",
            "us-east-1",
            "-r",
            "us-west-2",
        ]);
        match cli.command {
            Commands::Check(args) => assert_eq!(args.region.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_output_format_conversion() {
        use crate::config::OutputFormat;
        assert_eq!(OutputFormat::from(OutputFormatArg::Csv), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from(OutputFormatArg::Human),
            OutputFormat::Human
        );
    }
}
