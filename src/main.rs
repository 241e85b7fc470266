use bedrock_accesscheck::{
    cli::{CatalogArgs, CheckArgs, Cli, Commands, DiagnoseArgs, InitArgs, ValidateArgs},
    config::{validate_config, Config},
    error::ExitCode,
    network::{format_diagnostics, run_diagnostics},
    output::{export_filename, get_formatter, write_output},
    report::AggregateStatus,
    runner::{CheckRunner, CheckRunnerConfig},
};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode as StdExitCode;

#[tokio::main]
async fn main() -> StdExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            e.exit_code()
        }
    };

    StdExitCode::from(exit_code as u8)
}

async fn run(cli: Cli) -> bedrock_accesscheck::Result<ExitCode> {
    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default_config()
    };

    // Apply environment variable overrides
    config.apply_env_overrides();

    match cli.command {
        Commands::Check(args) => run_check(args, &config, cli.verbose, cli.quiet).await,
        Commands::Diagnose(args) => run_diagnose(args, cli.quiet).await,
        Commands::Init(args) => run_init(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Catalog(args) => run_catalog(args, &config),
    }
}

async fn run_check(
    args: CheckArgs,
    config: &Config,
    verbose: bool,
    quiet: bool,
) -> bedrock_accesscheck::Result<ExitCode> {
    let runner_config = CheckRunnerConfig::from_config(
        config,
        args.profile,
        args.region,
        args.all_regions,
        args.test_invoke,
        args.advanced,
        args.alternatives,
        Some(args.timeout),
        verbose,
        quiet,
    );
    let test_invoke = runner_config.test_invoke;

    let runner = CheckRunner::new(runner_config, config.build_catalog());
    let report = runner.run().await?;

    // Format output
    let output_format = args.output.into();
    let use_colors = atty::is(atty::Stream::Stdout) && !quiet;
    let formatter = get_formatter(output_format, use_colors);
    let rendered = formatter.format(&report);

    // Write output
    let output_path: Option<PathBuf> = args.output_file.or_else(|| {
        args.save
            .then(|| PathBuf::from(export_filename(output_format, chrono::Utc::now())))
    });
    write_output(&rendered, output_path.as_deref())?;
    if let Some(path) = &output_path {
        if !quiet {
            println!(
                "{} Results saved to {}",
                style("[+]").green(),
                path.display()
            );
        }
    }

    if test_invoke && !quiet {
        println!(
            "{}",
            style("Notice: model invocation tests may have incurred small AWS charges.").yellow()
        );
    }

    Ok(match report.aggregate {
        AggregateStatus::Success | AggregateStatus::Warning => ExitCode::Success,
        AggregateStatus::Error => ExitCode::CheckFailure,
        AggregateStatus::Critical => ExitCode::CredentialFailure,
    })
}

async fn run_diagnose(args: DiagnoseArgs, quiet: bool) -> bedrock_accesscheck::Result<ExitCode> {
    let region = args.region.unwrap_or_else(|| "us-east-1".to_string());

    if let Some(endpoint) = &args.endpoint {
        url::Url::parse(&format!("https://{}", endpoint))?;
    }

    // If no specific checks are requested, run all
    let (check_dns, check_tls, check_latency) = if !args.dns && !args.tls && !args.latency {
        (true, true, true)
    } else {
        (args.dns, args.tls, args.latency)
    };

    if !quiet {
        println!(
            "{} Running Bedrock endpoint diagnostics for {}...",
            style("[*]").cyan(),
            region
        );
    }

    let diagnostics = run_diagnostics(
        &region,
        check_dns,
        check_tls,
        check_latency,
        args.endpoint.as_deref(),
    )
    .await;

    // Format output
    let use_colors = atty::is(atty::Stream::Stdout) && !quiet;

    match args.output {
        bedrock_accesscheck::cli::OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&diagnostics)
                .map_err(bedrock_accesscheck::AppError::Json)?;
            println!("{}", json);
        }
        _ => {
            let output = format_diagnostics(&diagnostics, use_colors);
            print!("{}", output);
        }
    }

    // Check for failures
    let has_dns_failure = diagnostics.dns.iter().any(|r| !r.resolved);
    let has_tls_failure = diagnostics.tls.iter().any(|r| !r.success);
    let has_latency_failure = diagnostics.latency.iter().any(|r| !r.success);

    if has_dns_failure || has_tls_failure || has_latency_failure {
        Ok(ExitCode::NetworkFailure)
    } else {
        Ok(ExitCode::Success)
    }
}

fn run_init(args: InitArgs) -> bedrock_accesscheck::Result<ExitCode> {
    let output_path = &args.output;

    // Check if file exists
    if output_path.exists() && !args.force {
        return Err(bedrock_accesscheck::AppError::Config(format!(
            "File already exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }

    // Create default configuration
    let config = Config::default_config();
    let toml = config.to_toml()?;

    // Write to file
    std::fs::write(output_path, toml)?;

    println!(
        "{} Configuration file created: {}",
        style("[+]").green(),
        output_path.display()
    );
    println!("Edit the file to set a profile, regions, and check options.");

    Ok(ExitCode::Success)
}

fn run_validate(args: ValidateArgs) -> bedrock_accesscheck::Result<ExitCode> {
    let config_path = &args.config_file;

    if !config_path.exists() {
        return Err(bedrock_accesscheck::AppError::FileNotFound(
            config_path.display().to_string(),
        ));
    }

    let config = Config::from_file(config_path)?;
    let warnings = validate_config(&config)?;

    println!(
        "{} Configuration file is valid: {}",
        style("[+]").green(),
        config_path.display()
    );

    if !warnings.is_empty() {
        println!("\n{}", style("Warnings:").yellow());
        for warning in &warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
    }

    // Show summary
    println!("\n{}", style("Configuration Summary:").bold());
    println!("  Timeout: {}s", config.global.timeout_seconds);
    println!("  Output: {}", config.global.output_format);
    println!(
        "  Profile: {}",
        config.check.profile.as_deref().unwrap_or("(default chain)")
    );
    let regions = if config.check.all_regions {
        "all catalog regions".to_string()
    } else if config.check.regions.is_empty() {
        "catalog default pair".to_string()
    } else {
        config.check.regions.join(", ")
    };
    println!("  Regions: {}", regions);
    println!(
        "  Invocation tests: {}",
        if config.check.test_invoke {
            style("enabled").yellow()
        } else {
            style("disabled").dim()
        }
    );

    if warnings.is_empty() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::ConfigError)
    }
}

fn run_catalog(args: CatalogArgs, config: &Config) -> bedrock_accesscheck::Result<ExitCode> {
    let catalog = config.build_catalog();

    println!("\n{}", style("Known Bedrock regions").bold());
    for region in catalog.known_regions() {
        println!("  {:16} {}", region.id, region.display_name);
    }

    println!("\n{}", style("Key models").bold());
    for model in catalog.key_models() {
        if model.purpose.is_empty() {
            println!("  {}", model.id);
        } else {
            println!("  {:44} {}", model.id, model.purpose);
        }
    }

    if args.alternatives {
        println!("\n{}", style("Alternatives for missing key models").bold());
        for model in catalog.key_models() {
            let alternatives = catalog.alternatives_for(&model.id);
            if alternatives.is_empty() {
                continue;
            }
            println!("  {}", model.id);
            for alternative in alternatives {
                println!(
                    "    - {} ({}): {}",
                    alternative.name, alternative.id, alternative.note
                );
            }
        }
    }

    println!();
    Ok(ExitCode::Success)
}
