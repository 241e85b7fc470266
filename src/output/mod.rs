use crate::config::OutputFormat;
use crate::report::{AccessReport, AggregateStatus};
use console::style;
use std::io::Write;

/// Output formatter trait. Formatters consume the assembled report
/// unchanged; they never recompute status or aggregation.
pub trait ReportFormatter {
    fn format(&self, report: &AccessReport) -> String;
}

/// Human-readable console output formatter
pub struct HumanFormatter {
    use_colors: bool,
}

impl HumanFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn status_text(&self, status: crate::checks::CheckStatus, glyph: &str) -> String {
        use crate::checks::CheckStatus;
        let text = format!("{} {}", glyph, status);
        if !self.use_colors {
            return text;
        }
        match status {
            CheckStatus::Success => style(text).green().to_string(),
            CheckStatus::Warning => style(text).yellow().to_string(),
            CheckStatus::Error => style(text).red().to_string(),
        }
    }

    fn aggregate_text(&self, aggregate: AggregateStatus) -> String {
        let text = aggregate.to_string();
        if !self.use_colors {
            return text;
        }
        match aggregate {
            AggregateStatus::Success => style(text).green().bold().to_string(),
            AggregateStatus::Warning => style(text).yellow().bold().to_string(),
            AggregateStatus::Error | AggregateStatus::Critical => {
                style(text).red().bold().to_string()
            }
        }
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &AccessReport) -> String {
        let mut output = String::new();

        output.push_str("\nAWS Bedrock Access Verification Summary\n");
        output.push_str("=======================================\n\n");

        if let Some(profile) = &report.profile {
            output.push_str(&format!("Profile: {}\n\n", profile));
        }

        let width = report
            .dashboard
            .iter()
            .map(|r| r.component.title().len())
            .max()
            .unwrap_or(0);
        for row in &report.dashboard {
            output.push_str(&format!(
                "  {:width$}  {}  {}\n",
                row.component.title(),
                self.status_text(row.status, &row.glyph),
                row.details,
                width = width
            ));
        }

        output.push_str(&format!(
            "\nOverall Status: {}\n{}\n",
            self.aggregate_text(report.aggregate),
            report.aggregate.summary_line()
        ));

        if let Some(models) = &report.model_details {
            output.push_str("\nModel Details\n");
            output.push_str("-------------\n");
            for model in models {
                let modalities: Vec<String> = model
                    .input_modalities
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                output.push_str(&format!(
                    "  {} ({}) streaming={} input={}\n",
                    model.id,
                    model.provider,
                    model.streaming_supported,
                    modalities.join("+")
                ));
                for param in &model.inference_parameters {
                    output.push_str(&format!(
                        "    {}: {} (default {})\n",
                        param.name, param.param_type, param.default
                    ));
                }
            }
        }

        if !report.alternatives.is_empty() {
            output.push_str("\nAlternatives for missing key models\n");
            output.push_str("-----------------------------------\n");
            for entry in &report.alternatives {
                output.push_str(&format!("  {}\n", entry.model_id));
                if entry.suggestions.is_empty() {
                    output.push_str("    no known alternative\n");
                }
                for suggestion in &entry.suggestions {
                    output.push_str(&format!(
                        "    - {} ({}): {}\n",
                        suggestion.name, suggestion.id, suggestion.note
                    ));
                }
            }
        }

        if !report.troubleshooting.is_empty() {
            output.push_str("\nTroubleshooting Tips\n");
            output.push_str("--------------------\n");
            for entry in &report.troubleshooting {
                let heading = format!("{} ({})", entry.component.title(), entry.category);
                if self.use_colors {
                    output.push_str(&format!("  {}\n", style(heading).yellow()));
                } else {
                    output.push_str(&format!("  {}\n", heading));
                }
                for suggestion in &entry.suggestions {
                    output.push_str(&format!("    - {}\n", suggestion));
                }
            }
        }

        output.push_str("\nNext Steps\n");
        for (i, step) in report.next_steps.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, step));
        }

        output.push_str(&format!(
            "\nCheck completed at: {}\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &AccessReport) -> String {
        if self.pretty {
            serde_json::to_string_pretty(report)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }
}

/// CSV output formatter: one row per component plus the overall verdict.
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn escape(text: &str) -> String {
        text.replace(',', ";")
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for CsvFormatter {
    fn format(&self, report: &AccessReport) -> String {
        let mut output = String::from("Component,Status,Details\n");
        for row in &report.dashboard {
            output.push_str(&format!(
                "{},{},{}\n",
                row.component.title(),
                row.status,
                Self::escape(&row.details)
            ));
        }
        output.push_str(&format!(
            "Overall,{},{}\n",
            report.aggregate,
            Self::escape(report.aggregate.summary_line())
        ));
        output
    }
}

/// Standalone HTML document formatter
pub struct HtmlFormatter;

impl HtmlFormatter {
    pub fn new() -> Self {
        Self
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    fn status_class(status: crate::checks::CheckStatus) -> &'static str {
        use crate::checks::CheckStatus;
        match status {
            CheckStatus::Success => "success",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
        }
    }
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &AccessReport) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<title>AWS Bedrock Access Report</title>\n");
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; margin: 2em; }\n\
             table { border-collapse: collapse; margin: 1em 0; }\n\
             th, td { border: 1px solid #ccc; padding: 0.4em 0.8em; text-align: left; }\n\
             .success { color: #1a7f37; }\n\
             .warning { color: #9a6700; }\n\
             .error { color: #cf222e; }\n\
             .skipped { color: #888; font-style: italic; }\n\
             </style>\n</head>\n<body>\n",
        );

        html.push_str("<h1>AWS Bedrock Access Verification</h1>\n");
        if let Some(profile) = &report.profile {
            html.push_str(&format!(
                "<p>Profile: <code>{}</code></p>\n",
                Self::escape_html(profile)
            ));
        }
        html.push_str(&format!(
            "<p>Overall status: <strong class=\"{}\">{}</strong> &mdash; {}</p>\n",
            match report.aggregate {
                AggregateStatus::Success => "success",
                AggregateStatus::Warning => "warning",
                AggregateStatus::Error | AggregateStatus::Critical => "error",
            },
            report.aggregate,
            Self::escape_html(report.aggregate.summary_line())
        ));

        html.push_str("<h2>Dashboard</h2>\n<table>\n");
        html.push_str("<tr><th>Component</th><th>Status</th><th>Details</th></tr>\n");
        for row in &report.dashboard {
            let class = if row.skipped {
                "skipped"
            } else {
                Self::status_class(row.status)
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"{}\">{} {}</td><td>{}</td></tr>\n",
                Self::escape_html(row.component.title()),
                class,
                row.glyph,
                row.status,
                Self::escape_html(&row.details)
            ));
        }
        html.push_str("</table>\n");

        if let Some(models) = &report.model_details {
            html.push_str("<h2>Models</h2>\n<table>\n");
            html.push_str(
                "<tr><th>Model ID</th><th>Provider</th><th>Streaming</th>\
                 <th>Input</th><th>Output</th></tr>\n",
            );
            for model in models {
                let join = |modalities: &[crate::checks::Modality]| {
                    modalities
                        .iter()
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    Self::escape_html(&model.id),
                    Self::escape_html(&model.provider),
                    model.streaming_supported,
                    Self::escape_html(&join(&model.input_modalities)),
                    Self::escape_html(&join(&model.output_modalities)),
                ));
            }
            html.push_str("</table>\n");
        }

        if !report.alternatives.is_empty() {
            html.push_str("<h2>Alternatives for missing key models</h2>\n<ul>\n");
            for entry in &report.alternatives {
                html.push_str(&format!(
                    "<li><code>{}</code><ul>\n",
                    Self::escape_html(&entry.model_id)
                ));
                for suggestion in &entry.suggestions {
                    html.push_str(&format!(
                        "<li>{} (<code>{}</code>): {}</li>\n",
                        Self::escape_html(&suggestion.name),
                        Self::escape_html(&suggestion.id),
                        Self::escape_html(&suggestion.note)
                    ));
                }
                html.push_str("</ul></li>\n");
            }
            html.push_str("</ul>\n");
        }

        if !report.troubleshooting.is_empty() {
            html.push_str("<h2>Troubleshooting</h2>\n<ul>\n");
            for entry in &report.troubleshooting {
                html.push_str(&format!(
                    "<li><strong>{}</strong> ({})<ul>\n",
                    Self::escape_html(entry.component.title()),
                    entry.category
                ));
                for suggestion in &entry.suggestions {
                    html.push_str(&format!("<li>{}</li>\n", Self::escape_html(suggestion)));
                }
                html.push_str("</ul></li>\n");
            }
            html.push_str("</ul>\n");
        }

        html.push_str(&format!(
            "<p>Check completed at {}</p>\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Get formatter based on output format
pub fn get_formatter(format: OutputFormat, use_colors: bool) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Human => Box::new(HumanFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
        OutputFormat::Html => Box::new(HtmlFormatter::new()),
    }
}

/// Default export filename, timestamped to keep successive runs apart.
pub fn export_filename(format: OutputFormat, now: chrono::DateTime<chrono::Utc>) -> String {
    let extension = match format {
        OutputFormat::Human => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Html => "html",
    };
    format!("bedrock_check_{}.{}", now.format("%Y%m%d_%H%M%S"), extension)
}

/// Write output to file or stdout
pub fn write_output(output: &str, file_path: Option<&std::path::Path>) -> std::io::Result<()> {
    if let Some(path) = file_path {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
    } else {
        print!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::checks::{CheckDetail, CheckResult, Component};
    use crate::report::ReportOptions;
    use chrono::TimeZone;

    fn create_report(options: &ReportOptions) -> AccessReport {
        let results = vec![
            CheckResult::success(
                Component::Credentials,
                "valid AWS credentials found from profile 'dev'",
                CheckDetail::Credentials {
                    source: "profile 'dev'".to_string(),
                    masked_key_id: "AKIA...MPLE".to_string(),
                },
            ),
            CheckResult::success(
                Component::Regions,
                "all 2 requested regions offer Bedrock",
                CheckDetail::Regions {
                    requested: vec!["us-east-1".to_string(), "us-west-2".to_string()],
                    available: vec!["us-east-1".to_string(), "us-west-2".to_string()],
                    failures: vec![],
                },
            ),
            CheckResult::success(
                Component::Runtime,
                "runtime endpoint reachable in 2 region(s)",
                CheckDetail::Runtime {
                    reachable: vec!["us-east-1".to_string(), "us-west-2".to_string()],
                    failures: vec![],
                },
            ),
            CheckResult::success(
                Component::Models,
                "found 1 models across 2 region(s)",
                CheckDetail::Models {
                    total: 1,
                    models: vec![],
                },
            ),
            CheckResult::warning(
                Component::KeyModels,
                "1/4 key models available (partial access)",
                CheckDetail::KeyModels {
                    present: vec!["amazon.titan-embed-text-v1".to_string()],
                    missing: vec![
                        "amazon.titan-embed-text-v2:0".to_string(),
                        "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
                        "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
                    ],
                },
                None,
            ),
        ];
        AccessReport::assemble(results, &Catalog::builtin(), options)
    }

    #[test]
    fn test_human_formatter() {
        let report = create_report(&ReportOptions {
            profile: Some("dev".to_string()),
            ..Default::default()
        });
        let output = HumanFormatter::new(false).format(&report);

        assert!(output.contains("AWS Bedrock Access Verification Summary"));
        assert!(output.contains("Profile: dev"));
        assert!(output.contains("Key Models"));
        assert!(output.contains("Overall Status: WARNING"));
        assert!(output.contains("Troubleshooting Tips"));
        assert!(output.contains("Next Steps"));
    }

    #[test]
    fn test_json_formatter() {
        let report = create_report(&ReportOptions::default());
        let output = JsonFormatter::new(true).format(&report);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["aggregate"], "warning");
        assert_eq!(parsed["dashboard"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_csv_formatter() {
        let report = create_report(&ReportOptions::default());
        let output = CsvFormatter::new().format(&report);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Component,Status,Details");
        // 5 components + overall row.
        assert_eq!(lines.len(), 7);
        assert!(lines[6].starts_with("Overall,WARNING,"));
        // Commas inside details never break the row shape.
        for line in &lines[1..] {
            assert_eq!(line.matches(',').count(), 2, "bad row: {}", line);
        }
    }

    #[test]
    fn test_html_formatter_escapes() {
        let mut report = create_report(&ReportOptions::default());
        report.dashboard[0].details = "a <tag> & \"quote\"".to_string();
        let output = HtmlFormatter::new().format(&report);

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("a &lt;tag&gt; &amp; &quot;quote&quot;"));
        assert!(!output.contains("a <tag>"));
    }

    #[test]
    fn test_html_formatter_sections() {
        let report = create_report(&ReportOptions {
            advanced: true,
            alternatives: true,
            ..Default::default()
        });
        let output = HtmlFormatter::new().format(&report);
        assert!(output.contains("<h2>Models</h2>"));
        assert!(output.contains("<h2>Alternatives for missing key models</h2>"));
        assert!(output.contains("<h2>Troubleshooting</h2>"));
    }

    #[test]
    fn test_export_filename() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(
            export_filename(OutputFormat::Json, now),
            "bedrock_check_20240305_093000.json"
        );
        assert_eq!(
            export_filename(OutputFormat::Html, now),
            "bedrock_check_20240305_093000.html"
        );
    }
}
