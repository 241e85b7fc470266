//! Network-level diagnostics for the Bedrock endpoints: DNS resolution,
//! TLS reachability, and latency. Used by the `diagnose` subcommand,
//! independent of any credentials.

use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};

/// DNS resolution result
#[derive(Debug, Clone, Serialize)]
pub struct DnsResult {
    pub hostname: String,
    pub resolved: bool,
    pub addresses: Vec<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// TLS handshake result
#[derive(Debug, Clone, Serialize)]
pub struct TlsResult {
    pub endpoint: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Latency measurement result
#[derive(Debug, Clone, Serialize)]
pub struct LatencyResult {
    pub endpoint: String,
    pub latency_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

/// Complete network diagnostics report
#[derive(Debug, Clone, Serialize)]
pub struct NetworkDiagnostics {
    pub dns: Vec<DnsResult>,
    pub tls: Vec<TlsResult>,
    pub latency: Vec<LatencyResult>,
}

/// The Bedrock service hosts for a region: the control plane (model
/// listing) and the runtime (model invocation) endpoints.
pub fn endpoints_for_region(region: &str) -> Vec<String> {
    vec![
        format!("bedrock.{}.amazonaws.com", region),
        format!("bedrock-runtime.{}.amazonaws.com", region),
    ]
}

fn probe_client() -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| format!("Failed to create client: {}", e))
}

/// Perform DNS resolution check
pub async fn check_dns(hostname: &str) -> DnsResult {
    let start = Instant::now();

    match tokio::net::lookup_host(format!("{}:443", hostname)).await {
        Ok(addrs) => {
            let addresses: Vec<String> = addrs.map(|a| a.ip().to_string()).collect();
            DnsResult {
                hostname: hostname.to_string(),
                resolved: !addresses.is_empty(),
                addresses,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => DnsResult {
            hostname: hostname.to_string(),
            resolved: false,
            addresses: vec![],
            duration_ms: start.elapsed().as_millis() as u64,
            error: Some(e.to_string()),
        },
    }
}

/// Perform TLS handshake check. Any HTTP answer counts: the endpoints
/// reject unsigned requests, but only after the handshake completed.
pub async fn check_tls(endpoint: &str) -> TlsResult {
    let start = Instant::now();

    let client = match probe_client() {
        Ok(c) => c,
        Err(error) => {
            return TlsResult {
                endpoint: endpoint.to_string(),
                success: false,
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(error),
            }
        }
    };

    match client.get(format!("https://{}", endpoint)).send().await {
        Ok(_) => TlsResult {
            endpoint: endpoint.to_string(),
            success: true,
            duration_ms: start.elapsed().as_millis() as u64,
            error: None,
        },
        Err(e) => {
            let error_msg = if e.is_connect() {
                format!("Connection failed: {}", e)
            } else if e.is_timeout() {
                "Connection timed out".to_string()
            } else {
                e.to_string()
            };

            TlsResult {
                endpoint: endpoint.to_string(),
                success: false,
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(error_msg),
            }
        }
    }
}

/// Measure latency to an endpoint
pub async fn measure_latency(endpoint: &str) -> LatencyResult {
    let start = Instant::now();

    let client = match probe_client() {
        Ok(c) => c,
        Err(error) => {
            return LatencyResult {
                endpoint: endpoint.to_string(),
                latency_ms: 0,
                success: false,
                error: Some(error),
            }
        }
    };

    match client.head(format!("https://{}", endpoint)).send().await {
        Ok(_) => LatencyResult {
            endpoint: endpoint.to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            success: true,
            error: None,
        },
        Err(e) => LatencyResult {
            endpoint: endpoint.to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            success: false,
            error: Some(e.to_string()),
        },
    }
}

/// Run full network diagnostics
pub async fn run_diagnostics(
    region: &str,
    check_dns_flag: bool,
    check_tls_flag: bool,
    check_latency_flag: bool,
    custom_endpoint: Option<&str>,
) -> NetworkDiagnostics {
    let endpoints = if let Some(endpoint) = custom_endpoint {
        vec![endpoint.to_string()]
    } else {
        endpoints_for_region(region)
    };

    let mut dns = Vec::new();
    let mut tls = Vec::new();
    let mut latency = Vec::new();

    for endpoint in &endpoints {
        if check_dns_flag {
            dns.push(check_dns(endpoint).await);
        }
        if check_tls_flag {
            tls.push(check_tls(endpoint).await);
        }
        if check_latency_flag {
            latency.push(measure_latency(endpoint).await);
        }
    }

    NetworkDiagnostics { dns, tls, latency }
}

fn mark(ok: bool, use_colors: bool) -> String {
    use console::style;
    match (ok, use_colors) {
        (true, true) => style("\u{2713}").green().to_string(),
        (true, false) => "[OK]".to_string(),
        (false, true) => style("\u{2717}").red().to_string(),
        (false, false) => "[FAIL]".to_string(),
    }
}

fn push_error(output: &mut String, error: &Option<String>, use_colors: bool) {
    if let Some(error) = error {
        if use_colors {
            output.push_str(&format!("    {}\n", console::style(error).red()));
        } else {
            output.push_str(&format!("    Error: {}\n", error));
        }
    }
}

/// Format network diagnostics for human-readable output
pub fn format_diagnostics(diagnostics: &NetworkDiagnostics, use_colors: bool) -> String {
    use console::style;

    let mut output = String::new();
    output.push_str("\nBedrock Endpoint Diagnostics\n");
    output.push_str("============================\n\n");

    if !diagnostics.dns.is_empty() {
        output.push_str("DNS Resolution:\n");
        for result in &diagnostics.dns {
            output.push_str(&format!(
                "  {} {} ({}ms)\n",
                mark(result.resolved, use_colors),
                result.hostname,
                result.duration_ms
            ));
            if result.resolved {
                for addr in &result.addresses {
                    if use_colors {
                        output.push_str(&format!("    {}\n", style(addr).dim()));
                    } else {
                        output.push_str(&format!("    {}\n", addr));
                    }
                }
            } else {
                push_error(&mut output, &result.error, use_colors);
            }
        }
        output.push('\n');
    }

    if !diagnostics.tls.is_empty() {
        output.push_str("TLS Handshake:\n");
        for result in &diagnostics.tls {
            output.push_str(&format!(
                "  {} {} ({}ms)\n",
                mark(result.success, use_colors),
                result.endpoint,
                result.duration_ms
            ));
            if !result.success {
                push_error(&mut output, &result.error, use_colors);
            }
        }
        output.push('\n');
    }

    if !diagnostics.latency.is_empty() {
        output.push_str("Latency:\n");
        for result in &diagnostics.latency {
            output.push_str(&format!(
                "  {} {} - {}ms\n",
                mark(result.success, use_colors),
                result.endpoint,
                result.latency_ms
            ));
            if !result.success {
                push_error(&mut output, &result.error, use_colors);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_for_region() {
        let endpoints = endpoints_for_region("us-east-1");
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints.contains(&"bedrock.us-east-1.amazonaws.com".to_string()));
        assert!(endpoints.contains(&"bedrock-runtime.us-east-1.amazonaws.com".to_string()));
    }

    #[test]
    fn test_format_diagnostics_plain() {
        let diagnostics = NetworkDiagnostics {
            dns: vec![DnsResult {
                hostname: "bedrock.us-east-1.amazonaws.com".to_string(),
                resolved: false,
                addresses: vec![],
                duration_ms: 12,
                error: Some("no such host".to_string()),
            }],
            tls: vec![],
            latency: vec![],
        };
        let output = format_diagnostics(&diagnostics, false);
        assert!(output.contains("[FAIL] bedrock.us-east-1.amazonaws.com"));
        assert!(output.contains("Error: no such host"));
    }
}
