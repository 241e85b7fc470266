//! AWS Signature Version 4 request signing.
//!
//! Covers what the checker needs: GET and POST requests with a canonical
//! path, no query string tricks, signed `host` and `x-amz-date` headers
//! (plus `x-amz-security-token` for temporary credentials).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Inputs that identify the signer.
pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
    pub service: &'a str,
}

/// Headers to attach to the outgoing request.
#[derive(Debug, Clone)]
pub struct SignatureParts {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac key");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Percent-encode a path segment per the SigV4 canonical URI rules.
/// Unreserved characters pass through; everything else (including `:` in
/// model ids) is encoded.
pub fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Derive the SigV4 signing key for a date/region/service scope.
fn signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sign one request. `canonical_path` must already be URI-encoded
/// (see [`uri_encode`]); `canonical_query` must be empty or already in
/// canonical form.
pub fn sign(
    params: &SigningParams<'_>,
    method: &str,
    host: &str,
    canonical_path: &str,
    canonical_query: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> SignatureParts {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(payload);

    let mut canonical_headers = format!("host:{}\nx-amz-date:{}\n", host, amz_date);
    let mut signed_headers = "host;x-amz-date".to_string();
    if let Some(token) = params.session_token {
        canonical_headers.push_str(&format!("x-amz-security-token:{}\n", token));
        signed_headers.push_str(";x-amz-security-token");
    }

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_path, canonical_query, canonical_headers, signed_headers, payload_hash
    );

    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, params.region, params.service
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(
        params.secret_access_key,
        &date_stamp,
        params.region,
        params.service,
    );
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        params.access_key_id, credential_scope, signed_headers, signature
    );

    SignatureParts {
        authorization,
        amz_date,
        security_token: params.session_token.map(|t| t.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("foundation-models"), "foundation-models");
        assert_eq!(
            uri_encode("anthropic.claude-3-haiku-20240307-v1:0"),
            "anthropic.claude-3-haiku-20240307-v1%3A0"
        );
    }

    #[test]
    fn test_signing_key_derivation() {
        // Worked example from the AWS SigV4 documentation.
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_get_vanilla_vector() {
        // "get-vanilla" case from the AWS SigV4 test suite.
        let params = SigningParams {
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            session_token: None,
            region: "us-east-1",
            service: "service",
        };
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let parts = sign(&params, "GET", "example.amazonaws.com", "/", "", b"", now);

        assert_eq!(parts.amz_date, "20150830T123600Z");
        assert_eq!(
            parts.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn test_session_token_is_signed() {
        let params = SigningParams {
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: "secret",
            session_token: Some("the-token"),
            region: "us-west-2",
            service: "bedrock",
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let parts = sign(
            &params,
            "GET",
            "bedrock.us-west-2.amazonaws.com",
            "/foundation-models",
            "",
            b"",
            now,
        );
        assert!(parts
            .authorization
            .contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
        assert_eq!(parts.security_token.as_deref(), Some("the-token"));
    }
}
