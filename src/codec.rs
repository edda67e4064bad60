//! Wire-format policy codec.
//!
//! CloudFront transports its policy documents and signatures as base64 with a URL/cookie-safe
//! alphabet: `+` is written as `-`, `=` (padding) as `_`, and `/` as `~`. The policy document
//! itself is JSON with a fixed schema (`Statement`, `Resource`, `Condition`, `DateLessThan`,
//! `DateGreaterThan`, `IpAddress`, with epoch seconds under `AWS:EpochTime` and the source IP
//! under `AWS:SourceIp`).
//!
//! The signature covers the exact bytes that were signed, so [`decode`] returns the raw decoded
//! bytes alongside the parsed model, and [`custom_policy_json`]/[`canned_policy_json`] reproduce
//! the provider's byte layouts exactly — a single byte of difference (even whitespace)
//! invalidates the signature.

use {
    crate::{Policy, PolicyStatement, ValidationError},
    base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, DecodeError, Engine as _},
    bytes::Bytes,
    chrono::{DateTime, TimeZone, Utc},
    log::trace,
    serde::Deserialize,
};

/// JSON condition key for the lower time bound.
const DATE_GREATER_THAN: &str = "DateGreaterThan";

/// JSON condition key for the expiration bound.
const DATE_LESS_THAN: &str = "DateLessThan";

/// JSON key for the epoch-seconds value of a date condition.
const EPOCH_TIME: &str = "AWS:EpochTime";

/// JSON condition key for the source address restriction.
const IP_ADDRESS: &str = "IpAddress";

/// JSON key for the source address value of an IP condition.
const SOURCE_IP: &str = "AWS:SourceIp";

/// Wire representation of a policy document.
#[derive(Debug, Deserialize)]
struct PolicyRepr {
    #[serde(rename = "Statement")]
    statement: Vec<StatementRepr>,
}

/// Wire representation of a policy statement.
#[derive(Debug, Deserialize)]
struct StatementRepr {
    #[serde(rename = "Resource")]
    resource: String,

    #[serde(rename = "Condition")]
    condition: ConditionRepr,
}

/// Wire representation of the conditions of a statement.
#[derive(Debug, Default, Deserialize)]
struct ConditionRepr {
    #[serde(rename = "DateLessThan")]
    date_less_than: Option<EpochTimeRepr>,

    #[serde(rename = "DateGreaterThan")]
    date_greater_than: Option<EpochTimeRepr>,

    #[serde(rename = "IpAddress")]
    ip_address: Option<SourceIpRepr>,
}

/// Wire representation of a date condition: an integer count of epoch seconds.
#[derive(Debug, Deserialize)]
struct EpochTimeRepr {
    #[serde(rename = "AWS:EpochTime")]
    epoch_time: i64,
}

/// Wire representation of an IP condition.
#[derive(Debug, Deserialize)]
struct SourceIpRepr {
    #[serde(rename = "AWS:SourceIp")]
    source_ip: String,
}

/// Decode a wire-format policy blob into a [`Policy`], returning the raw decoded bytes alongside
/// it.
///
/// The raw bytes are what the signature was computed over and must be used verbatim for
/// signature verification — not a re-serialized reconstruction.
pub fn decode(blob: &str) -> Result<(Policy, Bytes), ValidationError> {
    trace!("decoding policy blob: {}", blob);

    let raw = decode_wire_b64(blob)
        .map_err(|e| ValidationError::PolicyDecode(format!("policy is not valid base64: {}", e)))?;

    let repr: PolicyRepr = serde_json::from_slice(&raw)
        .map_err(|e| ValidationError::PolicyDecode(format!("unable to parse policy document: {}", e)))?;

    if repr.statement.is_empty() {
        return Err(ValidationError::PolicyDecode("policy contains no statements".to_string()));
    }

    let mut statements = Vec::with_capacity(repr.statement.len());
    for statement in repr.statement {
        let date_less_than = match statement.condition.date_less_than {
            Some(ref epoch) => epoch_to_datetime(epoch.epoch_time)?,
            None => {
                return Err(ValidationError::PolicyDecode(format!(
                    "policy statement for resource {} has no DateLessThan condition",
                    statement.resource
                )))
            }
        };

        let date_greater_than = match statement.condition.date_greater_than {
            Some(ref epoch) => Some(epoch_to_datetime(epoch.epoch_time)?),
            None => None,
        };

        statements.push(PolicyStatement {
            resource: statement.resource,
            date_less_than,
            date_greater_than,
            ip_address: statement.condition.ip_address.map(|ip| ip.source_ip),
        });
    }

    Ok((Policy::from(statements), Bytes::from(raw)))
}

/// Encode a [`Policy`] as a wire-format blob: the provider's custom-policy JSON layout, base64
/// encoded with the custom alphabet.
///
/// This is the inverse of [`decode`]: `decode(&encode(policy))` yields `policy` back. The
/// encoded bytes need not byte-match an externally generated blob, though the JSON layout
/// follows the provider's signer so that simple policies do.
pub fn encode(policy: &Policy) -> String {
    encode_wire_b64(custom_policy_json(policy).as_bytes())
}

/// Synthesize the canonical canned-policy document for a resource URL and expiration time.
///
/// This is the exact minimal JSON the provider signs for canned-policy requests: a single
/// statement, no whitespace, fixed key order.
pub fn canned_policy_json(resource: &str, expires: DateTime<Utc>) -> String {
    format!(
        r#"{{"Statement":[{{"Resource":"{}","Condition":{{"{}":{{"{}":{}}}}}}}]}}"#,
        resource,
        DATE_LESS_THAN,
        EPOCH_TIME,
        expires.timestamp()
    )
}

/// Serialize a [`Policy`] in the provider's custom-policy byte layout.
///
/// The layout matches the provider's signer: a space after `"Statement":`, and conditions in
/// DateLessThan, IpAddress, DateGreaterThan order. Hand-built policies verified against a
/// signature produced by the provider's tooling depend on this byte-level agreement.
pub fn custom_policy_json(policy: &Policy) -> String {
    let statements: Vec<String> = policy.statements().iter().map(statement_json).collect();
    format!(r#"{{"Statement": [{}]}}"#, statements.join(","))
}

/// Serialize a single statement in the provider's custom-policy byte layout.
fn statement_json(statement: &PolicyStatement) -> String {
    let mut conditions =
        format!(r#""{}":{{"{}":{}}}"#, DATE_LESS_THAN, EPOCH_TIME, statement.date_less_than.timestamp());

    if let Some(ref ip) = statement.ip_address {
        conditions.push_str(&format!(r#","{}":{{"{}":"{}"}}"#, IP_ADDRESS, SOURCE_IP, ip));
    }

    if let Some(date_greater_than) = statement.date_greater_than {
        conditions.push_str(&format!(
            r#","{}":{{"{}":{}}}"#,
            DATE_GREATER_THAN,
            EPOCH_TIME,
            date_greater_than.timestamp()
        ));
    }

    format!(r#"{{"Resource":"{}","Condition":{{{}}}}}"#, statement.resource, conditions)
}

/// Decode a wire-format base64 string, reversing the custom alphabet substitutions in full.
pub(crate) fn decode_wire_b64(s: &str) -> Result<Vec<u8>, DecodeError> {
    let standard: String = s
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            c => c,
        })
        .collect();
    BASE64_STANDARD.decode(standard)
}

/// Encode bytes as a wire-format base64 string, applying the custom alphabet substitutions.
pub(crate) fn encode_wire_b64(bytes: &[u8]) -> String {
    BASE64_STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            c => c,
        })
        .collect()
}

/// Convert a wire epoch-seconds value to an absolute timestamp.
fn epoch_to_datetime(epoch: i64) -> Result<DateTime<Utc>, ValidationError> {
    Utc.timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| ValidationError::PolicyDecode(format!("epoch time out of range: {}", epoch)))
}
