//! Non-cryptographic policy condition checks.
//!
//! Signature verification proves the policy is authentic; this module decides whether the
//! authentic policy actually authorizes the request: expiry and activation bounds, source
//! address restrictions, and which statement covers the requested resource.

use {
    crate::{
        constants::MSG_SIGNATURE_EXPIRED,
        policy::{Policy, PolicyStatement},
        ValidationError,
    },
    chrono::{DateTime, Utc},
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
    std::net::IpAddr,
};

lazy_static! {
    /// Characters with special meaning in a resource pattern.
    static ref WILDCARD: Regex = Regex::new(r"[*?]").unwrap();
}

/// Evaluate a custom policy against the requested URL, the current time, and the caller's
/// source address.
///
/// The first statement whose `resource` covers `url` is evaluated; its conditions must all
/// hold. A policy with no covering statement is an [`AccessDenied`][ValidationError::AccessDenied].
///
/// Resource matching (exact, or `*`/`?` wildcards) follows the provider's documented scheme.
pub fn evaluate_policy(
    policy: &Policy,
    url: &str,
    now: DateTime<Utc>,
    remote_ip: Option<&str>,
) -> Result<(), ValidationError> {
    if policy.statements().is_empty() {
        return Err(ValidationError::AccessDenied("policy contains no statements".to_string()));
    }

    let Some(statement) = policy.statements().iter().find(|s| resource_matches(&s.resource, url)) else {
        return Err(ValidationError::AccessDenied(format!("no policy statement covers resource: {}", url)));
    };

    check_statement(statement, now, remote_ip)
}

/// Evaluate the conditions of a single policy statement.
pub fn check_statement(
    statement: &PolicyStatement,
    now: DateTime<Utc>,
    remote_ip: Option<&str>,
) -> Result<(), ValidationError> {
    check_conditions(
        statement.date_less_than,
        statement.date_greater_than,
        statement.ip_address.as_deref(),
        now,
        remote_ip,
    )
}

/// Evaluate time and IP conditions directly.
///
/// Fails with [`Expired`][ValidationError::Expired] when `now` has reached `expiry_bound`, and
/// with [`AccessDenied`][ValidationError::AccessDenied] when the lower bound has not yet been
/// reached or the source address falls outside the configured range. Both the canned-policy
/// path (expiry only) and the custom-policy path evaluate through here.
pub fn check_conditions(
    expiry_bound: DateTime<Utc>,
    lower_bound: Option<DateTime<Utc>>,
    ip_condition: Option<&str>,
    now: DateTime<Utc>,
    remote_ip: Option<&str>,
) -> Result<(), ValidationError> {
    if now >= expiry_bound {
        return Err(ValidationError::Expired(format!(
            "{}: {} >= {}",
            MSG_SIGNATURE_EXPIRED,
            now.to_rfc3339(),
            expiry_bound.to_rfc3339()
        )));
    }

    if let Some(lower_bound) = lower_bound {
        if now < lower_bound {
            return Err(ValidationError::AccessDenied(format!(
                "signature is not yet valid: {} < {}",
                now.to_rfc3339(),
                lower_bound.to_rfc3339()
            )));
        }
    }

    if let Some(ip_condition) = ip_condition {
        let Some(remote_ip) = remote_ip else {
            return Err(ValidationError::AccessDenied(format!(
                "policy restricts source IP to {} but no source address is available",
                ip_condition
            )));
        };

        if !ip_in_range(ip_condition, remote_ip)? {
            debug!("source IP {} is outside the allowed range {}", remote_ip, ip_condition);
            return Err(ValidationError::AccessDenied(format!(
                "source IP {} is outside the allowed range {}",
                remote_ip, ip_condition
            )));
        }
    }

    Ok(())
}

/// Whether a resource pattern covers the requested URL. Patterns without wildcards must match
/// exactly; `*` matches any run of characters and `?` a single character.
fn resource_matches(resource: &str, url: &str) -> bool {
    if !WILDCARD.is_match(resource) {
        return resource == url;
    }

    let pattern = format!("^{}$", regex::escape(resource).replace(r"\*", ".*").replace(r"\?", "."));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(url),
        Err(_) => false,
    }
}

/// Whether `remote_ip` falls inside `condition`, a bare IP address or CIDR notation.
///
/// A condition or address that cannot be parsed fails closed with
/// [`AccessDenied`][ValidationError::AccessDenied] — the policy decoded fine; the condition
/// simply cannot be satisfied.
fn ip_in_range(condition: &str, remote_ip: &str) -> Result<bool, ValidationError> {
    let denied = |what: &str, value: &str| {
        ValidationError::AccessDenied(format!("unable to parse {}: {}", what, value))
    };

    let remote: IpAddr = remote_ip.parse().map_err(|_| denied("source address", remote_ip))?;

    let (network, prefix_len) = match condition.split_once('/') {
        Some((network, bits)) => {
            let bits: u32 = bits.parse().map_err(|_| denied("IP condition", condition))?;
            (network, Some(bits))
        }
        None => (condition, None),
    };
    let network: IpAddr = network.parse().map_err(|_| denied("IP condition", condition))?;

    Ok(match (network, remote) {
        (IpAddr::V4(network), IpAddr::V4(remote)) => {
            let bits = prefix_len.unwrap_or(32);
            if bits > 32 {
                return Err(denied("IP condition", condition));
            }
            let mask = if bits == 0 {
                0
            } else {
                u32::MAX << (32 - bits)
            };
            u32::from(network) & mask == u32::from(remote) & mask
        }
        (IpAddr::V6(network), IpAddr::V6(remote)) => {
            let bits = prefix_len.unwrap_or(128);
            if bits > 128 {
                return Err(denied("IP condition", condition));
            }
            let mask = if bits == 0 {
                0
            } else {
                u128::MAX << (128 - bits)
            };
            u128::from(network) & mask == u128::from(remote) & mask
        }
        // Address family mismatch can never satisfy the condition.
        _ => false,
    })
}
