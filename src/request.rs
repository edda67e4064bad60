use {
    crate::Policy,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    std::path::PathBuf,
};

/// How the signing parameters were delivered to the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestType {
    /// Signing parameters arrived as URL query parameters (`Expires`, `Signature`,
    /// `Key-Pair-Id`, `Policy`).
    Url,

    /// Signing parameters arrived as a cookie set (`CloudFront-Expires`,
    /// `CloudFront-Signature`, `CloudFront-Key-Pair-Id`, `CloudFront-Policy`).
    Cookie,
}

/// A signed request as extracted by the HTTP layer, ready for validation.
///
/// All fields the engine checks are optional so that
/// [`validate_signature`][crate::RequestValidator::validate_signature] can enforce its
/// fixed-order field-presence checks and report exactly which field is missing. On a well-formed
/// request exactly one of `expires`/`policy` informs the expiry check; `policy` takes precedence
/// when both are set.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
#[builder(default, setter(into, strip_option))]
pub struct SignedRequest {
    /// Whether the signing parameters came from the query string or from cookies.
    pub request_type: Option<RequestType>,

    /// The resource URL being accessed, with the signing-control parameters stripped from its
    /// query string.
    pub url: Option<String>,

    /// The signature, as the opaque wire-format (custom-alphabet base64) string.
    pub signature: Option<String>,

    /// The key pair id naming the public key the signature was made against. Required for cookie
    /// requests.
    pub key_id: Option<String>,

    /// Resolved filesystem path of the PEM public key to verify against.
    pub key_file: Option<PathBuf>,

    /// Absolute expiration time for the canned-policy path. Ignored when `policy` is set.
    pub expires: Option<DateTime<Utc>>,

    /// The decoded custom policy, when one was attached.
    pub policy: Option<Policy>,

    /// The raw decoded policy bytes, when the policy came off the wire. The signature covers
    /// these exact bytes; when absent, the policy is re-encoded in the provider's canonical form
    /// before verification.
    pub policy_raw: Option<Bytes>,

    /// The caller's source address, preferring a forwarded-for header over the socket address.
    /// Required only when the policy carries an IP condition.
    pub remote_ip: Option<String>,
}

impl SignedRequest {
    /// Create a builder for a `SignedRequest`.
    pub fn builder() -> SignedRequestBuilder {
        SignedRequestBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{RequestType, SignedRequest},
        chrono::{TimeZone, Utc},
    };

    #[test_log::test]
    fn test_builder() {
        let expires = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let req = SignedRequest::builder()
            .request_type(RequestType::Cookie)
            .url("http://localhost/test/url.html")
            .key_id("test-keypair")
            .key_file("/etc/keys/test.pem")
            .expires(expires)
            .signature("AbCd~123_")
            .build()
            .unwrap();

        assert_eq!(req.request_type, Some(RequestType::Cookie));
        assert_eq!(req.url.as_deref(), Some("http://localhost/test/url.html"));
        assert_eq!(req.key_id.as_deref(), Some("test-keypair"));
        assert_eq!(req.expires, Some(expires));
        assert!(req.policy.is_none());
        assert!(req.remote_ip.is_none());

        let empty = SignedRequest::builder().build().unwrap();
        assert_eq!(empty, SignedRequest::default());
    }
}
