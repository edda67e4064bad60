//! Request validation orchestration.
//!
//! [`RequestValidator`] ties the pieces together: field-presence checks in a fixed order, key
//! loading through the [`KeyResolver`], canonical-byte selection (custom policy vs. canned
//! expiry), signature verification, and policy condition evaluation.

use {
    crate::{
        codec,
        constants::{
            DEFAULT_CHARSET, MSG_EITHER_EXPIRES_OR_POLICY, MSG_ILLEGAL_HEX_CHAR, MSG_INCOMPLETE_TRAILING_ESCAPE,
            MSG_KEY_FILE_NULL, MSG_KEY_ID_NULL, MSG_REQUEST_TYPE_NULL, MSG_SIGNATURE_EXPIRED, MSG_SIGNATURE_MISMATCH,
            MSG_SIGNATURE_NULL, MSG_URL_NULL, PARAM_EXPIRES, PARAM_KEY_PAIR_ID, PARAM_POLICY, PARAM_SIGNATURE,
        },
        crypto, evaluator,
        keys::KeyResolver,
        request::{RequestType, SignedRequest},
        ValidationError,
    },
    chrono::{DateTime, TimeZone, Utc},
    encoding::{label::encoding_from_whatwg_label, DecoderTrap, EncodingRef},
    http::uri::Uri,
    log::{debug, trace},
    std::path::Path,
};

/// Validates signed requests against the configured key material.
///
/// The validator holds no long-lived state beyond the resolver's key cache; each validation call
/// is a pure function of its inputs, the current time, and the cache contents.
#[derive(Debug)]
pub struct RequestValidator {
    keys: KeyResolver,
}

impl RequestValidator {
    /// Create a validator over a configured key resolver.
    pub fn new(keys: KeyResolver) -> Self {
        Self {
            keys,
        }
    }

    /// The underlying key resolver.
    pub fn key_resolver(&self) -> &KeyResolver {
        &self.keys
    }

    /// Validate a populated [`SignedRequest`].
    ///
    /// Field-presence checks run in a fixed order, stopping at the first violation: request
    /// type, key file, URL, key id (cookie requests only), expires-or-policy, signature. Each
    /// produces a [`MissingField`][ValidationError::MissingField] with a distinct stable
    /// message. After presence checks the key is loaded, the signature verified over the
    /// canonical bytes, and the policy conditions evaluated. Returns `Ok(true)` when the
    /// request is authorized.
    pub fn validate_signature(&self, req: &SignedRequest) -> Result<bool, ValidationError> {
        let missing = |msg: &str| Err(ValidationError::MissingField(msg.to_string()));

        let Some(request_type) = req.request_type else {
            return missing(MSG_REQUEST_TYPE_NULL);
        };

        let Some(ref key_file) = req.key_file else {
            return missing(MSG_KEY_FILE_NULL);
        };

        let Some(ref url) = req.url else {
            return missing(MSG_URL_NULL);
        };

        if request_type == RequestType::Cookie && req.key_id.is_none() {
            return missing(MSG_KEY_ID_NULL);
        }

        if req.expires.is_none() && req.policy.is_none() {
            return missing(MSG_EITHER_EXPIRES_OR_POLICY);
        }

        let Some(ref signature) = req.signature else {
            return missing(MSG_SIGNATURE_NULL);
        };

        let key = self.keys.load(key_file)?;

        // The signature covers the policy bytes exactly as they came off the wire; a policy
        // built in memory is serialized in the provider's byte layout instead.
        let canonical = match (&req.policy, &req.policy_raw, req.expires) {
            (Some(_), Some(raw), _) => raw.to_vec(),
            (Some(policy), None, _) => codec::custom_policy_json(policy).into_bytes(),
            (None, _, Some(expires)) => codec::canned_policy_json(url, expires).into_bytes(),
            (None, _, None) => return missing(MSG_EITHER_EXPIRES_OR_POLICY),
        };

        let signature = codec::decode_wire_b64(signature).map_err(|e| {
            debug!("signature is not decodable: {}", e);
            ValidationError::AccessDenied(format!("signature is not valid wire-format base64: {}", e))
        })?;

        if !crypto::verify(&key, &canonical, &signature) {
            return Err(ValidationError::AccessDenied(MSG_SIGNATURE_MISMATCH.to_string()));
        }

        let now = Utc::now();
        match (&req.policy, req.expires) {
            (Some(policy), _) => evaluator::evaluate_policy(policy, url, now, req.remote_ip.as_deref())?,
            (None, Some(expires)) => {
                evaluator::check_conditions(expires, None, None, now, req.remote_ip.as_deref())?
            }
            (None, None) => return missing(MSG_EITHER_EXPIRES_OR_POLICY),
        }

        Ok(true)
    }

    /// Validate a signed URL against the public key at `key_file`.
    ///
    /// Parses the query string for the provider's signing parameters (`Expires`, `Signature`,
    /// `Key-Pair-Id`, `Policy`), strips them from the URL, and delegates to
    /// [`validate_signature`][Self::validate_signature]. An unparseable URL is a
    /// [`MalformedUrl`][ValidationError::MalformedUrl].
    pub fn validate_signed_url(&self, key_file: &Path, raw_url: &str) -> Result<bool, ValidationError> {
        let uri: Uri = raw_url
            .parse()
            .map_err(|e| ValidationError::MalformedUrl(format!("unable to parse url {}: {}", raw_url, e)))?;

        let query = uri.query().unwrap_or("");
        let params = split_query(query)?;
        trace!("signed url query parameters: {:?}", params);

        let param = |name: &str| params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str());
        let expires = match param(PARAM_EXPIRES) {
            Some(value) => Some(parse_expires(value)?),
            None => None,
        };
        let policy_blob = param(PARAM_POLICY);

        // An already-expired URL is reported as such even when later checks would also fail.
        if policy_blob.is_none() {
            if let Some(expires) = expires {
                let now = Utc::now();
                if now >= expires {
                    return Err(ValidationError::Expired(format!(
                        "{}: {} >= {}",
                        MSG_SIGNATURE_EXPIRED,
                        now.to_rfc3339(),
                        expires.to_rfc3339()
                    )));
                }
            }
        }

        let mut builder = SignedRequest::builder();
        builder.request_type(RequestType::Url).key_file(key_file).url(strip_signing_params(&uri, query));

        if let Some(expires) = expires {
            builder.expires(expires);
        }
        if let Some(blob) = policy_blob {
            let (policy, raw) = codec::decode(blob)?;
            builder.policy(policy).policy_raw(raw);
        }
        if let Some(key_id) = param(PARAM_KEY_PAIR_ID) {
            builder.key_id(key_id);
        }
        if let Some(signature) = param(PARAM_SIGNATURE) {
            builder.signature(signature);
        }

        let req = builder.build().map_err(|e| ValidationError::MalformedUrl(e.to_string()))?;
        self.validate_signature(&req)
    }
}

/// Split a query string into an ordered list of percent-decoded `(key, value)` pairs, assuming
/// UTF-8 text.
///
/// First-seen key order is preserved; a duplicate key overwrites the earlier value in place.
pub fn split_query(query: &str) -> Result<Vec<(String, String)>, ValidationError> {
    split_query_charset(query, DEFAULT_CHARSET)
}

/// Split a query string into an ordered list of percent-decoded `(key, value)` pairs, decoding
/// text with the named charset.
///
/// An unrecognized charset label is an [`UnsupportedEncoding`][ValidationError::UnsupportedEncoding].
pub fn split_query_charset(query: &str, charset: &str) -> Result<Vec<(String, String)>, ValidationError> {
    let Some(encoding) = encoding_from_whatwg_label(charset) else {
        return Err(ValidationError::UnsupportedEncoding(format!("unsupported charset: {}", charset)));
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key, encoding)?, percent_decode(value, encoding)?),
            None => (percent_decode(pair, encoding)?, String::new()),
        };

        match pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => pairs.push((key, value)),
        }
    }

    Ok(pairs)
}

/// Rebuild the request URL with the signing-control parameters removed from its query string.
///
/// The surviving parameters keep their raw (undecoded) text so the result byte-matches the URL
/// the signer saw.
fn strip_signing_params(uri: &Uri, query: &str) -> String {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            !pair.is_empty()
                && key != PARAM_EXPIRES
                && key != PARAM_KEY_PAIR_ID
                && key != PARAM_POLICY
                && key != PARAM_SIGNATURE
        })
        .collect();

    let mut url = match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => format!("{}://{}{}", scheme, authority, uri.path()),
        _ => uri.path().to_string(),
    };

    if !kept.is_empty() {
        url.push('?');
        url.push_str(&kept.join("&"));
    }

    url
}

/// Parse the decoded `Expires` parameter value, an integer count of epoch seconds.
fn parse_expires(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let epoch: i64 = value
        .parse()
        .map_err(|_| ValidationError::MalformedUrl(format!("unable to parse Expires parameter: {}", value)))?;
    Utc.timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| ValidationError::MalformedUrl(format!("Expires parameter out of range: {}", value)))
}

/// Decode percent escapes (and `+` as space) into bytes, then decode the bytes as `encoding`
/// text.
fn percent_decode(s: &str, encoding: EncodingRef) -> Result<String, ValidationError> {
    let raw = s.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            b'%' => {
                if i + 3 > raw.len() {
                    return Err(ValidationError::MalformedUrl(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
                }
                match (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    (Some(hi), Some(lo)) => bytes.push(hi << 4 | lo),
                    _ => return Err(ValidationError::MalformedUrl(MSG_ILLEGAL_HEX_CHAR.to_string())),
                }
                i += 3;
            }
            b => {
                bytes.push(b);
                i += 1;
            }
        }
    }

    encoding
        .decode(&bytes, DecoderTrap::Strict)
        .map_err(|e| ValidationError::MalformedUrl(format!("unable to decode query text: {}", e)))
}

/// The value of an ASCII hex digit, if it is one.
fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}
