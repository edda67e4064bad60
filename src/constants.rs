//! Common constants used throughout the crate.
//!
//! This was consolidated here because we started redefining this in separate modules accidentally.
//! This helps ensure the entire crate is on the same page about these constant values. If a value
//! is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically. (This can be a bit hard with comments, etc.)

/// Cookie delivering the expiration time of a canned-policy signed cookie set.
pub const COOKIE_EXPIRES: &str = "CloudFront-Expires";

/// Cookie delivering the key pair id of a signed cookie set.
pub const COOKIE_KEY_PAIR_ID: &str = "CloudFront-Key-Pair-Id";

/// Cookie delivering the custom policy of a signed cookie set.
pub const COOKIE_POLICY: &str = "CloudFront-Policy";

/// Cookie delivering the signature of a signed cookie set.
pub const COOKIE_SIGNATURE: &str = "CloudFront-Signature";

/// The charset used for query strings when none is specified.
pub(crate) const DEFAULT_CHARSET: &str = "utf-8";

/// Error code: AccessDenied
pub(crate) const ERR_CODE_ACCESS_DENIED: &str = "AccessDenied";

/// Error code: Expired
pub(crate) const ERR_CODE_EXPIRED: &str = "Expired";

/// Error code: KeyLoadError
pub(crate) const ERR_CODE_KEY_LOAD_ERROR: &str = "KeyLoadError";

/// Error code: KeyNotFound
pub(crate) const ERR_CODE_KEY_NOT_FOUND: &str = "KeyNotFound";

/// Error code: MalformedUrl
pub(crate) const ERR_CODE_MALFORMED_URL: &str = "MalformedUrl";

/// Error code: MissingField
pub(crate) const ERR_CODE_MISSING_FIELD: &str = "MissingField";

/// Error code: PolicyDecodeError
pub(crate) const ERR_CODE_POLICY_DECODE_ERROR: &str = "PolicyDecodeError";

/// Error code: UnsupportedEncoding
pub(crate) const ERR_CODE_UNSUPPORTED_ENCODING: &str = "UnsupportedEncoding";

/// Error message: `"either expires or policy must be set"`
pub(crate) const MSG_EITHER_EXPIRES_OR_POLICY: &str = "either expires or policy must be set";

/// Error message: `"Illegal hex character in escape % pattern: %"`
pub(crate) const MSG_ILLEGAL_HEX_CHAR: &str = "Illegal hex character in escape % pattern: %";

/// Error message: `"Incomplete trailing escape % sequence"`
pub(crate) const MSG_INCOMPLETE_TRAILING_ESCAPE: &str = "Incomplete trailing escape % sequence";

/// Error message: `"key file cannot be null"`
pub(crate) const MSG_KEY_FILE_NULL: &str = "key file cannot be null";

/// Error message: `"key id cannot be null"`
pub(crate) const MSG_KEY_ID_NULL: &str = "key id cannot be null";

/// Error message: `"request type cannot be null"`
pub(crate) const MSG_REQUEST_TYPE_NULL: &str = "request type cannot be null";

/// Error message prefix: `"Signature is expired"`
pub(crate) const MSG_SIGNATURE_EXPIRED: &str = "Signature is expired";

/// Error message: `"The signature does not match the signed content for this request"`
pub(crate) const MSG_SIGNATURE_MISMATCH: &str = "The signature does not match the signed content for this request";

/// Error message: `"signature cannot be null"`
pub(crate) const MSG_SIGNATURE_NULL: &str = "signature cannot be null";

/// Error message: `"url cannot be null"`
pub(crate) const MSG_URL_NULL: &str = "url cannot be null";

/// Query parameter delivering the expiration time of a canned-policy signed URL.
pub const PARAM_EXPIRES: &str = "Expires";

/// Query parameter delivering the key pair id of a signed URL.
pub const PARAM_KEY_PAIR_ID: &str = "Key-Pair-Id";

/// Query parameter delivering the custom policy of a signed URL.
pub const PARAM_POLICY: &str = "Policy";

/// Query parameter delivering the signature of a signed URL.
pub const PARAM_SIGNATURE: &str = "Signature";
