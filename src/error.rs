use {
    crate::constants::*,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when an attempt at validating a CloudFront signed request fails.
///
/// Variants fall into two classes: malformed/unprocessable input
/// ([`MissingField`][Self::MissingField], [`KeyLoad`][Self::KeyLoad],
/// [`MalformedUrl`][Self::MalformedUrl], [`UnsupportedEncoding`][Self::UnsupportedEncoding],
/// [`PolicyDecode`][Self::PolicyDecode]), which map to a `400 Bad Request` response, and
/// well-formed-but-unauthorized requests ([`Expired`][Self::Expired],
/// [`AccessDenied`][Self::AccessDenied], [`KeyNotFound`][Self::KeyNotFound]), which map to
/// `403 Forbidden`.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// A policy condition was not met: the source IP is outside the allowed range, the policy is
    /// not yet active, no policy statement covers the requested resource, or the signature did
    /// not verify against the canonical bytes.
    AccessDenied(/* message */ String),

    /// The request's expiration bound is in the past.
    Expired(/* message */ String),

    /// A public key file could not be read or parsed. The underlying cause (e.g. a file-not-found
    /// I/O error) is preserved as the error source.
    KeyLoad(/* message */ String, /* cause */ Box<dyn Error + Send + Sync>),

    /// The referenced key pair id has no configured location, or its configured file previously
    /// failed to load.
    KeyNotFound(/* message */ String),

    /// The signed URL could not be parsed as a URL, or a query parameter of it could not be
    /// decoded.
    MalformedUrl(/* message */ String),

    /// A required field of the signed request was not populated. The message identifies the
    /// field; field presence is checked in a fixed order and validation stops at the first
    /// missing field.
    MissingField(/* message */ String),

    /// The attached policy could not be decoded: invalid base64, malformed JSON, an empty
    /// statement list, or a statement without an expiration condition.
    PolicyDecode(/* message */ String),

    /// The caller requested a character set this crate does not support.
    UnsupportedEncoding(/* message */ String),
}

impl ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => ERR_CODE_ACCESS_DENIED,
            Self::Expired(_) => ERR_CODE_EXPIRED,
            Self::KeyLoad(_, _) => ERR_CODE_KEY_LOAD_ERROR,
            Self::KeyNotFound(_) => ERR_CODE_KEY_NOT_FOUND,
            Self::MalformedUrl(_) => ERR_CODE_MALFORMED_URL,
            Self::MissingField(_) => ERR_CODE_MISSING_FIELD,
            Self::PolicyDecode(_) => ERR_CODE_POLICY_DECODE_ERROR,
            Self::UnsupportedEncoding(_) => ERR_CODE_UNSUPPORTED_ENCODING,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::AccessDenied(_) | Self::Expired(_) | Self::KeyNotFound(_) => StatusCode::FORBIDDEN,
            Self::KeyLoad(_, _)
            | Self::MalformedUrl(_)
            | Self::MissingField(_)
            | Self::PolicyDecode(_)
            | Self::UnsupportedEncoding(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl ServiceError for ValidationError {
    fn error_code(&self) -> &'static str {
        ValidationError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        ValidationError::http_status(self)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::AccessDenied(msg) => f.write_str(msg),
            Self::Expired(msg) => f.write_str(msg),
            Self::KeyLoad(msg, cause) => write!(f, "{}: {}", msg, cause),
            Self::KeyNotFound(msg) => f.write_str(msg),
            Self::MalformedUrl(msg) => f.write_str(msg),
            Self::MissingField(msg) => f.write_str(msg),
            Self::PolicyDecode(msg) => f.write_str(msg),
            Self::UnsupportedEncoding(msg) => f.write_str(msg),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::KeyLoad(_, ref cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::ValidationError,
        std::{error::Error, io::Error as IOError, io::ErrorKind as IOErrorKind},
    };

    #[test_log::test]
    fn test_codes_and_statuses() {
        let e = ValidationError::MissingField("request type cannot be null".to_string());
        assert_eq!(e.error_code(), "MissingField");
        assert_eq!(e.http_status(), 400);
        assert_eq!(format!("{}", e), "request type cannot be null");
        assert!(e.source().is_none());

        let e = ValidationError::Expired("Signature is expired".to_string());
        assert_eq!(e.error_code(), "Expired");
        assert_eq!(e.http_status(), 403);

        let e = ValidationError::AccessDenied("source IP not allowed".to_string());
        assert_eq!(e.error_code(), "AccessDenied");
        assert_eq!(e.http_status(), 403);

        let e = ValidationError::KeyNotFound("no key configured for key id: missing".to_string());
        assert_eq!(e.error_code(), "KeyNotFound");
        assert_eq!(e.http_status(), 403);

        let e = ValidationError::MalformedUrl("unable to parse URL".to_string());
        assert_eq!(e.error_code(), "MalformedUrl");
        assert_eq!(e.http_status(), 400);

        let e = ValidationError::UnsupportedEncoding("unsupported charset: x".to_string());
        assert_eq!(e.error_code(), "UnsupportedEncoding");
        assert_eq!(e.http_status(), 400);

        let e = ValidationError::PolicyDecode("policy is not valid base64".to_string());
        assert_eq!(e.error_code(), "PolicyDecodeError");
        assert_eq!(e.http_status(), 400);
    }

    #[test_log::test]
    fn test_key_load_source() {
        let cause = IOError::new(IOErrorKind::NotFound, "no such file");
        let e = ValidationError::KeyLoad("unable to read key file /x.pem".to_string(), Box::new(cause));
        assert_eq!(e.error_code(), "KeyLoadError");
        assert_eq!(e.http_status(), 400);
        assert_eq!(format!("{}", e), "unable to read key file /x.pem: no such file");

        let source = e.source().expect("expected a source");
        let io = source.downcast_ref::<IOError>().expect("expected an IOError source");
        assert_eq!(io.kind(), IOErrorKind::NotFound);
    }
}
