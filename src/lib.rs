//! The `scratchstack_cloudfront_signature` crate provides _verification_ routines for
//! CloudFront-style signed URLs and signed cookies. This *is not* the library you want if you
//! just want to generate signed URLs for a real CDN distribution; the AWS SDKs already provide
//! signers for that.
//!
//! On the other hand, if you run your own ecosystem of CloudFront-like signed requests and need
//! the server side of the scheme (mock CDN edges, origin servers enforcing signed access, test
//! harnesses), this library _might_ be for you.
//!
//! # Workflow
//! This assumes the HTTP layer has already extracted the signing parameters from the query
//! string or cookie set. The typical workflow is:
//! 1. Build a [`KeyResolver`] over the configured `key pair id → PEM file` mapping and
//!    (optionally) [`preload`][KeyResolver::preload] it at startup.
//! 2. Wrap it in a [`RequestValidator`].
//! 3. For each request, either hand a raw URL to
//!    [`validate_signed_url`][RequestValidator::validate_signed_url], or build a
//!    [`SignedRequest`] yourself and call
//!    [`validate_signature`][RequestValidator::validate_signature].
//! 4. Map the error to a response: [`Expired`][ValidationError::Expired] and
//!    [`AccessDenied`][ValidationError::AccessDenied] are a forbidden response; everything else
//!    is a client error. The [`scratchstack_errors::ServiceError`] impl on
//!    [`ValidationError`] encodes this mapping as HTTP status codes.
//!
//! ## Example
//! ```rust
//! use scratchstack_cloudfront_signature::{KeyResolver, RequestValidator, ValidationError};
//! use std::collections::HashMap;
//! use std::path::PathBuf;
//!
//! let mut locations = HashMap::new();
//! locations.insert("my-keypair".to_string(), PathBuf::from("/etc/keys/my-keypair.pem"));
//! let resolver = KeyResolver::new(locations);
//! resolver.preload();
//!
//! let validator = RequestValidator::new(resolver);
//! let result = validator.validate_signed_url(
//!     &PathBuf::from("/etc/keys/my-keypair.pem"),
//!     "http://localhost/video.mp4?Expires=1000000000&Signature=abc&Key-Pair-Id=my-keypair",
//! );
//!
//! // The signature is long expired.
//! assert!(matches!(result, Err(ValidationError::Expired(_))));
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod codec;
mod constants;
pub mod crypto;
mod error;
pub mod evaluator;
mod keys;
mod policy;
mod request;
mod validator;

pub use {
    constants::{
        COOKIE_EXPIRES, COOKIE_KEY_PAIR_ID, COOKIE_POLICY, COOKIE_SIGNATURE, PARAM_EXPIRES, PARAM_KEY_PAIR_ID,
        PARAM_POLICY, PARAM_SIGNATURE,
    },
    error::ValidationError,
    keys::KeyResolver,
    policy::{Policy, PolicyStatement},
    request::{RequestType, SignedRequest, SignedRequestBuilder},
    validator::{split_query, split_query_charset, RequestValidator},
};

#[cfg(test)]
mod unittest;
