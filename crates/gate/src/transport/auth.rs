// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer token extraction and verification.
//!
//! Both the pre-upgrade header check and the in-band `auth` message go
//! through [`verify_token`], so there is exactly one definition of a valid
//! credential.

/// Constant-time string comparison to prevent timing side-channel attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the header is absent or empty, does not split into
/// exactly two whitespace-separated parts, or uses a scheme other than
/// `bearer` (compared case-insensitively).
pub fn extract_bearer(header: Option<&str>) -> Option<String> {
    let header = header.filter(|h| !h.is_empty())?;

    let mut parts = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.to_owned())
}

/// Check a candidate token against the configured secret.
///
/// An absent or empty candidate never verifies, and neither does anything
/// when no secret is configured.
pub fn verify_token(candidate: Option<&str>, secret: Option<&str>) -> bool {
    match (candidate, secret) {
        (Some(token), Some(expected)) if !token.is_empty() => constant_time_eq(token, expected),
        _ => false,
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
