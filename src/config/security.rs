use std::env;
use std::sync::LazyLock;

use axum::extract::Request;
use axum::http::header::{HeaderName, HeaderValue, STRICT_TRANSPORT_SECURITY};
use axum::middleware::Next;
use axum::response::Response;

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Headers attached to every response. This is a JSON API, so the CSP
/// forbids everything.
const STATIC_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=()",
    ),
];

static INCLUDE_HSTS: LazyLock<bool> = LazyLock::new(|| {
    let production = hsts_enabled(env::var("RUST_ENV").ok().as_deref());
    if production {
        tracing::info!("Security: HSTS header enabled (production mode)");
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
    }
    production
});

/// HSTS only makes sense behind HTTPS, so it is gated on production mode.
fn hsts_enabled(rust_env: Option<&str>) -> bool {
    rust_env.is_some_and(|v| v.eq_ignore_ascii_case("production"))
}

/// Middleware adding the standard security headers; wire up with
/// `axum::middleware::from_fn(security_headers)`.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in STATIC_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    if *INCLUDE_HSTS {
        headers.insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS_VALUE));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_headers_are_valid() {
        for (name, value) in STATIC_HEADERS {
            assert!(name.bytes().all(|b| b.is_ascii_lowercase() || b == b'-'));
            let _ = HeaderValue::from_static(value);
        }
    }

    #[test]
    fn test_hsts_requires_production() {
        assert!(!hsts_enabled(None));
        assert!(!hsts_enabled(Some("development")));
        assert!(hsts_enabled(Some("production")));
        assert!(hsts_enabled(Some("PRODUCTION")));
    }
}
