/// Whether the request reached us over TLS, which decides the cookie's
/// `Secure` attribute.
///
/// Checks, in order:
///   1. `X-Forwarded-Proto: https` (only when proxy headers are trusted)
///   2. `X-Forwarded-Ssl: on`, same condition
///   3. The request URI scheme is literally "https"
///
/// Falls back to `false` so plain HTTP dev servers still get a usable cookie.
pub fn is_https<B>(req: &hyper::Request<B>, trust_proxy_headers: bool) -> bool {
    let header_is = |name: &str, expected: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
    };

    if trust_proxy_headers
        && (header_is("x-forwarded-proto", "https") || header_is("x-forwarded-ssl", "on"))
    {
        return true;
    }

    req.uri().scheme_str() == Some("https")
}
