//! Bearer credential extraction.
//!
//! Web clients send the access token as `Authorization: Bearer <token>`;
//! the dashboard falls back to an `accessToken` cookie. These helpers take
//! the raw header/cookie values so they work with any HTTP stack.

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Returns the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token is ignored.
#[must_use]
pub fn bearer_from_header(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Returns the `accessToken` value from a `Cookie` header value.
#[must_use]
pub fn bearer_from_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Returns the presented access token, preferring the `Authorization`
/// header over the cookie.
#[must_use]
pub fn extract_bearer<'a>(
    authorization: Option<&'a str>,
    cookie_header: Option<&'a str>,
) -> Option<&'a str> {
    authorization
        .and_then(bearer_from_header)
        .or_else(|| cookie_header.and_then(bearer_from_cookie))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_from_header() {
        assert_eq!(bearer_from_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_from_header("bearer   abc"), Some("abc"));
        assert_eq!(bearer_from_header("Bearer "), None);
        assert_eq!(bearer_from_header("Bearer"), None);
        assert_eq!(bearer_from_header("Basic dXNlcjpwYXNz"), None);
    }

    #[test]
    fn test_bearer_from_cookie() {
        assert_eq!(
            bearer_from_cookie("theme=dark; accessToken=abc.def.ghi; lang=en"),
            Some("abc.def.ghi")
        );
        assert_eq!(bearer_from_cookie("accessToken="), None);
        assert_eq!(bearer_from_cookie("refreshToken=xyz"), None);
    }

    #[test]
    fn test_header_takes_precedence() {
        assert_eq!(
            extract_bearer(Some("Bearer from-header"), Some("accessToken=from-cookie")),
            Some("from-header")
        );
        assert_eq!(
            extract_bearer(Some("Basic xyz"), Some("accessToken=from-cookie")),
            Some("from-cookie")
        );
        assert_eq!(extract_bearer(None, None), None);
    }
}
