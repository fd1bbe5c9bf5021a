//! Cookie parsing and `Set-Cookie` construction

use hyper::header::{HeaderMap, COOKIE};

/// Session cookie name
pub const SESSION_COOKIE: &str = "thoughts_session";

/// CSRF state cookie for the OAuth round trip
pub const OAUTH_STATE_COOKIE: &str = "thoughts_oauth_state";

/// How long the OAuth state cookie lives (seconds)
pub const OAUTH_STATE_MAX_AGE: u64 = 600;

/// Find a cookie value across all `Cookie` headers
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for an HttpOnly cookie scoped to the whole site
pub fn set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes a cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_get_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; thoughts_session=abc.def.ghi"),
        );
        headers.append(COOKIE, HeaderValue::from_static("thoughts_oauth_state=xyz"));

        assert_eq!(get_cookie(&headers, SESSION_COOKIE), Some("abc.def.ghi"));
        assert_eq!(get_cookie(&headers, OAUTH_STATE_COOKIE), Some("xyz"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("thoughts_session="));
        assert_eq!(get_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_set_and_clear() {
        let cookie = set_cookie(SESSION_COOKIE, "tok", 60, true);
        assert!(cookie.starts_with("thoughts_session=tok;"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.ends_with("; Secure"));

        assert!(clear_cookie(SESSION_COOKIE).contains("Max-Age=0"));
    }
}
