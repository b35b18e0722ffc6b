use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub(crate) const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub(crate) const OAUTH_STATE_COOKIE: &str = "oauthstate";
pub(crate) const OAUTH_STATE_TTL_SECONDS: i64 = 10 * 60;

/// Attributes shared by every credential cookie: HttpOnly, `Path=/`, `SameSite=Lax`,
/// and `Secure` when configured.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CookiePolicy {
    pub(crate) secure: bool,
}

impl CookiePolicy {
    pub(crate) fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub(crate) fn build(&self, name: &str, value: &str, max_age_seconds: i64) -> Option<HeaderValue> {
        let mut cookie =
            format!("{name}={value}; Path=/; Max-Age={max_age_seconds}; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }

    pub(crate) fn expire(&self, name: &str) -> Option<HeaderValue> {
        self.build(name, "", 0)
    }
}

pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    use super::{CookiePolicy, read_cookie};

    #[test]
    fn built_cookie_carries_security_attributes() {
        let value = CookiePolicy::new(true)
            .build("access_token", "abc", 60)
            .expect("cookie must build");
        let value = value.to_str().expect("cookie must be ascii");

        assert!(value.starts_with("access_token=abc; "));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=60"));
        assert!(value.ends_with("; Secure"));

        let insecure = CookiePolicy::new(false)
            .expire("access_token")
            .expect("cookie must build");
        let insecure = insecure.to_str().expect("cookie must be ascii");
        assert!(insecure.contains("Max-Age=0"));
        assert!(!insecure.contains("Secure"));
    }

    #[test]
    fn read_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; oauthstate=xyz_-1"));
        headers.append(COOKIE, HeaderValue::from_static("access_token=tok"));

        assert_eq!(read_cookie(&headers, "oauthstate").as_deref(), Some("xyz_-1"));
        assert_eq!(read_cookie(&headers, "access_token").as_deref(), Some("tok"));
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));

        assert_eq!(read_cookie(&headers, "access_token"), None);
    }
}
