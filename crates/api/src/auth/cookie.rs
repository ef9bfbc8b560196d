//! Reading and issuing the auth cookie, and reading bearer credentials.

use std::fmt;
use std::str::FromStr;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

/// Default name of the cookie carrying the access token.
pub const DEFAULT_COOKIE_NAME: &str = "auth_token";

/// The `SameSite` attribute of the auth cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite value '{other}'")),
        }
    }
}

/// Attributes of the auth cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    /// `Set-Cookie` value carrying `token` for `max_age_secs`.
    pub fn issue(&self, token: &str, max_age_secs: i64) -> String {
        self.render(token, max_age_secs.max(0))
    }

    /// `Set-Cookie` value that makes the client drop the cookie.
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
            self.name, value, max_age_secs, self.same_site
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Value of the cookie called `name`, if the request carries a non-empty one.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let map = headers(&[(COOKIE, "theme=dark; auth_token=abc.def.ghi; lang=en")]);
        assert_eq!(read_cookie(&map, "auth_token"), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&map, "missing"), None);
    }

    #[test]
    fn cookie_across_multiple_headers() {
        let map = headers(&[(COOKIE, "theme=dark"), (COOKIE, "auth_token=tok")]);
        assert_eq!(read_cookie(&map, "auth_token"), Some("tok"));
    }

    #[test]
    fn empty_cookie_is_absent() {
        let map = headers(&[(COOKIE, "auth_token=")]);
        assert_eq!(read_cookie(&map, "auth_token"), None);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let map = headers(&[(AUTHORIZATION, "bearer tok123")]);
        assert_eq!(bearer_token(&map), Some("tok123"));

        let basic = headers(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(bearer_token(&basic), None);

        let empty = headers(&[(AUTHORIZATION, "Bearer ")]);
        assert_eq!(bearer_token(&empty), None);
    }

    #[test]
    fn issued_cookie_attributes() {
        let config = CookieConfig {
            secure: true,
            same_site: SameSite::Strict,
            ..CookieConfig::default()
        };
        assert_eq!(
            config.issue("tok", 86_400),
            "auth_token=tok; Path=/; Max-Age=86400; HttpOnly; SameSite=Strict; Secure"
        );
        assert_eq!(
            CookieConfig::default().clear(),
            "auth_token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("STRICT".parse::<SameSite>(), Ok(SameSite::Strict));
        assert_eq!("none".parse::<SameSite>(), Ok(SameSite::None));
        assert!("sometimes".parse::<SameSite>().is_err());
    }
}
