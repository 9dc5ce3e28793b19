use std::fmt;

/// [GitHub REST authentication methods](https://docs.github.com/en/rest/overview/other-authentication-methods).
///
/// [HTTP authorization on MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Authorization).
///
pub trait Authentication {
    /// Encode authentication into HTTP authorization header.
    fn to_authz_value(&self) -> String;
}

/// Personal access token or any other token GitHub accepts as a bearer token.
#[derive(PartialEq, Eq, Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Authentication for Credential {
    fn to_authz_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}
