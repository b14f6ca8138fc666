use std::fmt;

/// Credentials for one caller, handed to every API call explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    bearer_token: String,
}

impl RequestContext {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self { bearer_token: bearer_token.into() }
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext").field("bearer_token", &"<redacted>").finish()
    }
}
