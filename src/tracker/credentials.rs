//! Bearer credential providers.
//!
//! How a token is obtained is the caller's business; the record store only
//! asks a `CredentialProvider` for one before each operation.

use std::fmt;

use tracing::warn;

/// A non-empty bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank tokens.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
pub const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Format check only; it does not prove the token is active or scoped.
pub fn looks_like_github_token(token: &str) -> bool {
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new("GITHUB_TOKEN")
    }
}

impl CredentialProvider for EnvCredential {
    fn credential(&self) -> Option<Credential> {
        let credential = std::env::var(&self.var).ok().and_then(Credential::new)?;
        if !looks_like_github_token(credential.expose()) {
            warn!(var = %self.var, "token does not have a known GitHub prefix");
        }
        Some(credential)
    }
}

/// Tries each provider in order; the first credential wins.
#[derive(Default)]
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainedCredentials {
    fn credential(&self) -> Option<Credential> {
        self.providers.iter().find_map(|p| p.credential())
    }
}
