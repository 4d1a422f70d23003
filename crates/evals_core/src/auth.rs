//! API key credentials and the authorization scope they resolve to.
//!
//! The server boundary parses the `Authorization` header into
//! [`Credentials`]; an [`crate::ports::ApiKeyVerifier`] turns those into an
//! [`AuthScope`]. Core logic never reads raw headers.

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const ORGANIZATION_KEY_MESSAGE: &str = "Invalid API key. Are you using an organization key?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Project,
    Organization,
}

impl AccessLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Some(Self::Project),
            "organization" => Some(Self::Organization),
            _ => None,
        }
    }
}

/// Resolved per request from a verified key. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthScope {
    pub access_level: AccessLevel,
    pub organization_id: String,
    pub project_id: Option<String>,
}

impl AuthScope {
    pub fn project(organization_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            access_level: AccessLevel::Project,
            organization_id: organization_id.into(),
            project_id: Some(project_id.into()),
        }
    }

    pub fn organization(organization_id: impl Into<String>) -> Self {
        Self {
            access_level: AccessLevel::Organization,
            organization_id: organization_id.into(),
            project_id: None,
        }
    }

    /// The project this scope may read, if it is a project-level scope with a
    /// non-empty project id.
    pub fn authorized_project_id(&self) -> Option<&str> {
        match (self.access_level, self.project_id.as_deref()) {
            (AccessLevel::Project, Some(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    /// The authorized project, or `Forbidden` for organization-level keys.
    pub fn require_project(&self) -> Result<&str, crate::EvalsError> {
        self.authorized_project_id()
            .ok_or_else(|| crate::EvalsError::Forbidden(ORGANIZATION_KEY_MESSAGE.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No authorization header")]
    MissingHeader,

    #[error("Invalid authorization header")]
    MalformedHeader,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The key store could not be consulted. Detail is for logs only.
    #[error("Error verifying API key")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <secret key>`
    Bearer { secret_key: String },
    /// `Authorization: Basic base64(<public key>:<secret key>)`
    Basic {
        public_key: String,
        secret_key: String,
    },
}

impl Credentials {
    pub fn secret_key(&self) -> &str {
        match self {
            Self::Bearer { secret_key } | Self::Basic { secret_key, .. } => secret_key,
        }
    }
}

/// Parse an `Authorization` header value. The scheme is case-insensitive.
pub fn parse_authorization_header(header: Option<&str>) -> Result<Credentials, AuthError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let Some(header) = header else {
        return Err(AuthError::MissingHeader);
    };

    let (scheme, value) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    match scheme.to_ascii_lowercase().as_str() {
        "bearer" => Ok(Credentials::Bearer {
            secret_key: value.to_string(),
        }),
        "basic" => {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(value)
                .map_err(|_| AuthError::MalformedHeader)?;
            let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;
            let (public_key, secret_key) = decoded
                .split_once(':')
                .ok_or(AuthError::MalformedHeader)?;
            if public_key.is_empty() || secret_key.is_empty() {
                return Err(AuthError::MalformedHeader);
            }
            Ok(Credentials::Basic {
                public_key: public_key.to_string(),
                secret_key: secret_key.to_string(),
            })
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Hex SHA-256 of a secret key, as stored alongside each API key.
pub fn hash_secret_key(secret_key: &str) -> String {
    hex::encode(Sha256::digest(secret_key.as_bytes()))
}

/// Compare a presented secret against a stored hash in constant time.
pub fn secret_key_matches(secret_key: &str, hashed_secret_key: &str) -> bool {
    hash_secret_key(secret_key)
        .as_bytes()
        .ct_eq(hashed_secret_key.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(pk: &str, sk: &str) -> String {
        let token = base64::engine::general_purpose::STANDARD.encode(format!("{pk}:{sk}"));
        format!("Basic {token}")
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            parse_authorization_header(None).unwrap_err(),
            AuthError::MissingHeader
        );
        assert_eq!(
            parse_authorization_header(Some("   ")).unwrap_err(),
            AuthError::MissingHeader
        );
    }

    #[test]
    fn bearer_header() {
        let creds = parse_authorization_header(Some("Bearer sk-lf-123")).unwrap();
        assert_eq!(
            creds,
            Credentials::Bearer {
                secret_key: "sk-lf-123".into()
            }
        );
        assert_eq!(creds.secret_key(), "sk-lf-123");
    }

    #[test]
    fn basic_header() {
        let header = basic("pk-lf-1", "sk-lf-1");
        let creds = parse_authorization_header(Some(&header)).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                public_key: "pk-lf-1".into(),
                secret_key: "sk-lf-1".into()
            }
        );
    }

    #[test]
    fn malformed_headers() {
        for h in ["Bearer", "Token abc", "Basic !!!notbase64", "Bearer    "] {
            assert_eq!(
                parse_authorization_header(Some(h)).unwrap_err(),
                AuthError::MalformedHeader,
                "header {h:?}"
            );
        }
        let no_colon = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("nocolon")
        );
        assert_eq!(
            parse_authorization_header(Some(&no_colon)).unwrap_err(),
            AuthError::MalformedHeader
        );
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = hash_secret_key("sk-lf-1");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_secret_key("sk-lf-1"));
        assert_ne!(h, hash_secret_key("sk-lf-2"));
    }

    #[test]
    fn secret_matches_only_its_own_hash() {
        let stored = hash_secret_key("sk-lf-1");
        assert!(secret_key_matches("sk-lf-1", &stored));
        assert!(!secret_key_matches("sk-lf-2", &stored));
        assert!(!secret_key_matches("sk-lf-1", &stored[..32]));
        assert!(!secret_key_matches("sk-lf-1", ""));
    }

    #[test]
    fn project_scope_authorizes_its_project_only() {
        let scope = AuthScope::project("org-1", "proj-1");
        assert_eq!(scope.authorized_project_id(), Some("proj-1"));
        assert_eq!(scope.require_project().unwrap(), "proj-1");
    }

    #[test]
    fn organization_scope_is_forbidden() {
        let scope = AuthScope::organization("org-1");
        assert!(scope.authorized_project_id().is_none());
        let err = scope.require_project().unwrap_err();
        assert!(matches!(err, crate::EvalsError::Forbidden(ref m) if m == ORGANIZATION_KEY_MESSAGE));
    }

    #[test]
    fn project_scope_with_empty_id_is_forbidden() {
        let scope = AuthScope {
            access_level: AccessLevel::Project,
            organization_id: "org-1".into(),
            project_id: Some(String::new()),
        };
        assert!(scope.authorized_project_id().is_none());
    }

    #[test]
    fn access_level_parse() {
        assert_eq!(AccessLevel::parse("PROJECT"), Some(AccessLevel::Project));
        assert_eq!(AccessLevel::parse("organization"), Some(AccessLevel::Organization));
        assert_eq!(AccessLevel::parse("scores"), None);
    }
}
