//! Credential resolution for one analysis action.
//!
//! The host-managed secret (from `Config`) wins; otherwise the key the user
//! typed into the form is used. The resolved value travels explicitly into
//! the analyzer rather than living in global state.

use std::fmt;

use serde::Serialize;

/// Where a credential came from. Reported back to the client so the UI can
/// show "credential loaded" instead of asking for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    HostSecret,
    UserEntered,
}

/// The secret token authorizing calls to the inference backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    secret: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(secret: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            secret: secret.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.secret
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Picks the host secret if present, else the user-entered key.
/// Blank strings count as absent.
pub fn resolve_credential(
    host_secret: Option<&str>,
    user_entered: Option<&str>,
) -> Option<Credential> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    host_secret
        .filter(non_blank)
        .map(|s| Credential::new(s.trim(), CredentialSource::HostSecret))
        .or_else(|| {
            user_entered
                .filter(non_blank)
                .map(|s| Credential::new(s.trim(), CredentialSource::UserEntered))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_secret_takes_precedence() {
        let cred = resolve_credential(Some("host-key"), Some("user-key")).unwrap();
        assert_eq!(cred.expose(), "host-key");
        assert_eq!(cred.source(), CredentialSource::HostSecret);
    }

    #[test]
    fn test_falls_back_to_user_entered() {
        let cred = resolve_credential(None, Some(" user-key ")).unwrap();
        assert_eq!(cred.expose(), "user-key");
        assert_eq!(cred.source(), CredentialSource::UserEntered);
    }

    #[test]
    fn test_blank_values_are_absent() {
        assert!(resolve_credential(Some("  "), Some("")).is_none());
        assert!(resolve_credential(None, None).is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cred = Credential::new("super-secret", CredentialSource::UserEntered);
        let printed = format!("{cred:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
