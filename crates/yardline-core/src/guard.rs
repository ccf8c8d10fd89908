//! Reset confirmation passphrase.
//!
//! Resetting the departure queue is destructive, so the caller must
//! supply a shared passphrase. How the passphrase is stored is left to
//! the implementor of [`PassphraseCheck`].

/// Verifies the passphrase supplied with a queue reset.
pub trait PassphraseCheck: Send + Sync {
    /// Whether `candidate` is the configured passphrase.
    fn verify(&self, candidate: &str) -> bool;
}

/// A fixed passphrase loaded from configuration.
#[derive(Clone)]
pub struct StaticPassphrase {
    secret: String,
}

impl StaticPassphrase {
    /// Wrap a configured passphrase.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl PassphraseCheck for StaticPassphrase {
    fn verify(&self, candidate: &str) -> bool {
        // An empty configured secret never matches.
        !self.secret.is_empty() && self.secret == candidate
    }
}

impl core::fmt::Debug for StaticPassphrase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticPassphrase")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_exact_secret() {
        let guard = StaticPassphrase::new("dock-03");
        assert!(guard.verify("dock-03"));
        assert!(!guard.verify("dock-03 "));
        assert!(!guard.verify(""));
    }

    #[test]
    fn empty_secret_rejects_everything() {
        let guard = StaticPassphrase::new("");
        assert!(!guard.verify(""));
    }

    #[test]
    fn debug_output_hides_secret() {
        let guard = StaticPassphrase::new("dock-03");
        assert!(!format!("{guard:?}").contains("dock-03"));
    }
}
