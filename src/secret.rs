use std::fmt;

/// A wrapper that keeps credential material out of every formatted output.
///
/// `Secret<T>` holds provider keys, service-role tokens and similar values.
/// It cannot be printed, cloned or serialized; the wrapped value is reachable
/// only through [`expose_secret`](Self::expose_secret), which is meant to be
/// called at the last moment by a provider adapter building its outbound
/// request.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, `Copy` or `Serialize`
/// - Debug and Display output is always `[REDACTED]`
/// - No type information is leaked in formatted output
///
/// # Examples
///
/// ```
/// use credential_broker::Secret;
///
/// let key = Secret::new("SERVICE_ROLE_FAKE".to_string());
///
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(format!("{}", key), "[REDACTED]");
/// assert_eq!(key.expose_secret(), "SERVICE_ROLE_FAKE");
/// ```
// BREAKING CHANGE WARNING: Do NOT add Clone, Copy, Default or Serialize derives.
// A credential must have exactly one owner on its way to the provider executor.
pub struct Secret<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps credential material.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// # Security Warning
    ///
    /// The returned reference must not be logged, formatted into errors, or
    /// copied into any value that outlives the provider call.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl Secret<String> {
    /// Returns `true` if the wrapped string is empty or whitespace only.
    ///
    /// Used to treat blank configuration as absent rather than as a credential.
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

// BREAKING CHANGE WARNING: Do NOT implement Deref, AsRef, Borrow, or any trait that
// hands out the value implicitly. expose_secret() is the only way in.

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let key = Secret::new("SERVICE_ROLE_FAKE".to_string());
        let debug_output = format!("{:?}", key);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("SERVICE_ROLE"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn secret_redacts_display() {
        let token = Secret::new("sk_live_123");
        assert_eq!(format!("{}", token), "[REDACTED]");
    }

    #[test]
    fn secret_redacts_inside_derived_debug() {
        #[derive(Debug)]
        struct Holder {
            #[allow(dead_code)]
            key: Secret<String>,
        }

        let holder = Holder {
            key: Secret::new("hunter2".to_string()),
        };
        let output = format!("{:?}", holder);

        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("hunter2"));
    }

    #[test]
    fn secret_exposes_when_explicit() {
        let secret = Secret::new(42);
        assert_eq!(*secret.expose_secret(), 42);
    }

    #[test]
    fn blank_detection() {
        assert!(Secret::new(String::new()).is_blank());
        assert!(Secret::new("   ".to_string()).is_blank());
        assert!(!Secret::new("k".to_string()).is_blank());
    }
}
