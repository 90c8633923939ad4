use std::fmt;

/// Untrusted input that must pass a [`Sanitizer`](crate::Sanitizer) before use.
///
/// Every header and body field the web binding reads starts out as
/// `Tainted`. The value cannot be read back out; the only way forward is a
/// sanitizer producing a [`Verified`](crate::Verified).
///
/// # Security Properties
///
/// - No `Deref`, `AsRef` or conversion into `T`
/// - `Debug` shows the value, so tainted input is visible while debugging
///   but never reaches a sink by accident
///
/// ```compile_fail
/// use credential_broker::Tainted;
///
/// let input = Tainted::new("tenant-1".to_string());
/// let s: &String = input.as_ref(); // no AsRef
/// ```
// BREAKING CHANGE WARNING: Do NOT remove Clone - the adapter re-reads header values.
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // Making it public bypasses sanitization of tenant and user identifiers.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Releases the value to a sanitizer.
    ///
    /// BREAKING CHANGE WARNING: Changing visibility to `pub` lets callers
    /// skip validation of identifiers that end up in policy queries.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tainted").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_marks_value_as_tainted() {
        let input = Tainted::new("x-tenant-id".to_string());
        assert_eq!(format!("{:?}", input), "Tainted(\"x-tenant-id\")");
    }

    mod proptests {
        use super::*;
        use crate::{sanitizer::StringSanitizer, test_utils::arb_valid_string, Sanitizer};
        use proptest::prelude::*;

        proptest! {
            /// Cloned tainted values sanitize to the same result.
            #[test]
            fn proptest_tainted_clone_preserves_value(input in arb_valid_string(256)) {
                let sanitizer = StringSanitizer::new(256);

                let tainted1 = Tainted::new(input.clone());
                let tainted2 = tainted1.clone();

                let verified1 = sanitizer.sanitize(tainted1).expect("valid input should pass");
                let verified2 = sanitizer.sanitize(tainted2).expect("valid input should pass");

                prop_assert_eq!(verified1.as_ref(), verified2.as_ref());
                prop_assert_eq!(verified1.as_ref(), &input);
            }
        }
    }
}
