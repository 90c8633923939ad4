/// A value that passed a [`Sanitizer`](crate::Sanitizer).
///
/// There is no public constructor and no `From<T>`, so holding a
/// `Verified<T>` proves the value went through validation. Access is plain:
/// [`AsRef`] to borrow, [`into_inner`](Self::into_inner) to take it.
///
/// ```compile_fail
/// use credential_broker::Verified;
///
/// let verified = Verified::new("tenant-1".to_string()); // no public constructor
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Wraps a value without checking it. Only sanitizers call this.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the wrapper.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}
