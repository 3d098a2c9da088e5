use rand::{TryRngCore, rngs::OsRng};

/// A trait for suppliers of cryptographically secure random bytes.
///
/// Implementations must fill `dst` completely. There is no error channel: a
/// source that cannot produce verified entropy must not return at all, since
/// callers would otherwise continue with degraded randomness.
///
/// Plugging in a custom source is mostly useful for tests that need to count
/// or script refills.
///
/// # Example
/// ```
/// use fastguid::EntropySource;
///
/// struct Zeros;
/// impl EntropySource for Zeros {
///     fn fill_entropy(&self, dst: &mut [u8]) {
///         dst.fill(0);
///     }
/// }
///
/// let mut buf = [0xFF; 8];
/// Zeros.fill_entropy(&mut buf);
/// assert_eq!(buf, [0; 8]);
/// ```
pub trait EntropySource {
    /// Fills `dst` entirely with secure random bytes.
    fn fill_entropy(&self, dst: &mut [u8]);
}

/// The operating system's secure random number generator.
///
/// The first call may block briefly while the OS seeds its pool. If the OS
/// reports an error, this panics: the process cannot safely continue without
/// verified entropy.
#[derive(Default, Clone, Copy, Debug)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    #[inline]
    fn fill_entropy(&self, dst: &mut [u8]) {
        if let Err(err) = OsRng.try_fill_bytes(dst) {
            entropy_failure(&err);
        }
    }
}

#[cold]
#[inline(never)]
fn entropy_failure(err: &impl core::fmt::Display) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(error = %err, "operating system entropy source failed");
    panic!("fastguid: operating system entropy source failed: {err}");
}
