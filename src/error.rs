use std::io;

/// An error encountered while encoding a module to the binary format.
///
/// Any failure is fatal to that encode call: bytes already written to the
/// sink must not be interpreted as a usable prefix of a module.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A count or byte length in the model does not fit in the unsigned
    /// 32-bit range the binary format requires for it.
    ///
    /// Raised eagerly at the encoding boundary where the count is written,
    /// never silently truncated or wrapped.
    #[error("{what} length {len} does not fit in a u32")]
    CountOverflow {
        /// Which vector or payload overflowed.
        what: &'static str,
        /// The out-of-range length.
        len: usize,
    },

    /// The underlying byte sink failed. Propagated unchanged; no retry is
    /// attempted and no partial result is salvaged.
    #[error(transparent)]
    Io(#[from] io::Error),
}
