//! Error types shared by the Strata runtime crates.
//!
//! Only recoverable failures live here. Consensus violations found while
//! importing a block are not errors at all: the executive aborts with a
//! panic so the caller discards the whole overlay.

/// Failure to decode a value from its canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before the value was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A discriminant byte did not name any variant.
    #[error("invalid {what} tag {tag}")]
    InvalidTag { what: &'static str, tag: u8 },

    /// A boolean was encoded as something other than 0 or 1.
    #[error("invalid bool value {0}")]
    InvalidBool(u8),

    /// A compact integer used more bytes than its value needs.
    #[error("non-canonical compact encoding")]
    NonCanonicalCompact,

    /// A compact integer does not fit the target width.
    #[error("compact value out of range")]
    CompactOverflow,

    /// A length-prefixed wrapper disagreed with its contents.
    #[error("length prefix {expected} does not match {actual} consumed bytes")]
    LengthMismatch { expected: usize, actual: usize },

    /// Bytes remained after a complete value was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Map entries were not in strictly ascending key order.
    #[error("map keys out of order or duplicated")]
    NonCanonicalMap,

    /// A string field was not valid UTF-8.
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
}

/// Why an extrinsic could not be turned into a checked extrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// Signature did not verify against the resolved signer.
    #[error("bad signature in extrinsic")]
    BadSignature,

    /// The signer address is an account index nobody owns (yet).
    #[error("invalid account index")]
    UnknownAccountIndex,
}

/// A call declined to run. The message is static so it stays cheap to
/// produce inside the runtime and stable across nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DispatchError(pub &'static str);

/// Problems with inherent data supplied by the block author.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InherentError {
    /// Data for this identifier was already present.
    #[error("inherent with identifier {0:?} already exists")]
    AlreadyExists([u8; 8]),

    /// Stored inherent data failed to decode.
    #[error("inherent data for {0:?} failed to decode: {1}")]
    Decode([u8; 8], CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::InvalidTag { what: "DigestItem", tag: 9 };
        let s = format!("{}", err);
        assert!(s.contains("DigestItem"));
        assert!(s.contains('9'));
    }

    #[test]
    fn test_check_error_display() {
        assert_eq!(format!("{}", CheckError::UnknownAccountIndex), "invalid account index");
        assert_eq!(format!("{}", CheckError::BadSignature), "bad signature in extrinsic");
    }

    #[test]
    fn test_dispatch_error_display_is_message() {
        let err = DispatchError("balance too low to send value");
        assert_eq!(format!("{}", err), "balance too low to send value");
    }
}
