//! Inherent data supplied by the block author.
//!
//! Each entry is keyed by an 8-byte identifier and holds the canonical
//! encoding of one value. The runtime turns entries into unsigned
//! extrinsics when building a block and checks them when importing one.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use crate::codec::{decode_all, Decode, Encode, Reader};
use crate::error::{CodecError, InherentError};

/// Identifier of one kind of inherent.
pub type InherentIdentifier = [u8; 8];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InherentData {
    data: BTreeMap<InherentIdentifier, Vec<u8>>,
}

impl InherentData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert data for an identifier that has none yet.
    pub fn put_data<T: Encode>(
        &mut self,
        identifier: InherentIdentifier,
        inherent: &T,
    ) -> Result<(), InherentError> {
        if self.data.contains_key(&identifier) {
            return Err(InherentError::AlreadyExists(identifier));
        }
        self.data.insert(identifier, inherent.encode());
        Ok(())
    }

    /// Insert or overwrite data for an identifier.
    pub fn replace_data<T: Encode>(&mut self, identifier: InherentIdentifier, inherent: &T) {
        self.data.insert(identifier, inherent.encode());
    }

    /// Decode the data stored under `identifier`, if any.
    pub fn get_data<T: Decode>(
        &self,
        identifier: &InherentIdentifier,
    ) -> Result<Option<T>, InherentError> {
        self.data
            .get(identifier)
            .map(|bytes| decode_all(bytes).map_err(|e| InherentError::Decode(*identifier, e)))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Encode for InherentData {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        let entries: Vec<(&InherentIdentifier, &Vec<u8>)> = self.data.iter().collect();
        entries.encode_to(dest);
    }
}

impl Decode for InherentData {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = input.read_len()?;
        let mut data = BTreeMap::new();
        let mut last: Option<InherentIdentifier> = None;
        for _ in 0..count {
            let (identifier, value): (InherentIdentifier, Vec<u8>) = Decode::decode(input)?;
            if last.is_some_and(|prev| identifier <= prev) {
                return Err(CodecError::NonCanonicalMap);
            }
            last = Some(identifier);
            data.insert(identifier, value);
        }
        Ok(Self { data })
    }
}

/// Outcome of checking a block's inherents against local inherent data.
///
/// Errors are stored under the identifier of the inherent that failed,
/// encoded the way that inherent's module encodes its errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInherentsResult {
    okay: bool,
    fatal_error: bool,
    errors: InherentData,
}

impl Default for CheckInherentsResult {
    fn default() -> Self {
        Self { okay: true, fatal_error: false, errors: InherentData::new() }
    }
}

impl CheckInherentsResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. A fatal error means the block can never become
    /// valid; a non-fatal one may clear up later (e.g. a timestamp
    /// slightly ahead of the local clock).
    pub fn put_error<E: Encode>(
        &mut self,
        identifier: InherentIdentifier,
        error: &E,
        fatal: bool,
    ) -> Result<(), InherentError> {
        self.errors.put_data(identifier, error)?;
        self.okay = false;
        self.fatal_error |= fatal;
        Ok(())
    }

    pub fn ok(&self) -> bool {
        self.okay
    }

    pub fn fatal_error(&self) -> bool {
        self.fatal_error
    }

    pub fn get_error<E: Decode>(&self, identifier: &InherentIdentifier) -> Result<Option<E>, InherentError> {
        self.errors.get_data(identifier)
    }
}

impl Encode for CheckInherentsResult {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.okay.encode_to(dest);
        self.fatal_error.encode_to(dest);
        self.errors.encode_to(dest);
    }
}

impl Decode for CheckInherentsResult {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            okay: Decode::decode(input)?,
            fatal_error: Decode::decode(input)?,
            errors: Decode::decode(input)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const TEST_ID: InherentIdentifier = *b"testinh0";

    #[test]
    fn test_put_and_get() {
        let mut data = InherentData::new();
        data.put_data(TEST_ID, &42u64).unwrap();
        assert_eq!(data.get_data::<u64>(&TEST_ID).unwrap(), Some(42));
        assert_eq!(data.get_data::<u64>(b"missing0").unwrap(), None);
    }

    #[test]
    fn test_put_twice_fails_replace_succeeds() {
        let mut data = InherentData::new();
        data.put_data(TEST_ID, &1u64).unwrap();
        assert_eq!(
            data.put_data(TEST_ID, &2u64),
            Err(InherentError::AlreadyExists(TEST_ID))
        );
        data.replace_data(TEST_ID, &3u64);
        assert_eq!(data.get_data::<u64>(&TEST_ID).unwrap(), Some(3));
    }

    #[test]
    fn test_wrong_type_is_decode_error() {
        let mut data = InherentData::new();
        data.put_data(TEST_ID, &7u32).unwrap();
        assert!(matches!(
            data.get_data::<u64>(&TEST_ID),
            Err(InherentError::Decode(id, CodecError::UnexpectedEof)) if id == TEST_ID
        ));
    }

    #[test]
    fn test_encoding_roundtrip() {
        let mut data = InherentData::new();
        data.put_data(*b"bbbbbbbb", &1u8).unwrap();
        data.put_data(*b"aaaaaaaa", &2u8).unwrap();
        let decoded: InherentData = decode_all(&data.encode()).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn test_unordered_or_duplicate_identifiers_rejected() {
        let entry = |id: &[u8; 8]| (*id, vec![1u8]);
        let swapped = vec![entry(b"bbbbbbbb"), entry(b"aaaaaaaa")].encode();
        assert_eq!(decode_all::<InherentData>(&swapped), Err(CodecError::NonCanonicalMap));

        let repeated = vec![entry(b"aaaaaaaa"), entry(b"aaaaaaaa")].encode();
        assert_eq!(decode_all::<InherentData>(&repeated), Err(CodecError::NonCanonicalMap));

        let sorted = vec![entry(b"aaaaaaaa"), entry(b"bbbbbbbb")].encode();
        let decoded: InherentData = decode_all(&sorted).unwrap();
        assert_eq!(decoded.encode(), sorted);
    }

    #[test]
    fn test_check_result_tracks_fatality() {
        let mut result = CheckInherentsResult::new();
        assert!(result.ok());

        result.put_error(TEST_ID, &5u64, false).unwrap();
        assert!(!result.ok());
        assert!(!result.fatal_error());
        assert_eq!(result.get_error::<u64>(&TEST_ID).unwrap(), Some(5));

        result.put_error(*b"other000", &1u8, true).unwrap();
        assert!(result.fatal_error());

        let decoded: CheckInherentsResult = decode_all(&result.encode()).unwrap();
        assert_eq!(decoded, result);
    }
}
