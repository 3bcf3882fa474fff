//! Block, header and digest types.

use alloc::vec::Vec;
use crate::codec::{Compact, Decode, Encode, Reader};
use crate::crypto::blake2_256;
use crate::error::CodecError;
use crate::types::{AuthorityId, BlockNumber, Hash, Signature};

/// One annotation in a header digest. The discriminant is the wire tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestItem {
    /// Opaque chain-specific data.
    Other(Vec<u8>),
    /// The authority set changed to this list.
    AuthoritiesChange(Vec<AuthorityId>),
    /// Root of the trie committing to storage keys changed in this block.
    ChangesTrieRoot(Hash),
    /// Block author's seal: slot/block number and signature.
    Seal(u64, Signature),
}

impl DigestItem {
    const OTHER: u8 = 0;
    const AUTHORITIES_CHANGE: u8 = 1;
    const CHANGES_TRIE_ROOT: u8 = 2;
    const SEAL: u8 = 3;

    /// Returns the changes-trie root if this item carries one.
    pub fn as_changes_trie_root(&self) -> Option<&Hash> {
        match self {
            Self::ChangesTrieRoot(root) => Some(root),
            _ => None,
        }
    }
}

impl Encode for DigestItem {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Other(data) => {
                dest.push(Self::OTHER);
                data.encode_to(dest);
            }
            Self::AuthoritiesChange(authorities) => {
                dest.push(Self::AUTHORITIES_CHANGE);
                authorities.encode_to(dest);
            }
            Self::ChangesTrieRoot(root) => {
                dest.push(Self::CHANGES_TRIE_ROOT);
                root.encode_to(dest);
            }
            Self::Seal(slot, signature) => {
                dest.push(Self::SEAL);
                slot.encode_to(dest);
                signature.encode_to(dest);
            }
        }
    }
}

impl Decode for DigestItem {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            Self::OTHER => Ok(Self::Other(Decode::decode(input)?)),
            Self::AUTHORITIES_CHANGE => Ok(Self::AuthoritiesChange(Decode::decode(input)?)),
            Self::CHANGES_TRIE_ROOT => Ok(Self::ChangesTrieRoot(Decode::decode(input)?)),
            Self::SEAL => Ok(Self::Seal(Decode::decode(input)?, Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "DigestItem", tag }),
        }
    }
}

/// Ordered list of digest items. Compared positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
    pub logs: Vec<DigestItem>,
}

impl Digest {
    pub fn push(&mut self, item: DigestItem) {
        self.logs.push(item);
    }

    pub fn logs(&self) -> &[DigestItem] {
        &self.logs
    }
}

impl Encode for Digest {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.logs.encode_to(dest);
    }
}

impl Decode for Digest {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { logs: Decode::decode(input)? })
    }
}

/// Block header. Field order is the wire order; the number is compact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub parent_hash: Hash,
    pub number: BlockNumber,
    pub state_root: Hash,
    pub extrinsics_root: Hash,
    pub digest: Digest,
}

impl Header {
    /// blake2-256 of the canonical encoding.
    pub fn hash(&self) -> Hash {
        blake2_256(&self.encode())
    }
}

impl Encode for Header {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.parent_hash.encode_to(dest);
        Compact(self.number).encode_to(dest);
        self.state_root.encode_to(dest);
        self.extrinsics_root.encode_to(dest);
        self.digest.encode_to(dest);
    }
}

impl Decode for Header {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            parent_hash: Decode::decode(input)?,
            number: Compact::<u64>::decode(input)?.0,
            state_root: Decode::decode(input)?,
            extrinsics_root: Decode::decode(input)?,
            digest: Decode::decode(input)?,
        })
    }
}

/// A header plus its extrinsics, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<Extrinsic> {
    pub header: Header,
    pub extrinsics: Vec<Extrinsic>,
}

impl<Extrinsic> Block<Extrinsic> {
    pub fn new(header: Header, extrinsics: Vec<Extrinsic>) -> Self {
        Self { header, extrinsics }
    }

    pub fn deconstruct(self) -> (Header, Vec<Extrinsic>) {
        (self.header, self.extrinsics)
    }
}

impl<Extrinsic: Encode> Encode for Block<Extrinsic> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.header.encode_to(dest);
        self.extrinsics.encode_to(dest);
    }
}

impl<Extrinsic: Decode> Decode for Block<Extrinsic> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            header: Decode::decode(input)?,
            extrinsics: Decode::decode(input)?,
        })
    }
}
