//! Extrinsic envelope and its checked form.
//!
//! ## Wire Format
//!
//! ```text
//! [compact length of everything below]
//! [version: 1 byte]            bit 7 set = signed, low bits = TRANSACTION_VERSION
//! signed only:
//!   [address]                  see `Address`
//!   [signature: 64 bytes]
//!   [nonce: compact]
//! [call]
//! ```
//!
//! The signature covers `compact(nonce) || call`. Payloads longer than
//! 256 bytes are hashed with blake2-256 first and the hash is signed.

use alloc::vec::Vec;
use crate::codec::{Compact, Decode, Encode, Reader};
use crate::crypto::blake2_256;
use crate::error::{CheckError, CodecError};
use crate::types::{AccountId, AccountIndex, Index, Signature};

/// Version byte of the extrinsic format.
pub const TRANSACTION_VERSION: u8 = 1;

const SIGNED_FLAG: u8 = 0b1000_0000;

/// Payloads above this size are signed through their blake2-256 hash.
const MAX_RAW_SIGNED_PAYLOAD: usize = 256;

/// How a signer names its account: the full key or a short index.
///
/// Encoding: `0xff` + 32-byte id; a single byte below `0xf0` is an index;
/// `0xfc` + u16 LE and `0xfd` + u32 LE carry larger indices. Every index
/// must use the shortest form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    Id(AccountId),
    Index(AccountIndex),
}

impl From<AccountId> for Address {
    fn from(id: AccountId) -> Self {
        Self::Id(id)
    }
}

impl Encode for Address {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match *self {
            Self::Id(id) => {
                dest.push(0xff);
                dest.extend_from_slice(&id);
            }
            Self::Index(i) if i < 0xf0 => dest.push(i as u8),
            Self::Index(i) if i < 1 << 16 => {
                dest.push(0xfc);
                dest.extend_from_slice(&(i as u16).to_le_bytes());
            }
            Self::Index(i) => {
                dest.push(0xfd);
                dest.extend_from_slice(&i.to_le_bytes());
            }
        }
    }
}

impl Decode for Address {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            b @ 0x00..=0xef => Ok(Self::Index(AccountIndex::from(b))),
            0xfc => match input.read_u16()? {
                i if i >= 0xf0 => Ok(Self::Index(AccountIndex::from(i))),
                _ => Err(CodecError::NonCanonicalCompact),
            },
            0xfd => match input.read_u32()? {
                i if i >= 1 << 16 => Ok(Self::Index(i)),
                _ => Err(CodecError::NonCanonicalCompact),
            },
            0xff => Ok(Self::Id(input.read_array()?)),
            tag => Err(CodecError::InvalidTag { what: "Address", tag }),
        }
    }
}

/// What `Checkable::check` needs from the chain: account lookup and
/// signature verification.
pub trait CheckContext {
    /// Resolve an address to the account it names.
    fn lookup(&self, address: &Address) -> Result<AccountId, CheckError>;

    fn verify(&self, message: &[u8], signature: &Signature, signer: &AccountId) -> bool;
}

/// Properties of an extrinsic that are known before it is checked.
pub trait Extrinsic {
    /// `None` when the type cannot carry a signature at all, otherwise
    /// whether this value is signed.
    fn is_signed(&self) -> Option<bool>;
}

/// Turn an untrusted extrinsic into a checked one.
pub trait Checkable<Context> {
    type Checked;

    fn check(self, context: &Context) -> Result<Self::Checked, CheckError>;
}

/// The view of a checked extrinsic that the executive applies.
///
/// `index` and `sender` are either both present or both absent.
pub trait Applyable {
    type Call;

    fn index(&self) -> Option<&Index>;

    fn sender(&self) -> Option<&AccountId>;

    fn deconstruct(self) -> (Self::Call, Option<AccountId>);
}

/// Signature part of a signed extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePart {
    pub address: Address,
    pub signature: Signature,
    pub index: Index,
}

/// An extrinsic as it arrives from the network or a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncheckedExtrinsic<Call> {
    pub signature: Option<SignaturePart>,
    pub function: Call,
}

impl<Call: Encode> UncheckedExtrinsic<Call> {
    /// A signed extrinsic from an already computed signature.
    pub fn new_signed(function: Call, address: Address, signature: Signature, index: Index) -> Self {
        Self {
            signature: Some(SignaturePart { address, signature, index }),
            function,
        }
    }

    /// An unsigned extrinsic (inherent).
    pub fn new_unsigned(function: Call) -> Self {
        Self { signature: None, function }
    }
}

/// Bytes a signer must sign for `(index, function)`.
pub fn signing_payload<Call: Encode>(index: Index, function: &Call) -> Vec<u8> {
    let payload = (Compact(index), function).encode();
    if payload.len() > MAX_RAW_SIGNED_PAYLOAD {
        blake2_256(&payload).to_vec()
    } else {
        payload
    }
}

impl<Call> Extrinsic for UncheckedExtrinsic<Call> {
    fn is_signed(&self) -> Option<bool> {
        Some(self.signature.is_some())
    }
}

impl<Call: Encode, Context: CheckContext> Checkable<Context> for UncheckedExtrinsic<Call> {
    type Checked = CheckedExtrinsic<Call>;

    fn check(self, context: &Context) -> Result<Self::Checked, CheckError> {
        let Some(part) = self.signature else {
            return Ok(CheckedExtrinsic { signed: None, function: self.function });
        };
        let signer = context.lookup(&part.address)?;
        let payload = signing_payload(part.index, &self.function);
        if !context.verify(&payload, &part.signature, &signer) {
            return Err(CheckError::BadSignature);
        }
        Ok(CheckedExtrinsic {
            signed: Some((signer, part.index)),
            function: self.function,
        })
    }
}

impl<Call: Encode> Encode for UncheckedExtrinsic<Call> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        let mut inner = Vec::new();
        match &self.signature {
            Some(part) => {
                inner.push(TRANSACTION_VERSION | SIGNED_FLAG);
                part.address.encode_to(&mut inner);
                part.signature.encode_to(&mut inner);
                Compact(part.index).encode_to(&mut inner);
            }
            None => inner.push(TRANSACTION_VERSION),
        }
        self.function.encode_to(&mut inner);
        inner.encode_to(dest);
    }
}

impl<Call: Decode> Decode for UncheckedExtrinsic<Call> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        let expected = input.read_len()?;
        let start = input.position();

        let version = input.read_u8()?;
        if version & !SIGNED_FLAG != TRANSACTION_VERSION {
            return Err(CodecError::InvalidTag { what: "extrinsic version", tag: version });
        }
        let signature = if version & SIGNED_FLAG != 0 {
            Some(SignaturePart {
                address: Decode::decode(input)?,
                signature: Decode::decode(input)?,
                index: Compact::<u64>::decode(input)?.0,
            })
        } else {
            None
        };
        let function = Call::decode(input)?;

        let actual = input.position() - start;
        if actual != expected {
            return Err(CodecError::LengthMismatch { expected, actual });
        }
        Ok(Self { signature, function })
    }
}

/// An extrinsic whose signature has been verified and whose signer has
/// been resolved. `signed` holds `(sender, nonce)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedExtrinsic<Call> {
    pub signed: Option<(AccountId, Index)>,
    pub function: Call,
}

impl<Call> Applyable for CheckedExtrinsic<Call> {
    type Call = Call;

    fn index(&self) -> Option<&Index> {
        self.signed.as_ref().map(|(_, index)| index)
    }

    fn sender(&self) -> Option<&AccountId> {
        self.signed.as_ref().map(|(sender, _)| sender)
    }

    fn deconstruct(self) -> (Call, Option<AccountId>) {
        (self.function, self.signed.map(|(sender, _)| sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_all;
    use crate::crypto::{sign_ed25519, verify_ed25519};
    use alloc::vec;

    /// Context that knows one indexed account and uses real ed25519.
    struct TestContext {
        indexed: (AccountIndex, AccountId),
    }

    impl CheckContext for TestContext {
        fn lookup(&self, address: &Address) -> Result<AccountId, CheckError> {
            match *address {
                Address::Id(id) => Ok(id),
                Address::Index(i) if i == self.indexed.0 => Ok(self.indexed.1),
                Address::Index(_) => Err(CheckError::UnknownAccountIndex),
            }
        }

        fn verify(&self, message: &[u8], signature: &Signature, signer: &AccountId) -> bool {
            verify_ed25519(message, signature, signer)
        }
    }

    fn keypair(seed: u8) -> (AccountId, ed25519_dalek::SigningKey) {
        let sk = ed25519_dalek::SigningKey::from_bytes(&[seed; 32]);
        (*sk.verifying_key().as_bytes(), sk)
    }

    fn signed(call: Vec<u8>, address: Address, index: Index, sk: &ed25519_dalek::SigningKey) -> UncheckedExtrinsic<Vec<u8>> {
        let sig = sign_ed25519(&signing_payload(index, &call), sk);
        UncheckedExtrinsic::new_signed(call, address, sig, index)
    }

    #[test]
    fn test_address_encoding_forms() {
        assert_eq!(Address::Index(5).encode(), vec![5]);
        assert_eq!(Address::Index(0xf0).encode(), vec![0xfc, 0xf0, 0x00]);
        assert_eq!(Address::Index(1 << 16).encode(), vec![0xfd, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(Address::Id([3u8; 32]).encode()[0], 0xff);
        for addr in [Address::Index(0xef), Address::Index(0x1234), Address::Index(u32::MAX), Address::Id([8u8; 32])] {
            assert_eq!(decode_all::<Address>(&addr.encode()).unwrap(), addr);
        }
    }

    #[test]
    fn test_address_rejects_long_form_small_index() {
        assert!(decode_all::<Address>(&[0xfc, 0x05, 0x00]).is_err());
        assert!(decode_all::<Address>(&[0xfd, 0x05, 0x00, 0x00, 0x00]).is_err());
        assert!(decode_all::<Address>(&[0xfe]).is_err());
    }

    #[test]
    fn test_unsigned_checks_without_signer() {
        let ctx = TestContext { indexed: (0, [0u8; 32]) };
        let xt = UncheckedExtrinsic::new_unsigned(vec![1u8, 2]);
        assert_eq!(xt.is_signed(), Some(false));

        let checked = xt.check(&ctx).unwrap();
        assert_eq!(checked.sender(), None);
        assert_eq!(checked.index(), None);
        assert_eq!(checked.deconstruct(), (vec![1u8, 2], None));
    }

    #[test]
    fn test_signed_check_extracts_sender_and_nonce() {
        let (who, sk) = keypair(1);
        let ctx = TestContext { indexed: (7, who) };
        let xt = signed(vec![9u8; 4], Address::Index(7), 3, &sk);
        assert_eq!(xt.is_signed(), Some(true));

        let checked = xt.check(&ctx).unwrap();
        assert_eq!(checked.sender(), Some(&who));
        assert_eq!(checked.index(), Some(&3));
    }

    #[test]
    fn test_tampered_call_is_bad_signature() {
        let (who, sk) = keypair(1);
        let ctx = TestContext { indexed: (0, who) };
        let mut xt = signed(vec![1u8], Address::Id(who), 0, &sk);
        xt.function = vec![2u8];
        assert_eq!(xt.check(&ctx), Err(CheckError::BadSignature));
    }

    #[test]
    fn test_unknown_index_is_reported() {
        let (who, sk) = keypair(1);
        let ctx = TestContext { indexed: (0, who) };
        let xt = signed(vec![1u8], Address::Index(42), 0, &sk);
        assert_eq!(xt.check(&ctx), Err(CheckError::UnknownAccountIndex));
    }

    #[test]
    fn test_large_payload_is_hashed_before_signing() {
        let (who, sk) = keypair(2);
        let ctx = TestContext { indexed: (0, who) };
        let call = vec![0x55u8; 400];
        assert_eq!(signing_payload(0, &call).len(), 32);
        assert!(signed(call, Address::Id(who), 0, &sk).check(&ctx).is_ok());
    }

    #[test]
    fn test_extrinsic_wire_roundtrip_and_length_check() {
        let (who, sk) = keypair(3);
        let xt = signed(vec![1u8, 2, 3], Address::Id(who), 300, &sk);
        let encoded = xt.encode();
        assert_eq!(decode_all::<UncheckedExtrinsic<Vec<u8>>>(&encoded).unwrap(), xt);

        // Lie about the length: one byte more than the body.
        let mut body = encoded.clone();
        body.remove(0);
        body.remove(0);
        let mut forged = Vec::new();
        crate::codec::write_compact(&mut forged, body.len() as u64 + 1);
        forged.extend_from_slice(&body);
        forged.push(0);
        assert!(decode_all::<UncheckedExtrinsic<Vec<u8>>>(&forged).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut inner = vec![2u8];
        vec![0u8].encode_to(&mut inner);
        let encoded = inner.encode();
        assert!(matches!(
            decode_all::<UncheckedExtrinsic<Vec<u8>>>(&encoded),
            Err(CodecError::InvalidTag { what: "extrinsic version", tag: 2 })
        ));
    }
}
