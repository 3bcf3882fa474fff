//! Runtime version reported through `Core_version`.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use crate::codec::{Decode, Encode, Reader};
use crate::error::CodecError;

/// Identifier of a runtime API: the first 8 bytes of its name's blake2 hash.
pub type ApiId = [u8; 8];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersion {
    /// Chain family. Nodes refuse to import blocks for a different name.
    pub spec_name: Cow<'static, str>,
    pub impl_name: Cow<'static, str>,
    /// Block authoring compatibility.
    pub authoring_version: u32,
    /// Bumped on every state-transition change.
    pub spec_version: u32,
    /// Bumped on implementation-only changes.
    pub impl_version: u32,
    pub apis: Cow<'static, [(ApiId, u32)]>,
}

impl RuntimeVersion {
    /// Two runtimes can execute each other's blocks natively only when
    /// spec name, spec version and authoring version all agree.
    pub fn can_call_with(&self, other: &RuntimeVersion) -> bool {
        self.spec_name == other.spec_name
            && self.spec_version == other.spec_version
            && self.authoring_version == other.authoring_version
    }

    pub fn has_api(&self, id: &ApiId, version: u32) -> bool {
        self.apis.iter().any(|(api, v)| api == id && *v == version)
    }
}

impl Encode for RuntimeVersion {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        <str as Encode>::encode_to(&self.spec_name, dest);
        <str as Encode>::encode_to(&self.impl_name, dest);
        self.authoring_version.encode_to(dest);
        self.spec_version.encode_to(dest);
        self.impl_version.encode_to(dest);
        <[(ApiId, u32)] as Encode>::encode_to(&self.apis, dest);
    }
}

impl Decode for RuntimeVersion {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            spec_name: Cow::Owned(Decode::decode(input)?),
            impl_name: Cow::Owned(Decode::decode(input)?),
            authoring_version: Decode::decode(input)?,
            spec_version: Decode::decode(input)?,
            impl_version: Decode::decode(input)?,
            apis: Cow::Owned(Decode::decode(input)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_all;

    const APIS: &[(ApiId, u32)] = &[(*b"corecore", 1)];

    fn version(spec_version: u32) -> RuntimeVersion {
        RuntimeVersion {
            spec_name: Cow::Borrowed("test"),
            impl_name: Cow::Borrowed("strata-test"),
            authoring_version: 1,
            spec_version,
            impl_version: 1,
            apis: Cow::Borrowed(APIS),
        }
    }

    #[test]
    fn test_roundtrip() {
        let v = version(3);
        assert_eq!(decode_all::<RuntimeVersion>(&v.encode()).unwrap(), v);
    }

    #[test]
    fn test_can_call_with() {
        assert!(version(1).can_call_with(&version(1)));
        assert!(!version(1).can_call_with(&version(2)));
    }

    #[test]
    fn test_has_api() {
        let v = version(1);
        assert!(v.has_api(b"corecore", 1));
        assert!(!v.has_api(b"corecore", 2));
    }
}
