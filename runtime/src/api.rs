//! Runtime API: the entry points a host calls.
//!
//! Every entry point exists twice: as a typed function and as a named
//! method over encoded bytes, reached through [`call`]. Input decoding
//! failures are errors, except for block import where they are fatal and
//! for validation where they make the transaction `Invalid`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use strata_engine::Externalities;
use strata_primitives::{
    decode_all, AccountId, ApplyResult, CheckInherentsResult, CodecError, Encode, Extrinsic,
    Hash, Header, InherentData, InherentError, RuntimeVersion, TransactionValidity,
};
use crate::balances::{Balance, Balances};
use crate::timestamp::Timestamp;
use crate::{executive, Block, Call, System, UncheckedExtrinsic, VERSION};

pub const CORE_VERSION: &str = "Core_version";
pub const CORE_EXECUTE_BLOCK: &str = "Core_execute_block";
pub const CORE_INITIALISE_BLOCK: &str = "Core_initialise_block";
pub const BLOCK_BUILDER_APPLY_EXTRINSIC: &str = "BlockBuilder_apply_extrinsic";
pub const BLOCK_BUILDER_FINALISE_BLOCK: &str = "BlockBuilder_finalise_block";
pub const BLOCK_BUILDER_RANDOM_SEED: &str = "BlockBuilder_random_seed";
pub const BLOCK_BUILDER_INHERENT_EXTRINSICS: &str = "BlockBuilder_inherent_extrinsics";
pub const BLOCK_BUILDER_CHECK_INHERENTS: &str = "BlockBuilder_check_inherents";
pub const VALIDATE_TRANSACTION: &str = "TaggedTransactionQueue_validate_transaction";
pub const TEST_API_BALANCE_OF: &str = "TestAPI_balance_of";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("unknown runtime api method: {0}")]
    UnknownMethod(String),

    #[error("failed to decode input for {0}: {1}")]
    Decode(&'static str, CodecError),

    #[error(transparent)]
    Inherent(#[from] InherentError),
}

pub fn version() -> RuntimeVersion {
    VERSION
}

/// Import a block.
///
/// # Panics
///
/// On any consensus fault; see `Executive::execute_block`.
pub fn execute_block(ext: &mut dyn Externalities, block: Block) {
    executive(ext).execute_block(block);
}

pub fn initialise_block(ext: &mut dyn Externalities, header: &Header) {
    executive(ext).initialise_block(header);
}

pub fn apply_extrinsic(ext: &mut dyn Externalities, uxt: UncheckedExtrinsic) -> ApplyResult {
    executive(ext).apply_extrinsic(uxt)
}

pub fn finalise_block(ext: &mut dyn Externalities) -> Header {
    executive(ext).finalise_block()
}

/// Seed of the block being built.
pub fn random_seed(ext: &mut dyn Externalities) -> Hash {
    System::new(ext).random_seed()
}

/// Unsigned extrinsics the author should put at the start of the block.
pub fn inherent_extrinsics(data: &InherentData) -> Result<Vec<UncheckedExtrinsic>, InherentError> {
    let mut extrinsics = Vec::new();
    if let Some(call) = Timestamp::create_inherent(data)? {
        extrinsics.push(UncheckedExtrinsic::new_unsigned(Call::Timestamp(call)));
    }
    Ok(extrinsics)
}

/// Check the inherents of `block` against local inherent data.
pub fn check_inherents(block: &Block, data: &InherentData) -> CheckInherentsResult {
    let mut result = CheckInherentsResult::new();
    for uxt in &block.extrinsics {
        if uxt.is_signed() == Some(true) {
            continue;
        }
        if let Call::Timestamp(call) = &uxt.function {
            if let Err(err) = Timestamp::check_inherent(call, data) {
                log::debug!(target: "runtime::timestamp", "inherent check failed: {}", err);
                Timestamp::report(&mut result, &err);
            }
        }
        if result.fatal_error() {
            break;
        }
    }
    result
}

/// Judge a transaction for the pool. Never writes to `ext`.
pub fn validate_transaction(ext: &mut dyn Externalities, uxt: UncheckedExtrinsic) -> TransactionValidity {
    executive(ext).validate_transaction(uxt)
}

pub fn balance_of(ext: &dyn Externalities, who: &AccountId) -> Balance {
    Balances::free_balance(ext, who)
}

fn decode_input<T: strata_primitives::Decode>(method: &'static str, input: &[u8]) -> Result<T, ApiError> {
    decode_all(input).map_err(|err| ApiError::Decode(method, err))
}

/// Call an entry point by name with encoded input, returning encoded output.
///
/// # Panics
///
/// `Core_execute_block` panics on undecodable input and on any consensus
/// fault in the block.
pub fn call(ext: &mut dyn Externalities, method: &str, input: &[u8]) -> Result<Vec<u8>, ApiError> {
    log::trace!(target: "runtime::api", "calling {} with {} bytes", method, input.len());
    let output = match method {
        CORE_VERSION => version().encode(),
        CORE_EXECUTE_BLOCK => {
            let block: Block = match decode_all(input) {
                Ok(block) => block,
                Err(err) => panic!("Invalid block encoding: {}", err),
            };
            execute_block(ext, block);
            Vec::new()
        }
        CORE_INITIALISE_BLOCK => {
            let header: Header = decode_input(CORE_INITIALISE_BLOCK, input)?;
            initialise_block(ext, &header);
            Vec::new()
        }
        BLOCK_BUILDER_APPLY_EXTRINSIC => {
            let uxt = decode_input(BLOCK_BUILDER_APPLY_EXTRINSIC, input)?;
            apply_extrinsic(ext, uxt).encode()
        }
        BLOCK_BUILDER_FINALISE_BLOCK => finalise_block(ext).encode(),
        BLOCK_BUILDER_RANDOM_SEED => random_seed(ext).encode(),
        BLOCK_BUILDER_INHERENT_EXTRINSICS => {
            let data: InherentData = decode_input(BLOCK_BUILDER_INHERENT_EXTRINSICS, input)?;
            inherent_extrinsics(&data)?.encode()
        }
        BLOCK_BUILDER_CHECK_INHERENTS => {
            let (block, data): (Block, InherentData) = decode_input(BLOCK_BUILDER_CHECK_INHERENTS, input)?;
            check_inherents(&block, &data).encode()
        }
        VALIDATE_TRANSACTION => match decode_all::<UncheckedExtrinsic>(input) {
            Ok(uxt) => validate_transaction(ext, uxt).encode(),
            Err(err) => {
                log::trace!(target: "runtime::validity", "undecodable transaction: {}", err);
                TransactionValidity::Invalid.encode()
            }
        },
        TEST_API_BALANCE_OF => {
            let who: AccountId = decode_input(TEST_API_BALANCE_OF, input)?;
            balance_of(ext, &who).encode()
        }
        other => return Err(ApiError::UnknownMethod(other.to_string())),
    };
    Ok(output)
}
