//! Password digest for staff credentials
//!
//! The digest is BLAKE2b (RFC 7693) with an 8-byte output length, returned as
//! the first word of the chaining state. No key, no salt.
//!
//! # Known weaknesses
//!
//! - 64 bits of output: fine for comparing credentials, useless against an
//!   offline dictionary attack on a stolen data file.
//! - Equal passwords always produce equal digests.
//! - A digest whose high 32 bits are zero is indistinguishable from a
//!   tombstone on disk (see `storage::Credential`).

mod blake2b;

pub use blake2b::{compress, mix, IV, SIGMA};

use subtle::ConstantTimeEq;

/// Block size in bytes.
pub const BLOCK_BYTES: usize = 128;

/// Output length in bytes, folded into the parameter word.
pub const OUTPUT_BYTES: u64 = 8;

/// Computes the 64-bit credential digest of `message`.
///
/// Deterministic across runs and platforms: message words are read
/// little-endian regardless of host byte order.
pub fn compute_digest(message: &[u8]) -> u64 {
    let mut state = IV;
    state[0] ^= 0x0101_0000 ^ OUTPUT_BYTES;

    // The final block is always compressed with the last-block flag, even
    // when the message length is an exact multiple of the block size.
    let full_blocks = if message.is_empty() {
        0
    } else {
        (message.len() - 1) / BLOCK_BYTES
    };

    let mut block = [0u8; BLOCK_BYTES];
    for i in 0..full_blocks {
        block.copy_from_slice(&message[i * BLOCK_BYTES..(i + 1) * BLOCK_BYTES]);
        compress(&mut state, &block, ((i + 1) * BLOCK_BYTES) as u64, false);
    }

    let tail = &message[full_blocks * BLOCK_BYTES..];
    block = [0u8; BLOCK_BYTES];
    block[..tail.len()].copy_from_slice(tail);
    compress(&mut state, &block, message.len() as u64, true);

    state[0]
}

/// Digest of a UTF-8 password.
pub fn digest_password(password: &str) -> u64 {
    compute_digest(password.as_bytes())
}

/// Compares a password against a stored digest in constant time.
pub fn verify_password(password: &str, expected: u64) -> bool {
    let actual = digest_password(password);
    actual.to_le_bytes().ct_eq(&expected.to_le_bytes()).into()
}
