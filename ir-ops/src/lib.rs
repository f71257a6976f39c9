//! Operator identifiers and descriptors for the IR, together with the bit-width helpers shared by
//! the evaluators.

mod display;
mod error;
mod helpers;
mod ops;

pub use crate::{
    display::ExprDisplay,
    error::{Error, Result},
    helpers::*,
    ops::{descriptor_of, Descriptor, OperatorId, DESCRIPTORS},
};

/// Checks an operand width, rejecting anything outside of `[1, 64]`.
pub fn checked_bit_count(value: u64) -> Result<u8> {
    match is_valid_bit_count(value) {
        true => Ok(value as u8),
        false => Err(Error::InvalidBitCount(value)),
    }
}

#[test]
fn bit_count_checks() {
    assert_eq!(checked_bit_count(1), Ok(1));
    assert_eq!(checked_bit_count(64), Ok(64));
    assert_eq!(checked_bit_count(0), Err(Error::InvalidBitCount(0)));
    assert_eq!(checked_bit_count(65), Err(Error::InvalidBitCount(65)));
}
