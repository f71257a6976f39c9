//! Bit-precise evaluation of IR operators, both on fully known operands and on bit-vectors with
//! unknown bits.
//!
//! Every evaluation is total. Ill-defined results (division by zero, signed division overflow,
//! reserved operator ids) evaluate to 0 with the normal result width.

mod bitvec;
mod concrete;
mod config;
mod partial;
mod size;

#[cfg(test)]
mod tests;

pub use crate::{
    bitvec::{Bit, BitVecDisplay, BitVector},
    config::Config,
    size::{extension_size, result_size},
};
pub use ir_ops::{descriptor_of, round_bit_count, Descriptor, OperatorId};

use ir_ops::{clamp_bit_count, is_valid_bit_count};

#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    pub config: Config,
}

impl Evaluator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Calculates the width of the result of `id` for operands of the given widths.
    pub fn result_size(&self, id: OperatorId, bcnt_lhs: u8, bcnt_rhs: u8) -> u8 {
        let (bcnt_lhs, bcnt_rhs) = self.check_widths(id, bcnt_lhs, bcnt_rhs);
        size::result_size(id, bcnt_lhs, bcnt_rhs)
    }

    /// Applies `id` to `lhs` and `rhs`, returning the result (zero-extended from its width) and
    /// its width. Only the low `bcnt_*` bits of each operand are considered.
    pub fn evaluate(
        &self,
        id: OperatorId,
        bcnt_lhs: u8,
        lhs: u64,
        bcnt_rhs: u8,
        rhs: u64,
    ) -> (u64, u8) {
        let (bcnt_lhs, bcnt_rhs) = self.check_widths(id, bcnt_lhs, bcnt_rhs);
        concrete::eval(id, bcnt_lhs, lhs, bcnt_rhs, rhs)
    }

    /// Applies `id` to partially known operands, returning the tightest result this evaluator
    /// can prove. If both operands are fully known this is equal to [Evaluator::evaluate].
    pub fn evaluate_partial(&self, id: OperatorId, lhs: &BitVector, rhs: &BitVector) -> BitVector {
        // Operations on the vectors saturate the width themselves, this only reports it.
        self.check_widths(id, lhs.declared_width(), rhs.declared_width());
        partial::eval(id, lhs, rhs)
    }

    /// Validates the widths of the operands read by `id`. Unary operators never read LHS so its
    /// width is left alone.
    fn check_widths(&self, id: OperatorId, bcnt_lhs: u8, bcnt_rhs: u8) -> (u8, u8) {
        let reads_lhs = id.descriptor().map_or(true, |desc| !desc.is_unary());
        let bcnt_lhs = match reads_lhs {
            true => self.check_width(id, bcnt_lhs),
            false => bcnt_lhs,
        };
        (bcnt_lhs, self.check_width(id, bcnt_rhs))
    }

    fn check_width(&self, id: OperatorId, bcnt: u8) -> u8 {
        if is_valid_bit_count(bcnt as u64) {
            return bcnt;
        }
        if self.config.strict_widths {
            panic!("{id}: invalid operand width: {bcnt}");
        }
        let clamped = clamp_bit_count(bcnt as u64);
        tracing::debug!("{id}: saturating operand width {bcnt} to {clamped}");
        clamped
    }
}

/// Evaluates `id` on fully known operands using the default configuration.
pub fn evaluate(id: OperatorId, bcnt_lhs: u8, lhs: u64, bcnt_rhs: u8, rhs: u64) -> (u64, u8) {
    Evaluator::default().evaluate(id, bcnt_lhs, lhs, bcnt_rhs, rhs)
}

/// Evaluates `id` over partially known operands using the default configuration.
pub fn evaluate_partial(id: OperatorId, lhs: &BitVector, rhs: &BitVector) -> BitVector {
    Evaluator::default().evaluate_partial(id, lhs, rhs)
}
