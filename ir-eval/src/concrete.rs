//! Evaluation of operators on fully known operands.
//!
//! Every operator is total: division and remainder by zero, and signed division overflow
//! (`MIN / -1`), produce 0 with the normal result width. Simplifiers must not assume that laws such
//! as `(a / b) * b + a % b == a` hold for every input.

use ir_ops::{
    cast_bool, descriptor_of, lsb_index, mask, msb_index, popcount, rotate_left, rotate_right,
    smul_high, sxt64, umul_high, zxt64, OperatorId,
};

use crate::size::{extension_size, result_size};

/// Applies `id` to `lhs` (`bcnt_lhs` bits) and `rhs` (`bcnt_rhs` bits), returning the result
/// masked to its width together with the width. Widths are expected to already be validated.
pub(crate) fn eval(id: OperatorId, bcnt_lhs: u8, lhs: u64, bcnt_rhs: u8, rhs: u64) -> (u64, u8) {
    use ir_ops::OperatorId as Op;

    let Some(desc) = descriptor_of(id)
    else {
        tracing::debug!("evaluating reserved operator id {id:?}, result defined as 0");
        return (0, result_size(id, bcnt_lhs, bcnt_rhs));
    };

    let size = if id.is_width_change() {
        extension_size(zxt64(rhs, bcnt_rhs))
    }
    else {
        result_size(id, bcnt_lhs, bcnt_rhs)
    };

    // Operands are normalized based on the signedness of the operator.
    let (a, b) = match desc.is_signed {
        true => (sxt64(lhs, bcnt_lhs), sxt64(rhs, bcnt_rhs)),
        false => (zxt64(lhs, bcnt_lhs), zxt64(rhs, bcnt_rhs)),
    };

    let value = match id {
        Op::Not => !b,
        Op::And => a & b,
        Op::Or => a | b,
        Op::Xor => a ^ b,
        Op::Shr => a >> (b % 64),
        Op::Shl => a << (b % 64),
        Op::Rotr => rotate_right(a, b, bcnt_lhs),
        Op::Rotl => rotate_left(a, b, bcnt_lhs),

        Op::Neg => b.wrapping_neg(),
        Op::Add => a.wrapping_add(b),
        Op::Sub => a.wrapping_sub(b),
        Op::MulHi => smul_high(a as i64, b as i64, size),
        Op::Mul | Op::UMul => a.wrapping_mul(b),
        Op::Div => signed_div(id, a as i64, b as i64, size),
        Op::Rem => signed_rem(id, a as i64, b as i64, size),
        Op::UMulHi => umul_high(a, b, size),
        Op::UDiv => match b {
            0 => div_by_zero(id),
            b => a / b,
        },
        Op::URem => match b {
            0 => div_by_zero(id),
            b => a % b,
        },

        Op::Zx => zxt64(lhs, bcnt_lhs),
        Op::Sx => sxt64(lhs, bcnt_lhs),
        Op::Popcnt => popcount(b, bcnt_rhs),
        Op::Msb => msb_index(a, bcnt_lhs).map_or(b, u64::from),
        Op::Lsb => lsb_index(a, bcnt_lhs).map_or(b, u64::from),
        Op::Bt => (a >> (b % 64)) & 1,
        Op::Mask => mask(bcnt_rhs),
        Op::Bcnt => bcnt_rhs as u64,
        Op::ValueIf => match a & 1 {
            0 => 0,
            _ => b,
        },

        Op::MaxValue => a.max(b),
        Op::MinValue => a.min(b),
        Op::SMaxValue => (a as i64).max(b as i64) as u64,
        Op::SMinValue => (a as i64).min(b as i64) as u64,

        Op::Greater => cast_bool((a as i64) > (b as i64)),
        Op::GreaterEq => cast_bool((a as i64) >= (b as i64)),
        Op::Equal => cast_bool(a == b),
        Op::NotEqual => cast_bool(a != b),
        Op::LessEq => cast_bool((a as i64) <= (b as i64)),
        Op::Less => cast_bool((a as i64) < (b as i64)),
        Op::UGreater => cast_bool(a > b),
        Op::UGreaterEq => cast_bool(a >= b),
        Op::ULessEq => cast_bool(a <= b),
        Op::ULess => cast_bool(a < b),

        Op::Invalid | Op::Max => 0,
    };

    (value & mask(size), size)
}

#[cold]
fn div_by_zero(id: OperatorId) -> u64 {
    tracing::debug!("{id}: division by zero, result defined as 0");
    0
}

/// Returns whether `a / b` is not representable in `size` bits.
#[inline]
fn is_signed_overflow(a: i64, b: i64, size: u8) -> bool {
    b == -1 && a == sxt64(1 << (size - 1), size) as i64
}

fn signed_div(id: OperatorId, a: i64, b: i64, size: u8) -> u64 {
    if b == 0 {
        return div_by_zero(id);
    }
    if is_signed_overflow(a, b, size) {
        tracing::debug!("{id}: signed overflow, result defined as 0");
        return 0;
    }
    a.wrapping_div(b) as u64
}

fn signed_rem(id: OperatorId, a: i64, b: i64, size: u8) -> u64 {
    if b == 0 {
        return div_by_zero(id);
    }
    if is_signed_overflow(a, b, size) {
        tracing::debug!("{id}: signed overflow, result defined as 0");
        return 0;
    }
    a.wrapping_rem(b) as u64
}
