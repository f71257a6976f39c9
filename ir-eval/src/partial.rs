//! Three-valued evaluation of operators over partially known bit-vectors.
//!
//! Every rule is sound: a bit reported as known holds for every assignment of the unknown input
//! bits. Rules are not required to be complete, returning an unknown bit is always legal.

use ir_ops::{descriptor_of, lsb_index, mask, msb_index, round_bit_count, OperatorId, BIT_INDEX_SIZE};

use crate::{
    bitvec::{Bit, BitVector},
    concrete,
    size::{extension_size, result_size},
};

pub(crate) fn eval(id: OperatorId, lhs: &BitVector, rhs: &BitVector) -> BitVector {
    use ir_ops::OperatorId as Op;

    let (l, r) = (lhs.width(), rhs.width());
    let size = result_size(id, l, r);

    let Some(desc) = descriptor_of(id)
    else {
        return BitVector::zero(size);
    };

    if rhs.is_fully_known() && (desc.is_unary() || lhs.is_fully_known()) {
        let (value, size) = concrete::eval(id, l, lhs.value(), r, rhs.value());
        tracing::trace!("{id}: operands fully known, result {value:#0x}:{size}");
        return BitVector::known(value, size);
    }

    match id {
        Op::Not => rhs.zero_extend(size).not(),
        Op::And => lhs.zero_extend(size).and(&rhs.zero_extend(size)),
        Op::Or => lhs.zero_extend(size).or(&rhs.zero_extend(size)),
        Op::Xor => lhs.zero_extend(size).xor(&rhs.zero_extend(size)),
        Op::Shr | Op::Shl => shift(id, lhs, rhs, size),
        Op::Rotr | Op::Rotl => rotate(id, lhs, rhs, size),

        Op::Neg => BitVector::zero(size).wrapping_sub(&rhs.sign_extend(size)),
        Op::Add => lhs.sign_extend(size).wrapping_add(&rhs.sign_extend(size)),
        Op::Sub => lhs.sign_extend(size).wrapping_sub(&rhs.sign_extend(size)),
        Op::Mul | Op::UMul => {
            multiply(&lhs.extend(size, desc.is_signed), &rhs.extend(size, desc.is_signed))
        }
        Op::MulHi | Op::UMulHi | Op::Div | Op::Rem => BitVector::unknown(size),
        Op::UDiv | Op::URem if rhs.get_const() == Some(0) => BitVector::unknown(size),
        Op::UDiv => BitVector::at_most(lhs.umax(), size),
        Op::URem => BitVector::at_most(lhs.umax().min(rhs.umax() - 1), size),

        Op::Zx | Op::Sx => extend(id, lhs, rhs),
        Op::Popcnt => {
            let upper = rhs.known_ones().count_ones() + rhs.unknown_mask().count_ones();
            BitVector::at_most(upper as u64, BIT_INDEX_SIZE)
        }
        Op::Msb => highest_set_bit(lhs, rhs),
        Op::Lsb => lowest_set_bit(lhs, rhs),
        Op::Bt => bit_test(lhs, rhs),
        Op::Mask => BitVector::known(mask(r), round_bit_count(r)),
        Op::Bcnt => BitVector::known(r as u64, BIT_INDEX_SIZE),
        Op::ValueIf => {
            let value = rhs.zero_extend(size);
            match lhs.bit(0) {
                Bit::Zero => BitVector::zero(size),
                Bit::One => value,
                Bit::Unknown => value.merge(&BitVector::zero(size)),
            }
        }

        Op::MaxValue | Op::MinValue => {
            let (a, b) = (lhs.zero_extend(size), rhs.zero_extend(size));
            let a_wins = match id {
                Op::MaxValue => decide(a.umin() >= b.umax(), a.umax() <= b.umin()),
                _ => decide(a.umax() <= b.umin(), a.umin() >= b.umax()),
            };
            select(a_wins, &a, &b)
        }
        Op::SMaxValue | Op::SMinValue => {
            let (a, b) = (lhs.sign_extend(size), rhs.sign_extend(size));
            let a_wins = match id {
                Op::SMaxValue => decide(a.smin() >= b.smax(), a.smax() <= b.smin()),
                _ => decide(a.smax() <= b.smin(), a.smin() >= b.smax()),
            };
            select(a_wins, &a, &b)
        }

        Op::Equal => bool_vec(is_eq(lhs, rhs)),
        Op::NotEqual => bool_vec(is_eq(lhs, rhs).not()),
        Op::Greater => bool_vec(decide(lhs.smin() > rhs.smax(), lhs.smax() <= rhs.smin())),
        Op::GreaterEq => bool_vec(decide(lhs.smin() >= rhs.smax(), lhs.smax() < rhs.smin())),
        Op::LessEq => bool_vec(decide(lhs.smax() <= rhs.smin(), lhs.smin() > rhs.smax())),
        Op::Less => bool_vec(decide(lhs.smax() < rhs.smin(), lhs.smin() >= rhs.smax())),
        Op::UGreater => bool_vec(decide(lhs.umin() > rhs.umax(), lhs.umax() <= rhs.umin())),
        Op::UGreaterEq => bool_vec(decide(lhs.umin() >= rhs.umax(), lhs.umax() < rhs.umin())),
        Op::ULessEq => bool_vec(decide(lhs.umax() <= rhs.umin(), lhs.umin() > rhs.umax())),
        Op::ULess => bool_vec(decide(lhs.umax() < rhs.umin(), lhs.umin() >= rhs.umax())),

        Op::Invalid | Op::Max => BitVector::zero(size),
    }
}

/// Resolves a predicate from a condition that forces it true and one that forces it false.
#[inline]
fn decide(always: bool, never: bool) -> Bit {
    match (always, never) {
        (true, _) => Bit::One,
        (false, true) => Bit::Zero,
        (false, false) => Bit::Unknown,
    }
}

fn bool_vec(bit: Bit) -> BitVector {
    match bit.const_value() {
        Some(x) => BitVector::known(x, 1),
        None => BitVector::unknown(1),
    }
}

/// Picks `a` or `b` based on `a_wins`, keeping only what they agree on if it is unknown.
fn select(a_wins: Bit, a: &BitVector, b: &BitVector) -> BitVector {
    match a_wins {
        Bit::One => *a,
        Bit::Zero => *b,
        Bit::Unknown => a.merge(b),
    }
}

fn is_eq(lhs: &BitVector, rhs: &BitVector) -> Bit {
    let (a, b) = (lhs.zero_extend(64), rhs.zero_extend(64));

    let known_diff = a.known_mask() & b.known_mask() & (a.value() ^ b.value());
    if known_diff != 0 || a.umax() < b.umin() || b.umax() < a.umin() {
        return Bit::Zero;
    }
    match (a.get_const(), b.get_const()) {
        (Some(x), Some(y)) => Bit::from_bool(x == y),
        _ => Bit::Unknown,
    }
}

fn shift(id: OperatorId, lhs: &BitVector, rhs: &BitVector, size: u8) -> BitVector {
    let value = lhs.zero_extend(64);

    if let Some(amount) = rhs.get_const() {
        let amount = (amount % 64) as u8;
        let out = match id {
            OperatorId::Shl => value.shift_left(amount),
            _ => value.shift_right(amount),
        };
        return out.zero_extend(size);
    }

    match id {
        // Shifting left never clears the trailing zeros.
        OperatorId::Shl => {
            let zeros = value.known_trailing_zeros();
            BitVector::from_bits(mask(zeros), 0, size)
        }
        // A logical right shift never increases the value.
        _ => BitVector::at_most(lhs.umax(), size),
    }
}

fn rotate(id: OperatorId, lhs: &BitVector, rhs: &BitVector, size: u8) -> BitVector {
    let width = lhs.width();

    if let Some(amount) = rhs.get_const() {
        let out = match id {
            OperatorId::Rotl => lhs.rotate_left(amount),
            _ => lhs.rotate_right(amount),
        };
        return out.zero_extend(size);
    }

    // Rotating a vector where every bit is the same is a no-op.
    match lhs.get_const() {
        Some(x) if x == 0 || x == mask(width) => lhs.zero_extend(size),
        _ => BitVector::unknown(width).zero_extend(size),
    }
}

fn multiply(a: &BitVector, b: &BitVector) -> BitVector {
    let size = a.width();
    if a.get_const() == Some(0) || b.get_const() == Some(0) {
        return BitVector::zero(size);
    }

    let pow2 = |x: &BitVector| x.get_const().filter(|x| x.is_power_of_two());
    if let Some(x) = pow2(a) {
        return b.shift_left(x.trailing_zeros() as u8);
    }
    if let Some(x) = pow2(b) {
        return a.shift_left(x.trailing_zeros() as u8);
    }

    let zeros = (a.known_trailing_zeros() as u32 + b.known_trailing_zeros() as u32).min(64);
    BitVector::from_bits(mask(zeros as u8), 0, size)
}

fn extend(id: OperatorId, lhs: &BitVector, rhs: &BitVector) -> BitVector {
    let signed = id == OperatorId::Sx;

    if let Some(target) = rhs.get_const() {
        return lhs.extend(extension_size(target), signed);
    }

    // Without a known target width only the zeros survive truncation.
    let zeros = lhs.extend(64, signed).known_zeros();
    BitVector::from_bits(zeros, 0, 64)
}

/// The value of a bit index known to lie within `[lo, hi]`.
fn index_range(lo: u8, hi: u8) -> BitVector {
    match lo == hi {
        true => BitVector::known(lo as u64, BIT_INDEX_SIZE),
        false => BitVector::at_most(hi as u64, BIT_INDEX_SIZE),
    }
}

/// `msb(lhs, rhs)`: the highest set bit of `lhs`, or `rhs` if `lhs` is zero.
fn highest_set_bit(lhs: &BitVector, rhs: &BitVector) -> BitVector {
    let fallback = rhs.zero_extend(BIT_INDEX_SIZE);
    let (Some(lowest), Some(highest)) =
        (lsb_index(lhs.umax(), lhs.width()), msb_index(lhs.umax(), lhs.width()))
    else {
        return fallback;
    };

    match msb_index(lhs.known_ones(), lhs.width()) {
        Some(x) => index_range(x, highest),
        None => index_range(lowest, highest).merge(&fallback),
    }
}

/// `lsb(lhs, rhs)`: the lowest set bit of `lhs`, or `rhs` if `lhs` is zero.
fn lowest_set_bit(lhs: &BitVector, rhs: &BitVector) -> BitVector {
    let fallback = rhs.zero_extend(BIT_INDEX_SIZE);
    let (Some(lowest), Some(highest)) =
        (lsb_index(lhs.umax(), lhs.width()), msb_index(lhs.umax(), lhs.width()))
    else {
        return fallback;
    };

    match lsb_index(lhs.known_ones(), lhs.width()) {
        Some(x) => index_range(lowest, x),
        None => index_range(lowest, highest).merge(&fallback),
    }
}

/// `(lhs >> rhs) & 1`
fn bit_test(lhs: &BitVector, rhs: &BitVector) -> BitVector {
    if let Some(index) = rhs.get_const() {
        return bool_vec(lhs.bit((index % 64) as u8));
    }

    let width = lhs.width();
    match lhs.get_const() {
        Some(0) => BitVector::zero(1),
        Some(x) if x == mask(width) && rhs.umax() < width as u64 => BitVector::known(1, 1),
        _ => BitVector::unknown(1),
    }
}
