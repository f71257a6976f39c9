//! Bit-vectors with per-bit unknowns.

use ir_ops::{bit_length, clamp_bit_count, mask, sxt64};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bit {
    /// The bit is equal to zero.
    Zero,

    /// The bit is equal to one.
    One,

    /// The bit could be either value.
    Unknown,
}

impl Bit {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        match value {
            true => Bit::One,
            false => Bit::Zero,
        }
    }

    pub fn const_value(&self) -> Option<u64> {
        match self {
            Self::Zero => Some(0),
            Self::One => Some(1),
            Self::Unknown => None,
        }
    }

    pub fn xor(self, other: Bit) -> Self {
        match (self, other) {
            (Bit::Zero, x) | (x, Bit::Zero) => x,
            (Bit::One, x) | (x, Bit::One) => x.not(),
            _ => Bit::Unknown,
        }
    }

    pub fn and(self, other: Bit) -> Self {
        match (self, other) {
            (Bit::Zero, _) | (_, Bit::Zero) => Bit::Zero,
            (Bit::One, x) | (x, Bit::One) => x,
            _ => Bit::Unknown,
        }
    }

    pub fn or(self, other: Bit) -> Self {
        match (self, other) {
            (Bit::One, _) | (_, Bit::One) => Bit::One,
            (Bit::Zero, x) | (x, Bit::Zero) => x,
            _ => Bit::Unknown,
        }
    }

    pub fn not(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
            Bit::Unknown => Bit::Unknown,
        }
    }
}

/// A partially known integer of `width` bits.
///
/// Bit `i` of `known` is set if bit `i` of the value is known, in which case `value` holds it.
/// Unknown bits, and all bits at or above `width`, are zero in `value`. Bits at or above `width`
/// are also clear in `known`: the value is implicitly zero-extended.
///
/// The width the vector was created with is kept as is, so that an evaluator can reject it. All
/// queries and operations use the width saturated to `[1, 64]`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    known: u64,
    value: u64,
    bcnt: u8,
}

impl BitVector {
    /// A bit-vector where every bit is unknown.
    #[inline]
    pub fn unknown(width: u8) -> Self {
        Self::from_bits(0, 0, width)
    }

    /// A fully known bit-vector holding `value` truncated to `width` bits.
    #[inline]
    pub fn known(value: u64, width: u8) -> Self {
        Self::from_bits(u64::MAX, value, width)
    }

    #[inline]
    pub fn zero(width: u8) -> Self {
        Self::known(0, width)
    }

    /// Creates a bit-vector from a known mask and the values of the known bits. Widths outside of
    /// `[1, 64]` are saturated by every operation on the vector, see [BitVector::declared_width].
    #[inline]
    pub fn from_bits(known_mask: u64, value: u64, width: u8) -> Self {
        let known = known_mask & mask(clamp_bit_count(width as u64));
        Self { known, value: value & known, bcnt: width }
    }

    /// A bit-vector of `width` bits that is known to be no larger than `bound`.
    #[inline]
    pub fn at_most(bound: u64, width: u8) -> Self {
        Self::from_bits(!mask(bit_length(bound)), 0, width)
    }

    #[inline]
    pub fn width(&self) -> u8 {
        clamp_bit_count(self.bcnt as u64)
    }

    /// The width the vector was created with, which may be outside of `[1, 64]`.
    #[inline]
    pub fn declared_width(&self) -> u8 {
        self.bcnt
    }

    #[inline]
    pub fn known_mask(&self) -> u64 {
        self.known
    }

    #[inline]
    pub fn unknown_mask(&self) -> u64 {
        !self.known & mask(self.width())
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Bits that are known to be zero (within the width of the vector).
    #[inline]
    pub fn known_zeros(&self) -> u64 {
        self.known & !self.value
    }

    /// Bits that are known to be one.
    #[inline]
    pub fn known_ones(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn is_fully_known(&self) -> bool {
        self.known == mask(self.width())
    }

    /// Returns the value of the bit-vector if every bit is known.
    #[inline]
    pub fn get_const(&self) -> Option<u64> {
        self.is_fully_known().then_some(self.value)
    }

    /// Returns bit `index`. Bits at or above the width are zero.
    #[inline]
    pub fn bit(&self, index: u8) -> Bit {
        if index >= self.width() {
            return Bit::Zero;
        }
        match (self.known >> index) & 1 {
            0 => Bit::Unknown,
            _ => Bit::from_bool((self.value >> index) & 1 == 1),
        }
    }

    pub(crate) fn set_bit(&mut self, index: u8, bit: Bit) {
        if index >= self.width() {
            return;
        }
        let m = 1 << index;
        match bit {
            Bit::Zero => {
                self.known |= m;
                self.value &= !m;
            }
            Bit::One => {
                self.known |= m;
                self.value |= m;
            }
            Bit::Unknown => {
                self.known &= !m;
                self.value &= !m;
            }
        }
    }

    /// Return the sign bit of `self`
    #[inline]
    pub fn sign(&self) -> Bit {
        self.bit(self.width() - 1)
    }

    /// Counts the number of low bits that are known to be zero.
    #[inline]
    pub fn known_trailing_zeros(&self) -> u8 {
        (!self.known_zeros()).trailing_zeros().min(self.width() as u32) as u8
    }

    /// The minimum unsigned value the bit-vector can take (i.e. all unknown bits are zero).
    #[inline]
    pub fn umin(&self) -> u64 {
        self.value
    }

    /// The maximum unsigned value the bit-vector can take (i.e. all unknown bits are one).
    #[inline]
    pub fn umax(&self) -> u64 {
        self.value | self.unknown_mask()
    }

    /// The minimum value the bit-vector can take when interpreted as a signed integer.
    pub fn smin(&self) -> i64 {
        let sign = 1 << (self.width() - 1);
        match self.sign() {
            Bit::Unknown => sxt64(self.value | sign, self.width()) as i64,
            _ => sxt64(self.value, self.width()) as i64,
        }
    }

    /// The maximum value the bit-vector can take when interpreted as a signed integer.
    pub fn smax(&self) -> i64 {
        let sign = 1 << (self.width() - 1);
        match self.sign() {
            Bit::Unknown => sxt64(self.umax() & !sign, self.width()) as i64,
            _ => sxt64(self.umax(), self.width()) as i64,
        }
    }

    /// Resizes the vector to `width` bits, the new high bits are known to be zero. Truncates if
    /// `width` is smaller than the current width.
    pub fn zero_extend(&self, width: u8) -> Self {
        let high = !mask(self.width());
        Self::from_bits(self.known | high, self.value, width)
    }

    /// Resizes the vector to `width` bits, replicating the sign bit (which may be unknown) into
    /// the new high bits. Truncates if `width` is smaller than the current width.
    pub fn sign_extend(&self, width: u8) -> Self {
        let high = !mask(self.width());
        match self.sign() {
            Bit::Zero => Self::from_bits(self.known | high, self.value, width),
            Bit::One => Self::from_bits(self.known | high, self.value | high, width),
            Bit::Unknown => Self::from_bits(self.known, self.value, width),
        }
    }

    /// Resizes the vector using sign extension if `signed` is set, otherwise zero extension.
    #[inline]
    pub fn extend(&self, width: u8, signed: bool) -> Self {
        match signed {
            true => self.sign_extend(width),
            false => self.zero_extend(width),
        }
    }

    /// Returns the bits that are known, and equal, in both `self` and `other`. Any value either
    /// vector can take is described by the result.
    pub fn merge(&self, other: &BitVector) -> Self {
        let (a, b) = self.match_widths(other);
        let known = a.known & b.known & !(a.value ^ b.value);
        Self::from_bits(known, a.value, a.width())
    }

    fn match_widths(&self, other: &BitVector) -> (BitVector, BitVector) {
        let width = self.width().max(other.width());
        (self.zero_extend(width), other.zero_extend(width))
    }

    /// Perform a bitwise NOT operation on the current bit-vector.
    pub fn not(&self) -> Self {
        Self::from_bits(self.known, !self.value, self.width())
    }

    /// Perform a bitwise AND operation with `other`.
    pub fn and(&self, other: &BitVector) -> Self {
        let (a, b) = self.match_widths(other);
        let zeros = a.known_zeros() | b.known_zeros();
        let ones = a.value & b.value;
        Self::from_bits(zeros | ones, ones, a.width())
    }

    /// Perform a bitwise OR operation with `other`.
    pub fn or(&self, other: &BitVector) -> Self {
        let (a, b) = self.match_widths(other);
        let zeros = a.known_zeros() & b.known_zeros();
        let ones = a.value | b.value;
        Self::from_bits(zeros | ones, ones, a.width())
    }

    /// Perform a bitwise XOR operation with `other`.
    pub fn xor(&self, other: &BitVector) -> Self {
        let (a, b) = self.match_widths(other);
        Self::from_bits(a.known & b.known, a.value ^ b.value, a.width())
    }

    /// Perform a wrapping ADD operation with `other`, propagating carries bit by bit.
    pub fn wrapping_add(&self, other: &BitVector) -> Self {
        let width = self.width().max(other.width());
        let mut out = Self::unknown(width);
        let mut carry = Bit::Zero;

        for i in 0..width {
            let (a, b) = (self.bit(i), other.bit(i));

            // a + b
            let half = a.xor(b);
            let half_carry = a.and(b);

            // (a + b) + carry
            out.set_bit(i, half.xor(carry));
            let full_carry = half.and(carry);

            carry = half_carry.or(full_carry);
        }

        out
    }

    /// Perform a wrapping SUB operation with `other`, propagating borrows bit by bit.
    pub fn wrapping_sub(&self, other: &BitVector) -> Self {
        let width = self.width().max(other.width());
        let mut out = Self::unknown(width);
        let mut borrow = Bit::Zero;

        for i in 0..width {
            let (a, b) = (self.bit(i), other.bit(i));

            let half = a.xor(b);
            let borrow_half = a.not().and(b);

            out.set_bit(i, half.xor(borrow));
            let borrow_diff = half.not().and(borrow);

            borrow = borrow_half.or(borrow_diff);
        }

        out
    }

    /// Shift the bit-vector left by a known amount, the vacated low bits are zero.
    pub fn shift_left(&self, amount: u8) -> Self {
        if amount >= self.width() {
            return Self::zero(self.width());
        }
        Self::from_bits((self.known << amount) | mask(amount), self.value << amount, self.width())
    }

    /// Shift the bit-vector right by a known amount, the vacated high bits are zero.
    pub fn shift_right(&self, amount: u8) -> Self {
        if amount >= self.width() {
            return Self::zero(self.width());
        }
        let known = self.zero_extend(64).known;
        Self::from_bits((known >> amount) | !(u64::MAX >> amount), self.value >> amount, self.width())
    }

    /// Rotate the bit-vector right by a known amount, within the width of the vector.
    pub fn rotate_right(&self, amount: u64) -> Self {
        let known = ir_ops::rotate_right(self.known, amount, self.width());
        let value = ir_ops::rotate_right(self.value, amount, self.width());
        Self::from_bits(known, value, self.width())
    }

    /// Rotate the bit-vector left by a known amount, within the width of the vector.
    pub fn rotate_left(&self, amount: u64) -> Self {
        let known = ir_ops::rotate_left(self.known, amount, self.width());
        let value = ir_ops::rotate_left(self.value, amount, self.width());
        Self::from_bits(known, value, self.width())
    }

    pub fn display(&self) -> BitVecDisplay {
        BitVecDisplay(*self)
    }
}

impl Default for BitVector {
    fn default() -> Self {
        Self::unknown(64)
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get_const() {
            Some(x) => write!(f, "{:#0x}:{}", x, self.width()),
            None => write!(f, "{}:{}", self.display(), self.width()),
        }
    }
}

impl std::fmt::Display for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.display(), f)
    }
}

/// Renders a bit-vector most significant bit first, with `x` marking unknown bits.
pub struct BitVecDisplay(BitVector);

impl std::fmt::Display for BitVecDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in (0..self.0.width()).rev() {
            let x = match self.0.bit(i) {
                Bit::Unknown => 'x',
                Bit::Zero => '0',
                Bit::One => '1',
            };
            write!(f, "{}", x)?;
        }
        Ok(())
    }
}
