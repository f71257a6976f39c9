/// The width of every operator result that represents a bit index (`popcnt`, `msb`, `lsb`,
/// `bcnt`).
pub const BIT_INDEX_SIZE: u8 = 8;

/// The widest operand supported by the evaluators.
pub const MAX_BIT_COUNT: u8 = 64;

/// Returns a mask covering the low `bits` bits. `mask(64)` is all-ones and `mask(0)` is zero.
#[inline]
pub const fn mask(bits: u8) -> u64 {
    if bits == 0 {
        return 0;
    }
    if bits >= MAX_BIT_COUNT {
        return u64::MAX;
    }
    u64::MAX >> (u64::BITS - bits as u32)
}

/// Sign-extend a value with `num_bits` to a 64-bit value
#[inline]
pub const fn sxt64(value: u64, num_bits: u8) -> u64 {
    if num_bits == 0 {
        return 0;
    }
    if num_bits >= MAX_BIT_COUNT {
        return value;
    }
    let shift = 64 - num_bits as u32;
    (((value << shift) as i64) >> shift) as u64
}

/// Zero-extend a value with `num_bits` to a 64-bit value
#[inline]
pub const fn zxt64(value: u64, num_bits: u8) -> u64 {
    value & mask(num_bits)
}

/// Extends `value` from `from` bits to `to` bits, replicating the sign bit, and masks the result
/// to `to` bits.
#[inline]
pub const fn sign_extend(value: u64, from: u8, to: u8) -> u64 {
    sxt64(value, from) & mask(to)
}

/// Truncates `value` to `from` bits, the bits between `from` and `to` are zero.
#[inline]
pub const fn zero_extend(value: u64, from: u8, to: u8) -> u64 {
    zxt64(value, from) & mask(to)
}

/// Rounds a raw bit count up to one of the canonical result widths: 1, 8, 16, 32 or 64.
#[inline]
pub const fn round_bit_count(n: u8) -> u8 {
    if n > 32 {
        64
    }
    else if n > 16 {
        32
    }
    else if n > 8 {
        16
    }
    else if n > 1 {
        8
    }
    else {
        1
    }
}

/// Saturates a bit count to the supported range `[1, 64]`.
#[inline]
pub const fn clamp_bit_count(n: u64) -> u8 {
    if n == 0 {
        1
    }
    else if n > MAX_BIT_COUNT as u64 {
        MAX_BIT_COUNT
    }
    else {
        n as u8
    }
}

/// Returns whether `n` is a valid operand width.
#[inline]
pub const fn is_valid_bit_count(n: u64) -> bool {
    n >= 1 && n <= MAX_BIT_COUNT as u64
}

/// Rotates the low `num_bits` bits of `value` right by `amount % num_bits`. Bits above `num_bits`
/// are cleared.
#[inline]
pub const fn rotate_right(value: u64, amount: u64, num_bits: u8) -> u64 {
    let num_bits = clamp_bit_count(num_bits as u64);
    let value = value & mask(num_bits);
    let n = amount % num_bits as u64;
    if n == 0 {
        return value;
    }
    ((value >> n) | (value << (num_bits as u64 - n))) & mask(num_bits)
}

/// Rotates the low `num_bits` bits of `value` left by `amount % num_bits`. Bits above `num_bits`
/// are cleared.
#[inline]
pub const fn rotate_left(value: u64, amount: u64, num_bits: u8) -> u64 {
    let num_bits = clamp_bit_count(num_bits as u64);
    let n = amount % num_bits as u64;
    rotate_right(value, num_bits as u64 - n, num_bits)
}

/// Counts the set bits among the low `num_bits` bits of `value`.
#[inline]
pub const fn popcount(value: u64, num_bits: u8) -> u64 {
    (value & mask(num_bits)).count_ones() as u64
}

/// The index of the highest set bit among the low `num_bits` bits of `value`.
#[inline]
pub const fn msb_index(value: u64, num_bits: u8) -> Option<u8> {
    match value & mask(num_bits) {
        0 => None,
        x => Some(63 - x.leading_zeros() as u8),
    }
}

/// The index of the lowest set bit among the low `num_bits` bits of `value`.
#[inline]
pub const fn lsb_index(value: u64, num_bits: u8) -> Option<u8> {
    match value & mask(num_bits) {
        0 => None,
        x => Some(x.trailing_zeros() as u8),
    }
}

/// The bits of the full unsigned product `a * b` above the low `num_bits` bits, masked to
/// `num_bits`.
#[inline]
pub const fn umul_high(a: u64, b: u64, num_bits: u8) -> u64 {
    let product = a as u128 * b as u128;
    ((product >> clamp_bit_count(num_bits as u64)) as u64) & mask(num_bits)
}

/// The bits of the full signed product `a * b` above the low `num_bits` bits, masked to
/// `num_bits`.
#[inline]
pub const fn smul_high(a: i64, b: i64, num_bits: u8) -> u64 {
    let product = a as i128 * b as i128;
    ((product >> clamp_bit_count(num_bits as u64)) as u64) & mask(num_bits)
}

/// The number of bits required to represent `value`.
#[inline]
pub const fn bit_length(value: u64) -> u8 {
    (u64::BITS - value.leading_zeros()) as u8
}

#[inline]
pub fn cast_bool(value: bool) -> u64 {
    match value {
        true => 1,
        false => 0,
    }
}

/// Formats numeric values together with their width, e.g. `0xff:8`.
#[derive(Clone, Copy, Debug)]
pub struct NumericFormatter {
    pub value: u64,
    pub is_signed: bool,
    pub num_bits: u8,
}

impl core::fmt::Display for NumericFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.is_signed {
            true => {
                let value = sxt64(self.value, self.num_bits) as i64;
                match value < 0 && value != i64::MIN {
                    true => write!(f, "-{:#0x}:{}", -value, self.num_bits),
                    false => write!(f, "{:#0x}:{}", value, self.num_bits),
                }
            }
            false => write!(f, "{:#0x}:{}", self.value, self.num_bits),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(1), 1);
        assert_eq!(mask(8), 0xff);
        assert_eq!(mask(63), u64::MAX >> 1);
        assert_eq!(mask(64), u64::MAX);
    }

    #[test]
    fn rounding() {
        let expected = [(0, 1), (1, 1), (2, 8), (8, 8), (9, 16), (16, 16), (17, 32), (33, 64)];
        for (n, rounded) in expected {
            assert_eq!(round_bit_count(n), rounded, "round_bit_count({n})");
        }
        assert_eq!(round_bit_count(64), 64);
    }

    #[test]
    fn extension() {
        assert_eq!(sxt64(0x80, 8), 0xffff_ffff_ffff_ff80);
        assert_eq!(sxt64(0x7f, 8), 0x7f);
        assert_eq!(sxt64(1, 1), u64::MAX);
        assert_eq!(sign_extend(0xff, 8, 32), 0xffff_ffff);
        assert_eq!(zero_extend(0x1ff, 8, 32), 0xff);
    }

    #[test]
    fn rotation() {
        assert_eq!(rotate_right(0x01, 1, 8), 0x80);
        assert_eq!(rotate_left(0x80, 1, 8), 0x01);
        assert_eq!(rotate_right(0x1234, 16, 16), 0x1234);
        assert_eq!(rotate_left(0x1234, 4, 16), 0x2341);
        assert_eq!(rotate_right(1, 1, 64), 1 << 63);
        assert_eq!(rotate_left(0x1ff, 0, 8), 0xff);
    }

    #[test]
    fn bit_indices() {
        assert_eq!(msb_index(0x0040, 16), Some(6));
        assert_eq!(msb_index(0x1_0000, 16), None);
        assert_eq!(lsb_index(0x8010, 16), Some(4));
        assert_eq!(lsb_index(0, 64), None);
        assert_eq!(popcount(0xf0f0, 16), 8);
        assert_eq!(popcount(0xf0f0, 8), 4);
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(0x80), 8);
        assert_eq!(bit_length(u64::MAX), 64);
    }

    #[test]
    fn high_multiply() {
        assert_eq!(smul_high(0x10, 0x10, 8), 0x01);
        assert_eq!(smul_high(-1, 1, 8), 0xff);
        assert_eq!(umul_high(u64::MAX, 2, 64), 1);
        assert_eq!(smul_high(i64::MIN, i64::MIN, 64), 1 << 62);
    }

    #[test]
    fn numeric_formatter() {
        let fmt = |value, is_signed, num_bits| {
            NumericFormatter { value, is_signed, num_bits }.to_string()
        };
        assert_eq!(fmt(0xff, false, 8), "0xff:8");
        assert_eq!(fmt(0xff, true, 8), "-0x1:8");
        assert_eq!(fmt(0x10, true, 8), "0x10:8");
    }
}
