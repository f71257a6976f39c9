use ir_ops::{clamp_bit_count, round_bit_count, OperatorId, BIT_INDEX_SIZE};

/// Calculates the width of the result of applying `id` to operands of `bcnt_lhs` and `bcnt_rhs`
/// bits.
///
/// `Zx` and `Sx` take their target width from the value of RHS. Callers asking for their size
/// without evaluating them pass the target through `bcnt_rhs`, or use [extension_size].
pub fn result_size(id: OperatorId, bcnt_lhs: u8, bcnt_rhs: u8) -> u8 {
    use ir_ops::OperatorId as Op;

    match id {
        _ if id.is_bit_index() => BIT_INDEX_SIZE,
        _ if id.is_boolean() => 1,
        Op::Zx | Op::Sx | Op::Not | Op::Neg | Op::Mask | Op::ValueIf => round_bit_count(bcnt_rhs),
        _ => round_bit_count(bcnt_lhs.max(bcnt_rhs)),
    }
}

/// The width of the result of `Zx` or `Sx` when asked to extend to `target` bits.
#[inline]
pub fn extension_size(target: u64) -> u8 {
    round_bit_count(clamp_bit_count(target))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_sizes() {
        for id in [OperatorId::Popcnt, OperatorId::Msb, OperatorId::Lsb, OperatorId::Bcnt] {
            assert_eq!(result_size(id, 64, 64), BIT_INDEX_SIZE);
            assert_eq!(result_size(id, 1, 1), BIT_INDEX_SIZE);
        }
        for id in OperatorId::all().filter(|id| id.is_comparison()) {
            assert_eq!(result_size(id, 32, 64), 1, "{id}");
        }
        assert_eq!(result_size(OperatorId::Bt, 64, 8), 1);
    }

    #[test]
    fn unary_sizes_follow_rhs() {
        assert_eq!(result_size(OperatorId::Not, 64, 5), 8);
        assert_eq!(result_size(OperatorId::Neg, 0, 17), 32);
        assert_eq!(result_size(OperatorId::Mask, 64, 1), 1);
        assert_eq!(result_size(OperatorId::ValueIf, 1, 16), 16);
        assert_eq!(result_size(OperatorId::Zx, 8, 32), 32);
    }

    #[test]
    fn binary_sizes_round_the_widest_operand() {
        assert_eq!(result_size(OperatorId::Add, 8, 8), 8);
        assert_eq!(result_size(OperatorId::Add, 3, 12), 16);
        assert_eq!(result_size(OperatorId::Shl, 33, 8), 64);
        assert_eq!(result_size(OperatorId::And, 1, 1), 1);
    }

    #[test]
    fn extension_sizes() {
        assert_eq!(extension_size(0), 1);
        assert_eq!(extension_size(12), 16);
        assert_eq!(extension_size(64), 64);
        assert_eq!(extension_size(1000), 64);
    }
}
