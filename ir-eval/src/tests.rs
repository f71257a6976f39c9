use ir_ops::mask;

use crate::{
    descriptor_of, evaluate, evaluate_partial, result_size, BitVector, Config, Evaluator, OperatorId,
};

const WIDTHS: [u8; 5] = [1, 8, 16, 32, 64];

fn pick_op(index: u8) -> OperatorId {
    OperatorId::ALL[index as usize % OperatorId::ALL.len()]
}

fn pick_widths(index: u8) -> (u8, u8) {
    (WIDTHS[index as usize % 5], WIDTHS[(index as usize / 5) % 5])
}

/// Checks that every bit `out` claims to know matches `value`.
fn agrees(out: &BitVector, value: u64) -> bool {
    (value ^ out.value()) & out.known_mask() == 0
}

#[test]
fn scenarios() {
    assert_eq!(evaluate(OperatorId::Add, 8, 0xff, 8, 1), (0x00, 8));
    assert_eq!(evaluate(OperatorId::MulHi, 8, 0x10, 8, 0x10), (0x01, 8));
    assert_eq!(evaluate(OperatorId::UMulHi, 64, u64::MAX, 64, 2), (1, 64));
    assert_eq!(evaluate(OperatorId::Shr, 32, 0x8000_0000, 32, 31), (1, 32));
    assert_eq!(evaluate(OperatorId::Sx, 8, 0xff, 8, 32), (0xffff_ffff, 32));
    assert_eq!(evaluate(OperatorId::Popcnt, 0, 0, 16, 0xf0f0), (8, 8));
    assert_eq!(evaluate(OperatorId::Msb, 16, 0x0040, 8, 99), (6, 8));
    assert_eq!(evaluate(OperatorId::Msb, 16, 0x0000, 8, 99), (99, 8));
    assert_eq!(evaluate(OperatorId::UDiv, 8, 10, 8, 0), (0, 8));
}

#[test]
fn partial_scenarios() {
    let out = evaluate_partial(OperatorId::And, &BitVector::unknown(8), &BitVector::known(0, 8));
    assert!(out.is_fully_known());
    assert_eq!((out.value(), out.width()), (0, 8));

    let out = evaluate_partial(OperatorId::Or, &BitVector::unknown(8), &BitVector::known(0xff, 8));
    assert!(out.is_fully_known());
    assert_eq!((out.value(), out.width()), (0xff, 8));

    let out = evaluate_partial(OperatorId::Add, &BitVector::known(1, 8), &BitVector::known(1, 8));
    assert!(out.is_fully_known());
    assert_eq!((out.value(), out.width()), (2, 8));
}

#[test]
fn ill_defined_results_are_zero() {
    assert_eq!(evaluate(OperatorId::Div, 32, 7, 32, 0), (0, 32));
    assert_eq!(evaluate(OperatorId::Rem, 32, 7, 32, 0), (0, 32));
    assert_eq!(evaluate(OperatorId::URem, 16, 7, 16, 0), (0, 16));
    assert_eq!(evaluate(OperatorId::Div, 32, 0x8000_0000, 32, 0xffff_ffff), (0, 32));
    assert_eq!(evaluate(OperatorId::Invalid, 32, 1, 32, 1), (0, 32));

    let out = evaluate_partial(OperatorId::URem, &BitVector::unknown(8), &BitVector::zero(8));
    assert_eq!(out, BitVector::unknown(8));
}

#[test]
fn width_saturation() {
    // LHS saturates to 1 bit (so the operand is -1), RHS to 64 bits.
    assert_eq!(evaluate(OperatorId::Add, 0, 1, 200, 1), (0, 64));
    assert_eq!(result_size(OperatorId::Add, 0, 0), 1);
}

#[test]
fn strict_widths_ignore_unread_operands() {
    let eval = Evaluator::new(Config::strict());
    assert_eq!(eval.evaluate(OperatorId::Popcnt, 0, 0, 16, 0xf0f0), (8, 8));
    assert_eq!(eval.evaluate(OperatorId::Not, 0, 0, 8, 0x0f), (0xf0, 8));
}

#[test]
#[should_panic(expected = "invalid operand width")]
fn strict_widths_reject_zero() {
    Evaluator::new(Config::strict()).evaluate(OperatorId::Add, 0, 1, 8, 1);
}

#[test]
#[should_panic(expected = "invalid operand width")]
fn strict_widths_reject_zero_in_partial_operands() {
    let eval = Evaluator::new(Config::strict());
    eval.evaluate_partial(OperatorId::Add, &BitVector::known(1, 0), &BitVector::known(1, 8));
}

#[test]
fn strict_widths_ignore_unread_partial_operands() {
    let eval = Evaluator::new(Config::strict());
    let lhs = BitVector::unknown(0);
    let out = eval.evaluate_partial(OperatorId::Not, &lhs, &BitVector::known(0x0f, 8));
    assert_eq!(out, BitVector::known(0xf0, 8));
}

#[test]
fn partial_width_saturation_matches_concrete() {
    let lhs = BitVector::known(1, 0);
    let rhs = BitVector::known(1, 200);
    assert_eq!(lhs.declared_width(), 0);
    assert_eq!(lhs.width(), 1);

    let out = evaluate_partial(OperatorId::Add, &lhs, &rhs);
    assert_eq!(out, BitVector::known(0, 64));
    assert_eq!(evaluate(OperatorId::Add, 0, 1, 200, 1), (0, 64));
}

#[test]
fn catalog_density() {
    assert!(descriptor_of(OperatorId::Invalid).is_none());
    assert!(descriptor_of(OperatorId::Max).is_none());
    for raw in 1..OperatorId::Max as u8 {
        let id = OperatorId::try_from(raw).unwrap();
        assert_eq!(descriptor_of(id).map(|desc| desc.id), Some(id));
    }
}

#[test]
fn results_are_masked_to_rounded_widths() {
    fn check(op: u8, widths: u8, lhs: u64, rhs: u64) -> bool {
        let (l, r) = pick_widths(widths);
        let (value, width) = evaluate(pick_op(op), l, lhs, r, rhs);
        WIDTHS.contains(&width) && value == value & mask(width)
    }
    quickcheck::quickcheck(check as fn(u8, u8, u64, u64) -> bool)
}

#[test]
fn commutative_operators() {
    fn check(op: u8, widths: u8, a: u64, b: u64) -> bool {
        let id = pick_op(op);
        let (w, _) = pick_widths(widths);
        match descriptor_of(id) {
            Some(desc) if desc.is_commutative => evaluate(id, w, a, w, b) == evaluate(id, w, b, w, a),
            _ => true,
        }
    }
    quickcheck::quickcheck(check as fn(u8, u8, u64, u64) -> bool)
}

#[test]
fn extension_round_trip() {
    fn check(widths: u8, value: u64) -> bool {
        let (w, target) = pick_widths(widths);
        if target < w {
            return true;
        }
        let zx = evaluate(OperatorId::Zx, w, value, 8, target as u64);
        let sx = evaluate(OperatorId::Sx, w, value, 8, target as u64);
        zx.1 == target
            && sx.1 == target
            && zx.0 & mask(w) == value & mask(w)
            && sx.0 & mask(w) == value & mask(w)
    }
    quickcheck::quickcheck(check as fn(u8, u64) -> bool)
}

#[test]
fn rotation_inverse() {
    fn check(widths: u8, value: u64, amount: u8) -> bool {
        let (w, _) = pick_widths(widths);
        let (rotated, _) = evaluate(OperatorId::Rotr, w, value, 8, amount as u64);
        let (restored, _) = evaluate(OperatorId::Rotl, w, rotated, 8, amount as u64);
        restored == value & mask(w)
    }
    assert!(check(5, 0x8000_0000_0000_0001, 1));
    quickcheck::quickcheck(check as fn(u8, u64, u8) -> bool)
}

#[test]
fn partial_matches_concrete_on_known_operands() {
    fn check(op: u8, widths: u8, lhs: u64, rhs: u64) -> bool {
        let id = pick_op(op);
        let (l, r) = pick_widths(widths);
        let out = evaluate_partial(id, &BitVector::known(lhs, l), &BitVector::known(rhs, r));
        out.get_const().map(|x| (x, out.width())) == Some(evaluate(id, l, lhs, r, rhs))
    }
    quickcheck::quickcheck(check as fn(u8, u8, u64, u64) -> bool)
}

#[test]
fn partial_is_sound() {
    fn check(
        op: u8,
        widths: u8,
        lhs_known: u64,
        lhs_value: u64,
        lhs_fill: u64,
        rhs_known: u64,
        rhs_value: u64,
        rhs_fill: u64,
    ) -> bool {
        let id = pick_op(op);
        let (l, r) = pick_widths(widths);
        let lhs = BitVector::from_bits(lhs_known, lhs_value, l);
        let rhs = BitVector::from_bits(rhs_known, rhs_value, r);

        let out = evaluate_partial(id, &lhs, &rhs);
        let a = lhs.value() | (lhs_fill & lhs.unknown_mask());
        let b = rhs.value() | (rhs_fill & rhs.unknown_mask());
        let (value, _) = evaluate(id, l, a, r, b);

        out.known_mask() & !mask(out.width()) == 0 && agrees(&out, value)
    }
    quickcheck::quickcheck(check as fn(u8, u8, u64, u64, u64, u64, u64, u64) -> bool)
}

/// Exhaustively checks every assignment of a few unknown bits, which random masks rarely reach.
#[test]
fn partial_is_sound_with_few_unknowns() {
    let patterns: &[(u64, u64)] = &[
        (0xfe, 0x00),
        (0xfe, 0x80),
        (0x7f, 0x01),
        (0xf3, 0x40),
        (0xfc, 0xfc),
        (0x3f, 0x00),
        (0xef, 0x05),
        (0xff, 0x00),
        (0xff, 0x03),
        (0xff, 0x10),
    ];

    for id in OperatorId::all() {
        for &(lk, lv) in patterns {
            for &(rk, rv) in patterns {
                let lhs = BitVector::from_bits(lk, lv, 8);
                let rhs = BitVector::from_bits(rk, rv, 8);
                let out = evaluate_partial(id, &lhs, &rhs);

                for fill_a in 0..=0xff {
                    let a = lhs.value() | (fill_a & lhs.unknown_mask());
                    for fill_b in [0x00, 0x01, 0x40, 0x80, 0xc3, 0xff] {
                        let b = rhs.value() | (fill_b & rhs.unknown_mask());
                        let (value, _) = evaluate(id, 8, a, 8, b);
                        assert!(
                            agrees(&out, value),
                            "{id}({lhs:?}, {rhs:?}) = {out:?}, but {id}({a:#x}, {b:#x}) = {value:#x}"
                        );
                    }
                }
            }
        }
    }
}
