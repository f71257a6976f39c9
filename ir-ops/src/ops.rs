use crate::{display::ExprDisplay, Error};

/// Identifies an operator of the IR. `Invalid` and `Max` are reserved: every value strictly
/// between them names exactly one operator.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorId {
    Invalid = 0,

    // Bitwise modifiers.
    /// `~RHS`
    Not,

    // Basic bitwise operations.
    /// `LHS & RHS`
    And,
    /// `LHS | RHS`
    Or,
    /// `LHS ^ RHS`
    Xor,

    // Distributing bitwise operations.
    /// `LHS >> RHS`
    Shr,
    /// `LHS << RHS`
    Shl,
    /// `LHS >] RHS`
    Rotr,
    /// `LHS [< RHS`
    Rotl,

    // Arithmetic modifiers.
    /// `-RHS`
    Neg,

    // Basic arithmetic operations.
    /// `LHS + RHS`
    Add,
    /// `LHS - RHS`
    Sub,

    // Distributing arithmetic operations.
    /// `HI(LHS * RHS)`
    MulHi,
    /// `LHS * RHS`
    Mul,
    /// `LHS / RHS`
    Div,
    /// `LHS % RHS`
    Rem,

    UMulHi,
    UMul,
    UDiv,
    URem,

    /// `ZX(LHS, RHS)`: zero-extend LHS to RHS bits.
    Zx,
    /// `SX(LHS, RHS)`: sign-extend LHS to RHS bits.
    Sx,
    /// `POPCNT(RHS)`
    Popcnt,
    /// `MSB(LHS)`, or RHS if LHS is zero.
    Msb,
    /// `LSB(LHS)`, or RHS if LHS is zero.
    Lsb,
    /// `(LHS >> RHS) & 1`
    Bt,
    /// `RHS.mask()`
    Mask,
    /// `RHS.bitcount()`
    Bcnt,
    /// `LHS & 1 ? RHS : 0`
    ValueIf,

    /// `LHS >= RHS ? LHS : RHS`
    MaxValue,
    /// `LHS <= RHS ? LHS : RHS`
    MinValue,
    SMaxValue,
    SMinValue,

    Greater,
    GreaterEq,
    Equal,
    NotEqual,
    LessEq,
    Less,

    UGreater,
    UGreaterEq,
    ULessEq,
    ULess,

    Max,
}

impl OperatorId {
    /// Every valid operator, in id order.
    pub const ALL: [OperatorId; OperatorId::Max as usize - 1] = [
        Self::Not,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Shr,
        Self::Shl,
        Self::Rotr,
        Self::Rotl,
        Self::Neg,
        Self::Add,
        Self::Sub,
        Self::MulHi,
        Self::Mul,
        Self::Div,
        Self::Rem,
        Self::UMulHi,
        Self::UMul,
        Self::UDiv,
        Self::URem,
        Self::Zx,
        Self::Sx,
        Self::Popcnt,
        Self::Msb,
        Self::Lsb,
        Self::Bt,
        Self::Mask,
        Self::Bcnt,
        Self::ValueIf,
        Self::MaxValue,
        Self::MinValue,
        Self::SMaxValue,
        Self::SMinValue,
        Self::Greater,
        Self::GreaterEq,
        Self::Equal,
        Self::NotEqual,
        Self::LessEq,
        Self::Less,
        Self::UGreater,
        Self::UGreaterEq,
        Self::ULessEq,
        Self::ULess,
    ];

    /// Iterates over every valid operator.
    pub fn all() -> impl Iterator<Item = OperatorId> {
        Self::ALL.iter().copied()
    }

    #[inline]
    pub fn descriptor(self) -> Option<&'static Descriptor> {
        descriptor_of(self)
    }

    /// Operators whose result is a bit index and therefore always `BIT_INDEX_SIZE` bits wide.
    #[inline]
    pub fn is_bit_index(self) -> bool {
        matches!(self, Self::Popcnt | Self::Msb | Self::Lsb | Self::Bcnt)
    }

    #[inline]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Greater
                | Self::GreaterEq
                | Self::Equal
                | Self::NotEqual
                | Self::LessEq
                | Self::Less
                | Self::UGreater
                | Self::UGreaterEq
                | Self::ULessEq
                | Self::ULess
        )
    }

    /// Operators that produce a single bit.
    #[inline]
    pub fn is_boolean(self) -> bool {
        self.is_comparison() || self == Self::Bt
    }

    /// Operators whose result width is selected by the value of RHS.
    #[inline]
    pub fn is_width_change(self) -> bool {
        matches!(self, Self::Zx | Self::Sx)
    }
}

impl TryFrom<u8> for OperatorId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Err(Error::InvalidOperatorId(value)),
            x => Self::ALL.get(x as usize - 1).copied().ok_or(Error::InvalidOperatorId(value)),
        }
    }
}

impl std::str::FromStr for OperatorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALIASES: &[(&str, OperatorId)] = &[
            ("value_if", OperatorId::ValueIf),
            ("smax", OperatorId::SMaxValue),
            ("smin", OperatorId::SMinValue),
        ];

        if let Some((_, id)) = ALIASES.iter().find(|(name, _)| *name == s) {
            return Ok(*id);
        }
        DESCRIPTORS
            .iter()
            .find(|desc| desc.function_name == s || desc.function_name.trim_start_matches("__") == s)
            .map(|desc| desc.id)
            .ok_or_else(|| Error::UnknownOperator(s.to_owned()))
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.descriptor() {
            Some(desc) => f.write_str(desc.function_name),
            None if *self == Self::Invalid => f.write_str("<invalid>"),
            None => f.write_str("<max>"),
        }
    }
}

/// Static properties of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// The operator described by this entry.
    pub id: OperatorId,

    /// `+1` if bitwise operations are preferred as operands, `-1` if arithmetic, `0` if neutral.
    pub hint_bitwise: i8,

    /// Whether the operator interprets its operands as two's-complement signed values.
    pub is_signed: bool,

    /// Either 1 or 2. Unary operators take their argument from RHS.
    pub operand_count: u8,

    pub is_commutative: bool,

    /// The infix (or prefix, for unary operators) glyph. Operators without one are printed in
    /// function call form.
    pub symbol: Option<&'static str>,

    pub function_name: &'static str,

    /// The operator that associative self-joins collapse under, e.g. `(x >> a) >> b` joins the
    /// shift amounts with `Add`.
    pub join_by: Option<OperatorId>,
}

impl Descriptor {
    #[inline]
    pub fn is_unary(&self) -> bool {
        self.operand_count == 1
    }

    /// Returns a value that formats the application of this operator to `lhs` and `rhs`.
    #[inline]
    pub fn display<L, R>(&self, lhs: L, rhs: R) -> ExprDisplay<'_, L, R> {
        ExprDisplay { desc: self, lhs, rhs }
    }

    /// Renders the application of this operator to the operand strings `lhs` and `rhs`.
    pub fn to_string(&self, lhs: &str, rhs: &str) -> String {
        self.display(lhs, rhs).to_string()
    }
}

const fn desc(
    id: OperatorId,
    hint_bitwise: i8,
    is_signed: bool,
    operand_count: u8,
    is_commutative: bool,
    symbol: Option<&'static str>,
    function_name: &'static str,
    join_by: Option<OperatorId>,
) -> Descriptor {
    Descriptor {
        id,
        hint_bitwise,
        is_signed,
        operand_count,
        is_commutative,
        symbol,
        function_name,
        join_by,
    }
}

use self::OperatorId as Id;

#[rustfmt::skip]
const TABLE: [Descriptor; OperatorId::Max as usize - 1] = [
    //   [Id]             [Bitwise] [Signed] [#Op] [Commutative] [Symbol]       [Name]          [Join by]
    desc(Id::Not,          1,  false,   1,   false,   Some("~"),     "not",         None),
    desc(Id::And,          1,  false,   2,   true,    Some("&"),     "and",         Some(Id::And)),
    desc(Id::Or,           1,  false,   2,   true,    Some("|"),     "or",          Some(Id::Or)),
    desc(Id::Xor,          1,  false,   2,   true,    Some("^"),     "xor",         Some(Id::Xor)),
    desc(Id::Shr,          1,  false,   2,   false,   Some(">>"),    "shr",         Some(Id::Add)),
    desc(Id::Shl,          1,  false,   2,   false,   Some("<<"),    "shl",         Some(Id::Add)),
    desc(Id::Rotr,         1,  false,   2,   false,   Some(">]"),    "rotr",        Some(Id::Add)),
    desc(Id::Rotl,         1,  false,   2,   false,   Some("[<"),    "rotl",        Some(Id::Add)),
    desc(Id::Neg,         -1,  true,    1,   false,   Some("-"),     "neg",         None),
    desc(Id::Add,         -1,  true,    2,   true,    Some("+"),     "add",         Some(Id::Add)),
    desc(Id::Sub,         -1,  true,    2,   false,   Some("-"),     "sub",         Some(Id::Add)),
    desc(Id::MulHi,       -1,  true,    2,   true,    Some("h*"),    "mulhi",       None),
    desc(Id::Mul,         -1,  true,    2,   true,    Some("*"),     "mul",         Some(Id::Mul)),
    desc(Id::Div,         -1,  true,    2,   false,   Some("/"),     "div",         Some(Id::Mul)),
    desc(Id::Rem,         -1,  true,    2,   false,   Some("%"),     "rem",         None),
    desc(Id::UMulHi,      -1,  false,   2,   true,    Some("uh*"),   "umulhi",      None),
    desc(Id::UMul,        -1,  false,   2,   true,    Some("u*"),    "umul",        Some(Id::UMul)),
    desc(Id::UDiv,        -1,  false,   2,   false,   Some("u/"),    "udiv",        Some(Id::UMul)),
    desc(Id::URem,        -1,  false,   2,   false,   Some("u%"),    "urem",        None),
    desc(Id::Zx,           0,  false,   2,   false,   None,          "__zx",        None),
    desc(Id::Sx,          -1,  true,    2,   false,   None,          "__sx",        None),
    desc(Id::Popcnt,       1,  false,   1,   false,   None,          "__popcnt",    None),
    desc(Id::Msb,          1,  false,   2,   false,   None,          "__msb",       None),
    desc(Id::Lsb,          1,  false,   2,   false,   None,          "__lsb",       None),
    desc(Id::Bt,           1,  false,   2,   false,   None,          "__bt",        None),
    desc(Id::Mask,         1,  false,   1,   false,   None,          "__mask",      None),
    desc(Id::Bcnt,         1,  false,   1,   false,   None,          "__bcnt",      None),
    desc(Id::ValueIf,      0,  false,   2,   false,   Some("?"),     "if",          None),
    desc(Id::MaxValue,     0,  false,   2,   false,   None,          "max",         Some(Id::MaxValue)),
    desc(Id::MinValue,     0,  false,   2,   false,   None,          "min",         Some(Id::MinValue)),
    desc(Id::SMaxValue,    0,  true,    2,   false,   None,          "max_sgn",     Some(Id::SMaxValue)),
    desc(Id::SMinValue,    0,  true,    2,   false,   None,          "min_sgn",     Some(Id::SMinValue)),
    desc(Id::Greater,     -1,  true,    2,   false,   Some(">"),     "greater",     None),
    desc(Id::GreaterEq,   -1,  true,    2,   false,   Some(">="),    "greater_eq",  None),
    desc(Id::Equal,        0,  false,   2,   false,   Some("=="),    "equal",       None),
    desc(Id::NotEqual,     0,  false,   2,   false,   Some("!="),    "not_equal",   None),
    desc(Id::LessEq,      -1,  true,    2,   false,   Some("<="),    "less_eq",     None),
    desc(Id::Less,        -1,  true,    2,   false,   Some("<"),     "less",        None),
    desc(Id::UGreater,     0,  false,   2,   false,   Some("u>"),    "ugreater",    None),
    desc(Id::UGreaterEq,   0,  false,   2,   false,   Some("u>="),   "ugreater_eq", None),
    desc(Id::ULessEq,      0,  false,   2,   false,   Some("u<="),   "uless_eq",    None),
    desc(Id::ULess,        0,  false,   2,   false,   Some("u<"),    "uless",       None),
];

/// Descriptors of every valid operator, indexed by `id - 1`.
pub static DESCRIPTORS: [Descriptor; OperatorId::Max as usize - 1] = TABLE;

// The table must stay dense and in id order for `descriptor_of` to be a plain index.
const _: () = {
    assert!(TABLE.len() == OperatorId::Max as usize - 1);
    let mut i = 0;
    while i < TABLE.len() {
        assert!(TABLE[i].id as usize == i + 1);
        assert!(OperatorId::ALL[i] as usize == i + 1);
        i += 1;
    }
};

/// Returns the descriptor of `id`, or `None` for the reserved `Invalid` and `Max` ids.
#[inline]
pub fn descriptor_of(id: OperatorId) -> Option<&'static Descriptor> {
    match id {
        OperatorId::Invalid | OperatorId::Max => None,
        id => DESCRIPTORS.get(id as usize - 1),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_is_dense() {
        assert!(descriptor_of(OperatorId::Invalid).is_none());
        assert!(descriptor_of(OperatorId::Max).is_none());
        for id in OperatorId::all() {
            let desc = descriptor_of(id).unwrap();
            assert_eq!(desc.id, id);
            assert!(desc.operand_count == 1 || desc.operand_count == 2, "{id}");
            assert!((-1..=1).contains(&desc.hint_bitwise), "{id}");
        }
        assert_eq!(OperatorId::all().count(), OperatorId::Max as usize - 1);
    }

    #[test]
    fn raw_ids() {
        assert_eq!(OperatorId::try_from(0), Err(Error::InvalidOperatorId(0)));
        assert_eq!(OperatorId::try_from(1), Ok(OperatorId::Not));
        assert_eq!(OperatorId::try_from(OperatorId::ULess as u8), Ok(OperatorId::ULess));
        let max = OperatorId::Max as u8;
        assert_eq!(OperatorId::try_from(max), Err(Error::InvalidOperatorId(max)));
        assert_eq!(OperatorId::try_from(255), Err(Error::InvalidOperatorId(255)));
    }

    #[test]
    fn parse_names() {
        for id in OperatorId::all() {
            assert_eq!(id.to_string().parse::<OperatorId>(), Ok(id));
        }
        assert_eq!("zx".parse::<OperatorId>(), Ok(OperatorId::Zx));
        assert_eq!("value_if".parse::<OperatorId>(), Ok(OperatorId::ValueIf));
        assert_eq!("smin".parse::<OperatorId>(), Ok(OperatorId::SMinValue));
        assert_eq!("frob".parse::<OperatorId>(), Err(Error::UnknownOperator("frob".into())));
    }

    #[test]
    fn join_operators() {
        let join = |id: OperatorId| id.descriptor().unwrap().join_by;
        assert_eq!(join(OperatorId::Add), Some(OperatorId::Add));
        assert_eq!(join(OperatorId::Shr), Some(OperatorId::Add));
        assert_eq!(join(OperatorId::Div), Some(OperatorId::Mul));
        assert_eq!(join(OperatorId::UDiv), Some(OperatorId::UMul));
        assert_eq!(join(OperatorId::Rem), None);
        assert_eq!(join(OperatorId::Equal), None);
    }

    #[test]
    fn classification() {
        assert!(OperatorId::Bcnt.is_bit_index());
        assert!(!OperatorId::Mask.is_bit_index());
        assert!(OperatorId::Bt.is_boolean());
        assert!(OperatorId::ULess.is_comparison());
        assert!(!OperatorId::Bt.is_comparison());
        assert!(OperatorId::Sx.is_width_change());
    }
}
