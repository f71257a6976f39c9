use crate::Descriptor;

/// Formats an operator applied to two operands, see [Descriptor::display].
pub struct ExprDisplay<'a, L, R> {
    pub(crate) desc: &'a Descriptor,
    pub(crate) lhs: L,
    pub(crate) rhs: R,
}

impl<'a, L, R> std::fmt::Display for ExprDisplay<'a, L, R>
where
    L: std::fmt::Display,
    R: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (lhs, rhs) = (&self.lhs, &self.rhs);
        let name = self.desc.function_name;

        // Unary operators without a symbol still print LHS, `msb` and `lsb` pass their fallback
        // value through it.
        match (self.desc.operand_count, self.desc.symbol) {
            (1, Some(symbol)) => write!(f, "{symbol}{rhs}"),
            (_, None) => write!(f, "{name}({lhs}, {rhs})"),
            (_, Some(symbol)) => write!(f, "({lhs}{symbol}{rhs})"),
        }
    }
}

impl<'a, L, R> std::fmt::Debug for ExprDisplay<'a, L, R>
where
    L: std::fmt::Display,
    R: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
