use ir_eval::{BitVector, Evaluator, OperatorId};

pub trait Tester {
    /// Evaluates `id` on fully known `(value, width)` operands.
    fn run_concrete(
        &mut self,
        id: OperatorId,
        lhs: (u64, u8),
        rhs: (u64, u8),
    ) -> anyhow::Result<(u64, u8)>;

    /// Evaluates `id` on partially known operands.
    fn run_partial(
        &mut self,
        id: OperatorId,
        lhs: &BitVector,
        rhs: &BitVector,
    ) -> anyhow::Result<BitVector>;
}

impl Tester for Evaluator {
    fn run_concrete(
        &mut self,
        id: OperatorId,
        (lhs, bcnt_lhs): (u64, u8),
        (rhs, bcnt_rhs): (u64, u8),
    ) -> anyhow::Result<(u64, u8)> {
        check_widths(self, id, bcnt_lhs, bcnt_rhs)?;
        let result = self.evaluate(id, bcnt_lhs, lhs, bcnt_rhs, rhs);
        tracing::trace!("{id}({lhs:#0x}:{bcnt_lhs}, {rhs:#0x}:{bcnt_rhs}) = {result:?}");
        Ok(result)
    }

    fn run_partial(
        &mut self,
        id: OperatorId,
        lhs: &BitVector,
        rhs: &BitVector,
    ) -> anyhow::Result<BitVector> {
        check_widths(self, id, lhs.declared_width(), rhs.declared_width())?;
        let result = self.evaluate_partial(id, lhs, rhs);
        tracing::trace!("{id}({lhs:?}, {rhs:?}) = {result:?}");
        Ok(result)
    }
}

/// Reports invalid widths as a test failure instead of letting a strict evaluator panic.
fn check_widths(evaluator: &Evaluator, id: OperatorId, lhs: u8, rhs: u8) -> anyhow::Result<()> {
    if !evaluator.config.strict_widths {
        return Ok(());
    }
    if !id.descriptor().map_or(false, |desc| desc.is_unary()) {
        ir_ops::checked_bit_count(lhs as u64)?;
    }
    ir_ops::checked_bit_count(rhs as u64)?;
    Ok(())
}
