#[derive(Clone, Debug)]
pub struct Config {
    /// Treat operand widths outside of `[1, 64]` as a fatal error instead of saturating them.
    pub strict_widths: bool,
}

impl Config {
    /// A configuration that panics on out-of-range widths.
    pub fn strict() -> Self {
        Self { strict_widths: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { strict_widths: false }
    }
}
