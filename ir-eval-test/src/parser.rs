//! Parser for test vectors
//!
//! Each test case is a single statement of the form:
//!
//! ```text
//! [@skip] <operator> <operand>, <operand> => <operand>;
//! ```
//!
//! where an operand is either `<value>:<width>` (e.g. `0xff:8`, `-1:16`), a bit pattern written
//! most significant bit first with `x` marking unknown bits (e.g. `0b1x0x_0000`), or `_` for an
//! operand that the operator does not read.

use std::{iter::Peekable, str::CharIndices};

use anyhow::Context;
use ir_eval::{BitVector, OperatorId};

use crate::{Operand, TestCase};

#[derive(Copy, Clone, Debug)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum TokenKind {
    /// `// comment`
    Comment,

    /// ` `
    Whitespace,

    /// `\r\n`, `\n`, `\r`
    Line,

    /// ':'
    Colon,
    /// ';'
    Semicolon,
    /// '=>'
    RightArrow,
    /// ','
    Comma,

    /// '-'
    Minus,

    /// `_`
    Placeholder,

    /// `0x123abc`
    HexNum,
    /// `1234`
    Num,
    /// `0b10x1`
    Bits,
    /// `Ident`
    Ident,

    /// `@skip` annotation
    Skip,

    /// Represents the end of the input
    Eof,

    /// Unknown or invalid token
    Unknown,
}

struct Lexer<'a> {
    /// The original input string
    input: &'a str,

    /// An iterator over the characters in the input string with their associated indices
    chars: Peekable<CharIndices<'a>>,

    /// The last token peeked from the lexer
    peeked: Option<Token>,

    /// The offset of the start of the token
    token_start: usize,

    /// The offset of the most recent character processed
    prev: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, chars: input.char_indices().peekable(), peeked: None, token_start: 0, prev: 0 }
    }

    /// Gets the span associated with the current token
    fn current_span(&self) -> std::ops::RangeInclusive<usize> {
        self.token_start..=self.prev
    }

    /// Create a new token
    fn create_token(&self, kind: TokenKind) -> Token {
        let span = self.current_span();
        Token { kind, start: *span.start(), end: *span.end() }
    }

    /// Gets the char from the input stream, updating the lexer's metadata that is used for keeping
    /// track of the next span
    fn bump(&mut self) -> Option<char> {
        let (offset, val) = self.chars.next()?;
        self.prev = offset;
        Some(val)
    }

    /// Peeks at the next char to be processed
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|x| x.1)
    }

    /// Bumps the current offset if the character matches `value`. Returns `true` on a match
    fn bump_if(&mut self, value: char) -> bool {
        match self.peek_char() {
            Some(x) if x == value => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Eat the end of a line, correctly handling different line endings
    fn bump_line_end(&mut self) {
        self.bump_if('\r');
        self.bump_if('\n');
    }

    /// Skip characters while `predicate` is true
    fn bump_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(next) = self.peek_char() {
            if !predicate(next) {
                break;
            }
            self.bump();
        }
    }

    fn peek(&mut self) -> Option<Token> {
        if self.peeked.is_some() {
            return self.peeked;
        }
        self.peeked = self.next();
        self.peeked
    }

    fn next(&mut self) -> Option<Token> {
        const HEX_CHARS: &str = "abcdefABCDEF0123456789_";
        const DEC_CHARS: &str = "0123456789_";
        const BIT_CHARS: &str = "01xX_";

        const fn is_ident_char(c: char) -> bool {
            matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
        }

        macro_rules! symbol {
            ($kind:expr) => {{
                self.bump();
                Some(self.create_token($kind))
            }};
        }

        if let Some(token) = self.peeked.take() {
            return Some(token);
        }

        let &(offset, value) = self.chars.peek()?;
        self.token_start = offset;

        match value {
            '\r' | '\n' => {
                self.bump_line_end();
                Some(self.create_token(TokenKind::Line))
            }

            c if c.is_whitespace() => {
                self.bump_while(|c| c.is_whitespace() && c != '\r' && c != '\n');
                Some(self.create_token(TokenKind::Whitespace))
            }

            '/' => {
                self.bump();
                if !self.bump_if('/') {
                    return Some(self.create_token(TokenKind::Unknown));
                }
                self.bump_while(|c| c != '\n' && c != '\r');
                Some(self.create_token(TokenKind::Comment))
            }

            ':' => symbol!(TokenKind::Colon),
            ';' => symbol!(TokenKind::Semicolon),
            '=' => {
                self.bump();
                match self.bump_if('>') {
                    true => Some(self.create_token(TokenKind::RightArrow)),
                    false => Some(self.create_token(TokenKind::Unknown)),
                }
            }
            ',' => symbol!(TokenKind::Comma),
            '-' => symbol!(TokenKind::Minus),

            // A lone underscore is a placeholder, otherwise it starts an identifier (`__zx`).
            '_' => {
                self.bump();
                match self.peek_char().map_or(false, is_ident_char) {
                    true => {
                        self.bump_while(is_ident_char);
                        Some(self.create_token(TokenKind::Ident))
                    }
                    false => Some(self.create_token(TokenKind::Placeholder)),
                }
            }

            c if DEC_CHARS.contains(c) => {
                self.bump();

                // Check whether this is a hex literal or a bit pattern
                if self.bump_if('x') {
                    let start = self.prev + 1;
                    self.bump_while(|c| HEX_CHARS.contains(c));
                    return Some(Token { kind: TokenKind::HexNum, start, end: self.prev });
                }
                if self.bump_if('b') {
                    let start = self.prev + 1;
                    self.bump_while(|c| BIT_CHARS.contains(c));
                    return Some(Token { kind: TokenKind::Bits, start, end: self.prev });
                }

                self.bump_while(|c| DEC_CHARS.contains(c));
                Some(self.create_token(TokenKind::Num))
            }

            '@' => {
                self.bump();
                self.bump_while(is_ident_char);
                match &self.input[self.current_span()] {
                    "@skip" => Some(self.create_token(TokenKind::Skip)),
                    _ => Some(self.create_token(TokenKind::Unknown)),
                }
            }
            'a'..='z' | 'A'..='Z' => {
                self.bump_while(is_ident_char);
                Some(self.create_token(TokenKind::Ident))
            }

            _ => {
                self.bump();
                Some(self.create_token(TokenKind::Unknown))
            }
        }
    }
}

fn trim_leading_zeros(input: &str) -> &str {
    let trimmed = input.trim_start_matches('0');

    // If input was non-empty, and now is empty then the input must be entirely zeros. The
    // last zero is significant, so just return the literal '0'
    if !input.is_empty() && trimmed.is_empty() {
        return "0";
    }

    trimmed
}

/// Parses a single operand, e.g. from the command line.
pub fn parse_operand(input: &str) -> anyhow::Result<Operand> {
    let mut parser = Parser::new(input);
    let operand = parser.parse_operand()?;
    if parser.peek_token(true).is_some() {
        parser.expect(TokenKind::Eof)?;
    }
    Ok(operand)
}

pub struct Parser<'a> {
    pub lines: Vec<usize>,
    input: &'a str,
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, lexer: Lexer::new(input), lines: vec![] }
    }

    pub fn parse_next(&mut self) -> Option<anyhow::Result<TestCase>> {
        self.peek_token(true)?;
        Some(self.parse_test_case())
    }

    /// Parse a full test case
    fn parse_test_case(&mut self) -> anyhow::Result<TestCase> {
        let skip = self.peek_token(true).map_or(false, |tok| tok.kind == TokenKind::Skip);
        if skip {
            self.bump();
        }

        let start_line = self.current_line();
        let op = self.parse_operator().context("parsing operator")?;
        let lhs = self.parse_operand().context("parsing lhs")?;
        self.expect(TokenKind::Comma)?;
        let rhs = self.parse_operand().context("parsing rhs")?;
        self.expect(TokenKind::RightArrow)?;
        let expected = self.parse_operand().context("parsing expected result")?;
        self.expect(TokenKind::Semicolon)?;

        Ok(TestCase { start_line, op, lhs, rhs, expected, skip })
    }

    fn parse_operator(&mut self) -> anyhow::Result<OperatorId> {
        let token = self.expect(TokenKind::Ident)?;
        self.token_str(token).parse().map_err(|e: ir_ops::Error| {
            self.error(&e.to_string(), token.start, token.end)
        })
    }

    fn parse_operand(&mut self) -> anyhow::Result<Operand> {
        match self.peek_token(true).map(|x| x.kind) {
            Some(TokenKind::Placeholder) => {
                self.bump();
                Ok(Operand::Unused)
            }
            Some(TokenKind::Bits) => {
                let token = self.expect(TokenKind::Bits)?;
                self.parse_bits(token).map(Operand::Bits)
            }
            _ => {
                let value = self.parse_value()?;
                self.expect(TokenKind::Colon)?;
                let token = self.peek_token(true);
                let width: u64 = self.parse_num()?;
                let width = ir_ops::checked_bit_count(width).map_err(|e| match token {
                    Some(token) => self.error(&e.to_string(), token.start, token.end),
                    None => e.into(),
                })?;
                Ok(Operand::Known { value: value & ir_ops::mask(width), width })
            }
        }
    }

    /// Parses a bit pattern (e.g. `0b1x0x`), most significant bit first
    fn parse_bits(&mut self, token: Token) -> anyhow::Result<BitVector> {
        let digits: Vec<char> = self.token_str(token).chars().filter(|c| *c != '_').collect();
        if digits.is_empty() || digits.len() > 64 {
            return Err(self.error("bit patterns must have 1 to 64 digits", token.start, token.end));
        }

        let (mut known, mut value) = (0_u64, 0_u64);
        for (i, c) in digits.iter().rev().enumerate() {
            match c {
                '0' => known |= 1 << i,
                '1' => {
                    known |= 1 << i;
                    value |= 1 << i;
                }
                _ => {}
            }
        }
        Ok(BitVector::from_bits(known, value, digits.len() as u8))
    }

    /// Parses a (possibly negative) value, negative values are stored in two's complement.
    fn parse_value(&mut self) -> anyhow::Result<u64> {
        let has_minus = self.peek_token(true).map_or(false, |tok| tok.kind == TokenKind::Minus);
        if has_minus {
            self.bump();
        }
        let value: u64 = self.parse_num()?;
        Ok(if has_minus { value.wrapping_neg() } else { value })
    }

    fn parse_num<T>(&mut self) -> anyhow::Result<T>
    where
        T: TryFrom<u128>,
    {
        let token = self.expect_any(&[TokenKind::HexNum, TokenKind::Num])?;
        let value = self.token_str(token).replace('_', "");
        let result = match token.kind {
            TokenKind::HexNum => u128::from_str_radix(trim_leading_zeros(&value), 16),
            TokenKind::Num => value.parse(),
            _ => unreachable!(),
        };
        let value = result.map_err(|e| self.error(&e.to_string(), token.start, token.end))?;
        T::try_from(value).map_err(|_| self.error("value too large", token.start, token.end))
    }

    /// Get the current line number
    pub fn current_line(&self) -> usize {
        self.lines.len() + 1
    }

    /// Given the character offset compute the column and line offset
    fn compute_offset(&self, char_offset: usize) -> (usize, usize) {
        match self.lines.binary_search(&char_offset) {
            Err(0) => (1, char_offset + 1),
            Err(x) => (x + 1, char_offset - self.lines[x - 1]),
            Ok(x) => (x + 1, 1),
        }
    }

    /// Create a new error message spanning from `start` to `end`
    fn error(&self, msg: &str, start: usize, end: usize) -> anyhow::Error {
        let (line, col) = self.compute_offset(start);
        let (end_line, _) = self.compute_offset(end);
        if line == end_line {
            let line_str = &self.input.get(start..=end).unwrap_or("EOF");
            anyhow::format_err!("{line}:{col} \"{}\": {msg}", line_str.as_bytes().escape_ascii())
        }
        else {
            anyhow::format_err!("{line}:{col} {msg}")
        }
    }

    fn expect(&mut self, expected: TokenKind) -> anyhow::Result<Token> {
        self.expect_any(&[expected])
    }

    fn expect_any(&mut self, expected: &[TokenKind]) -> anyhow::Result<Token> {
        let token = self.peek_token(true).unwrap_or(Token {
            kind: TokenKind::Eof,
            start: self.lexer.prev + 1,
            end: self.lexer.prev + 1,
        });
        if !expected.contains(&token.kind) {
            let err = format!("unexpected token `{:?}` (expected: {:?})", token.kind, expected);
            return Err(self.error(&err, token.start, token.end));
        }
        self.bump();
        Ok(token)
    }

    fn bump(&mut self) {
        self.lexer.next();
    }

    fn peek_token(&mut self, skip_whitespace: bool) -> Option<Token> {
        loop {
            let next = self.lexer.peek()?;
            match next.kind {
                TokenKind::Comment | TokenKind::Whitespace => {}
                TokenKind::Line => self.lines.push(next.end),
                _ => return Some(next),
            }
            if !skip_whitespace {
                return Some(next);
            }
            self.bump();
        }
    }

    fn token_str(&self, token: Token) -> &'a str {
        &self.input[token.start..=token.end]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_all(input: &str) -> Vec<TestCase> {
        let mut parser = Parser::new(input);
        let mut cases = vec![];
        while let Some(case) = parser.parse_next() {
            cases.push(case.unwrap());
        }
        cases
    }

    #[test]
    fn parse_cases() {
        let cases = parse_all(
            "// header\n\
             add 0xff:8, 1:8 => 0x0:8;\n\
             @skip __popcnt _, 0xf0f0:16 => 8:8; // trailing\n\
             and 0bxxxx_xxxx, 0:8 => 0b0000_0000;\n",
        );
        assert_eq!(cases.len(), 3);

        assert_eq!(cases[0].op, OperatorId::Add);
        assert_eq!(cases[0].lhs, Operand::Known { value: 0xff, width: 8 });
        assert_eq!(cases[0].start_line, 2);
        assert!(!cases[0].skip);

        assert_eq!(cases[1].op, OperatorId::Popcnt);
        assert_eq!(cases[1].lhs, Operand::Unused);
        assert!(cases[1].skip);

        assert_eq!(cases[2].lhs, Operand::Bits(BitVector::unknown(8)));
        assert_eq!(cases[2].expected, Operand::Bits(BitVector::zero(8)));
    }

    #[test]
    fn parse_operands() {
        assert_eq!(parse_operand("-1:16").unwrap(), Operand::Known { value: 0xffff, width: 16 });
        assert_eq!(
            parse_operand("0b1x0").unwrap(),
            Operand::Bits(BitVector::from_bits(0b101, 0b100, 3))
        );
        assert!(parse_operand("1:0").is_err());
        assert!(parse_operand("1:65").is_err());
        assert!(parse_operand("0b").is_err());
        assert!(parse_operand("1:8 2").is_err());
    }

    #[test]
    fn errors_report_location() {
        let mut parser = Parser::new("add 1:8, 1:8\nfrob 1:8, 1:8 => 0:8;");
        let err = parser.parse_next().unwrap().unwrap_err();
        assert!(format!("{err:#}").contains("2:1"), "{err:#}");
    }
}
