// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Parsed operand text as delivered by the caller's tokenizer.
//!
//! One operand decomposes into an optional prefix (`#`, `@`, `@-`), a core
//! value (register name, numeric literal, or symbol name), and an optional
//! suffix (a trailing `+`, or a shift clause such as `" #2"`). The engine
//! never tokenizes source lines itself.

use crate::error::EngineError;
use crate::symbol_table::SymbolTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOperand {
    pub prefix: String,
    pub value: String,
    pub suffix: String,
}

impl ParsedOperand {
    pub fn new(
        prefix: impl Into<String>,
        value: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            value: value.into(),
            suffix: suffix.into(),
        }
    }

    /// An operand with no prefix or suffix.
    pub fn bare(value: impl Into<String>) -> Self {
        Self::new("", value, "")
    }

    /// A `#`-prefixed immediate operand.
    pub fn immediate(value: impl Into<String>) -> Self {
        Self::new("#", value, "")
    }

    /// Canonical textual rendering of the operand.
    pub fn render(&self) -> String {
        format!("{}{}{}", self.prefix, self.value, self.suffix)
    }

    /// The core value as a numeric literal, if it is one.
    pub fn numeric(&self) -> Option<u64> {
        parse_number(&self.value)
    }

    /// Numeric value of the operand core: either a literal or a symbol.
    ///
    /// Symbol lookups autogenerate a referenced-undefined entry when the
    /// name is absent, so a forward reference resolves to the placeholder
    /// value 0 mid-pass and to the real address on the next pass.
    pub fn resolve(&self, symbols: &mut SymbolTable) -> Result<u64, EngineError> {
        if let Some(value) = self.numeric() {
            return Ok(value);
        }
        Ok(symbols.reference(&self.value).value)
    }
}

/// Parse a numeric literal: `0x`/`$` hex, `0b`/`%` binary, else decimal.
pub fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(hex) = text.strip_prefix('$') {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).ok();
    }
    if let Some(bin) = text.strip_prefix('%') {
        return u64::from_str_radix(bin, 2).ok();
    }
    text.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_radixes() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0x2A"), Some(42));
        assert_eq!(parse_number("$2a"), Some(42));
        assert_eq!(parse_number("0b101010"), Some(42));
        assert_eq!(parse_number("%101010"), Some(42));
        assert_eq!(parse_number("r2"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn render_joins_affixes() {
        let op = ParsedOperand::new("@-", "er3", "");
        assert_eq!(op.render(), "@-er3");
        let op = ParsedOperand::new("@", "er3", "+");
        assert_eq!(op.render(), "@er3+");
        assert_eq!(ParsedOperand::immediate("0x12").render(), "#0x12");
    }

    #[test]
    fn resolve_literal_does_not_touch_symbols() {
        let mut symbols = SymbolTable::new();
        let op = ParsedOperand::immediate("0x80");
        assert_eq!(op.resolve(&mut symbols).unwrap(), 0x80);
        assert_eq!(symbols.count(), 0);
    }

    #[test]
    fn resolve_symbol_autogenerates_reference() {
        let mut symbols = SymbolTable::new();
        let op = ParsedOperand::bare("loop");
        assert_eq!(op.resolve(&mut symbols).unwrap(), 0);
        let sym = symbols.find_symbol("loop").expect("autogenerated");
        assert!(sym.referenced);
        assert!(!sym.defined);
    }
}
