// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand codecs: bidirectional converters between an instruction
//! word's bit field and operand text.
//!
//! Each codec owns a byte mask carving its field out of the instruction
//! word. `matches` is a purely syntactic pre-check against one parsed
//! operand; `decode` gathers the field and renders it; `encode` computes
//! the field value and scatters it back. Decode and encode are exact
//! inverses for representable values, up to the documented shift-by-32
//! normalization.

use crate::bits;
use crate::error::EngineError;
use crate::language::Language;
use crate::operand::{parse_number, ParsedOperand};
use crate::symbol_table::SymbolTable;

/// One polymorphic operand unit of an instruction template.
///
/// A decode returning `Ok(None)` means the field's raw value is not
/// valid for this codec (for example a register index past the bank),
/// which rejects the whole template as a quiet no-match.
pub trait OperandCodec: Send + Sync {
    /// Bits owned by this codec within the instruction word. May be
    /// empty for codecs that render fixed text.
    fn mask(&self) -> &[u8];

    /// Syntactic pre-check: affixes and value shape only, no bytes.
    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool;

    /// Extract this codec's field from `bytes` and render it as text.
    fn decode(
        &self,
        lang: &Language,
        symbols: &SymbolTable,
        addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError>;

    /// Compute the field value from `op` and scatter it into `bytes`.
    fn encode(
        &self,
        lang: &Language,
        symbols: &mut SymbolTable,
        addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError>;
}

/// Render an address as a bound symbol name when one exists, else hex.
fn render_address(symbols: &SymbolTable, addr: u64) -> String {
    match symbols.find_by_address(addr) {
        Some(sym) if sym.defined => sym.name.clone(),
        _ => format!("0x{addr:x}"),
    }
}

/// Whether an operand core can stand for an address or immediate value:
/// a numeric literal, or a symbol name that is not a register.
fn value_or_symbol(lang: &Language, op: &ParsedOperand) -> bool {
    parse_number(&op.value).is_some() || !lang.is_register(&op.value)
}

// ---------------------------------------------------------------------
// Register operands
// ---------------------------------------------------------------------

/// A register field, direct or indirect.
///
/// The raw field value indexes a bank of the language's register table;
/// banks let a byte-oriented architecture expose 8-, 16-, and 32-bit
/// register rows of one shared table. Indirection affixes follow the
/// `@rn`, `@rn+`, `@-rn` convention.
pub struct RegisterCodec {
    mask: Vec<u8>,
    base: usize,
    count: Option<usize>,
    prefix: &'static str,
    suffix: &'static str,
}

impl RegisterCodec {
    pub fn new(mask: &[u8]) -> Self {
        Self {
            mask: mask.to_vec(),
            base: 0,
            count: None,
            prefix: "",
            suffix: "",
        }
    }

    /// A register field over `count` names starting at `base` in the
    /// language's register table.
    pub fn bank(mask: &[u8], base: usize, count: usize) -> Self {
        Self {
            count: Some(count),
            base,
            ..Self::new(mask)
        }
    }

    /// Indirect access: `@rn`.
    pub fn indirect(mut self) -> Self {
        self.prefix = "@";
        self
    }

    /// Indirect with post-increment: `@rn+`.
    pub fn post_increment(mut self) -> Self {
        self.prefix = "@";
        self.suffix = "+";
        self
    }

    /// Indirect with pre-decrement: `@-rn`.
    pub fn pre_decrement(mut self) -> Self {
        self.prefix = "@-";
        self
    }

    fn bank_size(&self, lang: &Language) -> usize {
        self.count
            .unwrap_or_else(|| lang.register_names().len().saturating_sub(self.base))
    }

    fn field_value(&self, lang: &Language, name: &str) -> Option<u64> {
        let ix = lang.register_index(name)?;
        if ix < self.base || ix >= self.base + self.bank_size(lang) {
            return None;
        }
        Some((ix - self.base) as u64)
    }
}

impl OperandCodec for RegisterCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix == self.prefix
            && op.suffix == self.suffix
            && self.field_value(lang, &op.value).is_some()
    }

    fn decode(
        &self,
        lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let raw = bits::gather(lang.endian(), bytes, &self.mask) as usize;
        if raw >= self.bank_size(lang) {
            return Ok(None);
        }
        match lang.register_name(self.base + raw) {
            Some(name) => Ok(Some(format!("{}{}{}", self.prefix, name, self.suffix))),
            None => Ok(None),
        }
    }

    fn encode(
        &self,
        lang: &Language,
        _symbols: &mut SymbolTable,
        _addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let raw = self
            .field_value(lang, &op.value)
            .ok_or_else(|| EngineError::unencodable(op.render(), "unknown register"))?;
        bits::scatter(lang.endian(), bytes, &self.mask, raw);
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Immediate operands
// ---------------------------------------------------------------------

/// A plain `#`-prefixed immediate field.
pub struct ImmediateCodec {
    mask: Vec<u8>,
}

impl ImmediateCodec {
    pub fn new(mask: &[u8]) -> Self {
        Self {
            mask: mask.to_vec(),
        }
    }
}

impl OperandCodec for ImmediateCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix == "#" && op.suffix.is_empty() && value_or_symbol(lang, op)
    }

    fn decode(
        &self,
        lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let value = bits::gather(lang.endian(), bytes, &self.mask);
        Ok(Some(format!("#0x{value:x}")))
    }

    fn encode(
        &self,
        lang: &Language,
        symbols: &mut SymbolTable,
        _addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let value = op.resolve(symbols)?;
        let width = bits::mask_width(&self.mask);
        if !bits::fits_unsigned(value, width) {
            return Err(EngineError::unencodable(
                op.render(),
                format!("value does not fit in {width}-bit field"),
            ));
        }
        bits::scatter(lang.endian(), bytes, &self.mask, value);
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Address operands
// ---------------------------------------------------------------------

/// An absolute address field, rendered as a bound symbol name when the
/// symbol table knows the address.
pub struct AbsoluteCodec {
    mask: Vec<u8>,
    scale: u64,
}

impl AbsoluteCodec {
    pub fn new(mask: &[u8]) -> Self {
        Self::scaled(mask, 1)
    }

    /// An absolute field whose raw value is `address / scale`.
    pub fn scaled(mask: &[u8], scale: u64) -> Self {
        Self {
            mask: mask.to_vec(),
            scale,
        }
    }
}

impl OperandCodec for AbsoluteCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix.is_empty() && op.suffix.is_empty() && value_or_symbol(lang, op)
    }

    fn decode(
        &self,
        lang: &Language,
        symbols: &SymbolTable,
        _addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let target = bits::gather(lang.endian(), bytes, &self.mask) * self.scale;
        Ok(Some(render_address(symbols, target)))
    }

    fn encode(
        &self,
        lang: &Language,
        symbols: &mut SymbolTable,
        _addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let target = op.resolve(symbols)?;
        if target % self.scale != 0 {
            return Err(EngineError::unencodable(
                op.render(),
                format!("address is not a multiple of {}", self.scale),
            ));
        }
        let raw = target / self.scale;
        let width = bits::mask_width(&self.mask);
        if !bits::fits_unsigned(raw, width) {
            return Err(EngineError::unencodable(
                op.render(),
                format!("address does not fit in {width}-bit field"),
            ));
        }
        bits::scatter(lang.endian(), bytes, &self.mask, raw);
        Ok(())
    }
}

/// A PC-relative address field.
///
/// The stored field is `(target - address - pipeline_offset) / scale`,
/// sign extended on decode. The RISC branch operand uses a pipeline
/// offset of 8 and a scale of 4.
pub struct RelativeCodec {
    mask: Vec<u8>,
    pipeline_offset: i64,
    scale: u64,
}

impl RelativeCodec {
    pub fn new(mask: &[u8], pipeline_offset: i64, scale: u64) -> Self {
        Self {
            mask: mask.to_vec(),
            pipeline_offset,
            scale,
        }
    }
}

impl OperandCodec for RelativeCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix.is_empty() && op.suffix.is_empty() && value_or_symbol(lang, op)
    }

    fn decode(
        &self,
        lang: &Language,
        symbols: &SymbolTable,
        addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let raw = bits::gather(lang.endian(), bytes, &self.mask);
        let offset = bits::sign_extend(raw, bits::mask_width(&self.mask));
        let target =
            (addr as i64 + self.pipeline_offset + offset * self.scale as i64) as u64;
        Ok(Some(render_address(symbols, target)))
    }

    fn encode(
        &self,
        lang: &Language,
        symbols: &mut SymbolTable,
        addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let target = op.resolve(symbols)? as i64;
        let delta = target - addr as i64 - self.pipeline_offset;
        if delta % self.scale as i64 != 0 {
            return Err(EngineError::unencodable(
                op.render(),
                format!("branch distance is not a multiple of {}", self.scale),
            ));
        }
        let raw = delta / self.scale as i64;
        let width = bits::mask_width(&self.mask);
        if !bits::fits_signed(raw, width) {
            return Err(EngineError::unencodable(
                op.render(),
                format!("branch distance does not fit in {width}-bit field"),
            ));
        }
        bits::scatter(lang.endian(), bytes, &self.mask, raw as u64);
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Fixed operands
// ---------------------------------------------------------------------

/// A fixed `#`-prefixed constant that owns no bits; the care-mask
/// distinguishes the templates (`adds #1` vs `adds #2`).
pub struct ConstantCodec {
    value: u64,
}

impl ConstantCodec {
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

impl OperandCodec for ConstantCodec {
    fn mask(&self) -> &[u8] {
        &[]
    }

    fn matches(&self, _lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix == "#" && op.suffix.is_empty() && parse_number(&op.value) == Some(self.value)
    }

    fn decode(
        &self,
        _lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        _bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        Ok(Some(format!("#{}", self.value)))
    }

    fn encode(
        &self,
        _lang: &Language,
        _symbols: &mut SymbolTable,
        _addr: u64,
        _bytes: &mut [u8],
        _op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A register name fixed by the template (`cpsr`, `ccr`), owning no bits.
pub struct FixedRegisterCodec {
    name: &'static str,
}

impl FixedRegisterCodec {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl OperandCodec for FixedRegisterCodec {
    fn mask(&self) -> &[u8] {
        &[]
    }

    fn matches(&self, _lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix.is_empty() && op.suffix.is_empty() && op.value.eq_ignore_ascii_case(self.name)
    }

    fn decode(
        &self,
        _lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        _bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        Ok(Some(self.name.to_string()))
    }

    fn encode(
        &self,
        _lang: &Language,
        _symbols: &mut SymbolTable,
        _addr: u64,
        _bytes: &mut [u8],
        _op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------
// RISC composite operands
// ---------------------------------------------------------------------

/// A 32-bit constant stored as an 8-bit base rotated right by an even
/// bit count: field bits 7:0 hold the base, bits 11:8 the rotate count.
///
/// Not every 32-bit value has such a form; encoding an unrepresentable
/// value fails with `UnencodableValue` rather than quietly emitting a
/// zero field.
pub struct RotatedImmediateCodec {
    mask: Vec<u8>,
}

impl RotatedImmediateCodec {
    pub fn new(mask: &[u8]) -> Self {
        Self {
            mask: mask.to_vec(),
        }
    }

    /// Expand a base/rotate pairing to the 32-bit constant it denotes.
    pub fn rotate_decode(base: u64, rotate: u32) -> u32 {
        let mut wide = base | (base << 32);
        wide >>= 2 * rotate;
        (wide & 0xffff_ffff) as u32
    }

    /// Find the first base/rotate pairing reproducing `value` exactly.
    pub fn rotate_encode(value: u32) -> Option<(u64, u32)> {
        for rotate in 0..16 {
            let base = u64::from(value.rotate_left(2 * rotate) & 0xff);
            if Self::rotate_decode(base, rotate) == value {
                return Some((base, rotate));
            }
        }
        None
    }
}

impl OperandCodec for RotatedImmediateCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        op.prefix == "#" && op.suffix.is_empty() && value_or_symbol(lang, op)
    }

    fn decode(
        &self,
        lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let field = bits::gather(lang.endian(), bytes, &self.mask);
        let value = Self::rotate_decode(field & 0xff, ((field >> 8) & 0xf) as u32);
        Ok(Some(format!("#0x{value:x}")))
    }

    fn encode(
        &self,
        lang: &Language,
        symbols: &mut SymbolTable,
        _addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let value = op.resolve(symbols)?;
        if value > u64::from(u32::MAX) {
            return Err(EngineError::unencodable(op.render(), "value exceeds 32 bits"));
        }
        let (base, rotate) = Self::rotate_encode(value as u32).ok_or_else(|| {
            EngineError::unencodable(
                op.render(),
                "no 8-bit base and even rotation reproduce the value",
            )
        })?;
        bits::scatter(
            lang.endian(),
            bytes,
            &self.mask,
            base | (u64::from(rotate) << 8),
        );
        Ok(())
    }
}

const SHIFT_NAMES: [&str; 4] = ["lsl", "lsr", "asr", "ror"];

/// A barrel-shift descriptor: either shift-by-immediate or
/// shift-by-register, with a 2-bit type selector.
///
/// Field layout within the 8-bit mask: bit 0 selects register mode,
/// bits 2:1 the shift type, bits 7:3 the immediate amount, bits 7:4 the
/// shift register. An immediate logical-right-shift amount of 0 means
/// shift-by-32 in hardware; it decodes as `#32` and re-normalizes to 0
/// on encode, for that shift type only.
pub struct ShiftCodec {
    mask: Vec<u8>,
}

impl ShiftCodec {
    pub fn new(mask: &[u8]) -> Self {
        Self {
            mask: mask.to_vec(),
        }
    }
}

impl OperandCodec for ShiftCodec {
    fn mask(&self) -> &[u8] {
        &self.mask
    }

    fn matches(&self, lang: &Language, op: &ParsedOperand) -> bool {
        if !op.prefix.is_empty() {
            return false;
        }
        if !SHIFT_NAMES
            .iter()
            .any(|name| op.value.eq_ignore_ascii_case(name))
        {
            return false;
        }
        match op.suffix.strip_prefix(' ') {
            Some(rest) if rest.starts_with('#') => parse_number(&rest[1..]).is_some(),
            Some(rest) => lang.register_index(rest).is_some_and(|ix| ix < 16),
            None => false,
        }
    }

    fn decode(
        &self,
        lang: &Language,
        _symbols: &SymbolTable,
        _addr: u64,
        bytes: &[u8],
    ) -> Result<Option<String>, EngineError> {
        let field = bits::gather(lang.endian(), bytes, &self.mask);
        let shift_type = ((field >> 1) & 3) as usize;
        if field & 1 != 0 {
            // Register mode requires a zero bit between type and register.
            if field & 0x8 != 0 {
                return Ok(None);
            }
            let reg = ((field >> 4) & 0xf) as usize;
            return match lang.register_name(reg) {
                Some(name) => Ok(Some(format!("{} {}", SHIFT_NAMES[shift_type], name))),
                None => Ok(None),
            };
        }
        let mut amount = (field >> 3) & 0x1f;
        if shift_type == 1 && amount == 0 {
            amount = 32;
        }
        Ok(Some(format!("{} #{}", SHIFT_NAMES[shift_type], amount)))
    }

    fn encode(
        &self,
        lang: &Language,
        _symbols: &mut SymbolTable,
        _addr: u64,
        bytes: &mut [u8],
        op: &ParsedOperand,
    ) -> Result<(), EngineError> {
        let shift_type = SHIFT_NAMES
            .iter()
            .position(|name| op.value.eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::unencodable(op.render(), "unknown shift type"))?
            as u64;
        let rest = op
            .suffix
            .strip_prefix(' ')
            .ok_or_else(|| EngineError::unencodable(op.render(), "missing shift argument"))?;

        let field = if let Some(num) = rest.strip_prefix('#') {
            let mut amount = parse_number(num)
                .ok_or_else(|| EngineError::unencodable(op.render(), "bad shift amount"))?;
            if shift_type == 1 && amount == 32 {
                amount = 0;
            }
            if amount >= 32 {
                return Err(EngineError::unencodable(
                    op.render(),
                    "shift amount out of range",
                ));
            }
            (shift_type << 1) | (amount << 3)
        } else {
            let reg = lang
                .register_index(rest)
                .filter(|ix| *ix < 16)
                .ok_or_else(|| EngineError::unencodable(op.render(), "bad shift register"))?
                as u64;
            1 | (shift_type << 1) | (reg << 4)
        };
        bits::scatter(lang.endian(), bytes, &self.mask, field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Endian;

    fn risc_lang() -> Language {
        Language::new("risc", Endian::Little, 4, 4, 4)
            .with_registers(&[
                "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12",
                "sp", "lr", "pc",
            ])
            .with_register_alias("r13", 13)
            .with_register_alias("r14", 14)
            .with_register_alias("r15", 15)
    }

    fn byte_lang() -> Language {
        Language::new("mcu", Endian::Big, 1, 2, 10).with_registers(&[
            "er0", "er1", "er2", "er3", "er4", "er5", "er6", "er7", "r0", "r1", "r2", "r3", "r4",
            "r5", "r6", "r7",
        ])
    }

    #[test]
    fn register_roundtrip_with_alias() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = RegisterCodec::new(&[0x0f, 0, 0, 0]);

        let mut bytes = [0u8; 4];
        let op = ParsedOperand::bare("r14");
        assert!(codec.matches(&lang, &op));
        codec.encode(&lang, &mut symbols, 0, &mut bytes, &op).unwrap();
        assert_eq!(bytes[0], 14);
        // Decoding renders the canonical name, not the alias.
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "lr"
        );
    }

    #[test]
    fn register_bank_rejects_foreign_rows() {
        let lang = byte_lang();
        let codec = RegisterCodec::bank(&[0x00, 0x07], 0, 8);
        assert!(codec.matches(&lang, &ParsedOperand::bare("er3")));
        assert!(!codec.matches(&lang, &ParsedOperand::bare("r3")));
    }

    #[test]
    fn indirect_register_affixes() {
        let lang = byte_lang();
        let mut symbols = SymbolTable::new();
        let codec = RegisterCodec::bank(&[0x00, 0x70], 0, 8).post_increment();

        let op = ParsedOperand::new("@", "er5", "+");
        assert!(codec.matches(&lang, &op));
        assert!(!codec.matches(&lang, &ParsedOperand::bare("er5")));

        let mut bytes = [0u8; 2];
        codec.encode(&lang, &mut symbols, 0, &mut bytes, &op).unwrap();
        assert_eq!(bytes[1], 0x50);
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "@er5+"
        );
    }

    #[test]
    fn register_decode_out_of_bank_is_no_match() {
        let lang = byte_lang();
        let symbols = SymbolTable::new();
        let codec = RegisterCodec::bank(&[0x00, 0x0f], 0, 8);
        let bytes = [0x00, 0x0c];
        assert_eq!(codec.decode(&lang, &symbols, 0, &bytes).unwrap(), None);
    }

    #[test]
    fn immediate_range_check() {
        let lang = byte_lang();
        let mut symbols = SymbolTable::new();
        let codec = ImmediateCodec::new(&[0x00, 0xff]);

        let mut bytes = [0u8; 2];
        codec
            .encode(&lang, &mut symbols, 0, &mut bytes, &ParsedOperand::immediate("0x7f"))
            .unwrap();
        assert_eq!(bytes[1], 0x7f);

        let err = codec
            .encode(&lang, &mut symbols, 0, &mut bytes, &ParsedOperand::immediate("0x100"))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnencodableValue { .. }));
    }

    #[test]
    fn rotated_immediate_exactness() {
        assert_eq!(
            RotatedImmediateCodec::rotate_encode(0xff00_0000),
            Some((0xff, 4))
        );
        assert_eq!(RotatedImmediateCodec::rotate_decode(0xff, 4), 0xff00_0000);
    }

    #[test]
    fn rotated_immediate_rejection() {
        assert_eq!(RotatedImmediateCodec::rotate_encode(0x00ff_00ff), None);

        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = RotatedImmediateCodec::new(&[0xff, 0x0f, 0, 0]);
        let mut bytes = [0u8; 4];
        let err = codec
            .encode(
                &lang,
                &mut symbols,
                0,
                &mut bytes,
                &ParsedOperand::immediate("0x00ff00ff"),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnencodableValue { .. }));
    }

    #[test]
    fn rotated_immediate_roundtrip() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = RotatedImmediateCodec::new(&[0xff, 0x0f, 0, 0]);
        let mut bytes = [0u8; 4];
        codec
            .encode(
                &lang,
                &mut symbols,
                0,
                &mut bytes,
                &ParsedOperand::immediate("0xff000000"),
            )
            .unwrap();
        assert_eq!(bytes[0], 0xff);
        assert_eq!(bytes[1], 0x04);
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "#0xff000000"
        );
    }

    #[test]
    fn shift_immediate_roundtrip() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = ShiftCodec::new(&[0xf0, 0x0f, 0, 0]);

        let op = ParsedOperand::new("", "lsl", " #2");
        assert!(codec.matches(&lang, &op));
        let mut bytes = [0u8; 4];
        codec.encode(&lang, &mut symbols, 0, &mut bytes, &op).unwrap();
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "lsl #2"
        );
    }

    #[test]
    fn shift_by_register_roundtrip() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = ShiftCodec::new(&[0xf0, 0x0f, 0, 0]);

        let op = ParsedOperand::new("", "asr", " r4");
        assert!(codec.matches(&lang, &op));
        let mut bytes = [0u8; 4];
        codec.encode(&lang, &mut symbols, 0, &mut bytes, &op).unwrap();
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "asr r4"
        );
    }

    #[test]
    fn shift_by_32_normalization() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        let codec = ShiftCodec::new(&[0xf0, 0x0f, 0, 0]);

        // lsr #32 is stored as amount 0 and decodes back to #32.
        let op = ParsedOperand::new("", "lsr", " #32");
        let mut bytes = [0u8; 4];
        codec.encode(&lang, &mut symbols, 0, &mut bytes, &op).unwrap();
        assert_eq!(bits::gather(Endian::Little, &bytes, codec.mask()) >> 3, 0);
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "lsr #32"
        );

        // Other shift types reject 32.
        let err = codec
            .encode(
                &lang,
                &mut symbols,
                0,
                &mut bytes,
                &ParsedOperand::new("", "lsl", " #32"),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnencodableValue { .. }));
    }

    #[test]
    fn relative_branch_roundtrip() {
        let lang = risc_lang();
        let mut symbols = SymbolTable::new();
        symbols.set_symbol("loop", 0x100);
        let codec = RelativeCodec::new(&[0xff, 0xff, 0xff, 0x00], 8, 4);

        let mut bytes = [0u8; 4];
        let op = ParsedOperand::bare("loop");
        codec
            .encode(&lang, &mut symbols, 0x120, &mut bytes, &op)
            .unwrap();
        // (0x100 - 0x120 - 8) / 4 = -10.
        assert_eq!(
            bits::sign_extend(bits::gather(Endian::Little, &bytes, codec.mask()), 24),
            -10
        );
        assert_eq!(
            codec
                .decode(&lang, &symbols, 0x120, &bytes)
                .unwrap()
                .unwrap(),
            "loop"
        );
    }

    #[test]
    fn relative_rejects_unreachable_distance() {
        let lang = byte_lang();
        let mut symbols = SymbolTable::new();
        let codec = RelativeCodec::new(&[0x00, 0xff], 2, 1);
        let mut bytes = [0u8; 2];
        let err = codec
            .encode(
                &lang,
                &mut symbols,
                0,
                &mut bytes,
                &ParsedOperand::bare("0x4000"),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnencodableValue { .. }));
    }

    #[test]
    fn absolute_renders_known_symbol() {
        let lang = byte_lang();
        let mut symbols = SymbolTable::new();
        symbols.set_symbol("vector", 0x80);
        let codec = AbsoluteCodec::new(&[0x00, 0xff]);

        let mut bytes = [0u8; 2];
        codec
            .encode(&lang, &mut symbols, 0, &mut bytes, &ParsedOperand::bare("vector"))
            .unwrap();
        assert_eq!(bytes[1], 0x80);
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "vector"
        );

        // Without a binding the address renders as hex.
        bytes[1] = 0x44;
        assert_eq!(
            codec.decode(&lang, &symbols, 0, &bytes).unwrap().unwrap(),
            "0x44"
        );
    }

    #[test]
    fn constant_codec_matches_exact_value() {
        let lang = byte_lang();
        let codec = ConstantCodec::new(2);
        assert!(codec.matches(&lang, &ParsedOperand::immediate("2")));
        assert!(!codec.matches(&lang, &ParsedOperand::immediate("4")));
        assert!(!codec.matches(&lang, &ParsedOperand::bare("2")));
    }

    #[test]
    fn fixed_register_codec() {
        let lang = risc_lang();
        let codec = FixedRegisterCodec::new("cpsr");
        assert!(codec.matches(&lang, &ParsedOperand::bare("cpsr")));
        assert!(codec.matches(&lang, &ParsedOperand::bare("CPSR")));
        assert!(!codec.matches(&lang, &ParsedOperand::bare("spsr")));
    }
}
