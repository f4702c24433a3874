// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction templates: one encoding variant of one mnemonic.
//!
//! A template owns a fixed byte length, an opcode byte pattern, a
//! care-mask naming the bits that must equal the opcode, and an ordered
//! list of operand codecs owning the remaining bits. Every bit position
//! is partitioned between fixed opcode bits, an optional predicate
//! (condition code) field, declared don't-care padding, and exactly one
//! codec; the partition is validated when the template is registered,
//! so a malformed architecture table fails at construction time instead
//! of producing wrong matches later.

use std::fmt;

use crate::bits;
use crate::codec::OperandCodec;
use crate::error::EngineError;
use crate::instruction::Instruction;
use crate::language::Language;
use crate::operand::ParsedOperand;
use crate::symbol_table::SymbolTable;

/// A collision guard: reject a byte window when `bytes & mask == value`.
///
/// Used where the care-mask alone cannot separate aliased encodings,
/// e.g. a shifted-register arithmetic template that must not claim a
/// multiply pattern.
struct Exclusion {
    mask: Vec<u8>,
    value: Vec<u8>,
}

/// One instruction template.
pub struct Mnemonic {
    verb: String,
    length: usize,
    opcode: Vec<u8>,
    care_mask: Vec<u8>,
    dont_care: Vec<u8>,
    predicate_mask: Option<Vec<u8>>,
    exclusions: Vec<Exclusion>,
    priority: i32,
    codecs: Vec<Box<dyn OperandCodec>>,
    help: Option<String>,
    example: Option<String>,
}

impl Mnemonic {
    pub fn new(verb: &str, length: usize, opcode: &[u8], care_mask: &[u8]) -> Self {
        Self {
            verb: verb.to_string(),
            length,
            opcode: opcode.to_vec(),
            care_mask: care_mask.to_vec(),
            dont_care: vec![0; length],
            predicate_mask: None,
            exclusions: Vec::new(),
            priority: 0,
            codecs: Vec::new(),
            help: None,
            example: None,
        }
    }

    /// Append an operand codec; order is textual operand order.
    pub fn with(mut self, codec: impl OperandCodec + 'static) -> Self {
        self.codecs.push(Box::new(codec));
        self
    }

    /// Declare bits as don't-care padding owned by nobody.
    pub fn dont_care(mut self, mask: &[u8]) -> Self {
        self.dont_care = mask.to_vec();
        self
    }

    /// Claim bits as the architecture's condition/predicate field.
    pub fn predicate(mut self, mask: &[u8]) -> Self {
        self.predicate_mask = Some(mask.to_vec());
        self
    }

    /// Add a collision guard rejecting windows where
    /// `bytes & mask == value`.
    pub fn exclude(mut self, mask: &[u8], value: &[u8]) -> Self {
        self.exclusions.push(Exclusion {
            mask: mask.to_vec(),
            value: value.to_vec(),
        });
        self
    }

    /// Raise this template above priority-0 competitors.
    pub fn prioritize(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = Some(text.to_string());
        self
    }

    pub fn example(mut self, text: &str) -> Self {
        self.example = Some(text.to_string());
        self
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn operand_count(&self) -> usize {
        self.codecs.len()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn example_text(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Validate byte lengths and the bit-partition invariant.
    pub(crate) fn validate(&self, lang: &Language) -> Result<(), EngineError> {
        if self.length == 0 {
            return Err(EngineError::invariant(&self.verb, "zero-length template"));
        }
        if self.length < lang.min_bytes() || self.length > lang.max_bytes() {
            return Err(EngineError::invariant(
                &self.verb,
                format!(
                    "length {} outside language range {}..={}",
                    self.length,
                    lang.min_bytes(),
                    lang.max_bytes()
                ),
            ));
        }
        if self.opcode.len() != self.length || self.care_mask.len() != self.length {
            return Err(EngineError::invariant(
                &self.verb,
                "opcode/care-mask length differs from template length",
            ));
        }
        for (ix, (op, care)) in self.opcode.iter().zip(&self.care_mask).enumerate() {
            if op & !care != 0 {
                return Err(EngineError::invariant(
                    &self.verb,
                    format!("opcode byte {ix} sets bits outside the care-mask"),
                ));
            }
        }
        for ex in &self.exclusions {
            if ex.mask.len() != self.length || ex.value.len() != self.length {
                return Err(EngineError::invariant(
                    &self.verb,
                    "exclusion mask length differs from template length",
                ));
            }
        }
        if self.predicate_mask.is_some() && lang.predicates().is_empty() {
            return Err(EngineError::invariant(
                &self.verb,
                "predicate field claimed but language defines no predicates",
            ));
        }

        // Partition: care-mask, don't-care, predicate, and codec masks
        // must be pairwise disjoint and jointly cover every bit.
        let mut coverage = self.care_mask.clone();
        let mut claim = |mask: &[u8], owner: &str, coverage: &mut Vec<u8>| {
            if mask.is_empty() {
                return Ok(());
            }
            if mask.len() != self.length {
                return Err(EngineError::invariant(
                    &self.verb,
                    format!("{owner} mask length differs from template length"),
                ));
            }
            for (ix, byte) in mask.iter().enumerate() {
                if coverage[ix] & byte != 0 {
                    return Err(EngineError::invariant(
                        &self.verb,
                        format!("{owner} mask overlaps already-claimed bits in byte {ix}"),
                    ));
                }
                coverage[ix] |= byte;
            }
            Ok(())
        };
        claim(&self.dont_care, "don't-care", &mut coverage)?;
        if let Some(mask) = &self.predicate_mask {
            claim(mask, "predicate", &mut coverage)?;
        }
        for (ix, codec) in self.codecs.iter().enumerate() {
            if bits::mask_width(codec.mask()) > 64 {
                return Err(EngineError::invariant(
                    &self.verb,
                    format!("operand {ix} field is wider than 64 bits"),
                ));
            }
            claim(codec.mask(), &format!("operand {ix}"), &mut coverage)?;
        }
        if let Some(ix) = coverage.iter().position(|byte| *byte != 0xff) {
            return Err(EngineError::invariant(
                &self.verb,
                format!("byte {ix} has bits owned by nobody"),
            ));
        }
        Ok(())
    }

    /// Decode direction: does this template match the byte window?
    pub(crate) fn decode_match<'l>(
        &'l self,
        lang: &Language,
        symbols: &SymbolTable,
        addr: u64,
        window: &[u8],
    ) -> Result<Option<Instruction<'l>>, EngineError> {
        if window.len() < self.length {
            return Ok(None);
        }
        let bytes = &window[..self.length];
        for ix in 0..self.length {
            if bytes[ix] & self.care_mask[ix] != self.opcode[ix] {
                return Ok(None);
            }
        }
        for ex in &self.exclusions {
            let hit = (0..self.length).all(|ix| bytes[ix] & ex.mask[ix] == ex.value[ix]);
            if hit {
                return Ok(None);
            }
        }

        let mut verb = self.verb.clone();
        if let Some(mask) = &self.predicate_mask {
            let ix = bits::gather(lang.endian(), bytes, mask) as usize;
            match lang.predicates().get(ix) {
                Some(name) if ix != lang.always_predicate() => verb.push_str(name),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut operands = String::new();
        for (ix, codec) in self.codecs.iter().enumerate() {
            match codec.decode(lang, symbols, addr, bytes)? {
                Some(text) => {
                    if ix > 0 {
                        operands.push_str(", ");
                    }
                    operands.push_str(&text);
                }
                None => return Ok(None),
            }
        }

        Ok(Some(Instruction {
            verb,
            operands,
            bytes: bytes.to_vec(),
            address: addr,
            mnemonic: self,
        }))
    }

    /// Encode direction: does this template accept the parsed source?
    pub(crate) fn encode_match<'l>(
        &'l self,
        lang: &Language,
        symbols: &mut SymbolTable,
        addr: u64,
        verb: &str,
        ops: &[ParsedOperand],
    ) -> Result<Option<Instruction<'l>>, EngineError> {
        if ops.len() != self.codecs.len() {
            return Ok(None);
        }
        let predicate = match self.resolve_predicate(lang, verb) {
            Some(predicate) => predicate,
            None => return Ok(None),
        };
        for (codec, op) in self.codecs.iter().zip(ops) {
            if !codec.matches(lang, op) {
                return Ok(None);
            }
        }

        let mut bytes = self.opcode.clone();
        if let (Some(mask), Some(ix)) = (&self.predicate_mask, predicate) {
            bits::scatter(lang.endian(), &mut bytes, mask, ix as u64);
        }
        for (codec, op) in self.codecs.iter().zip(ops) {
            codec.encode(lang, symbols, addr, &mut bytes, op)?;
        }

        let operands = ops
            .iter()
            .map(ParsedOperand::render)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Some(Instruction {
            verb: verb.to_string(),
            operands,
            bytes,
            address: addr,
            mnemonic: self,
        }))
    }

    /// Which predicate does `verb` name for this template?
    ///
    /// `None`: the verb does not belong to this template.
    /// `Some(None)`: template carries no predicate field, exact match.
    /// `Some(Some(ix))`: predicate index to encode ("always" when the
    /// verb carries no suffix).
    fn resolve_predicate(&self, lang: &Language, verb: &str) -> Option<Option<usize>> {
        if self.predicate_mask.is_none() {
            return (verb == self.verb).then_some(None);
        }
        if verb == self.verb {
            return Some(Some(lang.always_predicate()));
        }
        let suffix = verb.strip_prefix(self.verb.as_str())?;
        let ix = lang
            .predicates()
            .iter()
            .position(|name| !name.is_empty() && name == suffix)?;
        Some(Some(ix))
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("verb", &self.verb)
            .field("length", &self.length)
            .field("priority", &self.priority)
            .field("operands", &self.codecs.len())
            .finish()
    }
}
