// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-architecture registry and the engine's decode/encode boundary.
//!
//! An architecture module builds a `Language` once, registering its
//! register names, predicate table, and instruction templates; the
//! value is immutable afterwards and shared by reference for the whole
//! assembly or disassembly session. Registration order matters: it is
//! the second key of the priority tie-break.

use crate::error::EngineError;
use crate::instruction::Instruction;
use crate::mnemonic::Mnemonic;
use crate::operand::ParsedOperand;
use crate::resolver::{self, Rank};
use crate::symbol_table::SymbolTable;

/// Instruction byte order of an architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// One architecture's configuration and template catalog.
pub struct Language {
    name: String,
    endian: Endian,
    align: u64,
    min_bytes: usize,
    max_bytes: usize,
    register_names: Vec<String>,
    register_aliases: Vec<(String, usize)>,
    predicates: Vec<String>,
    always_predicate: usize,
    mnemonics: Vec<Mnemonic>,
}

impl Language {
    pub fn new(name: &str, endian: Endian, align: u64, min_bytes: usize, max_bytes: usize) -> Self {
        Self {
            name: name.to_string(),
            endian,
            align: align.max(1),
            min_bytes,
            max_bytes,
            register_names: Vec::new(),
            register_aliases: Vec::new(),
            predicates: Vec::new(),
            always_predicate: 0,
            mnemonics: Vec::new(),
        }
    }

    /// Register-name table; index equals the hardware encoding value.
    /// Register names are illegal as symbol names.
    pub fn with_registers(mut self, names: &[&str]) -> Self {
        self.register_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// An alternate name for the register at `index` (e.g. `r13` for
    /// `sp`). Aliases are accepted on encode; decode always renders the
    /// canonical name.
    pub fn with_register_alias(mut self, alias: &str, index: usize) -> Self {
        self.register_aliases.push((alias.to_string(), index));
        self
    }

    /// Condition/predicate suffix table; index equals the field value,
    /// `always` names the predicate that renders without a suffix.
    pub fn with_predicates(mut self, names: &[&str], always: usize) -> Self {
        self.predicates = names.iter().map(|n| n.to_string()).collect();
        self.always_predicate = always;
        self
    }

    /// Register one instruction template.
    ///
    /// Validation is fail-fast: a template violating the bit-partition
    /// invariant reflects a malformed architecture table and is
    /// rejected here, never at decode/encode time.
    pub fn insert(&mut self, mnemonic: Mnemonic) -> Result<(), EngineError> {
        mnemonic.validate(self)?;
        self.mnemonics.push(mnemonic);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn align(&self) -> u64 {
        self.align
    }

    pub fn min_bytes(&self) -> usize {
        self.min_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn register_names(&self) -> &[String] {
        &self.register_names
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn always_predicate(&self) -> usize {
        self.always_predicate
    }

    pub fn mnemonics(&self) -> &[Mnemonic] {
        &self.mnemonics
    }

    /// Hardware encoding index of a register name or alias.
    pub fn register_index(&self, name: &str) -> Option<usize> {
        if let Some(ix) = self
            .register_names
            .iter()
            .position(|reg| reg.eq_ignore_ascii_case(name))
        {
            return Some(ix);
        }
        self.register_aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, ix)| *ix)
    }

    /// Canonical name of the register at `index`.
    pub fn register_name(&self, index: usize) -> Option<&str> {
        self.register_names.get(index).map(String::as_str)
    }

    pub fn is_register(&self, name: &str) -> bool {
        self.register_index(name).is_some()
    }

    /// Decode one instruction from a byte window.
    ///
    /// The window should supply `max_bytes` bytes where available; only
    /// the matched template's length is consumed. `Ok(None)` means no
    /// template claims the bytes ("unknown instruction").
    pub fn decode<'l>(
        &'l self,
        symbols: &SymbolTable,
        addr: u64,
        window: &[u8],
    ) -> Result<Option<Instruction<'l>>, EngineError> {
        self.check_alignment(addr)?;
        let mut best: Option<(Rank, Instruction<'l>)> = None;
        for (index, mnemonic) in self.mnemonics.iter().enumerate() {
            if let Some(ins) = mnemonic.decode_match(self, symbols, addr, window)? {
                let rank = Rank {
                    priority: mnemonic.priority(),
                    index,
                };
                resolver::prefer(&mut best, rank, ins);
            }
        }
        Ok(best.map(|(_, ins)| ins))
    }

    /// Encode one parsed source line.
    ///
    /// Symbol references inside operands consult (and may autogenerate
    /// entries in) the symbol table. An `UnencodableValue` from a codec
    /// aborts the whole call rather than falling through to a wrong
    /// template.
    pub fn encode<'l>(
        &'l self,
        symbols: &mut SymbolTable,
        addr: u64,
        verb: &str,
        ops: &[ParsedOperand],
    ) -> Result<Option<Instruction<'l>>, EngineError> {
        self.check_alignment(addr)?;
        let mut best: Option<(Rank, Instruction<'l>)> = None;
        for (index, mnemonic) in self.mnemonics.iter().enumerate() {
            if let Some(ins) = mnemonic.encode_match(self, symbols, addr, verb, ops)? {
                let rank = Rank {
                    priority: mnemonic.priority(),
                    index,
                };
                resolver::prefer(&mut best, rank, ins);
            }
        }
        Ok(best.map(|(_, ins)| ins))
    }

    fn check_alignment(&self, addr: u64) -> Result<(), EngineError> {
        if addr % self.align != 0 {
            return Err(EngineError::MisalignedAddress {
                address: addr,
                align: self.align,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RegisterCodec;

    fn lang_with_aliases() -> Language {
        let mut lang = Language::new("demo", Endian::Little, 2, 2, 2)
            .with_registers(&["a", "b", "c", "d"])
            .with_register_alias("accum", 0);
        lang.insert(
            Mnemonic::new("inc", 2, &[0x40, 0x00], &[0xfc, 0xff])
                .with(RegisterCodec::new(&[0x03, 0x00])),
        )
        .unwrap();
        lang
    }

    #[test]
    fn register_lookup_prefers_canonical_then_alias() {
        let lang = lang_with_aliases();
        assert_eq!(lang.register_index("c"), Some(2));
        assert_eq!(lang.register_index("ACCUM"), Some(0));
        assert_eq!(lang.register_index("x"), None);
        assert!(lang.is_register("accum"));
    }

    #[test]
    fn misaligned_address_is_an_error_not_a_no_match() {
        let lang = lang_with_aliases();
        let mut symbols = SymbolTable::new();
        let err = lang.decode(&symbols, 1, &[0x40, 0x00]).unwrap_err();
        assert_eq!(
            err,
            EngineError::MisalignedAddress {
                address: 1,
                align: 2
            }
        );
        let err = lang
            .encode(&mut symbols, 3, "inc", &[ParsedOperand::bare("a")])
            .unwrap_err();
        assert!(matches!(err, EngineError::MisalignedAddress { .. }));
    }

    #[test]
    fn unknown_instruction_decodes_to_none() {
        let lang = lang_with_aliases();
        let symbols = SymbolTable::new();
        assert!(lang.decode(&symbols, 0, &[0xff, 0xff]).unwrap().is_none());
    }

    #[test]
    fn insert_rejects_malformed_template() {
        let mut lang = Language::new("demo", Endian::Little, 1, 1, 1);
        let err = lang
            .insert(Mnemonic::new("bad", 1, &[0x00], &[0x0f]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation { .. }));
    }

    #[test]
    fn encode_decode_roundtrip() {
        let lang = lang_with_aliases();
        let mut symbols = SymbolTable::new();
        let ins = lang
            .encode(&mut symbols, 0, "inc", &[ParsedOperand::bare("accum")])
            .unwrap()
            .unwrap();
        assert_eq!(ins.bytes, vec![0x40, 0x00]);

        let back = lang.decode(&symbols, 0, &ins.bytes).unwrap().unwrap();
        assert_eq!(back.verb, "inc");
        assert_eq!(back.operands, "a");
        assert_eq!(back.len(), 2);
    }
}
