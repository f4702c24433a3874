// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Retargetable instruction pattern engine.
//!
//! An architecture is described declaratively as a [`Language`]: a byte
//! order, an alignment, register and predicate tables, and a list of
//! [`Mnemonic`] templates. Each template pairs fixed opcode bits with
//! [`codec::OperandCodec`] implementations that own the remaining bits,
//! so the same table drives both disassembly (bytes to text) and
//! assembly (text to bytes). Forward references are handled by the
//! multi-pass fixed point in [`closure`] over a [`SymbolTable`].

pub mod bits;
pub mod closure;
pub mod codec;
pub mod error;
pub mod instruction;
pub mod language;
pub mod mnemonic;
pub mod operand;
pub mod resolver;
pub mod symbol_table;

pub use closure::{run_to_closure, ClosureReport, DEFAULT_MAX_PASSES};
pub use error::EngineError;
pub use instruction::Instruction;
pub use language::{Endian, Language};
pub use mnemonic::Mnemonic;
pub use operand::ParsedOperand;
pub use symbol_table::{Symbol, SymbolTable};
