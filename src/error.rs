// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types shared by the pattern engine and the symbol table.
//!
//! A failed template match is not an error. Engine entry points return
//! `Ok(None)` for that case and the caller (or the engine itself, while
//! scanning the template list) moves on to the next candidate. Everything
//! in `EngineError` is a real failure that must not be confused with a
//! quiet no-match.

use std::fmt;

/// Failure taxonomy for decode, encode, and symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An operand matched syntactically but its value cannot be
    /// represented in the codec's bit field.
    UnencodableValue { operand: String, detail: String },
    /// The address violates the language's instruction alignment.
    MisalignedAddress { address: u64, align: u64 },
    /// A symbol was looked up by name without autogeneration and no
    /// entry exists.
    SymbolNotFound { name: String },
    /// Referenced symbols remained undefined at end of session.
    SymbolIncomplete { missing: Vec<String> },
    /// The closure loop exceeded its pass bound without stabilizing.
    NonConvergentSymbolSet { passes: u32 },
    /// A malformed template definition, caught at registration time.
    InvariantViolation { mnemonic: String, detail: String },
}

impl EngineError {
    pub fn unencodable(operand: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnencodableValue {
            operand: operand.into(),
            detail: detail.into(),
        }
    }

    pub fn invariant(mnemonic: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            mnemonic: mnemonic.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnencodableValue { operand, detail } => {
                write!(f, "operand '{operand}' cannot be encoded: {detail}")
            }
            Self::MisalignedAddress { address, align } => {
                write!(
                    f,
                    "address {address:#x} violates {align}-byte instruction alignment"
                )
            }
            Self::SymbolNotFound { name } => write!(f, "symbol '{name}' not found"),
            Self::SymbolIncomplete { missing } => {
                write!(f, "undefined symbols: {}", missing.join(", "))
            }
            Self::NonConvergentSymbolSet { passes } => {
                write!(f, "symbol set did not converge within {passes} passes")
            }
            Self::InvariantViolation { mnemonic, detail } => {
                write!(f, "invalid template '{mnemonic}': {detail}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
