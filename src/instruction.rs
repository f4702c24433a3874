// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The result of one successful decode or encode attempt.

use std::fmt;

use crate::mnemonic::Mnemonic;

/// A decoded or encoded instruction. Created fresh per match attempt;
/// it has no identity beyond the one call that produced it.
#[derive(Clone)]
pub struct Instruction<'l> {
    /// Base verb plus any predicate suffix.
    pub verb: String,
    /// Rendered operand text, comma joined in template order.
    pub operands: String,
    /// The raw byte sequence, exactly `mnemonic.length()` bytes.
    pub bytes: Vec<u8>,
    /// Address the instruction was matched at.
    pub address: u64,
    /// Back-reference to the matching template.
    pub mnemonic: &'l Mnemonic,
}

impl Instruction<'_> {
    /// Number of bytes consumed by this instruction.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.verb)
        } else {
            write!(f, "{} {}", self.verb, self.operands)
        }
    }
}

impl fmt::Debug for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("verb", &self.verb)
            .field("operands", &self.operands)
            .field("bytes", &self.bytes)
            .field("address", &self.address)
            .finish()
    }
}
