// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Bit-field gather/scatter shared by all operand codecs.
//!
//! A codec owns a byte mask over the instruction word. `gather` collects
//! the masked bits into a dense right-aligned integer; `scatter` is the
//! exact inverse and touches only the masked bits. Significance follows
//! the language's byte order: little endian reads byte 0 first, big
//! endian reads the last byte first. Within a byte, bits run LSB to MSB.

use crate::language::Endian;

/// Number of bits set in a mask.
pub fn mask_width(mask: &[u8]) -> u32 {
    mask.iter().map(|b| b.count_ones()).sum()
}

/// Collect the bits of `bytes` covered by `mask` into a dense integer.
///
/// Only the first `mask.len()` bytes are read. Masks wider than 64 set
/// bits are a template-definition error and are rejected at registration,
/// so the return value never overflows.
pub fn gather(endian: Endian, bytes: &[u8], mask: &[u8]) -> u64 {
    debug_assert!(bytes.len() >= mask.len());
    let mut value = 0u64;
    let mut out = 0u32;
    for step in 0..mask.len() {
        let ix = match endian {
            Endian::Little => step,
            Endian::Big => mask.len() - 1 - step,
        };
        let m = mask[ix];
        if m == 0 {
            continue;
        }
        for bit in 0..8 {
            if m & (1 << bit) == 0 {
                continue;
            }
            if bytes[ix] & (1 << bit) != 0 {
                value |= 1 << out;
            }
            out += 1;
        }
    }
    value
}

/// Place the low `mask_width(mask)` bits of `value` into the masked
/// positions of `bytes`, clearing the field first. Unmasked bits are
/// preserved.
pub fn scatter(endian: Endian, bytes: &mut [u8], mask: &[u8], value: u64) {
    debug_assert!(bytes.len() >= mask.len());
    let mut src = 0u32;
    for step in 0..mask.len() {
        let ix = match endian {
            Endian::Little => step,
            Endian::Big => mask.len() - 1 - step,
        };
        let m = mask[ix];
        if m == 0 {
            continue;
        }
        for bit in 0..8 {
            if m & (1 << bit) == 0 {
                continue;
            }
            if value & (1 << src) != 0 {
                bytes[ix] |= 1 << bit;
            } else {
                bytes[ix] &= !(1 << bit);
            }
            src += 1;
        }
    }
}

/// Sign-extend a `width`-bit field to a full signed value.
pub fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// Whether `value` fits in a `width`-bit unsigned field.
pub fn fits_unsigned(value: u64, width: u32) -> bool {
    width >= 64 || value < (1u64 << width)
}

/// Whether `value` fits in a `width`-bit two's-complement field.
pub fn fits_signed(value: i64, width: u32) -> bool {
    if width == 0 {
        return value == 0;
    }
    if width >= 64 {
        return true;
    }
    let min = -(1i64 << (width - 1));
    let max = (1i64 << (width - 1)) - 1;
    value >= min && value <= max
}
