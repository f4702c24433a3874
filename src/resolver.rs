// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Tie-break between templates whose fixed bits claim the same bytes.
//!
//! Architectures routinely alias encodings, so several templates can
//! match one byte window (or one operand list). Resolution is a single
//! two-level rule applied uniformly on both the decode and encode
//! paths: highest explicit priority wins, and a priority tie goes to
//! the earliest-registered template. Keeping the rule in one function
//! keeps disambiguation auditable instead of scattering per-template
//! conditionals.

use std::cmp::Ordering;

/// Rank of one candidate template: explicit priority plus its
/// registration index in the language's template list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub priority: i32,
    pub index: usize,
}

/// Compare two candidates; `Ordering::Greater` means `a` is preferred.
pub fn compare(a: Rank, b: Rank) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.index.cmp(&a.index))
}

/// Fold one candidate into the running best.
pub(crate) fn prefer<T>(best: &mut Option<(Rank, T)>, rank: Rank, value: T) {
    match best {
        Some((incumbent, _)) if compare(rank, *incumbent) != Ordering::Greater => {}
        _ => *best = Some((rank, value)),
    }
}
