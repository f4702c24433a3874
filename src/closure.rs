// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Multi-pass fixed-point driver for symbol resolution.
//!
//! Operand rendering can depend on symbol addresses that are themselves
//! assigned by earlier instructions, so the session driver re-runs full
//! assembly passes until the symbol table stops changing. The stop key
//! is the table's content hash; a pass that consulted no undefined
//! symbol and changed no defined value is also a fixed point, which lets
//! a source without forward references finish in a single pass.

use crate::error::EngineError;
use crate::symbol_table::SymbolTable;

/// Default pass bound. Exceeding it is a hard failure, distinct from the
/// softer "incomplete" state of undefined references.
pub const DEFAULT_MAX_PASSES: u32 = 10;

/// Outcome of a converged closure run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureReport {
    /// Number of passes executed, including the converging one.
    pub passes: u32,
    /// Whether every referenced symbol ended up defined.
    pub complete: bool,
}

/// Run `pass` repeatedly until the symbol table reaches closure.
///
/// `pass` receives the 1-based pass number and the shared table; it must
/// perform one full assembly run, calling `set_symbol` for every label it
/// lays out. The table persists between passes, so references resolve
/// against the previous pass's layout. Returns `NonConvergentSymbolSet`
/// if `max_passes` passes do not stabilize; incomplete-but-stable tables
/// converge normally and report `complete: false`.
pub fn run_to_closure<F>(
    symbols: &mut SymbolTable,
    max_passes: u32,
    mut pass: F,
) -> Result<ClosureReport, EngineError>
where
    F: FnMut(u32, &mut SymbolTable) -> Result<(), EngineError>,
{
    let mut previous_hash = symbols.symbol_hash();
    for pass_number in 1..=max_passes {
        let queries_before = symbols.undefined_queries();
        let changes_before = symbols.value_changes();
        pass(pass_number, symbols)?;

        let hash = symbols.symbol_hash();
        let clean = symbols.undefined_queries() == queries_before
            && symbols.value_changes() == changes_before;
        if hash == previous_hash || clean {
            return Ok(ClosureReport {
                passes: pass_number,
                complete: symbols.complete(),
            });
        }
        previous_hash = hash;
    }
    Err(EngineError::NonConvergentSymbolSet { passes: max_passes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_forward_references_converges_in_one_pass() {
        let mut symbols = SymbolTable::new();
        let report = run_to_closure(&mut symbols, DEFAULT_MAX_PASSES, |_, table| {
            table.set_symbol("start", 0x00);
            table.reference("start");
            table.set_symbol("end", 0x10);
            Ok(())
        })
        .unwrap();
        assert_eq!(report.passes, 1);
        assert!(report.complete);
    }

    #[test]
    fn size_stable_forward_reference_converges_in_two_passes() {
        let mut symbols = SymbolTable::new();
        let report = run_to_closure(&mut symbols, DEFAULT_MAX_PASSES, |_, table| {
            // A branch at 0x00 references "done" before its definition;
            // instruction sizes do not depend on the resolution.
            table.set_symbol("start", 0x00);
            table.reference("done");
            table.set_symbol("done", 0x08);
            Ok(())
        })
        .unwrap();
        assert_eq!(report.passes, 2);
        assert!(report.complete);
    }

    #[test]
    fn stable_but_incomplete_reports_missing() {
        let mut symbols = SymbolTable::new();
        let report = run_to_closure(&mut symbols, DEFAULT_MAX_PASSES, |_, table| {
            table.set_symbol("start", 0x00);
            table.reference("nowhere");
            Ok(())
        })
        .unwrap();
        assert!(!report.complete);
        assert_eq!(symbols.missing_symbols(), vec!["nowhere".to_string()]);
    }

    #[test]
    fn oscillating_layout_is_non_convergent() {
        let mut symbols = SymbolTable::new();
        let err = run_to_closure(&mut symbols, 4, |pass, table| {
            // A pathological source whose label flips address every pass
            // because the forward reference changes an instruction size.
            table.reference("flip");
            table.set_symbol("flip", u64::from(pass % 2));
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, EngineError::NonConvergentSymbolSet { passes: 4 });
    }

    #[test]
    fn pass_errors_abort_the_loop() {
        let mut symbols = SymbolTable::new();
        let err = run_to_closure(&mut symbols, DEFAULT_MAX_PASSES, |_, _| {
            Err(EngineError::MisalignedAddress {
                address: 1,
                align: 4,
            })
        })
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::MisalignedAddress {
                address: 1,
                align: 4
            }
        );
    }
}
