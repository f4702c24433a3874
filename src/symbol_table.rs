// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Name/address symbol bindings with forward-reference tracking.
//!
//! The table is "complete" when every symbol that was ever consumed is
//! also defined. Closure over a whole assembly session is detected by
//! the driver in `closure`, using `symbol_hash` as the stop key; the
//! table itself only records what happened during one pass.
//!
//! Redefinition policy: last write wins, both for a name bound twice and
//! for two names bound to the same address (the address map keeps the
//! most recent binding). This is deliberate and documented rather than
//! an error.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde_json::{json, Value};

use crate::error::EngineError;

/// One symbol binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    /// True once a definition has been seen.
    pub defined: bool,
    /// True once any operand has consulted the value, defined or not.
    pub referenced: bool,
}

/// All symbols of one assembly session.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: BTreeMap<String, Symbol>,
    by_addr: BTreeMap<u64, String>,
    undefined_queries: u64,
    value_changes: u64,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols in the table, defined or not.
    pub fn count(&self) -> usize {
        self.by_name.len()
    }

    /// Create or update a symbol and mark it defined.
    pub fn set_symbol(&mut self, name: &str, value: u64) -> &Symbol {
        match self.by_name.get_mut(name) {
            Some(sym) => {
                if sym.defined && sym.value != value {
                    self.value_changes += 1;
                }
                if sym.value != value && self.by_addr.get(&sym.value).map(String::as_str) == Some(name)
                {
                    self.by_addr.remove(&sym.value);
                }
                sym.value = value;
                sym.defined = true;
            }
            None => {
                self.by_name.insert(
                    name.to_string(),
                    Symbol {
                        name: name.to_string(),
                        value,
                        defined: true,
                        referenced: false,
                    },
                );
            }
        }
        self.by_addr.insert(value, name.to_string());
        &self.by_name[name]
    }

    /// Look up a symbol by name without side effects.
    pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name)
    }

    /// Look up a symbol by name, optionally autogenerating a
    /// referenced-undefined entry when absent.
    pub fn lookup(&mut self, name: &str, autogenerate: bool) -> Result<&Symbol, EngineError> {
        if !autogenerate && !self.by_name.contains_key(name) {
            return Err(EngineError::SymbolNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.reference(name))
    }

    /// Consult a symbol's value, creating an undefined entry if needed
    /// and marking the symbol referenced.
    pub fn reference(&mut self, name: &str) -> &Symbol {
        let sym = self
            .by_name
            .entry(name.to_string())
            .or_insert_with(|| Symbol {
                name: name.to_string(),
                value: 0,
                defined: false,
                referenced: false,
            });
        sym.referenced = true;
        if !sym.defined {
            self.undefined_queries += 1;
        }
        sym
    }

    /// Reverse lookup: the symbol currently bound to `addr`, if any.
    pub fn find_by_address(&self, addr: u64) -> Option<&Symbol> {
        let name = self.by_addr.get(&addr)?;
        self.by_name.get(name)
    }

    /// True iff every referenced symbol is also defined.
    pub fn complete(&self) -> bool {
        self.by_name
            .values()
            .all(|sym| sym.defined || !sym.referenced)
    }

    /// Names that are referenced but never defined, in sorted order.
    pub fn missing_symbols(&self) -> Vec<String> {
        self.by_name
            .values()
            .filter(|sym| sym.referenced && !sym.defined)
            .map(|sym| sym.name.clone())
            .collect()
    }

    /// Fail with the full list of missing names unless the table is
    /// complete. End-of-session check for callers that treat dangling
    /// references as fatal.
    pub fn require_complete(&self) -> Result<(), EngineError> {
        let missing = self.missing_symbols();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::SymbolIncomplete { missing })
        }
    }

    /// Sorted symbol names starting with `prefix`, for interactive
    /// completion.
    pub fn completions(&self, prefix: &str) -> Vec<String> {
        self.by_name
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterate symbols in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.by_name.values()
    }

    /// Reset the table between independent sessions.
    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_addr.clear();
        self.undefined_queries = 0;
        self.value_changes = 0;
    }

    /// Content hash over (name, value, defined) in canonical name order.
    ///
    /// Two subsequent assembly passes producing the same hash have
    /// reached closure. The key is only meaningful within one session.
    pub fn symbol_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for sym in self.by_name.values() {
            sym.name.hash(&mut hasher);
            sym.value.hash(&mut hasher);
            sym.defined.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// How many times an undefined symbol's value has been consulted.
    /// Monotonic; the closure driver compares counts around a pass.
    pub fn undefined_queries(&self) -> u64 {
        self.undefined_queries
    }

    /// How many times a defined symbol has been redefined to a different
    /// value. Monotonic, compared around a pass like `undefined_queries`.
    pub fn value_changes(&self) -> u64 {
        self.value_changes
    }

    /// Snapshot of the table for callers that persist symbols.
    pub fn to_json(&self) -> Value {
        let entries: Vec<Value> = self
            .by_name
            .values()
            .map(|sym| {
                json!({
                    "name": sym.name,
                    "value": sym.value,
                    "defined": sym.defined,
                    "referenced": sym.referenced,
                })
            })
            .collect();
        json!({ "symbols": entries })
    }
}
