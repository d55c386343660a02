//! Run-wide record of synthesized imports
//!
//! Unlike the per-file binding tables, the ledger lives for a whole compiler
//! run. It is only consulted to suppress component stylesheets once the whole
//! library (and with it the aggregate stylesheet) has been imported, and to
//! detect the import-order hazard.

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Default, Clone)]
pub struct ImportLedger {
    /// Libraries imported as a whole at least once
    libraries: IndexSet<String>,

    /// Component modules imported on demand, per library, in import order
    modules: IndexMap<String, Vec<String>>,
}

impl ImportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a whole-library import of `library` was synthesized this run
    pub fn has_library(&self, library: &str) -> bool {
        self.libraries.contains(library)
    }

    /// Records a whole-library import
    ///
    /// # Returns
    ///
    /// `true` if component modules of the library were already imported on
    /// demand, meaning their stylesheets were emitted before the aggregate one
    pub fn record_library(&mut self, library: &str) -> bool {
        self.libraries.insert(library.to_string());
        !self.modules(library).is_empty()
    }

    /// Records an on-demand component import
    pub fn record_module(&mut self, library: &str, module: &str) {
        self.modules
            .entry(library.to_string())
            .or_default()
            .push(module.to_string());
    }

    /// Component modules imported on demand for `library`, in import order
    pub fn modules(&self, library: &str) -> &[String] {
        self.modules
            .get(library)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
