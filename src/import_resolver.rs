//! Import resolution for the configured library
//!
//! Records which local bindings refer to the library as a whole and which
//! ones name a single component, and decides whether the original import
//! declaration can be dropped.

use std::collections::HashMap;

use swc_core::ecma::ast::{
    Id, Ident, ImportDecl, ImportNamedSpecifier, ImportSpecifier, ModuleExportName,
};

use crate::ledger::ImportLedger;

/// Local bindings introduced by imports of the configured library
#[derive(Debug, Default)]
pub struct ImportBindings {
    /// Default and namespace bindings, mapped to the library name
    libraries: HashMap<Id, String>,

    /// Named bindings, mapped to the imported (not local) name
    specified: HashMap<Id, String>,
}

impl ImportBindings {
    pub fn add_library(&mut self, local: &Ident, library: &str) {
        self.libraries.insert(local.to_id(), library.to_string());
    }

    pub fn add_specified(&mut self, local: &Ident, imported: &str) {
        self.specified.insert(local.to_id(), imported.to_string());
    }

    /// Resolves a referenced identifier to the module it stands for
    ///
    /// Named bindings take precedence over library bindings. A library
    /// binding resolves to the library name itself.
    pub fn lookup(&self, ident: &Ident) -> Option<&str> {
        let id = ident.to_id();
        self.specified
            .get(&id)
            .or_else(|| self.libraries.get(&id))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty() && self.specified.is_empty()
    }

    pub fn clear(&mut self) {
        self.libraries.clear();
        self.specified.clear();
    }
}

/// Extracts the imported name from a named import specifier
fn extract_imported_name(named: &ImportNamedSpecifier) -> String {
    named
        .imported
        .as_ref()
        .map(|name| match name {
            ModuleExportName::Ident(ident) => ident.sym.to_string(),
            ModuleExportName::Str(str) => str.value.to_string(),
        })
        .unwrap_or_else(|| named.local.sym.to_string())
}

fn is_type_only(specifier: &ImportSpecifier) -> bool {
    matches!(specifier, ImportSpecifier::Named(named) if named.is_type_only)
}

/// Registers the bindings of an import declaration of `library_name`
///
/// # Arguments
///
/// * `import_decl` - The import declaration to inspect
/// * `library_name` - The configured library
/// * `bindings` - The binding tables of the current file
/// * `ledger` - The run-wide import ledger
///
/// # Returns
///
/// `true` if the declaration should be removed from the module. Imports of
/// other sources, type-only imports and imports of a library that was
/// already imported as a whole during this run are kept.
pub fn resolve_import(
    import_decl: &mut ImportDecl,
    library_name: &str,
    bindings: &mut ImportBindings,
    ledger: &ImportLedger,
) -> bool {
    if import_decl.type_only || &*import_decl.src.value != library_name {
        return false;
    }

    for specifier in &import_decl.specifiers {
        match specifier {
            ImportSpecifier::Named(named) if named.is_type_only => {}
            ImportSpecifier::Named(named) => {
                let imported = extract_imported_name(named);
                tracing::debug!(local = %named.local.sym, %imported, "named binding");
                bindings.add_specified(&named.local, &imported);
            }
            ImportSpecifier::Default(default) => {
                tracing::debug!(local = %default.local.sym, "library binding");
                bindings.add_library(&default.local, library_name);
            }
            ImportSpecifier::Namespace(namespace) => {
                tracing::debug!(local = %namespace.local.sym, "library binding");
                bindings.add_library(&namespace.local, library_name);
            }
        }
    }

    if ledger.has_library(library_name) {
        return false;
    }

    if import_decl.specifiers.iter().any(is_type_only) {
        // Types are erased later; only the value specifiers are replaced
        import_decl.specifiers.retain(is_type_only);
        return false;
    }

    true
}
