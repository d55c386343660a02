//! Import insertion for the current module
//!
//! The synthesizer never touches the module body directly. It asks an
//! [`ImportInjector`] to declare imports and gets back the binding to use at
//! every rewritten site.

use std::collections::HashSet;

use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
    Ident, ImportDecl, ImportDefaultSpecifier, ImportSpecifier, Module, ModuleDecl, ModuleItem,
    Str,
};
use swc_core::ecma::visit::{Visit, VisitWith};

/// Host capability for adding imports to the file being transformed
pub trait ImportInjector {
    /// Declares `import <binding> from "<module_path>"` and returns the binding
    fn declare_module_import(&mut self, module_path: &str, name_hint: &str) -> Ident;

    /// Declares `import "<module_path>"`
    fn declare_side_effect_import(&mut self, module_path: &str);
}

/// Collects imports synthesized for one module
#[derive(Debug, Default)]
pub struct ModuleImports {
    /// Every identifier symbol in use, including generated ones
    used_names: HashSet<String>,

    /// Synthesized imports, in declaration order
    imports: Vec<ModuleItem>,
}

impl ModuleImports {
    /// Creates an injector that avoids every identifier already used in `module`
    pub fn new(module: &Module) -> Self {
        let mut collector = NameCollector::default();
        module.visit_with(&mut collector);

        ModuleImports {
            used_names: collector.names,
            imports: Vec::new(),
        }
    }

    /// Generates a binding name based on `name_hint` that is not used yet
    ///
    /// Produces `_hint`, then `_hint2`, `_hint3`, ... on collision.
    pub fn generate_uid(&mut self, name_hint: &str) -> Ident {
        let base = to_identifier(name_hint);

        let mut index = 1;
        let name = loop {
            let candidate = if index > 1 {
                format!("_{}{}", base, index)
            } else {
                format!("_{}", base)
            };
            if !self.used_names.contains(&candidate) {
                break candidate;
            }
            index += 1;
        };

        self.used_names.insert(name.clone());
        Ident::new(name.into(), DUMMY_SP)
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Takes the synthesized imports, leaving the injector empty
    pub fn take_imports(&mut self) -> Vec<ModuleItem> {
        std::mem::take(&mut self.imports)
    }

    fn push_import(&mut self, module_path: &str, specifiers: Vec<ImportSpecifier>) {
        self.imports
            .push(ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
                span: DUMMY_SP,
                specifiers,
                src: Box::new(Str {
                    span: DUMMY_SP,
                    value: module_path.into(),
                    raw: None,
                }),
                type_only: false,
                with: None,
            })));
    }
}

impl ImportInjector for ModuleImports {
    fn declare_module_import(&mut self, module_path: &str, name_hint: &str) -> Ident {
        let local = self.generate_uid(name_hint);
        self.push_import(
            module_path,
            vec![ImportSpecifier::Default(ImportDefaultSpecifier {
                span: DUMMY_SP,
                local: local.clone(),
            })],
        );
        local
    }

    fn declare_side_effect_import(&mut self, module_path: &str) {
        self.push_import(module_path, Vec::new());
    }
}

#[derive(Default)]
struct NameCollector {
    names: HashSet<String>,
}

impl Visit for NameCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        self.names.insert(ident.sym.to_string());
    }
}

fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || unicode_ident::is_xid_start(c)
}

fn is_id_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

/// Converts an arbitrary name into a camelCased JavaScript identifier
///
/// Characters that cannot appear in an identifier act as word separators:
/// `ui-lib` becomes `uiLib`, `@scope/ui` becomes `scopeUi`.
pub fn to_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        let valid = if result.is_empty() {
            is_id_start(c)
        } else {
            is_id_continue(c)
        };

        if !valid {
            upper_next = !result.is_empty();
            continue;
        }

        if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    if result.is_empty() {
        "_".to_string()
    } else {
        result
    }
}
