//! SWC Plugin for on-demand component imports
//!
//! This plugin rewrites imports of a component library barrel
//! (`import { Button } from 'ui'`) into per-component imports
//! (`import _Button from 'ui/dist/Button'`), optionally adding the matching
//! stylesheet import, so that bundles only contain the components in use.

mod config;
mod import_resolver;
mod import_synthesizer;
mod injector;
mod ledger;
mod paths;
mod visitor;

use std::sync::Mutex;

use once_cell::sync::Lazy;
use swc_core::ecma::ast::Program;
use swc_core::ecma::visit::{as_folder, FoldWith};
use swc_core::plugin::errors::HANDLER;
use swc_core::plugin::{plugin_transform, proxies::TransformPluginProgramMetadata};

pub use config::{Config, ConfigError};
pub use import_synthesizer::ImportSynthesizer;
pub use injector::{ImportInjector, ModuleImports};
pub use ledger::ImportLedger;
pub use paths::path_join;
pub use visitor::OnDemandImportVisitor;

/// Imports synthesized during this run, shared by every file the loaded plugin transforms
static IMPORT_LEDGER: Lazy<Mutex<ImportLedger>> = Lazy::new(|| Mutex::new(ImportLedger::new()));

/// Transforms one program with the JSON plugin configuration
///
/// A configuration error is reported through the SWC diagnostic handler and
/// the program is returned unchanged.
pub fn transform_program(
    program: Program,
    config_json: Option<String>,
    ledger: &mut ImportLedger,
) -> Program {
    let config = match Config::from_json(config_json.as_deref().unwrap_or("{}")) {
        Ok(config) => config,
        Err(err) => {
            HANDLER.with(|handler| handler.struct_err(&err.to_string()).emit());
            return program;
        }
    };

    let visitor = OnDemandImportVisitor::new(config, ledger);
    program.fold_with(&mut as_folder(visitor))
}

/// SWC plugin transform entry point
///
/// This function is called by SWC to transform the AST.
#[plugin_transform]
pub fn process_transform(program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    // Recover the ledger after a panic in an earlier file
    let mut ledger = match IMPORT_LEDGER.lock() {
        Ok(ledger) => ledger,
        Err(poisoned) => poisoned.into_inner(),
    };

    transform_program(
        program,
        metadata.get_transform_plugin_config(),
        &mut ledger,
    )
}
