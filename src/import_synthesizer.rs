//! Per-component import synthesis
//!
//! Maps a component (or the library itself) to its module path and optional
//! stylesheet, and declares each module at most once per file.

use indexmap::IndexMap;
use swc_core::common::Span;
use swc_core::ecma::ast::Ident;
use swc_core::plugin::errors::HANDLER;

use crate::config::Config;
use crate::injector::ImportInjector;
use crate::ledger::ImportLedger;
use crate::paths::path_join;

const IMPORT_ORDER_WARNING: &str = "If you are using both on-demand and importing all, make sure to invoke the importing all first.";

/// Synthesizes imports for the modules referenced in one file
#[derive(Debug)]
pub struct ImportSynthesizer {
    config: Config,

    /// Bindings of modules already declared in this file
    modules: IndexMap<String, Ident>,
}

impl ImportSynthesizer {
    pub fn new(config: Config) -> Self {
        ImportSynthesizer {
            config,
            modules: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forgets the modules declared so far, for a new file
    pub fn reset(&mut self) {
        self.modules.clear();
    }

    /// Module path of a component, or of the library itself
    pub fn module_path(&self, module_name: &str) -> String {
        let config = &self.config;
        if module_name == config.library_name {
            path_join(&[config.library_name.as_str()])
        } else {
            path_join(&[
                config.library_name.as_str(),
                config.library_directory.as_str(),
                module_name,
            ])
        }
    }

    /// Stylesheet path of a component, or the aggregate one of the library
    pub fn style_path(&self, module_name: &str) -> String {
        let config = &self.config;
        let style_name = if module_name == config.library_name {
            "index"
        } else {
            module_name
        };
        let file_name = format!("{}.{}", style_name, config.style_extension);
        path_join(&[
            config.library_name.as_str(),
            config.style_directory.as_str(),
            file_name.as_str(),
        ])
    }

    /// Returns the binding for `module_name`, declaring its import on first use
    ///
    /// # Arguments
    ///
    /// * `module_name` - A component name, or the library name for the whole library
    /// * `span` - The referencing site, used to anchor diagnostics
    /// * `ledger` - The run-wide import ledger
    /// * `injector` - Declares imports in the current file
    ///
    /// # Returns
    ///
    /// The local binding of the module's default export. Repeated calls for the
    /// same module return the same binding without declaring anything.
    pub fn resolve(
        &mut self,
        module_name: &str,
        span: Span,
        ledger: &mut ImportLedger,
        injector: &mut dyn ImportInjector,
    ) -> Ident {
        if let Some(local) = self.modules.get(module_name) {
            return local.clone();
        }

        let library_name = self.config.library_name.as_str();
        let is_library_module = module_name == library_name;
        let module_path = self.module_path(module_name);

        if is_library_module {
            let has_components = ledger.record_library(library_name);
            if self.config.style && has_components {
                report_import_order_hazard(span, library_name);
            }
        } else {
            ledger.record_module(library_name, module_name);
        }

        // Once the whole library is in, its aggregate stylesheet covers every component
        if self.config.style && (is_library_module || !ledger.has_library(library_name)) {
            let style_path = self.style_path(module_name);
            tracing::debug!(%style_path, "declaring stylesheet import");
            injector.declare_side_effect_import(&style_path);
        }

        tracing::debug!(%module_path, "declaring module import");
        let local = injector.declare_module_import(&module_path, module_name);
        self.modules.insert(module_name.to_string(), local.clone());
        local
    }
}

fn report_import_order_hazard(span: Span, library_name: &str) {
    let message = format!("[{}] {}", env!("CARGO_PKG_NAME"), IMPORT_ORDER_WARNING);
    tracing::warn!(library = library_name, "{}", message);

    if HANDLER.is_set() {
        HANDLER.with(|handler| handler.struct_span_warn(span, &message).emit());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use swc_core::common::DUMMY_SP;

    const HAZARD_MESSAGE: &str = "[swc_plugin_import_on_demand] If you are using both on-demand and importing all, make sure to invoke the importing all first.";

    /// Log output shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `op` with warnings captured, returning the formatted output
    fn capture_warnings(op: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, op);

        let output = logs.0.lock().unwrap();
        String::from_utf8_lossy(&output).into_owned()
    }

    /// Records declared imports instead of building AST nodes
    #[derive(Default)]
    struct RecordingInjector {
        modules: Vec<String>,
        side_effects: Vec<String>,
        /// Every declaration in order, side effects prefixed with `side-effect:`
        order: Vec<String>,
    }

    impl ImportInjector for RecordingInjector {
        fn declare_module_import(&mut self, module_path: &str, name_hint: &str) -> Ident {
            self.modules.push(module_path.to_string());
            self.order.push(module_path.to_string());
            Ident::new(format!("_{}", name_hint).into(), DUMMY_SP)
        }

        fn declare_side_effect_import(&mut self, module_path: &str) {
            self.side_effects.push(module_path.to_string());
            self.order.push(format!("side-effect:{}", module_path));
        }
    }

    fn config(style: bool) -> Config {
        Config {
            library_name: "ui".to_string(),
            style,
            ..Config::default()
        }
    }

    #[test]
    fn test_module_paths() {
        let synthesizer = ImportSynthesizer::new(config(false));
        assert_eq!(synthesizer.module_path("ui"), "ui");
        assert_eq!(synthesizer.module_path("Button"), "ui/dist/Button");

        let synthesizer = ImportSynthesizer::new(Config {
            library_directory: String::new(),
            ..config(false)
        });
        assert_eq!(synthesizer.module_path("Button"), "ui/Button");
    }

    #[test]
    fn test_style_paths() {
        let synthesizer = ImportSynthesizer::new(config(true));
        assert_eq!(synthesizer.style_path("Button"), "ui/dist/Button.css");
        assert_eq!(synthesizer.style_path("ui"), "ui/dist/index.css");

        let synthesizer = ImportSynthesizer::new(Config {
            style_directory: "es/style".to_string(),
            style_extension: "less".to_string(),
            ..config(true)
        });
        assert_eq!(synthesizer.style_path("Button"), "ui/es/style/Button.less");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut synthesizer = ImportSynthesizer::new(config(true));
        let mut ledger = ImportLedger::new();
        let mut injector = RecordingInjector::default();

        let first = synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        let second = synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);

        assert_eq!(first.sym, second.sym);
        assert_eq!(injector.modules, vec!["ui/dist/Button"]);
        assert_eq!(injector.side_effects, vec!["ui/dist/Button.css"]);
        assert_eq!(ledger.modules("ui"), &["Button"]);
    }

    #[test]
    fn test_resolve_without_style() {
        let mut synthesizer = ImportSynthesizer::new(config(false));
        let mut ledger = ImportLedger::new();
        let mut injector = RecordingInjector::default();

        synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);

        assert_eq!(injector.modules, vec!["ui/dist/Button", "ui"]);
        assert!(injector.side_effects.is_empty());
        assert!(ledger.has_library("ui"));
    }

    #[test]
    fn test_style_import_precedes_module_import() {
        let mut synthesizer = ImportSynthesizer::new(config(true));
        let mut ledger = ImportLedger::new();
        let mut injector = RecordingInjector::default();

        synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);

        assert_eq!(
            injector.order,
            vec!["side-effect:ui/dist/index.css", "ui"]
        );
    }

    #[test]
    fn test_whole_library_suppresses_component_styles() {
        let mut ledger = ImportLedger::new();

        // First file imports the whole library
        let mut synthesizer = ImportSynthesizer::new(config(true));
        let mut injector = RecordingInjector::default();
        synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);
        assert_eq!(injector.side_effects, vec!["ui/dist/index.css"]);

        // A later file only gets the component module
        let mut synthesizer = ImportSynthesizer::new(config(true));
        let mut injector = RecordingInjector::default();
        synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        assert_eq!(injector.modules, vec!["ui/dist/Button"]);
        assert!(injector.side_effects.is_empty());
    }

    #[test]
    fn test_whole_library_after_components() {
        let mut ledger = ImportLedger::new();
        let mut synthesizer = ImportSynthesizer::new(config(true));
        let mut injector = RecordingInjector::default();

        synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        // Warns about the order, but still imports the aggregate stylesheet
        synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);
        synthesizer.resolve("Input", DUMMY_SP, &mut ledger, &mut injector);

        assert_eq!(
            injector.side_effects,
            vec!["ui/dist/Button.css", "ui/dist/index.css"]
        );
        assert_eq!(
            injector.modules,
            vec!["ui/dist/Button", "ui", "ui/dist/Input"]
        );
        assert_eq!(ledger.modules("ui"), &["Button", "Input"]);
    }

    #[test]
    fn test_reset_forgets_declared_modules() {
        let mut synthesizer = ImportSynthesizer::new(config(false));
        let mut ledger = ImportLedger::new();
        let mut injector = RecordingInjector::default();

        synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        synthesizer.reset();
        synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);

        assert_eq!(injector.modules, vec!["ui/dist/Button", "ui/dist/Button"]);
        assert_eq!(synthesizer.config().library_name, "ui");
    }

    #[test]
    fn test_import_order_warning() {
        let mut ledger = ImportLedger::new();
        let output = capture_warnings(|| {
            let mut synthesizer = ImportSynthesizer::new(config(true));
            let mut injector = RecordingInjector::default();
            synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
            synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);
        });

        assert!(output.contains(HAZARD_MESSAGE), "missing warning in: {}", output);
        assert_eq!(output.matches(HAZARD_MESSAGE).count(), 1);
    }

    #[test]
    fn test_no_import_order_warning_without_style() {
        let mut ledger = ImportLedger::new();
        let output = capture_warnings(|| {
            let mut synthesizer = ImportSynthesizer::new(config(false));
            let mut injector = RecordingInjector::default();
            synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
            synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);
        });

        assert!(!output.contains(HAZARD_MESSAGE), "unexpected warning in: {}", output);
        assert!(ledger.has_library("ui"));
    }

    #[test]
    fn test_no_import_order_warning_when_library_comes_first() {
        let mut ledger = ImportLedger::new();
        let output = capture_warnings(|| {
            let mut synthesizer = ImportSynthesizer::new(config(true));
            let mut injector = RecordingInjector::default();
            synthesizer.resolve("ui", DUMMY_SP, &mut ledger, &mut injector);
            synthesizer.resolve("Button", DUMMY_SP, &mut ledger, &mut injector);
        });

        assert!(!output.contains(HAZARD_MESSAGE), "unexpected warning in: {}", output);
    }
}
