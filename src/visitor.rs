use swc_core::ecma::ast::{
    ArrayLit, ArrowExpr, AssignExpr, AssignOp, BinExpr, BinaryOp, BlockStmtOrExpr, CallExpr,
    Callee, CondExpr, ExportDefaultExpr, ExportSpecifier, Expr, ExprOrSpread, Ident, IfStmt,
    JSXElementName, JSXExpr, JSXExprContainer, JSXObject, KeyValueProp, MemberExpr, Module,
    ModuleDecl, ModuleExportName, ModuleItem, NamedExport, NewExpr, Prop, PropName, ReturnStmt,
    VarDeclarator,
};
use swc_core::ecma::utils::prepend_stmts;
use swc_core::ecma::visit::{noop_visit_mut_type, VisitMut, VisitMutWith};

use crate::config::Config;
use crate::import_resolver::{resolve_import, ImportBindings};
use crate::import_synthesizer::ImportSynthesizer;
use crate::injector::ModuleImports;
use crate::ledger::ImportLedger;

/// Visitor replacing references to the configured library with on-demand imports
pub struct OnDemandImportVisitor<'a> {
    /// Run-wide import ledger
    ledger: &'a mut ImportLedger,

    /// Library bindings of the current module
    bindings: ImportBindings,

    /// Module imports declared so far in the current module
    synthesizer: ImportSynthesizer,

    /// Receives the synthesized import declarations
    imports: ModuleImports,
}

impl<'a> OnDemandImportVisitor<'a> {
    pub fn new(config: Config, ledger: &'a mut ImportLedger) -> Self {
        OnDemandImportVisitor {
            ledger,
            bindings: ImportBindings::default(),
            synthesizer: ImportSynthesizer::new(config),
            imports: ModuleImports::default(),
        }
    }

    /// Registers library bindings and drops the imports they replace
    fn resolve_imports(&mut self, items: &mut Vec<ModuleItem>) {
        let library_name = self.synthesizer.config().library_name.clone();
        let bindings = &mut self.bindings;
        let ledger = &*self.ledger;

        items.retain_mut(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import_decl)) => {
                !resolve_import(import_decl, &library_name, bindings, ledger)
            }
            _ => true,
        });
    }

    /// Returns the on-demand binding standing in for `ident`, if it is tracked
    fn resolve_ident(&mut self, ident: &Ident) -> Option<Ident> {
        let module_name = self.bindings.lookup(ident)?.to_string();
        Some(
            self.synthesizer
                .resolve(&module_name, ident.span, self.ledger, &mut self.imports),
        )
    }

    fn rewrite_expr(&mut self, expr: &mut Expr) {
        if let Expr::Ident(ident) = expr {
            if let Some(local) = self.resolve_ident(ident) {
                *expr = Expr::Ident(local);
            }
        }
    }

    fn rewrite_args(&mut self, args: &mut [ExprOrSpread]) {
        for arg in args {
            self.rewrite_expr(&mut arg.expr);
        }
    }
}

impl VisitMut for OnDemandImportVisitor<'_> {
    noop_visit_mut_type!();

    fn visit_mut_module(&mut self, module: &mut Module) {
        self.bindings.clear();
        self.synthesizer.reset();

        self.resolve_imports(&mut module.body);
        if self.bindings.is_empty() {
            return;
        }

        self.imports = ModuleImports::new(module);
        module.visit_mut_children_with(self);

        if !self.imports.is_empty() {
            prepend_stmts(&mut module.body, self.imports.take_imports().into_iter());
        }
    }

    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        if let Callee::Expr(callee) = &mut call.callee {
            self.rewrite_expr(callee);
        }
        self.rewrite_args(&mut call.args);

        call.visit_mut_children_with(self);
    }

    fn visit_mut_new_expr(&mut self, new_expr: &mut NewExpr) {
        self.rewrite_expr(&mut new_expr.callee);
        if let Some(args) = &mut new_expr.args {
            self.rewrite_args(args);
        }

        new_expr.visit_mut_children_with(self);
    }

    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        // Only the receiver; property names are not bindings
        self.rewrite_expr(&mut member.obj);

        member.visit_mut_children_with(self);
    }

    fn visit_mut_assign_expr(&mut self, assign: &mut AssignExpr) {
        if assign.op == AssignOp::Assign {
            self.rewrite_expr(&mut assign.right);
        }

        assign.visit_mut_children_with(self);
    }

    fn visit_mut_array_lit(&mut self, array: &mut ArrayLit) {
        for elem in array.elems.iter_mut().flatten() {
            self.rewrite_expr(&mut elem.expr);
        }

        array.visit_mut_children_with(self);
    }

    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        match prop {
            Prop::KeyValue(key_value) => self.rewrite_expr(&mut key_value.value),
            Prop::Shorthand(ident) => {
                // `{ Button }` keeps its key: `{ Button: _Button }`
                if let Some(local) = self.resolve_ident(ident) {
                    let key = PropName::Ident(ident.clone());
                    *prop = Prop::KeyValue(KeyValueProp {
                        key,
                        value: Box::new(Expr::Ident(local)),
                    });
                }
            }
            _ => {}
        }

        prop.visit_mut_children_with(self);
    }

    fn visit_mut_var_declarator(&mut self, declarator: &mut VarDeclarator) {
        if let Some(init) = &mut declarator.init {
            self.rewrite_expr(init);
        }

        declarator.visit_mut_children_with(self);
    }

    fn visit_mut_bin_expr(&mut self, bin: &mut BinExpr) {
        if matches!(
            bin.op,
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
        ) {
            self.rewrite_expr(&mut bin.left);
            self.rewrite_expr(&mut bin.right);
        }

        bin.visit_mut_children_with(self);
    }

    fn visit_mut_cond_expr(&mut self, cond: &mut CondExpr) {
        self.rewrite_expr(&mut cond.test);
        self.rewrite_expr(&mut cond.cons);
        self.rewrite_expr(&mut cond.alt);

        cond.visit_mut_children_with(self);
    }

    fn visit_mut_if_stmt(&mut self, if_stmt: &mut IfStmt) {
        self.rewrite_expr(&mut if_stmt.test);
        // Comparisons in the test, e.g. `if (Button === other)`
        if let Expr::Bin(bin) = &mut *if_stmt.test {
            self.rewrite_expr(&mut bin.left);
            self.rewrite_expr(&mut bin.right);
        }

        if_stmt.visit_mut_children_with(self);
    }

    fn visit_mut_return_stmt(&mut self, return_stmt: &mut ReturnStmt) {
        if let Some(arg) = &mut return_stmt.arg {
            self.rewrite_expr(arg);
        }

        return_stmt.visit_mut_children_with(self);
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        if let BlockStmtOrExpr::Expr(body) = &mut *arrow.body {
            self.rewrite_expr(body);
        }

        arrow.visit_mut_children_with(self);
    }

    fn visit_mut_export_default_expr(&mut self, export: &mut ExportDefaultExpr) {
        self.rewrite_expr(&mut export.expr);

        export.visit_mut_children_with(self);
    }

    fn visit_mut_named_export(&mut self, export: &mut NamedExport) {
        // `export { Button } from 'other'` names another module's export
        if export.src.is_some() || export.type_only {
            return;
        }

        for specifier in &mut export.specifiers {
            let ExportSpecifier::Named(named) = specifier else {
                continue;
            };
            if named.is_type_only {
                continue;
            }
            let ModuleExportName::Ident(orig) = &named.orig else {
                continue;
            };

            // `export { Button }` becomes `export { _Button as Button }`
            if let Some(local) = self.resolve_ident(orig) {
                let exported = named
                    .exported
                    .take()
                    .unwrap_or_else(|| ModuleExportName::Ident(orig.clone()));
                named.exported = Some(exported);
                named.orig = ModuleExportName::Ident(local);
            }
        }
    }

    fn visit_mut_jsx_expr_container(&mut self, container: &mut JSXExprContainer) {
        if let JSXExpr::Expr(expr) = &mut container.expr {
            self.rewrite_expr(expr);
        }

        container.visit_mut_children_with(self);
    }

    fn visit_mut_jsx_element_name(&mut self, name: &mut JSXElementName) {
        if let JSXElementName::Ident(ident) = name {
            if let Some(local) = self.resolve_ident(ident) {
                *ident = local;
            }
        }

        name.visit_mut_children_with(self);
    }

    fn visit_mut_jsx_object(&mut self, object: &mut JSXObject) {
        if let JSXObject::Ident(ident) = object {
            if let Some(local) = self.resolve_ident(ident) {
                *ident = local;
            }
        }

        object.visit_mut_children_with(self);
    }
}
