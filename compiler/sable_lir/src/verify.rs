//! Structural verification of lowered modules.
//!
//! The verifier checks invariants that lowering is supposed to uphold but
//! that the registry cannot enforce at insertion time: function types are
//! function-shaped, bodies terminate exactly once, values are defined
//! before use, referenced functions exist, and cached descriptors match
//! their types.
//!
//! Findings flow through the diagnostic queue; verification never aborts.
//! Registry contract violations (looking up a missing key, defining a key
//! twice) are panics in the module API, not verifier findings.

use sable_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use sable_sema::{SemaContext, TypeData};
use tracing::debug;

use crate::print::render_key;
use crate::{DeclKey, LirFunction, LirModule, TypeDesc};

pub(crate) fn verify_module(module: &LirModule<'_>, queue: &mut DiagnosticQueue) {
    let mut verifier = Verifier { module, queue };
    for (key, func) in module.functions() {
        verifier.verify_fn(key, func);
    }
    if module.has_toplevel_fn() {
        verifier.verify_fn(DeclKey::Toplevel, module.toplevel_fn());
    }
}

struct Verifier<'a, 'ctx> {
    module: &'a LirModule<'ctx>,
    queue: &'a mut DiagnosticQueue,
}

impl Verifier<'_, '_> {
    fn ctx(&self) -> &SemaContext {
        self.module.ctx()
    }

    fn verify_fn(&mut self, key: DeclKey, func: &LirFunction) {
        debug!(%key, insts = func.body.len(), "verifying function");
        self.check_fn_type(key, func);
        self.check_terminator(key, func);
        self.check_def_before_use(key, func);
        self.check_fn_refs(key, func);
        self.check_desc(key, func);
    }

    /// The function's type must be function-shaped.
    fn check_fn_type(&mut self, key: DeclKey, func: &LirFunction) {
        if !self.ctx().is_fn_type(func.ty) {
            let name = render_key(self.ctx(), key);
            self.queue.add(
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!(
                        "function `{name}` registered with non-function type `{}`",
                        self.ctx().format_type(func.ty),
                    ))
                    .with_label(func.span, "lowered from this declaration"),
            );
        }
    }

    /// The body must be non-empty, end with a terminator, and have no
    /// terminator anywhere else.
    fn check_terminator(&mut self, key: DeclKey, func: &LirFunction) {
        let name = render_key(self.ctx(), key);
        match func.body.last() {
            None => {
                self.queue.add(
                    Diagnostic::error(ErrorCode::E4002)
                        .with_message(format!("function `{name}` has an empty body"))
                        .with_label(func.span, "lowered from this declaration"),
                );
                return;
            }
            Some(last) if !last.is_terminator() => {
                self.queue.add(
                    Diagnostic::error(ErrorCode::E4002)
                        .with_message(format!("function `{name}` does not end with `ret`"))
                        .with_label(func.span, "lowered from this declaration"),
                );
            }
            Some(_) => {}
        }
        // Body is non-empty past the early return above.
        let interior = &func.body[..func.body.len() - 1];
        for (index, inst) in interior.iter().enumerate() {
            if inst.is_terminator() {
                self.queue.add(
                    Diagnostic::error(ErrorCode::E4003)
                        .with_message(format!(
                            "function `{name}` has `ret` before the end of the body",
                        ))
                        .with_label(func.span, "lowered from this declaration")
                        .with_note(format!(
                            "instruction {index} terminates but {} follow it",
                            func.body.len() - index - 1,
                        )),
                );
            }
        }
    }

    /// Every operand must name a value defined by an earlier instruction,
    /// and no value may be defined twice.
    fn check_def_before_use(&mut self, key: DeclKey, func: &LirFunction) {
        let name = render_key(self.ctx(), key);
        let mut defined = vec![false; func.value_count()];
        for inst in &func.body {
            for used in inst.used_values() {
                if !defined.get(used.index()).copied().unwrap_or(false) {
                    self.queue.add(
                        Diagnostic::error(ErrorCode::E4004)
                            .with_message(format!(
                                "value {used} used before definition in `{name}`",
                            ))
                            .with_label(func.span, "lowered from this declaration"),
                    );
                }
            }
            if let Some(dst) = inst.defined_value() {
                match defined.get_mut(dst.index()) {
                    Some(slot) if *slot => {
                        self.queue.add(
                            Diagnostic::error(ErrorCode::E4004)
                                .with_message(format!(
                                    "value {dst} defined more than once in `{name}`",
                                ))
                                .with_label(func.span, "lowered from this declaration"),
                        );
                    }
                    Some(slot) => *slot = true,
                    None => {
                        self.queue.add(
                            Diagnostic::error(ErrorCode::E4004)
                                .with_message(format!(
                                    "value {dst} was never allocated by `{name}`",
                                ))
                                .with_label(func.span, "lowered from this declaration")
                                .with_note(format!(
                                    "the function allocated {} values",
                                    func.value_count(),
                                )),
                        );
                    }
                }
            }
        }
    }

    /// Every `fnref` must name a function registered in the module.
    fn check_fn_refs(&mut self, key: DeclKey, func: &LirFunction) {
        for inst in &func.body {
            let Some(callee) = inst.callee_key() else {
                continue;
            };
            let resolved = match callee {
                DeclKey::Toplevel => self.module.has_toplevel_fn(),
                DeclKey::Decl(_) => self.module.has_function(callee),
            };
            if !resolved {
                let name = render_key(self.ctx(), key);
                let callee_name = render_key(self.ctx(), callee);
                self.queue.add(
                    Diagnostic::error(ErrorCode::E4005)
                        .with_message(format!(
                            "`{name}` references `{callee_name}`, which is not in the module",
                        ))
                        .with_label(func.span, "lowered from this declaration")
                        .with_note("functions resolve each other through the module by key"),
                );
            }
        }
    }

    /// A descriptor cached for the function's type must be a function
    /// descriptor agreeing with the type's signature.
    fn check_desc(&mut self, key: DeclKey, func: &LirFunction) {
        let Some(desc) = self.module.desc(func.ty) else {
            return;
        };
        let name = render_key(self.ctx(), key);
        let rendered = self.ctx().format_type(func.ty);
        match desc {
            TypeDesc::Compound(_) => {
                self.queue.add(
                    Diagnostic::error(ErrorCode::E4006)
                        .with_message(format!(
                            "descriptor cached for `{rendered}` is a compound descriptor",
                        ))
                        .with_label(func.span, format!("type of `{name}`")),
                );
            }
            TypeDesc::Fn(fn_desc) => {
                if let TypeData::Fn { params, .. } = self.ctx().type_data(func.ty) {
                    if fn_desc.param_count() != params.len() {
                        self.queue.add(
                            Diagnostic::error(ErrorCode::E4006)
                                .with_message(format!(
                                    "descriptor for `{rendered}` records {} parameters, \
                                     but the type has {}",
                                    fn_desc.param_count(),
                                    params.len(),
                                ))
                                .with_label(func.span, format!("type of `{name}`")),
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sable_diagnostic::{DiagnosticQueue, ErrorCode};
    use sable_sema::{Span, TypeIdx};

    use crate::test_helpers::{declare_fn, ret_const_fn, test_ctx, unit_fn};
    use crate::{Inst, LirFunction, ModuleBuilder, TypeDesc, ValueId, compute_desc};

    fn codes(queue: &mut DiagnosticQueue) -> Vec<ErrorCode> {
        queue.flush().iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_module_verifies_quietly() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let g = declare_fn(&ctx, "g");

        let mut builder = ModuleBuilder::new(&ctx, true);
        builder.define_function(f, ret_const_fn(&ctx, "f", 1));
        builder.define_function(g, unit_fn(&ctx, "g"));
        builder.set_toplevel(unit_fn(&ctx, "script"));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert!(queue.has_errors().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn non_function_type_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");

        let mut func = LirFunction::new(ctx.intern_name("f"), TypeIdx::INT, Span::DUMMY);
        func.push(Inst::Ret { value: None });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4001]);
    }

    #[test]
    fn empty_body_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4002]);
    }

    #[test]
    fn missing_terminator_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::INT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        let v = func.fresh_value(TypeIdx::INT);
        func.push(Inst::IntConst { dst: v, value: 1 });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4002]);
    }

    #[test]
    fn interior_terminator_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        func.push(Inst::Ret { value: None });
        func.push(Inst::Ret { value: None });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4003]);
    }

    #[test]
    fn use_before_definition_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::INT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        let v = func.fresh_value(TypeIdx::INT);
        // Returns `v` without ever defining it.
        func.push(Inst::Ret { value: Some(v) });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4004]);
    }

    #[test]
    fn double_definition_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::INT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        let v = func.fresh_value(TypeIdx::INT);
        func.push(Inst::IntConst { dst: v, value: 1 });
        func.push(Inst::IntConst { dst: v, value: 2 });
        func.push(Inst::Ret { value: Some(v) });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4004]);
    }

    #[test]
    fn unallocated_value_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        // Writes to %7 without allocating any values.
        func.push(Inst::IntConst { dst: ValueId::new(7), value: 1 });
        func.push(Inst::Ret { value: None });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4004]);
    }

    #[test]
    fn dangling_fn_ref_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ghost = declare_fn(&ctx, "ghost");
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut func = LirFunction::new(ctx.intern_name("f"), ty, Span::DUMMY);
        let fr = func.fresh_value(ctx.fn_type(&[], TypeIdx::UNIT));
        func.push(Inst::FnRef { dst: fr, callee: ghost.into() });
        func.push(Inst::Ret { value: None });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4005]);
    }

    #[test]
    fn fn_ref_to_registered_function_is_clean() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let g = declare_fn(&ctx, "g");
        let unit_fn_ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut func = LirFunction::new(ctx.intern_name("f"), unit_fn_ty, Span::DUMMY);
        let fr = func.fresh_value(unit_fn_ty);
        func.push(Inst::FnRef { dst: fr, callee: g.into() });
        func.push(Inst::Ret { value: None });

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, func);
        builder.define_function(g, unit_fn(&ctx, "g"));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert!(queue.has_errors().is_none());
    }

    #[test]
    fn mismatched_descriptor_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let fn_ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let tuple_ty = ctx.tuple_type(&[TypeIdx::INT]);

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, unit_fn(&ctx, "f"));
        // A compound descriptor cached under the function's type.
        builder.cache_desc(fn_ty, compute_desc(&ctx, tuple_ty));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4006]);
    }

    #[test]
    fn parameter_count_drift_reported() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let no_params = ctx.fn_type(&[], TypeIdx::UNIT);
        let two_params = ctx.fn_type(&[TypeIdx::INT, TypeIdx::INT], TypeIdx::UNIT);

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, unit_fn(&ctx, "f"));
        // A descriptor computed for a different signature cached under the
        // function's type.
        let Some(mismatched) = compute_desc(&ctx, two_params).as_fn().cloned() else {
            panic!("expected a function descriptor");
        };
        builder.cache_desc(no_params, TypeDesc::Fn(mismatched));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4006]);
    }

    #[test]
    fn matching_descriptor_is_clean() {
        let ctx = test_ctx();
        let f = declare_fn(&ctx, "f");
        let ty = ctx.fn_type(&[], TypeIdx::INT);

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(f, ret_const_fn(&ctx, "f", 1));
        builder.ensure_desc(ty);
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert!(queue.has_errors().is_none());
    }

    #[test]
    fn toplevel_body_is_verified_too() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut builder = ModuleBuilder::new(&ctx, true);
        builder.set_toplevel(LirFunction::new(ctx.intern_name("script"), ty, Span::DUMMY));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(codes(&mut queue), vec![ErrorCode::E4002]);
    }

    #[test]
    fn findings_accumulate_across_functions() {
        let ctx = test_ctx();
        let a = declare_fn(&ctx, "a");
        let b = declare_fn(&ctx, "b");
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(a, LirFunction::new(ctx.intern_name("a"), ty, Span::DUMMY));
        builder.define_function(b, LirFunction::new(ctx.intern_name("b"), ty, Span::DUMMY));
        let module = builder.finish();

        let mut queue = DiagnosticQueue::new();
        module.verify(&mut queue);
        assert_eq!(queue.error_count(), 2);
        let Some(_proof) = queue.has_errors() else {
            panic!("two empty bodies must produce errors");
        };
    }
}
