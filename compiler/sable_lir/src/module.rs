//! The module registry.

use std::fmt;

use rustc_hash::FxHashMap;
use sable_diagnostic::DiagnosticQueue;
use sable_sema::{SemaContext, TypeIdx};

use crate::desc::{CompoundTypeDesc, FnTypeDesc, TypeDesc};
use crate::{DeclKey, LirFunction, print, verify};

/// The root container for one translation unit's lowered IR.
///
/// Owns every lowered function and every cached type descriptor. The module
/// borrows the longer-lived [`SemaContext`] instead of owning it; everything
/// in the module is expressed in that context's names, declarations, and
/// types.
///
/// A module is created through [`ModuleBuilder`](crate::ModuleBuilder), the
/// only holder of structural mutation. The API here is the reader surface:
/// it never adds or removes entries, though individual function bodies stay
/// mutable for later passes.
///
/// Function iteration is insertion-ordered. The table pairs an ordered list
/// with a hash index, so [`functions`](Self::functions) walks definition
/// order while keyed lookup stays O(1).
pub struct LirModule<'ctx> {
    ctx: &'ctx SemaContext,
    /// `(key, function)` pairs in definition order.
    functions: Vec<(DeclKey, LirFunction)>,
    /// Key to `functions` index.
    by_key: FxHashMap<DeclKey, usize>,
    /// Cached descriptors. An entry is never replaced once inserted.
    descs: FxHashMap<TypeIdx, TypeDesc>,
    /// The top-level function, once lowering has produced it.
    toplevel: Option<LirFunction>,
    /// Whether construction reserved a top-level slot at all.
    has_toplevel_slot: bool,
}

impl<'ctx> LirModule<'ctx> {
    pub(crate) fn empty(ctx: &'ctx SemaContext, has_toplevel: bool) -> Self {
        LirModule {
            ctx,
            functions: Vec::new(),
            by_key: FxHashMap::default(),
            descs: FxHashMap::default(),
            toplevel: None,
            has_toplevel_slot: has_toplevel,
        }
    }

    /// The semantic context this module was lowered against.
    pub fn ctx(&self) -> &'ctx SemaContext {
        self.ctx
    }

    // ── Function table ──────────────────────────────────────────────────

    /// Whether a function is registered under `key`.
    pub fn has_function(&self, key: impl Into<DeclKey>) -> bool {
        self.by_key.contains_key(&key.into())
    }

    /// The function registered under `key`.
    ///
    /// # Panics
    ///
    /// Panics if no function is registered under `key`. Use
    /// [`has_function`](Self::has_function) to probe.
    #[track_caller]
    pub fn function(&self, key: impl Into<DeclKey>) -> &LirFunction {
        let key = key.into();
        let &index = self
            .by_key
            .get(&key)
            .unwrap_or_else(|| panic!("no function lowered for {key}"));
        &self.functions[index].1
    }

    /// Mutable access to the function registered under `key`.
    ///
    /// # Panics
    ///
    /// Panics if no function is registered under `key`.
    #[track_caller]
    pub fn function_mut(&mut self, key: impl Into<DeclKey>) -> &mut LirFunction {
        let key = key.into();
        let &index = self
            .by_key
            .get(&key)
            .unwrap_or_else(|| panic!("no function lowered for {key}"));
        &mut self.functions[index].1
    }

    /// Keyed functions in definition order.
    pub fn functions(&self) -> impl Iterator<Item = (DeclKey, &LirFunction)> {
        self.functions.iter().map(|(key, func)| (*key, func))
    }

    /// Number of keyed functions. Excludes the top-level function.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the module has no keyed functions.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    // ── Top-level function ──────────────────────────────────────────────

    /// Whether the top-level function has been set.
    pub fn has_toplevel_fn(&self) -> bool {
        self.toplevel.is_some()
    }

    /// The top-level function.
    ///
    /// # Panics
    ///
    /// Panics if the top-level function has not been set. Use
    /// [`has_toplevel_fn`](Self::has_toplevel_fn) to probe.
    #[track_caller]
    pub fn toplevel_fn(&self) -> &LirFunction {
        self.toplevel
            .as_ref()
            .unwrap_or_else(|| panic!("module has no top-level function"))
    }

    /// Mutable access to the top-level function.
    ///
    /// # Panics
    ///
    /// Panics if the top-level function has not been set.
    #[track_caller]
    pub fn toplevel_fn_mut(&mut self) -> &mut LirFunction {
        self.toplevel
            .as_mut()
            .unwrap_or_else(|| panic!("module has no top-level function"))
    }

    // ── Descriptor cache ────────────────────────────────────────────────

    /// The cached descriptor for `ty`, if one has been cached.
    pub fn desc(&self, ty: TypeIdx) -> Option<&TypeDesc> {
        self.descs.get(&ty)
    }

    /// The cached function descriptor for `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not function-shaped, if no descriptor is cached
    /// for it, or if the cached descriptor is not a function descriptor.
    #[track_caller]
    pub fn fn_desc(&self, ty: TypeIdx) -> &FnTypeDesc {
        if !self.ctx.is_fn_type(ty) {
            panic!("type {} is not a function type", self.ctx.format_type(ty));
        }
        self.expect_desc(ty).as_fn().unwrap_or_else(|| {
            panic!(
                "descriptor for type {} is not a function descriptor",
                self.ctx.format_type(ty),
            )
        })
    }

    /// The cached compound descriptor for `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not compound-shaped, if no descriptor is cached
    /// for it, or if the cached descriptor is not a compound descriptor.
    #[track_caller]
    pub fn compound_desc(&self, ty: TypeIdx) -> &CompoundTypeDesc {
        if !self.ctx.is_compound_type(ty) {
            panic!("type {} is not a compound type", self.ctx.format_type(ty));
        }
        self.expect_desc(ty).as_compound().unwrap_or_else(|| {
            panic!(
                "descriptor for type {} is not a compound descriptor",
                self.ctx.format_type(ty),
            )
        })
    }

    #[track_caller]
    fn expect_desc(&self, ty: TypeIdx) -> &TypeDesc {
        self.descs.get(&ty).unwrap_or_else(|| {
            panic!("no descriptor cached for type {}", self.ctx.format_type(ty))
        })
    }

    // ── Checks and rendering ────────────────────────────────────────────

    /// Check the module's structural invariants.
    ///
    /// Findings are reported through `queue`; verification never aborts,
    /// and a module that fails it is still safe to print and inspect.
    pub fn verify(&self, queue: &mut DiagnosticQueue) {
        verify::verify_module(self, queue);
    }

    /// Render the module into `out`.
    ///
    /// Deterministic for a given module state: keyed functions in
    /// definition order, then the top-level function.
    pub fn print(&self, out: &mut impl fmt::Write) -> fmt::Result {
        print::print_module(self, out)
    }

    /// Render the module to stderr.
    pub fn dump(&self) {
        eprint!("{self}");
    }

    // ── Builder surface ─────────────────────────────────────────────────

    pub(crate) fn insert_function(&mut self, key: DeclKey, func: LirFunction) {
        if key.is_toplevel() {
            panic!("the top-level function goes through set_toplevel, not define_function");
        }
        if self.by_key.contains_key(&key) {
            panic!("function already lowered for {key}");
        }
        self.by_key.insert(key, self.functions.len());
        self.functions.push((key, func));
    }

    pub(crate) fn set_toplevel(&mut self, func: LirFunction) {
        if !self.has_toplevel_slot {
            panic!("module was constructed without a top-level slot");
        }
        if self.toplevel.is_some() {
            panic!("top-level function already set");
        }
        self.toplevel = Some(func);
    }

    pub(crate) fn insert_desc(&mut self, ty: TypeIdx, desc: TypeDesc) {
        if self.descs.contains_key(&ty) {
            panic!("descriptor already cached for type {}", self.ctx.format_type(ty));
        }
        self.descs.insert(ty, desc);
    }
}

impl fmt::Display for LirModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print::print_module(self, f)
    }
}

impl fmt::Debug for LirModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LirModule")
            .field("functions", &self.functions.len())
            .field("descs", &self.descs.len())
            .field("has_toplevel", &self.toplevel.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ModuleBuilder;
    use crate::desc::compute_desc;
    use crate::test_helpers::{declare_fn, test_ctx, unit_fn};

    use super::*;

    #[test]
    fn lookup_by_key() {
        let ctx = test_ctx();
        let decl = declare_fn(&ctx, "main");
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(decl, unit_fn(&ctx, "main"));
        let module = builder.finish();

        assert!(module.has_function(decl));
        assert_eq!(module.len(), 1);
        assert_eq!(ctx.name_str(module.function(decl).name), "main");
    }

    #[test]
    fn missing_key_probes_false() {
        let ctx = test_ctx();
        let decl = declare_fn(&ctx, "ghost");
        let module = ModuleBuilder::new(&ctx, false).finish();

        assert!(!module.has_function(decl));
        assert!(module.is_empty());
    }

    #[test]
    #[should_panic(expected = "no function lowered for decl#0")]
    fn missing_key_lookup_panics() {
        let ctx = test_ctx();
        let decl = declare_fn(&ctx, "ghost");
        let module = ModuleBuilder::new(&ctx, false).finish();
        let _ = module.function(decl);
    }

    #[test]
    fn repeated_lookup_returns_same_function() {
        let ctx = test_ctx();
        let decl = declare_fn(&ctx, "f");
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(decl, unit_fn(&ctx, "f"));
        let module = builder.finish();

        assert!(std::ptr::eq(module.function(decl), module.function(decl)));
    }

    #[test]
    fn iteration_follows_definition_order() {
        let ctx = test_ctx();
        // Declared in one order, defined in another; iteration must follow
        // definition order, not declaration or key order.
        let a = declare_fn(&ctx, "a");
        let b = declare_fn(&ctx, "b");
        let c = declare_fn(&ctx, "c");

        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(c, unit_fn(&ctx, "c"));
        builder.define_function(a, unit_fn(&ctx, "a"));
        builder.define_function(b, unit_fn(&ctx, "b"));
        let module = builder.finish();

        let keys: Vec<DeclKey> = module.functions().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![c.into(), a.into(), b.into()]);
    }

    #[test]
    fn function_mut_edits_in_place() {
        let ctx = test_ctx();
        let decl = declare_fn(&ctx, "f");
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.define_function(decl, unit_fn(&ctx, "f"));
        let mut module = builder.finish();

        let int_fn = ctx.fn_type(&[], TypeIdx::INT);
        let func = module.function_mut(decl);
        func.body.clear();
        func.ty = int_fn;
        let v = func.fresh_value(TypeIdx::INT);
        func.push(crate::Inst::IntConst { dst: v, value: 3 });
        func.push(crate::Inst::Ret { value: Some(v) });

        assert_eq!(module.function(decl).body.len(), 2);
        assert_eq!(module.function(decl).ty, int_fn);
    }

    #[test]
    fn toplevel_lifecycle() {
        let ctx = test_ctx();
        let mut builder = ModuleBuilder::new(&ctx, true);
        assert!(!builder.module().has_toplevel_fn());

        builder.set_toplevel(unit_fn(&ctx, "toplevel"));
        let module = builder.finish();

        assert!(module.has_toplevel_fn());
        assert_eq!(module.toplevel_fn().body.len(), 1);
        // The top-level function is not a keyed entry.
        assert!(module.is_empty());
    }

    #[test]
    #[should_panic(expected = "module has no top-level function")]
    fn unset_toplevel_lookup_panics() {
        let ctx = test_ctx();
        let module = ModuleBuilder::new(&ctx, true).finish();
        let _ = module.toplevel_fn();
    }

    #[test]
    fn desc_probe_is_soft() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let module = ModuleBuilder::new(&ctx, false).finish();

        assert!(module.desc(ty).is_none());
    }

    #[test]
    fn cached_desc_is_stable() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[TypeIdx::INT], TypeIdx::INT);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.ensure_desc(ty);
        let module = builder.finish();

        let Some(first) = module.desc(ty) else {
            panic!("descriptor was cached");
        };
        let Some(second) = module.desc(ty) else {
            panic!("descriptor was cached");
        };
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn fn_desc_narrows() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[TypeIdx::INT], TypeIdx::BOOL);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.ensure_desc(ty);
        let module = builder.finish();

        assert_eq!(module.fn_desc(ty).param_count(), 1);
        assert_eq!(module.fn_desc(ty).result, TypeIdx::BOOL);
    }

    #[test]
    fn compound_desc_narrows() {
        let ctx = test_ctx();
        let ty = ctx.tuple_type(&[TypeIdx::INT, TypeIdx::BOOL]);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.ensure_desc(ty);
        let module = builder.finish();

        assert_eq!(module.compound_desc(ty).field_count(), 2);
    }

    #[test]
    #[should_panic(expected = "is not a function type")]
    fn fn_desc_rejects_non_function_type() {
        let ctx = test_ctx();
        let ty = ctx.tuple_type(&[TypeIdx::INT]);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.ensure_desc(ty);
        let module = builder.finish();
        let _ = module.fn_desc(ty);
    }

    #[test]
    #[should_panic(expected = "is not a compound type")]
    fn compound_desc_rejects_non_compound_type() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.ensure_desc(ty);
        let module = builder.finish();
        let _ = module.compound_desc(ty);
    }

    #[test]
    #[should_panic(expected = "no descriptor cached for type fn() -> ()")]
    fn fn_desc_requires_cached_entry() {
        let ctx = test_ctx();
        let ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let module = ModuleBuilder::new(&ctx, false).finish();
        let _ = module.fn_desc(ty);
    }

    #[test]
    #[should_panic(expected = "is not a function descriptor")]
    fn fn_desc_rejects_mismatched_cache_entry() {
        let ctx = test_ctx();
        let fn_ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let tuple_ty = ctx.tuple_type(&[TypeIdx::INT]);
        let mut builder = ModuleBuilder::new(&ctx, false);
        // Cache a compound descriptor under a function type.
        builder.cache_desc(fn_ty, compute_desc(&ctx, tuple_ty));
        let module = builder.finish();
        let _ = module.fn_desc(fn_ty);
    }

    #[test]
    #[should_panic(expected = "is not a compound descriptor")]
    fn compound_desc_rejects_mismatched_cache_entry() {
        let ctx = test_ctx();
        let fn_ty = ctx.fn_type(&[], TypeIdx::UNIT);
        let tuple_ty = ctx.tuple_type(&[TypeIdx::INT]);
        let mut builder = ModuleBuilder::new(&ctx, false);
        builder.cache_desc(tuple_ty, compute_desc(&ctx, fn_ty));
        let module = builder.finish();
        let _ = module.compound_desc(tuple_ty);
    }
}
