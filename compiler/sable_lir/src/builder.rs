//! Module construction.

use sable_sema::{SemaContext, TypeIdx};
use tracing::debug;

use crate::desc::{TypeDesc, compute_desc};
use crate::{DeclKey, LirFunction, LirModule};

/// The construction-time mutation handle for a module.
///
/// Lowering needs rights ordinary readers never get: registering functions,
/// filling the top-level slot, populating the descriptor cache. All of that
/// lives here rather than on [`LirModule`] itself, so once
/// [`finish`](Self::finish) releases the module, nothing downstream can
/// change its structure.
pub struct ModuleBuilder<'ctx> {
    module: LirModule<'ctx>,
}

impl<'ctx> ModuleBuilder<'ctx> {
    /// Start an empty module against `ctx`.
    ///
    /// `has_toplevel` reserves the top-level slot for translation units
    /// with executable top-level code; [`set_toplevel`](Self::set_toplevel)
    /// fills it later. Pure library units pass `false`.
    pub fn new(ctx: &'ctx SemaContext, has_toplevel: bool) -> Self {
        debug!(has_toplevel, "starting module");
        ModuleBuilder {
            module: LirModule::empty(ctx, has_toplevel),
        }
    }

    /// Register the lowered function for `key`.
    ///
    /// # Panics
    ///
    /// Panics if a function is already registered under `key`, or if `key`
    /// is the top-level key.
    #[track_caller]
    pub fn define_function(&mut self, key: impl Into<DeclKey>, func: LirFunction) {
        let key = key.into();
        debug!(%key, insts = func.body.len(), "defining function");
        self.module.insert_function(key, func);
    }

    /// Fill the reserved top-level slot.
    ///
    /// # Panics
    ///
    /// Panics if the module was constructed without a top-level slot, or if
    /// the slot is already filled.
    #[track_caller]
    pub fn set_toplevel(&mut self, func: LirFunction) {
        debug!(insts = func.body.len(), "setting top-level function");
        self.module.set_toplevel(func);
    }

    /// The descriptor for `ty`, computing and caching it on first request.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is neither function- nor compound-shaped.
    #[track_caller]
    pub fn ensure_desc(&mut self, ty: TypeIdx) -> &TypeDesc {
        if self.module.desc(ty).is_none() {
            let desc = compute_desc(self.module.ctx(), ty);
            self.module.insert_desc(ty, desc);
        }
        self.module
            .desc(ty)
            .unwrap_or_else(|| panic!("descriptor vanished after caching"))
    }

    /// Insert a precomputed descriptor for `ty`.
    ///
    /// For descriptors built by a collaborator instead of the default
    /// layout model. The variant is not checked against the type's shape;
    /// the verifier reports mismatches.
    ///
    /// # Panics
    ///
    /// Panics if a descriptor is already cached for `ty`.
    #[track_caller]
    pub fn cache_desc(&mut self, ty: TypeIdx, desc: TypeDesc) {
        debug!(ty = %ty, "caching descriptor");
        self.module.insert_desc(ty, desc);
    }

    /// Read access to the module under construction.
    pub fn module(&self) -> &LirModule<'ctx> {
        &self.module
    }

    /// Finish lowering and release the module.
    pub fn finish(self) -> LirModule<'ctx> {
        debug!(
            functions = self.module.len(),
            has_toplevel = self.module.has_toplevel_fn(),
            "finishing module"
        );
        self.module
    }
}
