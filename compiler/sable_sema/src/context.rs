//! The semantic context.
//!
//! `SemaContext` owns everything the lowered IR borrows: interned names, the
//! declaration table, and the interned type pool. It plays the role the
//! original AST context plays for a module: the longer-lived object that
//! uniques identities across one compilation.
//!
//! All mutation goes through `&self`. A module holds `&SemaContext` for its
//! whole lifetime, and lowering keeps interning names and types through that
//! same shared borrow.

use crate::decl::DeclTable;
use crate::types::TypePool;
use crate::{Decl, DeclId, DeclKind, Name, Span, StringInterner, TypeData, TypeIdx};

/// The semantic context for one compilation.
///
/// Outlives every module lowered against it; modules borrow it, never own
/// it.
pub struct SemaContext {
    interner: StringInterner,
    decls: DeclTable,
    types: TypePool,
}

impl SemaContext {
    /// Create an empty context with primitives pre-interned.
    pub fn new() -> Self {
        SemaContext {
            interner: StringInterner::new(),
            decls: DeclTable::new(),
            types: TypePool::new(),
        }
    }

    // ── Names ───────────────────────────────────────────────────────

    /// Intern an identifier.
    pub fn intern_name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Resolve an interned identifier back to its text.
    ///
    /// # Panics
    /// Panics if `name` did not come from this context's interner.
    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.resolve(name)
    }

    // ── Declarations ────────────────────────────────────────────────

    /// Record a declaration and return its id.
    pub fn declare(&self, name: Name, span: Span, kind: DeclKind) -> DeclId {
        self.decls.declare(Decl { name, span, kind })
    }

    /// Look up a declaration record.
    ///
    /// # Panics
    /// Panics if `id` did not come from this context.
    #[track_caller]
    pub fn decl(&self, id: DeclId) -> Decl {
        self.decls.get(id)
    }

    /// Number of recorded declarations.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // ── Types ───────────────────────────────────────────────────────

    /// Intern a type, returning its canonical index.
    pub fn intern_type(&self, data: TypeData) -> TypeIdx {
        self.types.intern(data)
    }

    /// Intern a function type.
    pub fn fn_type(&self, params: &[TypeIdx], result: TypeIdx) -> TypeIdx {
        self.types.intern(TypeData::Fn {
            params: params.to_vec(),
            result,
        })
    }

    /// Intern a tuple type.
    pub fn tuple_type(&self, elems: &[TypeIdx]) -> TypeIdx {
        self.types.intern(TypeData::Tuple {
            elems: elems.to_vec(),
        })
    }

    /// Intern the nominal type of a struct declaration.
    ///
    /// Debug-panics if `decl` is not a struct declaration.
    pub fn struct_type(&self, decl: DeclId, fields: &[TypeIdx]) -> TypeIdx {
        debug_assert_eq!(
            self.decl(decl).kind,
            DeclKind::Struct,
            "struct type over a non-struct declaration",
        );
        self.types.intern(TypeData::Struct {
            decl,
            fields: fields.to_vec(),
        })
    }

    /// Get a copy of the content for a type index.
    ///
    /// # Panics
    /// Panics if `idx` did not come from this context.
    #[track_caller]
    pub fn type_data(&self, idx: TypeIdx) -> TypeData {
        self.types.get(idx)
    }

    /// Check if `idx` is a function type, without cloning its content.
    #[track_caller]
    pub fn is_fn_type(&self, idx: TypeIdx) -> bool {
        self.types.is_fn(idx)
    }

    /// Check if `idx` is a compound (tuple or struct) type.
    #[track_caller]
    pub fn is_compound_type(&self, idx: TypeIdx) -> bool {
        self.types.is_compound(idx)
    }

    /// Number of interned types, primitives included.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render a type to a fresh string.
    pub fn format_type(&self, idx: TypeIdx) -> String {
        let mut out = String::new();
        self.format_type_into(idx, &mut out);
        out
    }

    /// Render a type into an existing buffer.
    ///
    /// Buffer reuse keeps repeated rendering (printing a whole module)
    /// allocation-light.
    pub fn format_type_into(&self, idx: TypeIdx, out: &mut String) {
        match self.types.get(idx) {
            TypeData::Unit => out.push_str("()"),
            TypeData::Bool => out.push_str("bool"),
            TypeData::Int => out.push_str("int"),
            TypeData::Float => out.push_str("float"),
            TypeData::Str => out.push_str("str"),
            TypeData::Fn { params, result } => {
                out.push_str("fn(");
                for (i, &param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.format_type_into(param, out);
                }
                out.push_str(") -> ");
                self.format_type_into(result, out);
            }
            TypeData::Tuple { elems } => {
                out.push('(');
                for (i, &elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.format_type_into(elem, out);
                }
                out.push(')');
            }
            TypeData::Struct { decl, .. } => {
                out.push_str(self.name_str(self.decl(decl).name));
            }
        }
    }
}

impl Default for SemaContext {
    fn default() -> Self {
        Self::new()
    }
}
