//! Human-readable type names for diagnostics.

use crate::{TypeId, TypeKind, TypeRegistry};

impl TypeRegistry {
    /// Render a type the way a user would write it.
    ///
    /// Nominal types render as their declared name, tuples as `(a, b)`,
    /// pointers as `*T`.
    pub fn display(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.display_into(ty, &mut out);
        out
    }

    fn display_into(&self, ty: TypeId, out: &mut String) {
        let Some(entry) = self.get(ty) else {
            out.push_str("<unknown>");
            return;
        };
        match &entry.kind {
            TypeKind::Int => out.push_str("int"),
            TypeKind::Bool => out.push_str("bool"),
            TypeKind::Char => out.push_str("char"),
            TypeKind::Str => out.push_str("str"),
            TypeKind::Unit => out.push_str("()"),
            TypeKind::Tuple(elements) => {
                out.push('(');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.display_into(*element, out);
                }
                out.push(')');
            }
            TypeKind::Pointer(pointee) => {
                out.push('*');
                self.display_into(*pointee, out);
            }
            TypeKind::Declared
            | TypeKind::Enum(_)
            | TypeKind::Union(_)
            | TypeKind::Aggregate(_)
            | TypeKind::Extension(_) => out.push_str(self.name_str(entry.name)),
        }
    }

    /// Short description of what kind of type this is ("union", "tuple", ...).
    pub fn describe_kind(&self, ty: TypeId) -> &'static str {
        match self.kind(ty) {
            Some(TypeKind::Int | TypeKind::Bool | TypeKind::Char | TypeKind::Str | TypeKind::Unit) => {
                "primitive"
            }
            Some(TypeKind::Declared) => "undefined type",
            Some(TypeKind::Enum(_)) => "enum",
            Some(TypeKind::Union(_)) => "union",
            Some(TypeKind::Aggregate(_)) => "aggregate",
            Some(TypeKind::Tuple(_)) => "tuple",
            Some(TypeKind::Pointer(_)) => "pointer",
            Some(TypeKind::Extension(_)) => "extension type",
            None => "unknown type",
        }
    }
}
