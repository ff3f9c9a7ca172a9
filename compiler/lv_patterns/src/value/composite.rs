//! Composite values: enum constants, aggregates, extension objects.

use std::fmt;
use std::sync::Arc;

use lv_ir::Name;
use lv_types::{AggregateDef, EnumDef, TypeId};

use super::{Heap, Value};
use crate::extension::ExtensionObject;

/// A constant of an enum type.
#[derive(Clone, Debug)]
pub struct EnumValue {
    def: Arc<EnumDef>,
    index: usize,
}

impl EnumValue {
    pub(super) fn new(def: Arc<EnumDef>, index: usize) -> Self {
        EnumValue { def, index }
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.def.ty
    }

    /// Position of the constant in the enum declaration.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the constant.
    pub fn name(&self) -> Name {
        self.def.constants.get(self.index).copied().unwrap_or(Name::EMPTY)
    }

    pub fn def(&self) -> &Arc<EnumDef> {
        &self.def
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.def.ty == other.def.ty && self.index == other.index
    }
}

/// An aggregate instance, fields stored in declaration order.
#[derive(Clone, Debug)]
pub struct AggregateValue {
    def: Arc<AggregateDef>,
    fields: Heap<Vec<Value>>,
}

impl AggregateValue {
    pub(super) fn new(def: Arc<AggregateDef>, fields: Vec<Value>) -> Self {
        AggregateValue {
            def,
            fields: Heap::new(fields),
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.def.ty
    }

    pub fn def(&self) -> &Arc<AggregateDef> {
        &self.def
    }

    /// Field by declaration index.
    #[inline]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    /// Field by name.
    pub fn field_named(&self, name: Name) -> Option<&Value> {
        self.field(self.def.field_index(name)?)
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }
}

impl PartialEq for AggregateValue {
    fn eq(&self, other: &Self) -> bool {
        self.def.ty == other.def.ty && self.fields == other.fields
    }
}

/// A host object of an extension type.
///
/// Equality is identity: two extension values are equal only if they wrap
/// the same object.
#[derive(Clone)]
pub struct ExtensionValue {
    ty: TypeId,
    object: Arc<dyn ExtensionObject>,
}

impl ExtensionValue {
    /// Wrap a host object as a value of extension type `ty`.
    pub fn new(ty: TypeId, object: impl ExtensionObject + 'static) -> Self {
        ExtensionValue {
            ty,
            object: Arc::new(object),
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn object(&self) -> &dyn ExtensionObject {
        &*self.object
    }
}

impl PartialEq for ExtensionValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for ExtensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionValue")
            .field("ty", &self.ty)
            .field("object", &self.object)
            .finish()
    }
}
