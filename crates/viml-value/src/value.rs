//! The tagged dynamic value.

use std::rc::Rc;

use crate::heap::{DictId, ListId};

/// `v:true`, `v:false`, `v:null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    False,
    True,
    Null,
}

impl Special {
    pub fn name(self) -> &'static str {
        match self {
            Self::False => "v:false",
            Self::True => "v:true",
            Self::Null => "v:null",
        }
    }
}

/// Type tag of a [`Value`], as reported by `type()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    String,
    Funcref,
    List,
    Dict,
    Float,
    Bool,
    Special,
    Unknown,
}

impl ValueType {
    /// The number `type()` returns for this tag.
    pub fn type_number(self) -> i64 {
        match self {
            Self::Number => 0,
            Self::String => 1,
            Self::Funcref => 2,
            Self::List => 3,
            Self::Dict => 4,
            Self::Float => 5,
            Self::Bool => 6,
            Self::Special | Self::Unknown => 7,
        }
    }
}

/// A runtime value.
///
/// Strings and funcref names are immutable and shared through `Rc`. Lists
/// and dictionaries live in a [`Heap`](crate::Heap) and are referenced by
/// handle; every `Value` holding a handle accounts for one reference.
/// For that reason `Value` is deliberately not `Clone`: duplicating a
/// reference goes through [`Heap::alias`](crate::Heap::alias), which bumps
/// the reference count.
#[derive(Debug, PartialEq)]
pub enum Value {
    Number(i64),
    Float(f64),
    String(Rc<str>),
    List(ListId),
    Dict(DictId),
    Funcref(Rc<str>),
    Special(Special),
    Unknown,
}

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Self::String(Rc::from(text.as_ref()))
    }

    pub fn funcref(name: impl AsRef<str>) -> Self {
        Self::Funcref(Rc::from(name.as_ref()))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::List(_) => ValueType::List,
            Self::Dict(_) => ValueType::Dict,
            Self::Funcref(_) => ValueType::Funcref,
            Self::Special(Special::True | Special::False) => ValueType::Bool,
            Self::Special(Special::Null) => ValueType::Special,
            Self::Unknown => ValueType::Unknown,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Dict(_))
    }

    /// Copy the representation without touching reference counts.
    ///
    /// Only the heap may use this, immediately followed by a retain or as
    /// part of moving a value it already owns.
    pub(crate) fn dup(&self) -> Self {
        match self {
            Self::Number(n) => Self::Number(*n),
            Self::Float(f) => Self::Float(*f),
            Self::String(s) => Self::String(Rc::clone(s)),
            Self::List(id) => Self::List(*id),
            Self::Dict(id) => Self::Dict(*id),
            Self::Funcref(name) => Self::Funcref(Rc::clone(name)),
            Self::Special(special) => Self::Special(*special),
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Special(if value { Special::True } else { Special::False })
    }
}
