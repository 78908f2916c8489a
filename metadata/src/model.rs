use std::fmt;

use serde::Serialize;

use crate::type_expr::TypeShape;

/// The result of one extraction pass: every surviving struct, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetadataSet {
    pub structs: Vec<StructDescriptor>,
}

impl MetadataSet {
    pub fn get(&self, name: &str) -> Option<&StructDescriptor> {
        self.structs.iter().find(|s| s.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One named (or embedded) field of a struct.
///
/// Serializes as `{"type", "comment", "name", "embed", "tags"}`; `tags` is left
/// out when empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Base type name, see [`resolve_base`](crate::resolve_base).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Doc comment without trailing newlines.
    pub comment: String,
    pub name: String,
    pub embed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagEntry>,

    /// The tag as written in the source, delimiters stripped.
    #[serde(skip)]
    pub raw_tag: Option<String>,
    #[serde(skip)]
    pub shape: TypeShape,
}

impl FieldDescriptor {
    pub fn is_ptr(&self) -> bool {
        self.shape.ptr
    }

    pub fn is_array(&self) -> bool {
        self.shape.array
    }

    pub fn is_ptr_array(&self) -> bool {
        self.shape.ptr_array
    }

    pub fn is_array_ptr(&self) -> bool {
        self.shape.array_ptr
    }

    pub fn is_ptr_array_ptr(&self) -> bool {
        self.shape.ptr_array_ptr
    }

    /// The tags rendered back as `key:"value"`, separated by single spaces.
    pub fn tag_string(&self) -> String {
        self.tags
            .iter()
            .map(TagEntry::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    pub name: String,
    pub value: String,
}

impl fmt::Display for TagEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\"{}\"", self.name, self.value)
    }
}
