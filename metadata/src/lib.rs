//! Structural metadata of struct declarations: resolves field types, reads
//! field tags, and renders the result as TSV or JSON.

pub mod builder;
pub mod decl;
pub mod emit;
pub mod error;
pub mod model;
pub mod tag;
pub mod type_expr;

pub use builder::{build, ParseOptions};
pub use decl::{Declaration, DeclarationBody, DeclarationError, FieldDecl, FieldNames, Package};
pub use emit::{emit, OutputFormat, OutputOptions};
pub use error::{MetadataError, TagDefect};
pub use model::{FieldDescriptor, MetadataSet, StructDescriptor, TagEntry};
pub use type_expr::{resolve_base, resolve_full, TypeExpr, TypeShape};
