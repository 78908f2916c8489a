use crate::error::MetadataError;

/// The declared type of a field, as handed over by the source analyzer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// A plain identifier, e.g. `string` or `User`.
    Named(String),
    /// `path.name`, where `path` is usually a package name but may itself be qualified.
    Qualified { path: Box<TypeExpr>, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// An inline `struct { ... }`; its fields are not inspected.
    AnonymousRecord,
    /// Any shape the resolvers don't know about (channels, functions, interfaces, ...).
    /// The string names the shape for error messages.
    Unresolvable(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn qualified(path: TypeExpr, name: impl Into<String>) -> Self {
        Self::Qualified {
            path: Box::new(path),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn slice(element: TypeExpr) -> Self {
        Self::Slice(Box::new(element))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// Renders `expr` with all wrapper syntax (`*`, `[]`, `map[..]`) spelled out.
pub fn resolve_full(expr: &TypeExpr) -> Result<String, MetadataError> {
    match expr {
        TypeExpr::Named(name) => Ok(name.clone()),
        TypeExpr::Pointer(inner) => Ok(format!("*{}", resolve_full(inner)?)),
        TypeExpr::Slice(element) => Ok(format!("[]{}", resolve_full(element)?)),
        TypeExpr::Qualified { path, name } => Ok(format!("{}.{name}", resolve_full(path)?)),
        TypeExpr::Map { key, value } => render_map(key, value),
        TypeExpr::AnonymousRecord => Ok("struct{}".into()),
        TypeExpr::Unresolvable(kind) => Err(MetadataError::UnresolvableType { kind: kind.clone() }),
    }
}

/// Renders the named type underneath any pointer and slice wrappers.
///
/// Maps are the exception: their key and value keep their wrappers, so
/// `map[string]*Bar` stays `map[string]*Bar`. Downstream consumers group on this
/// name, so the asymmetry is kept as is.
pub fn resolve_base(expr: &TypeExpr) -> Result<String, MetadataError> {
    match expr {
        TypeExpr::Named(name) => Ok(name.clone()),
        TypeExpr::Pointer(inner) => resolve_base(inner),
        TypeExpr::Slice(element) => resolve_base(element),
        TypeExpr::Qualified { path, name } => Ok(format!("{}.{name}", resolve_base(path)?)),
        TypeExpr::Map { key, value } => render_map(key, value),
        TypeExpr::AnonymousRecord => Ok("struct{}".into()),
        TypeExpr::Unresolvable(kind) => Err(MetadataError::UnresolvableType { kind: kind.clone() }),
    }
}

fn render_map(key: &TypeExpr, value: &TypeExpr) -> Result<String, MetadataError> {
    Ok(format!("map[{}]{}", resolve_full(key)?, resolve_full(value)?))
}

/// Pointer/slice classification of a field type, looking at the outermost wrappers only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeShape {
    /// `*T`
    pub ptr: bool,
    /// `[]T`
    pub array: bool,
    /// `*[]T`
    pub ptr_array: bool,
    /// `[]*T`
    pub array_ptr: bool,
    /// `*[]*T`
    pub ptr_array_ptr: bool,
}

impl TypeShape {
    pub fn of(expr: &TypeExpr) -> Self {
        let (ptr, array, ptr_array, array_ptr, ptr_array_ptr) = match expr {
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Slice(element) => {
                    let ptr_array_ptr = matches!(element.as_ref(), TypeExpr::Pointer(_));
                    (true, false, true, false, ptr_array_ptr)
                }
                _ => (true, false, false, false, false),
            },
            TypeExpr::Slice(element) => {
                let array_ptr = matches!(element.as_ref(), TypeExpr::Pointer(_));
                (false, true, false, array_ptr, false)
            }
            _ => (false, false, false, false, false),
        };
        Self {
            ptr,
            array,
            ptr_array,
            array_ptr,
            ptr_array_ptr,
        }
    }
}
