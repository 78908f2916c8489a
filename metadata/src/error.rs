use thiserror::Error;

/// What made a tag unreadable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagDefect {
    EmptyKey,
    MissingColon,
    UnterminatedValue,
    InvalidEscape,
}

impl std::fmt::Display for TagDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::EmptyKey => "empty key",
            Self::MissingColon => "key is not followed by `:\"`",
            Self::UnterminatedValue => "unterminated quoted value",
            Self::InvalidEscape => "invalid escape sequence in value",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("can't detect type name of `{kind}` expression")]
    UnresolvableType { kind: String },

    /// Only used to skip declarations; the builder never returns it.
    #[error("{0} is not a struct declaration")]
    NotAStructDeclaration(String),

    #[error("malformed tag `{tag}` at byte {offset}: {reason}")]
    MalformedTag {
        tag: String,
        offset: usize,
        reason: TagDefect,
    },

    #[error("format {0:?} is not supported (expected full, short or json)")]
    UnsupportedFormat(String),

    #[error("in field {struct_name}.{field}")]
    Field {
        struct_name: String,
        field: String,
        #[source]
        source: Box<MetadataError>,
    },

    #[error("failed to encode metadata as JSON")]
    Json(#[from] serde_json::Error),
}

impl MetadataError {
    /// Strips any field context and returns the underlying error.
    pub fn root(&self) -> &MetadataError {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }
}
