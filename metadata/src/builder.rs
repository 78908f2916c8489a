use log::{debug, info};

use crate::{
    decl::{Declaration, FieldDecl, FieldNames, StructType},
    error::MetadataError,
    model::{FieldDescriptor, MetadataSet, StructDescriptor},
    tag::{parse_tag, strip_delimiters},
    type_expr::{resolve_base, resolve_full},
};

/// Options for [`build`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Structs whose name ends with one of these are left out.
    pub ignore_struct_suffix: Vec<String>,
}

impl ParseOptions {
    /// Reads a comma-separated suffix list such as `"Request, Response"`.
    pub fn from_suffix_list(list: &str) -> Self {
        let ignore_struct_suffix = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            ignore_struct_suffix,
        }
    }

    fn is_ignored(&self, struct_name: &str) -> bool {
        self.ignore_struct_suffix
            .iter()
            .any(|suffix| struct_name.ends_with(suffix.as_str()))
    }
}

/// Builds the metadata of every struct in `declarations`.
///
/// Excluded and non-struct declarations are skipped. Any field that fails to
/// resolve or carries a malformed tag aborts the whole build.
pub fn build(
    declarations: &[Declaration],
    options: &ParseOptions,
) -> Result<MetadataSet, MetadataError> {
    let mut structs = Vec::new();

    for declaration in declarations {
        if options.is_ignored(&declaration.name) {
            debug!("skipping {}: excluded by suffix", declaration.name);
            continue;
        }

        let struct_type = match declaration.struct_type() {
            Ok(struct_type) => struct_type,
            Err(MetadataError::NotAStructDeclaration(name)) => {
                debug!("skipping {name}: not a struct");
                continue;
            }
            Err(e) => return Err(e),
        };

        let descriptor = build_struct(&declaration.name, struct_type)?;
        debug!(
            "collected {} with {} fields",
            descriptor.name,
            descriptor.fields.len()
        );
        structs.push(descriptor);
    }

    info!(
        "collected {} structs from {} declarations",
        structs.len(),
        declarations.len()
    );
    Ok(MetadataSet { structs })
}

fn build_struct(name: &str, struct_type: &StructType) -> Result<StructDescriptor, MetadataError> {
    let mut fields = Vec::with_capacity(struct_type.fields.len());
    for field in &struct_type.fields {
        build_fields(field, &mut fields).map_err(|source| MetadataError::Field {
            struct_name: name.to_string(),
            field: match &field.names {
                FieldNames::Embedded => "(embedded)".to_string(),
                FieldNames::Named(names) => names.join(", "),
            },
            source: Box::new(source),
        })?;
    }

    Ok(StructDescriptor {
        name: name.to_string(),
        fields,
    })
}

/// Appends one descriptor per name of `field`, or a single one if it is embedded.
fn build_fields(field: &FieldDecl, out: &mut Vec<FieldDescriptor>) -> Result<(), MetadataError> {
    let type_name = resolve_base(&field.type_expr)?;
    let raw_tag = field.tag.as_deref().map(strip_delimiters);
    let tags = raw_tag.map(parse_tag).transpose()?.unwrap_or_default();

    let descriptor = |name: String, embed: bool| FieldDescriptor {
        type_name: type_name.clone(),
        comment: field.doc.trim_end_matches('\n').to_string(),
        name,
        embed,
        tags: tags.clone(),
        raw_tag: raw_tag.map(str::to_string),
        shape: field.shape(),
    };

    match &field.names {
        FieldNames::Embedded => {
            // An embedded field is named after its type; the `*` of an embedded pointer is not
            // part of that name.
            let full = resolve_full(&field.type_expr)?;
            let name = full.strip_prefix('*').unwrap_or(&full).to_string();
            out.push(descriptor(name, true));
        }
        FieldNames::Named(names) => {
            out.extend(names.iter().map(|name| descriptor(name.clone(), false)));
        }
    }
    Ok(())
}
