use std::{fmt, str::FromStr};

use crate::{error::MetadataError, model::MetadataSet};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `Struct  Type  Field  Tags  Comment`
    #[default]
    Full,
    /// `Struct  Type  Field`
    Short,
    Json,
}

impl FromStr for OutputFormat {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" | "tsv" => Ok(Self::Full),
            "short" | "tsvshort" => Ok(Self::Short),
            "json" => Ok(Self::Json),
            other => Err(MetadataError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub format: OutputFormat,
}

/// Tab-separated rows, one per field, with an empty line after every struct.
struct Tsv<'a> {
    set: &'a MetadataSet,
    short: bool,
}

impl fmt::Display for Tsv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for st in &self.set.structs {
            for field in &st.fields {
                if self.short {
                    writeln!(f, "{}\t{}\t{}", st.name, field.type_name, field.name)?;
                } else {
                    writeln!(
                        f,
                        "{}\t{}\t{}\t{}\t{}",
                        st.name,
                        field.type_name,
                        field.name,
                        field.tag_string(),
                        field.comment
                    )?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders `set` in the selected format.
pub fn emit(set: &MetadataSet, options: &OutputOptions) -> Result<Vec<u8>, MetadataError> {
    let output = match options.format {
        OutputFormat::Full => Tsv { set, short: false }.to_string().into_bytes(),
        OutputFormat::Short => Tsv { set, short: true }.to_string().into_bytes(),
        OutputFormat::Json => serde_json::to_vec_pretty(set)?,
    };
    Ok(output)
}
