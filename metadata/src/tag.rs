//! Reader for field tags of the form `key:"value" key2:"value2"`.
//!
//! Pairs are separated by runs of ASCII whitespace. A key is any run of
//! printable, non-space characters other than `:` and `"`, and must be followed
//! immediately by a double-quoted value.

use crate::{
    error::{MetadataError, TagDefect},
    model::TagEntry,
};

/// One `key:"value"` occurrence, value still quoted.
struct RawPair<'a> {
    key: &'a str,
    quoted: &'a str,
    offset: usize,
}

fn malformed(tag: &str, offset: usize, reason: TagDefect) -> MetadataError {
    MetadataError::MalformedTag {
        tag: tag.to_string(),
        offset,
        reason,
    }
}

fn scan(tag: &str) -> Result<Vec<RawPair<'_>>, MetadataError> {
    let bytes = tag.as_bytes();
    let mut pairs = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos == bytes.len() {
            return Ok(pairs);
        }

        let key_start = pos;
        while pos < bytes.len()
            && bytes[pos] > b' '
            && bytes[pos] != b':'
            && bytes[pos] != b'"'
            && bytes[pos] != 0x7f
        {
            pos += 1;
        }
        if pos == key_start {
            return Err(malformed(tag, pos, TagDefect::EmptyKey));
        }
        if pos + 1 >= bytes.len() || bytes[pos] != b':' || bytes[pos + 1] != b'"' {
            return Err(malformed(tag, pos, TagDefect::MissingColon));
        }
        let key = &tag[key_start..pos];

        // skip the colon, then the opening quote
        pos += 1;
        let value_start = pos;
        pos += 1;
        while pos < bytes.len() && bytes[pos] != b'"' {
            if bytes[pos] == b'\\' {
                pos += 1;
            }
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err(malformed(tag, value_start, TagDefect::UnterminatedValue));
        }
        pos += 1;

        pairs.push(RawPair {
            key,
            quoted: &tag[value_start..pos],
            offset: value_start,
        });
    }
}

fn hex_digits(chars: &mut std::str::Chars, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Removes the surrounding quotes of `quoted` and resolves its escape sequences.
fn unquote(quoted: &str) -> Result<String, TagDefect> {
    let inner = &quoted[1..quoted.len() - 1];
    if !inner.contains('\\') {
        return Ok(inner.to_string());
    }

    // `\x` and octal escapes produce raw bytes, so collect bytes and validate at the end.
    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escaped = chars.next().ok_or(TagDefect::InvalidEscape)?;
        let byte = match escaped {
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0b,
            '\\' => b'\\',
            '"' => b'"',
            'x' => hex_digits(&mut chars, 2).ok_or(TagDefect::InvalidEscape)? as u8,
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(8))
                        .ok_or(TagDefect::InvalidEscape)?;
                    value = value * 8 + digit;
                }
                u8::try_from(value).map_err(|_| TagDefect::InvalidEscape)?
            }
            'u' | 'U' => {
                let count = if escaped == 'u' { 4 } else { 8 };
                let c = hex_digits(&mut chars, count)
                    .and_then(char::from_u32)
                    .ok_or(TagDefect::InvalidEscape)?;
                let mut buf = [0; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            _ => return Err(TagDefect::InvalidEscape),
        };
        out.push(byte);
    }
    String::from_utf8(out).map_err(|_| TagDefect::InvalidEscape)
}

/// Strips the backquotes (or double quotes) a tag literal is written with.
pub fn strip_delimiters(literal: &str) -> &str {
    for delimiter in ['`', '"'] {
        if let Some(inner) = literal
            .strip_prefix(delimiter)
            .and_then(|rest| rest.strip_suffix(delimiter))
        {
            return inner;
        }
    }
    literal
}

/// All keys of `tag` in order of appearance, including repeated ones.
pub fn tag_keys(tag: &str) -> Result<Vec<&str>, MetadataError> {
    Ok(scan(tag)?.into_iter().map(|pair| pair.key).collect())
}

/// The value of the first occurrence of `key`, if any.
pub fn lookup(tag: &str, key: &str) -> Result<Option<String>, MetadataError> {
    scan(tag)?
        .into_iter()
        .find(|pair| pair.key == key)
        .map(|pair| unquote(pair.quoted).map_err(|reason| malformed(tag, pair.offset, reason)))
        .transpose()
}

/// Parses `tag` into one entry per key occurrence.
///
/// A key that appears more than once yields an entry for every occurrence, all
/// carrying the value of the first one. Later values of such a key are never
/// read, so they are not unquoted either.
pub fn parse_tag(tag: &str) -> Result<Vec<TagEntry>, MetadataError> {
    let mut entries = Vec::new();
    for key in tag_keys(tag)? {
        let value = lookup(tag, key)?.unwrap_or_default();
        entries.push(TagEntry {
            name: key.to_string(),
            value,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[TagEntry]) -> Vec<(&str, &str)> {
        entries
            .iter()
            .map(|e| (e.name.as_str(), e.value.as_str()))
            .collect()
    }

    #[test]
    fn keeps_order() {
        let entries = parse_tag(r#"json:"id,omitempty" db:"id""#).unwrap();
        assert_eq!(pairs(&entries), vec![("json", "id,omitempty"), ("db", "id")]);
    }

    #[test]
    fn duplicate_keys_take_first_value() {
        let entries = parse_tag(r#"a:"1" b:"x" a:"2""#).unwrap();
        assert_eq!(pairs(&entries), vec![("a", "1"), ("b", "x"), ("a", "1")]);
        assert_eq!(tag_keys(r#"a:"1" b:"x" a:"2""#).unwrap(), vec!["a", "b", "a"]);
        assert_eq!(lookup(r#"a:"1" b:"x" a:"2""#, "a").unwrap().as_deref(), Some("1"));
        assert_eq!(lookup(r#"a:"1""#, "c").unwrap(), None);
    }

    #[test]
    fn empty_tag() {
        assert!(parse_tag("").unwrap().is_empty());
        assert!(parse_tag("   ").unwrap().is_empty());
    }

    #[test]
    fn repeated_spaces_and_escapes() {
        let entries = parse_tag(r#"  validate:"re=\"a b\""   doc:"tab\thereé""#).unwrap();
        assert_eq!(
            pairs(&entries),
            vec![("validate", "re=\"a b\""), ("doc", "tab\there\u{e9}")]
        );
    }

    #[test]
    fn tabs_and_newlines_separate_pairs() {
        let entries = parse_tag("json:\"a\"\tdb:\"b\" \t\n xml:\"c\"\t").unwrap();
        assert_eq!(pairs(&entries), vec![("json", "a"), ("db", "b"), ("xml", "c")]);
    }

    #[test]
    fn octal_and_hex_escapes() {
        let entries = parse_tag(r#"x:"\101\x42""#).unwrap();
        assert_eq!(pairs(&entries), vec![("x", "AB")]);
    }

    #[test]
    fn unterminated_value() {
        match parse_tag(r#"json:"id"#) {
            Err(MetadataError::MalformedTag { offset, reason, .. }) => {
                assert_eq!(offset, 5);
                assert_eq!(reason, TagDefect::UnterminatedValue);
            }
            other => panic!("expected MalformedTag, got {other:?}"),
        }
    }

    #[test]
    fn key_without_value() {
        assert!(matches!(
            parse_tag(r#"json:"id" omitempty"#),
            Err(MetadataError::MalformedTag {
                reason: TagDefect::MissingColon,
                ..
            })
        ));
        assert!(matches!(
            parse_tag(r#":"x""#),
            Err(MetadataError::MalformedTag {
                reason: TagDefect::EmptyKey,
                ..
            })
        ));
    }

    #[test]
    fn invalid_escape() {
        assert!(matches!(
            parse_tag(r#"a:"\q""#),
            Err(MetadataError::MalformedTag {
                reason: TagDefect::InvalidEscape,
                ..
            })
        ));
    }

    #[test]
    fn strips_literal_delimiters() {
        assert_eq!(strip_delimiters(r#"`json:"a"`"#), r#"json:"a""#);
        assert_eq!(strip_delimiters(r#""json""#), "json");
        assert_eq!(strip_delimiters(r#"json:"a""#), r#"json:"a""#);
        assert_eq!(strip_delimiters("`"), "`");
    }
}
