//! Line-record format of the deps file.
//!
//! One record per line, seven double-quoted comma-separated fields, with `\`
//! escaping any character inside a field (including `"` and `,`).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryType {
    /// Eligible for servicing redirection and package-cache lookup.
    Package,
    Other(String),
}

impl From<&str> for LibraryType {
    fn from(raw: &str) -> Self {
        match raw {
            "Package" => LibraryType::Package,
            other => LibraryType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetType {
    Runtime,
    Native,
    Culture,
    /// Unknown tags are carried for forward compatibility but never match
    /// any precedence branch of the builders.
    Other(String),
}

impl From<&str> for AssetType {
    fn from(raw: &str) -> Self {
        match raw {
            "runtime" => AssetType::Runtime,
            "native" => AssetType::Native,
            "culture" => AssetType::Culture,
            other => AssetType::Other(other.to_string()),
        }
    }
}

/// One declared dependency asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub library_type: LibraryType,
    pub library_name: String,
    pub library_version: String,
    /// Carried through but not verified by the resolver.
    pub library_hash: String,
    pub asset_type: AssetType,
    pub asset_name: String,
    pub relative_path: String,
}

impl AssetRecord {
    /// Candidate location of this asset inside a versioned package cache:
    /// `<cache>/<name>/<version>/<relative_path>`.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(&self.library_name)
            .join(&self.library_version)
            .join(&self.relative_path)
    }
}

/// Decodes one quoted field starting at `*cursor` and advances the cursor
/// past the closing quote and one optional trailing `,`.
///
/// Returns `None` if the cursor is not on an opening quote or the line ends
/// before the field is closed (a lone trailing `\` counts as unclosed).
fn read_field(line: &str, cursor: &mut usize) -> Option<String> {
    if line.as_bytes().get(*cursor) != Some(&b'"') {
        return None;
    }
    *cursor += 1;

    let mut field = String::with_capacity(line.len() - *cursor);
    let mut closed = false;
    let mut chars = line[*cursor..].char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                let (_, escaped) = chars.next()?;
                field.push(escaped);
            }
            '"' => {
                *cursor += idx + 1;
                closed = true;
                break;
            }
            _ => field.push(ch),
        }
    }
    if !closed {
        return None;
    }

    if line.as_bytes().get(*cursor) == Some(&b',') {
        *cursor += 1;
    }
    Some(field)
}

/// Parses a full record: exactly seven fields in fixed order. Any field
/// failure aborts the whole record.
pub fn parse_record(line: &str) -> Option<AssetRecord> {
    let mut cursor = 0;
    let mut fields: [String; 7] = Default::default();
    for slot in fields.iter_mut() {
        *slot = read_field(line, &mut cursor)?;
    }
    let [library_type, library_name, library_version, library_hash, asset_type, asset_name, relative_path] =
        fields;

    Some(AssetRecord {
        library_type: LibraryType::from(library_type.as_str()),
        library_name,
        library_version,
        library_hash,
        asset_type: AssetType::from(asset_type.as_str()),
        asset_name,
        relative_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_field_plain() {
        let mut cursor = 0;
        let field = read_field(r#""Package","Json.Net""#, &mut cursor).unwrap();
        assert_eq!(field, "Package");
        assert_eq!(cursor, 10);

        let next = read_field(r#""Package","Json.Net""#, &mut cursor).unwrap();
        assert_eq!(next, "Json.Net");
    }

    #[test]
    fn test_read_field_escapes_round_trip() {
        let mut cursor = 0;
        let field = read_field(r#""a\"b\,c\\d""#, &mut cursor).unwrap();
        assert_eq!(field, r#"a"b,c\d"#);
    }

    #[test]
    fn test_read_field_missing_opening_quote() {
        let mut cursor = 0;
        assert!(read_field("Package\",", &mut cursor).is_none());
    }

    #[test]
    fn test_read_field_unterminated() {
        let mut cursor = 0;
        assert!(read_field(r#""Package"#, &mut cursor).is_none());
    }

    #[test]
    fn test_read_field_trailing_backslash() {
        let mut cursor = 0;
        assert!(read_field(r#""Package\"#, &mut cursor).is_none());
    }

    #[test]
    fn test_read_field_cursor_past_end() {
        let mut cursor = 5;
        assert!(read_field(r#""abc""#, &mut cursor).is_none());
    }

    #[test]
    fn test_parse_record_full() {
        let line = r#""Package","Newtonsoft.Json","9.0.1","abc123","runtime","Newtonsoft.Json","lib/netstandard1.3/Newtonsoft.Json.dll""#;
        let record = parse_record(line).unwrap();
        assert_eq!(record.library_type, LibraryType::Package);
        assert_eq!(record.library_name, "Newtonsoft.Json");
        assert_eq!(record.library_version, "9.0.1");
        assert_eq!(record.library_hash, "abc123");
        assert_eq!(record.asset_type, AssetType::Runtime);
        assert_eq!(record.asset_name, "Newtonsoft.Json");
        assert_eq!(record.relative_path, "lib/netstandard1.3/Newtonsoft.Json.dll");
    }

    #[test]
    fn test_parse_record_escaped_fields() {
        let line = r#""Package","We\"ird","1.0.0","h\,ash","runtime","We\"ird","lib/We\"ird.dll""#;
        let record = parse_record(line).unwrap();
        assert_eq!(record.library_name, "We\"ird");
        assert_eq!(record.library_hash, "h,ash");
        assert_eq!(record.relative_path, "lib/We\"ird.dll");
    }

    #[test]
    fn test_parse_record_too_few_fields() {
        assert!(parse_record(r#""Package","Json.Net","1.0.0""#).is_none());
    }

    #[test]
    fn test_parse_record_unknown_tags() {
        let line = r#""Project","App","1.0.0","","resources","App.resources","App.resources.dll""#;
        let record = parse_record(line).unwrap();
        assert_eq!(record.library_type, LibraryType::Other("Project".to_string()));
        assert_eq!(record.asset_type, AssetType::Other("resources".to_string()));
    }

    #[test]
    fn test_cache_path_layout() {
        let record = parse_record(
            r#""Package","Newtonsoft.Json","9.0.1","abc","runtime","Newtonsoft.Json","lib/net45/Newtonsoft.Json.dll""#,
        )
        .unwrap();
        assert_eq!(
            record.cache_path(Path::new("/packages")),
            Path::new("/packages/Newtonsoft.Json/9.0.1/lib/net45/Newtonsoft.Json.dll")
        );
    }
}
