// kpathsea-core/src/format.rs

//! File format categories understood by `kpsewhich --format=...`.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A file format recognized by `kpsewhich`.
///
/// The string returned by [`FileFormat::as_str`] is passed to the tool verbatim,
/// so it must match kpsewhich's own format names exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum FileFormat {
    // Font formats
    Tfm,
    Vf,
    Pk,
    Type1,
    TrueType,
    OpenType,

    // TeX source and style formats
    Tex,
    Bib,
    Bst,
    Cls,
    Sty,

    // Configuration and mapping formats
    Cnf,
    Map,
    Enc,

    /// Let kpsewhich search every format it knows. No `--format` flag is passed.
    #[default]
    All,
}

impl FileFormat {
    pub const VARIANTS: [FileFormat; 15] = [
        FileFormat::Tfm,
        FileFormat::Vf,
        FileFormat::Pk,
        FileFormat::Type1,
        FileFormat::TrueType,
        FileFormat::OpenType,
        FileFormat::Tex,
        FileFormat::Bib,
        FileFormat::Bst,
        FileFormat::Cls,
        FileFormat::Sty,
        FileFormat::Cnf,
        FileFormat::Map,
        FileFormat::Enc,
        FileFormat::All,
    ];

    /// The literal format name kpsewhich expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Tfm => "tfm",
            FileFormat::Vf => "vf",
            FileFormat::Pk => "pk",
            FileFormat::Type1 => "type1 fonts",
            FileFormat::TrueType => "truetype fonts",
            FileFormat::OpenType => "opentype fonts",
            FileFormat::Tex => "tex",
            FileFormat::Bib => "bib",
            FileFormat::Bst => "bst",
            FileFormat::Cls => "cls",
            FileFormat::Sty => "sty",
            FileFormat::Cnf => "cnf",
            FileFormat::Map => "map",
            FileFormat::Enc => "enc",
            FileFormat::All => "all",
        }
    }

    /// Single-word alias for the multi-word font formats.
    fn short_name(&self) -> Option<&'static str> {
        match self {
            FileFormat::Type1 => Some("type1"),
            FileFormat::TrueType => Some("truetype"),
            FileFormat::OpenType => Some("opentype"),
            _ => None,
        }
    }

    /// The `--format=<literal>` flag for this format, or `None` for [`FileFormat::All`].
    pub fn flag(&self) -> Option<String> {
        match self {
            FileFormat::All => None,
            other => Some(format!("--format={}", other.as_str())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FileFormat::VARIANTS
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted || f.short_name() == Some(wanted.as_str()))
            .ok_or_else(|| {
                let known: Vec<&str> = FileFormat::VARIANTS.iter().map(|f| f.as_str()).collect();
                format!("Unknown file format '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

impl TryFrom<String> for FileFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all() {
        assert_eq!(FileFormat::default(), FileFormat::All);
        assert!(FileFormat::default().flag().is_none());
    }

    #[test]
    fn test_literals_passed_verbatim() {
        assert_eq!(FileFormat::TrueType.as_str(), "truetype fonts");
        assert_eq!(FileFormat::Tex.to_string(), "tex");
        assert_eq!(FileFormat::Cnf.flag().as_deref(), Some("--format=cnf"));
        assert_eq!(
            FileFormat::OpenType.flag().as_deref(),
            Some("--format=opentype fonts")
        );
    }

    #[test]
    fn test_parse_literal_and_short_name() {
        assert_eq!("sty".parse::<FileFormat>(), Ok(FileFormat::Sty));
        assert_eq!("Type1 Fonts".parse::<FileFormat>(), Ok(FileFormat::Type1));
        assert_eq!("truetype".parse::<FileFormat>(), Ok(FileFormat::TrueType));
        assert_eq!(" all ".parse::<FileFormat>(), Ok(FileFormat::All));
    }

    #[test]
    fn test_parse_unknown_lists_known_formats() {
        let err = "woff2".parse::<FileFormat>().unwrap_err();
        assert!(err.contains("Unknown file format 'woff2'"), "Unexpected error: {}", err);
        assert!(err.contains("opentype fonts"));
    }

    #[test]
    fn test_every_variant_parses_from_its_literal() {
        for format in FileFormat::VARIANTS {
            assert_eq!(format.as_str().parse::<FileFormat>(), Ok(format));
        }
    }
}
