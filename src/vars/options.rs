use crate::diag::Diagnostics;

/// Placeholder written in place of a value when an option is not understood.
pub const UNKNOWN_MARKER: &str = "?";

/// One step of a `$(NAME:opt:opt...)` pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opt {
    /// `f`
    ForwardSlash,
    /// `b`
    BackSlash,
    /// `n`
    NativeSlash,
    /// `u`
    Upper,
    /// `l`
    Lower,
    /// `F`: file name with extension
    FileName,
    /// `B`: file name without extension
    BaseName,
    /// `D`
    DirName,
    /// `p<text>`
    Prefix(String),
    /// `s<text>`
    Suffix(String),
    /// `P<text>`
    PrefixIfMissing(String),
    /// `S<text>`
    SuffixIfMissing(String),
    /// `j<sep>`
    Join(String),
    Unknown(char),
}

impl Opt {
    /// Parse one unescaped option segment. Empty segments are skipped.
    pub fn parse(segment: &str) -> Option<Self> {
        let mut chars = segment.chars();
        let letter = chars.next()?;
        let param = chars.as_str().to_string();

        Some(match letter {
            'f' => Opt::ForwardSlash,
            'b' => Opt::BackSlash,
            'n' => Opt::NativeSlash,
            'u' => Opt::Upper,
            'l' => Opt::Lower,
            'F' => Opt::FileName,
            'B' => Opt::BaseName,
            'D' => Opt::DirName,
            'p' => Opt::Prefix(param),
            's' => Opt::Suffix(param),
            'P' => Opt::PrefixIfMissing(param),
            'S' => Opt::SuffixIfMissing(param),
            'j' => Opt::Join(param),
            other => Opt::Unknown(other),
        })
    }

    fn apply_one(&self, value: &str) -> String {
        match self {
            Opt::ForwardSlash => value.replace('\\', "/"),
            Opt::BackSlash => value.replace('/', "\\"),
            Opt::NativeSlash => to_native(value),
            Opt::Upper => value.to_uppercase(),
            Opt::Lower => value.to_lowercase(),
            Opt::FileName => file_name(value).to_string(),
            Opt::BaseName => base_name(value).to_string(),
            Opt::DirName => dir_name(value).to_string(),
            Opt::Prefix(p) => format!("{}{}", p, value),
            Opt::Suffix(s) => format!("{}{}", value, s),
            Opt::PrefixIfMissing(p) if value.starts_with(p.as_str()) => value.to_string(),
            Opt::PrefixIfMissing(p) => format!("{}{}", p, value),
            Opt::SuffixIfMissing(s) if value.ends_with(s.as_str()) => value.to_string(),
            Opt::SuffixIfMissing(s) => format!("{}{}", value, s),
            Opt::Join(_) => value.to_string(),
            Opt::Unknown(_) => UNKNOWN_MARKER.to_string(),
        }
    }
}

/// Run a pipeline over a value list, left to right.
///
/// A join collapses the list at the point where it appears; options after it
/// see a single value.
pub fn apply_pipeline(mut values: Vec<String>, opts: &[Opt], diag: &dyn Diagnostics) -> Vec<String> {
    for opt in opts {
        match opt {
            Opt::Join(sep) => values = vec![values.join(sep)],
            Opt::Unknown(letter) => {
                diag.warn(&format!("unknown template option '{}'", letter));
                values = values.iter().map(|v| opt.apply_one(v)).collect();
            }
            _ => values = values.iter().map(|v| opt.apply_one(v)).collect(),
        }
    }
    values
}

fn to_native(value: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    value
        .chars()
        .map(|c| if c == '/' || c == '\\' { sep } else { c })
        .collect()
}

fn last_separator(value: &str) -> Option<usize> {
    value.rfind(['/', '\\'])
}

fn file_name(value: &str) -> &str {
    match last_separator(value) {
        Some(idx) => &value[idx + 1..],
        None => value,
    }
}

fn base_name(value: &str) -> &str {
    let name = file_name(value);
    match name.rfind('.') {
        // ".clang-format" is a name, not an extension
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

fn dir_name(value: &str) -> &str {
    match last_separator(value) {
        Some(0) => &value[..1],
        Some(idx) => &value[..idx],
        None => "",
    }
}
