//! NGC subroutine loading.
//!
//! A subroutine file is opaque G-code carrying an `o<name> sub` header
//! and, by convention, a block of named parameter assignments
//! (`#<depth> = #1 ( cutting depth )`). The body is never modified; the
//! core only extracts the name and the parameter list so the host can
//! present editable call values.

use regex::Regex;
use shapekit_core::SubroutineError;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// A named subroutine parameter (numbered 1..=30).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubParam {
    /// Name of the parameter
    pub name: String,
    /// Number of the parameter
    pub number: u32,
    /// Comment for the parameter, empty when the file gives none
    pub comment: String,
}

/// A complete parsed subroutine.
#[derive(Debug, Clone, PartialEq)]
pub struct Subroutine {
    /// Name of the subroutine, from the `o<name> sub` header
    pub name: String,
    /// Verbatim G-code body
    pub code: String,
    /// Parameters in file order
    pub params: Vec<SubParam>,
}

/// Shared handle to an immutable loaded subroutine.
pub type SubroutineHandle = Arc<Subroutine>;

/// Loads and parses a single subroutine file.
pub fn load_subroutine(path: impl AsRef<Path>) -> Result<Subroutine, SubroutineError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SubroutineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_subroutine(&text).ok_or_else(|| SubroutineError::MissingName {
        path: path.display().to_string(),
    })
}

/// Parses subroutine text; `None` when no `o<name> sub` header exists.
pub fn parse_subroutine(text: &str) -> Option<Subroutine> {
    let re_name = Regex::new(r"o<(.*)>.*sub").unwrap();
    let re_param = Regex::new(r".*?#<(.*)>.*=.*#(\d+)[^\(]*(?:\((.*)\))?").unwrap();

    let mut name: Option<String> = None;
    let mut params = Vec::new();
    for line in text.lines() {
        if name.is_none() {
            if let Some(m) = re_name.captures(line) {
                name = Some(m[1].to_string());
            }
        }
        if let Some(m) = re_param.captures(line) {
            if let Ok(number) = m[2].parse::<u32>() {
                // Only parameters #1..#30 are call arguments.
                if number < 31 {
                    params.push(SubParam {
                        name: m[1].to_string(),
                        number,
                        comment: m.get(3).map(|c| c.as_str().to_string()).unwrap_or_default(),
                    });
                }
            }
        }
    }
    name.map(|name| Subroutine {
        name,
        code: text.to_string(),
        params,
    })
}

/// Loads every `*.ngc` subroutine in a directory, sorted by file name.
///
/// Files without a subroutine header are skipped with a warning; an
/// empty or unreadable directory is an error.
pub fn load_all_subroutines(dir: impl AsRef<Path>) -> Result<Vec<Subroutine>, SubroutineError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|source| SubroutineError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "ngc").unwrap_or(false))
        .collect();
    if files.is_empty() {
        return Err(SubroutineError::EmptyDirectory {
            path: dir.display().to_string(),
        });
    }
    files.sort();
    let mut subs = Vec::new();
    for path in files {
        match load_subroutine(&path) {
            Ok(sub) => subs.push(sub),
            Err(e) => warn!("Skipping subroutine {}: {e}", path.display()),
        }
    }
    Ok(subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
( counterbore pocket )\n\
o<cbore> sub\n\
#<diameter> = #1 ( hole diameter )\n\
#<depth>    = #2 ( total depth )\n\
#<ignored>  = #42\n\
G00 Z#<depth>\n\
o<cbore> endsub\n";

    #[test]
    fn test_parse_name_and_params() {
        let sub = parse_subroutine(SAMPLE).unwrap();
        assert_eq!(sub.name, "cbore");
        assert_eq!(sub.params.len(), 2);
        assert_eq!(sub.params[0].name, "diameter");
        assert_eq!(sub.params[0].number, 1);
        assert_eq!(sub.params[0].comment, "hole diameter");
        assert_eq!(sub.params[1].name, "depth");
        // Body is kept verbatim.
        assert_eq!(sub.code, SAMPLE);
    }

    #[test]
    fn test_parameters_above_thirty_ignored() {
        let sub = parse_subroutine(SAMPLE).unwrap();
        assert!(sub.params.iter().all(|p| p.number < 31));
    }

    #[test]
    fn test_missing_header_yields_none() {
        assert!(parse_subroutine("G00 X0\nG01 Z-1\n").is_none());
    }

    #[test]
    fn test_load_all_sorted_and_skipping() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ngc"), SAMPLE.replace("cbore", "second")).unwrap();
        std::fs::write(dir.path().join("a.ngc"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("junk.ngc"), "no header here\n").unwrap();

        let subs = load_all_subroutines(dir.path()).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].name, "cbore");
        assert_eq!(subs[1].name, "second");
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_all_subroutines(dir.path()).unwrap_err();
        assert!(matches!(err, SubroutineError::EmptyDirectory { .. }));
    }

    #[test]
    fn test_load_single_file() {
        let mut file = tempfile::Builder::new().suffix(".ngc").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let sub = load_subroutine(file.path()).unwrap();
        assert_eq!(sub.name, "cbore");
    }
}
