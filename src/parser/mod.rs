pub mod imports;
pub mod languages;
mod syntax;

use std::cell::RefCell;
use std::io;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Parser, Tree};

use imports::extract_imports;
use languages::python_language;
use syntax::first_invalid_position;

/// UTF-8 encoded U+FEFF. Python 3 rejects it in source text.
const BYTE_ORDER_MARK: &[u8] = b"\xef\xbb\xbf";

// Thread-local Parser instances: one per rayon worker thread, no lock contention.
// `None` only if the grammar cannot be loaded into the linked tree-sitter runtime.
thread_local! {
    static PARSER_PY: RefCell<Option<Parser>> = RefCell::new(new_parser());
}

fn new_parser() -> Option<Parser> {
    let mut parser = Parser::new();
    parser.set_language(&python_language()).ok()?;
    Some(parser)
}

/// Why a file was left out of import extraction.
#[derive(Error, Debug)]
pub enum ParseFailure {
    #[error("failed to read file: {0}")]
    Read(#[from] io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("file starts with a byte order mark")]
    ByteOrderMark,

    #[error("python grammar could not be loaded")]
    Grammar,

    #[error("tree-sitter returned no syntax tree")]
    NoTree,

    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Per-file result of the extraction phase.
///
/// A skipped file stays a node of the graph; it only contributes no edges.
#[derive(Debug)]
pub enum FileOutcome {
    /// Dotted names of every import declaration, in source order, duplicates kept.
    Parsed { names: Vec<String> },
    Skipped { reason: ParseFailure },
}

impl From<Result<Vec<String>, ParseFailure>> for FileOutcome {
    fn from(result: Result<Vec<String>, ParseFailure>) -> Self {
        match result {
            Ok(names) => Self::Parsed { names },
            Err(reason) => Self::Skipped { reason },
        }
    }
}

/// Read `path` and extract its imported dotted names.
///
/// Never fails: read, decode and syntax errors become [`FileOutcome::Skipped`].
pub fn parse_file(path: &Path) -> FileOutcome {
    std::fs::read(path)
        .map_err(ParseFailure::from)
        .and_then(|bytes| parse_source(&bytes))
        .into()
}

/// Parse Python source and extract its imported dotted names.
///
/// Uses the calling thread's cached [`Parser`], so it is cheap to call from
/// rayon workers.
///
/// # Errors
/// - [`ParseFailure::Encoding`] if `source` is not UTF-8
/// - [`ParseFailure::ByteOrderMark`] if `source` starts with U+FEFF
/// - [`ParseFailure::Syntax`] if the tree has an error or missing node, Python 2
///   only syntax, or an indented module-level statement
/// - [`ParseFailure::NoTree`] / [`ParseFailure::Grammar`] if tree-sitter cannot run
pub fn parse_source(source: &[u8]) -> Result<Vec<String>, ParseFailure> {
    std::str::from_utf8(source)?;
    if source.starts_with(BYTE_ORDER_MARK) {
        return Err(ParseFailure::ByteOrderMark);
    }

    let tree = PARSER_PY.with(|cell| -> Result<Tree, ParseFailure> {
        let mut slot = cell.borrow_mut();
        let parser = slot.as_mut().ok_or(ParseFailure::Grammar)?;
        parser.parse(source, None).ok_or(ParseFailure::NoTree)
    })?;

    if let Some((line, column)) = first_invalid_position(&tree, source) {
        return Err(ParseFailure::Syntax { line, column });
    }

    Ok(extract_imports(&tree, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_extracts_names() {
        let names = parse_source(b"import utils\nfrom pkg import helper\n").unwrap();
        assert_eq!(names, vec!["utils", "pkg"]);
    }

    #[test]
    fn test_empty_source_is_valid() {
        assert!(parse_source(b"").unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = parse_source(b"import utils\ndef broken(:\n    pass\n").unwrap_err();
        assert!(
            matches!(err, ParseFailure::Syntax { .. }),
            "expected syntax failure, got {err:?}"
        );
    }

    #[test]
    fn test_unclosed_bracket_is_a_syntax_error() {
        let err = parse_source(b"import os\nx = [1, 2\n").unwrap_err();
        assert!(matches!(err, ParseFailure::Syntax { .. }));
    }

    #[test]
    fn test_python2_source_is_a_syntax_error() {
        for src in [
            "import utils\nprint \"hi\"\n",
            "import utils\ntry:\n    pass\nexcept ValueError, e:\n    pass\n",
            "import utils\nx = 1 <> 2\n",
            "import utils\ny = `x`\n",
        ] {
            let err = parse_source(src.as_bytes()).unwrap_err();
            assert!(
                matches!(err, ParseFailure::Syntax { .. }),
                "expected syntax failure for {src:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_unexpected_indent_is_a_syntax_error() {
        let err = parse_source(b"import utils\n  x = 1\n").unwrap_err();
        assert!(matches!(err, ParseFailure::Syntax { line: 2, column: 3 }));
    }

    #[test]
    fn test_byte_order_mark_is_reported() {
        let err = parse_source(b"\xef\xbb\xbfimport utils\n").unwrap_err();
        assert!(matches!(err, ParseFailure::ByteOrderMark));
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let err = parse_source(b"import os\n\xff\xfe = 1\n").unwrap_err();
        assert!(matches!(err, ParseFailure::Encoding(_)));
    }

    #[test]
    fn test_parse_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        match parse_file(&dir.path().join("gone.py")) {
            FileOutcome::Skipped {
                reason: ParseFailure::Read(_),
            } => {}
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "import a\nimport a\n").unwrap();
        match parse_file(&path) {
            FileOutcome::Parsed { names } => assert_eq!(names, vec!["a", "a"]),
            other => panic!("expected parsed outcome, got {other:?}"),
        }
    }
}
