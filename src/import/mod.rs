//! File imports.
//!
//! A thin wrapper over the lexer and parser: read a file, produce its
//! syntax tree, and mark the result with an [`Embedded`] node so
//! diagnostics can name the originating file. The inference and
//! evaluation core never sees a path.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::{Annotation, Embedded, Syntax};
use crate::lexer::Token;
use crate::parser::{parse, ParseError, ParseState};
use crate::types::Type;

#[derive(Debug)]
pub enum ImportError {
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    Lex {
        path: PathBuf,
        message: String,
    },
    Parse {
        path: PathBuf,
        error: ParseError,
    },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::Io { path, error } => {
                write!(f, "cannot read {}: {}", path.display(), error)
            }
            ImportError::Lex { path, message } => {
                write!(f, "cannot lex {}: {}", path.display(), message)
            }
            ImportError::Parse { path, error } => {
                write!(f, "cannot parse {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Read and parse a file into a syntax tree.
pub fn load(path: &Path) -> Result<Syntax, ImportError> {
    let source = fs::read_to_string(path).map_err(|error| ImportError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let tokens = Token::lex(&source).map_err(|error| ImportError::Lex {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let mut state = ParseState::new(tokens);
    let inner = parse(&mut state).map_err(|error| ImportError::Parse {
        path: path.to_path_buf(),
        error,
    })?;
    let position = inner.position();
    Ok(Syntax::Embedded(Embedded {
        origin: path.to_path_buf(),
        inner: Box::new(inner),
        position,
    }))
}

/// Like [`load`], but wrap the result in an annotation when the importing
/// site provided one.
pub fn load_annotated(path: &Path, annotation: Option<Type>) -> Result<Syntax, ImportError> {
    let syntax = load(path)?;
    match annotation {
        None => Ok(syntax),
        Some(annotation) => {
            let position = syntax.position();
            Ok(Syntax::Annotation(Annotation {
                expression: Box::new(syntax),
                annotation,
                position,
            }))
        }
    }
}

/// Resolve a relative import against the directory of the importing file.
pub fn sibling(base: &Path, relative: &Path) -> PathBuf {
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base.parent().unwrap_or_else(|| Path::new(".")).join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_composition() {
        assert_eq!(
            sibling(Path::new("demos/main.reed"), Path::new("util.reed")),
            PathBuf::from("demos/util.reed")
        );
        assert_eq!(
            sibling(Path::new("main.reed"), Path::new("util.reed")),
            PathBuf::from("util.reed")
        );
        assert_eq!(
            sibling(Path::new("demos/main.reed"), Path::new("/abs/util.reed")),
            PathBuf::from("/abs/util.reed")
        );
    }
}
