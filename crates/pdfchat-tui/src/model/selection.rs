use std::io;
use std::path::{Path, PathBuf};

use pdfchat_core::PendingFile;

/// Text being typed into the "select files" prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrompt {
    pub input: String,
}

/// Split prompt input into paths. Whitespace separates paths unless quoted;
/// a leading `~/` expands to the home directory.
pub fn parse_paths(input: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(expand_home(&std::mem::take(&mut current)));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(expand_home(&current));
    }
    paths
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

/// Turn paths into pending files. A directory contributes its `*.pdf` files in
/// name order; any other path must exist.
pub fn expand_paths(paths: &[PathBuf]) -> io::Result<Vec<PendingFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(pdfs_in(path)?.into_iter().map(PendingFile::new));
        } else if path.exists() {
            files.push(PendingFile::new(path));
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            ));
        }
    }
    Ok(files)
}

fn pdfs_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_pdf(p))
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_and_honours_quotes() {
        assert_eq!(
            parse_paths(r#"a.pdf  "my papers/b.pdf" 'c d.pdf'"#),
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("my papers/b.pdf"),
                PathBuf::from("c d.pdf"),
            ]
        );
        assert!(parse_paths("   ").is_empty());
    }

    #[test]
    fn directory_expands_to_sorted_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let files = expand_paths(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = expand_paths(&[PathBuf::from("/no/such/thing.pdf")]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
