//! Source scanner: finds files that import a given package
//!
//! Walks `.js`, `.jsx`, `.ts`, `.tsx`, `.mjs` and `.cjs` files under a source
//! root, never descending into `node_modules`. A file is relevant when it
//! references the exact package name in quotes from `import ... from`,
//! a bare `import`, a dynamic `import()`, or `require()`.

use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as JavaScript/TypeScript source
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directory holding vendored dependencies
const VENDOR_DIR: &str = "node_modules";

/// A source file that imports the package under evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Build the import-reference matcher for one package
pub fn import_pattern(package: &str) -> Result<Regex, regex::Error> {
    let name = regex::escape(package);
    let pattern = format!(
        r#"from\s*["']{name}["']|require\(\s*["']{name}["']\s*\)|import\s*["']{name}["']|import\(\s*["']{name}["']\s*\)"#,
        name = name
    );
    Regex::new(&pattern)
}

fn is_source_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_vendor_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == VENDOR_DIR
}

/// Find files under `root` that import `package`, in path order
///
/// Returns an empty list when no root is given or it is not a directory.
/// Unreadable files are skipped.
pub fn find_relevant_files(root: Option<&Path>, package: &str) -> Vec<SourceFile> {
    let Some(root) = root else {
        return Vec::new();
    };
    if package.is_empty() || !root.is_dir() {
        return Vec::new();
    }

    let pattern = match import_pattern(package) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("cannot match imports of '{}': {}", package, e);
            return Vec::new();
        }
    };
    let mut found = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_vendor_dir(e))
        .filter_map(|e| e.ok())
        .filter(is_source_file)
    {
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                debug!("skipping unreadable {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if pattern.is_match(&content) {
            found.push(SourceFile {
                path: entry.into_path(),
                content,
            });
        }
    }

    debug!(
        "{} file(s) under {} import {}",
        found.len(),
        root.display(),
        package
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_import_pattern_forms() {
        let re = import_pattern("leftpad").unwrap();
        assert!(re.is_match("import pad from 'leftpad';"));
        assert!(re.is_match("import { pad } from\"leftpad\""));
        assert!(re.is_match("const pad = require('leftpad');"));
        assert!(re.is_match("const pad = require( \"leftpad\" );"));
        assert!(re.is_match("import 'leftpad';"));
        assert!(re.is_match("const m = await import('leftpad');"));
    }

    #[test]
    fn test_import_pattern_no_partial_names() {
        let re = import_pattern("pad").unwrap();
        assert!(!re.is_match("import pad from 'leftpad';"));
        assert!(!re.is_match("require('pad-utils')"));
        assert!(!re.is_match("// pad is great"));
    }

    #[test]
    fn test_import_pattern_scoped_package() {
        let re = import_pattern("@scope/lib.js").unwrap();
        assert!(re.is_match("import x from '@scope/lib.js'"));
        assert!(!re.is_match("import x from '@scope/libxjs'"));
    }

    #[test]
    fn test_find_relevant_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.ts", "import pad from 'leftpad';\n");
        write(dir.path(), "a.js", "const pad = require('leftpad');\n");
        write(dir.path(), "c.tsx", "import React from 'react';\n");
        write(dir.path(), "notes.md", "import pad from 'leftpad';\n");
        write(dir.path(), "nested/d.jsx", "import 'leftpad';\n");

        let files = find_relevant_files(Some(dir.path()), "leftpad");
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.js"),
                PathBuf::from("b.ts"),
                PathBuf::from("nested/d.jsx")
            ]
        );
        assert_eq!(files[0].content, "const pad = require('leftpad');\n");
    }

    #[test]
    fn test_find_relevant_files_skips_node_modules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/x/index.js", "require('leftpad')");
        write(dir.path(), "src/node_modules/y.js", "require('leftpad')");
        write(dir.path(), "src/app.js", "require('leftpad')");

        let files = find_relevant_files(Some(dir.path()), "leftpad");
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("src/app.js"));
    }

    #[test]
    fn test_find_relevant_files_skips_non_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bin.js"), [0xff, 0xfe, 0x00]).unwrap();
        write(dir.path(), "ok.js", "require('leftpad')");

        let files = find_relevant_files(Some(dir.path()), "leftpad");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_find_relevant_files_no_root() {
        assert!(find_relevant_files(None, "leftpad").is_empty());
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(find_relevant_files(Some(&missing), "leftpad").is_empty());
        assert!(find_relevant_files(Some(dir.path()), "").is_empty());
    }
}
