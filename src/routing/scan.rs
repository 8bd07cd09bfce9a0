//! Maps a directory of handler modules to URL paths.
//!
//! ```text
//! controllers/index.rs                      => /
//! controllers/companies/{company}.rs        => /companies/:company
//! controllers/products/{product}/update.rs  => /products/:product/update
//! controllers/products/{product}.rs         => /products/:product
//! controllers/suppliers/{supplier}/index.rs => /suppliers/:supplier
//! controllers/users/index.rs                => /users
//! controllers/users/{user}.rs               => /users/:user
//! ```
//!
//! Traversal is deterministic: among siblings, `index.<ext>` files come first
//! and everything else follows in lexicographic order.

use {
    super::pattern::braces_to_params,
    crate::{Error, Result},
    glob::{MatchOptions, Pattern},
    std::{
        cmp::Ordering,
        fs,
        path::{Path, PathBuf},
    },
};

/// Ordered mapping from derived URL path to the source file it came from.
///
/// Keys are unique. Iteration follows traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult(Vec<(String, PathBuf)>);

impl ScanResult {
    /// Returns the source file mapped to `route`, if any.
    pub fn get(&self, route: &str) -> Option<&Path> {
        self.0
            .iter()
            .find(|(path, _)| path == route)
            .map(|(_, file)| file.as_path())
    }

    /// Returns the derived URL paths in traversal order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(path, _)| path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(path, file)| (path.as_str(), file.as_path()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, route: String, file: PathBuf) -> Result<()> {
        if let Some(existing) = self.get(&route) {
            return Err(Error::config(format!(
                "Both '{}' and '{}' map to the route '{}'",
                existing.display(),
                file.display(),
                route
            )));
        }
        self.0.push((route, file));
        Ok(())
    }
}

impl IntoIterator for ScanResult {
    type Item = (String, PathBuf);
    type IntoIter = std::vec::IntoIter<(String, PathBuf)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Decides which files the path mapper turns into routes.
///
/// A file is accepted when its extension is one of the recognized loader
/// extensions (case-insensitive) and its name does not start with a dot.
/// Ignore patterns are glob patterns applied to the path relative to the
/// scanned directory, made pseudo-absolute (`/users/{user}.rs`). A pattern
/// without a `/` is matched against the base name only.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: Vec<String>,
    ignore: Vec<Pattern>,
}

impl FileFilter {
    pub fn new<I, E>(extensions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            ignore: Vec::new(),
        }
    }

    /// Adds ignore patterns. Invalid glob syntax is a configuration error.
    pub fn with_ignore<P: AsRef<str>>(mut self, patterns: &[P]) -> Result<Self> {
        for pattern in patterns {
            self.ignore.push(Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Returns true when `file` has a recognized extension and is not a dotfile.
    pub fn accepts(&self, file: &Path) -> bool {
        let Some(name) = file.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        file.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Returns true when the pseudo-absolute path matches an ignore pattern.
    pub fn is_ignored(&self, pseudo_path: &str) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        let base_name = pseudo_path.rsplit('/').next().unwrap_or(pseudo_path);

        self.ignore.iter().any(|pattern| {
            if pattern.as_str().contains('/') {
                pattern.matches_with(pseudo_path, options)
            } else {
                pattern.matches_with(base_name, options)
            }
        })
    }
}

/// Recursively maps `basedir` into a [`ScanResult`].
///
/// Dot-prefixed files and directories are skipped unconditionally; ignored
/// directories prune their whole subtree. Directories are traversed, never
/// mapped.
///
/// # Errors
///
/// - `Resolution` when `basedir` does not exist or is not a directory
/// - `Configuration` when two files derive the same route
/// - `Io` when a directory cannot be listed
pub fn map_directory(basedir: impl AsRef<Path>, filter: &FileFilter) -> Result<ScanResult> {
    let basedir = basedir.as_ref();
    if !basedir.exists() {
        return Err(Error::resolution(format!(
            "Route directory not found. ('{}')",
            basedir.display()
        )));
    }
    if !basedir.is_dir() {
        return Err(Error::resolution(format!(
            "Route directory is not a directory. ('{}')",
            basedir.display()
        )));
    }

    let mut result = ScanResult::default();
    traverse(basedir, &mut Vec::new(), filter, &mut result)?;
    Ok(result)
}

fn traverse(
    dir: &Path,
    ancestors: &mut Vec<String>,
    filter: &FileFilter,
    result: &mut ScanResult,
) -> Result<()> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        match name.into_string() {
            Ok(name) => children.push(name),
            Err(name) => {
                tracing::debug!(dir = %dir.display(), name = ?name, "Skipping non UTF-8 entry");
            }
        }
    }
    children.sort_by(|a, b| directory_order(a, b));

    for name in children {
        if name.starts_with('.') {
            continue;
        }

        let pseudo_path = format!("/{}", join_segments(ancestors, &name));
        if filter.is_ignored(&pseudo_path) {
            tracing::debug!(path = %pseudo_path, "Ignoring entry");
            continue;
        }

        let abs = dir.join(&name);
        let metadata = fs::metadata(&abs)?;

        if metadata.is_dir() {
            ancestors.push(name);
            traverse(&abs, ancestors, filter, result)?;
            ancestors.pop();
        } else if metadata.is_file() && filter.accepts(&abs) {
            let route = route_for(ancestors, &name);
            tracing::trace!(file = %abs.display(), route = %route, "Mapped file");
            result.insert(route, abs)?;
        }
    }

    Ok(())
}

/// Builds the route for a file: its ancestors plus its stem, unless the
/// stem is `index`.
fn route_for(ancestors: &[String], file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);

    let mut segments: Vec<&str> = ancestors.iter().map(String::as_str).collect();
    if stem != "index" {
        segments.push(stem);
    }
    braces_to_params(&format!("/{}", segments.join("/")))
}

fn join_segments(ancestors: &[String], name: &str) -> String {
    if ancestors.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", ancestors.join("/"), name)
    }
}

fn is_index_file(name: &str) -> bool {
    let path = Path::new(name);
    path.extension().is_some() && path.file_stem().is_some_and(|stem| stem == "index")
}

/// Sorts `index.<ext>` before all other entries, the rest lexicographically.
fn directory_order(a: &str, b: &str) -> Ordering {
    match (is_index_file(a), is_index_file(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.cmp(b),
    }
}
