//! Input discovery for the `progdep` binary: exclude globs and the
//! directory walk that feeds Java files to the analysis.
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod args;
pub mod config;
pub mod output;
pub mod run;

/// Translates a glob into an anchored regular expression. `**` crosses
/// directory separators, `*` and `?` do not. Character classes are rejected.
///
/// # Example
///
/// ```
/// use progdep::glob_to_regex;
/// let re = glob_to_regex("src/*.java").unwrap();
/// assert!(re.is_match("src/Main.java"));
/// assert!(!re.is_match("src/a/Main.java"));
/// ```
pub fn glob_to_regex(pat: &str) -> Result<Regex, String> {
    if pat.contains(['[', ']']) {
        return Err(format!("character classes are not supported: {pat}"));
    }
    let mut pattern = String::with_capacity(pat.len() * 2 + 2);
    pattern.push('^');
    let mut rest = pat;
    while let Some(c) = rest.chars().next() {
        let (piece, len) = match c {
            '*' if rest.starts_with("**") => (".*".to_string(), 2),
            '*' => ("[^/]*".to_string(), 1),
            '?' => ("[^/]".to_string(), 1),
            _ => (regex::escape(&c.to_string()), c.len_utf8()),
        };
        pattern.push_str(&piece);
        rest = &rest[len..];
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|e| e.to_string())
}

/// Transforms a glob-style exclusion string into [`Regex`].
/// A trailing slash excludes everything below the directory.
///
/// # Example
///
/// ```
/// use progdep::parse_exclude;
/// let re = parse_exclude("target/").unwrap();
/// assert!(re.is_match("target/classes/Main.java"));
/// ```
pub fn parse_exclude(s: &str) -> Result<Regex, String> {
    match s.strip_suffix('/') {
        Some(dir) => glob_to_regex(&format!("{dir}/**")),
        None => glob_to_regex(s),
    }
}

/// Default exclusion patterns: VCS metadata and build output.
pub fn default_excludes() -> Vec<Regex> {
    ["**/.git/**", "**/target/**", "**/build/**"]
        .into_iter()
        .filter_map(|p| parse_exclude(p).ok())
        .collect()
}

/// Indicates whether a path matches any exclusion pattern. Separators are
/// normalised to support Windows and Unix.
///
/// # Example
///
/// ```
/// use progdep::{is_excluded, parse_exclude};
/// use std::path::Path;
/// let patterns = vec![parse_exclude("**/gen/**").unwrap()];
/// assert!(is_excluded(Path::new("app/gen/Parser.java"), &patterns));
/// ```
pub fn is_excluded(path: &Path, patterns: &[Regex]) -> bool {
    let path_str = path.to_string_lossy().replace('\\', "/");
    patterns.iter().any(|re| re.is_match(&path_str))
}

/// Walks `root` breadth first and calls `on_file` for every regular file
/// that `skip` does not reject. Directory entries are visited in sorted
/// order and symlinks are never followed.
pub fn visit<F, C>(root: &Path, skip: &F, on_file: &mut C) -> anyhow::Result<()>
where
    F: Fn(&Path) -> bool,
    C: FnMut(&Path) -> anyhow::Result<()>,
{
    let mut queue = VecDeque::from([root.to_path_buf()]);
    let mut seen = HashSet::new();
    while let Some(path) = queue.pop_front() {
        if skip(&path) {
            debug!(path = %path.display(), "Path excluded");
            continue;
        }
        if !seen.insert(path.clone()) {
            continue;
        }
        let Some(meta) = unless_denied(fs::symlink_metadata(&path), &path)? else {
            continue;
        };
        let kind = meta.file_type();
        if kind.is_symlink() {
            debug!(path = %path.display(), "Symlink skipped");
        } else if kind.is_dir() {
            let Some(entries) = unless_denied(fs::read_dir(&path), &path)? else {
                continue;
            };
            let mut children: Vec<PathBuf> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
            children.sort();
            queue.extend(children);
        } else if kind.is_file() {
            on_file(&path)?;
        }
    }
    Ok(())
}

/// Turns a permission error into `None`; other errors are returned.
fn unless_denied<T>(res: io::Result<T>, path: &Path) -> anyhow::Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "Permission denied");
            Ok(None)
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("failed to read {}", path.display()))),
    }
}

/// Java sources under `paths`, in walk order and without duplicates.
pub fn collect_java_files(paths: &[PathBuf], patterns: &[Regex]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for root in paths {
        visit(root, &|p| is_excluded(p, patterns), &mut |p| {
            if parsers::detect_type(p).is_some() && seen.insert(p.to_path_buf()) {
                files.push(p.to_path_buf());
            }
            Ok(())
        })?;
    }
    Ok(files)
}
