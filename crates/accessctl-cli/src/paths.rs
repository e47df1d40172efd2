//! Client-side expansion of path patterns against the local filesystem.

use globset::GlobBuilder;
use walkdir::WalkDir;

/// Characters that make a path argument a glob pattern rather than a literal
/// path.
const GLOB_METACHARACTERS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Whether the argument needs filesystem expansion.
pub(crate) fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(GLOB_METACHARACTERS)
}

/// Turn a user-supplied path argument into a concrete ordered list of target
/// paths.
///
/// Arguments containing glob metacharacters are expanded against the local
/// filesystem; everything else is returned as-is. A pattern matching nothing
/// (or failing to compile) falls back to the literal argument, so a
/// non-matching pattern never silently vanishes. The server's path list is
/// never consulted.
pub(crate) fn expand_pattern(pattern: &str) -> Vec<String> {
    if !is_glob_pattern(pattern) {
        return vec![pattern.to_string()];
    }

    let Ok(glob) = GlobBuilder::new(pattern).literal_separator(true).build() else {
        return vec![pattern.to_string()];
    };
    let matcher = glob.compile_matcher();

    let root = literal_prefix(pattern);
    let mut matches: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path().to_str()?;
            matcher.is_match(path).then(|| path.to_string())
        })
        .collect();

    if matches.is_empty() {
        return vec![pattern.to_string()];
    }
    matches.sort();
    matches
}

/// The deepest directory prefix of `pattern` containing no metacharacters;
/// the walk starts there instead of the filesystem root.
fn literal_prefix(pattern: &str) -> String {
    let mut components = Vec::new();
    for component in pattern.split('/') {
        if component.contains(GLOB_METACHARACTERS) {
            break;
        }
        components.push(component);
    }

    // An absolute pattern keeps its leading slash; a bare relative pattern
    // walks the working directory.
    let prefix = components.join("/");
    if prefix.is_empty() {
        if pattern.starts_with('/') {
            "/".to_string()
        } else {
            ".".to_string()
        }
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn literal_arguments_pass_through_unchanged() {
        assert_eq!(
            expand_pattern("/archive/proj1"),
            vec!["/archive/proj1".to_string()]
        );
        assert!(!is_glob_pattern("/archive/proj-1_a.b"));
    }

    #[test]
    fn non_matching_pattern_falls_back_to_the_literal() {
        assert_eq!(
            expand_pattern("/nonexistent-dir-for-tests/*"),
            vec!["/nonexistent-dir-for-tests/*".to_string()]
        );
    }

    #[test]
    fn wildcard_patterns_expand_against_the_filesystem() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("proj1"))?;
        fs::create_dir(dir.path().join("proj2"))?;
        fs::create_dir(dir.path().join("other"))?;

        let pattern = format!("{}/proj*", dir.path().display());
        let expanded = expand_pattern(&pattern);
        assert_eq!(
            expanded,
            vec![
                format!("{}/proj1", dir.path().display()),
                format!("{}/proj2", dir.path().display()),
            ]
        );
        Ok(())
    }

    #[test]
    fn wildcards_do_not_cross_directory_boundaries() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("a"))?;
        fs::create_dir(dir.path().join("a").join("nested"))?;

        let pattern = format!("{}/*", dir.path().display());
        let expanded = expand_pattern(&pattern);
        assert_eq!(expanded, vec![format!("{}/a", dir.path().display())]);
        Ok(())
    }

    #[test]
    fn literal_prefix_stops_at_the_first_metacharacter() {
        assert_eq!(literal_prefix("/data/archive/*/sub"), "/data/archive");
        assert_eq!(literal_prefix("/*"), "/");
        assert_eq!(literal_prefix("proj*"), ".");
    }
}
