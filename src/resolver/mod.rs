use tracing::trace;

use crate::walker::ValidFileSet;

/// Reserved file name that marks a directory as a package's own module.
pub const PACKAGE_INDEX: &str = "__init__.py";

/// The outcome of resolving one dotted name against the discovered files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Matched the module form, `a/b.py`.
    Module(&'a str),
    /// Matched the package form, `a/b/__init__.py`.
    Package(&'a str),
    /// Matched neither form. Covers third-party and standard-library names,
    /// namespace packages, and anything else that is not a discovered file.
    Miss,
}

impl<'a> Resolution<'a> {
    /// The resolved node id, if any.
    pub fn target(self) -> Option<&'a str> {
        match self {
            Self::Module(id) | Self::Package(id) => Some(id),
            Self::Miss => None,
        }
    }
}

/// The two candidate paths for `dotted`, in the order they are checked.
///
/// - `a.b` -> `a/b.py`
/// - `a.b` -> `a/b/__init__.py`
pub fn candidates(dotted: &str) -> [String; 2] {
    let base = dotted.replace('.', "/");
    [format!("{base}.py"), format!("{base}/{PACKAGE_INDEX}")]
}

/// Resolve a dotted module name to a discovered node id.
///
/// Pure string matching against `files`: the module form wins over the package
/// form, and a name matching neither is dropped without error.
pub fn resolve_module<'a>(dotted: &str, files: &'a ValidFileSet) -> Resolution<'a> {
    let [module_form, package_form] = candidates(dotted);

    if let Some(id) = files.get(&module_form) {
        return Resolution::Module(id);
    }
    if let Some(id) = files.get(&package_form) {
        return Resolution::Package(id);
    }

    trace!("unresolved import '{dotted}'");
    Resolution::Miss
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(ids: &[&str]) -> ValidFileSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidates_order() {
        assert_eq!(candidates("utils"), ["utils.py".to_owned(), "utils/__init__.py".to_owned()]);
        assert_eq!(candidates("a.b.c"), ["a/b/c.py".to_owned(), "a/b/c/__init__.py".to_owned()]);
    }

    #[test]
    fn test_module_form() {
        let set = files(&["utils.py"]);
        assert_eq!(resolve_module("utils", &set), Resolution::Module("utils.py"));
    }

    #[test]
    fn test_package_form() {
        let set = files(&["pkg/__init__.py", "pkg/helper.py"]);
        assert_eq!(resolve_module("pkg", &set), Resolution::Package("pkg/__init__.py"));
        assert_eq!(resolve_module("pkg.helper", &set), Resolution::Module("pkg/helper.py"));
    }

    #[test]
    fn test_module_form_wins_over_package_form() {
        let set = files(&["pkg.py", "pkg/__init__.py"]);
        assert_eq!(resolve_module("pkg", &set), Resolution::Module("pkg.py"));
    }

    #[test]
    fn test_miss_for_unknown_names() {
        let set = files(&["main.py"]);
        assert_eq!(resolve_module("os", &set), Resolution::Miss);
        assert_eq!(resolve_module("os.path", &set), Resolution::Miss);
        assert_eq!(resolve_module("os", &set).target(), None);
    }

    #[test]
    fn test_no_search_path_emulation() {
        // `src/` layouts are not searched: only the literal path matches.
        let set = files(&["src/app/core.py"]);
        assert_eq!(resolve_module("app.core", &set), Resolution::Miss);
        assert_eq!(
            resolve_module("src.app.core", &set).target(),
            Some("src/app/core.py")
        );
    }

    #[test]
    fn test_namespace_directory_without_index_misses() {
        let set = files(&["ns/mod.py"]);
        assert_eq!(resolve_module("ns", &set), Resolution::Miss);
    }
}
