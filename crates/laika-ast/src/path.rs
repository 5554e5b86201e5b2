//! Virtual document paths (§3.4): `/a/b/c`-style keys into a
//! `DocumentTreeRoot`, unrelated to any filesystem path. Backed by
//! `relative-path` so segment joining/normalization doesn't need
//! reinventing, even though these paths never touch a real filesystem.
//!
//! `Document`/`DocumentTree`/`DocumentTreeRoot` themselves live in
//! `laika-config`, one layer up: a `Document` carries a `Config` record
//! (§3.5), and `ConfigValue` carries AST nodes back, so the type that
//! needs both can't live below the config layer without a dependency
//! cycle.

use relative_path::{RelativePath, RelativePathBuf};

pub type Path = RelativePathBuf;

pub fn path(s: impl AsRef<str>) -> Path {
    RelativePath::new(s.as_ref()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_normalize_like_relative_paths() {
        let p = path("/a/b/../c");
        assert_eq!(p.as_str(), "/a/c");
    }
}
