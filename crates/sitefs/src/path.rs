//! Path normalization.
//!
//! Backends see slash-separated paths relative to the filesystem root, with
//! no leading separator. The root itself is the empty string.

/// Normalize a path: strip leading `/`, resolve `.` and `..`, collapse `//`.
///
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Last component of a normalized path, `"."` for the root.
pub fn base_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => ".",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leading_separators() {
        assert_eq!(normalize("/content/a.md"), "content/a.md");
        assert_eq!(normalize("//content//a.md"), "content/a.md");
        assert_eq!(normalize("content/a.md"), "content/a.md");
    }

    #[test]
    fn test_dots() {
        assert_eq!(normalize("a/./b/../b/c.md"), "a/b/c.md");
        assert_eq!(normalize("../../a.md"), "a.md");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("layouts/"), "layouts");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("content/posts/a.md"), "a.md");
        assert_eq!(base_name("config.yaml"), "config.yaml");
        assert_eq!(base_name(""), ".");
    }
}
