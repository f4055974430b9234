//! Lexical path canonicalization.

/// Canonical form of a request path.
///
/// An empty path becomes `/`, a leading `/` is ensured, empty and `.`
/// segments are dropped, `..` removes the previous segment (never climbing
/// above the root), and a trailing `/` survives except for the root.
#[must_use]
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &stack {
        cleaned.push('/');
        cleaned.push_str(segment);
    }

    if cleaned.is_empty() {
        cleaned.push('/');
    } else if path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::clean_path;

    #[test]
    fn empty_becomes_root() {
        assert_eq!(clean_path(""), "/");
    }

    #[test]
    fn adds_leading_slash() {
        assert_eq!(clean_path("a/b"), "/a/b");
    }

    #[test]
    fn already_clean_is_unchanged() {
        for p in ["/", "/a", "/a/", "/a/b/c", "/a/b/"] {
            assert_eq!(clean_path(p), p);
        }
    }

    #[test]
    fn collapses_dot_segments() {
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/a/b/.."), "/a");
        assert_eq!(clean_path("/a/b/../"), "/a/");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path("/../../x"), "/x");
    }

    #[test]
    fn collapses_double_slashes() {
        assert_eq!(clean_path("//a//b"), "/a/b");
        assert_eq!(clean_path("/a//"), "/a/");
    }

    #[test]
    fn root_keeps_single_slash() {
        assert_eq!(clean_path("/./"), "/");
        assert_eq!(clean_path("//"), "/");
    }
}
