//! Property path construction.
//!
//! Every error key is built here so `each`, `object` and leaf dispatch agree
//! on the exact spelling: `parent.field`, with `[index]` appended for
//! sequence elements.

/// Joins a field name onto a parent path.
///
/// An empty parent yields the bare field name.
pub fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Appends an element index to a path.
pub fn index(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Builds the full path for a field, optionally addressing one element.
pub fn property_path(parent: &str, field: &str, element: Option<usize>) -> String {
    let path = join(parent, field);
    match element {
        Some(i) => index(&path, i),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_field() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(property_path("", "a", None), "a");
    }

    #[test]
    fn test_nested_field() {
        assert_eq!(join("a.b", "c"), "a.b.c");
        assert_eq!(join("a[0]", "b"), "a[0].b");
    }

    #[test]
    fn test_indexed_field() {
        assert_eq!(property_path("", "a", Some(0)), "a[0]");
        assert_eq!(property_path("a[0]", "b", Some(1)), "a[0].b[1]");
        assert_eq!(index("a[0].b", 12), "a[0].b[12]");
    }
}
