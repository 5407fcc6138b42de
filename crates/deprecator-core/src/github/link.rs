//! `link` response header pagination.

/// Find the `rel="next"` target in a `link` header.
///
/// The first page carries `next` and `last`, middle pages `prev`, `next` and
/// `first`, and the last page only `prev` and `first`.
pub fn next_link(header: &str) -> Option<String> {
    header
        .split(',')
        .find(|part| part.contains(r#"rel="next""#))
        .and_then(|part| part.split(';').next())
        .map(|target| target.trim().trim_start_matches('<').trim_end_matches('>'))
        .filter(|target| !target.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let header = r#"<https://api.github.com/organizations/24939410/repos?type=public&per_page=100&page=2>; rel="next", <https://api.github.com/organizations/24939410/repos?type=public&per_page=100&page=3>; rel="last""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/organizations/24939410/repos?type=public&per_page=100&page=2")
        );
    }

    #[test]
    fn test_middle_page() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=3>; rel="next", <https://api.github.com/x?page=1>; rel="first""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.github.com/x?page=3")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = r#"<https://api.github.com/x?page=2>; rel="prev", <https://api.github.com/x?page=1>; rel="first""#;
        assert_eq!(next_link(header), None);
    }
}
