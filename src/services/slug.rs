pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Cuts `slug` to at most `max` characters without leaving a trailing `-`.
pub fn truncate(slug: &str, max: usize) -> String {
    let cut: String = slug.chars().take(max).collect();
    cut.trim_end_matches('-').to_string()
}

pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

/// Post slugs carry the creation time so equal titles rarely collide.
pub fn post_slug_base(title: &str, created_at_unix: i64) -> String {
    let stamp = format!(".{}", created_at_unix);
    // leave room for the stamp and a `-N` suffix within 160 characters
    let title = truncate(&slugify(title), 160 - stamp.len() - 4);
    format!("{}{}", title, stamp)
}

pub fn group_fallback_slug(id: i64) -> String {
    format!("g{}", id)
}

pub fn tag_fallback_slug(id: i64) -> String {
    format!("t{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_transliterates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("Привет мир"), "privet-mir");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn truncate_drops_trailing_separator() {
        assert_eq!(truncate("abc-def", 4), "abc");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn candidates_get_numeric_suffixes() {
        assert_eq!(candidate("rust", 1), "rust");
        assert_eq!(candidate("rust", 2), "rust-2");
    }

    #[test]
    fn post_slug_keeps_title_and_time() {
        assert_eq!(post_slug_base("My First Post", 1700000000), "my-first-post.1700000000");
        assert_eq!(post_slug_base("???", 1700000000), ".1700000000");
        assert!(post_slug_base(&"word ".repeat(100), 1700000000).len() <= 156);
    }
}
