/// Deterministic, filesystem-safe file stem for a category name.
///
/// Lowercases, turns whitespace runs into single hyphens, keeps
/// `[a-z0-9._-]`, drops everything else, collapses hyphen runs and trims
/// leading/trailing hyphens and dots. An empty result falls back to
/// `"uncategorized"`. Two distinct category names may slug to the same
/// stem; callers treat that as last-write-wins.
pub fn category_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut prev_hyphen = false;

    for c in name.trim().chars() {
        let mapped = if c.is_whitespace() { '-' } else { c.to_ascii_lowercase() };
        match mapped {
            'a'..='z' | '0'..='9' | '.' | '_' => {
                slug.push(mapped);
                prev_hyphen = false;
            }
            '-' => {
                if !prev_hyphen {
                    slug.push('-');
                }
                prev_hyphen = true;
            }
            _ => {}
        }
    }

    let trimmed = slug.trim_matches(&['-', '.'][..]);
    if trimmed.is_empty() {
        "uncategorized".to_string()
    } else {
        trimmed.to_string()
    }
}
