// ABOUTME: Slug sanitization - normalizes requested subagent identifiers to
// ABOUTME: lowercase [a-z0-9-] with no doubled, leading, or trailing hyphens.

/// Normalize a requested slug to the restricted alphabet.
///
/// Lowercases, maps spaces and underscores to hyphens, drops everything else
/// outside `[a-z0-9-]`, collapses hyphen runs, and trims hyphens from both
/// ends. Idempotent. May return an empty string; callers treat that as a
/// validation error.
pub fn sanitize(input: &str) -> String {
    let mut mapped = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' | '-' => mapped.push(c),
            ' ' | '_' => mapped.push('-'),
            _ => {}
        }
    }

    // Collapse runs after mapping, trim after collapsing; the order matters.
    let mut collapsed = String::with_capacity(mapped.len());
    let mut prev_hyphen = false;
    for c in mapped.chars() {
        if c == '-' {
            if prev_hyphen {
                continue;
            }
            prev_hyphen = true;
        } else {
            prev_hyphen = false;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_string()
}
