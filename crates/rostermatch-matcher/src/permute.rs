//! Spelling variants of a normalized name as they appear in author lists.

/// Candidate spellings of `name`, full form first.
///
/// The name is split on single spaces: the first token is the given name,
/// the last the surname, everything between are middle names.
///
/// - one token: `[name]`
/// - two tokens: `[full, "F. Last", "Last, First"]`
/// - more: `[full, "F. M. Last", "F. Last", "Last, First M."]`
///
/// Casing follows the input.
pub fn permutations(name: &str) -> Vec<String> {
    let parts: Vec<&str> = name.split(' ').collect();

    let (first, last, middle) = match parts.as_slice() {
        [first, middle @ .., last] => (*first, *last, middle),
        _ => return vec![name.to_string()],
    };

    let first_initial = initial(first);
    let mut variants = vec![name.to_string()];

    if middle.is_empty() {
        variants.push(format!("{first_initial}. {last}"));
        variants.push(format!("{last}, {first}"));
    } else {
        let middle_initials = middle
            .iter()
            .map(|m| format!("{}.", initial(m)))
            .collect::<Vec<_>>()
            .join(" ");
        variants.push(format!("{first_initial}. {middle_initials} {last}"));
        variants.push(format!("{first_initial}. {last}"));
        variants.push(format!("{last}, {first} {middle_initials}"));
    }

    variants
}

/// First character of a token; empty for an empty token (doubled space).
fn initial(token: &str) -> &str {
    token
        .char_indices()
        .nth(1)
        .map_or(token, |(end, _)| &token[..end])
}
