//! Display-name normalisation.
//! Roster pages list people as "Prof. Dr. Jürgen Müller"; arXiv lists them
//! without titles and, usually, with umlauts spelled out.

/// Removed wherever they occur, in this order.
const HONORIFICS: [&str; 3] = ["Prof. ", "Dr. ", "Professor "];

/// German umlauts and their ASCII digraphs. Applied before case folding.
const UMLAUTS: [(char, &str); 6] = [
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
];

/// Strip honorifics, transliterate umlauts, lowercase.
/// Idempotent on already-normalized input.
pub fn normalize_name(raw: &str) -> String {
    let mut name = raw.to_string();
    for title in HONORIFICS {
        name = name.replace(title, "");
    }
    for (umlaut, digraph) in UMLAUTS {
        name = name.replace(umlaut, digraph);
    }
    name.to_lowercase()
}

/// Normalize a whole roster, keeping its order.
pub fn normalize_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(|n| normalize_name(n.as_ref())).collect()
}
