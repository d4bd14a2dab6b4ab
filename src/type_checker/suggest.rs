//! "Did you mean?" suggestions for unresolved names.

/// Names further away than this are never suggested.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Optimal string alignment distance: insertions, deletions, substitutions
/// and transpositions of adjacent characters each cost one edit.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let width = b.len() + 1;
    let mut table = vec![0usize; (a.len() + 1) * width];

    for (i, cell) in table.iter_mut().step_by(width).enumerate() {
        *cell = i;
    }
    for (j, cell) in table.iter_mut().take(width).enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);

            let mut best = (table[(i - 1) * width + j] + 1) // deletion
                .min(table[i * width + j - 1] + 1) // insertion
                .min(table[(i - 1) * width + j - 1] + cost); // substitution

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(table[(i - 2) * width + j - 2] + 1); // transposition
            }

            table[i * width + j] = best;
        }
    }

    table[a.len() * width + b.len()]
}

/// Keeps the candidates close to `name`, preserving their order and dropping
/// repeats.
pub fn suggest_similar<'a, I>(name: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut suggestions: Vec<String> = Vec::new();

    for candidate in candidates {
        if edit_distance(name, candidate) < MAX_SUGGESTION_DISTANCE
            && !suggestions.iter().any(|existing| existing == candidate)
        {
            suggestions.push(candidate.to_string());
        }
    }

    suggestions
}
