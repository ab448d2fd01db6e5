/// Edit distance used by the matcher for every compared field.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// Levenshtein distance over Unicode scalar values.
///
/// Insertions, deletions and substitutions each cost 1. Uses the full
/// `(len(a)+1) x (len(b)+1)` grid, so time and memory are `O(len(a) * len(b))`.
///
/// Precondition: both inputs are single field values (names, room numbers,
/// amounts). Nothing here bounds their length; callers that accept untrusted
/// records must cap field length themselves.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let len_a = a_chars.len();
    let len_b = b_chars.len();

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut grid = vec![vec![0usize; len_b + 1]; len_a + 1];
    for (i, row) in grid.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in grid[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            grid[i][j] = (grid[i - 1][j] + 1) // deletion
                .min(grid[i][j - 1] + 1) // insertion
                .min(grid[i - 1][j - 1] + cost); // substitution
        }
    }

    grid[len_a][len_b]
}

pub fn within_distance(a: &str, b: &str, max_dist: usize) -> bool {
    levenshtein_distance(a, b) <= max_dist
}
