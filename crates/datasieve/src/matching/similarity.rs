//! Fuzzy string similarity on a 0..=100 scale.
//!
//! The weighted score combines a sequence-matcher ratio with token-sort,
//! token-set and best-window (partial) variants, so that headers such as
//! `"Phone No."` still score highly against an alias like `"Phone Number"`.

/// Normalize a string for comparison: drop non-ASCII characters, replace
/// everything that is not alphanumeric or `_` with a space, lowercase, trim.
pub fn normalize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    cleaned.trim().to_string()
}

/// Weighted similarity of two strings (0..=100).
pub fn weighted_ratio(s1: &str, s2: &str) -> u8 {
    let p1 = normalize(s1);
    let p2 = normalize(s2);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let len1 = p1.chars().count() as f64;
    let len2 = p2.chars().count() as f64;
    let len_ratio = len1.max(len2) / len1.min(len2);

    let base = ratio(&p1, &p2) as f64;
    let unbase_scale = 0.95;

    let best = if len_ratio < 1.5 {
        let tsor = token_sort_ratio(&p1, &p2, false) as f64 * unbase_scale;
        let tser = token_set_ratio(&p1, &p2, false) as f64 * unbase_scale;
        base.max(tsor).max(tser)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        let partial = partial_ratio(&p1, &p2) as f64 * partial_scale;
        let ptsor = token_sort_ratio(&p1, &p2, true) as f64 * unbase_scale * partial_scale;
        let ptser = token_set_ratio(&p1, &p2, true) as f64 * unbase_scale * partial_scale;
        base.max(partial).max(ptsor).max(ptser)
    };

    to_score(best)
}

/// Sequence-matcher ratio `2*M/T` scaled to 0..=100.
pub fn ratio(s1: &str, s2: &str) -> u8 {
    if s1 == s2 {
        return 100;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0;
    }
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    to_score(100.0 * sequence_ratio(&a, &b))
}

/// Best ratio of the shorter string against equally long windows of the
/// longer one.
pub fn partial_ratio(s1: &str, s2: &str) -> u8 {
    if s1 == s2 {
        return 100;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0;
    }

    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut best: f64 = 0.0;
    for block in matching_blocks(&shorter, &longer) {
        let long_start = block.b.saturating_sub(block.a);
        let long_end = (long_start + shorter.len()).min(longer.len());
        let window = &longer[long_start..long_end];

        let r = sequence_ratio(&shorter, window);
        if r > 0.995 {
            return 100;
        }
        best = best.max(r);
    }

    to_score(100.0 * best)
}

/// Ratio of the two strings after sorting their tokens.
pub fn token_sort_ratio(s1: &str, s2: &str, partial: bool) -> u8 {
    let sorted1 = sorted_tokens(s1);
    let sorted2 = sorted_tokens(s2);
    if partial {
        partial_ratio(&sorted1, &sorted2)
    } else {
        ratio(&sorted1, &sorted2)
    }
}

/// Ratio based on the shared token set and each side's remainder.
pub fn token_set_ratio(s1: &str, s2: &str, partial: bool) -> u8 {
    let mut tokens1: Vec<&str> = s1.split_whitespace().collect();
    let mut tokens2: Vec<&str> = s2.split_whitespace().collect();
    if tokens1.is_empty() || tokens2.is_empty() {
        return 0;
    }
    tokens1.sort_unstable();
    tokens1.dedup();
    tokens2.sort_unstable();
    tokens2.dedup();

    let intersection: Vec<&str> = tokens1
        .iter()
        .copied()
        .filter(|t| tokens2.contains(t))
        .collect();
    let diff1: Vec<&str> = tokens1
        .iter()
        .copied()
        .filter(|t| !tokens2.contains(t))
        .collect();
    let diff2: Vec<&str> = tokens2
        .iter()
        .copied()
        .filter(|t| !tokens1.contains(t))
        .collect();

    let sect = intersection.join(" ");
    let combined1 = format!("{} {}", sect, diff1.join(" ")).trim().to_string();
    let combined2 = format!("{} {}", sect, diff2.join(" ")).trim().to_string();

    let score = |x: &str, y: &str| {
        if partial {
            partial_ratio(x, y)
        } else {
            ratio(x, y)
        }
    };

    score(&sect, &combined1)
        .max(score(&sect, &combined2))
        .max(score(&combined1, &combined2))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Round half to even and clamp into 0..=100.
fn to_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

/// A matching block: `a[a..a+size] == b[b..b+size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// `2*M/T` where M is the total size of the matching blocks.
fn sequence_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches: usize = matching_blocks(a, b).iter().map(|m| m.size).sum();
    2.0 * matches as f64 / total as f64
}

/// Longest common block within `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
    let mut best = Block {
        a: alo,
        b: blo,
        size: 0,
    };
    // lengths[j + 1] = length of the match ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best.size {
                best = Block {
                    a: i + 1 - k,
                    b: j + 1 - k,
                    size: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }

    best
}

/// All maximal matching blocks, in order, with adjacent blocks merged and a
/// zero-size sentinel at `(a.len(), b.len())`.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<Block> {
    let mut queue = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let m = longest_match(a, b, alo, ahi, blo, bhi);
        if m.size > 0 {
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
    }
    blocks.sort();

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len() + 1);
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                last.size += block.size;
            }
            _ => merged.push(block),
        }
    }
    merged.push(Block {
        a: a.len(),
        b: b.len(),
        size: 0,
    });
    merged
}
