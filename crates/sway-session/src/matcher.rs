//! Pairing saved windows with live ones
//!
//! A saved tree only records what a window looked like when the profile was
//! written, so matching is a heuristic: the application class narrows the
//! candidates, an identical title settles ties, and title similarity is the
//! last resort.

use std::collections::HashSet;

use tracing::debug;

use crate::tree::Node;

/// Working set of a single load
#[derive(Debug, Default)]
pub struct MatchState {
    touched: HashSet<i64>,
    defaulted: Vec<i64>,
    not_found: Vec<String>,
}

impl MatchState {
    /// Claim a live node; returns false if it was already claimed
    pub fn touch(&mut self, node_id: i64) -> bool {
        self.touched.insert(node_id)
    }

    pub fn is_touched(&self, node_id: i64) -> bool {
        self.touched.contains(&node_id)
    }

    /// Live nodes chosen by title similarity rather than an exact match
    pub fn defaulted(&self) -> &[i64] {
        &self.defaulted
    }

    /// Saved windows with no unclaimed live counterpart, as `class: title`
    pub fn not_found(&self) -> &[String] {
        &self.not_found
    }
}

/// Find the best unclaimed live node for a saved window
///
/// Returns `None` for saved records without a class (split containers) and
/// for windows with no unclaimed candidate; only the latter are recorded as
/// not found. The returned node is never one already claimed in `state`, but
/// it is left to the caller to claim it.
pub fn resolve<'t>(saved: &Node, live: &'t Node, state: &mut MatchState) -> Option<&'t Node> {
    let class = saved.class_key()?;

    let candidates: Vec<&Node> = live
        .find_by_class(class)
        .into_iter()
        .filter(|node| !state.is_touched(node.id))
        .collect();

    match candidates.as_slice() {
        [] => {
            debug!(class, title = saved.title(), "No live window left for saved window");
            state.not_found.push(format!("{}: {}", class, saved.title()));
            None
        }
        [only] => Some(*only),
        _ => {
            let title = saved.title();
            if let Some(exact) = candidates.iter().find(|node| node.title() == title) {
                return Some(*exact);
            }

            let mut best = candidates[0];
            let mut best_score = similarity(best.title(), title);
            for candidate in &candidates[1..] {
                let score = similarity(candidate.title(), title);
                if score > best_score {
                    best = *candidate;
                    best_score = score;
                }
            }

            debug!(
                class,
                saved = title,
                chosen = best.title(),
                score = best_score,
                "Matched window by title similarity"
            );
            state.defaulted.push(best.id);
            Some(best)
        }
    }
}

/// Title similarity in `[0, 1]`
///
/// Ratcliff/Obershelp: twice the number of characters in matching blocks over
/// the total length. The longest common block is found first and the regions
/// on either side of it are searched in turn.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_common_block(&a, &b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    2.0 * matched as f64 / total as f64
}

/// Longest run `a[i..i+k] == b[j..j+k]` within the given bounds, earliest first
fn longest_common_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    // run[j + 1] is the length of the common run ending at a[i - 1], b[blo + j]
    let mut prev = vec![0usize; width + 1];
    let mut run = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in 0..width {
            run[j + 1] = if a[i] == b[blo + j] { prev[j] + 1 } else { 0 };
            let k = run[j + 1];
            if k > best.2 {
                best = (i + 1 - k, blo + j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    best
}
