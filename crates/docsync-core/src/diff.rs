//! Character diff.
//!
//! [`diff_text`] trims the common prefix and suffix of the two texts and runs Myers' O(ND)
//! shortest-edit search on the characters in between. The search is bounded by
//! [`DiffOptions::max_edit_cost`]; when the edit distance exceeds it, the changed middle is
//! emitted as one deletion followed by one insertion, which is still a correct (if larger)
//! script.
//!
//! Operations are expressed in post-previous-operation coordinates, so they can be applied one
//! after another to a single buffer.

use crate::config::DiffOptions;
use crate::delta::EditOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Delete,
    Insert(char),
}

/// Compute the edit operations that turn `old` into `new`.
///
/// Equal inputs produce no operations.
pub fn diff_text(old: &str, new: &str, options: &DiffOptions) -> Vec<EditOp> {
    if old == new {
        return Vec::new();
    }

    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &old[prefix..old.len() - suffix];
    let b = &new[prefix..new.len() - suffix];

    if a.is_empty() {
        return vec![EditOp::insert(prefix, b.iter().collect::<String>())];
    }
    if b.is_empty() {
        return vec![EditOp::delete(prefix, a.len())];
    }

    match shortest_edit(a, b, options.max_edit_cost) {
        Some(trace) => steps_to_ops(prefix, &backtrack(a, b, &trace)),
        None => {
            tracing::trace!(
                target: "docsync.delta",
                old_len = a.len(),
                new_len = b.len(),
                max_edit_cost = options.max_edit_cost,
                "edit cost budget exceeded; replacing changed region"
            );
            vec![
                EditOp::delete(prefix, a.len()),
                EditOp::insert(prefix, b.iter().collect::<String>()),
            ]
        }
    }
}

/// Forward pass of the Myers search.
///
/// Returns, for every edit distance `d` explored, the furthest-reaching `x` per diagonal as it
/// stood before round `d`, restricted to diagonals `-(d + 1)..=(d + 1)`. `None` when the
/// distance exceeds `max_cost`.
fn shortest_edit(a: &[char], b: &[char], max_cost: usize) -> Option<Vec<Vec<isize>>> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let limit = (a.len() + b.len()).min(max_cost);
    let offset = limit + 1;

    let mut v = vec![0isize; 2 * limit + 3];
    let mut trace = Vec::new();

    for d in 0..=limit {
        trace.push(v[offset - d - 1..=offset + d + 1].to_vec());

        let d = d as isize;
        let mut k = -d;
        while k <= d {
            let idx = (offset as isize + k) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                return Some(trace);
            }
            k += 2;
        }
    }

    None
}

fn backtrack(a: &[char], b: &[char], trace: &[Vec<isize>]) -> Vec<Step> {
    let mut x = a.len() as isize;
    let mut y = b.len() as isize;
    let mut steps = Vec::with_capacity(a.len() + b.len());

    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let at = |k: isize| v[(k + d + 1) as usize];

        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            steps.push(Step::Keep);
            x -= 1;
            y -= 1;
        }

        if d > 0 {
            if x == prev_x {
                steps.push(Step::Insert(b[prev_y as usize]));
            } else {
                steps.push(Step::Delete);
            }
        }

        x = prev_x;
        y = prev_y;
    }

    steps.reverse();
    steps
}

/// Collapse per-character steps into coalesced operations starting at offset `base`.
fn steps_to_ops(base: usize, steps: &[Step]) -> Vec<EditOp> {
    let mut ops: Vec<EditOp> = Vec::new();
    let mut pos = base;

    for step in steps {
        match *step {
            Step::Keep => pos += 1,
            Step::Delete => match ops.last_mut() {
                Some(EditOp::Delete { offset, len }) if *offset == pos => *len += 1,
                _ => ops.push(EditOp::delete(pos, 1)),
            },
            Step::Insert(ch) => {
                match ops.last_mut() {
                    Some(EditOp::Insert { offset, text })
                        if *offset + text.chars().count() == pos =>
                    {
                        text.push(ch)
                    }
                    _ => ops.push(EditOp::insert(pos, ch.to_string())),
                }
                pos += 1;
            }
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(old: &str, ops: &[EditOp]) -> String {
        let mut chars: Vec<char> = old.chars().collect();
        for op in ops {
            match op {
                EditOp::Insert { offset, text } => {
                    let tail = chars.split_off(*offset);
                    chars.extend(text.chars());
                    chars.extend(tail);
                }
                EditOp::Delete { offset, len } => {
                    chars.drain(*offset..*offset + *len);
                }
            }
        }
        chars.into_iter().collect()
    }

    fn check(old: &str, new: &str) -> Vec<EditOp> {
        let ops = diff_text(old, new, &DiffOptions::default());
        assert_eq!(replay(old, &ops), new, "diff {old:?} -> {new:?} gave {ops:?}");
        ops
    }

    #[test]
    fn test_equal_texts() {
        assert!(check("same", "same").is_empty());
        assert!(check("", "").is_empty());
    }

    #[test]
    fn test_pure_insert_and_delete() {
        assert_eq!(check("helo", "hello"), vec![EditOp::insert(3, "l")]);
        assert_eq!(check("hello", "helo"), vec![EditOp::delete(3, 1)]);
        assert_eq!(check("", "abc"), vec![EditOp::insert(0, "abc")]);
        assert_eq!(check("abc", ""), vec![EditOp::delete(0, 3)]);
    }

    #[test]
    fn test_middle_replacement_uses_post_op_coordinates() {
        let ops = check("abXcdYef", "abcdZZef");
        assert!(ops.len() >= 2);
        check("kitten", "sitting");
        check("the quick brown fox", "a quick brown dog");
    }

    #[test]
    fn test_disjoint_texts() {
        check("aaaa", "bbbbbb");
        check("\n\n", "xyz");
    }

    #[test]
    fn test_multibyte_characters() {
        let ops = check("你好世界", "你们好世界!");
        assert_eq!(ops, vec![EditOp::insert(1, "们"), EditOp::insert(5, "!")]);
        check("héllo wörld", "hello world");
    }

    #[test]
    fn test_budget_fallback_replaces_middle() {
        let options = DiffOptions { max_edit_cost: 1 };
        let ops = diff_text("xabcx", "xdefx", &options);
        assert_eq!(ops, vec![EditOp::delete(1, 3), EditOp::insert(1, "def")]);
        assert_eq!(replay("xabcx", &ops), "xdefx");
    }
}
