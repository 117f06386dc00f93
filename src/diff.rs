//! Line-oriented text diff.
//!
//! Lines are compared without their terminator, so `\r\n` and `\n` endings are
//! equivalent. A missing newline at the end of one side only still counts as a
//! change.

use std::fmt::Write as _;

/// Unchanged lines shown around each change when rendering.
const CONTEXT_LINES: usize = 3;

/// Above this many cells the LCS table is skipped and the differing middle is
/// reported as one replacement.
const MAX_TABLE_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    text: &'a str,
    newline: bool,
}

/// One entry of an edit script, from expected to actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Equal(&'a str),
    /// Present in expected, missing from actual.
    Delete(&'a str, bool),
    /// Present in actual, missing from expected.
    Insert(&'a str, bool),
}

/// The result of [`line_diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiff<'a> {
    changes: Vec<Change<'a>>,
}

impl<'a> LineDiff<'a> {
    /// True when the two texts are equivalent.
    pub fn is_empty(&self) -> bool {
        self.changes.iter().all(|c| matches!(c, Change::Equal(_)))
    }

    /// Render as `-`/`+`/` ` prefixed lines with a little context.
    pub fn render(&self) -> String {
        let keep: Vec<bool> = (0..self.changes.len())
            .map(|idx| {
                let lo = idx.saturating_sub(CONTEXT_LINES);
                let hi = (idx + CONTEXT_LINES + 1).min(self.changes.len());
                self.changes[lo..hi]
                    .iter()
                    .any(|c| !matches!(c, Change::Equal(_)))
            })
            .collect();

        let mut out = String::new();
        let mut skipped = false;
        for (change, keep) in self.changes.iter().zip(keep) {
            if !keep {
                skipped = true;
                continue;
            }
            if skipped {
                out.push_str("...\n");
                skipped = false;
            }
            match change {
                Change::Equal(text) => {
                    let _ = writeln!(out, " {text}");
                }
                Change::Delete(text, newline) => {
                    let _ = writeln!(out, "-{text}");
                    if !newline {
                        out.push_str("\\ No newline at end of file\n");
                    }
                }
                Change::Insert(text, newline) => {
                    let _ = writeln!(out, "+{text}");
                    if !newline {
                        out.push_str("\\ No newline at end of file\n");
                    }
                }
            }
        }
        if skipped {
            out.push_str("...\n");
        }
        out
    }
}

/// Diff `expected` against `actual`, line by line.
pub fn line_diff<'a>(expected: &'a str, actual: &'a str) -> LineDiff<'a> {
    let old = split_lines(expected);
    let new = split_lines(actual);

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut changes: Vec<Change<'a>> = old[..prefix]
        .iter()
        .map(|line| Change::Equal(line.text))
        .collect();
    changes.extend(diff_middle(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
    ));
    changes.extend(
        old[old.len() - suffix..]
            .iter()
            .map(|line| Change::Equal(line.text)),
    );

    LineDiff { changes }
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split_inclusive('\n')
        .map(|raw| match raw.strip_suffix('\n') {
            Some(text) => Line {
                text: text.strip_suffix('\r').unwrap_or(text),
                newline: true,
            },
            None => Line {
                text: raw,
                newline: false,
            },
        })
        .collect()
}

fn diff_middle<'a>(old: &[Line<'a>], new: &[Line<'a>]) -> Vec<Change<'a>> {
    let delete = |l: &Line<'a>| Change::Delete(l.text, l.newline);
    let insert = |l: &Line<'a>| Change::Insert(l.text, l.newline);

    if old.len().saturating_mul(new.len()) > MAX_TABLE_CELLS {
        return old.iter().map(delete).chain(new.iter().map(insert)).collect();
    }

    // lcs[i][j] = length of the LCS of old[i..] and new[j..]
    let width = new.len() + 1;
    let mut lcs = vec![0usize; (old.len() + 1) * width];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i * width + j] = if old[i] == new[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut changes = Vec::with_capacity(old.len() + new.len());
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            changes.push(Change::Equal(old[i].text));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            changes.push(delete(&old[i]));
            i += 1;
        } else {
            changes.push(insert(&new[j]));
            j += 1;
        }
    }
    changes.extend(old[i..].iter().map(delete));
    changes.extend(new[j..].iter().map(insert));
    changes
}
