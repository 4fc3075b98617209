//! Error taxonomy for statement rendering.
//!
//! Only two domain error kinds exist. A forbidden diff is one the model can
//! express but the caller has not permitted; it carries the generated
//! statement so tooling can display what would have run. An unsupported diff
//! is one the model cannot faithfully represent at all.

use crate::ObjectKey;

/// Result type for statement rendering.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Errors produced when rendering a diff's DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The statement is valid and the model knows how to emit it, but the
    /// supplied statement modifiers do not permit it.
    #[error("{reason}")]
    Forbidden {
        /// Human-readable reason the statement was not permitted.
        reason: String,
        /// The DDL that would have been returned.
        statement: String,
    },

    /// The object uses features this model cannot round-trip, so no diff
    /// against it can be trusted.
    #[error("{object_key} uses unsupported features and cannot be diff'd")]
    Unsupported {
        object_key: ObjectKey,
        /// The CREATE statement the model regenerates for the object.
        expected_create: String,
        /// The CREATE statement the server actually reports.
        actual_create: String,
    },
}

impl DiffError {
    /// Returns true for an unsafe alteration that was not explicitly
    /// permitted by the supplied statement modifiers.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns true for an object that cannot be diff'd due to use of
    /// features not supported by this crate.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Returns the generated DDL carried by a forbidden error.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Forbidden { statement, .. } => Some(statement),
            Self::Unsupported { .. } => None,
        }
    }

    /// For unsupported diffs, returns a unified diff between the
    /// model-generated CREATE and the server's actual SHOW CREATE, for
    /// operator display.
    #[must_use]
    pub fn extended_error(&self) -> Option<String> {
        match self {
            Self::Unsupported { expected_create, actual_create, .. } => Some(unified_diff(
                expected_create,
                actual_create,
                "Expected CREATE",
                "MySQL-actual SHOW CREATE",
            )),
            Self::Forbidden { .. } => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum DiffOp {
    Equal,
    Delete,
    Insert,
}

/// Zero-context unified diff over lines, via a longest-common-subsequence
/// walk. Returns an empty string when the inputs are identical.
fn unified_diff(expected: &str, actual: &str, from_label: &str, to_label: &str) -> String {
    let a: Vec<&str> = expected.lines().collect();
    let b: Vec<&str> = actual.lines().collect();

    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops: Vec<DiffOp> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            ops.push(DiffOp::Equal);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(DiffOp::Delete);
            i += 1;
        } else {
            ops.push(DiffOp::Insert);
            j += 1;
        }
    }
    ops.extend(std::iter::repeat(DiffOp::Delete).take(a.len() - i));
    ops.extend(std::iter::repeat(DiffOp::Insert).take(b.len() - j));

    let mut body = String::new();
    let (mut a_line, mut b_line) = (0usize, 0usize);
    let mut op_index = 0;
    while op_index < ops.len() {
        if ops[op_index] == DiffOp::Equal {
            a_line += 1;
            b_line += 1;
            op_index += 1;
            continue;
        }
        // One hunk: a maximal run of non-equal ops.
        let (hunk_a_start, hunk_b_start) = (a_line, b_line);
        let mut deleted = Vec::new();
        let mut inserted = Vec::new();
        while op_index < ops.len() && ops[op_index] != DiffOp::Equal {
            match ops[op_index] {
                DiffOp::Delete => {
                    deleted.push(a[a_line]);
                    a_line += 1;
                }
                DiffOp::Insert => {
                    inserted.push(b[b_line]);
                    b_line += 1;
                }
                DiffOp::Equal => {}
            }
            op_index += 1;
        }
        // Unified hunk headers are 1-based; a zero-length side points at the
        // line before the gap.
        let a_header = if deleted.is_empty() { hunk_a_start } else { hunk_a_start + 1 };
        let b_header = if inserted.is_empty() { hunk_b_start } else { hunk_b_start + 1 };
        body.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            a_header,
            deleted.len(),
            b_header,
            inserted.len()
        ));
        for line in deleted {
            body.push_str(&format!("-{line}\n"));
        }
        for line in inserted {
            body.push_str(&format!("+{line}\n"));
        }
    }

    if body.is_empty() {
        return String::new();
    }
    format!("--- {from_label}\n+++ {to_label}\n{body}")
}
