use crate::core::tokenizer::TokenizedRow;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// File/claim numbers look like `AB123`: two or more uppercase letters
/// immediately followed by digits.
fn file_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{2,}\d+").unwrap())
}

pub fn looks_like_file_number(value: &str) -> bool {
    file_number_re().is_match(value.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealignRule {
    /// A file number sat in the assigned-person position, so everything
    /// after the split name was shifted one column right.
    StaffColumnShift,
    /// The file-number column held something else while the next field
    /// looked like a file number.
    FileNumberShift,
    LastResortMerge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealignedRow {
    pub line: usize,
    pub fields: Vec<String>,
    /// The untouched fields, kept for audit whenever a rule fired.
    pub original: Option<Vec<String>>,
    pub rule: Option<RealignRule>,
}

/// 列重對齊:名字欄裡未加引號的逗號會讓欄位整體右移,
/// 這裡依序套用三條啟發式規則,每列最多合併一次。
///
/// This is tuned to one observed failure shape ("Last, First" in the first
/// column) and is best-effort, not a general CSV repair tool. A row still
/// over-length after the rules passes through unchanged and surfaces
/// downstream as positional drift.
pub struct RowRealigner {
    expected_len: usize,
    assigned_idx: Option<usize>,
    file_number_idx: Option<usize>,
}

impl RowRealigner {
    pub fn new(expected_len: usize, assigned_idx: Option<usize>, file_number_idx: Option<usize>) -> Self {
        Self {
            expected_len,
            assigned_idx,
            file_number_idx,
        }
    }

    pub fn realign(&self, row: TokenizedRow) -> RealignedRow {
        if row.fields.len() <= self.expected_len {
            return RealignedRow {
                line: row.line,
                fields: row.fields,
                original: None,
                rule: None,
            };
        }

        match self.pick_rule(&row.fields) {
            Some(rule) => RealignedRow {
                line: row.line,
                fields: merge_first_two(&row.fields),
                original: Some(row.fields),
                rule: Some(rule),
            },
            None => RealignedRow {
                line: row.line,
                fields: row.fields,
                original: None,
                rule: None,
            },
        }
    }

    fn pick_rule(&self, fields: &[String]) -> Option<RealignRule> {
        if let Some(i) = self.assigned_idx {
            if fields.get(i).map(|f| looks_like_file_number(f)).unwrap_or(false) {
                return Some(RealignRule::StaffColumnShift);
            }
        }

        if let Some(i) = self.file_number_idx {
            let current_matches = fields.get(i).map(|f| looks_like_file_number(f)).unwrap_or(false);
            let next_matches = fields
                .get(i + 1)
                .map(|f| looks_like_file_number(f))
                .unwrap_or(false);
            if !current_matches && next_matches {
                return Some(RealignRule::FileNumberShift);
            }
        }

        if fields.get(1).map(|f| !looks_like_file_number(f)).unwrap_or(false) {
            return Some(RealignRule::LastResortMerge);
        }

        None
    }
}

// 合併欄位 0 與 1,還原被逗號拆開的名字
fn merge_first_two(fields: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(fields.len() - 1);
    merged.push(format!("{},{}", fields[0], fields[1]));
    merged.extend(fields[2..].iter().cloned());
    merged
}
