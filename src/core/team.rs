use crate::domain::model::{ParsedCaseRecord, StaffRole, TeamMemberInfo};
use regex::Regex;
use std::sync::OnceLock;

fn paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

fn unclosed_paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*$").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Removes parenthetical annotations, including an unclosed trailing one,
/// and collapses the leftover whitespace.
pub fn strip_annotations(name: &str) -> String {
    let no_parens = paren_re().replace_all(name, " ");
    let no_tail = unclosed_paren_re().replace(&no_parens, " ");
    whitespace_re()
        .replace_all(no_tail.trim(), " ")
        .to_string()
}

/// Ordered rule table: first pattern that matches the original context
/// decides the role. Additions go at the end of the list.
fn role_rules() -> &'static [(Regex, StaffRole)] {
    static RULES: OnceLock<Vec<(Regex, StaffRole)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)\bparalegal\b", StaffRole::BenefitsCoordinator),
            (r"(?i)\baccident\s+benefits?\b", StaffRole::BenefitsCoordinator),
            (r"(?i)\bab\b", StaffRole::BenefitsCoordinator),
            (r"(?i)\bclerk\b", StaffRole::Clerk),
            (r"(?i)\bassistant\b", StaffRole::Assistant),
        ]
        .iter()
        .map(|(pattern, role)| (Regex::new(pattern).unwrap(), *role))
        .collect()
    })
}

pub fn infer_role(context: &str) -> StaffRole {
    role_rules()
        .iter()
        .find(|(re, _)| re.is_match(context))
        .map(|(_, role)| *role)
        .unwrap_or(StaffRole::Lawyer)
}

// 姓名縮寫(單一字母)不參與模糊比對,避免 "J. Smith" 跟 "J. Brown" 被誤併
pub(crate) fn identity_tokens(lower: &str) -> Vec<&str> {
    lower
        .split_whitespace()
        .map(|t| t.trim_matches('.'))
        .filter(|t| t.len() >= 2)
        .collect()
}

/// Exact case-insensitive match on clean names first, then token overlap
/// (shared first or last name). First match wins.
pub(crate) fn match_identity(members: &[TeamMemberInfo], clean_name: &str) -> Option<usize> {
    let lower = clean_name.to_lowercase();
    if let Some(ix) = members
        .iter()
        .position(|m| m.clean_name.to_lowercase() == lower)
    {
        return Some(ix);
    }

    let tokens = identity_tokens(&lower);
    if tokens.is_empty() {
        return None;
    }
    members.iter().position(|m| {
        let member_lower = m.clean_name.to_lowercase();
        identity_tokens(&member_lower)
            .iter()
            .any(|t| tokens.contains(t))
    })
}

/// 從所有已對應的列掃出承辦人名冊。驗證被拒的列也算,
/// 名冊反映整份檔案,不只匯入成功的部分。
pub fn extract_team(records: &[ParsedCaseRecord]) -> Vec<TeamMemberInfo> {
    let mut members: Vec<TeamMemberInfo> = Vec::new();

    for record in records {
        let Some(raw) = record.assigned_to.as_deref() else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let clean = strip_annotations(raw);
        if clean.is_empty() {
            // annotation-only value, no name to work with
            continue;
        }

        match match_identity(&members, &clean) {
            Some(ix) => {
                let member = &mut members[ix];
                member.occurrences += 1;
                // 較長的原始字串帶的資訊較多,保留並重新推斷角色
                if raw.len() > member.context.len() {
                    member.context = raw.to_string();
                    member.role = infer_role(raw);
                }
            }
            None => members.push(TeamMemberInfo {
                name: raw.to_string(),
                clean_name: clean,
                role: infer_role(raw),
                context: raw.to_string(),
                occurrences: 1,
            }),
        }
    }

    // sort_by is stable, so ties keep first-seen order
    members.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    members
}
