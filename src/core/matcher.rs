use crate::core::team::{identity_tokens, match_identity, strip_annotations};
use crate::domain::model::{StaffMember, TeamMemberInfo};
use std::collections::HashMap;

/// Immutable name index over a directory snapshot. Built once per run,
/// then only read; matching stays deterministic no matter the fold order.
pub struct NameIndex {
    exact: HashMap<String, String>,
    // (token, staff id) in directory order, so first match wins
    tokens: Vec<(String, String)>,
}

impl NameIndex {
    pub fn from_directory(staff: &[StaffMember]) -> Self {
        let mut exact = HashMap::new();
        let mut tokens = Vec::new();

        for member in staff {
            let clean = strip_annotations(&member.name).to_lowercase();
            if clean.is_empty() {
                continue;
            }
            exact
                .entry(clean.clone())
                .or_insert_with(|| member.id.clone());
            for token in identity_tokens(&clean) {
                tokens.push((token.to_string(), member.id.clone()));
            }
        }

        Self { exact, tokens }
    }

    /// 先精確比對再做姓名 token 比對,順序與名冊萃取一致。
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let clean = strip_annotations(name).to_lowercase();
        if clean.is_empty() {
            return None;
        }

        if let Some(id) = self.exact.get(&clean) {
            return Some(id.as_str());
        }

        for token in identity_tokens(&clean) {
            if let Some((_, id)) = self.tokens.iter().find(|(t, _)| t.as_str() == token) {
                return Some(id.as_str());
            }
        }

        None
    }
}

/// Fold of the extracted roster over a [`NameIndex`]: every roster member
/// either resolves to a staff id or lands in `unmatched` exactly once.
pub struct RosterResolution {
    by_member: Vec<Option<String>>,
    pub unmatched: Vec<String>,
}

pub fn resolve_roster(team: &[TeamMemberInfo], index: &NameIndex) -> RosterResolution {
    let mut by_member = Vec::with_capacity(team.len());
    let mut unmatched = Vec::new();

    for member in team {
        // the richest context often carries the fullest spelling, so try it
        // before the first-seen clean name
        let id = index
            .resolve(&member.context)
            .or_else(|| index.resolve(&member.clean_name))
            .map(|s| s.to_string());
        if id.is_none() {
            unmatched.push(member.clean_name.clone());
        }
        by_member.push(id);
    }

    RosterResolution {
        by_member,
        unmatched,
    }
}

impl RosterResolution {
    /// Resolves a record's raw assigned-person text through the roster:
    /// the name is matched to a roster identity, then to that identity's
    /// staff id. `None` means the case keeps a note instead of a staff id.
    pub fn lookup(&self, team: &[TeamMemberInfo], raw_name: &str) -> Option<&str> {
        let clean = strip_annotations(raw_name);
        if clean.is_empty() {
            return None;
        }
        let ix = match_identity(team, &clean)?;
        self.by_member.get(ix).and_then(|id| id.as_deref())
    }
}
