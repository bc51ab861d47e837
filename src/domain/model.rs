use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Active,
    Pending,
    Settled,
    Closed,
    Discontinued,
}

impl CaseStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" | "open" | "ongoing" => Some(Self::Active),
            "pending" | "on hold" | "hold" => Some(Self::Pending),
            "settled" | "settlement" => Some(Self::Settled),
            "closed" | "complete" | "completed" => Some(Self::Closed),
            "discontinued" | "dismissed" | "abandoned" => Some(Self::Discontinued),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::Closed => "closed",
            Self::Discontinued => "discontinued",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    AccidentBenefits,
    Tort,
    LongTermDisability,
    CppDisability,
    Wsib,
}

impl BenefitType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ab" | "accident benefit" | "accident benefits" | "sabs" => Some(Self::AccidentBenefits),
            "tort" | "bi" | "bodily injury" => Some(Self::Tort),
            "ltd" | "long term disability" | "long-term disability" => Some(Self::LongTermDisability),
            "cpp" | "cppd" | "cpp-d" | "cpp disability" => Some(Self::CppDisability),
            "wsib" | "wcb" => Some(Self::Wsib),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::AccidentBenefits => "AB",
            Self::Tort => "TORT",
            Self::LongTermDisability => "LTD",
            Self::CppDisability => "CPPD",
            Self::Wsib => "WSIB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Lawyer,
    BenefitsCoordinator,
    Clerk,
    Assistant,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lawyer => "lawyer",
            Self::BenefitsCoordinator => "benefits_coordinator",
            Self::Clerk => "clerk",
            Self::Assistant => "assistant",
        }
    }
}

/// One roster row after field mapping. Date fields hold canonical
/// `YYYY-MM-DD` strings when present; `source_line` is the 1-indexed line
/// in the uploaded file, counting comments and preamble.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedCaseRecord {
    pub client_name: String,
    pub file_number: Option<String>,
    pub assigned_to: Option<String>,
    pub birth_date: Option<String>,
    pub date_of_loss: Option<String>,
    pub insurance_company: Option<String>,
    pub policy_number: Option<String>,
    pub claim_number: Option<String>,
    pub adjuster: Option<String>,
    pub status: Option<CaseStatus>,
    pub benefit_type: Option<BenefitType>,
    pub notes: Vec<String>,
    pub source_line: usize,
}

/// Ordered header → cell pairs for one row. Duplicate headers are kept as
/// separate columns, so repeated `Notes` columns never collapse.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.columns.push((header.into(), value.into()));
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberInfo {
    /// The value as it first appeared in the file, annotations included.
    pub name: String,
    pub clean_name: String,
    pub role: StaffRole,
    /// Longest original value seen for this person; role is re-inferred
    /// from it whenever it grows.
    pub context: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    pub line: usize,
    pub record: ParsedCaseRecord,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub accepted: Vec<ParsedCaseRecord>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub client_id: String,
    pub staff_id: Option<String>,
    pub file_number: Option<String>,
    pub date_of_loss: NaiveDate,
    pub limitation_date: NaiveDate,
    pub insurance_company: Option<String>,
    pub policy_number: Option<String>,
    pub claim_number: Option<String>,
    pub adjuster: Option<String>,
    pub status: Option<CaseStatus>,
    pub benefit_type: Option<BenefitType>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_rows: usize,
    pub errors: Vec<ImportRowError>,
    pub team: Vec<TeamMemberInfo>,
    pub unmatched_names: Vec<String>,
}

impl ImportResult {
    /// Operator-facing summary. Error detail is capped; the full list stays
    /// on the struct.
    pub fn report(&self, source: &str) -> String {
        const MAX_ERRORS_SHOWN: usize = 20;

        let mut out = String::new();
        out.push_str(&format!("Import summary for {}\n", source));
        out.push_str(&format!("  imported: {}\n", self.succeeded));
        out.push_str(&format!("  failed:   {}\n", self.failed));
        out.push_str(&format!("  skipped:  {}\n", self.skipped_rows));

        if !self.team.is_empty() {
            out.push_str(&format!("  team ({} people):\n", self.team.len()));
            for member in &self.team {
                out.push_str(&format!(
                    "    {} [{}] x{}\n",
                    member.clean_name,
                    member.role.as_str(),
                    member.occurrences
                ));
            }
        }

        if !self.unmatched_names.is_empty() {
            out.push_str(&format!(
                "  not in staff directory: {}\n",
                self.unmatched_names.join(", ")
            ));
        }

        if !self.errors.is_empty() {
            out.push_str("  errors:\n");
            for e in self.errors.iter().take(MAX_ERRORS_SHOWN) {
                out.push_str(&format!("    line {}: {}\n", e.line, e.message));
            }
            if self.errors.len() > MAX_ERRORS_SHOWN {
                out.push_str(&format!(
                    "    ... and {} more\n",
                    self.errors.len() - MAX_ERRORS_SHOWN
                ));
            }
        }

        out
    }
}
