use crate::core::dates::normalize_date;
use crate::core::realign::RealignedRow;
use crate::domain::model::{BenefitType, CaseStatus, ParsedCaseRecord, RawRow};
use serde::{Deserialize, Serialize};

/// Canonical domain fields a roster column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    ClientName,
    FileNumber,
    AssignedTo,
    BirthDate,
    DateOfLoss,
    InsuranceCompany,
    PolicyNumber,
    ClaimNumber,
    Adjuster,
    Status,
    BenefitType,
    Notes,
}

impl FieldKind {
    pub const ALL: [FieldKind; 12] = [
        FieldKind::ClientName,
        FieldKind::FileNumber,
        FieldKind::AssignedTo,
        FieldKind::BirthDate,
        FieldKind::DateOfLoss,
        FieldKind::InsuranceCompany,
        FieldKind::PolicyNumber,
        FieldKind::ClaimNumber,
        FieldKind::Adjuster,
        FieldKind::Status,
        FieldKind::BenefitType,
        FieldKind::Notes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClientName => "client_name",
            Self::FileNumber => "file_number",
            Self::AssignedTo => "assigned_to",
            Self::BirthDate => "birth_date",
            Self::DateOfLoss => "date_of_loss",
            Self::InsuranceCompany => "insurance_company",
            Self::PolicyNumber => "policy_number",
            Self::ClaimNumber => "claim_number",
            Self::Adjuster => "adjuster",
            Self::Status => "status",
            Self::BenefitType => "benefit_type",
            Self::Notes => "notes",
        }
    }

    pub fn from_name(name: &str) -> Option<FieldKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }
}

/// 欄名比對前先去掉標點、底線與空白並轉小寫,
/// 所以 "Date of Loss"、"date_of_loss"、"D.O.L." 都能對上。
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Accepted header spellings per canonical field, normalized form. Firm
/// profiles can add spellings; the built-in table is the floor.
#[derive(Debug, Clone)]
pub struct SynonymSet {
    entries: Vec<(FieldKind, Vec<String>)>,
}

impl Default for SynonymSet {
    fn default() -> Self {
        let table: &[(FieldKind, &[&str])] = &[
            (
                FieldKind::ClientName,
                &["clientname", "client", "name", "plaintiff", "claimant", "fullname"],
            ),
            (
                FieldKind::FileNumber,
                &["fileno", "filenumber", "file", "filenum", "matterno", "matternumber"],
            ),
            (
                FieldKind::AssignedTo,
                &[
                    "assignedto",
                    "assigned",
                    "assignedlawyer",
                    "lawyer",
                    "staff",
                    "handler",
                    "carriage",
                    "responsiblelawyer",
                ],
            ),
            (FieldKind::BirthDate, &["dateofbirth", "dob", "birthdate", "born"]),
            (
                FieldKind::DateOfLoss,
                &["dateofloss", "dol", "lossdate", "dateofaccident", "accidentdate", "doa"],
            ),
            (
                FieldKind::InsuranceCompany,
                &["insurancecompany", "insurer", "insurance", "inscompany", "insuranceco"],
            ),
            (FieldKind::PolicyNumber, &["policynumber", "policyno", "policy"]),
            (FieldKind::ClaimNumber, &["claimnumber", "claimno", "claim"]),
            (FieldKind::Adjuster, &["adjuster", "adjustor", "insuranceadjuster"]),
            (FieldKind::Status, &["status", "filestatus", "casestatus", "stage"]),
            (
                FieldKind::BenefitType,
                &["benefittype", "benefitstype", "benefits", "typeofbenefits", "claimtype"],
            ),
            (
                FieldKind::Notes,
                &["notes", "note", "comments", "comment", "memo", "remarks"],
            ),
        ];

        Self {
            entries: table
                .iter()
                .map(|(kind, spellings)| {
                    (*kind, spellings.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl SynonymSet {
    pub fn extend(&mut self, kind: FieldKind, spelling: &str) {
        let normalized = normalize_header(spelling);
        if normalized.is_empty() {
            return;
        }
        if let Some((_, list)) = self.entries.iter_mut().find(|(k, _)| *k == kind) {
            if !list.contains(&normalized) {
                list.push(normalized);
            }
        }
    }

    pub fn lookup(&self, header: &str) -> Option<FieldKind> {
        let normalized = normalize_header(header);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, list)| list.iter().any(|s| *s == normalized))
            .map(|(kind, _)| *kind)
    }

    /// True for cells that identify the header line: one of the required
    /// fields' spellings.
    pub fn is_identifying(&self, cell: &str) -> bool {
        matches!(
            self.lookup(cell),
            Some(FieldKind::ClientName) | Some(FieldKind::DateOfLoss)
        )
    }
}

#[derive(Debug, Clone)]
pub struct HeaderMap {
    headers: Vec<String>,
    kinds: Vec<Option<FieldKind>>,
}

impl HeaderMap {
    /// Resolves each column to at most one canonical field. When two
    /// columns claim the same field the first wins and the later column is
    /// treated as unmatched; `Notes` may repeat.
    pub fn resolve(header_fields: &[String], synonyms: &SynonymSet) -> Self {
        let mut kinds = Vec::with_capacity(header_fields.len());
        let mut taken: Vec<FieldKind> = Vec::new();

        for header in header_fields {
            let kind = synonyms.lookup(header).and_then(|k| {
                if k == FieldKind::Notes {
                    return Some(k);
                }
                if taken.contains(&k) {
                    return None;
                }
                taken.push(k);
                Some(k)
            });
            kinds.push(kind);
        }

        Self {
            headers: header_fields.to_vec(),
            kinds,
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn kind_at(&self, index: usize) -> Option<FieldKind> {
        self.kinds.get(index).copied().flatten()
    }

    pub fn index_of(&self, kind: FieldKind) -> Option<usize> {
        self.kinds.iter().position(|k| *k == Some(kind))
    }

    pub fn has_required(&self) -> bool {
        self.index_of(FieldKind::ClientName).is_some()
            && self.index_of(FieldKind::DateOfLoss).is_some()
    }
}

/// 欄位對應器:把一列資料套上標題對應,產出領域記錄。
pub struct FieldMapper {
    header: HeaderMap,
}

impl FieldMapper {
    pub fn new(header: HeaderMap) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    /// Returns `None` for rows that never reach validation: blank rows,
    /// and every row when a required column is absent from the header.
    /// Callers count those via the skipped-row counter.
    pub fn map_row(&self, row: &RealignedRow) -> Option<ParsedCaseRecord> {
        if !self.header.has_required() {
            return None;
        }

        // 依標題位置配對;多出的欄位丟棄,不足的補空字串
        let mut raw = RawRow::new();
        for (i, header) in self.header.headers().iter().enumerate() {
            let value = row.fields.get(i).map(|s| s.as_str()).unwrap_or("");
            raw.push(header.clone(), value);
        }

        if raw.iter().all(|(_, value)| value.trim().is_empty()) {
            return None;
        }

        let mut record = ParsedCaseRecord {
            source_line: row.line,
            ..Default::default()
        };

        for (i, (header, value)) in raw.iter().enumerate() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match self.header.kind_at(i) {
                Some(FieldKind::ClientName) => record.client_name = value.to_string(),
                Some(FieldKind::FileNumber) => record.file_number = Some(value.to_string()),
                Some(FieldKind::AssignedTo) => record.assigned_to = Some(value.to_string()),
                Some(FieldKind::BirthDate) => record.birth_date = normalize_date(value),
                Some(FieldKind::DateOfLoss) => record.date_of_loss = normalize_date(value),
                Some(FieldKind::InsuranceCompany) => {
                    record.insurance_company = Some(value.to_string())
                }
                Some(FieldKind::PolicyNumber) => record.policy_number = Some(value.to_string()),
                Some(FieldKind::ClaimNumber) => record.claim_number = Some(value.to_string()),
                Some(FieldKind::Adjuster) => record.adjuster = Some(value.to_string()),
                Some(FieldKind::Status) => match CaseStatus::parse(value) {
                    Some(status) => record.status = Some(status),
                    // 認不得的狀態文字保留到 notes,不丟資料
                    None => record.notes.push(format!("Status: {}", value)),
                },
                Some(FieldKind::BenefitType) => match BenefitType::parse(value) {
                    Some(benefit) => record.benefit_type = Some(benefit),
                    None => record.notes.push(format!("Benefit type: {}", value)),
                },
                Some(FieldKind::Notes) => record.notes.push(value.to_string()),
                None => record.notes.push(format!("{}: {}", header.trim(), value)),
            }
        }

        Some(record)
    }
}
