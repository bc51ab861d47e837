use crate::config::ImportOptions;
use crate::core::mapper::{FieldKind, FieldMapper, HeaderMap, SynonymSet};
use crate::core::matcher::{resolve_roster, NameIndex, RosterResolution};
use crate::core::realign::{RealignedRow, RowRealigner};
use crate::core::team::extract_team;
use crate::core::tokenizer;
use crate::core::validator::validate;
use crate::domain::model::{
    ImportResult, ImportRowError, NewCase, NewClient, ParsedCaseRecord, RejectedRow, TeamMemberInfo,
};
use crate::domain::ports::{CaseStore, ClientStore, ProgressCallback, StaffDirectory};
use crate::utils::error::{ImportError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Standard limitation period measured from the date of loss.
const LIMITATION_MONTHS: u32 = 24;
/// Minors get the extended deadline: their 20th birthday.
const AGE_OF_MAJORITY: i32 = 18;
const MINORITY_DEADLINE_AGE: u32 = 20;

/// Output of the pure parsing stages: tokenize, realign, map.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub header: Vec<String>,
    pub header_line: usize,
    pub records: Vec<ParsedCaseRecord>,
    /// Rows excluded before validation: blank rows, and all rows when a
    /// required column is missing from the header.
    pub skipped_rows: usize,
    /// Audit trail of every row a realign rule fired on.
    pub realigned: Vec<RealignedRow>,
}

/// 解析整份檔案:斷列、修欄、對應欄位。不做驗證,也不碰外部儲存。
pub fn parse_case_file(text: &str, synonyms: &SynonymSet) -> Result<ParseReport> {
    let tokenized =
        tokenizer::tokenize(text, |cell| synonyms.is_identifying(cell)).ok_or_else(|| {
            ImportError::ProcessingError {
                message: "no header row found in file".to_string(),
            }
        })?;

    let header_map = HeaderMap::resolve(&tokenized.header, synonyms);
    if !header_map.has_required() {
        warn!("⚠️ required columns missing from header, every row will be skipped");
    }

    let realigner = RowRealigner::new(
        header_map.len(),
        header_map.index_of(FieldKind::AssignedTo),
        header_map.index_of(FieldKind::FileNumber),
    );
    let mapper = FieldMapper::new(header_map);

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    let mut realigned = Vec::new();

    for row in tokenized.rows {
        let row = realigner.realign(row);
        if row.rule.is_some() {
            realigned.push(row.clone());
        }
        match mapper.map_row(&row) {
            Some(record) => records.push(record),
            None => skipped_rows += 1,
        }
    }

    debug!(
        records = records.len(),
        skipped = skipped_rows,
        realigned = realigned.len(),
        "parsed case file"
    );

    Ok(ParseReport {
        header: tokenized.header,
        header_line: tokenized.header_line,
        records,
        skipped_rows,
        realigned,
    })
}

/// 時效期限:原則上是損失日加 24 個月;
/// 損失日未滿 18 歲者延至 20 歲生日。
pub fn limitation_deadline(date_of_loss: NaiveDate, birth_date: Option<NaiveDate>) -> NaiveDate {
    if let Some(birth) = birth_date {
        if age_at(birth, date_of_loss) < AGE_OF_MAJORITY {
            return birth + Months::new(12 * MINORITY_DEADLINE_AGE);
        }
    }
    date_of_loss + Months::new(LIMITATION_MONTHS)
}

fn age_at(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// The full outcome of one run, parse detail included.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRun {
    pub header: Vec<String>,
    pub header_line: usize,
    pub realigned: Vec<RealignedRow>,
    pub rejected: Vec<RejectedRow>,
    pub result: ImportResult,
}

/// 匯入引擎:解析、驗證、名冊比對、逐列寫入。
/// 單一列的失敗只記錄,不會中斷整批匯入。
pub struct ImportEngine<D, C, K>
where
    D: StaffDirectory,
    C: ClientStore,
    K: CaseStore,
{
    directory: D,
    clients: C,
    cases: K,
    options: ImportOptions,
    progress: Option<Box<ProgressCallback>>,
}

impl<D, C, K> ImportEngine<D, C, K>
where
    D: StaffDirectory,
    C: ClientStore,
    K: CaseStore,
{
    pub fn new(directory: D, clients: C, cases: K) -> Self {
        Self {
            directory,
            clients,
            cases,
            options: ImportOptions::default(),
            progress: None,
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, callback: Box<ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// One-call surface for the upload handler: parse, validate, extract
    /// the roster, then import the accepted records.
    pub async fn run(&self, firm_id: &str, text: &str) -> Result<ImportRun> {
        info!("📥 Parsing case roster for firm {}", firm_id);
        let parsed = parse_case_file(text, &self.options.synonyms)?;

        let team = extract_team(&parsed.records);
        let report = validate(parsed.records);
        info!(
            "🔄 {} accepted, {} rejected, {} skipped",
            report.accepted.len(),
            report.rejected.len(),
            parsed.skipped_rows
        );

        let result = self
            .import(firm_id, report.accepted, team, parsed.skipped_rows)
            .await?;
        info!(
            "✅ Import finished: {} succeeded, {} failed",
            result.succeeded, result.failed
        );

        Ok(ImportRun {
            header: parsed.header,
            header_line: parsed.header_line,
            realigned: parsed.realigned,
            rejected: report.rejected,
            result,
        })
    }

    /// Imports already-validated records. Exposed separately so a caller
    /// can insert a review step between validation and import.
    pub async fn import(
        &self,
        firm_id: &str,
        accepted: Vec<ParsedCaseRecord>,
        team: Vec<TeamMemberInfo>,
        skipped_rows: usize,
    ) -> Result<ImportResult> {
        let staff = self.directory.active_staff(firm_id).await?;
        debug!(staff = staff.len(), "directory snapshot loaded");

        // 名冊比對分兩階段:先建立唯讀索引,再整批解析(見 resolve_roster)
        let index = NameIndex::from_directory(&staff);
        let resolution = resolve_roster(&team, &index);

        let total = accepted.len();
        let mut result = ImportResult {
            skipped_rows,
            unmatched_names: resolution.unmatched.clone(),
            team,
            ..Default::default()
        };

        for (i, record) in accepted.into_iter().enumerate() {
            match self
                .import_row(firm_id, &record, &result.team, &resolution)
                .await
            {
                Ok(()) => result.succeeded += 1,
                Err(e) => {
                    warn!("❌ line {}: {}", record.source_line, e);
                    result.failed += 1;
                    result.errors.push(ImportRowError {
                        line: record.source_line,
                        message: e.to_string(),
                    });
                }
            }
            self.emit_progress(i + 1, total, &record.client_name);
        }

        Ok(result)
    }

    async fn import_row(
        &self,
        firm_id: &str,
        record: &ParsedCaseRecord,
        team: &[TeamMemberInfo],
        resolution: &RosterResolution,
    ) -> Result<()> {
        let Some(date_of_loss) = record
            .date_of_loss
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            return Err(ImportError::ProcessingError {
                message: "record has no canonical date of loss".to_string(),
            });
        };
        let birth_date = record
            .birth_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        // 查找再建立,不包在單一交易裡;同名併發匯入可能各建一筆
        let client = match self.clients.find_by_name(firm_id, &record.client_name).await? {
            Some(existing) => existing,
            None => {
                self.clients
                    .create(
                        firm_id,
                        NewClient {
                            name: record.client_name.clone(),
                            birth_date,
                            notes: Vec::new(),
                        },
                    )
                    .await?
            }
        };

        let mut notes = record.notes.clone();
        let staff_id = match record.assigned_to.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let resolved = resolution.lookup(team, name);
                if resolved.is_none() {
                    // never drop the reference, keep the original text
                    notes.push(format!("Assigned to: {} (no staff directory match)", name));
                }
                resolved.map(|id| id.to_string())
            }
            _ => None,
        };

        let case = NewCase {
            client_id: client.id,
            staff_id,
            file_number: record.file_number.clone(),
            date_of_loss,
            limitation_date: limitation_deadline(date_of_loss, birth_date),
            insurance_company: record.insurance_company.clone(),
            policy_number: record.policy_number.clone(),
            claim_number: record.claim_number.clone(),
            adjuster: record.adjuster.clone(),
            status: record.status,
            benefit_type: record.benefit_type,
            notes,
        };

        self.cases.create(firm_id, case).await?;
        Ok(())
    }

    // 只在逐列迴圈內呼叫,current 從 1 起算,total 至少為 current
    fn emit_progress(&self, current: usize, total: usize, label: &str) {
        let Some(callback) = &self.progress else {
            return;
        };
        let every = self.options.progress_every.max(1);
        if current == 1 || current == total || current % every == 0 {
            callback(current, total, (current * 100 / total) as u8, label);
        }
    }
}
