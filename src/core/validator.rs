use crate::core::dates;
use crate::domain::model::{ParsedCaseRecord, RejectedRow, ValidationReport};
use crate::utils::error::Result;
use std::io::Write;

/// 驗證:必填欄位與日期格式。每列收齊所有錯誤,不會停在第一個。
///
/// Validation never fails the run; the outcome is a partition into
/// accepted and rejected rows.
pub fn validate(records: Vec<ParsedCaseRecord>) -> ValidationReport {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for record in records {
        let errors = check_record(&record);
        if errors.is_empty() {
            accepted.push(record);
        } else {
            rejected.push(RejectedRow {
                line: record.source_line,
                record,
                errors,
            });
        }
    }

    ValidationReport { accepted, rejected }
}

fn check_record(record: &ParsedCaseRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.client_name.trim().is_empty() {
        errors.push("Client name is required".to_string());
    }

    match record.date_of_loss.as_deref() {
        None => errors.push("Date of loss is missing or not a recognizable date".to_string()),
        Some(date) if !dates::is_canonical(date) => errors.push(format!(
            "Date of loss '{}' is not a canonical YYYY-MM-DD date",
            date
        )),
        _ => {}
    }

    if let Some(birth) = record.birth_date.as_deref() {
        if !dates::is_canonical(birth) {
            errors.push(format!(
                "Birth date '{}' is not a canonical YYYY-MM-DD date",
                birth
            ));
        }
    }

    errors
}

/// Writes the rejected partition as CSV for operator follow-up.
pub fn write_rejects_csv<W: Write>(rejected: &[RejectedRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["line", "client_name", "file_number", "date_of_loss", "errors"])?;

    for row in rejected {
        csv_writer.write_record([
            row.line.to_string(),
            row.record.client_name.clone(),
            row.record.file_number.clone().unwrap_or_default(),
            row.record.date_of_loss.clone().unwrap_or_default(),
            row.errors.join("; "),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, dol: Option<&str>, line: usize) -> ParsedCaseRecord {
        ParsedCaseRecord {
            client_name: name.to_string(),
            date_of_loss: dol.map(|s| s.to_string()),
            source_line: line,
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_accepted() {
        let report = validate(vec![record("Smith, John", Some("2014-02-06"), 2)]);

        assert_eq!(report.accepted.len(), 1);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_missing_client_name_rejected() {
        let report = validate(vec![record("  ", Some("2014-02-06"), 2)]);

        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].errors[0].contains("Client name"));
    }

    #[test]
    fn test_missing_date_of_loss_rejected() {
        let report = validate(vec![record("Smith", None, 2)]);

        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].errors[0].contains("Date of loss"));
    }

    #[test]
    fn test_all_violations_collected() {
        let report = validate(vec![record("", None, 4)]);

        assert_eq!(report.rejected[0].errors.len(), 2);
    }

    #[test]
    fn test_rejected_row_keeps_original_line_number() {
        let report = validate(vec![
            record("Smith", Some("2014-02-06"), 2),
            record("", Some("2014-02-06"), 9),
        ]);

        assert_eq!(report.rejected[0].line, 9);
    }

    #[test]
    fn test_non_canonical_birth_date_rejected() {
        let mut rec = record("Smith", Some("2014-02-06"), 2);
        rec.birth_date = Some("06-02-2014".to_string());

        let report = validate(vec![rec]);

        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].errors[0].contains("Birth date"));
    }

    #[test]
    fn test_absent_birth_date_is_fine() {
        let report = validate(vec![record("Smith", Some("2014-02-06"), 2)]);

        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_rejects_csv_output() {
        let mut rec = record("", None, 5);
        rec.file_number = Some("AB123".to_string());
        let report = validate(vec![rec]);

        let mut buf = Vec::new();
        write_rejects_csv(&report.rejected, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("line,client_name"));
        assert!(text.contains("AB123"));
        assert!(text.contains("Client name is required; Date of loss"));
    }
}
