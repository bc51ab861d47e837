/// One logical row. `line` is the 1-indexed physical line the row started
/// on, counting preamble, comments and blank lines, so it matches what the
/// operator sees in a spreadsheet viewer.
#[derive(Debug, Clone)]
pub struct TokenizedRow {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TokenizedFile {
    pub header: Vec<String>,
    pub header_line: usize,
    pub rows: Vec<TokenizedRow>,
}

/// 把原始檔案內容切成列與欄位。`is_header_cell` 用來辨識標題列;
/// 找不到任何可辨識欄名時退回第一個非註解列。
///
/// Returns `None` only when the file has no usable lines at all.
pub fn tokenize<F>(text: &str, is_header_cell: F) -> Option<TokenizedFile>
where
    F: Fn(&str) -> bool,
{
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut rows = split_rows(&normalized);
    if rows.is_empty() {
        return None;
    }

    // 標題列:第一個含可辨識欄名的列;否則第一個非註解、非空白列。
    let header_pos = rows
        .iter()
        .position(|row| !is_comment(row) && row.fields.iter().any(|f| is_header_cell(f)))
        .or_else(|| rows.iter().position(|row| !is_comment(row) && !is_blank(row)))?;

    // Everything before the header is preamble and gets discarded.
    let data = rows.split_off(header_pos + 1);
    let header_row = rows.pop()?;

    Some(TokenizedFile {
        header: header_row.fields,
        header_line: header_row.line,
        rows: data,
    })
}

fn is_comment(row: &TokenizedRow) -> bool {
    row.fields
        .first()
        .map(|f| f.trim_start().starts_with('#'))
        .unwrap_or(false)
}

fn is_blank(row: &TokenizedRow) -> bool {
    row.fields.iter().all(|f| f.trim().is_empty())
}

/// Quote-aware splitter. A newline inside an open quote is kept as part of
/// the field only while a closing quote still exists later in the text;
/// a quote opened with no closer anywhere after it is implicitly closed at
/// end of line, so a runaway quote on the last quoted field never swallows
/// the remainder of the file.
fn split_rows(text: &str) -> Vec<TokenizedRow> {
    // 檔案裡最後一個引號的位置,換行時用來判斷引號還會不會閉合
    let last_quote = text.rfind('"').unwrap_or(0);

    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut row_line = 1usize;

    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some((_, '"'))) {
                    // 成對引號還原成單一引號
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            '\n' => {
                if in_quotes && idx < last_quote {
                    field.push('\n');
                    line += 1;
                } else {
                    // 引號未閉合:在行尾隱式閉合
                    in_quotes = false;
                    flush_row(&mut rows, &mut fields, &mut field, row_line);
                    line += 1;
                    row_line = line;
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        flush_row(&mut rows, &mut fields, &mut field, row_line);
    }

    rows
}

fn flush_row(rows: &mut Vec<TokenizedRow>, fields: &mut Vec<String>, field: &mut String, line: usize) {
    fields.push(std::mem::take(field));
    // drop rows that came from a completely empty line
    if fields.len() == 1 && fields[0].is_empty() {
        fields.clear();
        return;
    }
    rows.push(TokenizedRow {
        line,
        fields: std::mem::take(fields),
    });
}
