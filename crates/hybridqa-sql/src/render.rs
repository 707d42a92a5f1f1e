use rusqlite::types::ValueRef;
use rusqlite::Row;

pub fn display_cell(row: &Row, i: usize) -> String {
    match row.get_ref(i) {
        Ok(ValueRef::Null) => "".into(),
        Ok(ValueRef::Integer(n)) => n.to_string(),
        Ok(ValueRef::Real(x)) => x.to_string(),
        Ok(ValueRef::Text(bytes)) => String::from_utf8_lossy(bytes).to_string(),
        Ok(ValueRef::Blob(b)) => format!("<blob {} bytes>", b.len()),
        Err(e) => format!("<err {e}>"),
    }
}

/// Render rows as a Markdown table with a header row.
pub fn markdown_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_row(&mut out, columns);
    out.push('|');
    for _ in columns {
        out.push_str("---|");
    }
    out.push('\n');
    for row in rows {
        push_row(&mut out, row);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&cell.replace('|', "\\|").replace('\n', " "));
        out.push_str(" |");
    }
    out.push('\n');
}
