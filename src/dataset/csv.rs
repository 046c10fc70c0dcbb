//! Minimal CSV rendering for the sample tables

/// A row type that can be rendered as one CSV line
pub trait CsvRecord {
    /// Column names, in field order
    const HEADER: &'static [&'static str];

    /// Field values, in header order
    fn fields(&self) -> Vec<String>;
}

/// Quote a field if it contains a delimiter, quote or line break
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    let line: Vec<String> = cells.iter().map(|c| escape_field(c.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Render a header line followed by one line per record
pub fn render<R: CsvRecord>(records: &[R]) -> String {
    let mut out = String::new();
    push_line(&mut out, R::HEADER);
    for record in records {
        push_line(&mut out, &record.fields());
    }
    out
}
