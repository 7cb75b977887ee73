use crate::ExportRow;

pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Title",
    "Status",
    "Priority",
    "Building",
    "Assigned Technician",
    "Created At",
    "Updated At",
];

/// Quote a value when it contains a comma, quote or line break
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| csv_escape(value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render rows as CSV with a header line. Lines end in `\n`.
pub fn build_csv(rows: &[ExportRow]) -> String {
    let mut out = csv_line(&CSV_HEADER);
    out.push('\n');

    for row in rows {
        let id = row.id.to_string();
        out.push_str(&csv_line(&[
            &id,
            &row.title,
            &row.status,
            &row.priority,
            &row.building,
            &row.assignee,
            &row.created_at,
            &row.updated_at,
        ]));
        out.push('\n');
    }

    out
}
