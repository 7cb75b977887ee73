// ABOUTME: Minimal Office Open XML workbook writer
// ABOUTME: One worksheet with inline strings and fixed column widths, packaged with zip

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportResult;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// A spreadsheet cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub width: f64,
}

impl Column {
    pub fn new(header: &str, width: f64) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

/// A single worksheet: header row from the columns, then data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn workbook_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
            ),
            xml_escape(&self.name)
        )
    }

    fn worksheet_xml(&self) -> String {
        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#
        ));

        if !self.columns.is_empty() {
            xml.push_str("<cols>");
            for (index, column) in self.columns.iter().enumerate() {
                xml.push_str(&format!(
                    r#"<col min="{n}" max="{n}" width="{w}" customWidth="1"/>"#,
                    n = index + 1,
                    w = column.width
                ));
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");
        let header: Vec<Cell> = self
            .columns
            .iter()
            .map(|c| Cell::Text(c.header.clone()))
            .collect();
        push_row(&mut xml, 1, &header);
        for (index, row) in self.rows.iter().enumerate() {
            push_row(&mut xml, index + 2, row);
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }

    /// Package the sheet as `.xlsx` bytes
    pub fn to_xlsx(&self) -> ExportResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", self.worksheet_xml()),
        ];

        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

fn push_row(xml: &mut String, row_number: usize, cells: &[Cell]) {
    xml.push_str(&format!(r#"<row r="{}">"#, row_number));
    for (index, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(index), row_number);
        match cell {
            Cell::Number(value) => {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
            }
            Cell::Text(value) => {
                xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    xml_escape(value)
                ));
            }
        }
    }
    xml.push_str("</row>");
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA)
fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).to_string()
}

/// Escape markup characters and drop control characters XML 1.0 cannot carry
fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(ch),
            // not allowed anywhere in XML 1.0
            c if (c as u32) < 0x20 => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(4), "E");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(xml_escape("bell\u{7}"), "bell");
    }

    #[test]
    fn test_xml_escape_drops_noncharacters() {
        assert_eq!(xml_escape("Leak\u{FFFE} in\u{FFFF} lobby"), "Leak in lobby");
        assert_eq!(xml_escape("Café ✓"), "Café ✓");
    }

    #[test]
    fn test_workbook_parts() {
        let mut sheet = Sheet::new("Defects", vec![Column::new("ID", 10.0), Column::new("Title", 40.0)]);
        sheet.push_row(vec![Cell::from(3), Cell::from("Pipes & drains")]);

        let bytes = sheet.to_xlsx().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }

        let mut worksheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut worksheet)
            .unwrap();
        assert!(worksheet.contains(r#"<col min="2" max="2" width="40" customWidth="1"/>"#));
        assert!(worksheet.contains(r#"<c r="A2"><v>3</v></c>"#));
        assert!(worksheet.contains("Pipes &amp; drains"));

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(r#"<sheet name="Defects""#));
    }
}
