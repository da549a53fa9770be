//! Production backend: lopdf for page count/text, tabula-java for tables.
//!
//! tabula is invoked as
//!   java -jar tabula.jar --pages N [--area t,l,b,r | --guess] --stream --format JSON file.pdf
//! and prints a JSON array of tables, each `{"data": [[{"text": ...}, ...], ...]}`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{DocumentInfo, StatementBackend};
use crate::error::ExtractError;
use crate::layout::Area;
use crate::types::{RawRow, RAW_COLUMN_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulaConfig {
    /// Java executable
    pub java: String,
    /// Path to the tabula-java jar-with-dependencies
    pub jar: PathBuf,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar: PathBuf::from("tabula.jar"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfBackend {
    tabula: TabulaConfig,
}

impl PdfBackend {
    pub fn new(tabula: TabulaConfig) -> Self {
        Self { tabula }
    }

    fn tabula_command(&self, path: &Path, page: u32, area: Option<Area>) -> Command {
        let mut cmd = Command::new(&self.tabula.java);
        cmd.arg("-jar")
            .arg(&self.tabula.jar)
            .arg("--pages")
            .arg(page.to_string());
        match area {
            Some(area) => {
                cmd.arg("--area").arg(area.to_tabula_arg());
            }
            None => {
                cmd.arg("--guess");
            }
        }
        cmd.arg("--stream").arg("--format").arg("JSON").arg(path);
        cmd
    }
}

impl StatementBackend for PdfBackend {
    fn inspect(&self, path: &Path) -> Result<DocumentInfo, ExtractError> {
        let doc = lopdf::Document::load(path)?;
        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(ExtractError::EmptyDocument);
        }
        let first_page_text = doc.extract_text(&[1])?;
        Ok(DocumentInfo {
            page_count,
            first_page_text,
        })
    }

    fn extract_table(
        &self,
        path: &Path,
        page: u32,
        area: Option<Area>,
    ) -> Result<Vec<RawRow>, ExtractError> {
        tracing::debug!(path = %path.display(), page, ?area, "running tabula");
        let output = self.tabula_command(path, page, area).output()?;
        if !output.status.success() {
            return Err(ExtractError::Tabula {
                page,
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        parse_tabula_json(page, &output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Decode tabula's JSON output. Only the first table on the page is used;
/// a page without tables yields no rows.
pub fn parse_tabula_json(page: u32, json: &[u8]) -> Result<Vec<RawRow>, ExtractError> {
    let tables: Vec<TabulaTable> = serde_json::from_slice(json)
        .map_err(|source| ExtractError::TabulaOutput { page, source })?;

    let Some(table) = tables.into_iter().next() else {
        return Ok(Vec::new());
    };

    table
        .data
        .into_iter()
        .map(|cells| {
            RawRow::from_cells(cells.into_iter().map(|c| Some(c.text))).map_err(|found| {
                ExtractError::ColumnMismatch {
                    page,
                    expected: RAW_COLUMN_COUNT,
                    found,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawColumn;

    #[test]
    fn test_parse_first_table_only() {
        let json = br#"[
            {"extraction_method": "stream", "data": [
                [{"text": "01.03.2023"}, {"text": "02.03.2023"}, {"text": ""}, {"text": "MAXI 042"},
                 {"text": ""}, {"text": ""}, {"text": "1,250.00"}, {"text": "0.00"}, {"text": "8,750.00"}]
            ]},
            {"extraction_method": "stream", "data": [[{"text": "ignored"}]]}
        ]"#;
        let rows = parse_tabula_json(1, json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(RawColumn::Description), Some("MAXI 042"));
        assert_eq!(rows[0].get(RawColumn::CardNumber), None);
        assert_eq!(rows[0].get(RawColumn::Balance), Some("8,750.00"));
    }

    #[test]
    fn test_parse_no_tables() {
        assert!(parse_tabula_json(2, b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_wide_row_is_column_mismatch() {
        let cells: Vec<String> = (0..10).map(|i| format!(r#"{{"text": "{i}"}}"#)).collect();
        let json = format!(r#"[{{"data": [[{}]]}}]"#, cells.join(","));
        assert!(matches!(
            parse_tabula_json(3, json.as_bytes()),
            Err(ExtractError::ColumnMismatch { page: 3, expected: 9, found: 10 })
        ));
    }

    #[test]
    fn test_parse_garbage_output() {
        assert!(matches!(
            parse_tabula_json(1, b"Error: could not open file"),
            Err(ExtractError::TabulaOutput { page: 1, .. })
        ));
    }

    #[test]
    fn test_command_uses_area_or_guess() {
        let backend = PdfBackend::new(TabulaConfig::default());
        let cmd = backend.tabula_command(Path::new("s.pdf"), 2, Some(Area::new(1.0, 2.0, 3.0, 4.0)));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["-jar", "tabula.jar", "--pages", "2", "--area", "1,2,3,4", "--stream", "--format", "JSON", "s.pdf"]
        );

        let cmd = backend.tabula_command(Path::new("s.pdf"), 5, None);
        assert!(cmd.get_args().any(|a| a == "--guess"));
    }

    #[test]
    fn test_inspect_missing_file() {
        let backend = PdfBackend::new(TabulaConfig::default());
        assert!(backend.inspect(Path::new("/nonexistent/statement.pdf")).is_err());
    }
}
