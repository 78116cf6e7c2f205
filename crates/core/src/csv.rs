//! CSV export builders and the project import parser.
//!
//! Exports use fixed column sets consumed by spreadsheet users and by the
//! AI summarization prompts. Import only updates existing projects; rows
//! whose `project_id` is unknown are reported back as skipped by the caller.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Priority, ProjectStatus, ResourceRole, RiskCategory};
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

pub const PROJECTS_HEADER: &[&str] =
    &["project_id", "project_name", "start_date", "end_date", "budget", "status"];
pub const TASKS_HEADER: &[&str] = &[
    "task_id",
    "project_id",
    "task_name",
    "planned_days",
    "actual_days",
    "progress_pct",
];
pub const RISKS_HEADER: &[&str] =
    &["risk_id", "project_id", "risk_type", "risk_level", "description"];
pub const RESOURCES_HEADER: &[&str] = &["resource_id", "name", "role", "utilization_pct"];

/// File names used for downloads and inside the combined archive.
pub const PROJECTS_FILE: &str = "projects.csv";
pub const TASKS_FILE: &str = "tasks.csv";
pub const RISKS_FILE: &str = "risks.csv";
pub const RESOURCES_FILE: &str = "resources.csv";
pub const ARCHIVE_FILE: &str = "pmo_data_export.zip";

// ---------------------------------------------------------------------------
// Export rows
// ---------------------------------------------------------------------------

pub struct ProjectCsvRow {
    pub id: DbId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub budget: Money,
    pub status: ProjectStatus,
}

pub struct TaskCsvRow {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub completion_percentage: i32,
}

pub struct RiskCsvRow {
    pub id: DbId,
    pub project_id: DbId,
    pub category: RiskCategory,
    pub severity: Priority,
    pub description: String,
}

pub struct ResourceCsvRow {
    pub id: DbId,
    pub name: String,
    pub role: ResourceRole,
    pub allocation_percentage: i32,
}

/// Escape a value for CSV output (RFC 4180 quoting).
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

/// Whole days between two optional dates, zero when either is missing.
fn span_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> i64 {
    match (from, to) {
        (Some(from), Some(to)) => (to - from).num_days(),
        _ => 0,
    }
}

fn build_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![header.join(",")];
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| csv_escape(c)).collect();
        lines.push(cells.join(","));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `end_date` is the actual end when known, else the planned end.
pub fn build_projects_csv(rows: &[ProjectCsvRow]) -> String {
    build_csv(
        PROJECTS_HEADER,
        rows.iter().map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                date_cell(p.start_date),
                date_cell(p.actual_end_date.or(p.planned_end_date)),
                p.budget.to_string(),
                p.status.label().to_string(),
            ]
        }),
    )
}

pub fn build_tasks_csv(rows: &[TaskCsvRow]) -> String {
    build_csv(
        TASKS_HEADER,
        rows.iter().map(|t| {
            vec![
                t.id.to_string(),
                t.project_id.to_string(),
                t.name.clone(),
                span_days(t.start_date, t.due_date).to_string(),
                span_days(t.start_date, t.completion_date).to_string(),
                t.completion_percentage.to_string(),
            ]
        }),
    )
}

pub fn build_risks_csv(rows: &[RiskCsvRow]) -> String {
    build_csv(
        RISKS_HEADER,
        rows.iter().map(|r| {
            vec![
                r.id.to_string(),
                r.project_id.to_string(),
                r.category.label().to_string(),
                r.severity.label().to_string(),
                r.description.clone(),
            ]
        }),
    )
}

pub fn build_resources_csv(rows: &[ResourceCsvRow]) -> String {
    build_csv(
        RESOURCES_HEADER,
        rows.iter().map(|r| {
            vec![
                r.id.to_string(),
                r.name.clone(),
                r.role.label().to_string(),
                r.allocation_percentage.to_string(),
            ]
        }),
    )
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// One parsed row of a project import file.
///
/// Missing or unparseable optional cells are `None` and leave the stored
/// value untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectImportRow {
    pub line: usize,
    pub project_id: DbId,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub budget: Option<Money>,
    pub status: Option<ProjectStatus>,
}

/// A row that could not be used at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ProjectImport {
    pub rows: Vec<ProjectImportRow>,
    pub errors: Vec<ImportRowError>,
}

/// Parse a project CSV using the export column names.
///
/// The header row is required and must contain `project_id`. Status cells
/// use the human labels written by the export ("On Track", "At Risk", ...).
pub fn parse_projects_csv(data: &[u8]) -> Result<ProjectImport, String> {
    let text = std::str::from_utf8(data).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse_csv_records(text).into_iter();

    let (_, header) = records.next().ok_or("CSV is empty")?;
    let headers: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let id_col = col("project_id").ok_or("CSV header must include project_id")?;
    let name_col = col("project_name");
    let start_col = col("start_date");
    let budget_col = col("budget");
    let status_col = col("status");

    let mut import = ProjectImport::default();

    for (line_no, values) in records {
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let cell = |c: Option<usize>| {
            c.and_then(|i| values.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let project_id = match cell(Some(id_col)).map(str::parse::<DbId>) {
            Some(Ok(id)) => id,
            Some(Err(_)) | None => {
                import.errors.push(ImportRowError {
                    line: line_no,
                    message: "missing or invalid project_id".into(),
                });
                continue;
            }
        };

        import.rows.push(ProjectImportRow {
            line: line_no,
            project_id,
            name: cell(name_col).map(String::from),
            start_date: cell(start_col).and_then(|v| v.parse().ok()),
            budget: cell(budget_col).and_then(|v| v.parse().ok()),
            status: cell(status_col).and_then(ProjectStatus::from_label),
        });
    }

    Ok(import)
}

/// Split CSV text into records, each tagged with the 1-based line it starts
/// on.
///
/// Quoted fields may contain commas, doubled quotes and line breaks. A record
/// ends only at a line break outside quotes; `\r\n` is treated as one break.
fn parse_csv_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => {
                    if ch == '\n' {
                        line += 1;
                    }
                    current.push(ch);
                }
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut current));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push((record_line, fields));
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
