use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// One line of an `apply` / `remove` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub kind: &'static str,
    pub scope: String,
    pub name: String,
    pub outcome: String,
}

impl ReportRow {
    pub fn new(
        kind: &'static str,
        scope: impl Into<String>,
        name: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            scope: scope.into(),
            name: name.into(),
            outcome: outcome.into(),
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn report_table(rows: &[ReportRow]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Kind", "Scope", "Name", "Outcome"]);
    for row in rows {
        builder.push_record([
            row.kind,
            row.scope.as_str(),
            row.name.as_str(),
            row.outcome.as_str(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_report(rows: &[ReportRow]) {
    if rows.is_empty() {
        println!("Nothing to do.");
        return;
    }
    println!("{}", report_table(rows));
}

/// Renders `records` under `header`, or `None` when there are no records.
pub fn table<const N: usize>(header: [&str; N], records: Vec<[String; N]>) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    builder.push_record(header);
    for record in records {
        builder.push_record(record);
    }
    Some(builder.build().with(Style::rounded()).to_string())
}
