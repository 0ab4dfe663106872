//! Import command handler

use std::sync::LazyLock;

use anyhow::{Context, Result};
use colored::*;
use regex::Regex;

use super::ImportCommands;
use crate::cli::AppContext;
use crate::cli::output::print_table;
use crate::import::excel::write_report_excel;
use crate::import::{
    ExistingKeys, ImportSession, ImportStats, RowStatus, SessionError, SessionState, SubmitError,
    SubmitReport,
};

static SET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*:([^=]+)=(.*)$").expect("valid --set pattern")
});

/// One `--set ROW:COLUMN=VALUE` edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub line: usize,
    pub header: String,
    pub value: String,
}

pub fn parse_cell_edit(raw: &str) -> Result<CellEdit> {
    let caps = SET_PATTERN
        .captures(raw)
        .with_context(|| format!("Invalid --set '{}': expected ROW:COLUMN=VALUE", raw))?;

    let line: usize = caps[1]
        .parse()
        .with_context(|| format!("Invalid row number in --set '{}'", raw))?;
    if line == 0 {
        anyhow::bail!("Invalid --set '{}': rows are numbered from 1", raw);
    }

    Ok(CellEdit {
        line,
        header: caps[2].trim().to_string(),
        value: caps[3].to_string(),
    })
}

/// Handle the import command
pub async fn handle_import_command(ctx: &AppContext, args: ImportCommands) -> Result<()> {
    let edits = args
        .set
        .iter()
        .map(|raw| parse_cell_edit(raw))
        .collect::<Result<Vec<_>>>()?;

    let client = ctx.client()?;
    let kind = args.entity;

    let mut session = if args.offline {
        log::info!("Offline: skipping existing {} lookup", kind.plural());
        ImportSession::new(kind, ExistingKeys::default())
    } else {
        ImportSession::open(&client, kind).await?
    };

    println!(
        "Importing {} from {}",
        kind.plural().bold(),
        args.file.display().to_string().cyan()
    );
    let mut stats = session.load(&args.file)?;

    let missing = session.missing_columns();
    if !missing.is_empty() {
        println!(
            "{} No column found for: {}",
            "!".yellow().bold(),
            missing.join(", ")
        );
    }

    for edit in &edits {
        stats = session
            .edit_cell(edit.line, &edit.header, edit.value.clone())
            .with_context(|| format!("Failed to apply --set {}:{}", edit.line, edit.header))?;
        log::info!("Row {} '{}' set to '{}'", edit.line, edit.header, edit.value);
    }

    print_preview(&session, args.all);
    print_stats(&stats);

    if let Some(ref path) = args.report {
        write_report_excel(path, session.headers(), session.rows())?;
        println!("Report saved to: {}", path.display().to_string().bright_green());
    }

    if args.dry_run {
        println!("{}", "Dry run: nothing was sent".yellow());
        return strict_check(args.strict, &stats, None);
    }

    if stats.valid == 0 {
        println!("{}", SubmitError::NoValidRows.to_string().red());
        return strict_check(args.strict, &stats, None);
    }

    if !args.yes && !confirm(&stats, kind.plural())? {
        println!("Import cancelled");
        return Ok(());
    }

    match session.submit(&client).await {
        Ok(_) => {}
        Err(SessionError::Submit(SubmitError::NoValidRows)) => {
            println!("{}", SubmitError::NoValidRows.to_string().red());
            return strict_check(args.strict, &stats, None);
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(report) = session.report() {
        print_report(report, session.state(), kind.plural());
    }
    strict_check(args.strict, &stats, session.report())
}

fn confirm(stats: &ImportStats, plural: &str) -> Result<bool> {
    let prompt = if stats.errors > 0 {
        format!(
            "Create {} {}? {} invalid rows will be skipped",
            stats.valid, plural, stats.errors
        )
    } else {
        format!("Create {} {}?", stats.valid, plural)
    };

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn strict_check(strict: bool, stats: &ImportStats, report: Option<&SubmitReport>) -> Result<()> {
    if !strict {
        return Ok(());
    }
    if stats.errors > 0 {
        anyhow::bail!("{} rows failed validation", stats.errors);
    }
    if let Some(report) = report {
        if report.has_errors() {
            anyhow::bail!("{} rows were rejected by the server", report.failed);
        }
    }
    if stats.valid == 0 {
        anyhow::bail!("{}", SubmitError::NoValidRows);
    }
    Ok(())
}

fn print_preview(session: &ImportSession, all: bool) {
    let rows: Vec<_> = session
        .rows()
        .iter()
        .filter(|r| all || !r.is_valid())
        .collect();
    if rows.is_empty() {
        return;
    }

    let headers: Vec<String> = ["Row", "Key", "Status", "Errors"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.line.to_string(),
                r.display_key.clone(),
                if r.is_duplicate() {
                    "duplicate".to_string()
                } else {
                    r.status.to_string()
                },
                r.error_summary(),
            ]
        })
        .collect();

    println!();
    print_table(&headers, &cells, |i, line| match rows[i].status {
        RowStatus::Valid => line.normal(),
        RowStatus::Error if rows[i].is_duplicate() => line.yellow(),
        RowStatus::Error => line.red(),
    });
    println!();
}

fn print_stats(stats: &ImportStats) {
    println!(
        "{} rows: {} valid, {} with errors ({} duplicates)",
        stats.total,
        stats.valid.to_string().bright_green(),
        stats.errors.to_string().red(),
        stats.duplicates.to_string().yellow()
    );
}

fn print_report(report: &SubmitReport, state: SessionState, plural: &str) {
    for error in &report.errors {
        println!("  {} {}", "✗".red(), error);
    }
    if state == SessionState::CompletedWithErrors {
        println!(
            "{} Created {} of {} {} ({} failed)",
            "!".yellow().bold(),
            report.succeeded,
            report.attempted,
            plural,
            report.failed
        );
    } else {
        println!(
            "{} Created {} {}",
            "✓".bright_green(),
            report.succeeded,
            plural
        );
    }
}
