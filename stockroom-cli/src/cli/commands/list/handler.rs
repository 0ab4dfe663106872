//! List command handler

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use serde_json::{Map, Value};

use super::{ListCommands, OutputFormat};
use crate::api::EntityApi;
use crate::cli::AppContext;
use crate::cli::output::print_table;
use crate::import::excel::{json_cell, record_columns, write_records};
use crate::services::listing::{self, ListQuery};

/// Handle the list command
pub async fn handle_list_command(ctx: &AppContext, args: ListCommands) -> Result<()> {
    let client = ctx.client()?;
    let collection = args.resource.collection();

    let records = client
        .list(collection)
        .await
        .with_context(|| format!("Failed to fetch {}", collection))?;
    log::info!("Fetched {} {}", records.len(), collection);

    let records = project(records, &args.fields);
    let mut query = ListQuery {
        search: args.search.clone(),
        sort: args.sort.clone(),
        descending: args.desc,
        page: args.page as usize,
        page_size: args.page_size as usize,
    };

    if let Some(ref path) = args.output {
        // Exports carry every matching record, not just one page
        query.page = 1;
        query.page_size = usize::MAX;
        let all = listing::apply(records, &query);
        export(path, collection, &all.items)?;
        println!(
            "{} Exported {} {} to {}",
            "✓".bright_green(),
            all.total,
            collection,
            path.display().to_string().bright_green()
        );
        return Ok(());
    }

    let page = listing::apply(records, &query);
    let columns = if args.fields.is_empty() {
        record_columns(&page.items)
    } else {
        args.fields.clone()
    };

    match args.format {
        OutputFormat::Json => {
            let output =
                serde_json::to_string_pretty(&page).context("Failed to format JSON output")?;
            println!("{}", output);
        }
        OutputFormat::Csv => print!("{}", to_csv(&columns, &page.items)?),
        OutputFormat::Table => {
            if page.items.is_empty() {
                println!("{}", format!("No {} found", collection).yellow());
                if let Some(kind) = args.resource.entity() {
                    println!(
                        "Create some with: stockroom import {} <file>",
                        kind.to_string().to_lowercase()
                    );
                }
            } else {
                let rows: Vec<Vec<String>> = page
                    .items
                    .iter()
                    .map(|r| columns.iter().map(|c| json_cell(r.get(c))).collect())
                    .collect();
                print_table(&columns, &rows, |_, line| line.normal());
            }
            println!();
            println!(
                "Page {} of {} ({} {})",
                page.page,
                page.page_count.max(1),
                page.total,
                collection
            );
        }
    }

    Ok(())
}

/// Keep only the named fields of each record, when any are named
fn project(records: Vec<Value>, fields: &[String]) -> Vec<Value> {
    if fields.is_empty() {
        return records;
    }
    records
        .into_iter()
        .map(|record| {
            let mut out = Map::new();
            for field in fields {
                if let Some(value) = record.get(field) {
                    out.insert(field.clone(), value.clone());
                }
            }
            Value::Object(out)
        })
        .collect()
}

fn to_csv(columns: &[String], records: &[Value]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(columns)
        .context("Failed to write CSV header")?;
    for record in records {
        let row: Vec<String> = columns.iter().map(|c| json_cell(record.get(c))).collect();
        wtr.write_record(&row).context("Failed to write CSV row")?;
    }
    let bytes = wtr.into_inner().context("Failed to finish CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn export(path: &Path, sheet_name: &str, records: &[Value]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => {
            let output =
                serde_json::to_string_pretty(records).context("Failed to format JSON output")?;
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write output to: {}", path.display()))
        }
        "csv" | "xlsx" => write_records(path, sheet_name, records),
        _ => anyhow::bail!(
            "Unsupported export format: {} (expected .csv, .json or .xlsx)",
            path.display()
        ),
    }
}
