//! devfilter - compile device filters and apply them to exported device lists

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use devfilter::evaluator::PredicateEvaluator;
use devfilter::query::{FilterSet, SortOrder};
use devfilter::record::{FieldValue, Record};
use devfilter::saved::parse_filter_definition;
use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

/// Compile a device filter into a device query and optionally apply it to records
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filter definition (saved filter or filter set JSON)
    filter: PathBuf,

    /// JSON array of device records to filter in memory
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Print the count query instead of the select query
    #[arg(long)]
    count: bool,

    /// Records to skip after filtering (overrides the filter's Skip)
    #[arg(long)]
    skip: Option<usize>,

    /// Records to return after skipping, 0 for all (overrides the filter's Take)
    #[arg(long)]
    take: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let text = fs::read_to_string(&args.filter)
        .with_context(|| format!("Failed to read filter {}", args.filter.display()))?;
    let filter = parse_filter_definition(&text).context("Failed to parse filter definition")?;

    let compiled = if args.count {
        filter.compile_count()
    } else {
        filter.compile()
    };
    let query = compiled.context("Failed to compile filter")?;
    println!("{}", query);

    if let Some(path) = &args.records {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read records {}", path.display()))?;
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&text).context("Records must be a JSON array")?;

        let evaluator = PredicateEvaluator::new();
        let mut matched = filter
            .apply_with(&evaluator, &records)
            .context("Failed to filter records")?;
        log::info!("{} of {} records matched", matched.len(), records.len());

        sort_records(&mut matched, &filter, &evaluator);
        let page = paginate(
            matched,
            args.skip.unwrap_or(filter.skip),
            args.take.unwrap_or(filter.take),
        );

        println!(
            "{}",
            serde_json::to_string_pretty(&page).context("Failed to serialize records")?
        );
    }

    Ok(())
}

/// Stable sort by the filter's sort column; NULLs first ascending, last descending
fn sort_records(records: &mut [&serde_json::Value], filter: &FilterSet, evaluator: &PredicateEvaluator) {
    let Some(column) = filter.sort_column.as_deref().filter(|c| !c.trim().is_empty()) else {
        return;
    };
    let path = evaluator.field_path(column);

    records.sort_by(|a, b| {
        let ordering = compare_fields(a.try_get_field(&path), b.try_get_field(&path));
        match filter.sort_order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare_fields(a: Option<FieldValue>, b: Option<FieldValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

fn as_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Unsigned(u) => Some(*u as f64),
        FieldValue::Float(x) => Some(*x),
        _ => None,
    }
}

fn paginate<T>(items: Vec<T>, skip: usize, take: usize) -> Vec<T> {
    let iter = items.into_iter().skip(skip);
    if take == 0 {
        iter.collect()
    } else {
        iter.take(take).collect()
    }
}
