//! Command-line tool for example queries.
//!
//! Loads a dataset file into an in-memory store, runs one find, count,
//! range count or update against a table, and prints the result as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use crud_core::dataset::{Dataset, SeedStrategy};
use crud_core::record::Schema;
use crud_core::{
    Car, Comparator, CrudConfig, Entity, Example, ExampleQueryEngine, InMemoryRecordStore,
    MatchMode, MultipleMatchPolicy, RecordId, Value,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset file (.yml, .yaml or .json)
    #[arg(long)]
    dataset: PathBuf,

    /// Table to query
    #[arg(long, default_value = "car")]
    table: String,

    /// Return the lowest-keyed match instead of failing on ambiguous lookups
    #[arg(long)]
    first_by_key: bool,

    /// Reject updates carrying a stale version
    #[arg(long)]
    optimistic_locking: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the record matching an example
    Find {
        /// Example field, as name=value
        #[arg(long = "field")]
        fields: Vec<String>,
        /// Return every match instead of exactly one
        #[arg(long)]
        all: bool,
        /// How text fields are matched
        #[arg(long = "match", value_enum, default_value_t = MatchArg::Exact)]
        match_mode: MatchArg,
        /// Case-insensitive text matching
        #[arg(long)]
        ignore_case: bool,
    },
    /// Count the records matching an example
    Count {
        /// Example field, as name=value
        #[arg(long = "field")]
        fields: Vec<String>,
        /// How text fields are matched
        #[arg(long = "match", value_enum, default_value_t = MatchArg::Exact)]
        match_mode: MatchArg,
        /// Case-insensitive text matching
        #[arg(long)]
        ignore_case: bool,
    },
    /// Count the records whose field compares to a bound
    CountRange {
        #[arg(long)]
        field: String,
        #[arg(long, value_enum)]
        op: RangeOp,
        #[arg(long)]
        bound: String,
    },
    /// Overwrite fields of a record
    Update {
        #[arg(long)]
        id: u64,
        /// New field value, as name=value
        #[arg(long = "set", required = true)]
        sets: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MatchArg {
    Exact,
    Anywhere,
    Start,
    End,
}

impl From<MatchArg> for MatchMode {
    fn from(arg: MatchArg) -> Self {
        match arg {
            MatchArg::Exact => MatchMode::Exact,
            MatchArg::Anywhere => MatchMode::Anywhere,
            MatchArg::Start => MatchMode::Start,
            MatchArg::End => MatchMode::End,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RangeOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl From<RangeOp> for Comparator {
    fn from(op: RangeOp) -> Self {
        match op {
            RangeOp::Lt => Comparator::Lt,
            RangeOp::Le => Comparator::Le,
            RangeOp::Gt => Comparator::Gt,
            RangeOp::Ge => Comparator::Ge,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let output = run(args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(args: Args) -> anyhow::Result<serde_json::Value> {
    let config = CrudConfig {
        multiple_match_policy: if args.first_by_key {
            MultipleMatchPolicy::FirstByKey
        } else {
            MultipleMatchPolicy::Reject
        },
        optimistic_locking: args.optimistic_locking,
        ..Default::default()
    };
    let engine = open(&args.dataset, &args.table, config)?;
    let schema = engine.schema()?;

    let output = match args.command {
        Command::Find {
            fields,
            all,
            match_mode,
            ignore_case,
        } => {
            let example = build_example(&schema, &fields, match_mode, ignore_case)?;
            if all {
                serde_json::to_value(engine.find_all_by_example(&example)?)?
            } else {
                serde_json::to_value(engine.find_by_example(&example)?)?
            }
        }
        Command::Count {
            fields,
            match_mode,
            ignore_case,
        } => {
            let example = build_example(&schema, &fields, match_mode, ignore_case)?;
            json!({ "count": engine.count(&example)? })
        }
        Command::CountRange { field, op, bound } => {
            let ty = schema
                .field(&field)
                .map(|f| f.r#type)
                .ok_or_else(|| anyhow!("unknown field '{field}' in table '{}'", schema.table))?;
            let bound = ty.parse_value(&bound).map_err(|e| anyhow!(e))?;
            let count = engine.count_by_range(&field, op.into(), bound.clone())?;
            json!({
                "field": field,
                "op": Comparator::from(op).to_string(),
                "bound": bound,
                "count": count,
            })
        }
        Command::Update { id, sets } => {
            let mut record = engine.find_by_id(RecordId(id))?;
            let assignments = parse_assignments(&schema, &sets)?;
            for (field, value) in &assignments {
                record.set(field.clone(), value.clone());
            }
            let updated = engine.update(&record)?;

            let mut counts = serde_json::Map::new();
            for (field, value) in assignments {
                let key = format!("{field}={value}");
                let count = engine.count(&Example::new().set(field, value))?;
                counts.insert(key, json!(count));
            }
            json!({ "record": updated, "counts": counts })
        }
    };
    Ok(output)
}

/// Loads the dataset into a fresh store and returns an engine on `table`.
///
/// `car` tables use the car entity schema; other tables get a schema
/// inferred from their rows.
fn open(
    path: &Path,
    table: &str,
    config: CrudConfig,
) -> anyhow::Result<ExampleQueryEngine<InMemoryRecordStore>> {
    let dataset =
        Dataset::load(path).with_context(|| format!("loading dataset {}", path.display()))?;
    let store = Arc::new(InMemoryRecordStore::from_config(&config));

    for name in dataset.tables() {
        let schema = if name == Car::TABLE {
            Car::schema()
        } else {
            dataset.infer_schema(name)?
        };
        store.create_table(schema)?;
    }
    if !dataset.tables().any(|name| name == table) {
        bail!("table '{table}' is not in dataset {}", path.display());
    }

    let seeded = dataset.seed(store.as_ref(), SeedStrategy::CleanInsert)?;
    tracing::info!("Loaded {} rows from {}", seeded, path.display());
    Ok(ExampleQueryEngine::new(store, table, config))
}

fn build_example(
    schema: &Schema,
    fields: &[String],
    match_mode: MatchArg,
    ignore_case: bool,
) -> anyhow::Result<Example> {
    let mut example = parse_assignments(schema, fields)?
        .into_iter()
        .fold(Example::new(), |example, (field, value)| {
            example.set(field, value)
        })
        .match_mode(match_mode.into());
    if ignore_case {
        example = example.ignore_case();
    }
    Ok(example)
}

/// Parses `name=value` arguments using the declared field types.
fn parse_assignments(schema: &Schema, raw: &[String]) -> anyhow::Result<Vec<(String, Value)>> {
    raw.iter()
        .map(|item| {
            let (name, value) = item
                .split_once('=')
                .ok_or_else(|| anyhow!("expected name=value, got '{item}'"))?;
            let def = schema
                .field(name)
                .ok_or_else(|| anyhow!("unknown field '{name}' in table '{}'", schema.table))?;
            let value = def.r#type.parse_value(value).map_err(|e| anyhow!(e))?;
            Ok((name.to_string(), value))
        })
        .collect()
}
