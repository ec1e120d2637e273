//! Prints the pruning decision for every row group of a Parquet file.
//!
//! ```text
//! RUST_LOG=scanprune=debug cargo run --example inspect_pruning -- data.parquet a 10 20
//! ```

use std::env;

use scanprune::{ColumnPredicate, ReadOptions, ReaderConfig, RowGroupDecision, ScanFile};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [path, column, low, high] = args.as_slice() else {
        anyhow::bail!("usage: inspect_pruning <file.parquet> <column> <low> <high>");
    };
    let low: i64 = low.parse()?;
    let high: i64 = high.parse()?;

    let config = config::Config::from_env()?;
    let file = ScanFile::open(path, ReaderConfig::from(&config.scan))?;
    let options = ReadOptions::new().with_filter(ColumnPredicate::between(column.as_str(), low, high));

    println!("Opening file: {}", path);
    println!("Row groups: {}, rows: {}", file.num_row_groups(), file.num_rows());

    let decisions = scanprune::explain_row_groups(file.metadata(), &options.filters)?;
    for (idx, decision) in decisions.iter().enumerate() {
        let rows = file.metadata().row_group(idx).num_rows();
        match decision {
            RowGroupDecision::Kept => println!("  [{}] keep ({} rows)", idx, rows),
            RowGroupDecision::KeptNoStatistics => {
                println!("  [{}] keep, no statistics ({} rows)", idx, rows)
            }
            RowGroupDecision::Excluded { column, .. } => {
                println!("  [{}] skip, excluded by {} ({} rows)", idx, column, rows)
            }
        }
    }

    let reader = file.make_reader(&options)?;
    let mut total_rows = 0;
    for batch in reader {
        total_rows += batch?.num_rows();
    }
    println!("Read {} rows", total_rows);

    Ok(())
}
