use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod column;
mod model;
mod render;
mod snapshot;
mod stats;

use snapshot::{SnapshotQuery, TURBOSTAT_HEADER};
use stats::{Summary, Variance};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[command(name = "turbostat-profiler")]
#[command(about = "CPU frequency/utilization profiles from turbostat logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chart Busy% and Bzy_MHz over time for one CPU.
    ///
    /// Produce the input with:
    /// turbostat --interval X --num_iterations Y --show CPU,Avg_MHz,Busy%,Bzy_MHz > cpu_freq_log.dat
    Freq {
        input: PathBuf,

        /// `.json` writes the raw series, anything else an HTML chart.
        output: PathBuf,

        /// Seconds between snapshots.
        #[arg(value_parser = parse_duration)]
        time_slice_duration: f64,

        /// CPU column value to select, e.g. `0` or `-` for the summary row.
        cpu: String,

        /// Metric field indices to extract (1 = Avg_MHz, 2 = Busy%, 3 = Bzy_MHz).
        #[arg(long, value_delimiter = ',', default_values_t = [2usize, 3])]
        metrics: Vec<usize>,

        /// Block header line, tab separated.
        #[arg(long, default_value = TURBOSTAT_HEADER, hide_default_value = true)]
        header: String,

        /// Use the population (n) standard deviation instead of the sample (n-1) one.
        #[arg(long)]
        population: bool,
    },

    /// Mean, median, min, max and standard deviation of one numeric column.
    Stats {
        input: PathBuf,

        /// Zero-based field index; fields are separated by spaces or tabs.
        #[arg(long, default_value_t = 0)]
        column: usize,

        #[arg(long)]
        population: bool,
    },
}

fn variance(population: bool) -> Variance {
    if population {
        Variance::Population
    } else {
        Variance::Sample
    }
}

/// Finite and non-negative, so the time axis starts at 0 and never decreases.
fn parse_duration(s: &str) -> std::result::Result<f64, String> {
    let secs: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("expected a finite, non-negative number of seconds, got {s}"));
    }
    Ok(secs)
}

fn std_dev_text(summary: &Summary, values: &[f64], variance: Variance) -> String {
    match (summary.std_dev, stats::std_dev(values, variance)) {
        (Some(sd), _) => format!("{sd:.2}"),
        (None, Err(e)) => format!("unavailable ({e})"),
        (None, Ok(_)) => "unavailable".to_string(),
    }
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = parse_cli();

    match cli.cmd {
        Commands::Freq {
            input,
            output,
            time_slice_duration,
            cpu,
            metrics,
            header,
            population,
        } => {
            // 1) Parse the snapshot log.
            let query = SnapshotQuery::from_columns(cpu, &metrics)?
                .with_header(&header)?;
            let parsed = snapshot::parse_snapshot_file(&input, &query)?;

            // 2) Aggregate.
            let data = model::build_report_data(&query, parsed, time_slice_duration, variance(population));

            // 3) Render.
            render::write_report(&output, &data)?;

            for metric in &data.metrics {
                let s = &metric.summary;
                let finite = stats::finite(&metric.values);
                println!(
                    "{} ({}): mean {:.2}, median {:.2}, min {:.2}, max {:.2}, std dev {}",
                    metric.name,
                    metric.unit,
                    s.mean,
                    s.median,
                    s.min,
                    s.max,
                    std_dev_text(s, &finite, variance(population))
                );
            }
            println!(
                "Wrote {} ({} slices, {} missing)",
                output.display(),
                data.slices,
                data.missing_slices
            );
        }
        Commands::Stats {
            input,
            column,
            population,
        } => {
            let values = column::read_column_file(&input, column)
                .with_context(|| format!("read column {} of {}", column, input.display()))?;

            let summary = stats::summarize(&values, variance(population));
            println!("Statistics for {} column {}:", input.display(), column);
            println!("Count: {}", summary.count);
            println!("Mean: {:.2}", summary.mean);
            println!("Median: {:.2}", summary.median);
            println!("Min: {:.2}", summary.min);
            println!("Max: {:.2}", summary.max);
            println!(
                "Standard Deviation: {}",
                std_dev_text(&summary, &values, variance(population))
            );
        }
    }

    Ok(())
}
