use anyhow::{Context, Result};
use bio::io::fasta;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::io::Write;
use std::time::Instant;

use protomap::config::args::{BuildArgs, MapArgs};
use protomap::diagnostics::{diagnostics_enabled, MapDiagnostics};
use protomap::report::Reporter;
use protomap::utils::io::{reader, writer};
use protomap::{map_batch, KmerIndex, SequenceStore};

#[derive(Parser)]
#[command(name = "protomap")]
#[command(version = "0.1.0")]
#[command(about = "Splice-aware protein-to-genome mapper", long_about = None)]
struct Cli {
    /// raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a genome FASTA and write it to disk
    Index(BuildArgs),
    /// Map proteins to a genome or a prebuilt index
    Map(MapArgs),
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

fn run_index(args: BuildArgs) -> Result<()> {
    let opt = args.index.to_options()?;
    let start = Instant::now();
    let store = SequenceStore::from_fasta(&args.genome)
        .with_context(|| format!("reading genome {}", args.genome.display()))?;
    info!(
        "read {} contigs, {} nt in {:.2?}",
        store.n_contigs(),
        store.total_len(),
        start.elapsed()
    );
    let index = KmerIndex::build(store, &opt, args.num_threads)?;
    let stats = index.stats(u32::MAX);
    info!(
        "{} distinct k-mers, {} positions, largest bucket {}",
        stats.n_keys, stats.n_positions, stats.max_occ
    );
    index
        .dump(&args.out)
        .with_context(|| format!("writing index {}", args.out.display()))?;
    info!("index written to {} in {:.2?}", args.out.display(), start.elapsed());
    Ok(())
}

fn run_map(args: MapArgs) -> Result<()> {
    let index_opt = args.index.to_options()?;
    let mut opt = args.to_options()?;
    let start = Instant::now();
    let mut index = KmerIndex::load(&args.target, &index_opt, args.num_threads)
        .with_context(|| format!("loading {}", args.target.display()))?;
    if args.max_intron.is_none() {
        opt.set_max_intron(index.store().total_len());
    }
    opt.check()?;
    let stats = index.stats(opt.max_occ);
    info!(
        "index ready in {:.2?}: {} k-mers, {} above the occurrence cap; max intron {}",
        start.elapsed(),
        stats.n_keys,
        stats.n_over_cap,
        opt.max_intron
    );
    if let Some(path) = args.splice_scores.as_ref() {
        let n = index
            .set_splice_scores(path, args.splice_cap)
            .with_context(|| format!("reading splice scores {}", path.display()))?;
        info!("{} splice sites loaded", n);
    }

    let diag = diagnostics_enabled().then(MapDiagnostics::default);
    let mut out = writer(args.out.as_deref())?;
    let mut reporter = Reporter::new(index.store(), &opt);
    reporter.write_header(&mut out)?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} proteins {msg}")?,
    );
    if log::max_level() < LevelFilter::Info {
        bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads.max(1))
        .build()
        .context("Failed to build thread pool")?;

    let mut records = fasta::Reader::new(reader(&args.query)?).records();
    let mut batch: Vec<fasta::Record> = Vec::new();
    let mut n_queries = 0usize;
    loop {
        batch.clear();
        let mut residues = 0u64;
        for rec in records.by_ref() {
            let rec = rec.context("reading query FASTA")?;
            residues += rec.seq().len() as u64;
            batch.push(rec);
            if residues >= opt.mini_batch_size {
                break;
            }
        }
        if batch.is_empty() {
            break;
        }
        let outputs = map_batch(&pool, &index, &opt, &batch);
        for (rec, res) in batch.iter().zip(outputs.iter()) {
            reporter.write_query(&mut out, rec.id(), rec.seq(), res)?;
            if let Some(d) = diag.as_ref() {
                d.record(res);
            }
        }
        n_queries += batch.len();
        bar.set_position(n_queries as u64);
    }
    out.flush()?;
    bar.finish_and_clear();
    info!("mapped {} proteins in {:.2?}", n_queries, start.elapsed());
    if let Some(d) = diag {
        d.print_summary();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Index(args) => run_index(args)?,
        Commands::Map(args) => run_map(args)?,
    }
    Ok(())
}
