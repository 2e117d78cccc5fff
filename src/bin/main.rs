use std::{path::PathBuf, process};

use anyhow::Context;
use structopt::StructOpt;
use tracing_subscriber::*;

use fairshare::{
    aggregation::{Aggregate, PlaintextAggregation, Statistics},
    loader::load_attributes,
    mask::MaskConfig,
    matrix::{AttributeMatrix, WeightVector},
    settings::{InputSettings, Settings},
    store::ShareStore,
};

#[macro_use]
extern crate tracing;

#[derive(Debug, StructOpt)]
#[structopt(name = "fairshare")]
struct Opt {
    /// Path of the configuration file
    #[structopt(short, parse(from_os_str))]
    config_path: PathBuf,

    /// Path of the attribute file, one row per individual and one column per category
    #[structopt(short, parse(from_os_str))]
    attributes_path: PathBuf,

    /// Category of interest for the diversity
    #[structopt(short = "k", long, default_value = "0")]
    category: usize,

    /// Comma-separated weight of every category, all weights are 1 if omitted
    #[structopt(short, long, use_delimiter = true, allow_hyphen_values = true)]
    weights: Vec<f64>,

    /// Reconstruct the donated attributes from both shares and aggregate them in plaintext
    #[structopt(long)]
    reconstruct: bool,
}

fn main() {
    let opt = Opt::from_args();

    let settings = Settings::new(&opt.config_path).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    let Settings {
        mask: mask_settings,
        input: input_settings,
        log: log_settings,
    } = settings;

    let _fmt_subscriber = FmtSubscriber::builder()
        .with_env_filter(log_settings.filter)
        .with_ansi(true)
        .init();

    if let Err(err) = run(opt, mask_settings.into(), input_settings) {
        error!("{:#}", err);
        process::exit(1);
    }
}

fn run(
    opt: Opt,
    mask_config: MaskConfig,
    input_settings: InputSettings,
) -> anyhow::Result<()> {
    let attribute = load_attributes(&opt.attributes_path, input_settings.delimiter)
        .with_context(|| format!("failed to load {}", opt.attributes_path.display()))?;
    if input_settings.require_one_hot {
        attribute
            .check_one_hot()
            .context("attributes are not one-hot")?;
    }

    let weights = if opt.weights.is_empty() {
        WeightVector::from(vec![1.0; attribute.categories()])
    } else {
        WeightVector::from(opt.weights)
    };

    let store = ShareStore::new(mask_config).context("invalid mask settings")?;
    let revision = store.donate(&attribute)?;
    drop(attribute);

    let donation = store.snapshot().context("no donation has been stored")?;
    info!(revision, "aggregating donation in share mode");
    let statistics = donation
        .aggregation()
        .statistics(opt.category, &weights)
        .context("share-mode aggregation failed")?;
    print_statistics("share mode", &statistics);

    if opt.reconstruct {
        let reconstructed = donation.reconstruct();
        print_attributes(&reconstructed);
        let statistics = PlaintextAggregation::new(&reconstructed)
            .statistics(opt.category, &weights)
            .context("plaintext aggregation failed")?;
        print_statistics("plaintext mode", &statistics);
    }

    Ok(())
}

fn print_statistics(mode: &str, statistics: &Statistics) {
    println!("[{}]", mode);
    println!("population = {}", statistics.population);
    println!("categories = {}", statistics.categories);
    println!("diversity({}) = {:.6}", statistics.category, statistics.diversity);
    println!(
        "diversity_profile = [{}]",
        statistics
            .diversity_profile
            .iter()
            .map(|diversity| format!("{:.6}", diversity))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("coverage = {:.6}", statistics.coverage);
    println!("expectation = {:.6}", statistics.expectation);
}

fn print_attributes(attribute: &AttributeMatrix) {
    println!("[reconstruction]");
    for row in attribute.array().outer_iter() {
        println!(
            "{}",
            row.iter()
                .map(|value| value.round().abs().to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
}
