//! `triplet-predict`: scores a JSON-lines file of triplets.
//!
//! Usage: `triplet-predict <triplets.jsonl> [--evaluate]`
//!
//! Prints one JSON prediction per input line to stdout. With `--evaluate`, also logs
//! mean loss and accuracy against the `label` fields (absent labels count as `B`).
//! Configuration comes from `TRIPLET_*` environment variables; logs go to stderr.

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;

use triplet::config::ModelConfig;
use triplet::dataset::TripletDataset;
use triplet::predict::TripletPredictor;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

struct Args {
    input: PathBuf,
    evaluate: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut input = None;
    let mut evaluate = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--evaluate" => evaluate = true,
            flag if flag.starts_with("--") => bail!("unknown flag: {flag}"),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument: {extra}"),
        }
    }

    let input = input.context("usage: triplet-predict <triplets.jsonl> [--evaluate]")?;
    Ok(Args { input, evaluate })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = ModelConfig::from_env()?;
    config.validate()?;

    tracing::info!(
        input = %args.input.display(),
        compute_target = %config.compute_target,
        max_length = config.max_length,
        "triplet-predict starting"
    );

    let dataset = TripletDataset::from_jsonl(&args.input, false)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let predictor = TripletPredictor::load(&config)?;

    let predictions = if args.evaluate && !dataset.is_empty() {
        let (predictions, summary) = predictor.predict_and_evaluate(&dataset)?;
        tracing::info!(
            examples = summary.examples,
            mean_loss = summary.mean_loss,
            accuracy = summary.accuracy,
            "Evaluation summary"
        );
        predictions
    } else {
        if args.evaluate {
            tracing::warn!("No triplets to evaluate");
        }
        predictor.predict_dataset(&dataset)?
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for prediction in &predictions {
        serde_json::to_writer(&mut out, prediction)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}
