//! Command-line driver: trains a network described by a JSON `NetworkSpec`
//! (or the built-in XOR setup) on the XOR truth table and prints the
//! resulting predictions.
//!
//!   cargo run -- --epochs 5000 --seed 7
//!   cargo run -- --spec xor.json

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ferrite_mlp::{evaluate_loss, train_loop, Matrix, NetworkSpec, NnError, Result};

#[derive(Parser, Debug)]
#[command(name = "ferrite-mlp", version, about = "Train a small MLP on XOR")]
struct Args {
    /// Path to a NetworkSpec JSON file; defaults to the 2-4-1 XOR network.
    #[arg(long)]
    spec: Option<String>,

    /// Override the number of training epochs.
    #[arg(long)]
    epochs: Option<usize>,

    /// Override the weight-initialization seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the learning rate.
    #[arg(long)]
    learning_rate: Option<f32>,
}

fn main() {
    init_logging();
    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut spec = match args.spec.as_deref() {
        Some(path) => NetworkSpec::load_json(path)?,
        None => NetworkSpec::xor(),
    };
    if let Some(epochs) = args.epochs {
        spec.epochs = epochs;
    }
    if args.seed.is_some() {
        spec.seed = args.seed;
    }
    if let Some(lr) = args.learning_rate {
        spec.learning_rate = lr;
    }

    let (inputs, targets) = xor_samples()?;
    if spec.dims.first() != Some(&2) || spec.dims.last() != Some(&1) {
        return Err(NnError::InvalidConfig(format!(
            "the XOR dataset needs a 2 -> ... -> 1 network, got {:?}",
            spec.dims
        )));
    }

    let mut network = spec.build()?;
    info!(name = %spec.name, dims = ?spec.dims, activations = ?spec.activations, "network ready");

    let untrained = evaluate_loss(&mut network, &inputs, &targets, spec.loss)?;
    info!(loss = untrained, "untrained loss");

    let trained = train_loop(&mut network, &inputs, &targets, &spec.train_config())?;
    info!(loss = trained, "final epoch loss");

    for input in &inputs {
        let output = network.predict(input)?;
        println!(
            "XOR({:.0}, {:.0}) = {:.4}",
            input.as_slice()[0],
            input.as_slice()[1],
            output.as_slice()[0]
        );
    }
    Ok(())
}

fn xor_samples() -> Result<(Vec<Matrix>, Vec<Matrix>)> {
    let table = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];
    let mut inputs = Vec::with_capacity(table.len());
    let mut targets = Vec::with_capacity(table.len());
    for (x, y) in &table {
        inputs.push(Matrix::column(x)?);
        targets.push(Matrix::column(&[*y])?);
    }
    Ok((inputs, targets))
}
