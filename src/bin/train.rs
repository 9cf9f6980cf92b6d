use carprice::application::estimator::ModelArtifact;
use carprice::application::estimator::training::{
    ALL_MODEL_CHOICES, ModelChoice, TrainingParams, TrainingRow, load_dataset, train,
};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to training data CSV
    #[arg(long, default_value = "data/CarPrice_Assignment.csv")]
    input: PathBuf,

    /// Path to output model artifact
    #[arg(long, default_value = "data/models/price_model.json")]
    output: PathBuf,

    /// Estimator family: 'rf', 'linear', 'ridge', 'lasso', or 'all' to
    /// train every family and keep the best by holdout R²
    #[arg(long, default_value = "rf")]
    model_type: String,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 5)]
    min_split: usize,

    /// Regularization strength for ridge and lasso
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Fraction of rows held out for evaluation. 0 trains on 100% of data.
    #[arg(long, default_value_t = 0.2)]
    holdout: f64,

    /// Seed for the shuffle / split / importance permutations
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn params_for(kind: ModelChoice, args: &Args) -> TrainingParams {
    TrainingParams {
        kind,
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        min_split: args.min_split,
        alpha: args.alpha,
        holdout_fraction: args.holdout,
        seed: args.seed,
    }
}

fn report(artifact: &ModelArtifact) {
    let m = &artifact.metrics;
    if m.n_test > 0 {
        println!(
            "Holdout (n={}): RMSE=${:.2}, MAE=${:.2}, R²={:.4}",
            m.n_test, m.rmse, m.mae, m.r2
        );
    } else {
        println!(
            "In-sample (n={}): RMSE=${:.2}, MAE=${:.2}, R²={:.4}",
            m.n_train, m.rmse, m.mae, m.r2
        );
    }
}

/// Trains every model family and keeps the one with the best holdout R².
fn run_all_models(rows: &[TrainingRow], args: &Args) -> Result<(), Box<dyn Error>> {
    let mut results: Vec<(&'static str, f64)> = Vec::new();
    let mut best: Option<ModelArtifact> = None;

    for &kind in ALL_MODEL_CHOICES {
        println!("\n{}", "=".repeat(50));
        println!("Training {:?} model", kind);
        println!("{}", "=".repeat(50));

        let artifact = train(rows, &params_for(kind, args))?;
        report(&artifact);
        results.push((artifact.model.name(), artifact.metrics.r2));

        if best
            .as_ref()
            .map_or(true, |b| artifact.metrics.r2 > b.metrics.r2)
        {
            best = Some(artifact);
        }
    }

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    println!("\nModel Comparison:");
    println!("{}", "=".repeat(50));
    for (name, r2) in &results {
        println!("{}: R² = {:.4}", name.to_uppercase(), r2);
    }

    if let Some(best) = best {
        println!(
            "\nBest model: {} with R² = {:.4}",
            best.model.name().to_uppercase(),
            best.metrics.r2
        );
        println!("Saving best model to {:?}", args.output);
        best.save(&args.output)?;
        println!("Done. Model saved successfully.");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !args.input.exists() {
        println!(
            "Training data not found at {:?}. Download the car price dataset first.",
            args.input
        );
        return Ok(());
    }

    println!("Loading training data from {:?}", args.input);
    let rows = load_dataset(&args.input)?;
    println!("Loaded {} rows", rows.len());

    if args.model_type.eq_ignore_ascii_case("all") {
        return run_all_models(&rows, &args);
    }

    let params = params_for(ModelChoice::from_str(&args.model_type)?, &args);

    match params.kind {
        ModelChoice::RandomForest => println!(
            "Training Random Forest Regressor (Trees: {}, Depth: {}, MinSplit: {})...",
            params.n_trees, params.max_depth, params.min_split
        ),
        ModelChoice::Linear => println!("Training Linear Regressor..."),
        ModelChoice::Ridge => println!("Training Ridge Regressor (alpha={})...", params.alpha),
        ModelChoice::Lasso => println!("Training Lasso Regressor (alpha={})...", params.alpha),
    }

    let artifact = train(&rows, &params)?;
    report(&artifact);

    println!("\nTop 10 features by permutation importance:");
    for fi in artifact.importances.iter().take(10) {
        println!("- {}: {:.4}", fi.name, fi.weight);
    }

    println!("\nSaving model to {:?}", args.output);
    artifact.save(&args.output)?;

    println!("Done. Model saved successfully.");
    Ok(())
}
