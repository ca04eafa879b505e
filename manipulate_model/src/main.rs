use std::fs;
use std::path::PathBuf;

use clap::Parser;
use text_quality::{LinearModel, QualityModel};

#[derive(Parser, Debug)]
#[command(
    name = "manipulate_model",
    about = "A program to manipulate trained classifier models."
)]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the weights contained in the model.
    #[arg(long)]
    dump_weights: Option<PathBuf>,

    /// Replace the weights if the argument is specified.
    #[arg(long)]
    replace_weights: Option<PathBuf>,
}

const CLASS_COLUMN: &str = "class";
const BIAS_COLUMN: &str = "bias";

fn dump_weights(model: &LinearModel, path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
    let mut header = vec![CLASS_COLUMN.to_string(), BIAS_COLUMN.to_string()];
    header.extend(model.feature_names().iter().cloned());
    wtr.write_record(&header)?;
    let rows = model.classes().iter().zip(model.bias()).zip(model.weights());
    for ((class, bias), weights) in rows {
        let mut record = vec![class.to_string(), bias.to_string()];
        record.extend(weights.iter().map(|w| w.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads weights in the format written by [`dump_weights()`].
///
/// Feature columns may appear in any order, but must be exactly the features of `model`.
fn replace_weights(
    model: &LinearModel,
    path: PathBuf,
) -> Result<LinearModel, Box<dyn std::error::Error>> {
    let mut rdr = csv::Reader::from_reader(fs::File::open(path)?);
    let header = rdr.headers()?.clone();
    if header.get(0) != Some(CLASS_COLUMN) || header.get(1) != Some(BIAS_COLUMN) {
        let msg = format!("the first columns must be '{CLASS_COLUMN}' and '{BIAS_COLUMN}'");
        return Err(msg.into());
    }
    let feature_names = model.feature_names();
    if header.len() - 2 != feature_names.len() {
        return Err(format!(
            "expected {} feature columns, but found {}",
            feature_names.len(),
            header.len() - 2
        )
        .into());
    }
    let mut columns = vec![];
    for name in feature_names {
        let column = header
            .iter()
            .skip(2)
            .position(|c| c == name)
            .ok_or_else(|| format!("missing feature column '{name}'"))?;
        columns.push(column + 2);
    }

    let mut classes = vec![];
    let mut bias = vec![];
    let mut weights = vec![];
    for result in rdr.records() {
        let record = result?;
        classes.push(record[0].parse::<i32>()?);
        bias.push(record[1].parse::<f64>()?);
        let mut ws = vec![];
        for &i in &columns {
            ws.push(record[i].parse::<f64>()?);
        }
        weights.push(ws);
    }
    Ok(LinearModel::new(classes, feature_names.to_vec(), weights, bias)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let mut model = LinearModel::read(&mut f)?;

    if let Some(path) = args.dump_weights {
        eprintln!("Saving weights file...");
        dump_weights(&model, path)?;
    }

    if let Some(path) = args.replace_weights {
        eprintln!("Loading weights file...");
        model = replace_weights(&model, path)?;
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
