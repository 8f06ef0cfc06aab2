use std::{error::Error, path::Path, time::Instant};

use process_analysis::{
    AnalysisKind, AnalysisOptions, AnalysisRequest, AnalysisService, ColumnMapping,
    InMemoryDatasetStore,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: binary <file.csv|file.xlsx|file.xls> <case column> <activity column> <timestamp column> [resource column]

Environment:
  ANALYSES     comma-separated analyses to run (default: discovery,statistics,variants)
  DATE_FORMAT  chrono format string tried before the built-in timestamp formats
  RUST_LOG     log filter (default: info)";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn requested_analyses() -> Vec<String> {
    match std::env::var("ANALYSES") {
        Ok(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
        Err(_) => AnalysisKind::ALL.iter().map(|k| k.name().to_string()).collect(),
    }
}

fn error_message(err: &dyn Error) -> String {
    format!("error: {err}")
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{}", error_message(&*err));
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, case_id, activity, timestamp) = match args.as_slice() {
        [path, case_id, activity, timestamp, ..] => (path, case_id, activity, timestamp),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    let mut mapping = ColumnMapping::new(case_id.as_str(), activity.as_str(), timestamp.as_str());
    if let Some(resource) = args.get(4) {
        mapping = mapping.with_resource(resource.as_str());
    }

    let options = AnalysisOptions {
        date_format: std::env::var("DATE_FORMAT").ok(),
        ..AnalysisOptions::default()
    };
    let service = AnalysisService::new(InMemoryDatasetStore::default(), options);

    let now = Instant::now();
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());
    let upload = service.ingest(&file_name, std::fs::read(path)?)?;
    tracing::info!(
        columns = upload.columns.len(),
        elapsed = ?now.elapsed(),
        "Loaded {file_name}"
    );

    let request = AnalysisRequest {
        mapping,
        analyses: requested_analyses(),
    };
    let now = Instant::now();
    let result = service.analyze(&upload.dataset_id, &request)?;
    tracing::info!(elapsed = ?now.elapsed(), "Analyzed {} events", result.events);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use process_analysis::{AnalysisError, ServiceError};

    use super::*;

    #[test]
    fn test_errors_are_reported_by_message() {
        let err = ServiceError::from(AnalysisError::MissingColumns(vec!["id".into()]));
        assert_eq!(error_message(&err), "error: missing columns: id");

        let err = ServiceError::from(AnalysisError::UnsupportedAnalysis(vec!["bogus".into()]));
        assert_eq!(error_message(&err), "error: unsupported analyses: bogus");
    }
}
