use std::time::Instant;

use tracing::{error, info};

use crate::application::{DatasetService, RecordLoader};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv::CsvParser;

/// Open, parse and load the configured CSV file.
///
/// Any failure here is fatal: the caller must not start serving.
pub fn load_dataset(config: &AppConfig) -> Result<DatasetService> {
    let started = Instant::now();
    let path = config.input_file()?;

    let parser = CsvParser::new().with_delimiter(config.delimiter_byte()?);
    let rows = parser.parse_file(path).map_err(|err| {
        error!(error = %err, path = %path.display(), "Failed to open input file");
        err
    })?;

    let records = RecordLoader::new(config.row_policy)
        .load(rows)
        .map_err(|err| {
            error!(error = %err, path = %path.display(), "Failed to load records");
            err
        })?;

    info!(
        path = %path.display(),
        records = records.len(),
        fields = records.field_names().len(),
        row_policy = %config.row_policy,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dataset loaded"
    );

    Ok(DatasetService::new(records, config.pagination))
}
