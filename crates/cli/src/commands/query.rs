use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use polars::prelude::*;

use executor::{execute_page, frame_to_json_rows, DataSource, ExecuteError};
use queryspec_core::interpret::{interpret, NoComputedDefaults};
use queryspec_core::response::ListResponse;

use crate::loader::{load_request, load_schemas, load_specs};

const DEFAULT_LIMIT: u64 = 50;

/// Interpret a request and execute it against per-schema CSV files
#[derive(Debug, Parser)]
pub struct QueryCommand {
    /// Schema YAML file, or a directory of schema files
    #[arg(long, value_name = "PATH")]
    pub schemas: PathBuf,

    /// Filter/sort spec YAML file
    #[arg(long, value_name = "FILE")]
    pub specs: PathBuf,

    /// Base schema the request runs against
    #[arg(long, value_name = "SCHEMA")]
    pub base: String,

    /// Directory holding one `<schema>.csv` per schema
    #[arg(long, value_name = "DIR")]
    pub data: PathBuf,

    /// Request JSON file (stdin when omitted)
    #[arg(value_name = "REQUEST")]
    pub request: Option<PathBuf>,
}

impl QueryCommand {
    pub fn execute(&self) -> Result<()> {
        let registry = load_schemas(&self.schemas)?;
        let specs = load_specs(&self.specs)?;
        let request = load_request(self.request.as_deref())?;

        let plan = interpret(&registry, &self.base, &specs, &request, &NoComputedDefaults)?;

        let source = CsvDirSource {
            root: self.data.clone(),
        };
        let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = request.offset.unwrap_or(0);
        let (page, page_info) = execute_page(&plan, &source, limit, offset)?;

        let response = ListResponse::ok(&self.base, frame_to_json_rows(&page)?, page_info);
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}

/// Data source over a directory of CSV files named after their schema.
struct CsvDirSource {
    root: PathBuf,
}

impl CsvDirSource {
    fn csv_path(&self, schema: &str) -> PathBuf {
        self.root.join(format!("{schema}.csv"))
    }
}

impl DataSource for CsvDirSource {
    fn frame(&self, schema: &str) -> std::result::Result<LazyFrame, ExecuteError> {
        let path = self.csv_path(schema);
        if !path.exists() {
            return Err(ExecuteError::MissingSource(schema.to_string()));
        }
        LazyCsvReader::new(&path).finish().map_err(ExecuteError::from)
    }
}
