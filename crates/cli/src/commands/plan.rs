use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use queryspec_core::interpret::{interpret, NoComputedDefaults};

use crate::loader::{load_request, load_schemas, load_specs};

/// Interpret a request and print the resulting query plan as JSON
#[derive(Debug, Parser)]
pub struct PlanCommand {
    /// Schema YAML file, or a directory of schema files
    #[arg(long, value_name = "PATH")]
    pub schemas: PathBuf,

    /// Filter/sort spec YAML file
    #[arg(long, value_name = "FILE")]
    pub specs: PathBuf,

    /// Base schema the request runs against
    #[arg(long, value_name = "SCHEMA")]
    pub base: String,

    /// Request JSON file (stdin when omitted)
    #[arg(value_name = "REQUEST")]
    pub request: Option<PathBuf>,
}

impl PlanCommand {
    pub fn execute(&self) -> Result<()> {
        let registry = load_schemas(&self.schemas)?;
        let specs = load_specs(&self.specs)?;
        let request = load_request(self.request.as_deref())?;

        let plan = interpret(&registry, &self.base, &specs, &request, &NoComputedDefaults)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        Ok(())
    }
}
