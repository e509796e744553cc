use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use walkdir::WalkDir;

use queryspec_core::model::schema::SchemaDescriptor;
use queryspec_core::model::{FilterSpec, SortSpec};
use queryspec_core::{ListRequest, SchemaRegistry, SpecList};

/// On-disk shape of an endpoint's spec file.
#[derive(Debug, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub sorts: Vec<SortSpec>,
}

/// Load schema descriptors from one YAML file or every `.yaml`/`.yml` file
/// under a directory.
pub fn load_schemas(path: &Path) -> Result<SchemaRegistry> {
    let mut schemas = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_yaml = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if !is_yaml {
                continue;
            }
            schemas.push(parse_yaml::<SchemaDescriptor>(entry.path())?);
        }
    } else {
        schemas.push(parse_yaml(path)?);
    }

    anyhow::ensure!(
        !schemas.is_empty(),
        "no schema definitions found under {}",
        path.display()
    );
    Ok(SchemaRegistry::new(schemas))
}

pub fn load_specs(path: &Path) -> Result<SpecList> {
    let file: SpecFile = parse_yaml(path)?;
    let specs = SpecList::new(file.filters, file.sorts)
        .with_context(|| format!("invalid spec list in {}", path.display()))?;
    Ok(specs)
}

/// Read a request payload from a file, or stdin when no path is given.
pub fn load_request(path: Option<&Path>) -> Result<ListRequest> {
    let payload = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read request from stdin")?;
            buffer
        }
    };
    Ok(ListRequest::from_json_str(&payload)?)
}

fn parse_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let deserializer = serde_yaml::Deserializer::from_str(&content);
    serde_path_to_error::deserialize(deserializer)
        .with_context(|| format!("failed to parse YAML from {}", path.display()))
}
