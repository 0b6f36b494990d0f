/// JSON exporter for decoded state
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;

/// Exporter for decoded states, snapshots and diffs
pub struct StateExporter;

impl StateExporter {
    pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).context("Failed to serialize state")
    }

    /// Export to a JSON file
    pub fn export_to_file<T: Serialize>(value: &T, output_path: &str) -> Result<()> {
        let json = Self::to_json(value)?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path))?;
        Ok(())
    }

    /// Print as formatted JSON to stdout
    pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
        println!("{}", Self::to_json(value)?);
        Ok(())
    }
}
