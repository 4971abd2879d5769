//! Schema generator for the procedure API.
//!
//! This binary writes `procedure_schema.json` with the name, description,
//! auth requirement and input/output schemas of every procedure.

use anyhow::{Context, Result};
use demo_api::schema::procedure_schemas;
use std::fs;

const OUTPUT_FILE: &str = "procedure_schema.json";

fn main() -> Result<()> {
    let procedures = procedure_schemas();

    let json = serde_json::to_string_pretty(&procedures).context("Failed to serialize schema")?;
    fs::write(OUTPUT_FILE, json).with_context(|| format!("Failed to write {OUTPUT_FILE}"))?;

    println!("✅ Generated {OUTPUT_FILE} with {} procedure(s)", procedures.len());
    Ok(())
}
