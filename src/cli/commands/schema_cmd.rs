//! schema command - print the current configuration contract

use anyhow::Result;

use crate::schema;

/// Print the current release's configuration contract as pretty JSON.
pub fn schema() -> Result<()> {
    let contract = serde_json::to_string_pretty(&schema::current())?;
    println!("{contract}");
    Ok(())
}
