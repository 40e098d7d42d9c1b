use anyhow::{Context, Result};
use uuid::Uuid;

use crate::config::Config;
use crate::model::RecordRow;
use crate::output::{self, Format};
use crate::supabase::SupabaseClient;

/// Lists every record straight from the backend, newest first. Running it again
/// is the refresh.
pub async fn list(config: &Config, format: Format) -> Result<()> {
    let client = SupabaseClient::new(&config.backend()?);
    let records = client.list_records().await?;
    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    output::print_rows(&records, rows, format);
    Ok(())
}

pub async fn map(id: Uuid, config: &Config) -> Result<()> {
    let client = SupabaseClient::new(&config.backend()?);
    let record = client
        .find_record(id)
        .await?
        .with_context(|| format!("no record with id {}", id))?;
    println!("{}", record.map_link());
    Ok(())
}

pub async fn ping(config: &Config) -> Result<()> {
    let client = SupabaseClient::new(&config.backend()?);
    let count = client
        .count()
        .await
        .context("backend connection test failed")?;
    output::print_success(&format!("Connected, {} records in {}", count, config.table));
    Ok(())
}
