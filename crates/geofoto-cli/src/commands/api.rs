use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::config::Config;
use crate::model::{Record, RecordRow};
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// List every record, newest first
    List,
    /// Show one record
    Get {
        #[arg(help = "Record ID")]
        id: String,
    },
    /// One page of records, optionally filtered by business name
    Page {
        #[arg(long, default_value = "10")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
        #[arg(long, help = "Case-insensitive substring of the business name")]
        business: Option<String>,
    },
    /// Totals and top contributors
    Stats,
}

#[derive(Deserialize)]
struct ListEnvelope {
    data: Vec<Record>,
    total: usize,
}

#[derive(Deserialize)]
struct RecordEnvelope {
    data: Record,
}

#[derive(Debug, Serialize, Deserialize)]
struct Pagination {
    limit: i64,
    offset: i64,
    total: i64,
    has_more: bool,
}

#[derive(Deserialize)]
struct PageEnvelope {
    pagination: Pagination,
    data: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
struct Contributor {
    nama_penginput: String,
    total_entries: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Stats {
    total_entries: i64,
    recent_entries_7days: i64,
    top_contributors: Vec<Contributor>,
    last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
struct StatsEnvelope {
    stats: Stats,
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::List => {
            let resp: ListEnvelope = client.get("/api/data").await?;
            let rows: Vec<RecordRow> = resp.data.iter().map(RecordRow::from).collect();
            output::print_rows(&resp.data, rows, format);
            if matches!(format, Format::Table) {
                println!("{} records", resp.total);
            }
        }
        Commands::Get { id } => {
            // Validated server-side.
            let resp: RecordEnvelope = client.get_record(&id).await?;
            match format {
                Format::Json => output::print_json(&resp.data),
                Format::Table => {
                    output::print_table(vec![RecordRow::from(&resp.data)]);
                    output::print_field("photo", &resp.data.photo_url);
                }
            }
        }
        Commands::Page {
            limit,
            offset,
            business,
        } => {
            let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
            if let Some(b) = business {
                query.push(("nama_usaha", b));
            }
            let resp: PageEnvelope = client.get_with_query("/functions/v1/api", &query).await?;
            let rows: Vec<RecordRow> = resp.data.iter().map(RecordRow::from).collect();
            output::print_rows(&resp.data, rows, format);
            if matches!(format, Format::Table) {
                println!("{}", page_footer(&resp.pagination, resp.data.len()));
            }
        }
        Commands::Stats => {
            let resp: StatsEnvelope = client.get("/api/stats").await?;
            match format {
                Format::Json => output::print_json(&resp.stats),
                Format::Table => {
                    let s = resp.stats;
                    output::print_field("total", s.total_entries);
                    output::print_field("last 7 days", s.recent_entries_7days);
                    output::print_field("updated", s.last_updated.format("%Y-%m-%d %H:%M:%S"));
                    if !s.top_contributors.is_empty() {
                        output::print_table(s.top_contributors);
                    }
                }
            }
        }
    }

    Ok(())
}

fn page_footer(p: &Pagination, shown: usize) -> String {
    if shown == 0 {
        return format!("no records on this page ({} in total)", p.total);
    }
    let last = p.offset.saturating_add(shown as i64);
    format!(
        "{}-{} of {}{}",
        p.offset.saturating_add(1),
        last,
        p.total,
        if p.has_more { ", more available" } else { "" }
    )
}
