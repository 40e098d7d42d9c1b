use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args as ClapArgs;

use crate::capture::Workflow;
use crate::config::Config;
use crate::device::{DirGallery, FileCamera, LocationSource, PromptForm};
use crate::model::Coordinates;
use crate::output::{self, Format};
use crate::supabase::SupabaseClient;

#[derive(ClapArgs)]
pub struct Args {
    #[arg(help = "JPEG photo of the business")]
    photo: PathBuf,
    #[arg(long, help = "Name of the person submitting (prompted if omitted)")]
    submitter: Option<String>,
    #[arg(long, help = "Name of the business (prompted if omitted)")]
    business: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lon", help = "Latitude; defaults to the photo's GPS tag")]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, requires = "lat", help = "Longitude; defaults to the photo's GPS tag")]
    lon: Option<f64>,
}

pub async fn run(args: Args, config: &Config, format: Format) -> Result<()> {
    let backend = config.backend()?;
    let client = SupabaseClient::new(&backend);

    let locator = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => match Coordinates::new(lat, lon) {
            Some(coords) => LocationSource::Fixed(coords),
            None => bail!("coordinates out of range: {}, {}", lat, lon),
        },
        _ => LocationSource::Exif,
    };

    let camera = FileCamera::new(args.photo);
    let form = PromptForm::stdin(args.submitter, args.business);
    let gallery = DirGallery::new(config.gallery_dir()?);

    let outcome = Workflow {
        camera: &camera,
        locator: &locator,
        form: &form,
        backend: &client,
        gallery: &gallery,
    }
    .run()
    .await?;

    match format {
        Format::Json => output::print_json(&serde_json::json!({
            "id": outcome.id,
            "record": outcome.record,
        })),
        Format::Table => {
            output::print_success("Photo and record saved");
            output::print_field("id", outcome.id);
            output::print_field("business", &outcome.record.nama_usaha);
            output::print_field("submitter", &outcome.record.nama_penginput);
            output::print_field(
                "location",
                format!(
                    "{}, {}",
                    outcome.record.latitude, outcome.record.longitude
                ),
            );
            output::print_field("photo", &outcome.record.photo_url);
        }
    }

    match outcome.gallery {
        Ok(path) => {
            if matches!(format, Format::Table) {
                output::print_field("saved to", path.display());
            }
        }
        Err(e) => output::print_warning(&format!(
            "record saved, but copying {} to the gallery failed: {}",
            outcome.file_name, e
        )),
    }

    Ok(())
}
