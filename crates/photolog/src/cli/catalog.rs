//! Catalog commands: `list`, `show` and `delete`.

use clap::Args;
use photolog_core::{Config, Journal, PhotoRecord};

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print full records as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Show at most this many records
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `show` command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Photo id
    pub id: String,
}

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Photo id
    pub id: String,
}

pub fn list(args: ListArgs, config: Config) -> anyhow::Result<()> {
    let journal = Journal::open(config)?;
    let mut records = journal.list();
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No photos yet.");
        return Ok(());
    }
    for record in &records {
        println!("{}", list_line(record));
    }
    Ok(())
}

pub fn show(args: ShowArgs, config: Config) -> anyhow::Result<()> {
    let journal = Journal::open(config)?;
    let record = journal.get(&args.id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn delete(args: DeleteArgs, config: Config) -> anyhow::Result<()> {
    let journal = Journal::open(config)?;
    let record = journal.delete(&args.id)?;
    println!("Deleted {} ({})", record.id, record.original_filename);
    Ok(())
}

/// One line per record: id, upload time, capture date, camera, filename.
fn list_line(record: &PhotoRecord) -> String {
    let captured = match (&record.capture_date, &record.capture_time) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        _ => "-".to_string(),
    };
    let camera = match (&record.camera_info.make, &record.camera_info.model) {
        (Some(make), Some(model)) => format!("{make} {model}"),
        (Some(one), None) | (None, Some(one)) => one.clone(),
        (None, None) => "-".to_string(),
    };
    format!(
        "{}  {}  {:<19}  {:<20}  {}",
        record.id,
        record.upload_timestamp.format("%Y-%m-%d %H:%M"),
        captured,
        camera,
        record.original_filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use photolog_core::{CameraInfo, MetadataResult};

    #[test]
    fn test_list_line_with_and_without_metadata() {
        let uploaded = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);

        let bare = PhotoRecord::new(
            "abc".into(),
            "beach.png".into(),
            "abc.png".into(),
            uploaded,
            MetadataResult::default(),
        );
        let line = list_line(&bare);
        assert!(line.starts_with("abc  2024-03-01 12:30  -"));
        assert!(line.ends_with("beach.png"));

        let metadata = MetadataResult {
            captured_at: chrono::NaiveDate::from_ymd_opt(2023, 7, 4)
                .and_then(|d| d.and_hms_opt(18, 45, 10)),
            camera_info: CameraInfo {
                make: Some("Canon".into()),
                model: Some("EOS R5".into()),
                ..CameraInfo::default()
            },
            ..MetadataResult::default()
        };
        let rich = PhotoRecord::new(
            "def".into(),
            "a.jpg".into(),
            "def.jpg".into(),
            uploaded,
            metadata,
        );
        let line = list_line(&rich);
        assert!(line.contains("2023-07-04 18:45:10"));
        assert!(line.contains("Canon EOS R5"));
    }
}
