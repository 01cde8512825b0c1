//! The `photolog import` command: ingest local files without the server.

use std::path::PathBuf;

use clap::Args;
use photolog_core::{Config, DiscoveredFile, FileDiscovery, Journal, JournalError, Upload};

/// Arguments for the `import` command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Image files or directories to import
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of files ingested (and cataloged) per batch
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..))]
    pub batch_size: u16,
}

/// Execute the import command.
pub async fn execute(args: ImportArgs, config: Config) -> anyhow::Result<()> {
    let journal = Journal::open(config)?;
    let discovery = FileDiscovery::new(journal.config().ingest.clone());

    let files: Vec<DiscoveredFile> = args
        .paths
        .iter()
        .flat_map(|path| {
            if !path.exists() {
                tracing::warn!("Path does not exist: {}", path.display());
            }
            discovery.discover(path)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No importable images found");
    }

    tracing::info!(
        "Found {} files ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_048_576.0
    );

    let progress = create_progress_bar(files.len() as u64)?;
    let mut created = 0usize;
    let mut skipped = 0usize;

    for chunk in files.chunks(usize::from(args.batch_size)) {
        let mut uploads = Vec::with_capacity(chunk.len());
        for file in chunk {
            match read_upload(file) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    progress.suspend(|| {
                        tracing::warn!("Cannot read {}: {e}", file.path.display());
                    });
                    skipped += 1;
                }
            }
        }

        match journal.ingest(uploads).await {
            Ok(report) => {
                for skip in &report.skipped {
                    progress.suspend(|| {
                        tracing::warn!("Skipped {}: {}", skip.filename, skip.reason);
                    });
                }
                created += report.created.len();
                skipped += report.skipped.len();
            }
            Err(JournalError::NoUsableFiles { submitted }) => skipped += submitted,
            Err(e) => {
                progress.abandon_with_message("failed");
                return Err(e.into());
            }
        }

        progress.inc(chunk.len() as u64);
        progress.set_message(format!("{created} imported"));
    }

    progress.finish_with_message("done");
    println!("Imported {created} photo(s), skipped {skipped}");

    if created == 0 {
        anyhow::bail!("No photos were imported");
    }
    Ok(())
}

fn read_upload(file: &DiscoveredFile) -> std::io::Result<Upload> {
    let bytes = std::fs::read(&file.path)?;
    let filename = file
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload::new(filename, bytes))
}

/// Create a progress bar for batch imports.
fn create_progress_bar(total: u64) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )?
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    Ok(pb)
}
