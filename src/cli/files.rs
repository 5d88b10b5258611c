//! Player file commands

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{CliError, OutputFormat};
use crate::{CloudSaveService, FileItem};

/// Files subcommand
#[derive(Debug, Args)]
pub struct FilesCommand {
    #[command(subcommand)]
    action: FilesAction,
}

/// Files actions
#[derive(Debug, Subcommand)]
enum FilesAction {
    /// List every stored file
    List,

    /// Show metadata of one file
    Metadata {
        /// File key
        key: String,
    },

    /// Upload a local file
    Upload {
        /// File key
        key: String,

        /// Local file to upload
        path: PathBuf,

        /// Expected write lock of the stored file
        #[arg(long)]
        write_lock: Option<String>,
    },

    /// Download a file to a local path, or to stdout
    Download {
        /// File key
        key: String,

        /// Destination path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a file
    Delete {
        /// File key
        key: String,

        /// Expected write lock of the stored file
        #[arg(long)]
        write_lock: Option<String>,
    },
}

fn print_file(file: &FileItem) {
    println!(
        "{} | {} bytes | {} | {}",
        file.key,
        file.size,
        file.content_type,
        file.write_lock.as_deref().unwrap_or("-")
    );
}

impl FilesCommand {
    /// Execute the files command
    pub async fn execute(&self, service: &CloudSaveService, format: OutputFormat) -> Result<(), CliError> {
        let files = &service.files.player;

        match &self.action {
            FilesAction::List => {
                let listed = files.list_all().await?;
                format.emit(&listed, |listed| {
                    println!("Found {} files:\n", listed.len());
                    listed.iter().for_each(print_file);
                })
            }
            FilesAction::Metadata { key } => {
                let metadata = files.get_metadata(key).await?;
                format.emit(&metadata, print_file)
            }
            FilesAction::Upload {
                key,
                path,
                write_lock,
            } => {
                let mut file = tokio::fs::File::open(path).await?;
                files
                    .save_stream(key, &mut file, write_lock.as_deref())
                    .await?;
                info!("Uploaded {:?} as {}", path, key);
                Ok(())
            }
            FilesAction::Download { key, output } => {
                let bytes = files.load_bytes(key).await?;
                match output {
                    Some(path) => {
                        tokio::fs::write(path, &bytes).await?;
                        info!("Downloaded {} ({} bytes) to {:?}", key, bytes.len(), path);
                    }
                    None => {
                        let mut stdout = tokio::io::stdout();
                        stdout.write_all(&bytes).await?;
                        stdout.flush().await?;
                    }
                }
                Ok(())
            }
            FilesAction::Delete { key, write_lock } => {
                files.delete(key, write_lock.as_deref()).await?;
                info!("Deleted file {}", key);
                Ok(())
            }
        }
    }
}
