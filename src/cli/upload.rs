//! Document upload, both as a subcommand and from inside the chat.

use std::error::Error;
use std::path::Path;

use crate::core::config::ResolvedSettings;
use crate::core::http::build_client;
use crate::core::upload::{upload_failure_message, DocumentUploadClient};

/// Upload one file and report the outcome. Returns whether it succeeded.
pub async fn upload_and_report(client: &DocumentUploadClient, path: &Path) -> bool {
    eprintln!("Uploading {}...", path.display());
    match client.upload_path(path).await {
        Ok(result) => {
            println!("✅ {}", result.summary());
            true
        }
        Err(err) => {
            eprintln!("❌ {}", upload_failure_message(&err));
            false
        }
    }
}

pub async fn run_upload(settings: ResolvedSettings, path: &Path) -> Result<(), Box<dyn Error>> {
    let http = build_client(settings.request_timeout)?;
    let client = DocumentUploadClient::new(http, settings.base_url);
    if !upload_and_report(&client, path).await {
        std::process::exit(1);
    }
    Ok(())
}
