//! Multipart form intake. File parts are streamed to the temp upload
//! directory under generated names; text parts are kept in memory.

use crate::application::videos::purge_local;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use axum::body::Bytes;
use axum::extract::Multipart;
use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, PathBuf>,
    fields: HashMap<String, String>,
}

/// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;
    Ok(())
}

/// Generated on-disk name keeping only a plain alphanumeric extension of the
/// client file name.
fn stored_name(client_name: &str) -> String {
    let ext = Path::new(client_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!("{}.{}", Id::new(), ext.to_ascii_lowercase()),
        None => Id::new().to_string(),
    }
}

impl UploadForm {
    /// Drain `multipart`, keeping file parts whose name is in `file_fields`.
    /// Other file parts are skipped. On failure every file already written is
    /// removed.
    pub async fn receive(
        mut multipart: Multipart,
        upload_dir: &Path,
        file_fields: &[&str],
    ) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        if let Err(err) = form.read(&mut multipart, upload_dir, file_fields).await {
            form.discard().await;
            return Err(err);
        }
        Ok(form)
    }

    async fn read(
        &mut self,
        multipart: &mut Multipart,
        upload_dir: &Path,
        file_fields: &[&str],
    ) -> ApiResult<()> {
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| ApiError::internal_from("Failed to store upload", e))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::invalid(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(client_name) if !client_name.is_empty() => {
                    if !file_fields.contains(&name.as_str()) || self.files.contains_key(&name) {
                        tracing::debug!(field = %name, "skipping unexpected file part");
                        continue;
                    }
                    let path = upload_dir.join(stored_name(&client_name));
                    // track before writing so a partial file is purged too
                    self.files.insert(name, path.clone());
                    stream_to_file(&path, field)
                        .await
                        .map_err(|e| ApiError::internal_from("Failed to store upload", e))?;
                }
                Some(_) => continue,
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::invalid(e.body_text()))?;
                    self.fields.insert(name, text);
                }
            }
        }
        Ok(())
    }

    pub fn take_file(&mut self, name: &str) -> Option<PathBuf> {
        self.files.remove(name)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Remove every file part not taken by the caller.
    pub async fn discard(self) {
        let paths: Vec<&Path> = self.files.values().map(PathBuf::as_path).collect();
        purge_local(&paths).await;
    }
}
