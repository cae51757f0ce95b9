use std::path::{Path, PathBuf};

use log::{error, info, warn};

use aquaconn_storage::client::S3Client;
use aquaconn_storage::config::S3Config;
use aquaconn_storage::error::Result as StorageResult;

use crate::forecast::config::StorageSettings;

/// A local file and the object key it goes to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Artifact {
    pub file: PathBuf,
    pub key: String,
}

/// Pairs the written files with their configured keys. Files without a key stay local.
pub(crate) fn plan_uploads(
    storage: &StorageSettings,
    trajectory_file: &Path,
    connectivity_file: &Path,
    connectivity_with_site_id_file: Option<&Path>,
) -> Vec<Artifact> {
    let mut artifacts = Vec::new();
    let mut add = |file: &Path, key: &Option<String>| {
        if let Some(key) = key {
            artifacts.push(Artifact {
                file: file.to_path_buf(),
                key: key.clone(),
            });
        }
    };
    add(trajectory_file, &storage.trajectory_key);
    add(connectivity_file, &storage.connectivity_key);
    match (connectivity_with_site_id_file, &storage.connectivity_with_site_id_key) {
        (Some(file), key) => add(file, key),
        (None, Some(key)) => warn!("No site id matrix is written, not uploading {}", key),
        (None, None) => {}
    }
    artifacts
}

/// Uploads the artifacts one by one. Failures are logged and returned as notices; they never
/// stop the run.
pub(crate) fn upload_artifacts(storage: &StorageSettings, artifacts: &[Artifact]) -> Vec<String> {
    if artifacts.is_empty() {
        return Vec::new();
    }
    let client = match S3Config::from_env().and_then(S3Client::new) {
        Ok(client) => client,
        Err(e) => {
            error!("Object storage is not available: {}", e);
            return vec![format!("Nothing uploaded: {}", e)];
        }
    };
    artifacts
        .iter()
        .filter_map(|artifact| match upload(&client, storage, artifact) {
            Ok(()) => None,
            Err(e) => {
                error!("Upload of {} failed: {}", artifact.file.display(), e);
                Some(format!("Upload of {} failed: {}", artifact.file.display(), e))
            }
        })
        .collect()
}

fn upload(client: &S3Client, storage: &StorageSettings, artifact: &Artifact) -> StorageResult<()> {
    let url = client.object_url(storage.bucket.as_deref(), &artifact.key)?;
    info!("Uploading {} to {}", artifact.file.display(), url);
    client.put_file(&url, &artifact.file)
}
