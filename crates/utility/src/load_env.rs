use std::path::Path;

use tracing::{debug, info};

/// Loads `{manifest_dir}/.env`, then the nearest `.env` upwards from the
/// working directory. Variables already set are never overwritten, so
/// Kubernetes-provided environment always wins.
pub fn load_env(manifest_dir: &Path) {
    let candidate = manifest_dir.join(".env");

    match dotenvy::from_path(&candidate) {
        Ok(()) => info!("✅ Loaded .env from {}", candidate.display()),
        Err(e) => debug!(error = %e, "No .env at {}", candidate.display()),
    }

    // Workspace root .env as fallback
    if let Ok(path) = dotenvy::dotenv() {
        info!("✅ Loaded .env from {}", path.display());
    }
}
