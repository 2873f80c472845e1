use std::path::PathBuf;

use brain_types::{ExploreMetrics, PlannerMetrics};

/// Writes session transcripts and metrics under `BRAIN_DEBUG_DIR`, per §6 and §11.
///
/// The directory is read once at construction and treated as immutable for the
/// process lifetime (§9 "Global state") — this struct, not a re-read of the
/// environment, is the thing callers hold on to.
pub struct DebugWriter {
    dir: Option<PathBuf>,
}

impl DebugWriter {
    /// Reads `BRAIN_DEBUG_DIR` once. An empty or unset value disables all file output.
    pub fn from_env() -> Self {
        let dir = std::env::var("BRAIN_DEBUG_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self { dir }
    }

    pub fn write_explore_transcript(&self, session_id: &str, transcript: &str) -> std::io::Result<()> {
        self.write_text(&format!("explore_{session_id}.txt"), transcript)
    }

    pub fn write_explore_metrics(&self, session_id: &str, metrics: &ExploreMetrics) -> std::io::Result<()> {
        self.write_json(&format!("explore_metrics_{session_id}.json"), metrics)
    }

    pub fn write_planner_transcript(&self, session_id: &str, transcript: &str) -> std::io::Result<()> {
        self.write_text(&format!("planner_{session_id}.txt"), transcript)
    }

    pub fn write_planner_metrics(&self, session_id: &str, metrics: &PlannerMetrics) -> std::io::Result<()> {
        self.write_json(&format!("planner_metrics_{session_id}.json"), metrics)
    }

    fn write_text(&self, file_name: &str, content: &str) -> std::io::Result<()> {
        let Some(path) = self.ensure_dir_and_path(file_name)? else {
            return Ok(());
        };
        std::fs::write(&path, content)?;
        set_file_mode(&path, 0o644)?;
        Ok(())
    }

    fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> std::io::Result<()> {
        let Some(path) = self.ensure_dir_and_path(file_name)? else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)?;
        set_file_mode(&path, 0o644)?;
        Ok(())
    }

    fn ensure_dir_and_path(&self, file_name: &str) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        set_file_mode(dir, 0o755)?;
        Ok(Some(dir.join(file_name)))
    }
}

/// Formats the current time as `YYYYMMDD-HHMMSS.fff` (§6 session id format).
pub fn session_id_now() -> String {
    chrono::Utc::now().format("%Y%m%d-%H%M%S%.3f").to_string()
}

#[cfg(unix)]
fn set_file_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_file_mode(_path: &std::path::Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
