//! Compile a saved UFO to TrueType with the `fontc` command-line compiler

use anyhow::{anyhow, Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::config_file::ConfigFile;

/// Compiled fonts kept in the cache.
pub const CACHE_LIMIT: usize = 20;

pub struct FontCompiler {
    program: String,
    cache_dir: PathBuf,
}

impl Default for FontCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCompiler {
    pub fn new() -> Self {
        Self::with_cache_dir(ConfigFile::cache_dir().join("compiled"))
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "fontc".to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Use another compiler binary with the same command line.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Compile `ufo_path`, reusing a cached build when the UFO is unchanged,
    /// and copy the result to `output`.
    pub async fn compile(&self, ufo_path: &Path, output: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .with_context(|| format!("Failed to create cache {}", self.cache_dir.display()))?;

        let font_hash = self.calculate_font_hash(ufo_path).await?;
        let cached_font = self.cache_dir.join(format!("{font_hash}.ttf"));

        if self.is_fresh(&cached_font, ufo_path).await {
            debug!("Reusing compiled font {:?}", cached_font);
        } else {
            self.compile_with_fontc(ufo_path, &cached_font).await?;
        }

        fs::copy(&cached_font, output)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Compiled {} to {}", ufo_path.display(), output.display());
        Ok(output.to_path_buf())
    }

    async fn is_fresh(&self, cached_font: &Path, ufo_path: &Path) -> bool {
        let (Ok(cache_meta), Ok(source_meta)) =
            (fs::metadata(cached_font).await, fs::metadata(ufo_path).await)
        else {
            return false;
        };
        match (cache_meta.modified(), source_meta.modified()) {
            (Ok(cache_time), Ok(source_time)) => cache_time >= source_time,
            _ => false,
        }
    }

    async fn compile_with_fontc(&self, ufo_path: &Path, output_path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(ufo_path).arg("--output").arg(output_path);

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} compilation failed: {}", self.program, stderr));
        }

        Ok(())
    }

    async fn calculate_font_hash(&self, ufo_path: &Path) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        ufo_path.hash(&mut hasher);

        let metadata = fs::metadata(ufo_path)
            .await
            .with_context(|| format!("No UFO at {}", ufo_path.display()))?;
        if let Ok(modified) = metadata.modified() {
            if let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH) {
                duration.as_nanos().hash(&mut hasher);
            }
        }

        Ok(format!("{:x}", hasher.finish()))
    }

    /// Keep only the `max_files` most recently compiled fonts.
    pub async fn cleanup_old_cache(&self, max_files: usize) -> Result<()> {
        let mut entries = Vec::new();

        let mut dir = fs::read_dir(&self.cache_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            if let Ok(metadata) = entry.metadata().await {
                if let Ok(modified) = metadata.modified() {
                    entries.push((entry.path(), modified));
                }
            }
        }

        if entries.len() <= max_files {
            return Ok(());
        }

        // newest first
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in entries.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path).await {
                debug!("Could not remove cached font {:?}: {}", path, e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_compiler_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ufo = dir.path().join("Font.ufo");
        std::fs::create_dir_all(&ufo).expect("ufo dir");
        let compiler = FontCompiler::with_cache_dir(dir.path().join("cache"))
            .with_program("inkfont-no-such-compiler");
        let result = compiler.compile(&ufo, &dir.path().join("Font.ttf")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cache_cleanup_keeps_the_newest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = dir.path().join("cache");
        std::fs::create_dir_all(&cache).expect("cache dir");
        for i in 0..5 {
            std::fs::write(cache.join(format!("{i}.ttf")), b"ttf").expect("write");
        }
        let compiler = FontCompiler::with_cache_dir(&cache);
        compiler.cleanup_old_cache(2).await.expect("cleanup");
        assert_eq!(std::fs::read_dir(&cache).expect("read").count(), 2);
    }
}
