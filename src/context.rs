// File: ./src/context.rs
//! Where the board keeps its files.
//!
//! Three directories matter: config (`config.toml`, `conferences.toml`),
//! data (the key-value store) and cache (the log file). `StandardContext`
//! takes them from the platform (`directories::ProjectDirs`) or from one
//! override root, `TestContext` from a throwaway temp directory. Nothing
//! reads paths from global state; callers pass a `&dyn AppContext`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding an override root directory.
pub const ROOT_ENV_VAR: &str = "DEADLINES_ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    Config,
    Data,
    Cache,
}

impl DirKind {
    /// Sub-directory name used under an override root.
    pub fn subdir(self) -> &'static str {
        match self {
            DirKind::Config => "config",
            DirKind::Data => "data",
            DirKind::Cache => "cache",
        }
    }
}

fn create(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    Ok(dir)
}

/// Object-safe; callers take `&dyn AppContext`.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    /// Returns the directory of `kind`, created if missing.
    fn dir(&self, kind: DirKind) -> Result<PathBuf>;

    fn get_data_dir(&self) -> Result<PathBuf> {
        self.dir(DirKind::Data)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.dir(DirKind::Config)
    }

    fn get_cache_dir(&self) -> Result<PathBuf> {
        self.dir(DirKind::Cache)
    }

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    fn get_catalog_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("conferences.toml"))
    }

    /// Directory of the key-value store (tag selection, local deadlines).
    fn get_store_dir(&self) -> Result<PathBuf> {
        create(self.get_data_dir()?.join("store"))
    }

    fn get_log_path(&self) -> Option<PathBuf> {
        self.get_cache_dir().ok().map(|p| p.join("deadlines.log"))
    }
}

#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, every directory lives under `root` as `config`,
    /// `data` and `cache`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    /// Uses the explicit root if given, else `DEADLINES_ROOT` if set.
    pub fn from_env(explicit_root: Option<PathBuf>) -> Self {
        let root = explicit_root.or_else(|| {
            std::env::var_os(ROOT_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self::new(root)
    }

    pub fn override_root(&self) -> Option<&PathBuf> {
        self.override_root.as_ref()
    }

    fn platform_dir(kind: DirKind) -> Result<PathBuf> {
        let proj = ProjectDirs::from("org", "deadlines", "deadlines")
            .ok_or_else(|| anyhow::anyhow!("Cannot determine a home directory"))?;
        let dir: &Path = match kind {
            DirKind::Config => proj.config_dir(),
            DirKind::Data => proj.data_dir(),
            DirKind::Cache => proj.cache_dir(),
        };
        Ok(dir.to_path_buf())
    }
}

impl AppContext for StandardContext {
    fn dir(&self, kind: DirKind) -> Result<PathBuf> {
        let dir = match &self.override_root {
            Some(root) => root.join(kind.subdir()),
            None => Self::platform_dir(kind)?,
        };
        create(dir)
    }
}

/// Context rooted in a fresh temp directory, deleted on drop.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("deadlines_test_{}", uuid::Uuid::new_v4()));
        if let Err(e) = fs::create_dir_all(&root) {
            panic!("cannot create test root {}: {}", root.display(), e);
        }
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn dir(&self, kind: DirKind) -> Result<PathBuf> {
        create(self.root.join(kind.subdir()))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_override_root_layout() {
        let tmp = TestContext::new();
        let ctx = StandardContext::new(Some(tmp.root.clone()));
        assert_eq!(ctx.get_data_dir().unwrap(), tmp.root.join("data"));
        assert_eq!(
            ctx.get_config_file_path().unwrap(),
            tmp.root.join("config").join("config.toml")
        );
        assert_eq!(
            ctx.get_store_dir().unwrap(),
            tmp.root.join("data").join("store")
        );
        assert!(tmp.root.join("data").join("store").is_dir());
        assert_eq!(
            ctx.get_log_path(),
            Some(tmp.root.join("cache").join("deadlines.log"))
        );
    }

    #[test]
    fn test_context_root_is_removed_on_drop() {
        let root = {
            let ctx = TestContext::new();
            ctx.get_store_dir().unwrap();
            ctx.root.clone()
        };
        assert!(!root.exists());
    }

    #[test]
    #[serial]
    fn test_root_from_env_var() {
        let tmp = TestContext::new();
        let previous = std::env::var_os(ROOT_ENV_VAR);
        unsafe {
            std::env::set_var(ROOT_ENV_VAR, &tmp.root);
        }

        let ctx = StandardContext::from_env(None);
        assert_eq!(ctx.override_root(), Some(&tmp.root));

        // The explicit flag wins over the variable
        let explicit = tmp.root.join("explicit");
        let ctx = StandardContext::from_env(Some(explicit.clone()));
        assert_eq!(ctx.override_root(), Some(&explicit));

        unsafe {
            match previous {
                Some(v) => std::env::set_var(ROOT_ENV_VAR, v),
                None => std::env::remove_var(ROOT_ENV_VAR),
            }
        }
    }
}
