use anyhow::{Result, bail};
use home::home_dir;
use sha2::{Digest, Sha256};
use single_instance::SingleInstance;
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_graphload_dir() -> Result<PathBuf> {
    let home = home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    let dir = home.join(".graphload");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Lock name derived from the database location, so loads into different
/// databases do not block each other.
pub fn lock_name(database_path: &Path) -> String {
    let absolute = fs::canonicalize(database_path).unwrap_or_else(|_| database_path.to_path_buf());
    let digest = Sha256::digest(absolute.to_string_lossy().as_bytes());
    format!("graphload-{}", &hex::encode(digest)[..16])
}

// On macOS file-based lock is used so we need a different handling.
#[cfg(target_os = "macos")]
fn single_instance(name: &str) -> Result<SingleInstance> {
    let path = get_graphload_dir()?.join(name);
    let path = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Lock path is not valid UTF-8: {}", path.display()))?;
    Ok(SingleInstance::new(path)?)
}

#[cfg(not(target_os = "macos"))]
fn single_instance(name: &str) -> Result<SingleInstance> {
    Ok(SingleInstance::new(name)?)
}

/// Exclusive hold on one database for the duration of a load.
pub fn lock_database(database_path: &Path) -> Result<SingleInstance> {
    let instance = single_instance(&lock_name(database_path))?;
    if !instance.is_single() {
        bail!(
            "Another graphload process is loading into {}. Wait for it to finish and try again.",
            database_path.display()
        );
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_name_is_stable_per_path() {
        let a = lock_name(Path::new("/data/a.kuzu"));

        assert_eq!(a, lock_name(Path::new("/data/a.kuzu")));
        assert_ne!(a, lock_name(Path::new("/data/b.kuzu")));
        assert!(a.starts_with("graphload-"));
        assert_eq!(a.len(), "graphload-".len() + 16);
    }

    #[test]
    fn test_second_lock_on_same_database_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let database = dir.path().join("graph.kuzu");

        let _held = lock_database(&database).unwrap();

        assert!(lock_database(&database).is_err());
    }
}
