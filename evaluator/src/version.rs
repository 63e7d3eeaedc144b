use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_VERSIONS_DIR: &str = "versions";

/// Numbered model directories (`v0`, `v1`, ...) under a root directory.
pub struct VersionManager {
    root_path: PathBuf,
}

impl VersionManager {
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root_path = root.as_ref().to_path_buf();
        fs::create_dir_all(&root_path)?;
        Ok(Self { root_path })
    }

    pub fn get_all_versions(&self) -> io::Result<Vec<u32>> {
        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root_path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(num) = name.strip_prefix('v').and_then(|s| s.parse::<u32>().ok()) {
                    versions.push(num);
                }
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    pub fn get_latest_version(&self) -> io::Result<Option<u32>> {
        let versions = self.get_all_versions()?;
        Ok(versions.last().cloned())
    }

    pub fn create_next_version(&self) -> io::Result<u32> {
        let next = match self.get_latest_version()? {
            Some(latest) => latest + 1,
            None => 0,
        };

        let path = self.version_path(next);
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Version v{} already exists", next),
            ));
        }
        fs::create_dir_all(&path)?;
        Ok(next)
    }

    pub fn version_path(&self, version: u32) -> PathBuf {
        self.root_path.join(format!("v{}", version))
    }

    pub fn file_path(&self, version: u32, filename: &str) -> PathBuf {
        self.version_path(version).join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_numbered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let manager = VersionManager::new(dir.path()).unwrap();

        assert_eq!(manager.get_latest_version().unwrap(), None);
        assert_eq!(manager.create_next_version().unwrap(), 0);
        assert_eq!(manager.create_next_version().unwrap(), 1);

        // Stray entries are ignored
        fs::create_dir_all(dir.path().join("scratch")).unwrap();
        fs::write(dir.path().join("v7"), b"not a directory").unwrap();

        assert_eq!(manager.get_all_versions().unwrap(), vec![0, 1]);
        assert_eq!(
            manager.file_path(1, "model.safetensors"),
            dir.path().join("v1").join("model.safetensors")
        );
    }
}
