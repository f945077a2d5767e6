//! Extension discovery - Lists candidate extension names from a directory

use std::path::Path;

use crate::application::errors::ExtensionError;

/// Entry stems that never name an extension: the build cache and the module initializer
pub const IGNORED: &[&str] = &["target", "mod"];

/// Candidate extension names in `directory`, in directory-listing order.
///
/// Each entry contributes its file stem, so `queue/` and `queue.yaml` both name
/// `queue`; duplicates are reported once. Hidden and ignored entries are skipped.
pub async fn discover(directory: impl AsRef<Path>) -> Result<Vec<String>, ExtensionError> {
    let directory = directory.as_ref();
    let mut entries =
        tokio::fs::read_dir(directory)
            .await
            .map_err(|source| ExtensionError::Discovery {
                path: directory.to_path_buf(),
                source,
            })?;

    let mut names: Vec<String> = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(e)) => e,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('.') || IGNORED.contains(&stem) {
            continue;
        }
        if !names.iter().any(|n| n == stem) {
            names.push(stem.to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    #[tokio::test]
    async fn test_discover_skips_ignored_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("queue")).unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("meta.yaml"), "").unwrap();
        fs::write(dir.path().join("mod.rs"), "").unwrap();

        let names: HashSet<String> = discover(dir.path()).await.unwrap().into_iter().collect();
        assert_eq!(names, HashSet::from(["queue".to_string(), "meta".to_string()]));
    }

    #[tokio::test]
    async fn test_discover_dedupes_stems() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("queue")).unwrap();
        fs::write(dir.path().join("queue.yaml"), "").unwrap();

        assert_eq!(discover(dir.path()).await.unwrap(), vec!["queue".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ExtensionError::Discovery { .. }));
    }
}
