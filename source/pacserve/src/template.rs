//! The template reader: walks a directory tree and loads every regular
//! file as an uninterpreted PAC template.

use std::path::{Path, PathBuf};

use crate::error::TemplateReadError;
use crate::pathnorm::normalize_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub filename: String,
    pub content: String,
}

/// Recursively reads every regular file under `root`, keyed by its
/// root-relative, normalised path.
///
/// An unreadable root directory is a hard failure. Per-file read
/// failures are logged and skipped, counted as minor problems.
pub async fn read_templates(root: &Path) -> Result<(Vec<Template>, usize), TemplateReadError> {
    let relative_paths = list_files(root, root).await.map_err(|source| TemplateReadError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut templates = Vec::new();
    let mut problems = 0usize;

    for relative in relative_paths {
        let full_path = root.join(&relative);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => templates.push(Template {
                filename: normalize_path(&relative.to_string_lossy()),
                content,
            }),
            Err(e) => {
                tracing::warn!(path = %full_path.display(), error = %e, "unable to read PAC template");
                problems += 1;
            }
        }
    }

    Ok((templates, problems))
}

/// Lists files under `dir`, returned as paths relative to `root`.
fn list_files<'a>(
    root: &'a Path,
    dir: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<Vec<PathBuf>>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                files.extend(list_files(root, &path).await?);
            } else if file_type.is_file() {
                let relative = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_path_buf();
                files.push(relative);
            }
        }

        Ok(files)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_nested_templates() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("branch")).unwrap();
        std::fs::write(dir.path().join("default.pac"), "// default").unwrap();
        std::fs::write(dir.path().join("branch/a.pac"), "// branch a").unwrap();

        let (mut templates, problems) = read_templates(dir.path()).await.unwrap();
        templates.sort_by(|a, b| a.filename.cmp(&b.filename));

        assert_eq!(problems, 0);
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].filename, "branch/a.pac");
        assert_eq!(templates[1].filename, "default.pac");
    }

    #[tokio::test]
    async fn missing_directory_is_hard_failure() {
        let result = read_templates(Path::new("/nonexistent/pacs")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_directory_yields_no_templates() {
        let dir = tempdir().unwrap();
        let (templates, problems) = read_templates(dir.path()).await.unwrap();
        assert!(templates.is_empty());
        assert_eq!(problems, 0);
    }
}
