//! The tool registry, loaded once at startup from a JSON file.

use std::fs;
use std::path::Path;

use crate::domain::Tool;

/// In-memory catalog of downloadable tools.
///
/// A missing or unparseable registry degrades to an empty catalog so the
/// service still starts; it just has nothing to offer.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<Tool>,
}

impl Catalog {
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "tool registry not readable, starting with an empty catalog");
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<Tool>>(&raw) {
            Ok(tools) => {
                tracing::info!(path = %path.display(), tools = tools.len(), "tool registry loaded");
                Self { tools }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "tool registry malformed, starting with an empty catalog");
                Self::default()
            }
        }
    }

    pub fn all(&self) -> &[Tool] {
        &self.tools
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn load_reads_registry_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "name": "Tie-Out Helper",
                "slug": "tie-out-helper",
                "description": "Ties out schedules",
                "category": "Audit",
                "type": "excel",
                "instructions": "Open the workbook",
                "dateAdded": "2026-01-10",
                "version": "1.2.0",
                "files": ["tie-out-helper.xlsm"]
            }}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path());
        assert_eq!(catalog.all().len(), 1);
        assert_eq!(catalog.by_slug("tie-out-helper").unwrap().name, "Tie-Out Helper");
        assert!(catalog.by_slug("nope").is_none());
    }

    #[test]
    fn missing_registry_yields_empty_catalog() {
        let catalog = Catalog::load(Path::new("/definitely/not/here/registry.json"));
        assert!(catalog.all().is_empty());
    }

    #[test]
    fn malformed_registry_yields_empty_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json ]").unwrap();

        let catalog = Catalog::load(file.path());
        assert!(catalog.all().is_empty());
    }
}
