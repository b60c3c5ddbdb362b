//! Loads challenge definitions.
//!
//! Definitions are hierarchical JSON: a catalog holds categories, a category
//! holds hotkeys, a hotkey has a description and a solution string.
//!
//! ```json
//! { "name": "vscode", "categories": [
//!     { "name": "Editing", "hotkeys": [
//!         { "description": "Copy line", "keys": "Ctrl+C" } ] } ] }
//! ```

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::challenge::Challenge;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalogs");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no built-in catalog named '{0}'")]
    UnknownBuiltin(String),

    #[error("no challenges to play")]
    Empty,
}

#[derive(Deserialize, Debug)]
struct CatalogFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Deserialize, Debug)]
struct CategoryEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    hotkeys: Vec<HotkeyEntry>,
}

#[derive(Deserialize, Debug)]
struct HotkeyEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    keys: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub name: String,
    challenges: Vec<Challenge>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            challenges: Vec::new(),
        }
    }

    /// Parses a definition. Entries without a category name, description or
    /// keys are skipped.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Catalog::new(file.name);

        for category in file.categories {
            if category.name.is_empty() {
                debug!("skipping unnamed category");
                continue;
            }
            for hotkey in category.hotkeys {
                catalog.add(&category.name, &hotkey.description, &hotkey.keys);
            }
        }

        Ok(catalog)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// A catalog shipped inside the binary
    pub fn builtin(name: &str) -> Result<Self, CatalogError> {
        let json = CATALOG_DIR
            .get_file(format!("{name}.json"))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| CatalogError::UnknownBuiltin(name.to_string()))?;
        Self::from_json(json)
    }

    pub fn builtin_names() -> Vec<String> {
        CATALOG_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .filter_map(|s| s.to_str())
            .map(str::to_string)
            .sorted()
            .collect()
    }

    /// Adds a challenge unless one of the fields is empty.
    pub fn add(&mut self, category: &str, description: &str, keys: &str) -> bool {
        if category.is_empty() || description.is_empty() || keys.is_empty() {
            debug!(category, description, keys, "skipping incomplete hotkey");
            return false;
        }
        self.challenges
            .push(Challenge::from_keys(category, description, keys));
        true
    }

    /// Distinct category names in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        self.challenges
            .iter()
            .map(|c| c.category.as_str())
            .unique()
            .collect()
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn in_category(&self, category: &str) -> Vec<Challenge> {
        if category.is_empty() {
            return Vec::new();
        }
        self.challenges
            .iter()
            .filter(|c| c.category == category)
            .cloned()
            .collect()
    }

    pub fn in_categories<S: AsRef<str>>(&self, categories: &[S]) -> Vec<Challenge> {
        self.challenges
            .iter()
            .filter(|c| categories.iter().any(|cat| cat.as_ref() == c.category))
            .cloned()
            .collect()
    }

    /// Challenges to play: the given categories, or everything when none are given.
    pub fn select<S: AsRef<str>>(&self, categories: &[S]) -> Result<Vec<Challenge>, CatalogError> {
        let selected = if categories.is_empty() {
            self.challenges.clone()
        } else {
            self.in_categories(categories)
        };

        if selected.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
    {
        "name": "sample",
        "categories": [
            { "name": "Editing", "hotkeys": [
                { "description": "Copy", "keys": "Ctrl+C" },
                { "description": "", "keys": "Ctrl+V" },
                { "description": "Comment", "keys": "Ctrl+K,Ctrl+C" }
            ]},
            { "name": "", "hotkeys": [
                { "description": "Orphan", "keys": "F1" }
            ]},
            { "name": "Git", "hotkeys": [
                { "description": "Commit", "keys": "'git commit'" },
                { "description": "No keys" }
            ]}
        ]
    }
    "#;

    #[test]
    fn test_from_json_skips_incomplete_entries() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.name, "sample");
        assert_eq!(catalog.challenges().len(), 3);

        let descriptions: Vec<&str> = catalog
            .challenges()
            .iter()
            .map(|c| c.description.as_str())
            .collect();
        assert_eq!(descriptions, ["Copy", "Comment", "Commit"]);
    }

    #[test]
    fn test_solutions_are_parsed() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let commit = &catalog.challenges()[2];
        assert_eq!(
            commit.solutions.alternatives()[0].steps()[0].literal_text(),
            Some("git commit")
        );
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.categories(), ["Editing", "Git"]);
    }

    #[test]
    fn test_category_queries() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.in_category("Editing").len(), 2);
        assert!(catalog.in_category("").is_empty());
        assert!(catalog.in_category("Missing").is_empty());

        assert_eq!(catalog.in_categories(&["Git", "Editing"]).len(), 3);
        assert!(catalog.in_categories::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_select() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.select::<String>(&[]).unwrap().len(), 3);
        assert_eq!(catalog.select(&["Git"]).unwrap().len(), 1);
        assert_matches!(catalog.select(&["Missing"]), Err(CatalogError::Empty));
    }

    #[test]
    fn test_invalid_json() {
        assert_matches!(Catalog::from_json("{ nope"), Err(CatalogError::Json(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.challenges().len(), 3);

        assert_matches!(
            Catalog::from_path("/definitely/not/here.json"),
            Err(CatalogError::Io { .. })
        );
    }

    #[test]
    fn test_builtin_catalogs_load() {
        let names = Catalog::builtin_names();
        assert!(names.contains(&"vscode".to_string()));
        assert!(names.contains(&"shell".to_string()));

        for name in names {
            let catalog = Catalog::builtin(&name).unwrap();
            assert!(!catalog.challenges().is_empty(), "{name} is empty");
            assert!(catalog
                .challenges()
                .iter()
                .all(|c| c.solutions.is_playable()));
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert_matches!(
            Catalog::builtin("emacs"),
            Err(CatalogError::UnknownBuiltin(name)) if name == "emacs"
        );
    }

    #[test]
    fn test_add() {
        let mut catalog = Catalog::new("manual");
        assert!(catalog.add("Editing", "Copy", "Ctrl+C"));
        assert!(!catalog.add("Editing", "Paste", ""));
        assert_eq!(catalog.challenges().len(), 1);
    }
}
