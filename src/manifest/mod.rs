//! The project manifest (`package.json`) and its subset declarations.

mod filter;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::SubsetError;
use crate::runtime::Runtime;

pub use filter::{omit, pick};

/// Package name to version constraint, in declaration order.
pub type DependencyMap = Map<String, Value>;

pub const MANIFEST_FILE: &str = "package.json";

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";
const SUBSETS: &str = "subsets";

/// A parsed `package.json`.
///
/// Fields the installer does not care about are kept verbatim, in their
/// original order, so a rewritten manifest differs only in the dependency
/// sections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("Invalid JSON in package.json")?;
        let Value::Object(fields) = value else {
            bail!("package.json must contain a JSON object");
        };

        for key in [DEPENDENCIES, DEV_DEPENDENCIES, SUBSETS] {
            match fields.get(key) {
                None | Some(Value::Null) | Some(Value::Object(_)) => {}
                Some(_) => bail!("'{}' in package.json must be an object", key),
            }
        }

        Ok(Self { fields })
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let bytes = runtime.read(path)?;
        Self::parse(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Serialize with two-space indentation and a trailing newline.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&self.fields)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    #[tracing::instrument(skip(self, runtime))]
    pub fn save<R: Runtime>(&self, runtime: &R, path: &Path) -> Result<()> {
        runtime.write(path, &self.to_json_bytes()?)
    }

    pub fn dependencies(&self) -> DependencyMap {
        self.section(DEPENDENCIES)
    }

    pub fn dev_dependencies(&self) -> DependencyMap {
        self.section(DEV_DEPENDENCIES)
    }

    pub fn with_dependencies(self, deps: DependencyMap) -> Self {
        self.with_section(DEPENDENCIES, deps)
    }

    pub fn with_dev_dependencies(self, deps: DependencyMap) -> Self {
        self.with_section(DEV_DEPENDENCIES, deps)
    }

    /// Whether a `subsets` section is declared at all.
    pub fn has_subsets(&self) -> bool {
        self.subsets().is_some()
    }

    /// Look up a subset declaration by name.
    pub fn subset(&self, name: &str) -> Result<SubsetDeclaration, SubsetError> {
        let subsets = self.subsets().ok_or(SubsetError::MissingSubsets)?;
        match subsets.get(name) {
            None | Some(Value::Null) => Err(SubsetError::UnknownSubset {
                name: name.to_string(),
                available: self.subset_names().into_iter().map(String::from).collect(),
            }),
            Some(value) => SubsetDeclaration::deserialize(value)
                .map_err(|_| SubsetError::InvalidSubsetDeclaration(name.to_string())),
        }
    }

    /// Names of all declared subsets, in declaration order.
    pub fn subset_names(&self) -> Vec<&str> {
        self.subsets()
            .map(|s| s.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn subsets(&self) -> Option<&Map<String, Value>> {
        self.fields.get(SUBSETS).and_then(Value::as_object)
    }

    fn section(&self, key: &str) -> DependencyMap {
        self.fields
            .get(key)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    fn with_section(mut self, key: &str, deps: DependencyMap) -> Self {
        self.fields.insert(key.to_string(), Value::Object(deps));
        self
    }
}

/// How a subset selects development dependencies.
///
/// When both lists are present `include` takes precedence.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SubsetDeclaration {
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "name": "app",
        "version": "1.0.0",
        "dependencies": {"react": "^18"},
        "devDependencies": {"jest": "^1", "eslint": "^2"},
        "subsets": {
            "test": {"include": ["jest"]},
            "prod": {"exclude": ["eslint"]},
            "broken": {},
            "odd": {"include": "jest"}
        },
        "scripts": {"test": "jest"}
    }"#;

    #[test]
    fn test_parse_reads_sections() {
        let manifest = Manifest::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(manifest.dependencies().len(), 1);
        assert_eq!(manifest.dev_dependencies().len(), 2);
        assert!(manifest.has_subsets());
        assert_eq!(manifest.subset_names(), vec!["test", "prod", "broken", "odd"]);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(Manifest::parse(b"[1, 2]").is_err());
        assert!(Manifest::parse(b"not json").is_err());
        assert!(Manifest::parse(br#"{"devDependencies": ["jest"]}"#).is_err());
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let manifest = Manifest::parse(br#"{"name": "app"}"#).unwrap();
        assert!(manifest.dependencies().is_empty());
        assert!(manifest.dev_dependencies().is_empty());
        assert!(!manifest.has_subsets());
        assert!(manifest.subset_names().is_empty());
    }

    #[test]
    fn test_subset_lookup() {
        let manifest = Manifest::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(
            manifest.subset("test").unwrap(),
            SubsetDeclaration {
                include: Some(vec!["jest".into()]),
                exclude: None,
            }
        );
        assert_eq!(
            manifest.subset("missing"),
            Err(SubsetError::UnknownSubset {
                name: "missing".into(),
                available: vec!["test".into(), "prod".into(), "broken".into(), "odd".into()],
            })
        );
        assert_eq!(manifest.subset("broken").unwrap(), SubsetDeclaration::default());
        assert_eq!(
            manifest.subset("odd"),
            Err(SubsetError::InvalidSubsetDeclaration("odd".into()))
        );
    }

    #[test]
    fn test_subset_lookup_without_section() {
        let manifest = Manifest::parse(br#"{"name": "app"}"#).unwrap();
        assert_eq!(manifest.subset("test"), Err(SubsetError::MissingSubsets));
    }

    #[test]
    fn test_rewrite_keeps_other_fields_in_order() {
        let manifest = Manifest::parse(SAMPLE.as_bytes()).unwrap();
        let rewritten = manifest.with_dependencies(DependencyMap::new());

        let text = String::from_utf8(rewritten.to_json_bytes().unwrap()).unwrap();
        let name_at = text.find("\"name\"").unwrap();
        let deps_at = text.find("\"dependencies\"").unwrap();
        let scripts_at = text.find("\"scripts\"").unwrap();
        assert!(name_at < deps_at && deps_at < scripts_at);
        assert!(text.contains("\"dependencies\": {}"));
        assert!(text.starts_with("{\n  \"name\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_load_and_save_through_runtime() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/project/package.json");

        runtime
            .expect_read()
            .with(eq(path.clone()))
            .returning(|_| Ok(br#"{"devDependencies": {"jest": "^1"}}"#.to_vec()));

        runtime
            .expect_write()
            .withf(|p, contents| {
                p == Path::new("/project/package.json")
                    && String::from_utf8_lossy(contents).contains("\"jest\": \"^1\"")
            })
            .returning(|_, _| Ok(()));

        let manifest = Manifest::load(&runtime, &path).unwrap();
        manifest.save(&runtime, &path).unwrap();
    }
}
