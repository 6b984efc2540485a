// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The schema registry (`§4.8`, `§5`): loads `.yaml`/`.yml` files
//! recursively from a directory, then compiles and caches each schema's
//! type system on first use. Two maps — raw definitions and compiled type
//! systems — each behind their own reader/writer lock, mirroring the
//! codec registry in `linksystem::LinkSystem`.

use crate::definition::LexiconDefinition;
use crate::kind::{compile_kind, validate_kind, Kind};
use crate::Error;
use dagipld::Ipld;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub struct Registry {
    definitions: RwLock<HashMap<String, LexiconDefinition>>,
    compiled: RwLock<HashMap<String, Arc<Kind>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursively loads every `.yaml`/`.yml` file under `root`, each
    /// becoming one [`LexiconDefinition`] keyed by its `id`. A later file
    /// with the same `id` replaces an earlier one.
    pub fn load_dir(&self, root: &Path) -> Result<usize, Error> {
        let mut loaded = 0;
        for path in collect_yaml_files(root)? {
            let contents = std::fs::read_to_string(&path)?;
            let definition: LexiconDefinition = serde_yaml::from_str(&contents)?;
            tracing::debug!(id = %definition.id, path = %path.display(), "loaded schema definition");
            self.definitions
                .write()
                .unwrap()
                .insert(definition.id.clone(), definition);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn get_definition(&self, schema_id: &str) -> Result<LexiconDefinition, Error> {
        self.definitions
            .read()
            .unwrap()
            .get(schema_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(schema_id.to_string()))
    }

    /// Returns the compiled type system for `schema_id`, compiling and
    /// caching it on first call. Double-checks the cache after acquiring
    /// the write lock so concurrent first-callers never compile twice.
    pub fn compile(&self, schema_id: &str) -> Result<Arc<Kind>, Error> {
        if let Some(kind) = self.compiled.read().unwrap().get(schema_id) {
            return Ok(kind.clone());
        }

        let mut compiled = self.compiled.write().unwrap();
        if let Some(kind) = compiled.get(schema_id) {
            return Ok(kind.clone());
        }

        let definition = self.get_definition(schema_id)?;
        let kind = Arc::new(compile_kind(&definition.schema, schema_id)?);
        compiled.insert(schema_id.to_string(), kind.clone());
        tracing::debug!(id = schema_id, "compiled schema type system");
        Ok(kind)
    }

    /// Validates `value` against `schema_id`'s compiled type system.
    pub fn validate(&self, schema_id: &str, value: &Ipld) -> Result<(), Error> {
        let kind = self.compile(schema_id)?;
        validate_kind(value, &kind, &mut Vec::new())
    }
}

fn collect_yaml_files(root: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            ) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn write_schema(dir: &Path, filename: &str, contents: &str) {
        std::fs::write(dir.join(filename), contents).unwrap();
    }

    #[test]
    fn loads_and_validates_a_struct_schema() {
        let dir = tempdir().unwrap();
        write_schema(
            dir.path(),
            "post.yaml",
            r#"
id: app.example.post
version: 1
name: Post
description: A single post
status: active
schema:
  kind: struct
  fields:
    title:
      type: { kind: string }
    tags:
      type: { kind: list, items: { kind: string } }
      optional: true
"#,
        );

        let registry = Registry::new();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);

        let mut map = BTreeMap::new();
        map.insert("title".to_string(), Ipld::String("hello".into()));
        let value = Ipld::Map(map);
        registry.validate("app.example.post", &value).unwrap();
    }

    #[test]
    fn missing_required_field_reports_breadcrumb() {
        let dir = tempdir().unwrap();
        write_schema(
            dir.path(),
            "post.yaml",
            r#"
id: app.example.post
version: 1
name: Post
description: A single post
status: active
schema:
  kind: struct
  fields:
    title:
      type: { kind: string }
"#,
        );
        let registry = Registry::new();
        registry.load_dir(dir.path()).unwrap();

        let value = Ipld::Map(BTreeMap::new());
        let err = registry.validate("app.example.post", &value).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn loads_recursively_from_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_schema(
            &nested,
            "leaf.yml",
            r#"
id: app.example.leaf
version: 1
name: Leaf
description: A leaf schema
status: active
schema:
  kind: string
"#,
        );

        let registry = Registry::new();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
        registry.validate("app.example.leaf", &Ipld::String("x".into())).unwrap();
    }

    #[test]
    fn compile_is_cached_across_calls() {
        let dir = tempdir().unwrap();
        write_schema(
            dir.path(),
            "leaf.yaml",
            r#"
id: app.example.leaf
version: 1
name: Leaf
description: A leaf schema
status: active
schema:
  kind: string
"#,
        );
        let registry = Registry::new();
        registry.load_dir(dir.path()).unwrap();

        let first = registry.compile("app.example.leaf").unwrap();
        let second = registry.compile("app.example.leaf").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_schema_id_is_not_found() {
        let registry = Registry::new();
        let err = registry.validate("does.not.exist", &Ipld::Null).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
