//! Project contents: the files of the edited project and their parsed trees.

use crate::element::{Component, ElementChild, all_uids_in_components, find_element_at_path};
use crate::error::{CoreError, CoreResult};
use crate::id::Uid;
use crate::path::StaticElementPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// What one `import` statement brings in from a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDetails {
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: BTreeSet<String>,
}

/// Module specifier → imported names.
pub type Imports = BTreeMap<String, ImportDetails>;

/// Union of two import sets. Where both name a default or namespace
/// binding, `added` wins.
pub fn merge_imports(existing: &Imports, added: &Imports) -> Imports {
    let mut merged = existing.clone();
    for (module, details) in added {
        let entry = merged.entry(module.clone()).or_default();
        if details.default.is_some() {
            entry.default.clone_from(&details.default);
        }
        if details.namespace.is_some() {
            entry.namespace.clone_from(&details.namespace);
        }
        entry.named.extend(details.named.iter().cloned());
    }
    merged
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseSuccess {
    pub components: Vec<Component>,
    pub imports: Imports,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub code: String,
    pub parsed: Option<ParseSuccess>,
    /// Code changed and the tree is stale.
    pub needs_parsing: bool,
    /// Tree changed and the code is stale.
    pub needs_printing: bool,
}

impl ProjectFile {
    pub fn parsed(components: Vec<Component>) -> Self {
        Self {
            code: String::new(),
            parsed: Some(ParseSuccess {
                components,
                imports: Imports::new(),
            }),
            needs_parsing: false,
            needs_printing: false,
        }
    }

    pub fn components(&self) -> &[Component] {
        self.parsed.as_ref().map_or(&[], |p| p.components.as_slice())
    }
}

/// All UIDs in a project, plus every UID seen more than once with the
/// files each occurrence lives in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniqueUids {
    pub all: HashSet<Uid>,
    pub duplicates: BTreeMap<Uid, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContents {
    files: BTreeMap<String, ProjectFile>,
}

impl ProjectContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, file: ProjectFile) -> Self {
        self.files.insert(path.to_string(), file);
        self
    }

    pub fn insert(&mut self, path: &str, file: ProjectFile) {
        self.files.insert(path.to_string(), file);
    }

    pub fn remove(&mut self, path: &str) -> Option<ProjectFile> {
        self.files.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&ProjectFile> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &ProjectFile)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Files that changed code but have not been parsed since.
    pub fn files_needing_parse(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|(_, f)| f.needs_parsing)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.files
            .values()
            .flat_map(|f| f.components())
            .find(|c| c.name == name)
    }

    /// File holding the component whose root starts `path`'s last part.
    pub fn file_for_element(&self, path: &StaticElementPath) -> Option<&str> {
        let root = *path.last_part()?.first()?;
        self.files
            .iter()
            .find(|(_, f)| f.components().iter().any(|c| c.root.uid() == root))
            .map(|(k, _)| k.as_str())
    }

    pub fn find_element(&self, path: &StaticElementPath) -> Option<&ElementChild> {
        let file = self.file_for_element(path)?;
        find_element_at_path(self.files.get(file)?.components(), path)
    }

    /// Edit the parsed tree of the file that owns `path`. A successful edit
    /// marks the file as needing a print.
    pub fn modify_parsed<R>(
        &mut self,
        path: &StaticElementPath,
        f: impl FnOnce(&mut Vec<Component>, &mut Imports) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let file_path = self
            .file_for_element(path)
            .map(str::to_string)
            .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        let file = self
            .files
            .get_mut(&file_path)
            .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        let parsed = file
            .parsed
            .as_mut()
            .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        let result = f(&mut parsed.components, &mut parsed.imports)?;
        file.needs_printing = true;
        Ok(result)
    }

    pub fn all_unique_uids(&self) -> UniqueUids {
        let mut seen: BTreeMap<Uid, Vec<String>> = BTreeMap::new();
        for (file_path, file) in &self.files {
            for uid in all_uids_in_components(file.components()) {
                seen.entry(uid).or_default().push(file_path.clone());
            }
        }
        let mut result = UniqueUids::default();
        for (uid, files) in seen {
            result.all.insert(uid);
            if files.len() > 1 {
                result.duplicates.insert(uid, files);
            }
        }
        result
    }
}
