//! Replay fixtures: successive tree revisions described in TOML
//!
//! ```toml
//! [flags]
//! update_runtime_references_on_commit = true
//!
//! [[revision]]
//! source = "react"
//! root = { id = "root", component = "Root", children = [
//!   { id = "a", props = { color = "red" }, runtime_reference = true },
//!   { id = "b" },
//! ] }
//!
//! [[revision]]
//! root = { id = "root2", family = "root", component = "Root", children = [
//!   { id = "a2", family = "a", props = { color = "blue" } },
//!   { id = "b", reuse = true },
//! ] }
//! ```
//!
//! Families are shared across revisions by name (`family`, defaulting to
//! `id`). `reuse` takes the previous revision's instance with that id
//! verbatim, subtree included, so it keeps its identity.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::RawFeatureFlags;
use crate::domain::{
    CommitSource, DomainError, Props, RuntimeReference, ShadowNode, ShadowNodeFamily,
    ShadowNodeRef, Tag,
};

const DEFAULT_COMPONENT: &str = "View";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    /// Flag overrides applied on top of the loaded settings
    #[serde(default)]
    pub flags: RawFeatureFlags,
    #[serde(default, rename = "revision")]
    pub revisions: Vec<RevisionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevisionSpec {
    #[serde(default = "default_source")]
    pub source: CommitSource,
    pub root: NodeSpec,
}

fn default_source() -> CommitSource {
    CommitSource::React
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: String,
    pub family: Option<String>,
    pub component: Option<String>,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    #[serde(default)]
    pub reuse: bool,
    #[serde(default)]
    pub runtime_reference: bool,
}

impl NodeSpec {
    fn declares_content(&self) -> bool {
        self.family.is_some()
            || self.component.is_some()
            || !self.props.is_empty()
            || !self.children.is_empty()
            || self.runtime_reference
    }

    fn family_name(&self) -> &str {
        self.family.as_deref().unwrap_or(&self.id)
    }
}

impl Fixture {
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        let fixture: Self = toml::from_str(content).map_err(|e| ApplicationError::Fixture {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if fixture.revisions.is_empty() {
            return Err(DomainError::NoRevisions.into());
        }
        Ok(fixture)
    }

    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let content = std::fs::read_to_string(path).with_path_context("read fixture", path)?;
        Self::parse(&content, path)
    }
}

/// One revision built from its spec.
#[derive(Debug, Clone)]
pub struct BuiltRevision {
    pub source: CommitSource,
    pub root: ShadowNodeRef,
    /// Fixture id of every instance reachable from `root`
    pub nodes: BTreeMap<String, ShadowNodeRef>,
    descendants: BTreeMap<String, Vec<String>>,
}

impl BuiltRevision {
    /// Fixture id of `node`, if it belongs to this revision.
    pub fn id_of(&self, node: &ShadowNodeRef) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(_, candidate)| Arc::ptr_eq(candidate, node))
            .map(|(id, _)| id.as_str())
    }

    pub fn contains_instance(&self, node: &ShadowNodeRef) -> bool {
        self.id_of(node).is_some()
    }
}

/// Builds successive revisions, sharing families and reused instances.
pub struct RevisionBuilder {
    families: HashMap<String, Arc<ShadowNodeFamily>>,
    references: BTreeMap<String, Arc<RuntimeReference>>,
    previous: Option<BuiltRevision>,
    next_tag: Tag,
    revision: usize,
}

impl Default for RevisionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionBuilder {
    pub fn new() -> Self {
        Self {
            families: HashMap::new(),
            references: BTreeMap::new(),
            previous: None,
            next_tag: 1,
            revision: 0,
        }
    }

    /// Runtime references bound so far, by family name.
    ///
    /// The builder plays the external runtime and keeps them alive.
    pub fn references(&self) -> &BTreeMap<String, Arc<RuntimeReference>> {
        &self.references
    }

    #[instrument(level = "debug", skip_all, fields(revision = self.revision))]
    pub fn build(&mut self, spec: &RevisionSpec) -> Result<BuiltRevision, DomainError> {
        let mut nodes = BTreeMap::new();
        let mut descendants = BTreeMap::new();
        let root = self.build_node(&spec.root, &mut nodes, &mut descendants)?;
        debug!(nodes = nodes.len(), "revision built");

        let built = BuiltRevision {
            source: spec.source,
            root,
            nodes,
            descendants,
        };
        self.previous = Some(built.clone());
        self.revision += 1;
        Ok(built)
    }

    fn build_node(
        &mut self,
        spec: &NodeSpec,
        nodes: &mut BTreeMap<String, ShadowNodeRef>,
        descendants: &mut BTreeMap<String, Vec<String>>,
    ) -> Result<ShadowNodeRef, DomainError> {
        if spec.reuse {
            return self.reuse_node(spec, nodes, descendants);
        }
        if nodes.contains_key(&spec.id) {
            return Err(self.duplicate(&spec.id));
        }

        let family = self.family_for(spec)?;
        let mut children = Vec::with_capacity(spec.children.len());
        let mut subtree = Vec::new();
        for child_spec in &spec.children {
            children.push(self.build_node(child_spec, nodes, descendants)?);
            subtree.push(child_spec.id.clone());
            if let Some(below) = descendants.get(&child_spec.id) {
                subtree.extend(below.iter().cloned());
            }
        }

        let node = ShadowNode::new(family, spec.props.clone(), children);
        let family_name = spec.family_name().to_string();
        match self.references.get(&family_name) {
            Some(reference) => node.link_runtime_reference(reference),
            None if spec.runtime_reference => {
                let reference = RuntimeReference::bind(&node);
                self.references.insert(family_name, reference);
            }
            None => {}
        }

        // a descendant may have claimed the same id meanwhile
        if nodes.contains_key(&spec.id) {
            return Err(self.duplicate(&spec.id));
        }
        nodes.insert(spec.id.clone(), Arc::clone(&node));
        descendants.insert(spec.id.clone(), subtree);
        Ok(node)
    }

    fn reuse_node(
        &self,
        spec: &NodeSpec,
        nodes: &mut BTreeMap<String, ShadowNodeRef>,
        descendants: &mut BTreeMap<String, Vec<String>>,
    ) -> Result<ShadowNodeRef, DomainError> {
        if spec.declares_content() {
            return Err(DomainError::ReuseWithContent(spec.id.clone()));
        }
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| DomainError::ReuseInFirstRevision(spec.id.clone()))?;
        let node = previous
            .nodes
            .get(&spec.id)
            .ok_or_else(|| DomainError::UnknownReuse {
                revision: self.revision,
                id: spec.id.clone(),
            })?;

        let below = previous.descendants.get(&spec.id).cloned().unwrap_or_default();
        for id in std::iter::once(&spec.id).chain(below.iter()) {
            if nodes.contains_key(id) {
                return Err(self.duplicate(id));
            }
            if let Some(instance) = previous.nodes.get(id) {
                nodes.insert(id.clone(), Arc::clone(instance));
            }
        }
        for id in &below {
            if let Some(grand) = previous.descendants.get(id) {
                descendants.insert(id.clone(), grand.clone());
            }
        }
        descendants.insert(spec.id.clone(), below);
        Ok(Arc::clone(node))
    }

    fn family_for(&mut self, spec: &NodeSpec) -> Result<Arc<ShadowNodeFamily>, DomainError> {
        let name = spec.family_name();
        let component = spec.component.as_deref().unwrap_or(DEFAULT_COMPONENT);

        if let Some(family) = self.families.get(name) {
            if family.component_name() != component {
                return Err(DomainError::ComponentMismatch {
                    family: name.to_string(),
                    expected: family.component_name().to_string(),
                    found: component.to_string(),
                });
            }
            return Ok(Arc::clone(family));
        }

        let family = ShadowNodeFamily::new(self.next_tag, component);
        self.next_tag += 1;
        self.families.insert(name.to_string(), Arc::clone(&family));
        Ok(family)
    }

    fn duplicate(&self, id: &str) -> DomainError {
        DomainError::DuplicateNode {
            revision: self.revision,
            id: id.to_string(),
        }
    }
}
