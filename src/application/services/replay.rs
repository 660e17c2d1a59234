//! Replay service
//!
//! Commits the revisions of a fixture one after another to a shadow tree and
//! snapshots the resulting mount state after each commit.

use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::fixture::{BuiltRevision, Fixture, RevisionBuilder};
use crate::application::render::{node_label, TreeNodeConvert};
use crate::application::ApplicationResult;
use crate::config::{FeatureFlags, Settings};
use crate::domain::{
    CommitSource, DomainError, PropagationOptions, RevisionNumber, ShadowNodeRef, ShadowTree,
};

/// Mount state of one fixture node instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub id: String,
    pub label: String,
    pub mounted: bool,
    pub has_been_mounted: bool,
}

/// Where a runtime reference points after a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceState {
    /// Family name the reference was bound for
    pub family: String,
    /// Fixture id of the target, `None` if it is not part of the current
    /// or previous revision
    pub target: Option<String>,
    /// True if the target is an instance of the current revision
    pub current: bool,
}

/// Snapshot after one commit.
#[derive(Debug, Clone)]
pub struct RevisionReport {
    pub number: RevisionNumber,
    pub source: CommitSource,
    pub tree: Tree<String>,
    /// Every node of the committed revision
    pub nodes: Vec<NodeState>,
    /// Instances of the previous revision that the commit replaced or removed
    pub retired: Vec<NodeState>,
    pub references: Vec<ReferenceState>,
}

impl RevisionReport {
    pub fn node(&self, id: &str) -> Option<&NodeState> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn retired_node(&self, id: &str) -> Option<&NodeState> {
        self.retired.iter().find(|n| n.id == id)
    }

    pub fn reference(&self, family: &str) -> Option<&ReferenceState> {
        self.references.iter().find(|r| r.family == family)
    }
}

#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Effective flags (settings with fixture overrides applied)
    pub flags: FeatureFlags,
    pub revisions: Vec<RevisionReport>,
}

/// Service replaying fixtures through mount-flag propagation.
pub struct ReplayService {
    settings: Settings,
}

impl ReplayService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[instrument(level = "debug", skip_all, fields(revisions = fixture.revisions.len()))]
    pub fn replay(&self, fixture: &Fixture) -> ApplicationResult<ReplayReport> {
        let flags = self.settings.flags.merge(&fixture.flags);
        let options = PropagationOptions::from(&flags);
        info!("flags: {}", flags.summary());

        let mut specs = fixture.revisions.iter();
        let first_spec = specs.next().ok_or(DomainError::NoRevisions)?;

        let mut builder = RevisionBuilder::new();
        let first = builder.build(first_spec)?;
        let mut tree = ShadowTree::new(Arc::clone(&first.root), options);

        let mut revisions = vec![self.snapshot(0, first.source, &first, None, &builder)];
        let mut previous = first;

        for spec in specs {
            let built = builder.build(spec)?;
            let number = tree
                .commit(Arc::clone(&built.root), spec.source, options)
                .number;
            debug!(number, "revision committed");

            revisions.push(self.snapshot(number, spec.source, &built, Some(&previous), &builder));
            previous = built;
        }

        Ok(ReplayReport { flags, revisions })
    }

    fn snapshot(
        &self,
        number: RevisionNumber,
        source: CommitSource,
        current: &BuiltRevision,
        previous: Option<&BuiltRevision>,
        builder: &RevisionBuilder,
    ) -> RevisionReport {
        let show_props = self.settings.replay.show_props;

        let nodes = current
            .root
            .descendants()
            .filter_map(|node| {
                current
                    .id_of(&node)
                    .map(|id| node_state(id, &node, current, show_props))
            })
            .collect();

        let retired = match previous {
            Some(previous) if self.settings.replay.show_retired => previous
                .root
                .descendants()
                .filter(|node| !current.contains_instance(node))
                .filter_map(|node| {
                    previous
                        .id_of(&node)
                        .map(|id| node_state(id, &node, previous, show_props))
                })
                .collect(),
            _ => Vec::new(),
        };

        let references = builder
            .references()
            .iter()
            .map(|(family, reference)| {
                let target = reference.target();
                let current_id = target.as_ref().and_then(|t| current.id_of(t));
                let previous_id = target
                    .as_ref()
                    .and_then(|t| previous.and_then(|p| p.id_of(t)));
                ReferenceState {
                    family: family.clone(),
                    target: current_id.or(previous_id).map(str::to_string),
                    current: current_id.is_some(),
                }
            })
            .collect();

        RevisionReport {
            number,
            source,
            tree: current.root.to_tree_string(current, show_props),
            nodes,
            retired,
            references,
        }
    }
}

fn node_state(
    id: &str,
    node: &ShadowNodeRef,
    revision: &BuiltRevision,
    show_props: bool,
) -> NodeState {
    NodeState {
        id: id.to_string(),
        label: node_label(node, revision, show_props),
        mounted: node.is_mounted(),
        has_been_mounted: node.has_been_mounted(),
    }
}
