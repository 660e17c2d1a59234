//! End-to-end tests for ReplayService

use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use treemount::application::services::ReplayService;
use treemount::application::Fixture;
use treemount::config::Settings;
use treemount::domain::CommitSource;
use treemount::util::testing::init_test_setup;

fn fixture(source: &str, flag: Option<bool>) -> Fixture {
    let flags = match flag {
        Some(value) => format!("[flags]\nupdate_runtime_references_on_commit = {}\n", value),
        None => String::new(),
    };
    let content = format!(
        r#"{}
[[revision]]
root = {{ id = "root", component = "Root", children = [
  {{ id = "a", props = {{ color = "red" }}, runtime_reference = true }},
  {{ id = "b", children = [{{ id = "b1" }}] }},
  {{ id = "c" }},
] }}

[[revision]]
source = "{}"
root = {{ id = "root2", family = "root", component = "Root", children = [
  {{ id = "a2", family = "a", props = {{ color = "blue" }} }},
  {{ id = "b", reuse = true }},
] }}
"#,
        flags, source
    );
    Fixture::parse(&content, Path::new("replay.toml")).unwrap()
}

#[test]
fn given_fixture_when_replaying_then_first_revision_is_fully_mounted() {
    init_test_setup();
    let service = ReplayService::new(Settings::default());

    let report = service.replay(&fixture("react", None)).unwrap();

    let first = &report.revisions[0];
    assert_eq!(first.number, 0);
    assert!(first.nodes.iter().all(|n| n.mounted && n.has_been_mounted));
    assert_eq!(first.nodes.len(), 5);
    assert!(first.retired.is_empty());
    let reference = first.reference("a").unwrap();
    assert_eq!(reference.target.as_deref(), Some("a"));
    assert!(reference.current);
}

#[test]
fn given_second_revision_when_replaying_then_replaced_and_removed_nodes_are_retired() {
    init_test_setup();
    let service = ReplayService::new(Settings::default());

    let report = service.replay(&fixture("react", None)).unwrap();

    let second = &report.revisions[1];
    assert_eq!(second.number, 1);
    assert_eq!(second.source, CommitSource::React);
    for id in ["root2", "a2", "b", "b1"] {
        assert!(second.node(id).unwrap().mounted, "{} should be mounted", id);
    }
    let retired: Vec<_> = second.retired.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(retired, vec!["root", "a", "c"]);
    assert!(second.retired.iter().all(|n| !n.mounted && n.has_been_mounted));
}

#[test]
fn given_fixture_flag_when_replaying_then_it_overrides_settings() {
    init_test_setup();
    let service = ReplayService::new(Settings::default());

    let report = service.replay(&fixture("react", Some(true))).unwrap();

    assert!(report.flags.update_runtime_references_on_commit);
    assert!(!service.settings().flags.update_runtime_references_on_commit);
    let reference = report.revisions[1].reference("a").unwrap();
    assert_eq!(reference.target.as_deref(), Some("a2"));
    assert!(reference.current);
}

#[rstest]
#[case("react", Some(false))]
#[case("animation-end-sync", Some(true))]
#[case("react-revision-merge", Some(true))]
#[case("unknown", Some(true))]
fn given_refresh_not_applicable_when_replaying_then_reference_stays_on_old_instance(
    #[case] source: &str,
    #[case] flag: Option<bool>,
) {
    init_test_setup();
    let service = ReplayService::new(Settings::default());

    let report = service.replay(&fixture(source, flag)).unwrap();

    let reference = report.revisions[1].reference("a").unwrap();
    assert_eq!(reference.target.as_deref(), Some("a"));
    assert!(!reference.current);
}

#[test]
fn given_settings_flag_when_fixture_is_silent_then_settings_apply() {
    init_test_setup();
    let mut settings = Settings::default();
    settings.flags.update_runtime_references_on_commit = true;
    let service = ReplayService::new(settings);

    let report = service.replay(&fixture("react", None)).unwrap();

    assert_eq!(
        report.revisions[1].reference("a").unwrap().target.as_deref(),
        Some("a2")
    );
}

#[test]
fn given_show_retired_disabled_when_replaying_then_no_retired_nodes_are_listed() {
    init_test_setup();
    let mut settings = Settings::default();
    settings.replay.show_retired = false;
    let service = ReplayService::new(settings);

    let report = service.replay(&fixture("react", None)).unwrap();

    assert!(report.revisions[1].retired.is_empty());
}

#[test]
fn given_show_props_when_replaying_then_tree_labels_carry_props() {
    init_test_setup();
    let service = ReplayService::new(Settings::default());

    let report = service.replay(&fixture("react", None)).unwrap();

    let rendered = report.revisions[1].tree.to_string();
    assert!(rendered.contains("● a2 View#"), "tree:\n{}", rendered);
    assert!(rendered.contains("{color=blue}"), "tree:\n{}", rendered);
    assert!(!rendered.contains('○'), "tree:\n{}", rendered);
}

#[test]
fn given_show_props_disabled_when_replaying_then_labels_omit_props() {
    init_test_setup();
    let mut settings = Settings::default();
    settings.replay.show_props = false;
    let service = ReplayService::new(settings);

    let report = service.replay(&fixture("react", None)).unwrap();

    assert!(!report.revisions[0].tree.to_string().contains("color"));
    assert!(!report.revisions[0].node("a").unwrap().label.contains("color"));
}

#[test]
fn given_fixture_file_when_loading_and_replaying_then_commits_every_revision() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("swap.toml");
    fs::write(
        &path,
        r#"
[[revision]]
root = { id = "root", children = [{ id = "x" }, { id = "y" }] }

[[revision]]
root = { id = "root2", family = "root", children = [{ id = "y2", family = "y" }, { id = "x2", family = "x" }] }

[[revision]]
source = "unknown"
root = { id = "root3", family = "root" }
"#,
    )
    .unwrap();

    let fixture = Fixture::load(&path).unwrap();
    let report = ReplayService::new(Settings::default())
        .replay(&fixture)
        .unwrap();

    assert_eq!(report.revisions.len(), 3);
    let second = &report.revisions[1];
    assert!(second.node("x2").unwrap().mounted);
    assert!(second.node("y2").unwrap().mounted);
    assert!(!second.retired_node("x").unwrap().mounted);
    let third = &report.revisions[2];
    assert_eq!(third.number, 2);
    assert_eq!(third.nodes.len(), 1);
    assert_eq!(third.retired.len(), 3);
    assert!(third.retired.iter().all(|n| !n.mounted));
}
