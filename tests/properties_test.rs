//! Library-level tests of the console's core laws: search identity and
//! subset behavior, folder path normalization, tree parenting, scenario
//! edge derivation, and the retry/reconnect schedules.

use std::time::Duration;

use stubdeck::client::{RECONNECT_DELAY, RetryPolicy};
use stubdeck::models::scenario::{ScenarioGraph, StateKind};
use stubdeck::models::tree::{NodeKind, build_folder_tree};
use stubdeck::models::{Item, Scenario, StubMapping};
use stubdeck::search;
use stubdeck::tui::reconnect_delay;

fn mapping(id: &str, url: &str, folder: Option<&str>) -> StubMapping {
    let mut value = serde_json::json!({
        "id": id,
        "request": { "method": "GET", "url": url },
        "response": { "status": 200 }
    });
    if let Some(folder) = folder {
        value["metadata"] = serde_json::json!({ "folder": folder });
    }
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_empty_search_is_identity() {
    let input = vec![
        mapping("a", "/users", None),
        mapping("b", "/orders", None),
        mapping("c", "/items", None),
    ];
    let expected: Vec<String> = input.iter().map(|m| m.key().to_string()).collect();
    let output = search::filter(input, "", false);
    let got: Vec<String> = output.iter().map(|m| m.key().to_string()).collect();
    assert_eq!(got, expected);
}

#[test]
fn test_search_results_are_an_ordered_subset() {
    let input = vec![
        mapping("a", "/users/1", None),
        mapping("b", "/orders", None),
        mapping("c", "/users/2", None),
    ];
    let output = search::filter(input, "users", false);
    let got: Vec<&str> = output.iter().map(|m| m.key()).collect();
    assert_eq!(got, vec!["a", "c"]);
}

#[test]
fn test_folder_paths_normalize_to_same_identity() {
    // "/a/b/" and "a/b" and "a.b" must yield folder "a" then "a/b".
    for spelling in ["/a/b/", "a/b", "a.b"] {
        let tree = build_folder_tree(vec![mapping("m", "/m", Some(spelling))]);
        assert!(tree.find("a").is_some(), "spelling {:?}", spelling);
        assert!(tree.find("a/b").is_some(), "spelling {:?}", spelling);
        let item = tree.find("m").unwrap();
        assert_eq!(tree.get(item).unwrap().parent, tree.find("a/b"));
    }
}

#[test]
fn test_find_after_insert_parents_to_given_node() {
    let mut tree = build_folder_tree(vec![mapping("existing", "/e", None)]);
    let parent = tree.find("existing").unwrap();
    tree.insert(parent, NodeKind::Item(mapping("fresh", "/f", None)))
        .unwrap();
    let found = tree.find("fresh").unwrap();
    assert_eq!(tree.get(found).unwrap().parent, Some(parent));
}

#[test]
fn test_null_required_state_yields_single_any_edge() {
    let mut transition = mapping("m", "/x", None);
    transition.scenario_name = Some("s".to_string());
    transition.new_scenario_state = Some("B".to_string());
    let scenario = Scenario {
        id: "s".to_string(),
        name: "s".to_string(),
        state: "Started".to_string(),
        possible_states: vec!["Started".to_string(), "B".to_string()],
        mappings: vec![transition],
    };

    let graph = ScenarioGraph::derive(&scenario);
    assert_eq!(graph.links.len(), 1);
    let link = &graph.links[0];
    assert_eq!(graph.nodes[link.from].kind, StateKind::Any);
    assert_eq!(graph.nodes[link.to].name, "B");
}

#[test]
fn test_reconnect_delay_is_fixed_forever() {
    for attempt in [1, 2, 10, 1000, u32::MAX] {
        assert_eq!(reconnect_delay(attempt), RECONNECT_DELAY);
    }
    assert_eq!(RECONNECT_DELAY, Duration::from_secs(5));
}

#[test]
fn test_retry_schedule_is_linear_and_bounded() {
    let policy = RetryPolicy::default();
    let transient = stubdeck::Error::Server {
        status: 503,
        status_text: String::new(),
    };
    assert_eq!(
        policy.next_delay(&transient, 1),
        Some(Duration::from_millis(1000))
    );
    assert_eq!(
        policy.next_delay(&transient, 2),
        Some(Duration::from_millis(2000))
    );
    assert_eq!(
        policy.next_delay(&transient, 3),
        Some(Duration::from_millis(3000))
    );
    assert_eq!(policy.next_delay(&transient, 4), None);
}

#[test]
fn test_excluded_statuses_never_retry() {
    let policy = RetryPolicy::default();
    for status in [400, 422] {
        let err = stubdeck::Error::Server {
            status,
            status_text: String::new(),
        };
        assert_eq!(policy.next_delay(&err, 1), None, "status {}", status);
    }
}
