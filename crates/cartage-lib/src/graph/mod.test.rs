use super::*;
use crate::cartfile::PinnedVersion;
use crate::testing::{InMemoryProvider, github, spec};

fn names(dependencies: impl IntoIterator<Item = Dependency>) -> Vec<String> {
    dependencies
        .into_iter()
        .map(|dependency| dependency.name().to_string())
        .collect()
}

/// Seven resolved entries: Moya's tree plus an unrelated Quick/Nimble pair
async fn seven_entry_graph() -> BuildGraph {
    let alamofire = github("Alamofire/Alamofire");
    let moya = github("Moya/Moya");
    let nimble = github("Quick/Nimble");
    let quick = github("Quick/Quick");
    let reactive = github("ReactiveCocoa/ReactiveSwift");
    let result = github("antitypical/Result");
    let rx = github("ReactiveX/RxSwift");

    let provider = InMemoryProvider::new()
        .with_version(&alamofire, "4.6.0", vec![])
        .with_version(
            &moya,
            "10.0.2",
            vec![
                (alamofire.clone(), spec("~> 4.1")),
                (reactive.clone(), spec("~> 3.0")),
                (result.clone(), spec("~> 3.0")),
                (rx.clone(), spec("~> 4.0")),
            ],
        )
        .with_version(
            &nimble,
            "7.0.3",
            vec![(github("mattgallagher/CwlPreconditionTesting"), spec("~> 1.1"))],
        )
        .with_version(&quick, "1.2.0", vec![(nimble.clone(), spec("~> 7.0"))])
        .with_version(&reactive, "3.1.0", vec![(result.clone(), spec("~> 3.2"))])
        .with_version(&result, "3.2.4", vec![])
        .with_version(&rx, "4.1.2", vec![]);

    let resolved: ResolvedCartfile = [
        (alamofire, "4.6.0"),
        (moya, "10.0.2"),
        (nimble, "7.0.3"),
        (quick, "1.2.0"),
        (reactive, "3.1.0"),
        (result, "3.2.4"),
        (rx, "4.1.2"),
    ]
    .into_iter()
    .map(|(dependency, version)| (dependency, PinnedVersion::new(version)))
    .collect();

    BuildGraph::from_resolved(&resolved, &provider).await.unwrap()
}

#[tokio::test]
async fn test_transitive_dependencies_of_moya() {
    let graph = seven_entry_graph().await;
    assert_eq!(graph.len(), 7);

    let transitive = graph.transitive_dependencies(&["Moya"]).unwrap();
    assert_eq!(
        names(transitive),
        vec!["Alamofire", "ReactiveSwift", "Result", "RxSwift"]
    );
}

#[tokio::test]
async fn test_transitive_dependencies_exclude_roots() {
    let graph = seven_entry_graph().await;

    let transitive = graph
        .transitive_dependencies(&["ReactiveSwift", "Result"])
        .unwrap();
    assert!(transitive.is_empty());

    let transitive = graph.transitive_dependencies(&["quick"]).unwrap();
    assert_eq!(names(transitive), vec!["Nimble"]);
}

#[tokio::test]
async fn test_requirements_outside_resolved_set_are_ignored() {
    let graph = seven_entry_graph().await;
    let nimble = graph.find("Nimble").unwrap().clone();

    assert!(graph.dependencies_of(&nimble).is_empty());
    assert!(graph.find("CwlPreconditionTesting").is_err());
}

#[tokio::test]
async fn test_full_build_order_is_stable() {
    let graph = seven_entry_graph().await;

    let empty: [&str; 0] = [];
    let order = graph.build_plan(&empty).unwrap();
    assert_eq!(
        names(order),
        vec![
            "Alamofire",
            "Nimble",
            "Quick",
            "Result",
            "ReactiveSwift",
            "RxSwift",
            "Moya"
        ]
    );
}

#[tokio::test]
async fn test_build_plan_for_named_dependency() {
    let graph = seven_entry_graph().await;

    let order = graph.build_plan(&["moya"]).unwrap();
    assert_eq!(
        names(order),
        vec!["Alamofire", "Result", "ReactiveSwift", "RxSwift", "Moya"]
    );
}

#[tokio::test]
async fn test_build_plan_unknown_name() {
    let graph = seven_entry_graph().await;

    let err = graph.build_plan(&["Kingfisher"]).unwrap_err();
    assert!(matches!(err, GraphError::UnknownDependency { name } if name == "Kingfisher"));
}

#[test]
fn test_chain_builds_leaf_first() {
    let root = github("app/Root");
    let mid = github("app/Mid");
    let leaf = github("app/Leaf");

    let mut graph = BuildGraph::new();
    graph.add_dependency(&root, &mid);
    graph.add_dependency(&mid, &leaf);

    let subset: BTreeSet<Dependency> = [root, mid, leaf].into_iter().collect();
    let order = graph.build_order(&subset).unwrap();
    assert_eq!(names(order), vec!["Leaf", "Mid", "Root"]);
}

#[test]
fn test_duplicate_edges_are_collapsed() {
    let app = github("app/App");
    let core = github("app/Core");

    let mut graph = BuildGraph::new();
    graph.add_dependency(&app, &core);
    graph.add_dependency(&app, &core);
    graph.add_node(core.clone());

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.dependencies_of(&app).len(), 1);

    let subset: BTreeSet<Dependency> = [app, core].into_iter().collect();
    assert_eq!(names(graph.build_order(&subset).unwrap()), vec!["Core", "App"]);
}

#[test]
fn test_cycle_is_internal_error() {
    let a = github("x/A");
    let b = github("x/B");

    let mut graph = BuildGraph::new();
    graph.add_dependency(&a, &b);
    graph.add_dependency(&b, &a);

    let subset: BTreeSet<Dependency> = [a, b].into_iter().collect();
    match graph.build_order(&subset).unwrap_err() {
        GraphError::InternalCycle { cycle } => assert_eq!(cycle, vec!["A", "B"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_provider_failure_while_building() {
    let broken = github("Broken/Broken");
    let provider = InMemoryProvider::new().with_failure(&broken);

    let mut resolved = ResolvedCartfile::new();
    resolved.insert(broken, PinnedVersion::new("1.0.0"));

    let err = BuildGraph::from_resolved(&resolved, &provider)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Provider { .. }));
}
