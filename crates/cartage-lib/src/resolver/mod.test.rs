use super::*;
use crate::testing::{InMemoryProvider, github, spec};

async fn resolve(
    provider: InMemoryProvider,
    cartfile: &str,
    options: ResolveOptions,
) -> Result<ResolvedCartfile, ResolutionError> {
    let cartfile = Cartfile::parse("Cartfile", cartfile).unwrap();
    Resolver::new(Arc::new(provider))
        .resolve(&cartfile, &options)
        .await
}

fn pins(resolved: &ResolvedCartfile) -> Vec<(String, String)> {
    resolved
        .iter()
        .map(|(dependency, version)| (dependency.name().to_string(), version.to_string()))
        .collect()
}

fn pin(name: &str, version: &str) -> (String, String) {
    (name.to_string(), version.to_string())
}

fn prior(entries: &[(&str, &str)]) -> Option<ResolvedCartfile> {
    Some(
        entries
            .iter()
            .map(|(repository, version)| (github(repository), PinnedVersion::new(*version)))
            .collect(),
    )
}

/// Moya-style fixture: a diamond on Result plus a few leaves
fn ecosystem() -> InMemoryProvider {
    let alamofire = github("Alamofire/Alamofire");
    let moya = github("Moya/Moya");
    let result = github("antitypical/Result");
    let reactive = github("ReactiveCocoa/ReactiveSwift");
    let rx = github("ReactiveX/RxSwift");

    InMemoryProvider::new()
        .with_version(&alamofire, "4.5.0", vec![])
        .with_version(&alamofire, "4.6.0", vec![])
        .with_version(&alamofire, "5.0.0", vec![])
        .with_version(&result, "3.0.0", vec![])
        .with_version(&result, "3.2.4", vec![])
        .with_version(&result, "4.0.0", vec![])
        .with_version(&rx, "4.1.2", vec![])
        .with_version(&reactive, "3.1.0", vec![(result.clone(), spec("~> 3.2"))])
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
}

#[tokio::test]
async fn test_resolves_newest_satisfying_versions() {
    let resolved = resolve(
        ecosystem(),
        "github \"Moya/Moya\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        pins(&resolved),
        vec![
            pin("Alamofire", "4.6.0"),
            pin("Moya", "10.0.2"),
            pin("ReactiveSwift", "3.1.0"),
            pin("Result", "3.2.4"),
            pin("RxSwift", "4.1.2"),
        ]
    );
}

#[tokio::test]
async fn test_resolution_is_deterministic() {
    let cartfile = "github \"Moya/Moya\"\ngithub \"antitypical/Result\"\n";
    let first = resolve(ecosystem(), cartfile, ResolveOptions::default())
        .await
        .unwrap();
    let second = resolve(ecosystem(), cartfile, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(first.to_string(), second.to_string());
}

#[tokio::test]
async fn test_every_pin_satisfies_all_requirements_on_it() {
    let root_a = github("test/A");
    let root_b = github("test/B");
    let shared = github("test/Shared");
    let provider = InMemoryProvider::new()
        .with_version(&root_a, "1.0.0", vec![(shared.clone(), spec("~> 1.0"))])
        .with_version(&root_b, "1.0.0", vec![(shared.clone(), spec(">= 1.1"))])
        .with_version(&shared, "1.0.0", vec![])
        .with_version(&shared, "1.1.0", vec![])
        .with_version(&shared, "1.2.0", vec![])
        .with_version(&shared, "2.0.0", vec![]);

    let resolved = resolve(
        provider,
        "github \"test/A\"\ngithub \"test/B\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(resolved.get(&shared).unwrap().as_str(), "1.2.0");
    assert_eq!(resolved.len(), 3);
}

#[tokio::test]
async fn test_shared_dependency_listed_once() {
    let resolved = resolve(
        ecosystem(),
        "github \"Moya/Moya\"\ngithub \"ReactiveCocoa/ReactiveSwift\"\ngithub \"antitypical/Result\" ~> 3.0\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    let names: Vec<String> = pins(&resolved).into_iter().map(|(name, _)| name).collect();
    let mut unique = names.clone();
    unique.dedup();
    assert_eq!(names, unique);
    assert_eq!(
        resolved
            .get(&github("antitypical/Result"))
            .unwrap()
            .as_str(),
        "3.2.4"
    );
}

#[tokio::test]
async fn test_cycle_is_reported() {
    let a = github("test/A");
    let b = github("test/B");
    let provider = InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![(b.clone(), spec("any"))])
        .with_version(&b, "1.0.0", vec![(a.clone(), spec("any"))]);

    let err = resolve(provider, "github \"test/A\"\n", ResolveOptions::default())
        .await
        .unwrap_err();
    match err {
        ResolutionError::DependencyCycle { cycle } => {
            assert_eq!(cycle, vec!["A", "B", "A"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_self_dependency_is_a_cycle() {
    let a = github("test/A");
    let provider = InMemoryProvider::new().with_version(&a, "1.0.0", vec![(a.clone(), spec("any"))]);

    let err = resolve(provider, "github \"test/A\"\n", ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("A → A"));
}

#[tokio::test]
async fn test_backtracks_to_older_version() {
    let a = github("test/A");
    let c = github("test/C");
    let provider = InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![(c.clone(), spec("~> 1.0"))])
        .with_version(&a, "2.0.0", vec![(c.clone(), spec("~> 2.0"))])
        .with_version(&c, "1.0.0", vec![])
        .with_version(&c, "1.3.0", vec![])
        .with_version(&c, "2.0.0", vec![]);

    let resolved = resolve(
        provider,
        "github \"test/A\"\ngithub \"test/C\" ~> 1.0\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(pins(&resolved), vec![pin("A", "1.0.0"), pin("C", "1.3.0")]);
}

#[tokio::test]
async fn test_unsatisfiable_constraint_names_requirers() {
    let a = github("test/A");
    let b = github("test/B");
    let provider = InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![])
        .with_version(&a, "2.0.0", vec![])
        .with_version(&b, "1.0.0", vec![(a.clone(), spec("~> 2.0"))]);

    let err = resolve(
        provider,
        "github \"test/A\" ~> 1.0\ngithub \"test/B\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap_err();

    match &err {
        ResolutionError::UnsatisfiableConstraint {
            dependency,
            constraints,
        } => {
            assert_eq!(*dependency, a);
            assert_eq!(constraints.len(), 2);
            assert_eq!(constraints[0].requirer, Requirer::Manifest("Cartfile".to_string()));
            assert_eq!(
                constraints[1].requirer,
                Requirer::Dependency(b.clone(), PinnedVersion::new("1.0.0"))
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("Cartfile requires ~> 1.0.0"));
    assert!(message.contains("B 1.0.0 requires ~> 2.0.0"));
}

#[tokio::test]
async fn test_no_matching_version() {
    let a = github("test/A");
    let provider = InMemoryProvider::new().with_version(&a, "1.0.0", vec![]);

    let err = resolve(provider, "github \"test/A\" >= 2.0\n", ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::UnsatisfiableConstraint { .. }));
}

#[tokio::test]
async fn test_prerelease_needs_explicit_request() {
    let a = github("test/A");
    let provider = || {
        InMemoryProvider::new()
            .with_version(&a, "1.0.0", vec![])
            .with_version(&a, "2.0.0-beta.1", vec![])
    };

    let resolved = resolve(provider(), "github \"test/A\"\n", ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolved.get(&a).unwrap().as_str(), "1.0.0");

    let resolved = resolve(
        provider(),
        "github \"test/A\" == 2.0.0-beta.1\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(resolved.get(&a).unwrap().as_str(), "2.0.0-beta.1");
}

#[tokio::test]
async fn test_prior_pin_kept_without_update() {
    let options = ResolveOptions {
        prior: prior(&[("Alamofire/Alamofire", "4.5.0")]),
        update: UpdatePolicy::None,
    };

    let resolved = resolve(ecosystem(), "github \"Alamofire/Alamofire\" ~> 4.0\n", options)
        .await
        .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Alamofire", "4.5.0")]);
}

#[tokio::test]
async fn test_prior_pin_replaced_when_forced() {
    let named = ResolveOptions {
        prior: prior(&[("Alamofire/Alamofire", "4.5.0")]),
        update: UpdatePolicy::only(["alamofire"]),
    };
    let resolved = resolve(ecosystem(), "github \"Alamofire/Alamofire\" ~> 4.0\n", named)
        .await
        .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Alamofire", "4.6.0")]);

    let everything = ResolveOptions {
        prior: prior(&[("Alamofire/Alamofire", "4.5.0")]),
        update: UpdatePolicy::All,
    };
    let resolved = resolve(ecosystem(), "github \"Alamofire/Alamofire\" ~> 4.0\n", everything)
        .await
        .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Alamofire", "4.6.0")]);
}

#[tokio::test]
async fn test_prior_pin_dropped_when_constraint_tightens() {
    let options = ResolveOptions {
        prior: prior(&[("Alamofire/Alamofire", "4.5.0")]),
        update: UpdatePolicy::None,
    };

    let resolved = resolve(ecosystem(), "github \"Alamofire/Alamofire\" >= 4.6\n", options)
        .await
        .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Alamofire", "5.0.0")]);
}

#[tokio::test]
async fn test_update_only_named_keeps_other_pins() {
    let options = ResolveOptions {
        prior: prior(&[
            ("Alamofire/Alamofire", "4.5.0"),
            ("antitypical/Result", "3.0.0"),
        ]),
        update: UpdatePolicy::only(["Result"]),
    };

    let resolved = resolve(
        ecosystem(),
        "github \"Alamofire/Alamofire\"\ngithub \"antitypical/Result\"\n",
        options,
    )
    .await
    .unwrap();
    assert_eq!(
        pins(&resolved),
        vec![pin("Alamofire", "4.5.0"), pin("Result", "4.0.0")]
    );
}

#[tokio::test]
async fn test_branch_reference_resolves_to_tip() {
    let networking = github("corp/Networking");
    let result = github("antitypical/Result");
    let provider = InMemoryProvider::new()
        .with_reference(&networking, "develop", "0f1e2d3c")
        .with_commit(&networking, "0f1e2d3c", vec![(result.clone(), spec("~> 3.0"))])
        .with_version(&result, "3.2.4", vec![]);

    let resolved = resolve(
        provider,
        "github \"corp/Networking\" \"develop\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        pins(&resolved),
        vec![pin("Networking", "0f1e2d3c"), pin("Result", "3.2.4")]
    );
}

#[tokio::test]
async fn test_branch_prior_commit_kept_only_at_tip() {
    let networking = github("corp/Networking");
    let provider = || {
        InMemoryProvider::new()
            .with_reference(&networking, "develop", "new0000")
            .with_commit(&networking, "old0000", vec![])
            .with_commit(&networking, "new0000", vec![])
    };
    let keep_all = |commit: &str| ResolveOptions {
        prior: prior(&[("corp/Networking", commit)]),
        update: UpdatePolicy::None,
    };

    let at_tip = resolve(provider(), "github \"corp/Networking\" \"develop\"\n", keep_all("new0000"))
        .await
        .unwrap();
    assert_eq!(at_tip.get(&networking).unwrap().as_str(), "new0000");

    // The branch moved since the last resolution
    let moved = resolve(provider(), "github \"corp/Networking\" \"develop\"\n", keep_all("old0000"))
        .await
        .unwrap();
    assert_eq!(moved.get(&networking).unwrap().as_str(), "new0000");
}

#[tokio::test]
async fn test_prior_commit_from_other_branch_is_replaced() {
    let networking = github("corp/Networking");
    let provider = InMemoryProvider::new()
        .with_reference(&networking, "develop", "dev0000")
        .with_reference(&networking, "release", "rel0000")
        .with_commit(&networking, "dev0000", vec![])
        .with_commit(&networking, "rel0000", vec![]);

    let resolved = resolve(
        provider,
        "github \"corp/Networking\" \"release\"\n",
        ResolveOptions {
            prior: prior(&[("corp/Networking", "dev0000")]),
            update: UpdatePolicy::None,
        },
    )
    .await
    .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Networking", "rel0000")]);
}

/// `A 1.0.0` needs `B` on `develop` while the Cartfile asks for `B ~> 1.0`
fn branch_over_tags() -> InMemoryProvider {
    let a = github("test/A");
    let b = github("test/B");
    InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![(b.clone(), spec("develop"))])
        .with_version(&b, "1.0.0", vec![])
        .with_version(&b, "1.1.0", vec![])
        .with_reference(&b, "develop", "deadbeef")
        .with_commit(&b, "deadbeef", vec![])
}

#[tokio::test]
async fn test_branch_requirement_wins_in_either_manifest_order() {
    let reference_first = resolve(
        branch_over_tags(),
        "github \"test/A\"\ngithub \"test/B\" ~> 1.0\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();
    let tags_first = resolve(
        branch_over_tags(),
        "github \"test/B\" ~> 1.0\ngithub \"test/A\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();

    let expected = vec![pin("A", "1.0.0"), pin("B", "deadbeef")];
    assert_eq!(pins(&reference_first), expected);
    assert_eq!(pins(&tags_first), expected);
}

#[tokio::test]
async fn test_prior_tag_does_not_satisfy_branch_requirement() {
    let resolved = resolve(
        branch_over_tags(),
        "github \"test/B\" ~> 1.0\ngithub \"test/A\"\n",
        ResolveOptions {
            prior: prior(&[("test/A", "1.0.0"), ("test/B", "1.0.0")]),
            update: UpdatePolicy::None,
        },
    )
    .await
    .unwrap();
    assert_eq!(pins(&resolved), vec![pin("A", "1.0.0"), pin("B", "deadbeef")]);
}

#[tokio::test]
async fn test_branch_tip_not_used_once_branch_requirement_is_gone() {
    let a = github("test/A");
    let b = github("test/B");
    // A 2.0.0 needs B on develop but also a C that does not exist
    let provider = InMemoryProvider::new()
        .with_version(
            &a,
            "2.0.0",
            vec![(b.clone(), spec("develop")), (github("test/C"), spec("~> 1.0"))],
        )
        .with_version(&a, "1.0.0", vec![])
        .with_version(&b, "1.0.0", vec![])
        .with_version(&b, "1.1.0", vec![])
        .with_reference(&b, "develop", "deadbeef")
        .with_commit(&b, "deadbeef", vec![]);

    let resolved = resolve(
        provider,
        "github \"test/B\" ~> 1.0\ngithub \"test/A\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(pins(&resolved), vec![pin("A", "1.0.0"), pin("B", "1.1.0")]);
}

#[tokio::test]
async fn test_conflicting_references_are_unsatisfiable() {
    let a = github("test/A");
    let networking = github("corp/Networking");
    let provider = InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![(networking.clone(), spec("master"))])
        .with_reference(&networking, "develop", "0f1e2d3c")
        .with_commit(&networking, "0f1e2d3c", vec![]);

    let err = resolve(
        provider,
        "github \"corp/Networking\" \"develop\"\ngithub \"test/A\"\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::UnsatisfiableConstraint { ref dependency, .. } if *dependency == networking
    ));
}

#[tokio::test]
async fn test_binary_dependency_has_no_transitive_requirements() {
    let framework = Dependency::binary("https://example.com/Framework.json");
    let provider = InMemoryProvider::new()
        .with_binary_version(&framework, "1.0.0")
        .with_binary_version(&framework, "1.1.0");

    let resolved = resolve(
        provider,
        "binary \"https://example.com/Framework.json\" ~> 1.0\n",
        ResolveOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(pins(&resolved), vec![pin("Framework", "1.1.0")]);
}

#[tokio::test]
async fn test_provider_failure_aborts() {
    let a = github("test/A");
    let broken = github("test/Broken");
    let provider = InMemoryProvider::new()
        .with_version(&a, "1.0.0", vec![(broken.clone(), spec("any"))])
        .with_failure(&broken);

    let err = resolve(provider, "github \"test/A\"\n", ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Provider { .. }));
}

#[tokio::test]
async fn test_versions_are_queried_once_per_dependency() {
    let provider = Arc::new(ecosystem());
    let cartfile = Cartfile::parse(
        "Cartfile",
        "github \"Moya/Moya\"\ngithub \"antitypical/Result\"\n",
    )
    .unwrap();

    Resolver::new(provider.clone())
        .resolve(&cartfile, &ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(provider.version_queries(), 5);
}
