//! Manifest loading through resolution, build order and outdated report

use cartage_lib::cartfile::{ManifestError, ResolvedCartfile, load_combined_cartfile};
use cartage_lib::graph::BuildGraph;
use cartage_lib::outdated::OutdatedAnalyzer;
use cartage_lib::resolver::{ResolutionError, ResolveOptions, Resolver, UpdatePolicy};
use cartage_lib::testing::{InMemoryProvider, github, spec};
use std::sync::Arc;
use tempfile::TempDir;

fn provider() -> Arc<InMemoryProvider> {
    let alamofire = github("Alamofire/Alamofire");
    let moya = github("Moya/Moya");
    let nimble = github("Quick/Nimble");
    let quick = github("Quick/Quick");
    let result = github("antitypical/Result");

    Arc::new(
        InMemoryProvider::new()
            .with_version(&alamofire, "4.5.0", vec![])
            .with_version(&alamofire, "4.6.0", vec![])
            .with_version(&result, "3.2.4", vec![])
            .with_version(&nimble, "7.0.3", vec![])
            .with_version(&nimble, "8.0.0", vec![])
            .with_version(&quick, "1.2.0", vec![(nimble.clone(), spec("~> 7.0"))])
            .with_version(
                &moya,
                "10.0.2",
                vec![
                    (alamofire.clone(), spec("~> 4.1")),
                    (result.clone(), spec("~> 3.0")),
                ],
            ),
    )
}

fn project(cartfile: &str, private: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("Cartfile"), cartfile).unwrap();
    std::fs::write(temp_dir.path().join("Cartfile.private"), private).unwrap();
    temp_dir
}

#[tokio::test]
async fn test_private_dependencies_resolve_with_shared_ones() {
    let temp_dir = project(
        "github \"Moya/Moya\" ~> 10.0\n",
        "# test-only\ngithub \"Quick/Quick\"\n",
    );
    let cartfile = load_combined_cartfile(temp_dir.path()).unwrap();
    assert_eq!(cartfile.len(), 2);

    let provider = provider();
    let resolver = Resolver::new(provider.clone());
    let resolved = resolver
        .resolve(&cartfile, &ResolveOptions::default())
        .await
        .unwrap();

    let text = resolved.to_string();
    assert_eq!(
        text,
        "github \"Alamofire/Alamofire\" \"4.6.0\"\n\
         github \"Moya/Moya\" \"10.0.2\"\n\
         github \"Quick/Nimble\" \"7.0.3\"\n\
         github \"Quick/Quick\" \"1.2.0\"\n\
         github \"antitypical/Result\" \"3.2.4\"\n"
    );

    // Same inputs, same bytes
    let again = resolver
        .resolve(&cartfile, &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(again.to_string(), text);

    // Written and read back as the next run's prior pins
    let path = temp_dir.path().join("Cartfile.resolved");
    resolved.write_to(&path).unwrap();
    let prior = ResolvedCartfile::from_file(&path).unwrap();
    assert_eq!(prior, resolved);

    let graph = BuildGraph::from_resolved(&prior, provider.as_ref()).await.unwrap();
    let order: Vec<String> = graph
        .build_plan(&["Quick", "Moya"])
        .unwrap()
        .iter()
        .map(|dependency| dependency.name().to_string())
        .collect();
    assert_eq!(order, vec!["Alamofire", "Nimble", "Quick", "Result", "Moya"]);

    let outdated = OutdatedAnalyzer::new(provider.clone())
        .analyze(&cartfile, &prior)
        .await
        .unwrap();
    let names: Vec<&str> = outdated
        .iter()
        .map(|outdated| outdated.dependency.name())
        .collect();
    assert_eq!(names, vec!["Nimble"]);
    assert_eq!(outdated[0].applicable.as_str(), "8.0.0");
}

#[tokio::test]
async fn test_prior_pins_survive_partial_update() {
    let temp_dir = project("github \"Moya/Moya\"\n", "");
    let cartfile = load_combined_cartfile(temp_dir.path()).unwrap();
    let prior: ResolvedCartfile = "github \"Alamofire/Alamofire\" \"4.5.0\"\n\
                                   github \"Moya/Moya\" \"10.0.2\"\n\
                                   github \"antitypical/Result\" \"3.2.4\"\n"
        .parse()
        .unwrap();

    let options = ResolveOptions {
        prior: Some(prior),
        update: UpdatePolicy::only(["Result"]),
    };
    let resolved = Resolver::new(provider())
        .resolve(&cartfile, &options)
        .await
        .unwrap();

    let (_, alamofire) = resolved.get_by_name("Alamofire").unwrap();
    assert_eq!(alamofire.as_str(), "4.5.0");
}

#[tokio::test]
async fn test_duplicates_are_reported_before_resolution() {
    let temp_dir = project(
        "github \"Moya/Moya\"\n",
        "git \"git@github.com:Moya/Moya.git\"\n",
    );

    match load_combined_cartfile(temp_dir.path()).unwrap_err() {
        ManifestError::DuplicateDependencies { duplicates } => {
            assert_eq!(duplicates.len(), 1);
            assert_eq!(duplicates[0].dependency.name(), "Moya");
            assert_eq!(
                duplicates[0].locations,
                vec!["Cartfile".to_string(), "Cartfile.private".to_string()]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unsatisfiable_root_fails_whole_resolution() {
    let temp_dir = project("github \"Moya/Moya\" ~> 11.0\n", "");
    let cartfile = load_combined_cartfile(temp_dir.path()).unwrap();

    let err = Resolver::new(provider())
        .resolve(&cartfile, &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::UnsatisfiableConstraint { .. }));
    assert!(err.to_string().contains("Moya"));
}
