use super::*;
use crate::testing::{InMemoryProvider, github};

const CURRENT_SHA: &str = "2ea246ae4573538886ffb946d70d141583443734";
const NEXT_SHA: &str = "809b8eb20f4b6b9e805b62de3084fbc7fcde54cc";

fn provider() -> InMemoryProvider {
    let mut provider = InMemoryProvider::new().with_version(&github("test/github1"), "v1.0.0", vec![]);
    for version in ["v1.0.0", "v1.1.0", "v2.0.0"] {
        provider = provider.with_version(&github("test/github2"), version, vec![]);
    }
    for version in ["v1.0.0", "v1.1.0", "v1.2.0", "v2.0.0", "v2.0.1"] {
        provider = provider.with_version(&github("test/github3"), version, vec![]);
    }
    for version in ["v1.0.0", "v1.2.0", "v2.0.0", "v2.0.1", "v3.0.0-beta.1", "v3.0.0"] {
        provider = provider.with_version(&github("test/github4"), version, vec![]);
    }
    for repository in ["test/github5", "test/github6"] {
        provider = provider.with_version(&github(repository), "v1.0.0", vec![]);
    }

    provider
        .with_reference(&github("test/github5"), "development", CURRENT_SHA)
        .with_reference(&github("test/github6"), "development", NEXT_SHA)
}

const CARTFILE: &str = r#"
github "test/github1"
github "test/github2"
github "test/github3" ~> 2.0
github "test/github4" ~> 2.0
github "test/github5" "development"
github "test/github6" "development"
"#;

const RESOLVED: &str = r#"github "test/github1" "v1.0.0"
github "test/github2" "v1.0.0"
github "test/github3" "v2.0.0"
github "test/github4" "v2.0.0"
github "test/github5" "2ea246ae4573538886ffb946d70d141583443734"
github "test/github6" "2ea246ae4573538886ffb946d70d141583443734"
"#;

async fn report(provider: InMemoryProvider, cartfile: &str, resolved: &str) -> Vec<OutdatedDependency> {
    let cartfile = Cartfile::parse("Cartfile", cartfile).unwrap();
    let resolved: ResolvedCartfile = resolved.parse().unwrap();
    OutdatedAnalyzer::new(Arc::new(provider))
        .analyze(&cartfile, &resolved)
        .await
        .unwrap()
}

fn row(outdated: &OutdatedDependency) -> (&str, &str, &str, &str) {
    (
        outdated.dependency.name(),
        outdated.current.as_str(),
        outdated.applicable.as_str(),
        outdated.latest.as_str(),
    )
}

#[tokio::test]
async fn test_outdated_report() {
    let report = report(provider(), CARTFILE, RESOLVED).await;
    let rows: Vec<_> = report.iter().map(row).collect();

    assert_eq!(
        rows,
        vec![
            ("github2", "v1.0.0", "v2.0.0", "v2.0.0"),
            ("github3", "v2.0.0", "v2.0.1", "v2.0.1"),
            ("github4", "v2.0.0", "v2.0.1", "v3.0.0"),
            ("github6", CURRENT_SHA, NEXT_SHA, "v1.0.0"),
        ]
    );
}

#[tokio::test]
async fn test_up_to_date_pins_are_omitted() {
    let report = report(
        provider(),
        "github \"test/github1\"\n",
        "github \"test/github1\" \"v1.0.0\"\n",
    )
    .await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_branch_at_tip_ignores_newer_tags() {
    let report = report(
        provider(),
        "github \"test/github5\" \"development\"\n",
        &format!("github \"test/github5\" \"{CURRENT_SHA}\"\n"),
    )
    .await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_transitive_pins_use_any() {
    let report = report(
        provider(),
        "github \"test/github1\"\n",
        "github \"test/github1\" \"v1.0.0\"\ngithub \"test/github4\" \"v2.0.0\"\n",
    )
    .await;

    let rows: Vec<_> = report.iter().map(row).collect();
    assert_eq!(rows, vec![("github4", "v2.0.0", "v3.0.0", "v3.0.0")]);
}

#[tokio::test]
async fn test_reference_without_tags_reports_tip_as_latest() {
    let dependency = Dependency::git("https://example.com/Internal/Networking.git");
    let provider = InMemoryProvider::new().with_reference(&dependency, "main", NEXT_SHA);

    let report = report(
        provider,
        "git \"https://example.com/Internal/Networking.git\" \"main\"\n",
        &format!("git \"https://example.com/Internal/Networking.git\" \"{CURRENT_SHA}\"\n"),
    )
    .await;

    let rows: Vec<_> = report.iter().map(row).collect();
    assert_eq!(rows, vec![("Networking", CURRENT_SHA, NEXT_SHA, NEXT_SHA)]);
}

#[tokio::test]
async fn test_opaque_pin_without_reference_is_skipped() {
    let report = report(
        provider(),
        "github \"test/github2\"\n",
        &format!("github \"test/github2\" \"{CURRENT_SHA}\"\n"),
    )
    .await;
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_provider_failure_aborts_report() {
    let broken = github("Broken/Broken");
    let cartfile = Cartfile::parse("Cartfile", "github \"Broken/Broken\"\n").unwrap();
    let mut resolved = ResolvedCartfile::new();
    resolved.insert(broken.clone(), PinnedVersion::new("1.0.0"));

    let err = OutdatedAnalyzer::new(Arc::new(InMemoryProvider::new().with_failure(&broken)))
        .analyze(&cartfile, &resolved)
        .await
        .unwrap_err();
    assert!(matches!(err, OutdatedError::Provider { .. }));
}

#[test]
fn test_display() {
    let outdated = OutdatedDependency {
        dependency: github("Alamofire/Alamofire"),
        current: PinnedVersion::new("4.5.0"),
        applicable: PinnedVersion::new("4.6.0"),
        latest: PinnedVersion::new("5.0.0"),
    };
    assert_eq!(
        outdated.to_string(),
        "Alamofire \"4.5.0\" -> \"4.6.0\" (Latest: \"5.0.0\")"
    );
}
