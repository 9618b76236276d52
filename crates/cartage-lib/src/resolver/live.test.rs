use super::*;
use crate::cartfile::VersionSpecifier;
use crate::sync::FetchCache;
use crate::testing::MockMirror;
use mockito::Server;
use tempfile::TempDir;

fn provider(mirror: MockMirror) -> (LiveProvider, Arc<MockMirror>) {
    let mirror = Arc::new(mirror);
    let synchronizer = Synchronizer::new(mirror.clone(), Arc::new(FetchCache::new()));
    (LiveProvider::new(synchronizer, Client::new()), mirror)
}

const BINARY_JSON: &str = r#"{
    "1.0.0": "https://example.com/1.0.0/Framework.zip",
    "1.1.0": "https://example.com/1.1.0/Framework.zip"
}"#;

#[tokio::test]
async fn test_versions_are_semantic_tags_newest_first() {
    let dependency = Dependency::github("ReactiveX/RxSwift");
    let (provider, mirror) = provider(
        MockMirror::new()
            .with_tag(&dependency, "v1.0.0", "aaa")
            .with_tag(&dependency, "nightly", "bbb")
            .with_tag(&dependency, "2.0.0", "ccc")
            .with_tag(&dependency, "1.1", "ddd"),
    );

    let versions = provider.versions(&dependency).await.unwrap();
    let versions: Vec<&str> = versions.iter().map(PinnedVersion::as_str).collect();

    assert_eq!(versions, vec!["2.0.0", "1.1", "v1.0.0"]);
    assert_eq!(mirror.clone_count(), 1);
}

#[tokio::test]
async fn test_requirements_read_cartfile_at_revision() {
    let dependency = Dependency::github("Moya/Moya");
    let (provider, _) = provider(
        MockMirror::new()
            .with_tag(&dependency, "10.0.2", "abc")
            .with_file(
                &dependency,
                "10.0.2",
                "Cartfile",
                "github \"Alamofire/Alamofire\" ~> 4.1\ngithub \"ReactiveX/RxSwift\" ~> 4.0\n",
            ),
    );

    let requirements = provider
        .requirements(&dependency, &PinnedVersion::new("10.0.2"))
        .await
        .unwrap();

    assert!(!requirements.binary_only);
    let names: Vec<&str> = requirements
        .dependencies
        .iter()
        .map(|(dependency, _)| dependency.name())
        .collect();
    assert_eq!(names, vec!["Alamofire", "RxSwift"]);
    assert!(matches!(
        requirements.dependencies[0].1,
        VersionSpecifier::CompatibleWith(_)
    ));
}

#[tokio::test]
async fn test_missing_cartfile_means_no_requirements() {
    let dependency = Dependency::github("antitypical/Result");
    let (provider, _) = provider(MockMirror::new().with_tag(&dependency, "3.2.4", "abc"));

    let requirements = provider
        .requirements(&dependency, &PinnedVersion::new("3.2.4"))
        .await
        .unwrap();
    assert_eq!(requirements, Requirements::default());
}

#[tokio::test]
async fn test_invalid_cartfile_names_dependency_and_version() {
    let dependency = Dependency::github("Broken/Manifest");
    let (provider, _) = provider(
        MockMirror::new()
            .with_tag(&dependency, "1.0.0", "abc")
            .with_file(&dependency, "1.0.0", "Cartfile", "svn \"nope\"\n"),
    );

    let err = provider
        .requirements(&dependency, &PinnedVersion::new("1.0.0"))
        .await
        .unwrap_err();
    match err {
        ProviderError::Manifest {
            dependency: failed,
            version,
            ..
        } => {
            assert_eq!(failed, dependency);
            assert_eq!(version.as_str(), "1.0.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_resolve_branch_to_commit() {
    let dependency = Dependency::git("https://example.com/Internal/Networking.git");
    let (provider, _) = provider(MockMirror::new().with_branch(&dependency, "develop", "0f1e2d3c"));

    let pinned = provider
        .resolve_reference(&dependency, "develop")
        .await
        .unwrap();
    assert_eq!(pinned.as_str(), "0f1e2d3c");

    let err = provider
        .resolve_reference(&dependency, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownReference { .. }));
}

#[tokio::test]
async fn test_sync_failure_surfaces_as_provider_error() {
    let dependency = Dependency::github("Broken/Broken");
    let (provider, _) = provider(MockMirror::new().with_failure(&dependency));

    let err = provider.versions(&dependency).await.unwrap_err();
    assert!(matches!(err, ProviderError::Sync { .. }));
}

#[tokio::test]
async fn test_binary_versions_downloaded_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/Framework.json")
        .with_status(200)
        .with_body(BINARY_JSON)
        .expect(1)
        .create_async()
        .await;

    let dependency = Dependency::binary(format!("{}/Framework.json", server.url()));
    let (provider, mirror) = provider(MockMirror::new());

    let versions = provider.versions(&dependency).await.unwrap();
    let versions: Vec<&str> = versions.iter().map(PinnedVersion::as_str).collect();
    assert_eq!(versions, vec!["1.1.0", "1.0.0"]);

    let requirements = provider
        .requirements(&dependency, &PinnedVersion::new("1.0.0"))
        .await
        .unwrap();
    assert!(requirements.binary_only);

    let err = provider
        .requirements(&dependency, &PinnedVersion::new("9.9.9"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownVersion { .. }));

    mock.assert_async().await;
    assert_eq!(mirror.clone_count(), 0);
}

#[tokio::test]
async fn test_binary_definition_download_is_announced_once() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Framework.json")
        .with_status(200)
        .with_body(BINARY_JSON)
        .create_async()
        .await;

    let url = format!("{}/Framework.json", server.url());
    let dependency = Dependency::binary(url.clone());
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let synchronizer = Synchronizer::new(Arc::new(MockMirror::new()), Arc::new(FetchCache::new()))
        .with_events(sender);
    let provider = LiveProvider::new(synchronizer, Client::new());

    provider.versions(&dependency).await.unwrap();
    provider.versions(&dependency).await.unwrap();

    assert_eq!(
        receiver.try_recv().unwrap(),
        ProjectEvent::DownloadingBinaryDefinition {
            dependency: dependency.clone(),
            url,
        }
    );
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_binary_download_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Missing.json")
        .with_status(404)
        .create_async()
        .await;

    let dependency = Dependency::binary(format!("{}/Missing.json", server.url()));
    let (provider, _) = provider(MockMirror::new());

    let err = provider.versions(&dependency).await.unwrap_err();
    assert!(matches!(err, ProviderError::Download { .. }));
}

#[tokio::test]
async fn test_binary_definition_with_insecure_archive_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/Insecure.json")
        .with_status(200)
        .with_body(r#"{ "1.0": "http://example.com/Framework.zip" }"#)
        .create_async()
        .await;

    let dependency = Dependency::binary(format!("{}/Insecure.json", server.url()));
    let (provider, _) = provider(MockMirror::new());

    let err = provider.versions(&dependency).await.unwrap_err();
    assert!(matches!(err, ProviderError::BinaryProject { .. }));
}

#[tokio::test]
async fn test_binary_definition_from_file_url() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Framework.json");
    std::fs::write(&path, BINARY_JSON).unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let dependency = Dependency::binary(url.to_string());
    let (provider, _) = provider(MockMirror::new());

    let versions = provider.versions(&dependency).await.unwrap();
    assert_eq!(versions.len(), 2);
}
