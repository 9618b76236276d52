use super::*;
use crate::testing::MockMirror;
use std::time::Duration;

fn synchronizer(mirror: MockMirror) -> (Synchronizer, Arc<MockMirror>) {
    let mirror = Arc::new(mirror);
    let synchronizer = Synchronizer::new(mirror.clone(), Arc::new(FetchCache::new()));
    (synchronizer, mirror)
}

#[tokio::test]
async fn test_concurrent_syncs_share_one_clone() {
    let dependency = Dependency::github("ReactiveCocoa/ReactiveSwift");
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let (synchronizer, mirror) =
        synchronizer(MockMirror::new().with_latency(Duration::from_millis(50)));
    let synchronizer = synchronizer.with_events(sender);

    let results =
        futures::future::join_all((0..8).map(|_| synchronizer.sync(&dependency, None))).await;

    assert_eq!(mirror.clone_count(), 1);
    assert_eq!(mirror.fetch_count(), 0);
    for result in results {
        assert_eq!(result.unwrap(), Some(ProjectEvent::Cloning(dependency.clone())));
    }

    assert_eq!(receiver.try_recv().unwrap(), ProjectEvent::Cloning(dependency));
    assert!(receiver.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_syncs_across_tasks_share_one_clone() {
    let dependency = Dependency::github("Alamofire/Alamofire");
    let (synchronizer, mirror) =
        synchronizer(MockMirror::new().with_latency(Duration::from_millis(50)));
    let synchronizer = Arc::new(synchronizer);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let synchronizer = Arc::clone(&synchronizer);
            let dependency = dependency.clone();
            tokio::spawn(async move { synchronizer.sync(&dependency, None).await })
        })
        .collect();

    for handle in handles {
        let event = handle.await.unwrap().unwrap();
        assert_eq!(event, Some(ProjectEvent::Cloning(dependency.clone())));
    }
    assert_eq!(mirror.clone_count(), 1);
}

#[tokio::test]
async fn test_equivalent_addresses_coalesce() {
    let hosted = Dependency::github("Moya/Moya");
    let scp = Dependency::git("git@github.com:moya/moya.git");
    let (synchronizer, mirror) =
        synchronizer(MockMirror::new().with_latency(Duration::from_millis(20)));

    let (first, second) = tokio::join!(
        synchronizer.sync(&hosted, None),
        synchronizer.sync(&scp, None)
    );

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_some());
    assert_eq!(mirror.clone_count(), 1);
}

#[tokio::test]
async fn test_fresh_mirror_skips_network_until_cleared() {
    let dependency = Dependency::github("antitypical/Result");
    let (synchronizer, mirror) = synchronizer(MockMirror::new());

    let first = synchronizer.sync(&dependency, None).await.unwrap();
    assert_eq!(first, Some(ProjectEvent::Cloning(dependency.clone())));

    let second = synchronizer.sync(&dependency, None).await.unwrap();
    assert_eq!(second, None);
    assert_eq!(mirror.fetch_count(), 0);

    synchronizer.clear_fetch_times();
    let third = synchronizer.sync(&dependency, None).await.unwrap();
    assert_eq!(third, Some(ProjectEvent::Fetching(dependency.clone())));
    assert_eq!(mirror.fetch_count(), 1);
    assert_eq!(mirror.clone_count(), 1);
}

#[tokio::test]
async fn test_existing_mirror_is_fetched_not_cloned() {
    let dependency = Dependency::github("ReactiveX/RxSwift");
    let (synchronizer, mirror) = synchronizer(MockMirror::new().with_mirror(&dependency));

    let event = synchronizer.sync(&dependency, None).await.unwrap();
    assert_eq!(event, Some(ProjectEvent::Fetching(dependency)));
    assert_eq!(mirror.clone_count(), 0);
    assert_eq!(mirror.fetch_count(), 1);
}

#[tokio::test]
async fn test_immutable_commit_skips_network() {
    let dependency = Dependency::github("Carthage/Carthage");
    let commit = "2ea246ae4573538886ffb946d70d141583443734";
    let (synchronizer, mirror) = synchronizer(
        MockMirror::new()
            .with_mirror(&dependency)
            .with_commit(&dependency, commit)
            .with_branch(&dependency, "master", commit),
    );

    let event = synchronizer.sync(&dependency, Some(commit)).await.unwrap();
    assert_eq!(event, None);
    assert_eq!(mirror.fetch_count(), 0);

    // Branch names can move, so they always go to the network when stale
    let event = synchronizer.sync(&dependency, Some("master")).await.unwrap();
    assert_eq!(event, Some(ProjectEvent::Fetching(dependency)));
    assert_eq!(mirror.fetch_count(), 1);
}

#[tokio::test]
async fn test_unknown_commit_fetches() {
    let dependency = Dependency::github("Carthage/Carthage");
    let (synchronizer, mirror) = synchronizer(MockMirror::new().with_mirror(&dependency));

    let event = synchronizer
        .sync(&dependency, Some("0123456789abcdef"))
        .await
        .unwrap();
    assert_eq!(event, Some(ProjectEvent::Fetching(dependency)));
    assert_eq!(mirror.fetch_count(), 1);
}

#[tokio::test]
async fn test_failure_is_shared_and_not_cached() {
    let dependency = Dependency::github("Broken/Broken");
    let (synchronizer, mirror) = synchronizer(
        MockMirror::new()
            .with_latency(Duration::from_millis(10))
            .with_failure(&dependency),
    );

    let (first, second) = tokio::join!(
        synchronizer.sync(&dependency, None),
        synchronizer.sync(&dependency, None)
    );
    let first = first.unwrap_err();
    assert_eq!(first, second.unwrap_err());
    assert!(first.to_string().contains("Broken"));
    assert_eq!(mirror.clone_count(), 1);

    assert!(synchronizer.cache().last_fetch(dependency.identity()).is_none());
    assert!(synchronizer.sync(&dependency, None).await.is_err());
    assert_eq!(mirror.clone_count(), 2);
}

#[tokio::test]
async fn test_binary_dependency_cannot_be_synchronized() {
    let dependency = Dependency::binary("https://example.com/Framework.json");
    let (synchronizer, mirror) = synchronizer(MockMirror::new());

    let err = synchronizer.sync(&dependency, None).await.unwrap_err();
    assert!(matches!(err, SyncError::OperationFailed { .. }));
    assert_eq!(mirror.clone_count(), 0);
}

#[tokio::test]
async fn test_different_identities_run_independently() {
    let first = Dependency::github("a/First");
    let second = Dependency::github("b/Second");
    let (synchronizer, mirror) =
        synchronizer(MockMirror::new().with_latency(Duration::from_millis(10)));

    let (a, b) = tokio::join!(
        synchronizer.sync(&first, None),
        synchronizer.sync(&second, None)
    );

    assert_eq!(a.unwrap(), Some(ProjectEvent::Cloning(first)));
    assert_eq!(b.unwrap(), Some(ProjectEvent::Cloning(second)));
    assert_eq!(mirror.clone_count(), 2);
}
