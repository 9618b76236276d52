use super::*;
use std::collections::HashSet;

#[test]
fn test_hosted_repo_identity() {
    let dependency = Dependency::github("Alamofire/Alamofire");
    assert_eq!(dependency.identity(), "github.com/alamofire/alamofire");
    assert_eq!(dependency.name(), "Alamofire");
    assert_eq!(
        dependency.clone_url().as_deref(),
        Some("https://github.com/Alamofire/Alamofire.git")
    );
}

#[test]
fn test_equivalent_addresses_share_identity() {
    let hosted = Dependency::github("ReactiveX/RxSwift");
    let https = Dependency::git("https://github.com/ReactiveX/RxSwift.git");
    let scp = Dependency::git("git@github.com:reactivex/rxswift");
    let trailing = Dependency::git("https://github.com/ReactiveX/RxSwift/");

    assert_eq!(hosted, https);
    assert_eq!(hosted, scp);
    assert_eq!(hosted, trailing);

    let set: HashSet<Dependency> = [hosted, https, scp, trailing].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_normalize_git_url_variants() {
    assert_eq!(
        normalize_git_url("ssh://git@example.com/team/repo.git"),
        "example.com/team/repo"
    );
    assert_eq!(normalize_git_url("/tmp/repos/Local.git"), "/tmp/repos/local");
    assert_eq!(
        normalize_git_url("file:///tmp/repos/Local"),
        "/tmp/repos/local"
    );
}

#[test]
fn test_enterprise_hosted_repo_uses_full_url() {
    let dependency = Dependency::github("https://git.corp.example/mobile/Networking");
    assert_eq!(dependency.identity(), "git.corp.example/mobile/networking");
    assert_eq!(dependency.name(), "Networking");
}

#[test]
fn test_binary_dependency_name_and_identity() {
    let dependency = Dependency::binary("https://example.com/release/MyFramework.json");
    assert_eq!(dependency.name(), "MyFramework");
    assert_eq!(dependency.identity(), "https://example.com/release/myframework.json");
    assert!(dependency.is_binary());
    assert!(dependency.clone_url().is_none());
}

#[test]
fn test_ordering_is_by_name_case_insensitive() {
    let mut dependencies = vec![
        Dependency::github("antitypical/Result"),
        Dependency::github("Alamofire/Alamofire"),
        Dependency::github("Moya/Moya"),
        Dependency::github("yapstudios/YapDatabase"),
        Dependency::github("CocoaLumberjack/CocoaLumberjack"),
    ];
    dependencies.sort();

    let names: Vec<&str> = dependencies.iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        vec!["Alamofire", "CocoaLumberjack", "Moya", "Result", "YapDatabase"]
    );
}

#[test]
fn test_kind_keywords_round_trip() {
    for kind in [DependencyKind::GitHub, DependencyKind::Git, DependencyKind::Binary] {
        assert_eq!(DependencyKind::from_keyword(kind.keyword()), Some(kind));
    }
    assert_eq!(DependencyKind::from_keyword("svn"), None);
}
