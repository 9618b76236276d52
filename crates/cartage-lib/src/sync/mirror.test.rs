use super::*;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Upstream repository with a tagged first commit and an untagged second one
fn upstream_repository(root: &Path) -> (PathBuf, String, String) {
    let upstream = root.join("Upstream");
    std::fs::create_dir_all(&upstream).unwrap();
    git(&upstream, &["init", "--quiet"]);
    git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    std::fs::write(upstream.join("Cartfile"), "github \"antitypical/Result\" ~> 3.0\n").unwrap();
    git(&upstream, &["add", "Cartfile"]);
    git(&upstream, &["commit", "--quiet", "-m", "first"]);
    git(&upstream, &["tag", "v1.0.0"]);
    let first = git(&upstream, &["rev-parse", "HEAD"]);

    std::fs::write(upstream.join("README"), "second\n").unwrap();
    git(&upstream, &["add", "README"]);
    git(&upstream, &["commit", "--quiet", "-m", "second"]);
    let second = git(&upstream, &["rev-parse", "HEAD"]);

    (upstream, first, second)
}

#[test]
fn test_repository_path_follows_identity() {
    let mirror = GitMirror::new(Path::new("/cache"));
    assert_eq!(
        mirror.repository_path(&Dependency::github("ReactiveX/RxSwift")),
        PathBuf::from("/cache/dependencies/github.com_reactivex_rxswift")
    );
}

#[test]
fn test_same_name_different_owner_gets_own_mirror() {
    let mirror = GitMirror::new(Path::new("/cache"));
    let ours = mirror.repository_path(&Dependency::github("a/Result"));
    let theirs = mirror.repository_path(&Dependency::github("b/Result"));
    assert_ne!(ours, theirs);
}

#[test]
fn test_equivalent_addresses_share_a_mirror() {
    let mirror = GitMirror::new(Path::new("/cache"));
    assert_eq!(
        mirror.repository_path(&Dependency::github("Moya/Moya")),
        mirror.repository_path(&Dependency::git("git@github.com:moya/moya"))
    );
}

#[tokio::test]
async fn test_binary_dependency_has_no_repository() {
    let temp_dir = TempDir::new().unwrap();
    let mirror = GitMirror::new(temp_dir.path());
    let dependency = Dependency::binary("https://example.com/Framework.json");

    let err = mirror.clone_repository(&dependency).await.unwrap_err();
    assert!(matches!(err, MirrorError::NoRepository { .. }));
    assert!(!mirror.mirror_exists(&dependency));
}

#[tokio::test]
async fn test_clone_and_query_local_repository() {
    if !git_available() {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let (upstream, first, second) = upstream_repository(temp_dir.path());
    let dependency = Dependency::git(upstream.to_string_lossy().to_string());
    let mirror = GitMirror::new(&temp_dir.path().join("cache"));

    assert!(!mirror.mirror_exists(&dependency));
    mirror.clone_repository(&dependency).await.unwrap();
    assert!(mirror.mirror_exists(&dependency));

    assert_eq!(mirror.list_tags(&dependency).await.unwrap(), vec!["v1.0.0"]);
    assert_eq!(
        mirror.resolve_reference(&dependency, "v1.0.0").await.unwrap(),
        Some(first.clone())
    );
    assert_eq!(
        mirror.resolve_reference(&dependency, "main").await.unwrap(),
        Some(second.clone())
    );
    assert_eq!(
        mirror.resolve_reference(&dependency, "no-such-branch").await.unwrap(),
        None
    );

    let cartfile = mirror
        .contents_of_file(&dependency, "v1.0.0", "Cartfile")
        .await
        .unwrap();
    assert_eq!(cartfile.as_deref(), Some("github \"antitypical/Result\" ~> 3.0\n"));
    assert_eq!(
        mirror
            .contents_of_file(&dependency, "v1.0.0", "Cartfile.private")
            .await
            .unwrap(),
        None
    );

    assert!(mirror.is_immutable_commit(&dependency, &first).await.unwrap());
    assert!(!mirror.is_immutable_commit(&dependency, "main").await.unwrap());
    assert!(!mirror.is_immutable_commit(&dependency, "v1.0.0").await.unwrap());
    assert!(!mirror.is_immutable_commit(&dependency, "HEAD").await.unwrap());
}

#[tokio::test]
async fn test_fetch_picks_up_new_tags() {
    if !git_available() {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let (upstream, _, _) = upstream_repository(temp_dir.path());
    let dependency = Dependency::git(upstream.to_string_lossy().to_string());
    let mirror = GitMirror::new(&temp_dir.path().join("cache"));

    mirror.clone_repository(&dependency).await.unwrap();
    git(&upstream, &["tag", "v1.1.0"]);
    mirror.fetch_repository(&dependency).await.unwrap();

    let mut tags = mirror.list_tags(&dependency).await.unwrap();
    tags.sort();
    assert_eq!(tags, vec!["v1.0.0", "v1.1.0"]);
}
