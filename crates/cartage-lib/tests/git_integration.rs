//! Live provider against local git repositories

use cartage_lib::application::Project;
use cartage_lib::resolver::LiveProvider;
use cartage_lib::sync::{FetchCache, GitMirror, ProjectEvent, Synchronizer};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
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
}

/// Repository whose tags each commit `Cartfile` with the given contents
fn repository(root: &Path, name: &str, tags: &[(&str, Option<String>)]) -> PathBuf {
    let path = root.join(name);
    std::fs::create_dir_all(&path).unwrap();
    git(&path, &["init", "--quiet"]);
    git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    for (tag, cartfile) in tags {
        std::fs::write(path.join("VERSION"), tag).unwrap();
        git(&path, &["add", "VERSION"]);
        if let Some(cartfile) = cartfile {
            std::fs::write(path.join("Cartfile"), cartfile).unwrap();
            git(&path, &["add", "Cartfile"]);
        }
        git(&path, &["commit", "--quiet", "-m", tag]);
        git(&path, &["tag", tag]);
    }
    path
}

#[tokio::test]
async fn test_update_and_build_order_from_git_mirrors() {
    if !git_available() {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let core = repository(
        temp_dir.path(),
        "Core",
        &[("v1.0.0", None), ("v1.1.0", None), ("v2.0.0", None)],
    );
    let app = repository(
        temp_dir.path(),
        "App",
        &[(
            "2.0.0",
            Some(format!("git \"{}\" ~> 1.0\n", core.display())),
        )],
    );

    let project_dir = temp_dir.path().join("project");
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(
        project_dir.join("Cartfile"),
        format!("git \"{}\" ~> 2.0\n", app.display()),
    )
    .unwrap();

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mirror = Arc::new(GitMirror::new(&temp_dir.path().join("cache")));
    let synchronizer =
        Synchronizer::new(mirror, Arc::new(FetchCache::new())).with_events(sender);
    let provider = LiveProvider::new(synchronizer, reqwest::Client::new());
    let project = Project::new(&project_dir, Arc::new(provider));

    let names: [&str; 0] = [];
    let resolved = project.update(&names).await.unwrap();
    let pins: Vec<(String, String)> = resolved
        .iter()
        .map(|(dependency, version)| (dependency.name().to_string(), version.to_string()))
        .collect();
    assert_eq!(
        pins,
        vec![
            ("App".to_string(), "2.0.0".to_string()),
            ("Core".to_string(), "v1.1.0".to_string()),
        ]
    );

    // One clone per repository, nothing fetched inside the freshness window
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| matches!(event, ProjectEvent::Cloning(_))));

    let order: Vec<String> = project
        .build_order(&names)
        .await
        .unwrap()
        .into_iter()
        .map(|(dependency, _)| dependency.name().to_string())
        .collect();
    assert_eq!(order, vec!["Core", "App"]);

    let outdated = project.outdated().await.unwrap();
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated[0].dependency.name(), "Core");
    assert_eq!(outdated[0].applicable.as_str(), "v2.0.0");
}
