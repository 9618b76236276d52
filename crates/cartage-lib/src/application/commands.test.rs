use super::*;
use crate::testing::{InMemoryProvider, github, spec};
use std::sync::Arc;
use tempfile::TempDir;

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

fn moya_project() -> (TempDir, Project) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("Cartfile"), "github \"Moya/Moya\"\n").unwrap();
    let project = Project::new(temp_dir.path(), Arc::new(ecosystem()));
    (temp_dir, project)
}

async fn run(command: Commands, project: &Project) -> Result<String> {
    let mut out = Vec::new();
    execute_command_with_project(command, project, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

async fn update(project: &Project) {
    run(
        Commands::Update {
            dependencies: vec![],
        },
        project,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_update_prints_and_writes_pins() {
    let (_temp_dir, project) = moya_project();

    let output = run(
        Commands::Update {
            dependencies: vec![],
        },
        &project,
    )
    .await
    .unwrap();

    assert!(output.starts_with(
        "Alamofire 4.6.0\nMoya 10.0.2\nReactiveSwift 3.1.0\nResult 3.2.4\nRxSwift 4.1.2\n"
    ));
    assert!(output.contains("Resolved 5 dependencies"));
    assert!(project.resolved_path().is_file());
}

#[tokio::test]
async fn test_build_order_lists_dependencies_first() {
    let (_temp_dir, project) = moya_project();
    update(&project).await;

    let output = run(
        Commands::BuildOrder {
            dependencies: vec![],
        },
        &project,
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        "Alamofire 4.6.0\nResult 3.2.4\nReactiveSwift 3.1.0\nRxSwift 4.1.2\nMoya 10.0.2\n"
    );
}

#[tokio::test]
async fn test_transitive_lists_dependencies_by_name() {
    let (_temp_dir, project) = moya_project();
    update(&project).await;

    let output = run(
        Commands::Transitive {
            dependencies: vec!["Moya".to_string()],
        },
        &project,
    )
    .await
    .unwrap();

    assert_eq!(output, "Alamofire\nReactiveSwift\nResult\nRxSwift\n");
}

#[tokio::test]
async fn test_outdated_reports_newer_versions() {
    let (_temp_dir, project) = moya_project();
    update(&project).await;

    let output = run(Commands::Outdated, &project).await.unwrap();
    assert_eq!(
        output,
        "The following dependencies are outdated:\n\
         Alamofire \"4.6.0\" -> \"5.0.0\" (Latest: \"5.0.0\")\n\
         Result \"3.2.4\" -> \"4.0.0\" (Latest: \"4.0.0\")\n"
    );
}

#[tokio::test]
async fn test_outdated_when_current() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("Cartfile"), "github \"ReactiveX/RxSwift\"\n").unwrap();
    let project = Project::new(temp_dir.path(), Arc::new(ecosystem()));
    update(&project).await;

    let output = run(Commands::Outdated, &project).await.unwrap();
    assert_eq!(output, "All dependencies are up to date.\n");
}

#[tokio::test]
async fn test_query_before_update_fails() {
    let (_temp_dir, project) = moya_project();

    let err = run(
        Commands::BuildOrder {
            dependencies: vec![],
        },
        &project,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("run `cartage update` first"));
}

#[tokio::test]
async fn test_update_without_cartfile_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = Project::new(temp_dir.path(), Arc::new(ecosystem()));

    let err = run(
        Commands::Update {
            dependencies: vec![],
        },
        &project,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("No Cartfile"));
}

#[tokio::test]
async fn test_duplicate_dependencies_fail_update() {
    let (temp_dir, project) = moya_project();
    std::fs::write(
        temp_dir.path().join("Cartfile.private"),
        "git \"https://github.com/Moya/Moya.git\"\n",
    )
    .unwrap();

    let err = run(
        Commands::Update {
            dependencies: vec![],
        },
        &project,
    )
    .await
    .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Moya"), "{message}");
    assert!(!project.resolved_path().exists());
}

#[tokio::test]
async fn test_version() {
    let (_temp_dir, project) = moya_project();

    let output = run(Commands::Version, &project).await.unwrap();
    assert!(output.starts_with(&format!("cartage {}", env!("CARGO_PKG_VERSION"))));
}
