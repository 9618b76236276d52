use super::*;
use crate::testing::{InMemoryProvider, github, spec};
use tempfile::TempDir;

fn ecosystem() -> InMemoryProvider {
    let alamofire = github("Alamofire/Alamofire");
    let moya = github("Moya/Moya");
    let result = github("antitypical/Result");

    InMemoryProvider::new()
        .with_version(&alamofire, "4.5.0", vec![])
        .with_version(&alamofire, "4.6.0", vec![])
        .with_version(&result, "3.2.4", vec![])
        .with_version(
            &moya,
            "10.0.2",
            vec![
                (alamofire.clone(), spec("~> 4.1")),
                (result.clone(), spec("~> 3.0")),
            ],
        )
}

fn project(cartfile: &str) -> (TempDir, Project) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("Cartfile"), cartfile).unwrap();
    let project = Project::new(temp_dir.path(), Arc::new(ecosystem()));
    (temp_dir, project)
}

#[tokio::test]
async fn test_update_writes_resolved_cartfile() {
    let (_temp_dir, project) = project("github \"Moya/Moya\"\n");
    assert!(project.load_resolved().unwrap().is_none());

    let names: [&str; 0] = [];
    project.update(&names).await.unwrap();

    let written = std::fs::read_to_string(project.resolved_path()).unwrap();
    assert_eq!(
        written,
        "github \"Alamofire/Alamofire\" \"4.6.0\"\n\
         github \"Moya/Moya\" \"10.0.2\"\n\
         github \"antitypical/Result\" \"3.2.4\"\n"
    );
    assert_eq!(project.load_resolved().unwrap().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_named_keeps_other_pins() {
    let (_temp_dir, project) = project("github \"Moya/Moya\"\n");
    std::fs::write(
        project.resolved_path(),
        "github \"Alamofire/Alamofire\" \"4.5.0\"\n",
    )
    .unwrap();

    let resolved = project.update(&["Moya"]).await.unwrap();
    let (_, alamofire) = resolved.get_by_name("Alamofire").unwrap();
    assert_eq!(alamofire.as_str(), "4.5.0");

    let resolved = project.update(&["Alamofire"]).await.unwrap();
    let (_, alamofire) = resolved.get_by_name("Alamofire").unwrap();
    assert_eq!(alamofire.as_str(), "4.6.0");
}

#[tokio::test]
async fn test_failed_resolution_leaves_pins_untouched() {
    let (_temp_dir, project) = project("github \"Moya/Moya\" ~> 11.0\n");
    std::fs::write(project.resolved_path(), "github \"Moya/Moya\" \"10.0.2\"\n").unwrap();

    let names: [&str; 0] = [];
    let err = project.update(&names).await.unwrap_err();
    assert!(matches!(err, ProjectError::Resolution { .. }));

    let written = std::fs::read_to_string(project.resolved_path()).unwrap();
    assert_eq!(written, "github \"Moya/Moya\" \"10.0.2\"\n");
}

#[tokio::test]
async fn test_queries_need_resolved_cartfile() {
    let (_temp_dir, project) = project("github \"Moya/Moya\"\n");

    let err = project.build_order(&["Moya"]).await.unwrap_err();
    assert!(matches!(err, ProjectError::MissingResolved { .. }));
    assert!(err.to_string().contains("cartage update"));

    let err = project.outdated().await.unwrap_err();
    assert!(matches!(err, ProjectError::MissingResolved { .. }));
}

#[tokio::test]
async fn test_build_order_carries_pins() {
    let (_temp_dir, project) = project("github \"Moya/Moya\"\n");
    let names: [&str; 0] = [];
    project.update(&names).await.unwrap();

    let order: Vec<String> = project
        .build_order(&["Moya"])
        .await
        .unwrap()
        .into_iter()
        .map(|(dependency, version)| format!("{dependency}@{version}"))
        .collect();
    assert_eq!(order, vec!["Alamofire@4.6.0", "Result@3.2.4", "Moya@10.0.2"]);

    let transitive = project.transitive_dependencies(&["Moya"]).await.unwrap();
    assert_eq!(transitive.len(), 2);
}

#[test]
fn test_has_cartfile() {
    let temp_dir = TempDir::new().unwrap();
    let project = Project::new(temp_dir.path(), Arc::new(InMemoryProvider::new()));
    assert!(!project.has_cartfile());

    std::fs::write(temp_dir.path().join("Cartfile.private"), "").unwrap();
    assert!(project.has_cartfile());
}
