use super::*;

#[test]
fn test_parse_versions_and_urls() {
    let json = r#"{
        "1.0": "https://my.domain.com/release/1.0.0/framework.zip",
        "1.0.1": "https://my.domain.com/release/1.0.1/framework.zip"
    }"#;

    let project = BinaryProject::from_json(json).unwrap();
    assert_eq!(project.versions.len(), 2);
    assert_eq!(
        project.urls_for(&PinnedVersion::new("1.0")).unwrap()[0].as_str(),
        "https://my.domain.com/release/1.0.0/framework.zip"
    );

    let ordered: Vec<String> = project
        .pinned_versions()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(ordered, vec!["1.0.1", "1.0"]);
}

#[test]
fn test_alt_parameters_become_fallback_urls() {
    let json = r#"{
        "1.0": "https://my.domain.com/release/1.0.0/framework.zip?alt=https://my.domain.com/release/1.0.0/other.zip&alt=https://mirror.example/framework.zip"
    }"#;

    let project = BinaryProject::from_json(json).unwrap();
    let urls: Vec<&str> = project
        .urls_for(&PinnedVersion::new("1.0"))
        .unwrap()
        .iter()
        .map(Url::as_str)
        .collect();

    assert_eq!(
        urls,
        vec![
            "https://my.domain.com/release/1.0.0/framework.zip",
            "https://my.domain.com/release/1.0.0/other.zip",
            "https://mirror.example/framework.zip",
        ]
    );
}

#[test]
fn test_other_query_parameters_are_kept() {
    let json = r#"{
        "2.0": "https://cdn.example/framework.zip?token=abc&alt=https://backup.example/framework.zip"
    }"#;

    let project = BinaryProject::from_json(json).unwrap();
    let urls = project.urls_for(&PinnedVersion::new("2.0")).unwrap();

    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].as_str(), "https://cdn.example/framework.zip?token=abc");
    assert_eq!(urls[1].as_str(), "https://backup.example/framework.zip");
}

#[test]
fn test_file_urls_are_allowed() {
    let json = r#"{ "1.0": "file:///tmp/releases/framework.zip" }"#;
    let project = BinaryProject::from_json(json).unwrap();
    assert_eq!(
        project.urls_for(&PinnedVersion::new("1.0")).unwrap()[0].scheme(),
        "file"
    );
}

#[test]
fn test_plain_http_is_rejected() {
    let json = r#"{ "1.0": "http://my.domain.com/framework.zip" }"#;
    let err = BinaryProject::from_json(json).unwrap_err();
    assert!(matches!(err, BinaryProjectError::NonHttpsScheme { .. }));
}

#[test]
fn test_rejected_url_is_reported_as_written() {
    let json = r#"{ "1.0": "http://My.Domain.com/Framework.zip" }"#;
    match BinaryProject::from_json(json).unwrap_err() {
        BinaryProjectError::NonHttpsScheme { url } => {
            assert_eq!(url, "http://My.Domain.com/Framework.zip");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_plain_http_alt_is_rejected() {
    let json = r#"{ "1.0": "https://my.domain.com/framework.zip?alt=http://insecure.example/framework.zip" }"#;
    let err = BinaryProject::from_json(json).unwrap_err();
    match err {
        BinaryProjectError::NonHttpsScheme { url } => {
            assert_eq!(url, "http://insecure.example/framework.zip");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_version_key() {
    let json = r#"{ "latest": "https://my.domain.com/framework.zip" }"#;
    let err = BinaryProject::from_json(json).unwrap_err();
    assert!(matches!(
        err,
        BinaryProjectError::InvalidVersionKey { ref key } if key == "latest"
    ));
}

#[test]
fn test_invalid_url() {
    let json = r#"{ "1.0": "not a url" }"#;
    let err = BinaryProject::from_json(json).unwrap_err();
    assert!(matches!(err, BinaryProjectError::InvalidUrl { .. }));
}

#[test]
fn test_invalid_json() {
    let err = BinaryProject::from_json(r#"{ "1.0": 5 }"#).unwrap_err();
    assert!(matches!(err, BinaryProjectError::InvalidJson { .. }));
    assert!(BinaryProject::from_json("[").is_err());
}
