use super::*;
use crate::cartfile::VersionSpecifier;
use std::fs;
use tempfile::TempDir;

fn write_manifest(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_merge_preserves_order_and_provenance() {
    let shared = Cartfile::parse(CARTFILE_PATH, "github \"a/One\"\ngithub \"b/Two\"\n").unwrap();
    let private = Cartfile::parse(PRIVATE_CARTFILE_PATH, "github \"c/Three\" ~> 1.0\n").unwrap();

    let merged = merge_cartfiles(vec![shared, private]).unwrap();
    let names: Vec<(&str, &str)> = merged
        .entries
        .iter()
        .map(|e| (e.dependency.name(), e.source.as_str()))
        .collect();

    assert_eq!(
        names,
        vec![
            ("One", CARTFILE_PATH),
            ("Two", CARTFILE_PATH),
            ("Three", PRIVATE_CARTFILE_PATH),
        ]
    );
}

#[test]
fn test_duplicates_across_manifests_sorted_by_name() {
    let shared = Cartfile::parse(
        CARTFILE_PATH,
        "github \"5/5\"\ngithub \"1/1\"\ngithub \"2/2\"\ngithub \"3/3\"\n",
    )
    .unwrap();
    let private = Cartfile::parse(
        PRIVATE_CARTFILE_PATH,
        "github \"3/3\"\ngithub \"4/4\"\ngithub \"1/1\"\ngithub \"5/5\"\n",
    )
    .unwrap();

    let err = merge_cartfiles(vec![shared, private]).unwrap_err();
    let ManifestError::DuplicateDependencies { duplicates } = err else {
        panic!("expected duplicate dependencies");
    };

    let expected_locations = vec![CARTFILE_PATH.to_string(), PRIVATE_CARTFILE_PATH.to_string()];
    let expected = vec![
        DuplicateDependency {
            dependency: Dependency::github("1/1"),
            locations: expected_locations.clone(),
        },
        DuplicateDependency {
            dependency: Dependency::github("3/3"),
            locations: expected_locations.clone(),
        },
        DuplicateDependency {
            dependency: Dependency::github("5/5"),
            locations: expected_locations,
        },
    ];
    assert_eq!(duplicates, expected);
}

#[test]
fn test_equivalent_addresses_are_duplicates() {
    let shared = Cartfile::parse(CARTFILE_PATH, "github \"Moya/Moya\"\n").unwrap();
    let private = Cartfile::parse(
        PRIVATE_CARTFILE_PATH,
        "git \"git@github.com:moya/moya.git\" \"master\"\n",
    )
    .unwrap();

    let err = merge_cartfiles(vec![shared, private]).unwrap_err();
    assert!(err.to_string().contains("Moya"));
    assert!(err.to_string().contains(PRIVATE_CARTFILE_PATH));
}

#[test]
fn test_duplicate_within_one_manifest_lists_location_once() {
    let shared =
        Cartfile::parse(CARTFILE_PATH, "github \"a/One\"\ngithub \"a/One\" ~> 1.0\n").unwrap();

    let err = merge_cartfiles(vec![shared]).unwrap_err();
    let ManifestError::DuplicateDependencies { duplicates } = err else {
        panic!("expected duplicate dependencies");
    };
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].locations, vec![CARTFILE_PATH.to_string()]);
}

#[test]
fn test_load_combined_cartfile_only_shared() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), CARTFILE_PATH, "github \"Carthage/Carthage\"\n");

    let cartfile = load_combined_cartfile(temp_dir.path()).unwrap();
    assert_eq!(cartfile.len(), 1);
    assert_eq!(cartfile.entries[0].dependency.name(), "Carthage");
}

#[test]
fn test_load_combined_cartfile_only_private() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        PRIVATE_CARTFILE_PATH,
        "github \"Carthage/Carthage\" ~> 0.30\n",
    );

    let cartfile = load_combined_cartfile(temp_dir.path()).unwrap();
    assert_eq!(cartfile.len(), 1);
    assert_eq!(cartfile.entries[0].source, PRIVATE_CARTFILE_PATH);
    assert!(matches!(
        cartfile.entries[0].specifier,
        VersionSpecifier::CompatibleWith(_)
    ));
}

#[test]
fn test_load_combined_cartfile_missing_both() {
    let temp_dir = TempDir::new().unwrap();

    let err = load_combined_cartfile(temp_dir.path()).unwrap_err();
    match err {
        ManifestError::ReadFailed { path, source } => {
            assert_eq!(path, temp_dir.path().join(CARTFILE_PATH));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_combined_cartfile_detects_duplicates_across_files() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(temp_dir.path(), CARTFILE_PATH, "github \"1/1\"\ngithub \"2/2\"\n");
    write_manifest(temp_dir.path(), PRIVATE_CARTFILE_PATH, "github \"1/1\"\n");

    let err = load_combined_cartfile(temp_dir.path()).unwrap_err();
    assert!(matches!(err, ManifestError::DuplicateDependencies { .. }));
}
