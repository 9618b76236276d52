use super::*;
use semver::Version;
use tempfile::TempDir;

const CARTFILE: &str = r#"
# Networking
github "Alamofire/Alamofire" ~> 4.6
github "Moya/Moya" == 10.0.2   # pinned for now
git "https://example.com/Internal/Networking.git" "develop"
binary "https://example.com/release/Framework.json" >= 1.0
github "ReactiveX/RxSwift"
"#;

#[test]
fn test_parse_cartfile_entries() {
    let cartfile = Cartfile::parse("Cartfile", CARTFILE).unwrap();
    assert_eq!(cartfile.len(), 5);

    let entries = &cartfile.entries;
    assert_eq!(entries[0].dependency.name(), "Alamofire");
    assert_eq!(
        entries[0].specifier,
        VersionSpecifier::CompatibleWith(Version::new(4, 6, 0))
    );
    assert_eq!(
        entries[1].specifier,
        VersionSpecifier::Exactly(Version::new(10, 0, 2))
    );
    assert_eq!(entries[2].dependency.kind(), DependencyKind::Git);
    assert_eq!(
        entries[2].specifier,
        VersionSpecifier::GitReference("develop".to_string())
    );
    assert!(entries[3].dependency.is_binary());
    assert_eq!(
        entries[3].specifier,
        VersionSpecifier::AtLeast(Version::new(1, 0, 0))
    );
    assert_eq!(entries[4].specifier, VersionSpecifier::Any);
    assert!(entries.iter().all(|entry| entry.source == "Cartfile"));
}

#[test]
fn test_parse_reports_file_and_line() {
    let err = Cartfile::parse("Cartfile.private", "github \"a/b\"\nsvn \"x/y\"\n").unwrap_err();
    match err {
        ManifestError::Parse { file, line, reason } => {
            assert_eq!(file, "Cartfile.private");
            assert_eq!(line, 2);
            assert!(reason.contains("svn"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_rejects_bad_constraints() {
    assert!(Cartfile::parse("Cartfile", "github \"a/b\" ~> banana").is_err());
    assert!(Cartfile::parse("Cartfile", "github \"a/b\" <= 1.0").is_err());
    assert!(Cartfile::parse("Cartfile", "github \"a/b").is_err());
    assert!(Cartfile::parse("Cartfile", "github a/b").is_err());
}

#[test]
fn test_specifier_for_uses_identity() {
    let cartfile = Cartfile::parse("Cartfile", CARTFILE).unwrap();
    let alias = Dependency::git("git@github.com:alamofire/alamofire.git");
    assert_eq!(
        cartfile.specifier_for(&alias),
        Some(&VersionSpecifier::CompatibleWith(Version::new(4, 6, 0)))
    );
}

#[test]
fn test_resolved_cartfile_is_written_in_name_order() {
    let resolved: ResolvedCartfile = [
        (Dependency::github("yapstudios/YapDatabase"), PinnedVersion::new("3.0.2")),
        (Dependency::github("Alamofire/Alamofire"), PinnedVersion::new("4.6.0")),
        (
            Dependency::git("https://example.com/Internal/Networking.git"),
            PinnedVersion::new("2ea246ae4573538886ffb946d70d141583443734"),
        ),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        resolved.to_string(),
        "github \"Alamofire/Alamofire\" \"4.6.0\"\n\
         git \"https://example.com/Internal/Networking.git\" \"2ea246ae4573538886ffb946d70d141583443734\"\n\
         github \"yapstudios/YapDatabase\" \"3.0.2\"\n"
    );
}

#[test]
fn test_resolved_cartfile_reads_back() {
    let text = "github \"Alamofire/Alamofire\" \"4.6.0\"\n\
                github \"Moya/Moya\" \"10.0.2\"\n\
                \n\
                github \"antitypical/Result\" \"3.2.4\"\n";
    let resolved: ResolvedCartfile = text.parse().unwrap();

    assert_eq!(resolved.len(), 3);
    let (dependency, version) = resolved.get_by_name("moya").unwrap();
    assert_eq!(dependency.name(), "Moya");
    assert_eq!(version.as_str(), "10.0.2");
    assert_eq!(resolved.to_string(), text.replace("\n\n", "\n"));
}

#[test]
fn test_resolved_cartfile_rejects_missing_pin() {
    let err = "github \"Moya/Moya\"\n".parse::<ResolvedCartfile>().unwrap_err();
    assert!(matches!(err, ManifestError::Parse { line: 1, .. }));
}

#[test]
fn test_resolved_cartfile_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Cartfile.resolved");

    let mut resolved = ResolvedCartfile::new();
    resolved.insert(Dependency::github("Moya/Moya"), PinnedVersion::new("10.0.2"));
    resolved.write_to(&path).unwrap();

    assert_eq!(ResolvedCartfile::from_file(&path).unwrap(), resolved);
}

#[test]
fn test_insert_replaces_equivalent_identity() {
    let mut resolved = ResolvedCartfile::new();
    resolved.insert(Dependency::github("Moya/Moya"), PinnedVersion::new("10.0.1"));
    resolved.insert(
        Dependency::git("https://github.com/Moya/Moya.git"),
        PinnedVersion::new("10.0.2"),
    );

    assert_eq!(resolved.len(), 1);
    assert_eq!(
        resolved.get(&Dependency::github("Moya/Moya")).unwrap().as_str(),
        "10.0.2"
    );
}
