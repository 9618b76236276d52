use super::*;

fn v(text: &str) -> Version {
    parse_semantic(text).unwrap()
}

#[test]
fn test_parse_semantic_is_lenient() {
    assert_eq!(parse_semantic("v1.2.3"), Some(Version::new(1, 2, 3)));
    assert_eq!(parse_semantic("1.0"), Some(Version::new(1, 0, 0)));
    assert_eq!(parse_semantic("2"), Some(Version::new(2, 0, 0)));
    assert_eq!(parse_semantic("v3.0-beta.1").unwrap().pre.as_str(), "beta.1");
    assert_eq!(parse_semantic("develop"), None);
    assert_eq!(parse_semantic("2ea246ae4573538886ffb946d70d141583443734"), None);
    assert_eq!(parse_semantic("1.2.3.4"), None);
}

#[test]
fn test_pinned_version_keeps_original_text() {
    let pinned = PinnedVersion::new("v1.0");
    assert_eq!(pinned.as_str(), "v1.0");
    assert_eq!(pinned.to_string(), "v1.0");
    assert_eq!(pinned.semantic(), Some(&Version::new(1, 0, 0)));

    let branch = PinnedVersion::new("master");
    assert!(!branch.is_semantic());
}

#[test]
fn test_sort_descending_puts_opaque_last_and_is_stable() {
    let mut versions: Vec<PinnedVersion> = ["v1.0.0", "abc123", "v2.0.0", "1.0.0", "v1.1.0"]
        .into_iter()
        .map(PinnedVersion::from)
        .collect();
    sort_descending(&mut versions);

    let order: Vec<&str> = versions.iter().map(|p| p.as_str()).collect();
    assert_eq!(order, vec!["v2.0.0", "v1.1.0", "v1.0.0", "1.0.0", "abc123"]);
}

#[test]
fn test_any_excludes_prereleases() {
    assert!(VersionSpecifier::Any.is_satisfied_by_version(&v("1.0.0")));
    assert!(!VersionSpecifier::Any.is_satisfied_by_version(&v("3.0.0-beta.1")));
}

#[test]
fn test_compatible_with_same_major() {
    let spec = VersionSpecifier::CompatibleWith(v("2.0.0"));
    assert!(spec.is_satisfied_by_version(&v("2.0.1")));
    assert!(spec.is_satisfied_by_version(&v("2.9.0")));
    assert!(!spec.is_satisfied_by_version(&v("1.9.0")));
    assert!(!spec.is_satisfied_by_version(&v("3.0.0")));
    assert!(!spec.is_satisfied_by_version(&v("3.0.0-beta.1")));
}

#[test]
fn test_compatible_with_zero_major_uses_minor() {
    let spec = VersionSpecifier::CompatibleWith(v("0.4.1"));
    assert!(spec.is_satisfied_by_version(&v("0.4.9")));
    assert!(!spec.is_satisfied_by_version(&v("0.5.0")));
    assert!(!spec.is_satisfied_by_version(&v("0.4.0")));
}

#[test]
fn test_prerelease_only_matches_same_numeric_components() {
    let spec = VersionSpecifier::AtLeast(v("3.0.0-alpha.1"));
    assert!(spec.is_satisfied_by_version(&v("3.0.0-beta.1")));
    assert!(spec.is_satisfied_by_version(&v("3.0.0")));
    assert!(!spec.is_satisfied_by_version(&v("3.1.0-beta.1")));
}

#[test]
fn test_opaque_pins_satisfy_semantic_specifiers() {
    let commit = PinnedVersion::new("809b8eb20f4b6b9e805b62de3084fbc7fcde54cc");
    assert!(VersionSpecifier::Exactly(v("1.0.0")).is_satisfied_by(&commit));
    assert!(VersionSpecifier::CompatibleWith(v("1.0.0")).is_satisfied_by(&commit));
}

#[test]
fn test_intersection_rules() {
    use VersionSpecifier::*;

    assert_eq!(Any.intersection(&AtLeast(v("1.0.0"))), Some(AtLeast(v("1.0.0"))));
    assert_eq!(
        AtLeast(v("1.0.0")).intersection(&AtLeast(v("1.2.0"))),
        Some(AtLeast(v("1.2.0")))
    );
    assert_eq!(
        AtLeast(v("1.5.0")).intersection(&CompatibleWith(v("1.2.0"))),
        Some(CompatibleWith(v("1.5.0")))
    );
    assert_eq!(
        AtLeast(v("1.0.0")).intersection(&CompatibleWith(v("2.0.0"))),
        Some(CompatibleWith(v("2.0.0")))
    );
    assert_eq!(AtLeast(v("3.0.0")).intersection(&CompatibleWith(v("2.0.0"))), None);
    assert_eq!(
        CompatibleWith(v("1.1.0")).intersection(&CompatibleWith(v("1.4.0"))),
        Some(CompatibleWith(v("1.4.0")))
    );
    assert_eq!(CompatibleWith(v("1.1.0")).intersection(&CompatibleWith(v("2.0.0"))), None);
    assert_eq!(
        Exactly(v("1.2.0")).intersection(&CompatibleWith(v("1.0.0"))),
        Some(Exactly(v("1.2.0")))
    );
    assert_eq!(Exactly(v("1.2.0")).intersection(&Exactly(v("1.3.0"))), None);
    assert_eq!(
        GitReference("develop".into()).intersection(&AtLeast(v("1.0.0"))),
        Some(GitReference("develop".into()))
    );
    assert_eq!(
        GitReference("develop".into()).intersection(&GitReference("main".into())),
        None
    );
}

#[test]
fn test_intersect_all_folds_from_any() {
    let specs = vec![
        VersionSpecifier::Any,
        VersionSpecifier::AtLeast(v("1.0.0")),
        VersionSpecifier::CompatibleWith(v("1.3.0")),
    ];
    assert_eq!(
        intersect_all(&specs),
        Some(VersionSpecifier::CompatibleWith(v("1.3.0")))
    );
    let none: Vec<VersionSpecifier> = Vec::new();
    assert_eq!(intersect_all(&none), Some(VersionSpecifier::Any));
}

#[test]
fn test_specifier_display_matches_manifest_syntax() {
    assert_eq!(VersionSpecifier::CompatibleWith(v("1.0")).to_string(), "~> 1.0.0");
    assert_eq!(VersionSpecifier::AtLeast(v("2.1.0")).to_string(), ">= 2.1.0");
    assert_eq!(VersionSpecifier::Exactly(v("3.0.0")).to_string(), "== 3.0.0");
    assert_eq!(
        VersionSpecifier::GitReference("develop".into()).to_string(),
        "\"develop\""
    );
}
