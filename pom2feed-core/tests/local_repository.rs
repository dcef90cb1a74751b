// tests/local_repository.rs

//! End-to-end conversion against a repository on disk.

mod common;

use common::*;
use pom2feed_core::digest::add_digests;
use pom2feed_core::xml::Element;
use pom2feed_core::{
    make_feed, open_repository, Error, FeedOptions, ManifestAlgorithm, RepositoryOptions,
};
use std::fs;

fn implementations(root: &Element) -> Vec<&Element> {
    root.children("implementation").collect()
}

#[test]
fn test_make_feed_local_repository() {
    let repo = setup_repository();
    let out = tempfile::tempdir().unwrap();
    let feed_file = out.path().join("feeds/demo.xml");

    let report = make_feed(
        repo.path().to_str().unwrap(),
        GROUP,
        ARTIFACT,
        &feed_file,
        &FeedOptions::default(),
    )
    .unwrap();

    assert_eq!(report.implementations, 3);
    let digests = report.digests.unwrap();
    assert_eq!(digests.annotated, 3);
    assert_eq!(digests.skipped, 0);

    let xml = fs::read_to_string(&feed_file).unwrap();
    let root = Element::parse(&xml).unwrap();
    assert_eq!(root.name, "interface");
    assert_eq!(root.attribute("uri"), Some("http://maven.0install.net/org/example/demo/"));
    assert_eq!(root.child_text("name").as_deref(), Some("Demo 1.1"));
    assert_eq!(root.child_text("summary").as_deref(), Some("Demo library"));

    let implementations = implementations(&root);
    assert_eq!(implementations.len(), VERSIONS.len());

    for (implementation, version) in implementations.iter().zip(VERSIONS) {
        assert_eq!(implementation.attribute("id"), Some(*version));

        let digest = implementation.child("manifest-digest").unwrap();
        assert_eq!(
            digest.attribute("sha1new"),
            Some(expected_digest(version, ManifestAlgorithm::Sha1New).as_str())
        );

        let file = implementation.child("file").unwrap();
        let size = jar_content(version).len().to_string();
        assert_eq!(file.attribute("size"), Some(size.as_str()));
        assert_eq!(file.attribute("dest"), Some(format!("demo-{}.jar", version).as_str()));

        let requires: Vec<&Element> = implementation.children("requires").collect();
        assert_eq!(requires.len(), 1);
        assert_eq!(
            requires[0].attribute("interface"),
            Some("http://maven.0install.net/org/slf4j/slf4j-api/")
        );
        assert_eq!(requires[0].attribute("version"), Some("1.7..!2.0"));
    }

    assert_eq!(implementations[2].attribute("version"), Some("2.0-pre"));
    assert_eq!(implementations[2].attribute("stability"), Some("developer"));
}

#[test]
fn test_add_digests_is_idempotent() {
    let repo = setup_repository();
    let feed_file = repo.path().join("demo.xml");
    let options = FeedOptions {
        digests: false,
        ..Default::default()
    };
    make_feed(repo.path().to_str().unwrap(), GROUP, ARTIFACT, &feed_file, &options).unwrap();

    let source = open_repository(repo.path().to_str().unwrap(), &RepositoryOptions::default()).unwrap();

    let first = add_digests(&feed_file, source.as_ref(), ManifestAlgorithm::Sha1New).unwrap();
    assert_eq!(first.annotated, 3);
    let annotated = fs::read_to_string(&feed_file).unwrap();

    let second = add_digests(&feed_file, source.as_ref(), ManifestAlgorithm::Sha1New).unwrap();
    assert_eq!(second.annotated, 0);
    assert_eq!(second.already_digested, 3);
    assert_eq!(fs::read_to_string(&feed_file).unwrap(), annotated);
}

#[test]
fn test_sha256_feed() {
    let repo = setup_repository();
    let feed_file = repo.path().join("demo.xml");
    let options = FeedOptions {
        algorithm: ManifestAlgorithm::Sha256,
        ..Default::default()
    };
    make_feed(repo.path().to_str().unwrap(), GROUP, ARTIFACT, &feed_file, &options).unwrap();

    let xml = fs::read_to_string(&feed_file).unwrap();
    assert!(xml.contains(&format!(
        "sha256=\"{}\"",
        expected_digest("1.0", ManifestAlgorithm::Sha256)
    )));
    assert!(!xml.contains("sha1new="));
}

#[test]
fn test_pom_packaging_feed() {
    let repo = setup_repository();
    let feed_file = repo.path().join("bom.xml");

    let report = make_feed(
        repo.path().to_str().unwrap(),
        "org/example",
        "bom",
        &feed_file,
        &FeedOptions::default(),
    )
    .unwrap();

    assert_eq!(report.implementations, 1);
    let digests = report.digests.unwrap();
    assert_eq!(digests.annotated, 0);
    assert_eq!(digests.skipped, 1);

    let root = Element::parse(&fs::read_to_string(&feed_file).unwrap()).unwrap();
    let implementation = root.child("implementation").unwrap();
    assert!(implementation.child("file").is_none());
}

#[test]
fn test_missing_jar_is_skipped() {
    let repo = setup_repository();
    fs::remove_file(repo.path().join("org/example/demo/1.0/demo-1.0.jar")).unwrap();
    let feed_file = repo.path().join("demo.xml");

    let report = make_feed(
        repo.path().to_str().unwrap(),
        GROUP,
        ARTIFACT,
        &feed_file,
        &FeedOptions::default(),
    )
    .unwrap();

    let digests = report.digests.unwrap();
    assert_eq!(digests.annotated, 2);
    assert_eq!(digests.skipped, 1);
}

#[test]
fn test_unknown_artifact() {
    let repo = setup_repository();
    let err = make_feed(
        repo.path().to_str().unwrap(),
        GROUP,
        "missing",
        &repo.path().join("missing.xml"),
        &FeedOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::NotFoundError(_)));
    assert!(!repo.path().join("missing.xml").exists());
}
