//! Staging behaviour for every supported source form.

use bpctl_core::artifact::ArtifactStager;
use bpctl_core::{Error, StagingError};
use bpctl_stager::LocalStager;
use bpctl_stager::archive::zip_directory;
use httpmock::prelude::*;
use std::fs::File;
use std::path::Path;

fn write_archive(path: &Path) {
    let src = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("VERSION"), "1.0.0\n").unwrap();
    zip_directory(src.path(), path).unwrap();
}

#[tokio::test]
async fn test_zip_archive_is_used_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("buildpack.zip");
    write_archive(&archive);

    let stager = LocalStager::new().unwrap();
    let staged = stager.stage(archive.to_str().unwrap()).await.unwrap();
    assert_eq!(staged, archive);
}

#[tokio::test]
async fn test_archive_is_recognized_by_content_not_extension() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("buildpack-v1.2.3");
    write_archive(&archive);

    let stager = LocalStager::new().unwrap();
    let staged = stager.stage(archive.to_str().unwrap()).await.unwrap();
    assert_eq!(staged, archive);
}

#[tokio::test]
async fn test_missing_zip_is_not_found() {
    let src = tempfile::tempdir().unwrap();
    let source = src.path().join("buildpack.zip").to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert_eq!(err, Error::Staging(StagingError::NotFound { path: source }));
}

#[tokio::test]
async fn test_non_archive_file_is_unrecognized() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();
    let source = notes.to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert_eq!(
        err,
        Error::Staging(StagingError::UnrecognizedFormat { path: source })
    );
}

#[tokio::test]
async fn test_fake_zip_extension_is_unrecognized() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("buildpack.zip");
    std::fs::write(&fake, "not a zip").unwrap();
    let source = fake.to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert_eq!(
        err,
        Error::Staging(StagingError::UnrecognizedFormat { path: source })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_path_through_a_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain-file");
    std::fs::write(&file, "x").unwrap();
    let source = file.join("buildpack.zip").to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Staging(StagingError::Unreadable { path, .. }) if path == source
    ));
}

#[tokio::test]
async fn test_directory_is_zipped_into_staging_dir() {
    let src = tempfile::tempdir().unwrap();
    let bp = src.path().join("my-buildpack");
    std::fs::create_dir_all(bp.join("bin")).unwrap();
    std::fs::write(bp.join("bin/detect"), "#!/bin/sh\n").unwrap();
    std::fs::write(bp.join("VERSION"), "1.0.0\n").unwrap();

    let stager = LocalStager::new().unwrap();
    let staged = stager.stage(bp.to_str().unwrap()).await.unwrap();

    assert_eq!(staged, stager.staging_dir().join("my-buildpack.zip"));
    let zip = zip::ZipArchive::new(File::open(&staged).unwrap()).unwrap();
    let names: Vec<&str> = zip.file_names().collect();
    assert!(names.contains(&"bin/detect"));
    assert!(names.contains(&"VERSION"));
}

#[tokio::test]
async fn test_empty_directory_is_rejected() {
    let src = tempfile::tempdir().unwrap();
    let source = src.path().to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert_eq!(
        err,
        Error::Staging(StagingError::EmptyDirectory { path: source })
    );
}

#[tokio::test]
async fn test_missing_path_is_not_found() {
    let src = tempfile::tempdir().unwrap();
    let missing = src.path().join("nope");
    let source = missing.to_str().unwrap().to_string();

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&source).await.unwrap_err();

    assert_eq!(err, Error::Staging(StagingError::NotFound { path: source }));
}

#[tokio::test]
async fn test_url_is_downloaded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/releases/ruby_buildpack.zip");
            then.status(200).body("zip-bytes");
        })
        .await;

    let stager = LocalStager::new().unwrap();
    let staged = stager
        .stage(&server.url("/releases/ruby_buildpack.zip"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(staged, stager.staging_dir().join("ruby_buildpack.zip"));
    assert_eq!(std::fs::read(&staged).unwrap(), b"zip-bytes");
}

#[tokio::test]
async fn test_download_name_cannot_escape_staging_dir() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body("zip-bytes");
        })
        .await;

    let stager = LocalStager::new().unwrap();
    let staged = stager
        .stage(&server.url("/r/..%2F..%2Fescape.zip"))
        .await
        .unwrap();

    assert_eq!(staged, stager.staging_dir().join("buildpack.zip"));
    assert_eq!(std::fs::read(&staged).unwrap(), b"zip-bytes");
}

#[tokio::test]
async fn test_failed_download_is_staging_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404);
        })
        .await;

    let stager = LocalStager::new().unwrap();
    let err = stager.stage(&server.url("/missing.zip")).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Staging(StagingError::Download { message, .. }) if message.contains("404")
    ));
}
