//! Source retrieval tests against a mocked HTTP server.

mod common;

use common::*;
use log4cxx_recipe::{Context, Log4cxx, Os, Recipe, RecipeError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARCHIVE: &str = "apache-log4cxx-0.13.0.tar.gz";

/// Tarball laid out like the upstream release, including a fixture whose
/// name ends in a colon.
fn upstream_tarball(dir: &std::path::Path) -> Vec<u8> {
    let path = dir.join(ARCHIVE);
    make_tar_gz(
        &path,
        &[
            ("apache-log4cxx-0.13.0/LICENSE", "Apache License 2.0"),
            ("apache-log4cxx-0.13.0/NOTICE", "Apache log4cxx"),
            ("apache-log4cxx-0.13.0/CMakeLists.txt", "project(log4cxx)"),
            ("apache-log4cxx-0.13.0/src/test/resources/output/xyz/:", "fixture"),
        ],
    );
    std::fs::read(path).unwrap()
}

fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}

async fn serve(body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/dist/{}", ARCHIVE)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_source_downloads_and_unpacks() {
    let scratch = tempfile::TempDir::new().unwrap();
    let body = upstream_tarball(scratch.path());
    let server = serve(body.clone()).await;

    let url = format!("{}/dist/{}", server.uri(), ARCHIVE);
    let (_dir, recipe_dir, workspace) = create_test_env(&manifest_for(&url, &sha256_hex(&body)));
    let ctx = Context::new(&recipe_dir).workspace(&workspace);
    let mut state = log4cxx_state(ctx, settings(Os::Linux), options(false));

    Log4cxx.layout(&mut state).unwrap();
    Log4cxx.source(&mut state).unwrap();

    let src = workspace.join("src");
    assert_eq!(state.layout.source_folder, src);
    assert!(src.join("LICENSE").is_file());
    assert!(src.join("NOTICE").is_file());
    assert!(src.join("CMakeLists.txt").is_file());
    assert!(!src.join("src/test/resources/output/xyz").exists());
    assert!(workspace.join("downloads").join(ARCHIVE).is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_source_rejects_checksum_mismatch() {
    let scratch = tempfile::TempDir::new().unwrap();
    let body = upstream_tarball(scratch.path());
    let server = serve(body).await;

    let url = format!("{}/dist/{}", server.uri(), ARCHIVE);
    let wrong = "1".repeat(64);
    let (_dir, recipe_dir, workspace) = create_test_env(&manifest_for(&url, &wrong));
    let ctx = Context::new(&recipe_dir).workspace(&workspace);
    let mut state = log4cxx_state(ctx, settings(Os::Linux), options(false));

    Log4cxx.layout(&mut state).unwrap();
    let err = Log4cxx.source(&mut state).unwrap_err();

    assert!(matches!(err, RecipeError::Sha256Mismatch { .. }));
    assert!(!workspace.join("src").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_source_reports_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/dist/{}", server.uri(), ARCHIVE);
    let (_dir, recipe_dir, workspace) = create_test_env(&manifest_for(&url, "00"));
    let ctx = Context::new(&recipe_dir).workspace(&workspace);
    let mut state = log4cxx_state(ctx, settings(Os::Linux), options(false));

    Log4cxx.layout(&mut state).unwrap();
    let err = Log4cxx.source(&mut state).unwrap_err();
    assert!(matches!(err, RecipeError::Download { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_package_copies_licenses() {
    let scratch = tempfile::TempDir::new().unwrap();
    let body = upstream_tarball(scratch.path());
    let server = serve(body.clone()).await;

    let url = format!("{}/dist/{}", server.uri(), ARCHIVE);
    let (_dir, recipe_dir, workspace) = create_test_env(&manifest_for(&url, &sha256_hex(&body)));
    let ctx = Context::new(&recipe_dir).workspace(&workspace);
    let mut state = log4cxx_state(ctx, settings(Os::Linux), options(false));

    Log4cxx.layout(&mut state).unwrap();
    Log4cxx.source(&mut state).unwrap();

    let licenses = state.layout.package_folder.join("licenses");
    for name in ["LICENSE", "NOTICE"] {
        log4cxx_recipe::tools::files::copy(
            &state.ctx,
            name,
            &state.layout.source_folder,
            &licenses,
        )
        .unwrap();
    }
    assert_eq!(
        std::fs::read_to_string(licenses.join("LICENSE")).unwrap(),
        "Apache License 2.0"
    );
    assert!(licenses.join("NOTICE").is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_source_falls_back_to_next_mirror() {
    let scratch = tempfile::TempDir::new().unwrap();
    let body = upstream_tarball(scratch.path());

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/gone/{}", ARCHIVE)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/dist/{}", ARCHIVE)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = format!(
        "[sources.\"{}\"]\nurl = [\"{}/gone/{}\", \"{}/dist/{}\"]\nsha256 = \"{}\"\n",
        VERSION,
        server.uri(),
        ARCHIVE,
        server.uri(),
        ARCHIVE,
        sha256_hex(&body)
    );
    let (_dir, recipe_dir, workspace) = create_test_env(&manifest);
    let ctx = Context::new(&recipe_dir).workspace(&workspace);
    let mut state = log4cxx_state(ctx, settings(Os::Linux), options(false));

    Log4cxx.layout(&mut state).unwrap();
    Log4cxx.source(&mut state).unwrap();

    assert!(workspace.join("src").join("CMakeLists.txt").is_file());
    assert!(workspace.join("downloads").join(ARCHIVE).is_file());
}
