//! End-to-end reconciliation scenarios against local HTTP fixtures.
//!
//! The resolver's endpoint override is process-global, so every test here
//! is `#[serial]`.

use almd::lockfile::Lockfile;
use almd::manifest::Manifest;
use almd::ops::{self, AddRequest, InstallRequest};
use almd::resolver::testing::override_endpoints;
use almd::utils::checksum::sha256_hash;
use serial_test::serial;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHA: &str = "abcdef0123456789abcdef0123456789abcdef01";
const SHA_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const SHA_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Serve `content` for the raw path `/{owner}/{repo}/{reference}/{file}`.
async fn mock_raw(server: &MockServer, route: &str, content: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

/// Serve a commits-API answer resolving `reference` to `sha`.
async fn mock_resolve(server: &MockServer, owner_repo: &str, reference: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner_repo}/commits")))
        .and(query_param("sha", reference))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "sha": sha }])),
        )
        .mount(server)
        .await;
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    Manifest::new("demo").save(temp.path()).unwrap();
    temp
}

#[tokio::test]
#[serial]
async fn add_shorthand_with_tag_ref_pins_commit() {
    let server = MockServer::start().await;
    mock_raw(&server, "/octocat/hello/main/README.md", "hello readme").await;
    mock_resolve(&server, "octocat/hello", "main", SHA).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    let outcome = ops::add(
        temp.path(),
        AddRequest {
            source: "github:octocat/hello/README.md@main".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.name, "README");
    assert_eq!(outcome.path, "src/lib/README.md");
    assert_eq!(outcome.hash, format!("commit:{SHA}"));

    let manifest = Manifest::load(temp.path()).unwrap();
    let dep = &manifest.dependencies["README"];
    assert_eq!(dep.source, "github:octocat/hello/README.md@main");
    assert_eq!(dep.path, "src/lib/README.md");

    let lockfile = Lockfile::load(temp.path()).unwrap();
    let entry = &lockfile.package["README"];
    assert_eq!(entry.hash, format!("commit:{SHA}"));
    // The locked source carries the resolved SHA, not the symbolic ref.
    assert_eq!(
        entry.source,
        format!("{}/octocat/hello/{SHA}/README.md", server.uri())
    );

    let installed = std::fs::read_to_string(temp.path().join("src/lib/README.md")).unwrap();
    assert_eq!(installed, "hello readme");
}

#[tokio::test]
#[serial]
async fn add_falls_back_to_content_hash_when_resolution_fails() {
    let server = MockServer::start().await;
    mock_raw(&server, "/octocat/hello/main/README.md", "hello readme").await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello/commits"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    let outcome = ops::add(
        temp.path(),
        AddRequest {
            source: "github:octocat/hello/README.md@main".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.hash, sha256_hash(b"hello readme"));

    let lockfile = Lockfile::load(temp.path()).unwrap();
    let entry = &lockfile.package["README"];
    assert!(entry.hash.starts_with("sha256:"));
    // Without a resolved SHA the URL keeps the symbolic ref.
    assert_eq!(
        entry.source,
        format!("{}/octocat/hello/main/README.md", server.uri())
    );
}

#[tokio::test]
#[serial]
async fn add_with_full_sha_ref_skips_resolution() {
    let server = MockServer::start().await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA}/README.md"),
        "pinned readme",
    )
    .await;
    // No commits-API mock mounted: a resolver call would 404 and force the
    // sha256 fallback, failing the assertion below.
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    let outcome = ops::add(
        temp.path(),
        AddRequest {
            source: format!("github:octocat/hello/README.md@{SHA}"),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.hash, format!("commit:{SHA}"));
}

#[tokio::test]
#[serial]
async fn add_cleans_up_file_when_manifest_is_missing() {
    let server = MockServer::start().await;
    mock_raw(&server, "/octocat/hello/main/README.md", "hello").await;
    mock_resolve(&server, "octocat/hello", "main", SHA).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    // No project.toml in this directory.
    let temp = TempDir::new().unwrap();
    let err = ops::add(
        temp.path(),
        AddRequest {
            source: "github:octocat/hello/README.md@main".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("project.toml"));

    // The downloaded file was rolled back.
    assert!(!temp.path().join("src/lib/README.md").exists());
}

#[tokio::test]
#[serial]
async fn add_respects_dir_and_name_overrides() {
    let server = MockServer::start().await;
    mock_raw(&server, "/rxi/json.lua/main/json.lua", "return json").await;
    mock_resolve(&server, "rxi/json.lua", "main", SHA).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    let outcome = ops::add(
        temp.path(),
        AddRequest {
            source: "github:rxi/json.lua/json.lua@main".to_string(),
            target_dir: Some("vendor/lua".into()),
            name_override: Some("codec".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.name, "codec");
    assert_eq!(outcome.path, "vendor/lua/codec.lua");
    assert!(temp.path().join("vendor/lua/codec.lua").exists());

    let manifest = Manifest::load(temp.path()).unwrap();
    assert!(manifest.dependencies.contains_key("codec"));
}

/// Seed a project whose manifest and lockfile agree on one dependency.
fn seeded_project(server_uri: &str, locked_hash: &str, with_file: bool) -> TempDir {
    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "readme",
        "github:octocat/hello/README.md@main".to_string(),
        "src/lib/README.md".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    let mut lockfile = Lockfile::new();
    lockfile.add_or_update(
        "readme",
        format!("{server_uri}/octocat/hello/{SHA_A}/README.md"),
        "src/lib/README.md".to_string(),
        locked_hash.to_string(),
    );
    lockfile.save(temp.path()).unwrap();

    if with_file {
        let file = temp.path().join("src/lib/README.md");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "old contents").unwrap();
    }
    temp
}

#[tokio::test]
#[serial]
async fn install_reinstalls_when_pinned_commit_moved() {
    let server = MockServer::start().await;
    mock_resolve(&server, "octocat/hello", "main", SHA_B).await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA_B}/README.md"),
        "new contents",
    )
    .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = seeded_project(&server.uri(), &format!("commit:{SHA_A}"), true);
    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 1);
    assert_eq!(report.failed, 0);

    let lockfile = Lockfile::load(temp.path()).unwrap();
    let entry = &lockfile.package["readme"];
    assert_eq!(entry.hash, format!("commit:{SHA_B}"));
    assert_eq!(
        entry.source,
        format!("{}/octocat/hello/{SHA_B}/README.md", server.uri())
    );
    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/lib/README.md")).unwrap(),
        "new contents"
    );

    // Lock equivalence: an immediate second pass does nothing.
    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 0);
    assert_eq!(report.up_to_date, 1);
}

#[tokio::test]
#[serial]
async fn install_refetches_locally_deleted_file() {
    let server = MockServer::start().await;
    mock_resolve(&server, "octocat/hello", "main", SHA_A).await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA_A}/README.md"),
        "same contents",
    )
    .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = seeded_project(&server.uri(), &format!("commit:{SHA_A}"), false);
    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 1);

    // Hash is unchanged: the same commit was reinstalled.
    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert_eq!(lockfile.package["readme"].hash, format!("commit:{SHA_A}"));
    assert!(temp.path().join("src/lib/README.md").exists());
}

#[tokio::test]
#[serial]
async fn install_up_to_date_project_does_nothing() {
    let server = MockServer::start().await;
    mock_resolve(&server, "octocat/hello", "main", SHA_A).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = seeded_project(&server.uri(), &format!("commit:{SHA_A}"), true);
    let lock_before =
        std::fs::read_to_string(temp.path().join("almd-lock.toml")).unwrap();

    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 0);
    assert_eq!(report.up_to_date, 1);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("almd-lock.toml")).unwrap(),
        lock_before
    );
}

#[tokio::test]
#[serial]
async fn install_force_reinstalls_up_to_date_project() {
    let server = MockServer::start().await;
    mock_resolve(&server, "octocat/hello", "main", SHA_A).await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA_A}/README.md"),
        "forced contents",
    )
    .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = seeded_project(&server.uri(), &format!("commit:{SHA_A}"), true);
    let report = ops::install(
        temp.path(),
        InstallRequest {
            force: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(report.installed, 1);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/lib/README.md")).unwrap(),
        "forced contents"
    );
}

#[tokio::test]
#[serial]
async fn install_isolates_one_failing_dependency() {
    let server = MockServer::start().await;
    // "bad" resolves but its raw download answers 500; "good" works fully.
    mock_resolve(&server, "u/bad", "main", SHA_A).await;
    Mock::given(method("GET"))
        .and(path(format!("/u/bad/{SHA_A}/bad.lua")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mock_resolve(&server, "u/good", "main", SHA_B).await;
    mock_raw(&server, &format!("/u/good/{SHA_B}/good.lua"), "return good").await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "bad",
        "github:u/bad/bad.lua@main".to_string(),
        "src/lib/bad.lua".to_string(),
    );
    manifest.upsert_dependency(
        "good",
        "github:u/good/good.lua@main".to_string(),
        "src/lib/good.lua".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    // One success, one failure: the pass still succeeds.
    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 1);
    assert_eq!(report.failed, 1);

    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert!(lockfile.get("bad").is_none());
    assert_eq!(lockfile.package["good"].hash, format!("commit:{SHA_B}"));
    assert!(temp.path().join("src/lib/good.lua").exists());
    assert!(!temp.path().join("src/lib/bad.lua").exists());
}

#[tokio::test]
#[serial]
async fn install_fails_when_nothing_succeeds() {
    let server = MockServer::start().await;
    mock_resolve(&server, "u/bad", "main", SHA_A).await;
    // No raw mock: every download 404s.
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "bad",
        "github:u/bad/bad.lua@main".to_string(),
        "src/lib/bad.lua".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    let err = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no dependency could be installed"));
    // Nothing was locked.
    assert!(Lockfile::load(temp.path()).is_err());
}

#[tokio::test]
#[serial]
async fn install_named_subset_only_touches_those() {
    let server = MockServer::start().await;
    mock_resolve(&server, "u/one", "main", SHA_A).await;
    mock_raw(&server, &format!("/u/one/{SHA_A}/one.lua"), "return one").await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "one",
        "github:u/one/one.lua@main".to_string(),
        "src/lib/one.lua".to_string(),
    );
    manifest.upsert_dependency(
        "two",
        "github:u/two/two.lua@main".to_string(),
        "src/lib/two.lua".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    let report = ops::install(
        temp.path(),
        InstallRequest {
            names: vec!["one".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(report.installed, 1);

    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert!(lockfile.get("one").is_some());
    assert!(lockfile.get("two").is_none());
    assert!(!temp.path().join("src/lib/two.lua").exists());
}

#[tokio::test]
#[serial]
async fn install_unknown_name_is_fatal() {
    let temp = project();
    let err = ops::install(
        temp.path(),
        InstallRequest {
            names: vec!["ghost".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
#[serial]
async fn remove_prunes_empty_parent_directories() {
    let server = MockServer::start().await;
    mock_raw(&server, "/u/r/main/foo.lua", "return foo").await;
    mock_resolve(&server, "u/r", "main", SHA).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    ops::add(
        temp.path(),
        AddRequest {
            source: "github:u/r/foo.lua@main".to_string(),
            target_dir: Some("libs/sub".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(temp.path().join("libs/sub/foo.lua").exists());

    ops::remove(temp.path(), "foo").unwrap();

    assert!(!temp.path().join("libs/sub").exists());
    assert!(!temp.path().join("libs").exists());
    assert!(temp.path().join("project.toml").exists());
    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert!(lockfile.get("foo").is_none());
}

#[tokio::test]
#[serial]
async fn install_locks_unlocked_dependency() {
    let server = MockServer::start().await;
    mock_resolve(&server, "octocat/hello", "main", SHA_A).await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA_A}/README.md"),
        "fresh checkout",
    )
    .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    // Manifest entry exists (say, hand-edited or merged in), lockfile does
    // not.
    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "readme",
        "github:octocat/hello/README.md@main".to_string(),
        "src/lib/README.md".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 1);

    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert_eq!(lockfile.api_version, "1");
    assert_eq!(lockfile.package["readme"].hash, format!("commit:{SHA_A}"));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/lib/README.md")).unwrap(),
        "fresh checkout"
    );
}

#[tokio::test]
#[serial]
async fn install_upgrades_content_lock_to_commit_pin() {
    let server = MockServer::start().await;
    mock_raw(
        &server,
        &format!("/octocat/hello/{SHA_A}/README.md"),
        "pinned now",
    )
    .await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    // The manifest pins a full SHA but an older run could only lock a
    // content hash: the hash-type conflict rule forces a reinstall that
    // upgrades the lock to a commit pin.
    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "readme",
        format!("github:octocat/hello/README.md@{SHA_A}"),
        "src/lib/README.md".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    let mut lockfile = Lockfile::new();
    lockfile.add_or_update(
        "readme",
        format!("{}/octocat/hello/main/README.md", server.uri()),
        "src/lib/README.md".to_string(),
        sha256_hash(b"old contents"),
    );
    lockfile.save(temp.path()).unwrap();

    let file = temp.path().join("src/lib/README.md");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, "old contents").unwrap();

    let report = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap();
    assert_eq!(report.installed, 1);

    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert_eq!(lockfile.package["readme"].hash, format!("commit:{SHA_A}"));
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "pinned now"
    );
}

#[tokio::test]
#[serial]
async fn install_with_corrupt_lockfile_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut manifest = Manifest::new("demo");
    manifest.upsert_dependency(
        "readme",
        "github:octocat/hello/README.md@main".to_string(),
        "src/lib/README.md".to_string(),
    );
    manifest.save(temp.path()).unwrap();
    std::fs::write(temp.path().join("almd-lock.toml"), "api_version = [broken").unwrap();

    let err = ops::install(temp.path(), InstallRequest::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid lockfile"));
}

#[tokio::test]
#[serial]
async fn add_replaces_existing_dependency_entry() {
    let server = MockServer::start().await;
    mock_raw(&server, "/u/r/v2/json.lua", "return v2").await;
    mock_resolve(&server, "u/r", "v2", SHA_B).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    // Seed an older entry under the same name.
    let mut manifest = Manifest::load(temp.path()).unwrap();
    manifest.upsert_dependency(
        "json",
        "github:u/r/json.lua@v1".to_string(),
        "src/lib/json.lua".to_string(),
    );
    manifest.save(temp.path()).unwrap();

    ops::add(
        temp.path(),
        AddRequest {
            source: "github:u/r/json.lua@v2".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let manifest = Manifest::load(temp.path()).unwrap();
    assert_eq!(manifest.dependencies.len(), 1);
    assert_eq!(manifest.dependencies["json"].source, "github:u/r/json.lua@v2");

    let lockfile = Lockfile::load(temp.path()).unwrap();
    assert_eq!(lockfile.package["json"].hash, format!("commit:{SHA_B}"));
}

#[tokio::test]
#[serial]
async fn add_accepts_repository_blob_url() {
    let server = MockServer::start().await;
    mock_raw(&server, "/kikito/inspect.lua/master/inspect.lua", "return inspect").await;
    mock_resolve(&server, "kikito/inspect.lua", "master", SHA).await;
    let _guard = override_endpoints(&server.uri(), &server.uri());

    let temp = project();
    let outcome = ops::add(
        temp.path(),
        AddRequest {
            // github.com blob URLs canonicalize to the shorthand form.
            source: "https://github.com/kikito/inspect.lua/blob/master/inspect.lua".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.name, "inspect");
    let manifest = Manifest::load(temp.path()).unwrap();
    assert_eq!(
        manifest.dependencies["inspect"].source,
        "github:kikito/inspect.lua/inspect.lua@master"
    );
}
