// ABOUTME: Integration tests for the docker CLI plane against a stub binary.
// ABOUTME: Asserts argv shapes, idempotence mappings, and cleanup invariants.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use restack::cluster::{
    CommandErrorKind, ExtractOps, ImageOps, NetworkOps, RegistryAuth, RolloutOrder, RolloutPolicy,
    ServiceOps, StackOps, SwarmPlane, VolumeOps,
};
use restack::types::{ImageRef, ServiceName, StackName};

/// Install a stub docker script into its own directory. Every invocation
/// appends its argv (and any stdin, for `login`) to `<dir>/log`.
fn stub_docker(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("docker");
    let script = format!(
        "#!/bin/sh\nLOG=\"$(dirname \"$0\")/log\"\necho \"$@\" >> \"$LOG\"\n{body}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn read_log(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn plane(stub: &Path) -> SwarmPlane {
    SwarmPlane::new(Duration::from_secs(5)).with_binary(stub.to_string_lossy().into_owned())
}

#[tokio::test]
async fn create_network_succeeds_when_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "echo abc123net");

    let id = plane(&stub)
        .create_network("monitoring_net", "overlay")
        .await
        .unwrap();

    assert_eq!(id.as_str(), "abc123net");
    assert_eq!(
        read_log(dir.path()),
        vec!["network create --driver overlay monitoring_net"]
    );
}

#[tokio::test]
async fn create_network_treats_already_exists_as_success() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(
        dir.path(),
        r#"echo "Error response from daemon: network with name monitoring_net already exists" >&2
exit 1"#,
    );

    let id = plane(&stub)
        .create_network("monitoring_net", "overlay")
        .await
        .unwrap();
    assert_eq!(id.as_str(), "monitoring_net");
}

#[tokio::test]
async fn create_network_propagates_real_failures() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "echo \"permission denied\" >&2\nexit 1");

    let err = plane(&stub)
        .create_network("monitoring_net", "overlay")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CommandErrorKind::Exited);
    assert_eq!(err.stderr(), Some("permission denied"));
}

#[tokio::test]
async fn remove_stack_tolerates_an_absent_stack() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(
        dir.path(),
        "echo \"Nothing found in stack: monitoring\" >&2\nexit 1",
    );

    plane(&stub)
        .remove_stack(&StackName::new("monitoring").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_stack_propagates_other_failures() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "echo \"daemon unreachable\" >&2\nexit 1");

    let err = plane(&stub)
        .remove_stack(&StackName::new("monitoring").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.stderr(), Some("daemon unreachable"));
}

#[tokio::test]
async fn list_volumes_parses_one_name_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(
        dir.path(),
        "printf 'monitoring_prometheus\\nbackend_data\\n'",
    );

    let volumes = plane(&stub).list_volumes().await.unwrap();
    assert_eq!(volumes, vec!["monitoring_prometheus", "backend_data"]);
    assert_eq!(
        read_log(dir.path()),
        vec!["volume ls --format {{.Name}}"]
    );
}

#[tokio::test]
async fn update_service_builds_the_full_rollout_argv() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "echo rolling");

    let policy = RolloutPolicy {
        parallelism: 2,
        delay: Duration::from_secs(30),
        order: RolloutOrder::StartFirst,
    };
    let output = plane(&stub)
        .update_service(
            &ServiceName::new("rmw_backend").unwrap(),
            &ImageRef::parse("steelduck1/rmw-backend:latest").unwrap(),
            &policy,
            true,
        )
        .await
        .unwrap();

    assert_eq!(output.trim(), "rolling");
    assert_eq!(
        read_log(dir.path()),
        vec![
            "service update --force --image steelduck1/rmw-backend:latest \
             --update-parallelism 2 --update-delay 30s --update-order start-first \
             --with-registry-auth rmw_backend"
        ]
    );
}

#[tokio::test]
async fn pull_with_auth_logs_in_first_and_pipes_the_password() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(
        dir.path(),
        r#"if [ "$1" = "login" ]; then cat >> "$LOG"; echo "" >> "$LOG"; fi"#,
    );

    let auth = RegistryAuth {
        username: "ci-bot".to_string(),
        password: "dckr_pat_token".to_string(),
    };
    plane(&stub)
        .pull_image(
            &ImageRef::parse("steelduck1/rmw-backend:latest").unwrap(),
            Some(&auth),
        )
        .await
        .unwrap();

    let log = read_log(dir.path());
    assert_eq!(log[0], "login --username ci-bot --password-stdin");
    assert_eq!(log[1], "dckr_pat_token", "password arrives via stdin");
    assert_eq!(log[2], "pull steelduck1/rmw-backend:latest");
}

#[tokio::test]
async fn pull_without_auth_skips_the_login() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "");

    plane(&stub)
        .pull_image(
            &ImageRef::parse("steelduck1/rmw-backend:latest").unwrap(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        read_log(dir.path()),
        vec!["pull steelduck1/rmw-backend:latest"]
    );
}

#[tokio::test]
async fn deploy_stack_points_at_the_definition_inside_the_dir() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), "echo creating");

    let definition_dir = tempfile::tempdir().unwrap();
    plane(&stub)
        .deploy_stack(
            &StackName::new("monitoring").unwrap(),
            definition_dir.path(),
            "docker-stack.yml",
            false,
        )
        .await
        .unwrap();

    let expected = format!(
        "stack deploy --compose-file {} monitoring",
        definition_dir.path().join("docker-stack.yml").display()
    );
    assert_eq!(read_log(dir.path()), vec![expected]);
}

#[tokio::test]
async fn extract_copies_out_of_a_created_container() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(dir.path(), r#"if [ "$1" = "create" ]; then echo cid42; fi"#);

    let dest = tempfile::tempdir().unwrap();
    plane(&stub)
        .extract_files(
            &ImageRef::parse("steelduck1/rmw-monitoring:latest").unwrap(),
            "/opt/monitoring",
            dest.path(),
        )
        .await
        .unwrap();

    let log = read_log(dir.path());
    assert_eq!(log[0], "create steelduck1/rmw-monitoring:latest");
    assert_eq!(
        log[1],
        format!("cp cid42:/opt/monitoring/. {}", dest.path().display())
    );
    assert_eq!(log[2], "rm -f cid42");
}

#[tokio::test]
async fn extraction_container_is_removed_even_when_the_copy_fails() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_docker(
        dir.path(),
        r#"case "$1" in
create) echo cid42 ;;
cp) echo "no such path" >&2; exit 1 ;;
esac"#,
    );

    let dest = tempfile::tempdir().unwrap();
    let err = plane(&stub)
        .extract_files(
            &ImageRef::parse("steelduck1/rmw-monitoring:latest").unwrap(),
            "/opt/monitoring",
            dest.path(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stderr(), Some("no such path"));
    let log = read_log(dir.path());
    assert_eq!(
        log.last().unwrap(),
        "rm -f cid42",
        "container must be removed despite the failed copy"
    );
}
