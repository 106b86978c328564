use super::*;
use std::collections::HashMap;

fn request<'a>(
    row_id: &str,
    command: &'a str,
    logs_dir: &'a Path,
    env_vars: &'a HashMap<String, String>,
) -> SpawnRequest<'a> {
    SpawnRequest {
        row_id: RowId::new(row_id),
        command,
        cwd: None,
        gpu_assignment: GpuAssignment::None,
        env_vars,
        env_prefixes: EnvPrefixes::default(),
        extra_args: &[],
        logs_dir,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn spawn_marks_long_running_process_as_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_vars = HashMap::new();
    let supervisor = ProcessSupervisor::new();

    supervisor
        .spawn(request("row-1", "sleep 5", dir.path(), &env_vars))
        .await
        .expect("spawn");

    let status = supervisor.status(&RowId::new("row-1")).await.expect("status");
    assert_eq!(status.state, ProcessState::Running);
    assert!(supervisor.is_running(&RowId::new("row-1")).await);

    supervisor.stop(&RowId::new("row-1")).await.expect("stop");
}

#[tokio::test(flavor = "multi_thread")]
async fn spawn_rejects_duplicate_row_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_vars = HashMap::new();
    let supervisor = ProcessSupervisor::new();

    supervisor
        .spawn(request("row-1", "sleep 5", dir.path(), &env_vars))
        .await
        .expect("spawn");

    let err = supervisor
        .spawn(request("row-1", "sleep 5", dir.path(), &env_vars))
        .await
        .unwrap_err();
    assert!(matches!(err, SupervisorError::AlreadyRunning(_)));

    supervisor.stop(&RowId::new("row-1")).await.expect("stop");
}

#[tokio::test(flavor = "multi_thread")]
async fn spawn_reports_failure_for_immediately_exiting_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_vars = HashMap::new();
    let supervisor = ProcessSupervisor::new();

    let err = supervisor
        .spawn(request("row-1", "false", dir.path(), &env_vars))
        .await
        .unwrap_err();
    assert!(matches!(err, SupervisorError::SpawnFailed { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_on_unknown_row_errors() {
    let supervisor = ProcessSupervisor::new();
    let err = supervisor.stop(&RowId::new("missing")).await.unwrap_err();
    assert!(matches!(err, SupervisorError::UnknownRow(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn open_log_viewer_is_false_for_unknown_row() {
    let supervisor = ProcessSupervisor::new();
    assert!(!supervisor.open_log_viewer(&RowId::new("missing")).await);
}

#[test]
fn open_log_viewer_for_path_is_false_when_no_log_file_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(!ProcessSupervisor::open_log_viewer_for_path(dir.path(), &RowId::new("row-1")));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_reports_return_code_after_process_exits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_vars = HashMap::new();
    let supervisor = ProcessSupervisor::new();

    supervisor
        .spawn(request("row-1", "sleep 3 && exit 0", dir.path(), &env_vars))
        .await
        .expect("spawn");

    tokio::time::sleep(Duration::from_secs(4)).await;

    let status = supervisor.status(&RowId::new("row-1")).await.expect("status");
    assert_eq!(status.state, ProcessState::Exited);
    assert_eq!(status.return_code, Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn cleanup_completed_removes_finished_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_vars = HashMap::new();
    let supervisor = ProcessSupervisor::new();

    supervisor
        .spawn(request("row-1", "exit 0", dir.path(), &env_vars))
        .await
        .ok();

    tokio::time::sleep(Duration::from_secs(1)).await;
    supervisor.cleanup_completed().await;
    assert!(!supervisor.is_running(&RowId::new("row-1")).await);
}
