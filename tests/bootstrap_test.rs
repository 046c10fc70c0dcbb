//! Bootstrap against a temporary harness root
//!
//! External commands (git, pip) go through a recording launcher.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

use dmi_oaa::bootstrap::RUNNER_SCRIPTS;
use dmi_oaa::guard::{API_KEY_VAR, URL_VAR};
use dmi_oaa::{
    Bootstrap, BootstrapOptions, CommandSpec, HarnessConfig, OaaError, OaaResult, ProcessLauncher,
    MISSING_CREDENTIALS_MESSAGE,
};

#[derive(Default)]
struct RecordingLauncher {
    launched: Mutex<Vec<CommandSpec>>,
    fail_program: Option<&'static str>,
}

impl RecordingLauncher {
    fn programs(&self) -> Vec<String> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn launch(&self, spec: &CommandSpec) -> OaaResult<i32> {
        self.launched.lock().unwrap().push(spec.clone());
        Ok(if self.fail_program == Some(spec.program.as_str()) { 128 } else { 0 })
    }
}

fn offline() -> BootstrapOptions {
    BootstrapOptions {
        fetch_toolkit: false,
        emit_scripts: true,
    }
}

fn read_dir_sorted(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            (name, std::fs::read(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

/// Read one CSV column by header name, skipping the header row
fn column(path: &Path, name: &str) -> Vec<String> {
    let text = std::fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let index = header.iter().position(|h| *h == name).unwrap();
    lines
        .map(|line| line.split(',').nth(index).unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_bootstrap_writes_expected_layout() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();

    let report = Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();
    assert!(report.unmatched_identities.is_empty());
    assert!(!report.cloned);
    assert!(launcher.programs().is_empty());

    let hris: Vec<String> = read_dir_sorted(&temp_dir.path().join("hris_csv"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        hris,
        vec![
            "departments.csv",
            "employee_departments.csv",
            "employee_locations.csv",
            "employees.csv",
            "locations.csv",
        ]
    );

    let app: Vec<String> = read_dir_sorted(&temp_dir.path().join("dmi_csv"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        app,
        vec![
            "applications.csv",
            "entitlements.csv",
            "groups.csv",
            "permissions.csv",
            "resources.csv",
            "user_groups.csv",
            "users.csv",
        ]
    );
    assert_eq!(report.dataset_files.len(), 12);

    assert_eq!(report.scripts.len(), RUNNER_SCRIPTS.len());
    for script in &RUNNER_SCRIPTS {
        assert!(temp_dir.path().join(script.file_name).is_file());
    }
}

#[tokio::test]
async fn test_bootstrap_twice_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();
    let bootstrap = Bootstrap::new(&config, &launcher);

    bootstrap.run(offline()).await.unwrap();
    let hris_first = read_dir_sorted(&temp_dir.path().join("hris_csv"));
    let app_first = read_dir_sorted(&temp_dir.path().join("dmi_csv"));

    bootstrap.run(offline()).await.unwrap();
    assert_eq!(read_dir_sorted(&temp_dir.path().join("hris_csv")), hris_first);
    assert_eq!(read_dir_sorted(&temp_dir.path().join("dmi_csv")), app_first);
}

#[tokio::test]
async fn test_written_user_identities_exist_in_hris() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();
    Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();

    let employees: HashSet<String> =
        column(&temp_dir.path().join("hris_csv/employees.csv"), "identity")
            .into_iter()
            .collect();
    let users = column(&temp_dir.path().join("dmi_csv/users.csv"), "identity");
    assert!(!users.is_empty());
    for identity in users {
        assert!(employees.contains(&identity), "{} has no employee", identity);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_scripts_are_executable() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();
    let report = Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();

    for script in &report.scripts {
        let mode = std::fs::metadata(script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755, "{:?}", script);
    }
}

#[tokio::test]
async fn test_fetch_clones_then_installs() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();

    let report = Bootstrap::new(&config, &launcher)
        .run(BootstrapOptions::default())
        .await
        .unwrap();
    assert!(report.cloned);
    assert!(report.installed);

    let launched = launcher.launched.lock().unwrap().clone();
    assert_eq!(launched.len(), 2);
    assert_eq!(launched[0].program, "git");
    assert_eq!(launched[0].args[0], "clone");
    assert_eq!(launched[0].args[1], "https://github.com/Veza/oaa-community.git");
    assert_eq!(
        launched[0].args[2],
        temp_dir.path().join("oaa-community").to_string_lossy()
    );
    assert_eq!(launched[1].program, "python3");
    assert_eq!(launched[1].args[..4], ["-m", "pip", "install", "-r"]);
    assert!(launched[1].args[4].ends_with("oaa-community/requirements.txt"));
}

#[tokio::test]
async fn test_existing_checkout_skips_clone() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("oaa-community/.git")).unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();

    let report = Bootstrap::new(&config, &launcher)
        .run(BootstrapOptions::default())
        .await
        .unwrap();
    assert!(!report.cloned);
    assert_eq!(launcher.programs(), vec!["python3"]);
}

#[tokio::test]
async fn test_failed_clone_aborts_without_rollback() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher {
        fail_program: Some("git"),
        ..RecordingLauncher::default()
    };

    let err = Bootstrap::new(&config, &launcher)
        .run(BootstrapOptions::default())
        .await
        .unwrap_err();
    match err {
        OaaError::CommandFailed { command, code } => {
            assert!(command.starts_with("git clone "));
            assert_eq!(code, 128);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // Datasets written before the failure stay on disk; no scripts yet
    assert!(temp_dir.path().join("hris_csv/employees.csv").is_file());
    assert!(!temp_dir.path().join("run_all_imports.sh").exists());
    assert_eq!(launcher.programs(), vec!["git"]);
}

#[tokio::test]
async fn test_scripts_forward_loaded_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dmi-oaa.yaml");
    std::fs::write(&config_path, "hris_dir: people_csv\napp_dir: paper_csv\n").unwrap();
    let config = HarnessConfig::load(Some(config_path.as_path()))
        .unwrap()
        .with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();

    Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();
    assert!(temp_dir.path().join("people_csv/employees.csv").is_file());
    assert!(temp_dir.path().join("paper_csv/users.csv").is_file());

    let flag = format!("exec dmi-oaa --config '{}' import ", config_path.display());
    for script in &RUNNER_SCRIPTS {
        let text = std::fs::read_to_string(temp_dir.path().join(script.file_name)).unwrap();
        assert!(text.contains(&flag), "{}: {}", script.file_name, text);
    }
}

#[tokio::test]
async fn test_scripts_without_config_use_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();
    Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("run_hris_import.sh")).unwrap();
    assert!(!text.contains("--config"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_scripts_refuse_to_run_without_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("invoked");
    let config = HarnessConfig {
        cli_program: format!("touch {}", marker.display()),
        ..HarnessConfig::default()
    }
    .with_root(temp_dir.path());
    let launcher = RecordingLauncher::default();
    let report = Bootstrap::new(&config, &launcher).run(offline()).await.unwrap();

    let run = |script: &Path, url: Option<&str>, key: Option<&str>| {
        let mut command = std::process::Command::new("sh");
        command
            .arg(script)
            .current_dir(temp_dir.path())
            .env_remove(URL_VAR)
            .env_remove(API_KEY_VAR);
        if let Some(url) = url {
            command.env(URL_VAR, url);
        }
        if let Some(key) = key {
            command.env(API_KEY_VAR, key);
        }
        command.output().unwrap()
    };

    for script in &report.scripts {
        for (url, key) in [
            (None, None),
            (Some("https://veza.example"), None),
            (Some("https://veza.example"), Some("")),
            (Some(""), Some("secret-key")),
        ] {
            let output = run(script.as_path(), url, key);
            assert_eq!(output.status.code(), Some(1), "{:?}", script);
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(stderr.contains(MISSING_CREDENTIALS_MESSAGE), "{:?}: {}", script, stderr);
            assert!(!marker.exists(), "{:?} invoked the CLI", script);
        }
    }

    // With both set the script reaches the CLI
    let output = run(report.scripts[0].as_path(), Some("https://veza.example"), Some("secret-key"));
    assert!(output.status.success());
    assert!(marker.exists());
}
