use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

/// Run the CLI with an isolated data directory and the given API URL.
pub fn run_cli_with_env(args: &[&str], data_dir: &Path, api_url: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eventdesk"));
    cmd.args(args);
    cmd.env("EVENTDESK_DATA_DIR", data_dir);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("EVENTDESK_BACKEND");
    cmd.env_remove("EVENTDESK_PASSWORD");
    match api_url {
        Some(url) => cmd.env("EVENTDESK_API_URL", url),
        None => cmd.env_remove("EVENTDESK_API_URL"),
    };
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so the mock server keeps serving.
pub async fn run_cli(args: &[&str], data_dir: &Path, api_url: Option<&str>) -> Output {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let data_dir = data_dir.to_path_buf();
    let api_url = api_url.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &data_dir, api_url.as_deref())
    })
    .await
    .expect("CLI task panicked")
}

pub fn session_file(data_dir: &Path) -> PathBuf {
    data_dir.join("auth.json")
}

pub fn read_session(data_dir: &Path) -> Value {
    let raw = std::fs::read_to_string(session_file(data_dir)).expect("session file missing");
    serde_json::from_str(&raw).expect("session file is not JSON")
}

pub fn write_session(data_dir: &Path, session: &Value) {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(session_file(data_dir), session.to_string()).unwrap();
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
