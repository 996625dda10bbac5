//! Integration tests for crash-analyzer

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// Command isolated from the user's config, cache and token
    fn crash_analyzer(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("crash-analyzer");
        cmd.env("CRASH_ANALYZER_CONFIG", temp.path().join("config.toml"))
            .env("CRASH_ANALYZER_HOME", temp.path().join("env"))
            .env_remove("GITLAB_TOKEN")
            .env("CI", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("debug crash dumps from CI jobs"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("crash-analyzer"));
    }

    #[test]
    fn config_path_follows_env() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[gitlab]"))
            .stdout(predicate::str::contains("windows_msi_and_bosh_zip_x64-a7"));
    }

    #[test]
    fn config_init_then_set() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(temp.path().join("config.toml").is_file());

        crash_analyzer(&temp)
            .args(["config", "set", "resolve.package_job", "windows_msi_x64"])
            .assert()
            .success();
        crash_analyzer(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("windows_msi_x64"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "[gitlab\nurl = ").unwrap();
        crash_analyzer(&temp)
            .args(["cache", "path"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn cache_path_uses_env_flag() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("other-env");
        crash_analyzer(&temp)
            .args(["cache", "path", "--env"])
            .arg(&env)
            .assert()
            .success()
            .stdout(predicate::str::contains("other-env"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is empty"));
    }

    #[test]
    fn cache_list_json() {
        let temp = TempDir::new().unwrap();
        let job = temp
            .path()
            .join("env/artifacts/DataDog%2Fdatadog-agent/4242");
        fs::create_dir_all(job.join("artifacts")).unwrap();
        fs::write(job.join("version.txt"), "agent-7.50.0").unwrap();
        fs::create_dir_all(temp.path().join("env/symbols/agent-7.50.0/symbols")).unwrap();

        let output = crash_analyzer(&temp)
            .args(["cache", "list", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(listing["jobs"][0]["project"], "DataDog/datadog-agent");
        assert_eq!(listing["jobs"][0]["job"], "4242");
        assert_eq!(listing["jobs"][0]["version"], "agent-7.50.0");
        assert_eq!(listing["symbols"][0], "agent-7.50.0");
    }

    #[test]
    fn symbols_requires_source() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp).arg("symbols").assert().failure();
    }

    #[test]
    fn symbols_release_uses_cache() {
        let temp = TempDir::new().unwrap();
        let symbols = temp.path().join("env/symbols/7.50.0/symbols");
        fs::create_dir_all(&symbols).unwrap();
        fs::write(symbols.join("agent.exe.debug"), b"dwarf").unwrap();

        crash_analyzer(&temp)
            .args(["symbols", "--release", "7.50.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("agent.exe.debug"));
    }

    #[test]
    fn symbols_release_stays_inside_env() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["symbols", "--release", "../../outside"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key"));
        assert!(!temp.path().join("outside").exists());
    }

    #[test]
    fn cache_path_temp_env() {
        let temp = TempDir::new().unwrap();
        let configured = temp.path().join("env").display().to_string();
        crash_analyzer(&temp)
            .args(["cache", "path", "--temp-env"])
            .assert()
            .success()
            .stdout(predicate::str::contains("crash-analyzer-"))
            .stdout(predicate::str::contains(configured).not());
    }

    #[test]
    fn dump_without_token_fails() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["dump", "123"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("GITLAB_TOKEN"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        crash_analyzer(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("crash-analyzer"));
    }
}
