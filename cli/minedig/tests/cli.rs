// run the minedig binary end to end, with fake cleos scripts standing in
// for the real chain client
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn minedig() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("minedig"))
}

#[test]
fn no_args_prints_usage() {
    minedig().assert().code(1).stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_exits_zero() {
    minedig().arg("--help").assert().success().stdout(predicate::str::contains("minedig"));
}

#[test]
fn missing_config_fails() {
    let tmp = tempdir().unwrap();
    minedig()
        .arg(tmp.path().join("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn invalid_json_fails() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    minedig().arg(&path).assert().code(1).stderr(predicate::str::contains("loading config"));
}

#[cfg(unix)]
#[test]
fn bounded_run_unlocks_once_then_mines() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let log = tmp.path().join("calls.log");
    let script = tmp.path().join("cleos");
    std::fs::write(&script, format!("#!/bin/sh\necho \"$@\" >> {}\n", log.display())).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = tmp.path().join("config.json");
    std::fs::write(
        &config,
        format!(
            r#"{{"config":{{"cleos":{{
                "account":"alice",
                "wallet_name":"digwallet",
                "wallet_password":"PW5Jexample",
                "cleos_path":"{}",
                "api_url":"http://127.0.0.1:8888",
                "verbose_errors":true
            }}}}}}"#,
            script.display()
        ),
    )
    .unwrap();

    minedig().arg(&config).args(["--iterations", "3", "--interval-ms", "1"]).assert().success();

    let recorded = std::fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = recorded.lines().collect();
    assert_eq!(calls.len(), 4, "one unlock then one line per attempt: {calls:?}");
    assert_eq!(calls[0], "wallet unlock --name digwallet --password PW5Jexample");
    for call in &calls[1..] {
        assert_eq!(
            *call,
            r#"--url=http://127.0.0.1:8888 push action digcoinsmine mine {"miner":"alice","symbol":"4,DIG"} -p alice@active"#
        );
    }
}

#[cfg(unix)]
#[test]
fn mining_continues_when_pushes_fail() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let log = tmp.path().join("calls.log");
    let script = tmp.path().join("cleos");
    // unlock succeeds, every push exits non-zero
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$@\" >> {}\nif [ \"$1\" = \"wallet\" ]; then exit 0; fi\nexit 1\n",
            log.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = tmp.path().join("config.json");
    std::fs::write(
        &config,
        format!(
            r#"{{"config":{{"cleos":{{
                "account":"alice",
                "wallet_name":"digwallet",
                "wallet_password":"PW5Jexample",
                "cleos_path":"{}",
                "api_url":"http://127.0.0.1:8888",
                "verbose_errors":false
            }}}}}}"#,
            script.display()
        ),
    )
    .unwrap();

    minedig().arg(&config).args(["--iterations", "5", "--interval-ms", "1"]).assert().success();

    let recorded = std::fs::read_to_string(&log).unwrap();
    assert_eq!(recorded.lines().count(), 6, "failed pushes must not stop the loop");
}
