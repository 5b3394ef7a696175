use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn afiliado(session_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("afiliado").unwrap();
    cmd.env("AFILIADO_SESSION_FILE", session_dir.path().join("session.json"))
        .env("AFILIADO_API_URL", "http://127.0.0.1:9/api")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn version_prints_name_and_version() {
    let dir = TempDir::new().unwrap();
    afiliado(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("afiliado_cli"));
}

#[test]
fn whoami_without_session_fails() {
    let dir = TempDir::new().unwrap();
    afiliado(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn products_require_a_session() {
    let dir = TempDir::new().unwrap();
    afiliado(&dir)
        .args(["products", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("afiliado login"));
}

#[test]
fn client_role_cannot_manage_products() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("session.json"),
        r#"{"afiliadobot_token":"t1","afiliadobot_user":"{\"id\":2,\"name\":\"Caio\",\"email\":\"caio@afiliado.top\",\"role\":\"client\"}"}"#,
    )
    .unwrap();

    afiliado(&dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("caio@afiliado.top"));

    afiliado(&dir)
        .args(["products", "delete", "3", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permissão"));
}

#[test]
fn logout_clears_the_session_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{"afiliadobot_token":"t1","afiliadobot_user":"{\"id\":1,\"name\":\"Ana\",\"email\":\"admin@afiliado.top\",\"role\":\"admin\"}"}"#,
    )
    .unwrap();

    afiliado(&dir)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("Sessão encerrada"));

    afiliado(&dir).arg("whoami").assert().failure();
}
