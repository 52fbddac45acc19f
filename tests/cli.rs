use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Mock, Server, ServerGuard};
use predicates::prelude::*;

const MANIFEST: &str = "python-2.7.13.pkg\npython-3.6.1.pkg\nwget-1.19.1.pkg\n";
const ALIASES: &str = "py->python\nget->wget\n";

fn rudix(site: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("rudix"));
    cmd.env("NO_COLOR", "1")
        .env_remove("VOLUME")
        .env_remove("VENDOR")
        .env_remove("RUDIX_VERSION")
        .args(["--site", site, "--platform", "10.12"]);
    cmd
}

fn mock_track(server: &mut ServerGuard) -> (Mock, Mock) {
    let manifest = server
        .mock("GET", "/packages/master/00MANIFEST.txt")
        .with_status(200)
        .with_body(MANIFEST)
        .create();
    let aliases = server
        .mock("GET", "/packages/master/00ALIASES.txt")
        .with_status(200)
        .with_body(ALIASES)
        .create();
    (manifest, aliases)
}

#[test]
fn test_help_lists_commands() {
    Command::new(cargo::cargo_bin!("rudix"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search-path"))
        .stdout(predicate::str::contains("remove-all"));
}

#[test]
fn test_version() {
    Command::new(cargo::cargo_bin!("rudix"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rudix"));
}

#[test]
fn test_alias_listing() {
    let mut server = Server::new();
    let _mocks = mock_track(&mut server);
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .arg("alias")
        .assert()
        .success()
        .stdout(predicate::str::contains("get->wget"))
        .stdout(predicate::str::contains("py->python"));
}

#[test]
fn test_unknown_alias_exits_with_one() {
    let mut server = Server::new();
    let _mocks = mock_track(&mut server);
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .args(["alias", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope: Not found!"));
}

#[test]
fn test_search_expands_alias() {
    let mut server = Server::new();
    let _mocks = mock_track(&mut server);
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .args(["search", "py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using 'python'"))
        .stdout(predicate::str::contains("python-3.6.1.pkg"))
        .stdout(predicate::str::contains("python-2.7.13.pkg"))
        .stdout(predicate::str::contains("wget").not());
}

#[test]
fn test_search_without_match() {
    let mut server = Server::new();
    let _mocks = mock_track(&mut server);
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .args(["search", "ruby"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No match for 'ruby'"));
}

#[test]
fn test_missing_aliases_file_is_not_fatal() {
    let mut server = Server::new();
    let _manifest = server
        .mock("GET", "/packages/master/00MANIFEST.txt")
        .with_status(200)
        .with_body(MANIFEST)
        .create();
    let _aliases = server
        .mock("GET", "/packages/master/00ALIASES.txt")
        .with_status(404)
        .create();
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .args(["search", "wget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wget-1.19.1.pkg"));
}

#[test]
fn test_unavailable_manifest_is_an_error() {
    let mut server = Server::new();
    let _manifest = server
        .mock("GET", "/packages/master/00MANIFEST.txt")
        .with_status(404)
        .create();
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .arg("search")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("00MANIFEST.txt"));
}

#[test]
fn test_track_selects_remote_directory() {
    let mut server = Server::new();
    let _manifest = server
        .mock("GET", "/packages/2017/00MANIFEST.txt")
        .with_status(200)
        .with_body("jq-1.5.pkg\n")
        .create();
    let _aliases = server
        .mock("GET", "/packages/2017/00ALIASES.txt")
        .with_status(200)
        .with_body("")
        .create();
    let site = format!("{}/packages", server.url());

    rudix(&site)
        .args(["--track", "2017", "search"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jq-1.5.pkg"));
}

#[test]
fn test_invalid_site_is_rejected() {
    rudix("ftp://example.com/packages")
        .arg("search")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
