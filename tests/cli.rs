use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const FOO: &str = r#"name = "Foo"
filename = "Foo [1.21].jar"
side = "server"
x-prismlauncher-loaders = [
    "neoforge",
]
x-prismlauncher-mc-versions = [ "1.21.1" ]
x-prismlauncher-release-type = "release"

[download]
url = "https://cdn.example.com/Foo [1.21].jar"
hash-format = "sha1"
hash = "0a1b"
mode = "url"
"#;

const BAR: &str = r#"name = "Bar"
filename = "bar.jar"
side = "both"

[download]
url = "https://cdn.example.com/bar.jar"
hash-format = "sha512"
hash = "ff"
"#;

fn prep(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("packwiz-prep");
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "info");
    cmd.arg("--root").arg(temp.path());
    cmd
}

fn pack_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("mods").create_dir_all().unwrap();
    temp.child("mods/foo.pw.toml").write_str(FOO).unwrap();
    temp.child("mods/bar.pw.toml").write_str(BAR).unwrap();
    temp
}

fn read_manifest(temp: &TempDir, name: &str) -> toml::Table {
    let text = std::fs::read_to_string(temp.child("mods").child(name).path()).unwrap();
    toml::from_str(&text).unwrap()
}

#[test]
fn cli_no_args_shows_help() {
    cargo_bin_cmd!("packwiz-prep")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn strip_removes_launcher_keys() {
    let temp = pack_root();
    prep(&temp).arg("strip").assert().success();

    temp.child("mods/foo.pw.toml")
        .assert(predicate::str::contains("x-prismlauncher").not());
    temp.child("mods/foo.pw.toml")
        .assert(predicate::str::contains("url = \"https://cdn.example.com/Foo [1.21].jar\""));
    temp.child("mods/bar.pw.toml").assert(BAR);
}

#[test]
fn missing_mods_dir_is_a_diagnostic_not_a_crash() {
    let temp = TempDir::new().unwrap();
    prep(&temp)
        .arg("strip")
        .assert()
        .success()
        .stderr(predicate::str::contains("directory does not exist"));
}

#[test]
fn sides_warns_about_unmatched_entries() {
    let temp = pack_root();
    temp.child("client_patch.txt").write_str("foo\nghost-mod\n").unwrap();
    temp.child("server_blacklist.txt").write_str("bar\n").unwrap();

    prep(&temp).arg("strip").assert().success();
    prep(&temp)
        .arg("sides")
        .assert()
        .success()
        .stderr(predicate::str::contains("client patch entry has no manifest"))
        .stderr(predicate::str::contains("ghost-mod"));

    assert_eq!(read_manifest(&temp, "foo.pw.toml")["side"].as_str(), Some("both"));
    assert_eq!(read_manifest(&temp, "bar.pw.toml")["side"].as_str(), Some("client"));
}

#[test]
fn check_reports_in_json() {
    let temp = TempDir::new().unwrap();
    temp.child("mods").create_dir_all().unwrap();
    temp.child("mods/a.pw.toml")
        .write_str("filename = \"a.jar\"\nside = \"both\"\n")
        .unwrap();
    temp.child("mods/b.pw.toml")
        .write_str("filename = \"b.jar\"\nside = \"both\"\n[download]\nhash = \"00\"\n")
        .unwrap();
    temp.child("mods/c.pw.toml")
        .write_str(
            "filename = \"c.jar\"\nside = \"both\"\n[download]\nurl = \"https://host/c d.jar\"\n",
        )
        .unwrap();

    let output = prep(&temp)
        .args(["check", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["checked"], 3);
    let kinds: Vec<&str> = report["findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["missing-section", "missing-key", "malformed-url"]);
}

#[test]
fn strict_check_fails_on_errors() {
    let temp = TempDir::new().unwrap();
    temp.child("mods").create_dir_all().unwrap();
    temp.child("mods/a.pw.toml")
        .write_str("filename = \"a.jar\"\nside = \"both\"\n")
        .unwrap();

    prep(&temp)
        .args(["check", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 errors, 0 warnings"));
}

#[test]
fn run_produces_packable_manifests() {
    let temp = pack_root();
    temp.child("client_patch.txt").write_str("foo\n").unwrap();
    temp.child("resourcepacks").create_dir_all().unwrap();
    temp.child("resourcepacks/Fancy Pack [x16].zip").write_str("zip").unwrap();

    prep(&temp).args(["run", "--strict"]).assert().success();

    let foo = read_manifest(&temp, "foo.pw.toml");
    assert_eq!(foo["side"].as_str(), Some("both"));
    assert_eq!(
        foo["download"]["url"].as_str(),
        Some("https://cdn.example.com/Foo%20%5B1.21%5D.jar")
    );
    assert!(!foo.contains_key("x-prismlauncher-loaders"));
    temp.child("resourcepacks/Fancy_Pack_x16.zip")
        .assert(predicate::path::exists());
}

#[test]
fn run_is_idempotent() {
    let temp = pack_root();
    prep(&temp).arg("run").assert().success();
    let first = std::fs::read_to_string(temp.child("mods/foo.pw.toml").path()).unwrap();
    prep(&temp).arg("run").assert().success();
    temp.child("mods/foo.pw.toml").assert(first.as_str());
}

#[test]
fn generate_uses_config_file() {
    let temp = TempDir::new().unwrap();
    temp.child("mods").create_dir_all().unwrap();
    temp.child("unknown-mods").create_dir_all().unwrap();
    temp.child("unknown-mods/local tweaks.jar").write_binary(b"abc").unwrap();
    temp.child("packwiz-prep.toml")
        .write_str(
            r#"unknown-mods-url-base = "https://files.example.com/"

[[unknown-mods]]
name = "Local Tweaks"
filename = "local tweaks.jar"
side = "client"
"#,
        )
        .unwrap();

    prep(&temp).args(["run", "--strict"]).assert().success();

    let manifest = read_manifest(&temp, "local tweaks.pw.toml");
    assert_eq!(manifest["side"].as_str(), Some("client"));
    assert_eq!(
        manifest["download"]["url"].as_str(),
        Some("https://files.example.com/local%20tweaks.jar")
    );
    assert_eq!(manifest["download"]["hash-format"].as_str(), Some("sha256"));
}

#[test]
fn publish_refuses_when_run_has_errors() {
    let temp = TempDir::new().unwrap();
    temp.child("mods").create_dir_all().unwrap();
    temp.child("mods/a.pw.toml")
        .write_str("filename = \"a.jar\"\nside = \"both\"\n")
        .unwrap();

    prep(&temp)
        .args(["run", "--publish"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to publish"));
}
