use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

/// Test context with a scratch directory and a clean environment
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn binq(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_binq"));
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("BINQ_SERVER");
        cmd.env_remove("BINQ_BIN_DIR");
        cmd.env_remove("RUST_LOG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.binq().args(args).output().expect("failed to run binq")
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn versions(item: &Value) -> Vec<String> {
    item["versions"]
        .as_array()
        .map(|vs| {
            vs.iter()
                .map(|v| v["version"].as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

const ITEM: &str = r#"{
  "meta": {
    "url-format": "https://github.com/owner/tool/releases/download/v{{.Version}}/tool-{{.OS}}-{{.Arch}}"
  },
  "latest": {
    "version": "1.0.0"
  },
  "versions": [
    {
      "version": "1.0.0"
    }
  ]
}
"#;

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("revise"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("binq"));
}

#[test]
fn test_new_prints_skeleton() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "new",
        "https://example.com/v{{.Version}}/tool-{{.OS}}{{.Ext}}",
        "0.4.0",
        "-r",
        "amd64:x86_64,darwin:apple-darwin",
        "-e",
        "default:.tar.gz,windows:.zip",
    ]);
    assert!(output.status.success());
    let item: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item["latest"]["version"], "0.4.0");
    assert_eq!(item["meta"]["replacements"]["amd64"], "x86_64");
    assert_eq!(item["meta"]["extension"]["windows"], ".zip");
    assert_eq!(versions(&item), vec!["0.4.0"]);
}

#[test]
fn test_new_writes_file() {
    let ctx = TestContext::new();
    let output = ctx.run(&["new", "https://example.com/tool", "-f", "out/tool.json"]);
    assert!(output.status.success());
    let item = read_json(&ctx.path("out/tool.json"));
    assert_eq!(item["meta"]["url-format"], "https://example.com/tool");
    assert_eq!(item["latest"]["version"], "");
    assert!(item.get("versions").is_none());
}

#[test]
fn test_revise_adds_and_deletes() {
    let ctx = TestContext::new();
    let file = ctx.write("tool.json", ITEM);

    let output = ctx.run(&[
        "revise",
        "tool.json",
        "1.1.0",
        "-s",
        &format!("tool-linux-amd64:{HELLO_SHA256}"),
    ]);
    assert!(output.status.success());
    let item = read_json(&file);
    assert_eq!(versions(&item), vec!["1.1.0", "1.0.0"]);
    assert_eq!(item["latest"]["version"], "1.1.0");
    assert_eq!(item["versions"][0]["checksums"][0]["sha256"], HELLO_SHA256);

    let output = ctx.run(&["revise", "tool.json", "0.9.0", "--no-latest"]);
    assert!(output.status.success());
    let item = read_json(&file);
    assert_eq!(versions(&item), vec!["1.1.0", "1.0.0", "0.9.0"]);
    assert_eq!(item["latest"]["version"], "1.1.0");

    let output = ctx.run(&["revise", "tool.json", "1.1.0", "--delete"]);
    assert!(output.status.success());
    let item = read_json(&file);
    assert_eq!(versions(&item), vec!["1.0.0", "0.9.0"]);
    assert_eq!(item["latest"]["version"], "1.0.0");

    let output = ctx.run(&["revise", "tool.json", "7.7.7", "--delete"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Version does not exist: 7.7.7"));
}

#[test]
fn test_revise_dry_run_keeps_file() {
    let ctx = TestContext::new();
    let file = ctx.write("tool.json", ITEM);

    let output = ctx.run(&["revise", "tool.json", "2.0.0", "--dry-run"]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), ITEM);
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["latest"]["version"], "2.0.0");
}

#[test]
fn test_revise_without_change() {
    let ctx = TestContext::new();
    ctx.write("tool.json", ITEM);
    let output = ctx.run(&["revise", "tool.json", "1.0.0"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Item has no change"));
}

#[test]
fn test_register_modify_deregister() {
    let ctx = TestContext::new();
    ctx.write("work/tool.json", ITEM);

    let output = ctx.run(&["register", "idx", "work/tool.json"]);
    assert!(output.status.success(), "{output:?}");
    let index = read_json(&ctx.path("idx/index.json"));
    assert_eq!(index["items"][0]["name"], "tool");
    assert_eq!(index["items"][0]["path"], "github.com/owner/tool/index.json");
    assert!(ctx.path("idx/github.com/owner/tool/index.json").exists());

    let output = ctx.run(&["index", "idx"]);
    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.starts_with("Name"));
    assert!(listing.contains("github.com/owner/tool/index.json"));

    let output = ctx.run(&["modify", "idx", "tool", "-n", "atool", "-p", "a/tool.json"]);
    assert!(output.status.success(), "{output:?}");
    let index = read_json(&ctx.path("idx/index.json"));
    assert_eq!(index["items"][0]["name"], "atool");
    assert_eq!(index["items"][0]["path"], "a/tool.json");
    assert!(ctx.path("idx/a/tool.json").exists());
    assert!(!ctx.path("idx/github.com/owner/tool/index.json").exists());

    let output = ctx.run(&["deregister", "idx", "atool"]);
    assert!(output.status.success(), "{output:?}");
    let index = read_json(&ctx.path("idx/index.json"));
    assert_eq!(index["items"].as_array().unwrap().len(), 0);
    assert!(!ctx.path("idx/a/tool.json").exists());

    let output = ctx.run(&["deregister", "idx", "atool"]);
    assert!(!output.status.success());
}

#[test]
fn test_index_paths_cannot_escape_index_dir() {
    let ctx = TestContext::new();
    let outside = ctx.write("outside.json", ITEM);
    ctx.write("idx/tool.json", ITEM);
    ctx.write(
        "idx/index.json",
        r#"{"items":[{"name":"evil","path":"../outside.json"},{"name":"tool","path":"tool.json"}]}"#,
    );

    let output = ctx.run(&["modify", "idx", "tool", "-p", "../moved.json"]);
    assert!(!output.status.success());
    assert!(ctx.path("idx/tool.json").exists());
    assert!(!ctx.path("moved.json").exists());

    let output = ctx.run(&[
        "register",
        "idx",
        "idx/tool.json",
        "-n",
        "other",
        "-p",
        "/tmp/x.json",
    ]);
    assert!(!output.status.success());

    let output = ctx.run(&["deregister", "idx", "evil"]);
    assert!(output.status.success(), "{output:?}");
    assert!(outside.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("file is kept"));
    let index = read_json(&ctx.path("idx/index.json"));
    assert_eq!(index["items"].as_array().unwrap().len(), 1);
}

#[test]
fn test_register_keeps_index_sorted() {
    let ctx = TestContext::new();
    ctx.write("ccc.json", ITEM);
    ctx.write("aaa.json", ITEM);
    ctx.write("bbb.json", ITEM);

    for (name, path) in [("ccc", "c.json"), ("aaa", "a.json"), ("bbb", "b.json")] {
        let file = format!("{name}.json");
        let output = ctx.run(&["register", "idx/index.json", &file, "-p", path]);
        assert!(output.status.success(), "{output:?}");
    }
    let index = read_json(&ctx.path("idx/index.json"));
    let names: Vec<_> = index["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["aaa", "bbb", "ccc"]);
}

#[test]
fn test_register_rejects_other_json_name() {
    let ctx = TestContext::new();
    ctx.write("tool.json", ITEM);
    let output = ctx.run(&["register", "idx/items.json", "tool.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_hash_prints_checksum_args() {
    let ctx = TestContext::new();
    ctx.write("hello.txt", "hello");

    let output = ctx.run(&["hash", "hello.txt"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("hello.txt:{HELLO_SHA256}:sha256")
    );

    let output = ctx.run(&["hash", "--crc", "hello.txt"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "hello.txt:3610a686:crc"
    );
}

#[test]
fn test_verify_records_missing_checksum() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/dl/1.0.0/tool")
        .with_status(200)
        .with_body("hello")
        .create();

    let ctx = TestContext::new();
    let file = ctx.write(
        "tool.json",
        &format!(
            r#"{{"meta":{{"url-format":"{}/dl/{{{{.Version}}}}/tool"}},"latest":{{"version":"1.0.0"}},"versions":[{{"version":"1.0.0"}}]}}"#,
            server.url()
        ),
    );

    let output = ctx.run(&["verify", "tool.json"]);
    assert!(output.status.success(), "{output:?}");
    let item = read_json(&file);
    let sum = &item["versions"][0]["checksums"][0];
    assert_eq!(sum["file"], "tool");
    assert_eq!(sum["sha256"], HELLO_SHA256);

    // Second run matches and leaves the file alone.
    let before = fs::read_to_string(&file).unwrap();
    let output = ctx.run(&["verify", "tool.json", "-v", "1.0.0"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Checksum is OK"));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_install_direct_url() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/files/tool-bin")
        .with_status(200)
        .with_body("#!/bin/sh\necho hi\n")
        .create();

    let ctx = TestContext::new();
    let url = format!("{}/files/tool-bin", server.url());
    let output = ctx.run(&["install", &url, "-d", "bin", "-f", "tool"]);
    assert!(output.status.success(), "{output:?}");

    let installed = ctx.path("bin/tool");
    assert_eq!(fs::read_to_string(&installed).unwrap(), "#!/bin/sh\necho hi\n");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&installed).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}

#[test]
fn test_install_named_item_from_server() {
    let mut server = mockito::Server::new();
    let item = format!(
        r#"{{"meta":{{"url-format":"{}/dl/{{{{.Version}}}}/tool"}},"latest":{{"version":"1.0.0"}},"versions":[{{"version":"1.0.0"}}]}}"#,
        server.url()
    );
    let _item = server.mock("GET", "/tool").with_status(200).with_body(item).create();
    let _bin = server
        .mock("GET", "/dl/1.0.0/tool")
        .with_status(200)
        .with_body("hello")
        .create();

    let ctx = TestContext::new();
    let output = ctx
        .binq()
        .args(["--dry-run", "install", "tool"])
        .env("BINQ_SERVER", server.url())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("{}/dl/1.0.0/tool", server.url())
    );

    let output = ctx.run(&["install", "tool@1.0.0", "-d", "bin", "-s", &server.url()]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(fs::read_to_string(ctx.path("bin/tool")).unwrap(), "hello");
}

#[test]
fn test_index_json_output() {
    let ctx = TestContext::new();
    ctx.write("tool.json", ITEM);
    let output = ctx.run(&["register", "idx", "tool.json", "-p", "t/tool.json"]);
    assert!(output.status.success(), "{output:?}");

    let output = ctx.run(&["index", "idx", "-o", "json"]);
    assert!(output.status.success(), "{output:?}");
    let index: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(index["items"][0]["name"], "tool");
    assert_eq!(index["items"][0]["path"], "t/tool.json");

    let output = ctx.run(&["index", "idx", "--output", "yaml"]);
    assert!(!output.status.success());
}
