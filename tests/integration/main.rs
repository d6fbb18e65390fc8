//! Integration tests for partsbin

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use partsbin::cache::{CacheStore, WriteMode};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const REMOTE: &str = "https://example.invalid/ui";

    /// Command isolated from the user's config and cache
    fn partsbin(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("partsbin");
        cmd.env("PARTSBIN_CONFIG", temp.path().join("config.toml"))
            .env("PARTSBIN_CACHE_DIR", cache_root(temp))
            .env("CI", "1");
        cmd
    }

    fn cache_root(temp: &TempDir) -> PathBuf {
        temp.path().join("cache")
    }

    fn seed(root: &Path, remote: &str, path: &[&str], content: &str) {
        let mut store = CacheStore::open(root, WriteMode::Direct).unwrap();
        store.remote(remote).unwrap().add_file(path, content).unwrap();
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("component"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("partsbin"));
    }

    #[test]
    fn cache_path_uses_override() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                cache_root(&temp).display().to_string(),
            ));
    }

    #[test]
    fn cache_size_empty() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["cache", "size", "--format", "plain"])
            .assert()
            .success()
            .stdout("0\n");
    }

    #[test]
    fn cache_tree_empty_json() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["cache", "tree", "--format", "json"])
            .assert()
            .success()
            .stdout("{}\n");
    }

    #[test]
    fn cache_tree_lists_seeded_file() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), "org/repo@main", &["a", "b.tsx"], "hello");

        partsbin(&temp)
            .args(["cache", "tree", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("org/repo@main\ta/b.tsx"));

        partsbin(&temp)
            .args(["cache", "tree", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""size": 5"#));
    }

    #[test]
    fn get_serves_from_cache_without_network() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["Button.tsx"], "export const Button = 1;\n");

        partsbin(&temp)
            .args(["get", "Button.tsx", "--remote", REMOTE])
            .assert()
            .success()
            .stdout("export const Button = 1;\n");
    }

    #[test]
    fn get_writes_out_file() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["ui", "Card.tsx"], "card");
        let out = temp.path().join("src").join("Card.tsx");

        partsbin(&temp)
            .args(["get", "ui/Card.tsx", "--remote", REMOTE, "--out"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("cache hit"));

        assert_eq!(fs::read_to_string(out).unwrap(), "card");
    }

    #[test]
    fn get_without_remote_fails() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["get", "Button.tsx"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No remote given"));
    }

    #[test]
    fn cache_rm_removes_file() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["x.tsx"], "x");

        partsbin(&temp)
            .args(["cache", "rm", REMOTE, "x.tsx"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed x.tsx"));

        partsbin(&temp)
            .args(["cache", "tree", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("x.tsx").not());
    }

    #[test]
    fn cache_rm_unknown_remote_leaves_cache_untouched() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["x.tsx"], "x");

        partsbin(&temp)
            .args(["cache", "rm", "typo-remote", "x.tsx"])
            .assert()
            .success()
            .stdout(predicate::str::contains("not cached"));

        partsbin(&temp)
            .args(["cache", "tree", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("typo-remote").not());
        assert_eq!(
            fs::read_dir(cache_root(&temp).join("remotes")).unwrap().count(),
            1
        );
    }

    #[test]
    fn cache_rm_on_absent_cache_creates_nothing() {
        let temp = TempDir::new().unwrap();

        partsbin(&temp)
            .args(["cache", "rm", REMOTE, "x.tsx"])
            .assert()
            .success()
            .stdout(predicate::str::contains("not cached"));

        assert!(!cache_root(&temp).exists());
    }

    #[test]
    fn cache_clear_with_yes() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["x.tsx"], "x");

        partsbin(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache cleared"));

        assert!(!cache_root(&temp).exists());
    }

    #[test]
    fn cache_clear_without_yes_aborts_when_not_interactive() {
        let temp = TempDir::new().unwrap();
        seed(&cache_root(&temp), REMOTE, &["x.tsx"], "x");

        partsbin(&temp)
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));

        assert!(cache_root(&temp).exists());
    }

    #[test]
    fn corrupt_index_is_fatal_but_clearable() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(cache_root(&temp).join("cache.json")).unwrap();

        partsbin(&temp)
            .args(["cache", "tree"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache index path is a directory"))
            .stderr(predicate::str::contains("partsbin cache clear"));

        partsbin(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success();
        assert!(!cache_root(&temp).exists());
    }

    #[test]
    fn config_path_uses_override() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        partsbin(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("[cache]"));
    }
}
