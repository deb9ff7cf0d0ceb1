//! Integration tests for Capstan

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn capstan() -> Command {
        cargo_bin_cmd!("capstan")
    }

    #[test]
    fn help_displays() {
        capstan()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Package acquisition"));
    }

    #[test]
    fn version_displays() {
        capstan()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("capstan"));
    }

    #[test]
    fn download_requires_package_id() {
        capstan()
            .args(["download", "--package-version", "1.0.0", "--feed-uri", "https://f"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--package-id"));
    }

    #[test]
    fn download_rejects_bad_version() {
        let cache = tempfile::TempDir::new().unwrap();
        capstan()
            .args([
                "download",
                "--package-id",
                "Acme.Web",
                "--package-version",
                "not-a-version",
                "--feed-uri",
                "https://feed.example.com",
                "--cache-root",
            ])
            .arg(cache.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid package version"));
    }

    #[test]
    fn download_without_cache_root_reports_configuration() {
        let config = tempfile::TempDir::new().unwrap();
        capstan()
            .env_remove("CAPSTAN_CACHE_ROOT")
            .arg("--config")
            .arg(config.path().join("missing.toml"))
            .args([
                "download",
                "--package-id",
                "Acme.Web",
                "--package-version",
                "1.0.0",
                "--feed-uri",
                "https://feed.example.com",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cache root is not configured"));
    }

    #[test]
    fn download_unreachable_feed_fails_after_budget() {
        let cache = tempfile::TempDir::new().unwrap();
        capstan()
            .args([
                "download",
                "--package-id",
                "Acme.Web",
                "--package-version",
                "1.0.0",
                // Reserved port; connections are refused immediately
                "--feed-uri",
                "http://127.0.0.1:1",
                "--max-attempts",
                "2",
                "--attempt-backoff-ms",
                "0",
                "--cache-root",
            ])
            .arg(cache.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("after 2 attempt(s)"));
    }

    #[test]
    fn cached_package_downloads_without_network() {
        use capstan::package::{write_package, PackageManifest};

        let cache = tempfile::TempDir::new().unwrap();
        let manifest = PackageManifest::new("Acme.Web", "1.0.0");
        write_package(
            &cache.path().join("Acme.Web.1.0.0_seed.cpkg"),
            &manifest,
            b"seeded payload",
        )
        .unwrap();

        // The feed URI points nowhere; a cache hit never dials it
        capstan()
            .args([
                "download",
                "--package-id",
                "Acme.Web",
                "--package-version",
                "1.0.0",
                "--feed-uri",
                "http://127.0.0.1:1",
                "--cache-root",
            ])
            .arg(cache.path())
            .assert()
            .success()
            .stdout(
                predicate::str::contains("path=")
                    .and(predicate::str::contains("hash="))
                    .and(predicate::str::contains("size="))
                    .and(predicate::str::contains("Acme.Web.1.0.0_seed.cpkg")),
            );
    }

    #[test]
    fn cache_list_empty() {
        let cache = tempfile::TempDir::new().unwrap();
        capstan()
            .args(["cache", "list", "--cache-root"])
            .arg(cache.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is empty"));
    }

    #[test]
    fn cache_list_shows_seeded_package() {
        use capstan::package::{write_package, PackageManifest};

        let cache = tempfile::TempDir::new().unwrap();
        let manifest = PackageManifest::new("Acme.Web", "2.0.0");
        write_package(
            &cache.path().join("Acme.Web.2.0.0_seed.cpkg"),
            &manifest,
            b"payload",
        )
        .unwrap();

        capstan()
            .args(["cache", "list", "--cache-root"])
            .arg(cache.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Acme.Web 2.0.0"));
    }

    #[test]
    fn config_path() {
        capstan()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let config = tempfile::TempDir::new().unwrap();
        capstan()
            .arg("--config")
            .arg(config.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }
}
