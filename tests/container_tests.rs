//! # Container Build Tests
//!
//! Static checks of the image build descriptor: pinned bases, dependency
//! manifest before sources, a single argument-free entry point and an
//! exclusion list for secrets and build output.

use std::fs;
use std::path::Path;

fn read_repo_file(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
}

/// Instructions with their arguments, comments and continuations folded
fn instructions(dockerfile: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut current = String::new();

    for line in dockerfile.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_suffix('\\') {
            current.push_str(stripped);
            current.push(' ');
            continue;
        }
        current.push_str(line);
        let (keyword, args) = current.split_once(' ').unwrap_or((current.as_str(), ""));
        result.push((keyword.to_ascii_uppercase(), args.trim().to_string()));
        current.clear();
    }

    result
}

#[test]
fn test_base_images_are_pinned() {
    let dockerfile = read_repo_file("Dockerfile");
    let bases: Vec<String> = instructions(&dockerfile)
        .into_iter()
        .filter(|(keyword, _)| keyword == "FROM")
        .map(|(_, args)| args.split_whitespace().next().unwrap_or("").to_string())
        .collect();

    assert_eq!(bases.len(), 2, "expected a builder and a runtime stage");
    for base in &bases {
        let (_, tag) = base.split_once(':').unwrap_or((base.as_str(), ""));
        assert!(!tag.is_empty() && tag != "latest", "base image {base} is not pinned");
    }
    assert!(bases[0].starts_with("rust:"));
}

#[test]
fn test_manifest_copied_before_sources() {
    let dockerfile = read_repo_file("Dockerfile");
    let steps = instructions(&dockerfile);

    let manifest = steps
        .iter()
        .position(|(k, a)| k == "COPY" && a.starts_with("Cargo.toml"))
        .expect("dependency manifest is copied");
    let install = steps
        .iter()
        .position(|(k, a)| k == "RUN" && a.contains("cargo build"))
        .expect("dependencies are built");
    let sources = steps
        .iter()
        .position(|(k, a)| k == "COPY" && a == ". .")
        .expect("application tree is copied");

    assert!(manifest < install && install < sources);
}

#[test]
fn test_single_entry_point_without_arguments() {
    let dockerfile = read_repo_file("Dockerfile");
    let steps = instructions(&dockerfile);

    let commands: Vec<&String> = steps
        .iter()
        .filter(|(k, _)| k == "CMD" || k == "ENTRYPOINT")
        .map(|(_, a)| a)
        .collect();

    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0], r#"["/usr/local/bin/coin-bot"]"#);
}

#[test]
fn test_runtime_stage_has_no_toolchain_cache() {
    let dockerfile = read_repo_file("Dockerfile");
    let steps = instructions(&dockerfile);

    let runtime_start = steps
        .iter()
        .rposition(|(k, _)| k == "FROM")
        .expect("runtime stage exists");
    for (keyword, args) in &steps[runtime_start..] {
        if keyword == "COPY" {
            assert!(args.starts_with("--from=builder"), "runtime copies {args} from context");
            assert!(!args.contains(".cargo"), "runtime copies the cargo cache");
        }
    }
}

#[test]
fn test_dockerignore_excludes_secrets_and_build_output() {
    let ignore = read_repo_file(".dockerignore");
    let entries: Vec<&str> = ignore.lines().map(str::trim).collect();

    for required in [".env", "target/", ".git/"] {
        assert!(entries.contains(&required), ".dockerignore is missing {required}");
    }
}

#[test]
fn test_binary_name_matches_entry_point() {
    let manifest = read_repo_file("Cargo.toml");
    assert!(manifest.contains("name = \"coin-bot\""));
}

#[test]
fn test_dependency_builds_are_locked() {
    let dockerfile = read_repo_file("Dockerfile");
    let steps = instructions(&dockerfile);

    let builds: Vec<&String> = steps
        .iter()
        .filter(|(k, a)| k == "RUN" && a.contains("cargo build"))
        .map(|(_, a)| a)
        .collect();
    assert!(!builds.is_empty());
    for build in builds {
        assert!(build.contains("--locked"), "unlocked build step: {build}");
    }

    let manifest_copy = steps
        .iter()
        .find(|(k, a)| k == "COPY" && a.starts_with("Cargo.toml"))
        .map(|(_, a)| a.split_whitespace().collect::<Vec<_>>())
        .expect("dependency manifest is copied");
    assert!(manifest_copy.contains(&"Cargo.lock"), "Cargo.lock is not copied exactly");
    assert!(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.lock").is_file());
}

#[test]
fn test_builder_toolchain_matches_rust_version() {
    let manifest = read_repo_file("Cargo.toml");
    let rust_version = manifest
        .lines()
        .find_map(|line| line.trim().strip_prefix("rust-version = "))
        .map(|v| v.trim_matches('"').to_string())
        .expect("rust-version is declared");
    assert!(manifest.contains("resolver = \"3\""), "resolution ignores rust-version");

    let dockerfile = read_repo_file("Dockerfile");
    let builder = instructions(&dockerfile)
        .into_iter()
        .find(|(k, _)| k == "FROM")
        .map(|(_, a)| a)
        .expect("builder stage exists");
    assert!(
        builder.starts_with(&format!("rust:{rust_version}-")),
        "builder {builder} does not match rust-version {rust_version}"
    );
}
