//! Path-heuristic role classification.

use reckon_core::Role;

/// Directory names that mark vendored third-party code.
const VENDOR_DIRS: [&str; 3] = ["vendor", "node_modules", "third_party"];

/// Extensions treated as documentation.
const DOC_EXTENSIONS: [&str; 4] = ["md", "rst", "adoc", "txt"];

/// Extensions treated as data/configuration.
const CONFIG_EXTENSIONS: [&str; 7] = ["json", "yaml", "yml", "toml", "ini", "cfg", "env"];

/// Extensions treated as operational scripts.
const SCRIPT_EXTENSIONS: [&str; 4] = ["sh", "bash", "ps1", "bat"];

/// Well-known lockfiles, always machine-generated.
const LOCKFILES: [&str; 5] = [
    "cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "go.sum",
];

/// Assign a semantic role from a repository-relative path.
///
/// Checks run most-specific first: vendored trees, generated artifacts,
/// tests, infrastructure, docs, config, scripts, and finally core source.
/// Paths use `/` separators as reported by git and the walker.
///
/// # Examples
///
/// ```
/// use reckon_core::Role;
/// use reckon_scan::roles::infer_role;
///
/// assert_eq!(infer_role("src/engine.rs"), Role::Core);
/// assert_eq!(infer_role("tests/parser_test.rs"), Role::Test);
/// assert_eq!(infer_role(".github/workflows/ci.yml"), Role::Infra);
/// assert_eq!(infer_role("Cargo.lock"), Role::Generated);
/// ```
pub fn infer_role(path: &str) -> Role {
    let lower = path.to_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    if has_dir(&lower, &VENDOR_DIRS) {
        return Role::Vendor;
    }

    if LOCKFILES.contains(&file_name)
        || file_name.contains(".gen.")
        || file_name.contains("_generated.")
        || file_name.ends_with(".pb.go")
        || file_name.ends_with("_pb2.py")
    {
        return Role::Generated;
    }

    if is_test_path(&lower, file_name) {
        return Role::Test;
    }

    if is_infra_path(&lower, file_name, extension) {
        return Role::Infra;
    }

    if lower.starts_with("docs/") || lower.contains("/docs/") || DOC_EXTENSIONS.contains(&extension)
    {
        return Role::Docs;
    }

    if has_dir(&lower, &["scripts", "tools"]) || SCRIPT_EXTENSIONS.contains(&extension) {
        return Role::Scripts;
    }

    if CONFIG_EXTENSIONS.contains(&extension) {
        return Role::Config;
    }

    Role::Core
}

fn has_dir(path: &str, dirs: &[&str]) -> bool {
    dirs.iter().any(|dir| {
        path.starts_with(&format!("{dir}/")) || path.contains(&format!("/{dir}/"))
    })
}

fn is_test_path(path: &str, file_name: &str) -> bool {
    has_dir(path, &["tests", "test", "__tests__", "spec"])
        || file_name.starts_with("test_")
        || file_name.contains("_test.")
        || file_name.contains(".test.")
        || file_name.contains(".spec.")
}

fn is_infra_path(path: &str, file_name: &str, extension: &str) -> bool {
    if path.starts_with(".github/") || path.starts_with(".gitlab/") || path.starts_with(".circleci/")
    {
        return true;
    }
    if has_dir(path, &["terraform", "helm", "k8s", "ansible"]) {
        return true;
    }
    matches!(
        file_name,
        "dockerfile" | "makefile" | "justfile" | "jenkinsfile" | ".gitlab-ci.yml" | "vagrantfile"
    ) || file_name.starts_with("docker-compose")
        || matches!(extension, "tf" | "tfvars")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_files_default_to_core() {
        assert_eq!(infer_role("src/main.rs"), Role::Core);
        assert_eq!(infer_role("internal/server/handler.go"), Role::Core);
        assert_eq!(infer_role("lib/engine.py"), Role::Core);
    }

    #[test]
    fn test_paths_are_detected() {
        assert_eq!(infer_role("tests/integration.rs"), Role::Test);
        assert_eq!(infer_role("src/__tests__/app.test.ts"), Role::Test);
        assert_eq!(infer_role("pkg/auth/login_test.go"), Role::Test);
        assert_eq!(infer_role("test_parser.py"), Role::Test);
        assert_eq!(infer_role("src/app.spec.js"), Role::Test);
    }

    #[test]
    fn infra_paths_are_detected() {
        assert_eq!(infer_role(".github/workflows/release.yml"), Role::Infra);
        assert_eq!(infer_role("Dockerfile"), Role::Infra);
        assert_eq!(infer_role("deploy/terraform/main.tf"), Role::Infra);
        assert_eq!(infer_role("Makefile"), Role::Infra);
        assert_eq!(infer_role("docker-compose.yaml"), Role::Infra);
    }

    #[test]
    fn docs_and_config_are_detected() {
        assert_eq!(infer_role("README.md"), Role::Docs);
        assert_eq!(infer_role("docs/guide/setup.rst"), Role::Docs);
        assert_eq!(infer_role("config/settings.yaml"), Role::Config);
        assert_eq!(infer_role("Cargo.toml"), Role::Config);
    }

    #[test]
    fn generated_beats_config_extension() {
        assert_eq!(infer_role("package-lock.json"), Role::Generated);
        assert_eq!(infer_role("Cargo.lock"), Role::Generated);
        assert_eq!(infer_role("api/service_generated.ts"), Role::Generated);
    }

    #[test]
    fn vendored_code_beats_everything() {
        assert_eq!(infer_role("vendor/lib/parser_test.go"), Role::Vendor);
        assert_eq!(infer_role("web/node_modules/left-pad/index.js"), Role::Vendor);
    }

    #[test]
    fn scripts_are_detected() {
        assert_eq!(infer_role("scripts/release.py"), Role::Scripts);
        assert_eq!(infer_role("bin/setup.sh"), Role::Scripts);
    }
}
