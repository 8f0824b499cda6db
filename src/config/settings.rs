use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, VaultError};
use crate::generator::GenerationPolicy;

/// Project-level configuration, loaded from `.pwvault.toml`.
///
/// Every field has a sensible default so pwvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file path (relative paths resolve against the project dir).
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Defaults for generated passwords.
    #[serde(default)]
    pub generator: GenerationPolicy,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_path() -> String {
    ".pwvault/vault.json".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            generator: GenerationPolicy::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".pwvault.toml";

    /// Load settings from `<project_dir>/.pwvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the vault file path against `project_dir`.
    pub fn vault_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_path)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_path, ".pwvault/vault.json");
        assert_eq!(s.argon2_params(), Argon2Params::default());
        assert_eq!(s.generator, GenerationPolicy::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_path, ".pwvault/vault.json");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_path = "secrets/passwords.json"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8

[generator]
length = 24
include_symbols = false
"#;
        fs::write(tmp.path().join(".pwvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_path, "secrets/passwords.json");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert_eq!(settings.generator.length, 24);
        assert!(!settings.generator.include_symbols);
        assert!(settings.generator.include_digits);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwvault.toml"), "argon2_iterations = 4\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_iterations, 4);
        // Rest should be defaults
        assert_eq!(settings.vault_path, ".pwvault/vault.json");
        assert_eq!(settings.argon2_memory_kib, 65_536);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwvault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn vault_path_resolves_against_project_dir() {
        let s = Settings::default();
        let project = Path::new("/home/user/project");
        assert_eq!(
            s.vault_path(project),
            PathBuf::from("/home/user/project/.pwvault/vault.json")
        );
    }

    #[test]
    fn absolute_vault_path_is_kept() {
        let s = Settings {
            vault_path: "/var/lib/pwvault/vault.json".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            s.vault_path(Path::new("/home/user/project")),
            PathBuf::from("/var/lib/pwvault/vault.json")
        );
    }
}
