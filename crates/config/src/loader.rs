use crate::{ClientConfig, ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".graphqlclientrc.yml",
    ".graphqlclientrc.yaml",
    ".graphqlclientrc.json",
    ".graphqlclientrc",
    "graphql-client.config.yml",
    "graphql-client.config.yaml",
    "graphql-client.config.json",
];

/// Find a client config file by walking up the directory tree from the given start directory.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Ok(Some(config_path));
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            break;
        }
    }

    Ok(None)
}

/// Load a client config from the specified path.
/// The format is detected from the file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(url = %config.url, "Config loaded successfully");
    Ok(config)
}

/// Load a client config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    tracing::debug!(extension, file_name, "Detecting config format");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        "" if file_name == ".graphqlclientrc" => {
            // No extension: try YAML, then JSON.
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;
    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<ClientConfig> {
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<ClientConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

#[tracing::instrument(skip(config, path), fields(path = %path.display()))]
fn validate_config(config: &ClientConfig, path: &Path) -> Result<()> {
    let invalid = |message: &str| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    if config.url.trim().is_empty() {
        return Err(invalid("'url' must not be empty"));
    }
    if !has_scheme(&config.url, &["http://", "https://"]) {
        return Err(invalid("'url' must be an http:// or https:// URL"));
    }
    if let Some(url) = &config.subscription_url {
        if !has_scheme(url, &["ws://", "wss://", "http://", "https://"]) {
            return Err(invalid("'subscriptionUrl' must be a ws://, wss://, http:// or https:// URL"));
        }
    }
    if config.timeout == Some(0) {
        return Err(invalid("'timeout' must be greater than zero"));
    }
    if config.connect_timeout == Some(0) {
        return Err(invalid("'connectTimeout' must be greater than zero"));
    }
    if let Some(authorization) = &config.authorization {
        if authorization.token.trim().is_empty() {
            return Err(invalid("'authorization.token' must not be empty"));
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    schemes.iter().any(|scheme| url.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestMethod;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let yaml = r"
url: https://api.example.com/graphql
headers:
  X-Client: tests
authorization:
  token: secret
  method: Token
method: GET
timeout: 60
retry: 2
validate: true
";
        let file = write_temp(".yml", yaml);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.url, "https://api.example.com/graphql");
        assert_eq!(config.headers.get("X-Client").map(String::as_str), Some("tests"));
        assert_eq!(
            config.authorization.as_ref().unwrap().header_value(),
            "Token secret"
        );
        assert_eq!(config.method, RequestMethod::Get);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.retries(), 2);
        assert!(config.validate);
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"url": "http://localhost:4000/graphql", "subscriptionUrl": "ws://localhost:4000/ws"}"#;
        let file = write_temp(".json", json);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.subscription_url(), "ws://localhost:4000/ws");
        assert!(config.authorization.is_none());
        assert!(!config.validate);
    }

    #[test]
    fn test_rc_file_without_extension() {
        let path = Path::new(".graphqlclientrc");
        let yaml = load_config_from_str("url: https://a.example/graphql", path).unwrap();
        assert_eq!(yaml.url, "https://a.example/graphql");

        let json = load_config_from_str(r#"{"url": "https://b.example/graphql"}"#, path).unwrap();
        assert_eq!(json.url, "https://b.example/graphql");
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_config_from_str("url = 'x'", Path::new("client.toml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validation_errors() {
        let path = Path::new("config.yml");
        for yaml in [
            "url: ''",
            "url: ftp://example.com",
            "url: https://a.example\ntimeout: 0",
            "url: https://a.example\nconnectTimeout: 0",
            "url: https://a.example\nsubscriptionUrl: tcp://a.example",
            "url: https://a.example\nauthorization:\n  token: ''",
        ] {
            let result = load_config_from_str(yaml, path);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "expected invalid config for {yaml:?}"
            );
        }
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".graphqlclientrc.yml");
        fs::write(&config_path, "url: https://api.example.com/graphql").unwrap();

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let found = find_config(&sub_dir).unwrap();
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_config_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(".graphqlclientrc.yml"),
            "url: https://yml.example/graphql",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("graphql-client.config.json"),
            r#"{"url": "https://json.example/graphql"}"#,
        )
        .unwrap();

        let found = find_config(temp_dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".graphqlclientrc.yml");
    }
}
