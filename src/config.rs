use std::path::PathBuf;

use glob::Pattern;

use crate::args::Cli;
use crate::credentials::{CredentialSet, FirebaseEnvironment, ServiceAccountKey};
use crate::error::ConfigError;
use crate::utils;

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: FirebaseEnvironment,
    pub credentials: CredentialSet,
    pub bucket_name: String,
    pub reports_dir: PathBuf,
    pub pattern: Pattern,
    pub local_target: Option<PathBuf>,
}

impl Config {
    pub fn from_env(cli: &Cli) -> Result<Config, ConfigError> {
        Config::from_source(cli, utils::env_var)
    }

    /// Builds the configuration from CLI overrides and a variable lookup.
    ///
    /// Both credentials are decoded even though only one is used, so a broken
    /// deployment fails on every run rather than only after a switch.
    pub fn from_source<F>(cli: &Cli, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = decode_credential(&lookup, utils::PRODUCTION_CREDENTIALS_VAR)?;
        let development = decode_credential(&lookup, utils::DEVELOPMENT_CREDENTIALS_VAR)?;
        let credentials = CredentialSet {
            production,
            development,
        };

        let environment: FirebaseEnvironment = cli
            .environment
            .clone()
            .or_else(|| lookup(utils::ENVIRONMENT_VAR))
            .ok_or(ConfigError::MissingEnvironment)?
            .parse()?;

        let bucket_name = cli
            .bucket
            .clone()
            .or_else(|| lookup(utils::BUCKET_VAR))
            .unwrap_or_else(|| credentials.select(environment).default_bucket_name());

        let reports_dir = cli
            .reports_dir
            .clone()
            .or_else(|| lookup(utils::REPORTS_DIR_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(utils::DEFAULT_REPORTS_DIR));

        let pattern = cli
            .pattern
            .clone()
            .or_else(|| lookup(utils::REPORTS_PATTERN_VAR))
            .unwrap_or_else(|| utils::DEFAULT_REPORTS_PATTERN.to_owned());
        let pattern =
            Pattern::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })?;

        Ok(Config {
            environment,
            credentials,
            bucket_name,
            reports_dir,
            pattern,
            local_target: cli.local_target.clone(),
        })
    }

    pub fn active_credential(&self) -> &ServiceAccountKey {
        self.credentials.select(self.environment)
    }
}

fn decode_credential<F>(lookup: &F, name: &str) -> Result<ServiceAccountKey, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let encoded = lookup(name).ok_or_else(|| ConfigError::MissingVar {
        name: name.to_owned(),
    })?;
    ServiceAccountKey::from_base64(name, &encoded)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;
    use crate::credentials::test::encoded_key;

    fn base_vars() -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(
            utils::PRODUCTION_CREDENTIALS_VAR.to_owned(),
            encoded_key("reports-prod"),
        );
        vars.insert(
            utils::DEVELOPMENT_CREDENTIALS_VAR.to_owned(),
            encoded_key("reports-dev"),
        );
        vars
    }

    fn load(cli: &Cli, vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_source(cli, |name| vars.get(name).cloned())
    }

    #[test]
    fn should_select_credential_from_environment_var() {
        let mut vars = base_vars();
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "development".to_owned());

        let config = load(&Cli::default(), &vars).unwrap();

        assert_eq!(config.environment, FirebaseEnvironment::Development);
        assert_eq!(config.active_credential().project_id, "reports-dev");
        assert_eq!(config.bucket_name, "reports-dev.appspot.com");
        assert_eq!(config.reports_dir, PathBuf::from("./reports"));
        assert_eq!(config.pattern.as_str(), "*.csv");
        assert!(config.local_target.is_none());
    }

    #[test]
    fn should_prefer_cli_overrides() {
        let mut vars = base_vars();
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "development".to_owned());
        vars.insert(utils::BUCKET_VAR.to_owned(), "from-env".to_owned());

        let cli = Cli {
            environment: Some("prod".to_owned()),
            bucket: Some("from-cli".to_owned()),
            reports_dir: Some(PathBuf::from("/tmp/out")),
            pattern: Some("*.tsv".to_owned()),
            local_target: None,
        };
        let config = load(&cli, &vars).unwrap();

        assert_eq!(config.environment, FirebaseEnvironment::Production);
        assert_eq!(config.active_credential().project_id, "reports-prod");
        assert_eq!(config.bucket_name, "from-cli");
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.pattern.as_str(), "*.tsv");
    }

    #[test]
    fn should_use_bucket_from_env_when_set() {
        let mut vars = base_vars();
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "production".to_owned());
        vars.insert(utils::BUCKET_VAR.to_owned(), "reports.firebasestorage.app".to_owned());

        let config = load(&Cli::default(), &vars).unwrap();
        assert_eq!(config.bucket_name, "reports.firebasestorage.app");
    }

    #[test]
    fn should_fail_without_environment_flag() {
        let config = load(&Cli::default(), &base_vars());
        assert!(matches!(config, Err(ConfigError::MissingEnvironment)));
    }

    #[test]
    fn should_fail_on_unknown_environment() {
        let mut vars = base_vars();
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "staging".to_owned());

        let config = load(&Cli::default(), &vars);
        assert!(matches!(config, Err(ConfigError::UnknownEnvironment { .. })));
    }

    #[test]
    fn should_fail_on_malformed_pattern() {
        let mut vars = base_vars();
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "production".to_owned());
        vars.insert(utils::REPORTS_PATTERN_VAR.to_owned(), "report[.csv".to_owned());

        match load(&Cli::default(), &vars) {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "report[.csv"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_fail_when_any_credential_is_missing() {
        let mut vars = base_vars();
        vars.remove(utils::DEVELOPMENT_CREDENTIALS_VAR);
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "production".to_owned());

        match load(&Cli::default(), &vars) {
            Err(ConfigError::MissingVar { name }) => {
                assert_eq!(name, utils::DEVELOPMENT_CREDENTIALS_VAR)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_fail_when_credential_is_garbage() {
        let mut vars = base_vars();
        vars.insert(
            utils::PRODUCTION_CREDENTIALS_VAR.to_owned(),
            "%%%".to_owned(),
        );
        vars.insert(utils::ENVIRONMENT_VAR.to_owned(), "development".to_owned());

        assert!(matches!(
            load(&Cli::default(), &vars),
            Err(ConfigError::InvalidBase64 { .. })
        ));
    }
}
