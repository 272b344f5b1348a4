use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use easyholmes_application::{AggregationSettings, CacheTtlPolicy, HolmesCatalogSettings};
use easyholmes_core::AppError;
use easyholmes_infrastructure::JWT_SECRET_MIN_LENGTH;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_HOLMES_BASE_URL: &str = "https://app-api.holmesdoc.io/v1";

#[derive(Debug, Clone)]
pub struct HolmesRuntimeConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub jwt_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub holmes: HolmesRuntimeConfig,
    pub aggregation: AggregationSettings,
    pub cache_ttl: CacheTtlPolicy,
    pub catalog: HolmesCatalogSettings,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup<F>(migrate_only: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = EnvSource { lookup };

        let database_url = source.required("DATABASE_URL")?;
        let jwt_secret = source.required("JWT_SECRET")?;
        if jwt_secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {JWT_SECRET_MIN_LENGTH} characters"
            )));
        }

        let api_host = source.optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = source.parsed("API_PORT", 3000_u16)?;
        let frontend_url = source
            .optional("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_owned());
        validate_url("FRONTEND_URL", &frontend_url)?;

        let holmes = HolmesRuntimeConfig {
            base_url: source
                .optional("HOLMES_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_HOLMES_BASE_URL.to_owned()),
            api_token: source.required("HOLMES_API_TOKEN")?,
            timeout: Duration::from_secs(source.parsed("HOLMES_TIMEOUT_SECONDS", 90_u64)?),
        };
        validate_url("HOLMES_API_BASE_URL", &holmes.base_url)?;

        let aggregation_defaults = AggregationSettings::default();
        let aggregation = AggregationSettings {
            history_per_page: source.positive(
                "HOLMES_HISTORY_PER_PAGE",
                aggregation_defaults.history_per_page,
            )?,
            history_max_pages: source.positive(
                "HOLMES_HISTORY_MAX_PAGES",
                aggregation_defaults.history_max_pages,
            )?,
            history_concurrency: source.positive(
                "HOLMES_HISTORY_CONCURRENCY",
                aggregation_defaults.history_concurrency,
            )?,
            process_name_filter: source.optional("HOLMES_PROCESS_NAME"),
        };

        let ttl_defaults = CacheTtlPolicy::default();
        let cache_ttl = CacheTtlPolicy {
            process_list: source.ttl("CACHE_TTL_PROCESS_LIST_SECONDS", ttl_defaults.process_list)?,
            process_history: source.ttl(
                "CACHE_TTL_PROCESS_HISTORY_SECONDS",
                ttl_defaults.process_history,
            )?,
            task_details: source.ttl("CACHE_TTL_TASK_DETAILS_SECONDS", ttl_defaults.task_details)?,
            property_options: source.ttl(
                "CACHE_TTL_PROPERTY_OPTIONS_SECONDS",
                ttl_defaults.property_options,
            )?,
            template: source.ttl("CACHE_TTL_TEMPLATE_SECONDS", ttl_defaults.template)?,
            default: source.ttl("CACHE_TTL_DEFAULT_SECONDS", ttl_defaults.default)?,
        };
        cache_ttl.validate()?;

        let catalog_defaults = HolmesCatalogSettings::default();
        let catalog = HolmesCatalogSettings {
            instance_entity_id: source
                .optional("HOLMES_INSTANCE_ENTITY_ID")
                .unwrap_or(catalog_defaults.instance_entity_id),
            instance_sort_field: source
                .optional("HOLMES_INSTANCE_SORT_FIELD")
                .unwrap_or(catalog_defaults.instance_sort_field),
            process_workflow_id: source
                .optional("HOLMES_PROCESS_WORKFLOW_ID")
                .unwrap_or(catalog_defaults.process_workflow_id),
            process_start_event: source
                .optional("HOLMES_PROCESS_START_EVENT")
                .unwrap_or(catalog_defaults.process_start_event),
            discipline_property_id: source
                .optional("HOLMES_DISCIPLINE_PROPERTY_ID")
                .unwrap_or(catalog_defaults.discipline_property_id),
            stage_property_id: source
                .optional("HOLMES_STAGE_PROPERTY_ID")
                .unwrap_or(catalog_defaults.stage_property_id),
        };

        let bootstrap_admin = match (source.optional("ADMIN_EMAIL"), source.optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdminConfig {
                name: source
                    .optional("ADMIN_NAME")
                    .unwrap_or_else(|| "Administrador".to_owned()),
                email,
                password,
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            jwt_secret,
            api_host,
            api_port,
            frontend_url,
            holmes,
            aggregation,
            cache_ttl,
            catalog,
            bootstrap_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parsed<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
            None => Ok(default),
        }
    }

    fn positive<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr + Default + PartialEq,
        T::Err: std::fmt::Display,
    {
        let value = self.parsed(name, default)?;
        if value == T::default() {
            return Err(AppError::Validation(format!("{name} must be greater than zero")));
        }
        Ok(value)
    }

    fn ttl(&self, name: &str, default: Duration) -> Result<Duration, AppError> {
        self.parsed(name, default.as_secs()).map(Duration::from_secs)
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), AppError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://easyholmes@localhost/easyholmes"),
            ("JWT_SECRET", "a-very-long-secret-used-only-by-config-tests"),
            ("HOLMES_API_TOKEN", "holmes-token"),
        ])
    }

    fn load(values: &HashMap<&'static str, &'static str>) -> Result<ApiConfig, AppError> {
        ApiConfig::from_lookup(false, |name| values.get(name).map(|value| (*value).to_owned()))
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() -> Result<(), AppError> {
        let config = load(&base_env())?;

        assert_eq!(config.api_port, 3000);
        assert_eq!(config.frontend_url, "http://localhost:8080");
        assert_eq!(config.holmes.base_url, DEFAULT_HOLMES_BASE_URL);
        assert_eq!(config.holmes.timeout, Duration::from_secs(90));
        assert_eq!(config.aggregation, AggregationSettings::default());
        assert_eq!(config.cache_ttl, CacheTtlPolicy::default());
        assert_eq!(config.catalog, HolmesCatalogSettings::default());
        assert!(config.bootstrap_admin.is_none());
        Ok(())
    }

    #[test]
    fn missing_holmes_token_is_rejected() {
        let mut values = base_env();
        values.remove("HOLMES_API_TOKEN");
        assert!(matches!(load(&values), Err(AppError::Validation(message)) if message.contains("HOLMES_API_TOKEN")));
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut values = base_env();
        values.insert("JWT_SECRET", "short");
        assert!(matches!(load(&values), Err(AppError::Validation(_))));
    }

    #[test]
    fn misordered_ttl_override_is_rejected() {
        let mut values = base_env();
        values.insert("CACHE_TTL_PROCESS_HISTORY_SECONDS", "900");
        assert!(matches!(load(&values), Err(AppError::Validation(_))));
    }

    #[test]
    fn overrides_are_parsed() -> Result<(), AppError> {
        let mut values = base_env();
        values.insert("API_PORT", "4000");
        values.insert("HOLMES_HISTORY_PER_PAGE", "50");
        values.insert("HOLMES_PROCESS_NAME", "Auditoria BIM");
        values.insert("CACHE_TTL_PROCESS_HISTORY_SECONDS", "10");
        values.insert("ADMIN_EMAIL", "admin@easyholmes.com");
        values.insert("ADMIN_PASSWORD", "admin123");

        let config = load(&values)?;
        assert_eq!(config.api_port, 4000);
        assert_eq!(config.aggregation.history_per_page, 50);
        assert_eq!(
            config.aggregation.process_name_filter.as_deref(),
            Some("Auditoria BIM")
        );
        assert_eq!(config.cache_ttl.process_history, Duration::from_secs(10));
        assert!(matches!(
            config.bootstrap_admin,
            Some(ref admin) if admin.email == "admin@easyholmes.com" && admin.name == "Administrador"
        ));
        Ok(())
    }

    #[test]
    fn zero_concurrency_and_half_admin_config_are_rejected() {
        let mut zero = base_env();
        zero.insert("HOLMES_HISTORY_CONCURRENCY", "0");
        assert!(matches!(load(&zero), Err(AppError::Validation(_))));

        let mut half = base_env();
        half.insert("ADMIN_EMAIL", "admin@easyholmes.com");
        assert!(matches!(load(&half), Err(AppError::Validation(_))));
    }
}
