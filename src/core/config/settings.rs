use super::parsing::{env_flag, env_number, env_optional, env_or_default, parse_cors_origins};
use super::types::{
    ApiSettings, AttemptSettings, ConfigError, CorsSettings, DatabaseSettings, Environment,
    RuntimeSettings, SecuritySettings, ServerSettings, Settings, TelemetrySettings,
};

const DEVELOPMENT_SECRET_KEY: &str = "classroom-attempts-development-key";
const MAX_SUBMIT_GRACE_SECONDS: u64 = 86_400;

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = Environment::parse(
            env_optional("CLASSROOM_ENV").or_else(|| env_optional("ENVIRONMENT")).as_deref(),
        );
        let runtime = RuntimeSettings {
            environment,
            strict_config: env_flag("CLASSROOM_STRICT_CONFIG") || environment.forces_strict_config(),
        };

        let settings = Self {
            server: load_server()?,
            runtime,
            api: ApiSettings {
                project_name: env_or_default("PROJECT_NAME", "Classroom Attempts API"),
                version: env_or_default("VERSION", env!("CARGO_PKG_VERSION")),
                api_v1_str: env_or_default("API_V1_STR", "/api/v1"),
            },
            security: SecuritySettings {
                secret_key: load_secret_key(),
                access_token_expire_minutes: env_number("ACCESS_TOKEN_EXPIRE_MINUTES", 10_080)?,
                algorithm: env_or_default("ALGORITHM", "HS256"),
            },
            cors: CorsSettings { origins: parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))? },
            database: load_database()?,
            attempts: AttemptSettings {
                submit_grace_seconds: env_number("ATTEMPT_SUBMIT_GRACE_SECONDS", 300)?,
                sweep_interval_seconds: env_number("ATTEMPT_SWEEP_INTERVAL_SECONDS", 60)?,
            },
            telemetry: TelemetrySettings {
                log_level: env_or_default("CLASSROOM_LOG_LEVEL", "info"),
                json: env_flag("CLASSROOM_LOG_JSON"),
                prometheus_enabled: env_flag("PROMETHEUS_ENABLED"),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server(&self) -> &ServerSettings {
        &self.server
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn attempts(&self) -> &AttemptSettings {
        &self.attempts
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_V1_STR",
                value: self.api.api_v1_str.clone(),
            });
        }

        let ranges = [
            ("ATTEMPT_SUBMIT_GRACE_SECONDS", self.attempts.submit_grace_seconds, 0, MAX_SUBMIT_GRACE_SECONDS),
            ("ATTEMPT_SWEEP_INTERVAL_SECONDS", self.attempts.sweep_interval_seconds, 1, 86_400),
            ("DATABASE_MAX_CONNECTIONS", u64::from(self.database.max_connections), 1, 1_000),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", self.security.access_token_expire_minutes, 1, 525_600),
        ];
        for (field, value, min, max) in ranges {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value, min, max });
            }
        }

        if !self.runtime.strict_config {
            return Ok(());
        }
        if !self.database.explicit_url && !self.database.has_password {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if env_optional("SECRET_KEY").is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        Ok(())
    }
}

/// Tokens are issued by the identity service, so the key must be shared with it. Outside strict
/// mode a fixed development key lets locally minted tokens verify.
fn load_secret_key() -> String {
    env_optional("SECRET_KEY").unwrap_or_else(|| {
        tracing::warn!("SECRET_KEY is not set; using the development signing key");
        DEVELOPMENT_SECRET_KEY.to_string()
    })
}

fn load_server() -> Result<ServerSettings, ConfigError> {
    let host = env_or_default("CLASSROOM_HOST", "0.0.0.0");
    let port: u16 = env_number("CLASSROOM_PORT", 8000)?;
    if port == 0 {
        return Err(ConfigError::InvalidValue { field: "CLASSROOM_PORT", value: port.to_string() });
    }
    Ok(ServerSettings { host, port })
}

fn load_database() -> Result<DatabaseSettings, ConfigError> {
    let max_connections = env_number("DATABASE_MAX_CONNECTIONS", 20)?;
    let password = env_or_default("POSTGRES_PASSWORD", "");
    let has_password = !password.is_empty();

    if let Some(url) = env_optional("DATABASE_URL") {
        return Ok(DatabaseSettings { url, max_connections, explicit_url: true, has_password });
    }

    let url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        env_or_default("POSTGRES_USER", "classroom"),
        password,
        env_or_default("POSTGRES_SERVER", "localhost"),
        env_number::<u16>("POSTGRES_PORT", 5432)?,
        env_or_default("POSTGRES_DB", "classroom_db"),
    );
    Ok(DatabaseSettings { url, max_connections, explicit_url: false, has_password })
}
