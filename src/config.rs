use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use tracing::warn;

pub struct Config {
    pub http_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub model: Option<ModelConfig>,
}

/// Present only when a backend credential is set.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new() -> Config {
        Config {
            http_addr: parse_or(
                "HTTP_ADDR",
                SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
            ),
            static_dir: match env::var("STATIC_DIR") {
                Ok(var) => PathBuf::from(var),
                Err(_) => PathBuf::from("static"),
            },
            model: match env::var("GOOGLE_API_KEY") {
                Ok(key) if !key.trim().is_empty() => Some(ModelConfig {
                    api_key: key.trim().to_string(),
                    model: match env::var("GEMINI_MODEL") {
                        Ok(var) => var,
                        Err(_) => String::from("gemini-pro"),
                    },
                    endpoint: match env::var("GEMINI_ENDPOINT") {
                        Ok(var) => var,
                        Err(_) => {
                            String::from("https://generativelanguage.googleapis.com/v1beta")
                        }
                    },
                    timeout: model_timeout(env::var("MODEL_TIMEOUT_SECS").ok()),
                }),
                _ => None,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

const MODEL_TIMEOUT_SECS: u64 = 30;

/// Whole seconds, above zero.
fn model_timeout(raw: Option<String>) -> Duration {
    let secs = match raw {
        None => MODEL_TIMEOUT_SECS,
        Some(var) => match var.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    key = "MODEL_TIMEOUT_SECS",
                    value = %var,
                    "ignoring malformed environment variable"
                );
                MODEL_TIMEOUT_SECS
            }
        },
    };
    Duration::from_secs(secs)
}

/// Parse an env var, keep the default when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(var) => match var.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %var, "ignoring malformed environment variable");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_timeout_needs_positive_seconds() {
        assert_eq!(model_timeout(None), Duration::from_secs(30));
        assert_eq!(model_timeout(Some("5".into())), Duration::from_secs(5));
        assert_eq!(model_timeout(Some(" 12 ".into())), Duration::from_secs(12));
        assert_eq!(model_timeout(Some("0".into())), Duration::from_secs(30));
        assert_eq!(model_timeout(Some("-3".into())), Duration::from_secs(30));
        assert_eq!(model_timeout(Some("soon".into())), Duration::from_secs(30));
    }
}
