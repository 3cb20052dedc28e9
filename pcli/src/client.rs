mod files;

use crate::config::Config;
use crate::Result;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde_json::Value;

#[macro_use]
mod macros {
    /// If response is an error status, print its error message and exit.
    #[macro_export]
    macro_rules! handle_error {
        ($response:expr) => {
            if !$response.status().is_success() {
                let status = $response.status();
                let v: serde_json::Value = $response.json().await.unwrap_or_default();
                match v["error"].as_str() {
                    Some(e) => eprintln!("{}", e),
                    None => eprintln!("{}", status),
                }
                std::process::exit(1);
            }
        };
    }
}

/// Client state struct.
pub struct Client {
    pub config: Config,
    http: ReqwestClient,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Client {
            config,
            http: ReqwestClient::new(),
        }
    }

    /// Check connectivity.
    pub async fn ping(&self) -> Result<String> {
        let response = self.get("ping").send().await?;
        handle_error!(response);
        Ok(response.text().await?)
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/api/{}", self.config.url.trim_end_matches('/'), route)
    }

    fn get(&self, route: &str) -> RequestBuilder {
        self.http.get(self.endpoint(route))
    }

    fn post(&self, route: &str) -> RequestBuilder {
        self.http.post(self.endpoint(route))
    }

    fn delete(&self, route: &str) -> RequestBuilder {
        self.http.delete(self.endpoint(route))
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new(Config::load())
    }
}

/// Get a string field of a JSON reply.
fn field(v: &Value, key: &str) -> String {
    match &v[key] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
