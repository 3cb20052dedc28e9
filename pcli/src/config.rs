use serde::{Deserialize, Serialize};
use std::{env, fs, io, path::PathBuf};

#[derive(Deserialize, Serialize)]
pub struct Config {
    pub url: String,
}

impl Config {
    pub fn path() -> io::Result<PathBuf> {
        let home = || env::var("HOME").map(PathBuf::from);
        let mut config_path = if cfg!(target_os = "linux") {
            match env::var("XDG_CONFIG_HOME") {
                Ok(s) => PathBuf::from(s),
                Err(_) => home()
                    .map(|p| p.join(".config"))
                    .or_else(|_| env::current_dir())?,
            }
        } else if cfg!(target_os = "macos") {
            home()
                .map(|p| p.join("Library/Application Support"))
                .or_else(|_| env::current_dir())?
        } else if cfg!(target_os = "windows") {
            env::var("APPDATA")
                .map(PathBuf::from)
                .or_else(|_| env::current_dir())?
        } else {
            eprintln!("Config path is not supported on this OS, using current directory.");
            env::current_dir()?
        };
        config_path.push("promptfs-cli");
        fs::create_dir_all(&config_path)?;
        config_path.push("config.toml");
        Ok(config_path)
    }

    /// Read the config file, writing the default one on first use.
    pub fn load() -> Self {
        let config_path = match Config::path() {
            Ok(p) => p,
            Err(_) => return Self::default(),
        };
        if config_path.is_file() {
            match fs::read_to_string(&config_path).map(|s| toml::from_str(&s)) {
                Ok(Ok(config)) => config,
                _ => {
                    eprintln!("Malformed {}, using defaults.", config_path.display());
                    Self::default()
                }
            }
        } else {
            let config = Self::default();
            if let Err(e) = config.save() {
                eprintln!("Could not write {}: {}", config_path.display(), e);
            }
            config
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let s = toml::to_string(self)?;
        fs::write(Config::path()?, s)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: "http://127.0.0.1:8080".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip() {
        let s = toml::to_string(&Config::default()).unwrap();
        assert_eq!(s.trim(), "url = \"http://127.0.0.1:8080\"");
        let back: Config = toml::from_str("url = \"http://10.0.0.2:9000\"").unwrap();
        assert_eq!(back.url, "http://10.0.0.2:9000");
    }
}
