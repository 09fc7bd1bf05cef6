use clap::{App, Arg};
use serde::Deserialize;
use server::{Config, Server};
use std::error::Error;
use std::fs;
use std::sync::Arc;

#[cfg(not(windows))]
use jemallocator::Jemalloc;

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Overlay read from an optional `--config` TOML file, mirroring
/// `original_source/config/config.go`'s `ParseConfigFile`. Every field is
/// optional: a file only needs to mention what it wants to override.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    listen_address: Option<String>,
    user: Option<String>,
    password: Option<String>,
    skip_auth: Option<bool>,
    log_level: Option<String>,
    concurrency_limit: Option<usize>,
}

/// Builds a `Config` from, in increasing precedence: built-in defaults, an
/// optional `--config` file, then individual CLI flags.
fn load_config() -> Result<Config, Box<dyn Error>> {
    let matches = App::new("mysqld")
        .about("A MySQL-wire-compatible protocol server")
        .arg(Arg::with_name("config").long("config").takes_value(true).value_name("PATH"))
        .arg(Arg::with_name("listen-address").long("listen-address").takes_value(true))
        .arg(Arg::with_name("user").long("user").takes_value(true))
        .arg(Arg::with_name("password").long("password").takes_value(true))
        .arg(Arg::with_name("skip-auth").long("skip-auth"))
        .arg(Arg::with_name("log-level").long("log-level").takes_value(true))
        .arg(Arg::with_name("concurrency-limit").long("concurrency-limit").takes_value(true))
        .get_matches();

    let mut config = Config::default();

    if let Some(path) = matches.value_of("config") {
        let text = fs::read_to_string(path)?;
        let overlay: FileConfig = toml::from_str(&text)?;
        if let Some(v) = overlay.listen_address {
            config.listen_address = v;
        }
        if let Some(v) = overlay.user {
            config.user = v;
        }
        if let Some(v) = overlay.password {
            config.password = v;
        }
        if let Some(v) = overlay.skip_auth {
            config.skip_auth = v;
        }
        if let Some(v) = overlay.log_level {
            config.log_level = v;
        }
        if let Some(v) = overlay.concurrency_limit {
            config.concurrency_limit = v;
        }
    }

    if let Some(v) = matches.value_of("listen-address") {
        config.listen_address = v.to_string();
    }
    if let Some(v) = matches.value_of("user") {
        config.user = v.to_string();
    }
    if let Some(v) = matches.value_of("password") {
        config.password = v.to_string();
    }
    if matches.is_present("skip-auth") {
        config.skip_auth = true;
    }
    if let Some(v) = matches.value_of("log-level") {
        config.log_level = v.to_string();
    }
    if let Some(v) = matches.value_of("concurrency-limit") {
        config.concurrency_limit = v.parse()?;
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    log::info!("starting mysqld, listen_address={}", config.listen_address);
    let engine: Arc<dyn engine::Engine> = Arc::new(engine_memory::MemoryEngine::new());
    let server = Arc::new(Server::new(config, engine));
    server.listen()?;
    Ok(())
}
