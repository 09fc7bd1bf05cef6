/// Configuration consumed (not parsed) by the core, per spec 6: parsing a
/// config file or CLI flags is the binary crate's job.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    pub user: String,
    pub password: String,
    pub skip_auth: bool,
    pub log_level: String,
    pub concurrency_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: "0.0.0.0:3306".to_string(),
            user: String::new(),
            password: String::new(),
            skip_auth: false,
            log_level: "info".to_string(),
            concurrency_limit: 100,
        }
    }
}
