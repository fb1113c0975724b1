use crate::config::AppConfig;

pub fn setup_logging(config: &AppConfig) {
    common::setup_logging(config.environment);
}
