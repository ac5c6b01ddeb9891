use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Provisioner URL and file/dir names are not empty
/// - Provisioner request timeout is not 0
/// - Invoker event buffer is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let provisioner = &config.provisioner;

    if provisioner.download_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provisioner.download_url cannot be empty".to_string(),
        ));
    }

    let names = [
        ("install_dir_name", &provisioner.install_dir_name),
        ("staging_dir_name", &provisioner.staging_dir_name),
        ("archive_name", &provisioner.archive_name),
        ("binary_name", &provisioner.binary_name),
    ];
    for (field, value) in names {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "provisioner.{} cannot be empty",
                field
            )));
        }
    }

    if provisioner.install_dir_name == provisioner.staging_dir_name {
        return Err(ConfigError::ValidationError(
            "provisioner.install_dir_name and provisioner.staging_dir_name must differ"
                .to_string(),
        ));
    }

    if provisioner.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "provisioner.request_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.invoker.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "invoker.event_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}
