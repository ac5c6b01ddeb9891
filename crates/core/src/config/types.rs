use serde::{Deserialize, Serialize};

use crate::invoker::InvokerConfig;
use crate::provisioner::ProvisionerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provisioner: ProvisionerConfig,
    #[serde(default)]
    pub invoker: InvokerConfig,
}
