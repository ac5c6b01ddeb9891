pub mod config;
pub mod invoker;
pub mod provisioner;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use invoker::{
    BatchController, BatchEvent, BatchEventEnvelope, BatchHandle, BatchInvoker, BatchRequest,
    ConversionOptions, EventSink, GpuMode, InvokerConfig, InvokerError, VideoCodec,
};
pub use provisioner::{HttpFetcher, ProvisionError, Provisioner, ProvisionerConfig};
