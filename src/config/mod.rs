mod settings;

pub use settings::{
    LogFormat, LookupConfig, ServerConfig, SlackConfig, Settings, load_settings,
};
