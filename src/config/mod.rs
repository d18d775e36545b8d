mod options;
mod settings;

pub use options::*;
pub use settings::ENV_PREFIX;
