pub mod paths;
pub mod settings;

pub use paths::app_data_dir;
pub use settings::{get_config, load_config_from, OrbitConfig};
