pub mod load_env;
pub mod shutdown_signal;
