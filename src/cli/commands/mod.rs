mod init_config;
mod lookup;
mod seed;

pub use init_config::cmd_init_config;
pub use lookup::{LookupArgs, cmd_lookup};
pub use seed::{cmd_seed, sample_catalog};
