/// The version of the service, taken from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision the binary was built from, if provided at build time.
pub const REVISION: Option<&str> = option_env!("VIDEOS_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
