/// Environment variable overriding the maximum evaluation scope depth.
pub const MAX_EVALUATION_DEPTH_ENV: &str = "LAZYCONF_MAX_EVALUATION_DEPTH";

/// Default limit on nested evaluation scopes per thread.
pub const DEFAULT_MAX_EVALUATION_DEPTH: usize = 512;
