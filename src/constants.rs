/// Centralized constants for blitlink
pub mod constants {
    /// Name of the FTS5 virtual table holding the links
    pub const TABLE_NAME: &str = "blitlinks";

    /// Side table recording the highest id ever handed out
    pub const META_TABLE_NAME: &str = "blitlinks_meta";

    /// Key of the id high-water mark in the meta table
    pub const LAST_ID_KEY: &str = "last_id";

    /// Configuration filename
    pub const CONFIG_FILENAME: &str = "config.toml";

    /// Global config directory name (in the user config directory)
    pub const GLOBAL_CONFIG_DIR_NAME: &str = "blitlink";

    /// How long a write waits on another invocation's lock
    pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

    /// bm25 weight of the shortcut column relative to the other columns
    pub const DEFAULT_SHORTCUT_WEIGHT: f64 = 10.0;
}
