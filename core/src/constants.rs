/// Defaults used when a caller builds `Configuration::default()`.
pub const DEFAULT_LEVEL: i8 = 6;
pub const DEFAULT_WINDOW_SIZE: u8 = 15;
pub const DEFAULT_MEMORY_LEVEL: u8 = 8;
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024; // 16 KiB
pub const DEFAULT_TRICKLE_RATE: usize = 1024;

/// Parameter bounds accepted by `Configuration::new`.
pub const LEVEL_RANGE: std::ops::RangeInclusive<i8> = -1..=9;
pub const WINDOW_SIZE_RANGE: std::ops::RangeInclusive<u8> = 8..=15;
pub const MEMORY_LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=9;
pub const STRATEGY_RANGE: std::ops::RangeInclusive<u8> = 0..=4;

/// Smallest internal transform buffer.
pub const MIN_CHUNK_SIZE: usize = 64;
/// Window sizes below this are raised to it (legacy normalization).
pub const MIN_EFFECTIVE_WINDOW_SIZE: u8 = 9;

/// Pipelines launched per wave unless the config says otherwise.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Dimension values for the full ("pummel") matrix.
pub mod full {
    pub const CHUNK_SIZES: &[usize] = &[128, 1024, 16 * 1024, 1024 * 1024];
    pub const TRICKLE_RATES: &[usize] = &[128, 1024, 1024 * 1024];
    pub const WINDOW_SIZES: &[u8] = &[8, 9, 10, 11, 12, 13, 14, 15];
    pub const LEVELS: &[i8] = &[-1, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    pub const MEMORY_LEVELS: &[u8] = &[1, 2, 3, 4, 5, 6, 7, 8, 9];
    pub const STRATEGIES: &[u8] = &[0, 1, 2, 3, 4];
}

/// Dimension values for the quick matrix.
pub mod quick {
    pub const CHUNK_SIZES: &[usize] = &[16 * 1024];
    pub const TRICKLE_RATES: &[usize] = &[1024];
    pub const WINDOW_SIZES: &[u8] = &[15];
    pub const LEVELS: &[i8] = &[6];
    pub const MEMORY_LEVELS: &[u8] = &[8];
    pub const STRATEGIES: &[u8] = &[0];
}

/// Stable transform pair identifiers.
pub mod pair_ids {
    pub const DEFLATE_INFLATE: u16     = 0x0001;
    pub const GZIP_GUNZIP: u16         = 0x0002;
    pub const DEFLATE_UNZIP: u16       = 0x0003;
    pub const GZIP_UNZIP: u16          = 0x0004;
    pub const DEFLATE_RAW_INFLATE: u16 = 0x0005;
    pub const ZSTD_ZSTD: u16           = 0x0006;
}
