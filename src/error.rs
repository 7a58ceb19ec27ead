// Error type for the dissolve engine.
// Every variant states *where* things went wrong. All of these are
// construction-time failures; a running effect never errors mid-tick.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An input image has zero width or height.
    #[error("image {index} is empty ({width}x{height})")]
    EmptyImage { index: usize, width: u32, height: u32 },

    /// Input images must share identical pixel dimensions.
    #[error("image {index} is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    DimensionMismatch {
        index: usize,
        want_w: u32,
        want_h: u32,
        got_w: u32,
        got_h: u32,
    },

    /// No images were supplied at all.
    #[error("at least one image is required")]
    NoImages,

    /// Decoding an image file failed.
    #[error("image load error ({path}): {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading the config file from disk failed.
    #[error("config read error ({path}): {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `EffectConfig`.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Creating the window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Command line could not be understood.
    #[error("usage: {0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
