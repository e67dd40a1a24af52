use thiserror::Error;

#[derive(Debug, Error)]
pub enum PalletError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Carton height {height} exceeds the maximum stack height {max_height}")]
    HeightExceedsMax { height: u32, max_height: u32 },
    #[error("Invalid pallet dimensions: {length}x{width}")]
    InvalidDimensions { length: u32, width: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, PalletError>;
