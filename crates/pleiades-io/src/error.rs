/// An error type for the io module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum IoError {
    /// Error to create or read the plane.
    #[error(transparent)]
    ImageError(#[from] pleiades_image::ImageError),

    /// The raw data does not hold exactly one value per pixel.
    #[error("Expected {0} bytes of pixel data, got {1}")]
    DataLength(usize, usize),

    /// The sink rejected a write.
    #[error("Failed to write plane {0}: {1}")]
    SinkError(usize, String),
}
