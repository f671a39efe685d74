/// Errors that can occur when detecting point sources.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StarFindError {
    /// Error related to the input plane.
    #[error(transparent)]
    ImageError(#[from] pleiades_image::ImageError),

    /// The detector parameters contradict each other.
    #[error("Invalid detector parameters: {0}")]
    InvalidParameters(String),
}
