// Crate error type. Every variant states *where* things went wrong.
// Only window and config failures escape `main`; the rest degrade visually.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("window update error: {0}")]
    WindowUpdate(String), // Pushing the frame to the window failed

    #[error("config read error: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("asset error: {0}")]
    Asset(#[from] image::ImageError),

    #[error("effect stage failed: {0}")]
    Effect(String), // A post-process stage could not run this frame
}
