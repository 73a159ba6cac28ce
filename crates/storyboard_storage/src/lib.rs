//! Artifact storage for generated storyboard frames.
//!
//! A generated image is handed to an [`ArtifactStore`], which persists it and
//! returns the URL recorded on the scene.
//!
//! # Backends
//!
//! - [`FileSystemArtifactStore`]: content-addressed files on local disk
//! - [`DataUrlArtifactStore`]: inline `data:` URLs, nothing written to disk

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod data_url;
mod filesystem;
mod media_type;
mod storage;

pub use data_url::DataUrlArtifactStore;
pub use filesystem::FileSystemArtifactStore;
pub use media_type::ImageFormat;
pub use storage::ArtifactStore;
