//! # tryon-client
//!
//! Async Rust client for a remote virtual try-on service: send a person
//! photo and a garment photo, get back the composite image.
//!
//! Two flows are supported:
//!
//! - **Submit and poll** ([`TryonClient::try_on`]): POST a job, wait, then
//!   query its status on a fixed schedule.
//! - **Submit and wait** ([`TryonClient::start_try_on`]): one POST to a
//!   synchronous endpoint that returns the image inline.
//!
//! Images travel as base64 JPEG ([`codec`]). Credentials are read once into
//! a [`TryonConfig`] and handed to the client explicitly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tryon_client::{codec, TryonClient, TryonConfig};
//! use std::path::Path;
//!
//! # async fn example() -> tryon_client::Result<()> {
//! let client = TryonClient::new(TryonConfig::from_env()?)?;
//!
//! let person = codec::load_image(Path::new("person.jpg"))?;
//! let garment = codec::load_image(Path::new("garment.jpg"))?;
//!
//! let outcome = client.try_on(Some(&person), Some(&garment), 0, true).await?;
//! if let Some(image) = outcome.image {
//!     image.save("result.png").map_err(tryon_client::CodecError::from)?;
//! }
//! println!("{} (seed {:?})", outcome.message, outcome.seed_used);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod gallery;
pub mod request;
pub mod types;

pub use client::TryonClient;
pub use codec::EncodedImage;
pub use config::{Credentials, PollSchedule, TryonConfig};
pub use error::{CodecError, Result, TryonError};
pub use gallery::{ExampleGallery, Showcase};
pub use request::{resolve_seed, TryonRequest, MAX_SEED};
pub use types::{
    JobHandle, JobStatus, PollAttempt, PollOutcome, TryonOutcome, MSG_BUSY, MSG_EMPTY_IMAGE,
    MSG_ERROR, MSG_SUCCESS, MSG_TRY_AGAIN, MSG_URL_ERROR,
};
