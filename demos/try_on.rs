//! Submit a try-on job and poll for the result.
//!
//! Requires `tryon_url`, `token`, `Cookie` and `referer` in the environment.
//!
//! ```sh
//! RUST_LOG=info cargo run --example try_on -- person.jpg garment.jpg result.png [seed]
//! ```

use std::path::Path;
use tryon_client::{codec, TryonClient, TryonConfig, TryonError};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: try_on <person> <garment> <output> [seed]");
        return Ok(());
    }

    // No seed argument means a random one
    let seed: Option<u32> = args.get(4).map(|s| s.parse()).transpose()?;

    let client = TryonClient::new(TryonConfig::from_env()?)?;
    let person = codec::load_image(Path::new(&args[1]))?;
    let garment = codec::load_image(Path::new(&args[2]))?;

    match client
        .try_on(Some(&person), Some(&garment), seed.unwrap_or(0), seed.is_none())
        .await
    {
        Ok(outcome) => {
            println!("{} (seed {:?})", outcome.message, outcome.seed_used);
            if let Some(image) = outcome.image {
                image.save(&args[3])?;
                println!("Saved: {}", args[3]);
            }
        }
        Err(TryonError::Busy { reason }) => {
            eprintln!("Too many users, please try again later ({})", reason);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
