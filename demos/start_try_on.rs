//! Run a try-on against the synchronous endpoint.
//!
//! Requires `tryon_url`, `token`, `Cookie` and `referer` in the environment.
//!
//! ```sh
//! RUST_LOG=info cargo run --example start_try_on -- person.jpg garment.jpg result.png
//! ```

use std::path::Path;
use tryon_client::{codec, TryonClient, TryonConfig};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: start_try_on <person> <garment> <output>");
        return Ok(());
    }

    let client = TryonClient::new(TryonConfig::from_env()?)?;
    let person = codec::load_image(Path::new(&args[1]))?;
    let garment = codec::load_image(Path::new(&args[2]))?;

    let outcome = client
        .start_try_on(Some(&person), Some(&garment), 0, true)
        .await?;
    println!("{} (seed {:?})", outcome.message, outcome.seed_used);

    if let Some(image) = outcome.image {
        image.save(&args[3])?;
        println!("Saved: {}", args[3]);
    }

    Ok(())
}
