//! List the bundled example images.
//!
//! ```sh
//! cargo run --example list_examples -- assets
//! ```

use std::path::PathBuf;
use tryon_client::ExampleGallery;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let assets = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    let gallery = ExampleGallery::load(&assets)?;
    println!(
        "{} person image(s), {} garment image(s), {} page(s)",
        gallery.humans.len(),
        gallery.garments.len(),
        gallery.page_count()
    );

    for (page, humans) in (0..gallery.page_count()).map(|p| (p, gallery.human_page(p))) {
        println!("-- page {} --", page + 1);
        for path in humans {
            println!("  person:  {}", path.display());
        }
        for path in gallery.garment_page(page) {
            println!("  garment: {}", path.display());
        }
    }

    for entry in &gallery.showcase {
        println!(
            "showcase: {} + {} -> {}",
            entry.person.display(),
            entry.garment.display(),
            entry.result.display()
        );
    }

    Ok(())
}
