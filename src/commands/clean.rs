//! Clean the output directory

use anyhow::Result;

use crate::Galley;

/// Remove the output directory if it exists.
pub fn run(site: &Galley) -> Result<()> {
    if site.output_dir.exists() {
        site.clean()?;
        println!("Removed {}", site.output_dir.display());
    } else {
        println!("Nothing to clean");
    }

    Ok(())
}
