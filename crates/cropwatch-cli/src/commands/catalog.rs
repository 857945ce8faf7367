use std::path::Path;

use cropwatch_core::CropwatchConfig;
use cropwatch_pipeline::Catalog;

pub fn export(config: &CropwatchConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let catalog = Catalog::from_config(config);
    let json = serde_json::to_string_pretty(&catalog.to_document())?;

    match out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))?;
            println!(
                "✓ Wrote {} fields to {}{}",
                catalog.fields().len(),
                path.display(),
                if catalog.is_synthetic_fallback() { " (synthetic)" } else { "" }
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
