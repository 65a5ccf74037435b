use std::path::Path;

use anyhow::Result;
use dialoguer::Confirm;

use zk_ceremony_core::config::SetupConfig;

use crate::output;

/// Remove the local run outputs: metadata reports and computed zkeys.
///
/// The powers-of-tau cache survives unless `--ptau` is passed; cached
/// parameter files are valid for any ceremony and expensive to re-download.
pub async fn run(config_path: &Path, include_ptau: bool) -> Result<()> {
    output::print_header("zk-ceremony clean");

    let config = SetupConfig::load_or_default(config_path)?;

    let mut targets = vec![
        ("metadata", config.metadata_dir.clone()),
        ("zkeys", config.zkeys_dir.clone()),
    ];
    if include_ptau {
        targets.push(("ptau cache", config.ptau_dir.clone()));
    }

    for (label, dir) in &targets {
        output::print_key_value(label, &dir.display().to_string());
    }

    let confirmed = Confirm::new()
        .with_prompt("Remove these directories?")
        .default(false)
        .interact()?;
    if !confirmed {
        output::print_warning("Aborted — nothing was removed");
        return Ok(());
    }

    for (label, dir) in &targets {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
            output::print_success(&format!("Removed {label}"));
        } else {
            output::print_skipped(&format!("{label} not present"));
        }
    }

    Ok(())
}
