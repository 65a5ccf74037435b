use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use zk_ceremony_core::cache::HttpPtauSource;
use zk_ceremony_core::ceremony::CeremonyInputData;
use zk_ceremony_core::collector::{self, CircuitDetails, CollectorPrompt};
use zk_ceremony_core::config::SetupConfig;
use zk_ceremony_core::engine::SnarkjsEngine;
use zk_ceremony_core::error::CeremonyError;
use zk_ceremony_core::registry::HttpRegistry;
use zk_ceremony_core::staging::SetupPipeline;
use zk_ceremony_core::storage::HttpStorage;

use crate::output;

/// Assemble a new ceremony and register it with the coordinator.
///
/// The two interactive gates — "add another circuit?" and the final
/// "create ceremony?" confirmation — are the only cancellation points.
/// Once staging starts, the run either completes or aborts fatally.
pub async fn run(config_path: &Path, token: Option<String>) -> Result<()> {
    output::print_header("zk-ceremony setup");

    let mut config = SetupConfig::load_or_default(config_path)?;
    if token.is_some() {
        config.api_token = token;
    }
    config.prepare_dirs()?;

    // Candidate circuits must exist before asking the operator anything.
    let pool = collector::scan_pool(&config.working_dir)?;
    output::print_key_value("Working dir", &config.working_dir.display().to_string());
    output::print_key_value("Circuit files found", &pool.len().to_string());

    let ceremony = prompt_ceremony_input()?;
    let prefix = ceremony.prefix();
    output::print_key_value("Ceremony prefix", &prefix);

    let mut prompt = DialoguerPrompt;
    let collected = collector::collect(pool, &mut prompt).await?;

    let pipeline = SetupPipeline::new(
        config.clone(),
        SnarkjsEngine::new()?,
        HttpPtauSource::new(config.ptau_base_url.clone()),
        HttpStorage::new(config.storage_base_url.clone()),
        HttpRegistry::new(config.api_base_url.clone(), config.api_token.clone()),
    );

    // Metadata extraction is purely local; nothing has touched storage yet.
    let spinner = spinner(&format!(
        "Extracting metadata for {} circuit(s)...",
        collected.len()
    ));
    let prepared = pipeline.prepare(collected).await?;
    spinner.finish_and_clear();

    output::print_success("Metadata extracted");
    for circuit in &prepared {
        output::print_key_value(
            &circuit.input.name,
            &format!(
                "{} constraints, {} wires, pot 2^{}",
                circuit.metadata.constraints, circuit.metadata.wires, circuit.metadata.pot
            ),
        );
    }

    // Final gate before any remote write.
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Create ceremony '{}' with {} circuit(s)?",
            ceremony.title,
            prepared.len()
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        output::print_warning("Aborted — nothing was created");
        return Ok(());
    }

    let total = prepared.len() as u32;
    output::print_step(1, 2, &format!("Staging {total} circuit(s) to storage..."));
    let spinner = self::spinner("Computing zkeys and uploading artifacts...");
    let staged = pipeline.stage_all(&prefix, prepared).await?;
    spinner.finish_and_clear();
    output::print_success(&format!("{total} circuit(s) staged"));

    output::print_step(2, 2, "Registering ceremony with coordinator...");
    let receipt = pipeline.register(ceremony, staged).await?;

    output::print_success("Ceremony created");
    output::print_key_value("Ceremony id", &receipt.ceremony_id);
    output::print_key_value("Storage prefix", &prefix);

    Ok(())
}

/// Collect ceremony-level input from the operator.
fn prompt_ceremony_input() -> Result<CeremonyInputData> {
    let title: String = Input::new()
        .with_prompt("Ceremony title")
        .interact_text()?;
    let description: String = Input::new()
        .with_prompt("Ceremony description")
        .interact_text()?;
    let start: String = Input::new()
        .with_prompt("Start date (YYYY-MM-DD)")
        .interact_text()?;
    let end: String = Input::new()
        .with_prompt("End date (YYYY-MM-DD)")
        .interact_text()?;

    let ceremony = CeremonyInputData::new(
        title,
        description,
        parse_date(&start)?,
        parse_date(&end)?,
    )?;
    Ok(ceremony)
}

fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{input}', expected YYYY-MM-DD"))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .context("invalid time of day")?
        .and_utc();
    Ok(datetime)
}

/// Interactive circuit collection backed by dialoguer.
struct DialoguerPrompt;

#[async_trait]
impl CollectorPrompt for DialoguerPrompt {
    async fn select_circuit(
        &mut self,
        pool: &[PathBuf],
    ) -> zk_ceremony_core::error::Result<usize> {
        let items: Vec<String> = pool
            .iter()
            .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
            .collect();
        let selection = Select::new()
            .with_prompt("Select a circuit file")
            .items(&items)
            .default(0)
            .interact()
            .map_err(into_core)?;
        Ok(selection)
    }

    async fn circuit_details(
        &mut self,
        file: &Path,
        position: u32,
    ) -> zk_ceremony_core::error::Result<CircuitDetails> {
        let default_name = file
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let name: String = Input::new()
            .with_prompt(format!("Circuit {position} name"))
            .default(default_name)
            .interact_text()
            .map_err(into_core)?;
        let description: String = Input::new()
            .with_prompt("Circuit description")
            .interact_text()
            .map_err(into_core)?;
        let max_contribution_wait_minutes: u32 = Input::new()
            .with_prompt("Max contribution wait (minutes)")
            .default(10)
            .interact_text()
            .map_err(into_core)?;

        Ok(CircuitDetails {
            name,
            description,
            max_contribution_wait_minutes,
        })
    }

    async fn wants_another(&mut self) -> zk_ceremony_core::error::Result<bool> {
        Confirm::new()
            .with_prompt("Add another circuit?")
            .default(true)
            .interact()
            .map_err(into_core)
    }
}

fn into_core(e: dialoguer::Error) -> CeremonyError {
    CeremonyError::Other(anyhow::Error::new(e))
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
