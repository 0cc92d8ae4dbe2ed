//! `evmix mix` — pooled event mixing over a Parquet event table.

use anyhow::{Context, Result};
use std::path::Path;

use mx_mix::{MixOptions, MixPolicy, Mixer};

/// Parsed combination spec from CLI: `NAME:stem1,stem2,...`.
pub struct CombArg {
    pub name: String,
    pub stems: Vec<String>,
}

impl CombArg {
    /// Parse `"J_psi_1S:muplus,muminus"`.
    pub fn parse(s: &str) -> Result<Self> {
        let Some((name, stems)) = s.split_once(':') else {
            anyhow::bail!("invalid combination spec '{s}': expected 'NAME:stem1,stem2,...'");
        };
        let name = name.trim();
        let stems: Vec<String> = stems.split(',').map(|p| p.trim().to_string()).collect();
        if name.is_empty() || stems.iter().any(|p| p.is_empty()) {
            anyhow::bail!("invalid combination spec '{s}': empty name or stem");
        }
        Ok(Self { name: name.to_string(), stems })
    }
}

/// Resolve the `--policy`/`--seed` pair.
pub fn parse_policy(policy: &str, seed: Option<u64>) -> Result<MixPolicy> {
    match policy {
        "recent" => Ok(MixPolicy::Recent),
        "rotating" => Ok(MixPolicy::Rotating),
        "seeded" => {
            let seed = seed.ok_or_else(|| anyhow::anyhow!("--policy seeded requires --seed"))?;
            Ok(MixPolicy::Seeded(seed))
        }
        other => anyhow::bail!("unknown policy '{other}': expected recent, rotating, or seeded"),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_mix(
    input: &Path,
    output: &Path,
    train_length: usize,
    combinations: &[String],
    policy: &str,
    seed: Option<u64>,
    progress: bool,
    verbose: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let combos: Vec<CombArg> =
        combinations.iter().map(|s| CombArg::parse(s)).collect::<Result<_>>()?;
    let policy = parse_policy(policy, seed)?;

    tracing::info!("opening event table: {}", input.display());
    let table = mx_table::read_events(input)
        .with_context(|| format!("failed to read event table {}", input.display()))?;
    tracing::info!("read {} events", table.n_rows());

    let mut mixer = Mixer::new(train_length, table, output)
        .with_context(|| format!("failed to set up mixer for {}", output.display()))?
        .with_policy(policy);
    for c in combos {
        mixer
            .add_combination(c.name, c.stems)
            .context("failed to register combination")?;
    }

    let report =
        mixer.run_mixing(MixOptions { progress, verbose }).context("mixing failed")?;

    let json = serde_json::to_string_pretty(&report)?;
    match report_path {
        Some(p) => std::fs::write(p, json)
            .with_context(|| format!("failed to write report {}", p.display()))?,
        None => println!("{json}"),
    }

    let file_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Mixed {} entries → {} candidate rows → {} ({:.1} KB)",
        report.entries,
        report.rows_written,
        output.display(),
        file_size as f64 / 1024.0,
    );

    Ok(())
}
