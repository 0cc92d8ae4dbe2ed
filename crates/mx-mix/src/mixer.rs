//! The Mixer: sequential pooled event mixing over an event table.

use std::fs::File;
use std::path::PathBuf;

use mx_core::{Error, FourMomentum, Result};
use mx_table::{CandidateWriter, CombinationMeta, EventTable};

use crate::combination::MixCombination;
use crate::policy::{MixPolicy, PartnerSelector};
use crate::train::Train;

/// Diagnostic switches for [`Mixer::run_mixing`].
///
/// Neither flag changes the algorithm or the output, only what is reported
/// while it runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixOptions {
    /// Report `Processing entry i/total (p%)` on stderr. Low overhead.
    pub progress: bool,
    /// Log every mixed particle (stem, source row, run and event number)
    /// through `tracing::debug!`. High overhead.
    pub verbose: bool,
}

/// Summary of a completed mixing run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MixReport {
    /// Input records processed, in `(runNumber, eventNumber)` order.
    pub entries: u64,
    /// Candidate rows written to the output dataset.
    pub rows_written: u64,
    /// Records skipped because the pool could not yet supply enough
    /// distinct partner events.
    pub warmup_skipped: u64,
    /// Names of registered combinations excluded from the run.
    pub skipped_combinations: Vec<String>,
}

struct Registered {
    combo: MixCombination,
    valid: bool,
}

/// Stateful event mixer.
///
/// Construct with a train length, an input table and an output path,
/// register combinations with [`Mixer::add_combination`], then call
/// [`Mixer::run_mixing`] exactly once.
pub struct Mixer {
    train_length: usize,
    table: EventTable,
    output_path: PathBuf,
    output: Option<File>,
    policy: MixPolicy,
    registered: Vec<Registered>,
}

impl Mixer {
    /// Create a mixer.
    ///
    /// `train_length` is the number of recent events retained in the pool
    /// and must be at least 2: mixing needs a second distinct event to draw
    /// partners from. The output file is created (truncated) here and
    /// written during the run.
    pub fn new(
        train_length: usize,
        table: EventTable,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        if train_length < 2 {
            return Err(Error::Validation(format!(
                "train_length must be at least 2, got {train_length}"
            )));
        }
        let output_path = output_path.into();
        let output = File::create(&output_path).map_err(|e| {
            Error::Table(format!("failed to create {}: {e}", output_path.display()))
        })?;
        Ok(Self {
            train_length,
            table,
            output_path,
            output: Some(output),
            policy: MixPolicy::default(),
            registered: Vec::new(),
        })
    }

    /// Select the partner-selection policy (default [`MixPolicy::Recent`]).
    pub fn with_policy(mut self, policy: MixPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The input table.
    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Path of the output dataset.
    pub fn output_path(&self) -> &std::path::Path {
        &self.output_path
    }

    /// Register a combination of stems to be mixed into a named candidate.
    ///
    /// The candidate name must be unique among registered combinations. If
    /// the input table lacks any required column, or the train can never
    /// hold enough partner events, the combination is kept but flagged
    /// invalid: a warning is raised here, once, and the combination is
    /// skipped during mixing without aborting the run.
    pub fn add_combination(
        &mut self,
        mixed_cdt_name: impl Into<String>,
        stems: Vec<String>,
    ) -> Result<()> {
        let combo = MixCombination::new(mixed_cdt_name, stems)?;
        if self.registered.iter().any(|r| r.combo.name == combo.name) {
            return Err(Error::Validation(format!(
                "combination '{}' is already registered",
                combo.name
            )));
        }

        let missing = combo.missing_columns(&self.table);
        let mut valid = true;
        if !missing.is_empty() {
            tracing::warn!(
                combination = %combo.name,
                missing = ?missing,
                "input table is missing required columns, combination will be skipped"
            );
            valid = false;
        } else if combo.n_partners() > self.train_length {
            tracing::warn!(
                combination = %combo.name,
                partners = combo.n_partners(),
                train_length = self.train_length,
                "train too short to supply distinct partners, combination will be skipped"
            );
            valid = false;
        }

        if valid {
            tracing::info!(
                "will mix {} to form {}",
                combo.stems.join(", "),
                combo.name
            );
        }
        self.registered.push(Registered { combo, valid });
        Ok(())
    }

    /// Run the mixing pass.
    ///
    /// Consumes the input in ascending `(runNumber, eventNumber)` order.
    /// For each record, every valid combination draws its head particle
    /// from the record and its partners from pool events with identities
    /// distinct from the record's and from each other's. One output row is
    /// emitted per record carrying all valid combinations' columns; records
    /// during pool warm-up emit nothing. The record then enters the train,
    /// evicting the oldest entry once `train_length` is reached.
    ///
    /// The output dataset is finalized before returning. A second
    /// invocation is an error.
    pub fn run_mixing(&mut self, options: MixOptions) -> Result<MixReport> {
        let output = self.output.take().ok_or_else(|| {
            Error::Validation("run_mixing may only be invoked once per Mixer".into())
        })?;

        let valid: Vec<&MixCombination> =
            self.registered.iter().filter(|r| r.valid).map(|r| &r.combo).collect();
        if valid.is_empty() {
            return Err(Error::Mixing("no valid mix combinations registered".into()));
        }

        let mut columns: Vec<String> = Vec::new();
        for combo in &valid {
            columns.extend(combo.output_columns());
        }
        let meta: Vec<CombinationMeta> = valid
            .iter()
            .map(|c| CombinationMeta { name: c.name.clone(), stems: c.stems.clone() })
            .collect();
        // Rejects duplicate columns, e.g. two combinations sharing a stem.
        let mut writer = CandidateWriter::create(output, &columns, &meta)?;

        let combos = valid
            .iter()
            .map(|c| self.resolve_combination(c))
            .collect::<Result<Vec<_>>>()?;

        let order = self.table.sorted_index();
        let total = order.len();
        let mut selector = PartnerSelector::new(self.policy);
        let mut train = Train::new(self.train_length);
        let mut visit: Vec<usize> = Vec::new();
        let mut partners: Vec<usize> = Vec::new();
        let mut row: Vec<f64> = Vec::with_capacity(columns.len());
        let mut last_percent: Option<usize> = None;
        let mut warmup_skipped: u64 = 0;

        for (i, &slot) in order.iter().enumerate() {
            if options.progress {
                let percent = (i + 1) * 100 / total;
                if last_percent != Some(percent) {
                    eprint!("\rProcessing entry {}/{} ({percent}%)", i + 1, total);
                    last_percent = Some(percent);
                }
            }

            let run = self.table.run(slot);
            let event = self.table.event(slot);

            row.clear();
            let mut complete = true;
            for combo in &combos {
                selector.visit_order(&train, &mut visit);
                partners.clear();
                let mut eligible = 0usize;
                for &cand in &visit {
                    let crun = self.table.run(cand);
                    let cevent = self.table.event(cand);
                    if crun == run && cevent == event {
                        continue;
                    }
                    eligible += 1;
                    if partners.len() < combo.n_partners()
                        && !partners.iter().any(|&p| {
                            self.table.run(p) == crun && self.table.event(p) == cevent
                        })
                    {
                        partners.push(cand);
                    }
                    if partners.len() == combo.n_partners() && !options.verbose {
                        break;
                    }
                }
                if partners.len() < combo.n_partners() {
                    complete = false;
                    break;
                }

                let head = &combo.stems[0];
                let mut sum =
                    FourMomentum::new(head.px[slot], head.py[slot], head.pz[slot], head.pe[slot]);
                if options.verbose {
                    tracing::debug!(
                        combination = %combo.name,
                        stem = %head.name,
                        row = slot,
                        run,
                        event,
                        eligible,
                        "head particle"
                    );
                }
                for (k, stem) in combo.stems[1..].iter().enumerate() {
                    let p = partners[k];
                    sum += FourMomentum::new(stem.px[p], stem.py[p], stem.pz[p], stem.pe[p]);
                    if options.verbose {
                        tracing::debug!(
                            combination = %combo.name,
                            stem = %stem.name,
                            row = p,
                            run = self.table.run(p),
                            event = self.table.event(p),
                            "partner particle"
                        );
                    }
                }

                row.push(sum.mass());
                row.push(sum.pt());
                row.push(sum.rapidity());
                row.push(head.m[slot]);
                row.push(head.pt[slot]);
                row.push(head.y[slot]);
                for (k, stem) in combo.stems[1..].iter().enumerate() {
                    let p = partners[k];
                    row.push(stem.m[p]);
                    row.push(stem.pt[p]);
                    row.push(stem.y[p]);
                }
            }

            if complete {
                writer.append(&row)?;
            } else {
                warmup_skipped += 1;
            }
            train.push(slot);
            selector.advance();
        }

        if options.progress && total > 0 {
            eprintln!();
        }

        let rows_written = writer.finish()?;
        if rows_written == 0 {
            tracing::warn!("output dataset is empty");
        }

        let skipped_combinations: Vec<String> = self
            .registered
            .iter()
            .filter(|r| !r.valid)
            .map(|r| r.combo.name.clone())
            .collect();

        tracing::info!(entries = total as u64, rows = rows_written, "mixing done");
        Ok(MixReport {
            entries: total as u64,
            rows_written,
            warmup_skipped,
            skipped_combinations,
        })
    }

    fn resolve_combination<'a>(
        &'a self,
        combo: &'a MixCombination,
    ) -> Result<ResolvedCombo<'a>> {
        let stems = combo
            .stems
            .iter()
            .map(|stem| self.resolve_stem(stem))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResolvedCombo { name: &combo.name, stems })
    }

    fn resolve_stem<'a>(&'a self, stem: &'a str) -> Result<ResolvedStem<'a>> {
        let col = |suffix: &str| -> Result<&'a [f64]> {
            let name = format!("{stem}_{suffix}");
            self.table
                .column(&name)
                .ok_or_else(|| Error::Mixing(format!("required column '{name}' is missing")))
        };
        Ok(ResolvedStem {
            name: stem,
            px: col("PX")?,
            py: col("PY")?,
            pz: col("PZ")?,
            pe: col("PE")?,
            m: col("M")?,
            pt: col("PT")?,
            y: col("Y")?,
        })
    }
}

/// A combination with every stem's columns resolved to slices.
struct ResolvedCombo<'a> {
    name: &'a str,
    /// Head first, partners after, mirroring `MixCombination::stems`.
    stems: Vec<ResolvedStem<'a>>,
}

impl ResolvedCombo<'_> {
    fn n_partners(&self) -> usize {
        self.stems.len() - 1
    }
}

struct ResolvedStem<'a> {
    name: &'a str,
    px: &'a [f64],
    py: &'a [f64],
    pz: &'a [f64],
    pe: &'a [f64],
    m: &'a [f64],
    pt: &'a [f64],
    y: &'a [f64],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arrow::array::AsArray;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    const MUON_MASS: f64 = 105.658;

    fn tmp_path(filename: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let mut p = std::env::temp_dir();
        p.push(format!("evmix_mix_{}_{}_{}", std::process::id(), nanos, filename));
        p
    }

    fn muon(px: f64, py: f64, pz: f64) -> FourMomentum {
        let e = (px * px + py * py + pz * pz + MUON_MASS * MUON_MASS).sqrt();
        FourMomentum::new(px, py, pz, e)
    }

    fn stem_columns(stem: &str, vecs: &[FourMomentum]) -> Vec<(String, Vec<f64>)> {
        vec![
            (format!("{stem}_PX"), vecs.iter().map(|v| v.px).collect()),
            (format!("{stem}_PY"), vecs.iter().map(|v| v.py).collect()),
            (format!("{stem}_PZ"), vecs.iter().map(|v| v.pz).collect()),
            (format!("{stem}_PE"), vecs.iter().map(|v| v.e).collect()),
            (format!("{stem}_M"), vecs.iter().map(|v| v.mass()).collect()),
            (format!("{stem}_PT"), vecs.iter().map(|v| v.pt()).collect()),
            (format!("{stem}_Y"), vecs.iter().map(|v| v.rapidity()).collect()),
        ]
    }

    fn plus_vectors(n: usize) -> Vec<FourMomentum> {
        (0..n).map(|i| muon(1000.0 + 10.0 * i as f64, 25.0 * i as f64, 400.0)).collect()
    }

    fn minus_vectors(n: usize) -> Vec<FourMomentum> {
        (0..n).map(|i| muon(-(800.0 + 10.0 * i as f64), 15.0 * i as f64, -300.0)).collect()
    }

    fn dimuon_table(n: usize) -> EventTable {
        let mut cols = stem_columns("muplus", &plus_vectors(n));
        cols.extend(stem_columns("muminus", &minus_vectors(n)));
        EventTable::from_columns(vec![1; n], (0..n as i64).collect(), cols).unwrap()
    }

    fn jpsi_stems() -> Vec<String> {
        vec!["muplus".to_string(), "muminus".to_string()]
    }

    fn read_columns(path: &Path) -> (Vec<String>, HashMap<String, Vec<f64>>) {
        let f = std::fs::File::open(path).unwrap();
        let builder =
            parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(f).unwrap();
        let schema = builder.schema().clone();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let batches: Vec<_> =
            builder.build().unwrap().collect::<std::result::Result<_, _>>().unwrap();
        let mut out: HashMap<String, Vec<f64>> =
            names.iter().map(|n| (n.clone(), Vec::new())).collect();
        for batch in &batches {
            for (i, name) in names.iter().enumerate() {
                let arr = batch.column(i).as_primitive::<arrow::datatypes::Float64Type>();
                out.get_mut(name).unwrap().extend_from_slice(arr.values());
            }
        }
        (names, out)
    }

    #[test]
    fn warmup_and_row_count() {
        let path = tmp_path("rows.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(10), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        let report = mixer.run_mixing(MixOptions::default()).unwrap();

        assert_eq!(report.entries, 10);
        assert_eq!(report.warmup_skipped, 1);
        assert_eq!(report.rows_written, 9);
        assert_eq!(report.entries, report.rows_written + report.warmup_skipped);
        assert!(report.skipped_combinations.is_empty());

        let (names, cols) = read_columns(&path);
        assert_eq!(
            names,
            vec![
                "J_psi_1S_M",
                "J_psi_1S_PT",
                "J_psi_1S_Y",
                "muplus_M",
                "muplus_PT",
                "muplus_Y",
                "muminus_M",
                "muminus_PT",
                "muminus_Y",
            ]
        );
        assert_eq!(cols["J_psi_1S_M"].len(), 9);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn recent_policy_pairs_head_with_newest_pool_event() {
        let path = tmp_path("kine.parquet");
        let n = 3;
        let plus = plus_vectors(n);
        let minus = minus_vectors(n);
        let mut mixer = Mixer::new(2, dimuon_table(n), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        mixer.run_mixing(MixOptions::default()).unwrap();

        let (_, cols) = read_columns(&path);
        // Entry 1 mixes with pool {0}; entry 2 with pool {0, 1}, newest first.
        let expected = [(1usize, 0usize), (2, 1)];
        for (row, (head, partner)) in expected.iter().enumerate() {
            let sum = plus[*head] + minus[*partner];
            assert_relative_eq!(cols["J_psi_1S_M"][row], sum.mass(), max_relative = 1e-12);
            assert_relative_eq!(cols["J_psi_1S_PT"][row], sum.pt(), max_relative = 1e-12);
            assert_relative_eq!(cols["J_psi_1S_Y"][row], sum.rapidity(), max_relative = 1e-12);
            assert_relative_eq!(
                cols["muplus_M"][row],
                plus[*head].mass(),
                max_relative = 1e-12
            );
            assert_relative_eq!(
                cols["muminus_PT"][row],
                minus[*partner].pt(),
                max_relative = 1e-12
            );
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn no_same_event_pairing_with_duplicate_identities() {
        let path = tmp_path("dup_ids.parquet");
        let n = 6;
        let plus = plus_vectors(n);
        let minus = minus_vectors(n);
        let mut cols = stem_columns("muplus", &plus);
        cols.extend(stem_columns("muminus", &minus));
        // Two rows per collision event: identities 0, 0, 1, 1, 2, 2.
        let events: Vec<i64> = vec![0, 0, 1, 1, 2, 2];
        let table = EventTable::from_columns(vec![7; n], events.clone(), cols).unwrap();

        let mut mixer = Mixer::new(4, table, &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        let report = mixer.run_mixing(MixOptions::default()).unwrap();

        // Entries 0 and 1 have no pool event with a different identity.
        assert_eq!(report.warmup_skipped, 2);
        assert_eq!(report.rows_written, 4);

        // Map each output partner back to its source row through the unique
        // muminus_PT values and check it never shares the head's identity.
        let (_, out) = read_columns(&path);
        for (row, head) in (2..n).enumerate() {
            let pt = out["muminus_PT"][row];
            let source = (0..n)
                .find(|&j| (minus[j].pt() - pt).abs() < 1e-9)
                .expect("partner PT should match a source row");
            assert_ne!(
                events[source], events[head],
                "candidate mixed two particles from the same collision event"
            );
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn invalid_combination_is_skipped_and_run_proceeds() {
        let path = tmp_path("skip.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(5), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        mixer
            .add_combination("BadX", vec!["pion".to_string(), "muminus".to_string()])
            .unwrap();
        let report = mixer.run_mixing(MixOptions::default()).unwrap();

        assert_eq!(report.skipped_combinations, vec!["BadX".to_string()]);
        assert_eq!(report.rows_written, 4);

        let (names, _) = read_columns(&path);
        assert!(names.iter().all(|n| !n.starts_with("BadX")));
        assert!(names.contains(&"J_psi_1S_M".to_string()));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn no_valid_combination_is_an_error() {
        let path = tmp_path("novalid.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(3), &path).unwrap();
        mixer
            .add_combination("BadX", vec!["pion".to_string(), "muminus".to_string()])
            .unwrap();
        let err = mixer.run_mixing(MixOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no valid"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn train_length_below_two_is_rejected() {
        let path = tmp_path("short.parquet");
        assert!(Mixer::new(0, dimuon_table(3), &path).is_err());
        assert!(Mixer::new(1, dimuon_table(3), &path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn duplicate_combination_name_is_rejected() {
        let path = tmp_path("dupname.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(3), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        let err = mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap_err();
        assert!(err.to_string().contains("already registered"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn combinations_sharing_a_stem_are_rejected_at_run_start() {
        let path = tmp_path("shared_stem.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(3), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        mixer.add_combination("psi_2S", jpsi_stems()).unwrap();
        let err = mixer.run_mixing(MixOptions::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate output column"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rerunning_is_an_error() {
        let path = tmp_path("rerun.parquet");
        let mut mixer = Mixer::new(4, dimuon_table(5), &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        mixer.run_mixing(MixOptions::default()).unwrap();
        let err = mixer.run_mixing(MixOptions::default()).unwrap_err();
        assert!(err.to_string().contains("once"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn seeded_policy_reruns_identically() {
        let path_a = tmp_path("seed_a.parquet");
        let path_b = tmp_path("seed_b.parquet");
        for path in [&path_a, &path_b] {
            let mut mixer = Mixer::new(5, dimuon_table(12), path)
                .unwrap()
                .with_policy(MixPolicy::Seeded(7));
            mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
            mixer.run_mixing(MixOptions::default()).unwrap();
        }

        let (names_a, cols_a) = read_columns(&path_a);
        let (names_b, cols_b) = read_columns(&path_b);
        assert_eq!(names_a, names_b);
        for name in &names_a {
            assert_eq!(cols_a[name], cols_b[name], "column '{name}' differs between reruns");
        }

        let _ = std::fs::remove_file(&path_a);
        let _ = std::fs::remove_file(&path_b);
    }

    #[test]
    fn train_shorter_than_partner_count_invalidates_combination() {
        let path = tmp_path("too_many_stems.parquet");
        let n = 6;
        let mut cols = stem_columns("muplus", &plus_vectors(n));
        cols.extend(stem_columns("muminus", &minus_vectors(n)));
        cols.extend(stem_columns("kplus", &plus_vectors(n)));
        cols.extend(stem_columns("kminus", &minus_vectors(n)));
        let table =
            EventTable::from_columns(vec![1; n], (0..n as i64).collect(), cols).unwrap();

        let mut mixer = Mixer::new(2, table, &path).unwrap();
        mixer
            .add_combination(
                "X_3872",
                vec![
                    "muplus".to_string(),
                    "muminus".to_string(),
                    "kplus".to_string(),
                    "kminus".to_string(),
                ],
            )
            .unwrap();
        let err = mixer.run_mixing(MixOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no valid"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn single_stem_combination_emits_every_record() {
        let path = tmp_path("single_stem.parquet");
        let mut mixer = Mixer::new(3, dimuon_table(5), &path).unwrap();
        mixer.add_combination("mu_ref", vec!["muplus".to_string()]).unwrap();
        let report = mixer.run_mixing(MixOptions::default()).unwrap();

        assert_eq!(report.rows_written, 5);
        assert_eq!(report.warmup_skipped, 0);

        let (names, cols) = read_columns(&path);
        assert_eq!(
            names,
            vec!["mu_ref_M", "mu_ref_PT", "mu_ref_Y", "muplus_M", "muplus_PT", "muplus_Y"]
        );
        let plus = plus_vectors(5);
        for (row, v) in plus.iter().enumerate() {
            assert_relative_eq!(cols["mu_ref_M"][row], v.mass(), max_relative = 1e-12);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unsorted_input_is_processed_in_identity_order() {
        let path = tmp_path("unsorted.parquet");
        let n = 4;
        let plus = plus_vectors(n);
        let minus = minus_vectors(n);
        let mut cols = stem_columns("muplus", &plus);
        cols.extend(stem_columns("muminus", &minus));
        // Storage order 3, 1, 0, 2 by event number.
        let table = EventTable::from_columns(vec![1; n], vec![3, 1, 0, 2], cols).unwrap();

        let mut mixer = Mixer::new(3, table, &path).unwrap();
        mixer.add_combination("J_psi_1S", jpsi_stems()).unwrap();
        mixer.run_mixing(MixOptions::default()).unwrap();

        let (_, out) = read_columns(&path);
        // Sorted order visits storage rows 2, 1, 3, 0; the first emitted row
        // pairs head row 1 (event 1) with pool row 2 (event 0).
        let sum = plus[1] + minus[2];
        assert_relative_eq!(out["J_psi_1S_M"][0], sum.mass(), max_relative = 1e-12);

        let _ = std::fs::remove_file(&path);
    }
}
