// ============================================================
// Layer 6 — Batch Report
// ============================================================
// Records per-batch padding statistics to a CSV file after a
// build, one row per mini-batch.
//
// Why log this?
//   Per-batch padding is the cost of bucketing by batch. A high
//   padding ratio means short and long sequences were mixed in
//   one batch and most of the compute goes into zeros.
//
// Output file: {mini_batch_location}/batch_report.csv
//
// Example CSV output:
//   split,batch,max_seq_len,active_steps,padded_steps,padding_ratio
//   train,0,412,1398,250,0.151699
//   train,1,377,1290,218,0.144562
//
// Rows are appended, so the file accumulates across builds.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{batch::MiniBatch, split::Split};

/// Padding statistics of one mini-batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub split:        Split,
    pub batch:        usize,
    pub max_seq_len:  usize,
    /// Timesteps marked valid in the mask
    pub active_steps: usize,
    /// Timesteps that exist only as padding
    pub padded_steps: usize,
}

impl BatchStats {
    /// Compute stats for every batch of a split, in build order.
    pub fn collect(split: Split, batches: &[MiniBatch]) -> Vec<Self> {
        batches
            .iter()
            .enumerate()
            .map(|(batch, b)| Self {
                split,
                batch,
                max_seq_len:  b.max_seq_len(),
                active_steps: b.active_timesteps(),
                padded_steps: b.padded_timesteps(),
            })
            .collect()
    }

    /// Fraction of timesteps that are padding. 0.0 for an empty batch.
    pub fn padding_ratio(&self) -> f64 {
        let total = self.active_steps + self.padded_steps;
        if total == 0 {
            0.0
        } else {
            self.padded_steps as f64 / total as f64
        }
    }
}

/// Appends batch statistics to a CSV file.
pub struct BatchReport {
    csv_path: PathBuf,
}

impl BatchReport {
    /// Create a report in `dir`, writing the header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("batch_report.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "split,batch,max_seq_len,active_steps,padded_steps,padding_ratio")?;
            tracing::debug!("Created batch report: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, rows: &[BatchStats]) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        for r in rows {
            writeln!(
                f,
                "{},{},{},{},{},{:.6}",
                r.split,
                r.batch,
                r.max_seq_len,
                r.active_steps,
                r.padded_steps,
                r.padding_ratio(),
            )?;
        }

        tracing::debug!("Logged {} batch rows to '{}'", rows.len(), self.csv_path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::{FloatPrecision, PaddedArray};
    use tempfile::TempDir;

    fn batches() -> Vec<MiniBatch> {
        // 4 timesteps × 2 slots, 5 of 8 active
        let mut m = PaddedArray::zeros(&[4, 2, 1]);
        for t in 0..4 {
            m.row_mut(&[t, 0])[0] = 1.0;
        }
        m.row_mut(&[0, 1])[0] = 1.0;

        vec![MiniBatch {
            input:  PaddedArray::zeros(&[4, 2, 3]).cast(FloatPrecision::F32),
            target: PaddedArray::zeros(&[4, 2, 1]).cast(FloatPrecision::F32),
            mask:   m.cast(FloatPrecision::F32),
        }]
    }

    #[test]
    fn test_collect_counts_padding() {
        let stats = BatchStats::collect(Split::Train, &batches());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].max_seq_len, 4);
        assert_eq!(stats[0].active_steps, 5);
        assert_eq!(stats[0].padded_steps, 3);
        assert!((stats[0].padding_ratio() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir    = TempDir::new().unwrap();
        let stats  = BatchStats::collect(Split::Valid, &batches());

        BatchReport::new(dir.path()).unwrap().log(&stats).unwrap();
        let report = BatchReport::new(dir.path()).unwrap();
        report.log(&stats).unwrap();

        let text  = fs::read_to_string(report.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("split,batch"));
        assert_eq!(lines[1], "valid,0,4,5,3,0.375000");
    }
}
