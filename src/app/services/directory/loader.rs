//! Directory loading from the postal CSV dataset
//!
//! This module streams the source file row by row, applies the admission
//! rules, and populates the index mappings. Rows that fail admission are
//! expected volume (non-delivery offices, offices that were never
//! geocoded) and are counted rather than reported as errors.

use super::DirectoryIndex;
use super::metadata::LoadStats;
use crate::app::models::{DeliveryStatus, RawRecord};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Rows between progress-bar updates while streaming the dataset
const PROGRESS_TICK_ROWS: usize = 10_000;

impl DirectoryIndex {
    /// Load the directory index from the postal CSV dataset
    ///
    /// Streams the file without buffering it, admitting only delivery
    /// offices with parseable coordinates. A missing file or a read error
    /// mid-stream is fatal: the index never becomes ready.
    ///
    /// # Arguments
    /// * `csv_path` - Path to the postal directory CSV file
    /// * `show_progress` - Whether to display a progress spinner
    ///
    /// # Returns
    /// * `Result<(DirectoryIndex, LoadStats)>` - Index and loading statistics
    ///
    /// # Errors
    /// * Returns `Error::SourceUnavailable` if the dataset file is missing
    /// * Returns `Error::CsvParsing` for read failures while streaming
    pub async fn load(csv_path: &Path, show_progress: bool) -> Result<(Self, LoadStats)> {
        info!("Loading postal directory from: {}", csv_path.display());

        if !csv_path.is_file() {
            return Err(Error::source_unavailable(csv_path.display().to_string()));
        }

        let start_time = Instant::now();
        let mut index = Self::new(csv_path.to_path_buf());
        let mut stats = LoadStats::new();

        let mut reader = csv::Reader::from_path(csv_path).map_err(|e| {
            Error::csv_parsing(
                csv_path.display().to_string(),
                "Failed to open CSV file",
                Some(e),
            )
        })?;

        let progress_bar = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            pb.set_message("Loading postal directory...");
            Some(pb)
        } else {
            None
        };

        for row in reader.deserialize::<RawRecord>() {
            let raw = row.map_err(|e| {
                Error::csv_parsing(
                    csv_path.display().to_string(),
                    "Failed to read CSV record",
                    Some(e),
                )
            })?;
            stats.rows_read += 1;

            match raw.admit() {
                Some(record) => {
                    index.insert(record);
                    stats.records_admitted += 1;
                }
                None => {
                    if DeliveryStatus::from_flag(&raw.delivery).is_delivery() {
                        stats.skipped_missing_coords += 1;
                    } else {
                        stats.skipped_non_delivery += 1;
                    }
                }
            }

            if stats.rows_read % PROGRESS_TICK_ROWS == 0 {
                if let Some(pb) = &progress_bar {
                    pb.set_message(format!(
                        "Loading postal directory... {} rows scanned, {} admitted",
                        stats.rows_read, stats.records_admitted
                    ));
                    pb.tick();
                }
                debug!(
                    "Scanned {} rows, admitted {} records",
                    stats.rows_read, stats.records_admitted
                );
            }
        }

        stats.load_duration = start_time.elapsed();

        if let Some(pb) = &progress_bar {
            pb.finish_with_message(format!(
                "Postal directory loaded: {} records from {} rows",
                stats.records_admitted, stats.rows_read
            ));
        }

        info!("{}", stats.summary());

        Ok((index, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "circlename,regionname,divisionname,officename,pincode,officetype,delivery,district,statename,latitude,longitude";

    fn write_dataset(dir: &TempDir, rows: &[&str]) -> PathBuf {
        let path = dir.path().join("pincode_directory.csv");
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_admits_only_delivery_offices_with_coordinates() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(
            &temp_dir,
            &[
                "Telangana Circle,Hyderabad Region,Adilabad Division,Kothimir B.O,504273,BO,Delivery,Kumuram Bheem Asifabad,TELANGANA,19.1741,79.2861",
                "Telangana Circle,Hyderabad Region,Adilabad Division,Adilabad H.O,504001,HO,Non-Delivery,Adilabad,TELANGANA,19.6640,78.5320",
                "Telangana Circle,Hyderabad Region,Adilabad Division,Mandamarri S.O,504231,SO,Delivery,Mancherial,TELANGANA,NA,NA",
                "Telangana Circle,Hyderabad Region,Adilabad Division,Asifabad S.O,504293,SO,Delivery,Kumuram Bheem Asifabad,TELANGANA,19.3583,79.2811",
            ],
        );

        let (index, stats) = DirectoryIndex::load(&path, false).await.unwrap();

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.records_admitted, 2);
        assert_eq!(stats.skipped_non_delivery, 1);
        assert_eq!(stats.skipped_missing_coords, 1);
        assert_eq!(stats.rows_skipped(), 2);

        assert_eq!(index.record_count(), 2);
        assert_eq!(index.by_pincode("504273").len(), 1);
        assert_eq!(index.by_pincode("504001").len(), 0);
        assert_eq!(index.by_pincode("504231").len(), 0);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_source_unavailable() {
        let result = DirectoryIndex::load(Path::new("/nonexistent/directory.csv"), false).await;

        match result {
            Err(Error::SourceUnavailable { path }) => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("Expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_preserves_source_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(
            &temp_dir,
            &[
                "C,R,D,Office Two,110001,SO,Delivery,New Delhi,DELHI,28.63,77.21",
                "C,R,D,Office One,110001,BO,Delivery,New Delhi,DELHI,28.64,77.22",
            ],
        );

        let (index, _stats) = DirectoryIndex::load(&path, false).await.unwrap();
        let offices = index.by_pincode("110001");

        assert_eq!(offices.len(), 2);
        assert_eq!(offices[0].office_name, "Office Two");
        assert_eq!(offices[1].office_name, "Office One");
    }

    #[tokio::test]
    async fn test_load_defaults_missing_text_fields() {
        let temp_dir = TempDir::new().unwrap();
        // No circle/region/division columns at all
        let path = temp_dir.path().join("sparse.csv");
        fs::write(
            &path,
            "officename,pincode,delivery,district,statename,latitude,longitude\n\
             Lonely B.O,500001,Delivery,Hyderabad,TELANGANA,17.38,78.48\n",
        )
        .unwrap();

        let (index, stats) = DirectoryIndex::load(&path, false).await.unwrap();

        assert_eq!(stats.records_admitted, 1);
        let record = index.by_pincode("500001")[0];
        assert_eq!(record.circle, "");
        assert_eq!(record.office_type, "");
        assert_eq!(record.office_name, "Lonely B.O");
    }
}
