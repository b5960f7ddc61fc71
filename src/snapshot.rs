//! Historical snapshots - one gzip-compressed CSV per calendar day
//!
//! Columns: `DESTINO`, the product columns present in the set (canonical
//! order), `Terminal`. A product a terminal does not offer is an empty field.
//! Writing the same day twice replaces that day's file.

use crate::error::{FuelPlanError, FuelPlanResult};
use crate::types::{AggregateSet, DataRow, DataTable, Product, Terminal};
use chrono::{Local, NaiveDate};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const DESTINATION_HEADER: &str = "DESTINO";
const TERMINAL_HEADER: &str = "Terminal";

/// File name for a given day, e.g. `historico_17.10.2026.csv.gz`
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("historico_{}.csv.gz", date.format("%d.%m.%Y"))
}

/// Writes daily snapshots into one directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(snapshot_file_name(date))
    }

    /// Write the snapshot for today's local date
    pub fn write_today(&self, set: &AggregateSet) -> FuelPlanResult<PathBuf> {
        self.write(set, Local::now().date_naive())
    }

    /// Write the snapshot for `date`, replacing any earlier file of that day
    pub fn write(&self, set: &AggregateSet, date: NaiveDate) -> FuelPlanResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        let partial = path.with_extension("gz.partial");

        let written = File::create(&partial)
            .map_err(FuelPlanError::from)
            .and_then(|file| {
                let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
                write_snapshot(set, &mut encoder)?;
                encoder.finish()?.flush()?;
                fs::rename(&partial, &path)?;
                Ok(())
            });
        if let Err(e) = written {
            // Never leave a half-written file next to the real snapshots
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        info!(path = %path.display(), rows = set.row_count(), "snapshot written");
        Ok(path)
    }
}

/// Write the uncompressed CSV form of `set`
pub fn write_snapshot<W: Write>(set: &AggregateSet, writer: W) -> FuelPlanResult<()> {
    let products = set.present_products();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![DESTINATION_HEADER];
    header.extend(products.iter().map(Product::label));
    header.push(TERMINAL_HEADER);
    csv_writer.write_record(&header)?;

    for row in set.rows() {
        let mut record = Vec::with_capacity(products.len() + 2);
        record.push(row.destination.clone());
        for product in &products {
            // `{}` on f64 is the shortest text that parses back to the same value
            record.push(
                row.quantities
                    .get(product)
                    .map(|q| q.to_string())
                    .unwrap_or_default(),
            );
        }
        record.push(row.terminal.sheet_name().to_string());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Read a compressed snapshot file back into an aggregate set
pub fn read_snapshot(path: &Path) -> FuelPlanResult<AggregateSet> {
    let file = File::open(path)?;
    read_snapshot_from(GzDecoder::new(BufReader::new(file)))
}

/// Read the uncompressed CSV form of a snapshot
pub fn read_snapshot_from<R: Read>(reader: R) -> FuelPlanResult<AggregateSet> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FuelPlanError::Snapshot(format!("missing column '{}'", name)))
    };
    let destination_col = column(DESTINATION_HEADER)?;
    let terminal_col = column(TERMINAL_HEADER)?;
    let product_cols: Vec<(Product, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| Product::from_label(h).map(|p| (p, idx)))
        .collect();

    let mut tables: BTreeMap<Terminal, DataTable> = BTreeMap::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let terminal = Terminal::from_sheet_name(field(terminal_col)).ok_or_else(|| {
            FuelPlanError::Snapshot(format!(
                "line {}: unknown terminal '{}'",
                line + 2,
                field(terminal_col)
            ))
        })?;

        let mut row = DataRow::new(field(destination_col), terminal);
        for (product, idx) in &product_cols {
            let raw = field(*idx);
            if raw.is_empty() {
                continue;
            }
            let quantity = raw.parse::<f64>().map_err(|_| {
                FuelPlanError::Snapshot(format!(
                    "line {}: invalid {} quantity '{}'",
                    line + 2,
                    product,
                    raw
                ))
            })?;
            row.quantities.insert(*product, quantity);
        }

        let table = tables
            .entry(terminal)
            .or_insert_with(|| DataTable::new(terminal, []));
        table.products.extend(row.quantities.keys().copied());
        table.rows.push(row);
    }

    Ok(AggregateSet::new(tables.into_values()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn sample_set() -> AggregateSet {
        let mut guaymas = DataTable::new(Terminal::Guaymas, [Product::Regular, Product::Diesel]);
        guaymas.rows.push(
            DataRow::new("Hermosillo", Terminal::Guaymas)
                .with_quantity(Product::Regular, 120.0)
                .with_quantity(Product::Diesel, 0.1),
        );
        guaymas.rows.push(
            DataRow::new("Obregon, Son.", Terminal::Guaymas)
                .with_quantity(Product::Regular, 35.75)
                .with_quantity(Product::Diesel, 0.0),
        );
        let mut castillo = DataTable::new(Terminal::ElCastillo, [Product::Premium]);
        castillo.rows.push(
            DataRow::new("Guadalajara", Terminal::ElCastillo).with_quantity(Product::Premium, 1e6 / 3.0),
        );
        AggregateSet::new([guaymas, castillo])
    }

    fn tuples(set: &AggregateSet) -> BTreeSet<(String, Terminal, Product, u64)> {
        set.rows()
            .flat_map(|row| {
                row.quantities
                    .iter()
                    .map(|(p, q)| (row.destination.clone(), row.terminal, *p, q.to_bits()))
            })
            .collect()
    }

    #[test]
    fn test_file_name_uses_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(snapshot_file_name(date), "historico_07.03.2026.csv.gz");
    }

    #[test]
    fn test_csv_layout() {
        let mut buffer = Vec::new();
        write_snapshot(&sample_set(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "DESTINO,REGULAR,PREMIUM,DIESEL,Terminal");
        assert_eq!(lines[1], "Hermosillo,120,,0.1,Guaymas");
        assert_eq!(lines[2], "\"Obregon, Son.\",35.75,,0,Guaymas");
        assert!(lines[3].starts_with("Guadalajara,,333333.33"));
        assert!(lines[3].ends_with(",,El Castillo"));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("historico"));
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let set = sample_set();

        let path = writer.write(&set, date).unwrap();
        assert_eq!(path.file_name().unwrap(), "historico_17.10.2026.csv.gz");

        let restored = read_snapshot(&path).unwrap();
        assert_eq!(tuples(&restored), tuples(&set));
        assert!(restored.get(Terminal::ElCastillo).unwrap().offers(Product::Premium));
        assert!(!restored.get(Terminal::ElCastillo).unwrap().offers(Product::Regular));
    }

    #[test]
    fn test_same_day_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();

        writer.write(&sample_set(), date).unwrap();
        let smaller = AggregateSet::new([sample_set().get(Terminal::Guaymas).unwrap().clone()]);
        let path = writer.write(&smaller, date).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(read_snapshot(&path).unwrap().row_count(), 2);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 4, 9).unwrap();
        // A directory in place of the day's file makes the final rename fail
        fs::create_dir(writer.path_for(date)).unwrap();

        assert!(writer.write(&sample_set(), date).is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["historico_09.04.2026.csv.gz".to_string()]);
    }

    #[test]
    fn test_read_rejects_unknown_terminal() {
        let csv = "DESTINO,REGULAR,Terminal\nTijuana,5,Ensenada\n";
        let result = read_snapshot_from(csv.as_bytes());
        assert!(matches!(result, Err(FuelPlanError::Snapshot(_))));
    }

    #[test]
    fn test_read_requires_destination_column() {
        let csv = "REGULAR,Terminal\n5,Guaymas\n";
        let err = read_snapshot_from(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("DESTINO"));
    }
}
