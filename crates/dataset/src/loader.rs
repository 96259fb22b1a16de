use crate::table::{Dataset, RowError};
use crate::error::DatasetError;
use core_types::{coerce_decimal, parse_year, CoreError, FundamentalsRecord, Measure, Quarter};
use csv::{ByteRecord, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const SYMBOL: &str = "SYMBOL";
const SECTOR: &str = "Sector";
const YEAR: &str = "Year";
const QUARTER: &str = "Quarter";

/// Loads the fundamentals sheet from a CSV export on disk.
///
/// The load is all-or-nothing: an unreadable file, a missing identity column
/// or broken CSV structure fails the whole load. Rows whose identity cells
/// cannot be parsed are skipped and reported through `Dataset::row_errors`.
pub fn load_csv(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_csv(file)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        skipped = dataset.row_errors().len(),
        "Loaded fundamentals dataset."
    );
    Ok(dataset)
}

/// Reads a fundamentals CSV from any reader. See [`load_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = decode(reader.byte_headers()?);
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.byte_records().enumerate() {
        let raw = result?;
        // Fallback +2: one for the header row, one because CSV lines are 1-based.
        let line = raw
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let row = decode(&raw);
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        match columns.parse_row(&row) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(line, error = %e, "Skipping fundamentals row.");
                row_errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(Dataset::with_row_errors(records, row_errors))
}

/// Decodes a raw row cell by cell. Bytes that are not UTF-8, such as the
/// cp1252 non-breaking space Excel writes, become U+FFFD instead of failing
/// the load.
fn decode(raw: &ByteRecord) -> StringRecord {
    raw.iter().map(String::from_utf8_lossy).collect()
}

/// Lower-cases a header and drops spaces, dashes and underscores, so that
/// `BOOK VALUE`, `book_value` and `Book-Value` all resolve to one column.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column positions resolved from the header row.
struct Columns {
    symbol: usize,
    sector: usize,
    year: usize,
    quarter: usize,
    measures: Vec<(Measure, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            // The first of any duplicated header wins.
            index.entry(normalize_header(header)).or_insert(position);
        }
        let find = |name: &str| index.get(&normalize_header(name)).copied();
        let required = |name: &'static str| find(name).ok_or(DatasetError::MissingColumn(name));

        let measures = Measure::ALL
            .iter()
            .filter_map(|&measure| {
                let position = find(measure.column());
                if position.is_none() {
                    debug!(column = measure.column(), "Measure column absent; values will be missing.");
                }
                position.map(|p| (measure, p))
            })
            .collect();

        Ok(Self {
            symbol: required(SYMBOL)?,
            sector: required(SECTOR)?,
            year: required(YEAR)?,
            quarter: required(QUARTER)?,
            measures,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<FundamentalsRecord, CoreError> {
        let cell = |position: usize| row.get(position).unwrap_or("");
        // Undecodable bytes would otherwise end up inside a symbol or sector name.
        let identity = |position: usize, name: &str| {
            let value = cell(position);
            if value.contains(char::REPLACEMENT_CHARACTER) {
                Err(CoreError::InvalidInput(name.to_string(), value.to_string()))
            } else {
                Ok(value)
            }
        };

        let symbol = identity(self.symbol, "symbol")?;
        if symbol.is_empty() {
            return Err(CoreError::MissingValue("symbol".to_string()));
        }
        let sector = identity(self.sector, "sector")?;
        let year = parse_year(cell(self.year))?;
        let quarter: Quarter = identity(self.quarter, "quarter")?.parse()?;

        let mut record = FundamentalsRecord::new(symbol, sector, year, quarter);
        for &(measure, position) in &self.measures {
            record.set(measure, coerce_decimal(cell(position)));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SHEET: &str = "\
SYMBOL,Sector,Year,Quarter,Price,BOOK VALUE,EPS,Dps,PE,ROE,NPL,PAID-UP,NET PROFIT,Public Shares,RESERVE,Bonus,Cash
AAA,Bank,2023,1,100,50,12,5,8.3,14,1.2,1500,250,600,900,10,5
BBB,Bank,2023,1,80,40,-,0,#N/A,9,2.5,1200,,400,300,,
";

    #[test]
    fn parses_every_column_of_the_sheet() {
        let dataset = read_csv(SHEET.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.row_errors().is_empty());

        let aaa = &dataset.records()[0];
        assert_eq!(aaa.symbol, "AAA");
        assert_eq!(aaa.sector, "Bank");
        assert_eq!(aaa.year, 2023);
        assert_eq!(aaa.quarter, Quarter::Number(1));
        assert_eq!(aaa.price, Some(dec!(100)));
        assert_eq!(aaa.book_value, Some(dec!(50)));
        assert_eq!(aaa.pe, Some(dec!(8.3)));
        assert_eq!(aaa.paid_up_capital, Some(dec!(1500)));
        assert_eq!(aaa.net_profit, Some(dec!(250)));
        assert_eq!(aaa.public_shares, Some(dec!(600)));
        assert_eq!(aaa.cash, Some(dec!(5)));
    }

    #[test]
    fn non_numeric_cells_become_missing() {
        let dataset = read_csv(SHEET.as_bytes()).unwrap();
        let bbb = &dataset.records()[1];
        assert_eq!(bbb.eps, None);
        assert_eq!(bbb.dps, Some(dec!(0)));
        assert_eq!(bbb.pe, None);
        assert_eq!(bbb.net_profit, None);
        assert_eq!(bbb.bonus, None);
    }

    #[test]
    fn headers_match_loosely_and_optional_measures_may_be_absent() {
        let csv = "symbol,SECTOR,year,quarter,book_value,paid up\nCCC,Hydro,2022,Q4,120,900\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        let ccc = &dataset.records()[0];
        assert_eq!(ccc.quarter, Quarter::Label("Q4".to_string()));
        assert_eq!(ccc.book_value, Some(dec!(120)));
        assert_eq!(ccc.paid_up_capital, Some(dec!(900)));
        assert_eq!(ccc.price, None);
    }

    #[test]
    fn missing_identity_column_fails_the_load() {
        let csv = "SYMBOL,Sector,Quarter,Price\nAAA,Bank,1,100\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Year")));
    }

    #[test]
    fn rows_with_broken_identity_are_skipped_and_reported() {
        let csv = "\
SYMBOL,Sector,Year,Quarter,Price
AAA,Bank,2023,1,100
,Bank,2023,1,90
BBB,Bank,FY23,1,80
CCC,Bank,2023,,70

DDD,Bank,2023.0,2,60
";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        let symbols: Vec<_> = dataset.records().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "DDD"]);

        let lines: Vec<_> = dataset.row_errors().iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let csv = "SYMBOL,Sector,Year,Quarter,Price,EPS\nAAA,Bank,2023,1\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].price, None);
    }

    #[test]
    fn non_utf8_bytes_do_not_fail_the_load() {
        let mut csv = b"SYMBOL,Sector,Year,Quarter,Price\nAAA,Bank,2023,1,100\n".to_vec();
        // cp1252 non-breaking space inside a price, a year and a sector.
        csv.extend_from_slice(b"BBB,Bank,2023,1,1\xA0500\n");
        csv.extend_from_slice(b"CCC,Bank,20\xA023,1,90\n");
        csv.extend_from_slice(b"DDD,Bank\xA0,2023,1,80\n");

        let dataset = read_csv(csv.as_slice()).unwrap();
        let symbols: Vec<_> = dataset.records().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
        assert_eq!(dataset.records()[1].price, None);

        let lines: Vec<_> = dataset.row_errors().iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHEET.as_bytes()).unwrap();

        let dataset = load_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let err = load_csv(Path::new("/nonexistent/Fundamentals.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }
}
