//! CSV reading and writing.
//!
//! The first record is the header. Each field is typed on its own:
//!
//! | Field                       | Value          |
//! |-----------------------------|----------------|
//! | empty, `\N`                 | `Value::Null`  |
//! | plain integer               | `Value::Int`   |
//! | plain decimal or exponent   | `Value::Float` |
//! | anything else               | `Value::Str`   |
//!
//! A plain number has no leading `+` and no leading zeros, so text such as the
//! gap-to-winner `+5.478` in `results.csv` or a code like `007` stays a string
//! and is written back unchanged.
//!
//! `\N` is the missing-value marker used throughout the Ergast F1 dumps.

use std::{io, path::Path};

use crate::{Table, TableError, Value};

/// Marker for a missing field in the source data.
pub const MISSING_MARKER: &str = "\\N";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CsvError {
    #[display("CSV error: {source}")]
    Csv { source: csv::Error },
    #[display("I/O error: {source}")]
    Io { source: io::Error },
    #[display("{source}")]
    Table { source: TableError },
}

/// Types a single CSV field.
///
/// # Examples
///
/// ```
/// use pitwall_frame::{Value, csv_io::parse_field};
///
/// assert_eq!(parse_field("57"), Value::Int(57));
/// assert_eq!(parse_field("21.5"), Value::Float(21.5));
/// assert_eq!(parse_field("\\N"), Value::Null);
/// assert_eq!(parse_field("1:38.109"), Value::from("1:38.109"));
/// assert_eq!(parse_field("+5.478"), Value::from("+5.478"));
/// ```
#[must_use]
pub fn parse_field(field: &str) -> Value {
    let field = field.trim();
    if field.is_empty() || field == MISSING_MARKER {
        return Value::Null;
    }
    if !is_plain_number(field) {
        return Value::Str(field.to_owned());
    }
    if let Ok(i) = field.parse::<i64>() {
        if i.to_string() == field {
            return Value::Int(i);
        }
    } else if let Ok(f) = field.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(field.to_owned())
}

/// Optional `-`, then an integer part that is `0` or does not start with `0`.
///
/// Rejects `+1`, `007`, `.5`, `nan` and `inf`.
fn is_plain_number(field: &str) -> bool {
    let unsigned = field.strip_prefix('-').unwrap_or(field);
    let int_part = unsigned.split(['.', 'e', 'E']).next().unwrap_or_default();
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && (int_part == "0" || !int_part.starts_with('0'))
}

pub fn read_csv<R>(reader: R) -> Result<Table, CsvError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut table = Table::new(reader.headers()?.iter().map(str::trim))?;
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(parse_field).collect())?;
    }
    Ok(table)
}

pub fn read_csv_path<P>(path: P) -> Result<Table, CsvError>
where
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path)?;
    read_csv(io::BufReader::new(file))
}

pub fn write_csv<W>(table: &Table, writer: W) -> Result<(), CsvError>
where
    W: io::Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIT_STOPS: &str = "\
raceId,driverId,stop,lap,time,duration,milliseconds
841,153,1,1,17:05:23,26.898,26898
841,30,1,1,17:05:52,25.021,25021
841,17,1,11,17:20:48,23.426,\\N
";

    #[test]
    fn test_read_types_fields() {
        let table = read_csv(PIT_STOPS.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns()[0], "raceId");
        assert_eq!(table.get(0, "driverId").unwrap(), Some(&Value::Int(153)));
        assert_eq!(table.get(1, "duration").unwrap(), Some(&Value::Float(25.021)));
        assert_eq!(table.get(2, "time").unwrap(), Some(&Value::from("17:20:48")));
        assert_eq!(table.get(2, "milliseconds").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let data = "a,b\n1,2\n3\n";
        assert!(matches!(read_csv(data.as_bytes()), Err(CsvError::Csv { .. })));
    }

    #[test]
    fn test_names_are_not_floats() {
        assert_eq!(parse_field("NaN"), Value::from("NaN"));
        assert_eq!(parse_field("inf"), Value::from("inf"));
    }

    #[test]
    fn test_signed_and_padded_text_stays_text() {
        assert_eq!(parse_field("+5.478"), Value::from("+5.478"));
        assert_eq!(parse_field("007"), Value::from("007"));
        assert_eq!(parse_field("-0"), Value::from("-0"));
        assert_eq!(parse_field(".5"), Value::from(".5"));
        assert_eq!(parse_field("0.5"), Value::Float(0.5));
        assert_eq!(parse_field("-12"), Value::Int(-12));
        assert_eq!(parse_field("1e3"), Value::Float(1000.0));
    }

    #[test]
    fn test_results_time_survives_round_trip() {
        let data = "\
resultId,raceId,positionOrder,time,code
1,18,1,1:34:50.616,HAM
2,18,2,+5.478,007
3,18,3,\\N,010
";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.get(1, "time").unwrap(), Some(&Value::from("+5.478")));
        assert_eq!(table.get(1, "code").unwrap(), Some(&Value::from("007")));

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "resultId,raceId,positionOrder,time,code\n\
             1,18,1,1:34:50.616,HAM\n\
             2,18,2,+5.478,007\n\
             3,18,3,,010\n"
        );
    }

    #[test]
    fn test_write_then_read() {
        let table = read_csv(PIT_STOPS.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("raceId,driverId,stop,lap,time,duration,milliseconds\n"));
        assert!(text.contains("841,17,1,11,17:20:48,23.426,\n"));
        assert_eq!(read_csv(text.as_bytes()).unwrap(), table);
    }
}
