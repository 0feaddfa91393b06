use crate::{fetch::ByteBuffer, Error, Logger, Outcome, Table};

/// The delimiter and quoting conventions of the CSV. A header row is always expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Dialect {
    fn reader<R: std::io::Read>(&self, reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(true)
            .from_reader(reader)
    }
}

fn to_error(error: csv::Error) -> Error {
    let at = error
        .position()
        .map(|p| format!(" (line {})", p.line()))
        .unwrap_or_default();
    match error.kind() {
        csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. } => {
            Error::Parse(format!("{error}{at}"))
        }
        _ => Error::Unexpected(format!("Failed to read CSV: {error}")),
    }
}

/// Parses `buffer` as CSV with a header row into a [`Table`].
/// The buffer is rewound first, so loading the same buffer twice yields the same [`Table`].
/// # Error
/// * [`Error::EmptyData`] if there is no header at all, or only blank header names and no rows
/// * [`Error::Parse`] on ragged rows or invalid UTF-8
pub fn load(buffer: &mut ByteBuffer, dialect: &Dialect) -> Result<Table, Error> {
    buffer.set_position(0);
    let mut rdr = dialect.reader(buffer);

    let names = rdr
        .headers()
        .map_err(to_error)?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    if names.is_empty() {
        return Err(Error::EmptyData("no columns to parse".to_string()));
    }

    let records = rdr
        .records()
        .map(|r| {
            r.map(|record| record.iter().map(|f| f.to_string()).collect::<Vec<_>>())
                .map_err(to_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let blank = |name: &String| name.trim().is_empty();
    if records.is_empty() && names.iter().all(blank) {
        return Err(Error::EmptyData("no columns to parse".to_string()));
    }

    // blank header names get positional names: `,\n1,2` has columns `Unnamed: 0` and `Unnamed: 1`
    let names = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| if blank(&name) { format!("Unnamed: {i}") } else { name })
        .collect();

    Ok(Table::infer(names, records))
}

/// Loads `buffer` if there is one.
/// A missing buffer (the fetch produced nothing) is logged and reported as an empty [`Outcome`].
pub fn load_maybe(
    buffer: Option<ByteBuffer>,
    dialect: &Dialect,
    logger: &Logger<'_>,
) -> Result<Outcome, Error> {
    let Some(mut buffer) = buffer else {
        logger.warn(format_args!("No data stream returned from fetcher"));
        return Ok(Outcome::Empty(Table::default()));
    };
    logger.debug(format_args!(
        "Data stream successfully retrieved, loading into table."
    ));
    crate::resolve(load(&mut buffer, dialect), logger)
}

/// Writes `table` as CSV with a header row using `dialect`.
/// Reading the result back with [`load`] yields an equal [`Table`].
pub fn serialize(table: &Table, dialect: &Dialect) -> Vec<u8> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .from_writer(vec![]);
    // writing to a Vec<u8> never fails
    let _ = wtr.write_record(table.column_names());
    for row in table.rows() {
        let _ = wtr.write_record(row.iter().map(|v| v.to_field()));
    }
    wtr.into_inner().unwrap_or_default()
}
