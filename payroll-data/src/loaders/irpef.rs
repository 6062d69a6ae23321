use std::collections::BTreeMap;
use std::io::Read;

use payroll_core::calculations::brackets::{self, BracketSpan};
use payroll_core::{NewIrpefBracket, PayrollRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{LoaderError, de_optional_decimal, de_rate, detect_delimiter};

/// A single row of an IRPEF brackets CSV.
///
/// Columns: `year`, `min_income`, `max_income` (empty for the unbounded
/// top bracket), `rate` (percent, `%` suffix and decimal comma allowed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IrpefBracketRecord {
    pub year: i32,
    pub min_income: Decimal,
    #[serde(deserialize_with = "de_optional_decimal")]
    pub max_income: Option<Decimal>,
    #[serde(deserialize_with = "de_rate")]
    pub rate: Decimal,
}

/// Loader for IRPEF bracket CSV files.
pub struct IrpefBracketLoader;

impl IrpefBracketLoader {
    pub fn parse<R: Read>(mut reader: R) -> Result<Vec<IrpefBracketRecord>, LoaderError> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| LoaderError::CsvParse(e.to_string()))?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(detect_delimiter(&data))
            .trim(csv::Trim::All)
            .from_reader(data.as_slice());

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: IrpefBracketRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Replaces each year's bracket table with the parsed rows.
    ///
    /// Rows are grouped by year, sorted by `min_income`, checked against
    /// the bracket invariants, and written with delete-then-insert so a
    /// re-run of the same file leaves the table unchanged.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[IrpefBracketRecord],
    ) -> Result<usize, LoaderError> {
        let mut groups: BTreeMap<i32, Vec<&IrpefBracketRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.year).or_default().push(record);
        }

        let mut inserted = 0;
        for (year, mut group) in groups {
            group.sort_by_key(|r| r.min_income);

            let spans: Vec<BracketSpan> = group
                .iter()
                .map(|r| BracketSpan {
                    min: r.min_income,
                    max: r.max_income,
                    rate: r.rate,
                })
                .collect();
            brackets::validate(&spans)
                .map_err(|source| LoaderError::InvalidBrackets { year, source })?;

            repo.delete_irpef_brackets(year).await?;
            for record in &group {
                repo.create_irpef_bracket(NewIrpefBracket {
                    year,
                    min: record.min_income,
                    max: record.max_income,
                    rate: record.rate,
                })
                .await?;
                inserted += 1;
            }
            info!(year, brackets = group.len(), "replaced IRPEF bracket table");
        }

        Ok(inserted)
    }
}
