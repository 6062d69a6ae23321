use std::io::Read;

use payroll_core::{BonusTaxRate, BonusType, PayrollRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{LoaderError, de_rate, detect_delimiter};

/// A single row of a bonus withholding-rates CSV.
///
/// Header aliases match the club back-office exports: `type` or
/// `BonusType` for the bonus type, `taxRate` or `Aliquota_Tipica` for
/// the rate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BonusTaxRateRecord {
    #[serde(alias = "Year")]
    pub year: i32,
    #[serde(alias = "type", alias = "BonusType")]
    pub bonus_type: String,
    #[serde(alias = "taxRate", alias = "Aliquota_Tipica", deserialize_with = "de_rate")]
    pub rate: Decimal,
}

/// Loader for bonus withholding-rate CSV files.
pub struct BonusTaxRateLoader;

impl BonusTaxRateLoader {
    pub fn parse<R: Read>(mut reader: R) -> Result<Vec<BonusTaxRateRecord>, LoaderError> {
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
            let record: BonusTaxRateRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Upserts every row by its (year, bonus type) key.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[BonusTaxRateRecord],
    ) -> Result<usize, LoaderError> {
        let mut upserted = 0;
        for record in records {
            let bonus_type = BonusType::parse(record.bonus_type.trim().to_uppercase().as_str())
                .ok_or_else(|| LoaderError::UnknownBonusType(record.bonus_type.clone()))?;

            repo.upsert_bonus_tax_rate(&BonusTaxRate {
                year: record.year,
                bonus_type,
                rate: record.rate,
            })
            .await?;
            upserted += 1;
        }

        if upserted > 0 {
            info!(rows = upserted, "upserted bonus withholding rates");
        }
        Ok(upserted)
    }
}
