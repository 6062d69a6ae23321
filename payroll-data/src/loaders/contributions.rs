use std::io::Read;

use payroll_core::{ContractType, ContributionRate, PayrollRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{LoaderError, de_rate, detect_delimiter};

/// A single row of a contribution-rates CSV.
///
/// Columns: `year`, `contract_type` (`PROFESSIONAL`, `APPRENTICESHIP`,
/// `AMATEUR`, `YOUTH`) and the seven rate columns, percent each.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContributionRateRecord {
    pub year: i32,
    pub contract_type: String,
    #[serde(deserialize_with = "de_rate")]
    pub inps_worker: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub inps_employer: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub ffc_worker: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub ffc_employer: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub inail_employer: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub solidarity_worker: Decimal,
    #[serde(deserialize_with = "de_rate")]
    pub solidarity_employer: Decimal,
}

/// Loader for contribution-rate CSV files.
pub struct ContributionRateLoader;

impl ContributionRateLoader {
    pub fn parse<R: Read>(mut reader: R) -> Result<Vec<ContributionRateRecord>, LoaderError> {
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
            let record: ContributionRateRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Upserts every row; the (year, contract type) key makes re-runs
    /// idempotent.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[ContributionRateRecord],
    ) -> Result<usize, LoaderError> {
        let mut upserted = 0;
        for record in records {
            let contract_type = ContractType::parse(record.contract_type.trim())
                .ok_or_else(|| LoaderError::UnknownContractType(record.contract_type.clone()))?;

            repo.upsert_contribution_rate(&ContributionRate {
                year: record.year,
                contract_type,
                inps_worker: record.inps_worker,
                inps_employer: record.inps_employer,
                ffc_worker: record.ffc_worker,
                ffc_employer: record.ffc_employer,
                inail_employer: record.inail_employer,
                solidarity_worker: record.solidarity_worker,
                solidarity_employer: record.solidarity_employer,
            })
            .await?;
            upserted += 1;
        }

        if upserted > 0 {
            info!(rows = upserted, "upserted contribution rates");
        }
        Ok(upserted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const CSV: &str = "\
year,contract_type,inps_worker,inps_employer,ffc_worker,ffc_employer,inail_employer,solidarity_worker,solidarity_employer
2025,PROFESSIONAL,9.19,30.0,6.25,0.0,1.5,0.0,0.5
2025,APPRENTICESHIP,5.84,15.0,6.25,0.0,0.8,0.0,0.5
";

    #[test]
    fn parse_all_rate_columns() {
        let records = ContributionRateLoader::parse(CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contract_type, "PROFESSIONAL");
        assert_eq!(records[0].inps_worker, dec!(9.19));
        assert_eq!(records[1].inail_employer, dec!(0.8));
    }

    #[test]
    fn parse_italian_export_format() {
        let csv = "\
year;contract_type;inps_worker;inps_employer;ffc_worker;ffc_employer;inail_employer;solidarity_worker;solidarity_employer
2025;PROFESSIONAL;9,19%;30%;6,25%;0%;1,5%;0%;0,5%
";

        let records = ContributionRateLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(records[0].inps_worker, dec!(9.19));
        assert_eq!(records[0].inail_employer, dec!(1.5));
    }
}
