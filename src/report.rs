use std::{fs::File, io::BufWriter, path::Path};

use crate::{
    error::Error,
    parser::{parse, Options},
    transaction::{TransactionRecord, HEADER},
};

/// Confirmed transactions of one wallet report, ready to be written as CSV.
#[derive(Debug, Default)]
pub struct Report {
    records: Vec<TransactionRecord>,
}

impl Report {
    pub fn from_text(text: &str, options: Options) -> Result<Self, Error> {
        Ok(Report {
            records: parse(text, options).collect::<Result<_, _>>()?,
        })
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Write the header and one row per record.
    /// Fields are quoted only when they contain a comma, a quote or a newline,
    /// so ordinary rows are a plain comma join.
    pub fn serialize(&self, output: impl std::io::Write) -> Result<(), Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer.write_record(HEADER)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, Error> {
        let mut output = Vec::<u8>::new();
        self.serialize(&mut output)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path)?;
        self.serialize(BufWriter::new(file))
    }
}

/// Convert a wallet report into Koinly CSV.
/// With a destination the CSV is written there and `None` is returned,
/// otherwise the CSV text is returned.
pub fn convert(
    text: &str,
    destination: Option<&Path>,
    options: Options,
) -> Result<Option<String>, Error> {
    let report = Report::from_text(text, options)?;
    match destination {
        Some(path) => report.write_to(path).map(|()| None),
        None => report.to_csv().map(Some),
    }
}

#[cfg(test)]
mod tests {
    mod serialization {
        use crate::report::Report;
        use crate::transaction::{Label, TransactionRecord};

        fn dump(records: Vec<TransactionRecord>) -> String {
            Report { records }.to_csv().unwrap()
        }

        #[test]
        fn header_only() {
            assert_eq!(
                dump(vec![]),
                "Koinly Date,Amount,Currency,Label,TxHash,Fee,ToAddress,FromAddress,TxType\n"
            );
        }

        #[test]
        fn plain_fields_are_not_quoted() {
            let record = TransactionRecord::new(
                "2023-01-01 10:00:00".to_string(),
                "0.25".to_string(),
                Label::BlockReward,
                "0xabc".to_string(),
                "xch1to".to_string(),
                String::new(),
            );
            assert_eq!(
                dump(vec![record]).lines().nth(1),
                Some("2023-01-01 10:00:00,0.25,XCH,Mining (Block Reward),0xabc,0,xch1to,,0")
            );
        }

        #[test]
        fn fields_with_commas_and_quotes_are_quoted() {
            let record = TransactionRecord::new(
                "2023-01-01".to_string(),
                "1".to_string(),
                Label::Unknown,
                "say \"hi\"".to_string(),
                "a,b".to_string(),
                String::new(),
            );
            assert_eq!(
                dump(vec![record]).lines().nth(1),
                Some("2023-01-01,1,XCH,Unknown,\"say \"\"hi\"\"\",0,\"a,b\",,0")
            );
        }
    }

    mod destination {
        use std::fs;

        use crate::parser::Options;
        use crate::report::convert;

        const REPORT: &str = "Transaction 0xabc
Status: Confirmed
Amount received: 1 XCH
To address: xch1addr
Created at: 2023-01-01 10:00:00
";

        #[test]
        fn returns_text_without_destination() {
            let csv = convert(REPORT, None, Options::default()).unwrap().unwrap();
            assert!(csv.ends_with("2023-01-01 10:00:00,1,XCH,Mining,0xabc,0,,xch1addr,0\n"));
        }

        #[test]
        fn writes_file_with_destination() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("out.csv");
            assert_eq!(convert(REPORT, Some(&path), Options::default()).unwrap(), None);
            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                convert(REPORT, None, Options::default()).unwrap().unwrap()
            );
        }

        #[test]
        fn unwritable_destination_fails() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("missing").join("out.csv");
            assert!(matches!(
                convert(REPORT, Some(&path), Options::default()),
                Err(crate::error::Error::Io(_))
            ));
        }
    }
}
