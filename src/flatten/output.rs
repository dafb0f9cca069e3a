//! The flat output table.

use std::io::Write;

use serde::Serialize;

use super::genotype::GenotypeColumns;
use super::record::{AnnotationColumns, VariantLine};

/// Header of the output table.
pub const HEADER: [&str; 21] = [
    "CHROM",
    "POS",
    "ID",
    "REF",
    "ALT",
    "QUAL",
    "FILTER",
    "SAMPLE",
    "GT",
    "DP",
    "AD",
    "GQ",
    "SYMBOL",
    "Transcript",
    "Consequence",
    "Impact",
    "HGVSc",
    "HGVSp",
    "Existing_variation",
    "gnomADg_AF",
    "CLIN_SIG",
];

/// One row of the output table; field order matches `HEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlatRecord<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub id: &'a str,
    pub reference: &'a str,
    pub alternative: &'a str,
    pub qual: &'a str,
    pub filter: &'a str,
    pub sample: &'a str,
    pub gt: &'a str,
    pub dp: &'a str,
    pub ad: &'a str,
    pub gq: &'a str,
    pub symbol: &'a str,
    pub transcript: &'a str,
    pub consequence: &'a str,
    pub impact: &'a str,
    pub hgvsc: &'a str,
    pub hgvsp: &'a str,
    pub existing_variation: &'a str,
    pub gnomadg_af: &'a str,
    pub clin_sig: &'a str,
}

impl<'a> FlatRecord<'a> {
    pub fn new(
        line: &VariantLine<'a>,
        sample: &'a str,
        genotype: GenotypeColumns<'a>,
        annotation: AnnotationColumns<'a>,
    ) -> Self {
        Self {
            chrom: line.chrom,
            pos: line.pos,
            id: line.id,
            reference: line.reference,
            alternative: line.alternative,
            qual: line.qual,
            filter: line.filter,
            sample,
            gt: genotype.gt,
            dp: genotype.dp,
            ad: genotype.ad,
            gq: genotype.gq,
            symbol: annotation.symbol,
            transcript: annotation.transcript,
            consequence: annotation.consequence,
            impact: annotation.impact,
            hgvsc: annotation.hgvsc,
            hgvsp: annotation.hgvsp,
            existing_variation: annotation.existing_variation,
            gnomadg_af: annotation.gnomadg_af,
            clin_sig: annotation.clin_sig,
        }
    }
}

/// Writing of `FlatRecord`s as tab-separated text.
///
/// Values are written verbatim, without any quoting.
pub struct TsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: csv::WriterBuilder::new()
                .delimiter(b'\t')
                .quote_style(csv::QuoteStyle::Never)
                .has_headers(false)
                .from_writer(inner),
        }
    }

    pub fn write_header(&mut self) -> Result<(), anyhow::Error> {
        self.inner.write_record(HEADER)?;
        Ok(())
    }

    pub fn write_record(&mut self, record: &FlatRecord) -> Result<(), anyhow::Error> {
        self.inner.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), anyhow::Error> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn written(records: &[FlatRecord]) -> Result<String, anyhow::Error> {
        let mut buf = Vec::new();
        {
            let mut writer = TsvWriter::new(&mut buf);
            writer.write_header()?;
            for record in records {
                writer.write_record(record)?;
            }
            writer.flush()?;
        }
        Ok(String::from_utf8(buf)?)
    }

    #[test]
    fn header_only() -> Result<(), anyhow::Error> {
        insta::assert_snapshot!(
            written(&[])?.trim_end(),
            @"CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tSAMPLE\tGT\tDP\tAD\tGQ\tSYMBOL\tTranscript\tConsequence\tImpact\tHGVSc\tHGVSp\tExisting_variation\tgnomADg_AF\tCLIN_SIG"
        );

        Ok(())
    }

    #[test]
    fn record_field_order() -> Result<(), anyhow::Error> {
        let line = VariantLine::parse("1\t2\t3\t4\t5\t6\t7\tCSQ=x\tGT");
        let record = FlatRecord::new(
            &line,
            "8",
            GenotypeColumns {
                gt: "9",
                dp: "10",
                ad: "11",
                gq: "12",
            },
            AnnotationColumns {
                symbol: "13",
                transcript: "14",
                consequence: "15",
                impact: "16",
                hgvsc: "17",
                hgvsp: "18",
                existing_variation: "19",
                gnomadg_af: "20",
                clin_sig: "21",
            },
        );

        let output = written(&[record])?;
        let row = output.lines().nth(1).expect("row expected");
        let expected = (1..=21).map(|i| i.to_string()).collect::<Vec<_>>();

        assert_eq!(row.split('\t').collect::<Vec<_>>(), expected);

        Ok(())
    }

    #[test]
    fn values_are_not_quoted() -> Result<(), anyhow::Error> {
        let record = FlatRecord {
            chrom: "chr1",
            hgvsp: "ENSP0001.1:p.Gln12\"Ter",
            clin_sig: "benign,likely_benign",
            ..Default::default()
        };

        let output = written(&[record])?;

        assert_eq!(
            output.lines().nth(1),
            Some("chr1\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t\tENSP0001.1:p.Gln12\"Ter\t\t\tbenign,likely_benign")
        );

        Ok(())
    }
}
