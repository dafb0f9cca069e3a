//! Flattening of VEP-annotated VCF files into a TSV table.
//!
//! The input is processed in a single forward pass.  The header lines are scanned for the
//! `CSQ` schema and the sample names; once the `#CHROM` line is reached, the output header is
//! written and each data line with a `CSQ` annotation yields one output row.

pub mod genotype;
pub mod output;
pub mod record;
pub mod schema;

use std::io::{BufRead, Write};
use std::time::Instant;

use clap::Parser;
use strum::IntoEnumIterator;
use thousands::Separable;

use self::genotype::GenotypeColumns;
use self::output::{FlatRecord, TsvWriter};
use self::record::VariantLine;
use self::schema::{AnnotationField, CsqSchema, FieldIndices, COLUMN_HEADER_PREFIX};
use crate::common::io::std::{open_read_maybe_gz, open_write_maybe_gz};

/// Command line arguments for flattening.
#[derive(Parser, Debug, Default)]
#[group(id = "flatten_args")]
pub struct Args {
    /// Path to the input VCF file, optionally gzip-compressed; `-` reads stdin.
    #[arg(value_name = "VEP_ANNOTATED_VCF")]
    pub path_input: String,

    /// Path to the output TSV file, stdout if not given.
    #[arg(long)]
    pub path_output_tsv: Option<String>,

    /// For debug purposes, maximal number of data lines to process.
    #[arg(long)]
    pub max_var_count: Option<usize>,
}

/// Information gathered from the VCF header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderInfo {
    pub schema: CsqSchema,
    pub sample_names: Vec<String>,
}

/// Read the header lines up to and including the `#CHROM` line.
///
/// Fails if there is no `CSQ` schema or if the input ends before the `#CHROM` line.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<HeaderInfo, anyhow::Error> {
    let mut schema = None;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            anyhow::bail!("input ended before the #CHROM line of the VCF header");
        }
        let line = trim_newline(&line);

        if schema::is_csq_info_line(line) {
            match CsqSchema::from_header_line(line) {
                Some(parsed) => schema = Some(parsed),
                None => tracing::warn!("CSQ header line has no Format description: {}", line),
            }
        } else if line.starts_with(COLUMN_HEADER_PREFIX) {
            let schema = schema
                .ok_or_else(|| anyhow::anyhow!("could not find CSQ definition in VCF header"))?;
            return Ok(HeaderInfo {
                schema,
                sample_names: schema::sample_names(line),
            });
        }
    }
}

/// Turns data lines into `FlatRecord`s.
#[derive(Debug, Clone)]
pub struct RecordFlattener {
    indices: FieldIndices,
    sample_name: String,
}

impl RecordFlattener {
    pub fn new(header: &HeaderInfo) -> Self {
        Self {
            indices: FieldIndices::resolve(&header.schema),
            sample_name: header.sample_names.first().cloned().unwrap_or_default(),
        }
    }

    pub fn indices(&self) -> &FieldIndices {
        &self.indices
    }

    /// Flatten one data line, `None` if it carries no `CSQ` annotation.
    pub fn flatten<'a>(&'a self, line: &'a str) -> Option<FlatRecord<'a>> {
        let variant = VariantLine::parse(line);
        let annotation = record::annotate(variant.info, &self.indices)?;
        let genotype = GenotypeColumns::extract(variant.format, variant.first_sample);

        Some(FlatRecord::new(
            &variant,
            &self.sample_name,
            genotype,
            annotation,
        ))
    }
}

/// Counters of one flattening run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Number of non-comment, non-blank lines after the header.
    pub data_lines: usize,
    /// Number of rows written.
    pub rows_written: usize,
    /// Number of data lines without `CSQ` value.
    pub skipped_no_csq: usize,
}

/// Flatten the VCF from `reader` into the TSV `writer`.
///
/// Nothing is written if the header cannot be read.
pub fn flatten<R, W>(
    mut reader: R,
    writer: W,
    max_var_count: Option<usize>,
) -> Result<Stats, anyhow::Error>
where
    R: BufRead,
    W: Write,
{
    let header = read_header(&mut reader)?;
    flatten_records(reader, &header, writer, max_var_count)
}

/// Write the output header and one row per annotated data line from `reader`.
///
/// `reader` must be positioned right after the `#CHROM` line that `header` was read from.
pub fn flatten_records<R, W>(
    mut reader: R,
    header: &HeaderInfo,
    writer: W,
    max_var_count: Option<usize>,
) -> Result<Stats, anyhow::Error>
where
    R: BufRead,
    W: Write,
{
    tracing::info!(
        "CSQ schema has {} fields, input has {} sample(s)",
        header.schema.fields().len(),
        header.sample_names.len()
    );
    if header.sample_names.len() > 1 {
        tracing::warn!(
            "only the first sample ({}) is written, ignoring {} more",
            &header.sample_names[0],
            header.sample_names.len() - 1
        );
    }

    let flattener = RecordFlattener::new(header);
    for field in AnnotationField::iter() {
        tracing::debug!(
            "CSQ field {} at index {:?}",
            field,
            flattener.indices().get(field)
        );
    }

    let mut writer = TsvWriter::new(writer);
    writer.write_header()?;

    let mut stats = Stats::default();
    let mut prev = Instant::now();
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = trim_newline(&buf);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(max_var_count) = max_var_count {
            if stats.data_lines >= max_var_count {
                tracing::info!("stopping after {} data lines", max_var_count);
                break;
            }
        }
        stats.data_lines += 1;

        match flattener.flatten(line) {
            Some(record) => {
                if prev.elapsed().as_secs() >= 60 {
                    tracing::info!("at {}:{}", record.chrom, record.pos);
                    prev = Instant::now();
                }
                writer.write_record(&record)?;
                stats.rows_written += 1;
            }
            None => {
                tracing::trace!("no CSQ value, skipping data line {}", stats.data_lines);
                stats.skipped_no_csq += 1;
            }
        }
    }
    writer.flush()?;

    Ok(stats)
}

/// Strip the line terminator (`\n` or `\r\n`).
fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Main entry point for flattening.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Opening input file {}", &args.path_input);
    let mut reader = open_read_maybe_gz(&args.path_input)?;
    let header = read_header(&mut reader)?;

    // The output is only created once the header is known to be usable.
    let mut writer = open_write_maybe_gz(args.path_output_tsv.as_ref())?;

    let before = Instant::now();
    let stats = flatten_records(reader, &header, &mut writer, args.max_var_count)?;
    writer.finish()?;
    tracing::info!(
        "... wrote {} rows for {} data lines ({} without CSQ) in {:?}",
        stats.rows_written.separate_with_commas(),
        stats.data_lines.separate_with_commas(),
        stats.skipped_no_csq.separate_with_commas(),
        before.elapsed()
    );

    Ok(())
}
