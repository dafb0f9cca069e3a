//! Discovery of the `CSQ` annotation schema and the sample names from the VCF header.
//!
//! VEP declares the layout of the pipe-delimited `CSQ` values in the free text description
//! of the corresponding `INFO` header line, e.g.
//!
//! ```text
//! ##INFO=<ID=CSQ,Number=.,Type=String,Description="Consequence annotations from Ensembl VEP. Format: Allele|Consequence|IMPACT|SYMBOL">
//! ```

use strum::{EnumCount, IntoEnumIterator};

/// Prefix of the `INFO` header line declaring the `CSQ` field.
pub const CSQ_INFO_PREFIX: &str = "##INFO=<ID=CSQ";

/// Prefix of the column header line, the last line of the VCF header.
pub const COLUMN_HEADER_PREFIX: &str = "#CHROM";

/// Number of fixed VCF columns preceding the sample columns.
pub const FIXED_COLUMNS: usize = 9;

/// The `CSQ` sub fields that are written to the output table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
pub enum AnnotationField {
    #[strum(serialize = "SYMBOL")]
    Symbol,
    #[strum(serialize = "Feature")]
    Feature,
    #[strum(serialize = "Consequence")]
    Consequence,
    #[strum(serialize = "IMPACT")]
    Impact,
    #[strum(serialize = "HGVSc")]
    Hgvsc,
    #[strum(serialize = "HGVSp")]
    Hgvsp,
    #[strum(serialize = "Existing_variation")]
    ExistingVariation,
    #[strum(serialize = "gnomADg_AF")]
    GnomadgAf,
    #[strum(serialize = "CLIN_SIG")]
    ClinSig,
}

/// The ordered names of the sub fields packed into each `CSQ` value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsqSchema {
    fields: Vec<String>,
}

impl CsqSchema {
    /// Construct from the list of field names.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Parse the schema from a `##INFO=<ID=CSQ,...>` header line.
    ///
    /// Returns `None` if `line` does not declare the `CSQ` field or if its description carries
    /// no `Format:` part.
    pub fn from_header_line(line: &str) -> Option<Self> {
        if !is_csq_info_line(line) {
            return None;
        }
        let description = line.split("Description=").nth(1)?;
        let format = description.split("Format:").nth(1)?;
        let fields = format
            .trim_matches(|c| matches!(c, '"' | '>' | ' '))
            .split('|')
            .map(|name| name.trim().to_string())
            .collect();

        Some(Self { fields })
    }

    /// The field names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of the first field with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }
}

/// Returns whether `line` is the `INFO` header line of the `CSQ` field.
pub fn is_csq_info_line(line: &str) -> bool {
    line.strip_prefix(CSQ_INFO_PREFIX)
        .map(|rest| rest.starts_with([',', '>']))
        .unwrap_or(false)
}

/// Positions of the output annotation fields in a `CsqSchema`.
///
/// Resolved once after the header has been read; a name missing from the schema stays `None`
/// for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIndices {
    indices: [Option<usize>; AnnotationField::COUNT],
}

impl FieldIndices {
    pub fn resolve(schema: &CsqSchema) -> Self {
        let mut indices = [None; AnnotationField::COUNT];
        for field in AnnotationField::iter() {
            indices[field as usize] = schema.index_of(field.into());
        }
        Self { indices }
    }

    pub fn get(&self, field: AnnotationField) -> Option<usize> {
        self.indices[field as usize]
    }
}

/// Extract the sample names from the `#CHROM` column header line.
pub fn sample_names(line: &str) -> Vec<String> {
    line.trim_start_matches('#')
        .split('\t')
        .skip(FIXED_COLUMNS)
        .map(str::to_string)
        .collect()
}
