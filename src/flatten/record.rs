//! Flattening of one VCF data line and selection of its representative `CSQ` annotation.

use rustc_hash::FxHashMap;

use super::schema::{AnnotationField, FieldIndices, FIXED_COLUMNS};

/// Key of the VEP annotation in the `INFO` column.
pub const CSQ_KEY: &str = "CSQ";

/// The columns of a VCF data line, borrowed from the line.
///
/// Missing fixed columns are read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariantLine<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub id: &'a str,
    pub reference: &'a str,
    pub alternative: &'a str,
    pub qual: &'a str,
    pub filter: &'a str,
    pub info: &'a str,
    pub format: &'a str,
    /// The genotype column of the first sample, if any.
    pub first_sample: Option<&'a str>,
}

impl<'a> VariantLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let mut columns = line.split('\t');
        let mut fixed = [""; FIXED_COLUMNS];
        for (slot, column) in fixed.iter_mut().zip(columns.by_ref()) {
            *slot = column;
        }
        let [chrom, pos, id, reference, alternative, qual, filter, info, format] = fixed;

        Self {
            chrom,
            pos,
            id,
            reference,
            alternative,
            qual,
            filter,
            info,
            format,
            first_sample: columns.next(),
        }
    }
}

/// Value of one `INFO` entry: either `key=value` or a bare `key` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoValue<'a> {
    Value(&'a str),
    Flag,
}

impl<'a> InfoValue<'a> {
    /// The string value, `None` for flags.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            InfoValue::Value(value) => Some(value),
            InfoValue::Flag => None,
        }
    }
}

/// The decoded `INFO` column of one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoMap<'a> {
    entries: FxHashMap<&'a str, InfoValue<'a>>,
}

impl<'a> InfoMap<'a> {
    /// Split on `;` and each entry on its first `=`; later duplicates win.
    pub fn parse(info: &'a str) -> Self {
        let entries = info
            .split(';')
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key, InfoValue::Value(value)),
                None => (entry, InfoValue::Flag),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<InfoValue<'a>> {
        self.entries.get(key).copied()
    }
}

/// One pipe-delimited `CSQ` value, i.e., the annotation of one feature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueSet<'a> {
    values: Vec<&'a str>,
}

impl<'a> ValueSet<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            values: raw.split('|').collect(),
        }
    }

    /// Value at `index`; empty when there is no index or the value set is too short.
    pub fn get(&self, index: Option<usize>) -> &'a str {
        index
            .and_then(|index| self.values.get(index).copied())
            .unwrap_or_default()
    }

    fn has_value_at(&self, index: Option<usize>) -> bool {
        !self.get(index).is_empty()
    }
}

/// Pick the representative annotation from a comma-separated `CSQ` value.
///
/// The first value set with a non-empty gene symbol wins; if there is none, the first value set
/// is used.
pub fn choose_annotation(csq: &str, symbol_index: Option<usize>) -> ValueSet<'_> {
    let mut value_sets = csq.split(',').map(ValueSet::parse);
    let first = value_sets.next().unwrap_or_default();
    if first.has_value_at(symbol_index) {
        first
    } else {
        value_sets
            .find(|value_set| value_set.has_value_at(symbol_index))
            .unwrap_or(first)
    }
}

/// The annotation columns written for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotationColumns<'a> {
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

impl<'a> AnnotationColumns<'a> {
    pub fn from_value_set(value_set: &ValueSet<'a>, indices: &FieldIndices) -> Self {
        let get = |field| value_set.get(indices.get(field));
        Self {
            symbol: get(AnnotationField::Symbol),
            transcript: get(AnnotationField::Feature),
            consequence: get(AnnotationField::Consequence),
            impact: get(AnnotationField::Impact),
            hgvsc: get(AnnotationField::Hgvsc),
            hgvsp: get(AnnotationField::Hgvsp),
            existing_variation: get(AnnotationField::ExistingVariation),
            gnomadg_af: get(AnnotationField::GnomadgAf),
            clin_sig: get(AnnotationField::ClinSig),
        }
    }
}

/// Extract the annotation columns of a data line.
///
/// Returns `None` if the line carries no `CSQ` value, in which case no output row is written.
pub fn annotate<'a>(info: &'a str, indices: &FieldIndices) -> Option<AnnotationColumns<'a>> {
    let csq = InfoMap::parse(info)
        .get(CSQ_KEY)
        .and_then(|value| value.as_str())
        .filter(|csq| !csq.is_empty())?;
    let chosen = choose_annotation(csq, indices.get(AnnotationField::Symbol));

    Some(AnnotationColumns::from_value_set(&chosen, indices))
}
