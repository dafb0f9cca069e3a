//! Extraction of the genotype columns of the first sample.

use rustc_hash::FxHashMap;

/// `FORMAT` keys that are written to the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum FormatKey {
    /// Genotype call.
    Gt,
    /// Read depth.
    Dp,
    /// Allelic depths.
    Ad,
    /// Genotype quality.
    Gq,
}

/// The per-sample values of one line, keyed by the line's `FORMAT` keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleValues<'a> {
    values: FxHashMap<&'a str, &'a str>,
}

impl<'a> SampleValues<'a> {
    /// Zip the colon-separated `format` keys with the colon-separated `sample` values.
    ///
    /// Surplus keys or values are dropped, later duplicate keys win.
    pub fn parse(format: &'a str, sample: &'a str) -> Self {
        Self {
            values: format.split(':').zip(sample.split(':')).collect(),
        }
    }

    /// The value for `key`, empty if the key is not in this line's `FORMAT`.
    pub fn get(&self, key: FormatKey) -> &'a str {
        let key: &'static str = key.into();
        self.values.get(key).copied().unwrap_or_default()
    }
}

/// The genotype columns written for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenotypeColumns<'a> {
    pub gt: &'a str,
    pub dp: &'a str,
    pub ad: &'a str,
    pub gq: &'a str,
}

impl<'a> GenotypeColumns<'a> {
    /// Extract from the `FORMAT` column and the first sample column; all empty without samples.
    pub fn extract(format: &'a str, first_sample: Option<&'a str>) -> Self {
        match first_sample {
            Some(sample) => {
                let values = SampleValues::parse(format, sample);
                Self {
                    gt: values.get(FormatKey::Gt),
                    dp: values.get(FormatKey::Dp),
                    ad: values.get(FormatKey::Ad),
                    gq: values.get(FormatKey::Gq),
                }
            }
            None => Self::default(),
        }
    }
}
