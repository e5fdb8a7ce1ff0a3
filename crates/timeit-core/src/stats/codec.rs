//! JSON record form of an accumulator
//!
//! Only the observable statistics are exported: count, mean, max, min and
//! the derived statistics selected by the export flags. Importing rebuilds
//! M2 from whichever derived statistics are present, so a round trip is
//! lossy (the derived values were truncated on export).

use crate::stats::accumulator::Accumulator;
use crate::stats::flags::ExportFlags;
use crate::stats::nanos::Nanos;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Read;
use thiserror::Error;

/// Errors that can occur while encoding or decoding statistics
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid statistics JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read statistics: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown statistic field: {0}")]
    UnknownField(String),
}

/// Exported statistics of an [`Accumulator`]
///
/// Every field is optional on import; a missing field leaves the
/// corresponding value of the target untouched. `samples` is unsigned, so a
/// negative count is rejected as a decoding error rather than imported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub samples: Option<u64>,
    #[serde(default)]
    pub mean: Option<Nanos>,
    #[serde(default)]
    pub max: Option<Nanos>,
    #[serde(default)]
    pub min: Option<Nanos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<Nanos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_variance: Option<Nanos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<Nanos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_std_dev: Option<Nanos>,
}

impl From<&Accumulator> for Record {
    fn from(acc: &Accumulator) -> Self {
        let flags = acc.export_flags();
        let pick = |flag: ExportFlags, value: fn(&Accumulator) -> Nanos| {
            flags.exports(flag).then(|| value(acc))
        };

        Self {
            samples: Some(acc.samples()),
            mean: Some(acc.mean()),
            max: Some(acc.max()),
            min: Some(acc.min()),
            variance: pick(ExportFlags::VARIANCE, Accumulator::variance),
            sample_variance: pick(ExportFlags::SAMPLE_VARIANCE, Accumulator::sample_variance),
            std_dev: pick(ExportFlags::STD_DEV, Accumulator::std_dev),
            sample_std_dev: pick(ExportFlags::SAMPLE_STD_DEV, Accumulator::sample_std_dev),
        }
    }
}

impl Record {
    /// Write this record's values into `acc`
    ///
    /// M2 is rebuilt from the derived statistics, most lossy first:
    /// sample standard deviation, standard deviation, sample variance, then
    /// variance. Each present field overwrites the previous reconstruction,
    /// so the last one present wins; no consistency check is made between
    /// them. The flag of every present field is added to the export flags,
    /// even when the sample count is too small to rebuild from it.
    pub fn apply_to(&self, acc: &mut Accumulator) {
        acc.set_base(
            self.samples.unwrap_or(acc.samples()),
            self.mean.unwrap_or(acc.mean()),
            self.max.unwrap_or(acc.max()),
            self.min.unwrap_or(acc.min()),
        );

        let samples = i128::from(acc.samples());
        let mut flags = acc.export_flags();
        let mut m2 = acc.m2();

        if let Some(sample_std_dev) = self.sample_std_dev {
            flags |= ExportFlags::SAMPLE_STD_DEV;
            if samples > 1 {
                m2 = squared(sample_std_dev).saturating_mul(samples - 1);
            }
        }
        if let Some(std_dev) = self.std_dev {
            flags |= ExportFlags::STD_DEV;
            m2 = squared(std_dev).saturating_mul(samples);
        }
        if let Some(sample_variance) = self.sample_variance {
            flags |= ExportFlags::SAMPLE_VARIANCE;
            if samples > 1 {
                m2 = i128::from(sample_variance.0).saturating_mul(samples - 1);
            }
        }
        if let Some(variance) = self.variance {
            flags |= ExportFlags::VARIANCE;
            m2 = i128::from(variance.0).saturating_mul(samples);
        }

        acc.set_m2(m2);
        acc.set_export_flags(flags);
    }

    /// Build a fresh, unchained accumulator from this record
    pub fn into_accumulator(self) -> Accumulator {
        let mut acc = Accumulator::new();
        self.apply_to(&mut acc);
        acc
    }
}

fn squared(value: Nanos) -> i128 {
    let v = i128::from(value.0);
    v.saturating_mul(v)
}

impl Serialize for Accumulator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Record::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Accumulator {
    /// `null` deserializes to an empty accumulator.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Record>::deserialize(deserializer)?
            .map(Record::into_accumulator)
            .unwrap_or_default())
    }
}

impl Accumulator {
    /// Encode the statistics as compact JSON
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode the statistics as indented JSON
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode an accumulator from JSON
    ///
    /// `null` or blank input yields an empty accumulator.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Decode an accumulator from a JSON stream
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, CodecError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json(&text)
    }

    /// Decode JSON into this accumulator in place
    ///
    /// Fields missing from the input keep their current values and the chain
    /// is preserved. `null` or blank input is a no-op. On a decoding error
    /// the accumulator is left exactly as it was.
    pub fn import_json(&mut self, text: &str) -> Result<(), CodecError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if let Some(record) = serde_json::from_str::<Option<Record>>(text)? {
            record.apply_to(self);
        }
        Ok(())
    }
}
