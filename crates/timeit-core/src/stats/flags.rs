//! Selection of derived statistics for export

use crate::stats::codec::CodecError;
use bitflags::bitflags;
use std::str::FromStr;

bitflags! {
    /// Derived statistics to include when an [`Accumulator`] is exported.
    ///
    /// An empty set means every derived statistic is exported.
    ///
    /// [`Accumulator`]: crate::Accumulator
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExportFlags: u8 {
        /// Population variance
        const VARIANCE = 1 << 0;
        /// Sample (unbiased) variance
        const SAMPLE_VARIANCE = 1 << 1;
        /// Population standard deviation
        const STD_DEV = 1 << 2;
        /// Sample standard deviation
        const SAMPLE_STD_DEV = 1 << 3;
    }
}

impl Default for ExportFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExportFlags {
    /// Record field names, paired with their flag
    pub const FIELDS: [(&'static str, ExportFlags); 4] = [
        ("variance", ExportFlags::VARIANCE),
        ("sample_variance", ExportFlags::SAMPLE_VARIANCE),
        ("std_dev", ExportFlags::STD_DEV),
        ("sample_std_dev", ExportFlags::SAMPLE_STD_DEV),
    ];

    /// Whether the derived statistic `flag` should be exported
    pub fn exports(self, flag: ExportFlags) -> bool {
        self.is_empty() || self.contains(flag)
    }

    /// Parse a list of field names into a flag set
    ///
    /// Dashes are accepted in place of underscores (`std-dev`).
    pub fn from_names<I, S>(names: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(ExportFlags::empty(), |acc, name| -> Result<_, CodecError> {
                Ok(acc | name.as_ref().parse::<ExportFlags>()?)
            })
    }

    /// Field names of the flags in this set
    pub fn names(self) -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl FromStr for ExportFlags {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::FIELDS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| CodecError::UnknownField(s.to_string()))
    }
}
