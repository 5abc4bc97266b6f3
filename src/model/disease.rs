use std::fmt::Display;

use crate::{GpError, GpResult};

/// A unique identifier of a disease, e.g. `OMIM:256000`
///
/// The id consists of a prefix (the source database) and the
/// accession within that database.
///
/// # Examples
///
/// ```
/// use genophenocorr::model::DiseaseId;
///
/// let id = DiseaseId::try_from("OMIM:256000").unwrap();
/// assert_eq!(id.prefix(), "OMIM");
/// assert_eq!(id.accession(), "256000");
/// assert_eq!(id.to_string(), "OMIM:256000");
///
/// assert!(DiseaseId::try_from("256000").is_err());
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiseaseId {
    inner: String,
    separator: usize,
}

impl DiseaseId {
    /// The database prefix, e.g. `OMIM` or `ORPHA`
    pub fn prefix(&self) -> &str {
        &self.inner[..self.separator]
    }

    /// The accession without the prefix
    pub fn accession(&self) -> &str {
        &self.inner[self.separator + 1..]
    }

    /// The full CURIE
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl TryFrom<&str> for DiseaseId {
    type Error = GpError;
    fn try_from(value: &str) -> GpResult<Self> {
        match value.find(':') {
            Some(separator) if separator > 0 && separator + 1 < value.len() => Ok(DiseaseId {
                inner: value.to_string(),
                separator,
            }),
            _ => Err(GpError::InvalidId(value.to_string())),
        }
    }
}

impl Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A diagnosis of a patient
///
/// `is_present` is `false` if the disease was explicitly excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disease {
    id: DiseaseId,
    name: String,
    is_present: bool,
}

impl Disease {
    /// Constructs a new `Disease`
    pub fn new(id: DiseaseId, name: &str, is_present: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_present,
        }
    }

    /// The unique [`DiseaseId`] of the disease
    pub fn id(&self) -> &DiseaseId {
        &self.id
    }

    /// The disease name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if the patient was diagnosed with the disease
    pub fn is_present(&self) -> bool {
        self.is_present
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invalid_disease_ids() {
        assert!(DiseaseId::try_from(":123").is_err());
        assert!(DiseaseId::try_from("OMIM:").is_err());
        assert!(DiseaseId::try_from("OMIM123").is_err());
    }

    #[test]
    fn orpha_id() {
        let id = DiseaseId::try_from("ORPHA:558").unwrap();
        assert_eq!(id.prefix(), "ORPHA");
        assert_eq!(id.accession(), "558");
        assert_eq!(id.as_str(), "ORPHA:558");
    }
}
