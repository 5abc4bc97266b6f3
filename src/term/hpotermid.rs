use core::fmt::Debug;
use std::fmt::Display;

use crate::{GpError, GpResult};

/// The unique identifier of an HPO term, e.g. `HP:0000118`
///
/// Internally the id is stored as the numerical part only.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Returns the numerical part of the id
    ///
    /// # Examples
    ///
    /// ```
    /// use genophenocorr::HpoTermId;
    ///
    /// let id = HpoTermId::try_from("HP:0000118").unwrap();
    /// assert_eq!(id.as_u32(), 118);
    /// ```
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = GpError;
    fn try_from(s: &str) -> GpResult<Self> {
        let value = s
            .strip_prefix("HP:")
            .ok_or_else(|| GpError::InvalidId(s.to_string()))?;
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GpError::InvalidId(s.to_string()));
        }
        Ok(HpoTermId {
            inner: value.parse::<u32>()?,
        })
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}
