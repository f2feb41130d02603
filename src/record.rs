//! Assessment records and their material classes
//!
//! A record is immutable once parsed. The material class is never stored on
//! the record; it is derived from `mastery` whenever a block is laid out.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One math block as delivered by the record source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathRecord {
    /// Source-assigned id (opaque)
    pub id: i64,
    pub subject: String,
    /// Grade label, e.g. "6th Grade"
    pub grade: String,
    /// Proficiency score, expected in {0, 1, 2}
    pub mastery: i64,
    #[serde(rename = "domainId", alias = "domainid")]
    pub domain_id: String,
    pub domain: String,
    pub cluster: String,
    #[serde(rename = "standardId", alias = "standardid")]
    pub standard_id: String,
    #[serde(rename = "standardDescription", alias = "standarddescription")]
    pub standard_description: String,
}

impl MathRecord {
    /// Material class for this record's mastery level
    pub fn material(&self) -> Result<MaterialClass> {
        MaterialClass::from_mastery(self.mastery).ok_or(Error::UnknownMastery {
            record_id: self.id,
            mastery: self.mastery,
        })
    }
}

/// Block material, one per mastery level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialClass {
    /// Mastery 0
    Glass,
    /// Mastery 1
    Wood,
    /// Mastery 2
    Stone,
}

impl MaterialClass {
    pub const ALL: [MaterialClass; 3] = [MaterialClass::Glass, MaterialClass::Wood, MaterialClass::Stone];

    pub fn from_mastery(mastery: i64) -> Option<Self> {
        match mastery {
            0 => Some(MaterialClass::Glass),
            1 => Some(MaterialClass::Wood),
            2 => Some(MaterialClass::Stone),
            _ => None,
        }
    }

    pub fn mastery(&self) -> i64 {
        *self as i64
    }

    /// Table index (0..3) for lookup arrays
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialClass::Glass => "Glass",
            MaterialClass::Wood => "Wood",
            MaterialClass::Stone => "Stone",
        }
    }
}

impl std::fmt::Display for MaterialClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
pub(crate) fn sample(id: i64, grade: &str, domain: &str, mastery: i64) -> MathRecord {
    MathRecord {
        id,
        subject: "Math".to_string(),
        grade: grade.to_string(),
        mastery,
        domain_id: String::new(),
        domain: domain.to_string(),
        cluster: String::new(),
        standard_id: String::new(),
        standard_description: String::new(),
    }
}
