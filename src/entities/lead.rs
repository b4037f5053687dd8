// 🎯 Lead Entity
// Ordered lifecycle: New → Contacted → Qualified → Converted, with terminal Lost

use super::{match_label, ParseLabelError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }

    /// Position in the lifecycle (0 = New). `Lost` sits after the happy path.
    pub fn stage(&self) -> u8 {
        match self {
            LeadStatus::New => 0,
            LeadStatus::Contacted => 1,
            LeadStatus::Qualified => 2,
            LeadStatus::Converted => 3,
            LeadStatus::Lost => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Converted | LeadStatus::Lost)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table: Vec<(&str, LeadStatus)> =
            LeadStatus::ALL.iter().map(|st| (st.as_str(), *st)).collect();
        match_label("lead status", s, &table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,

    /// Acquisition source label ("Website", "LinkedIn", "Referral", ...)
    pub source: String,

    pub date: NaiveDate,
    pub status: LeadStatus,
}

impl Lead {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        date: NaiveDate,
        status: LeadStatus,
    ) -> Self {
        Lead {
            id: id.into(),
            source: source.into(),
            date,
            status,
        }
    }

    pub fn is_converted(&self) -> bool {
        self.status == LeadStatus::Converted
    }
}
