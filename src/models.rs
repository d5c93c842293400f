use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseStatusError;

/// Pipeline stage of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::New,
        Status::Screening,
        Status::Interview,
        Status::Offer,
        Status::Hired,
        Status::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Screening => "screening",
            Status::Interview => "interview",
            Status::Offer => "offer",
            Status::Hired => "hired",
            Status::Rejected => "rejected",
        }
    }

    /// Capitalized form used by the status picker ("Interview").
    pub fn label(self) -> &'static str {
        match self {
            Status::New => "New",
            Status::Screening => "Screening",
            Status::Interview => "Interview",
            Status::Offer => "Offer",
            Status::Hired => "Hired",
            Status::Rejected => "Rejected",
        }
    }

    /// Hired and rejected candidates are out of the active pipeline.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Hired | Status::Rejected)
    }

    pub fn index(self) -> usize {
        Status::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Status {
        Status::ALL[(self.index() + 1) % Status::ALL.len()]
    }

    pub fn prev(self) -> Status {
        Status::ALL[(self.index() + Status::ALL.len() - 1) % Status::ALL.len()]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == lower)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub status: Status,
    pub experience: String,
    pub skills: Vec<String>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(with = "iso_millis")]
    pub applied_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis::option")]
    pub last_contact: Option<DateTime<Utc>>,
}

impl Candidate {
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    /// First character of every whitespace-separated token, upper-cased.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect::<String>()
            .to_uppercase()
    }

    /// First three skills plus a `+N` marker for the rest.
    pub fn skills_summary(&self) -> Vec<String> {
        let mut shown: Vec<String> = self.skills.iter().take(3).cloned().collect();
        if self.skills.len() > 3 {
            shown.push(format!("+{}", self.skills.len() - 3));
        }
        shown
    }

    /// Whole days since the last contact, or since applying when never contacted.
    pub fn days_since_contact(&self, now: DateTime<Utc>) -> i64 {
        let since = self.last_contact.unwrap_or(self.applied_date);
        (now - since).num_days()
    }

    /// Application date in the viewer's timezone, for display.
    pub fn applied_local(&self) -> DateTime<Local> {
        self.applied_date.with_timezone(&Local)
    }
}

/// Everything a caller supplies to create a candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub status: Status,
    pub experience: String,
    pub skills: Vec<String>,
    pub notes: String,
    pub resume_url: Option<String>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub status: Option<Status>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
    pub notes: Option<String>,
    pub resume_url: Option<Option<String>>,
}

impl CandidatePatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply_to(self, candidate: &mut Candidate) {
        if let Some(name) = self.name {
            candidate.name = name;
        }
        if let Some(email) = self.email {
            candidate.email = email;
        }
        if let Some(phone) = self.phone {
            candidate.phone = phone;
        }
        if let Some(position) = self.position {
            candidate.position = position;
        }
        if let Some(status) = self.status {
            candidate.status = status;
        }
        if let Some(experience) = self.experience {
            candidate.experience = experience;
        }
        if let Some(skills) = self.skills {
            candidate.skills = skills;
        }
        if let Some(notes) = self.notes {
            candidate.notes = notes;
        }
        if let Some(resume_url) = self.resume_url {
            candidate.resume_url = resume_url;
        }
    }
}

impl From<CandidateFields> for CandidatePatch {
    fn from(fields: CandidateFields) -> Self {
        Self {
            name: Some(fields.name),
            email: Some(fields.email),
            phone: Some(fields.phone),
            position: Some(fields.position),
            status: Some(fields.status),
            experience: Some(fields.experience),
            skills: Some(fields.skills),
            notes: Some(fields.notes),
            resume_url: Some(fields.resume_url),
        }
    }
}

/// Splits a comma-separated skill list, dropping blank entries.
pub fn parse_skills(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}
