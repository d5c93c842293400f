use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{debug, info, warn};

use crate::models::{Candidate, CandidateFields, CandidatePatch, Status};
use crate::storage::KeyValueStorage;

/// Key holding the serialized candidate array.
pub const STORAGE_KEY: &str = "vertexhire_candidates";
/// Where an unreadable payload is copied before starting empty.
pub const CORRUPT_KEY: &str = "vertexhire_candidates.corrupt";

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to the millisecond precision timestamps are stored with.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Owns the candidate collection and keeps it in sync with storage.
///
/// Every mutation rewrites the whole persisted array. Views get read-only
/// slices and go through `create`, `update` and `remove` for changes.
pub struct CandidateStore<S: KeyValueStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    candidates: Vec<Candidate>,
}

impl<S: KeyValueStorage> CandidateStore<S> {
    /// Loads the collection, seeding the example records on first run or
    /// when the stored value is blank.
    ///
    /// A payload that cannot be parsed is copied to [`CORRUPT_KEY`] and the
    /// store starts empty; the original key is rewritten by the next mutation.
    pub fn load(storage: S, clock: Box<dyn Clock>) -> Result<Self> {
        let mut store = Self {
            storage,
            clock,
            candidates: Vec::new(),
        };

        // a blank value counts as no data
        let stored = store
            .storage
            .get(STORAGE_KEY)?
            .filter(|raw| !raw.trim().is_empty());
        match stored {
            Some(raw) => match serde_json::from_str::<Vec<Candidate>>(&raw) {
                Ok(candidates) => {
                    debug!(count = candidates.len(), "loaded candidates");
                    store.candidates = candidates;
                }
                Err(e) => {
                    warn!(error = %e, backup_key = CORRUPT_KEY, "stored candidates are unreadable, starting empty");
                    store
                        .storage
                        .set(CORRUPT_KEY, &raw)
                        .context("Failed to back up unreadable candidate data")?;
                }
            },
            None => {
                info!("no stored candidates, seeding examples");
                store.candidates = seed_candidates(store.clock.now());
                store.persist()?;
            }
        }

        Ok(store)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn create(&mut self, fields: CandidateFields) -> Result<Candidate> {
        let now = self.clock.now();
        let candidate = Candidate {
            id: self.next_id(now),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            position: fields.position,
            status: fields.status,
            experience: fields.experience,
            skills: fields.skills,
            notes: fields.notes,
            resume_url: fields.resume_url,
            applied_date: now,
            last_contact: None,
        };
        self.candidates.push(candidate.clone());
        self.persist()?;
        info!(id = %candidate.id, name = %candidate.name, "created candidate");
        Ok(candidate)
    }

    /// Merges `patch` into the candidate and stamps `last_contact` with the
    /// current time, whatever the patch touched. Returns `false` when `id`
    /// is unknown, in which case nothing is written.
    pub fn update(&mut self, id: &str, patch: CandidatePatch) -> Result<bool> {
        let now = self.clock.now();
        let Some(candidate) = self.candidates.iter_mut().find(|c| c.id == id) else {
            debug!(id, "update ignored, no such candidate");
            return Ok(false);
        };

        patch.apply_to(candidate);
        // never earlier than applied_date or the previous contact
        let floor = candidate
            .last_contact
            .map_or(candidate.applied_date, |prev| prev.max(candidate.applied_date));
        candidate.last_contact = Some(now.max(floor));
        info!(id, status = %candidate.status, "updated candidate");

        self.persist()?;
        Ok(true)
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> Result<bool> {
        self.update(id, CandidatePatch::status(status))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.candidates.len();
        self.candidates.retain(|c| c.id != id);
        if self.candidates.len() == before {
            debug!(id, "remove ignored, no such candidate");
            return Ok(false);
        }
        self.persist()?;
        info!(id, "removed candidate");
        Ok(true)
    }

    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate_id = now.timestamp_millis();
        while self.get(&candidate_id.to_string()).is_some() {
            candidate_id += 1;
        }
        candidate_id.to_string()
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.candidates).context("Failed to serialize candidates")?;
        self.storage.set(STORAGE_KEY, &raw)
    }
}

/// The three example records written on first run.
pub fn seed_candidates(now: DateTime<Utc>) -> Vec<Candidate> {
    let skills = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        Candidate {
            id: "1".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah.j@email.com".to_string(),
            phone: "+1-555-0123".to_string(),
            position: "Senior Software Engineer".to_string(),
            status: Status::Interview,
            experience: "7 years".to_string(),
            skills: skills(&["React", "Node.js", "TypeScript", "AWS"]),
            notes: "Strong technical background, excellent communication skills".to_string(),
            resume_url: None,
            applied_date: now - Duration::days(5),
            last_contact: Some(now - Duration::days(2)),
        },
        Candidate {
            id: "2".to_string(),
            name: "Michael Chen".to_string(),
            email: "mchen@email.com".to_string(),
            phone: "+1-555-0124".to_string(),
            position: "Product Manager".to_string(),
            status: Status::Screening,
            experience: "5 years".to_string(),
            skills: skills(&["Agile", "Product Strategy", "Data Analysis", "Jira"]),
            notes: "Previous experience at Fortune 500 companies".to_string(),
            resume_url: None,
            applied_date: now - Duration::days(3),
            last_contact: Some(now - Duration::days(1)),
        },
        Candidate {
            id: "3".to_string(),
            name: "Emily Rodriguez".to_string(),
            email: "emily.r@email.com".to_string(),
            phone: "+1-555-0125".to_string(),
            position: "UX Designer".to_string(),
            status: Status::New,
            experience: "3 years".to_string(),
            skills: skills(&["Figma", "User Research", "Prototyping", "Design Systems"]),
            notes: "Impressive portfolio, needs technical assessment".to_string(),
            resume_url: None,
            applied_date: now - Duration::days(1),
            last_contact: None,
        },
    ]
}
