//! Scripted recruitment assistant.
//!
//! Replies come from an ordered table of keyword rules over the candidate
//! collection. The first rule that produces a reply wins; a rule may decline
//! (name lookup with no hit, follow-up with an empty collection) and let the
//! next one try. Nothing here mutates candidates.

use chrono::{DateTime, Local, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::dashboard::{StatusCounts, needs_attention};
use crate::models::Candidate;

pub const GREETING: &str = "Hello! I'm your VertexHire AI assistant. I can help you with:\n\n\
• Candidate status updates and tracking\n\
• Quick insights about your pipeline\n\
• Finding specific candidates\n\
• Generating follow-up messages\n\
• Scheduling recommendations\n\n\
How can I assist you today?";

pub const UPDATE_INSTRUCTIONS: &str = "I can help update a candidate's status. Please tell me:\n\
1. The candidate's name\n\
2. Their new status (new, screening, interview, offer, hired, or rejected)\n\n\
For example: 'Update Sarah Johnson to interview status'";

pub const ALL_CAUGHT_UP: &str =
    "Great job! All your active candidates have been contacted recently. Your pipeline is looking healthy!";

pub const SKILL_SEARCH_HINTS: &str = "I can help you find candidates with specific skills. For example, try:\n\
• 'Show me candidates with React skills'\n\
• 'Find developers with TypeScript experience'\n\
• 'Who knows Python?'";

pub const CAPABILITIES: &str = "I can assist you with:\n\n\
📊 **Pipeline Insights**\n\
• 'Show me the pipeline status'\n\
• 'How many candidates are in interview?'\n\n\
👤 **Candidate Management**\n\
• 'Find Sarah Johnson'\n\
• 'Update John to interview status'\n\n\
✉️ **Communication**\n\
• 'Generate a follow-up email'\n\
• 'Create a rejection message'\n\n\
💡 **Recommendations**\n\
• 'Who should I contact today?'\n\
• 'Any candidates need attention?'\n\n\
What would you like to do?";

pub const FALLBACK: &str = "I'm here to help! You can ask me about:\n\
• Candidate pipeline status\n\
• Specific candidate information\n\
• Updating candidate statuses\n\
• Generating follow-up messages\n\
• Recommendations on who to contact\n\n\
Try asking something like 'Show me the pipeline status' or 'Who needs follow-up?'";

pub const RECOMMEND_LIMIT: usize = 3;

static NAME_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:about|find|show|update|status of) (.+?)(?:\?|$)").expect("name query pattern is valid")
});

/// What a rule sees: the lower-cased query, the collection and "now".
pub struct Query<'a> {
    pub lower: String,
    pub candidates: &'a [Candidate],
    pub now: DateTime<Utc>,
}

impl Query<'_> {
    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lower.contains(n))
    }
}

pub struct Rule {
    pub name: &'static str,
    pub reply: fn(&Query) -> Option<String>,
}

/// Evaluated top to bottom; first `Some` wins.
pub const RULES: &[Rule] = &[
    Rule { name: "pipeline_status", reply: pipeline_status },
    Rule { name: "candidate_lookup", reply: candidate_lookup },
    Rule { name: "update_instructions", reply: update_instructions },
    Rule { name: "follow_up_email", reply: follow_up_email },
    Rule { name: "recommendations", reply: recommendations },
    Rule { name: "skill_search", reply: skill_search },
    Rule { name: "help", reply: help },
];

pub fn respond(query: &str, candidates: &[Candidate]) -> String {
    respond_at(query, candidates, Utc::now())
}

pub fn respond_at(query: &str, candidates: &[Candidate], now: DateTime<Utc>) -> String {
    let query = Query {
        lower: query.to_lowercase(),
        candidates,
        now,
    };
    RULES
        .iter()
        .find_map(|rule| {
            let reply = (rule.reply)(&query)?;
            tracing::debug!(rule = rule.name, "assistant rule matched");
            Some(reply)
        })
        .unwrap_or_else(|| FALLBACK.to_string())
}

fn pipeline_status(q: &Query) -> Option<String> {
    if !q.contains_any(&["status", "pipeline"]) {
        return None;
    }
    let s = StatusCounts::of(q.candidates);
    Some(format!(
        "Here's your current pipeline status:\n\n\
         • Total Candidates: {}\n\
         • New Applications: {}\n\
         • In Screening: {}\n\
         • In Interview: {}\n\
         • Offers Extended: {}\n\
         • Hired: {}\n\n\
         Would you like me to help with any specific candidate updates?",
        s.total, s.new, s.screening, s.interview, s.offer, s.hired
    ))
}

fn candidate_lookup(q: &Query) -> Option<String> {
    let caps = NAME_QUERY.captures(&q.lower)?;
    let fragment = caps.get(1)?.as_str().trim();
    let c = q
        .candidates
        .iter()
        .find(|c| c.name.to_lowercase().contains(fragment))?;

    let notes = if c.notes.is_empty() {
        String::new()
    } else {
        format!("\nNotes: {}", c.notes)
    };
    Some(format!(
        "I found {}:\n\n\
         • Position: {}\n\
         • Status: {}\n\
         • Experience: {}\n\
         • Skills: {}\n\
         • Email: {}\n\
         • Phone: {}\n\
         {}\n\n\
         Would you like to update their status or send a follow-up message?",
        c.name,
        c.position,
        c.status,
        c.experience,
        c.skills.join(", "),
        c.email,
        c.phone,
        notes
    ))
}

fn update_instructions(q: &Query) -> Option<String> {
    q.contains_any(&["update", "move", "change status"])
        .then(|| UPDATE_INSTRUCTIONS.to_string())
}

fn follow_up_email(q: &Query) -> Option<String> {
    if !q.contains_any(&["follow up", "email", "message"]) {
        return None;
    }
    let c = q.candidates.first()?;
    let strengths: Vec<&str> = c.skills.iter().take(2).map(String::as_str).collect();
    Some(format!(
        "Here's a suggested follow-up email template:\n\n\
         ---\n\
         Subject: Following up on your {position} application\n\n\
         Dear {first},\n\n\
         Thank you for your interest in the {position} role. We've reviewed your application \
         and are impressed with your background in {strengths}.\n\n\
         I'd like to schedule a brief call to discuss the opportunity in more detail. \
         Would you be available this week for a 30-minute conversation?\n\n\
         Looking forward to connecting!\n\n\
         Best regards,\n\
         VertexHire Team\n\
         ---\n\n\
         Would you like me to customize this for a specific candidate?",
        position = c.position,
        first = c.first_name(),
        strengths = strengths.join(" and "),
    ))
}

fn recommendations(q: &Query) -> Option<String> {
    if !q.contains_any(&["recommend", "suggest", "should i"]) {
        return None;
    }
    let pending = needs_attention(q.candidates, q.now);
    if pending.is_empty() {
        return Some(ALL_CAUGHT_UP.to_string());
    }
    let bullets: Vec<String> = pending
        .iter()
        .take(RECOMMEND_LIMIT)
        .map(|c| format!("• {} ({}) - {} status, no recent contact", c.name, c.position, c.status))
        .collect();
    Some(format!(
        "I recommend following up with these candidates:\n\n{}\n\n\
         Would you like me to generate follow-up messages for any of them?",
        bullets.join("\n")
    ))
}

fn skill_search(q: &Query) -> Option<String> {
    q.contains_any(&["skill", "experience"])
        .then(|| SKILL_SEARCH_HINTS.to_string())
}

fn help(q: &Query) -> Option<String> {
    q.contains_any(&["help", "what can you"])
        .then(|| CAPABILITIES.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Local wall-clock time, `HH:MM`.
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Chat transcript with at most one reply in flight.
///
/// A sent query is answered immediately but the reply is held back until
/// `reply_delay` has elapsed, which is when [`Conversation::deliver_due`]
/// releases it.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: Option<Message>,
    next_id: u64,
    reply_delay: chrono::Duration,
}

impl Conversation {
    pub fn new(reply_delay: chrono::Duration, now: DateTime<Utc>) -> Self {
        Self {
            messages: vec![Message {
                id: 1,
                role: Role::Agent,
                content: GREETING.to_string(),
                timestamp: now,
            }],
            pending: None,
            next_id: 2,
            reply_delay,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    /// Queues a reply for `input`. Blank input, or input sent while a reply
    /// is still pending, is ignored and returns `false`.
    pub fn send(&mut self, input: &str, candidates: &[Candidate], now: DateTime<Utc>) -> bool {
        if input.trim().is_empty() || self.pending.is_some() {
            return false;
        }
        let user = self.message(Role::User, input.to_string(), now);
        self.messages.push(user);

        let reply = respond_at(input, candidates, now);
        self.pending = Some(self.message(Role::Agent, reply, now + self.reply_delay));
        true
    }

    /// Moves the pending reply into the transcript once its time has come.
    pub fn deliver_due(&mut self, now: DateTime<Utc>) -> bool {
        match &self.pending {
            Some(reply) if reply.timestamp <= now => {
                if let Some(reply) = self.pending.take() {
                    self.messages.push(reply);
                }
                true
            }
            _ => false,
        }
    }

    fn message(&mut self, role: Role, content: String, timestamp: DateTime<Utc>) -> Message {
        let id = self.next_id;
        self.next_id += 1;
        Message {
            id,
            role,
            content,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use crate::store::seed_candidates;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_pipeline_status_counts() {
        let seeds = seed_candidates(now());
        let reply = respond_at("Show me the pipeline status", &seeds, now());
        assert!(reply.contains("• Total Candidates: 3"));
        assert!(reply.contains("• New Applications: 1"));
        assert!(reply.contains("• In Screening: 1"));
        assert!(reply.contains("• In Interview: 1"));
        assert!(reply.contains("• Offers Extended: 0"));
        assert!(reply.contains("• Hired: 0"));
    }

    #[test]
    fn test_find_candidate_by_name() {
        let seeds = seed_candidates(now());
        let reply = respond_at("Find Sarah Johnson", &seeds, now());
        assert!(reply.starts_with("I found Sarah Johnson:"));
        assert!(reply.contains("• Position: Senior Software Engineer"));
        assert!(reply.contains("• Status: interview"));
        assert!(reply.contains("• Experience: 7 years"));
        assert!(reply.contains("• Skills: React, Node.js, TypeScript, AWS"));
        assert!(reply.contains("• Email: sarah.j@email.com"));
        assert!(reply.contains("• Phone: +1-555-0123"));
        assert!(reply.contains("Notes: Strong technical background"));
    }

    #[test]
    fn test_lookup_matches_fragment_with_question_mark() {
        let seeds = seed_candidates(now());
        let reply = respond_at("What do you know about emily?", &seeds, now());
        assert!(reply.starts_with("I found Emily Rodriguez:"));
    }

    #[test]
    fn test_lookup_omits_empty_notes() {
        let mut seeds = seed_candidates(now());
        seeds[1].notes.clear();
        let reply = respond_at("show michael", &seeds, now());
        assert!(reply.starts_with("I found Michael Chen:"));
        assert!(!reply.contains("Notes:"));
    }

    #[test]
    fn test_lookup_miss_falls_through() {
        let seeds = seed_candidates(now());
        // "update" pattern with no such name reaches the update rule
        assert_eq!(respond_at("update Zed", &seeds, now()), UPDATE_INSTRUCTIONS);
        // "show" with no hit reaches the skill rule
        assert_eq!(
            respond_at("show me candidates with react skills", &seeds, now()),
            SKILL_SEARCH_HINTS
        );
        // and finally the fallback
        assert_eq!(respond_at("tell me about nobody", &seeds, now()), FALLBACK);
    }

    #[test]
    fn test_status_rule_shadows_lookup() {
        let seeds = seed_candidates(now());
        let reply = respond_at("status of Sarah", &seeds, now());
        assert!(reply.starts_with("Here's your current pipeline status"));
    }

    #[test]
    fn test_follow_up_email_uses_first_candidate() {
        let seeds = seed_candidates(now());
        let reply = respond_at("Draft a follow up", &seeds, now());
        assert!(reply.contains("Subject: Following up on your Senior Software Engineer application"));
        assert!(reply.contains("Dear Sarah,"));
        assert!(reply.contains("background in React and Node.js."));
    }

    #[test]
    fn test_follow_up_with_empty_collection_falls_through() {
        assert_eq!(respond_at("write an email", &[], now()), FALLBACK);
    }

    #[test]
    fn test_recommendations_all_caught_up() {
        let mut seeds = seed_candidates(now());
        seeds[2].last_contact = Some(now());
        let reply = respond_at("Who should I contact today?", &seeds, now());
        assert_eq!(reply, ALL_CAUGHT_UP);
        assert_eq!(respond_at("Who should I contact today?", &[], now()), ALL_CAUGHT_UP);
    }

    #[test]
    fn test_recommendations_capped_at_three() {
        let mut list = seed_candidates(now());
        for c in list.iter_mut() {
            c.last_contact = None;
        }
        let mut extra = list[0].clone();
        extra.id = "4".to_string();
        extra.name = "Dana Lee".to_string();
        extra.status = Status::Offer;
        list.push(extra);

        let reply = respond_at("any suggestions?", &list, now());
        assert!(reply.starts_with("I recommend following up with these candidates:"));
        assert!(reply.contains("• Sarah Johnson (Senior Software Engineer) - interview status, no recent contact"));
        assert!(reply.contains("• Emily Rodriguez (UX Designer) - new status"));
        assert!(!reply.contains("Dana Lee"));
    }

    #[test]
    fn test_fixed_replies() {
        let seeds = seed_candidates(now());
        assert_eq!(respond_at("xyz123", &seeds, now()), FALLBACK);
        assert_eq!(respond_at("HELP", &seeds, now()), CAPABILITIES);
        assert_eq!(respond_at("what can you do", &seeds, now()), CAPABILITIES);
        assert_eq!(respond_at("years of experience", &seeds, now()), SKILL_SEARCH_HINTS);
        assert_eq!(respond_at("move her along", &seeds, now()), UPDATE_INSTRUCTIONS);
    }

    #[test]
    fn test_responder_does_not_mutate() {
        let seeds = seed_candidates(now());
        let before = seeds.clone();
        for q in ["update Sarah Johnson to hired", "change status", "recommend"] {
            respond_at(q, &seeds, now());
        }
        assert_eq!(seeds, before);
    }

    #[test]
    fn test_conversation_holds_reply_until_delay() {
        let seeds = seed_candidates(now());
        let mut chat = Conversation::new(Duration::milliseconds(1000), now());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].content, GREETING);

        assert!(!chat.send("   ", &seeds, now()));
        assert!(chat.send("xyz123", &seeds, now()));
        assert!(chat.is_typing());
        assert!(!chat.send("help", &seeds, now()), "second send while typing");

        assert!(!chat.deliver_due(now() + Duration::milliseconds(999)));
        assert_eq!(chat.messages().len(), 2);

        assert!(chat.deliver_due(now() + Duration::milliseconds(1000)));
        assert!(!chat.is_typing());
        let last = chat.messages().last().unwrap();
        assert_eq!(last.role, Role::Agent);
        assert_eq!(last.content, FALLBACK);

        let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
