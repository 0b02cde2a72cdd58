//! The linear questionnaire: six fixed prompts answered in order.
//!
//! A [`Session`] is the whole per-visitor context: login flag, cursor,
//! collected answers and the completion slot. It moves through two phases,
//! `Collecting` (cursor < 6) and `Complete` (cursor == 6), and returns to
//! the first prompt on [`Session::reset`].

use crate::completion::{CompletionOutcome, CompletionWarning, SUCCESS_MESSAGE};
use crate::error::{LeadbotError, Result};
use crate::gate::{AccessGate, GateDecision};
use crate::lead::{Field, LeadRecord};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: &'static str,
    pub field: Field,
}

pub const QUESTIONS: [Question; 6] = [
    Question {
        prompt: "What is your name?",
        field: Field::Name,
    },
    Question {
        prompt: "Which city are you looking to buy or rent in?",
        field: Field::City,
    },
    Question {
        prompt: "Are you looking to BUY or RENT?",
        field: Field::Intent,
    },
    Question {
        prompt: "What type of property are you interested in? (House, Plot, Flat, Commercial)",
        field: Field::Type,
    },
    Question {
        prompt: "What is your budget?",
        field: Field::Budget,
    },
    Question {
        prompt: "Please share your WhatsApp number:",
        field: Field::Phone,
    },
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Collecting,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Answer stored; `step` is the new cursor.
    Advanced { step: usize },
    /// Empty input; cursor unchanged.
    Ignored,
    /// Every question is already answered.
    AlreadyComplete,
}

/// A record handed out by [`Session::finalize`]. The generation ties the
/// eventual outcome back to this inquiry and no later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedLead {
    pub generation: u64,
    pub record: LeadRecord,
}

#[derive(Debug, Clone, Default)]
enum Completion {
    #[default]
    Pending,
    /// Record built; side effects in flight.
    Finalized(FinalizedLead),
    Recorded(CompletionOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    authenticated: bool,
    step: usize,
    answers: BTreeMap<Field, String>,
    completion: Completion,
    /// Bumped by every finalize and reset.
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn answers(&self) -> &BTreeMap<Field, String> {
        &self.answers
    }

    pub fn answer(&self, field: Field) -> Option<&str> {
        self.answers.get(&field).map(String::as_str)
    }

    pub fn phase(&self) -> Phase {
        if self.step < QUESTIONS.len() {
            Phase::Collecting
        } else {
            Phase::Complete
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        QUESTIONS.get(self.step)
    }

    /// Check `candidate` against the gate. Only an exact match logs the
    /// session in; a failed attempt never logs an already-authenticated
    /// session out.
    pub fn login(&mut self, gate: &AccessGate, candidate: &str) -> GateDecision {
        let decision = gate.check(candidate);
        if decision == GateDecision::Accepted {
            self.authenticated = true;
        }
        decision
    }

    pub fn submit_answer(&mut self, value: &str) -> Result<Submission> {
        if !self.authenticated {
            return Err(LeadbotError::NotAuthenticated);
        }
        let Some(question) = self.current_question() else {
            return Ok(Submission::AlreadyComplete);
        };
        if value.is_empty() {
            return Ok(Submission::Ignored);
        }
        self.answers.insert(question.field, value.to_string());
        self.step += 1;
        Ok(Submission::Advanced { step: self.step })
    }

    /// Build the final record the first time the session is complete.
    /// Returns `None` while collecting and on every later call, so the
    /// store and webhook side effects run once per completed inquiry.
    pub fn finalize<Tz>(&mut self, now: DateTime<Tz>) -> Option<FinalizedLead>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if self.phase() != Phase::Complete || !matches!(self.completion, Completion::Pending) {
            return None;
        }
        self.generation += 1;
        let finalized = FinalizedLead {
            generation: self.generation,
            record: LeadRecord::from_answers(&self.answers, now),
        };
        self.completion = Completion::Finalized(finalized.clone());
        Some(finalized)
    }

    /// Attach the side-effect outcome to the finalization it was produced
    /// for. Ignored (returns false) if the session was reset in the
    /// meantime, even when a later inquiry carries identical answers.
    pub fn record_outcome(&mut self, generation: u64, outcome: CompletionOutcome) -> bool {
        match &self.completion {
            Completion::Finalized(pending) if pending.generation == generation => {
                self.completion = Completion::Recorded(outcome);
                true
            }
            _ => false,
        }
    }

    pub fn outcome(&self) -> Option<&CompletionOutcome> {
        match &self.completion {
            Completion::Recorded(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn lead(&self) -> Option<&LeadRecord> {
        match &self.completion {
            Completion::Pending => None,
            Completion::Finalized(pending) => Some(&pending.record),
            Completion::Recorded(outcome) => Some(&outcome.record),
        }
    }

    /// "Start New Inquiry": back to the first prompt with no answers.
    pub fn reset(&mut self, keep_login: bool) {
        let authenticated = keep_login && self.authenticated;
        *self = Self {
            authenticated,
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    pub fn view(&self) -> SessionView {
        if !self.authenticated {
            return SessionView {
                authenticated: false,
                phase: self.phase(),
                step: 0,
                total: QUESTIONS.len(),
                question: None,
                answers: BTreeMap::new(),
                lead: None,
                warnings: Vec::new(),
                message: None,
            };
        }
        let complete = self.phase() == Phase::Complete;
        SessionView {
            authenticated: true,
            phase: self.phase(),
            step: self.step,
            total: QUESTIONS.len(),
            question: self.current_question().copied(),
            answers: self.answers.clone(),
            lead: self.lead().cloned(),
            warnings: self
                .outcome()
                .map(|o| o.warnings.clone())
                .unwrap_or_default(),
            message: complete.then(|| SUCCESS_MESSAGE.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// What the page renders for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub phase: Phase,
    pub step: usize,
    pub total: usize,
    pub question: Option<Question>,
    pub answers: BTreeMap<Field, String>,
    pub lead: Option<LeadRecord>,
    pub warnings: Vec<CompletionWarning>,
    pub message: Option<String>,
}

impl SessionView {
    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(m) = message {
            self.message = Some(m.to_string());
        }
        self
    }
}
