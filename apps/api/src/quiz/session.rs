//! Quiz session state machine and the registry that owns live sessions.
//!
//! Phases: `loading -> ready -> submitting -> submitted`, with `loading -> error` when no
//! question set can be obtained. While `ready`, the user moves a cursor over the questions and
//! fills answer slots. A countdown runs alongside; when it reaches zero the session enters
//! `submitting` and is submitted after a short grace delay, answered or not.
//!
//! If the automatic submission keeps failing, the user gets the submit button back.
//! Finished sessions are forgotten after a retention period.
//!
//! Each session sits behind its own mutex so slow handoff writes only block that session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::handoff::{Handoff, HandoffError};
use crate::models::question::{Level, Question, QuestionType, TestKind};
use crate::models::result::SessionResult;
use crate::quiz::catalog::role_title;
use crate::quiz::format::{
    format_level, format_role, format_time, progress_percent, timer_blinking, timer_urgency,
    TimerUrgency,
};
use crate::quiz::scoring::{calculate_score, ScoreSummary};
use crate::quiz::validation::OPTIONS_PER_QUESTION;

pub const RESULT_ROUTE: &str = "/result";

const AUTO_SUBMIT_ATTEMPTS: u32 = 3;
const AUTO_SUBMIT_FAILED: &str = "Automatic submission failed. Please submit your test.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Ready,
    Error,
    Submitting,
    Submitted,
}

/// Result of pressing "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    /// The cursor was already on the last question.
    SubmitRequested,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u64),
    Expired,
    /// The session is no longer accepting answers; the countdown should stop.
    Inactive,
}

/// Who triggered a submission. The countdown must not abort itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrigin {
    User,
    Countdown,
}

#[derive(Debug)]
pub struct QuizSession {
    pub id: Uuid,
    pub client_id: Uuid,
    pub role: String,
    pub level: Level,
    pub test_type: TestKind,
    phase: SessionPhase,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    cursor: usize,
    remaining_secs: u64,
    time_up: bool,
    error: Option<String>,
    summary: Option<ScoreSummary>,
    countdown: Option<AbortHandle>,
    /// Set once the countdown has given up submitting; the user may then submit by hand.
    auto_submit_failed: bool,
}

impl QuizSession {
    pub fn new(
        client_id: Uuid,
        role: String,
        level: Level,
        test_type: TestKind,
        duration_secs: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            role,
            level,
            test_type,
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            answers: Vec::new(),
            cursor: 0,
            remaining_secs: duration_secs,
            time_up: false,
            error: None,
            summary: None,
            countdown: None,
            auto_submit_failed: false,
        }
    }

    /// `loading -> ready`. An empty question set is a failure.
    pub fn load(&mut self, questions: Vec<Question>) -> Result<(), AppError> {
        self.require(SessionPhase::Loading, "Questions have already been loaded")?;
        if questions.is_empty() {
            self.fail("No questions available");
            return Err(AppError::Conflict("No questions available".to_string()));
        }
        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.cursor = 0;
        self.phase = SessionPhase::Ready;
        Ok(())
    }

    /// `loading -> error`.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.phase == SessionPhase::Loading {
            self.phase = SessionPhase::Error;
            self.error = Some(message.into());
        }
    }

    /// Records (or overwrites) the answer for the current question.
    pub fn select_answer(&mut self, option: usize) -> Result<(), AppError> {
        if option >= OPTIONS_PER_QUESTION {
            return Err(AppError::Validation(format!(
                "Option must be between 0 and {}",
                OPTIONS_PER_QUESTION - 1
            )));
        }
        self.require_answerable()?;
        self.answers[self.cursor] = Some(option);
        Ok(())
    }

    pub fn next(&mut self) -> Result<Navigation, AppError> {
        self.require_answerable()?;
        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
            Ok(Navigation::Moved(self.cursor))
        } else {
            Ok(Navigation::SubmitRequested)
        }
    }

    pub fn previous(&mut self) -> Result<usize, AppError> {
        self.require_answerable()?;
        self.cursor = self.cursor.saturating_sub(1);
        Ok(self.cursor)
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.phase != SessionPhase::Ready {
            return Tick::Inactive;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.time_up = true;
            self.phase = SessionPhase::Submitting;
            Tick::Expired
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    /// Builds the session result without changing state, so a failed handoff write
    /// leaves the session submittable.
    pub fn build_result(&self, origin: SubmitOrigin) -> Result<SessionResult, AppError> {
        match (self.phase, origin) {
            (SessionPhase::Ready, _) | (SessionPhase::Submitting, SubmitOrigin::Countdown) => {}
            (SessionPhase::Submitting, SubmitOrigin::User) if self.auto_submit_failed => {}
            (SessionPhase::Submitting, SubmitOrigin::User) => {
                return Err(AppError::Conflict(
                    "Time is up; the test is being submitted automatically".to_string(),
                ))
            }
            (SessionPhase::Submitted, _) => {
                return Err(AppError::Conflict("Test has already been submitted".to_string()))
            }
            (SessionPhase::Loading, _) | (SessionPhase::Error, _) => {
                return Err(AppError::Conflict("Test is not ready".to_string()))
            }
        }

        let summary = calculate_score(&self.questions, &self.answers);
        Ok(SessionResult::new(
            summary,
            self.role.clone(),
            self.level,
            self.test_type,
            self.questions.clone(),
            self.answers.clone(),
        ))
    }

    /// `ready|submitting -> submitted`. Answers are final from here on.
    pub fn mark_submitted(&mut self, summary: ScoreSummary, origin: SubmitOrigin) {
        self.phase = SessionPhase::Submitted;
        self.summary = Some(summary);
        self.error = None;
        if let Some(handle) = self.countdown.take() {
            if origin == SubmitOrigin::User {
                handle.abort();
            }
        }
    }

    /// Hands a timed-out submission back to the user after the countdown gave up.
    fn release_submission(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.auto_submit_failed = true;
            self.error = Some(AUTO_SUBMIT_FAILED.to_string());
        }
    }

    fn set_countdown(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.countdown.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }

    fn require(&self, phase: SessionPhase, message: &str) -> Result<(), AppError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(AppError::Conflict(message.to_string()))
        }
    }

    fn require_answerable(&self) -> Result<(), AppError> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            SessionPhase::Submitting => Err(AppError::Conflict(
                "Time is up; answers can no longer be changed".to_string(),
            )),
            SessionPhase::Submitted => {
                Err(AppError::Conflict("Test has already been submitted".to_string()))
            }
            SessionPhase::Loading | SessionPhase::Error => {
                Err(AppError::Conflict("Test is not ready".to_string()))
            }
        }
    }

    fn title(&self) -> String {
        match self.test_type {
            TestKind::Custom => "Custom Test".to_string(),
            _ => {
                let role = role_title(&self.role)
                    .map(String::from)
                    .unwrap_or_else(|| format_role(&self.role));
                format!("{role} Assessment")
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let total = self.questions.len();
        let current_question = self.questions.get(self.cursor).map(|q| QuestionView {
            number: self.cursor + 1,
            question: q.question.clone(),
            options: q.options.clone(),
            code_snippet: q.code_snippet.clone(),
            kind: if q.code_snippet.is_some() {
                QuestionType::Coding
            } else {
                QuestionType::MultipleChoice
            },
        });

        SessionView {
            id: self.id,
            phase: self.phase,
            title: self.title(),
            role: self.role.clone(),
            level: self.level,
            level_label: format_level(self.level.as_str()),
            test_type: self.test_type,
            current_index: self.cursor,
            total,
            is_last: total > 0 && self.cursor + 1 == total,
            current_question,
            selected: self.answers.get(self.cursor).copied().flatten(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
            progress: ProgressView {
                current: self.cursor,
                total,
                percent: progress_percent(self.cursor, total),
            },
            timer: TimerView {
                remaining_secs: self.remaining_secs,
                display: format_time(self.remaining_secs),
                urgency: timer_urgency(self.remaining_secs),
                blinking: timer_blinking(self.remaining_secs),
                time_up: self.time_up,
            },
            error: self.error.clone(),
            result: self.summary,
        }
    }
}

/// A question as shown while the test is running. The correct answer is withheld.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub question: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub code_snippet: Option<String>,
    pub kind: QuestionType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub current: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub remaining_secs: u64,
    pub display: String,
    pub urgency: TimerUrgency,
    pub blinking: bool,
    pub time_up: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: SessionPhase,
    pub title: String,
    pub role: String,
    pub level: Level,
    pub level_label: String,
    pub test_type: TestKind,
    pub current_index: usize,
    pub total: usize,
    pub is_last: bool,
    pub current_question: Option<QuestionView>,
    pub selected: Option<usize>,
    pub answered: usize,
    pub progress: ProgressView,
    pub timer: TimerView,
    pub error: Option<String>,
    pub result: Option<ScoreSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub summary: ScoreSummary,
    pub redirect: &'static str,
}

/// Outcome of "Next": either the next question, or a submission when leaving the last one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Step {
    Moved(SessionView),
    Submitted(SubmissionOutcome),
}

#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    pub duration: Duration,
    pub grace: Duration,
    /// How long a finished session stays queryable before it is forgotten.
    pub retention: Duration,
}

/// Owns every live quiz session. Cheap to clone.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<QuizSession>>>>>,
    handoff: Handoff,
    timer: TimerConfig,
}

impl SessionRegistry {
    pub fn new(handoff: Handoff, timer: TimerConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            handoff,
            timer,
        }
    }

    /// Registers a new session in `loading`.
    pub async fn create(
        &self,
        client_id: Uuid,
        role: String,
        level: Level,
        test_type: TestKind,
    ) -> Uuid {
        let session = QuizSession::new(client_id, role, level, test_type, self.timer.duration.as_secs());
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        info!("Session {id} created for client {client_id}");
        id
    }

    /// `loading -> ready`, starting the countdown.
    pub async fn mark_ready(&self, id: Uuid, questions: Vec<Question>) -> Result<SessionView, AppError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.load(questions)?;

        let registry = self.clone();
        let grace = self.timer.grace;
        let handle = tokio::spawn(async move { registry.run_countdown(id, grace).await });
        session.set_countdown(handle.abort_handle());

        info!("Session {id} ready with {} questions", session.questions.len());
        Ok(session.view())
    }

    /// `loading -> error`. The error state is terminal and the caller reports it in the
    /// response, so the session is dropped right away.
    pub async fn mark_failed(&self, id: Uuid, message: &str) -> Result<(), AppError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        let mut session = session.lock().await;
        session.fail(message);
        warn!("Session {id} failed to load: {message}");
        Ok(())
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, AppError> {
        let session = self.get(id).await?;
        let view = session.lock().await.view();
        Ok(view)
    }

    pub async fn select_answer(&self, id: Uuid, option: usize) -> Result<SessionView, AppError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.select_answer(option)?;
        Ok(session.view())
    }

    pub async fn previous(&self, id: Uuid) -> Result<SessionView, AppError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.previous()?;
        Ok(session.view())
    }

    pub async fn next(&self, id: Uuid) -> Result<Step, AppError> {
        let session = self.get(id).await?;
        {
            let mut session = session.lock().await;
            if let Navigation::Moved(_) = session.next()? {
                return Ok(Step::Moved(session.view()));
            }
        }
        let outcome = self.submit_with(id, SubmitOrigin::User).await?;
        Ok(Step::Submitted(outcome))
    }

    pub async fn submit(&self, id: Uuid) -> Result<SubmissionOutcome, AppError> {
        self.submit_with(id, SubmitOrigin::User).await
    }

    /// Scores the session, stores the result for the result view, and marks it submitted.
    async fn submit_with(&self, id: Uuid, origin: SubmitOrigin) -> Result<SubmissionOutcome, AppError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;

        let result = session.build_result(origin)?;
        let summary = result.summary();

        self.handoff
            .write_test_results(session.client_id, &result)
            .await
            .map_err(|e| match e {
                HandoffError::AlreadyWritten(_) => AppError::Conflict(
                    "Results from another test are already stored for this client".to_string(),
                ),
                other => AppError::Handoff(other),
            })?;

        session.mark_submitted(summary, origin);
        drop(session);
        self.schedule_eviction(id);
        info!(
            "Session {id} submitted: {}/{} correct ({}%)",
            summary.correct, summary.total, summary.score
        );

        Ok(SubmissionOutcome {
            session_id: id,
            summary,
            redirect: RESULT_ROUTE,
        })
    }

    /// Tears a session down, cancelling its countdown.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.lock().await.cancel_countdown();
        info!("Session {id} closed");
        Ok(())
    }

    /// Forgets a finished session once its retention period has passed. Every session that
    /// reaches the countdown ends up here, so the registry does not grow without bound.
    fn schedule_eviction(&self, id: Uuid) {
        let registry = self.clone();
        let retention = self.timer.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            let removed = registry.sessions.write().await.remove(&id);
            if let Some(session) = removed {
                session.lock().await.cancel_countdown();
                debug!("Session {id} evicted");
            }
        });
    }

    async fn get(&self, id: Uuid) -> Result<Arc<Mutex<QuizSession>>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// One-second countdown. Exits as soon as the session is gone or stops accepting answers.
    async fn run_countdown(&self, id: Uuid, grace: Duration) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Ok(session) = self.get(id).await else {
                return;
            };
            let tick = session.lock().await.tick();
            match tick {
                Tick::Running(_) => continue,
                Tick::Expired => break,
                Tick::Inactive => return,
            }
        }

        warn!(
            "Time is up for session {id}; submitting in {}s",
            grace.as_secs()
        );
        tokio::time::sleep(grace).await;

        for attempt in 0..AUTO_SUBMIT_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                tokio::time::sleep(delay).await;
            }
            match self.submit_with(id, SubmitOrigin::Countdown).await {
                Ok(_) => return,
                Err(AppError::Handoff(e)) => warn!(
                    "Automatic submission of session {id} failed (attempt {}/{AUTO_SUBMIT_ATTEMPTS}): {e}",
                    attempt + 1
                ),
                // Conflicts and missing sessions do not go away on retry.
                Err(e) => {
                    warn!("Automatic submission of session {id} failed: {e}");
                    break;
                }
            }
        }

        if let Ok(session) = self.get(id).await {
            session.lock().await.release_submission();
        }
        self.schedule_eviction(id);
    }
}
