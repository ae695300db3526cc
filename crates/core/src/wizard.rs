//! The onboarding wizard state machine.
//!
//! Step 0 is the login step; steps `1..=N` each collect the fields of one
//! page definition. A session ends in one of two terminal states:
//! `Completed` after an explicit submit, or `AlreadySubmitted` when the user
//! logs in with a submission that was finalized earlier. Nothing is written
//! once a session is terminal.
//!
//! Every gateway failure is logged and leaves the wizard exactly as it was.

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::gateway::{PageStore, SubmissionStore};
use crate::page::{FieldType, PageDefinition};
use crate::session::SessionId;
use crate::submission::{Answer, Answers, StepKey, Submission, EMAIL_FIELD, PASSWORD_FIELD};
use crate::types::{FieldId, PageId};

/// Prompt recorded with the login email.
pub const EMAIL_PLACEHOLDER: &str = "Email";

/// Prompt recorded with the login password.
pub const PASSWORD_PLACEHOLDER: &str = "Password";

// ---------------------------------------------------------------------------
// Phases and actions
// ---------------------------------------------------------------------------

/// Where a wizard session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum WizardPhase {
    LoggedOut,
    Step(usize),
    Completed,
    AlreadySubmitted,
}

impl WizardPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::AlreadySubmitted)
    }
}

/// The forward action offered on the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryAction {
    Next,
    Submit,
}

impl PrimaryAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Submit => "Submit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Completed,
    AlreadySubmitted,
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// One user's pass through the onboarding pages.
#[derive(Debug, Clone)]
pub struct Wizard {
    pages: Vec<PageDefinition>,
    page_ids: Vec<PageId>,
    active_step: usize,
    answers: Answers,
    session: Option<SessionId>,
    terminal: Option<Terminal>,
}

impl Wizard {
    /// Start a wizard over persisted pages, logged out at step 0.
    pub fn new(pages: Vec<PageDefinition>) -> Result<Self, CoreError> {
        let page_ids = pages
            .iter()
            .map(|p| {
                p.id.clone().ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Page '{}' has not been saved and cannot be shown",
                        p.heading
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pages,
            page_ids,
            active_step: 0,
            answers: Answers::new(),
            session: None,
            terminal: None,
        })
    }

    /// Load the current page definitions and start a wizard over them.
    pub async fn load(store: &dyn PageStore) -> Result<Self, CoreError> {
        let pages = store.list_pages().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load pages for wizard");
            e
        })?;
        Self::new(pages)
    }

    // -- accessors --

    /// Number of page steps (N). The login step is not counted.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn pages(&self) -> &[PageDefinition] {
        &self.pages
    }

    /// The page shown on the active step, if it is a page step.
    pub fn current_page(&self) -> Option<&PageDefinition> {
        if self.is_terminal() || self.active_step == 0 {
            return None;
        }
        self.pages.get(self.active_step - 1)
    }

    pub fn phase(&self) -> WizardPhase {
        match self.terminal {
            Some(Terminal::Completed) => WizardPhase::Completed,
            Some(Terminal::AlreadySubmitted) => WizardPhase::AlreadySubmitted,
            None if self.active_step == 0 => WizardPhase::LoggedOut,
            None => WizardPhase::Step(self.active_step),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// `None` once the active step no longer maps to a page.
    fn current_step_key(&self) -> Option<StepKey> {
        match self.active_step {
            0 => Some(StepKey::Login),
            step => self.page_ids.get(step - 1).cloned().map(StepKey::Page),
        }
    }

    fn value(&self, step: &StepKey, field: &str) -> Option<&str> {
        self.answers
            .get(step)
            .and_then(|fields| fields.get(&FieldId::from(field)))
            .map(|a| a.value.as_str())
    }

    // -- gates --

    /// Whether every field of the active step has been answered.
    ///
    /// On the login step both email and password must be non-blank. On a
    /// page step every field of that page needs a non-empty value.
    pub fn is_current_step_valid(&self) -> bool {
        if self.active_step == 0 {
            let filled = |field: &str| {
                self.value(&StepKey::Login, field)
                    .is_some_and(|v| !v.trim().is_empty())
            };
            return filled(EMAIL_FIELD) && filled(PASSWORD_FIELD);
        }

        let (Some(page), Some(key)) =
            (self.pages.get(self.active_step - 1), self.current_step_key())
        else {
            return false;
        };
        page.inputs.iter().all(|field| {
            self.value(&key, field.input_id.as_str())
                .is_some_and(|v| !v.is_empty())
        })
    }

    /// `Submit` on the last page, or on the login step when there are no
    /// pages at all; `Next` everywhere else.
    pub fn primary_action(&self) -> PrimaryAction {
        if self.active_step < self.page_count() {
            PrimaryAction::Next
        } else {
            PrimaryAction::Submit
        }
    }

    /// Whether the primary action is enabled.
    pub fn can_advance(&self) -> bool {
        !self.is_terminal() && self.is_current_step_valid()
    }

    pub fn can_go_back(&self) -> bool {
        !self.is_terminal() && self.active_step > 0
    }

    // -- answers --

    /// Record an answer for a field on the active step.
    ///
    /// Date fields are normalized to an RFC 3339 UTC timestamp; a value that
    /// is not a date is stored as the empty string.
    pub fn set_answer(&mut self, field: &FieldId, value: &str) -> Result<(), CoreError> {
        if self.is_terminal() {
            return Err(CoreError::Validation(
                "Answers cannot be changed after submission".to_string(),
            ));
        }

        let key = self.current_step_key().ok_or_else(|| {
            CoreError::Validation(format!("Step {} has no fields", self.active_step))
        })?;
        let answer = if self.active_step == 0 {
            let placeholder = match field.as_str() {
                EMAIL_FIELD => EMAIL_PLACEHOLDER,
                PASSWORD_FIELD => PASSWORD_PLACEHOLDER,
                other => {
                    return Err(CoreError::Validation(format!(
                        "Unknown login field '{other}'"
                    )))
                }
            };
            Answer {
                placeholder: placeholder.to_string(),
                value: value.to_string(),
            }
        } else {
            let spec = self
                .current_page()
                .and_then(|page| page.field(field))
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Field '{field}' is not on step {}",
                        self.active_step
                    ))
                })?;
            let value = match spec.field_type {
                Some(FieldType::Date) => normalize_date(value),
                _ => value.to_string(),
            };
            Answer {
                placeholder: spec.placeholder.clone(),
                value,
            }
        };

        self.answers
            .entry(key)
            .or_default()
            .insert(field.clone(), answer);
        Ok(())
    }

    /// Convenience for filling the login step.
    pub fn set_credentials(&mut self, email: &str, password: &str) -> Result<(), CoreError> {
        self.set_answer(&FieldId::from(EMAIL_FIELD), email)?;
        self.set_answer(&FieldId::from(PASSWORD_FIELD), password)
    }

    // -- transitions --

    /// Advance one step.
    ///
    /// On the login step this derives the session, loads any earlier
    /// submission and resumes from it. On a page step it saves a draft with
    /// `last_saved` set to the step being left. Calls on a terminal session
    /// are no-ops.
    pub async fn next(&mut self, store: &dyn SubmissionStore) -> Result<WizardPhase, CoreError> {
        if self.is_terminal() {
            tracing::debug!(phase = ?self.phase(), "Ignoring next on finished wizard");
            return Ok(self.phase());
        }
        if self.primary_action() == PrimaryAction::Submit {
            return Err(CoreError::Validation(
                "This is the final step; submit instead".to_string(),
            ));
        }
        self.ensure_current_step_valid()?;

        if self.active_step == 0 {
            return self.login(store).await;
        }

        let step = self.active_step;
        let draft = self.snapshot(Some(step as u32), false);
        self.persist(store, &draft).await?;
        self.active_step = step + 1;

        tracing::info!(
            session_id = ?self.session.as_ref().map(SessionId::as_str),
            from_step = step,
            to_step = self.active_step,
            "Wizard draft saved"
        );
        Ok(self.phase())
    }

    /// Finalize the submission from the last step.
    ///
    /// With no pages defined this also performs the login. Calls on a
    /// terminal session are no-ops.
    pub async fn submit(&mut self, store: &dyn SubmissionStore) -> Result<WizardPhase, CoreError> {
        if self.is_terminal() {
            tracing::debug!(phase = ?self.phase(), "Ignoring submit on finished wizard");
            return Ok(self.phase());
        }
        if self.primary_action() != PrimaryAction::Submit {
            return Err(CoreError::Validation(
                "Submit is only available on the final step".to_string(),
            ));
        }
        self.ensure_current_step_valid()?;

        if self.active_step == 0 {
            // Login and the final write take effect together or not at all.
            let mut staged = self.clone();
            staged.login(store).await?;
            if !staged.is_terminal() {
                staged.complete(store).await?;
            }
            *self = staged;
            return Ok(self.phase());
        }
        self.complete(store).await
    }

    /// Step back one page. Nothing is persisted.
    pub fn back(&mut self) -> Result<WizardPhase, CoreError> {
        if !self.can_go_back() {
            return Err(CoreError::Validation("Cannot go back from here".to_string()));
        }
        self.active_step -= 1;
        Ok(self.phase())
    }

    // -- internals --

    async fn complete(&mut self, store: &dyn SubmissionStore) -> Result<WizardPhase, CoreError> {
        let n = self.page_count();
        let final_doc = self.snapshot(Some(n as u32), true);
        self.persist(store, &final_doc).await?;
        self.terminal = Some(Terminal::Completed);
        self.active_step = n + 1;

        tracing::info!(
            session_id = ?self.session.as_ref().map(SessionId::as_str),
            pages = n,
            "Wizard submission completed"
        );
        Ok(self.phase())
    }

    fn ensure_current_step_valid(&self) -> Result<(), CoreError> {
        if self.is_current_step_valid() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Step {} has unanswered fields",
                self.active_step
            )))
        }
    }

    /// Derive the session from the login email and resume from any stored
    /// submission. State is only touched once the lookup succeeded.
    async fn login(&mut self, store: &dyn SubmissionStore) -> Result<WizardPhase, CoreError> {
        let email = self.value(&StepKey::Login, EMAIL_FIELD).unwrap_or_default();
        let session = SessionId::from_email(email);

        let existing = store.get_submission(&session).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch submission at login");
            e
        })?;

        let n = self.page_count();
        match existing {
            Some(stored) => {
                self.restore_answers(stored.answers);
                if stored.has_submitted {
                    self.terminal = Some(Terminal::AlreadySubmitted);
                    self.active_step = n + 1;
                } else {
                    let resume = stored.last_saved.unwrap_or(0) as usize + 1;
                    self.active_step = resume.min(n);
                }
            }
            None => {
                if n > 0 {
                    self.active_step = 1;
                }
            }
        }

        tracing::info!(
            session_id = %session,
            phase = ?self.phase(),
            "Wizard login"
        );
        self.session = Some(session);
        Ok(self.phase())
    }

    /// Take stored answers, keeping the login entries just typed.
    fn restore_answers(&mut self, stored: Answers) {
        let login = self.answers.remove(&StepKey::Login);
        self.answers = stored;
        if let Some(login) = login {
            self.answers.insert(StepKey::Login, login);
        }
    }

    /// Build the document to persist. The password never leaves memory.
    fn snapshot(&self, last_saved: Option<u32>, has_submitted: bool) -> Submission {
        let mut answers = self.answers.clone();
        if let Some(login) = answers.get_mut(&StepKey::Login) {
            login.remove(&FieldId::from(PASSWORD_FIELD));
        }
        Submission {
            answers,
            last_saved,
            has_submitted,
        }
    }

    async fn persist(
        &self,
        store: &dyn SubmissionStore,
        submission: &Submission,
    ) -> Result<(), CoreError> {
        let session = self.session.as_ref().ok_or_else(|| {
            CoreError::Internal("Wizard has no session to save under".to_string())
        })?;
        store.set_submission(session, submission).await.map_err(|e| {
            tracing::warn!(session_id = %session, error = %e, "Failed to save submission");
            CoreError::from(e)
        })
    }

    // -- presentation --

    /// A serializable snapshot of everything a wizard screen needs.
    pub fn view(&self) -> WizardView {
        let current_page = self.current_page().and_then(|page| {
            let id = self.page_ids.get(self.active_step - 1)?.clone();
            let key = StepKey::Page(id.clone());
            Some(PageView {
                id,
                heading: page.heading.clone(),
                fields: page
                    .inputs
                    .iter()
                    .map(|f| FieldView {
                        input_id: f.input_id.clone(),
                        field_type: f.field_type,
                        placeholder: f.placeholder.clone(),
                        value: self
                            .value(&key, f.input_id.as_str())
                            .unwrap_or_default()
                            .to_string(),
                    })
                    .collect(),
            })
        });

        WizardView {
            phase: self.phase(),
            active_step: self.active_step,
            step_count: self.page_count() + 1,
            primary_action: self.primary_action().label(),
            can_advance: self.can_advance(),
            can_go_back: self.can_go_back(),
            inputs_enabled: !self.is_terminal(),
            email: self
                .value(&StepKey::Login, EMAIL_FIELD)
                .unwrap_or_default()
                .to_string(),
            current_page,
        }
    }
}

/// Parse a date answer into an RFC 3339 UTC timestamp, or `""` when invalid.
///
/// Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as
/// midnight UTC).
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return ts
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub phase: WizardPhase,
    pub active_step: usize,
    /// Login step plus one step per page.
    pub step_count: usize,
    pub primary_action: &'static str,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub inputs_enabled: bool,
    pub email: String,
    pub current_page: Option<PageView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub id: PageId,
    pub heading: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub input_id: FieldId,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub placeholder: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
