//! Staff assignment editor state machine.
//!
//! # Responsibility
//! - Load the current assignments and the employee directory for one event.
//! - Route edits to the draft and guard saves behind local validation.
//! - Turn every save outcome into an observable state plus notice.
//!
//! # Invariants
//! - `Idle → Loading → Editing → Saving → {Success, Conflict, Error}`;
//!   `Conflict`/`Error` go back to `Editing`; `Success` and `Closed` are final.
//! - A save is only issued from `Editing`, so the draft was seeded from a
//!   completed load.
//! - At most one save per session is in flight.
//! - Results of a superseded session (closed editor) are discarded.
//! - A failed save never touches the draft or the loaded set.

mod state;

pub use state::{allowed_transitions, EditorState};

use crate::assignment::builder::{AssignmentDraft, BuilderError, DraftEntry};
use crate::assignment::classifier::{classify, Classification, ConflictKind};
use crate::assignment::validator::{validate, ValidationError};
use crate::model::assignment::{AssignedStaff, AssignmentSet};
use crate::model::employee::{Employee, StaffId};
use crate::model::event::EventId;
use crate::service::wire::PageRequest;
use crate::service::{AssignmentService, EmployeeDirectory, ServiceError, ServiceResult};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Rejected editor operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Operation is not available in the current state.
    InvalidState {
        operation: &'static str,
        state: EditorState,
    },
    /// A save is already in flight for this session.
    SaveInFlight,
    /// Submission failed local validation; nothing was sent.
    Validation(ValidationError),
    /// Draft mutation was rejected.
    Builder(BuilderError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while editor is {state}")
            }
            Self::SaveInFlight => write!(f, "a save is already in progress"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Builder(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Builder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuilderError> for EditorError {
    fn from(value: BuilderError) -> Self {
        Self::Builder(value)
    }
}

/// What the user should be shown after a rejected or failed save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Local validation failure; the server was not contacted.
    Validation,
    /// Server refused an empty staff list.
    EmptyList,
    /// Server reported a schedule overlap.
    TimeConflict,
    /// Any other failure; message is the server's text.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl EditorNotice {
    fn from_classification(classification: &Classification) -> Self {
        let kind = match classification.kind {
            ConflictKind::EmptyList => NoticeKind::EmptyList,
            ConflictKind::TimeConflict => NoticeKind::TimeConflict,
            ConflictKind::Unknown => NoticeKind::Failure,
        };
        Self {
            kind,
            message: classification.message.clone(),
        }
    }
}

/// Which load sources degraded to empty lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub assignments_degraded: bool,
    pub directory_degraded: bool,
}

/// Persistence call chosen for a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Replace,
}

/// Detached load work for one session.
pub struct LoadRequest<S, D> {
    session: u64,
    event_id: EventId,
    service: Arc<S>,
    directory: Arc<D>,
    first_page: PageRequest,
}

impl<S: AssignmentService, D: EmployeeDirectory> LoadRequest<S, D> {
    /// Fetches current assignments and the full directory concurrently.
    pub async fn run(self) -> LoadOutcome {
        let (assignments, directory) = tokio::join!(
            self.service.fetch_current(self.event_id),
            self.directory.list_all(&self.first_page)
        );
        LoadOutcome {
            session: self.session,
            assignments,
            directory,
        }
    }
}

/// Result of `LoadRequest::run`.
#[derive(Debug)]
pub struct LoadOutcome {
    session: u64,
    assignments: ServiceResult<Vec<AssignedStaff>>,
    directory: ServiceResult<Vec<Employee>>,
}

/// Detached save work for one session.
pub struct SaveRequest<S> {
    session: u64,
    mode: SaveMode,
    submission: AssignmentSet,
    service: Arc<S>,
}

impl<S: AssignmentService> SaveRequest<S> {
    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    pub fn submission(&self) -> &AssignmentSet {
        &self.submission
    }

    /// Sends the full set, then re-reads the event on success.
    pub async fn run(self) -> SaveOutcome {
        let event_id = self.submission.event_id();
        let written = match self.mode {
            SaveMode::Create => self.service.create(event_id, &self.submission).await,
            SaveMode::Replace => self.service.replace(event_id, &self.submission).await,
        };
        let result = match written {
            Ok(()) => SaveResult::Committed {
                refreshed: self.service.fetch_current(event_id).await,
            },
            Err(err) => SaveResult::Failed(err),
        };
        SaveOutcome {
            session: self.session,
            submission: self.submission,
            result,
        }
    }
}

#[derive(Debug)]
enum SaveResult {
    Committed {
        refreshed: ServiceResult<Vec<AssignedStaff>>,
    },
    Failed(ServiceError),
}

/// Result of `SaveRequest::run`.
#[derive(Debug)]
pub struct SaveOutcome {
    session: u64,
    submission: AssignmentSet,
    result: SaveResult,
}

/// Assignment editor for one event.
pub struct AssignmentEditor<S, D> {
    event_id: EventId,
    service: Arc<S>,
    directory: Arc<D>,
    first_page: PageRequest,
    state: EditorState,
    session: u64,
    draft: AssignmentDraft,
    loaded: AssignmentSet,
    current_rows: Vec<AssignedStaff>,
    employees: Vec<Employee>,
    load_report: LoadReport,
    save_mode: SaveMode,
    notice: Option<EditorNotice>,
}

impl<S: AssignmentService, D: EmployeeDirectory> AssignmentEditor<S, D> {
    pub fn new(event_id: EventId, service: Arc<S>, directory: Arc<D>, first_page: PageRequest) -> Self {
        Self {
            event_id,
            service,
            directory,
            first_page,
            state: EditorState::Idle,
            session: 0,
            draft: AssignmentDraft::new(event_id),
            loaded: AssignmentSet::new(event_id),
            current_rows: Vec::new(),
            employees: Vec::new(),
            load_report: LoadReport::default(),
            save_mode: SaveMode::Replace,
            notice: None,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn notice(&self) -> Option<&EditorNotice> {
        self.notice.as_ref()
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    pub fn draft(&self) -> &AssignmentDraft {
        &self.draft
    }

    /// Canonical set as last read from the service.
    pub fn loaded(&self) -> &AssignmentSet {
        &self.loaded
    }

    /// Rows shown in the "already assigned" list.
    pub fn current_rows(&self) -> &[AssignedStaff] {
        &self.current_rows
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Directory entries not yet in the draft.
    pub fn available_employees(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.employees
            .iter()
            .filter(|employee| !self.draft.contains(employee.id))
    }

    pub fn save_mode(&self) -> SaveMode {
        self.save_mode
    }

    pub fn can_save(&self) -> bool {
        self.state == EditorState::Editing
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_dirty(&self.loaded)
    }

    /// Starts a load session; only valid from `Idle`.
    pub fn begin_open(&mut self) -> Result<LoadRequest<S, D>, EditorError> {
        self.require(EditorState::Idle, "open")?;
        self.transition(EditorState::Loading);
        self.session += 1;
        Ok(LoadRequest {
            session: self.session,
            event_id: self.event_id,
            service: Arc::clone(&self.service),
            directory: Arc::clone(&self.directory),
            first_page: self.first_page.clone(),
        })
    }

    /// Applies a load result. Returns `false` if it was discarded.
    pub fn finish_open(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.session != self.session || self.state != EditorState::Loading {
            debug!(
                "event=editor_load module=editor status=discarded event_id={}",
                self.event_id
            );
            return false;
        }

        let mut report = LoadReport::default();
        let rows = match outcome.assignments {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    "event=editor_load module=editor status=degraded source=assignments event_id={} error_code={}",
                    self.event_id,
                    err.code()
                );
                report.assignments_degraded = true;
                Vec::new()
            }
        };
        let employees = match outcome.directory {
            Ok(employees) => employees,
            Err(err) => {
                warn!(
                    "event=editor_load module=editor status=degraded source=directory event_id={} error_code={}",
                    self.event_id,
                    err.code()
                );
                report.directory_degraded = true;
                Vec::new()
            }
        };

        // POST only when the event is known to have no staff yet.
        self.save_mode = if !report.assignments_degraded && rows.is_empty() {
            SaveMode::Create
        } else {
            SaveMode::Replace
        };
        self.loaded = AssignmentSet::from_rows(self.event_id, &rows);
        self.draft.initialize(&self.loaded);
        self.current_rows = rows;
        self.employees = employees;
        self.load_report = report;
        self.notice = None;
        self.transition(EditorState::Editing);
        info!(
            "event=editor_load module=editor status=ok event_id={} assigned_count={} directory_count={}",
            self.event_id,
            self.loaded.len(),
            self.employees.len()
        );
        true
    }

    /// Loads and enters `Editing`.
    pub async fn open(&mut self) -> Result<(), EditorError> {
        let request = self.begin_open()?;
        let outcome = request.run().await;
        self.finish_open(outcome);
        Ok(())
    }

    pub fn add_candidate(&mut self, staff_id: StaffId) -> Result<(), EditorError> {
        self.require(EditorState::Editing, "add staff")?;
        self.draft.add_candidate(staff_id)?;
        self.notice = None;
        Ok(())
    }

    pub fn remove_candidate(&mut self, staff_id: StaffId) -> Result<(), EditorError> {
        self.require(EditorState::Editing, "remove staff")?;
        self.draft.remove_candidate(staff_id)?;
        self.notice = None;
        Ok(())
    }

    /// Removes an already-assigned employee from the next submission.
    pub fn remove_assigned(&mut self, staff_id: StaffId) -> Result<(), EditorError> {
        self.require(EditorState::Editing, "remove staff")?;
        self.draft.remove_from_canonical(staff_id)?;
        self.notice = None;
        Ok(())
    }

    pub fn toggle_manager(&mut self, staff_id: StaffId, value: bool) -> Result<(), EditorError> {
        self.require(EditorState::Editing, "change store manager")?;
        self.draft.toggle_manager(staff_id, value)?;
        self.notice = None;
        Ok(())
    }

    pub fn entry(&self, staff_id: StaffId) -> Option<DraftEntry> {
        self.draft.get(staff_id)
    }

    /// Validates the draft and enters `Saving`.
    ///
    /// On a validation failure the editor stays in `Editing` with a
    /// `Validation` notice and nothing is sent.
    pub fn begin_save(&mut self) -> Result<SaveRequest<S>, EditorError> {
        if self.state == EditorState::Saving {
            return Err(EditorError::SaveInFlight);
        }
        self.require(EditorState::Editing, "save")?;

        let submission = self.draft.build_submission();
        if let Err(err) = validate(&submission) {
            info!(
                "event=editor_save module=editor status=invalid event_id={} reason={err:?}",
                self.event_id
            );
            self.notice = Some(EditorNotice {
                kind: NoticeKind::Validation,
                message: err.to_string(),
            });
            return Err(EditorError::Validation(err));
        }

        self.notice = None;
        self.transition(EditorState::Saving);
        info!(
            "event=editor_save module=editor status=start event_id={} mode={:?} staff_count={}",
            self.event_id,
            self.save_mode,
            submission.len()
        );
        Ok(SaveRequest {
            session: self.session,
            mode: self.save_mode,
            submission,
            service: Arc::clone(&self.service),
        })
    }

    /// Applies a save result and returns the resulting state.
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> EditorState {
        if outcome.session != self.session || self.state != EditorState::Saving {
            debug!(
                "event=editor_save module=editor status=discarded event_id={}",
                self.event_id
            );
            return self.state;
        }

        match outcome.result {
            SaveResult::Committed { refreshed } => {
                self.apply_committed(outcome.submission, refreshed);
                self.transition(EditorState::Success);
            }
            SaveResult::Failed(err) => {
                let classification = classify(&err);
                warn!(
                    "event=editor_save module=editor status=error event_id={} kind={:?} source={:?} error_code={}",
                    self.event_id,
                    classification.kind,
                    classification.source,
                    err.code()
                );
                self.notice = Some(EditorNotice::from_classification(&classification));
                let next = match classification.kind {
                    ConflictKind::TimeConflict => EditorState::Conflict,
                    ConflictKind::EmptyList | ConflictKind::Unknown => EditorState::Error,
                };
                self.transition(next);
            }
        }
        self.state
    }

    /// Validates, sends and applies the result in one call.
    pub async fn save(&mut self) -> Result<EditorState, EditorError> {
        let request = self.begin_save()?;
        let outcome = request.run().await;
        Ok(self.finish_save(outcome))
    }

    /// Dismisses a conflict or error and returns to `Editing`.
    pub fn acknowledge(&mut self) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Conflict | EditorState::Error) {
            return Err(EditorError::InvalidState {
                operation: "acknowledge",
                state: self.state,
            });
        }
        self.notice = None;
        self.transition(EditorState::Editing);
        Ok(())
    }

    /// Closes the editor; pending results of this session will be ignored.
    pub fn close(&mut self) {
        if self.state == EditorState::Closed {
            return;
        }
        if self.state == EditorState::Saving {
            info!(
                "event=editor_close module=editor status=detached event_id={}",
                self.event_id
            );
        } else if self.state != EditorState::Success {
            self.draft.initialize(&self.loaded);
        }
        self.session += 1;
        self.transition(EditorState::Closed);
    }

    fn apply_committed(
        &mut self,
        submission: AssignmentSet,
        refreshed: ServiceResult<Vec<AssignedStaff>>,
    ) {
        match refreshed {
            Ok(rows) => {
                self.loaded = AssignmentSet::from_rows(self.event_id, &rows);
                self.current_rows = rows;
                info!(
                    "event=editor_save module=editor status=ok event_id={} assigned_count={}",
                    self.event_id,
                    self.loaded.len()
                );
            }
            Err(err) => {
                warn!(
                    "event=editor_save module=editor status=partial_success event_id={} error_code={}",
                    self.event_id,
                    err.code()
                );
                self.current_rows = self.rows_from_directory(&submission);
                self.loaded = submission;
            }
        }
        self.draft.initialize(&self.loaded);
        self.save_mode = SaveMode::Replace;
    }

    fn rows_from_directory(&self, set: &AssignmentSet) -> Vec<AssignedStaff> {
        set.iter()
            .map(|assignment| {
                match self
                    .employees
                    .iter()
                    .find(|employee| employee.id == assignment.staff_id)
                {
                    Some(employee) => AssignedStaff::from_employee(employee, assignment.is_manager),
                    None => AssignedStaff {
                        staff_id: assignment.staff_id,
                        full_name: String::new(),
                        email: String::new(),
                        store_manager: assignment.is_manager,
                        roles: Default::default(),
                    },
                }
            })
            .collect()
    }

    fn require(&self, expected: EditorState, operation: &'static str) -> Result<(), EditorError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EditorError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: EditorState) {
        debug_assert!(
            state::is_allowed(self.state, to),
            "illegal editor transition {:?} -> {:?}",
            self.state,
            to
        );
        debug!(
            "event=editor_transition module=editor from={} to={} event_id={}",
            self.state, to, self.event_id
        );
        self.state = to;
    }
}
