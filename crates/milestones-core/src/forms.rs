//! Add and edit forms.
//!
//! The add form collects a draft and inserts it on submit. The edit form is
//! bound to a stored milestone and writes every change straight through, so
//! "done" only closes it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result, ValidationError};
use crate::milestone::{check_storable, title_is_present, to_stored_precision, Milestone};
use crate::storage::MilestoneDb;

/// Default distance the add form moves its target after each submit.
pub const DEFAULT_TARGET_ADVANCE_MINUTES: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Target,
    Title,
    Notes,
}

/// Focus after the keyboard "submit" key is pressed in `field`.
///
/// Title hands over to notes; everything else drops focus.
pub fn next_focus(field: FormField) -> Option<FormField> {
    match field {
        FormField::Title => Some(FormField::Notes),
        FormField::Target | FormField::Notes => None,
    }
}

fn empty_title() -> ValidationError {
    ValidationError::EmptyField {
        field: "title".into(),
    }
}

/// Draft for a new milestone.
#[derive(Debug, Clone)]
pub struct AddForm {
    pub target: DateTime<Utc>,
    pub title: String,
    pub notes: String,
    focus: Option<FormField>,
    advance: Duration,
}

impl AddForm {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            target: now,
            title: String::new(),
            notes: String::new(),
            focus: Some(FormField::Title),
            advance: Duration::minutes(DEFAULT_TARGET_ADVANCE_MINUTES),
        }
    }

    /// Use a different post-submit target advance.
    pub fn with_advance(mut self, advance: Duration) -> Self {
        self.advance = advance;
        self
    }

    pub fn focus(&self) -> Option<FormField> {
        self.focus
    }

    pub fn focus_on(&mut self, field: FormField) {
        self.focus = Some(field);
    }

    /// Keyboard submit inside `field`.
    pub fn submit_field(&mut self, field: FormField) {
        self.focus = next_focus(field);
    }

    /// Submit is disabled while the title is blank.
    pub fn can_submit(&self) -> bool {
        title_is_present(&self.title)
    }

    /// Insert the draft as a new milestone created at `now`, then reset.
    ///
    /// # Errors
    /// A blank title or an unstorable target is rejected before anything is
    /// written.
    pub fn submit(&mut self, db: &MilestoneDb, now: DateTime<Utc>) -> Result<Milestone> {
        if !self.can_submit() {
            return Err(empty_title().into());
        }
        check_storable("target", &self.target)?;
        let milestone = Milestone::new(self.title.clone(), self.notes.clone(), self.target, now);
        db.insert_milestone(&milestone)?;
        self.reset();
        Ok(milestone)
    }

    /// Keep the target moving forward rather than snapping back to "now".
    fn reset(&mut self) {
        self.target += self.advance;
        self.title.clear();
        self.notes.clear();
        self.focus = Some(FormField::Title);
    }
}

/// Result of a write-through edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Saved,
    /// The record disappeared underneath the form; the form is now closed.
    Closed,
}

/// Form bound to a stored milestone.
#[derive(Debug, Clone)]
pub struct EditForm {
    milestone: Milestone,
    focus: Option<FormField>,
    closed: bool,
}

impl EditForm {
    /// Bind to the milestone with `id`.
    ///
    /// # Errors
    /// `NotFound` if no such milestone exists.
    pub fn open(db: &MilestoneDb, id: &str) -> Result<Self> {
        let milestone = db
            .get_milestone(id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        Ok(Self::bind(milestone))
    }

    pub fn bind(milestone: Milestone) -> Self {
        Self {
            milestone,
            focus: None,
            closed: false,
        }
    }

    pub fn milestone(&self) -> &Milestone {
        &self.milestone
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn focus(&self) -> Option<FormField> {
        self.focus
    }

    pub fn focus_on(&mut self, field: FormField) {
        self.focus = Some(field);
    }

    pub fn submit_field(&mut self, field: FormField) {
        self.focus = next_focus(field);
    }

    /// An unstorable target is rejected and leaves the form unchanged.
    pub fn set_target(&mut self, db: &MilestoneDb, target: DateTime<Utc>) -> Result<EditStatus> {
        check_storable("target", &target)?;
        self.milestone.target = to_stored_precision(target);
        self.write_through(db)
    }

    /// Blank titles are written too; only `done` is gated on the title.
    pub fn set_title(&mut self, db: &MilestoneDb, title: impl Into<String>) -> Result<EditStatus> {
        self.milestone.title = title.into();
        self.write_through(db)
    }

    pub fn set_notes(&mut self, db: &MilestoneDb, notes: impl Into<String>) -> Result<EditStatus> {
        self.milestone.notes = notes.into();
        self.write_through(db)
    }

    fn write_through(&mut self, db: &MilestoneDb) -> Result<EditStatus> {
        if self.closed {
            return Ok(EditStatus::Closed);
        }
        if db.update_milestone(&self.milestone)? {
            Ok(EditStatus::Saved)
        } else {
            debug!(id = %self.milestone.id, "edit target deleted, closing form");
            self.closed = true;
            Ok(EditStatus::Closed)
        }
    }

    /// Re-read the bound record, closing the form if it was deleted.
    pub fn refresh(&mut self, db: &MilestoneDb) -> Result<EditStatus> {
        match db.get_milestone(&self.milestone.id)? {
            Some(current) if !self.closed => {
                self.milestone = current;
                Ok(EditStatus::Saved)
            }
            _ => {
                self.closed = true;
                Ok(EditStatus::Closed)
            }
        }
    }

    pub fn can_finish(&self) -> bool {
        self.milestone.has_title()
    }

    /// Close the form. Edits are already stored.
    ///
    /// # Errors
    /// Refused while the title is blank.
    pub fn done(&mut self) -> std::result::Result<(), ValidationError> {
        if !self.can_finish() {
            return Err(empty_title());
        }
        self.closed = true;
        self.focus = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn add_form_defaults() {
        let form = AddForm::new(now());
        assert_eq!(form.target, now());
        assert!(form.title.is_empty() && form.notes.is_empty());
        assert!(!form.can_submit());
        assert_eq!(form.focus(), Some(FormField::Title));
    }

    #[test]
    fn empty_title_is_rejected_without_writing() {
        let db = MilestoneDb::open_memory().unwrap();
        let mut form = AddForm::new(now());
        form.notes = "something".into();
        form.target = now() + Duration::days(1);

        let err = form.submit(&db, now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyField { .. })));
        assert!(db.list_milestones().unwrap().is_empty());
        // The draft is left alone.
        assert_eq!(form.notes, "something");
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let db = MilestoneDb::open_memory().unwrap();
        let mut form = AddForm::new(now());
        form.title = "   ".into();
        assert!(form.submit(&db, now()).is_err());
        assert!(db.list_milestones().unwrap().is_empty());
    }

    #[test]
    fn submit_inserts_and_resets() {
        let db = MilestoneDb::open_memory().unwrap();
        let mut form = AddForm::new(now());
        form.title = "Leave for airport".into();
        form.notes = "passport".into();
        form.target = now() + Duration::hours(1);
        form.submit_field(FormField::Notes);
        assert_eq!(form.focus(), None);

        let created = form.submit(&db, now()).unwrap();
        assert_eq!(created.created_at, now());
        assert_eq!(created.target, now() + Duration::hours(1));
        assert_eq!(db.get_milestone(&created.id).unwrap(), Some(created));

        assert_eq!(form.target, now() + Duration::hours(1) + Duration::minutes(3));
        assert!(form.title.is_empty() && form.notes.is_empty());
        assert_eq!(form.focus(), Some(FormField::Title));
    }

    #[test]
    fn submitted_milestone_matches_stored_row() {
        let db = MilestoneDb::open_memory().unwrap();
        let now = now() + Duration::nanoseconds(987_654_321);
        let mut form = AddForm::new(now);
        form.title = "Sub-second".into();
        form.target = now + Duration::minutes(5);

        let created = form.submit(&db, now).unwrap();
        assert_eq!(db.get_milestone(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn unstorable_target_is_rejected() {
        let db = MilestoneDb::open_memory().unwrap();
        let far = now() + Duration::days(3_000_000);

        let mut form = AddForm::new(now());
        form.title = "Far".into();
        form.target = far;
        let err = form.submit(&db, now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidValue { .. })));
        assert_eq!(form.title, "Far");

        form.target = now() + Duration::hours(1);
        let created = form.submit(&db, now()).unwrap();
        let mut edit = EditForm::open(&db, &created.id).unwrap();
        assert!(edit.set_target(&db, far).is_err());
        assert_eq!(edit.milestone().target, created.target);
        assert_eq!(db.list_milestones().unwrap(), vec![created]);
    }

    #[test]
    fn custom_advance() {
        let db = MilestoneDb::open_memory().unwrap();
        let mut form = AddForm::new(now()).with_advance(Duration::minutes(10));
        form.title = "A".into();
        form.submit(&db, now()).unwrap();
        assert_eq!(form.target, now() + Duration::minutes(10));
    }

    #[test]
    fn focus_policy() {
        let mut form = AddForm::new(now());
        form.submit_field(FormField::Title);
        assert_eq!(form.focus(), Some(FormField::Notes));
        form.submit_field(FormField::Notes);
        assert_eq!(form.focus(), None);
        form.focus_on(FormField::Target);
        form.submit_field(FormField::Target);
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn edits_write_through_immediately() {
        let db = MilestoneDb::open_memory().unwrap();
        let m = Milestone::new("Gym", "", now() + Duration::hours(2), now());
        db.insert_milestone(&m).unwrap();

        let mut form = EditForm::open(&db, &m.id).unwrap();
        assert_eq!(form.set_title(&db, "Swim").unwrap(), EditStatus::Saved);
        assert_eq!(form.set_notes(&db, "pool B").unwrap(), EditStatus::Saved);
        let past = now() - Duration::hours(1);
        assert_eq!(form.set_target(&db, past).unwrap(), EditStatus::Saved);

        let stored = db.get_milestone(&m.id).unwrap().unwrap();
        assert_eq!(stored.title, "Swim");
        assert_eq!(stored.notes, "pool B");
        assert_eq!(stored.target, past);
        assert_eq!(stored.created_at, m.created_at);
    }

    #[test]
    fn done_is_refused_with_blank_title() {
        let db = MilestoneDb::open_memory().unwrap();
        let m = Milestone::new("Gym", "", now(), now());
        db.insert_milestone(&m).unwrap();

        let mut form = EditForm::open(&db, &m.id).unwrap();
        form.set_title(&db, "").unwrap();
        assert!(!form.can_finish());
        assert!(form.done().is_err());
        assert!(!form.is_closed());

        form.set_title(&db, "Gym again").unwrap();
        form.done().unwrap();
        assert!(form.is_closed());
    }

    #[test]
    fn deleted_record_closes_form_gracefully() {
        let db = MilestoneDb::open_memory().unwrap();
        let m = Milestone::new("Gym", "", now(), now());
        db.insert_milestone(&m).unwrap();

        let mut form = EditForm::open(&db, &m.id).unwrap();
        db.delete_milestone(&m.id).unwrap();

        assert_eq!(form.set_notes(&db, "too late").unwrap(), EditStatus::Closed);
        assert!(form.is_closed());
        assert!(db.list_milestones().unwrap().is_empty());
    }

    #[test]
    fn refresh_notices_deletion() {
        let db = MilestoneDb::open_memory().unwrap();
        let m = Milestone::new("Gym", "", now(), now());
        db.insert_milestone(&m).unwrap();
        let mut form = EditForm::open(&db, &m.id).unwrap();
        assert_eq!(form.refresh(&db).unwrap(), EditStatus::Saved);
        db.delete_milestone(&m.id).unwrap();
        assert_eq!(form.refresh(&db).unwrap(), EditStatus::Closed);
    }

    #[test]
    fn open_missing_is_not_found() {
        let db = MilestoneDb::open_memory().unwrap();
        assert!(matches!(
            EditForm::open(&db, "nope"),
            Err(CoreError::NotFound(_))
        ));
    }
}
