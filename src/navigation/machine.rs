//! The navigation state machine.
//!
//! `Root -coaching-> Classes -class-> Subjects -subject-> Types -type-> Chapters -chapter-> Pdfs`.
//! Every applied forward transition pushes exactly one history entry; pops replay the stored
//! selections without pushing. The first entry pushed from `Root` is the root marker: landing on
//! it, or on anything this login's navigation did not write, pushes it again, so back never leaves
//! the app.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::history::{HistoryEntry, HistoryPort, MemoryHistory};
use super::labels::LabelBook;
use super::listing::{ListingRequest, ListingResponse, Screen};
use super::state::{breadcrumb, NavigationState};
use crate::actions::{resolve_pdf_action, PdfAction, PdfLink};
use crate::catalog::{Depth, Selections, Step, TaxonomyResolver};
use crate::error::{AppError, AppResult};
use crate::identity::{check_access, Session, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed.
    Applied,
    /// Already there; nothing pushed.
    Unchanged,
}

pub struct Navigator<H: HistoryPort = MemoryHistory> {
    sessions: SessionStore,
    resolver: TaxonomyResolver,
    history: H,
    labels: LabelBook,
    selections: Selections,
    root_marker: Option<Selections>,
    generation: u64,
}

impl<H: HistoryPort> Navigator<H> {
    pub fn new(sessions: SessionStore, resolver: TaxonomyResolver, history: H, labels: LabelBook) -> Self {
        Self {
            sessions,
            resolver,
            history,
            labels,
            selections: Selections::root(),
            root_marker: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> NavigationState { NavigationState::project(&self.selections, &self.labels) }

    pub fn selections(&self) -> &Selections { &self.selections }

    pub fn depth(&self) -> Depth { self.selections.depth() }

    pub fn breadcrumb(&self) -> Vec<String> { breadcrumb(&self.selections, &self.labels) }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn root_marker(&self) -> Option<&Selections> { self.root_marker.as_ref() }

    pub fn labels(&self) -> &LabelBook { &self.labels }

    pub fn history(&self) -> &H { &self.history }

    /// Access to the history substrate, e.g. to step back and feed the landed payload to
    /// [`Navigator::on_pop`].
    pub fn history_mut(&mut self) -> &mut H { &mut self.history }

    pub fn select_coaching(&mut self, coaching: &str) -> AppResult<Transition> { self.select(Step::Coaching, coaching) }

    pub fn select_class(&mut self, class_id: &str) -> AppResult<Transition> { self.select(Step::Class, class_id) }

    pub fn select_subject(&mut self, subject_id: &str) -> AppResult<Transition> { self.select(Step::Subject, subject_id) }

    pub fn select_test_type(&mut self, type_id: &str) -> AppResult<Transition> { self.select(Step::TestType, type_id) }

    pub fn select_chapter(&mut self, chapter_key: &str) -> AppResult<Transition> { self.select(Step::Chapter, chapter_key) }

    /// Select a child of the current view.
    pub fn open(&mut self, key: &str) -> AppResult<Transition> {
        match self.depth().step() {
            Some(step) => self.select(step, key),
            None => Err(AppError::user("leaf_view", "PDFs are opened with view or download")),
        }
    }

    /// Forward transition for `step`. A step shallower than the current depth is a breadcrumb
    /// jump: deeper selections are dropped and a new entry is pushed.
    pub fn select(&mut self, step: Step, key: &str) -> AppResult<Transition> {
        let session = self.sessions.current()?;
        if step == Step::Coaching && self.depth() != Depth::Root {
            if self.selections.coaching() == Some(key.trim()) {
                return Ok(Transition::Unchanged);
            }
            return Err(AppError::user("coaching_locked", "the coaching is chosen once per login"));
        }
        let next = self.selections.select(step, key).ok_or_else(|| {
            AppError::user(
                "unreachable".to_string(),
                format!("cannot select {:?} '{}' from the {} view", step, key, self.depth().as_str()),
            )
        })?;
        if next == self.selections {
            debug!(target: "studydesk::nav", "reselect {:?} {} ignored", step, key);
            return Ok(Transition::Unchanged);
        }
        gate(&session, &next)?;

        let is_root = self.root_marker.is_none();
        if is_root {
            self.root_marker = Some(next.clone());
        }
        self.history.push(HistoryEntry::new(next.clone(), is_root, &session.session_id).to_value());
        self.selections = next;
        self.generation += 1;
        debug!(target: "studydesk::nav", "-> {} {:?} gen={}", self.depth().as_str(), self.selections.path(), self.generation);
        Ok(Transition::Applied)
    }

    /// Handle a history pop carrying `payload`. Never pushes, except to re-arm the root marker.
    /// On error the current state is left as it was.
    pub fn on_pop(&mut self, payload: Option<Value>) -> AppResult<Transition> {
        let session = self.sessions.current()?;
        let Some(marker) = self.root_marker.clone() else {
            // nothing entered yet; stay on the coaching choice
            debug!(target: "studydesk::nav", "pop before root marker ignored");
            return Ok(Transition::Unchanged);
        };
        let target = match HistoryEntry::from_value(payload.as_ref()) {
            Some(e) if e.belongs_to(&session.session_id, &marker) => e.selections,
            _ => {
                self.history.push(HistoryEntry::new(marker.clone(), true, &session.session_id).to_value());
                debug!(target: "studydesk::nav", "pop reached root marker; re-armed");
                marker
            }
        };
        if let Err(e) = gate(&session, &target) {
            warn!(target: "studydesk::nav", "pop to {:?} rejected: {}", target.path(), e);
            return Err(e);
        }
        self.selections = target;
        self.generation += 1;
        debug!(target: "studydesk::nav", "<- {} {:?} gen={}", self.depth().as_str(), self.selections.path(), self.generation);
        Ok(Transition::Applied)
    }

    pub fn logout(&mut self) {
        self.sessions.logout();
        self.selections = Selections::root();
        self.root_marker = None;
        self.generation += 1;
        info!(target: "studydesk::nav", "navigation reset on logout");
    }

    /// Snapshot for fetching the current view's children off the navigator.
    pub fn listing_request(&self) -> AppResult<ListingRequest> {
        Ok(ListingRequest {
            generation: self.generation,
            selections: self.selections.clone(),
            session: self.sessions.current()?,
            resolver: self.resolver.clone(),
        })
    }

    /// Apply a fetched listing. `Ok(None)` when a transition happened since the request was made.
    /// Missing nodes and outages become screens; denials and lost sessions are errors.
    pub fn apply_listing(&mut self, response: ListingResponse) -> AppResult<Option<Screen>> {
        if response.generation != self.generation {
            debug!(target: "studydesk::nav", "discarding stale {} listing gen={} current={}",
                response.level.as_str(), response.generation, self.generation);
            return Ok(None);
        }
        let screen = match response.result {
            Ok(entries) if entries.is_empty() => Screen::Empty,
            Ok(entries) => {
                if let Some(step) = response.level.step() {
                    self.labels.learn(step, &entries);
                }
                Screen::Entries(entries)
            }
            Err(e) if e.is_not_found() => Screen::Missing(e),
            Err(e) if e.is_unavailable() => Screen::Unavailable(e),
            Err(e) => return Err(e),
        };
        Ok(Some(screen))
    }

    /// Fetch and apply the current view's listing in one go.
    pub async fn refresh(&mut self) -> AppResult<Screen> {
        let response = self.listing_request()?.fetch().await;
        self.apply_listing(response)?
            .ok_or_else(|| AppError::internal("stale_listing", "listing went stale while the navigator was held"))
    }

    /// View or download a PDF of the current chapter.
    pub async fn open_pdf(&self, key: &str, action: PdfAction) -> AppResult<PdfLink> {
        let session = self.sessions.current()?;
        let pdf = self.resolver.find_pdf(&self.selections, key).await?;
        resolve_pdf_action(Some(&session), &pdf.value, action)
    }
}

/// Access gate for the deepest class/subject/type a selection path names.
fn gate(session: &Session, selections: &Selections) -> AppResult<()> {
    match selections.class_id() {
        Some(class_id) => check_access(Some(session), class_id, selections.subject_id(), selections.type_id()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryContentStore, MemorySessionStorage};
    use crate::config::PortalConfig;
    use crate::identity::{AllowedSubjects, Role};
    use chrono::Utc;
    use std::sync::Arc;

    fn navigator(subjects: AllowedSubjects) -> Navigator {
        let sessions = SessionStore::new(Arc::new(MemorySessionStorage::new()), chrono::Duration::hours(1));
        sessions
            .begin(&Session {
                session_id: "sid".into(),
                user_id: "STU001".into(),
                name: "John Doe".into(),
                role: Role::Student,
                allowed_classes: ["class-9".to_string()].into_iter().collect(),
                allowed_subjects: subjects,
                login_time: Utc::now(),
            })
            .unwrap();
        let resolver = TaxonomyResolver::new(Arc::new(MemoryContentStore::new()));
        Navigator::new(sessions, resolver, MemoryHistory::new(), LabelBook::from_config(&PortalConfig::default()))
    }

    #[test]
    fn denied_subject_leaves_state() {
        let mut nav = navigator(AllowedSubjects::listed([("class-9", vec!["mathematics"])]));
        nav.select_coaching("demo").unwrap();
        nav.select_class("class-9").unwrap();
        let before = (nav.state(), nav.history().len(), nav.generation());
        let err = nav.select_subject("physics").unwrap_err();
        assert!(err.is_denied());
        assert_eq!(nav.selections().subject_id(), None);
        assert_eq!((nav.state(), nav.history().len(), nav.generation()), before);

        assert_eq!(nav.select_subject("mathematics").unwrap(), Transition::Applied);
        assert_eq!(nav.breadcrumb(), vec!["Home", "Class IX", "Mathematics"]);
    }

    #[test]
    fn skipping_a_level_is_rejected() {
        let mut nav = navigator(AllowedSubjects::All);
        let err = nav.select_class("class-9").unwrap_err();
        assert_eq!(err.code_str(), "unreachable");
        nav.select_coaching("demo").unwrap();
        assert_eq!(nav.select_coaching("demo").unwrap(), Transition::Unchanged);
        assert_eq!(nav.select_coaching("other").unwrap_err().code_str(), "coaching_locked");
        assert!(nav.open("class-10").unwrap_err().is_denied());
    }

    #[test]
    fn reselecting_chapter_is_a_no_op() {
        let mut nav = navigator(AllowedSubjects::All);
        for (step, key) in Step::ALL.iter().zip(["demo", "class-9", "mathematics", "mock-test", "c1"]) {
            assert_eq!(nav.select(*step, key).unwrap(), Transition::Applied);
        }
        let len = nav.history().len();
        assert_eq!(nav.select_chapter("c1").unwrap(), Transition::Unchanged);
        assert_eq!(nav.history().len(), len);
        assert_eq!(nav.open("anything").unwrap_err().code_str(), "leaf_view");

        // breadcrumb jump back to the class pushes a fresh entry
        assert_eq!(nav.select_class("class-9").unwrap(), Transition::Applied);
        assert_eq!(nav.depth(), Depth::Subjects);
        assert_eq!(nav.history().len(), len + 1);
    }

    #[test]
    fn pops_replay_and_reflect_at_root() {
        let mut nav = navigator(AllowedSubjects::All);
        // pop before anything was entered
        assert_eq!(nav.on_pop(None).unwrap(), Transition::Unchanged);

        nav.select_coaching("demo").unwrap();
        nav.select_class("class-9").unwrap();
        nav.select_subject("mathematics").unwrap();
        assert_eq!(nav.history().len(), 4);

        let landed = nav.history_mut().back().unwrap();
        nav.on_pop(landed).unwrap();
        assert_eq!(nav.depth(), Depth::Subjects);
        assert_eq!(nav.history().len(), 4);

        let landed = nav.history_mut().back().unwrap();
        nav.on_pop(landed).unwrap();
        assert_eq!(nav.depth(), Depth::Classes);
        // root marker re-pushed over the forward entries
        assert_eq!(nav.history().len(), 3);
        assert_eq!(nav.history().cursor(), 2);

        let landed = nav.history_mut().back().unwrap();
        assert!(landed.is_some());
        nav.on_pop(landed).unwrap();
        assert_eq!(nav.selections(), nav.root_marker().unwrap());
        assert_eq!(nav.breadcrumb(), vec!["Home"]);
    }

    #[test]
    fn pop_before_marker_is_ignored() {
        let mut nav = navigator(AllowedSubjects::All);
        let stray = HistoryEntry::new(
            Selections::root().select(Step::Coaching, "demo").unwrap().select(Step::Class, "class-9").unwrap(),
            false,
            "sid",
        );
        assert_eq!(nav.on_pop(Some(stray.to_value())).unwrap(), Transition::Unchanged);
        assert_eq!(nav.depth(), Depth::Root);
        assert!(nav.root_marker().is_none());

        nav.select_coaching("demo").unwrap();
        assert_eq!(nav.root_marker().map(|m| m.depth()), Some(Depth::Classes));
    }

    #[test]
    fn pop_after_logout_is_unauthenticated() {
        let mut nav = navigator(AllowedSubjects::All);
        nav.select_coaching("demo").unwrap();
        nav.select_class("class-9").unwrap();
        let landed = nav.history_mut().back().unwrap();
        nav.logout();
        let err = nav.on_pop(landed).unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(nav.depth(), Depth::Root);
        assert!(nav.listing_request().is_err());
    }
}
