//! Content taxonomy resolver.
//!
//! Lists the children of one node of the coaching → class → subject → test type → chapter → PDF
//! tree for a session. Coachings, classes, subjects and test types keep the insertion order of the
//! backing listing; chapters and PDFs are stably sorted by serial number. An existing node with no
//! children yields an empty list; `NotFound` is reserved for a parent key that is absent.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{
    display_label, pdf_icon, subject_icon, ChapterRecord, ChildEntry, ClassRecord, CoachingRecord, Keyed, PdfRecord,
    SubjectRecord, TestTypeRecord,
};
use super::path::{Depth, Selections};
use crate::backend::{Collection, ContentStore};
use crate::error::{AppError, AppResult};
use crate::identity::{can_access, check_access, Session};

#[derive(Clone)]
pub struct TaxonomyResolver {
    store: Arc<dyn ContentStore>,
}

impl TaxonomyResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self { Self { store } }

    /// Children listed at `level` under `ctx`. `ctx` must select exactly the keys above `level`.
    pub async fn list_children(&self, session: &Session, level: Depth, ctx: &Selections) -> AppResult<Vec<ChildEntry>> {
        if ctx.depth() != level {
            return Err(AppError::user(
                "context_mismatch".to_string(),
                format!("cannot list {} from a {} context", level.as_str(), ctx.depth().as_str()),
            ));
        }
        let path = ctx.path();
        let entries = match level {
            Depth::Root => self.coachings().await?,
            Depth::Classes => self.classes(session, &path[0]).await?,
            Depth::Subjects => self.subjects(session, &path[0], &path[1]).await?,
            Depth::Types => self.test_types(session, &path[0], &path[1], &path[2]).await?,
            Depth::Chapters => self.chapters(session, &path[0], &path[1], &path[2], &path[3]).await?,
            Depth::Pdfs => self.pdfs(session, ctx).await?,
        };
        debug!(target: "studydesk::catalog", "listed {} {} entries under {:?}", entries.len(), level.as_str(), path);
        Ok(entries)
    }

    /// The PDF `key` under a fully selected chapter context. No access check; callers gate actions.
    pub async fn find_pdf(&self, ctx: &Selections, key: &str) -> AppResult<Keyed<PdfRecord>> {
        if ctx.depth() != Depth::Pdfs {
            return Err(AppError::user("context_mismatch", "select a chapter first"));
        }
        self.pdfs_in(ctx)
            .await?
            .into_iter()
            .find(|p| p.key == key)
            .ok_or_else(|| AppError::not_found("pdf_not_found".to_string(), format!("no PDF '{}' in this chapter", key)))
    }

    async fn load<T: DeserializeOwned>(&self, collection: Collection) -> AppResult<Vec<Keyed<T>>> {
        let records = self.store.list(collection).await.map_err(|e| {
            AppError::unavailable("listing_unavailable".to_string(), format!("could not load {}: {}", collection.name(), e))
        })?;
        Ok(records
            .iter()
            .filter_map(|r| r.decode::<T>(collection).map(|value| Keyed { key: r.key.clone(), value }))
            .collect())
    }

    async fn coachings(&self) -> AppResult<Vec<ChildEntry>> {
        let coachings: Vec<Keyed<CoachingRecord>> = self.load(Collection::Coachings).await?;
        Ok(coachings
            .into_iter()
            .map(|c| ChildEntry {
                id: c.value.coaching_id,
                label: c.value.name,
                icon: c.value.icon.unwrap_or_else(|| "🏫".to_string()),
                color: c.value.color,
                serial_no: None,
            })
            .collect())
    }

    async fn classes(&self, session: &Session, coaching: &str) -> AppResult<Vec<ChildEntry>> {
        let coachings: Vec<Keyed<CoachingRecord>> = self.load(Collection::Coachings).await?;
        if !coachings.iter().any(|c| c.value.coaching_id == coaching) {
            return Err(missing("coaching", coaching));
        }
        let classes: Vec<Keyed<ClassRecord>> = self.load(Collection::Classes).await?;
        Ok(classes
            .into_iter()
            .map(|c| c.value)
            .filter(|c| c.coaching_id == coaching && can_access(session, &c.class_id, None, None))
            .map(|c| ChildEntry {
                id: c.class_id,
                label: c.name,
                icon: c.icon.unwrap_or_else(|| "🎓".to_string()),
                color: c.color,
                serial_no: None,
            })
            .collect())
    }

    async fn subjects(&self, session: &Session, coaching: &str, class_id: &str) -> AppResult<Vec<ChildEntry>> {
        check_access(Some(session), class_id, None, None)?;
        let classes: Vec<Keyed<ClassRecord>> = self.load(Collection::Classes).await?;
        if !classes.iter().any(|c| c.value.coaching_id == coaching && c.value.class_id == class_id) {
            return Err(missing("class", class_id));
        }
        let subjects: Vec<Keyed<SubjectRecord>> = self.load(Collection::Subjects).await?;
        Ok(subjects
            .into_iter()
            .map(|s| s.value)
            .filter(|s| s.coaching_id == coaching && s.class_id == class_id)
            .filter(|s| can_access(session, class_id, Some(s.name.as_str()), None))
            .map(|s| ChildEntry {
                icon: s.icon.unwrap_or_else(|| subject_icon(&s.name).to_string()),
                label: s.display_name.unwrap_or_else(|| display_label(&s.name)),
                id: s.name,
                color: s.color,
                serial_no: None,
            })
            .collect())
    }

    async fn test_types(&self, session: &Session, coaching: &str, class_id: &str, subject: &str) -> AppResult<Vec<ChildEntry>> {
        check_access(Some(session), class_id, Some(subject), None)?;
        let subjects: Vec<Keyed<SubjectRecord>> = self.load(Collection::Subjects).await?;
        if !subjects
            .iter()
            .any(|s| s.value.coaching_id == coaching && s.value.class_id == class_id && s.value.name == subject)
        {
            return Err(missing("subject", subject));
        }
        let types: Vec<Keyed<TestTypeRecord>> = self.load(Collection::TestTypes).await?;
        Ok(types
            .into_iter()
            .map(|t| t.value)
            .filter(|t| t.coaching_id == coaching && t.class_id == class_id && t.subject_id == subject)
            .filter(|t| can_access(session, class_id, Some(subject), Some(t.name.as_str())))
            .map(|t| ChildEntry {
                icon: t.icon.unwrap_or_else(|| "📝".to_string()),
                label: t.display_name.unwrap_or_else(|| display_label(&t.name)),
                id: t.name,
                color: t.color,
                serial_no: None,
            })
            .collect())
    }

    async fn chapters(
        &self,
        session: &Session,
        coaching: &str,
        class_id: &str,
        subject: &str,
        type_id: &str,
    ) -> AppResult<Vec<ChildEntry>> {
        check_access(Some(session), class_id, Some(subject), Some(type_id))?;
        let types: Vec<Keyed<TestTypeRecord>> = self.load(Collection::TestTypes).await?;
        if !types.iter().any(|t| {
            t.value.coaching_id == coaching && t.value.class_id == class_id && t.value.subject_id == subject && t.value.name == type_id
        }) {
            return Err(missing("test type", type_id));
        }
        let chapters: Vec<Keyed<ChapterRecord>> = self.load(Collection::Chapters).await?;
        let mut chapters: Vec<Keyed<ChapterRecord>> = chapters
            .into_iter()
            .filter(|c| {
                c.value.coaching_id == coaching
                    && c.value.class_id == class_id
                    && c.value.subject_id == subject
                    && c.value.type_id == type_id
            })
            .collect();
        // stable: equal serials keep listing order
        chapters.sort_by_key(|c| c.value.serial_no);
        Ok(chapters
            .into_iter()
            .map(|c| ChildEntry {
                id: c.key,
                label: c.value.name,
                icon: "📂".to_string(),
                color: None,
                serial_no: Some(c.value.serial_no),
            })
            .collect())
    }

    async fn pdfs(&self, session: &Session, ctx: &Selections) -> AppResult<Vec<ChildEntry>> {
        let path = ctx.path();
        check_access(Some(session), &path[1], Some(path[2].as_str()), Some(path[3].as_str()))?;
        Ok(self
            .pdfs_in(ctx)
            .await?
            .into_iter()
            .map(|p| ChildEntry {
                icon: pdf_icon(&p.value.file_name).to_string(),
                label: p.value.label().to_string(),
                id: p.key,
                color: None,
                serial_no: Some(p.value.serial_no),
            })
            .collect())
    }

    /// PDFs of the selected chapter in serial order, or `NotFound` when the chapter is gone.
    async fn pdfs_in(&self, ctx: &Selections) -> AppResult<Vec<Keyed<PdfRecord>>> {
        let path = ctx.path();
        let (coaching, class_id, subject, type_id, chapter) = (&path[0], &path[1], &path[2], &path[3], &path[4]);
        let chapters: Vec<Keyed<ChapterRecord>> = self.load(Collection::Chapters).await?;
        if !chapters.iter().any(|c| {
            &c.key == chapter
                && &c.value.coaching_id == coaching
                && &c.value.class_id == class_id
                && &c.value.subject_id == subject
                && &c.value.type_id == type_id
        }) {
            return Err(missing("chapter", chapter));
        }
        let pdfs: Vec<Keyed<PdfRecord>> = self.load(Collection::Pdfs).await?;
        let mut pdfs: Vec<Keyed<PdfRecord>> = pdfs
            .into_iter()
            .filter(|p| {
                &p.value.coaching_id == coaching
                    && &p.value.class_id == class_id
                    && &p.value.subject_id == subject
                    && &p.value.type_id == type_id
                    && &p.value.chapter_key == chapter
            })
            .collect();
        pdfs.sort_by_key(|p| p.value.serial_no);
        Ok(pdfs)
    }
}

fn missing(what: &str, key: &str) -> AppError {
    AppError::not_found(format!("{}_not_found", what.replace(' ', "_")), format!("{} '{}' does not exist", what, key))
}
