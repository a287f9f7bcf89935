//! Session lifecycle: request, decide, complete, cancel, list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mentorlink_core::error::AppError;
use mentorlink_core::types::{SessionId, UserId, parse_required};
use mentorlink_database::SessionStore;
use mentorlink_entity::session::{NewSession, Session, SessionBuckets, SessionStatus, SessionView};

use crate::context::RequestContext;
use crate::directory::DisplayResolver;
use crate::publisher::{DomainEvent, EventPublisher};

/// Manages mentoring sessions between a student and a mentor.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// Display-field population.
    resolver: DisplayResolver,
    /// Private-channel notifications.
    publisher: Arc<dyn EventPublisher>,
}

/// Client input for requesting a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Mentor id.
    pub mentor: Option<String>,
    /// Student id.
    pub student: Option<String>,
    /// Subject line.
    pub title: Option<String>,
    /// Optional agenda.
    pub description: Option<String>,
    /// RFC 3339 start time.
    pub scheduled_at: Option<String>,
}

impl CreateSessionRequest {
    /// Validate the raw fields against `now`.
    fn validate(self, now: DateTime<Utc>) -> Result<NewSession, AppError> {
        let mentor_id: UserId = parse_required("mentor", self.mentor.as_deref())?;
        let student_id: UserId = parse_required("student", self.student.as_deref())?;
        if mentor_id == student_id {
            return Err(AppError::invalid_input(
                "Mentor and student must be different users",
            ));
        }

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::invalid_input("Missing required field: title"))?;

        let raw_time = self
            .scheduled_at
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::invalid_input("Missing required field: scheduledAt"))?;
        let scheduled_at = DateTime::parse_from_rfc3339(raw_time)
            .map_err(|_| {
                AppError::invalid_input(format!("Malformed timestamp for scheduledAt: {raw_time}"))
            })?
            .with_timezone(&Utc);
        if scheduled_at <= now {
            return Err(AppError::invalid_input("scheduledAt must be in the future"));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(NewSession {
            student_id,
            mentor_id,
            title,
            description,
            scheduled_at,
        })
    }
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        store: Arc<dyn SessionStore>,
        resolver: DisplayResolver,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            resolver,
            publisher,
        }
    }

    /// Books a pending session and notifies the mentor.
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
        req: CreateSessionRequest,
    ) -> Result<SessionView, AppError> {
        let input = req.validate(Utc::now())?;
        ctx.ensure_is(input.student_id, "book this session")?;

        let session = self.store.create(input).await?;
        info!(
            session_id = %session.id,
            student = %session.student_id,
            mentor = %session.mentor_id,
            scheduled_at = %session.scheduled_at,
            "Session requested"
        );

        let mentor = session.mentor_id;
        let view = self.resolver.session(session).await;
        self.publisher
            .publish(&[mentor], DomainEvent::SessionRequestReceived(view.clone()))
            .await;
        Ok(view)
    }

    /// Records the mentor's decision on a pending session.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
        status: &str,
    ) -> Result<SessionView, AppError> {
        let decision = SessionStatus::parse_decision(status)?;
        let session = self.find_active(session_id).await?;
        ctx.ensure_is(session.mentor_id, "decide on this session")?;

        if session.status != SessionStatus::Pending {
            return Err(AppError::already_resolved(format!(
                "Session {session_id} is already {}",
                session.status
            )));
        }

        let updated = match self
            .store
            .transition(session_id, SessionStatus::Pending, decision, Utc::now())
            .await?
        {
            Some(updated) => updated,
            None => return Err(self.lost_race(session_id).await),
        };

        info!(session_id = %session_id, status = %updated.status, "Session status updated");
        Ok(self
            .notify_both(updated, DomainEvent::SessionStatusUpdated)
            .await)
    }

    /// Marks an accepted session completed and stores the feedback.
    pub async fn complete_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
        feedback: Option<serde_json::Value>,
    ) -> Result<SessionView, AppError> {
        let session = self.find_active(session_id).await?;
        ctx.ensure_one_of(&session.participants(), "complete this session")?;

        match session.status {
            SessionStatus::Accepted => {}
            SessionStatus::Completed => {
                return Err(AppError::already_resolved(format!(
                    "Session {session_id} is already completed"
                )));
            }
            other => {
                return Err(AppError::invalid_status(format!(
                    "Only accepted sessions can be completed; session {session_id} is {other}"
                )));
            }
        }

        let completed = match self
            .store
            .complete(session_id, feedback, Utc::now())
            .await?
        {
            Some(completed) => completed,
            None => return Err(self.lost_race(session_id).await),
        };

        info!(session_id = %session_id, "Session completed");
        Ok(self
            .notify_both(completed, DomainEvent::SessionCompleted)
            .await)
    }

    /// Cancels a pending or accepted session.
    ///
    /// The row is kept with status `cancelled` but disappears from every
    /// listing; both parties receive the last snapshot.
    pub async fn cancel_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
    ) -> Result<SessionView, AppError> {
        let session = self.find_active(session_id).await?;
        ctx.ensure_one_of(&session.participants(), "cancel this session")?;

        if !session.status.is_cancellable() {
            return Err(AppError::already_resolved(format!(
                "Session {session_id} is already {}",
                session.status
            )));
        }

        let cancelled = match self.store.cancel(session_id, Utc::now()).await? {
            Some(cancelled) => cancelled,
            None => return Err(self.lost_race(session_id).await),
        };

        info!(session_id = %session_id, by = %ctx.user_id, "Session cancelled");
        Ok(self
            .notify_both(cancelled, DomainEvent::SessionCancelled)
            .await)
    }

    /// The user's sessions split into pending, upcoming, past, and declined.
    pub async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<SessionBuckets, AppError> {
        ctx.ensure_is(user_id, "list these sessions")?;
        let sessions = self.store.find_for_user(user_id).await?;
        let views = self.resolver.sessions(sessions).await;
        Ok(SessionBuckets::partition(views, Utc::now()))
    }

    /// Accepted, declined, and rejected sessions involving the user, most
    /// recently updated first.
    pub async fn list_resolved(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<SessionView>, AppError> {
        ctx.ensure_is(user_id, "list these sessions")?;
        let sessions = self.store.find_resolved_for(user_id).await?;
        Ok(self.resolver.sessions(sessions).await)
    }

    async fn find_active(&self, id: SessionId) -> Result<Session, AppError> {
        self.store
            .find_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {id} not found")))
    }

    /// Classify a conditional update that matched no row.
    async fn lost_race(&self, id: SessionId) -> AppError {
        warn!(session_id = %id, "Session changed concurrently");
        match self.store.find_active(id).await {
            Ok(Some(current)) => {
                AppError::already_resolved(format!("Session {id} is already {}", current.status))
            }
            Ok(None) => AppError::not_found(format!("Session {id} not found")),
            Err(e) => e,
        }
    }

    async fn notify_both(
        &self,
        session: Session,
        event: fn(SessionView) -> DomainEvent,
    ) -> SessionView {
        let recipients = session.participants();
        let view = self.resolver.session(session).await;
        self.publisher
            .publish(&recipients, event(view.clone()))
            .await;
        view
    }
}
