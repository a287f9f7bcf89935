//! Connection request lifecycle: send, decide, list.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mentorlink_core::error::AppError;
use mentorlink_core::types::{RequestId, UserId, parse_required};
use mentorlink_database::RequestStore;
use mentorlink_entity::request::{RequestStatus, RequestView};

use crate::context::RequestContext;
use crate::directory::DisplayResolver;
use crate::publisher::{DomainEvent, EventPublisher};

/// Manages mentor/mentee connection requests.
#[derive(Debug, Clone)]
pub struct RequestService {
    /// Request persistence.
    store: Arc<dyn RequestStore>,
    /// Display-field population.
    resolver: DisplayResolver,
    /// Private-channel notifications.
    publisher: Arc<dyn EventPublisher>,
}

/// Client input for sending a connection request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendRequest {
    /// Requester id.
    pub from: Option<String>,
    /// Recipient id.
    pub to: Option<String>,
}

impl RequestService {
    /// Creates a new request service.
    pub fn new(
        store: Arc<dyn RequestStore>,
        resolver: DisplayResolver,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            resolver,
            publisher,
        }
    }

    /// Sends a pending request from the caller to a recipient.
    ///
    /// The recipient is notified with `newRequest`.
    pub async fn send_request(
        &self,
        ctx: &RequestContext,
        input: SendRequest,
    ) -> Result<RequestView, AppError> {
        let from: UserId = parse_required("from", input.from.as_deref())?;
        let to: UserId = parse_required("to", input.to.as_deref())?;
        if from == to {
            return Err(AppError::invalid_input(
                "A user cannot send a request to themselves",
            ));
        }
        ctx.ensure_is(from, "send this request")?;

        if self.store.find_pending(from, to).await?.is_some() {
            return Err(AppError::duplicate_pending("Request already sent"));
        }
        let request = self.store.create(from, to).await?;

        info!(
            request_id = %request.id,
            from = %from,
            to = %to,
            "Connection request sent"
        );

        let view = self.resolver.request(request).await;
        self.publisher
            .publish(&[to], DomainEvent::NewRequest(view.clone()))
            .await;
        Ok(view)
    }

    /// Records the recipient's decision on a pending request.
    ///
    /// `status` must be `accepted` or `rejected`. The requester is notified
    /// with `requestUpdated`.
    pub async fn respond_to_request(
        &self,
        ctx: &RequestContext,
        request_id: RequestId,
        status: &str,
    ) -> Result<RequestView, AppError> {
        let decision = RequestStatus::parse_decision(status)?;
        self.resolve(ctx, request_id, decision).await
    }

    /// Accepts a pending request.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        request_id: RequestId,
    ) -> Result<RequestView, AppError> {
        self.resolve(ctx, request_id, RequestStatus::Accepted).await
    }

    /// Rejects a pending request.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        request_id: RequestId,
    ) -> Result<RequestView, AppError> {
        self.resolve(ctx, request_id, RequestStatus::Rejected).await
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request_id: RequestId,
        decision: RequestStatus,
    ) -> Result<RequestView, AppError> {
        let request = self
            .store
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Request {request_id} not found")))?;

        ctx.ensure_is(request.to_user_id, "respond to this request")?;

        if request.status.is_resolved() {
            return Err(already_resolved(request_id, request.status));
        }

        let Some(resolved) = self
            .store
            .resolve(request_id, decision, Utc::now())
            .await?
        else {
            warn!(request_id = %request_id, "Request resolved concurrently");
            return Err(AppError::already_resolved(format!(
                "Request {request_id} has already been resolved"
            )));
        };

        info!(
            request_id = %request_id,
            status = %resolved.status,
            "Connection request resolved"
        );

        let requester = resolved.from_user_id;
        let view = self.resolver.request(resolved).await;
        self.publisher
            .publish(&[requester], DomainEvent::RequestUpdated(view.clone()))
            .await;
        Ok(view)
    }

    /// Requests sent by `user_id`, newest first.
    pub async fn list_requests_for(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<RequestView>, AppError> {
        ctx.ensure_is(user_id, "list these requests")?;
        let requests = self.store.find_sent_by(user_id).await?;
        Ok(self.resolver.requests(requests).await)
    }

    /// Pending requests addressed to `mentor_id`, newest first.
    pub async fn list_mentor_pending(
        &self,
        ctx: &RequestContext,
        mentor_id: UserId,
    ) -> Result<Vec<RequestView>, AppError> {
        ctx.ensure_is(mentor_id, "list these requests")?;
        let requests = self.store.find_pending_for(mentor_id).await?;
        Ok(self.resolver.requests(requests).await)
    }

    /// Accepted and rejected requests addressed to `mentor_id`, most
    /// recently resolved first.
    pub async fn list_resolved(
        &self,
        ctx: &RequestContext,
        mentor_id: UserId,
    ) -> Result<Vec<RequestView>, AppError> {
        ctx.ensure_is(mentor_id, "list these requests")?;
        let requests = self.store.find_resolved_for(mentor_id).await?;
        Ok(self.resolver.requests(requests).await)
    }
}

fn already_resolved(id: RequestId, status: RequestStatus) -> AppError {
    AppError::already_resolved(format!("Request {id} is already {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use mentorlink_core::ErrorKind;
    use mentorlink_entity::user::UserRole;

    fn service(fx: &Fixture) -> RequestService {
        RequestService::new(
            fx.stores.requests.clone(),
            DisplayResolver::new(fx.stores.directory.clone()),
            fx.publisher.clone(),
        )
    }

    fn input(from: UserId, to: UserId) -> SendRequest {
        SendRequest {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    #[tokio::test]
    async fn test_send_notifies_recipient_with_display_fields() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let view = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
        assert_eq!(view.request.status, RequestStatus::Pending);
        assert_eq!(view.from.as_ref().unwrap().name, "Mia");
        assert_eq!(view.to.as_ref().unwrap().name, "Omar");

        let events = fx.publisher.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, vec![mentor.user_id]);
        assert_eq!(events[0].1.name(), "newRequest");
    }

    #[tokio::test]
    async fn test_send_rejects_bad_input() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);

        let missing = svc
            .send_request(
                &mentee,
                SendRequest {
                    from: Some(mentee.user_id.to_string()),
                    to: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::InvalidInput);

        let malformed = svc
            .send_request(
                &mentee,
                SendRequest {
                    from: Some(mentee.user_id.to_string()),
                    to: Some("not-a-uuid".into()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(malformed.kind, ErrorKind::InvalidInput);

        let own = svc
            .send_request(&mentee, input(mentee.user_id, mentee.user_id))
            .await
            .unwrap_err();
        assert_eq!(own.kind, ErrorKind::InvalidInput);
        assert!(fx.publisher.take().is_empty());
    }

    #[tokio::test]
    async fn test_send_on_behalf_of_someone_else_is_forbidden() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let err = svc
            .send_request(&mentor, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_duplicate_pending_request() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        svc.send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
        let err = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicatePending);

        // The reverse direction is a different pair.
        svc.send_request(&mentor, input(mentor.user_id, mentee.user_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_accept_then_respond_again() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let sent = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
        fx.publisher.take();

        let accepted = svc
            .respond_to_request(&mentor, sent.request.id, "accepted")
            .await
            .unwrap();
        assert_eq!(accepted.request.status, RequestStatus::Accepted);
        let resolved_at = accepted.request.resolved_at.unwrap();
        assert!(resolved_at >= accepted.request.created_at);

        let events = fx.publisher.take();
        assert_eq!(events[0].0, vec![mentee.user_id]);
        assert_eq!(events[0].1.name(), "requestUpdated");

        let again = svc.reject(&mentor, sent.request.id).await.unwrap_err();
        assert_eq!(again.kind, ErrorKind::AlreadyResolved);

        // A resolved request no longer blocks a new one.
        svc.send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_respond_errors() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let sent = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();

        let bad = svc
            .respond_to_request(&mentor, sent.request.id, "pending")
            .await
            .unwrap_err();
        assert_eq!(bad.kind, ErrorKind::InvalidStatus);

        let missing = svc
            .respond_to_request(&mentor, RequestId::new(), "accepted")
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let wrong_actor = svc.accept(&mentee, sent.request.id).await.unwrap_err();
        assert_eq!(wrong_actor.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_concurrent_responses_resolve_once() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let sent = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
        let id = sent.request.id;

        let (a, b) = tokio::join!(svc.accept(&mentor, id), svc.reject(&mentor, id));
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = a.err().or(b.err()).unwrap();
        assert_eq!(loser.kind, ErrorKind::AlreadyResolved);
    }

    #[tokio::test]
    async fn test_listings() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let mentee = fx.user("Mia", UserRole::Mentee);
        let other = fx.user("Noor", UserRole::Mentee);
        let mentor = fx.user("Omar", UserRole::Mentor);

        let first = svc
            .send_request(&mentee, input(mentee.user_id, mentor.user_id))
            .await
            .unwrap();
        svc.send_request(&other, input(other.user_id, mentor.user_id))
            .await
            .unwrap();
        svc.accept(&mentor, first.request.id).await.unwrap();

        let sent = svc.list_requests_for(&mentee, mentee.user_id).await.unwrap();
        assert_eq!(sent.len(), 1);

        let pending = svc
            .list_mentor_pending(&mentor, mentor.user_id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.from_user_id, other.user_id);

        let resolved = svc.list_resolved(&mentor, mentor.user_id).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].request.status, RequestStatus::Accepted);

        let err = svc
            .list_mentor_pending(&mentee, mentor.user_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
