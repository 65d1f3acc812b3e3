//! # Session Client
//!
//! Cloneable handle in front of a single session actor. The actor owns the
//! access token and the [`RefreshCoordinator`]; every state change happens on
//! its task, so there is nothing to lock.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionClient::call ──► actor ──► spawn send(request, token)          │
//! │                                        │                                │
//! │                     ┌──────────────────┼─────────────────┐              │
//! │                     ▼                  ▼                 ▼              │
//! │                 response          AuthExpired       AuthExpired         │
//! │                 → caller          (first try)       (replayed)          │
//! │                                        │                 │              │
//! │                                        ▼                 ▼              │
//! │                              coordinator.on_expired   Rejected          │
//! │                              StartRenewal / Queued    → caller gets     │
//! │                                        │                AuthExpired     │
//! │                                        ▼                                │
//! │                              spawn transport.renew()                    │
//! │                                        │                                │
//! │                     ┌──────────────────┴─────────────────┐              │
//! │                     ▼                                    ▼              │
//! │            Ok(token): store token,             Err: clear session once, │
//! │            replay every waiter once            fail every waiter with   │
//! │            (marked retried)                    the same RenewalFailed   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each call remembers the token it was sent with. An `AuthExpired` that
//! arrives after a renewal already replaced that token skips the coordinator:
//! it replays once with the new token, or fails with the renewal's error if
//! the session was cleared.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::coordinator::{ExpiredAction, RefreshCoordinator, RefreshState};
use crate::error::{SessionError, SessionResult};
use crate::request::{AccessTokenData, ApiRequest, ApiResponse};

const LOGIN_PATH: &str = "/users/login";
const LOGOUT_PATH: &str = "/users/logout";

// =============================================================================
// Transport
// =============================================================================

/// The network side of a session.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends one request. HTTP 401 must come back as
    /// `SessionError::AuthExpired`; every other status is an `Ok` response.
    async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> SessionResult<ApiResponse>;

    /// Exchanges the refresh credential for a new access token.
    async fn renew(&self) -> SessionResult<String>;

    /// Forgets the refresh credential.
    fn clear(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedIn,
    SignedOut,
}

// =============================================================================
// Actor Messages
// =============================================================================

type Reply = oneshot::Sender<SessionResult<ApiResponse>>;

/// A call waiting to complete, possibly after a renewal.
struct PendingCall {
    request: ApiRequest,
    reply: Reply,
    retried: bool,
    /// Token the last attempt carried.
    sent_with: Option<String>,
}

/// Commands from handles.
enum SessionCommand {
    Call { request: ApiRequest, reply: Reply },
    Login { request: ApiRequest, reply: Reply },
    Logout { reply: oneshot::Sender<()> },
    SetToken(Option<String>),
    Token(oneshot::Sender<Option<String>>),
    Waiting(oneshot::Sender<usize>),
    Shutdown,
}

/// Completions posted back by the actor's own tasks.
enum SessionEvent {
    Expired(PendingCall),
    RenewalFinished(SessionResult<String>),
    LoggedIn {
        result: SessionResult<ApiResponse>,
        reply: Reply,
    },
}

// =============================================================================
// Session Client (handle)
// =============================================================================

/// Handle to a running session. Clone freely; all clones share one token and
/// one refresh queue.
#[derive(Clone)]
pub struct SessionClient {
    cmd_tx: mpsc::Sender<SessionCommand>,
    status_rx: watch::Receiver<SessionStatus>,
}

impl SessionClient {
    /// Spawns the session actor. Must be called inside a tokio runtime.
    pub fn start<T: Transport>(transport: Arc<T>, access_token: Option<String>) -> Self {
        SessionActor::start(transport, access_token)
    }

    /// Sends an authenticated request, renewing the token once if the server
    /// reports it expired.
    pub async fn call(&self, request: ApiRequest) -> SessionResult<ApiResponse> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Call { request, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// [`call`](Self::call), then fail on non-2xx and decode `data`.
    pub async fn call_data<D: DeserializeOwned>(&self, request: ApiRequest) -> SessionResult<D> {
        self.call(request).await?.error_for_status()?.data()
    }

    /// Signs in. The server sets the refresh cookie; the access token from
    /// the response becomes the session token.
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<ApiResponse> {
        let request = ApiRequest::post(LOGIN_PATH, json!({ "email": email, "password": password }));
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Login { request, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Clears local credentials and tells the server, best effort.
    pub async fn logout(&self) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Logout { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn set_access_token(&self, token: Option<String>) -> SessionResult<()> {
        self.send(SessionCommand::SetToken(token)).await
    }

    pub async fn access_token(&self) -> SessionResult<Option<String>> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Token(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Calls parked behind an in-flight renewal.
    pub async fn waiting(&self) -> SessionResult<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Waiting(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// Watch for sign-in / sign-out, e.g. to show a login screen.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Stops the actor. Calls still waiting fail with `Closed`.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> SessionResult<()> {
        self.cmd_tx.send(cmd).await.map_err(|_| SessionError::Closed)
    }
}

// =============================================================================
// Session Actor
// =============================================================================

struct SessionActor<T> {
    transport: Arc<T>,
    access_token: Option<String>,
    /// Set when a renewal fails, until the next token arrives.
    last_failure: Option<SessionError>,
    coordinator: RefreshCoordinator<PendingCall>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    status_tx: watch::Sender<SessionStatus>,
}

impl<T: Transport> SessionActor<T> {
    fn start(transport: Arc<T>, access_token: Option<String>) -> SessionClient {
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let initial = if access_token.is_some() {
            SessionStatus::SignedIn
        } else {
            SessionStatus::SignedOut
        };
        let (status_tx, status_rx) = watch::channel(initial);

        let actor = SessionActor {
            transport,
            access_token,
            last_failure: None,
            coordinator: RefreshCoordinator::new(),
            event_tx,
            status_tx,
        };

        tokio::spawn(async move {
            actor.run(cmd_rx, event_rx).await;
        });

        SessionClient { cmd_tx, status_rx }
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<SessionCommand>,
        mut event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        debug!("Session actor started");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    if !cmd.is_some_and(|cmd| self.handle_command(cmd)) {
                        debug!("Session actor stopping");
                        break;
                    }
                }
                Some(event) = event_rx.recv() => self.handle_event(event),
            }
        }
    }

    /// Returns `false` once the actor should stop.
    fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Call { request, reply } => self.dispatch(PendingCall {
                request,
                reply,
                retried: false,
                sent_with: None,
            }),
            SessionCommand::Login { request, reply } => self.login(request, reply),
            SessionCommand::Logout { reply } => self.logout(reply),
            SessionCommand::SetToken(token) => {
                let status = if token.is_some() {
                    SessionStatus::SignedIn
                } else {
                    SessionStatus::SignedOut
                };
                self.access_token = token;
                self.last_failure = None;
                self.status_tx.send_replace(status);
            }
            SessionCommand::Token(reply) => {
                let _ = reply.send(self.access_token.clone());
            }
            SessionCommand::Waiting(reply) => {
                let _ = reply.send(self.coordinator.waiting());
            }
            SessionCommand::Shutdown => return false,
        }
        true
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Expired(call) => self.on_expired(call),
            SessionEvent::RenewalFinished(Ok(token)) => {
                self.access_token = Some(token);
                self.last_failure = None;
                self.status_tx.send_replace(SessionStatus::SignedIn);

                let calls = self.coordinator.renewal_succeeded();
                info!(replayed = calls.len(), "Access token renewed");
                for mut call in calls {
                    call.retried = true;
                    self.dispatch(call);
                }
            }
            SessionEvent::RenewalFinished(Err(e)) => {
                let calls = self.coordinator.renewal_failed();
                warn!(error = %e, failed = calls.len(), "Access token renewal failed");
                self.clear_credentials();

                let error = SessionError::RenewalFailed(e.to_string());
                self.last_failure = Some(error.clone());
                for call in calls {
                    let _ = call.reply.send(Err(error.clone()));
                }
            }
            SessionEvent::LoggedIn { result, reply } => {
                let _ = reply.send(self.finish_login(result));
            }
        }
    }

    /// An expired call either settles against a token that changed while it
    /// was in flight, or goes to the coordinator.
    fn on_expired(&mut self, mut call: PendingCall) {
        let stale = !call.retried
            && self.coordinator.state() == RefreshState::Idle
            && call.sent_with != self.access_token;

        if stale {
            if self.access_token.is_some() {
                debug!(path = %call.request.path, "Token renewed while in flight, replaying");
                call.retried = true;
                self.dispatch(call);
            } else {
                let error = self.last_failure.clone().unwrap_or(SessionError::AuthExpired);
                let _ = call.reply.send(Err(error));
            }
            return;
        }

        let retried = call.retried;
        match self.coordinator.on_expired(call, retried) {
            ExpiredAction::StartRenewal => self.start_renewal(),
            ExpiredAction::Queued => {}
            ExpiredAction::Rejected(call) => {
                warn!(path = %call.request.path, "Request still unauthorized after renewal");
                let _ = call.reply.send(Err(SessionError::AuthExpired));
            }
        }
    }

    /// Sends the call on its own task; an expired token comes back as an event.
    fn dispatch(&self, mut call: PendingCall) {
        let transport = Arc::clone(&self.transport);
        let events = self.event_tx.clone();
        call.sent_with = self.access_token.clone();

        tokio::spawn(async move {
            let result = transport.send(&call.request, call.sent_with.as_deref()).await;
            match result {
                Err(SessionError::AuthExpired) => {
                    // If the actor is gone the reply drops and the caller sees Closed
                    let _ = events.send(SessionEvent::Expired(call));
                }
                result => {
                    let _ = call.reply.send(result);
                }
            }
        });
    }

    fn start_renewal(&self) {
        let transport = Arc::clone(&self.transport);
        let events = self.event_tx.clone();

        tokio::spawn(async move {
            let result = transport.renew().await;
            let _ = events.send(SessionEvent::RenewalFinished(result));
        });
    }

    fn login(&self, request: ApiRequest, reply: Reply) {
        let transport = Arc::clone(&self.transport);
        let events = self.event_tx.clone();

        tokio::spawn(async move {
            let result = transport.send(&request, None).await;
            let _ = events.send(SessionEvent::LoggedIn { result, reply });
        });
    }

    fn finish_login(&mut self, result: SessionResult<ApiResponse>) -> SessionResult<ApiResponse> {
        let response = match result {
            Ok(response) => response.error_for_status()?,
            // Login has no token to renew; 401 here means bad credentials
            Err(SessionError::AuthExpired) => {
                return Err(SessionError::Status {
                    status: 401,
                    message: "login rejected".into(),
                })
            }
            Err(e) => return Err(e),
        };

        let data: AccessTokenData = response.data()?;
        self.access_token = Some(data.access_token);
        self.last_failure = None;
        self.status_tx.send_replace(SessionStatus::SignedIn);
        info!("Signed in");
        Ok(response)
    }

    fn logout(&mut self, reply: oneshot::Sender<()>) {
        let token = self.access_token.clone();
        self.clear_credentials();

        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Some(token) = token {
                let request = ApiRequest::post(LOGOUT_PATH, json!({}));
                match transport.send(&request, Some(&token)).await {
                    Ok(response) if response.is_success() => {}
                    Ok(response) => warn!(status = response.status, "Server logout rejected"),
                    Err(e) => warn!(error = %e, "Server logout failed"),
                }
            }
            let _ = reply.send(());
        });
    }

    fn clear_credentials(&mut self) {
        self.access_token = None;
        self.transport.clear();
        self.status_tx.send_replace(SessionStatus::SignedOut);
        info!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Scripted server: accepts exactly one token, counts everything.
    struct FakeTransport {
        valid_token: Mutex<String>,
        renew_result: SessionResult<String>,
        rotate_on_renew: bool,
        gate: Semaphore,
        held_path: Mutex<Option<String>>,
        hold: Semaphore,
        sends: Mutex<HashMap<String, usize>>,
        renewals: AtomicUsize,
        clears: AtomicUsize,
    }

    impl FakeTransport {
        fn new(valid_token: &str, renew_result: SessionResult<String>, gated: bool) -> Arc<Self> {
            Self::build(valid_token, renew_result, gated, true)
        }

        /// `rotate_on_renew = false` makes the server refuse renewed tokens too.
        fn build(
            valid_token: &str,
            renew_result: SessionResult<String>,
            gated: bool,
            rotate_on_renew: bool,
        ) -> Arc<Self> {
            Arc::new(FakeTransport {
                valid_token: Mutex::new(valid_token.to_string()),
                renew_result,
                rotate_on_renew,
                gate: Semaphore::new(if gated { 0 } else { 100 }),
                held_path: Mutex::new(None),
                hold: Semaphore::new(0),
                sends: Mutex::new(HashMap::new()),
                renewals: AtomicUsize::new(0),
                clears: AtomicUsize::new(0),
            })
        }

        fn open_gate(&self) {
            self.gate.add_permits(100);
        }

        /// Requests to `path` stall until `release`.
        fn hold(&self, path: &str) {
            *self.held_path.lock().unwrap() = Some(path.to_string());
        }

        fn release(&self) {
            self.hold.add_permits(100);
        }

        fn sends(&self, path: &str) -> usize {
            self.sends.lock().unwrap().get(path).copied().unwrap_or(0)
        }

        fn renewals(&self) -> usize {
            self.renewals.load(Ordering::SeqCst)
        }

        fn clears(&self) -> usize {
            self.clears.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> SessionResult<ApiResponse> {
            *self.sends.lock().unwrap().entry(request.path.clone()).or_default() += 1;
            let held = self.held_path.lock().unwrap().as_deref() == Some(request.path.as_str());
            if held {
                self.hold.acquire().await.unwrap().forget();
            }
            let valid = self.valid_token.lock().unwrap().clone();

            if request.path == LOGIN_PATH {
                return Ok(ApiResponse::new(
                    200,
                    json!({"success": true, "statusCode": 200, "data": {"accessToken": valid}}),
                ));
            }

            match access_token {
                Some(token) if token == valid => Ok(ApiResponse::new(
                    200,
                    json!({"success": true, "statusCode": 200, "data": {"path": request.path, "token": token}}),
                )),
                _ => Err(SessionError::AuthExpired),
            }
        }

        async fn renew(&self) -> SessionResult<String> {
            self.renewals.fetch_add(1, Ordering::SeqCst);
            self.gate.acquire().await.unwrap().forget();

            if let (Ok(token), true) = (&self.renew_result, self.rotate_on_renew) {
                *self.valid_token.lock().unwrap() = token.clone();
            }
            self.renew_result.clone()
        }

        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_for_waiting(client: &SessionClient, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while client.waiting().await.unwrap() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("calls never queued behind the renewal");
    }

    fn spawn_calls(
        client: &SessionClient,
        paths: &[&'static str],
    ) -> Vec<tokio::task::JoinHandle<SessionResult<ApiResponse>>> {
        paths
            .iter()
            .map(|path| {
                let path: &'static str = *path;
                let client = client.clone();
                tokio::spawn(async move { client.call(ApiRequest::get(path)).await })
            })
            .collect()
    }

    async fn wait_for_sends(fake: &FakeTransport, path: &str, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while fake.sends(path) < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("request never reached the transport");
    }

    #[tokio::test]
    async fn test_valid_token_passes_through() {
        let fake = FakeTransport::new("good", Ok("fresh".into()), false);
        let client = SessionClient::start(fake.clone(), Some("good".into()));

        let response = client.call(ApiRequest::get("/products")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(fake.sends("/products"), 1);
        assert_eq!(fake.renewals(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_expiries_share_one_renewal() {
        let fake = FakeTransport::new("fresh", Ok("fresh".into()), true);
        let client = SessionClient::start(fake.clone(), Some("stale".into()));

        let paths = ["/a", "/b", "/c"];
        let handles = spawn_calls(&client, &paths);
        wait_for_waiting(&client, 3).await;
        assert_eq!(fake.renewals(), 1);

        fake.open_gate();
        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.body["data"]["token"], "fresh");
        }

        assert_eq!(fake.renewals(), 1);
        // Original attempt plus exactly one replay
        for path in paths {
            assert_eq!(fake.sends(path), 2);
        }
        assert_eq!(client.access_token().await.unwrap().as_deref(), Some("fresh"));
        assert_eq!(client.waiting().await.unwrap(), 0);
        assert_eq!(fake.clears(), 0);
    }

    #[tokio::test]
    async fn test_failed_renewal_fails_all_and_clears_once() {
        let rejection = SessionError::Status {
            status: 401,
            message: "Invalid refresh token".into(),
        };
        let fake = FakeTransport::new("fresh", Err(rejection), true);
        let client = SessionClient::start(fake.clone(), Some("stale".into()));
        let mut status = client.subscribe();

        let paths = ["/a", "/b", "/c"];
        let handles = spawn_calls(&client, &paths);
        wait_for_waiting(&client, 3).await;
        fake.open_gate();

        let mut errors = Vec::new();
        for handle in handles {
            errors.push(handle.await.unwrap().unwrap_err());
        }

        assert!(matches!(errors[0], SessionError::RenewalFailed(_)));
        assert!(errors.iter().all(|e| *e == errors[0]));
        assert!(errors[0].requires_login());

        assert_eq!(fake.clears(), 1);
        assert_eq!(fake.renewals(), 1);
        for path in paths {
            assert_eq!(fake.sends(path), 1);
        }
        assert_eq!(client.access_token().await.unwrap(), None);

        status.wait_for(|s| *s == SessionStatus::SignedOut).await.unwrap();
        assert_eq!(client.status(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_replayed_call_does_not_renew_again() {
        let fake = FakeTransport::build("never", Ok("fresh".into()), false, false);
        let client = SessionClient::start(fake.clone(), Some("stale".into()));

        let result = client.call(ApiRequest::get("/sales")).await;

        assert_eq!(result.unwrap_err(), SessionError::AuthExpired);
        assert_eq!(fake.renewals(), 1);
        assert_eq!(fake.sends("/sales"), 2);
        assert_eq!(client.waiting().await.unwrap(), 0);
        // The renewal itself succeeded, so the session is kept
        assert_eq!(fake.clears(), 0);
    }

    #[tokio::test]
    async fn test_late_expiry_after_failed_renewal_does_not_renew_again() {
        let rejection = SessionError::Status {
            status: 401,
            message: "Invalid refresh token".into(),
        };
        let fake = FakeTransport::new("fresh", Err(rejection), true);
        fake.hold("/slow");
        let client = SessionClient::start(fake.clone(), Some("stale".into()));

        let mut handles = spawn_calls(&client, &["/fast", "/slow"]);
        wait_for_sends(&fake, "/slow", 1).await;
        wait_for_waiting(&client, 1).await;
        fake.open_gate();

        let slow = handles.pop().unwrap();
        let fast = handles.pop().unwrap();
        let fast_err = fast.await.unwrap().unwrap_err();
        assert!(matches!(fast_err, SessionError::RenewalFailed(_)));
        assert_eq!(client.access_token().await.unwrap(), None);

        // Comes back unauthorized with the token the failed renewal replaced
        fake.release();
        let slow_err = slow.await.unwrap().unwrap_err();
        assert_eq!(slow_err, fast_err);

        assert_eq!(fake.renewals(), 1);
        assert_eq!(fake.clears(), 1);
        assert_eq!(fake.sends("/slow"), 1);
        assert_eq!(client.waiting().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_late_expiry_after_renewal_replays_with_new_token() {
        let fake = FakeTransport::new("fresh", Ok("fresh".into()), true);
        fake.hold("/slow");
        let client = SessionClient::start(fake.clone(), Some("stale".into()));

        let mut handles = spawn_calls(&client, &["/fast", "/slow"]);
        wait_for_sends(&fake, "/slow", 1).await;
        wait_for_waiting(&client, 1).await;
        fake.open_gate();

        let slow = handles.pop().unwrap();
        let fast = handles.pop().unwrap();
        assert_eq!(fast.await.unwrap().unwrap().body["data"]["token"], "fresh");
        assert_eq!(client.access_token().await.unwrap().as_deref(), Some("fresh"));

        fake.release();
        let response = slow.await.unwrap().unwrap();
        assert_eq!(response.body["data"]["token"], "fresh");

        assert_eq!(fake.renewals(), 1);
        assert_eq!(fake.sends("/slow"), 2);
        assert_eq!(fake.clears(), 0);
    }

    #[tokio::test]
    async fn test_next_expiry_after_renewal_renews_again() {
        let fake = FakeTransport::new("fresh", Ok("fresh".into()), false);
        let client = SessionClient::start(fake.clone(), Some("stale".into()));

        client.call(ApiRequest::get("/a")).await.unwrap();
        assert_eq!(fake.renewals(), 1);

        // Server-side expiry of the renewed token
        *fake.valid_token.lock().unwrap() = "rotated".into();
        let response = client.call(ApiRequest::get("/b")).await.unwrap();

        assert_eq!(response.body["data"]["token"], "fresh");
        assert_eq!(fake.renewals(), 2);
        assert_eq!(fake.sends("/b"), 2);
    }

    #[tokio::test]
    async fn test_login_stores_access_token() {
        let fake = FakeTransport::new("issued", Ok("fresh".into()), false);
        let client = SessionClient::start(fake.clone(), None);
        assert_eq!(client.status(), SessionStatus::SignedOut);

        client.login("owner@shop.io", "secret-password").await.unwrap();

        assert_eq!(client.access_token().await.unwrap().as_deref(), Some("issued"));
        assert_eq!(client.status(), SessionStatus::SignedIn);
        assert_eq!(client.call(ApiRequest::get("/stores")).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_logout_clears_once() {
        let fake = FakeTransport::new("good", Ok("fresh".into()), false);
        let client = SessionClient::start(fake.clone(), Some("good".into()));

        client.logout().await.unwrap();

        assert_eq!(fake.clears(), 1);
        assert_eq!(fake.sends(LOGOUT_PATH), 1);
        assert_eq!(client.access_token().await.unwrap(), None);
        assert_eq!(client.status(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_shutdown_closes_handle() {
        let fake = FakeTransport::new("good", Ok("fresh".into()), false);
        let client = SessionClient::start(fake, Some("good".into()));

        client.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(client.access_token().await.unwrap_err(), SessionError::Closed);
    }
}
