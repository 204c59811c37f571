//! Authenticated note session.
//!
//! A [`NoteSession`] owns one identity (auth token + account email) and exposes
//! the note operations. Sessions are caller-owned; create one per account.
//! The credential lock is only held while reading or replacing credentials,
//! never across a network call.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

use crate::config::{ServiceConfig, WireEncoding};
use crate::error::{classify_status, Error, Result};
use crate::models::{IndexQuery, Note, NoteKey, NoteListing, SearchResults};
use crate::timestamp;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};
use crate::util::excerpt;
use crate::wire;

const AUTH_COOKIE: &str = "auth";

#[derive(Clone, PartialEq, Eq)]
struct Credentials {
    token: String,
    email: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Client session for the note service.
#[derive(Debug)]
pub struct NoteSession<T: Transport = HttpTransport> {
    config: ServiceConfig,
    transport: T,
    credentials: Mutex<Option<Credentials>>,
    cancel: CancellationToken,
}

impl NoteSession<HttpTransport> {
    /// Build a session that talks HTTP to the configured service.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let config = config.validated()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> NoteSession<T> {
    pub fn with_transport(config: ServiceConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            credentials: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a token is stored. A stored token may still be stale.
    pub fn is_connected(&self) -> bool {
        self.lock_credentials().is_some()
    }

    /// Email of the connected account.
    pub fn email(&self) -> Option<String> {
        self.lock_credentials()
            .as_ref()
            .map(|credentials| credentials.email.clone())
    }

    /// Forget the stored identity locally.
    pub fn disconnect(&self) {
        *self.lock_credentials() = None;
    }

    /// Token that aborts in-flight and future calls on this session.
    ///
    /// Once cancelled, every operation fails with [`TransportError::Cancelled`];
    /// build a new session to continue.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Log in and keep the returned token for subsequent calls.
    ///
    /// Returns `Ok(false)` when the service rejects the credentials or answers
    /// without a token; nothing is stored in that case.
    pub async fn connect(&self, email: &str, password: &str) -> Result<bool> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::empty_argument("email"));
        }
        if password.is_empty() {
            return Err(Error::empty_argument("password"));
        }

        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .append_pair("password", password)
            .finish();
        let request =
            ApiRequest::post(&self.config.login_path).with_body(wire::encode_base64(&form));
        let response = self.dispatch(request).await?;

        if matches!(response.status, 400 | 401 | 403) {
            tracing::info!(status = response.status, "Login rejected by note service");
            return Ok(false);
        }
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                body: excerpt(&response.body),
            }
            .into());
        }

        let Some(token) = extract_token(&response) else {
            tracing::info!("Login response did not include an auth token");
            return Ok(false);
        };

        *self.lock_credentials() = Some(Credentials {
            token,
            email: email.to_string(),
        });
        tracing::info!("Connected to note service");
        Ok(true)
    }

    /// Fetch one page of the note index.
    pub async fn get_index(&self, query: &IndexQuery) -> Result<NoteListing> {
        if query.length == 0 {
            return Err(Error::InvalidArgument {
                name: "length",
                reason: "value must be at least 1",
            });
        }

        let mut request = ApiRequest::get(&self.config.index_path)
            .with_query(self.auth_query()?)
            .with_param("length", query.length.to_string());
        if let Some(mark) = query.mark.as_deref().filter(|mark| !mark.trim().is_empty()) {
            request = request.with_param("mark", mark);
        }
        if let Some(since) = query.since {
            request = request.with_param("since", timestamp::encode(since));
        }

        let response = check_status(self.dispatch(request).await?, None)?;
        let mut listing = wire::decode_index(&response.body, query.since)?;
        if !query.include_deleted {
            listing.items.retain(|note| !note.is_trashed());
        }

        tracing::debug!(
            items = listing.len(),
            has_more = listing.has_more(),
            "Fetched index page"
        );
        Ok(listing)
    }

    /// Walk the index from `query.mark` until the service stops returning a mark.
    pub async fn get_full_index(&self, query: IndexQuery) -> Result<Vec<Note>> {
        let mut query = query;
        let mut seen_marks = HashSet::new();
        let mut notes = Vec::new();

        loop {
            let NoteListing { items, mark, .. } = self.get_index(&query).await?;
            notes.extend(items);

            let Some(mark) = mark else {
                break;
            };
            if !seen_marks.insert(mark.clone()) {
                tracing::warn!(%mark, "Index returned a mark twice; stopping pagination");
                break;
            }
            query.mark = Some(mark);
        }

        Ok(notes)
    }

    /// Fetch a full note by key.
    pub async fn get_note(&self, key: &str) -> Result<Note> {
        let key = NoteKey::parse(key)?;
        let mut request = ApiRequest::get(&self.config.note_path)
            .with_segment(key.as_str())
            .with_query(self.auth_query()?);
        if self.config.encoding == WireEncoding::Base64 {
            request = request.with_param("encode", "base64");
        }

        let response = check_status(self.dispatch(request).await?, Some(&key))?;
        let mut note = wire::decode_fetched_note(&response, self.config.encoding)?;
        if note.key.is_none() {
            note.key = Some(key);
        }
        Ok(note)
    }

    /// Create (no key) or update (key set) a note and return the server's view.
    ///
    /// On update the service leaves `content` out of its answer when it did not
    /// change; the returned note then carries the content that was sent.
    pub async fn save(&self, note: &Note) -> Result<Note> {
        let query = self.auth_query()?;
        let key = note.key();
        let body = wire::encode_note(note, self.config.encoding)?;
        let mut request = ApiRequest::post(&self.config.note_path)
            .with_query(query)
            .with_body(body);
        if let Some(key) = key {
            request = request.with_segment(key.as_str());
        }

        let response = check_status(self.dispatch(request).await?, key)?;
        let mut saved = wire::decode_note(&response.body)?;

        if let Some(key) = key {
            if saved.key.is_none() {
                saved.key = Some(key.clone());
            }
            if saved.content.is_empty() {
                saved.content.clone_from(&note.content);
            }
        }

        tracing::debug!(
            key = saved.key().map(NoteKey::as_str),
            version = saved.version(),
            "Saved note"
        );
        Ok(saved)
    }

    /// Move a note to the trash, then remove it permanently.
    ///
    /// Returns `true` when the final delete answered without an error payload.
    ///
    /// The trash step resends the whole note, content included. Pass a note
    /// as fetched from [`get_note`](Self::get_note): a bare key with empty
    /// content blanks the stored text, and it stays blank in the trash if the
    /// purge is refused.
    pub async fn delete_note(&self, note: &Note) -> Result<bool> {
        let key = note
            .key()
            .cloned()
            .ok_or_else(|| Error::empty_argument("key"))?;

        let mut trashed = note.clone();
        trashed.deleted = Some(true);
        self.save(&trashed).await?;
        tracing::debug!(key = %key, "Moved note to trash");

        let request = ApiRequest::delete(&self.config.delete_path)
            .with_segment(key.as_str())
            .with_query(self.auth_query()?);
        let response = check_status(self.dispatch(request).await?, Some(&key))?;

        let purged = !wire::has_error_payload(&response.body);
        if !purged {
            tracing::warn!(key = %key, "Delete answered with an error payload");
        }
        Ok(purged)
    }

    /// Full-text search over note content.
    pub async fn search(&self, query: &str, max: u32, offset: u32) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::empty_argument("query"));
        }
        if max == 0 {
            return Err(Error::InvalidArgument {
                name: "max",
                reason: "value must be at least 1",
            });
        }

        let request = ApiRequest::get(&self.config.search_path)
            .with_query(self.auth_query()?)
            .with_param("query", query)
            .with_param("results", max.to_string())
            .with_param("offset", offset.to_string());
        let response = check_status(self.dispatch(request).await?, None)?;
        wire::decode_search(&response.body)
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        let key = request.segment.clone();

        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::debug!(%method, %path, key = key.as_deref(), "Request cancelled");
                return Err(TransportError::Cancelled.into());
            }
            result = self.transport.send(request) => result?,
        };

        tracing::debug!(
            %method,
            %path,
            key = key.as_deref(),
            status = response.status,
            "Note service responded"
        );
        Ok(response)
    }

    fn auth_query(&self) -> Result<Vec<(String, String)>> {
        let guard = self.lock_credentials();
        let credentials = guard.as_ref().ok_or(Error::NotAuthenticated)?;
        Ok(vec![
            ("auth".to_string(), credentials.token.clone()),
            ("email".to_string(), credentials.email.clone()),
        ])
    }

    fn lock_credentials(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_status(response: ApiResponse, key: Option<&NoteKey>) -> Result<ApiResponse> {
    match classify_status(response.status, key, &response.body) {
        None => Ok(response),
        Some(Error::AuthorizationExpired) => {
            tracing::warn!("Note service rejected the stored auth token");
            Err(Error::AuthorizationExpired)
        }
        Some(error) => Err(error),
    }
}

fn extract_token(response: &ApiResponse) -> Option<String> {
    if let Some(token) = response.cookie(AUTH_COOKIE) {
        return Some(token.to_string());
    }
    let body = response.body.trim();
    let looks_like_token = !body.is_empty()
        && !body.starts_with('{')
        && !body.starts_with('<')
        && !body.contains(char::is_whitespace);
    looks_like_token.then(|| body.to_string())
}
