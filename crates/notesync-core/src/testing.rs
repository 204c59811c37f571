//! In-memory stand-in for the note service, used by session tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::config::{ServiceConfig, WireEncoding};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

const START_TIME: f64 = 1_700_000_000.0;

#[derive(Debug, Default)]
struct FakeState {
    accounts: HashMap<String, String>,
    tokens: HashMap<String, String>,
    notes: BTreeMap<String, Map<String, Value>>,
    next_id: u64,
    clock: f64,
    scripted: VecDeque<Result<ApiResponse, TransportError>>,
    requests: Vec<ApiRequest>,
    purge_refusal: Option<String>,
}

/// Emulates login, index, note item, delete, and search endpoints.
#[derive(Debug)]
pub(crate) struct FakeNoteService {
    config: ServiceConfig,
    state: Mutex<FakeState>,
}

impl FakeNoteService {
    pub(crate) fn new(config: &ServiceConfig) -> Self {
        Self {
            config: config.clone(),
            state: Mutex::new(FakeState {
                clock: START_TIME,
                ..FakeState::default()
            }),
        }
    }

    pub(crate) fn with_account(self, email: &str, password: &str) -> Self {
        self.state()
            .accounts
            .insert(email.to_string(), password.to_string());
        self
    }

    /// Store a note directly, bypassing the API.
    pub(crate) fn insert_note(&self, key: &str, content: &str) {
        let mut state = self.state();
        let now = state.tick();
        let mut fields = Map::new();
        fields.insert("key".into(), json!(key));
        fields.insert("content".into(), json!(content));
        fields.insert("deleted".into(), json!(0));
        fields.insert("createdate".into(), json!(now.to_string()));
        fields.insert("modifydate".into(), json!(now.to_string()));
        fields.insert("version".into(), json!(1));
        fields.insert("syncnum".into(), json!(1));
        state.notes.insert(key.to_string(), fields);
    }

    /// Answer the next request with a canned result instead of emulating it.
    pub(crate) fn push_response(&self, response: Result<ApiResponse, TransportError>) {
        self.state().scripted.push_back(response);
    }

    /// Answer every purge with an `error` payload and keep the note.
    pub(crate) fn refuse_purges(&self, reason: &str) {
        self.state().purge_refusal = Some(reason.to_string());
    }

    /// Invalidate every issued token, as if they expired server-side.
    pub(crate) fn expire_tokens(&self) {
        self.state().tokens.clear();
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    pub(crate) fn stored(&self, key: &str) -> Option<Map<String, Value>> {
        self.state().notes.get(key).cloned()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state();
        let config = &self.config;

        if request.path == config.login_path {
            return state.login(request);
        }
        if !state.is_authorized(request) {
            return ApiResponse::new(401, "");
        }

        let on_items = request.path == config.note_path || request.path == config.delete_path;
        let item_key = request.segment.as_deref().filter(|_| on_items);

        match (request.method.as_str(), item_key) {
            ("GET", None) if request.path == config.index_path => state.index(request),
            ("GET", None) if request.path == config.search_path => state.search(request),
            ("POST", None) if request.path == config.note_path && request.segment.is_none() => {
                let body = self.decode_body(request);
                state.create(body)
            }
            ("GET", Some(key)) => state.fetch(key, config.encoding),
            ("POST", Some(key)) => {
                let body = self.decode_body(request);
                state.update(key, body)
            }
            ("DELETE", Some(key)) => state.purge(key),
            _ => ApiResponse::new(405, "unsupported route"),
        }
    }

    fn decode_body(&self, request: &ApiRequest) -> Map<String, Value> {
        let raw = request.body.clone().unwrap_or_default();
        let json = match self.config.encoding {
            WireEncoding::Json => raw,
            WireEncoding::Base64 => STANDARD
                .decode(raw.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_default(),
        };
        serde_json::from_str(&json).unwrap_or_default()
    }
}

impl FakeState {
    fn tick(&mut self) -> f64 {
        self.clock += 1.5;
        self.clock
    }

    fn login(&mut self, request: &ApiRequest) -> ApiResponse {
        let raw = request.body.as_deref().unwrap_or_default();
        let decoded = STANDARD
            .decode(raw)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_default();
        let form: HashMap<String, String> = form_urlencoded::parse(decoded.as_bytes())
            .into_owned()
            .collect();

        let (Some(email), Some(password)) = (form.get("email"), form.get("password")) else {
            return ApiResponse::new(400, "missing credentials");
        };
        if self.accounts.get(email) != Some(password) {
            return ApiResponse::new(401, "bad credentials");
        }

        self.next_id += 1;
        let token = format!("token-{}", self.next_id);
        self.tokens.insert(token.clone(), email.clone());
        ApiResponse::new(200, token.clone())
            .with_header("Set-Cookie", format!("auth={token}; Path=/; HttpOnly"))
    }

    fn is_authorized(&self, request: &ApiRequest) -> bool {
        match (request.param("auth"), request.param("email")) {
            (Some(token), Some(email)) => self.tokens.get(token).map(String::as_str) == Some(email),
            _ => false,
        }
    }

    fn index(&self, request: &ApiRequest) -> ApiResponse {
        let length = request
            .param("length")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(100);
        let since = request
            .param("since")
            .and_then(|value| value.parse::<f64>().ok());
        let mark = request.param("mark");

        let entries: Vec<&Map<String, Value>> = self
            .notes
            .iter()
            .filter(|(key, _)| mark.map_or(true, |mark| key.as_str() >= mark))
            .map(|(_, fields)| fields)
            .filter(|fields| since.map_or(true, |since| modified_of(fields) > since))
            .collect();

        let page: Vec<Value> = entries
            .iter()
            .take(length)
            .map(|fields| {
                json!({
                    "key": fields["key"],
                    "modifydate": fields["modifydate"],
                    "deleted": fields["deleted"],
                })
            })
            .collect();
        let next_mark = entries.get(length).map(|fields| fields["key"].clone());

        let mut body = json!({ "count": page.len(), "data": page });
        if let Some(next_mark) = next_mark {
            body["mark"] = next_mark;
        }
        ApiResponse::new(200, body.to_string())
    }

    fn search(&self, request: &ApiRequest) -> ApiResponse {
        let query = request.param("query").unwrap_or_default().to_lowercase();
        let max = request
            .param("results")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(10);
        let offset = request
            .param("offset")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(0);

        let matches: Vec<Value> = self
            .notes
            .values()
            .filter(|fields| {
                fields["content"]
                    .as_str()
                    .is_some_and(|content| content.to_lowercase().contains(&query))
            })
            .map(|fields| json!({ "key": fields["key"], "content": fields["content"] }))
            .collect();
        let page: Vec<&Value> = matches.iter().skip(offset).take(max).collect();

        let body = json!({ "Response": { "totalRecords": matches.len(), "Results": page } });
        ApiResponse::new(200, body.to_string())
    }

    fn fetch(&self, key: &str, encoding: WireEncoding) -> ApiResponse {
        let Some(fields) = self.notes.get(key) else {
            return ApiResponse::new(404, "");
        };
        let mut fields = fields.clone();
        if encoding == WireEncoding::Base64 {
            let content = fields["content"].as_str().unwrap_or_default();
            let encoded = STANDARD.encode(content.as_bytes());
            fields.insert("content".into(), json!(encoded));
        }
        ApiResponse::new(200, Value::Object(fields).to_string())
    }

    fn create(&mut self, mut body: Map<String, Value>) -> ApiResponse {
        self.next_id += 1;
        let key = format!("note-{}", self.next_id);
        let now = self.tick();
        body.insert("key".into(), json!(key));
        body.insert("createdate".into(), json!(now.to_string()));
        body.insert("modifydate".into(), json!(now.to_string()));
        body.entry("deleted").or_insert(json!(0));
        body.insert("version".into(), json!(1));
        body.insert("syncnum".into(), json!(1));
        body.insert("minversion".into(), json!(1));
        self.notes.insert(key, body.clone());
        ApiResponse::new(200, Value::Object(body).to_string())
    }

    fn update(&mut self, key: &str, body: Map<String, Value>) -> ApiResponse {
        let now = self.tick();
        let Some(stored) = self.notes.get_mut(key) else {
            return ApiResponse::new(404, "");
        };

        let content_changed = body
            .get("content")
            .is_some_and(|content| Some(content) != stored.get("content"));
        for field in ["content", "deleted", "tags", "systemtags"] {
            if let Some(value) = body.get(field) {
                stored.insert(field.to_string(), value.clone());
            }
        }
        stored.insert("modifydate".into(), json!(now.to_string()));
        bump(stored, "version");
        bump(stored, "syncnum");

        let mut response = stored.clone();
        if !content_changed {
            response.remove("content");
        }
        ApiResponse::new(200, Value::Object(response).to_string())
    }

    fn purge(&mut self, key: &str) -> ApiResponse {
        if let Some(reason) = &self.purge_refusal {
            return ApiResponse::new(200, json!({ "error": reason }).to_string());
        }
        if self.notes.remove(key).is_some() {
            ApiResponse::new(200, "")
        } else {
            ApiResponse::new(404, "")
        }
    }
}

impl Transport for FakeNoteService {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let scripted = {
            let mut state = self.state();
            state.requests.push(request.clone());
            state.scripted.pop_front()
        };
        match scripted {
            Some(result) => result,
            None => Ok(self.handle(&request)),
        }
    }
}

fn modified_of(fields: &Map<String, Value>) -> f64 {
    fields
        .get("modifydate")
        .and_then(Value::as_str)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

fn bump(fields: &mut Map<String, Value>, counter: &str) {
    let next = fields.get(counter).and_then(Value::as_u64).unwrap_or(0) + 1;
    fields.insert(counter.to_string(), json!(next));
}
