//! Stateful fake of the search backend's security and index APIs.
//!
//! A single wiremock responder keeps tenants, roles, role mappings, indices
//! and aliases in memory, logs every request and can be told to fail a
//! specific call.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use searchctx_client::{AccessControlClient, AccessControlSession};
use searchctx_core::BearerToken;
use serde_json::{json, Map, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SECURITY_PATH: &str = "/_plugins/_security/api";
pub const TEST_TOKEN: &str = "test-token-123";

#[derive(Debug, Default)]
struct BackendState {
    tenants: BTreeMap<String, Value>,
    roles: BTreeMap<String, Value>,
    role_mappings: BTreeMap<String, Value>,
    indices: BTreeSet<String>,
    aliases: BTreeSet<(String, String)>,
    requests: Vec<(String, String)>,
    failures: Vec<(String, String, u16)>,
}

/// A recorded request: HTTP method and path.
pub type RecordedRequest = (String, String);

pub struct FakeSearchBackend {
    server: MockServer,
    state: Arc<Mutex<BackendState>>,
}

impl FakeSearchBackend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(BackendState::default()));
        Mock::given(any())
            .respond_with(Responder {
                state: state.clone(),
            })
            .mount(&server)
            .await;
        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn session(&self) -> AccessControlSession {
        AccessControlClient::with_http_client(self.uri(), SECURITY_PATH, reqwest::Client::new())
            .session(BearerToken::new(TEST_TOKEN))
    }

    // =========================================================================
    // Seeding and failure injection
    // =========================================================================

    pub fn seed_tenant(&self, name: &str) {
        self.lock()
            .tenants
            .insert(name.to_string(), json!({ "description": "" }));
    }

    pub fn seed_role(&self, name: &str) {
        self.lock().roles.insert(name.to_string(), json!({}));
    }

    pub fn seed_role_mapping(&self, name: &str) {
        self.lock()
            .role_mappings
            .insert(name.to_string(), json!({ "and_backend_roles": [] }));
    }

    pub fn seed_index(&self, name: &str) {
        self.lock().indices.insert(name.to_string());
    }

    /// Answer `status` to every `method` request on `path`.
    pub fn fail(&self, method: &str, path: &str, status: u16) {
        self.lock()
            .failures
            .push((method.to_string(), path.to_string(), status));
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn tenants(&self) -> BTreeMap<String, Value> {
        self.lock().tenants.clone()
    }

    pub fn role_names(&self) -> BTreeSet<String> {
        self.lock().roles.keys().cloned().collect()
    }

    pub fn role(&self, name: &str) -> Option<Value> {
        self.lock().roles.get(name).cloned()
    }

    pub fn role_mapping_names(&self) -> BTreeSet<String> {
        self.lock().role_mappings.keys().cloned().collect()
    }

    /// Backend roles bound by mapping `name`.
    pub fn mapped_backend_roles(&self, name: &str) -> Option<Vec<String>> {
        let state = self.lock();
        let mapping = state.role_mappings.get(name)?;
        let roles = mapping["and_backend_roles"].as_array()?;
        Some(
            roles
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect(),
        )
    }

    pub fn indices(&self) -> BTreeSet<String> {
        self.lock().indices.clone()
    }

    pub fn aliases(&self) -> BTreeSet<(String, String)> {
        self.lock().aliases.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests with `method` whose path starts with `prefix`.
    pub fn requests_matching(&self, method: &str, prefix: &str) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .filter(|(m, p)| m == method && p.starts_with(prefix))
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Whether the backend holds nothing at all.
    pub fn is_empty(&self) -> bool {
        let state = self.lock();
        state.tenants.is_empty()
            && state.roles.is_empty()
            && state.role_mappings.is_empty()
            && state.indices.is_empty()
            && state.aliases.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }
}

struct Responder {
    state: Arc<Mutex<BackendState>>,
}

impl Respond for Responder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_string();
        let path = request.url.path().to_string();
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.clone(), path.clone()));

        let expected = format!("Bearer {TEST_TOKEN}");
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(expected.as_str());
        if !authorized {
            return ResponseTemplate::new(401);
        }

        if let Some((_, _, status)) = state
            .failures
            .iter()
            .find(|(m, p, _)| *m == method && *p == path)
        {
            return ResponseTemplate::new(*status);
        }

        let body: Option<Value> = serde_json::from_slice(&request.body).ok();

        if let Some(rest) = path.strip_prefix(SECURITY_PATH) {
            return security_api(&mut state, &method, rest, body);
        }
        if let Some(index) = path.strip_prefix("/_cat/indices/") {
            return if state.indices.contains(index) {
                ResponseTemplate::new(200).set_body_string(format!("green open {index}"))
            } else {
                ResponseTemplate::new(404)
            };
        }
        index_api(&mut state, &method, &path)
    }
}

fn security_api(
    state: &mut BackendState,
    method: &str,
    rest: &str,
    body: Option<Value>,
) -> ResponseTemplate {
    let segments: Vec<&str> = rest.trim_start_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        ("GET", ["tenants"]) => {
            let listing: Map<String, Value> = state
                .tenants
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            ResponseTemplate::new(200).set_body_json(Value::Object(listing))
        }
        ("PUT", [kind, name]) => {
            let Some(body) = body else {
                return ResponseTemplate::new(400);
            };
            let store = match *kind {
                "tenants" => &mut state.tenants,
                "roles" => &mut state.roles,
                "rolesmapping" => &mut state.role_mappings,
                _ => return ResponseTemplate::new(400),
            };
            let created = store.insert((*name).to_string(), body).is_none();
            ResponseTemplate::new(if created { 201 } else { 200 })
        }
        ("DELETE", [kind, name]) => {
            let store = match *kind {
                "tenants" => &mut state.tenants,
                "roles" => &mut state.roles,
                "rolesmapping" => &mut state.role_mappings,
                _ => return ResponseTemplate::new(400),
            };
            match store.remove(*name) {
                Some(_) => ResponseTemplate::new(200),
                None => ResponseTemplate::new(404),
            }
        }
        _ => ResponseTemplate::new(400),
    }
}

fn index_api(state: &mut BackendState, method: &str, path: &str) -> ResponseTemplate {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        ("PUT", [index]) => {
            if state.indices.insert((*index).to_string()) {
                ResponseTemplate::new(200)
            } else {
                ResponseTemplate::new(400).set_body_json(json!({
                    "error": { "type": "resource_already_exists_exception" },
                    "status": 400
                }))
            }
        }
        ("PUT", [index, "_alias", alias]) => {
            if state.indices.contains(*index) {
                state
                    .aliases
                    .insert(((*index).to_string(), (*alias).to_string()));
                ResponseTemplate::new(200)
            } else {
                ResponseTemplate::new(404)
            }
        }
        _ => ResponseTemplate::new(400),
    }
}
