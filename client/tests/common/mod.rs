//! In-process stand-in for the ledger REST API.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use serde_json::{Value, json};

pub const TOKEN: &str = "stub-token";

type Reply = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct StubState {
    pub users: HashMap<String, String>,
    pub categories: Vec<Value>,
    pub transactions: Vec<Value>,
    pub next_id: i64,
    pub seen: Vec<Seen>,
    pub queries: Vec<(String, HashMap<String, String>)>,
    pub created_transactions: Vec<Value>,
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct Stub {
    pub base_url: String,
    pub state: Shared,
}

impl Stub {
    pub fn seed_user(&self, email: &str, password: &str) {
        let mut s = self.state.lock().unwrap();
        s.users.insert(email.to_string(), password.to_string());
    }

    pub fn seed_category(&self, id: i64, name: &str, kind: &str, color: &str) {
        let mut s = self.state.lock().unwrap();
        s.categories.push(json!({
            "id": id,
            "user_id": 1,
            "name": name,
            "type": kind,
            "color": color,
            "created_at": "2025-01-01T00:00:00Z",
        }));
        s.next_id = s.next_id.max(id);
    }

    pub fn seed_transaction(&self, id: i64, category_id: Option<i64>, amount: f64, date: &str, desc: &str) {
        let mut s = self.state.lock().unwrap();
        let category = category_id
            .and_then(|cid| s.categories.iter().find(|c| id_str(&c["id"]) == cid.to_string()).cloned());
        s.transactions.push(json!({
            "id": id,
            "user_id": 1,
            "amount": amount,
            "description": desc,
            "transaction_date": date,
            "category": category.map(embed_category),
        }));
        s.next_id = s.next_id.max(id);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.lock().unwrap().seen.clone()
    }

    pub fn queries_for(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.state
            .lock()
            .unwrap()
            .queries
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

pub async fn spawn() -> Stub {
    let state = Shared::default();
    let base_url = serve(router(state.clone())).await;
    Stub { base_url, state }
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn router(state: Shared) -> Router {
    let protected = Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/", post(create_category))
        .route("/categories/:id/", axum::routing::delete(delete_category))
        .route("/transactions/", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/statistics/", get(statistics).delete(delete_statistics))
        .layer(from_fn_with_state(state.clone(), auth_middleware));
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

fn detail(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": msg })))
}

fn id_str(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn embed_category(c: Value) -> Value {
    json!({ "id": c["id"], "name": c["name"], "type": c["type"], "color": c["color"] })
}

fn day_of(v: &str) -> String {
    v.chars().take(10).collect()
}

fn in_range(t: &Value, start: &str, end: &str) -> bool {
    let d = day_of(t["transaction_date"].as_str().unwrap_or_default());
    d.as_str() >= start && d.as_str() <= end
}

fn kind_of(t: &Value) -> String {
    t["category"]["type"].as_str().unwrap_or("expense").to_string()
}

async fn auth_middleware(
    State(state): State<Shared>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().seen.push(Seen {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: auth.clone(),
    });

    let token = auth
        .as_deref()
        .and_then(|a| a.strip_prefix("Bearer "))
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    if token != TOKEN {
        return Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"));
    }
    Ok(next.run(req).await)
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut s = state.lock().unwrap();
    if s.users.contains_key(&email) {
        return Err(detail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    s.users.insert(email.clone(), password);
    Ok((StatusCode::CREATED, Json(json!({ "id": s.users.len(), "email": email }))))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let s = state.lock().unwrap();
    match s.users.get(email) {
        Some(p) if p == password => Ok((
            StatusCode::OK,
            Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
        )),
        _ => Err(detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")),
    }
}

async fn list_categories(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    s.queries.push(("/categories".into(), q.clone()));
    let kind = q.get("type").cloned().unwrap_or_default();
    let list: Vec<Value> = s
        .categories
        .iter()
        .filter(|c| kind.is_empty() || c["type"] == kind.as_str())
        .cloned()
        .collect();
    Ok((StatusCode::OK, Json(json!({ "categories": list }))))
}

async fn create_category(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "name is required"));
    }
    let mut s = state.lock().unwrap();
    s.next_id += 1;
    let category = json!({
        "id": s.next_id,
        "user_id": 1,
        "name": name,
        "type": body["type"],
        "color": body["color"],
    });
    s.categories.push(category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(State(state): State<Shared>, Path(id): Path<String>) -> Reply {
    let mut s = state.lock().unwrap();
    let before = s.categories.len();
    s.categories.retain(|c| id_str(&c["id"]) != id);
    if s.categories.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Category not found"));
    }
    for t in s.transactions.iter_mut() {
        if id_str(&t["category"]["id"]) == id {
            t["category"] = Value::Null;
        }
    }
    Ok((StatusCode::OK, Json(json!({ "message": "Category deleted" }))))
}

async fn list_transactions(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    s.queries.push(("/transactions/".into(), q.clone()));
    let start = day_of(q.get("start").map(String::as_str).unwrap_or("0000-01-01"));
    let end = day_of(q.get("end").map(String::as_str).unwrap_or("9999-12-31"));
    let list: Vec<Value> = s
        .transactions
        .iter()
        .filter(|t| in_range(t, &start, &end))
        .cloned()
        .collect();
    Ok((StatusCode::OK, Json(Value::Array(list))))
}

async fn create_transaction(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut s = state.lock().unwrap();
    let cid = id_str(&body["category_id"]);
    let Some(category) = s.categories.iter().find(|c| id_str(&c["id"]) == cid).cloned() else {
        return Err(detail(StatusCode::NOT_FOUND, "Category not found"));
    };
    s.next_id += 1;
    let tx = json!({
        "id": s.next_id,
        "user_id": 1,
        "amount": body["amount"],
        "description": body["description"],
        "transaction_date": body["transaction_date"],
        "category": embed_category(category),
    });
    s.transactions.push(tx.clone());
    s.created_transactions.push(body);
    Ok((StatusCode::CREATED, Json(tx)))
}

fn stat_filter(q: &HashMap<String, String>) -> (String, String, String) {
    (
        q.get("type").cloned().unwrap_or_else(|| "expense".into()),
        q.get("startDate").cloned().unwrap_or_default(),
        q.get("endDate").cloned().unwrap_or_default(),
    )
}

async fn statistics(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    s.queries.push(("/statistics/".into(), q.clone()));
    let (kind, start, end) = stat_filter(&q);

    let mut groups: Vec<(Value, f64, u32, Vec<String>)> = Vec::new();
    for t in s.transactions.iter().filter(|t| in_range(t, &start, &end) && kind_of(t) == kind) {
        let amount = t["amount"].as_f64().unwrap_or_default();
        let desc = t["description"].as_str().unwrap_or_default().to_string();
        match groups.iter_mut().find(|g| g.0["id"] == t["category"]["id"]) {
            Some(g) => {
                g.1 += amount;
                g.2 += 1;
                g.3.push(desc);
            }
            None => groups.push((t["category"].clone(), amount, 1, vec![desc])),
        }
    }
    let total: f64 = groups.iter().map(|g| g.1).sum();
    let stats: Vec<Value> = groups
        .into_iter()
        .map(|(c, sum, count, descs)| {
            let percentage = if total > 0.0 { sum / total * 100.0 } else { 0.0 };
            json!({
                "category_id": c["id"],
                "category_name": c["name"],
                "category_color": c["color"],
                "total": sum,
                "count": count,
                "percentage": percentage,
                "descriptions": descs.join(", "),
            })
        })
        .collect();
    Ok((
        StatusCode::OK,
        Json(json!({ "categoryStats": stats, "totalAmount": total })),
    ))
}

async fn delete_statistics(
    State(state): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Reply {
    let mut s = state.lock().unwrap();
    s.queries.push(("/statistics/".into(), q.clone()));
    let (kind, start, end) = stat_filter(&q);
    let before = s.transactions.len();
    s.transactions
        .retain(|t| !(in_range(t, &start, &end) && kind_of(t) == kind));
    let deleted = before - s.transactions.len();
    Ok((StatusCode::OK, Json(json!({ "deleted": deleted }))))
}
