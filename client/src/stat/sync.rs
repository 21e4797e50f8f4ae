use crate::stat::{Ledger, MonthKey, datatype::*};
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("not signed in")]
    MissingToken,
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::MissingToken | ApiError::Decode(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResp {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryReq {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionReq {
    pub category_id: CategoryId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transaction_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Thin wrapper over the remote ledger REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &str) -> ApiResult<RequestBuilder> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(req
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json"))
    }

    // ============= Auth =============

    pub async fn sign_up(&self, email: &str, password: &str) -> ApiResult<()> {
        let resp = self
            .http
            .post(self.url("/auth/signup"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        check(resp).await?;
        tracing::info!(email, "account created");
        Ok(())
    }

    pub async fn log_in(&self, email: &str, password: &str) -> ApiResult<LoginResp> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        let body: LoginResp = decode(check(resp).await?).await?;
        tracing::info!(email, "logged in");
        Ok(body)
    }

    // ============= Categories =============

    pub async fn list_categories(
        &self,
        token: &str,
        kind: CategoryType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<Category>> {
        let req = self.http.get(self.url("/categories")).query(&[
            ("type", kind.as_str().to_string()),
            ("startDate", iso_day(start)),
            ("endDate", iso_day(end)),
        ]);
        let resp = self.authed(req, token)?.send().await?;
        let list: CategoryList = decode(check(resp).await?).await?;
        Ok(list.categories)
    }

    /// Expense and income lists fetched together, expense first.
    pub async fn list_all_categories(&self, token: &str, day: NaiveDate) -> ApiResult<Vec<Category>> {
        let (mut expense, income) = tokio::try_join!(
            self.list_categories(token, CategoryType::Expense, day, day),
            self.list_categories(token, CategoryType::Income, day, day),
        )?;
        expense.extend(income);
        Ok(expense)
    }

    pub async fn create_category(&self, token: &str, req: &CreateCategoryReq) -> ApiResult<()> {
        let builder = self.http.post(self.url("/categories/")).json(req);
        let resp = self.authed(builder, token)?.send().await?;
        check(resp).await?;
        tracing::info!(name = %req.name, kind = req.category_type.as_str(), "category created");
        Ok(())
    }

    pub async fn delete_category(&self, token: &str, category_id: &str) -> ApiResult<()> {
        let builder = self
            .http
            .delete(self.url(&format!("/categories/{category_id}/")));
        let resp = self.authed(builder, token)?.send().await?;
        check(resp).await?;
        tracing::info!(category_id, "category deleted");
        Ok(())
    }

    // ============= Transactions =============

    pub async fn list_transactions(
        &self,
        token: &str,
        month: MonthKey,
    ) -> ApiResult<Vec<TransactionWithCategory>> {
        let req = self.http.get(self.url("/transactions/")).query(&[
            ("start", iso_timestamp(month.first_day())),
            ("end", iso_timestamp(month.last_day())),
        ]);
        let resp = self.authed(req, token)?.send().await?;
        decode(check(resp).await?).await
    }

    pub async fn create_transaction(&self, token: &str, req: &CreateTransactionReq) -> ApiResult<()> {
        let builder = self.http.post(self.url("/transactions")).json(req);
        let resp = self.authed(builder, token)?.send().await?;
        check(resp).await?;
        tracing::info!(date = %req.transaction_date, amount = %req.amount, "transaction created");
        Ok(())
    }

    // ============= Statistics =============

    pub async fn statistics(
        &self,
        token: &str,
        kind: CategoryType,
        month: MonthKey,
    ) -> ApiResult<StatisticsReport> {
        let req = self
            .http
            .get(self.url("/statistics/"))
            .query(&stat_query(kind, month));
        let resp = self.authed(req, token)?.send().await?;
        decode(check(resp).await?).await
    }

    pub async fn delete_statistics(&self, token: &str, kind: CategoryType, month: MonthKey) -> ApiResult<()> {
        let req = self
            .http
            .delete(self.url("/statistics/"))
            .query(&stat_query(kind, month));
        let resp = self.authed(req, token)?.send().await?;
        check(resp).await?;
        tracing::info!(kind = kind.as_str(), %month, "statistics deleted");
        Ok(())
    }
}

/// Loads everything the home screen needs for `month`.
pub async fn download_ledger_from_server(
    api: &ApiClient,
    token: &str,
    month: MonthKey,
) -> ApiResult<Ledger> {
    let today = chrono::Local::now().date_naive();
    let (category, transaction) = tokio::try_join!(
        api.list_all_categories(token, today),
        api.list_transactions(token, month),
    )?;
    Ok(Ledger::new(category, transaction))
}

fn stat_query(kind: CategoryType, month: MonthKey) -> [(&'static str, String); 3] {
    [
        ("type", kind.as_str().to_string()),
        ("startDate", iso_day(month.first_day())),
        ("endDate", iso_day(month.last_day())),
    ]
}

pub fn iso_day(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn iso_timestamp(d: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", iso_day(d))
}

/// Body that is not the expected JSON becomes `ApiError::Decode`.
async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn check(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .map(|b| match b.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .filter(|m| !m.is_empty())
        .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    tracing::warn!(%status, %message, "request rejected");
    Err(ApiError::Status { status, message })
}
