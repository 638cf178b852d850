//! Request boundary: routing, payload validation, and the mapping from
//! store results to status codes.
//!
//! Requests arrive as `METHOD PATH [JSON-BODY]`. Every route lives under
//! [`API_PREFIX`].

use std::fmt;
use std::str::FromStr;

use assetgroup_core::error::{AssetGroupError, AssetGroupResult};
use assetgroup_core::models::rule::{CreateRule, UpdateRule};
use assetgroup_core::repository::GroupingRepository;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl FromStr for Method {
    type Err = AssetGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(AssetGroupError::NotImplemented {
                operation: format!("method {other}"),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// Parse one `METHOD PATH [BODY]` request line.
pub fn parse_request(line: &str) -> AssetGroupResult<ApiRequest> {
    let line = line.trim();
    let (method, rest) = line.split_once(char::is_whitespace).ok_or_else(|| {
        AssetGroupError::InvalidPayload {
            message: "expected `METHOD PATH [BODY]`".into(),
        }
    })?;
    let rest = rest.trim_start();
    let (path, body) = match rest.split_once(char::is_whitespace) {
        Some((path, body)) => (path, Some(body.trim())),
        None => (rest, None),
    };

    Ok(ApiRequest {
        method: method.parse()?,
        path: path.to_owned(),
        body: body.filter(|b| !b.is_empty()).map(str::to_owned),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => Self::from_error(&AssetGroupError::Internal(e.to_string())),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn from_error(err: &AssetGroupError) -> Self {
        Self {
            status: status_for(err),
            body: Some(json!({ "detail": err.to_string() })),
        }
    }
}

pub fn status_for(err: &AssetGroupError) -> u16 {
    match err {
        AssetGroupError::InvalidPayload { .. } => 400,
        AssetGroupError::NotFound { .. } => 404,
        AssetGroupError::NotImplemented { .. } => 501,
        AssetGroupError::Internal(_) => 500,
    }
}

enum Route<'a> {
    Assets,
    Asset(&'a str),
    Rules,
    Rule(&'a str),
    Reprocess,
}

fn route(path: &str) -> Option<Route<'_>> {
    let rest = path.strip_prefix(API_PREFIX)?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["assets"] => Some(Route::Assets),
        ["assets", id] => Some(Route::Asset(*id)),
        ["rules"] => Some(Route::Rules),
        ["rules", id] => Some(Route::Rule(*id)),
        ["reprocess"] => Some(Route::Reprocess),
        _ => None,
    }
}

/// Handle one request against `repo`. Errors become their status code
/// with a `{"detail": ...}` body.
pub async fn handle<R: GroupingRepository>(repo: &R, request: &ApiRequest) -> ApiResponse {
    match dispatch(repo, request).await {
        Ok(response) => response,
        Err(err) => {
            debug!(method = %request.method, path = %request.path, error = %err, "Request failed");
            ApiResponse::from_error(&err)
        }
    }
}

async fn dispatch<R: GroupingRepository>(
    repo: &R,
    request: &ApiRequest,
) -> AssetGroupResult<ApiResponse> {
    let route = route(&request.path).ok_or_else(|| AssetGroupError::NotFound {
        entity: "route".into(),
        id: request.path.clone(),
    })?;
    let body = request.body.as_deref();

    match (request.method, route) {
        (Method::Post, Route::Assets) => {
            let asset = repo.create_asset(payload(body)?).await?;
            Ok(ApiResponse::json(201, &asset))
        }
        (Method::Get, Route::Assets) => Ok(ApiResponse::json(200, &repo.list_assets().await?)),
        (Method::Get, Route::Asset(id)) => {
            let asset = repo.get_asset(parse_id(id, "asset")?).await?;
            Ok(ApiResponse::json(200, &asset))
        }
        (Method::Patch, Route::Asset(id)) => {
            let id = parse_id(id, "asset")?;
            let asset = repo.update_asset(id, payload(body)?).await?;
            Ok(ApiResponse::json(200, &asset))
        }
        (Method::Delete, Route::Asset(id)) => {
            repo.delete_asset(parse_id(id, "asset")?).await?;
            Ok(ApiResponse::no_content())
        }
        (Method::Post, Route::Rules) => {
            let input: CreateRule = payload(body)?;
            require_group_name(&input.group_name)?;
            let rule = repo.create_rule(input).await?;
            Ok(ApiResponse::json(201, &rule))
        }
        (Method::Get, Route::Rules) => Ok(ApiResponse::json(200, &repo.list_rules().await?)),
        (Method::Get, Route::Rule(id)) => {
            let rule = repo.get_rule(parse_id(id, "rule")?).await?;
            Ok(ApiResponse::json(200, &rule))
        }
        (Method::Patch, Route::Rule(id)) => {
            let id = parse_id(id, "rule")?;
            let input: UpdateRule = payload(body)?;
            if let Some(group_name) = &input.group_name {
                require_group_name(group_name)?;
            }
            let rule = repo.update_rule(id, input).await?;
            Ok(ApiResponse::json(200, &rule))
        }
        (Method::Delete, Route::Rule(id)) => {
            repo.delete_rule(parse_id(id, "rule")?).await?;
            Ok(ApiResponse::no_content())
        }
        (Method::Post, Route::Reprocess) => {
            let regrouped = repo.reprocess().await?;
            Ok(ApiResponse::json(200, &json!({ "regrouped": regrouped })))
        }
        (method, _) => Err(AssetGroupError::NotImplemented {
            operation: format!("{method} {}", request.path),
        }),
    }
}

/// Deserialize a request body into a typed payload. Missing fields and
/// unknown operators are rejected here, before the store sees anything.
fn payload<T: DeserializeOwned>(body: Option<&str>) -> AssetGroupResult<T> {
    let body = body.ok_or_else(|| AssetGroupError::InvalidPayload {
        message: "request body is required".into(),
    })?;
    serde_json::from_str(body).map_err(|e| AssetGroupError::InvalidPayload {
        message: e.to_string(),
    })
}

/// A blank group name would read as ungrouped yet stop the asset from
/// ever being reprocessed.
fn require_group_name(group_name: &str) -> AssetGroupResult<()> {
    if group_name.trim().is_empty() {
        return Err(AssetGroupError::InvalidPayload {
            message: "group_name must not be empty".into(),
        });
    }
    Ok(())
}

/// Ids that are not UUIDs cannot name a stored record.
fn parse_id(raw: &str, entity: &str) -> AssetGroupResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AssetGroupError::NotFound {
        entity: entity.into(),
        id: raw.into(),
    })
}
