use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Method;
use hyper::Request;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::header;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use tracing::{debug, info};

use super::{Filter, RecordStore, Row, Select, StoreError};

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Store backed by a PostgREST-compatible HTTP endpoint (`/rest/v1/{table}`).
pub struct RestStore {
    client: HttpsClient,
    rt: tokio::runtime::Runtime,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Create a store for the project at `base_url` authenticated with `api_key`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| StoreError::Permanent(format!("tokio runtime: {e}")))?;
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(https);
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client,
            rt,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}rest/v1/{}", self.base_url, encode_component(table))
    }

    fn select_url(&self, query: &Select) -> String {
        let mut params = vec!["select=*".to_string()];
        for filter in &query.filters {
            params.push(filter_param(filter));
        }
        if let Some(order) = &query.order {
            let dir = if order.descending { "desc" } else { "asc" };
            params.push(format!("order={}.{dir}", encode_component(&order.column)));
        }
        format!("{}?{}", self.table_url(&query.table), params.join("&"))
    }

    fn id_url(&self, table: &str, id: &str) -> String {
        format!("{}?id=eq.{}", self.table_url(table), encode_component(id))
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        prefer: Option<&str>,
    ) -> Result<Bytes, StoreError> {
        debug!(method = method.as_str(), url, "Store request");
        let mut builder = Request::builder()
            .method(method)
            .uri(url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json");
        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", prefer);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::from(Bytes::from(json.to_string()))),
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| StoreError::Permanent(e.to_string()))?;
        let res = self
            .client
            .request(req)
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?;
        let status = res.status();
        let bytes = res
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::Transient(e.to_string()))?
            .to_bytes();
        if status.is_success() {
            return Ok(bytes);
        }
        let message = format!("{status}: {}", String::from_utf8_lossy(&bytes));
        if status == StatusCode::NOT_FOUND {
            Err(StoreError::TableNotFound)
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(StoreError::Transient(message))
        } else {
            Err(StoreError::Permanent(message))
        }
    }

    async fn send_rows(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        prefer: Option<&str>,
    ) -> Result<Vec<Row>, StoreError> {
        let bytes = self.send(method, url, body, prefer).await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes[..]).map_err(|e| StoreError::Permanent(e.to_string()))
    }
}

impl RecordStore for RestStore {
    fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        self.rt.block_on(async {
            let url = self.select_url(query);
            let rows = self.send_rows(Method::GET, &url, None, None).await?;
            info!(table = %query.table, rows = rows.len(), "Fetched rows");
            Ok(rows)
        })
    }

    fn insert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        self.rt.block_on(async {
            let url = self.table_url(table);
            self.send(
                Method::POST,
                &url,
                Some(Value::Object(row)),
                Some("return=minimal"),
            )
            .await?;
            Ok(())
        })
    }

    fn update(&mut self, table: &str, id: &str, changes: Row) -> Result<(), StoreError> {
        self.rt.block_on(async {
            let url = self.id_url(table, id);
            let rows = self
                .send_rows(
                    Method::PATCH,
                    &url,
                    Some(Value::Object(changes)),
                    Some("return=representation"),
                )
                .await?;
            if rows.is_empty() {
                Err(StoreError::RowNotFound)
            } else {
                Ok(())
            }
        })
    }

    fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError> {
        self.rt.block_on(async {
            let url = self.id_url(table, id);
            let rows = self
                .send_rows(Method::DELETE, &url, None, Some("return=representation"))
                .await?;
            if rows.is_empty() {
                Err(StoreError::RowNotFound)
            } else {
                Ok(())
            }
        })
    }

    fn upsert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        self.rt.block_on(async {
            let url = self.table_url(table);
            self.send(
                Method::POST,
                &url,
                Some(Value::Object(row)),
                Some("resolution=merge-duplicates,return=minimal"),
            )
            .await?;
            Ok(())
        })
    }
}

fn filter_param(filter: &Filter) -> String {
    let column = encode_component(filter.column());
    match filter {
        Filter::Eq(_, Value::Null) => format!("{column}=is.null"),
        Filter::Eq(_, v) => format!("{column}=eq.{}", encode_component(&literal(v))),
        Filter::Gte(_, v) => format!("{column}=gte.{}", encode_component(&literal(v))),
        Filter::Lte(_, v) => format!("{column}=lte.{}", encode_component(&literal(v))),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
