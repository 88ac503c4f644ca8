//! HTTPS client adapter.
//!
//! Implements [`HttpPort`] on top of `esp_idf_svc::http::client`. The
//! server chain is always verified, either against a pinned root or the
//! ESP-IDF CA bundle; there is no code path without verification.
//!
//! Failure classification:
//!
//! | Failure                                  | Result                   |
//! |------------------------------------------|--------------------------|
//! | non-https URL, client construction       | `HttpError::Setup`       |
//! | connect / TLS / write / read / timeout   | `HttpError::NoResponse`  |
//! | body longer than `max_body`              | `HttpError::BodyTooLarge`|
//! | any HTTP status                          | `Ok(HttpResponse)`       |
//!
//! The simulation backend is a loopback that issues `sim-<device_id>`
//! for provisioning requests and echoes relay prompts.

use log::{info, warn};

use crate::app::ports::{HttpError, HttpPort, HttpRequest, HttpResponse};

use super::cert_store::TrustMaterial;

pub struct HttpsAdapter {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    trust: TrustMaterial,
    max_body: usize,
}

impl HttpsAdapter {
    /// `max_body` is `GatewayConfig::http_max_response_bytes`.
    pub fn new(trust: TrustMaterial, max_body: usize) -> Self {
        Self { trust, max_body }
    }
}

fn check_body_len(len: usize, max_body: usize) -> Result<(), HttpError> {
    if len > max_body {
        warn!("HTTPS: response body over {}B discarded", max_body);
        return Err(HttpError::BodyTooLarge);
    }
    Ok(())
}

fn check_url(url: &str) -> Result<(), HttpError> {
    match url.strip_prefix("https://") {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => {
            warn!("HTTPS: refusing URL '{}'", url);
            Err(HttpError::Setup)
        }
    }
}

#[cfg(target_os = "espidf")]
impl HttpPort for HttpsAdapter {
    fn post(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpError> {
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::http::Method;
        use esp_idf_svc::tls::X509;

        check_url(request.url)?;

        let mut config = Configuration {
            timeout: Some(request.timeout),
            ..Default::default()
        };
        match self.trust {
            TrustMaterial::PinnedRoot(pem) => {
                config.server_certificate = Some(X509::pem_until_nul(pem));
            }
            TrustMaterial::Bundle => {
                config.crt_bundle_attach = Some(esp_idf_svc::sys::esp_crt_bundle_attach);
            }
        }

        let mut conn = EspHttpConnection::new(&config).map_err(|e| {
            warn!("HTTPS: client init failed: {}", e);
            HttpError::Setup
        })?;

        let content_length = request.body.len().to_string();
        let mut headers: Vec<(&str, &str)> = request.headers.to_vec();
        headers.push(("Content-Length", &content_length));

        let no_response = |stage: &str, e: esp_idf_svc::sys::EspError| {
            warn!("HTTPS: {} failed: {}", stage, e);
            HttpError::NoResponse
        };

        conn.initiate_request(Method::Post, request.url, &headers)
            .map_err(|e| no_response("connect", e))?;

        let mut sent = 0;
        while sent < request.body.len() {
            let n = conn
                .write(&request.body[sent..])
                .map_err(|e| no_response("write", e))?;
            if n == 0 {
                return Err(HttpError::NoResponse);
            }
            sent += n;
        }

        conn.initiate_response().map_err(|e| no_response("response", e))?;
        let status = conn.status();

        let mut body = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            let n = conn.read(&mut chunk).map_err(|e| no_response("read", e))?;
            if n == 0 {
                break;
            }
            check_body_len(body.len() + n, self.max_body)?;
            body.extend_from_slice(&chunk[..n]);
        }

        info!("HTTPS: POST {} -> {} ({}B)", request.url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpPort for HttpsAdapter {
    fn post(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpError> {
        check_url(request.url)?;

        let is_json = request
            .headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("content-type") && *value == "application/json");

        let response = if is_json {
            let device_id = serde_json::from_slice::<serde_json::Value>(request.body)
                .ok()
                .and_then(|v| v.get("device_id").and_then(|id| id.as_str()).map(str::to_string));
            match device_id {
                Some(id) => HttpResponse { status: 200, body: format!("sim-{id}").into_bytes() },
                None => HttpResponse { status: 400, body: b"BAD REQUEST".to_vec() },
            }
        } else {
            HttpResponse { status: 200, body: request.body.to_vec() }
        };
        check_body_len(response.body.len(), self.max_body)?;

        info!("HTTPS(sim): POST {} -> {} ({}B)", request.url, response.status, response.body.len());
        Ok(response)
    }
}
