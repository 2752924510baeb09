//! The HTTP front end: a `pingora_proxy::ProxyHttp` service that answers
//! every request directly from `request_filter`, mirroring the teacher
//! stack's static-response filter pattern rather than its reverse-proxy
//! one — this service never calls `upstream_peer`.

mod route;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use pingora::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};

use crate::catalogue::store::CatalogueStore;
use route::{resolve_query, RouteKind};

const PAC_CONTENT_TYPE: &str = "application/x-ns-proxy-autoconfig";
const DEBUG_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// The `tracing` target used exclusively for access-log lines, so
/// `main.rs`'s access-log file layer can filter on it without also
/// capturing ordinary application logs.
pub const ACCESS_LOG_TARGET: &str = "pacserve::access_log";

pub struct PacProxyService {
    store: Arc<CatalogueStore>,
    router: matchit::Router<RouteKind>,
}

impl PacProxyService {
    pub fn new(store: Arc<CatalogueStore>) -> Self {
        let mut router = matchit::Router::new();
        router.insert("/", RouteKind::Root).expect("static route");
        router
            .insert("/wpad.dat", RouteKind::Wpad)
            .expect("static route");
        router.insert("/{ip}", RouteKind::Ip).expect("param route");
        router
            .insert("/{ip}/{cidr}", RouteKind::IpCidr)
            .expect("param route");
        router
            .insert("/metrics", RouteKind::Metrics)
            .expect("static route");

        Self { store, router }
    }
}

pub struct RequestContext {
    started_at: Instant,
}

#[async_trait]
impl ProxyHttp for PacProxyService {
    type CTX = RequestContext;

    fn new_ctx(&self) -> Self::CTX {
        RequestContext {
            started_at: Instant::now(),
        }
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool>
    where
        Self::CTX: Send + Sync,
    {
        let path = session.req_header().uri.path().to_string();
        let query = session.req_header().uri.query().unwrap_or("").to_string();
        let client_ip = client_ipv4(session);
        let debug = query_has_debug(&query);

        let route_match = self.router.at(&path);
        let (route, ip_param, cidr_param) = match route_match {
            Ok(matched) => (
                *matched.value,
                matched.params.get("ip").unwrap_or("").to_string(),
                matched.params.get("cidr").unwrap_or("").to_string(),
            ),
            Err(_) => (RouteKind::Root, String::new(), String::new()),
        };

        if matches!(route, RouteKind::Metrics) {
            self.write_response(
                session,
                http::StatusCode::OK,
                METRICS_CONTENT_TYPE,
                crate::metrics::render(),
            )
            .await?;
            log_access(&path, 200, client_ip, ctx.started_at);
            return Ok(true);
        }

        // Wpad is served directly from the configured template rather
        // than a tree lookup, but it still honours `?debug` like every
        // other route: wrapped as a single-element match path.
        let (element, match_path, requested, parsed_requested) = if matches!(route, RouteKind::Wpad)
        {
            let element = self.store.wpad_element();
            let label = element.filename().unwrap_or("wpad.dat").to_string();
            (element.clone(), vec![element], label.clone(), label)
        } else {
            let (query_net, requested) = resolve_query(route, &ip_param, &cidr_param, client_ip);
            let (element, match_path) = self.store.lookup(query_net);
            let parsed_requested = query_net.to_string();
            (element, match_path, requested, parsed_requested)
        };

        let pac_filename = element.filename().map(|f| f.to_string());

        let body = if debug {
            render_debug_body(&requested, &parsed_requested, &element, &match_path)
        } else {
            element.rendered_text().to_string()
        };
        let content_type = if debug { DEBUG_CONTENT_TYPE } else { PAC_CONTENT_TYPE };

        self.write_response(session, http::StatusCode::OK, content_type, body)
            .await?;
        log_access(&path, 200, client_ip, ctx.started_at);
        crate::metrics::record_response(200, ctx.started_at.elapsed(), pac_filename.as_deref());
        Ok(true)
    }
}

impl PacProxyService {
    async fn write_response(
        &self,
        session: &mut Session,
        status: http::StatusCode,
        content_type: &str,
        body: String,
    ) -> Result<()> {
        let mut response = ResponseHeader::build(status, Some(1))?;
        response.insert_header("Content-Type", content_type)?;
        session
            .downstream_session
            .write_response_header(Box::new(response))
            .await?;
        session
            .downstream_session
            .write_response_body(Bytes::from(body), true)
            .await?;
        session.downstream_session.set_keepalive(None);
        Ok(())
    }
}

fn client_ipv4(session: &Session) -> crate::ip::Ipv4 {
    use pingora::protocols::l4::socket::SocketAddr;

    let addr = match session.downstream_session.client_addr() {
        Some(SocketAddr::Inet(inet)) => inet.ip(),
        _ => return crate::ip::Ipv4::new(0),
    };

    match addr {
        std::net::IpAddr::V4(v4) => crate::ip::Ipv4::new(u32::from(v4)),
        std::net::IpAddr::V6(_) => crate::ip::Ipv4::new(0),
    }
}

fn query_has_debug(query: &str) -> bool {
    query
        .split('&')
        .filter_map(|pair| pair.split('=').next())
        .any(|key| key.eq_ignore_ascii_case("debug"))
}

fn render_debug_body(
    requested: &str,
    parsed_requested: &str,
    element: &crate::catalogue::element::LookupElement,
    match_path: &[crate::catalogue::element::LookupElement],
) -> String {
    let header = serde_json::json!({
        "requested": requested,
        "parsed_requested": parsed_requested,
        "pac": element.filename(),
    });

    let mut out = String::new();
    out.push_str(&serde_json::to_string_pretty(&header).unwrap_or_default());
    out.push('\n');
    for (depth, elem) in match_path.iter().enumerate() {
        out.push_str(&"\t".repeat(depth));
        out.push_str("- ");
        out.push_str(&elem.network().to_string());
        out.push_str(" | ");
        out.push_str(elem.filename().unwrap_or("<synthetic root>"));
        out.push('\n');
    }
    out.push_str(&"-".repeat(40));
    out.push('\n');
    out.push_str(element.rendered_text());
    out
}

fn log_access(path: &str, status: u16, client_ip: crate::ip::Ipv4, started_at: Instant) {
    tracing::info!(
        target: ACCESS_LOG_TARGET,
        path,
        status,
        client_ip = %client_ip,
        elapsed_us = started_at.elapsed().as_micros() as u64,
        "request served"
    );
}
