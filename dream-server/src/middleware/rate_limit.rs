//! Per-client rate limiting
//!
//! Sliding one-minute window keyed by client IP. Health checks are exempt.
//! The socket peer is the key unless the limiter is told to trust
//! `X-Forwarded-For` (only safe behind a proxy that overwrites it).

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

use crate::{AppError, AppState};

const WINDOW: Duration = Duration::from_secs(60);

const EXEMPT_PATHS: &[&str] = &["/", "/health", "/health/"];

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone)]
pub struct RateLimiter {
    per_minute: u32,
    trust_forwarded_for: bool,
    hits: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// `per_minute == 0` disables limiting
    pub fn new(per_minute: u32) -> Self {
        Self {
            per_minute,
            trust_forwarded_for: false,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Key on the first `X-Forwarded-For` hop when present
    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute
    }

    pub fn is_enabled(&self) -> bool {
        self.per_minute > 0
    }

    /// Record a hit; returns the remaining allowance, or `None` when over the limit
    pub fn check(&self, client: IpAddr) -> Option<u32> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Option<u32> {
        let mut hits = self.hits.lock();

        // Drop clients whose whole window has expired
        hits.retain(|_, q| q.back().is_some_and(|t| now.duration_since(*t) < WINDOW));

        let queue = hits.entry(client).or_default();
        while queue.front().is_some_and(|t| now.duration_since(*t) >= WINDOW) {
            queue.pop_front();
        }

        if queue.len() >= self.per_minute as usize {
            return None;
        }
        queue.push_back(now);
        Some(self.per_minute - queue.len() as u32)
    }
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop when trusted
fn client_ip(req: &Request, trust_forwarded_for: bool) -> IpAddr {
    let forwarded = if trust_forwarded_for {
        req.headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok())
    } else {
        None
    };

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn set_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
}

/// Middleware: enforce the per-minute request budget
pub async fn enforce(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = &state.limiter;
    if !limiter.is_enabled() || EXEMPT_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let client = client_ip(&req, limiter.trust_forwarded_for);
    let limit = limiter.per_minute();

    match limiter.check(client) {
        Some(remaining) => {
            let mut response = next.run(req).await;
            set_headers(response.headers_mut(), limit, remaining);
            response
        }
        None => {
            tracing::warn!("Rate limit exceeded for {}", client);
            let mut response = AppError::RateLimited { limit }.into_response();
            set_headers(response.headers_mut(), limit, 0);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_limit_per_client() {
        let limiter = RateLimiter::new(2);
        let now = Instant::now();

        assert_eq!(limiter.check_at(ip(1), now), Some(1));
        assert_eq!(limiter.check_at(ip(1), now), Some(0));
        assert_eq!(limiter.check_at(ip(1), now), None);
        // Other clients have their own budget
        assert_eq!(limiter.check_at(ip(2), now), Some(1));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();

        assert!(limiter.check_at(ip(1), start).is_some());
        assert!(limiter.check_at(ip(1), start + Duration::from_secs(30)).is_none());
        assert!(limiter.check_at(ip(1), start + WINDOW).is_some());
    }

    fn forwarded_request(peer: &str, forwarded: &str) -> Request {
        let mut req = Request::builder()
            .header("x-forwarded-for", forwarded)
            .body(axum::body::Body::empty())
            .unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn test_forwarded_for_ignored_by_default() {
        let req = forwarded_request("10.0.0.9:5000", "192.168.1.7, 10.0.0.1");
        assert_eq!(client_ip(&req, false), "10.0.0.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_for_used_when_trusted() {
        let req = forwarded_request("10.0.0.9:5000", "192.168.1.7, 10.0.0.1");
        assert_eq!(client_ip(&req, true), "192.168.1.7".parse::<IpAddr>().unwrap());

        // Garbage header falls back to the peer
        let req = forwarded_request("10.0.0.9:5000", "not-an-ip");
        assert_eq!(client_ip(&req, true), "10.0.0.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_rotating_forwarded_for_shares_one_budget() {
        let limiter = RateLimiter::new(1);
        let now = Instant::now();
        let clients: Vec<IpAddr> = (0..5)
            .map(|i| client_ip(&forwarded_request("10.0.0.9:5000", &format!("203.0.113.{i}")), false))
            .collect();

        assert!(limiter.check_at(clients[0], now).is_some());
        for client in &clients[1..] {
            assert!(limiter.check_at(*client, now).is_none());
        }
    }
}
