//! IP gate: fixed-window rate limiting with temporary bans
//!
//! Tracks per-client request counts in a fixed time window and issues a
//! time-boxed ban when a client crosses the limit. State is process-local and
//! resets on restart; horizontal scaling multiplies the effective limits.
//!
//! All accounting is a single synchronous read-modify-write under one mutex,
//! so concurrent requests from the same client cannot interleave mid-update.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sentinel client key when no address information is available
const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Whether the client is currently serving a ban
    pub banned: bool,
    /// Requests left in the current window (0 when rejected)
    pub remaining: u32,
}

/// One client's request count within the current window
#[derive(Debug)]
struct ClientWindow {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Default)]
struct GateState {
    windows: HashMap<String, ClientWindow>,
    bans: HashMap<String, Instant>,
}

/// Fixed-window rate limiter with ban escalation
#[derive(Debug)]
pub struct IpGate {
    max_requests: u32,
    window: Duration,
    ban_duration: Duration,
    state: Mutex<GateState>,
}

impl IpGate {
    /// Create a gate allowing `max_requests` per `window`, banning violators
    /// for `ban_duration`
    pub fn new(max_requests: u32, window: Duration, ban_duration: Duration) -> Self {
        Self {
            max_requests,
            window,
            ban_duration,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Check whether a request from `client_key` is admitted, recording it if so
    pub fn check(&self, client_key: &str) -> Admission {
        self.check_at(client_key, Instant::now())
    }

    /// Admission check against an explicit clock. `check` delegates here;
    /// tests drive this directly to exercise window and ban expiry without
    /// sleeping.
    pub fn check_at(&self, client_key: &str, now: Instant) -> Admission {
        let mut state = self.state.lock().expect("gate mutex poisoned");

        // Active ban short-circuits before any window accounting.
        // Expired bans are deleted lazily here.
        if let Some(&expires_at) = state.bans.get(client_key) {
            if now < expires_at {
                return Admission {
                    allowed: false,
                    banned: true,
                    remaining: 0,
                };
            }
            state.bans.remove(client_key);
            state.windows.remove(client_key);
        }

        let window_live = matches!(
            state.windows.get(client_key),
            Some(w) if now < w.reset_at
        );

        if !window_live {
            // First request in a (new) window
            state.windows.insert(
                client_key.to_string(),
                ClientWindow {
                    count: 1,
                    reset_at: now + self.window,
                },
            );
            return Admission {
                allowed: true,
                banned: false,
                remaining: self.max_requests.saturating_sub(1),
            };
        }

        let count = state
            .windows
            .get(client_key)
            .map(|w| w.count)
            .unwrap_or(0);

        if count >= self.max_requests {
            // Threshold crossed: ban and drop the window so the client starts
            // fresh once the ban lapses
            state
                .bans
                .insert(client_key.to_string(), now + self.ban_duration);
            state.windows.remove(client_key);
            tracing::warn!(
                client = client_key,
                ban_seconds = self.ban_duration.as_secs(),
                "Rate limit exceeded, client banned"
            );
            return Admission {
                allowed: false,
                banned: true,
                remaining: 0,
            };
        }

        let window = state
            .windows
            .get_mut(client_key)
            .expect("window checked live above");
        window.count += 1;
        Admission {
            allowed: true,
            banned: false,
            remaining: self.max_requests - window.count,
        }
    }
}

/// Derive the client identifier for gate accounting
///
/// Prefers the first `x-forwarded-for` entry, then the remote address, then
/// the `"unknown"` sentinel.
pub fn client_key(forwarded_for: Option<&str>, remote: Option<SocketAddr>) -> String {
    if let Some(value) = forwarded_for {
        if let Some(first) = value.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    match remote {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}
