/**
 * Request Security Context
 *
 * The identity resolved for one request. The authentication middleware
 * places it in the request extensions; handlers read it from there. It is
 * never shared between requests.
 */

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{header::USER_AGENT, request::Parts},
};

use crate::backend::auth::users::Identity;

/// Request-derived metadata kept for audit and debugging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDetails {
    /// Peer address, when the server was started with connect info
    pub remote_addr: Option<SocketAddr>,
    /// `User-Agent` header
    pub user_agent: Option<String>,
}

impl RequestDetails {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            remote_addr: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Authenticated identity for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    identity: Identity,
    authorities: Vec<String>,
    details: RequestDetails,
}

impl SecurityContext {
    pub fn new(identity: Identity, details: RequestDetails) -> Self {
        let authorities = identity.authorities.clone();
        Self {
            identity,
            authorities,
            details,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn subject(&self) -> &str {
        &self.identity.id
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn details(&self) -> &RequestDetails {
        &self.details
    }
}
