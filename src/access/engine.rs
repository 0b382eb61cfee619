//! Access decision engine.
//!
//! # Evaluation order
//! ```text
//! client address → strip_port
//!     → blocklist hit?            → Deny  (Blocklisted)
//!     → subnet policy
//!         bypass,  inside subnet  → Allow (InsideSubnet)
//!         require, outside subnet → Deny  (OutsideSubnet)
//!     → required header missing   → Deny  (HeaderMissing)
//!     → value differs             → Deny  (HeaderMismatch)
//!     → otherwise                 → Allow (HeaderMatched)
//! ```
//!
//! Evaluation is a pure function of the policy and the request. It never fails:
//! anything malformed or absent falls through to `Deny`.

use http::HeaderMap;

use crate::access::address::{parse_ip, strip_port};
use crate::access::policy::AccessPolicy;
use crate::config::schema::SubnetPolicy;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionReason {
    Blocklisted,
    OutsideSubnet,
    InsideSubnet,
    HeaderMatched,
    HeaderMissing,
    HeaderMismatch,
}

impl DecisionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionReason::Blocklisted => "blocklisted",
            DecisionReason::OutsideSubnet => "outside_subnet",
            DecisionReason::InsideSubnet => "inside_subnet",
            DecisionReason::HeaderMatched => "header_matched",
            DecisionReason::HeaderMissing => "header_missing",
            DecisionReason::HeaderMismatch => "header_mismatch",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The facts of one request that the engine looks at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// Remote address as reported by the host, optionally with `:port`.
    pub client_address: &'a str,
    /// Request headers. Lookup is case-insensitive; the first value wins.
    pub headers: &'a HeaderMap,
}

impl<'a> EvaluationRequest<'a> {
    pub fn new(client_address: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            client_address,
            headers,
        }
    }
}

/// A decision together with why it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: DecisionReason,
    /// Client address after port stripping.
    pub client_address: String,
}

impl Verdict {
    fn new(decision: Decision, reason: DecisionReason, client_address: &str) -> Self {
        Self {
            decision,
            reason,
            client_address: client_address.to_string(),
        }
    }
}

/// Decide whether a request may proceed.
pub fn evaluate(policy: &AccessPolicy, request: &EvaluationRequest<'_>) -> Decision {
    explain(policy, request).decision
}

/// Like [`evaluate`], but also reports the deciding rule and the normalized address.
pub fn explain(policy: &AccessPolicy, request: &EvaluationRequest<'_>) -> Verdict {
    let address = strip_port(request.client_address);

    if policy.is_disallowed(address) {
        return Verdict::new(Decision::Deny, DecisionReason::Blocklisted, address);
    }

    match policy.subnet_policy() {
        SubnetPolicy::Ignore => {}
        SubnetPolicy::Bypass => {
            if in_subnet(policy, address) {
                return Verdict::new(Decision::Allow, DecisionReason::InsideSubnet, address);
            }
        }
        SubnetPolicy::Require => {
            if !in_subnet(policy, address) {
                return Verdict::new(Decision::Deny, DecisionReason::OutsideSubnet, address);
            }
        }
    }

    match request.headers.get(policy.required_header()) {
        Some(value) if value.as_bytes() == policy.required_value() => {
            Verdict::new(Decision::Allow, DecisionReason::HeaderMatched, address)
        }
        Some(_) => Verdict::new(Decision::Deny, DecisionReason::HeaderMismatch, address),
        None => Verdict::new(Decision::Deny, DecisionReason::HeaderMissing, address),
    }
}

fn in_subnet(policy: &AccessPolicy, address: &str) -> bool {
    parse_ip(address)
        .map(|ip| policy.in_subnet(&ip))
        .unwrap_or(false)
}
