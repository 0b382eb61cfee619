//! Compiled access policy.
//!
//! `AccessPolicy` is the frozen form of a `FilterConfig`: the subnet is parsed,
//! the header name is validated, and blocklist entries are normalized. IP
//! entries are stored in canonical form (`::ffff:1.2.3.4` is `1.2.3.4`,
//! IPv6 case and zero compression do not matter). It is built once and shared
//! read-only between requests.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::HeaderName;
use ipnet::IpNet;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::access::address::{parse_ip, strip_port};
use crate::access::error::PolicyError;
use crate::config::schema::{FilterConfig, SubnetPolicy};
use crate::config::validation::{parse_header_name, parse_subnet, validate_config};

/// Immutable access rules.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    disallowed_ips: HashSet<IpAddr>,
    disallowed_text: HashSet<String>,
    allowed_subnet: IpNet,
    subnet_policy: SubnetPolicy,
    required_header: HeaderName,
    required_value: Vec<u8>,
}

impl AccessPolicy {
    /// Build a policy, failing on any configuration error.
    pub fn from_config(config: &FilterConfig) -> Result<Self, PolicyError> {
        validate_config(config)?;

        let allowed_subnet = parse_subnet(&config.allowed_subnet)?;
        let required_header = parse_header_name(&config.required_header)?;

        let mut disallowed_ips = HashSet::with_capacity(config.disallowed_ips.len());
        let mut disallowed_text = HashSet::new();
        for entry in &config.disallowed_ips {
            let normalized = strip_port(entry.trim());
            if normalized.is_empty() {
                warn!(entry = %entry, "Ignoring empty disallowed address");
                continue;
            }
            match parse_ip(normalized) {
                Some(ip) => {
                    disallowed_ips.insert(ip);
                }
                None => {
                    warn!(entry = %entry, "Disallowed entry is not an IP literal; matched as exact text");
                    disallowed_text.insert(normalized.to_string());
                }
            }
        }

        Ok(Self {
            disallowed_ips,
            disallowed_text,
            allowed_subnet,
            subnet_policy: config.subnet_policy,
            required_header,
            required_value: config.required_value.as_bytes().to_vec(),
        })
    }

    /// Whether a normalized address is on the blocklist.
    ///
    /// IP addresses are compared by value, so any spelling of a listed address
    /// (mapped IPv4, upper-case or expanded IPv6) matches.
    pub fn is_disallowed(&self, address: &str) -> bool {
        match parse_ip(address) {
            Some(ip) => self.disallowed_ips.contains(&ip),
            None => self.disallowed_text.contains(address),
        }
    }

    /// Whether an address lies inside the allowed subnet.
    pub fn in_subnet(&self, ip: &IpAddr) -> bool {
        self.allowed_subnet.contains(ip)
    }

    pub fn allowed_subnet(&self) -> IpNet {
        self.allowed_subnet
    }

    pub fn subnet_policy(&self) -> SubnetPolicy {
        self.subnet_policy
    }

    pub fn required_header(&self) -> &HeaderName {
        &self.required_header
    }

    pub fn required_value(&self) -> &[u8] {
        &self.required_value
    }

    /// Number of distinct blocklist entries.
    pub fn disallowed_count(&self) -> usize {
        self.disallowed_ips.len() + self.disallowed_text.len()
    }
}

/// The live policy, replaceable as a whole on reload.
///
/// Readers take a snapshot with [`SharedPolicy::load`]; a reload never mutates a
/// policy that an in-flight request is using.
#[derive(Clone)]
pub struct SharedPolicy {
    inner: Arc<ArcSwap<AccessPolicy>>,
}

impl SharedPolicy {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// Snapshot of the current policy.
    pub fn load(&self) -> Arc<AccessPolicy> {
        self.inner.load_full()
    }

    /// Atomically install a new policy.
    pub fn replace(&self, policy: AccessPolicy) {
        self.inner.store(Arc::new(policy));
    }

    /// Apply policies from a reload channel until the sender is dropped.
    pub async fn follow(self, mut updates: mpsc::UnboundedReceiver<AccessPolicy>) {
        while let Some(policy) = updates.recv().await {
            info!(
                disallowed = policy.disallowed_count(),
                subnet = %policy.allowed_subnet(),
                subnet_policy = %policy.subnet_policy(),
                "Access policy reloaded"
            );
            self.replace(policy);
        }
    }
}

impl std::fmt::Debug for SharedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPolicy")
            .field("current", &self.load())
            .finish()
    }
}
