use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Fixed service-name to URL mapping. Built once at startup, never mutated.
///
/// Names are stored upper-case; lookups are case-insensitive, so the route
/// segment `home` resolves the `HOME` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    pub fn new(services: BTreeMap<String, ServiceEntry>) -> Self {
        let services = services
            .into_iter()
            .map(|(name, entry)| (name.to_ascii_uppercase(), entry))
            .collect();
        Self { services }
    }

    /// URL of an enabled service.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.services
            .get(&name.to_ascii_uppercase())
            .filter(|entry| entry.enabled)
            .map(|entry| entry.url.as_str())
    }

    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new(default_services())
    }
}

impl Validate for ServiceRegistry {
    fn validate(&self) -> Result<()> {
        for (name, entry) in &self.services {
            validate_non_empty_string("services", name)?;
            validate_url(&format!("services.{}.url", name), &entry.url)?;
        }
        Ok(())
    }
}

pub fn default_services() -> BTreeMap<String, ServiceEntry> {
    let entry = |url: &str, enabled: bool| ServiceEntry {
        url: url.to_string(),
        enabled,
    };

    BTreeMap::from([
        ("HOME".to_string(), entry("https://www.smu.ac.kr/kor/index.do", true)),
        (
            "NOTICE".to_string(),
            entry("https://www.smu.ac.kr/kor/life/notice.do", true),
        ),
        // SSO portal stays registered but is not exposed.
        ("SAMMUL".to_string(), entry("https://smsso.smu.ac.kr/", false)),
        ("ECAMPUS".to_string(), entry("https://ecampus.smu.ac.kr/", true)),
    ])
}
