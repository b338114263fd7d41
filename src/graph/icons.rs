//! # Resource Icon Resolver
//!
//! Maps a Terraform resource address such as
//! `google_compute_instance.vm_instance` to the icon that represents it.
//! Icons follow the `<base>/<Category>/<ResourceType>.png` layout of the
//! Google Cloud icon pack.

use std::collections::HashMap;

/// Icon used for any non-empty resource name without a mapping
pub const FALLBACK_ICON: &str = "Extras/Generic_GCP";

// Full resource addresses with a hand-picked icon.
const ADDRESS_ICONS: &[(&str, &str)] = &[
    ("google_compute_instance.vm_instance", "Compute/Compute_Engine"),
    ("google_compute_network.vpc_network", "Networking/Virtual_Private_Cloud"),
    ("provider.google", "Extras/Google_Cloud_Platform"),
    ("google_project.my_project", "Cloud_AI/Cloud_Natural_Language_API"),
];

// Resource types, consulted when the full address is unknown.
const TYPE_ICONS: &[(&str, &str)] = &[
    ("google_compute_instance", "Compute/Compute_Engine"),
    ("google_compute_instance_template", "Compute/Compute_Engine"),
    ("google_compute_network", "Networking/Virtual_Private_Cloud"),
    ("google_compute_subnetwork", "Networking/Virtual_Private_Cloud"),
    ("google_compute_firewall", "Networking/Cloud_Firewall_Rules"),
    ("google_compute_router", "Networking/Cloud_Router"),
    ("google_dns_managed_zone", "Networking/Cloud_DNS"),
    ("google_storage_bucket", "Storage/Cloud_Storage"),
    ("google_sql_database_instance", "Databases/Cloud_SQL"),
    ("google_container_cluster", "Compute/Kubernetes_Engine"),
    ("google_cloudfunctions_function", "Compute/Cloud_Functions"),
    ("google_pubsub_topic", "Data_Analytics/Cloud_PubSub"),
];

/// Resolves resource names to icon paths under a fixed base directory.
#[derive(Debug, Clone)]
pub struct IconResolver {
    base_path: String,
    addresses: HashMap<&'static str, &'static str>,
    types: HashMap<&'static str, &'static str>,
}

impl IconResolver {
    /// Creates a resolver rooted at `base_path`. A missing trailing `/` is added.
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }

        Self {
            base_path,
            addresses: ADDRESS_ICONS.iter().copied().collect(),
            types: TYPE_ICONS.iter().copied().collect(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the icon path for `resource_name`.
    ///
    /// An empty (or all-whitespace) name yields an empty string, which callers
    /// treat as "no icon". Unknown names get the generic GCP icon.
    pub fn resolve(&self, resource_name: &str) -> String {
        let name = resource_name.trim();
        if name.is_empty() {
            return String::new();
        }

        let subpath = self
            .addresses
            .get(name)
            .or_else(|| {
                let resource_type = name.split('.').next().unwrap_or(name);
                self.types.get(resource_type)
            })
            .copied()
            .unwrap_or(FALLBACK_ICON);

        format!("{}{}.png", self.base_path, subpath)
    }
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new("img/gcp_icons/")
    }
}
