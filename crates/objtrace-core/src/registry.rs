//! Cluster registry - the set of clusters traces can be resolved for

/// Read-only listing of known cluster names
pub trait ClusterRegistry: Send + Sync {
    /// Snapshot of the known cluster names
    fn list(&self) -> Vec<String>;

    /// Case-insensitive membership check against the current listing
    fn contains(&self, cluster: &str) -> bool {
        let wanted = cluster.to_lowercase();
        self.list()
            .iter()
            .any(|known| known.to_lowercase() == wanted)
    }
}

/// Registry with a fixed cluster list, usually taken from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticClusterRegistry {
    clusters: Vec<String>,
}

impl StaticClusterRegistry {
    pub fn new<I, S>(clusters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clusters: clusters.into_iter().map(Into::into).collect(),
        }
    }
}

impl ClusterRegistry for StaticClusterRegistry {
    fn list(&self) -> Vec<String> {
        self.clusters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_membership() {
        let registry = StaticClusterRegistry::new(["Prod", "staging-EU"]);
        assert!(registry.contains("prod"));
        assert!(registry.contains("PROD"));
        assert!(registry.contains("Staging-eu"));
        assert!(!registry.contains("dev"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_empty_registry() {
        let registry = StaticClusterRegistry::default();
        assert!(registry.list().is_empty());
        assert!(!registry.contains("prod"));
    }
}
