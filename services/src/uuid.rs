use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id
pub fn stable_uuid(id: &str) -> Uuid {
    // URL namespace is an arbitrary but fixed choice
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Deterministic point id for an item living inside a logical namespace.
pub fn namespaced_uuid(namespace: &str, id: &str) -> Uuid {
    stable_uuid(&format!("{namespace}/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_uuid() {
        assert_eq!(stable_uuid("vid#abc#0"), stable_uuid("vid#abc#0"));
        assert_ne!(stable_uuid("vid#abc#0"), stable_uuid("vid#abc#1"));
    }

    #[test]
    fn namespace_partitions_ids() {
        assert_ne!(
            namespaced_uuid("youtube", "vid#all"),
            namespaced_uuid("staging", "vid#all")
        );
    }
}
