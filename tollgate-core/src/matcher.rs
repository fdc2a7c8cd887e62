use serde_json::Value;

/// Decides whether the parameters stored with a cache entry match the
/// parameters of the current request.
pub trait ParamsMatcher: Send + Sync {
    /// Returns `true` if `current` matches `stored`.
    fn matches(&self, stored: &Value, current: &Value) -> bool;
}

/// Structural equality. Object key order is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepEqual;

impl ParamsMatcher for DeepEqual {
    fn matches(&self, stored: &Value, current: &Value) -> bool {
        stored == current
    }
}

impl<F> ParamsMatcher for F
where
    F: Fn(&Value, &Value) -> bool + Send + Sync,
{
    fn matches(&self, stored: &Value, current: &Value) -> bool {
        self(stored, current)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deep_equal_ignores_key_order() {
        let stored = json!({"id": 1, "filter": {"a": [1, 2], "b": null}});
        let current = json!({"filter": {"b": null, "a": [1, 2]}, "id": 1});
        assert!(DeepEqual.matches(&stored, &current));
    }

    #[test]
    fn test_deep_equal_detects_difference() {
        assert!(!DeepEqual.matches(&json!({"id": 1}), &json!({"id": "1"})));
        assert!(!DeepEqual.matches(&json!([1, 2]), &json!([2, 1])));
    }
}
