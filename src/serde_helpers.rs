// Serde deserializers for request fields that may be written as numbers or strings
// Lets users write `num_of_drivers: 2` as well as `num_of_drivers: "2"`,
// and `num_of_containers: [2, "3,4"]` for per-group lists

use serde::{Deserialize, Deserializer};

fn value_to_string<E: serde::de::Error>(value: serde_yaml::Value) -> Result<String, E> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(E::custom("Expected number or string")),
    }
}

/// Deserialize an optional scalar into its string form
/// Examples: `60` → "60", `"60s"` → "60s", missing/null → None
pub fn deserialize_opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => value_to_string(value).map(Some),
    }
}

/// Deserialize a list whose items may be numbers or strings
/// Examples: `[2, "3,4"]` → ["2", "3,4"]; a bare scalar `5` → ["5"]
pub fn deserialize_scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;

    match value {
        None | Some(serde_yaml::Value::Null) => Ok(Vec::new()),
        Some(serde_yaml::Value::Sequence(items)) => {
            items.into_iter().map(value_to_string).collect()
        }
        Some(scalar) => value_to_string(scalar).map(|s| vec![s]),
    }
}
