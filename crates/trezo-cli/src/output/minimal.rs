use serde_json::Value;

use super::{result_of, scalar_to_string};

/// Key answer of each command, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "installment_amount",
    "total_outstanding",
    "progress_pct",
    "remaining_amount",
];

/// Print just the key answer value, unformatted so scripts can consume it.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        let found = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null());
        if let Some(val) = found {
            println!("{}", scalar_to_string(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_to_string(val));
            return;
        }
    }

    println!("{}", scalar_to_string(result));
}
