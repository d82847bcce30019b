use serde_json::Value;

use super::format_scalar;

/// Key answer fields, most specific first.
const PRIORITY_KEYS: [&str; 5] = [
    "payoff_amount",
    "monthly_payment",
    "amount_outstanding",
    "total_to_pay",
    "actual_total",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_scalar(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_prints_level_payment() {
        let out = json!({"result": {"first_payment": "0", "monthly_payment": "888.49"}});
        assert_eq!(minimal_answer(&out), "888.49");
    }

    #[test]
    fn test_payoff_wins_over_other_keys() {
        let out = json!({"result": {"monthly_payment": "1", "payoff_amount": "5050.00"}});
        assert_eq!(minimal_answer(&out), "5050.00");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let out = json!({"result": {"paid_count": 3}});
        assert_eq!(minimal_answer(&out), "paid_count: 3");
    }
}
