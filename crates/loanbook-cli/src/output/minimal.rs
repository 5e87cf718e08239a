use serde_json::Value;

/// Answer fields in the order they are looked for: the level payment first,
/// then affordability, risk, DTI, book totals and the cheapest comparison.
const ANSWER_KEYS: [&str; 9] = [
    "monthly_payment",
    "affordable_amount",
    "score",
    "dti_percent",
    "total_amount",
    "lowest_cost_rate",
    "lowest_cost_term",
    "risk_score",
    "amount",
];

/// Fields that identify one row of a list (payments, schedules, comparisons, loans).
const ROW_LABELS: [&str; 5] = ["payment_number", "period", "rate", "term", "name"];

/// Print just the key answer.
///
/// Row lists print one `label answer` line per row.
pub fn print_minimal(value: &Value) {
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Array(rows) => {
            for row in rows {
                match label(row) {
                    Some(label) => println!("{} {}", label, answer(row)),
                    None => println!("{}", answer(row)),
                }
            }
        }
        other => println!("{}", answer(other)),
    }
}

fn answer(value: &Value) -> String {
    let Value::Object(map) = value else {
        return format_minimal(value);
    };
    ANSWER_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        .map(format_minimal)
        .or_else(|| {
            map.iter()
                .next()
                .map(|(key, val)| format!("{}: {}", key, format_minimal(val)))
        })
        .unwrap_or_default()
}

fn label(row: &Value) -> Option<String> {
    let map = row.as_object()?;
    ROW_LABELS
        .iter()
        .find_map(|key| map.get(*key))
        .map(format_minimal)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
