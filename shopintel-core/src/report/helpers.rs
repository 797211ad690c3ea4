use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

/// Handlebars registry with the helpers used by the report templates.
pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| {
        match v {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed != "null"
            }
            _ => true,
        }
    });
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(is_empty: |v: Value| {
        match v {
            serde_json::Value::Array(arr) => arr.is_empty(),
            serde_json::Value::Null => true,
            _ => false,
        }
    });
    handlebars.register_helper("is_empty", Box::new(is_empty));

    handlebars_helper!(format_number: |v: Value| format_number_value(&v));
    handlebars.register_helper("format_number", Box::new(format_number));

    handlebars_helper!(title_case: |s: String| title_case_value(&s));
    handlebars.register_helper("title_case", Box::new(title_case));

    handlebars
}

fn format_number_value(value: &Value) -> String {
    match value.as_f64() {
        Some(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
            group_thousands(&format!("{:.0}", number))
        }
        Some(number) => {
            let formatted = format!("{:.2}", number);
            match formatted.split_once('.') {
                Some((whole, fraction)) => format!("{}.{}", group_thousands(whole), fraction),
                None => formatted,
            }
        }
        None => "-".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// `avg_order_value` -> `Avg Order Value`
fn title_case_value(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
