//! Display formatting for pt-BR amounts
//!
//! Output only. Nothing in the projection path reads these strings back.

/// Format an amount as `1.234,56`
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let int_part = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02}", sign, int_part, cents % 100)
}

/// Format a percentage as `12,50`
pub fn format_rate_percent(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(".")
}
