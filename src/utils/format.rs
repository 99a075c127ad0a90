use std::fmt::{Display, Write};

pub trait Join<Item: Display>: Iterator<Item = Item> {
    fn join(&mut self, sep: &str) -> String {
        let mut result = String::new();
        if let Some(first) = self.next() {
            let _ = write!(&mut result, "{first}");
            self.for_each(|i| {
                result.push_str(sep);
                let _ = write!(&mut result, "{i}");
            });
        }
        result
    }
}

impl<T: ?Sized, Item: Display> Join<Item> for T where T: Iterator<Item = Item> {}

pub trait Indent: Display {
    fn indent(&self, indent: usize) -> String {
        self.to_string()
            .split('\n')
            .map(|x| format!("{}{}", " ".repeat(indent), x))
            .join("\n")
    }
}

impl<T: Display> Indent for T {}

/// Format a number the way scripts print it.
///
/// Integral values print without a fraction, everything else is rounded to
/// six decimals with trailing zeros removed.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    if value.abs() >= 1e15 || value.abs() < 1e-6 {
        return format!("{value:e}");
    }
    let s = format!("{value:.6}");
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Quote a string literal, doubling embedded quotes.
pub fn quote_str(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
