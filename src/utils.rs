use std::cmp::Ordering;
use calamine::Data;

/// Render a spreadsheet cell as the text used for filtering and display.
/// Integral numbers drop their fraction so a grade typed as 5 matches "5".
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => float_to_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(e) => format!("{:?}", e),
    }
}

fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Number of whitespace-separated words in an entry (an empty entry counts as one)
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

/// Order option values numerically when both parse as numbers, otherwise lexically.
/// Numbers sort before text.
pub fn compare_option_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_text_numbers() {
        assert_eq!(cell_to_text(&Data::Float(5.0)), "5");
        assert_eq!(cell_to_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_text(&Data::Int(3)), "3");
        assert_eq!(cell_to_text(&Data::Float(-1.0)), "-1");
    }

    #[test]
    fn test_cell_to_text_strings_and_empty() {
        assert_eq!(cell_to_text(&Data::String("  apple ".to_string())), "apple");
        assert_eq!(cell_to_text(&Data::String("Unit 1".to_string())), "Unit 1");
        assert_eq!(cell_to_text(&Data::Empty), "");
        assert_eq!(cell_to_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("cat"), 1);
        assert_eq!(word_count("ice cream"), 2);
        assert_eq!(word_count("a cup of tea"), 4);
        assert_eq!(word_count("  look   after "), 2);
        assert_eq!(word_count(""), 1);
    }

    #[test]
    fn test_compare_option_values() {
        let mut values = vec!["10", "2", "1", "Starter", "Module"];
        values.sort_by(|a, b| compare_option_values(a, b));
        assert_eq!(values, vec!["1", "2", "10", "Module", "Starter"]);
    }
}
