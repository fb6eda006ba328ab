//! Transport-level cleanup applied before any narrative rule runs

/// Sequences removed (or rewritten) from a raw response body
const REWRITES: [(&str, &str); 5] = [
    ("\\/", "/"),
    ("\\r", ""),
    ("\\n", ""),
    ("\r", ""),
    ("\n", ""),
];

/// Strips escaped slashes and line breaks, then trims the boundaries.
///
/// Rewrites repeat until nothing changes, so `normalize(normalize(x)) ==
/// normalize(x)` holds even for inputs such as `\\//` where removing one
/// escape exposes another.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for (from, to) in REWRITES {
            next = next.replace(from, to);
        }
        let next = next.trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_escapes_and_breaks() {
        assert_eq!(normalize("a\\/b\r\n"), "a/b");
        assert_eq!(normalize("  10:54\\r\\nqiospay.id  "), "10:54qiospay.id");
        assert_eq!(normalize("01\\/10\\/2025"), "01/10/2025");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "a\\/b\r\n",
            "\\\\//",
            "\\\\r\\n",
            "  plain text  ",
            "",
            "T#1 R#x, SUKSES. SN: A\\/B.. Saldo 1 @01\\/10\\/2025 10:54\r\nqiospay.id",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \r\n "), "");
    }
}
