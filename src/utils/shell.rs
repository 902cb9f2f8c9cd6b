// file: src/utils/shell.rs
// version: 1.0.0
// guid: 38cf3d8b-0102-4998-8e2b-97110c466bad

//! Shell quoting for command lines handed to bash

/// Quote `input` as a single shell word.
///
/// Plain words made of safe characters are returned unchanged.
pub fn quote(input: &str) -> String {
    let safe = !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.:/=@+,%".contains(c));

    if safe {
        input.to_string()
    } else {
        format!("'{}'", input.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words_unchanged() {
        assert_eq!(quote("eth0"), "eth0");
        assert_eq!(quote("/tmp/zerotier_packages/ifupdown_0.8.41_armhf.deb"), "/tmp/zerotier_packages/ifupdown_0.8.41_armhf.deb");
        assert_eq!(quote("allowManaged=0"), "allowManaged=0");
    }

    #[test]
    fn test_dangerous_input_quoted() {
        assert_eq!(quote("eth0; rm -rf /"), "'eth0; rm -rf /'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }
}
