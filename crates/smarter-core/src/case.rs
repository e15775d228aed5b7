/// Convert a camelCase field name to its snake_case persisted form.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Convert a snake_case field name to its camelCase wire form.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("dbEngine"), "db_engine");
        assert_eq!(camel_to_snake("proxyPassword"), "proxy_password");
        assert_eq!(camel_to_snake("maxOverflow"), "max_overflow");
        assert_eq!(camel_to_snake("hostname"), "hostname");
        assert_eq!(camel_to_snake("useSsl"), "use_ssl");
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("db_engine"), "dbEngine");
        assert_eq!(snake_to_camel("proxy_password"), "proxyPassword");
        assert_eq!(snake_to_camel("hostname"), "hostname");
        assert_eq!(snake_to_camel("pool_size"), "poolSize");
    }

    #[test]
    fn test_roundtrip() {
        for name in ["dbEngine", "poolSize", "maxOverflow", "hostname", "useSsl"] {
            assert_eq!(snake_to_camel(&camel_to_snake(name)), name);
        }
    }

}
