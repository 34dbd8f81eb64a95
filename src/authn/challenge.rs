use std::collections::HashMap;

/// Credentials carried by an `Authorization` header, split into scheme and
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub scheme: String,
    pub parameters: Parameters,
}

/// The two shapes a challenge's data can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameters {
    /// The data had no usable delimiters and is kept whole, e.g. a base64
    /// credential or an opaque bearer token.
    Token(String),

    /// `key=value` pairs plus any values that carried no key, in header order.
    Fields {
        named: HashMap<String, String>,
        values: Vec<String>,
    },
}

impl Parameters {
    pub fn token(&self) -> Option<&str> {
        match self {
            Parameters::Token(token) => Some(token),
            Parameters::Fields { .. } => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Parameters::Token(_) => None,
            Parameters::Fields { named, .. } => named.get(key).map(String::as_str),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            Parameters::Token(_) => &[],
            Parameters::Fields { values, .. } => values,
        }
    }
}

impl AuthChallenge {
    /// Parses `<scheme> <data>`.
    ///
    /// `data` is split on commas. A part is a keyed parameter when it holds an
    /// `=` that is not trailing base64 padding; everything else is kept as an
    /// unkeyed value. A lone unkeyed value that is the whole `data` becomes
    /// [`Parameters::Token`].
    pub fn parse(header: &str) -> Self {
        let (scheme, data) = match header.split_once(' ') {
            Some((scheme, data)) => (scheme, data),
            None => (header, ""),
        };

        let mut named = HashMap::new();
        let mut values = Vec::new();
        for part in data.split(',') {
            match split_parameter(part) {
                Some((key, value)) => {
                    named.insert(key.to_string(), value.to_string());
                }
                None => values.push(part.to_string()),
            }
        }

        let parameters = if named.is_empty() && values.len() == 1 && values[0] == data {
            Parameters::Token(data.to_string())
        } else {
            Parameters::Fields { named, values }
        };

        Self {
            scheme: scheme.to_string(),
            parameters,
        }
    }
}

fn split_parameter(part: &str) -> Option<(&str, &str)> {
    let pos = part.find('=')?;
    let len = part.len();
    // `abc=` and `ab==` are padding, not `key=value`.
    if (pos == len - 1 || pos == len - 2) && part.ends_with('=') {
        return None;
    }

    let (key, value) = (&part[..pos], &part[pos + 1..]);
    Some((key.trim(), value.trim_matches('"')))
}
