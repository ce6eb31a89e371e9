use std::collections::HashMap;

/// Android property map parsed from `system.prop` / `build.prop` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProps {
    values: HashMap<String, String>,
}

impl SystemProps {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// First value among `keys` that is present and non-empty.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for SystemProps {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub fn parse_system_prop(content: &str) -> SystemProps {
    let mut values = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            // later assignments override earlier ones
            values.insert(key.to_string(), value.trim().to_string());
        }
    }

    SystemProps { values }
}
