use super::value::Value;

/// The evaluation environment: a stack of `(name, value)` bindings.
///
/// Lookup mirrors variable references in the syntax tree: the index counts
/// how many bindings of the same name to skip, starting from the most
/// recent. Source names are kept as-is for diagnostics instead of
/// converting to bare de Bruijn indices.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Vec<(String, Value)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.push((name.into(), value));
    }

    pub fn lookup(&self, name: &str, index: usize) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .filter_map(|(found, value)| if found == name { Some(value) } else { None })
            .nth(index)
    }
}
