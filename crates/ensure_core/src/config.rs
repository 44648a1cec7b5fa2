//! Engine configuration.
//!
//! Provides the options a validation call runs with, such as the nesting
//! limit, how field labels are rendered in messages, and whether flattened
//! messages carry their property path.

/// Default nesting limit for `object`/`each` constraints.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How a field name is rendered where a message mentions the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelStyle {
    /// The field name as declared (`someVar`, `a[0]`)
    #[default]
    FieldName,
    /// Start-cased words (`Some Var`, `A 0`)
    StartCase,
}

impl LabelStyle {
    /// Renders the label for a field name.
    pub fn render(self, name: &str) -> String {
        match self {
            LabelStyle::FieldName => name.to_string(),
            LabelStyle::StartCase => start_case(name),
        }
    }
}

/// Options for a validation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum nesting depth of the constraint tree
    pub max_depth: usize,

    /// Label rendering for `[var]` and structural messages
    pub label_style: LabelStyle,

    /// Whether flattened messages are prefixed with their path
    pub paths_in_messages: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            label_style: LabelStyle::default(),
            paths_in_messages: false,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the label style.
    pub fn with_label_style(mut self, label_style: LabelStyle) -> Self {
        self.label_style = label_style;
        self
    }

    /// Sets whether flattened messages carry their path.
    pub fn with_paths_in_messages(mut self, enabled: bool) -> Self {
        self.paths_in_messages = enabled;
        self
    }
}

/// Converts an identifier into space-separated capitalised words.
///
/// Words break on any non-alphanumeric character, on lower-to-upper case
/// changes, between letters and digits, and before the last capital of an
/// acronym that starts a new word (`XMLHttp` → `XML Http`).
pub fn start_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();

    for run in input.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = run.chars().collect();
        let mut start = 0;

        for i in 1..chars.len() {
            let (prev, cur) = (chars[i - 1], chars[i]);
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());

            let boundary = (prev.is_lowercase() && cur.is_uppercase())
                || (prev.is_numeric() != cur.is_numeric())
                || (prev.is_uppercase() && cur.is_uppercase() && next_is_lower);

            if boundary {
                words.push(chars[start..i].iter().collect());
                start = i;
            }
        }

        if start < chars.len() {
            words.push(chars[start..].iter().collect());
        }
    }

    words
}
