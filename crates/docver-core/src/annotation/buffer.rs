//! Parser for the annotation buffer mini-format.
//!
//! A buffer is line oriented:
//!
//! ```text
//! TotalAnnotations=2
//! NoOfHyperlinks=1
//! [Annotation 0]
//! Type=Note
//! X=100
//! [Hyperlink1]
//! HyperlinkName=View
//! ```
//!
//! Lines before the first `[Section]` form the header. Everything else
//! belongs to the most recent section. Replay never re-renders a buffer it did
//! not modify, so the parsed form only has to be faithful enough for
//! inspection and filtering.

/// One `key=value` line. Lines without `=` keep `value` as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEntry {
    pub key: String,
    pub value: Option<String>,
}

impl BufferEntry {
    fn parse(line: &str) -> Self {
        match line.split_once('=') {
            Some((key, value)) => Self {
                key: key.trim().to_string(),
                value: Some(value.trim().to_string()),
            },
            None => Self {
                key: line.to_string(),
                value: None,
            },
        }
    }

    fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.key, value),
            None => self.key.clone(),
        }
    }
}

/// A `[name]` block and its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSection {
    pub name: String,
    pub entries: Vec<BufferEntry>,
}

impl BufferSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.as_deref())
    }

    /// Section holds the header of another annotation, not an annotation itself.
    pub fn is_annotation_header(&self) -> bool {
        self.name.ends_with("AnnotationHeader")
    }
}

/// Parsed annotation buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationBuffer {
    header: Vec<BufferEntry>,
    sections: Vec<BufferSection>,
}

impl AnnotationBuffer {
    pub fn parse(raw: &str) -> Self {
        let mut buffer = Self::default();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                buffer.sections.push(BufferSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let entry = BufferEntry::parse(line);
            match buffer.sections.last_mut() {
                Some(section) => section.entries.push(entry),
                None => buffer.header.push(entry),
            }
        }

        buffer
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.as_deref())
    }

    /// Replaces the value of an existing header key. Returns false when the
    /// key is not present; absent keys are not added.
    pub fn set_header_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.header.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Value of the `TotalAnnotations` header, when it is a number.
    pub fn total_annotations(&self) -> Option<u32> {
        self.header_value("TotalAnnotations")
            .and_then(|v| v.parse().ok())
    }

    pub fn sections(&self) -> &[BufferSection] {
        &self.sections
    }

    /// Number of sections that describe an annotation record.
    pub fn record_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|section| !section.is_annotation_header())
            .count()
    }

    pub fn retain_sections<F>(&mut self, f: F)
    where
        F: FnMut(&BufferSection) -> bool,
    {
        self.sections.retain(f);
    }

    /// Renders back to the line format, one entry per line.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.header.iter().map(BufferEntry::render).collect();
        for section in &self.sections {
            lines.push(format!("[{}]", section.name));
            lines.extend(section.entries.iter().map(BufferEntry::render));
        }
        lines.join("\n")
    }
}
