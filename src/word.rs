use std::fmt;

/// The words an OCR service recognized, in document order.
///
/// Every service reduces its own response envelope to this type, so callers never see
/// provider-specific structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedWords(pub Vec<String>);

impl RecognizedWords {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Joins the words with a single space.
    pub fn join(&self) -> String {
        self.0.join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for RecognizedWords {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        RecognizedWords(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for RecognizedWords {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for RecognizedWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

impl From<RecognizedWords> for String {
    fn from(value: RecognizedWords) -> Self {
        value.join()
    }
}
