//! In-memory catalogue model.
//!
//! A [`Catalog`] holds every translated message for one locale, grouped into
//! [`Context`]s (one per window, dialog or wizard page). Text fields keep the
//! escaped markup form found in the `.ts` file; lookup keys are built from
//! the decoded source text so callers pass exactly the string the GUI code
//! holds.
//!
//! Catalogues are built once and never mutated while published. A locale
//! change builds a fresh catalogue (see [`crate::active`]).

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::markup::unescape;

/// Translation state of a message, taken from `<translation type="...">`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Translated and current.
    #[default]
    Active,
    /// Not yet reviewed by a translator.
    Unfinished,
    /// Source string no longer present in the application.
    Obsolete,
    /// Qt 5 spelling of obsolete; kept distinct so files round-trip.
    Vanished,
}

impl MessageStatus {
    /// Parse the `type` attribute of a `<translation>` element.
    ///
    /// Returns `None` for values Qt Linguist does not define.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::catalog::MessageStatus;
    ///
    /// assert_eq!(MessageStatus::from_type_attribute(None), Some(MessageStatus::Active));
    /// assert_eq!(MessageStatus::from_type_attribute(Some("obsolete")), Some(MessageStatus::Obsolete));
    /// assert_eq!(MessageStatus::from_type_attribute(Some("stale")), None);
    /// ```
    #[must_use]
    pub fn from_type_attribute(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(Self::Active),
            Some("unfinished") => Some(Self::Unfinished),
            Some("obsolete") => Some(Self::Obsolete),
            Some("vanished") => Some(Self::Vanished),
            Some(_) => None,
        }
    }

    /// The `type` attribute value written for this status.
    #[must_use]
    pub const fn type_attribute(self) -> Option<&'static str> {
        match self {
            Self::Active => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Whether the message is excluded from lookup outright.
    #[must_use]
    pub const fn is_obsolete(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

/// Source location of a message, kept for translator tooling only.
///
/// Both attributes are stored verbatim. Qt writes relative line numbers
/// (`+3`) and omits the file name when it repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Value of the `filename` attribute.
    pub filename: Option<String>,
    /// Value of the `line` attribute.
    pub line: String,
}

impl Location {
    /// Create a location for `filename` at an absolute `line`.
    #[must_use]
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: Some(filename.into()),
            line: line.to_string(),
        }
    }

    /// The line as a number, when it is absolute.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        self.line.parse().ok()
    }
}

/// Translation text of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// A single translated string.
    Single(String),
    /// One string per plural form, in the target language's rule order.
    Numerus(Vec<String>),
}

impl Translation {
    /// Whether no usable translated text is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }

    /// Text used when no count is known: the only or the first form.
    #[must_use]
    pub fn primary(&self) -> &str {
        match self {
            Self::Single(text) => text,
            Self::Numerus(forms) => forms.first().map_or("", String::as_str),
        }
    }

    /// Text for plural form `index`, falling back to the last non-empty form.
    #[must_use]
    pub fn form(&self, index: usize) -> Option<&str> {
        match self {
            Self::Single(text) => Some(text.as_str()).filter(|t| !t.is_empty()),
            Self::Numerus(forms) => forms
                .get(index)
                .filter(|f| !f.is_empty())
                .or_else(|| forms.iter().rev().find(|f| !f.is_empty()))
                .map(String::as_str),
        }
    }
}

/// One source string and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    source: String,
    translation: Translation,
    status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    disambiguation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translator_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<Location>,
}

impl Message {
    /// Create an active message. Both strings are in escaped markup form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::catalog::{Message, MessageStatus};
    ///
    /// let message = Message::new("Browse", "Sfoglia");
    /// assert_eq!(message.status(), MessageStatus::Active);
    /// assert_eq!(message.translation().primary(), "Sfoglia");
    /// ```
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self::with_translation(source, Translation::Single(translation.into()))
    }

    /// Create an active plural message from its numerus forms.
    #[must_use]
    pub fn numerus(source: impl Into<String>, forms: Vec<String>) -> Self {
        Self::with_translation(source, Translation::Numerus(forms))
    }

    /// Create an active message from a prepared [`Translation`].
    #[must_use]
    pub fn with_translation(source: impl Into<String>, translation: Translation) -> Self {
        Self {
            source: source.into(),
            translation,
            status: MessageStatus::Active,
            disambiguation: None,
            translator_comment: None,
            extra_comment: None,
            locations: Vec::new(),
        }
    }

    /// Set the translation status.
    #[must_use]
    pub const fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the disambiguation comment (Qt `<comment>`).
    #[must_use]
    pub fn with_disambiguation(mut self, comment: impl Into<String>) -> Self {
        self.disambiguation = Some(comment.into());
        self
    }

    /// Set the translator comment.
    #[must_use]
    pub fn with_translator_comment(mut self, comment: impl Into<String>) -> Self {
        self.translator_comment = Some(comment.into());
        self
    }

    /// Set the developer comment (Qt `<extracomment>`).
    #[must_use]
    pub fn with_extra_comment(mut self, comment: impl Into<String>) -> Self {
        self.extra_comment = Some(comment.into());
        self
    }

    /// Append a source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Source text in markup form.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Translation text in markup form.
    #[must_use]
    pub const fn translation(&self) -> &Translation {
        &self.translation
    }

    /// Translation status.
    #[must_use]
    pub const fn status(&self) -> MessageStatus {
        self.status
    }

    /// Whether the message carries plural forms.
    #[must_use]
    pub const fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Numerus(_))
    }

    /// Disambiguation comment in markup form.
    #[must_use]
    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref()
    }

    /// Translator comment in markup form.
    #[must_use]
    pub fn translator_comment(&self) -> Option<&str> {
        self.translator_comment.as_deref()
    }

    /// Developer comment in markup form.
    #[must_use]
    pub fn extra_comment(&self) -> Option<&str> {
        self.extra_comment.as_deref()
    }

    /// Source locations, in file order.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    fn entry_key(&self) -> EntryKey {
        EntryKey {
            source: unescape(&self.source).into_owned(),
            disambiguation: self
                .disambiguation
                .as_deref()
                .map(|d| unescape(d).into_owned())
                .filter(|d| !d.is_empty()),
        }
    }
}

/// Composite lookup key: context name, decoded source and disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    /// Context name.
    pub context: String,
    /// Source text as the application passes it (entities decoded).
    pub source: String,
    /// Decoded disambiguation comment, `None` when absent or empty.
    pub disambiguation: Option<String>,
}

impl MessageKey {
    /// Build a key without disambiguation.
    #[must_use]
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            disambiguation: None,
        }
    }

    /// Attach a disambiguation comment.
    #[must_use]
    pub fn disambiguated(mut self, disambiguation: impl Into<String>) -> Self {
        self.disambiguation = Some(disambiguation.into()).filter(|d| !d.is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    source: String,
    disambiguation: Option<String>,
}

/// What happened to a message whose key was already present in a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Duplicate {
    /// The incoming message took the slot; this is the earlier one.
    Replaced(Message),
    /// The incoming message was obsolete while the earlier one is live, so
    /// the earlier one stays; this is the incoming message.
    Ignored(Message),
}

impl Duplicate {
    /// The message that was dropped.
    #[must_use]
    pub const fn message(&self) -> &Message {
        match self {
            Self::Replaced(message) | Self::Ignored(message) => message,
        }
    }
}

/// Messages belonging to one UI surface.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    comment: Option<String>,
    messages: IndexMap<EntryKey, Message>,
    by_source: HashMap<String, Vec<usize>>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            messages: IndexMap::new(),
            by_source: HashMap::new(),
        }
    }

    /// Context name as the application reports it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Context-level comment in markup form.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Set the context-level comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// Insert a message, replacing any entry with the same source and
    /// disambiguation. The replacement keeps the original position.
    ///
    /// An obsolete or vanished message never displaces a live one; it is
    /// handed back as [`Duplicate::Ignored`] instead.
    pub fn insert(&mut self, message: Message) -> Option<Duplicate> {
        let key = message.entry_key();
        if let Some(slot) = self.messages.get_mut(&key) {
            if message.status().is_obsolete() && !slot.status().is_obsolete() {
                return Some(Duplicate::Ignored(message));
            }
            return Some(Duplicate::Replaced(std::mem::replace(slot, message)));
        }
        let source = key.source.clone();
        let (index, _) = self.messages.insert_full(key, message);
        self.by_source.entry(source).or_default().push(index);
        None
    }

    /// Exact lookup by decoded source and disambiguation.
    #[must_use]
    pub fn get(&self, source: &str, disambiguation: Option<&str>) -> Option<&Message> {
        let key = EntryKey {
            source: source.to_owned(),
            disambiguation: disambiguation.filter(|d| !d.is_empty()).map(ToOwned::to_owned),
        };
        self.messages.get(&key)
    }

    /// Every message whose decoded source equals `source`, in file order.
    pub fn siblings<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a Message> + use<'a> {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.messages.get_index(index).map(|(_, message)| message))
    }

    /// Messages in file order.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.messages.values()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the context has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.comment == other.comment
            && self.messages.len() == other.messages.len()
            && self.messages().zip(other.messages()).all(|(a, b)| a == b)
    }
}

impl Eq for Context {}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Context", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("comment", &self.comment)?;
        state.serialize_field("messages", &self.messages().collect::<Vec<_>>())?;
        state.end()
    }
}

/// Header attributes of the `<TS>` root element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogHeader {
    /// File format version, for example `2.1`.
    pub version: Option<String>,
    /// Target locale in Qt form, for example `it_IT`.
    pub language: Option<String>,
    /// Locale of the source strings.
    pub source_language: Option<String>,
}

/// All messages for one locale.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::catalog::{Catalog, Message, MessageKey};
///
/// let mut catalog = Catalog::for_language("it_IT");
/// catalog.insert("MainWindow", Message::new("Quit", "Chiudi"));
/// let key = MessageKey::new("MainWindow", "Quit");
/// assert_eq!(catalog.get(&key).map(|m| m.translation().primary()), Some("Chiudi"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    header: CatalogHeader,
    contexts: IndexMap<String, Context>,
}

impl Catalog {
    /// Create an empty catalogue. Every lookup falls back to source text.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an empty catalogue for a target language.
    #[must_use]
    pub fn for_language(language: impl Into<String>) -> Self {
        Self::with_header(CatalogHeader {
            version: Some(String::from("2.1")),
            language: Some(language.into()),
            source_language: None,
        })
    }

    /// Create an empty catalogue with explicit header attributes.
    #[must_use]
    pub fn with_header(header: CatalogHeader) -> Self {
        Self {
            header,
            contexts: IndexMap::new(),
        }
    }

    /// Header attributes.
    #[must_use]
    pub const fn header(&self) -> &CatalogHeader {
        &self.header
    }

    /// Target language, if declared.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.header.language.as_deref()
    }

    /// Insert a message into `context`, creating the context on first use.
    ///
    /// See [`Context::insert`] for how duplicate keys are settled.
    pub fn insert(&mut self, context: &str, message: Message) -> Option<Duplicate> {
        self.context_mut(context).insert(message)
    }

    /// Fetch or create the context called `name`.
    pub fn context_mut(&mut self, name: &str) -> &mut Context {
        self.contexts
            .entry(name.to_owned())
            .or_insert_with(|| Context::new(name))
    }

    /// Look up a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    /// Contexts in file order.
    pub fn contexts(&self) -> impl ExactSizeIterator<Item = &Context> {
        self.contexts.values()
    }

    /// Exact lookup by composite key, regardless of status.
    #[must_use]
    pub fn get(&self, key: &MessageKey) -> Option<&Message> {
        self.context(&key.context)?
            .get(&key.source, key.disambiguation.as_deref())
    }

    /// Total number of messages across all contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.values().map(Context::len).sum()
    }

    /// Whether the catalogue holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count messages by status.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            contexts: self.contexts.len(),
            ..CatalogStats::default()
        };
        for message in self.contexts().flat_map(Context::messages) {
            stats.messages += 1;
            match message.status() {
                MessageStatus::Active => stats.active += 1,
                MessageStatus::Unfinished => stats.unfinished += 1,
                MessageStatus::Obsolete | MessageStatus::Vanished => stats.obsolete += 1,
            }
        }
        stats
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.contexts.len() == other.contexts.len()
            && self.contexts().zip(other.contexts()).all(|(a, b)| a == b)
    }
}

impl Eq for Catalog {}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Catalog", 2)?;
        state.serialize_field("header", &self.header)?;
        state.serialize_field("contexts", &self.contexts().collect::<Vec<_>>())?;
        state.end()
    }
}

/// Message counts reported by [`Catalog::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Number of contexts.
    pub contexts: usize,
    /// Number of messages.
    pub messages: usize,
    /// Active messages.
    pub active: usize,
    /// Unfinished messages.
    pub unfinished: usize,
    /// Obsolete and vanished messages.
    pub obsolete: usize,
}
