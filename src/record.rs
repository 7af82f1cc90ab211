use serde::Serialize;

/// The four user-supplied columns of a link. Absent values are empty strings.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LinkFields {
    pub text: String,
    pub link: String,
    pub title: String,
    pub shortcut: String,
}

/// A stored link together with the rowid the store assigned to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    pub fields: LinkFields,
}

/// Wire form of a record: `[id, text, link, title, shortcut]`
pub type LinkRow<'a> = (i64, &'a str, &'a str, &'a str, &'a str);

impl LinkRecord {
    pub fn new(id: i64, fields: LinkFields) -> Self {
        Self { id, fields }
    }

    pub fn as_row(&self) -> LinkRow<'_> {
        (
            self.id,
            &self.fields.text,
            &self.fields.link,
            &self.fields.title,
            &self.fields.shortcut,
        )
    }
}

impl Serialize for LinkRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_row().serialize(serializer)
    }
}

#[derive(Debug, Serialize)]
pub struct CountOutput {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct InsertOutput<'a> {
    pub inserted: &'a LinkRecord,
}

#[derive(Debug, Serialize)]
pub struct UpdateOutput<'a> {
    pub updated: &'a LinkRecord,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub deleted: i64,
    pub changed: bool,
}

/// Render any output document as a single JSON string
pub fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
