//! Document variables, authors and references set through substitution
//! definitions (`.. |name| replace:: value`).

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::inline::ReferenceResolver;

/// Author of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Author {
    /// Key used in `author[...]`.
    pub anchor: String,
    pub fullname: String,
    pub ascii_fullname: String,
    pub surname: String,
    pub ascii_surname: String,
    pub initials: String,
    pub ascii_initials: String,
    pub role: String,
    pub organization: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub code: String,
    pub country: String,
    pub region: String,
    pub street: String,
    /// Free-form postal lines, in the order given.
    pub postal_lines: Vec<String>,
}

impl Author {
    fn new(anchor: &str) -> Self {
        Self {
            anchor: anchor.to_string(),
            ..Self::default()
        }
    }

    /// Any structured or free-form postal field present.
    pub fn has_postal(&self) -> bool {
        !self.postal_lines.is_empty()
            || [&self.city, &self.code, &self.country, &self.region, &self.street]
                .iter()
                .any(|field| !field.is_empty())
    }

    /// Anything that goes into `<address>`.
    pub fn has_address(&self) -> bool {
        self.has_postal() || !self.phone.is_empty() || !self.email.is_empty()
    }
}

/// Bibliographic reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    /// Key used in `ref[...]` and in `<xref target>`.
    pub anchor: String,
    /// Title of the referenced document.
    pub title: String,
    /// URI of the referenced document.
    pub target: String,
    /// `normative` or `informative`.
    pub kind: String,
    /// Series name (e.g. `RFC`).
    pub series_info_name: String,
    /// Series value (e.g. `9110`).
    pub series_info_value: String,
    /// How many links resolved to this reference.
    pub use_count: usize,
}

impl Reference {
    fn new(anchor: &str) -> Self {
        Self {
            anchor: anchor.to_string(),
            ..Self::default()
        }
    }
}

/// Which record an assignment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Document-level variable.
    Document,
    /// `author[key].field`.
    Author,
    /// `ref[key].field`.
    Reference,
}

/// A parsed `.. |name| replace:: value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// Name as written between the bars.
    pub name: &'a str,
    /// Record scope, `None` for an unrecognised scope prefix.
    pub scope: Option<Scope>,
    /// Key inside the brackets (empty for document variables).
    pub key: &'a str,
    /// Field name.
    pub field: &'a str,
    /// Raw value, trimmed.
    pub value: &'a str,
}

/// Parse a substitution definition.
pub fn parse_assignment(line: &str) -> Option<Assignment<'_>> {
    let rest = line.trim_start().strip_prefix("..")?.trim_start();
    let rest = rest.strip_prefix('|')?;
    let (name, rest) = rest.split_once('|')?;
    let value = rest.trim_start().strip_prefix("replace::")?.trim();

    let (scope, key, field) = match name.split_once('[') {
        Some((scope, rest)) => {
            let (key, field) = rest.split_once("].")?;
            let scope = match scope {
                "author" => Some(Scope::Author),
                "ref" => Some(Scope::Reference),
                _ => None,
            };
            (scope, key, field)
        }
        None => (Some(Scope::Document), "", name),
    };

    Some(Assignment {
        name,
        scope,
        key,
        field,
        value,
    })
}

type Setter = fn(&mut Metadata, &str, String);

static SETTERS: Lazy<HashMap<Scope, HashMap<&'static str, Setter>>> = Lazy::new(|| {
    let mut table: HashMap<Scope, HashMap<&'static str, Setter>> = HashMap::new();
    let mut add = |scope: Scope, field: &'static str, setter: Setter| {
        table.entry(scope).or_default().insert(field, setter);
    };

    add(Scope::Document, "docName", |m, _, v| m.doc_name = v);
    add(Scope::Document, "ipr", |m, _, v| m.ipr = v);
    add(Scope::Document, "category", |m, _, v| m.category = v);
    add(Scope::Document, "submissionType", |m, _, v| m.submission_type = v);
    add(Scope::Document, "titleAbbr", |m, _, v| m.title_abbr = v);
    add(Scope::Document, "baseTargetUri", |m, _, v| m.base_target_uri = v);

    add(Scope::Author, "fullname", |m, k, v| m.author_mut(k).fullname = v);
    add(Scope::Author, "asciiFullname", |m, k, v| {
        m.author_mut(k).ascii_fullname = v
    });
    add(Scope::Author, "surname", |m, k, v| m.author_mut(k).surname = v);
    add(Scope::Author, "asciiSurname", |m, k, v| {
        m.author_mut(k).ascii_surname = v
    });
    add(Scope::Author, "initials", |m, k, v| m.author_mut(k).initials = v);
    add(Scope::Author, "asciiInitials", |m, k, v| {
        m.author_mut(k).ascii_initials = v
    });
    add(Scope::Author, "role", |m, k, v| m.author_mut(k).role = v);
    add(Scope::Author, "organization", |m, k, v| {
        m.author_mut(k).organization = v
    });
    add(Scope::Author, "email", |m, k, v| m.author_mut(k).email = v);
    add(Scope::Author, "phone", |m, k, v| m.author_mut(k).phone = v);
    add(Scope::Author, "city", |m, k, v| m.author_mut(k).city = v);
    add(Scope::Author, "code", |m, k, v| m.author_mut(k).code = v);
    add(Scope::Author, "country", |m, k, v| m.author_mut(k).country = v);
    add(Scope::Author, "region", |m, k, v| m.author_mut(k).region = v);
    add(Scope::Author, "street", |m, k, v| m.author_mut(k).street = v);
    add(Scope::Author, "postalLine", |m, k, v| {
        m.author_mut(k).postal_lines.push(v)
    });

    add(Scope::Reference, "title", |m, k, v| m.reference_mut(k).title = v);
    add(Scope::Reference, "target", |m, k, v| m.set_target(k, v));
    add(Scope::Reference, "type", |m, k, v| m.reference_mut(k).kind = v);
    add(Scope::Reference, "seriesInfoName", |m, k, v| {
        m.reference_mut(k).series_info_name = v
    });
    add(Scope::Reference, "seriesInfoValue", |m, k, v| {
        m.reference_mut(k).series_info_value = v
    });

    table
});

/// Everything set through substitution definitions.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Draft name (`docName`).
    pub doc_name: String,
    /// IPR statement.
    pub ipr: String,
    /// Document category.
    pub category: String,
    /// Submission stream.
    pub submission_type: String,
    /// Abbreviated title for the running header.
    pub title_abbr: String,
    /// Prefix for relative reference targets.
    pub base_target_uri: String,
    authors: Vec<Author>,
    references: BTreeMap<String, Reference>,
    targets: HashMap<String, String>,
}

impl Metadata {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an assignment. Returns `false` for names nothing reads.
    pub fn assign(&mut self, assignment: &Assignment<'_>) -> bool {
        let Some(scope) = assignment.scope else {
            return false;
        };
        let Some(setter) = SETTERS
            .get(&scope)
            .and_then(|fields| fields.get(assignment.field))
        else {
            return false;
        };
        let value = html_escape::encode_text(assignment.value).into_owned();
        setter(self, assignment.key, value);
        true
    }

    /// Authors in declaration order.
    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// References sorted by anchor.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    /// Look up a reference by anchor.
    pub fn reference(&self, anchor: &str) -> Option<&Reference> {
        self.references.get(anchor)
    }

    /// At least one reference has been cited.
    pub fn has_citations(&self) -> bool {
        self.references.values().any(|r| r.use_count > 0)
    }

    fn author_mut(&mut self, anchor: &str) -> &mut Author {
        let idx = match self.authors.iter().position(|a| a.anchor == anchor) {
            Some(idx) => idx,
            None => {
                self.authors.push(Author::new(anchor));
                self.authors.len() - 1
            }
        };
        &mut self.authors[idx]
    }

    fn reference_mut(&mut self, anchor: &str) -> &mut Reference {
        self.references
            .entry(anchor.to_string())
            .or_insert_with(|| Reference::new(anchor))
    }

    fn set_target(&mut self, anchor: &str, target: String) {
        self.targets.insert(target.clone(), anchor.to_string());
        self.reference_mut(anchor).target = target;
    }
}

impl ReferenceResolver for Metadata {
    fn resolve(&mut self, target: &str) -> Option<String> {
        let anchor = self.targets.get(target)?.clone();
        if let Some(reference) = self.references.get_mut(&anchor) {
            reference.use_count += 1;
        }
        Some(anchor)
    }
}
