//! Selecting, ordering and grouping records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::record::{Entry, Record};
use crate::tag::{Tag, satisfies_all};
use crate::Date;

/// An entry together with the record that owns it.
#[derive(Debug, Clone, Copy)]
pub struct EntryRef<'a> {
    pub record: &'a Record,
    pub entry: &'a Entry,
}

impl EntryRef<'_> {
    /// The entry's tags plus the tags of its record's summary.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<Tag> {
        let mut tags = self.record.tags();
        tags.extend(self.entry.tags());
        tags
    }
}

/// All entries of `record`, in order.
pub fn entries_of(record: &Record) -> impl Iterator<Item = EntryRef<'_>> {
    record
        .entries()
        .iter()
        .map(move |entry| EntryRef { record, entry })
}

type Predicate = Box<dyn Fn(&Record) -> bool + Send + Sync>;

/// A conjunction of optional criteria. The empty query matches everything.
#[derive(Default)]
pub struct Query {
    dates: Option<BTreeSet<Date>>,
    since: Option<Date>,
    until: Option<Date>,
    tags: Vec<Tag>,
    predicate: Option<Predicate>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("dates", &self.dates)
            .field("since", &self.since)
            .field("until", &self.until)
            .field("tags", &self.tags)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only records dated on one of `dates`.
    #[must_use]
    pub fn with_dates(mut self, dates: impl IntoIterator<Item = Date>) -> Self {
        self.dates.get_or_insert_with(BTreeSet::new).extend(dates);
        self
    }

    /// Only records dated on or after `date`.
    #[must_use]
    pub const fn since(mut self, date: Date) -> Self {
        self.since = Some(date);
        self
    }

    /// Only records dated on or before `date`.
    #[must_use]
    pub const fn until(mut self, date: Date) -> Self {
        self.until = Some(date);
        self
    }

    /// Only entries carrying every one of `tags` (directly or via their record).
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Only records for which `predicate` holds.
    #[must_use]
    pub fn matching(mut self, predicate: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn matches_date_and_predicate(&self, record: &Record) -> bool {
        let date = record.date();
        self.dates.as_ref().is_none_or(|dates| dates.contains(&date))
            && self.since.is_none_or(|since| date >= since)
            && self.until.is_none_or(|until| date <= until)
            && self.predicate.as_ref().is_none_or(|p| p(record))
    }

    /// Whether a single entry satisfies the tag criteria.
    #[must_use]
    pub fn matches_entry(&self, entry: &EntryRef<'_>) -> bool {
        self.tags.is_empty() || satisfies_all(&entry.tags(), &self.tags)
    }

    /// Whether the whole record satisfies the query.
    ///
    /// For tags, it suffices that the record summary or any one entry
    /// carries them.
    #[must_use]
    pub fn matches_record(&self, record: &Record) -> bool {
        self.matches_date_and_predicate(record)
            && (self.tags.is_empty()
                || satisfies_all(&record.tags(), &self.tags)
                || entries_of(record).any(|e| self.matches_entry(&e)))
    }
}

/// Records matching `query`, in input order.
pub fn filter<'a>(records: impl IntoIterator<Item = &'a Record>, query: &Query) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| query.matches_record(r))
        .collect()
}

/// Result of an entry-level search.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Records contributing at least one entry (all date-matching records
    /// when the query has no tags).
    pub records: Vec<&'a Record>,
    /// The matching entries, in record-then-entry order.
    pub entries: Vec<EntryRef<'a>>,
}

/// Entries that individually satisfy `query`, along with their records.
pub fn find_filter<'a>(records: impl IntoIterator<Item = &'a Record>, query: &Query) -> Selection<'a> {
    let mut selection = Selection::default();
    for record in records {
        if !query.matches_date_and_predicate(record) {
            continue;
        }
        let before = selection.entries.len();
        selection
            .entries
            .extend(entries_of(record).filter(|e| query.matches_entry(e)));
        if query.tags.is_empty() || selection.entries.len() > before {
            selection.records.push(record);
        }
    }
    selection
}

/// Records ordered by date. Records with equal dates keep their input order.
pub fn sort<'a>(records: impl IntoIterator<Item = &'a Record>, ascending: bool) -> Vec<&'a Record> {
    let mut sorted: Vec<_> = records.into_iter().collect();
    if ascending {
        sorted.sort_by_key(|r| r.date());
    } else {
        sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    }
    sorted
}

/// Groups entries by every tag they carry.
///
/// An entry is listed under each of its own tags and its record's tags; a
/// tag with a value (`#ticket=7`) is also listed under its bare name
/// (`#ticket`). Within a tag, entries keep record-then-entry order.
pub fn entry_tag_lookup<'a>(
    records: impl IntoIterator<Item = &'a Record>,
) -> BTreeMap<Tag, Vec<EntryRef<'a>>> {
    let mut lookup: BTreeMap<Tag, Vec<EntryRef<'a>>> = BTreeMap::new();
    for record in records {
        for entry in entries_of(record) {
            let tags = entry.tags();
            let keys: BTreeSet<Tag> = tags
                .iter()
                .filter(|t| t.value().is_some())
                .map(Tag::base)
                .chain(tags.iter().cloned())
                .collect();
            for key in keys {
                lookup.entry(key).or_default().push(entry);
            }
        }
    }
    lookup
}
