use std::fmt;
use std::str::FromStr;

use crate::record::Record;

/// Which field the search text is matched against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchField {
    #[default]
    Applicant,
    Address,
}

type FieldAccessor = fn(&Record) -> Option<&str>;

fn applicant(record: &Record) -> Option<&str> {
    record.applicant.as_deref()
}

fn address(record: &Record) -> Option<&str> {
    record.address.as_deref()
}

/// Searchable fields and how to read them off a record.
pub const SEARCH_FIELDS: [(SearchField, FieldAccessor); 2] = [
    (SearchField::Applicant, applicant),
    (SearchField::Address, address),
];

impl SearchField {
    pub fn label(self) -> &'static str {
        match self {
            SearchField::Applicant => "Applicant",
            SearchField::Address => "Address",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SearchField::Applicant => "Search by applicant (eg. Bob's Donut Truck)",
            SearchField::Address => "Search by street (eg. Sansome St)",
        }
    }

    pub fn value(self, record: &Record) -> Option<&str> {
        SEARCH_FIELDS
            .iter()
            .find(|(field, _)| *field == self)
            .and_then(|(_, accessor)| accessor(record))
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applicant" | "name" => Ok(Self::Applicant),
            "address" | "street" => Ok(Self::Address),
            other => Err(format!(
                "unknown search field '{other}', expected applicant or address"
            )),
        }
    }
}

/// Permit status filter. `All` disables status filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    Approved,
    Requested,
    Expired,
    #[default]
    All,
}

impl StatusFilter {
    /// Order in which the choices are offered to the user.
    pub const CHOICES: [StatusFilter; 4] = [
        StatusFilter::Approved,
        StatusFilter::Expired,
        StatusFilter::Requested,
        StatusFilter::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::Approved => "Approved",
            StatusFilter::Requested => "Requested",
            StatusFilter::Expired => "Expired",
            StatusFilter::All => "All",
        }
    }

    pub fn matches(self, record: &Record) -> bool {
        if self == StatusFilter::All {
            return true;
        }
        record
            .status
            .as_deref()
            .is_some_and(|status| status.trim().eq_ignore_ascii_case(self.label()))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "requested" => Ok(Self::Requested),
            "expired" => Ok(Self::Expired),
            "all" | "any" | "*" => Ok(Self::All),
            other => Err(format!(
                "unknown status '{other}', expected approved, requested, expired or all"
            )),
        }
    }
}

/// Everything the filter needs to decide whether a record is shown.
#[derive(Clone, Copy, Debug)]
pub struct Criteria<'a> {
    pub field: SearchField,
    pub term: &'a str,
    pub status: StatusFilter,
}

/// Case-insensitive substring match on the selected field.
///
/// An empty term matches every record, a missing field never matches a
/// non-empty term.
pub fn text_matches(record: &Record, field: SearchField, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    field
        .value(record)
        .is_some_and(|value| value.to_lowercase().contains(&needle))
}

impl Criteria<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        text_matches(record, self.field, self.term) && self.status.matches(record)
    }
}

/// Returns the matching records in their original order.
pub fn filter_records<'r>(records: &'r [Record], criteria: &Criteria<'_>) -> Vec<&'r Record> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}
