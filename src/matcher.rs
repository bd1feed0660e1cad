/// The matcher module evaluates search expressions against records.
///
/// Unscoped terms are matched as case-insensitive substrings of the pretty text of the caller's
/// default columns. Field-scoped terms compare by column kind: numeric columns as integers (file
/// size in whole megabytes), length as a duration, and text columns as lowercase strings.
use crate::column::{Column, ColumnKind};
use crate::config::Config;
use crate::expression_parser::{parse_expression, Comparator, Literal, ParsedExpression};
use crate::field::parse_exact;
use crate::record::MetadataRecord;
use std::cmp::Ordering;

const BYTES_PER_MEGABYTE: i64 = 1024 * 1024;

/// Whether `expression` uses any syntax beyond plain words. Plain queries can skip the parser.
pub fn is_advanced_expression(expression: &str) -> bool {
    expression.contains('"')
        || expression.contains(':')
        || expression.contains('-')
        || expression.contains("AND")
        || expression.contains("OR")
}

/// Reads a length query: `m:ss`, `h:mm:ss`, or a bare number of minutes. Returns seconds.
fn parse_duration(query: &str) -> i64 {
    let parts: Vec<i64> = query.split(':').map(parse_exact::<i64>).collect();
    match parts.as_slice() {
        [minutes] => minutes.saturating_mul(60),
        parts => parts.iter().fold(0i64, |acc, part| acc.saturating_mul(60).saturating_add(*part)),
    }
}

fn compare(ordering: Ordering, comparator: Comparator) -> bool {
    match comparator {
        Comparator::Contains => ordering == Ordering::Equal,
        Comparator::Greater => ordering == Ordering::Greater,
        Comparator::Less => ordering == Ordering::Less,
    }
}

impl MetadataRecord {
    /// Integer value of a numeric column for comparisons. Missing values compare as zero.
    fn numeric_value(&self, column: Column) -> i64 {
        match column {
            Column::Year => self.year().value_or_default() as i64,
            Column::DiscNumber => self.disc_number().value_or_default() as i64,
            Column::Track => self.track().value_or_default() as i64,
            Column::Bitrate => self.bitrate().value_or_default() as i64,
            Column::SampleRate => self.sample_rate().value_or_default() as i64,
            Column::Score => self.score().value_or_default() as i64,
            Column::Rating => self.rating().value_or_default() as i64,
            Column::PlayCount => self.play_count().value_or_default() as i64,
            Column::LastPlayed => self.last_played().value_or_default(),
            Column::Filesize => self.filesize().value_or_default() / BYTES_PER_MEGABYTE,
            Column::Length => self.length().value_or_default() as i64,
            _ => 0,
        }
    }

    fn matches_field(&self, column: Column, comparator: Comparator, query: &str) -> bool {
        match column.kind() {
            ColumnKind::Numeric => {
                compare(self.numeric_value(column).cmp(&parse_exact::<i64>(query)), comparator)
            }
            ColumnKind::Duration => compare(self.numeric_value(column).cmp(&parse_duration(query)), comparator),
            ColumnKind::Text => {
                let value = self.pretty_text(column).to_lowercase();
                let query = query.to_lowercase();
                match comparator {
                    Comparator::Contains => value.contains(&query),
                    Comparator::Greater => value > query,
                    Comparator::Less => value < query,
                }
            }
        }
    }

    fn matches_literal(&self, literal: &Literal, defaults: &[Column]) -> bool {
        match literal.field {
            Some(column) => self.matches_field(column, literal.comparator, &literal.value) != literal.negated,
            None => {
                if defaults.is_empty() {
                    return false;
                }
                let needle = literal.value.to_lowercase();
                let found = defaults
                    .iter()
                    .any(|column| self.pretty_text(*column).to_lowercase().contains(&needle));
                // A negated term holds only when no default column contains the text.
                found != literal.negated
            }
        }
    }

    /// Every group needs at least one matching literal. Evaluation stops at the first group that
    /// fails and, within a group, at the first literal that matches.
    pub fn matches_parsed_expression(&self, expression: &ParsedExpression, defaults: &[Column]) -> bool {
        expression
            .groups()
            .iter()
            .all(|group| group.literals().iter().any(|literal| self.matches_literal(literal, defaults)))
    }

    pub fn matches_expression(&self, expression: &str, defaults: &[Column]) -> bool {
        if is_advanced_expression(expression) {
            self.matches_parsed_expression(&parse_expression(expression), defaults)
        } else {
            self.matches_simple_expression(expression, defaults)
        }
    }

    /// Every whitespace-separated term must occur, case-insensitively, in the pretty text of at
    /// least one of `columns`.
    pub fn matches_simple_expression(&self, expression: &str, columns: &[Column]) -> bool {
        let expression = expression.to_lowercase();
        expression.split_whitespace().all(|term| {
            columns
                .iter()
                .any(|column| self.pretty_text(*column).to_lowercase().contains(term))
        })
    }
}

/// A query compiled once and run against many records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionMatcher {
    pub parsed: ParsedExpression,
    pub defaults: Vec<Column>,
}

impl ExpressionMatcher {
    pub fn new(expression: &str, defaults: &[Column]) -> Self {
        ExpressionMatcher {
            parsed: parse_expression(expression),
            defaults: defaults.to_vec(),
        }
    }

    /// Uses the configured default search columns.
    pub fn from_config(expression: &str, config: &Config) -> Self {
        Self::new(expression, &config.default_search_columns)
    }

    pub fn matches(&self, record: &MetadataRecord) -> bool {
        record.matches_parsed_expression(&self.parsed, &self.defaults)
    }

    pub fn filter<'a>(&self, records: impl IntoIterator<Item = &'a MetadataRecord>) -> Vec<&'a MetadataRecord> {
        let matched: Vec<&MetadataRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        tracing::debug!("Expression {} matched {} records", self.parsed, matched.len());
        matched
    }
}
