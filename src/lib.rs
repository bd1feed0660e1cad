pub mod column;
pub mod common;
pub mod config;
pub mod error;
pub mod expression_parser;
pub mod field;
pub mod format;
pub mod matcher;
pub mod podcast;
pub mod record;
pub mod stats;
pub mod tags;
pub mod xml;

pub use column::{Column, ColumnKind};
pub use config::{Config, LogOutput, LoggingConfig};
pub use error::{MetaError, MetaExpectedError, Result};
pub use expression_parser::{parse_expression, Comparator, Literal, OrGroup, ParsedExpression};
pub use field::FieldValue;
pub use matcher::{is_advanced_expression, ExpressionMatcher};
pub use podcast::PodcastEpisode;
pub use record::MetadataRecord;
pub use stats::{MemoryStatisticsStore, Statistics, StatisticsStore};
pub use tags::{ContainerKind, ExtendedField, RawTags, TagSink, TagSource, TagWrite};

#[cfg(test)]
mod testing;

#[cfg(test)]
mod record_test;
