//! Filters for event searches
//!
//! A search request is reduced to a list of [`Predicate`]s that are ANDed
//! together by the store. See [`SearchFilters`] for the per-kind rules.

mod builder;
mod params;
mod predicate;

pub use builder::FilterBuilder;
pub use params::{
    CommonSearchParams, FsEventSearch, LogEventSearch, ProviderEventSearch, SearchFilters,
};
pub use predicate::{Order, Predicate, Value};
