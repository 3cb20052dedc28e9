//! Internal representation of messages.
//! A [`Query`] is parsed from every request, a [`Reply`] renders every answer.

pub mod query;
pub mod reply;

pub use query::Query;
pub use reply::Reply;
