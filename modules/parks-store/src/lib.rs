pub mod pg;
pub mod query;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use pg::PgParkStore;
pub use store::ParkStore;
