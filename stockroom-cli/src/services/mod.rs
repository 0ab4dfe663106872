// Business logic services layer
//
// Pure functions over fetched records, shared by the CLI commands.

pub mod listing;

pub use listing::Resource;
