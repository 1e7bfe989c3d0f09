/// Features, attribute values and schemas.
pub mod feature;

/// The feature source capability.
pub mod source;

/// CSV dialect configuration.
pub mod dialect;

/// Feature-to-CSV transformation.
pub mod transformer;

/// End-to-end conversion of a dataset file into a CSV file.
pub mod job;
