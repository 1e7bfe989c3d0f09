use crate::error::ConvertError;

use super::feature::Feature;

/// Result of pulling one feature from a [`FeatureSource`].
///
/// - `Ok(Some(feature))` when a feature was read
/// - `Ok(None)` at the end of the sequence
/// - `Err(ConvertError)` when the underlying data could not be read
pub type FeatureResult = Result<Option<Feature>, ConvertError>;

/// A forward-only, closeable sequence of features backed by some dataset.
///
/// Each decoder (shapefile, zipped shapefile, GeoJSON, in-memory) is opened
/// through its own builder and then only seen through this trait, so the
/// transformer never depends on a concrete format.
///
/// # Contract
///
/// - `read` is lazy and may block on I/O. The sequence is finite and cannot
///   be restarted.
/// - `close` releases every handle held by the source. It is idempotent: a
///   second call is a no-op and returns `Ok(())`. A closed source reports the
///   end of the sequence.
/// - Implementations rely on interior mutability and are not `Sync`; a source
///   serves exactly one conversion and must not be shared between callers.
pub trait FeatureSource {
    /// Reads the next feature.
    fn read(&self) -> FeatureResult;

    /// Releases the resources held by the source.
    fn close(&self) -> Result<(), ConvertError>;
}

impl<S: FeatureSource + ?Sized> FeatureSource for Box<S> {
    fn read(&self) -> FeatureResult {
        (**self).read()
    }

    fn close(&self) -> Result<(), ConvertError> {
        (**self).close()
    }
}
