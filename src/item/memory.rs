use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use log::debug;

use crate::{
    core::{
        feature::Feature,
        source::{FeatureResult, FeatureSource},
    },
    error::ConvertError,
};

/// A [`FeatureSource`] over features already held in memory.
///
/// It keeps track of how often it was effectively closed, which makes the
/// close-exactly-once contract observable.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::feature::Feature;
/// use geoshape_csv::core::source::FeatureSource;
/// use geoshape_csv::item::memory::MemoryFeatureSource;
///
/// let source = MemoryFeatureSource::new(vec![Feature::new().with_attribute("id", 1)]);
///
/// assert!(source.read().unwrap().is_some());
/// assert!(source.read().unwrap().is_none());
///
/// source.close().unwrap();
/// source.close().unwrap();
/// assert_eq!(source.close_count(), 1);
/// ```
#[derive(Default)]
pub struct MemoryFeatureSource {
    features: RefCell<VecDeque<Feature>>,
    read_count: Cell<usize>,
    closed: Cell<bool>,
    close_count: Cell<usize>,
}

impl MemoryFeatureSource {
    pub fn new(features: Vec<Feature>) -> Self {
        MemoryFeatureSource {
            features: RefCell::new(features.into()),
            ..Default::default()
        }
    }

    /// Number of features handed out so far.
    pub fn read_count(&self) -> usize {
        self.read_count.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Number of `close` calls that had an effect (0 or 1).
    pub fn close_count(&self) -> usize {
        self.close_count.get()
    }
}

impl FromIterator<Feature> for MemoryFeatureSource {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        MemoryFeatureSource::new(iter.into_iter().collect())
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn read(&self) -> FeatureResult {
        if self.closed.get() {
            return Ok(None);
        }
        let feature = self.features.borrow_mut().pop_front();
        if feature.is_some() {
            self.read_count.set(self.read_count.get() + 1);
        }
        Ok(feature)
    }

    fn close(&self) -> Result<(), ConvertError> {
        if !self.closed.replace(true) {
            self.features.borrow_mut().clear();
            self.close_count.set(self.close_count.get() + 1);
            debug!("Closed in-memory source after {} features", self.read_count.get());
        }
        Ok(())
    }
}
