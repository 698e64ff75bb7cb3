use std::ops::{Index, IndexMut};

use crate::layer::Layer;

/// Collection of the map's layers.
///
/// When a map is rendered, it draws all layers in the order they are stored in the collection.
/// Since a map should be able to render anything implementing the [`Layer`] trait, this
/// collection stores layers as trait objects; use downcasting through the `Any` trait to obtain
/// the concrete layer type you work with.
#[derive(Default)]
pub struct LayerCollection(Vec<Box<dyn Layer>>);

impl LayerCollection {
    /// Adds a layer to the end of the collection.
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.0.push(Box::new(layer));
    }

    /// Inserts a layer at position `index`, shifting all layers after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, layer: impl Layer + 'static) {
        self.0.insert(index, Box::new(layer));
    }

    /// Removes a layer at `index`, shifting all layers after it to the left and returning the
    /// removed layer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Box<dyn Layer> {
        self.0.remove(index)
    }

    /// Removes all layers from the collection.
    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Number of layers in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no layers in the collection.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the layers in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Layer> {
        self.0.iter().map(|layer| &**layer)
    }

    /// Iterates over mutable references to the layers in rendering order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Layer>> {
        self.0.iter_mut()
    }
}

impl From<Vec<Box<dyn Layer>>> for LayerCollection {
    fn from(layers: Vec<Box<dyn Layer>>) -> Self {
        Self(layers)
    }
}

impl Index<usize> for LayerCollection {
    type Output = dyn Layer;

    fn index(&self, index: usize) -> &Self::Output {
        &*self.0[index]
    }
}

impl IndexMut<usize> for LayerCollection {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut *self.0[index]
    }
}
