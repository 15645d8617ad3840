use super::Slot;
use crate::schema::EntityDescriptor;
use crate::{boot, stmt, Error, Result};
use indexmap::IndexMap;

/// How an entity's state is laid out in second-level cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheShape {
    NotCacheable,

    /// Positional state array; compact, but tied to the attribute layout
    Unstructured,

    /// Named-field map, tolerant of attribute reordering between versions
    Structured,

    /// Identifier only; the instance is re-read on cache hit
    Reference,
}

/// One second-level cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Unstructured {
        /// Concrete entity name the row mapped to
        subclass: String,
        version: Option<stmt::Value>,
        disassembled: Vec<Slot>,
    },

    Structured {
        subclass: String,
        version: Option<stmt::Value>,
        fields: IndexMap<String, Slot>,
    },

    Reference {
        id: stmt::Value,
    },
}

impl CacheEntry {
    pub fn subclass(&self) -> Option<&str> {
        match self {
            Self::Unstructured { subclass, .. } | Self::Structured { subclass, .. } => {
                Some(subclass)
            }
            Self::Reference { .. } => None,
        }
    }

    pub fn version(&self) -> Option<&stmt::Value> {
        match self {
            Self::Unstructured { version, .. } | Self::Structured { version, .. } => {
                version.as_ref()
            }
            Self::Reference { .. } => None,
        }
    }

    /// The cached value of a named attribute, when the entry carries one.
    pub fn slot(&self, descriptor: &EntityDescriptor, name: &str) -> Option<&Slot> {
        match self {
            Self::Unstructured { disassembled, .. } => {
                let attribute = descriptor.attribute(name)?;
                disassembled.get(attribute.state_position)
            }
            Self::Structured { fields, .. } => fields.get(name),
            Self::Reference { .. } => None,
        }
    }
}

/// Builds and reads cache entries for one entity.
#[derive(Debug, Clone, Copy)]
pub struct CacheEntryShaper<'a> {
    descriptor: &'a EntityDescriptor,
}

impl<'a> CacheEntryShaper<'a> {
    pub fn new(descriptor: &'a EntityDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn shape(&self) -> CacheShape {
        match &self.descriptor.cache {
            None => CacheShape::NotCacheable,
            Some(decl) => match decl.layout {
                boot::CacheLayout::Unstructured => CacheShape::Unstructured,
                boot::CacheLayout::Structured => CacheShape::Structured,
                boot::CacheLayout::Reference => CacheShape::Reference,
            },
        }
    }

    /// Shapes an instance's state into a cache entry.
    ///
    /// Lazy attributes are dropped to `Unfetched` unless the declaration
    /// opts into caching them, so a later cache hit cannot claim lazy state
    /// it never stored.
    pub fn build_entry(
        &self,
        id: &stmt::Value,
        state: &[Slot],
        version: Option<&stmt::Value>,
    ) -> Result<CacheEntry> {
        let decl = self.descriptor.cache.as_ref().ok_or_else(|| {
            Error::consistency(format!("`{}` is not cacheable", self.descriptor.name))
        })?;

        if state.len() != self.descriptor.attributes.len() {
            return Err(Error::runtime_data(
                &self.descriptor.name,
                id,
                format!(
                    "state array holds {} slots; layout has {}",
                    state.len(),
                    self.descriptor.attributes.len()
                ),
            ));
        }

        let keep = |position: usize| -> Slot {
            let attribute = &self.descriptor.attributes[position];
            if attribute.is_lazy() && !decl.cache_lazy_attributes {
                Slot::Unfetched
            } else {
                state[position].clone()
            }
        };

        Ok(match decl.layout {
            boot::CacheLayout::Reference => CacheEntry::Reference { id: id.clone() },
            boot::CacheLayout::Unstructured => CacheEntry::Unstructured {
                subclass: self.descriptor.name.clone(),
                version: version.cloned(),
                disassembled: (0..state.len()).map(keep).collect(),
            },
            boot::CacheLayout::Structured => CacheEntry::Structured {
                subclass: self.descriptor.name.clone(),
                version: version.cloned(),
                fields: self
                    .descriptor
                    .attributes
                    .iter()
                    .map(|attribute| (attribute.name.clone(), keep(attribute.state_position)))
                    .collect(),
            },
        })
    }

    /// Reassembles a state array from an entry, or `None` for reference
    /// entries (those require a re-read).
    ///
    /// Structured entries assemble by name, so an entry written under an
    /// older layout still maps; fields the layout no longer knows are
    /// ignored, attributes the entry never stored come back `Unfetched`.
    pub fn assemble(&self, id: &stmt::Value, entry: &CacheEntry) -> Result<Option<Vec<Slot>>> {
        match entry {
            CacheEntry::Reference { .. } => Ok(None),
            CacheEntry::Unstructured { disassembled, .. } => {
                if disassembled.len() != self.descriptor.attributes.len() {
                    return Err(Error::runtime_data(
                        &self.descriptor.name,
                        id,
                        format!(
                            "cached entry holds {} slots; layout has {}",
                            disassembled.len(),
                            self.descriptor.attributes.len()
                        ),
                    ));
                }
                Ok(Some(disassembled.clone()))
            }
            CacheEntry::Structured { fields, .. } => Ok(Some(
                self.descriptor
                    .attributes
                    .iter()
                    .map(|attribute| fields.get(&attribute.name).cloned().unwrap_or_default())
                    .collect(),
            )),
        }
    }
}
