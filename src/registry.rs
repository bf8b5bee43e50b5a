//! Tag registry.
//!
//! Holds every tag the emulated PLC serves. CIP requests look tags up by name
//! (case-insensitively, as Logix controllers do); PCCC requests look them up by
//! data file number.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{AbError, Result};
use crate::tag::{Tag, TagDef};

/// Collection of tags keyed by name and, for PCCC tags, by data file number.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: Vec<Arc<Tag>>,
    by_name: HashMap<String, usize>,
    by_file: HashMap<u16, usize>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding every tag of `config`.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if two tags share a name or a data file.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let mut registry = Self::new();
        for def in &config.tags {
            registry.insert(def.clone())?;
        }
        info!(
            plc = %config.plc_type,
            tags = registry.len(),
            "tag registry ready"
        );
        Ok(registry)
    }

    /// Adds a tag built from `def` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `AbError::BadInput` if the name or data file is already taken, or
    /// the definition fails [`TagDef::validate`].
    pub fn insert(&mut self, def: TagDef) -> Result<Arc<Tag>> {
        let key = def.name.to_ascii_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(AbError::bad_input(format!("duplicate tag '{}'", def.name)));
        }
        if let Some(file) = def.data_file {
            if self.by_file.contains_key(&file) {
                return Err(AbError::bad_input(format!("duplicate data file {}", file)));
            }
        }

        debug!(
            tag = %def.name,
            tag_type = %def.tag_type,
            elements = def.elem_count(),
            bytes = def.byte_len(),
            "adding tag"
        );

        let tag = Arc::new(Tag::new(def)?);
        let index = self.tags.len();
        if let Some(file) = tag.data_file() {
            self.by_file.insert(file, index);
        }
        self.by_name.insert(key, index);
        self.tags.push(Arc::clone(&tag));
        Ok(tag)
    }

    /// Looks a tag up by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `AbError::NotFound` if no tag has that name.
    pub fn get(&self, name: &str) -> Result<Arc<Tag>> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| Arc::clone(&self.tags[i]))
            .ok_or_else(|| AbError::not_found(format!("tag '{}'", name)))
    }

    /// Looks a PCCC tag up by data file number.
    ///
    /// # Errors
    ///
    /// Returns `AbError::NotFound` if no tag uses that data file.
    pub fn get_by_file(&self, file: u16) -> Result<Arc<Tag>> {
        self.by_file
            .get(&file)
            .map(|&i| Arc::clone(&self.tags[i]))
            .ok_or_else(|| AbError::not_found(format!("data file {}", file)))
    }

    /// Iterates over tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tag>> {
        self.tags.iter()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the registry holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlcType;
    use crate::error::Status;
    use std::thread;

    fn cip(spec: &str) -> TagDef {
        TagDef::parse_cip(spec).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = TagRegistry::new();
        registry.insert(cip("Speed:REAL[1]")).unwrap();
        registry.insert(cip("Counts:DINT[10]")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("speed").unwrap().name(), "Speed");
        assert_eq!(registry.get("COUNTS").unwrap().elem_count(), 10);
        assert_eq!(registry.get("Missing").unwrap_err().status(), Status::NotFound);

        let names: Vec<_> = registry.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["Speed", "Counts"]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut registry = TagRegistry::new();
        registry.insert(cip("Speed:REAL[1]")).unwrap();
        let err = registry.insert(cip("SPEED:DINT[1]")).unwrap_err();
        assert_eq!(err.status(), Status::BadInput);

        registry.insert(TagDef::parse_pccc("N7[10]").unwrap()).unwrap();
        let err = registry.insert(TagDef::parse_pccc("F7[10]").unwrap()).unwrap_err();
        assert_eq!(err.status(), Status::BadInput);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_oversized_tag_rejected() {
        let mut registry = TagRegistry::new();
        let mut def = TagDef::parse_pccc("N7[10]").unwrap();
        def.dimensions = vec![100_000, 100_000, 100_000];
        assert_eq!(registry.insert(def).unwrap_err().status(), Status::BadInput);
        assert!(registry.is_empty());
        assert_eq!(registry.get_by_file(7).unwrap_err().status(), Status::NotFound);

        registry.insert(TagDef::parse_pccc("N7[10]").unwrap()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_by_file() {
        let mut registry = TagRegistry::new();
        registry.insert(TagDef::parse_pccc("F8[4]").unwrap()).unwrap();
        assert_eq!(registry.get_by_file(8).unwrap().name(), "F8");
        assert_eq!(registry.get_by_file(9).unwrap_err().status(), Status::NotFound);
    }

    #[test]
    fn test_from_config() {
        let config = ServerConfig::new(PlcType::Slc500)
            .with_tag(TagDef::parse_pccc("N7[10]").unwrap())
            .with_tag(TagDef::parse_pccc("ST18[2]").unwrap());
        let registry = TagRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("st18").unwrap().data_file(), Some(18));
    }

    #[test]
    fn test_shared_tag_across_threads() {
        let mut registry = TagRegistry::new();
        let tag = registry.insert(cip("Total:DINT[1]")).unwrap();

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let tag = Arc::clone(&tag);
                thread::spawn(move || tag.write(0, &[i, 0, 0, 0]).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut out = [0u8; 4];
        registry.get("total").unwrap().read(0, 1, &mut out).unwrap();
        assert!(out[0] < 4);
        assert_eq!(&out[1..], &[0, 0, 0]);
    }
}
