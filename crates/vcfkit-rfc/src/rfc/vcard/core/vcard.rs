//! The vCard record.

use super::property::{PropertyValue, VCardProperty, names};
use super::version::VCardVersion;

/// One `BEGIN:VCARD` ... `END:VCARD` record.
///
/// Properties keep their insertion order; VERSION is not stored as a
/// property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VCard {
    /// Version the record was read from.
    pub version: VCardVersion,
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Appends a property.
    pub fn add_property(&mut self, property: VCardProperty) {
        self.properties.push(property);
    }

    /// Returns the first property with `name` (case-insensitive).
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&VCardProperty> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns all properties with `name` (case-insensitive).
    pub fn properties<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VCardProperty> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns whether a property with `name` exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Removes all properties with `name`, returning them.
    pub fn remove_properties(&mut self, name: &str) -> Vec<VCardProperty> {
        let (removed, kept) = std::mem::take(&mut self.properties)
            .into_iter()
            .partition(|p| p.name.eq_ignore_ascii_case(name));
        self.properties = kept;
        removed
    }

    /// Returns the formatted name (FN).
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.get_property(names::FN)?.value.as_text()
    }

    /// Returns the UID as written.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match &self.get_property(names::UID)?.value {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Uri(uri) => Some(uri.as_str()),
            _ => None,
        }
    }

    /// Sets the UID, replacing any existing one.
    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.remove_properties(names::UID);
        self.add_property(VCardProperty::text(names::UID, uid));
    }
}
