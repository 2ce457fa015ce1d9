use serde::Serialize;

/// Default maximum TC frame length in octets for a managed channel.
pub const DEFAULT_MAX_FRAME_LENGTH: u16 = 1024;

/// Identifies one managed channel: `(scid, vcid, tfvn)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ManagedParameterKey {
    pub scid: u16,
    pub vcid: u8,
    pub tfvn: u8,
}

impl ManagedParameterKey {
    pub fn new(scid: u16, vcid: u8, tfvn: u8) -> Self {
        Self { scid, vcid, tfvn }
    }
}

/// Frame structure expectations for one managed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagedParameter {
    pub has_ecf: bool,
    pub has_segmentation_header: bool,
    pub max_frame_length: u16,
}

impl ManagedParameter {
    /// A parameter with the given `has_ecf` and defaults for the rest.
    pub fn with_ecf(has_ecf: bool) -> Self {
        Self {
            has_ecf,
            has_segmentation_header: false,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

/// Managed parameters in declaration order.
///
/// Keys are unique. The order is the order in which the controlling
/// `has_ecf` keys first appeared in the property list, which is also the
/// order they are handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ManagedParameterSet {
    entries: Vec<ManagedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ManagedEntry {
    #[serde(flatten)]
    key: ManagedParameterKey,
    #[serde(flatten)]
    parameter: ManagedParameter,
}

impl ManagedParameterSet {
    /// Append an entry. Returns `false` and leaves the set untouched when the
    /// key is already present.
    pub(crate) fn insert(&mut self, key: ManagedParameterKey, parameter: ManagedParameter) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.push(ManagedEntry { key, parameter });
        true
    }

    pub fn get(&self, key: &ManagedParameterKey) -> Option<&ManagedParameter> {
        self.entries
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.parameter)
    }

    pub fn contains(&self, key: &ManagedParameterKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ManagedParameterKey, &ManagedParameter)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.parameter))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ManagedParameterKey, ManagedParameter)> for ManagedParameterSet {
    fn from_iter<T: IntoIterator<Item = (ManagedParameterKey, ManagedParameter)>>(iter: T) -> Self {
        let mut set = Self::default();
        for (key, parameter) in iter {
            set.insert(key, parameter);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let set: ManagedParameterSet = [
            (ManagedParameterKey::new(44, 1, 0), ManagedParameter::with_ecf(true)),
            (ManagedParameterKey::new(3, 0, 0), ManagedParameter::with_ecf(false)),
            (ManagedParameterKey::new(44, 0, 0), ManagedParameter::with_ecf(true)),
        ]
        .into_iter()
        .collect();

        let keys: Vec<_> = set.iter().map(|(key, _)| key.scid).collect();
        assert_eq!(keys, vec![44, 3, 44]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut set = ManagedParameterSet::default();
        let key = ManagedParameterKey::new(44, 1, 0);
        assert!(set.insert(key, ManagedParameter::with_ecf(true)));
        assert!(!set.insert(key, ManagedParameter::with_ecf(false)));
        assert!(set.get(&key).unwrap().has_ecf);
    }

    #[test]
    fn defaults_for_siblings() {
        let parameter = ManagedParameter::with_ecf(true);
        assert!(!parameter.has_segmentation_header);
        assert_eq!(parameter.max_frame_length, 1024);
    }
}
