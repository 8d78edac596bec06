//! Map type
use super::*;
use m4craft_stdext::collections::bucketmap::BucketMap;
use std::collections::HashMap;

/// The number of buckets in the commands map.
///
/// The count is fixed: macro processing workloads define at most a few
/// thousand names, so chains stay short, and a stable layout makes the
/// `htdist` diagnostic meaningful across runs.
const BUCKET_COUNT: usize = 16384;

/// Map is a map type where the keys are macro names and the values are
/// m4lang commands.
///
/// Built-in macros are inserted when the map is created and user-defined
/// macros are inserted as the input defines them. The two share one
/// namespace: `define(len, ...)` shadows the built-in `len`, and
/// `undefine(len)` removes whichever is present.
pub struct Map {
    entries: BucketMap<Command>,
}

impl Map {
    pub(crate) fn new(built_ins: HashMap<&'static str, BuiltIn>) -> Map {
        let mut entries = BucketMap::new(BUCKET_COUNT);
        for (name, built_in) in built_ins {
            entries.insert(name.as_bytes(), Command::BuiltIn(built_in));
        }
        Map { entries }
    }

    /// Get the command stored under the provided name.
    #[inline]
    pub fn get(&self, name: &[u8]) -> Option<&Command> {
        self.entries.get(name)
    }

    /// Insert a user-defined macro, replacing any existing command with the
    /// same name.
    pub fn insert_macro(&mut self, name: &[u8], user_macro: usermacro::Macro) {
        self.entries
            .insert(name, Command::Macro(rc::Rc::new(user_macro)));
    }

    /// Remove the command stored under the provided name.
    ///
    /// Returns whether a command was removed. Removing a missing name is not
    /// an error.
    pub fn remove(&mut self, name: &[u8]) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Return the number of names in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the map contains no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return an iterator over the chain length of every bucket.
    ///
    /// This feeds the `htdist` diagnostic.
    pub fn bucket_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.bucket_lengths()
    }
}
