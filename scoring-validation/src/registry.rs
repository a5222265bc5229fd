// Declared field sets, memoized per validator type

use crate::{Field, RequestValidator};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use scoring_log::info;
use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, HashMap};

/// Named fields of one request shape, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: BTreeMap<&'static str, Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field.
    ///
    /// # Panics
    ///
    /// Panics when `name` is already declared.
    pub fn field(mut self, name: &'static str, field: Field) -> Self {
        if self.fields.insert(name, field).is_some() {
            panic!("field `{}` is declared twice", name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field names in validation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Field)> + '_ {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, &'static FieldSet>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Field set declared by `V`, computed on first use and shared afterwards.
///
/// The declaration runs under the registry's write lock, so concurrent first
/// calls for the same type observe a single field set. `declare_fields` must
/// not itself look up the registry.
pub fn declared_fields<V: RequestValidator>() -> &'static FieldSet {
    let type_id = TypeId::of::<V>();

    if let Some(fields) = REGISTRY.read().get(&type_id) {
        return fields;
    }

    let mut registry = REGISTRY.write();
    *registry.entry(type_id).or_insert_with(|| {
        let fields: &'static FieldSet = Box::leak(Box::new(V::declare_fields()));
        info!(
            target: "scoring::validator",
            "collected {} fields in {}",
            fields.len(),
            type_name::<V>()
        );
        fields
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DECLARATIONS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl RequestValidator for Counted {
        fn declare_fields() -> FieldSet {
            DECLARATIONS.fetch_add(1, Ordering::SeqCst);
            FieldSet::new()
                .field("b", Field::char())
                .field("a", Field::char().required())
        }
    }

    #[test]
    fn test_declared_once_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| declared_fields::<Counted>() as *const FieldSet as usize))
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(DECLARATIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let names: Vec<_> = declared_fields::<Counted>().names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "field `a` is declared twice")]
    fn test_duplicate_field_panics() {
        let _ = FieldSet::new()
            .field("a", Field::char())
            .field("a", Field::email());
    }
}
