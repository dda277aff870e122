//! Per-table field descriptors.
//!
//! A user entity's cross-cutting behaviour (tracked / integrity-protected /
//! timeseries / embeddable) is declared once, at registration, as a
//! `TableDescriptor<T>` built from `FieldDescriptor<T>`s. No runtime type
//! introspection happens on the write-pipeline hot path — every descriptor
//! is a plain function pointer fixed at registration time.

/// Declares that a field participates in the semantic-search rendering.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddableSpec {
    pub format: &'static str,
    pub priority: i32,
}

/// Describes one field of entity `T`: how to stringify it, and which
/// cross-cutting subsystems it participates in.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub stringify: fn(&T) -> Option<String>,
    pub tracked: bool,
    pub integrity: bool,
    pub timeseries: bool,
    pub embeddable: Option<EmbeddableSpec>,
}

impl<T> FieldDescriptor<T> {
    pub fn new(name: &'static str, stringify: fn(&T) -> Option<String>) -> Self {
        Self {
            name,
            stringify,
            tracked: false,
            integrity: false,
            timeseries: false,
            embeddable: None,
        }
    }

    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }

    pub fn integrity(mut self) -> Self {
        self.integrity = true;
        self
    }

    pub fn timeseries(mut self) -> Self {
        self.timeseries = true;
        self
    }

    pub fn embeddable(mut self, format: &'static str, priority: i32) -> Self {
        self.embeddable = Some(EmbeddableSpec { format, priority });
        self
    }
}

/// The fixed descriptor for one user-entity table, built once at
/// registration and shared by the whole write pipeline.
pub struct TableDescriptor<T> {
    pub table_name: &'static str,
    pub key: fn(&T) -> String,
    pub fields: Vec<FieldDescriptor<T>>,
}

impl<T> TableDescriptor<T> {
    pub fn new(table_name: &'static str, key: fn(&T) -> String) -> Self {
        Self {
            table_name,
            key,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn tracked_fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().filter(|f| f.tracked)
    }

    pub fn integrity_fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().filter(|f| f.integrity)
    }

    pub fn timeseries_fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().filter(|f| f.timeseries)
    }

    /// Embeddable fields ordered by descending priority, tie-broken by
    /// declaration order (stable sort preserves it).
    pub fn embeddable_fields_by_priority(&self) -> Vec<&FieldDescriptor<T>> {
        let mut fields: Vec<&FieldDescriptor<T>> =
            self.fields.iter().filter(|f| f.embeddable.is_some()).collect();
        fields.sort_by_key(|f| std::cmp::Reverse(f.embeddable.unwrap().priority));
        fields
    }

    pub fn has_embeddable(&self) -> bool {
        self.fields.iter().any(|f| f.embeddable.is_some())
    }
}
