//! Template renderer (C4).
//!
//! Selects the embeddable fields of a table, in descending priority order
//! (declaration order breaks ties), and renders the first field's format
//! string whose substitution is non-empty. `{FieldName}` placeholders are
//! resolved against any field of the entity, not only the embeddable one.

use ledger_core::model::TableDescriptor;

/// Render the embedding-source text for `entity`, or `None` if no
/// embeddable field is declared or every rendering is empty/whitespace.
pub fn render<T>(table: &TableDescriptor<T>, entity: &T) -> Option<String> {
    for field in table.embeddable_fields_by_priority() {
        let spec = field.embeddable.expect("filtered to embeddable fields");
        let rendered = substitute(spec.format, table, entity);
        if !rendered.trim().is_empty() {
            return Some(rendered);
        }
    }
    None
}

fn substitute<T>(format: &str, table: &TableDescriptor<T>, entity: &T) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(brace) = rest.find('{') {
        out.push_str(&rest[..brace]);
        let after_brace = &rest[brace + 1..];
        let Some(end) = after_brace.find('}') else {
            out.push_str(&rest[brace..]);
            rest = "";
            break;
        };
        let name = &after_brace[..end];
        match table.fields.iter().find(|f| f.name == name) {
            Some(field) => {
                if let Some(value) = (field.stringify)(entity) {
                    out.push_str(&value);
                }
            }
            None => {
                // Unknown placeholder: leave absent, per spec's
                // "placeholders are absent" empty-rendering rule.
            }
        }
        rest = &after_brace[end + 1..];
    }
    out.push_str(rest);
    out
}
