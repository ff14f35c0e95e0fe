//! Attribute-level validation of a parsed tree against its schema types.

use uidesc_core::schema::SchemaRegistry;

use crate::{
    document::{Document, ElementId},
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Checks every typed element's attributes.
///
/// Reports required attributes that are missing (errors) and attributes the
/// type does not declare (warnings). Undeclared attributes are first matched,
/// in source order, against the type's indeterminate slots; only the ones
/// left over are reported, and only when the type does not allow extra
/// attributes.
pub fn validate(document: &Document, schema: &SchemaRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (id, element) in document.elements() {
        if id == ElementId::ROOT {
            continue;
        }
        let Some(ty) = element.ty() else {
            continue;
        };
        let complex = schema.complex_type(ty);
        let tag = element.tag().unwrap_or_default();
        let tag_span = element
            .tag_span()
            .unwrap_or_else(|| Span::new(element.start()..element.start()));

        for def in complex.attributes() {
            if def.is_required() && !element.has_attribute(def.name()) {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "missing required attribute `{}` on `{tag}`",
                        def.name()
                    ))
                    .with_code(ErrorCode::E202)
                    .with_span(tag_span),
                );
            }
        }

        if complex.allows_extra_attributes() {
            continue;
        }
        let unknown = element
            .attributes()
            .filter(|(key, _)| complex.attribute(key).is_none())
            .skip(complex.indeterminate_len());
        for (_, attribute) in unknown {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "unknown attribute `{}` on `{tag}`",
                    attribute.name()
                ))
                .with_code(ErrorCode::E203)
                .with_span(attribute.name_span()),
            );
        }
    }

    diagnostics
}
