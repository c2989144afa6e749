use crate::ir::{IrParameter, IrParameterLocation, IrSchemaObject, IrSchemaType, ParameterStyle};
use crate::parse::RefOr;
use crate::parse::operation::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::escape_segment;

use super::media_type::select_content;
use super::spec_to_ir::Normalizer;

impl Normalizer<'_> {
    /// Convert a `parameters` list, skipping entries whose reference is broken.
    pub(crate) fn parameter_list(
        &mut self,
        parameters: &[RefOr<Parameter>],
        location: &str,
    ) -> Vec<IrParameter> {
        parameters
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.parameter_or_ref(p, &format!("{location}/parameters/{i}")))
            .collect()
    }

    pub(crate) fn parameter_or_ref(
        &mut self,
        parameter: &RefOr<Parameter>,
        location: &str,
    ) -> Option<IrParameter> {
        match parameter {
            RefOr::Ref { ref_path } => {
                match self.resolver.resolve_as::<Parameter>(ref_path) {
                    Ok(resolved) => Some(self.parameter(&resolved, ref_path)),
                    Err(e) => {
                        self.diagnostics
                            .warn(location, format!("skipping parameter: {e}"));
                        None
                    }
                }
            }
            RefOr::Item(param) => Some(self.parameter(param, location)),
        }
    }

    fn parameter(&mut self, param: &Parameter, location: &str) -> IrParameter {
        let ir_location = match param.location {
            ParameterLocation::Cookie => IrParameterLocation::Cookie,
            ParameterLocation::Header => IrParameterLocation::Header,
            ParameterLocation::Path => IrParameterLocation::Path,
            ParameterLocation::Query => IrParameterLocation::Query,
        };

        let style = match param.style.as_deref() {
            None => ir_location.default_style(),
            Some(raw) => match ParameterStyle::parse(raw) {
                Some(style) => style,
                None => {
                    self.diagnostics
                        .warn(location, format!("unknown parameter style `{raw}`"));
                    ir_location.default_style()
                }
            },
        };

        let schema = if let Some(schema) = &param.schema {
            self.schema_or_ref(schema, &format!("{location}/schema"))
        } else if let Some(selected) = select_content(&param.content) {
            match &selected.content.schema {
                Some(schema) => {
                    let schema_location = format!(
                        "{location}/content/{}/schema",
                        escape_segment(selected.media_type)
                    );
                    self.schema_or_ref(schema, &schema_location)
                }
                None => IrSchemaObject::of(IrSchemaType::Unknown),
            }
        } else {
            IrSchemaObject::of(IrSchemaType::Unknown)
        };

        let pagination = self.pagination.for_parameter(&param.name, &schema, &self.ir);

        IrParameter {
            name: param.name.clone(),
            location: ir_location,
            style,
            explode: param.explode.unwrap_or(style == ParameterStyle::Form),
            allow_reserved: param.allow_reserved,
            required: param.required || ir_location == IrParameterLocation::Path,
            deprecated: param.deprecated,
            description: param.description.clone(),
            schema,
            pagination,
        }
    }
}
