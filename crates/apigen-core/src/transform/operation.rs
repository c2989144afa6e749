use crate::ir::{
    HttpMethod, IrBody, IrOperation, IrParameter, IrParameters, IrResponse, IrSchemaObject,
    IrSchemaType, IrServer, MediaKind,
};
use crate::parse::RefOr;
use crate::parse::operation::{Operation, RequestBody, Response};
use crate::parse::ref_resolve::escape_segment;

use super::media_type::{SelectedContent, select_content};
use super::operation_id::derive_operation_id;
use super::security::flatten_security;
use super::spec_to_ir::Normalizer;

impl Normalizer<'_> {
    /// Convert one operation. `shared` holds the path-level parameters, which
    /// operation-level parameters override by (location, name).
    pub(crate) fn operation(
        &mut self,
        method: HttpMethod,
        path: &str,
        op: &Operation,
        shared: &[IrParameter],
        location: &str,
    ) -> IrOperation {
        let base = derive_operation_id(
            self.options.naming_strategy,
            &self.options.aliases,
            method,
            path,
            op.operation_id.as_deref(),
        );
        let id = self.operation_ids.assign(&base, path);
        if id != base {
            log::debug!("operation id `{base}` already taken, using `{id}` for {location}");
        }

        let mut parameters = IrParameters::default();
        for parameter in shared {
            parameters.insert(parameter.clone());
        }
        for parameter in self.parameter_list(&op.parameters, location) {
            parameters.insert(parameter);
        }

        let body = op
            .request_body
            .as_ref()
            .and_then(|b| self.request_body_or_ref(b, &format!("{location}/requestBody")));

        let responses = op
            .responses
            .iter()
            .filter_map(|(status, response)| {
                let response_location = format!("{location}/responses/{}", escape_segment(status));
                self.response_or_ref(status, response, &response_location)
                    .map(|ir| (status.clone(), ir))
            })
            .collect();

        let security = op
            .security
            .as_ref()
            .or(self.spec.security.as_ref())
            .map(|requirements| flatten_security(requirements, &self.security_schemes))
            .unwrap_or_default();

        self.add_servers(&op.servers);
        let servers = op
            .servers
            .iter()
            .map(|s| IrServer {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        IrOperation {
            id,
            method,
            path: path.to_string(),
            operation_id: op.operation_id.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            tags: op.tags.clone(),
            parameters,
            body,
            responses,
            security,
            servers,
        }
    }

    pub(crate) fn request_body_or_ref(
        &mut self,
        body: &RefOr<RequestBody>,
        location: &str,
    ) -> Option<IrBody> {
        match body {
            RefOr::Ref { ref_path } => {
                match self.resolver.resolve_as::<RequestBody>(ref_path) {
                    Ok(resolved) => self.request_body(&resolved, ref_path),
                    Err(e) => {
                        self.diagnostics
                            .warn(location, format!("skipping request body: {e}"));
                        None
                    }
                }
            }
            RefOr::Item(body) => self.request_body(body, location),
        }
    }

    fn request_body(&mut self, body: &RequestBody, location: &str) -> Option<IrBody> {
        let Some(selected) = select_content(&body.content) else {
            self.diagnostics
                .warn(location, "request body declares no content");
            return None;
        };
        let schema = self.content_schema(&selected, location);
        let pagination = self.pagination.for_body(&schema, &self.ir);

        Some(IrBody {
            media_type: selected.media_type.to_string(),
            kind: selected.kind,
            required: body.required,
            description: body.description.clone(),
            schema,
            pagination,
        })
    }

    fn response_or_ref(
        &mut self,
        status: &str,
        response: &RefOr<Response>,
        location: &str,
    ) -> Option<IrResponse> {
        match response {
            RefOr::Ref { ref_path } => match self.resolver.resolve_as::<Response>(ref_path) {
                Ok(resolved) => Some(self.response(status, &resolved, ref_path)),
                Err(e) => {
                    self.diagnostics
                        .warn(location, format!("skipping response: {e}"));
                    None
                }
            },
            RefOr::Item(response) => Some(self.response(status, response, location)),
        }
    }

    fn response(&mut self, status: &str, response: &Response, location: &str) -> IrResponse {
        let description = (!response.description.is_empty()).then(|| response.description.clone());

        match select_content(&response.content) {
            Some(selected) => IrResponse {
                media_type: Some(selected.media_type.to_string()),
                description,
                schema: self.content_schema(&selected, location),
            },
            None => {
                let empty = if status == "204" {
                    IrSchemaType::Void
                } else {
                    IrSchemaType::Unknown
                };
                IrResponse {
                    media_type: None,
                    description,
                    schema: IrSchemaObject::of(empty),
                }
            }
        }
    }

    /// Schema of a selected media type. Binary streams without a schema
    /// become binary strings.
    fn content_schema(&mut self, selected: &SelectedContent<'_>, location: &str) -> IrSchemaObject {
        match &selected.content.schema {
            Some(schema) => {
                let schema_location = format!(
                    "{location}/content/{}/schema",
                    escape_segment(selected.media_type)
                );
                self.schema_or_ref(schema, &schema_location)
            }
            None if selected.kind == Some(MediaKind::OctetStream) => {
                let mut binary = IrSchemaObject::of(IrSchemaType::String);
                binary.format = Some("binary".to_string());
                binary
            }
            None => IrSchemaObject::of(IrSchemaType::Unknown),
        }
    }
}
